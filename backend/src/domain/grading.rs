//! Grade derivation from numeric scores.
//!
//! A result's letter grade and grade point are never written directly; they
//! are derived from the score through [`derive_grade`] every time a score is
//! recorded or changed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

/// Validation errors returned when constructing a [`Score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScoreValidationError {
    #[error("score must be between 0 and 100, got {value}")]
    OutOfRange { value: i64 },
}

/// Examination score in the inclusive range `0..=100`.
///
/// # Examples
/// ```
/// use portal::domain::Score;
///
/// let score = Score::new(87).expect("valid score");
/// assert_eq!(score.value(), 87);
/// assert!(Score::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Highest attainable score.
    pub const MAX: u8 = 100;

    /// Validate and construct a score.
    pub fn new(value: i64) -> Result<Self, ScoreValidationError> {
        u8::try_from(value)
            .ok()
            .filter(|raw| *raw <= Self::MAX)
            .map(Self)
            .ok_or(ScoreValidationError::OutOfRange { value })
    }

    /// Raw score value.
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Score {
    type Error = ScoreValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for u8 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Letter grade on the twelve-step scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    /// Canonical textual form, e.g. `"B+"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::AMinus => "A-",
            Self::BPlus => "B+",
            Self::B => "B",
            Self::BMinus => "B-",
            Self::CPlus => "C+",
            Self::C => "C",
            Self::CMinus => "C-",
            Self::DPlus => "D+",
            Self::D => "D",
            Self::F => "F",
        }
    }

    /// Grade point attached to this letter on the 4.0 scale.
    pub fn grade_point(self) -> GradePoint {
        let tenths = match self {
            Self::APlus | Self::A => 40,
            Self::AMinus => 37,
            Self::BPlus => 33,
            Self::B => 30,
            Self::BMinus => 27,
            Self::CPlus => 23,
            Self::C => 20,
            Self::CMinus => 17,
            Self::DPlus => 13,
            Self::D => 10,
            Self::F => 0,
        };
        GradePoint(tenths)
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown letter grade.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown letter grade: {0}")]
pub struct UnknownLetterGrade(pub String);

impl FromStr for LetterGrade {
    type Err = UnknownLetterGrade;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GRADE_BANDS
            .iter()
            .map(|(_, letter)| *letter)
            .chain(std::iter::once(Self::F))
            .find(|letter| letter.as_str() == s)
            .ok_or_else(|| UnknownLetterGrade(s.to_owned()))
    }
}

/// Grade point in `0.0..=4.0`, held as exact tenths.
///
/// Serialises as a JSON number such as `3.7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ToSchema)]
#[schema(value_type = f64, example = 3.7)]
pub struct GradePoint(u8);

impl GradePoint {
    /// Grade point expressed in tenths, e.g. `37` for 3.7.
    pub fn tenths(self) -> u8 {
        self.0
    }

    /// Grade point as a float for display and storage.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl Serialize for GradePoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl fmt::Display for GradePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_f64())
    }
}

/// Minimum scores for each passing letter, highest first. Anything below
/// the last band is an `F`.
const GRADE_BANDS: [(u8, LetterGrade); 11] = [
    (90, LetterGrade::APlus),
    (85, LetterGrade::A),
    (80, LetterGrade::AMinus),
    (75, LetterGrade::BPlus),
    (70, LetterGrade::B),
    (65, LetterGrade::BMinus),
    (60, LetterGrade::CPlus),
    (55, LetterGrade::C),
    (50, LetterGrade::CMinus),
    (45, LetterGrade::DPlus),
    (40, LetterGrade::D),
];

/// Letter grade and grade point derived together from one score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grading {
    letter: LetterGrade,
    point: GradePoint,
}

impl Grading {
    /// Letter grade of the band the score fell into.
    pub fn letter(self) -> LetterGrade {
        self.letter
    }

    /// Grade point paired with [`Self::letter`].
    pub fn point(self) -> GradePoint {
        self.point
    }
}

/// Map a score onto its letter grade and grade point.
///
/// Bands are checked from the highest threshold down and the first band the
/// score reaches wins.
///
/// # Examples
/// ```
/// use portal::domain::{derive_grade, LetterGrade, Score};
///
/// let grading = derive_grade(Score::new(89).expect("valid score"));
/// assert_eq!(grading.letter(), LetterGrade::A);
/// assert_eq!(grading.point().as_f64(), 4.0);
/// ```
pub fn derive_grade(score: Score) -> Grading {
    let letter = GRADE_BANDS
        .iter()
        .find(|(threshold, _)| score.value() >= *threshold)
        .map_or(LetterGrade::F, |(_, letter)| *letter);
    Grading {
        letter,
        point: letter.grade_point(),
    }
}
