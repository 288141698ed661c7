//! Transcript aggregation: credit-weighted CGPA over a student's results.
//!
//! Aggregation is pure. Courses are resolved through a caller-supplied
//! lookup so the same fold serves repository-backed reads and tests alike.
//! A result whose course can no longer be resolved still appears in the
//! transcript but contributes nothing to the totals.

use serde::{Serialize, Serializer};
use tracing::warn;
use utoipa::ToSchema;

use super::{CourseResult, CourseSummary};

/// Cumulative grade point average held as exact hundredths.
///
/// Serialises as a JSON number with two decimal places of precision,
/// e.g. `3.43`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, ToSchema)]
#[schema(value_type = f64, example = 3.43)]
pub struct Cgpa(u32);

impl Cgpa {
    /// Sentinel for a transcript with no creditable results.
    pub const ZERO: Self = Self(0);

    /// Value in hundredths, e.g. `343` for 3.43.
    pub fn hundredths(self) -> u32 {
        self.0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 100.0
    }

    /// Credit-weighted mean of grade points, rounded half-up to two decimals.
    ///
    /// `weighted_tenths` is the sum of `grade_point_tenths * credits`.
    fn from_weighted_tenths(weighted_tenths: u64, total_credits: u64) -> Self {
        if total_credits == 0 {
            return Self::ZERO;
        }
        // hundredths = weighted_tenths * 10 / credits, rounded half-up.
        let rounded = (weighted_tenths * 20 + total_credits) / (2 * total_credits);
        // Grade points never exceed 4.0, so the mean never exceeds 400.
        Self(u32::try_from(rounded).unwrap_or(u32::MAX))
    }
}

impl Serialize for Cgpa {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl std::fmt::Display for Cgpa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// A result paired with its resolved course, if the course still exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    #[serde(flatten)]
    pub result: CourseResult,
    pub course: Option<CourseSummary>,
}

/// Derived view of a student's results. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    /// Results ordered by `dateAchieved`, newest first.
    pub results: Vec<TranscriptEntry>,
    pub total_credits: u32,
    pub cgpa: Cgpa,
}

impl Transcript {
    /// `true` when no result carried resolvable credits.
    pub fn has_credits(&self) -> bool {
        self.total_credits > 0
    }
}

/// Fold a student's results into a transcript.
///
/// `course_of` resolves each result's course. Results it cannot resolve are
/// kept in the output but skipped when summing credits and grade points.
/// Entries are sorted newest first; equal dates keep their input order.
///
/// # Examples
/// ```
/// use portal::domain::{compute_transcript, Cgpa};
///
/// let transcript = compute_transcript(Vec::new(), |_| None);
/// assert!(transcript.results.is_empty());
/// assert_eq!(transcript.total_credits, 0);
/// assert_eq!(transcript.cgpa, Cgpa::ZERO);
/// ```
pub fn compute_transcript<F>(results: Vec<CourseResult>, mut course_of: F) -> Transcript
where
    F: FnMut(&CourseResult) -> Option<CourseSummary>,
{
    let mut weighted_tenths: u64 = 0;
    let mut total_credits: u64 = 0;

    let mut entries: Vec<TranscriptEntry> = results
        .into_iter()
        .map(|result| {
            let course = course_of(&result);
            match &course {
                Some(summary) => {
                    let credits = u64::from(summary.credits.value());
                    weighted_tenths += u64::from(result.grade_point().tenths()) * credits;
                    total_credits += credits;
                }
                None => warn!(
                    result_id = %result.id(),
                    course_id = %result.course_id(),
                    "course for result not found; excluded from CGPA"
                ),
            }
            TranscriptEntry { result, course }
        })
        .collect();

    entries.sort_by(|a, b| b.result.date_achieved().cmp(&a.result.date_achieved()));

    Transcript {
        results: entries,
        total_credits: u32::try_from(total_credits).unwrap_or(u32::MAX),
        cgpa: Cgpa::from_weighted_tenths(weighted_tenths, total_credits),
    }
}
