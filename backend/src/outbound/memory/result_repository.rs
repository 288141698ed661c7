//! In-memory `ResultRepository`.

use std::cmp::Reverse;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{ResultRepository, ResultRepositoryError};
use crate::domain::{CourseId, CourseResult, ResultId, UserId};

use super::poisoned;

/// Results keyed by insertion order. At most one per student and course.
#[derive(Debug, Default)]
pub struct MemoryResultRepository {
    results: Mutex<Vec<CourseResult>>,
}

impl MemoryResultRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn results(&self) -> Result<MutexGuard<'_, Vec<CourseResult>>, ResultRepositoryError> {
        self.results
            .lock()
            .map_err(|_| poisoned(ResultRepositoryError::query))
    }

    fn matching(
        &self,
        keep: impl Fn(&CourseResult) -> bool,
    ) -> Result<Vec<CourseResult>, ResultRepositoryError> {
        Ok(self
            .results()?
            .iter()
            .filter(|result| keep(result))
            .cloned()
            .collect())
    }

    fn remove(
        &self,
        drop: impl Fn(&CourseResult) -> bool,
    ) -> Result<usize, ResultRepositoryError> {
        let mut results = self.results()?;
        let before = results.len();
        results.retain(|result| !drop(result));
        Ok(before - results.len())
    }
}

fn newest_first(results: &mut [CourseResult]) {
    results.sort_by_key(|result| Reverse(result.date_achieved()));
}

#[async_trait]
impl ResultRepository for MemoryResultRepository {
    async fn insert(&self, result: &CourseResult) -> Result<(), ResultRepositoryError> {
        let mut results = self.results()?;
        let taken = results.iter().any(|stored| {
            stored.student_id() == result.student_id() && stored.course_id() == result.course_id()
        });
        if taken {
            return Err(ResultRepositoryError::duplicate(format!(
                "student {} in course {}",
                result.student_id(),
                result.course_id()
            )));
        }
        results.push(result.clone());
        Ok(())
    }

    async fn update(&self, result: &CourseResult) -> Result<(), ResultRepositoryError> {
        let mut results = self.results()?;
        let stored = results
            .iter_mut()
            .find(|stored| stored.id() == result.id())
            .ok_or_else(|| ResultRepositoryError::query("result not found for update"))?;
        *stored = result.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: ResultId) -> Result<Option<CourseResult>, ResultRepositoryError> {
        Ok(self
            .results()?
            .iter()
            .find(|result| result.id() == id)
            .cloned())
    }

    async fn find_for_student_and_course(
        &self,
        student: UserId,
        course: CourseId,
    ) -> Result<Option<CourseResult>, ResultRepositoryError> {
        Ok(self
            .results()?
            .iter()
            .find(|result| result.student_id() == student && result.course_id() == course)
            .cloned())
    }

    async fn list_for_student(
        &self,
        student: UserId,
    ) -> Result<Vec<CourseResult>, ResultRepositoryError> {
        let mut results = self.matching(|result| result.student_id() == student)?;
        newest_first(&mut results);
        Ok(results)
    }

    async fn list_for_course(
        &self,
        course: CourseId,
    ) -> Result<Vec<CourseResult>, ResultRepositoryError> {
        let mut results = self.matching(|result| result.course_id() == course)?;
        results.sort_by_key(CourseResult::student_id);
        Ok(results)
    }

    async fn list_all(&self) -> Result<Vec<CourseResult>, ResultRepositoryError> {
        let mut results = self.matching(|_| true)?;
        newest_first(&mut results);
        Ok(results)
    }

    async fn delete(&self, id: ResultId) -> Result<bool, ResultRepositoryError> {
        Ok(self.remove(|result| result.id() == id)? > 0)
    }

    async fn delete_for_student(&self, student: UserId) -> Result<usize, ResultRepositoryError> {
        self.remove(|result| result.student_id() == student)
    }

    async fn delete_for_course(&self, course: CourseId) -> Result<usize, ResultRepositoryError> {
        self.remove(|result| result.course_id() == course)
    }

    /// Results always carry a date once recorded, so nothing needs filling.
    async fn backfill_missing_dates(
        &self,
        _now: DateTime<Utc>,
    ) -> Result<usize, ResultRepositoryError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ResultDraft, Score};
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn result(student: UserId, course: CourseId, day: u32) -> CourseResult {
        let date = Utc
            .with_ymd_and_hms(2024, 5, day, 9, 0, 0)
            .single()
            .expect("valid date");
        CourseResult::record(
            ResultId::random(),
            ResultDraft {
                student_id: student,
                course_id: course,
                score: Score::new(75).expect("score"),
                date_achieved: Some(date),
            },
            date,
        )
    }

    #[fixture]
    fn repo() -> MemoryResultRepository {
        MemoryResultRepository::new()
    }

    #[rstest]
    #[tokio::test]
    async fn one_result_per_student_and_course(repo: MemoryResultRepository) {
        let student = UserId::random();
        let course = CourseId::random();
        repo.insert(&result(student, course, 1))
            .await
            .expect("first insert");
        let error = repo
            .insert(&result(student, course, 2))
            .await
            .expect_err("duplicate");
        assert!(matches!(error, ResultRepositoryError::Duplicate { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn student_results_are_newest_first(repo: MemoryResultRepository) {
        let student = UserId::random();
        let older = result(student, CourseId::random(), 1);
        let newer = result(student, CourseId::random(), 20);
        repo.insert(&older).await.expect("insert older");
        repo.insert(&newer).await.expect("insert newer");

        let listed = repo.list_for_student(student).await.expect("list");
        let ids: Vec<_> = listed.iter().map(CourseResult::id).collect();
        assert_eq!(ids, vec![newer.id(), older.id()]);
    }

    #[rstest]
    #[tokio::test]
    async fn deleting_by_course_reports_count(repo: MemoryResultRepository) {
        let course = CourseId::random();
        repo.insert(&result(UserId::random(), course, 1))
            .await
            .expect("insert");
        repo.insert(&result(UserId::random(), course, 2))
            .await
            .expect("insert");
        repo.insert(&result(UserId::random(), CourseId::random(), 3))
            .await
            .expect("insert");

        assert_eq!(repo.delete_for_course(course).await.expect("delete"), 2);
        assert_eq!(repo.list_all().await.expect("list").len(), 1);
    }
}
