//! Stamp the current time onto results recorded without an achievement date.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;

use clap::Parser;
use mockable::{Clock, DefaultClock};
use portal::domain::ports::ResultRepository;
use portal::outbound::persistence::{
    DbPool, DieselResultRepository, PoolConfig, resolve_database_url,
};
use tokio::runtime::Builder;

/// `backfill-result-dates` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "backfill-result-dates",
    about = "Fill in missing result achievement dates",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let database_url = resolve_database_url(args.database_url)?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let results = DieselResultRepository::new(pool);
    let updated = backfill(&results, &DefaultClock).await?;
    println!("{}", summary(updated));
    Ok(())
}

async fn backfill(results: &dyn ResultRepository, clock: &dyn Clock) -> io::Result<usize> {
    results
        .backfill_missing_dates(clock.utc())
        .await
        .map_err(|error| io::Error::other(format!("backfill result dates: {error}")))
}

fn summary(updated: usize) -> String {
    match updated {
        0 => "all results already have an achievement date".to_owned(),
        1 => "updated 1 result".to_owned(),
        n => format!("updated {n} results"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use mockable::MockClock;
    use mockall::mock;
    use portal::domain::ports::ResultRepositoryError;
    use portal::domain::{CourseId, CourseResult, ResultId, UserId};
    use portal::outbound::memory::MemoryResultRepository;
    use rstest::{fixture, rstest};

    mock! {
        Results {}

        #[async_trait]
        impl ResultRepository for Results {
            async fn insert(&self, result: &CourseResult) -> Result<(), ResultRepositoryError>;
            async fn update(&self, result: &CourseResult) -> Result<(), ResultRepositoryError>;
            async fn find_by_id(
                &self,
                id: ResultId,
            ) -> Result<Option<CourseResult>, ResultRepositoryError>;
            async fn find_for_student_and_course(
                &self,
                student: UserId,
                course: CourseId,
            ) -> Result<Option<CourseResult>, ResultRepositoryError>;
            async fn list_for_student(
                &self,
                student: UserId,
            ) -> Result<Vec<CourseResult>, ResultRepositoryError>;
            async fn list_for_course(
                &self,
                course: CourseId,
            ) -> Result<Vec<CourseResult>, ResultRepositoryError>;
            async fn list_all(&self) -> Result<Vec<CourseResult>, ResultRepositoryError>;
            async fn delete(&self, id: ResultId) -> Result<bool, ResultRepositoryError>;
            async fn delete_for_student(
                &self,
                student: UserId,
            ) -> Result<usize, ResultRepositoryError>;
            async fn delete_for_course(
                &self,
                course: CourseId,
            ) -> Result<usize, ResultRepositoryError>;
            async fn backfill_missing_dates(
                &self,
                now: DateTime<Utc>,
            ) -> Result<usize, ResultRepositoryError>;
        }
    }

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn clock_at(now: DateTime<Utc>) -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_utc().times(1).return_const(now);
        clock
    }

    #[rstest]
    #[case(0, "all results already have an achievement date")]
    #[case(1, "updated 1 result")]
    #[case(12, "updated 12 results")]
    fn summary_reads_naturally(#[case] updated: usize, #[case] expected: &str) {
        assert_eq!(summary(updated), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn results_that_always_carry_dates_need_no_backfill(now: DateTime<Utc>) {
        let results = MemoryResultRepository::new();
        let updated = backfill(&results, &clock_at(now)).await.expect("backfill");
        assert_eq!(updated, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn undated_results_are_stamped_with_the_clock_time(now: DateTime<Utc>) {
        let mut results = MockResults::new();
        results
            .expect_backfill_missing_dates()
            .withf(move |stamp| *stamp == now)
            .times(1)
            .return_once(|_| Ok(3));

        let updated = backfill(&results, &clock_at(now)).await.expect("backfill");
        assert_eq!(updated, 3);
        assert_eq!(summary(updated), "updated 3 results");
    }

    #[rstest]
    #[tokio::test]
    async fn repository_failures_are_reported(now: DateTime<Utc>) {
        let mut results = MockResults::new();
        results
            .expect_backfill_missing_dates()
            .return_once(|_| Err(ResultRepositoryError::connection("refused")));

        let error = backfill(&results, &clock_at(now))
            .await
            .expect_err("backfill fails");
        assert!(error.to_string().starts_with("backfill result dates:"));
    }
}
