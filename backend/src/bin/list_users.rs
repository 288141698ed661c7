//! Print every account with its role and student details.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io::{self, Write};

use clap::Parser;
use portal::domain::User;
use portal::domain::ports::UserRepository;
use portal::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, resolve_database_url,
};
use tokio::runtime::Builder;

const NOT_AVAILABLE: &str = "N/A";

/// `list-users` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "list-users", about = "List registered users", version)]
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

    let users = DieselUserRepository::new(pool)
        .list()
        .await
        .map_err(|error| io::Error::other(format!("list users: {error}")))?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{} user(s)", users.len())?;
    for user in &users {
        writeln!(stdout, "{}", render(user))?;
    }
    Ok(())
}

fn render(user: &User) -> String {
    let student_id = user.student_id().map_or(NOT_AVAILABLE, |id| id.as_ref());
    let department = user.department().map_or(NOT_AVAILABLE, |dept| dept.as_ref());
    let semester = user
        .semester()
        .map_or_else(|| NOT_AVAILABLE.to_owned(), |semester| semester.value().to_string());
    format!(
        "{} <{}> role={} student_id={student_id} department={department} semester={semester}",
        user.name(),
        user.email(),
        user.role(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal::domain::{
        Department, EmailAddress, PersonName, Role, Semester, StudentNumber, UserDraft, UserId,
    };
    use rstest::rstest;

    fn user(role: Role, student: bool) -> User {
        User::from_draft(
            UserId::random(),
            UserDraft {
                name: PersonName::new("Ada Lovelace").expect("name"),
                email: EmailAddress::new("ada@example.com").expect("email"),
                role,
                student_id: student.then(|| StudentNumber::new("CS2023001").expect("number")),
                department: student.then(|| Department::new("Computing").expect("department")),
                semester: student.then(|| Semester::new(3).expect("semester")),
            },
        )
    }

    #[rstest]
    fn renders_student_details() {
        assert_eq!(
            render(&user(Role::Student, true)),
            "Ada Lovelace <ada@example.com> role=student student_id=CS2023001 \
             department=Computing semester=3"
        );
    }

    #[rstest]
    fn absent_fields_render_as_not_available() {
        assert_eq!(
            render(&user(Role::Admin, false)),
            "Ada Lovelace <ada@example.com> role=admin student_id=N/A department=N/A semester=N/A"
        );
    }
}
