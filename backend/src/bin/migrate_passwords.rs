//! Re-hash accounts whose stored password is not an Argon2 hash.
//!
//! Older deployments kept plaintext passwords. The stored value is treated as
//! the password the user chose, hashed, and written back. Accounts that
//! already hold a hash are left untouched, so the tool is safe to rerun.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;

use clap::Parser;
use portal::domain::PlainPassword;
use portal::domain::ports::{PasswordHasher, UserRepository};
use portal::outbound::persistence::{
    DbPool, DieselUserRepository, PoolConfig, resolve_database_url,
};
use portal::outbound::security::Argon2PasswordHasher;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `migrate-passwords` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "migrate-passwords",
    about = "Hash legacy plaintext passwords in place",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct MigrationReport {
    migrated: usize,
    skipped: usize,
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt().with_env_filter(EnvFilter::from_default_env()).try_init() {
        eprintln!("tracing init failed: {error}");
    }
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

    let users = DieselUserRepository::new(pool);
    let report = migrate(&users, &Argon2PasswordHasher::new()).await?;
    println!(
        "migrated {} password(s), {} already hashed",
        report.migrated, report.skipped
    );
    Ok(())
}

async fn migrate(
    users: &dyn UserRepository,
    hasher: &dyn PasswordHasher,
) -> io::Result<MigrationReport> {
    let records = users
        .list_credentials()
        .await
        .map_err(|error| io::Error::other(format!("list credentials: {error}")))?;

    let mut report = MigrationReport::default();
    for record in records {
        if hasher.is_hashed(&record.password) {
            report.skipped += 1;
            continue;
        }
        let Ok(plain) = PlainPassword::new(record.password.as_str()) else {
            warn!(user_id = %record.id, "stored password is empty; skipping");
            report.skipped += 1;
            continue;
        };
        let hashed = hasher
            .hash(&plain)
            .map_err(|error| io::Error::other(format!("hash password for {}: {error}", record.id)))?;
        users
            .set_password(record.id, &hashed)
            .await
            .map_err(|error| io::Error::other(format!("store password for {}: {error}", record.id)))?;
        info!(user_id = %record.id, "password hashed");
        report.migrated += 1;
    }
    Ok(report)
}
