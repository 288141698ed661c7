//! Exercise a running portal: welcome, registration, login and profile.
//!
//! Each run registers a fresh student with a random email, so the target
//! database accumulates one throwaway account per invocation.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::time::Duration;

use clap::Parser;
use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::{Client, Response, Url};
use serde_json::{Value, json};
use tokio::runtime::Builder;
use uuid::Uuid;

const SESSION_COOKIE: &str = "session";

/// `api-smoke` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "api-smoke",
    about = "Smoke-test a running portal over HTTP",
    version
)]
struct CliArgs {
    /// Base URL of the running server.
    #[arg(long = "base-url", value_name = "url", default_value = "http://localhost:5000")]
    base_url: Url,
    /// Request timeout in seconds.
    #[arg(long = "timeout-secs", value_name = "seconds", default_value_t = 10)]
    timeout_secs: u64,
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
    let client = Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .map_err(|error| io::Error::other(format!("build HTTP client: {error}")))?;
    let base = args.base_url;

    let welcome = client
        .get(endpoint(&base, "api")?)
        .send()
        .await
        .map_err(transport)?;
    report("GET /api", welcome).await?;

    let email = format!("smoke-{}@example.com", Uuid::new_v4().simple());
    let password = "smoke-secret";
    let registered = client
        .post(endpoint(&base, "api/users/register")?)
        .json(&json!({
            "name": "Smoke Test",
            "email": email,
            "password": password,
            "studentId": "SMOKE001",
            "department": "Computing",
            "semester": 1,
        }))
        .send()
        .await
        .map_err(transport)?;
    report("POST /api/users/register", registered).await?;

    let logged_in = client
        .post(endpoint(&base, "api/users/login")?)
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .map_err(transport)?;
    let cookie = session_cookie(logged_in.headers());
    report("POST /api/users/login", logged_in).await?;

    let Some(cookie) = cookie else {
        return Err(io::Error::other("login did not return a session cookie"));
    };
    let profile = client
        .get(endpoint(&base, "api/users/profile")?)
        .header(COOKIE, cookie)
        .send()
        .await
        .map_err(transport)?;
    report("GET /api/users/profile", profile).await
}

fn endpoint(base: &Url, path: &str) -> io::Result<Url> {
    let mut root = base.clone();
    if !root.path().ends_with('/') {
        let with_slash = format!("{}/", root.path());
        root.set_path(&with_slash);
    }
    root.join(path).map_err(|error| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid endpoint {path}: {error}"),
        )
    })
}

/// Extract `session=<value>` from the response's `Set-Cookie` headers.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .find(|pair| {
            pair.split_once('=')
                .is_some_and(|(name, value)| name == SESSION_COOKIE && !value.is_empty())
        })
        .map(str::to_owned)
}

async fn report(label: &str, response: Response) -> io::Result<()> {
    let status = response.status();
    let body: Value = response.json().await.map_err(transport)?;
    println!("{label} -> {status}");
    println!(
        "{}",
        serde_json::to_string_pretty(&body).map_err(io::Error::other)?
    );
    if status.is_success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{label} failed with {status}")))
    }
}

fn transport(error: reqwest::Error) -> io::Error {
    io::Error::other(format!("request failed: {error}"))
}
