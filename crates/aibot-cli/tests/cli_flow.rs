//! End-to-end command runs against a temporary database file.

use aibot_cli::{Cli, CliError, run};
use aibot_core::CancellationToken;
use clap::Parser;

fn bcrypt() -> String {
    format!("$2b$12${}", "c".repeat(53))
}

async fn aibot(url: &str, args: &[&str]) -> Result<(), CliError> {
    let mut argv = vec!["aibot", "--database-url", url];
    argv.extend_from_slice(args);
    run(Cli::parse_from(argv), CancellationToken::new()).await
}

#[tokio::test]
async fn user_and_like_round() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("flow.db").display());
    let hash = bcrypt();

    aibot(&url, &["init"]).await.unwrap();
    aibot(
        &url,
        &[
            "user",
            "add",
            "--name",
            "ferris",
            "--email",
            "ferris@rust.dev",
            "--bcrypt",
            hash.as_str(),
        ],
    )
    .await
    .unwrap();

    let duplicate = aibot(
        &url,
        &[
            "user",
            "add",
            "--name",
            "ferris",
            "--email",
            "other@rust.dev",
            "--bcrypt",
            hash.as_str(),
        ],
    )
    .await
    .unwrap_err();
    assert_eq!(duplicate.exit_code(), 65);

    aibot(&url, &["user", "show", "ferris"]).await.unwrap();
    aibot(&url, &["user", "show", "1"]).await.unwrap();
    aibot(&url, &["user", "questions", "1", "--by-modify-time"])
        .await
        .unwrap();

    let missing = aibot(&url, &["question", "show", "1"]).await.unwrap_err();
    assert_eq!(missing.exit_code(), 66);

    let no_target = aibot(&url, &["like", "question", "1", "5"])
        .await
        .unwrap_err();
    assert_eq!(no_target.to_string(), "question with qid=5 does not exist");

    aibot(&url, &["user", "delete", "1"]).await.unwrap();
    let gone = aibot(&url, &["user", "show", "ferris"]).await.unwrap_err();
    assert_eq!(gone.exit_code(), 66);
}

#[tokio::test]
async fn rejects_bad_auth_and_lengths() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("flow.db").display());
    let hash = bcrypt();

    let bad_auth = aibot(
        &url,
        &[
            "user",
            "add",
            "--name",
            "n",
            "--email",
            "n@x.io",
            "--bcrypt",
            hash.as_str(),
            "--auth",
            "none",
        ],
    )
    .await
    .unwrap_err();
    assert_eq!(bad_auth.exit_code(), 2);

    let short_hash = aibot(
        &url,
        &["user", "add", "--name", "n", "--email", "n@x.io", "--bcrypt", "short"],
    )
    .await
    .unwrap_err();
    assert_eq!(short_hash.exit_code(), 2);
}

#[tokio::test]
async fn cancelled_run_reports_interrupt() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("flow.db").display());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let cli = Cli::parse_from(["aibot", "--database-url", url.as_str(), "user", "show", "1"]);
    let err = run(cli, cancel).await.unwrap_err();
    assert_eq!(err.exit_code(), 130);
}
