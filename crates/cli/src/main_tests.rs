use std::fs;

use clap::CommandFactory;
use tempfile::TempDir;

use super::*;

fn cli(config_dir: &Path) -> Cli {
    Cli {
        events: None,
        config_dir: config_dir.to_path_buf(),
        upstream_branch: DEFAULT_UPSTREAM_BRANCH.to_string(),
        log_format: LogFormat::Pretty,
        otlp_endpoint: None,
    }
}

fn write_config(
    root: &Path,
    forge: &str,
    namespace: &str,
    repo: &str,
    config: serde_json::Value,
) {
    let dir = root.join(forge).join(namespace);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{repo}.json")), config.to_string()).unwrap();
}

fn dist_git_commit_line(repo: &str) -> String {
    serde_json::json!({
        "topic": jobs::DIST_GIT_COMMIT_TOPIC,
        "msg_id": "2019-1a2b3c",
        "msg": {
            "commit": { "repo": repo, "namespace": "rpms", "branch": "f30" }
        }
    })
    .to_string()
}

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_cli_defaults() {
    let cli = Cli::try_parse_from(["steve"]).unwrap();
    assert_eq!(cli.events, None);
    assert_eq!(cli.log_format, LogFormat::Pretty);
    assert_eq!(cli.upstream_branch, DEFAULT_UPSTREAM_BRANCH);
}

#[tokio::test]
async fn test_replay_counts_failures_per_event() {
    let dir = TempDir::new().unwrap();
    write_config(
        dir.path(),
        "downstream",
        "rpms",
        "python-ogr",
        serde_json::json!({
            "upstream_project_url": "https://github.com/packit/ogr",
            "jobs": [ { "job": "sync_from_downstream", "trigger": "commit" } ]
        }),
    );
    fs::create_dir_all(dir.path().join("upstream")).unwrap();
    let dispatcher = build_dispatcher(&cli(dir.path())).unwrap();
    let input = [
        dist_git_commit_line("python-ogr"),
        // No configuration for this package.
        dist_git_commit_line("python-sandcastle"),
    ]
    .join("\n");

    let summary = replay(input.as_bytes(), &dispatcher).await.unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_missing_forge_directory_fails_only_events_that_need_it() {
    let dir = TempDir::new().unwrap();
    // Only the downstream forge exists.
    write_config(
        dir.path(),
        "downstream",
        "rpms",
        "python-ogr",
        serde_json::json!({ "jobs": [] }),
    );
    let dispatcher = build_dispatcher(&cli(dir.path())).unwrap();
    let release = serde_json::json!({
        "action": "published",
        "release": { "tag_name": "0.5.0" },
        "repository": { "name": "ogr", "owner": { "login": "packit" } }
    })
    .to_string();
    let input = [dist_git_commit_line("python-ogr"), release].join("\n");

    let summary = replay(input.as_bytes(), &dispatcher).await.unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);
}

#[tokio::test]
async fn test_release_job_runs_without_downstream_directory() {
    let dir = TempDir::new().unwrap();
    write_config(
        dir.path(),
        "upstream",
        "packit",
        "ogr",
        serde_json::json!({
            "jobs": [ { "job": "propose_downstream", "trigger": "release" } ]
        }),
    );
    let dispatcher = build_dispatcher(&cli(dir.path())).unwrap();
    let release = jobs::RawEvent::new(serde_json::json!({
        "action": "published",
        "release": { "tag_name": "0.5.0" },
        "repository": {
            "name": "ogr",
            "owner": { "login": "packit" },
            "html_url": "https://github.com/packit/ogr"
        }
    }));

    dispatcher.process_message(&release, None).await.unwrap();
}
