use std::fs;

use jobs::{JobType, Namespace, RepoName, TriggerType};
use tempfile::TempDir;

use super::*;

fn project(namespace: &str, repo: &str) -> ProjectHandle {
    ProjectHandle::new(
        Namespace::new(namespace).unwrap(),
        RepoName::new(repo).unwrap(),
        ForgeKind::Upstream,
    )
}

fn forge_with(namespace: &str, repo: &str, contents: &str) -> (TempDir, LocalForge) {
    let dir = TempDir::new().unwrap();
    let namespace_dir = dir.path().join(namespace);
    fs::create_dir_all(&namespace_dir).unwrap();
    fs::write(namespace_dir.join(format!("{repo}.json")), contents).unwrap();
    let forge = LocalForge::connect(ForgeKind::Upstream, dir.path()).unwrap();
    (dir, forge)
}

#[test]
fn test_connect_requires_existing_directory() {
    let dir = TempDir::new().unwrap();

    let err = LocalForge::connect(ForgeKind::Downstream, dir.path().join("missing")).unwrap_err();

    assert!(matches!(
        err,
        ForgeError::Connection {
            forge: ForgeKind::Downstream,
            ..
        }
    ));
}

#[tokio::test]
async fn test_fetch_package_config_reads_project_file() {
    let (_dir, forge) = forge_with(
        "packit",
        "ogr",
        r#"{ "jobs": [ { "job": "propose_downstream", "trigger": "release" } ] }"#,
    );

    let config = forge
        .fetch_package_config(&project("packit", "ogr"), &GitRef::new("0.5.0").unwrap())
        .await
        .unwrap();

    assert_eq!(config.jobs.len(), 1);
    assert_eq!(config.jobs[0].job, JobType::ProposeDownstream);
    assert_eq!(config.jobs[0].trigger, TriggerType::Release);
}

#[tokio::test]
async fn test_fetch_package_config_missing_file_is_not_found() {
    let (_dir, forge) = forge_with("packit", "ogr", "{}");

    let sandcastle = project("packit", "sandcastle");
    let err = forge
        .fetch_package_config(&sandcastle, &GitRef::new("main").unwrap())
        .await
        .unwrap_err();

    match err {
        ForgeError::ConfigNotFound { project, git_ref } => {
            assert_eq!(project, "packit/sandcastle");
            assert_eq!(git_ref, "main");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_package_config_rejects_invalid_json() {
    let (_dir, forge) = forge_with("packit", "ogr", r#"{ "jobs": [ { "job": "teleport" } ] }"#);

    let err = forge
        .fetch_package_config(&project("packit", "ogr"), &GitRef::new("main").unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, ForgeError::InvalidConfig { .. }));
}

#[tokio::test]
async fn test_tags_cannot_be_resolved_offline() {
    let (_dir, forge) = forge_with("packit", "ogr", "{}");

    let err = forge
        .sha_from_tag(&project("packit", "ogr"), "0.5.0")
        .await
        .unwrap_err();

    assert!(matches!(err, ForgeError::TagNotFound { ref tag, .. } if tag == "0.5.0"));
}

#[tokio::test]
async fn test_recording_api_hands_out_sequential_build_ids() {
    let dir = TempDir::new().unwrap();
    let api = RecordingPackagingApi::new(dir.path());
    let request = CoprBuildRequest {
        owner: "packit".into(),
        project: "packit-ogr".into(),
        committish: GitRef::new("0.5.0").unwrap(),
        clone_url: "https://github.com/packit/ogr.git".into(),
        chroots: vec!["fedora-rawhide-x86_64".into()],
    };
    let package = PackageConfig::default();
    let ogr = project("packit", "ogr");

    let first = api.run_copr_build(&package, &ogr, &request).await.unwrap();
    let second = api.run_copr_build(&package, &ogr, &request).await.unwrap();

    assert_eq!(first.build_id.as_u64(), 1);
    assert_eq!(second.build_id.as_u64(), 2);
    assert_eq!(first.info_url, "offline://copr/packit/packit-ogr/build/1");
}

fn python_ogr() -> ProjectHandle {
    ProjectHandle::new(
        Namespace::new("rpms").unwrap(),
        RepoName::new("python-ogr").unwrap(),
        ForgeKind::Downstream,
    )
}

#[tokio::test]
async fn test_upstream_url_is_read_from_spec_file() {
    let dir = TempDir::new().unwrap();
    let spec_dir = dir.path().join("rpms").join("python-ogr");
    fs::create_dir_all(&spec_dir).unwrap();
    fs::write(
        spec_dir.join("python-ogr.spec"),
        "Name: python-ogr\nVersion: 0.5.0\nURL: https://github.com/packit/ogr\n",
    )
    .unwrap();
    let api = RecordingPackagingApi::new(dir.path());
    let package = PackageConfig {
        downstream_package_name: Some("python-ogr".into()),
        upstream_project_url: Some("https://example.org/stale".into()),
        ..PackageConfig::default()
    };

    let url = api
        .upstream_url_from_spec(&package, &python_ogr())
        .await
        .unwrap();

    assert_eq!(url.as_deref(), Some("https://github.com/packit/ogr"));
}

#[tokio::test]
async fn test_spec_file_without_url_tag_yields_none() {
    let dir = TempDir::new().unwrap();
    let spec_dir = dir.path().join("rpms").join("python-ogr");
    fs::create_dir_all(&spec_dir).unwrap();
    fs::write(spec_dir.join("ogr.spec"), "Name: python-ogr\n").unwrap();
    let api = RecordingPackagingApi::new(dir.path());
    let package = PackageConfig {
        specfile_path: Some("ogr.spec".into()),
        upstream_project_url: Some("https://github.com/packit/ogr".into()),
        ..PackageConfig::default()
    };

    let url = api
        .upstream_url_from_spec(&package, &python_ogr())
        .await
        .unwrap();

    assert_eq!(url, None);
}

#[tokio::test]
async fn test_missing_spec_file_falls_back_to_configured_url() {
    let dir = TempDir::new().unwrap();
    let api = RecordingPackagingApi::new(dir.path());
    let mut package = PackageConfig::default();

    assert_eq!(
        api.upstream_url_from_spec(&package, &python_ogr())
            .await
            .unwrap(),
        None
    );

    package.specfile_path = Some("python-ogr.spec".into());
    package.upstream_project_url = Some("https://github.com/packit/ogr".into());
    assert_eq!(
        api.upstream_url_from_spec(&package, &python_ogr())
            .await
            .unwrap()
            .as_deref(),
        Some("https://github.com/packit/ogr")
    );
}
