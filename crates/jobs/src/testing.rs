//! Recording fakes for the collaborator ports.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::{
    BuildId, CommentTarget, CommitSha, CoprBuild, CoprBuildRequest, Dispatcher, ForgeError,
    ForgeKind, GitForge, GitRef, HandlerRegistry, JobContext, JobError, JobHandler, JobType,
    LazyForge, PackageConfig, PackagingApi, PackagingError, ProjectHandle, PullRequestNumber,
    RawEvent, ServiceConfig, TriggerType, DIST_GIT_COMMIT_TOPIC,
};

// ---------------------------------------------------------------------------
// Forge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ForgeCall {
    FetchConfig { project: String, git_ref: String },
    ShaFromTag { project: String, tag: String },
    Comment {
        project: String,
        target: CommentTarget,
        body: String,
    },
}

pub struct FakeForge {
    kind: ForgeKind,
    configs: HashMap<String, PackageConfig>,
    pub calls: Mutex<Vec<ForgeCall>>,
}

fn path(project: &ProjectHandle) -> String {
    format!("{}/{}", project.namespace, project.repo)
}

impl FakeForge {
    pub fn new(kind: ForgeKind) -> Self {
        Self {
            kind,
            configs: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serves `config` for the project at `namespace/repo`, at any ref.
    pub fn with_config(mut self, project: &str, config: PackageConfig) -> Self {
        self.configs.insert(project.to_string(), config);
        self
    }

    pub fn calls(&self) -> Vec<ForgeCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GitForge for FakeForge {
    fn kind(&self) -> ForgeKind {
        self.kind
    }

    async fn fetch_package_config(
        &self,
        project: &ProjectHandle,
        git_ref: &GitRef,
    ) -> Result<PackageConfig, ForgeError> {
        self.calls.lock().unwrap().push(ForgeCall::FetchConfig {
            project: path(project),
            git_ref: git_ref.to_string(),
        });
        self.configs
            .get(&path(project))
            .cloned()
            .ok_or_else(|| ForgeError::ConfigNotFound {
                project: path(project),
                git_ref: git_ref.to_string(),
            })
    }

    async fn sha_from_tag(
        &self,
        project: &ProjectHandle,
        tag: &str,
    ) -> Result<CommitSha, ForgeError> {
        self.calls.lock().unwrap().push(ForgeCall::ShaFromTag {
            project: path(project),
            tag: tag.to_string(),
        });
        Ok(CommitSha::new(format!("sha-of-{tag}")).unwrap())
    }

    async fn post_comment(
        &self,
        project: &ProjectHandle,
        target: &CommentTarget,
        body: &str,
    ) -> Result<(), ForgeError> {
        self.calls.lock().unwrap().push(ForgeCall::Comment {
            project: path(project),
            target: target.clone(),
            body: body.to_string(),
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Packaging API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    SyncFromDownstream {
        upstream: String,
        dist_git_branch: String,
        upstream_branch: String,
        upstream_url: Option<String>,
    },
    SyncPr {
        project: String,
        pr: u64,
        dist_git_branch: String,
    },
    SyncRelease {
        project: String,
        dist_git_branch: String,
        version: String,
    },
    CoprBuild(CoprBuildRequest),
}

#[derive(Default)]
pub struct FakePackagingApi {
    pub spec_url: Option<String>,
    pub fail_builds: bool,
    pub calls: Mutex<Vec<ApiCall>>,
}

impl FakePackagingApi {
    pub fn with_spec_url(url: &str) -> Self {
        Self {
            spec_url: Some(url.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackagingApi for FakePackagingApi {
    async fn upstream_url_from_spec(
        &self,
        _package: &PackageConfig,
        _downstream: &ProjectHandle,
    ) -> Result<Option<String>, PackagingError> {
        Ok(self.spec_url.clone())
    }

    async fn sync_from_downstream(
        &self,
        package: &PackageConfig,
        upstream: &ProjectHandle,
        dist_git_branch: &str,
        upstream_branch: &str,
    ) -> Result<(), PackagingError> {
        self.calls.lock().unwrap().push(ApiCall::SyncFromDownstream {
            upstream: path(upstream),
            dist_git_branch: dist_git_branch.to_string(),
            upstream_branch: upstream_branch.to_string(),
            upstream_url: package.upstream_project_url.clone(),
        });
        Ok(())
    }

    async fn sync_pr(
        &self,
        _package: &PackageConfig,
        upstream: &ProjectHandle,
        pr: PullRequestNumber,
        dist_git_branch: &str,
    ) -> Result<(), PackagingError> {
        self.calls.lock().unwrap().push(ApiCall::SyncPr {
            project: path(upstream),
            pr: pr.as_u64(),
            dist_git_branch: dist_git_branch.to_string(),
        });
        Ok(())
    }

    async fn sync_release(
        &self,
        _package: &PackageConfig,
        upstream: &ProjectHandle,
        dist_git_branch: &str,
        version: &str,
    ) -> Result<(), PackagingError> {
        self.calls.lock().unwrap().push(ApiCall::SyncRelease {
            project: path(upstream),
            dist_git_branch: dist_git_branch.to_string(),
            version: version.to_string(),
        });
        Ok(())
    }

    async fn run_copr_build(
        &self,
        _package: &PackageConfig,
        _project: &ProjectHandle,
        request: &CoprBuildRequest,
    ) -> Result<CoprBuild, PackagingError> {
        self.calls
            .lock()
            .unwrap()
            .push(ApiCall::CoprBuild(request.clone()));
        if self.fail_builds {
            return Err(PackagingError::BuildFailed {
                message: "copr is down".into(),
            });
        }
        Ok(CoprBuild {
            build_id: BuildId::new(1234),
            info_url: "https://copr.example/build/1234".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Spy handler
// ---------------------------------------------------------------------------

/// Records `"{job_type}"` into a shared log each time it runs.
pub struct SpyHandler {
    pub job: JobType,
    pub triggers: &'static [TriggerType],
    pub topic: Option<&'static str>,
    pub fail: bool,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl SpyHandler {
    pub fn new(
        job: JobType,
        triggers: &'static [TriggerType],
        log: &Arc<Mutex<Vec<String>>>,
    ) -> Self {
        Self {
            job,
            triggers,
            topic: None,
            fail: false,
            log: Arc::clone(log),
        }
    }
}

#[async_trait]
impl JobHandler for SpyHandler {
    fn job_type(&self) -> JobType {
        self.job
    }

    fn triggers(&self) -> &'static [TriggerType] {
        self.triggers
    }

    fn topic(&self) -> Option<&'static str> {
        self.topic
    }

    async fn run(&self, _ctx: &JobContext<'_>) -> Result<(), JobError> {
        self.log.lock().unwrap().push(self.job.to_string());
        if self.fail {
            return Err(JobError::Configuration {
                message: format!("{} failed", self.job),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub fn dispatcher(
    registry: HandlerRegistry,
    upstream: Arc<FakeForge>,
    downstream: Arc<FakeForge>,
    api: Arc<FakePackagingApi>,
) -> Dispatcher {
    Dispatcher::new(
        ServiceConfig::default(),
        Arc::new(registry),
        LazyForge::ready(upstream),
        LazyForge::ready(downstream),
        api,
    )
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

pub fn release_event() -> RawEvent {
    RawEvent::new(json!({
        "action": "published",
        "release": { "tag_name": "0.5.0", "name": "0.5.0" },
        "repository": {
            "name": "ogr",
            "full_name": "packit/ogr",
            "owner": { "login": "packit" },
            "html_url": "https://github.com/packit/ogr",
            "clone_url": "https://github.com/packit/ogr.git"
        }
    }))
}

pub fn pull_request_event(action: &str) -> RawEvent {
    RawEvent::new(json!({
        "action": action,
        "number": 342,
        "pull_request": {
            "number": 342,
            "head": {
                "ref": "fix-typo",
                "sha": "528b803be6f93e19ca4130bf4976f2800a3004c4",
                "repo": {
                    "name": "ogr",
                    "owner": { "login": "contributor" },
                    "clone_url": "https://github.com/contributor/ogr.git"
                }
            },
            "base": {
                "ref": "master",
                "repo": { "name": "ogr", "owner": { "login": "packit" } }
            }
        },
        "repository": {
            "full_name": "packit/ogr",
            "html_url": "https://github.com/packit/ogr"
        }
    }))
}

pub fn dist_git_commit_event() -> RawEvent {
    RawEvent::new(json!({
        "topic": DIST_GIT_COMMIT_TOPIC,
        "msg_id": "2019-a5034b55-339d-4fa5-a72b-db74579aeb5a",
        "msg": {
            "commit": {
                "namespace": "rpms",
                "repo": "python-ogr",
                "branch": "f30",
                "rev": "f8ad3bcd0a1e"
            }
        }
    }))
}
