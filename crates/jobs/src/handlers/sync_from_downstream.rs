use async_trait::async_trait;
use tracing::info;

use super::{JobContext, JobHandler};
use crate::{namespace_and_repo_from_url, JobError, JobType, TriggerType, DIST_GIT_COMMIT_TOPIC};

/// Carries commits pushed to a dist-git branch back to the upstream project.
///
/// The event names the downstream project; the upstream project is found
/// through the URL declared in the downstream spec file.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncFromDownstreamHandler;

#[async_trait]
impl JobHandler for SyncFromDownstreamHandler {
    fn job_type(&self) -> JobType {
        JobType::SyncFromDownstream
    }

    fn triggers(&self) -> &'static [TriggerType] {
        &[TriggerType::Commit]
    }

    fn topic(&self) -> Option<&'static str> {
        Some(DIST_GIT_COMMIT_TOPIC)
    }

    async fn run(&self, ctx: &JobContext<'_>) -> Result<(), JobError> {
        // Sync the branch head, not the pushed revision.
        let branch = ctx.require_str(&["msg", "commit", "branch"])?;

        let mut package = ctx.package_config.clone();
        package.upstream_project_url = ctx
            .api
            .upstream_url_from_spec(&package, ctx.project)
            .await?;
        let Some(url) = package.upstream_project_url.as_deref() else {
            return Err(JobError::configuration(
                "URL in specfile is not set; the upstream project location is unknown",
            ));
        };
        let (namespace, repo) = namespace_and_repo_from_url(url).ok_or_else(|| {
            JobError::configuration(format!("Cannot derive the upstream project from '{url}'"))
        })?;
        let upstream = ctx.upstream_forge()?.project(namespace, repo);

        info!(
            downstream = %ctx.project,
            %upstream,
            dist_git_branch = branch,
            upstream_branch = %ctx.config.upstream_branch,
            "Syncing downstream commits to upstream"
        );
        ctx.api
            .sync_from_downstream(&package, &upstream, branch, &ctx.config.upstream_branch)
            .await?;
        Ok(())
    }
}
