use async_trait::async_trait;
use tracing::info;

use super::{JobContext, JobHandler};
use crate::{JobError, JobType, TriggerType};

/// Proposes a published upstream release as an update of the dist-git package.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProposeDownstreamHandler;

#[async_trait]
impl JobHandler for ProposeDownstreamHandler {
    fn job_type(&self) -> JobType {
        JobType::ProposeDownstream
    }

    fn triggers(&self) -> &'static [TriggerType] {
        &[TriggerType::Release]
    }

    async fn run(&self, ctx: &JobContext<'_>) -> Result<(), JobError> {
        let version = ctx.require_str(&["release", "tag_name"])?;
        let dist_git_branch = ctx.job.dist_git_branch();

        info!(project = %ctx.project, version, dist_git_branch, "Proposing release downstream");
        ctx.api
            .sync_release(ctx.package_config, ctx.project, dist_git_branch, version)
            .await?;
        Ok(())
    }
}
