use async_trait::async_trait;
use tracing::info;

use super::{JobContext, JobHandler};
use crate::{JobError, JobType, PullRequestNumber, TriggerType};

/// Checks an upstream pull request against its downstream dist-git branch.
#[derive(Debug, Default, Clone, Copy)]
pub struct CheckDownstreamHandler;

#[async_trait]
impl JobHandler for CheckDownstreamHandler {
    fn job_type(&self) -> JobType {
        JobType::CheckDownstream
    }

    fn triggers(&self) -> &'static [TriggerType] {
        &[TriggerType::PullRequest]
    }

    async fn run(&self, ctx: &JobContext<'_>) -> Result<(), JobError> {
        let pr = PullRequestNumber::new(ctx.require_u64(&["number"])?);
        let dist_git_branch = ctx.job.dist_git_branch();

        info!(project = %ctx.project, %pr, dist_git_branch, "Checking pull request downstream");
        ctx.api
            .sync_pr(ctx.package_config, ctx.project, pr, dist_git_branch)
            .await?;
        Ok(())
    }
}
