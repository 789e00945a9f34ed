use async_trait::async_trait;
use tracing::{info, warn};

use super::{JobContext, JobHandler};
use crate::config::{metadata_keys, DEFAULT_COPR_OWNER};
use crate::{
    CommentTarget, CoprBuild, CoprBuildRequest, GitRef, JobError, JobType, Namespace,
    PullRequestNumber, RepoName, TriggerType,
};

/// Submits a Copr build for a release or a pull request and reports it back.
///
/// Release builds are reported on the tagged commit. Pull-request builds are
/// reported on the pull request itself, which lives in the base repository,
/// not in the head fork the event was classified against.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoprBuildHandler;

#[async_trait]
impl JobHandler for CoprBuildHandler {
    fn job_type(&self) -> JobType {
        JobType::CoprBuild
    }

    fn triggers(&self) -> &'static [TriggerType] {
        &[TriggerType::PullRequest, TriggerType::Release]
    }

    async fn run(&self, ctx: &JobContext<'_>) -> Result<(), JobError> {
        match ctx.trigger {
            TriggerType::PullRequest => handle_pull_request(ctx).await,
            TriggerType::Release => handle_release(ctx).await,
            TriggerType::Commit => {
                warn!(project = %ctx.project, "Copr builds are not run for commit triggers");
                Ok(())
            }
        }
    }
}

async fn handle_release(ctx: &JobContext<'_>) -> Result<(), JobError> {
    let clone_url = ctx.require_str(&["repository", "clone_url"])?;
    let tag = ctx.require_str(&["release", "tag_name"])?;
    let upstream = ctx.upstream_forge()?;

    let committish = git_ref(tag, &["release", "tag_name"])?;
    let build = submit(ctx, committish, clone_url).await?;

    let body = format!(
        "Copr build (ID {}) triggered\nMore info: {}",
        build.build_id, build.info_url
    );
    let sha = upstream.sha_from_tag(ctx.project, tag).await?;
    upstream
        .post_comment(ctx.project, &CommentTarget::Commit(sha), &body)
        .await?;
    Ok(())
}

async fn handle_pull_request(ctx: &JobContext<'_>) -> Result<(), JobError> {
    let clone_url = ctx.require_str(&["pull_request", "head", "repo", "clone_url"])?;
    let head_sha = ctx.require_str(&["pull_request", "head", "sha"])?;
    let pr = PullRequestNumber::new(ctx.require_u64(&["number"])?);
    let base_namespace = ctx.require_str(&["pull_request", "base", "repo", "owner", "login"])?;
    let base_repo = ctx.require_str(&["pull_request", "base", "repo", "name"])?;
    let upstream = ctx.upstream_forge()?;
    let base_project = match (Namespace::new(base_namespace), RepoName::new(base_repo)) {
        (Some(namespace), Some(repo)) => upstream.project(namespace, repo),
        _ => return Err(JobError::missing_field(&["pull_request", "base", "repo"])),
    };

    let committish = git_ref(head_sha, &["pull_request", "head", "sha"])?;
    let build = submit(ctx, committish, clone_url).await?;

    let body = format!(
        "Triggered copr build (ID:{}).\nMore info: {}",
        build.build_id, build.info_url
    );
    info!(%base_project, %pr, build_id = %build.build_id, "Reporting copr build on pull request");
    upstream
        .post_comment(&base_project, &CommentTarget::PullRequest(pr), &body)
        .await?;
    Ok(())
}

/// Builds the request from job metadata and submits it.
async fn submit(
    ctx: &JobContext<'_>,
    committish: GitRef,
    clone_url: &str,
) -> Result<CoprBuild, JobError> {
    let chroots = ctx.job.metadata_list(metadata_keys::TARGETS);
    if chroots.is_empty() {
        return Err(JobError::configuration(
            "'targets' value is required in package config for copr_build job",
        ));
    }

    let request = CoprBuildRequest {
        owner: ctx
            .job
            .metadata_str(metadata_keys::OWNER)
            .unwrap_or(DEFAULT_COPR_OWNER)
            .to_string(),
        project: ctx
            .job
            .metadata_str(metadata_keys::PROJECT)
            .map_or_else(|| ctx.project.default_copr_project(), str::to_string),
        committish,
        clone_url: clone_url.to_string(),
        chroots,
    };

    info!(
        owner = %request.owner,
        copr_project = %request.project,
        committish = %request.committish,
        "Submitting copr build"
    );
    let build = ctx
        .api
        .run_copr_build(ctx.package_config, ctx.project, &request)
        .await?;
    info!(build_id = %build.build_id, info_url = %build.info_url, "Copr build submitted");
    Ok(build)
}

fn git_ref(value: &str, path: &[&str]) -> Result<GitRef, JobError> {
    GitRef::new(value).ok_or_else(|| JobError::missing_field(path))
}
