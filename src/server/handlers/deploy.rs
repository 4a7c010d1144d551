//! Deploy handler
//!
//! Validates the request, assembles the immutable `DeployConfig`, runs
//! the publisher against the live GitHub/Vercel adapters and maps the
//! outcome onto the `{success, ...}` wire shape. Validation failures are
//! plain 4xx errors with no side effects; pipeline failures carry the
//! repository URL when the repository was already created (partial
//! success is reported, never masked).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::{error, info};

use crate::deploy::{
    DeployConfig, GithubClient, PublishError, Publisher, VercelClient,
};
use crate::server::error::{ApiError, ApiResult};
use crate::server::protocol::{DeployRequest, DeployResponse};
use crate::server::AppContext;

/// POST /api/deploy
pub async fn trigger_deploy(
    State(ctx): State<AppContext>,
    Json(request): Json<DeployRequest>,
) -> ApiResult<(StatusCode, Json<DeployResponse>)> {
    if request.github_token.trim().is_empty() {
        return Err(ApiError::bad_request("githubToken is required"));
    }
    let vercel_token = ctx
        .config
        .vercel_token
        .clone()
        .ok_or_else(|| ApiError::bad_request("server is missing VERCEL_TOKEN configuration"))?;

    let config = DeployConfig {
        name: request.config.name,
        description: request.config.description,
        repo_owner: request.config.repo_owner,
        repo_name: request.config.repo_name,
        project_name: request.config.project_name,
        credentials: DeployConfig::credentials_from_raw(&request.credentials),
    };
    config.validate().map_err(ApiError::bad_request)?;

    let github = GithubClient::new(request.github_token)
        .map_err(|e| ApiError::internal(format!("GitHub client setup failed: {}", e)))?;
    let vercel = VercelClient::new(vercel_token)
        .map_err(|e| ApiError::internal(format!("Vercel client setup failed: {}", e)))?;
    let publisher = Publisher::new(github, vercel)
        .with_polling(ctx.config.poll_interval, ctx.config.poll_attempts);

    match publisher.publish(&request.tree, &config).await {
        Ok(outcome) => {
            info!(
                "Deployed {} as {}",
                outcome.repository.full_name(),
                outcome.deployment_id
            );
            Ok((
                StatusCode::OK,
                Json(DeployResponse {
                    success: true,
                    repository_url: Some(outcome.repository.url),
                    deployment_url: outcome.deployment_url,
                    deployment_id: Some(outcome.deployment_id),
                    error: None,
                }),
            ))
        }
        Err(e) => {
            error!("Deploy pipeline failed: {}", e);
            let repository_url = e.repository().map(|r| r.url.clone());
            let status = failure_status(&e);
            Ok((status, Json(DeployResponse::failure(e.to_string(), repository_url))))
        }
    }
}

fn failure_status(error: &PublishError) -> StatusCode {
    match error {
        PublishError::InvalidConfig(_) => StatusCode::BAD_REQUEST,
        PublishError::Workspace(_) => StatusCode::INTERNAL_SERVER_ERROR,
        // Poll exhaustion is distinct from a hard remote failure: the
        // remote build may still complete after we stop watching.
        PublishError::PollTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        PublishError::CreateRepository(_)
        | PublishError::Push { .. }
        | PublishError::ResolveProject { .. }
        | PublishError::TriggerDeployment { .. }
        | PublishError::StatusFetch { .. }
        | PublishError::DeploymentFailed { .. } => StatusCode::BAD_GATEWAY,
    }
}
