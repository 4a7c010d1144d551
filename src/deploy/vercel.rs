//! Vercel adapter for the `DeployHost` port
//!
//! Project resolution is lookup-then-create; deployments are triggered
//! from the linked repository's default branch against the production
//! target, then observed through the status endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::deploy::hosts::{
    DeployHost, DeployProject, Deployment, DeploymentStatus, HostError, Repository,
};

const API_BASE: &str = "https://api.vercel.com";

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    ready_state: Option<String>,
}

impl DeploymentResponse {
    fn into_deployment(self) -> Deployment {
        let status = match self.ready_state.as_deref() {
            Some("READY") => DeploymentStatus::Ready,
            Some("ERROR") | Some("CANCELED") => DeploymentStatus::Error,
            // QUEUED, BUILDING, INITIALIZING and anything newer count as
            // still in flight.
            _ => DeploymentStatus::Pending,
        };
        let url = match status {
            DeploymentStatus::Ready => self.url.map(|u| format!("https://{}", u)),
            _ => None,
        };
        Deployment {
            id: self.id,
            url,
            status,
        }
    }
}

/// Live Vercel client authenticated with the server-side token.
pub struct VercelClient {
    client: Client,
    token: String,
    base: String,
}

impl VercelClient {
    pub fn new(token: String) -> Result<Self, HostError> {
        Self::with_base(token, API_BASE.to_string())
    }

    /// Base-URL override for tests.
    pub fn with_base(token: String, base: String) -> Result<Self, HostError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            token,
            base,
        })
    }

    async fn api_failure(response: reqwest::Response, context: &str) -> HostError {
        let status = response.status();
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(|m| m.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| format!("HTTP {}", status));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HostError::Auth(message),
            StatusCode::CONFLICT => HostError::Conflict(format!("{}: {}", context, message)),
            _ => HostError::Api(format!("{}: {}", context, message)),
        }
    }
}

#[async_trait]
impl DeployHost for VercelClient {
    async fn resolve_project(
        &self,
        name: &str,
        repo: &Repository,
    ) -> Result<DeployProject, HostError> {
        let lookup_url = format!("{}/v9/projects/{}", self.base, name);
        let response = self
            .client
            .get(&lookup_url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let project: ProjectResponse = response.json().await?;
                info!("Using existing project {}", project.name);
                return Ok(DeployProject {
                    id: project.id,
                    name: project.name,
                });
            }
            StatusCode::NOT_FOUND => {}
            _ => return Err(Self::api_failure(response, "project lookup").await),
        }

        let create_url = format!("{}/v10/projects", self.base);
        let response = self
            .client
            .post(&create_url)
            .bearer_auth(&self.token)
            .json(&json!({
                "name": name,
                "gitRepository": {
                    "type": "github",
                    "repo": repo.full_name(),
                },
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_failure(response, "project creation").await);
        }
        let project: ProjectResponse = response.json().await?;
        info!("Created project {} bound to {}", project.name, repo.full_name());
        Ok(DeployProject {
            id: project.id,
            name: project.name,
        })
    }

    async fn trigger_deployment(
        &self,
        project: &DeployProject,
        repo: &Repository,
    ) -> Result<Deployment, HostError> {
        let url = format!("{}/v13/deployments", self.base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({
                "name": project.name,
                "project": project.id,
                "target": "production",
                "gitSource": {
                    "type": "github",
                    "org": repo.owner,
                    "repo": repo.name,
                    "ref": repo.default_branch,
                },
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_failure(response, "deployment trigger").await);
        }
        let deployment: DeploymentResponse = response.json().await?;
        Ok(deployment.into_deployment())
    }

    async fn deployment_status(&self, deployment_id: &str) -> Result<Deployment, HostError> {
        let url = format!("{}/v13/deployments/{}", self.base, deployment_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_failure(response, "deployment status").await);
        }
        let deployment: DeploymentResponse = response.json().await?;
        Ok(deployment.into_deployment())
    }
}
