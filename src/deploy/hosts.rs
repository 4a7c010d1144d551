//! Provider ports for the publish pipeline
//!
//! The publisher talks to the source-repository host and the deployment
//! host through these traits. Live adapters wrap the provider HTTP APIs;
//! tests substitute in-memory mocks, so the pipeline's sequencing and
//! cleanup behavior is exercised without a network.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure surfaced by a provider adapter. The provider's own message is
/// carried through verbatim where one exists.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Api(String),
    #[error("request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for HostError {
    fn from(e: reqwest::Error) -> Self {
        HostError::Transport(e.to_string())
    }
}

/// A source repository created on the remote host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub owner: String,
    pub name: String,
    pub url: String,
    pub default_branch: String,
}

impl Repository {
    /// `owner/name` as the provider APIs expect it.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// A deployment project bound to a repository.
#[derive(Debug, Clone)]
pub struct DeployProject {
    pub id: String,
    pub name: String,
}

/// Deployment lifecycle. Transitions are forward-only; `Ready`, `Error`
/// and `Timeout` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Pending,
    Ready,
    Error,
    Timeout,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Pending => "pending",
            DeploymentStatus::Ready => "ready",
            DeploymentStatus::Error => "error",
            DeploymentStatus::Timeout => "timeout",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DeploymentStatus::Pending)
    }
}

/// State carried across the polling loop.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub id: String,
    /// Absent until the deployment reaches `Ready`.
    pub url: Option<String>,
    pub status: DeploymentStatus,
}

/// Source-repository host (GitHub in production).
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Create a new repository. Name collisions and bad credentials are
    /// surfaced, never retried.
    async fn create_repository(
        &self,
        owner: &str,
        name: &str,
        description: &str,
    ) -> Result<Repository, HostError>;

    /// Upload `dir`'s full content as the initial commit on the
    /// repository's default branch.
    async fn push_directory(
        &self,
        repo: &Repository,
        dir: &Path,
        message: &str,
    ) -> Result<(), HostError>;
}

/// Deployment host (Vercel in production).
#[async_trait]
pub trait DeployHost: Send + Sync {
    /// Look up a project by name, creating one bound to `repo` when absent.
    async fn resolve_project(
        &self,
        name: &str,
        repo: &Repository,
    ) -> Result<DeployProject, HostError>;

    /// Request a production deployment of `repo`'s default branch.
    async fn trigger_deployment(
        &self,
        project: &DeployProject,
        repo: &Repository,
    ) -> Result<Deployment, HostError>;

    /// Fetch the current state of a deployment.
    async fn deployment_status(&self, deployment_id: &str) -> Result<Deployment, HostError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(!DeploymentStatus::Pending.is_terminal());
        assert!(DeploymentStatus::Ready.is_terminal());
        assert!(DeploymentStatus::Error.is_terminal());
        assert!(DeploymentStatus::Timeout.is_terminal());
    }

    #[test]
    fn test_repository_full_name() {
        let repo = Repository {
            owner: "acme".to_string(),
            name: "widget".to_string(),
            url: "https://github.com/acme/widget".to_string(),
            default_branch: "main".to_string(),
        };
        assert_eq!(repo.full_name(), "acme/widget");
    }
}
