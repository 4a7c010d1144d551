//! Remote publishing pipeline
//!
//! Takes a content-bearing snapshot tree and a deploy configuration, and
//! drives the full sequence: replay into a temporary working directory,
//! write scaffold files, create the source repository, push the initial
//! commit, resolve the deployment project, trigger a production
//! deployment and poll it to a terminal state.
//!
//! The working directory is a `TempDir` guard, so it is removed on every
//! exit path. Remote state is never rolled back: a failure after the
//! repository exists reports the repository alongside the error.

pub mod config;
pub mod github;
pub mod hosts;
pub mod vercel;

use std::io;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::task;
use tracing::{info, warn};

use crate::snapshot::replay::replay_tree;
use crate::snapshot::tree::TreeNode;

pub use config::{CredentialGroup, CredentialProvider, DeployConfig};
pub use hosts::{
    DeployHost, DeployProject, Deployment, DeploymentStatus, HostError, Repository, SourceHost,
};
pub use github::GithubClient;
pub use vercel::VercelClient;

/// Default poll cadence: 5 s × 60 attempts, five minutes end to end.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_ATTEMPTS: u32 = 60;

/// Successful pipeline result.
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    pub repository: Repository,
    pub deployment_id: String,
    pub deployment_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid deploy request: {0}")]
    InvalidConfig(String),
    #[error("failed to prepare working directory: {0}")]
    Workspace(#[from] io::Error),
    #[error("repository creation failed: {0}")]
    CreateRepository(#[source] HostError),
    #[error("push failed: {source}")]
    Push {
        repository: Repository,
        source: HostError,
    },
    #[error("project resolution failed: {source}")]
    ResolveProject {
        repository: Repository,
        source: HostError,
    },
    #[error("deployment trigger failed: {source}")]
    TriggerDeployment {
        repository: Repository,
        source: HostError,
    },
    #[error("deployment status fetch failed: {source}")]
    StatusFetch {
        repository: Repository,
        deployment_id: String,
        source: HostError,
    },
    #[error("deployment {deployment_id} failed: {message}")]
    DeploymentFailed {
        repository: Repository,
        deployment_id: String,
        message: String,
    },
    /// The poll budget ran out. The remote build may still complete on its
    /// own; this is distinct from a hard deployment error.
    #[error("deployment {deployment_id} not ready after {attempts} polls; it may still complete remotely")]
    PollTimeout {
        repository: Repository,
        deployment_id: String,
        attempts: u32,
    },
}

impl PublishError {
    /// The repository that already exists remotely when this error was
    /// raised, if any. Partial success is reported, not rolled back.
    pub fn repository(&self) -> Option<&Repository> {
        match self {
            PublishError::InvalidConfig(_)
            | PublishError::Workspace(_)
            | PublishError::CreateRepository(_) => None,
            PublishError::Push { repository, .. }
            | PublishError::ResolveProject { repository, .. }
            | PublishError::TriggerDeployment { repository, .. }
            | PublishError::StatusFetch { repository, .. }
            | PublishError::DeploymentFailed { repository, .. }
            | PublishError::PollTimeout { repository, .. } => Some(repository),
        }
    }
}

/// Drives the publish sequence against a source host and a deploy host.
pub struct Publisher<S, D> {
    source: S,
    deploy: D,
    poll_interval: Duration,
    poll_attempts: u32,
    workspace_root: Option<std::path::PathBuf>,
}

impl<S: SourceHost, D: DeployHost> Publisher<S, D> {
    pub fn new(source: S, deploy: D) -> Self {
        Self {
            source,
            deploy,
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_attempts: DEFAULT_POLL_ATTEMPTS,
            workspace_root: None,
        }
    }

    /// Override the poll cadence (tests use a zero interval).
    pub fn with_polling(mut self, interval: Duration, attempts: u32) -> Self {
        self.poll_interval = interval;
        self.poll_attempts = attempts;
        self
    }

    /// Create working directories under `root` instead of the system
    /// temp location.
    pub fn in_workspace(mut self, root: impl Into<std::path::PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }

    /// Run the full pipeline. No I/O happens before validation passes.
    pub async fn publish(
        &self,
        tree: &TreeNode,
        config: &DeployConfig,
    ) -> Result<PublishOutcome, PublishError> {
        config.validate().map_err(PublishError::InvalidConfig)?;

        // Scoped working directory: removed when `workdir` drops, on every
        // path out of this function.
        let workdir = match &self.workspace_root {
            Some(root) => tempfile::tempdir_in(root)?,
            None => tempfile::tempdir()?,
        };
        self.materialize(tree, config, workdir.path()).await?;

        let repo = self
            .source
            .create_repository(&config.repo_owner, &config.repo_name, &config.description)
            .await
            .map_err(PublishError::CreateRepository)?;
        info!("Created repository {}", repo.url);

        let message = format!("Initial commit: {}", config.name);
        self.source
            .push_directory(&repo, workdir.path(), &message)
            .await
            .map_err(|source| PublishError::Push {
                repository: repo.clone(),
                source,
            })?;

        let project = self
            .deploy
            .resolve_project(&config.project_name, &repo)
            .await
            .map_err(|source| PublishError::ResolveProject {
                repository: repo.clone(),
                source,
            })?;

        let deployment = self
            .deploy
            .trigger_deployment(&project, &repo)
            .await
            .map_err(|source| PublishError::TriggerDeployment {
                repository: repo.clone(),
                source,
            })?;
        info!("Triggered deployment {}", deployment.id);

        self.poll_to_terminal(repo, deployment).await
    }

    /// Replay the tree into the working directory and add the generated
    /// env file, README and ignore file.
    async fn materialize(
        &self,
        tree: &TreeNode,
        config: &DeployConfig,
        dest: &Path,
    ) -> Result<(), PublishError> {
        let tree = tree.clone();
        let config = config.clone();
        let dest = dest.to_path_buf();
        task::spawn_blocking(move || -> io::Result<()> {
            replay_tree(&tree, &dest)?;
            write_scaffold(&config, &dest)
        })
        .await
        .map_err(|e| PublishError::Workspace(io::Error::other(e)))??;
        Ok(())
    }

    /// Bounded fixed-interval polling loop — the designed retry for
    /// "not yet ready". Not cancellable.
    async fn poll_to_terminal(
        &self,
        repository: Repository,
        deployment: Deployment,
    ) -> Result<PublishOutcome, PublishError> {
        let deployment_id = deployment.id.clone();
        let mut current = deployment;

        for attempt in 0..self.poll_attempts {
            match current.status {
                DeploymentStatus::Ready => {
                    return Ok(PublishOutcome {
                        repository,
                        deployment_id,
                        deployment_url: current.url,
                    });
                }
                DeploymentStatus::Error => {
                    return Err(PublishError::DeploymentFailed {
                        repository,
                        deployment_id,
                        message: "deployment entered the error state".to_string(),
                    });
                }
                _ => {}
            }

            if attempt + 1 == self.poll_attempts {
                break;
            }
            tokio::time::sleep(self.poll_interval).await;

            current = self
                .deploy
                .deployment_status(&deployment_id)
                .await
                .map_err(|source| PublishError::StatusFetch {
                    repository: repository.clone(),
                    deployment_id: deployment_id.clone(),
                    source,
                })?;
        }

        warn!(
            "Deployment {} still pending after {} polls",
            deployment_id, self.poll_attempts
        );
        Err(PublishError::PollTimeout {
            repository,
            deployment_id,
            attempts: self.poll_attempts,
        })
    }
}

/// Scaffold files added to the replayed tree before push: the env file for
/// the credential groups present, a README when the snapshot lacks one and
/// a default ignore file when absent.
fn write_scaffold(config: &DeployConfig, dest: &Path) -> io::Result<()> {
    let env = config.render_env_file();
    if !env.is_empty() {
        std::fs::write(dest.join(".env.local"), env)?;
    }

    let readme = dest.join("README.md");
    if !readme.exists() {
        std::fs::write(readme, config.render_readme())?;
    }

    let gitignore = dest.join(".gitignore");
    if !gitignore.exists() {
        std::fs::write(gitignore, config.render_gitignore())?;
    }

    Ok(())
}
