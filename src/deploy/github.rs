//! GitHub adapter for the `SourceHost` port
//!
//! Repository creation goes through the REST API; the initial push uses
//! the Git Data API (inline-content tree → commit → ref) so no local git
//! binary or object store is involved.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::deploy::hosts::{HostError, Repository, SourceHost};

const API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("stackship-core/", env!("CARGO_PKG_VERSION"));

/// Mode and type constants for Git Data tree entries.
const TREE_BLOB_MODE: &str = "100644";
const TREE_BLOB_TYPE: &str = "blob";

#[derive(Debug, Serialize)]
struct GitTreeEntry {
    path: String,
    mode: &'static str,
    #[serde(rename = "type")]
    kind: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ObjectSha {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    name: String,
    html_url: String,
    default_branch: String,
    owner: RepoOwner,
}

#[derive(Debug, Deserialize)]
struct RepoOwner {
    login: String,
}

/// Live GitHub client authenticated with a caller-supplied token.
pub struct GithubClient {
    client: Client,
    token: String,
    base: String,
}

impl GithubClient {
    pub fn new(token: String) -> Result<Self, HostError> {
        Self::with_base(token, API_BASE.to_string())
    }

    /// Base-URL override for tests.
    pub fn with_base(token: String, base: String) -> Result<Self, HostError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            token,
            base,
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.bearer_auth(&self.token)
            .header(header::ACCEPT, "application/vnd.github+json")
    }

    async fn api_failure(response: reqwest::Response, context: &str) -> HostError {
        let status = response.status();
        let message = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| format!("HTTP {}", status));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => HostError::Auth(message),
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::CONFLICT => {
                HostError::Conflict(format!("{}: {}", context, message))
            }
            _ => HostError::Api(format!("{}: {}", context, message)),
        }
    }

    /// Collect (relative path, text content) pairs for every file under
    /// `dir`. Files that cannot be read as text are skipped with a warning
    /// — everything in a replayed tree is text by construction.
    fn collect_files(dir: &Path) -> Vec<(String, String)> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(dir)
                .map(|p| {
                    p.components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .unwrap_or_default();
            match std::fs::read_to_string(entry.path()) {
                Ok(content) => files.push((rel, content)),
                Err(e) => warn!("Skipping non-text push entry {}: {}", rel, e),
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        files
    }
}

#[async_trait]
impl SourceHost for GithubClient {
    async fn create_repository(
        &self,
        owner: &str,
        name: &str,
        description: &str,
    ) -> Result<Repository, HostError> {
        let url = format!("{}/user/repos", self.base);
        let response = self
            .auth(self.client.post(&url))
            .json(&json!({
                "name": name,
                "description": description,
                "private": false,
                "auto_init": false,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_failure(response, "repository creation").await);
        }

        let repo: RepoResponse = response.json().await?;
        // The authenticated user may differ from the requested owner
        // (organization tokens); the API's answer wins.
        if repo.owner.login != owner {
            info!(
                "Repository created under {} (requested owner {})",
                repo.owner.login, owner
            );
        }
        Ok(Repository {
            owner: repo.owner.login,
            name: repo.name,
            url: repo.html_url,
            default_branch: repo.default_branch,
        })
    }

    async fn push_directory(
        &self,
        repo: &Repository,
        dir: &Path,
        message: &str,
    ) -> Result<(), HostError> {
        let files = Self::collect_files(dir);
        if files.is_empty() {
            return Err(HostError::Api("nothing to push: directory is empty".to_string()));
        }

        let entries: Vec<GitTreeEntry> = files
            .into_iter()
            .map(|(path, content)| GitTreeEntry {
                path,
                mode: TREE_BLOB_MODE,
                kind: TREE_BLOB_TYPE,
                content,
            })
            .collect();
        info!("Pushing {} files to {}", entries.len(), repo.full_name());

        // Tree with inline content; no base_tree on an initial commit.
        let tree_url = format!("{}/repos/{}/git/trees", self.base, repo.full_name());
        let response = self
            .auth(self.client.post(&tree_url))
            .json(&json!({ "tree": entries }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_failure(response, "tree upload").await);
        }
        let tree: ObjectSha = response.json().await?;

        let commit_url = format!("{}/repos/{}/git/commits", self.base, repo.full_name());
        let response = self
            .auth(self.client.post(&commit_url))
            .json(&json!({ "message": message, "tree": tree.sha, "parents": [] }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_failure(response, "commit creation").await);
        }
        let commit: ObjectSha = response.json().await?;

        let ref_url = format!("{}/repos/{}/git/refs", self.base, repo.full_name());
        let response = self
            .auth(self.client.post(&ref_url))
            .json(&json!({
                "ref": format!("refs/heads/{}", repo.default_branch),
                "sha": commit.sha,
            }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::api_failure(response, "branch creation").await);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_relative_sorted() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/index.js"), "code").unwrap();
        fs::write(root.join(".env"), "A=1").unwrap();
        fs::write(root.join("README.md"), "# r").unwrap();

        let files = GithubClient::collect_files(root);
        let paths: Vec<&str> = files.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec![".env", "README.md", "src/index.js"]);
        assert_eq!(files[2].1, "code");
    }
}
