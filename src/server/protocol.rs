//! Wire types for the snapshot/archive/deploy surface
//!
//! Request and response DTOs, camelCase on the wire. The snapshot tree
//! itself serializes from `snapshot::tree::TreeNode`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::deploy::config::CredentialGroup;
use crate::snapshot::tree::TreeNode;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRequest {
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub include_content: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub total_files: usize,
    pub total_lines: usize,
    pub total_directories: usize,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    pub tree: TreeNode,
    pub summary: SnapshotSummary,
    /// The effective exclusion patterns (baseline + caller).
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotTextRequest {
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub include_content: bool,
    /// "verbose" or "compact"; defaults to compact.
    #[serde(default)]
    pub variant: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveRequest {
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub archive_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequestConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub project_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployRequest {
    pub tree: TreeNode,
    pub config: DeployRequestConfig,
    /// Keyed by provider name; unknown providers are ignored.
    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialGroup>,
    pub github_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeployResponse {
    pub fn failure(error: String, repository_url: Option<String>) -> Self {
        Self {
            success: false,
            repository_url,
            deployment_url: None,
            deployment_id: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_request_defaults() {
        let req: SnapshotRequest = serde_json::from_str("{}").unwrap();
        assert!(req.exclude_patterns.is_empty());
        assert!(!req.include_content);
    }

    #[test]
    fn test_deploy_request_wire_shape() {
        let raw = serde_json::json!({
            "tree": { "type": "file", "name": "index.js", "path": "index.js",
                      "size": 5, "extension": "js", "lines": 1, "content": "hello" },
            "config": {
                "name": "Demo",
                "repoOwner": "acme",
                "repoName": "demo",
                "projectName": "demo"
            },
            "credentials": { "stripe": { "STRIPE_KEY": "sk" }, "mystery": { "A": "b" } },
            "githubToken": "ghp_x"
        });
        let req: DeployRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(req.config.repo_owner, "acme");
        assert_eq!(req.credentials.len(), 2);
        assert_eq!(req.github_token, "ghp_x");
    }

    #[test]
    fn test_deploy_response_omits_absent_fields() {
        let body = serde_json::to_value(DeployResponse::failure("boom".to_string(), None)).unwrap();
        assert_eq!(body["success"], false);
        assert!(body.get("deploymentUrl").is_none());
        assert_eq!(body["error"], "boom");
    }

    #[test]
    fn test_tree_node_tagged_serialization() {
        use crate::snapshot::tree::{DirectoryNode, FileNode};

        let tree = TreeNode::Directory(DirectoryNode {
            name: "root".to_string(),
            path: String::new(),
            children: vec![TreeNode::File(FileNode {
                name: "a.txt".to_string(),
                path: "a.txt".to_string(),
                size: 1,
                extension: "txt".to_string(),
                lines: 1,
                content: None,
                skipped: false,
                error: false,
                reason: None,
            })],
            file_count: 1,
            line_count: 1,
        });

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value["type"], "directory");
        assert_eq!(value["fileCount"], 1);
        assert_eq!(value["children"][0]["type"], "file");
        // Clean flags are omitted from the wire entirely.
        assert!(value["children"][0].get("skipped").is_none());

        let back: TreeNode = serde_json::from_value(value).unwrap();
        assert_eq!(back, tree);
    }
}
