//! Snapshot tree builder
//!
//! Recursively walks a directory into a tree of file/directory nodes.
//! File content is captured verbatim when requested and under the size cap;
//! files that cannot be captured become degraded nodes instead of failing
//! the walk. Directory aggregates are computed bottom-up at construction
//! and never mutated afterwards.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::snapshot::exclude::ExclusionMatcher;

/// Maximum captured file size: 1 MiB. Larger files are recorded as
/// metadata-only skipped nodes.
pub const MAX_CONTENT_SIZE: u64 = 1_048_576;

/// One entry in a codebase snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TreeNode {
    Directory(DirectoryNode),
    File(FileNode),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryNode {
    pub name: String,
    /// Slash-separated, root-relative. The walk root itself is `""`.
    pub path: String,
    pub children: Vec<TreeNode>,
    /// Count of all descendant files, summed at construction.
    pub file_count: usize,
    /// Sum of `lines` over all descendant files.
    pub line_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileNode {
    pub name: String,
    pub path: String,
    /// Size in bytes from filesystem metadata.
    pub size: u64,
    /// Extension without the leading dot; empty when the name has none.
    pub extension: String,
    /// Newline-delimited segment count; 0 when skipped or unreadable.
    /// An empty file counts as 1 line (one empty segment).
    pub lines: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Directory(d) => &d.name,
            TreeNode::File(f) => &f.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TreeNode::Directory(d) => &d.path,
            TreeNode::File(f) => &f.path,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Directory(_))
    }
}

/// Build a snapshot tree rooted at `dir`.
///
/// `base` anchors relative paths; pass `dir` itself to make the root node's
/// path empty. Returns `Ok(None)` when the root is excluded. Filesystem
/// irregularities below the root degrade locally; only an inaccessible root
/// is surfaced as an error.
pub fn build_tree(
    dir: &Path,
    base: &Path,
    matcher: &ExclusionMatcher,
    include_content: bool,
) -> io::Result<Option<TreeNode>> {
    let metadata = fs::metadata(dir)?;
    Ok(build_node(dir, base, &metadata, matcher, include_content))
}

fn build_node(
    path: &Path,
    base: &Path,
    metadata: &fs::Metadata,
    matcher: &ExclusionMatcher,
    include_content: bool,
) -> Option<TreeNode> {
    let rel = relative_path(path, base);
    let name = basename(path);

    // Exclusion prunes the whole subtree; descendants are never visited.
    if !rel.is_empty() && matcher.is_excluded(&rel, &name) {
        return None;
    }

    if metadata.is_file() {
        Some(TreeNode::File(build_file_node(
            path,
            name,
            rel,
            metadata.len(),
            include_content,
        )))
    } else if metadata.is_dir() {
        Some(TreeNode::Directory(build_dir_node(
            path,
            base,
            name,
            rel,
            matcher,
            include_content,
        )))
    } else {
        // Symlinks, sockets and other specials are not snapshot material.
        debug!("Skipping non-regular entry {:?}", path);
        None
    }
}

fn build_file_node(
    path: &Path,
    name: String,
    rel: String,
    size: u64,
    include_content: bool,
) -> FileNode {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_string();

    if size > MAX_CONTENT_SIZE {
        return FileNode {
            name,
            path: rel,
            size,
            extension,
            lines: 0,
            content: None,
            skipped: true,
            error: false,
            reason: Some(format!(
                "File exceeds the 1 MiB capture limit ({} bytes)",
                size
            )),
        };
    }

    match fs::read_to_string(path) {
        Ok(text) => {
            // Splitting on '\n' makes an empty file one (empty) line.
            let lines = text.split('\n').count();
            FileNode {
                name,
                path: rel,
                size,
                extension,
                lines,
                content: include_content.then_some(text),
                skipped: false,
                error: false,
                reason: None,
            }
        }
        Err(e) => {
            debug!("Unreadable as text: {:?}: {}", path, e);
            FileNode {
                name,
                path: rel,
                size,
                extension,
                lines: 0,
                content: include_content
                    .then(|| "[binary or unreadable file content omitted]".to_string()),
                skipped: false,
                error: true,
                reason: Some(format!("not readable as text: {}", e)),
            }
        }
    }
}

fn build_dir_node(
    path: &Path,
    base: &Path,
    name: String,
    rel: String,
    matcher: &ExclusionMatcher,
    include_content: bool,
) -> DirectoryNode {
    let mut children = Vec::new();

    match fs::read_dir(path) {
        Ok(entries) => {
            for entry in entries {
                let entry = match entry {
                    Ok(e) => e,
                    Err(e) => {
                        warn!("Unreadable entry under {:?}: {}", path, e);
                        continue;
                    }
                };
                let child_path = entry.path();
                let metadata = match entry.metadata() {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("Stat failed for {:?}: {}", child_path, e);
                        continue;
                    }
                };
                if let Some(node) =
                    build_node(&child_path, base, &metadata, matcher, include_content)
                {
                    children.push(node);
                }
            }
        }
        Err(e) => {
            // Listing failure degrades to an empty directory.
            warn!("Cannot list {:?}: {}", path, e);
        }
    }

    sort_children(&mut children);

    let file_count = children
        .iter()
        .map(|c| match c {
            TreeNode::Directory(d) => d.file_count,
            TreeNode::File(_) => 1,
        })
        .sum();
    let line_count = children
        .iter()
        .map(|c| match c {
            TreeNode::Directory(d) => d.line_count,
            TreeNode::File(f) => f.lines,
        })
        .sum();

    DirectoryNode {
        name,
        path: rel,
        children,
        file_count,
        line_count,
    }
}

/// All directories before all files, each group alphabetical by name.
fn sort_children(children: &mut [TreeNode]) {
    children.sort_by(|a, b| match (a.is_dir(), b.is_dir()) {
        (true, false) => std::cmp::Ordering::Less,
        (false, true) => std::cmp::Ordering::Greater,
        _ => a.name().cmp(b.name()),
    });
}

fn basename(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .to_string()
}

fn relative_path(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => basename(path),
    }
}
