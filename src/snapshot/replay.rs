//! Tree replay
//!
//! Reconstructs a snapshot tree (built with content embedding) as real
//! directories and files under a destination path. Content is written
//! verbatim; a file node without content becomes an empty file. IO errors
//! propagate to the caller, which owns the destination and any cleanup.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::snapshot::tree::TreeNode;

/// Recreate `tree` under `dest`. `dest` itself is created if missing.
pub fn replay_tree(tree: &TreeNode, dest: &Path) -> io::Result<()> {
    match tree {
        TreeNode::Directory(d) => {
            let dir_path = join_rel(dest, &d.path);
            fs::create_dir_all(&dir_path)?;
            for child in &d.children {
                replay_tree(child, dest)?;
            }
        }
        TreeNode::File(f) => {
            let file_path = join_rel(dest, &f.path);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = f.content.as_deref().unwrap_or("");
            debug!("Replaying {} ({} bytes)", f.path, content.len());
            fs::write(&file_path, content)?;
        }
    }
    Ok(())
}

fn join_rel(dest: &Path, rel: &str) -> std::path::PathBuf {
    if rel.is_empty() {
        dest.to_path_buf()
    } else {
        dest.join(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::exclude::ExclusionMatcher;
    use crate::snapshot::tree::build_tree;
    use tempfile::TempDir;

    #[test]
    fn test_replay_then_rebuild_round_trips() {
        let source = TempDir::new().unwrap();
        let root = source.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::write(root.join("src/main.rs"), "fn main() {}\n").unwrap();
        fs::write(root.join("src/nested/mod.rs"), "pub mod x;").unwrap();
        fs::write(root.join("README.md"), "# demo\n\nbody").unwrap();
        fs::write(root.join("empty.txt"), "").unwrap();

        let matcher = ExclusionMatcher::new(&[]);
        let original = build_tree(root, root, &matcher, true).unwrap().unwrap();

        let dest = TempDir::new().unwrap();
        replay_tree(&original, dest.path()).unwrap();

        let rebuilt = build_tree(dest.path(), dest.path(), &matcher, true)
            .unwrap()
            .unwrap();

        let mut original_files = Vec::new();
        let mut rebuilt_files = Vec::new();
        collect_files(&original, &mut original_files);
        collect_files(&rebuilt, &mut rebuilt_files);

        assert_eq!(original_files.len(), 4);
        assert_eq!(original_files, rebuilt_files);
    }

    #[test]
    fn test_file_without_content_becomes_empty() {
        use crate::snapshot::tree::FileNode;

        let node = TreeNode::File(FileNode {
            name: "bare.txt".to_string(),
            path: "deep/bare.txt".to_string(),
            size: 123,
            extension: "txt".to_string(),
            lines: 0,
            content: None,
            skipped: true,
            error: false,
            reason: Some("too large".to_string()),
        });

        let dest = TempDir::new().unwrap();
        replay_tree(&node, dest.path()).unwrap();

        let written = fs::read_to_string(dest.path().join("deep/bare.txt")).unwrap();
        assert_eq!(written, "");
    }

    /// (path, name, content) triples for every file node, in tree order.
    fn collect_files(node: &TreeNode, out: &mut Vec<(String, String, Option<String>)>) {
        match node {
            TreeNode::File(f) => {
                out.push((f.path.clone(), f.name.clone(), f.content.clone()))
            }
            TreeNode::Directory(d) => {
                for child in &d.children {
                    collect_files(child, out);
                }
            }
        }
    }
}
