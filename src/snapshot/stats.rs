//! Whole-tree aggregates
//!
//! Pure recursive totals over an already-built snapshot tree. The builder
//! stores per-directory aggregates at construction time; these functions
//! recompute them from scratch for the response summary and as a
//! cross-check in tests.

use crate::snapshot::tree::TreeNode;

/// Total number of file nodes in the tree.
pub fn total_files(node: &TreeNode) -> usize {
    match node {
        TreeNode::File(_) => 1,
        TreeNode::Directory(d) => d.children.iter().map(total_files).sum(),
    }
}

/// Sum of `lines` over every file node.
pub fn total_lines(node: &TreeNode) -> usize {
    match node {
        TreeNode::File(f) => f.lines,
        TreeNode::Directory(d) => d.children.iter().map(total_lines).sum(),
    }
}

/// Total number of directory nodes, the root included.
pub fn total_directories(node: &TreeNode) -> usize {
    match node {
        TreeNode::File(_) => 0,
        TreeNode::Directory(d) => 1 + d.children.iter().map(total_directories).sum::<usize>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::tree::{DirectoryNode, FileNode};

    fn file(name: &str, lines: usize) -> TreeNode {
        TreeNode::File(FileNode {
            name: name.to_string(),
            path: name.to_string(),
            size: 0,
            extension: String::new(),
            lines,
            content: None,
            skipped: false,
            error: false,
            reason: None,
        })
    }

    fn dir(name: &str, children: Vec<TreeNode>) -> TreeNode {
        let file_count = children.iter().map(total_files).sum();
        let line_count = children.iter().map(total_lines).sum();
        TreeNode::Directory(DirectoryNode {
            name: name.to_string(),
            path: name.to_string(),
            children,
            file_count,
            line_count,
        })
    }

    #[test]
    fn test_totals_agree_with_stored_aggregates() {
        let tree = dir(
            "",
            vec![
                dir("src", vec![file("main.rs", 10), dir("deep", vec![file("a.rs", 4)])]),
                file("README.md", 2),
            ],
        );

        assert_eq!(total_files(&tree), 3);
        assert_eq!(total_lines(&tree), 16);
        assert_eq!(total_directories(&tree), 3);

        if let TreeNode::Directory(root) = &tree {
            assert_eq!(root.file_count, total_files(&tree));
            assert_eq!(root.line_count, total_lines(&tree));
        }
    }

    #[test]
    fn test_single_file_tree() {
        let tree = file("solo.txt", 7);
        assert_eq!(total_files(&tree), 1);
        assert_eq!(total_lines(&tree), 7);
        assert_eq!(total_directories(&tree), 0);
    }
}
