//! Compact text encoding of snapshot trees
//!
//! Line-oriented, write-only serialization used as a human/LLM-readable
//! alternative to raw JSON. Two variants share one pre-order traversal in
//! the builder's exact child order, so encoding an unchanged tree is
//! byte-identical across calls.

use std::fmt::Write;

use crate::snapshot::tree::TreeNode;

/// Output flavor for [`encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// One annotated line per node, fenced content blocks.
    Verbose,
    /// Short type markers and packed counters to minimize tokens.
    Compact,
}

impl Variant {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "verbose" => Some(Variant::Verbose),
            "compact" => Some(Variant::Compact),
            _ => None,
        }
    }
}

/// Serialize `tree` to the requested textual variant.
pub fn encode(tree: &TreeNode, variant: Variant) -> String {
    let mut out = String::new();
    match variant {
        Variant::Verbose => encode_verbose(tree, 0, &mut out),
        Variant::Compact => encode_compact(tree, 0, &mut out),
    }
    out
}

fn encode_verbose(node: &TreeNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    match node {
        TreeNode::Directory(d) => {
            let label = if d.name.is_empty() { "." } else { &d.name };
            let _ = writeln!(
                out,
                "{}{}/ ({} files, {} lines)",
                indent, label, d.file_count, d.line_count
            );
            for child in &d.children {
                encode_verbose(child, depth + 1, out);
            }
        }
        TreeNode::File(f) => {
            let _ = write!(out, "{}{} ({} bytes, {} lines)", indent, f.name, f.size, f.lines);
            if f.skipped || f.error {
                let reason = f.reason.as_deref().unwrap_or("unavailable");
                let _ = write!(out, " [{}]", reason);
            }
            out.push('\n');
            if let Some(content) = &f.content {
                let _ = writeln!(out, "{}```", indent);
                for line in content.split('\n') {
                    let _ = writeln!(out, "{}{}", indent, line);
                }
                let _ = writeln!(out, "{}```", indent);
            }
        }
    }
}

fn encode_compact(node: &TreeNode, depth: usize, out: &mut String) {
    let indent = " ".repeat(depth);
    match node {
        TreeNode::Directory(d) => {
            let label = if d.name.is_empty() { "." } else { &d.name };
            let _ = writeln!(out, "{}d {} {}/{}", indent, label, d.file_count, d.line_count);
            for child in &d.children {
                encode_compact(child, depth + 1, out);
            }
        }
        TreeNode::File(f) => {
            let marker = if f.skipped || f.error { "!" } else { "" };
            let _ = writeln!(out, "{}f{} {} {}:{}", indent, marker, f.name, f.size, f.lines);
            if let Some(content) = &f.content {
                let _ = writeln!(out, "{}<<<", indent);
                out.push_str(content);
                if !content.ends_with('\n') {
                    out.push('\n');
                }
                let _ = writeln!(out, "{}>>>", indent);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::tree::{DirectoryNode, FileNode};

    fn fixture() -> TreeNode {
        TreeNode::Directory(DirectoryNode {
            name: String::new(),
            path: String::new(),
            children: vec![
                TreeNode::Directory(DirectoryNode {
                    name: "src".to_string(),
                    path: "src".to_string(),
                    children: vec![TreeNode::File(FileNode {
                        name: "main.rs".to_string(),
                        path: "src/main.rs".to_string(),
                        size: 13,
                        extension: "rs".to_string(),
                        lines: 1,
                        content: Some("fn main() {}\n".to_string()),
                        skipped: false,
                        error: false,
                        reason: None,
                    })],
                    file_count: 1,
                    line_count: 1,
                }),
                TreeNode::File(FileNode {
                    name: "huge.bin".to_string(),
                    path: "huge.bin".to_string(),
                    size: 9_999_999,
                    extension: "bin".to_string(),
                    lines: 0,
                    content: None,
                    skipped: true,
                    error: false,
                    reason: Some("File exceeds the 1 MiB capture limit (9999999 bytes)".to_string()),
                }),
            ],
            file_count: 2,
            line_count: 1,
        })
    }

    #[test]
    fn test_verbose_layout() {
        let text = encode(&fixture(), Variant::Verbose);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "./ (2 files, 1 lines)");
        assert_eq!(lines[1], "  src/ (1 files, 1 lines)");
        assert!(lines[2].starts_with("    main.rs (13 bytes, 1 lines)"));
        assert_eq!(lines[3], "    ```");
        assert!(text.contains("fn main() {}"));
        assert!(text.contains("huge.bin (9999999 bytes, 0 lines) [File exceeds"));
    }

    #[test]
    fn test_compact_layout() {
        let text = encode(&fixture(), Variant::Compact);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "d . 2/1");
        assert_eq!(lines[1], " d src 1/1");
        assert_eq!(lines[2], "  f main.rs 13:1");
        assert_eq!(lines[3], "  <<<");
        assert!(text.contains("f! huge.bin 9999999:0"));
    }

    #[test]
    fn test_encode_is_idempotent() {
        let tree = fixture();
        for variant in [Variant::Verbose, Variant::Compact] {
            let first = encode(&tree, variant);
            let second = encode(&tree, variant);
            assert_eq!(first, second);
        }
    }
}
