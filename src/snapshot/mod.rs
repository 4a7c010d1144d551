//! Codebase snapshot pipeline: exclusion rules, tree building, aggregates,
//! compact text encoding, archive streaming and tree replay.

pub mod archive;
pub mod encode;
pub mod exclude;
pub mod replay;
pub mod stats;
pub mod tree;

pub use archive::{stream_archive, ArchiveError};
pub use encode::{encode, Variant};
pub use exclude::{ExclusionMatcher, BASELINE_EXCLUDES};
pub use replay::replay_tree;
pub use stats::{total_directories, total_files, total_lines};
pub use tree::{build_tree, DirectoryNode, FileNode, TreeNode, MAX_CONTENT_SIZE};
