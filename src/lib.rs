//! StackShip Core — codebase snapshot and deploy backend
//!
//! The pipeline: walk a directory into a snapshot tree with exclusion
//! rules, derive aggregates and compact text encodings, stream the same
//! walk as a zip archive, replay a content tree to disk, and publish a
//! replayed snapshot to GitHub + Vercel.

pub mod config;
pub mod deploy;
pub mod server;
pub mod snapshot;
pub mod util;

pub use config::ServerConfig;
pub use deploy::{
    DeployConfig, DeployHost, Deployment, DeploymentStatus, HostError, PublishError,
    PublishOutcome, Publisher, Repository, SourceHost,
};
pub use snapshot::{
    build_tree, encode, replay_tree, stream_archive, ExclusionMatcher, TreeNode, Variant,
};
