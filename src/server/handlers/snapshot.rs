//! Snapshot handlers
//!
//! Tree builds walk the filesystem recursively, so they run under
//! `spawn_blocking` rather than on the async runtime.

use axum::extract::State;
use axum::Json;
use chrono::Utc;

use crate::server::error::{ApiError, ApiResult};
use crate::server::protocol::{
    SnapshotRequest, SnapshotResponse, SnapshotSummary, SnapshotTextRequest,
};
use crate::server::AppContext;
use crate::snapshot::encode::{encode, Variant};
use crate::snapshot::exclude::ExclusionMatcher;
use crate::snapshot::tree::{build_tree, TreeNode};
use crate::snapshot::{total_directories, total_files, total_lines};

/// POST /api/snapshot
pub async fn create_snapshot(
    State(ctx): State<AppContext>,
    Json(request): Json<SnapshotRequest>,
) -> ApiResult<Json<SnapshotResponse>> {
    let (tree, excluded) = build_in_background(
        &ctx,
        request.exclude_patterns,
        request.include_content,
    )
    .await?;

    let summary = SnapshotSummary {
        total_files: total_files(&tree),
        total_lines: total_lines(&tree),
        total_directories: total_directories(&tree),
        generated_at: Utc::now(),
    };

    Ok(Json(SnapshotResponse {
        tree,
        summary,
        excluded,
    }))
}

/// POST /api/snapshot/text — the compact-text rendering of the same walk.
pub async fn render_snapshot_text(
    State(ctx): State<AppContext>,
    Json(request): Json<SnapshotTextRequest>,
) -> ApiResult<String> {
    let variant = match request.variant.as_deref() {
        None => Variant::Compact,
        Some(raw) => Variant::parse(raw)
            .ok_or_else(|| ApiError::bad_request(format!("unknown variant: {:?}", raw)))?,
    };

    let (tree, _) = build_in_background(
        &ctx,
        request.exclude_patterns,
        request.include_content,
    )
    .await?;

    Ok(encode(&tree, variant))
}

async fn build_in_background(
    ctx: &AppContext,
    exclude_patterns: Vec<String>,
    include_content: bool,
) -> ApiResult<(TreeNode, Vec<String>)> {
    let root = ctx.config.snapshot_root.clone();
    if !root.is_dir() {
        return Err(ApiError::not_found(format!(
            "snapshot root {:?}",
            root
        )));
    }

    let result = tokio::task::spawn_blocking(move || {
        let matcher = ExclusionMatcher::new(&exclude_patterns);
        let excluded = matcher.effective_patterns().to_vec();
        build_tree(&root, &root, &matcher, include_content).map(|tree| (tree, excluded))
    })
    .await
    .map_err(|e| ApiError::internal(format!("snapshot task failed: {}", e)))?;

    match result {
        Ok((Some(tree), excluded)) => Ok((tree, excluded)),
        Ok((None, _)) => Err(ApiError::internal(
            "snapshot root was excluded by its own pattern list".to_string(),
        )),
        Err(e) => Err(ApiError::internal(format!("snapshot walk failed: {}", e))),
    }
}
