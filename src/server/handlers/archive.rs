//! Archive download handler
//!
//! The zip is produced by a spawned task writing into one half of a
//! duplex pipe while the response body streams the other half, so walk,
//! compression and transfer interleave. Failures before the response
//! starts return a JSON error; failures mid-stream end the body abruptly
//! and the client must treat the truncated archive as a failure.

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tokio_util::io::ReaderStream;
use tracing::error;

use crate::server::error::{ApiError, ApiResult};
use crate::server::protocol::ArchiveRequest;
use crate::server::AppContext;
use crate::snapshot::archive::stream_archive;
use crate::snapshot::exclude::ExclusionMatcher;

const PIPE_CAPACITY: usize = 64 * 1024;

/// POST /api/archive
pub async fn download_archive(
    State(ctx): State<AppContext>,
    Json(request): Json<ArchiveRequest>,
) -> ApiResult<Response> {
    let root = ctx.config.snapshot_root.clone();
    if !root.is_dir() {
        return Err(ApiError::not_found(format!("snapshot root {:?}", root)));
    }

    let filename = sanitize_name(request.archive_name.as_deref())?;

    let (reader, writer) = tokio::io::duplex(PIPE_CAPACITY);
    let exclude_patterns = request.exclude_patterns;
    tokio::spawn(async move {
        let matcher = ExclusionMatcher::new(&exclude_patterns);
        if let Err(e) = stream_archive(&root, &matcher, writer).await {
            // The write half drops here; the client sees a truncated
            // stream rather than a valid central directory.
            error!("Archive stream aborted: {}", e);
        }
    });

    let body = Body::from_stream(ReaderStream::new(reader));
    let response = (
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response();

    Ok(response)
}

/// Archive names come from the client; keep them to a single path
/// segment and normalize the extension.
fn sanitize_name(raw: Option<&str>) -> ApiResult<String> {
    let name = raw.unwrap_or("codebase.zip").trim();
    if name.is_empty() {
        return Ok("codebase.zip".to_string());
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') || name.contains('"') {
        return Err(ApiError::bad_request(
            "archiveName must be a bare file name".to_string(),
        ));
    }
    if name.ends_with(".zip") {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.zip", name))
    }
}
