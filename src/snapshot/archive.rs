//! Archive streaming
//!
//! Walks a directory tree (independently of the tree builder) and writes
//! every non-excluded regular file into a deflate zip, entry by entry, as
//! the walk discovers them. The sink is any async writer — in the HTTP
//! handler it is one half of a duplex pipe feeding the response body, so
//! compression and transfer interleave instead of buffering the archive.

use std::path::Path;

use async_zip::tokio::write::ZipFileWriter;
use async_zip::{Compression, ZipEntryBuilder};
use thiserror::Error;
use tokio::io::AsyncWrite;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::snapshot::exclude::ExclusionMatcher;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("archive encoding failed: {0}")]
    Zip(#[from] async_zip::error::ZipError),
    #[error("archive I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Stream every non-excluded regular file under `root` into `sink` as a
/// deflate zip entry named by its root-relative path. Directories are
/// implicit in entry names and never become entries themselves. A file
/// that cannot be read is logged and skipped; the archive continues.
pub async fn stream_archive<W>(
    root: &Path,
    matcher: &ExclusionMatcher,
    sink: W,
) -> Result<(), ArchiveError>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = ZipFileWriter::with_tokio(sink);

    let root_owned = root.to_path_buf();
    let walk = WalkDir::new(root).into_iter().filter_entry(|entry| {
        let rel = rel_path(entry.path(), &root_owned);
        if rel.is_empty() {
            return true; // the walk root itself
        }
        let basename = entry.file_name().to_string_lossy();
        !matcher.is_excluded(&rel, &basename)
    });

    for entry in walk {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!("Archive walk error: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = rel_path(entry.path(), root);
        let data = match tokio::fs::read(entry.path()).await {
            Ok(d) => d,
            Err(e) => {
                warn!("Skipping unreadable archive entry {:?}: {}", entry.path(), e);
                continue;
            }
        };

        debug!("Archiving {} ({} bytes)", rel, data.len());
        let builder = ZipEntryBuilder::new(rel.into(), Compression::Deflate);
        writer.write_entry_whole(builder, &data).await?;
    }

    writer.close().await?;
    Ok(())
}

fn rel_path(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.to_string_lossy().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    async fn archive_to_vec(root: &Path, extra: &[&str]) -> Vec<u8> {
        let extra: Vec<String> = extra.iter().map(|s| s.to_string()).collect();
        let matcher = ExclusionMatcher::new(&extra);
        let mut buf = Vec::new();
        stream_archive(root, &matcher, &mut buf).await.unwrap();
        buf
    }

    fn entry_names(data: &[u8]) -> Vec<String> {
        // Central-directory file headers carry the entry name inline; scan
        // for their signature instead of pulling in a zip reader.
        const CDFH: &[u8; 4] = b"PK\x01\x02";
        let mut names = Vec::new();
        let mut i = 0;
        while i + 46 <= data.len() {
            if &data[i..i + 4] == CDFH {
                let name_len =
                    u16::from_le_bytes([data[i + 28], data[i + 29]]) as usize;
                let start = i + 46;
                if start + name_len <= data.len() {
                    names.push(String::from_utf8_lossy(&data[start..start + name_len]).to_string());
                }
                i = start + name_len;
            } else {
                i += 1;
            }
        }
        names
    }

    #[tokio::test]
    async fn test_archive_contains_files_under_relative_paths() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("src")).unwrap();
        fs::write(root.join("src/app.js"), "console.log(1)").unwrap();
        fs::write(root.join("README.md"), "# hi").unwrap();

        let data = archive_to_vec(root, &[]).await;
        let names = entry_names(&data);
        assert!(names.contains(&"src/app.js".to_string()));
        assert!(names.contains(&"README.md".to_string()));
        // No explicit directory entries.
        assert!(!names.iter().any(|n| n.ends_with('/')));
    }

    #[tokio::test]
    async fn test_archive_applies_exclusions() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(root.join("app.log"), "log").unwrap();
        fs::write(root.join("keep.txt"), "keep").unwrap();

        let data = archive_to_vec(root, &["*.log"]).await;
        let names = entry_names(&data);
        assert_eq!(names, vec!["keep.txt".to_string()]);
    }
}
