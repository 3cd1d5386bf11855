//! Remote image mirroring.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use crate::error::AssetFetchError;

/// HTTP client for mirroring product images.
pub struct AssetFetcher {
    http: reqwest::Client,
}

/// Deletes the temporary write path unless disarmed.
///
/// Covers every early exit, error returns and cancelled (dropped) futures
/// alike, so a partially-written file never survives at any path. Shared
/// with the page renderer, which uses the same temp-then-rename placement.
pub(crate) struct PartGuard {
    path: PathBuf,
    armed: bool,
}

impl PartGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    /// Call after the rename into place succeeded.
    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PartGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

impl AssetFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self { http })
    }

    /// Stream a remote image to `dest`.
    ///
    /// The body is written to `{dest}.part` and renamed into place only on
    /// full success, so a reader never observes a partial asset at the final
    /// path.
    pub async fn fetch(&self, url: &str, dest: &Path) -> Result<(), AssetFetchError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AssetFetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let part = part_path(dest);
        let mut guard = PartGuard::new(part.clone());

        let mut file = tokio::fs::File::create(&part).await?;
        let mut stream = resp.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        drop(file);

        // A zero-byte image is as useless as a partial one; keep it off the
        // final path.
        if written == 0 {
            return Err(AssetFetchError::Empty {
                url: url.to_string(),
            });
        }

        tokio::fs::rename(&part, dest).await?;
        guard.disarm();
        Ok(())
    }
}

pub(crate) fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
