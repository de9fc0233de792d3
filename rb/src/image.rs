//! Image files to data URIs
//!
//! Recipes keep their picture inline as `data:<mime>;base64,<payload>`.
//! Loading happens off the UI task; [`ImageLoads`] decides whether a finished
//! load is still wanted.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use eyre::{Context, Result};
use tracing::debug;

/// Encode raw bytes as a data URI
pub fn encode_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, general_purpose::STANDARD.encode(bytes))
}

/// MIME type guessed from the file extension
pub fn mime_for(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

/// Short description of a data URI for display, e.g. `image/png, 12.3 KiB`
pub fn describe_data_uri(uri: &str) -> String {
    let Some(rest) = uri.strip_prefix("data:") else {
        return "image".to_string();
    };
    let (mime, payload) = match rest.split_once(',') {
        Some((header, payload)) => (header.trim_end_matches(";base64"), payload),
        None => (rest, ""),
    };
    let bytes = payload.len() / 4 * 3;
    format!("{}, {:.1} KiB", mime, bytes as f64 / 1024.0)
}

fn check(path: &Path, len: u64, max_bytes: u64) -> Result<String> {
    if len > max_bytes {
        return Err(eyre::eyre!(
            "Image {} is {} bytes, larger than the {} byte limit",
            path.display(),
            len,
            max_bytes
        ));
    }
    let mime = mime_for(path);
    if !mime.starts_with("image/") {
        return Err(eyre::eyre!("Not an image file: {} ({})", path.display(), mime));
    }
    Ok(mime)
}

/// Read an image file into a data URI
pub async fn load_data_uri(path: &Path, max_bytes: u64) -> Result<String> {
    debug!(?path, max_bytes, "load_data_uri: called");
    let meta = tokio::fs::metadata(path)
        .await
        .context(format!("Failed to read image {}", path.display()))?;
    let mime = check(path, meta.len(), max_bytes)?;
    let bytes = tokio::fs::read(path)
        .await
        .context(format!("Failed to read image {}", path.display()))?;
    Ok(encode_data_uri(&bytes, &mime))
}

/// Blocking variant for the scripting subcommands
pub fn load_data_uri_blocking(path: &Path, max_bytes: u64) -> Result<String> {
    debug!(?path, max_bytes, "load_data_uri_blocking: called");
    let meta = std::fs::metadata(path).context(format!("Failed to read image {}", path.display()))?;
    let mime = check(path, meta.len(), max_bytes)?;
    let bytes = std::fs::read(path).context(format!("Failed to read image {}", path.display()))?;
    Ok(encode_data_uri(&bytes, &mime))
}

/// Tracks which image load is the current one
///
/// Every request takes a new generation. Only the newest generation may be
/// applied; anything older finished late and is dropped.
#[derive(Debug, Default)]
pub struct ImageLoads {
    latest: u64,
    pending: bool,
}

impl ImageLoads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load, superseding any pending one
    pub fn begin(&mut self) -> u64 {
        self.latest += 1;
        self.pending = true;
        debug!(generation = self.latest, "ImageLoads::begin: called");
        self.latest
    }

    /// Accept a finished load if it is the newest; clears the pending flag
    pub fn complete(&mut self, generation: u64) -> bool {
        let current = self.pending && generation == self.latest;
        debug!(generation, latest = self.latest, current, "ImageLoads::complete: called");
        if current {
            self.pending = false;
        }
        current
    }

    /// Drop whatever is in flight (form closed)
    pub fn cancel(&mut self) {
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}
