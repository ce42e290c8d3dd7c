//! # Image Assets
//!
//! Logo and signature bytes are fetched before layout begins. A provider
//! either yields `{bytes, mime_type}` or signals not-found / decode-error;
//! callers treat either signal as "omit the image" via [`load_optional`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Failed to decode asset '{key}': {message}")]
    Decode { key: String, message: String },

    #[error("I/O error reading '{key}': {message}")]
    Io { key: String, message: String },
}

/// Raw image bytes plus their declared MIME type.
///
/// Serializes as a `data:` URI so invoices can carry images inline in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ImageAsset {
    pub bytes: Arc<[u8]>,
    pub mime_type: String,
}

impl ImageAsset {
    pub fn new(bytes: impl Into<Arc<[u8]>>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Build an asset whose MIME type is sniffed from magic bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mime_type = sniff_mime(&bytes).to_string();
        Self::new(bytes, mime_type)
    }

    /// Parse `data:image/png;base64,...`, or bare base64 image data.
    pub fn from_data_uri(src: &str) -> Result<Self, AssetError> {
        let decode_err = |message: String| AssetError::Decode {
            key: "data URI".to_string(),
            message,
        };

        if let Some(rest) = src.strip_prefix("data:") {
            let comma_pos = rest
                .find(',')
                .ok_or_else(|| decode_err("Invalid data URI: missing comma".to_string()))?;
            let header = &rest[..comma_pos];
            let mime_type = header.split(';').next().unwrap_or_default();
            if !header.ends_with(";base64") {
                return Err(decode_err("Only base64 data URIs are supported".to_string()));
            }
            let bytes = base64_decode(&rest[comma_pos + 1..]).map_err(decode_err)?;
            return Ok(Self::new(bytes, mime_type));
        }

        let bytes = base64_decode(src).map_err(decode_err)?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn to_data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

impl TryFrom<String> for ImageAsset {
    type Error = AssetError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        Self::from_data_uri(&src)
    }
}

impl From<ImageAsset> for String {
    fn from(asset: ImageAsset) -> Self {
        asset.to_data_uri()
    }
}

fn base64_decode(input: &str) -> Result<Vec<u8>, String> {
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| format!("Base64 decode error: {}", e))
}

/// Guess a MIME type from the leading bytes.
pub fn sniff_mime(data: &[u8]) -> &'static str {
    if data.starts_with(&[0xFF, 0xD8]) {
        "image/jpeg"
    } else if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else {
        "application/octet-stream"
    }
}

fn mime_for_path(path: &Path, bytes: &[u8]) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => sniff_mime(bytes),
    }
}

/// A source of binary image assets keyed by name.
pub trait AssetProvider: Send + Sync + Debug {
    fn load(&self, key: &str) -> Result<ImageAsset, AssetError>;

    /// Human-readable provider name for logs.
    fn name(&self) -> &'static str;
}

/// Load an optional asset, turning any failure into `None` with a warning.
pub fn load_optional(provider: &dyn AssetProvider, key: &str) -> Option<ImageAsset> {
    match provider.load(key) {
        Ok(asset) => {
            log::debug!(
                "{} resolved '{}' ({} bytes, {})",
                provider.name(),
                key,
                asset.bytes.len(),
                asset.mime_type
            );
            Some(asset)
        }
        Err(e) => {
            log::warn!("{}: omitting image '{}': {}", provider.name(), key, e);
            None
        }
    }
}

/// Assets held in memory, pre-populated by the caller.
#[derive(Debug, Default)]
pub struct InMemoryAssets {
    assets: RwLock<HashMap<String, ImageAsset>>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, asset: ImageAsset) {
        if let Ok(mut assets) = self.assets.write() {
            assets.insert(key.into(), asset);
        }
    }

    pub fn len(&self) -> usize {
        self.assets.read().map(|a| a.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AssetProvider for InMemoryAssets {
    fn load(&self, key: &str) -> Result<ImageAsset, AssetError> {
        let assets = self.assets.read().map_err(|_| AssetError::Io {
            key: key.to_string(),
            message: "asset store lock poisoned".to_string(),
        })?;
        assets
            .get(key)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(key.to_string()))
    }

    fn name(&self) -> &'static str {
        "InMemoryAssets"
    }
}

/// Assets read from files under a root directory.
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl AssetProvider for FsAssets {
    fn load(&self, key: &str) -> Result<ImageAsset, AssetError> {
        let path = self.resolve(key);
        let bytes = std::fs::read(&path).map_err(|e| io_error(key, e))?;
        let mime = mime_for_path(&path, &bytes);
        Ok(ImageAsset::new(bytes, mime))
    }

    fn name(&self) -> &'static str {
        "FsAssets"
    }
}

fn io_error(key: &str, e: std::io::Error) -> AssetError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AssetError::NotFound(key.to_string())
    } else {
        AssetError::Io {
            key: key.to_string(),
            message: e.to_string(),
        }
    }
}

/// Read an image file without blocking the runtime.
#[cfg(feature = "async")]
pub async fn load_file_async(path: impl AsRef<Path>) -> Result<ImageAsset, AssetError> {
    let path = path.as_ref();
    let key = path.display().to_string();
    let bytes = tokio::fs::read(path).await.map_err(|e| io_error(&key, e))?;
    let mime = mime_for_path(path, &bytes);
    Ok(ImageAsset::new(bytes, mime))
}
