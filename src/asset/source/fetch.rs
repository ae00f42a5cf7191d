//! Remote and local fetching.
//!
//! Remote requests probe the server with `HEAD` before the real `GET`, are
//! bounded by `fetch_timeout` and race the session's cancellation token.
//! `file://` urls and plain paths are read from disk.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{AssetLoader, LoadStatus};
use crate::asset::{AssetData, AssetError, AssetRecord, AssetType, LoadContext, SourceStat};
use crate::core::Location;
use crate::utils::{fs, mime};

/// Raw result of a fetch.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub modified: Option<SystemTime>,
}

/// HTTP client plus the limits every request runs under.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
    cancel: CancellationToken,
}

impl Fetcher {
    pub fn new(timeout_secs: u64, cancel: CancellationToken) -> Self {
        let timeout = Duration::from_secs(timeout_secs.max(1));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            timeout,
            cancel,
        }
    }

    /// Fetch a remote url. Anything but `200 OK` is an error.
    pub async fn get(&self, url: &Url) -> Result<Fetched, AssetError> {
        let label = url.as_str();
        let request = async {
            // Unreachable hosts fail here, before any body is transferred.
            self.client
                .head(url.clone())
                .send()
                .await
                .map_err(|err| self.request_error(label, err))?;

            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|err| self.request_error(label, err))?;
            if response.status() != StatusCode::OK {
                return Err(AssetError::Status {
                    url: label.to_string(),
                    status: response.status().as_u16(),
                });
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string);
            let bytes = response
                .bytes()
                .await
                .map_err(|err| self.request_error(label, err))?;
            Ok(Fetched {
                bytes: bytes.to_vec(),
                content_type,
                modified: None,
            })
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AssetError::Cancelled),
            result = tokio::time::timeout(self.timeout, request) => {
                result.unwrap_or_else(|_| Err(self.timeout_error(label)))
            }
        }
    }

    /// Read a local file.
    pub async fn read(&self, path: &Path) -> Result<Fetched, AssetError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| AssetError::io(path, err))?;
        Ok(Fetched {
            bytes,
            content_type: None,
            modified: fs::modified(path).await,
        })
    }

    fn request_error(&self, url: &str, err: reqwest::Error) -> AssetError {
        if err.is_timeout() {
            return self.timeout_error(url);
        }
        AssetError::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    fn timeout_error(&self, url: &str) -> AssetError {
        AssetError::Timeout {
            url: url.to_string(),
            secs: self.timeout.as_secs(),
        }
    }
}

// ============================================================================
// source
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Endpoint {
    Remote(Url),
    Local(PathBuf),
}

/// Resolve a url or path. Relative paths are joined onto `base`.
fn resolve(raw: &str, base: &Path) -> Result<Endpoint, AssetError> {
    let invalid = |reason: &str| AssetError::Fetch {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let location = Location::new(raw);
    if location.is_remote() {
        let url = Url::parse(raw).map_err(|err| invalid(&err.to_string()))?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("url has no host"));
        }
        return Ok(Endpoint::Remote(url));
    }

    if raw.starts_with("file:") {
        let url = Url::parse(raw).map_err(|err| invalid(&err.to_string()))?;
        let path = url
            .to_file_path()
            .map_err(|()| invalid("not a local file url"))?;
        return Ok(Endpoint::Local(path));
    }

    let path = location.to_std_path();
    if path.as_os_str().is_empty() {
        return Err(invalid("empty path"));
    }
    Ok(Endpoint::Local(if path.is_absolute() {
        path
    } else {
        base.join(path)
    }))
}

/// Extension for content whose name has none: magic bytes first, then the
/// declared content type.
fn infer_extension(bytes: &[u8], content_type: Option<&str>) -> Option<String> {
    if let Some((ext, _)) = mime::sniff(bytes) {
        return Some(ext.to_string());
    }
    let ext = mime::to_extension(content_type?);
    (!ext.is_empty()).then_some(ext)
}

/// Content fetched from a url or read from a path on every load.
#[derive(Debug, Clone)]
pub struct RemoteSource {
    url: String,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl AssetLoader for RemoteSource {
    async fn load(
        &mut self,
        record: &mut AssetRecord,
        ctx: &LoadContext,
    ) -> Result<LoadStatus, AssetError> {
        let endpoint = resolve(&self.url, &ctx.vault.root)?;
        let fetched = match &endpoint {
            Endpoint::Remote(url) if !ctx.options.offline_resources => {
                return Err(AssetError::Offline {
                    url: url.to_string(),
                });
            }
            Endpoint::Remote(url) => ctx.fetcher.get(url).await?,
            Endpoint::Local(path) => ctx.fetcher.read(path).await?,
        };

        if Location::new(&record.file_name).extension().is_empty()
            && let Some(ext) = infer_extension(&fetched.bytes, fetched.content_type.as_deref())
        {
            record.file_name = format!("{}.{ext}", record.file_name);
            record.kind = AssetType::from_extension(&ext);
        }

        record.source = Some(match &endpoint {
            Endpoint::Remote(url) => Location::new(url.as_str()),
            Endpoint::Local(path) => Location::new(&path.to_string_lossy()),
        });
        record.source_stat = SourceStat {
            modified: fetched.modified,
            size: fetched.bytes.len() as u64,
        };
        record.data = if record.kind.is_text() {
            AssetData::Text(String::from_utf8_lossy(&fetched.bytes).into_owned())
        } else {
            AssetData::Bytes(fetched.bytes)
        };
        Ok(LoadStatus::Changed)
    }
}
