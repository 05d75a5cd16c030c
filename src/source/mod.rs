//! Dataset retrieval: a JSON catalog file, a packed `.dat` record file, or a JSON
//! catalog served over HTTP(S).

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::binary::{self, BinaryError};
use crate::catalog::{self, CourseRecord};

pub const DEFAULT_SOURCE: &str = "cursos.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DatasetSource {
    JsonFile(PathBuf),
    BinaryFile(PathBuf),
    Url(String),
}

impl DatasetSource {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Self::Url(trimmed.to_string());
        }
        let path = crate::config::expand_tilde(trimmed);
        if lower.ends_with(".dat") {
            Self::BinaryFile(path)
        } else {
            Self::JsonFile(path)
        }
    }

    pub fn describe(&self) -> String {
        match self {
            DatasetSource::JsonFile(p) | DatasetSource::BinaryFile(p) => p.display().to_string(),
            DatasetSource::Url(u) => u.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse catalog from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: BinaryError,
    },

    #[error("invalid record in {origin}: {message}")]
    InvalidRecord { origin: String, message: String },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },
}

/// Retrieves complete datasets from one source. Cheap to clone; clones share the
/// HTTP connection pool.
#[derive(Clone, Debug)]
pub struct Fetcher {
    source: DatasetSource,
    client: reqwest::Client,
}

fn client_builder(timeout_seconds: u64) -> reqwest::ClientBuilder {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::CACHE_CONTROL,
        reqwest::header::HeaderValue::from_static("no-store"),
    );
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(timeout_seconds.max(1)))
}

impl Fetcher {
    pub fn new(source: DatasetSource, timeout_seconds: u64) -> Result<Self, SourceError> {
        let client = client_builder(timeout_seconds)
            .build()
            .map_err(|e| SourceError::HttpClientBuild { source: e })?;
        Ok(Self { source, client })
    }

    pub async fn fetch(&self) -> Result<Vec<CourseRecord>, SourceError> {
        info!(source = %self.source.describe(), "loading catalog");
        let records = match &self.source {
            DatasetSource::JsonFile(path) => {
                let bytes = read_file(path).await?;
                parse_json(&bytes, &path.display().to_string())?
            }
            DatasetSource::BinaryFile(path) => {
                let bytes = read_file(path).await?;
                binary::decode_records(&bytes).map_err(|e| SourceError::Decode {
                    path: path.display().to_string(),
                    source: e,
                })?
            }
            DatasetSource::Url(url) => {
                let bytes = self.get(url).await?;
                parse_json(&bytes, url)?
            }
        };
        validate_records(&records, &self.source.describe())?;
        debug!(count = records.len(), "catalog loaded");
        Ok(records)
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SourceError::Request {
                url: url.to_string(),
                source: e,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(|e| SourceError::Request {
            url: url.to_string(),
            source: e,
        })?;
        Ok(body.to_vec())
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>, SourceError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| SourceError::FileRead {
            path: path.display().to_string(),
            source: e,
        })
}

fn parse_json(bytes: &[u8], origin: &str) -> Result<Vec<CourseRecord>, SourceError> {
    catalog::parse_json_catalog(bytes).map_err(|e| SourceError::Parse {
        origin: origin.to_string(),
        source: e,
    })
}

fn validate_records(records: &[CourseRecord], origin: &str) -> Result<(), SourceError> {
    for record in records {
        record
            .validate()
            .map_err(|message| SourceError::InvalidRecord {
                origin: origin.to_string(),
                message,
            })?;
    }
    Ok(())
}
