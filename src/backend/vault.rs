//! HTTP client for a Vault KV version 2 secrets engine.
//!
//! The first segment of every path is the engine mount. Listings go through
//! the `metadata/` endpoint and reads through `data/`.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::tree::{SecretMetadata, SecretPath, SecretRecord};

use super::{Backend, BackendError, ChildEntry};

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const TOKEN_FILE: &str = ".vault-token";

/// Problems found while setting up the client, before any request is made.
#[derive(Debug, Error)]
pub enum VaultConfigError {
    #[error("VAULT_ADDR is not set")]
    MissingAddress,

    #[error("no token found: set VAULT_TOKEN or log in to create ~/.vault-token")]
    MissingToken,

    #[error("invalid VAULT_ADDR '{0}'")]
    InvalidAddress(String),

    #[error("invalid VAULT_CLIENT_TIMEOUT '{0}': expected whole seconds")]
    InvalidTimeout(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connection settings, usually read from the standard Vault environment variables.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub address: String,
    pub token: String,
    pub namespace: Option<String>,
    pub timeout: Duration,
}

impl VaultConfig {
    /// Read `VAULT_ADDR`, `VAULT_TOKEN` (or `~/.vault-token`),
    /// `VAULT_NAMESPACE` and `VAULT_CLIENT_TIMEOUT`.
    pub fn from_env() -> Result<Self, VaultConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), dirs::home_dir().as_deref())
    }

    fn from_lookup<F>(lookup: F, home: Option<&Path>) -> Result<Self, VaultConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let address = non_empty("VAULT_ADDR")
            .ok_or(VaultConfigError::MissingAddress)?
            .trim()
            .trim_end_matches('/')
            .to_string();

        let token = match non_empty("VAULT_TOKEN") {
            Some(token) => token.trim().to_string(),
            None => home
                .map(|h| h.join(TOKEN_FILE))
                .and_then(|p| read_token_file(&p))
                .ok_or(VaultConfigError::MissingToken)?,
        };

        let timeout = match non_empty("VAULT_CLIENT_TIMEOUT") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| VaultConfigError::InvalidTimeout(raw))?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            address,
            token,
            namespace: non_empty("VAULT_NAMESPACE"),
            timeout,
        })
    }
}

fn read_token_file(path: &Path) -> Option<String> {
    let token = std::fs::read_to_string(path).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Blocking KV v2 client.
#[derive(Debug, Clone)]
pub struct VaultClient {
    client: Client,
    base_url: Url,
    token: String,
    namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ListData {
    #[serde(default)]
    keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ReadData {
    data: Option<BTreeMap<String, Value>>,
    metadata: Option<SecretMetadata>,
}

enum Endpoint {
    Metadata,
    Data,
}

impl Endpoint {
    fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Metadata => "metadata",
            Endpoint::Data => "data",
        }
    }
}

impl VaultClient {
    pub fn new(config: &VaultConfig) -> Result<Self, VaultConfigError> {
        let base_url = Url::parse(&config.address)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| VaultConfigError::InvalidAddress(config.address.clone()))?;

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token: config.token.clone(),
            namespace: config.namespace.clone(),
        })
    }

    /// Build `{addr}/v1/{mount}/{endpoint}/{sub...}`, percent-encoding each segment.
    fn url(&self, endpoint: Endpoint, path: &SecretPath) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("v1")
                .push(path.mount())
                .push(endpoint.as_str())
                .extend(&path.segments()[1..]);
            if path.depth() == 1 {
                // Listing a mount root needs the trailing slash.
                segments.push("");
            }
        }
        url
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url).header("X-Vault-Token", &self.token);
        match &self.namespace {
            Some(ns) => request.header("X-Vault-Namespace", ns),
            None => request,
        }
    }

    fn send(
        &self,
        path: &SecretPath,
        request: RequestBuilder,
    ) -> Result<(StatusCode, String), BackendError> {
        let response = request
            .send()
            .map_err(|e| BackendError::unavailable(path, e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| BackendError::unavailable(path, e.to_string()))?;
        debug!(path = %path, status = status.as_u16(), "vault response");
        Ok((status, body))
    }
}

fn status_error(path: &SecretPath, status: StatusCode, errors: &[String]) -> BackendError {
    match status {
        StatusCode::NOT_FOUND => BackendError::not_found(path),
        StatusCode::FORBIDDEN => BackendError::access_denied(path),
        _ if errors.is_empty() => BackendError::unavailable(path, format!("HTTP {}", status)),
        _ => BackendError::unavailable(path, format!("HTTP {}: {}", status, errors.join("; "))),
    }
}

fn parse_envelope<T>(
    path: &SecretPath,
    status: StatusCode,
    body: &str,
) -> Result<Envelope<T>, BackendError>
where
    T: for<'de> Deserialize<'de>,
{
    match serde_json::from_str(body) {
        Ok(envelope) => Ok(envelope),
        // Error bodies are not always JSON.
        Err(_) if !status.is_success() || body.trim().is_empty() => Ok(Envelope {
            data: None,
            errors: Vec::new(),
        }),
        Err(e) => Err(BackendError::unavailable(
            path,
            format!("malformed response: {}", e),
        )),
    }
}

impl Backend for VaultClient {
    fn list_children(&self, path: &SecretPath) -> Result<Vec<ChildEntry>, BackendError> {
        let url = self.url(Endpoint::Metadata, path);
        debug!(path = %path, "listing");
        let (status, body) = self.send(path, self.get(url).query(&[("list", "true")]))?;

        let envelope: Envelope<ListData> = parse_envelope(path, status, &body)?;
        if !status.is_success() {
            return Err(status_error(path, status, &envelope.errors));
        }

        let keys = envelope.data.map(|d| d.keys).unwrap_or_default();
        Ok(keys.iter().filter_map(|k| ChildEntry::from_listing(k)).collect())
    }

    fn fetch_secret(&self, path: &SecretPath) -> Result<SecretRecord, BackendError> {
        let url = self.url(Endpoint::Data, path);
        debug!(path = %path, "fetching");
        let (status, body) = self.send(path, self.get(url))?;

        let envelope: Envelope<ReadData> = parse_envelope(path, status, &body)?;

        match (status, envelope.data) {
            (s, Some(read)) if s.is_success() => Ok(SecretRecord {
                data: read.data.unwrap_or_default(),
                metadata: read.metadata,
            }),
            // A deleted or destroyed current version reads as 404 but still
            // carries its metadata.
            (StatusCode::NOT_FOUND, Some(ReadData { metadata: Some(meta), .. })) => {
                debug!(path = %path, "current version deleted");
                Ok(SecretRecord::default().with_metadata(meta))
            }
            (s, None) if s.is_success() => Err(BackendError::unavailable(path, "empty response")),
            (s, _) => Err(status_error(path, s, &envelope.errors)),
        }
    }
}
