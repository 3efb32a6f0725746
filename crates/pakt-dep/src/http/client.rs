//! Blocking download client.
//!
//! Wraps `reqwest::blocking::Client` with the configured User-Agent and
//! proxy, and serves `file://` URIs straight from disk. The client never
//! consults the environment: callers that want `HTTPS_PROXY` honoured pass
//! it in through [`HttpClientConfig::with_proxy`].

use std::fs::File;
use std::io::Write;
use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::{PaktError, Result};

pub const DEFAULT_USER_AGENT: &str = concat!("pakt/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    pub user_agent: String,
    pub proxy: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            timeout: None,
        }
    }
}

impl HttpClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct HttpClient {
    client: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(&config.user_agent);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match &config.proxy {
            Some(proxy_url) => {
                let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| PaktError::Download {
                    uri: proxy_url.clone(),
                    reason: format!("invalid proxy: {}", e),
                })?;
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };

        let client = builder.build()?;

        Ok(Self {
            client,
            user_agent: config.user_agent,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Stream the body at `uri` into `writer`, returning the number of bytes written
    pub fn download<W: Write + ?Sized>(&self, uri: &str, writer: &mut W) -> Result<u64> {
        let url = Url::parse(uri).map_err(|e| PaktError::Download {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() == "file" {
            return self.copy_file(uri, &url, writer);
        }

        log::trace!("GET {}", url);

        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| PaktError::Download {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PaktError::HttpStatus {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }

        response.copy_to(writer).map_err(|e| PaktError::Download {
            uri: uri.to_string(),
            reason: e.to_string(),
        })
    }

    fn copy_file<W: Write + ?Sized>(&self, uri: &str, url: &Url, writer: &mut W) -> Result<u64> {
        let path = url.to_file_path().map_err(|_| PaktError::Download {
            uri: uri.to_string(),
            reason: "not a local file path".to_string(),
        })?;

        let mut file = File::open(&path).map_err(|e| PaktError::Download {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        Ok(std::io::copy(&mut file, writer)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_builder() {
        let config = HttpClientConfig::new()
            .with_user_agent("test-agent/1.0".to_string())
            .with_proxy("http://proxy.example.com:3128".to_string())
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.proxy.as_deref(), Some("http://proxy.example.com:3128"));
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_default_user_agent() {
        let config = HttpClientConfig::default();
        assert!(config.user_agent.starts_with("pakt/"));
        assert_eq!(config.proxy, None);
    }

    #[test]
    fn test_file_uri() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fixture");
        std::fs::write(&path, b"test-fixture").unwrap();

        let uri = Url::from_file_path(&path).unwrap().to_string();
        let client = HttpClient::new().unwrap();
        let mut buffer = Vec::new();
        let written = client.download(&uri, &mut buffer).unwrap();

        assert_eq!(written, 12);
        assert_eq!(buffer, b"test-fixture");
    }

    #[test]
    fn test_missing_file_uri() {
        let dir = TempDir::new().unwrap();
        let uri = Url::from_file_path(dir.path().join("missing")).unwrap().to_string();

        let client = HttpClient::new().unwrap();
        let result = client.download(&uri, &mut Vec::new());
        assert!(matches!(result, Err(PaktError::Download { .. })));
    }

    #[test]
    fn test_invalid_uri() {
        let client = HttpClient::new().unwrap();
        let result = client.download("not a uri", &mut Vec::new());
        assert!(matches!(result, Err(PaktError::Download { .. })));
    }
}
