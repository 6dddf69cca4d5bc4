//! Outbound client for the single upstream API.
//!
//! # Responsibilities
//! - Hold the pooled HTTP(S) client and the fixed base origin
//! - Form target URLs from the inbound path and query
//! - Provide the canonical Host header value
//! - Send one request; deadlines are applied by the caller

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, Method};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::ProxyError;

/// Client bound to one upstream origin.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    /// Base origin without trailing slash, e.g. `https://api.themoviedb.org`.
    base_url: String,
    host: HeaderValue,
}

impl UpstreamClient {
    /// Build a client for the configured upstream.
    pub fn new(config: &UpstreamConfig) -> Result<Self, ProxyError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .no_proxy()
            .build()?;
        Self::with_client(client, &config.base_url)
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ProxyError> {
        let parsed = Url::parse(base_url)?;
        let host = canonical_host(&parsed).ok_or(ProxyError::InvalidTarget(url::ParseError::EmptyHost))?;
        let host = HeaderValue::from_str(&host)
            .map_err(|_| ProxyError::InvalidTarget(url::ParseError::InvalidDomainCharacter))?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            host,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Value of the Host header sent upstream.
    pub fn host_header(&self) -> &HeaderValue {
        &self.host
    }

    /// Upstream URL for an inbound path and query.
    pub fn target_url(&self, path_and_query: &str) -> Result<Url, ProxyError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path_and_query))?)
    }

    /// Issue one request and return once response headers arrive.
    pub async fn send(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Option<Bytes>,
    ) -> Result<reqwest::Response, ProxyError> {
        let url = self.target_url(path_and_query)?;
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }
        Ok(request.send().await?)
    }
}

/// `host[:port]`, with the port omitted when it is the scheme default.
fn canonical_host(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> UpstreamClient {
        UpstreamClient::with_client(reqwest::Client::new(), base).unwrap()
    }

    #[test]
    fn test_default_port_omitted_from_host() {
        let upstream = client("https://api.themoviedb.org");
        assert_eq!(upstream.host_header(), "api.themoviedb.org");
        assert_eq!(upstream.base_url(), "https://api.themoviedb.org");

        let explicit_default = client("https://api.themoviedb.org:443/");
        assert_eq!(explicit_default.host_header(), "api.themoviedb.org");
    }

    #[test]
    fn test_explicit_port_kept_in_host() {
        let upstream = client("http://127.0.0.1:9000");
        assert_eq!(upstream.host_header(), "127.0.0.1:9000");
    }

    #[test]
    fn test_target_url_appends_path_and_query_verbatim() {
        let upstream = client("https://api.themoviedb.org/");
        let url = upstream.target_url("/3/movie/550?language=zh-CN&page=2").unwrap();
        assert_eq!(url.as_str(), "https://api.themoviedb.org/3/movie/550?language=zh-CN&page=2");
        assert_eq!(url.host_str(), Some("api.themoviedb.org"));
    }

    #[test]
    fn test_target_url_cannot_escape_origin() {
        let upstream = client("https://api.themoviedb.org");
        let url = upstream.target_url("//evil.example.com/x").unwrap();
        assert_eq!(url.host_str(), Some("api.themoviedb.org"));
    }

    #[test]
    fn test_rejects_unparsable_base() {
        let err = UpstreamClient::with_client(reqwest::Client::new(), "not a url").unwrap_err();
        assert!(matches!(err, ProxyError::InvalidTarget(_)));
    }
}
