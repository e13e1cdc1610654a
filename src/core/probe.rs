//! Host header probing against a fixed IP

use crate::error::{Result, VhunterError};
use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Response};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;
use url::Url;

/// Connection target: every probe connects here regardless of the Host header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub ip: String,
    pub port: u16,
    pub tls: bool,
}

impl Target {
    pub fn new(ip: impl Into<String>, port: u16, tls: bool) -> Self {
        Self {
            ip: ip.into(),
            port,
            tls,
        }
    }

    pub fn scheme(&self) -> &'static str {
        if self.tls {
            "https"
        } else {
            "http"
        }
    }

    fn default_port(&self) -> u16 {
        if self.tls {
            443
        } else {
            80
        }
    }

    /// Request URI for `path`; the port is only spelled out when it is not
    /// the scheme default.
    pub fn url(&self, path: &str) -> Result<Url> {
        let host = if self.ip.contains(':') && !self.ip.starts_with('[') {
            format!("[{}]", self.ip)
        } else {
            self.ip.clone()
        };

        let mut raw = format!("{}://{}", self.scheme(), host);
        if self.port != self.default_port() {
            raw.push_str(&format!(":{}", self.port));
        }
        raw.push_str(path);

        Ok(Url::parse(&raw)?)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ip.contains(':') && !self.ip.starts_with('[') {
            write!(f, "[{}]:{}", self.ip, self.port)
        } else {
            write!(f, "{}:{}", self.ip, self.port)
        }
    }
}

/// What a single probe observed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fingerprint {
    pub status: u16,
    /// Content-Length as reported by the server, if any
    pub content_length: Option<u64>,
    /// Status line, headers and body as they appeared on the wire
    pub raw_text: String,
}

impl Fingerprint {
    /// Stand-in baseline used when the real one cannot be obtained.
    pub fn zero() -> Self {
        Self {
            status: 0,
            content_length: Some(0),
            raw_text: String::new(),
        }
    }

    /// Capture a response, consuming its body.
    pub async fn capture(response: Response) -> Result<Self> {
        let status = response.status();
        let content_length = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());

        let mut raw_text = format!("{:?} {}\r\n", response.version(), status);
        for (name, value) in response.headers() {
            raw_text.push_str(name.as_str());
            raw_text.push_str(": ");
            raw_text.push_str(&String::from_utf8_lossy(value.as_bytes()));
            raw_text.push_str("\r\n");
        }
        raw_text.push_str("\r\n");

        let body = response.bytes().await?;
        raw_text.push_str(&String::from_utf8_lossy(&body));

        Ok(Self {
            status: status.as_u16(),
            content_length,
            raw_text,
        })
    }
}

/// Issues the requests the enumerator depends on.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Request `path` from `target` with the Host header set to `host`.
    async fn probe(&self, target: &Target, path: &str, host: &str) -> Result<Fingerprint>;

    /// Request `path` from `domain` through normal name resolution.
    async fn fetch_public(&self, domain: &str, path: &str, tls: bool) -> Result<Fingerprint>;
}

/// reqwest-backed prober
pub struct HttpProber {
    client: Client,
    headers: Vec<(String, String)>,
}

impl HttpProber {
    /// `headers` must already have any Host header removed (see `parse_headers`).
    pub fn new(client: Client, headers: Vec<(String, String)>) -> Self {
        Self { client, headers }
    }

    async fn send(&self, mut request: reqwest::RequestBuilder) -> Result<Fingerprint> {
        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        let response = request.send().await?;
        Fingerprint::capture(response).await
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, target: &Target, path: &str, host: &str) -> Result<Fingerprint> {
        let url = target.url(path)?;
        debug!(%url, host, "probing");
        self.send(self.client.get(url).header("Host", host)).await
    }

    async fn fetch_public(&self, domain: &str, path: &str, tls: bool) -> Result<Fingerprint> {
        let scheme = if tls { "https" } else { "http" };
        let url = Url::parse(&format!("{}://{}{}", scheme, domain, path))?;
        debug!(%url, "fetching public response");
        self.send(self.client.get(url)).await
    }
}

/// Gate that keeps the number of in-flight requests under a fixed limit.
pub struct Throttled<P> {
    inner: Arc<P>,
    permits: Arc<Semaphore>,
}

impl<P> Throttled<P> {
    pub fn new(inner: Arc<P>, limit: usize) -> Self {
        Self {
            inner,
            permits: Arc::new(Semaphore::new(limit.max(1))),
        }
    }
}

#[async_trait]
impl<P: Prober> Prober for Throttled<P> {
    async fn probe(&self, target: &Target, path: &str, host: &str) -> Result<Fingerprint> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| VhunterError::QueueClosed)?;
        self.inner.probe(target, path, host).await
    }

    async fn fetch_public(&self, domain: &str, path: &str, tls: bool) -> Result<Fingerprint> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| VhunterError::QueueClosed)?;
        self.inner.fetch_public(domain, path, tls).await
    }
}
