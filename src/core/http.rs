//! Shared HTTP client construction

use crate::error::{Result, VhunterError};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::warn;

/// User-Agent sent with every request unless overridden by a custom header
pub const USER_AGENT: &str = "vhunter/1.0";

/// HTTP client configuration
#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub proxy: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            proxy: None,
        }
    }
}

/// Build the client shared by every worker for the whole run.
///
/// Certificates are not validated and redirects are never followed: the
/// first response is the one being measured. No decompression features are
/// compiled in, so the captured text is what the server sent, and HTTP/1.1
/// keeps the `Host` header on the wire exactly as set.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    let mut builder = ClientBuilder::new()
        .user_agent(USER_AGENT)
        .timeout(config.timeout)
        .connect_timeout(config.timeout)
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::none())
        .http1_only()
        .pool_max_idle_per_host(100)
        .tcp_nodelay(true);

    if let Some(ref proxy_url) = config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    Ok(builder.build()?)
}

/// Parse "Name: Value" header strings.
///
/// A `Host` header is dropped: the probe's override must win.
pub fn parse_headers(raw: &[String]) -> Result<Vec<(String, String)>> {
    let mut headers = Vec::with_capacity(raw.len());

    for header in raw {
        let (name, value) = header
            .split_once(':')
            .ok_or_else(|| VhunterError::HeaderError(format!("'{}' is not Name: Value", header)))?;
        let name = name.trim();
        let value = value.trim();

        HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| VhunterError::HeaderError(format!("bad header name '{}'", name)))?;
        HeaderValue::from_str(value)
            .map_err(|_| VhunterError::HeaderError(format!("bad value for header '{}'", name)))?;

        if name.eq_ignore_ascii_case("host") {
            warn!("ignoring custom Host header, it would override the vhost under test");
            continue;
        }

        headers.push((name.to_string(), value.to_string()));
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_value_pairs() {
        let raw = vec![
            "X-Forwarded-For: 127.0.0.1".to_string(),
            "Cookie: a=b; c=d:e".to_string(),
        ];
        let headers = parse_headers(&raw).unwrap();
        assert_eq!(
            headers,
            vec![
                ("X-Forwarded-For".to_string(), "127.0.0.1".to_string()),
                ("Cookie".to_string(), "a=b; c=d:e".to_string()),
            ]
        );
    }

    #[test]
    fn host_header_is_dropped_in_any_case() {
        let raw = vec!["HoSt: evil.com".to_string(), "Accept: */*".to_string()];
        let headers = parse_headers(&raw).unwrap();
        assert_eq!(headers, vec![("Accept".to_string(), "*/*".to_string())]);
    }

    #[test]
    fn missing_colon_is_an_error() {
        let raw = vec!["Accept".to_string()];
        assert!(matches!(
            parse_headers(&raw),
            Err(VhunterError::HeaderError(_))
        ));
    }

    #[test]
    fn client_builds_with_proxy() {
        let config = HttpConfig {
            timeout: Duration::from_secs(3),
            proxy: Some("http://127.0.0.1:8080".to_string()),
        };
        assert!(build_client(&config).is_ok());
    }
}
