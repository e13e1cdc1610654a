//! Immutable run configuration

use crate::cli::Cli;
use crate::core::{load_wordlist, parse_headers, HttpConfig};
use crate::error::{Result, VhunterError};
use std::collections::HashSet;
use std::time::Duration;

/// Everything a run needs, fixed before the first request goes out.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub ips: Vec<String>,
    pub ports: Vec<u16>,
    pub tls: bool,
    /// Each path starts with '/'
    pub paths: Vec<String>,
    pub wordlist: Vec<String>,
    pub domains: Vec<String>,
    pub threads: usize,
    pub http: HttpConfig,
    /// Custom headers, Host already removed
    pub headers: Vec<(String, String)>,
    /// Dissimilarity fraction in [0, 1]
    pub threshold: f64,
    /// Percent of the candidate list between baselines; `None` disables refresh
    pub refresh_percent: Option<u8>,
    pub baseline_context: bool,
    pub force: bool,
    pub verify: bool,
    pub verbose: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ips: Vec::new(),
            ports: vec![443],
            tls: true,
            paths: vec!["/".to_string()],
            wordlist: Vec::new(),
            domains: Vec::new(),
            threads: 10,
            http: HttpConfig::default(),
            headers: Vec::new(),
            threshold: 0.60,
            refresh_percent: None,
            baseline_context: false,
            force: false,
            verify: false,
            verbose: false,
        }
    }
}

impl RunConfig {
    /// Build from validated CLI arguments, reading any list files.
    pub async fn load(cli: &Cli) -> Result<Self> {
        let wordlist_path = cli
            .global
            .wordlist
            .as_ref()
            .ok_or_else(|| VhunterError::ConfigError("a wordlist is required".to_string()))?;
        let wordlist = load_wordlist(wordlist_path).await?;

        let mut ips = cli.target.ips.clone();
        if let Some(ref file) = cli.target.ip_file {
            ips.extend(load_wordlist(file).await?);
        }
        let ips = dedup(ips);
        if ips.is_empty() {
            return Err(VhunterError::ConfigError(
                "no IP addresses to test".to_string(),
            ));
        }

        let mut paths = cli.target.paths.clone();
        if let Some(ref file) = cli.target.path_file {
            paths.extend(load_wordlist(file).await?);
        }
        if paths.is_empty() {
            paths.push("/".to_string());
        }
        let paths = paths.iter().map(|p| normalize_path(p)).collect();

        Ok(Self {
            ips,
            ports: cli.ports(),
            tls: cli.tls(),
            paths,
            wordlist,
            domains: cli.domains(),
            threads: cli.global.threads,
            http: HttpConfig {
                timeout: Duration::from_secs(cli.http.timeout),
                proxy: cli.http.proxy.clone(),
            },
            headers: parse_headers(&cli.http.headers)?,
            threshold: f64::from(cli.policy.threshold) / 100.0,
            refresh_percent: cli.policy.refresh,
            baseline_context: cli.policy.refresh_context,
            force: cli.policy.force,
            verify: cli.policy.verify,
            verbose: cli.global.verbose,
        })
    }
}

/// Prefix a path with '/' if it lacks one.
pub fn normalize_path(path: &str) -> String {
    let path = path.trim();
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Drop repeated entries, keeping first-seen order.
fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}
