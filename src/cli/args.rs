//! CLI argument definitions using clap derive

use crate::core::parse_headers;
use crate::error::{Result, VhunterError};
use clap::{Args, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vhunter",
    version = "1.0.0",
    about = "Discover virtual hosts by fuzzing the Host header against a fixed IP",
    long_about = None,
    after_help = "EXAMPLE:\n   vhunter --ip 10.8.0.1 -w domains.txt -d example.com --verify"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(flatten)]
    pub http: HttpOpts,

    #[command(flatten)]
    pub target: TargetOpts,

    #[command(flatten)]
    pub policy: PolicyOpts,
}

/// Global options
#[derive(Args, Debug, Clone)]
pub struct GlobalOpts {
    /// File of FQDNs or subdomain prefixes to test
    #[arg(short, long, value_name = "FILE")]
    pub wordlist: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long, default_value = "10", value_name = "N")]
    pub threads: usize,

    /// Output file for findings (.json for JSON output)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress banner, summary and progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose output (show candidates matching the baseline)
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable progress bar
    #[arg(short = 'z', long)]
    pub no_progress: bool,

    /// No color output
    #[arg(long)]
    pub no_color: bool,
}

/// HTTP request shaping options
#[derive(Args, Debug, Clone)]
pub struct HttpOpts {
    /// Custom headers, "Name: Value" (can be used multiple times)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Proxy URL (http://host:port or socks5://host:port)
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "10", value_name = "SECS")]
    pub timeout: u64,
}

/// Target selection options
#[derive(Args, Debug, Clone)]
pub struct TargetOpts {
    /// IP address to fuzz (can be used multiple times)
    #[arg(long = "ip", value_name = "IP")]
    pub ips: Vec<String>,

    /// File list of IP addresses
    #[arg(long = "ips", value_name = "FILE")]
    pub ip_file: Option<PathBuf>,

    /// Port to connect to (can be used multiple times; default 443, or 80 with --no-tls)
    #[arg(short, long = "port", value_name = "PORT")]
    pub ports: Vec<u16>,

    /// Speak plain HTTP instead of HTTPS
    #[arg(long)]
    pub no_tls: bool,

    /// Domains appended to each wordlist entry (comma-separated)
    #[arg(short, long, value_delimiter = ',', value_name = "DOMAINS")]
    pub domains: Vec<String>,

    /// Path to request (can be used multiple times)
    #[arg(long = "path", value_name = "PATH")]
    pub paths: Vec<String>,

    /// File list of paths
    #[arg(long = "paths", value_name = "FILE")]
    pub path_file: Option<PathBuf>,
}

/// Comparison and baseline policy options
#[derive(Args, Debug, Clone)]
pub struct PolicyOpts {
    /// Dissimilarity (percent) a response needs to count as a different vhost.
    /// Lower values are stricter about what counts as the same response.
    #[arg(long, default_value = "60", value_name = "PERCENT")]
    pub threshold: u8,

    /// Retake the baseline every PERCENT of the candidate list
    #[arg(long, value_name = "PERCENT")]
    pub refresh: Option<u8>,

    /// Prefix refreshed baselines onto the previous candidate's hostname
    #[arg(long)]
    pub refresh_context: bool,

    /// Continue with an empty baseline when the baseline request fails
    #[arg(long)]
    pub force: bool,

    /// Verify findings differ from the publicly routed response
    #[arg(long)]
    pub verify: bool,
}

impl Cli {
    /// Whether the required inputs (an IP source and a wordlist) were given.
    pub fn has_required_inputs(&self) -> bool {
        (!self.target.ips.is_empty() || self.target.ip_file.is_some())
            && self.global.wordlist.is_some()
    }

    /// Range and syntax checks that must pass before any I/O.
    pub fn validate(&self) -> Result<()> {
        if self.policy.threshold > 100 {
            return Err(VhunterError::ConfigError(format!(
                "threshold must be between 0 and 100, got {}",
                self.policy.threshold
            )));
        }

        if let Some(refresh) = self.policy.refresh {
            if refresh == 0 || refresh > 100 {
                return Err(VhunterError::ConfigError(format!(
                    "refresh must be between 1 and 100, got {}",
                    refresh
                )));
            }
        }

        if self.global.threads == 0 {
            return Err(VhunterError::ConfigError(
                "threads must be greater than zero".to_string(),
            ));
        }

        if self.http.timeout == 0 {
            return Err(VhunterError::ConfigError(
                "timeout must be greater than zero".to_string(),
            ));
        }

        if let Some(ref proxy) = self.http.proxy {
            url::Url::parse(proxy)
                .map_err(|e| VhunterError::ConfigError(format!("invalid proxy '{}': {}", proxy, e)))?;
        }

        parse_headers(&self.http.headers)?;

        Ok(())
    }

    /// HTTPS unless `--no-tls` was given.
    pub fn tls(&self) -> bool {
        !self.target.no_tls
    }

    /// Ports to probe, falling back to the scheme default.
    pub fn ports(&self) -> Vec<u16> {
        if self.target.ports.is_empty() {
            vec![if self.tls() { 443 } else { 80 }]
        } else {
            self.target.ports.clone()
        }
    }

    /// Non-empty, trimmed domain suffixes.
    pub fn domains(&self) -> Vec<String> {
        self.target
            .domains
            .iter()
            .map(|d| d.trim().trim_start_matches('.').to_string())
            .filter(|d| !d.is_empty())
            .collect()
    }
}
