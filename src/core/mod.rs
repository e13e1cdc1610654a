//! Enumeration engine: probing, baselines, comparison and scheduling

pub mod baseline;
pub mod enumerate;
pub mod http;
pub mod permute;
pub mod probe;
pub mod similarity;
pub mod verify;
pub mod wordlist;

pub use baseline::{synthetic_host, BaselineManager, RefreshPolicy};
pub use enumerate::{Enumerator, Job, RunStats};
pub use http::{build_client, parse_headers, HttpConfig, USER_AGENT};
pub use permute::permute;
pub use probe::{Fingerprint, HttpProber, Prober, Target, Throttled};
pub use similarity::{compare_blocking, Comparator, TextDiffComparator, PUBLIC_MATCH_THRESHOLD};
pub use verify::Verifier;
pub use wordlist::load_wordlist;
