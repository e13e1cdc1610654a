//! Line-oriented input files (wordlists, IP lists, path lists)

use crate::error::{Result, VhunterError};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Load a wordlist, one entry per line.
///
/// Lines are trimmed; blank lines and `#` comments are skipped. Order and
/// duplicates are preserved.
pub async fn load_wordlist(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).await.map_err(|source| VhunterError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut lines = BufReader::new(file).lines();
    let mut words = Vec::new();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|source| VhunterError::InputFile {
            path: path.to_path_buf(),
            source,
        })?
    {
        let word = line.trim();
        if word.is_empty() || word.starts_with('#') {
            continue;
        }
        words.push(word.to_string());
    }

    Ok(words)
}
