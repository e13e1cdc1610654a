//! Candidate hostname generation

/// Combine wordlist entries with domain suffixes.
///
/// Without suffixes the wordlist is returned as-is. Otherwise every entry is
/// joined with every suffix, wordlist order outermost. Duplicates are kept.
pub fn permute(wordlist: &[String], suffixes: &[String]) -> Vec<String> {
    if suffixes.is_empty() {
        return wordlist.to_vec();
    }

    let mut candidates = Vec::with_capacity(wordlist.len() * suffixes.len());
    for word in wordlist {
        for suffix in suffixes {
            candidates.push(format!("{}.{}", word, suffix));
        }
    }
    candidates
}
