/// Title normalization for exact matching
///
/// Two titles match iff their normalized forms are byte-equal. There is no
/// fuzzy matching: near-misses are surfaced to the user as ambiguity instead
/// of being silently accepted.

/// Lowercase, drop `:`, turn `-` into a space, collapse whitespace runs and
/// trim. Idempotent.
pub fn normalize_title(title: &str) -> String {
    let cleaned: String = title
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ':' => None,
            '-' => Some(' '),
            c => Some(c),
        })
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte equality of normalized forms
pub fn titles_match(a: &str, b: &str) -> bool {
    normalize_title(a) == normalize_title(b)
}
