//! # Error Suggestions
//!
//! Errors that carry a `hint:` telling the user how to recover.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dmrfill::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("At least one filter must be specified");
//!
//! // Use:
//! return Err(suggestions::cache_clean_no_filter());
//! ```

use std::path::Path;

/// Generate an error for when cache clean is called without filters.
///
/// Includes hints about available filter options.
pub fn cache_clean_no_filter() -> anyhow::Error {
    anyhow::anyhow!(
        "At least one filter must be specified for cache clean\n\n\
         hint: Use --all to remove all cached responses\n\
         hint: Use --older-than <DURATION> to remove old entries (e.g., '1h', '7d')"
    )
}

/// Generate an error for when the input codeplug cannot be opened.
pub fn input_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Input codeplug not found: {path}\n\n\
         hint: Export the codeplug from qdmr as YAML and pass it with --in\n\
         hint: Omit --in to read the codeplug from standard input",
        path = path.display()
    )
}

/// A `Did you mean '...'?` hint for a mistyped value, if one is close to a
/// valid candidate, followed by the list of valid values.
pub fn value_hint(input: &str, candidates: &[&str]) -> String {
    let valid = format!("Valid values are: {}", candidates.join(", "));
    match find_similar(input, candidates) {
        Some(s) => format!("Did you mean '{s}'? {valid}"),
        None => valid,
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Comparison ignores ASCII case. Returns Some(candidate) if a close match is
/// found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input = input.to_ascii_lowercase();
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(&input, &candidate.to_ascii_lowercase());
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance, keeping only the previous row of the table.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitute = prev[j] + usize::from(ca != cb);
            row[j + 1] = substitute.min(prev[j + 1] + 1).min(row[j] + 1);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_clean_no_filter_includes_hints() {
        let error = cache_clean_no_filter();
        let message = error.to_string();

        assert!(message.contains("filter must be specified"));
        assert!(message.contains("--all"));
        assert!(message.contains("--older-than"));
    }

    #[test]
    fn test_input_not_found_includes_hints() {
        let message = input_not_found(Path::new("/radios/md380.yaml")).to_string();
        assert!(message.contains("/radios/md380.yaml"));
        assert!(message.contains("hint:"));
        assert!(message.contains("standard input"));
    }

    #[test]
    fn test_value_hint_suggests_similar() {
        let hint = value_hint("RADIOID_DRM", &["RADIOID_DMR", "REPEATERBOOK_FM"]);
        assert!(hint.contains("Did you mean 'RADIOID_DMR'?"));
        assert!(hint.contains("Valid values are: RADIOID_DMR, REPEATERBOOK_FM"));
    }

    #[test]
    fn test_value_hint_no_suggestion_for_very_different() {
        let hint = value_hint("BRANDMEISTER", &["RADIOID_DMR", "REPEATERBOOK_FM"]);
        assert!(!hint.contains("Did you mean"));
        assert!(hint.contains("Valid values are:"));
    }

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("high", "high"), 0);
        assert_eq!(edit_distance("hgh", "high"), 1);
        assert_eq!(edit_distance("mile", "miles"), 1);
        assert_eq!(edit_distance("min", "max"), 2);
        assert_eq!(edit_distance("", "km"), 2);
    }

    #[test]
    fn test_find_similar() {
        let candidates = ["Min", "Low", "Mid", "High", "Max"];

        assert_eq!(find_similar("hihg", &candidates), Some("High"));
        assert_eq!(find_similar("LOW", &candidates), Some("Low"));
        assert_eq!(find_similar("medium", &candidates), None);
    }
}
