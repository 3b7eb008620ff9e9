//! Link presentation for member cells.
//!
//! Members keep links as one comma-delimited string. Splitting and URL
//! normalization happen here, at display time, and never reject input.

use once_cell::sync::Lazy;
use regex::Regex;

static SCHEME_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://").expect("valid scheme regex"));

/// Label cap in UTF-16 code units, the unit web clients slice by.
const LINK_LABEL_MAX_UNITS: usize = 30;
const DEFAULT_SCHEME_PREFIX: &str = "https://";

/// One clickable link derived from raw member link text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkView {
    /// Navigable URL; a scheme is prefixed when the entry lacks one.
    pub href: String,
    /// Short label without the scheme.
    pub label: String,
}

/// Splits raw comma-delimited link text into display links.
///
/// Entries are trimmed; empty entries are skipped.
pub fn split_links(raw: &str) -> Vec<LinkView> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| LinkView {
            href: normalize_href(entry),
            label: link_label(entry),
        })
        .collect()
}

/// Prefixes `https://` unless the entry already starts with `http`.
pub fn normalize_href(entry: &str) -> String {
    if entry.starts_with("http") {
        entry.to_string()
    } else {
        format!("{DEFAULT_SCHEME_PREFIX}{entry}")
    }
}

/// Drops a leading `http://`/`https://` and caps the label at 30 UTF-16
/// code units.
///
/// A character that would straddle the cap is left out whole. The ellipsis
/// is appended when the full entry (scheme included) is longer than the cap.
pub fn link_label(entry: &str) -> String {
    let without_scheme = SCHEME_PREFIX_RE.replace(entry, "");
    let mut units = 0;
    let mut label: String = without_scheme
        .chars()
        .take_while(|ch| {
            units += ch.len_utf16();
            units <= LINK_LABEL_MAX_UNITS
        })
        .collect();
    if entry.encode_utf16().count() > LINK_LABEL_MAX_UNITS {
        label.push_str("...");
    }
    label
}

#[cfg(test)]
mod tests {
    use super::{link_label, normalize_href, split_links};

    #[test]
    fn split_trims_and_skips_empty_entries() {
        let links = split_links(" example.com , ,https://rust-lang.org,");
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href, "https://example.com");
        assert_eq!(links[0].label, "example.com");
        assert_eq!(links[1].href, "https://rust-lang.org");
        assert_eq!(links[1].label, "rust-lang.org");
    }

    #[test]
    fn empty_text_yields_no_links() {
        assert!(split_links("").is_empty());
        assert!(split_links(" , ").is_empty());
    }

    #[test]
    fn href_keeps_existing_scheme() {
        assert_eq!(normalize_href("http://a.b"), "http://a.b");
        assert_eq!(normalize_href("a.b/c"), "https://a.b/c");
    }

    #[test]
    fn long_labels_are_truncated_with_ellipsis() {
        let entry = "https://example.com/a/very/long/path/segment";
        let label = link_label(entry);
        assert!(label.starts_with("example.com/"));
        assert!(label.ends_with("..."));
        assert_eq!(label.chars().count(), 33);
    }

    #[test]
    fn label_cap_counts_utf16_units() {
        // Each emoji is two UTF-16 units: 15 fit, the 16th does not.
        let entry = "\u{1F600}".repeat(16);
        let label = link_label(&entry);
        assert_eq!(label, format!("{}...", "\u{1F600}".repeat(15)));

        let bengali = "\u{0986}".repeat(30);
        assert_eq!(link_label(&bengali), bengali);
    }

    #[test]
    fn short_labels_are_kept_whole() {
        assert_eq!(link_label("https://a.io"), "a.io");
    }
}
