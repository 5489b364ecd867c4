//! Text canonicalization applied before encoding.

/// Canonicalize request text: absent becomes empty, then lowercase and trim.
///
/// Total and idempotent, so `"Hello "` and `"hello"` encode identically.
/// Trimming covers Unicode whitespace plus the ASCII separators U+001C..=U+001F.
pub fn normalize(raw: Option<&str>) -> String {
    raw.unwrap_or_default().to_lowercase().trim_matches(is_trimmed).to_string()
}

fn is_trimmed(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercase_and_trim() {
        assert_eq!(normalize(Some("Hello World")), "hello world");
        assert_eq!(normalize(Some("  MIXED Case  ")), "mixed case");
        assert_eq!(normalize(Some("\t\nTabs\r\n")), "tabs");
        assert_eq!(normalize(Some("\u{1c}\u{1d}Records\u{1e}\u{1f}")), "records");
        assert_eq!(normalize(Some("a\u{1f}b")), "a\u{1f}b");
    }

    #[test]
    fn test_absent_and_empty() {
        assert_eq!(normalize(None), "");
        assert_eq!(normalize(Some("")), "");
        assert_eq!(normalize(Some("   ")), "");
    }

    #[test]
    fn test_inner_whitespace_is_kept() {
        assert_eq!(normalize(Some(" a  b ")), "a  b");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "Hello ",
            "  MIXED Case  ",
            "ÀÉÎ Ünïcödé",
            "İstanbul",
            "ΣΊΣΥΦΟΣ",
            "\u{3000}ideographic space\u{3000}",
            "\u{1c} File Sep \u{1f}",
            " \u{1e}\u{1d}",
            "",
        ];

        for input in inputs {
            let once = normalize(Some(input));
            let twice = normalize(Some(&once));
            assert_eq!(once, twice, "not idempotent for {:?}", input);
        }
    }

    #[test]
    fn test_case_variants_collapse() {
        assert_eq!(normalize(Some("Hello ")), normalize(Some("hello")));
        assert_eq!(normalize(Some("  MIXED Case  ")), normalize(Some("mixed case")));
    }
}
