//! Text sanitization for inbound mention content.
//!
//! Source platforms hand us arbitrary UTF-8 with embedded control
//! characters and runaway whitespace. Everything stored goes through
//! `clean_text` first; `truncate_chars` enforces the configured length cap.

/// Strip control characters and collapse whitespace runs to single spaces.
/// Returns an empty string for all-whitespace or all-control input.
pub fn clean_text(text: &str) -> String {
    let stripped: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters, respecting char boundaries.
/// Oversized content is cut, never rejected.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

/// Lowercase a source/platform label for stable index keys.
pub fn normalize_source(source: &str) -> String {
    clean_text(source).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_control_characters() {
        assert_eq!(clean_text("hello\u{0000}world"), "hello world");
        assert_eq!(clean_text("tab\there"), "tab here");
        assert_eq!(clean_text("line\r\nbreak"), "line break");
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_text("  spaced   out  "), "spaced out");
        assert_eq!(clean_text("\n\n\t "), "");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 3), "hél");
        assert_eq!(truncate_chars("short", 10), "short");
        // Multi-byte chars must not be split mid-codepoint.
        assert_eq!(truncate_chars("日本語テスト", 3), "日本語");
    }

    #[test]
    fn sources_are_lowercased() {
        assert_eq!(normalize_source("Twitter"), "twitter");
        assert_eq!(normalize_source(" Reddit\n"), "reddit");
    }
}
