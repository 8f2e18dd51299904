/// Longest prefix of `text` holding at most `max_chars` characters.
pub fn prefix_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Clip to `max_chars` characters, appending `...` when anything was cut.
pub fn clipped(text: &str, max_chars: usize) -> String {
    let head = prefix_chars(text, max_chars);
    if head.len() == text.len() {
        return text.to_string();
    }
    let mut s = head.to_string();
    s.push_str("...");
    s
}

pub fn normalize_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clipped_marks_truncation_only_when_needed() {
        assert_eq!(clipped("short", 10), "short");
        assert_eq!(clipped("exactly10!", 10), "exactly10!");
        assert_eq!(clipped("abcdefghijk", 10), "abcdefghij...");
    }

    #[test]
    fn prefix_respects_char_boundaries() {
        let s = "€€€€";
        assert_eq!(prefix_chars(s, 2), "€€");
        assert_eq!(clipped(s, 3), "€€€...");
    }

    #[test]
    fn normalizes_crlf_and_cr() {
        assert_eq!(normalize_newlines("a\r\nb\rc"), "a\nb\nc");
    }
}
