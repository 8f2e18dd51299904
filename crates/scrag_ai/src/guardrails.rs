use std::collections::BTreeSet;

/// `[Source N]` labels found in generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCitations {
    /// Labels within `1..=source_count`.
    pub cited: BTreeSet<usize>,
    /// Labels pointing past the supplied evidence.
    pub out_of_range: Vec<usize>,
}

/// Collect `Source <n>` citations inside square brackets. Diagnostic only; the pipeline
/// never rejects an answer over citations.
pub fn check_source_citations(text: &str, source_count: usize) -> SourceCitations {
    const MARKER: &str = "Source ";
    let mut out = SourceCitations::default();

    let mut depth = 0usize;
    let mut i = 0usize;
    let bytes = text.as_bytes();
    while i < bytes.len() {
        match bytes[i] {
            b'[' => depth += 1,
            b']' => depth = depth.saturating_sub(1),
            _ if depth > 0 && bytes[i..].starts_with(MARKER.as_bytes()) => {
                let start = i + MARKER.len();
                let len = bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count();
                if let Ok(n) = text[start..start + len].parse::<usize>() {
                    if (1..=source_count).contains(&n) {
                        out.cited.insert(n);
                    } else if !out.out_of_range.contains(&n) {
                        out.out_of_range.push(n);
                    }
                }
                i = start + len;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    out
}
