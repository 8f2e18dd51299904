use scrag_core::config::ChunkingConfig;

use crate::text::normalize_newlines;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDraft {
    pub ordinal: u32,
    pub text: String,
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Paragraphs, with any paragraph longer than `max_chars` cut into word windows.
fn split_units(text: &str, max_chars: usize) -> Vec<String> {
    let mut units = Vec::new();
    for para in text.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
        if char_len(para) <= max_chars {
            units.push(para.to_string());
            continue;
        }

        let mut buf = String::new();
        for word in para.split_whitespace() {
            if char_len(word) > max_chars {
                if !buf.is_empty() {
                    units.push(std::mem::take(&mut buf));
                }
                let chars: Vec<char> = word.chars().collect();
                for piece in chars.chunks(max_chars) {
                    units.push(piece.iter().collect());
                }
                continue;
            }
            let add = if buf.is_empty() { char_len(word) } else { 1 + char_len(word) };
            if !buf.is_empty() && char_len(&buf) + add > max_chars {
                units.push(std::mem::take(&mut buf));
            }
            if !buf.is_empty() {
                buf.push(' ');
            }
            buf.push_str(word);
        }
        if !buf.is_empty() {
            units.push(buf);
        }
    }
    units
}

/// Trailing whole words of `text` totalling at most `overlap` characters.
fn overlap_tail(text: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }
    let mut words: Vec<&str> = Vec::new();
    let mut total = 0usize;
    for word in text.split_whitespace().rev() {
        let add = if words.is_empty() { char_len(word) } else { 1 + char_len(word) };
        if total + add > overlap {
            break;
        }
        total += add;
        words.push(word);
    }
    words.reverse();
    words.join(" ")
}

/// Split text into chunks of at most `chunk_size` characters. Consecutive chunks share up
/// to `chunk_overlap` characters of trailing context.
pub fn split_text(text: &str, cfg: &ChunkingConfig) -> Vec<ChunkDraft> {
    let normalized = normalize_newlines(text);
    let max = cfg.chunk_size.max(1);

    let mut out: Vec<ChunkDraft> = Vec::new();
    let mut buf = String::new();
    for unit in split_units(&normalized, max) {
        let add = if buf.is_empty() { char_len(&unit) } else { 2 + char_len(&unit) };
        if !buf.is_empty() && char_len(&buf) + add > max {
            let tail = overlap_tail(&buf, cfg.chunk_overlap);
            out.push(ChunkDraft {
                ordinal: out.len() as u32,
                text: std::mem::take(&mut buf),
            });
            if !tail.is_empty() && char_len(&tail) + 2 + char_len(&unit) <= max {
                buf = tail;
            }
        }
        if !buf.is_empty() {
            buf.push_str("\n\n");
        }
        buf.push_str(&unit);
    }
    if !buf.trim().is_empty() {
        out.push(ChunkDraft {
            ordinal: out.len() as u32,
            text: buf,
        });
    }
    out
}
