//! Recursive character splitter.
//!
//! Text is cut on the coarsest separator present (`"\n\n"`, then `"\n"`, then
//! `" "`, then between characters), and the resulting pieces are merged back
//! into chunks of at most `chunk_size` characters. Consecutive chunks share up
//! to `chunk_overlap` trailing characters so a sentence cut at a boundary is
//! still retrievable from either side.

use std::collections::VecDeque;

pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Clone, Debug)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl TextSplitter {
    /// `chunk_overlap` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Splits `text` into trimmed, non-empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        let (separator, rest) = pick_separator(text, separators);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut small: Vec<&str> = Vec::new();
        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                small.push(piece);
                continue;
            }
            if !small.is_empty() {
                chunks.extend(self.merge(&small, separator));
                small.clear();
            }
            if rest.is_empty() {
                chunks.push(piece.trim().to_string());
            } else {
                chunks.extend(self.split_with(piece, rest));
            }
        }
        if !small.is_empty() {
            chunks.extend(self.merge(&small, separator));
        }
        chunks.retain(|c| !c.is_empty());
        chunks
    }

    /// Greedily packs pieces into chunks, carrying the tail of each chunk
    /// (at most `chunk_overlap` characters) into the next one.
    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut out = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            let joined = |current: &VecDeque<&str>| if current.is_empty() { 0 } else { sep_len };

            if total + len + joined(&current) > self.chunk_size && !current.is_empty() {
                push_joined(&mut out, &current, separator);
                while total > self.chunk_overlap
                    || (total > 0 && total + len + joined(&current) > self.chunk_size)
                {
                    let Some(front) = current.pop_front() else {
                        break;
                    };
                    total -= char_len(front) + if current.is_empty() { 0 } else { sep_len };
                }
            }

            total += len + joined(&current);
            current.push_back(piece);
        }
        push_joined(&mut out, &current, separator);
        out
    }
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

fn pick_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep.as_str()) {
            return (sep.as_str(), &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn push_joined(out: &mut Vec<String>, pieces: &VecDeque<&str>, separator: &str) {
    let doc = pieces
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator);
    let doc = doc.trim();
    if !doc.is_empty() {
        out.push(doc.to_string());
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn short_text_is_a_single_chunk() {
        let s = TextSplitter::default();
        assert_eq!(s.split("  Hello world.  "), vec!["Hello world.".to_string()]);
    }

    #[test]
    fn blank_text_yields_nothing() {
        assert!(TextSplitter::default().split(" \n\n \n").is_empty());
    }

    #[test]
    fn chunks_respect_size_limit() {
        let para = "lorem ipsum dolor sit amet ".repeat(40);
        let text = format!("{para}\n\n{para}\n{para}");
        let s = TextSplitter::new(500, 50);
        let chunks = s.split(&text);
        assert!(chunks.len() > 3);
        for c in &chunks {
            assert!(c.chars().count() <= 500, "chunk too long: {}", c.len());
        }
    }

    #[test]
    fn neighbouring_chunks_overlap() {
        let words: Vec<String> = (0..200).map(|i| format!("w{i:03}")).collect();
        let text = words.join(" ");
        let chunks = TextSplitter::new(100, 20).split(&text);
        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let last_word = pair[0].rsplit(' ').next().unwrap();
            assert!(
                pair[1].contains(last_word),
                "{last_word} missing from next chunk"
            );
        }
    }

    #[test]
    fn unbroken_text_falls_back_to_characters() {
        let text = "x".repeat(1200);
        let chunks = TextSplitter::new(500, 50).split(&text);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 500));
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let text = "ж".repeat(130);
        let chunks = TextSplitter::new(50, 5).split(&text);
        assert!(chunks.iter().all(|c| c.chars().count() <= 50));
        assert!(chunks.len() >= 3);
    }
}
