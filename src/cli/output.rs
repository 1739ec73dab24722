//! Terminal output helpers.
//!
//! Section banners separate the pipeline phases (retrieval, tools, chat,
//! response) in interactive runs; everything else on stdout is the actual
//! command output.

use std::fmt::Write;

use crate::rag::SearchHit;

/// Banner width in columns.
const BANNER_WIDTH: usize = 80;

/// Default preview length for retrieved documents.
const PREVIEW_LEN: usize = 200;

/// Builds a section banner: the title centered in a line of `=` signs.
#[must_use]
pub fn banner(title: &str) -> String {
    let pad = BANNER_WIDTH.saturating_sub(title.chars().count() + 2);
    let left = pad / 2;
    let right = pad - left;
    format!("{} {title} {}", "=".repeat(left), "=".repeat(right))
}

/// Prints a section banner to stdout.
pub fn print_banner(title: &str) {
    println!("{}", banner(title));
}

/// Formats retrieval hits for display, one block per document.
#[must_use]
pub fn format_hits(hits: &[SearchHit], full: bool) -> String {
    let mut out = String::new();
    for (i, hit) in hits.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} (score: {:.4})",
            i + 1,
            hit.document.name,
            hit.score
        );
        let text = if full {
            hit.document.text.clone()
        } else {
            preview(&hit.document.text, PREVIEW_LEN)
        };
        for line in text.lines() {
            let _ = writeln!(out, "   {line}");
        }
    }
    out
}

/// Truncates text to `max_chars`, appending an ellipsis when shortened.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::Document;

    #[test]
    fn test_banner_width() {
        let line = banner("CHAT");
        assert_eq!(line.chars().count(), BANNER_WIDTH);
        assert!(line.contains(" CHAT "));
    }

    #[test]
    fn test_banner_odd_title() {
        // Odd-length titles still produce a full-width line.
        let line = banner("RAG");
        assert_eq!(line.chars().count(), BANNER_WIDTH);
    }

    #[test]
    fn test_banner_oversized_title() {
        let long = "X".repeat(100);
        let line = banner(&long);
        assert!(line.contains(&long));
    }

    #[test]
    fn test_preview_short_text() {
        assert_eq!(preview("short", 10), "short");
    }

    #[test]
    fn test_preview_truncation() {
        let out = preview("abcdefghij", 4);
        assert_eq!(out, "abcd...");
    }

    #[test]
    fn test_format_hits() {
        let hits = vec![SearchHit {
            document: Document::new("rust.md", "All about Rust."),
            score: 0.9123,
        }];
        let out = format_hits(&hits, false);
        assert!(out.contains("1. rust.md"));
        assert!(out.contains("0.9123"));
        assert!(out.contains("All about Rust."));
    }
}
