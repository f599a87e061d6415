//! Greedy word wrap against measured glyph widths
//!
//! Lines are built from the longest run of remaining words whose rendered
//! width fits the box, backing off one word at a time. A single word is
//! always accepted, so an over-wide word overflows instead of being split.

use crate::fonts::MeasureText;
use serde::Deserialize;

/// Line emitted between paragraphs by [`WrapPolicy::Punctuated`]
pub const PARAGRAPH_SEPARATOR: &str = ";";

/// How words are grouped before greedy fitting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapPolicy {
    /// One paragraph, words separated by single spaces
    #[default]
    Plain,
    /// A standalone `;` starts a new paragraph and is kept as its own line;
    /// a standalone `,` sticks to the word before it and is kept
    Punctuated,
}

/// Wrap `text` so every line fits `box_width` pixels when rendered with `font`.
///
/// Newlines in the input are treated as spaces, so wrapping already wrapped
/// text with the same box gives the same lines back.
pub fn fit_text<M: MeasureText + ?Sized>(text: &str, font: &M, box_width: f32) -> String {
    fit_text_with(text, font, box_width, WrapPolicy::Plain)
}

pub fn fit_text_with<M: MeasureText + ?Sized>(
    text: &str,
    font: &M,
    box_width: f32,
    policy: WrapPolicy,
) -> String {
    let normalized = text.replace('\n', " ");
    let words: Vec<&str> = normalized.trim().split(' ').collect();

    let lines = match policy {
        WrapPolicy::Plain => fit_words(&words, font, box_width),
        WrapPolicy::Punctuated => fit_paragraphs(&words, font, box_width),
    };
    lines.join("\n")
}

fn fit_words<M, W>(words: &[W], font: &M, box_width: f32) -> Vec<String>
where
    M: MeasureText + ?Sized,
    W: AsRef<str>,
{
    let mut lines = Vec::new();
    let mut remaining = words;

    while !remaining.is_empty() {
        let mut n = remaining.len();
        let mut line = join_words(&remaining[..n]);
        while n > 1 && font.text_width(&line) > box_width {
            n -= 1;
            line = join_words(&remaining[..n]);
        }
        lines.push(line);
        remaining = &remaining[n..];
    }

    lines
}

fn fit_paragraphs<M: MeasureText + ?Sized>(words: &[&str], font: &M, box_width: f32) -> Vec<String> {
    let mut glued: Vec<String> = Vec::with_capacity(words.len());
    for word in words {
        match glued.last_mut() {
            Some(previous) if *word == "," && previous.as_str() != PARAGRAPH_SEPARATOR => {
                previous.push(',')
            }
            _ => glued.push((*word).to_string()),
        }
    }

    let mut lines = Vec::new();
    for (i, paragraph) in glued.split(|w| w == PARAGRAPH_SEPARATOR).enumerate() {
        if i > 0 {
            lines.push(PARAGRAPH_SEPARATOR.to_string());
        }
        if !paragraph.is_empty() {
            lines.extend(fit_words(paragraph, font, box_width));
        }
    }
    lines
}

fn join_words<W: AsRef<str>>(words: &[W]) -> String {
    let mut line = String::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(word.as_ref());
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every character is 10px wide
    struct Mono;

    impl MeasureText for Mono {
        fn text_width(&self, text: &str) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    #[test]
    fn test_plain_two_words_one_per_line() {
        assert_eq!(fit_text("abcd efgh", &Mono, 50.0), "abcd\nefgh");
    }

    #[test]
    fn test_plain_everything_fits() {
        assert_eq!(fit_text("abcd efgh", &Mono, 90.0), "abcd efgh");
    }

    #[test]
    fn test_empty_input_is_one_empty_line() {
        assert_eq!(fit_text("", &Mono, 50.0), "");
        assert_eq!(fit_text("  \n ", &Mono, 50.0), "");
    }

    #[test]
    fn test_overlong_word_is_not_split() {
        assert_eq!(fit_text("a abcdefghij b", &Mono, 30.0), "a\nabcdefghij\nb");
    }

    #[test]
    fn test_newlines_become_spaces() {
        assert_eq!(fit_text("ab\ncd", &Mono, 100.0), "ab cd");
    }

    #[test]
    fn test_punctuated_semicolon_breaks_paragraph() {
        let wrapped = fit_text_with("ab cd ; ef", &Mono, 100.0, WrapPolicy::Punctuated);
        assert_eq!(wrapped, "ab cd\n;\nef");
    }

    #[test]
    fn test_punctuated_comma_sticks_to_previous_word() {
        let wrapped = fit_text_with("abc , def", &Mono, 40.0, WrapPolicy::Punctuated);
        assert_eq!(wrapped, "abc,\ndef");
    }

    #[test]
    fn test_punctuated_comma_is_never_dropped() {
        // Nothing to glue to at the start of the text or of a paragraph
        let wrapped = fit_text_with(", ab ; , cd", &Mono, 100.0, WrapPolicy::Punctuated);
        assert_eq!(wrapped, ", ab\n;\n, cd");
        let words = fit_text_with("a , b , c", &Mono, 20.0, WrapPolicy::Punctuated);
        assert_eq!(words, "a,\nb,\nc");
    }

    #[test]
    fn test_punctuated_without_marks_matches_plain() {
        let text = "the quick brown fox jumps over the lazy dog";
        assert_eq!(
            fit_text_with(text, &Mono, 100.0, WrapPolicy::Punctuated),
            fit_text(text, &Mono, 100.0)
        );
    }
}
