//! Deterministic stand-in art used whenever the art backend lets us down.

use unicode_width::UnicodeWidthStr;

use crate::inference::AsciiArtData;

const MAX_LABEL_CHARS: usize = 20;
const TRUNCATED_CHARS: usize = 17;

/// Draws `topic` inside a three-line box.
///
/// ```text
/// ┌────┐
/// │ Hi │
/// └────┘
/// ```
pub fn fallback_art(topic: &str) -> AsciiArtData {
    let label = if topic.chars().count() > MAX_LABEL_CHARS {
        let head: String = topic.chars().take(TRUNCATED_CHARS).collect();
        format!("{head}...")
    } else {
        topic.to_string()
    };
    let padded = format!(" {label} ");
    let rule = "─".repeat(padded.width());

    AsciiArtData {
        art: format!("┌{rule}┐\n│{padded}│\n└{rule}┘"),
        text: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_around_short_topic() {
        let art = fallback_art("Hi").art;
        assert_eq!(art, "┌────┐\n│ Hi │\n└────┘");

        let lines: Vec<&str> = art.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            assert_eq!(line.chars().count(), 6);
        }
    }

    #[test]
    fn test_twenty_chars_is_not_truncated() {
        let topic = "abcdefghijklmnopqrst";
        let art = fallback_art(topic).art;
        assert!(art.contains(&format!("│ {topic} │")));
    }

    #[test]
    fn test_long_topic_is_truncated_with_ellipsis() {
        let art = fallback_art("Unity and multiplicity forever").art;
        let middle = art.lines().nth(1).unwrap();
        assert_eq!(middle, "│ Unity and multipl... │");
        let top = art.lines().next().unwrap();
        assert_eq!(top.chars().count(), middle.chars().count());
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let topic = "ééééééééééééééééééééééé";
        let art = fallback_art(topic).art;
        let middle = art.lines().nth(1).unwrap();
        assert_eq!(middle, format!("│ {}... │", "é".repeat(17)));
    }

    #[test]
    fn test_fallback_has_no_text() {
        assert!(fallback_art("Void").text.is_none());
    }
}
