//! Prompt templates for the two generation calls.

const ART_PALETTE: &str = r"│─┌┐└┘├┤┬┴┼►◄▲▼○●◐◑░▒▓█▀▄■□▪▫★☆♦♠♣♥⟨⟩/\_|";

pub fn definition_prompt(topic: &str) -> String {
    format!(
        "Provide a concise, single-paragraph encyclopedia-style definition for the term: \"{topic}\". \
         Be informative and neutral. Do not use markdown, titles, or any special formatting. \
         Respond with only the text of the definition itself."
    )
}

pub fn art_prompt(topic: &str, include_text: bool) -> String {
    let art_part = format!(
        "1. \"art\": meta ASCII visualization of the word \"{topic}\":\n  \
         - Palette: {ART_PALETTE}\n  \
         - Shape mirrors concept - make the visual form embody the word's essence\n  \
         - Examples: \n    \
         * \"explosion\" → radiating lines from center\n    \
         * \"hierarchy\" → pyramid structure\n    \
         * \"flow\" → curved directional lines\n  \
         - Return as single string with \\n for line breaks"
    );

    let (keys, body, properties) = if include_text {
        let text_part = format!(
            "2. \"text\": the word \"{topic}\" spelled out in large blocky letters \
             using only █ ▀ ▄ and spaces, as a single string with \\n for line breaks"
        );
        (
            "two keys: \"art\" and \"text\"",
            format!("{art_part}\n\n{text_part}"),
            "the art and text properties",
        )
    } else {
        ("one key: \"art\"", art_part, "the art property")
    };

    format!(
        "For \"{topic}\", create a JSON object with {keys}.\n{body}\n\n\
         Return ONLY the raw JSON object, no additional text. \
         The response must start with \"{{\" and end with \"}}\" and contain only {properties}."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_prompt_embeds_topic() {
        let prompt = definition_prompt("Palimpsest");
        assert!(prompt.contains("for the term: \"Palimpsest\""));
        assert!(prompt.contains("single-paragraph"));
    }

    #[test]
    fn test_art_prompt_single_key() {
        let prompt = art_prompt("Vortex", false);
        assert!(prompt.starts_with("For \"Vortex\", create a JSON object with one key: \"art\"."));
        assert!(prompt.contains("░▒▓█"));
        assert!(prompt.contains("start with \"{\" and end with \"}\""));
        assert!(!prompt.contains("\"text\""));
    }

    #[test]
    fn test_art_prompt_with_text_key() {
        let prompt = art_prompt("Vortex", true);
        assert!(prompt.contains("two keys: \"art\" and \"text\""));
        assert!(prompt.contains("2. \"text\""));
    }
}
