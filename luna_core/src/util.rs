//! Text helpers shared by the speech and logging paths.

const SPOKEN_PUNCTUATION: &str = ".,!?;:-'\"()_";

/// Strip everything a voice engine should not read aloud.
///
/// Keeps letters, digits, whitespace and `. , ! ? ; : - ' " ( ) _`; emoji and
/// other symbols are dropped. The result is trimmed.
#[must_use]
pub fn sanitize_for_speech(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || SPOKEN_PUNCTUATION.contains(*c))
        .collect();
    cleaned.trim().to_string()
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emoji_and_symbols() {
        assert_eq!(
            sanitize_for_speech("Kyaa~! Hello there, Master! 🌸 Luna is *super* excited!"),
            "Kyaa! Hello there, Master!  Luna is super excited!"
        );
    }

    #[test]
    fn keeps_allowed_punctuation() {
        let text = r#"Wait - "really"? (yes); ok: it's fine_ish."#;
        assert_eq!(sanitize_for_speech(text), text);
    }

    #[test]
    fn keeps_non_latin_letters() {
        assert_eq!(sanitize_for_speech("こんにちは ✨"), "こんにちは");
    }

    #[test]
    fn symbol_only_text_becomes_empty() {
        assert_eq!(sanitize_for_speech("  ✨🌟💖 ~~ "), "");
        assert_eq!(sanitize_for_speech(""), "");
    }

    #[test]
    fn preview_cuts_on_char_boundary() {
        assert_eq!(preview("héllo wörld", 5), "héllo...");
        assert_eq!(preview("short", 50), "short");
    }
}
