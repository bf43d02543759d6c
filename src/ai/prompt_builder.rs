/// Role given to the model as its system instruction.
pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant that summarizes articles and extracts important keywords.";

/// Number of keywords requested from the model.
pub const KEYWORD_COUNT: usize = 5;

/// Build the single user prompt sent alongside the article text.
#[must_use]
pub fn build_summary_prompt(article_text: &str, language: &str, max_chars: usize) -> String {
    format!(
        "Summarize the #Article below in {language}, following the #Rules.\n\
         We also want hashtags for social media: pick about {KEYWORD_COUNT} keywords that capture \
         what the article is about, preferring service and product names. Then output the result \
         as JSON. Do not end sentences with trailing punctuation.\n\
         \n\
         #Article\n\
         {article_text}\n\
         \n\
         #Rules\n\
         - The summary is at most {max_chars} characters\n\
         - Always put a single half-width space between runs of Latin script (product names etc.) \
         and non-Latin script\n\
         - No space is needed around punctuation, around brackets, or inside date expressions \
         such as YYYY年MM月DD日\n\
         - Also write a post for Twitter that includes the top 3 keywords\n\
         \n\
         #JSON format\n\
         {{\"summary\": \"summary text here\", \"keywords\": [\"keyword1\", \"keyword2\", \
         \"keyword3\", \"keyword4\", \"keyword5\"], \"tweet\": \"Twitter post here\"}}"
    )
}

/// Cut `text` to at most `max_chars` characters, never splitting a character.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_rules_and_article() {
        let prompt = build_summary_prompt("BODY TEXT", "Japanese", 500);
        assert!(prompt.contains("in Japanese"));
        assert!(prompt.contains("at most 500 characters"));
        assert!(prompt.contains("BODY TEXT"));
        assert!(prompt.contains("\"tweet\""));
        assert!(prompt.contains("YYYY年MM月DD日"));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
