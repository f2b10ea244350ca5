//! Platform-specific shaping of generated text.
//!
//! Each platform gets a word budget and a decoration (hashtags, emoji, or a
//! call to action). Twitter additionally reserves character room for its
//! hashtags before decorating.

use crate::domain::types::Platform;

/// A post shaped for one platform, with counts taken after decoration.
#[derive(Debug, Clone)]
pub struct FormattedPost {
    pub content: String,
    pub title: String,
    pub word_count: usize,
    pub char_count: usize,
}

/// Trim, decorate, and title the text for the given platform.
pub fn format_for_platform(platform: Platform, text: &str) -> FormattedPost {
    let content = decorate(platform, text);
    let title = extract_title(text);
    let word_count = content.split_whitespace().count();
    let char_count = content.chars().count();
    FormattedPost {
        content,
        title,
        word_count,
        char_count,
    }
}

fn decorate(platform: Platform, text: &str) -> String {
    let trimmed = trim_to_words(text.trim(), platform.word_limit());
    match platform {
        Platform::Twitter => {
            // Leave room for the hashtags.
            let body = if trimmed.chars().count() > 240 {
                let cut: String = trimmed.chars().take(237).collect();
                format!("{}...", cut.trim_end())
            } else {
                trimmed
            };
            format!("{body}#Content #Social")
        }
        Platform::Instagram => format!("{trimmed}#Instagram #Social"),
        Platform::Linkedin => format!("{trimmed}#Professional #Development"),
        Platform::Facebook => format!("{trimmed}Like and share if you agree! 👍"),
        Platform::Wordpress => format!("{trimmed}#SEO #WordPress"),
        Platform::Youtube => format!("{trimmed}#Professional #Development"),
        Platform::Tiktok => trimmed,
    }
}

fn trim_to_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        text.to_string()
    } else {
        words[..limit].join(" ")
    }
}

/// Title from the first sentence when short enough, otherwise the first
/// seven words with an ellipsis.
pub fn extract_title(text: &str) -> String {
    let first_sentence = text.split(". ").next().unwrap_or("").trim();
    if first_sentence.is_empty() {
        return "Untitled Post".to_string();
    }
    if first_sentence.chars().count() <= 50 {
        return first_sentence.to_string();
    }
    let words: Vec<&str> = first_sentence.split_whitespace().take(7).collect();
    format!("{}...", words.join(" "))
}

/// Rotate the sentence window by (week, day) so each calendar slot sees a
/// different slice of the source text. Multi-post days shift by three
/// sentences per post and widen the window.
pub fn rotate_for_slot(text: &str, week: u32, day_index: usize, post_number: Option<u32>) -> String {
    let sentences: Vec<&str> = text.split(". ").collect();
    if sentences.len() < 2 {
        return text.to_string();
    }

    let base = (week.saturating_sub(1) as usize * 5 + day_index) % sentences.len();
    let offset = match post_number {
        Some(post) => (base + post.saturating_sub(1) as usize * 3) % sentences.len(),
        None => base,
    };
    let window = sentences.len().min(if post_number.is_some() { 15 } else { 5 });

    let mut selected: Vec<&str> = Vec::with_capacity(window);
    for step in 0..window {
        selected.push(sentences[(offset + step) % sentences.len()]);
    }
    selected.join(". ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_first_sentence_becomes_the_title() {
        assert_eq!(extract_title("Rust is fast. And safe."), "Rust is fast");
    }

    #[test]
    fn long_first_sentence_is_truncated_to_seven_words() {
        let text = "This opening sentence keeps going well past the fifty character limit for titles. More.";
        assert_eq!(
            extract_title(text),
            "This opening sentence keeps going well past..."
        );
    }

    #[test]
    fn blank_text_gets_a_placeholder_title() {
        assert_eq!(extract_title("   "), "Untitled Post");
    }

    #[test]
    fn twitter_trims_to_character_budget_and_tags() {
        let long = "word ".repeat(100);
        let post = format_for_platform(Platform::Twitter, &long);
        assert!(post.content.ends_with("#Content #Social"));
        let body = post.content.trim_end_matches("#Content #Social");
        assert!(body.chars().count() <= 240);
        assert!(body.ends_with("..."));
    }

    #[test]
    fn facebook_appends_call_to_action() {
        let post = format_for_platform(Platform::Facebook, "Short update.");
        assert!(post.content.ends_with("Like and share if you agree! 👍"));
    }

    #[test]
    fn youtube_carries_the_professional_hashtags() {
        let post = format_for_platform(Platform::Youtube, "Video summary.");
        assert_eq!(post.content, "Video summary.#Professional #Development");
    }

    #[test]
    fn tiktok_stays_undecorated() {
        let post = format_for_platform(Platform::Tiktok, "Clip notes.");
        assert_eq!(post.content, "Clip notes.");
    }

    #[test]
    fn word_limit_applies_before_decoration() {
        let long = "word ".repeat(500);
        let post = format_for_platform(Platform::Instagram, &long);
        let body = post.content.trim_end_matches("#Instagram #Social");
        assert_eq!(body.split_whitespace().count(), 400);
    }

    #[test]
    fn counts_reflect_the_decorated_text() {
        let post = format_for_platform(Platform::Tiktok, "two words");
        assert_eq!(post.word_count, 2);
        assert_eq!(post.char_count, 9);
    }

    #[test]
    fn rotation_differs_across_slots() {
        let text = "One. Two. Three. Four. Five. Six. Seven";
        let monday = rotate_for_slot(text, 1, 0, None);
        let tuesday = rotate_for_slot(text, 1, 1, None);
        assert_ne!(monday, tuesday);
    }

    #[test]
    fn rotation_differs_across_posts_on_one_day() {
        let text = "One. Two. Three. Four. Five. Six. Seven";
        let first = rotate_for_slot(text, 1, 0, Some(1));
        let second = rotate_for_slot(text, 1, 0, Some(2));
        assert_ne!(first, second);
    }

    #[test]
    fn multi_post_rotation_uses_a_wider_window() {
        let text: String = (1..=20)
            .map(|n| format!("Sentence {n}"))
            .collect::<Vec<_>>()
            .join(". ");

        let single = rotate_for_slot(&text, 1, 0, None);
        assert_eq!(single.split(". ").count(), 5);

        let multi = rotate_for_slot(&text, 1, 0, Some(1));
        assert_eq!(multi.split(". ").count(), 15);
    }

    #[test]
    fn single_sentence_text_is_returned_as_is() {
        assert_eq!(rotate_for_slot("Only one", 3, 2, None), "Only one");
    }
}
