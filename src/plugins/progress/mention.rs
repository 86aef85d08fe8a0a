//! `@mention` autocomplete for task and notes inputs.
//!
//! Cursor positions are char indices into the input text.

use super::types::TeamMember;

/// Result of inserting a mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionInsert {
    pub text: String,
    pub cursor: usize,
}

/// Byte offset of the `char_index`-th char, clamped to the end of `text`.
fn byte_offset(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

/// The partial username typed after `@` in the word under the cursor.
///
/// The word is the whitespace-delimited token that contains or ends at the cursor.
/// Returns `None` when that word does not start with `@`.
pub fn mention_query(text: &str, cursor: usize) -> Option<&str> {
    let cursor_byte = byte_offset(text, cursor);
    let before = &text[..cursor_byte];

    let word_start = before
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map(|(offset, c)| offset + c.len_utf8())
        .unwrap_or(0);

    before[word_start..].strip_prefix('@')
}

/// Usernames starting with `query`, ignoring case, in list order.
pub fn filter_members<'a>(members: &'a [TeamMember], query: &str) -> Vec<&'a str> {
    let query = query.to_lowercase();
    members
        .iter()
        .map(|member| member.username.as_str())
        .filter(|username| username.to_lowercase().starts_with(&query))
        .collect()
}

/// Suggestions for the word under the cursor; empty when it is not a mention.
pub fn suggest<'a>(text: &str, cursor: usize, members: &'a [TeamMember]) -> Vec<&'a str> {
    match mention_query(text, cursor) {
        Some(query) => filter_members(members, query),
        None => Vec::new(),
    }
}

/// Replaces the `@partial` before the cursor with `@{username} `.
///
/// The returned cursor sits right after the inserted space.
pub fn insert_mention(text: &str, cursor: usize, username: &str) -> Option<MentionInsert> {
    let cursor_byte = byte_offset(text, cursor);
    let (before, after) = text.split_at(cursor_byte);
    let at_byte = before.rfind('@')?;

    let new_text = format!("{}@{} {}", &before[..at_byte], username, after);
    let at_char = before[..at_byte].chars().count();

    Some(MentionInsert {
        text: new_text,
        cursor: at_char + username.chars().count() + 2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(names: &[&str]) -> Vec<TeamMember> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| TeamMember {
                id: format!("m{}", i),
                username: name.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_mention_query_at_end() {
        assert_eq!(mention_query("@a", 2), Some("a"));
        assert_eq!(mention_query("hello @Bo", 9), Some("Bo"));
        assert_eq!(mention_query("hello @", 7), Some(""));
        assert_eq!(mention_query("hello", 5), None);
        assert_eq!(mention_query("", 0), None);
    }

    #[test]
    fn test_mention_query_mid_text() {
        // cursor right after "@an" with more text following
        let text = "ping @an about it";
        assert_eq!(mention_query(text, 8), Some("an"));
        // cursor inside a normal word
        assert_eq!(mention_query(text, 2), None);
        // newline separates words too
        assert_eq!(mention_query("line\n@b", 7), Some("b"));
    }

    #[test]
    fn test_mention_query_cursor_past_end_is_clamped() {
        assert_eq!(mention_query("@ay", 99), Some("ay"));
    }

    #[test]
    fn test_filter_is_case_insensitive_prefix_in_order() {
        let team = members(&["Ayush", "Anna", "Bob"]);
        assert_eq!(suggest("@a", 2, &team), vec!["Ayush", "Anna"]);
        assert_eq!(suggest("@A", 2, &team), vec!["Ayush", "Anna"]);
        assert_eq!(suggest("@b", 2, &team), vec!["Bob"]);
        assert_eq!(suggest("@", 1, &team), vec!["Ayush", "Anna", "Bob"]);
        assert!(suggest("@z", 2, &team).is_empty());
        assert!(suggest("a", 1, &team).is_empty());
    }

    #[test]
    fn test_insert_mention_at_end() {
        let inserted = insert_mention("talk to @an", 11, "Anna").unwrap();
        assert_eq!(inserted.text, "talk to @Anna ");
        assert_eq!(inserted.cursor, 14);
    }

    #[test]
    fn test_insert_mention_keeps_text_after_cursor() {
        let inserted = insert_mention("@ay later", 3, "Ayush").unwrap();
        assert_eq!(inserted.text, "@Ayush  later");
        assert_eq!(inserted.cursor, 7);
    }

    #[test]
    fn test_insert_mention_multibyte_prefix() {
        let inserted = insert_mention("café @b", 7, "Bob").unwrap();
        assert_eq!(inserted.text, "café @Bob ");
        assert_eq!(inserted.cursor, 10);
    }

    #[test]
    fn test_insert_mention_without_at() {
        assert_eq!(insert_mention("no mention", 10, "Bob"), None);
    }
}
