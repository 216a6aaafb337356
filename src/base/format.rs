//! Reply texts posted back to the channel.

use std::sync::LazyLock;

use regex::Regex;

use super::types::QuoteId;

/// Shown in place of an author the directory doesn't know.
pub const UNKNOWN_AUTHOR: &str = "UNKNOWN";

/// Reply when no quote matches a recall.
pub const NO_QUOTES: &str = "No quotes. Consider better posting.";

// `<inner>` or `<target|label>`; the label wins when present.
static MARKUP_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<(?:[^<>|]*\|)?([^<>]*)>").expect("valid markup pattern"));

/// Strips Slack's `<...>` wrappers, keeping the label of `<target|label>`
/// and the whole inner span otherwise.
pub fn strip_markup(text: &str) -> String {
    MARKUP_PATTERN.replace_all(text, "$1").into_owned()
}

/// Formats a recalled quote.
pub fn quote_reply(author: &str, id: &QuoteId, text: &str) -> String {
    format!("Quoth {author}:\t\t\t\t\t\t({id})\n{}", strip_markup(text))
}

pub fn deleted_reply(id: &str) -> String {
    format!("Beleted {id}.")
}

pub fn not_found_reply(id: &str) -> String {
    format!("What {id}? No {id}s here.")
}

pub fn invalid_id_reply(id: &str) -> String {
    format!("`{id}` is not a quote id.")
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_labelled_links_to_their_label() {
        assert_eq!(strip_markup("check <http://x.com|this>"), "check this");
    }

    #[test]
    fn strips_bare_wrappers_to_their_content() {
        assert_eq!(strip_markup("see <http://x.com>"), "see http://x.com");
        assert_eq!(strip_markup("hi <@U123>, meet <#C42|general>"), "hi @U123, meet general");
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(strip_markup("1 < 2"), "1 < 2");
        assert_eq!(strip_markup("nothing here"), "nothing here");
    }

    #[test]
    fn quote_reply_layout() {
        let id: QuoteId = "5f2b1e7c9a0d3f4e6b8c1a2d".parse().unwrap();

        assert_eq!(
            quote_reply("alice", &id, "check <http://x.com|this>"),
            "Quoth alice:\t\t\t\t\t\t(5f2b1e7c9a0d3f4e6b8c1a2d)\ncheck this"
        );
    }

    #[test]
    fn forget_replies() {
        assert_eq!(deleted_reply("abc"), "Beleted abc.");
        assert_eq!(not_found_reply("abc"), "What abc? No abcs here.");
        assert_eq!(invalid_id_reply("abc"), "`abc` is not a quote id.");
    }
}
