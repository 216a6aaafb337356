//! Recognizes the bot's chat commands.
//!
//! Two commands exist, both anchored at the start of the line with a
//! case-insensitive keyword:
//! - `quoth [author]` asks for a random saved quote, optionally by one author.
//! - `forget <id>` deletes a saved quote by its 24-character id.

use std::sync::LazyLock;

use regex::Regex;

static RECALL_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?i:quoth)(?:\s+(\S+))?(?:\s|$)").expect("valid recall pattern"));
static FORGET_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?i:forget)\s+([A-Za-z0-9]{24})(?:\s|$)").expect("valid forget pattern"));

/// A classified chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Quote something at random, optionally only from `author` (a user name).
    Recall { author: Option<String> },
    /// Delete the quote with this id. The id is verbatim and not yet validated.
    Forget { id: String },
    NoCommand,
}

impl Command {
    /// Classifies `text`. Recall is tried before forget.
    pub fn parse(text: &str) -> Self {
        if let Some(captures) = RECALL_PATTERN.captures(text) {
            return Command::Recall {
                author: captures.get(1).map(|m| m.as_str().to_string()),
            };
        }

        if let Some(captures) = FORGET_PATTERN.captures(text) {
            return Command::Forget { id: captures[1].to_string() };
        }

        Command::NoCommand
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    fn recall(author: Option<&str>) -> Command {
        Command::Recall { author: author.map(str::to_string) }
    }

    #[test]
    fn recall_without_author() {
        assert_eq!(Command::parse("quoth"), recall(None));
        assert_eq!(Command::parse("QUOTH"), recall(None));
        assert_eq!(Command::parse("quoth   "), recall(None));
    }

    #[test]
    fn recall_with_author_keeps_token_verbatim() {
        assert_eq!(Command::parse("Quoth Alice"), recall(Some("Alice")));
        assert_eq!(Command::parse("quoth\tbob.smith"), recall(Some("bob.smith")));
        assert_eq!(Command::parse("quoth alice and then some"), recall(Some("alice")));
    }

    #[test]
    fn recall_keyword_must_stand_alone_at_line_start() {
        assert_eq!(Command::parse("hello quoth"), Command::NoCommand);
        assert_eq!(Command::parse(" quoth"), Command::NoCommand);
        assert_eq!(Command::parse("quothe the raven"), Command::NoCommand);
    }

    #[test]
    fn forget_with_valid_token() {
        assert_eq!(
            Command::parse("forget 5f2b1e7c9a0d3f4e6b8c1a2d"),
            Command::Forget {
                id: "5f2b1e7c9a0d3f4e6b8c1a2d".to_string()
            }
        );
        assert_eq!(
            Command::parse("FORGET 5F2B1E7C9A0D3F4E6B8C1A2D please"),
            Command::Forget {
                id: "5F2B1E7C9A0D3F4E6B8C1A2D".to_string()
            }
        );
    }

    #[test]
    fn forget_token_must_be_exactly_24_alphanumerics() {
        assert_eq!(Command::parse("forget short"), Command::NoCommand);
        assert_eq!(Command::parse("forget 5f2b1e7c9a0d3f4e6b8c1a2"), Command::NoCommand);
        assert_eq!(Command::parse("forget 5f2b1e7c9a0d3f4e6b8c1a2d0"), Command::NoCommand);
        assert_eq!(Command::parse("forget 5f2b1e7c9a0d-f4e6b8c1a2d0"), Command::NoCommand);
        assert_eq!(Command::parse("please forget 5f2b1e7c9a0d3f4e6b8c1a2d"), Command::NoCommand);
    }

    #[test]
    fn forget_accepts_non_hex_alphanumerics() {
        // Hex validation happens later, so the user gets a reply instead of silence.
        assert_eq!(
            Command::parse("forget zzzzzzzzzzzzzzzzzzzzzzzz"),
            Command::Forget {
                id: "zzzzzzzzzzzzzzzzzzzzzzzz".to_string()
            }
        );
    }

    #[test]
    fn other_text_is_not_a_command() {
        assert_eq!(Command::parse(""), Command::NoCommand);
        assert_eq!(Command::parse("good morning"), Command::NoCommand);
    }
}
