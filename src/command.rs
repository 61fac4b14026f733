//! Command grammar for the quiz session protocol.
//!
//! One input line parses to exactly one [`Command`]. Parsing is total:
//! unknown tokens and empty lines are variants, never errors. Only the first
//! positional argument (an optional id) is ever consumed; anything after it
//! is ignored.

use thiserror::Error;

/// A parsed command invocation. Transient: derived from one input line and
/// not retained beyond dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the command table
    Help,

    /// List every quiz id and question
    List,

    /// Show one quiz's question and answer
    Show { raw_id: Option<String> },

    /// Interactively create a quiz (two follow-up prompts)
    Add,

    /// Delete one quiz
    Delete { raw_id: Option<String> },

    /// Interactively edit one quiz (two pre-filled follow-up prompts)
    Edit { raw_id: Option<String> },

    /// Ask one quiz's question and check the answer
    Test { raw_id: Option<String> },

    /// Play every quiz once, randomly, until a miss or completion
    Play,

    /// Show the practice authors
    Credits,

    /// Close the session
    Quit,

    /// Blank line: re-prompt, nothing else
    Empty,

    /// Anything else, carrying the offending token
    Unknown(String),
}

impl Command {
    /// Parse one input line. The command token is case-insensitive; `h`, `p`
    /// and `q` alias `help`, `play` and `quit`.
    pub fn parse(line: &str) -> Command {
        let mut parts = line.split_whitespace();
        let name = match parts.next() {
            Some(token) => token.to_lowercase(),
            None => return Command::Empty,
        };
        let raw_id = parts.next().map(|s| s.to_string());

        match name.as_str() {
            "help" | "h" => Command::Help,
            "list" => Command::List,
            "show" => Command::Show { raw_id },
            "add" => Command::Add,
            "delete" => Command::Delete { raw_id },
            "edit" => Command::Edit { raw_id },
            "test" => Command::Test { raw_id },
            "play" | "p" => Command::Play,
            "credits" => Command::Credits,
            "quit" | "q" => Command::Quit,
            _ => Command::Unknown(name),
        }
    }
}

/// Recoverable failures of a single command. All of these are rendered to the
/// user and the session prompt is re-issued; none tear the session down.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command needed an id and none was given
    #[error("missing id argument")]
    MissingArgument,

    /// The id argument did not parse as a base-10 integer
    #[error("id is not a number: {0}")]
    NotANumber(String),

    /// The store refused the operation
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

/// Validate an optional raw id argument before any store lookup.
///
/// Runs synchronously and always before the corresponding store call; a store
/// call is never attempted with an unvalidated id.
pub fn parse_id(raw_id: Option<&str>) -> Result<i64, CommandError> {
    let raw = raw_id.ok_or(CommandError::MissingArgument)?;
    raw.parse::<i64>()
        .map_err(|_| CommandError::NotANumber(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Command::parse("help"), Command::Help);
        assert_eq!(Command::parse("h"), Command::Help);
        assert_eq!(Command::parse("PLAY"), Command::Play);
        assert_eq!(Command::parse("p"), Command::Play);
        assert_eq!(Command::parse("q"), Command::Quit);
    }

    #[test]
    fn test_parse_id_argument() {
        assert_eq!(
            Command::parse("show 3"),
            Command::Show {
                raw_id: Some("3".to_string())
            }
        );
        // Only the first argument is consumed
        assert_eq!(
            Command::parse("delete 3 4 5"),
            Command::Delete {
                raw_id: Some("3".to_string())
            }
        );
        assert_eq!(Command::parse("edit"), Command::Edit { raw_id: None });
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse("   \t "), Command::Empty);
        assert_eq!(
            Command::parse("frobnicate now"),
            Command::Unknown("frobnicate".to_string())
        );
    }

    #[test]
    fn test_validate_id() {
        assert_eq!(parse_id(Some("7")).unwrap(), 7);
        assert_eq!(parse_id(Some("-3")).unwrap(), -3);
        assert_eq!(parse_id(Some("0")).unwrap(), 0);

        assert!(matches!(parse_id(None), Err(CommandError::MissingArgument)));
        assert!(matches!(
            parse_id(Some("abc")),
            Err(CommandError::NotANumber(s)) if s == "abc"
        ));
        assert!(matches!(
            parse_id(Some("3.5")),
            Err(CommandError::NotANumber(_))
        ));
    }
}
