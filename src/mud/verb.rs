use crate::world::types::Direction;

/// The parsed, typed form of one raw input line. Parsing is total:
/// every string maps to some variant, with `Illegal` and `Empty` as the
/// rejection sentinels — never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verb {
    Illegal,
    Empty,
    Help,
    Close,
    CreateUser { username: String, password: String },
    Login { username: String, password: String },
    Look,
    Go { direction: Direction },
    OpenDoor { direction: Direction },
    Say { sentence: String },
    Whisper { target: String, message: String },
}

impl Verb {
    /// Minimum number of space-separated tokens (command word included)
    /// the command needs. Unknown words default to 1 so they fall
    /// through to the name match and come back `Illegal`.
    fn expected_word_count(word: &str) -> usize {
        match word.to_uppercase().as_str() {
            "CREATE_USER" | "LOGIN" | "WHISPER" => 3,
            "GO" | "OPEN_DOOR" | "SAY" => 2,
            _ => 1,
        }
    }

    /// Parse one raw line into a verb.
    ///
    /// Fixed-arity payloads are consumed positionally (extra tokens are
    /// ignored); trailing free-text payloads (`SAY`, `WHISPER`) join the
    /// remaining tokens back together with single spaces.
    pub fn parse(raw: &str) -> Verb {
        let trimmed = raw.trim();
        let parts: Vec<&str> = trimmed.split(' ').filter(|p| !p.is_empty()).collect();

        let Some(first) = parts.first() else {
            return Verb::Empty;
        };

        if parts.len() < Self::expected_word_count(first) {
            return Verb::Illegal;
        }

        match first.to_uppercase().as_str() {
            "HELP" => Verb::Help,
            "CLOSE" => Verb::Close,
            "CREATE_USER" => Verb::CreateUser {
                username: parts[1].to_string(),
                password: parts[2].to_string(),
            },
            "LOGIN" => Verb::Login {
                username: parts[1].to_string(),
                password: parts[2].to_string(),
            },
            "LOOK" => Verb::Look,
            "GO" => match parts[1].parse::<Direction>() {
                Ok(direction) => Verb::Go { direction },
                Err(()) => Verb::Illegal,
            },
            "OPEN_DOOR" => match parts[1].parse::<Direction>() {
                Ok(direction) => Verb::OpenDoor { direction },
                Err(()) => Verb::Illegal,
            },
            "SAY" => Verb::Say {
                sentence: parts[1..].join(" "),
            },
            "WHISPER" => Verb::Whisper {
                target: parts[1].to_string(),
                message: parts[2..].join(" "),
            },
            _ => Verb::Illegal,
        }
    }

    /// The argument tokens this verb carries, in catalog order. Used to
    /// hand parsed payloads to the command factory.
    pub fn arguments(&self) -> Vec<String> {
        match self {
            Verb::CreateUser { username, password } | Verb::Login { username, password } => {
                vec![username.clone(), password.clone()]
            }
            Verb::Go { direction } | Verb::OpenDoor { direction } => {
                vec![direction.to_string()]
            }
            Verb::Say { sentence } => vec![sentence.clone()],
            Verb::Whisper { target, message } => vec![target.clone(), message.clone()],
            _ => Vec::new(),
        }
    }

    /// Catalog name for dispatch, `None` for the sentinels.
    pub fn command_name(&self) -> Option<&'static str> {
        match self {
            Verb::Illegal | Verb::Empty => None,
            Verb::Help => Some("HELP"),
            Verb::Close => Some("CLOSE"),
            Verb::CreateUser { .. } => Some("CREATE_USER"),
            Verb::Login { .. } => Some("LOGIN"),
            Verb::Look => Some("LOOK"),
            Verb::Go { .. } => Some("GO"),
            Verb::OpenDoor { .. } => Some("OPEN_DOOR"),
            Verb::Say { .. } => Some("SAY"),
            Verb::Whisper { .. } => Some("WHISPER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_whitespace_lines_are_empty() {
        assert_eq!(Verb::parse(""), Verb::Empty);
        assert_eq!(Verb::parse("   \r\n"), Verb::Empty);
    }

    #[test]
    fn unknown_words_are_illegal() {
        assert_eq!(Verb::parse("DANCE"), Verb::Illegal);
    }

    #[test]
    fn command_words_match_case_insensitively() {
        assert_eq!(Verb::parse("close"), Verb::Close);
        assert_eq!(Verb::parse("Help"), Verb::Help);
    }

    #[test]
    fn too_few_tokens_is_illegal() {
        assert_eq!(Verb::parse("CREATE_USER alice"), Verb::Illegal);
        assert_eq!(Verb::parse("GO"), Verb::Illegal);
        assert_eq!(Verb::parse("WHISPER bob"), Verb::Illegal);
    }

    #[test]
    fn create_user_ignores_extra_tokens() {
        assert_eq!(
            Verb::parse("CREATE_USER alice secret trailing junk"),
            Verb::CreateUser {
                username: "alice".into(),
                password: "secret".into()
            }
        );
    }

    #[test]
    fn say_keeps_the_whole_sentence() {
        assert_eq!(
            Verb::parse("say Hello there, world!"),
            Verb::Say {
                sentence: "Hello there, world!".into()
            }
        );
    }

    #[test]
    fn whisper_splits_target_from_message() {
        assert_eq!(
            Verb::parse("WHISPER bob meet me at the inn"),
            Verb::Whisper {
                target: "bob".into(),
                message: "meet me at the inn".into()
            }
        );
    }

    #[test]
    fn go_with_bad_direction_is_illegal() {
        assert_eq!(Verb::parse("GO sideways"), Verb::Illegal);
        assert_eq!(
            Verb::parse("GO north"),
            Verb::Go {
                direction: Direction::North
            }
        );
    }
}
