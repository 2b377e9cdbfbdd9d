//! Chat text to typed commands.

use std::fmt;

/// Prefix every command verb carries in chat.
pub const COMMAND_PREFIX: char = '!';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Add,
    Delete,
    Check,
    SteamId,
    Count,
    Import,
    AddProof,
    Link,
}

impl Verb {
    pub const ALL: [Verb; 8] = [
        Verb::Add,
        Verb::Delete,
        Verb::Check,
        Verb::SteamId,
        Verb::Count,
        Verb::Import,
        Verb::AddProof,
        Verb::Link,
    ];

    /// Case-insensitive lookup of a `!verb` token.
    pub fn parse(token: &str) -> Option<Self> {
        let name = token.strip_prefix(COMMAND_PREFIX)?;
        Self::ALL
            .into_iter()
            .find(|verb| verb.name().eq_ignore_ascii_case(name))
    }

    pub fn name(self) -> &'static str {
        match self {
            Verb::Add => "add",
            Verb::Delete => "del",
            Verb::Check => "check",
            Verb::SteamId => "steamid",
            Verb::Count => "count",
            Verb::Import => "import",
            Verb::AddProof => "addproof",
            Verb::Link => "link",
        }
    }

    /// Token count including the verb itself.
    pub fn min_tokens(self) -> usize {
        match self {
            Verb::Count | Verb::Import | Verb::Link => 1,
            Verb::Add | Verb::Delete | Verb::Check | Verb::SteamId => 2,
            Verb::AddProof => 3,
        }
    }

    /// Read-only lookups anyone may run.
    pub fn requires_role(self) -> bool {
        !matches!(self, Verb::SteamId | Verb::Count)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", COMMAND_PREFIX, self.name())
    }
}

/// What a command does to the player named by its target token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add { attributes: Vec<String> },
    Delete,
    Check,
    SteamId,
    AddProof { proof: String },
}

impl Action {
    pub fn verb(&self) -> Verb {
        match self {
            Action::Add { .. } => Verb::Add,
            Action::Delete => Verb::Delete,
            Action::Check => Verb::Check,
            Action::SteamId => Verb::SteamId,
            Action::AddProof { .. } => Verb::AddProof,
        }
    }
}

/// A decoded command. Only [`Command::Targeted`] carries a player token,
/// still unresolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Targeted { target: String, action: Action },
    Count,
    Import,
    Link,
}

impl Command {
    pub fn verb(&self) -> Verb {
        match self {
            Command::Targeted { action, .. } => action.verb(),
            Command::Count => Verb::Count,
            Command::Import => Verb::Import,
            Command::Link => Verb::Link,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Command requires at least {min} args")]
pub struct TooFewArgs {
    pub verb: Verb,
    pub min: usize,
}

/// Collapse whitespace runs to single spaces and split.
pub fn tokenize(content: &str) -> Vec<&str> {
    content.split_whitespace().collect()
}

/// Decode a chat message. `None` when the first token is not a known verb,
/// so unrelated channel traffic is ignored.
pub fn parse(content: &str) -> Option<Result<Command, TooFewArgs>> {
    let tokens = tokenize(content);
    let verb = Verb::parse(tokens.first()?)?;

    if tokens.len() < verb.min_tokens() {
        return Some(Err(TooFewArgs {
            verb,
            min: verb.min_tokens(),
        }));
    }

    let action = match verb {
        Verb::Count => return Some(Ok(Command::Count)),
        Verb::Import => return Some(Ok(Command::Import)),
        Verb::Link => return Some(Ok(Command::Link)),
        Verb::Add => Action::Add {
            attributes: tokens[2..].iter().map(|t| t.to_string()).collect(),
        },
        Verb::Delete => Action::Delete,
        Verb::Check => Action::Check,
        Verb::SteamId => Action::SteamId,
        Verb::AddProof => Action::AddProof {
            proof: tokens[2..].join(" "),
        },
    };
    Some(Ok(Command::Targeted {
        target: tokens[1].to_string(),
        action,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_table() {
        let expected = [
            ("!add", 2, true),
            ("!del", 2, true),
            ("!check", 2, true),
            ("!steamid", 2, false),
            ("!count", 1, false),
            ("!import", 1, true),
            ("!addproof", 3, true),
            ("!link", 1, true),
        ];
        for (token, min, role) in expected {
            let verb = Verb::parse(token).expect("known verb");
            assert_eq!(verb.to_string(), token);
            assert_eq!(verb.min_tokens(), min, "{token}");
            assert_eq!(verb.requires_role(), role, "{token}");
        }
    }

    #[test]
    fn unknown_verbs_are_ignored() {
        assert_eq!(parse(""), None);
        assert_eq!(parse("   "), None);
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse("add 7656"), None);
        assert_eq!(parse("!remove 7656"), None);
    }

    #[test]
    fn whitespace_is_normalized_and_verb_is_case_insensitive() {
        assert_eq!(
            parse("  !ADD \t 76561198003911389   cheater\n racist "),
            Some(Ok(Command::Targeted {
                target: "76561198003911389".to_string(),
                action: Action::Add {
                    attributes: vec!["cheater".to_string(), "racist".to_string()],
                },
            }))
        );
    }

    #[test]
    fn too_few_args_names_the_minimum() {
        let err = parse("!addproof 76561198003911389")
            .expect("known verb")
            .expect_err("too short");
        assert_eq!(err.min, 3);
        assert_eq!(err.to_string(), "Command requires at least 3 args");
        assert!(matches!(parse("!del"), Some(Err(TooFewArgs { min: 2, .. }))));
    }

    #[test]
    fn proof_text_is_rejoined() {
        assert_eq!(
            parse("!addproof 123 https://example.com/a   and   more"),
            Some(Ok(Command::Targeted {
                target: "123".to_string(),
                action: Action::AddProof {
                    proof: "https://example.com/a and more".to_string(),
                },
            }))
        );
    }

    #[test]
    fn only_player_verbs_carry_a_target() {
        for verb in Verb::ALL {
            let mut content = verb.to_string();
            for _ in 1..verb.min_tokens() {
                content.push_str(" 123");
            }
            let command = parse(&content).expect("known verb").expect("enough args");
            assert_eq!(command.verb(), verb);
            assert_eq!(
                matches!(command, Command::Targeted { .. }),
                verb.min_tokens() > 1,
                "{content}"
            );
        }
        assert_eq!(parse("!link 123"), Some(Ok(Command::Link)));
    }
}
