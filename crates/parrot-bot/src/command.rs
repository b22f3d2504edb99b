//! Bot command parsing.

/// A recognised bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    /// Save the replied-to message under `trigger`.
    Save { trigger: String },
    Delete { trigger: String },
    List,
    Ping,
    Help,
}

/// Whether the text is addressed to the bot as a command.
pub fn is_command(text: &str) -> bool {
    text.starts_with('/')
}

impl Command {
    /// Parse a command message.
    ///
    /// Returns `None` for plain text, unknown commands, and `/save` or `/del`
    /// without a trigger. A `@botname` suffix on the command is ignored. The
    /// trigger is the rest of the first line, trimmed.
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.strip_prefix('/')?;
        let (head, rest) = match body.find(char::is_whitespace) {
            Some(idx) => body.split_at(idx),
            None => (body, ""),
        };
        let name = head.split('@').next().unwrap_or_default();
        let argument = rest.lines().next().unwrap_or_default().trim();

        match name {
            "start" => Some(Self::Start),
            "save" if !argument.is_empty() => Some(Self::Save {
                trigger: argument.to_string(),
            }),
            "del" if !argument.is_empty() => Some(Self::Delete {
                trigger: argument.to_string(),
            }),
            "list" => Some(Self::List),
            "ping" => Some(Self::Ping),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}
