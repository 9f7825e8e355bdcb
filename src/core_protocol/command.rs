use std::fmt;

#[derive(Eq, Hash, PartialEq, Debug, Clone)]
pub enum Verb {
    Auth,
    List,
    Download,
    Upload,
    Quit,
    Unknown(String),
}

impl Verb {
    /// Verbs are matched case-insensitively; unknown ones keep their upper-cased form.
    pub fn from_token(token: &str) -> Verb {
        match token.to_ascii_uppercase().as_str() {
            "AUTH" => Verb::Auth,
            "LIST" => Verb::List,
            "DOWNLOAD" => Verb::Download,
            "UPLOAD" => Verb::Upload,
            "QUIT" => Verb::Quit,
            other => Verb::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Verb::Auth => "AUTH",
            Verb::List => "LIST",
            Verb::Download => "DOWNLOAD",
            Verb::Upload => "UPLOAD",
            Verb::Quit => "QUIT",
            Verb::Unknown(verb) => verb,
        }
    }

    /// Whether the verb is refused until the session has authenticated.
    pub fn requires_auth(&self) -> bool {
        !matches!(self, Verb::Auth | Verb::Quit)
    }
}

/// One request line, split into its verb and argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub verb: Verb,
    pub args: Vec<String>,
}

impl Command {
    pub fn new<I, T>(verb: Verb, args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            verb,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Command> {
        let mut parts = line.split_whitespace();
        let verb = Verb::from_token(parts.next()?);
        Some(Command::new(verb, parts))
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb.as_str())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
