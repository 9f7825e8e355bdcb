use std::path::PathBuf;

/// A line typed at the client prompt, already checked for arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Auth(String),
    List,
    Download(String),
    Upload(PathBuf),
    Quit,
    /// Known verb with missing arguments; carries the usage text.
    Usage(&'static str),
    Unknown,
}

pub fn parse_input(line: &str) -> Option<UserCommand> {
    let mut parts = line.split_whitespace();
    let verb = parts.next()?.to_ascii_uppercase();
    let arg = parts.next();

    let command = match (verb.as_str(), arg) {
        ("AUTH", Some(password)) => UserCommand::Auth(password.to_string()),
        // Let the server answer "ERR Missing password"
        ("AUTH", None) => UserCommand::Auth(String::new()),
        ("LIST", _) => UserCommand::List,
        ("DOWNLOAD", Some(name)) => UserCommand::Download(name.to_string()),
        ("DOWNLOAD", None) => UserCommand::Usage("Usage: DOWNLOAD <filename>"),
        ("UPLOAD", Some(path)) => UserCommand::Upload(PathBuf::from(path)),
        ("UPLOAD", None) => UserCommand::Usage("Usage: UPLOAD <local_filepath>"),
        ("QUIT", _) => UserCommand::Quit,
        _ => UserCommand::Unknown,
    };
    Some(command)
}
