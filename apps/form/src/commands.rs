//! Line commands read from stdin by the binary, one user interaction per line.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the job description with the rest of the line.
    Text(String),
    /// Pick the file at this path; blank means the dialog was dismissed.
    File(String),
    Clear,
    Submit,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}' (expected text, file, clear, submit or quit)")]
    Unknown(String),

    #[error("'{0}' takes no argument")]
    UnexpectedArgument(&'static str),
}

/// Parses one input line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() || line.trim_start().starts_with('#') {
        return Ok(None);
    }

    let line = line.trim_start();
    let (word, rest) = match line.split_once(' ') {
        Some((word, rest)) => (word, rest),
        None => (line.trim_end(), ""),
    };

    let command = match word {
        // the argument is kept exactly as typed, only escapes are expanded
        "text" => Command::Text(unescape(rest)),
        "file" => Command::File(rest.trim().to_string()),
        "clear" => no_argument("clear", rest, Command::Clear)?,
        "submit" => no_argument("submit", rest, Command::Submit)?,
        "quit" | "exit" => no_argument("quit", rest, Command::Quit)?,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn no_argument(
    name: &'static str,
    rest: &str,
    command: Command,
) -> Result<Command, CommandError> {
    if rest.trim().is_empty() {
        Ok(command)
    } else {
        Err(CommandError::UnexpectedArgument(name))
    }
}

/// Expands `\n`, `\t` and `\\`. Any other backslash is kept as is.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                out.push('\n');
                chars.next();
            }
            Some('t') => {
                out.push('\t');
                chars.next();
            }
            Some('\\') => {
                out.push('\\');
                chars.next();
            }
            _ => out.push('\\'),
        }
    }
    out
}
