//! Line commands understood by the interactive front end.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit text through the input form: creates, or saves an edit.
    Submit(String),
    Edit(usize),
    Cancel,
    Toggle(usize),
    Remove(usize),
    /// Empty text clears the filter.
    Filter(String),
    Reload,
    Help,
    Quit,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command {0:?}; try `help`")]
    Unknown(String),
    #[error("`{0}` needs a row number")]
    MissingIndex(&'static str),
    #[error("bad row number {0:?}")]
    BadIndex(String),
}

pub const HELP: &str = "\
commands:
  add <text>     add a todo (saves the edit when editing)
  edit <n>       edit row n
  cancel         leave edit mode
  done <n>       toggle completion of row n
  rm <n>         remove row n
  filter [text]  show rows containing text; no text shows all
  reload         fetch the list from the server
  help | quit";

/// Rows are numbered from 1 as displayed.
fn index(cmd: &'static str, arg: &str) -> Result<usize, ParseError> {
    if arg.is_empty() {
        return Err(ParseError::MissingIndex(cmd));
    }
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n - 1),
        _ => Err(ParseError::BadIndex(arg.to_string())),
    }
}

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match head {
        "add" | "a" => Ok(Command::Submit(rest.to_string())),
        "edit" | "e" => index("edit", rest).map(Command::Edit),
        "cancel" => Ok(Command::Cancel),
        "done" | "toggle" | "d" => index("done", rest).map(Command::Toggle),
        "rm" | "remove" => index("rm", rest).map(Command::Remove),
        "filter" | "f" => Ok(Command::Filter(rest.to_string())),
        "reload" | "r" => Ok(Command::Reload),
        "help" | "?" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}
