//! Line commands of the `postboard` terminal front end.
//!
//! - `list` - Refetch and show the posts
//! - `title <text>`, `author <text>`, `body <text>` - Fill a field of the visible form
//! - `save` - Submit the visible form
//! - `edit <n>` - Edit the n-th listed post
//! - `cancel` - Leave the edit form
//! - `delete <n>` - Delete the n-th listed post, after confirmation
//! - `help` - Show this list
//! - `quit` - Exit

use postboard_common::model::post::PostField;
use std::{num::NonZeroUsize, str::FromStr};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  list               Refetch and show the posts
  title <text>       Set the title of the visible form
  author <text>      Set the author of the visible form
  body <text>        Set the body of the visible form
  save               Submit the visible form
  edit <n>           Edit post number n
  cancel             Leave the edit form
  delete <n>         Delete post number n
  help               Show this help
  quit               Exit";

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Command {
    List,
    Set(PostField, String),
    Save,
    /// 1-based position in the rendered list.
    Edit(NonZeroUsize),
    Cancel,
    Delete(NonZeroUsize),
    Help,
    Quit,
}

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum CommandParseError {
    #[error("Unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{0}` needs a post number")]
    MissingNumber(&'static str),
    #[error("`{0}` is not a post number")]
    InvalidNumber(String),
}

fn post_number(command: &'static str, arg: &str) -> Result<NonZeroUsize, CommandParseError> {
    if arg.is_empty() {
        return Err(CommandParseError::MissingNumber(command));
    }

    arg.parse().map_err(|_| CommandParseError::InvalidNumber(arg.to_owned()))
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let (name, arg) = input
            .split_once(char::is_whitespace)
            .map_or((input, ""), |(name, arg)| (name, arg.trim()));

        let command = match name.to_lowercase().as_str() {
            "list" | "ls" | "refresh" => Self::List,
            "title" => Self::Set(PostField::Title, arg.to_owned()),
            "author" => Self::Set(PostField::Author, arg.to_owned()),
            "body" => Self::Set(PostField::Body, arg.to_owned()),
            "save" | "submit" => Self::Save,
            "edit" => Self::Edit(post_number("edit", arg)?),
            "cancel" => Self::Cancel,
            "delete" | "rm" => Self::Delete(post_number("delete", arg)?),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            _ => return Err(CommandParseError::Unknown(name.to_owned())),
        };

        Ok(command)
    }
}
