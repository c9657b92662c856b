//! Line commands for the interactive admin console.

use thiserror::Error;

use super::client::AdminService;
use super::console::{AdminConsole, ConsoleError};
use super::types::{CategoryId, TagId};

pub const HELP: &str = "\
Commands:
  ls                         redraw the tree
  reload                     reload categories and tags from the server
  add-cat <name>             create a category
  edit-cat <id>              start editing a category
  draft <text>               change the category draft
  save-cat | cancel-cat      commit or discard the category edit
  rm-cat <id>                delete a category
  add-tag <cat> <name>       create a tag in a category
  edit-tag <cat> <tag>       start editing a tag
  draft-tag <text>           change the tag draft
  save-tag | cancel-tag      commit or discard the tag edit
  rm-tag <cat> <tag>         delete a tag
  help                       show this text
  quit                       leave the console";

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    List,
    Reload,
    AddCategory { name: String },
    EditCategory { id: CategoryId },
    CategoryDraft { text: String },
    SaveCategory,
    CancelCategory,
    RemoveCategory { id: CategoryId },
    AddTag { category_id: CategoryId, name: String },
    EditTag { category_id: CategoryId, tag_id: TagId },
    TagDraft { text: String },
    SaveTag,
    CancelTag,
    RemoveTag { category_id: CategoryId, tag_id: TagId },
    Help,
    Quit,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command: {0} (try `help`)")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line. Names keep their inner spacing and may be empty.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, CommandError> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "" => return Err(CommandError::Empty),
        "ls" => ConsoleCommand::List,
        "reload" => ConsoleCommand::Reload,
        "add-cat" => ConsoleCommand::AddCategory {
            name: rest.to_string(),
        },
        "edit-cat" => ConsoleCommand::EditCategory {
            id: single_id(rest, "edit-cat <id>")?,
        },
        "draft" => ConsoleCommand::CategoryDraft {
            text: rest.to_string(),
        },
        "save-cat" => ConsoleCommand::SaveCategory,
        "cancel-cat" => ConsoleCommand::CancelCategory,
        "rm-cat" => ConsoleCommand::RemoveCategory {
            id: single_id(rest, "rm-cat <id>")?,
        },
        "add-tag" => {
            let (category, name) = split_first(rest).ok_or(CommandError::Usage("add-tag <cat> <name>"))?;
            ConsoleCommand::AddTag {
                category_id: parse_id(category),
                name: name.to_string(),
            }
        }
        "edit-tag" => {
            let (category_id, tag_id) = id_pair(rest, "edit-tag <cat> <tag>")?;
            ConsoleCommand::EditTag {
                category_id,
                tag_id,
            }
        }
        "draft-tag" => ConsoleCommand::TagDraft {
            text: rest.to_string(),
        },
        "save-tag" => ConsoleCommand::SaveTag,
        "cancel-tag" => ConsoleCommand::CancelTag,
        "rm-tag" => {
            let (category_id, tag_id) = id_pair(rest, "rm-tag <cat> <tag>")?;
            ConsoleCommand::RemoveTag {
                category_id,
                tag_id,
            }
        }
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" | "q" => ConsoleCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(command)
}

fn parse_id<T: std::str::FromStr<Err = std::convert::Infallible>>(raw: &str) -> T {
    match raw.parse() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}

fn split_first(rest: &str) -> Option<(&str, &str)> {
    if rest.is_empty() {
        return None;
    }
    Some(match rest.split_once(char::is_whitespace) {
        Some((first, tail)) => (first, tail.trim()),
        None => (rest, ""),
    })
}

fn single_id(rest: &str, usage: &'static str) -> Result<CategoryId, CommandError> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(id), None) => Ok(parse_id(id)),
        _ => Err(CommandError::Usage(usage)),
    }
}

fn id_pair(rest: &str, usage: &'static str) -> Result<(CategoryId, TagId), CommandError> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(category), Some(tag), None) => Ok((parse_id(category), parse_id(tag))),
        _ => Err(CommandError::Usage(usage)),
    }
}

/// What the console loop should do after a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Redraw,
    ShowHelp,
    Quit,
}

/// Run one command against the console. Failures are also kept in the
/// console's `last_error`, so the caller only needs to redraw.
pub async fn execute<S>(
    console: &mut AdminConsole<S>,
    command: ConsoleCommand,
) -> Result<Flow, ConsoleError>
where
    S: AdminService + ?Sized + 'static,
{
    match command {
        ConsoleCommand::List => {}
        ConsoleCommand::Reload => console.load().await?,
        ConsoleCommand::AddCategory { name } => {
            console.set_new_category_draft(name);
            console.submit_new_category().await?;
        }
        ConsoleCommand::EditCategory { id } => console.begin_edit_category(&id)?,
        ConsoleCommand::CategoryDraft { text } => console.set_category_draft(text),
        ConsoleCommand::SaveCategory => {
            console.save_category().await?;
        }
        ConsoleCommand::CancelCategory => console.cancel_category_edit(),
        ConsoleCommand::RemoveCategory { id } => console.delete_category(&id).await?,
        ConsoleCommand::AddTag { category_id, name } => {
            console.set_new_tag_draft(&category_id, name);
            console.submit_new_tag(&category_id).await?;
        }
        ConsoleCommand::EditTag {
            category_id,
            tag_id,
        } => console.begin_edit_tag(&category_id, &tag_id)?,
        ConsoleCommand::TagDraft { text } => console.set_tag_draft(text),
        ConsoleCommand::SaveTag => {
            console.save_tag().await?;
        }
        ConsoleCommand::CancelTag => console.cancel_tag_edit(),
        ConsoleCommand::RemoveTag {
            category_id,
            tag_id,
        } => console.delete_tag(&category_id, &tag_id).await?,
        ConsoleCommand::Help => return Ok(Flow::ShowHelp),
        ConsoleCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Redraw)
}
