//! Interactive session combining the list screen and the detail screen.
//!
//! The list is re-rendered from the live view whenever a write commits;
//! writes are dispatched without waiting for their result.

use crate::render::{format_detail, format_list};
use datarecord_core::{validate_record_text, Record, RecordCoordinator, RecordId, RecordStore};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands:
  list                 show all records
  show <id>            show one record
  add <text>           create a record
  edit <id> <text>     replace a record's text
  delete <id>          delete a record
  help                 show this message
  quit                 leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    List,
    Show(RecordId),
    Add(String),
    Edit(RecordId, String),
    Delete(RecordId),
    Help,
    Quit,
}

/// Parses one input line. Text arguments are kept verbatim, blank included.
pub fn parse_shell_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ShellCommand::Empty);
    }

    let (verb, rest) = split_word(line);
    match verb {
        "list" | "ls" => Ok(ShellCommand::List),
        "show" => Ok(ShellCommand::Show(parse_id(rest)?)),
        "add" => Ok(ShellCommand::Add(rest.to_string())),
        "edit" => {
            let (id, text) = split_word(rest);
            Ok(ShellCommand::Edit(parse_id(id)?, text.to_string()))
        }
        "delete" | "rm" => Ok(ShellCommand::Delete(parse_id(rest)?)),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command `{other}`; type `help`")),
    }
}

pub async fn run<S: RecordStore + 'static>(
    coordinator: &RecordCoordinator<S>,
) -> anyhow::Result<()> {
    let mut all_items = coordinator.all_items();
    println!("{HELP}\n");
    println!("{}", format_list(&all_items.current()));

    let renderer = tokio::spawn(async move {
        while let Ok(records) = all_items.changed().await {
            println!("{}", format_list(&records));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_shell_command(&line) {
            Ok(ShellCommand::Quit) => break,
            Ok(command) => execute(coordinator, command),
            Err(message) => eprintln!("{message}"),
        }
    }

    renderer.abort();
    Ok(())
}

/// Runs one command. Failures are printed; the session always continues.
fn execute<S: RecordStore + 'static>(coordinator: &RecordCoordinator<S>, command: ShellCommand) {
    match command {
        ShellCommand::Empty | ShellCommand::Quit => {}
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::List => println!("{}", format_list(&coordinator.all_items().current())),
        ShellCommand::Show(id) => match describe_record(coordinator, id) {
            Ok(detail) => println!("{detail}"),
            Err(message) => eprintln!("{message}"),
        },
        ShellCommand::Add(text) => {
            if let Err(err) = validate_record_text(&text) {
                eprintln!("{err}");
            } else {
                drop(coordinator.insert(Record::unsaved(text)));
            }
        }
        ShellCommand::Edit(id, text) => {
            if let Err(err) = validate_record_text(&text) {
                eprintln!("{err}");
            } else {
                drop(coordinator.update(Record::new(id, text)));
            }
        }
        ShellCommand::Delete(id) => drop(coordinator.delete(Record::new(id, ""))),
    }
}

fn describe_record<S: RecordStore + 'static>(
    coordinator: &RecordCoordinator<S>,
    id: RecordId,
) -> Result<String, String> {
    let view = coordinator
        .get(id)
        .map_err(|err| format!("cannot read record {id}: {err}"))?;
    match view.current() {
        Some(record) => Ok(format_detail(&record)),
        None => Err(format!("record {id} not found")),
    }
}

fn split_word(input: &str) -> (&str, &str) {
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn parse_id(raw: &str) -> Result<RecordId, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("missing record id".to_string());
    }
    raw.parse::<RecordId>()
        .map_err(|_| format!("invalid record id `{raw}`"))
}
