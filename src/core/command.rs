//! Command parser for the : command system

use crate::domain::MetricType;
use crate::modules::export::ExportFormat;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `add` alone opens the type picker
    Add(Option<MetricType>),
    /// Zero-based row index; the user types one-based numbers
    Edit(usize),
    Delete(usize),

    Write,
    Export(ExportFormat),
    Reload,
    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts.next().map(|s| s.trim().to_string());

    match cmd.to_lowercase().as_str() {
        "add" | "a" | "new" => match args {
            None => Command::Add(None),
            Some(name) => match MetricType::parse(&name) {
                Some(metric_type) => Command::Add(Some(metric_type)),
                None => Command::Unknown(input.to_string()),
            },
        },
        "edit" | "e" => match parse_row(args.as_deref()) {
            Some(index) => Command::Edit(index),
            None => Command::Unknown(input.to_string()),
        },
        "delete" | "del" | "d" | "rm" => match parse_row(args.as_deref()) {
            Some(index) => Command::Delete(index),
            None => Command::Unknown(input.to_string()),
        },
        "write" | "w" | "save" => Command::Write,
        "export" | "exp" => match args.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("csv") => Command::Export(ExportFormat::Csv),
            Some("json") => Command::Export(ExportFormat::Json),
            Some(_) => Command::Unknown(input.to_string()),
        },
        "reload" => Command::Reload,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}

/// One-based row number to zero-based index
fn parse_row(arg: Option<&str>) -> Option<usize> {
    let row: usize = arg?.parse().ok()?;
    row.checked_sub(1)
}
