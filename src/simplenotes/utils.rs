use std::fs::File;
use std::io::{stdin, stdout, IsTerminal, Read, Write};
use std::iter::repeat;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::env::var;

use chrono::{DateTime, Local, Utc};
use crossterm::{
    style::{Attribute, SetAttribute},
    execute,
};
use tempfile::Builder;

use crate::specific_fail_str;
use crate::errors::{Error, Result};
use crate::lineformat::LineFormat;
use crate::note::Note;

/// short datetime formating string for printing
pub static DATEFMT_SHORT: &str = "%F %T";

pub fn stdout_is_tty() -> bool {
    stdout().is_terminal()
}

pub fn stdin_is_tty() -> bool {
    stdin().is_terminal()
}

pub fn termsize() -> usize {
    if let Ok((cols, _rows)) = crossterm::terminal::size() {
        cols as usize
    } else {
        0
    }
}

/// epoch milliseconds as a local, human readable timestamp
pub fn localize_millis(ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(t) => t.with_timezone(&Local).format(DATEFMT_SHORT).to_string(),
        None => ms.to_string(),
    }
}

/// open `contents` in `$VISUAL` / `$EDITOR` and return what was saved
pub fn drop_to_editor(contents: &str) -> Result<String> {
    let tmpfile = Builder::new()
        .prefix("simplenotes")
        .suffix(".txt")
        .rand_bytes(5)
        .tempfile()?;
    let tmppath = tmpfile.path().to_owned();

    {
        let mut file = File::create(&tmppath)?;
        file.write_all(contents.as_bytes())?;
    }

    let editor = var("VISUAL").or_else(|_| var("EDITOR"))
        .unwrap_or_else(|_| "nano".to_string());

    let mut editor_command = Command::new(&editor);
    editor_command.arg(&tmppath);
    editor_command.stdin(Stdio::inherit());
    editor_command.stdout(Stdio::inherit());
    editor_command.stderr(Stdio::inherit());

    let mut editor_proc = editor_command.spawn().map_err(|e| {
        Error::generic(format!("Failed to start editor '{}': {}", editor, e))
    })?;

    match editor_proc.wait() {
        Ok(status) if status.success() => {
            let mut file = File::open(&tmppath)?;
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(content)
        }
        _ => specific_fail_str!("The editor process failed."),
    }
}

pub fn get_password() -> Result<String> {
    print!("Key: ");
    stdout().flush()?;
    let password = rpassword::read_password().map_err(|e| {
        Error::generic(format!("Failed to read password: {}", e))
    })?;
    if password.is_empty() {
        return specific_fail_str!("Key cannot be empty.");
    }
    Ok(password)
}

pub fn get_yn_input(message: &str) -> Result<bool> {
    print!("{}", message);
    stdout().flush()?;

    let stdin = stdin();
    let yes = ["y", "Y", "yes", "YES", "Yes"];
    let no = ["n", "N", "no", "NO", "No"];

    loop {
        print!("[y/n]# ");
        stdout().flush()?;
        let mut input = String::new();
        if stdin.read_line(&mut input)? == 0 {
            // closed stdin counts as a refusal
            return Ok(false);
        }
        let input = input.trim();
        if yes.contains(&input) {
            return Ok(true);
        } else if no.contains(&input) {
            return Ok(false);
        };
        println!("invalid input.");
    }
}

pub fn pretty_line(bold: &str, plain: &str, tty: bool) -> Result<()> {
    let mut stdout = stdout();
    if tty {
        execute!(stdout, SetAttribute(Attribute::Bold))?;
    }
    print!("{}", bold);
    if tty {
        execute!(stdout, SetAttribute(Attribute::Reset))?;
    }
    print!("{}", plain);
    Ok(())
}

pub fn format_field(value: &str, width: usize, truncate: bool) -> String {
    if value.chars().count() > width && width > 3 && truncate {
        format!("{: <1$.1$}...", value, width - 3)
    } else {
        format!("{: <1$.1$}", value, width)
    }
}

/// keep the first `max` characters of `value`
pub fn truncate_chars(value: &str, max: usize) -> String {
    value.chars().take(max).collect()
}

fn print_header(line_format: &LineFormat) -> Result<()> {
    let mut stdout = stdout();
    let column_seperator: String = repeat(' ')
                                       .take(line_format.colsep)
                                       .collect();
    let header_seperator: String = repeat('-')
                                       .take(line_format.line_width())
                                       .collect();
    let tty = stdout_is_tty();

    if tty {
        execute!(stdout, SetAttribute(Attribute::Bold))?;
    }
    print!("{1}{0}{2}{0}{3}\n{4}\n",
           column_seperator,
           format_field("id", line_format.id_width, false),
           format_field("title", line_format.title_width, false),
           format_field("last updated", line_format.updated_width, false),
           header_seperator);
    if tty {
        execute!(stdout, SetAttribute(Attribute::Reset))?;
    }
    Ok(())
}

/// How a list of notes is written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListFlags {
    pub format: OutputFormat,
    pub condensed: bool,
    pub show_body: bool,
}

/// print notes in collection order, at most `limit` of them (0 = all)
pub fn print_notes(notes: &[Note], limit: usize, flags: ListFlags) -> Result<()> {
    let limit = if limit != 0 && limit < notes.len() {
        limit
    } else {
        notes.len()
    };
    let notes = &notes[0..limit];

    match flags.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(notes)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(notes)?),
        OutputFormat::Table => {
            let line_format = LineFormat::new(notes, flags.condensed, flags.show_body);
            if !flags.condensed {
                print_header(&line_format)?;
            }
            for n in notes.iter() {
                n.print(&line_format, flags.show_body)?;
            }
        }
    }
    Ok(())
}

pub fn find_data_folder(data_folder: &Option<String>) -> Result<PathBuf> {
    if let Some(df) = data_folder {
        Ok(PathBuf::from(df))
    } else {
        match dirs::home_dir() {
            Some(p) => {
                let default_path = p.join(".simplenotes");
                if default_path.is_file() {
                    let mut file = File::open(&default_path)?;
                    let mut contents = String::new();
                    file.read_to_string(&mut contents)?;
                    let trimmed = contents.trim();
                    if trimmed.is_empty() {
                        return specific_fail_str!("~/.simplenotes is a file but is empty. It should contain a path to the notes directory.");
                    }
                    Ok(PathBuf::from(trimmed))
                } else {
                    Ok(default_path)
                }
            },
            None => specific_fail_str!("failed to find your home directory"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_field_pads_and_truncates() {
        assert_eq!(format_field("ab", 4, false), "ab  ");
        assert_eq!(format_field("abcdefgh", 6, true), "abc...");
        assert_eq!(format_field("abcdefgh", 3, false), "abc");
    }

    #[test]
    fn truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn explicit_data_folder_wins() {
        let folder = find_data_folder(&Some("/tmp/notes".to_string())).unwrap();
        assert_eq!(folder, PathBuf::from("/tmp/notes"));
    }

    #[test]
    fn invalid_millis_fall_back_to_number() {
        assert_eq!(localize_millis(i64::MAX), i64::MAX.to_string());
    }
}
