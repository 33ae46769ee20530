use std::iter::repeat;
use std::io::{self, Write};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::Result;
use crate::lineformat::LineFormat;
use crate::utils::{format_field, localize_millis};

/// Longest title accepted at input time. The store itself never enforces it.
pub const TITLE_MAX_CHARS: usize = 48;

/// Label shown in listings for a note whose title is empty.
pub const UNTITLED: &str = "(Untitled)";

/// A single note. Missing, null or mistyped fields in persisted records fall
/// back to their defaults, so older or hand-edited slots still load.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Note {
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub body: String,
    #[serde(deserialize_with = "lenient_millis")]
    pub created: i64,
    #[serde(deserialize_with = "lenient_millis")]
    pub updated: i64,
}

fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
    where D: Deserializer<'de>
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_millis<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
    where D: Deserializer<'de>
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

impl Note {
    /// title as shown in a list row
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// case-insensitive substring match over title and body, `needle` must
    /// already be lowercased
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.body.to_lowercase().contains(needle)
    }

    /// print a note as a line
    pub fn print(&self, line_format: &LineFormat, show_body: bool) -> Result<()> {
        self.write(&mut io::stdout(), line_format, show_body)
    }

    pub fn write<T: Write>(&self,
                           output: &mut T,
                           line_format: &LineFormat,
                           show_body: bool)
                           -> Result<()> {
        let column_seperator: String = repeat(' ')
                                           .take(line_format.colsep)
                                           .collect();
        write!(output, "{}", format_field(&self.id, line_format.id_width, false))?;
        write!(output, "{}", column_seperator)?;
        if !self.body.is_empty() && !show_body {
            let width = line_format.title_width.saturating_sub(4);
            write!(output, "{}", format_field(self.display_title(), width, true))?;
            write!(output, "{}", format_field(" (+)", 4, false))?;
        } else {
            write!(output,
                   "{}",
                   format_field(self.display_title(), line_format.title_width, true))?;
        }
        write!(output, "{}", column_seperator)?;
        writeln!(output,
                 "{}",
                 format_field(&localize_millis(self.updated),
                              line_format.updated_width,
                              false))?;
        if show_body {
            for l in self.body.lines() {
                writeln!(output, "\t{}", l)?;
            }
        }
        Ok(())
    }
}
