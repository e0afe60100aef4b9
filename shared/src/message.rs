//! Decoding of protocol lines into HUD messages

use std::fmt;
use thiserror::Error;

/// Prefix marking a display filter/ordering directive
pub const FILTER_PREFIX: &str = "display::";

/// Separator between names in a filter directive
pub const FILTER_SEPARATOR: &str = "::";

/// Separator between the fields of a sensor reading
pub const READING_SEPARATOR: &str = "><";

/// A decoded line from the phone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HudMessage {
    /// Which sensors to show, in display order
    FilterCommand { names: Vec<String> },
    /// A single sensor reading, values left as sent
    SensorReading {
        name: String,
        value1: String,
        value2: String,
    },
}

/// Errors that can occur while decoding a line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid sensor data in '{line}': expected 3 fields, got {fields}")]
    Malformed { line: String, fields: usize },
}

/// Decode one line (terminator already stripped)
///
/// A `display::` prefix always selects a filter command, even if the rest of
/// the line contains `><`. Every other line must split into exactly three
/// `><`-separated fields; empty fields are kept.
pub fn decode_line(line: &str) -> Result<HudMessage, DecodeError> {
    if let Some(rest) = line.strip_prefix(FILTER_PREFIX) {
        let names = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(FILTER_SEPARATOR).map(String::from).collect()
        };
        return Ok(HudMessage::FilterCommand { names });
    }

    let fields: Vec<&str> = line.split(READING_SEPARATOR).collect();
    match fields.as_slice() {
        [name, value1, value2] => Ok(HudMessage::SensorReading {
            name: (*name).to_string(),
            value1: (*value1).to_string(),
            value2: (*value2).to_string(),
        }),
        _ => Err(DecodeError::Malformed {
            line: line.to_string(),
            fields: fields.len(),
        }),
    }
}

/// Formats the message as a wire line, without the trailing newline
impl fmt::Display for HudMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HudMessage::FilterCommand { names } => {
                write!(f, "{}{}", FILTER_PREFIX, names.join(FILTER_SEPARATOR))
            }
            HudMessage::SensorReading {
                name,
                value1,
                value2,
            } => write!(
                f,
                "{name}{READING_SEPARATOR}{value1}{READING_SEPARATOR}{value2}"
            ),
        }
    }
}
