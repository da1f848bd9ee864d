//! Line framing: `<topic> <json>`

use crate::command::{ActuatorCommand, Command, EyeCommand};
use crate::error::CommandError;

/// Record topics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Eyes,
    Actuator,
}

impl Topic {
    pub fn parse(word: &str) -> Result<Self, CommandError> {
        match word {
            "eyes" => Ok(Topic::Eyes),
            "actuator" => Ok(Topic::Actuator),
            other => Err(CommandError::UnknownTopic(other.to_string())),
        }
    }
}

/// Parse one input line
///
/// Returns `Ok(None)` for blank lines and `#` comments.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let (topic, payload) = match line.split_once(char::is_whitespace) {
        Some((topic, payload)) => (topic, payload.trim()),
        None => (line, ""),
    };
    let topic = Topic::parse(topic)?;
    if payload.is_empty() {
        return Err(CommandError::MissingPayload);
    }
    let command = match topic {
        Topic::Eyes => Command::Eyes(EyeCommand::from_json(payload)?),
        Topic::Actuator => Command::Actuator(ActuatorCommand::from_json(payload)?),
    };
    Ok(Some(command))
}
