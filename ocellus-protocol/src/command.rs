//! Command types and validation
//!
//! Payloads are decoded in two steps: the discriminator is read from the
//! raw JSON object first, then the matching variant is deserialized and
//! range-checked. Unknown discriminators are reported, not skipped.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::CommandError;

/// PWM channels available
pub const CHANNELS: i64 = 16;

/// Largest 12-bit PWM value
pub const MAX_VALUE: i64 = 4095;

/// Any accepted command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Eyes(EyeCommand),
    Actuator(ActuatorCommand),
}

/// Commands on the `eyes` topic, discriminated by the boolean `custom`
#[derive(Debug, Clone, PartialEq)]
pub enum EyeCommand {
    /// Render from control values
    Gaze(GazeUpdate),
    /// Show fixed images, bypassing the renderer
    Custom(CustomImages),
}

/// Tracker output for both eyes
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GazeUpdate {
    /// Lid closure, 0 = open
    pub eyelid_percentage: f32,
    /// Detected pupil size, 0 = tracking lost
    pub radius: f32,
    /// Horizontal gaze in [-1, 1]
    pub rel_x: f32,
    /// Vertical gaze in [-1, 1]
    pub rel_y: f32,
}

/// Pre-made frames for each eye
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomImages {
    /// Base64-encoded PNG for the left panel
    pub leftimg: String,
    /// Base64-encoded PNG for the right panel
    pub rightimg: String,
    /// How many times each image is queued
    pub n: u32,
}

/// Commands on the `actuator` topic, discriminated by `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorCommand {
    /// Write a duty value; stops any breathing on the channel
    Set { channel: u8, value: u16 },
    /// Start or replace the channel's breathing pattern
    Breath {
        channel: u8,
        step_up: u16,
        step_down: u16,
        low: u16,
        high: u16,
    },
}

impl ActuatorCommand {
    pub fn channel(&self) -> u8 {
        match *self {
            ActuatorCommand::Set { channel, .. } | ActuatorCommand::Breath { channel, .. } => {
                channel
            }
        }
    }
}

fn object(payload: &str) -> Result<Map<String, Value>, CommandError> {
    match serde_json::from_str::<Value>(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CommandError::Json("expected an object".into())),
        Err(e) => Err(CommandError::Json(e.to_string())),
    }
}

fn variant<T: for<'de> Deserialize<'de>>(map: Map<String, Value>) -> Result<T, CommandError> {
    serde_json::from_value(Value::Object(map)).map_err(|e| CommandError::Json(e.to_string()))
}

fn finite(name: &'static str, v: f32) -> Result<(), CommandError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(CommandError::NonFinite(name))
    }
}

fn channel(v: i64) -> Result<u8, CommandError> {
    if (0..CHANNELS).contains(&v) {
        Ok(v as u8)
    } else {
        Err(CommandError::ChannelOutOfRange(v))
    }
}

fn twelve_bit(field: &'static str, v: i64) -> Result<u16, CommandError> {
    if (0..=MAX_VALUE).contains(&v) {
        Ok(v as u16)
    } else {
        Err(CommandError::ValueOutOfRange { field, value: v })
    }
}

impl EyeCommand {
    /// Decode and validate an `eyes` payload
    pub fn from_json(payload: &str) -> Result<Self, CommandError> {
        let map = object(payload)?;
        let custom = map
            .get("custom")
            .and_then(Value::as_bool)
            .ok_or(CommandError::BadField("custom"))?;

        if custom {
            let images: CustomImages = variant(map)?;
            if images.leftimg.is_empty() {
                return Err(CommandError::EmptyImage("left"));
            }
            if images.rightimg.is_empty() {
                return Err(CommandError::EmptyImage("right"));
            }
            if images.n == 0 {
                return Err(CommandError::ZeroRepeat);
            }
            Ok(EyeCommand::Custom(images))
        } else {
            let gaze: GazeUpdate = variant(map)?;
            finite("eyelid_percentage", gaze.eyelid_percentage)?;
            finite("radius", gaze.radius)?;
            finite("rel_x", gaze.rel_x)?;
            finite("rel_y", gaze.rel_y)?;
            Ok(EyeCommand::Gaze(gaze))
        }
    }
}

#[derive(Deserialize)]
struct RawSet {
    channel: i64,
    value: i64,
}

#[derive(Deserialize)]
struct RawBreath {
    channel: i64,
    step1: i64,
    step2: i64,
    range: [i64; 2],
}

impl ActuatorCommand {
    /// Decode and validate an `actuator` payload
    pub fn from_json(payload: &str) -> Result<Self, CommandError> {
        let map = object(payload)?;
        let kind = map
            .get("type")
            .and_then(Value::as_str)
            .ok_or(CommandError::BadField("type"))?
            .to_string();

        match kind.as_str() {
            "set" => {
                let raw: RawSet = variant(map)?;
                Ok(ActuatorCommand::Set {
                    channel: channel(raw.channel)?,
                    value: twelve_bit("value", raw.value)?,
                })
            }
            "breath" => {
                let raw: RawBreath = variant(map)?;
                let channel = channel(raw.channel)?;
                let [low, high] = raw.range;
                if low > high {
                    return Err(CommandError::InvertedRange { low, high });
                }
                Ok(ActuatorCommand::Breath {
                    channel,
                    step_up: twelve_bit("step1", raw.step1)?,
                    step_down: twelve_bit("step2", raw.step2)?,
                    low: twelve_bit("range", low)?,
                    high: twelve_bit("range", high)?,
                })
            }
            _ => Err(CommandError::UnknownKind(kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaze_update() {
        let cmd = EyeCommand::from_json(
            r#"{"custom": false, "eyelid_percentage": 0.0, "radius": 1.0, "rel_x": 0.0, "rel_y": 0.0}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            EyeCommand::Gaze(GazeUpdate {
                eyelid_percentage: 0.0,
                radius: 1.0,
                rel_x: 0.0,
                rel_y: 0.0
            })
        );
    }

    #[test]
    fn test_custom_images() {
        let cmd = EyeCommand::from_json(
            r#"{"custom": true, "leftimg": "aGk=", "rightimg": "aGk=", "n": 3}"#,
        )
        .unwrap();
        match cmd {
            EyeCommand::Custom(images) => assert_eq!(images.n, 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_custom_discriminator_required() {
        assert_eq!(
            EyeCommand::from_json(r#"{"rel_x": 0.0}"#),
            Err(CommandError::BadField("custom"))
        );
        assert_eq!(
            EyeCommand::from_json(r#"{"custom": "yes"}"#),
            Err(CommandError::BadField("custom"))
        );
    }

    #[test]
    fn test_custom_validation() {
        assert_eq!(
            EyeCommand::from_json(r#"{"custom": true, "leftimg": "", "rightimg": "x", "n": 1}"#),
            Err(CommandError::EmptyImage("left"))
        );
        assert_eq!(
            EyeCommand::from_json(r#"{"custom": true, "leftimg": "x", "rightimg": "x", "n": 0}"#),
            Err(CommandError::ZeroRepeat)
        );
    }

    #[test]
    fn test_gaze_missing_field() {
        assert!(matches!(
            EyeCommand::from_json(r#"{"custom": false, "radius": 1.0}"#),
            Err(CommandError::Json(_))
        ));
    }

    #[test]
    fn test_set() {
        assert_eq!(
            ActuatorCommand::from_json(r#"{"type": "set", "channel": 3, "value": 2048}"#),
            Ok(ActuatorCommand::Set {
                channel: 3,
                value: 2048
            })
        );
    }

    #[test]
    fn test_breath() {
        let cmd = ActuatorCommand::from_json(
            r#"{"type": "breath", "channel": 15, "step1": 20, "step2": 0, "range": [100, 4095]}"#,
        )
        .unwrap();
        assert_eq!(
            cmd,
            ActuatorCommand::Breath {
                channel: 15,
                step_up: 20,
                step_down: 0,
                low: 100,
                high: 4095
            }
        );
        assert_eq!(cmd.channel(), 15);
    }

    #[test]
    fn test_channel_out_of_range_rejected() {
        assert_eq!(
            ActuatorCommand::from_json(r#"{"type": "set", "channel": 16, "value": 1}"#),
            Err(CommandError::ChannelOutOfRange(16))
        );
        assert_eq!(
            ActuatorCommand::from_json(r#"{"type": "set", "channel": -1, "value": 1}"#),
            Err(CommandError::ChannelOutOfRange(-1))
        );
    }

    #[test]
    fn test_value_and_range_checks() {
        assert_eq!(
            ActuatorCommand::from_json(r#"{"type": "set", "channel": 0, "value": 4096}"#),
            Err(CommandError::ValueOutOfRange {
                field: "value",
                value: 4096
            })
        );
        assert_eq!(
            ActuatorCommand::from_json(
                r#"{"type": "breath", "channel": 0, "step1": 1, "step2": 1, "range": [9, 3]}"#
            ),
            Err(CommandError::InvertedRange { low: 9, high: 3 })
        );
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(
            ActuatorCommand::from_json(r#"{"type": "wiggle", "channel": 0}"#),
            Err(CommandError::UnknownKind("wiggle".into()))
        );
        assert_eq!(
            ActuatorCommand::from_json(r#"{"channel": 0}"#),
            Err(CommandError::BadField("type"))
        );
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            ActuatorCommand::from_json("[1, 2]"),
            Err(CommandError::Json(_))
        ));
        assert!(matches!(
            EyeCommand::from_json("{oops"),
            Err(CommandError::Json(_))
        ));
    }
}
