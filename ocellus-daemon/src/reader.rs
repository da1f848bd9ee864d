//! Command reader thread
//!
//! Reads `<topic> <json>` lines from stdin or a file, parses them and
//! decodes custom images before handing them to the executor. Every
//! rejected line is logged with its line number and skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use embassy_sync::channel::TrySendError;
use log::{debug, info, warn};

use ocellus_core::pipeline::EyeState;
use ocellus_protocol::{parse_line, Command, EyeCommand};

use crate::assets::{decode_frame, AssetError};
use crate::context::{AppContext, CommandChannel, Inbound};

/// Back-off while the command channel is full
const FULL_BACKOFF: Duration = Duration::from_millis(2);

/// Turn a parsed command into what the dispatcher consumes
pub fn to_inbound(command: Command, width: u32, height: u32) -> Result<Inbound, AssetError> {
    Ok(match command {
        Command::Eyes(EyeCommand::Gaze(g)) => Inbound::Gaze(EyeState::from_control(
            g.eyelid_percentage,
            g.radius,
            g.rel_x,
            g.rel_y,
        )),
        Command::Eyes(EyeCommand::Custom(images)) => Inbound::Custom {
            frames: [
                decode_frame(&images.leftimg, width, height)?,
                decode_frame(&images.rightimg, width, height)?,
            ],
            repeat: images.n,
        },
        Command::Actuator(cmd) => Inbound::Actuator(cmd),
    })
}

/// Parse every line of `input`, passing accepted commands to `sink`
///
/// Returns the number of lines rejected.
pub fn read_commands<R: BufRead>(
    input: R,
    width: u32,
    height: u32,
    mut sink: impl FnMut(Inbound),
) -> io::Result<usize> {
    let mut rejected = 0;
    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!("line {}: dropped malformed command: {}", number, e);
                rejected += 1;
                continue;
            }
        };
        match to_inbound(command, width, height) {
            Ok(inbound) => {
                debug!("line {}: {:?}", number, inbound);
                sink(inbound);
            }
            Err(e) => {
                warn!("line {}: dropped custom image: {}", number, e);
                rejected += 1;
            }
        }
    }
    Ok(rejected)
}

/// Hand `inbound` to the executor, waiting while the channel is full
fn forward(channel: &CommandChannel, mut inbound: Inbound) {
    loop {
        match channel.try_send(inbound) {
            Ok(()) => return,
            Err(TrySendError::Full(back)) => {
                inbound = back;
                thread::sleep(FULL_BACKOFF);
            }
        }
    }
}

/// Start the reader on its own thread
///
/// End of input stops the reader only; everything else keeps running.
pub fn spawn_reader<P: Send + 'static>(ctx: &'static AppContext<P>, source: Option<PathBuf>) -> Result<()> {
    let input: Box<dyn BufRead + Send> = match &source {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let name = source
        .as_ref()
        .map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
    let (width, height) = (ctx.config.display.width, ctx.config.display.height);

    thread::Builder::new()
        .name("commands".into())
        .spawn(move || {
            info!("Reading commands from {}", name);
            match read_commands(input, width, height, |inbound| {
                forward(&ctx.commands, inbound)
            }) {
                Ok(rejected) => info!("End of {} ({} lines rejected)", name, rejected),
                Err(e) => warn!("Reading {} failed: {}", name, e),
            }
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::solid_png;
    use ocellus_protocol::ActuatorCommand;
    use std::io::Cursor;

    fn read(input: &str) -> (Vec<Inbound>, usize) {
        let mut out = Vec::new();
        let rejected = read_commands(Cursor::new(input), 4, 4, |i| out.push(i)).unwrap();
        (out, rejected)
    }

    #[test]
    fn test_gaze_becomes_state() {
        let (out, rejected) = read(
            "eyes {\"custom\": false, \"eyelid_percentage\": 0.0, \"radius\": 1.0, \"rel_x\": 0.0, \"rel_y\": 0.0}\n",
        );
        assert_eq!(rejected, 0);
        match &out[..] {
            [Inbound::Gaze(state)] => assert_eq!(*state, EyeState::default()),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_lost_tracking_closes_lid() {
        let (out, _) = read(
            "eyes {\"custom\": false, \"eyelid_percentage\": 0.0, \"radius\": 0.0, \"rel_x\": 0.5, \"rel_y\": 0.0}\n",
        );
        match &out[..] {
            [Inbound::Gaze(state)] => assert_eq!(state.eyelid, 1.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_custom_images_decoded() {
        let png = solid_png(2, 2, [0, 0, 0, 255]);
        let line = format!(
            "eyes {{\"custom\": true, \"leftimg\": \"{}\", \"rightimg\": \"{}\", \"n\": 2}}\n",
            png, png
        );
        let (out, rejected) = read(&line);
        assert_eq!(rejected, 0);
        match &out[..] {
            [Inbound::Custom { frames, repeat }] => {
                assert_eq!(*repeat, 2);
                assert_eq!(frames[0].as_bytes().len(), 4 * 4 * 2);
                assert!(frames[1].as_bytes().iter().all(|&b| b == 0));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_lines_skipped_and_counted() {
        let input = "\
# comment

mouth {}
actuator {\"type\": \"set\", \"channel\": 99, \"value\": 1}
eyes {\"custom\": true, \"leftimg\": \"@@@\", \"rightimg\": \"@@@\", \"n\": 1}
actuator {\"type\": \"set\", \"channel\": 2, \"value\": 7}
";
        let (out, rejected) = read(input);
        assert_eq!(rejected, 3);
        match &out[..] {
            [Inbound::Actuator(cmd)] => assert_eq!(
                *cmd,
                ActuatorCommand::Set {
                    channel: 2,
                    value: 7
                }
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_forward_waits_for_room() {
        let channel = CommandChannel::new();
        for _ in 0..16 {
            forward(&channel, Inbound::Gaze(EyeState::default()));
        }
        assert!(channel.try_send(Inbound::Gaze(EyeState::default())).is_err());

        std::thread::scope(|s| {
            s.spawn(|| forward(&channel, Inbound::Gaze(EyeState::new(0.5, 0.0, 0.0, 1.0))));
            std::thread::sleep(Duration::from_millis(20));
            assert!(channel.try_receive().is_ok());
        });
        let mut last = None;
        while let Ok(inbound) = channel.try_receive() {
            last = Some(inbound);
        }
        match last {
            Some(Inbound::Gaze(state)) => assert_eq!(state.gaze_x, 0.5),
            other => panic!("unexpected {:?}", other),
        }
    }

    proptest::proptest! {
        #[test]
        fn prop_every_line_accounted(lines in proptest::collection::vec("[ -~]{0,40}", 0..8)) {
            let input = lines.join("\n");
            let mut accepted = 0;
            let rejected = read_commands(Cursor::new(input), 4, 4, |_| accepted += 1).unwrap();
            proptest::prop_assert!(accepted + rejected <= lines.len());
        }
    }
}
