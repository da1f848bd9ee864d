//! Frame production task
//!
//! Waits for the animation tables, renders the resting eye once, then
//! renders both eyes every time the control state changes. Updates that
//! arrive while a frame is being produced collapse into the newest one.

use embassy_time::Timer;
use log::{error, info};

use ocellus_core::pipeline::{Eye, EyeState, FrameComposer};

use crate::context::AppContext;

/// How often to look for published tables
const READY_POLL_MS: u64 = 50;

#[embassy_executor::task]
pub async fn render_task(ctx: &'static AppContext) {
    info!("Render task started");
    let composer = loop {
        if let Some(composer) = ctx.composer() {
            break composer;
        }
        Timer::after_millis(READY_POLL_MS).await;
    };
    info!("Rendering from animation tables");

    let mut state = ctx.eye_state.try_take().unwrap_or_default();
    loop {
        render_frames(ctx, composer, &state);
        state = ctx.eye_state.wait().await;
    }
}

/// Render and queue one frame per live eye; returns the frames queued
pub fn render_frames<P>(ctx: &AppContext<P>, composer: &FrameComposer, state: &EyeState) -> usize {
    let mut queued = 0;
    for eye in Eye::BOTH {
        if ctx.is_failed(eye) {
            continue;
        }
        match composer.render(eye, state) {
            Ok(frame) => {
                ctx.queue(eye).push(frame);
                queued += 1;
            }
            Err(e) => error!("{} eye frame failed: {}", eye.name(), e),
        }
    }
    queued
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::tests::composer;
    use crate::reader::read_commands;
    use crate::tasks::dispatch::dispatch;
    use embassy_futures::block_on;
    use ocellus_core::config::{Config, GazeConfig};
    use ocellus_core::render::table::{AnimationTable, TableKind};
    use ocellus_core::render::Canvas;
    use std::io::Cursor;

    #[test]
    fn test_frames_for_both_eyes() {
        let ctx: AppContext<()> = AppContext::new(Config::default(), None);
        let composer = composer(8);
        assert_eq!(render_frames(&ctx, &composer, &EyeState::default()), 2);
        let frame = ctx.queue(Eye::Left).pop().unwrap();
        assert_eq!((frame.width(), frame.height()), (4, 4));
        assert!(frame.as_bytes().iter().all(|&b| b == 0xFF));
        assert_eq!(ctx.queue(Eye::Right).len(), 1);
    }

    #[test]
    fn test_failed_eye_skipped() {
        let ctx: AppContext<()> = AppContext::new(Config::default(), None);
        ctx.mark_failed(Eye::Left);
        assert_eq!(render_frames(&ctx, &composer(8), &EyeState::default()), 1);
        assert!(ctx.queue(Eye::Left).is_empty());
        assert_eq!(ctx.queue(Eye::Right).len(), 1);
    }

    /// Iris frames marked in red at the centre; only the first lid frame is open
    fn marked_composer() -> FrameComposer {
        let iris = || {
            let frames = (0..10u8)
                .map(|i| {
                    let mut c = Canvas::filled(16, 16, [0, 0, 0, 255]);
                    c.put_pixel(8, 8, [i * 25, 0, 0, 255]);
                    c
                })
                .collect();
            AnimationTable::new(TableKind::IrisSclera, frames).unwrap()
        };
        let lids = (0..16)
            .map(|i| {
                if i == 0 {
                    Canvas::new(16, 16)
                } else {
                    Canvas::filled(16, 16, [255, 255, 255, 255])
                }
            })
            .collect();
        FrameComposer::new(
            iris(),
            iris(),
            AnimationTable::new(TableKind::Eyelid, lids).unwrap(),
            GazeConfig::default(),
        )
    }

    #[test]
    fn test_centred_gaze_command_end_to_end() {
        let ctx: AppContext<()> = AppContext::new(Config::default(), None);
        let line = "eyes {\"custom\": false, \"eyelid_percentage\": 0.0, \"radius\": 1.0, \"rel_x\": 0.0, \"rel_y\": 0.0}";
        let mut inbound = Vec::new();
        read_commands(Cursor::new(line), 8, 8, |i| inbound.push(i)).unwrap();
        for i in inbound {
            block_on(dispatch(&ctx, i));
        }

        let state = ctx.eye_state.try_take().unwrap();
        assert_eq!(render_frames(&ctx, &marked_composer(), &state), 2);
        for eye in Eye::BOTH {
            let frame = ctx.queue(eye).pop().unwrap();
            let bytes = frame.as_bytes();
            // open lid, last (max dilation) iris frame, no crop offset
            let centre = (4 * 8 + 4) * 2;
            assert_eq!(&bytes[centre..centre + 2], &[0xE0, 0x00]);
            assert!(bytes[..centre].iter().all(|&b| b == 0));
        }
    }
}
