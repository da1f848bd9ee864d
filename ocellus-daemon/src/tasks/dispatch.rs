//! Command dispatch task
//!
//! Routes decoded commands: control updates to the eye state slot, custom
//! images straight onto the frame queues, actuator commands to the
//! actuator task.

use log::{debug, info, trace};

use ocellus_core::pipeline::{DeviceFrame, Eye, FRAME_QUEUE_DEPTH};

use crate::context::{AppContext, Inbound};

#[embassy_executor::task]
pub async fn dispatch_task(ctx: &'static AppContext) {
    info!("Dispatch task started");
    loop {
        let inbound = ctx.commands.receive().await;
        dispatch(ctx, inbound).await;
    }
}

pub async fn dispatch<P>(ctx: &AppContext<P>, inbound: Inbound) {
    match inbound {
        Inbound::Gaze(state) => {
            trace!("eye state {:?}", state);
            ctx.eye_state.signal(state);
        }
        Inbound::Custom { frames, repeat } => {
            queue_custom(ctx, frames, repeat);
        }
        Inbound::Actuator(command) => ctx.actuator.send(command).await,
    }
}

/// Queue each eye's custom frame `repeat` times
///
/// More copies than the queue holds would only evict each other, so the
/// count is capped at the queue depth. Returns the copies queued per eye.
pub fn queue_custom<P>(ctx: &AppContext<P>, frames: [DeviceFrame; 2], repeat: u32) -> usize {
    let copies = (repeat as usize).min(FRAME_QUEUE_DEPTH);
    if copies < repeat as usize {
        debug!("custom image repeat {} capped at {}", repeat, copies);
    }
    for (eye, frame) in Eye::BOTH.into_iter().zip(frames) {
        let queue = ctx.queue(eye);
        for _ in 0..copies {
            queue.push(frame.clone());
        }
    }
    copies
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use ocellus_core::config::Config;
    use ocellus_core::pipeline::EyeState;
    use ocellus_protocol::ActuatorCommand;

    fn frames() -> [DeviceFrame; 2] {
        [
            DeviceFrame::from_rgb565(1, 1, vec![0x00, 0x00]).unwrap(),
            DeviceFrame::from_rgb565(1, 1, vec![0xFF, 0xFF]).unwrap(),
        ]
    }

    #[test]
    fn test_gaze_is_latest_wins() {
        let ctx: AppContext<()> = AppContext::new(Config::default(), None);
        block_on(dispatch(&ctx, Inbound::Gaze(EyeState::new(0.1, 0.0, 0.0, 1.0))));
        block_on(dispatch(&ctx, Inbound::Gaze(EyeState::new(0.9, 0.0, 0.0, 1.0))));
        assert_eq!(ctx.eye_state.try_take().map(|s| s.gaze_x), Some(0.9));
        assert!(ctx.eye_state.try_take().is_none());
    }

    #[test]
    fn test_custom_frames_queued_per_eye() {
        let ctx: AppContext<()> = AppContext::new(Config::default(), None);
        block_on(dispatch(&ctx, Inbound::Custom { frames: frames(), repeat: 3 }));
        assert_eq!(ctx.queue(Eye::Left).len(), 3);
        assert_eq!(ctx.queue(Eye::Right).len(), 3);
        assert_eq!(ctx.queue(Eye::Left).pop().unwrap().as_bytes(), &[0x00, 0x00]);
        assert_eq!(ctx.queue(Eye::Right).pop().unwrap().as_bytes(), &[0xFF, 0xFF]);
    }

    #[test]
    fn test_custom_repeat_capped() {
        let ctx: AppContext<()> = AppContext::new(Config::default(), None);
        assert_eq!(queue_custom(&ctx, frames(), 1000), FRAME_QUEUE_DEPTH);
        assert_eq!(ctx.queue(Eye::Left).len(), FRAME_QUEUE_DEPTH);
        assert_eq!(ctx.queue(Eye::Left).evicted(), 0);
    }

    #[test]
    fn test_actuator_forwarded() {
        let ctx: AppContext<()> = AppContext::new(Config::default(), None);
        let cmd = ActuatorCommand::Set {
            channel: 4,
            value: 100,
        };
        block_on(dispatch(&ctx, Inbound::Actuator(cmd)));
        assert_eq!(ctx.actuator.try_receive().ok(), Some(cmd));
    }
}
