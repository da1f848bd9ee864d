//! Per-channel breathing workers
//!
//! Each PWM channel has one worker. Between steps it takes any pending
//! control from its signal. The check happens with the PWM lock held, so
//! once a replacement or stop has been signalled the old pattern cannot
//! write again.

use embassy_time::{Duration, Timer};
use log::{debug, info, warn};

use ocellus_core::traits::PwmOutput;
use ocellus_drivers::pwm::BreathRamp;

use crate::context::{AppContext, BreathControl};

/// A channel's current pattern
#[derive(Debug, Default)]
pub struct BreathWorker {
    ramp: Option<BreathRamp>,
}

impl BreathWorker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `control` if any, then return the next duty value
    ///
    /// `None` while stopped or running an idle pattern.
    pub fn advance(&mut self, control: Option<BreathControl>) -> Option<u16> {
        match control {
            Some(BreathControl::Run(pattern)) => self.ramp = Some(BreathRamp::new(pattern)),
            Some(BreathControl::Stop) => self.ramp = None,
            None => {}
        }
        self.ramp.as_mut().and_then(Iterator::next)
    }
}

/// One worker step; returns whether a value was written
pub async fn breath_step<P: PwmOutput>(
    ctx: &AppContext<P>,
    channel: u8,
    worker: &mut BreathWorker,
) -> bool {
    let Some(signal) = ctx.breath(channel) else {
        return false;
    };
    let mut pwm = ctx.pwm.lock().await;
    let control = signal.try_take();
    if let Some(control) = control {
        debug!("channel {} breathing control {:?}", channel, control);
    }
    let Some(value) = worker.advance(control) else {
        return false;
    };
    if let Some(pwm) = pwm.as_mut() {
        if let Err(e) = pwm.set_duty(channel, value) {
            warn!("channel {}: breathing write failed: {:?}", channel, e);
        }
    }
    true
}

#[embassy_executor::task(pool_size = 16)]
pub async fn breath_task(ctx: &'static AppContext, channel: u8) {
    info!("Breathing worker {} started", channel);
    let actuator = &ctx.config.actuator;
    let step = Duration::from_millis(actuator.breath_step_ms);
    let idle = Duration::from_millis(actuator.breath_idle_ms);

    let mut worker = BreathWorker::new();
    loop {
        let wrote = breath_step(ctx, channel, &mut worker).await;
        Timer::after(if wrote { step } else { idle }).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::actuator::apply;
    use crate::tasks::fake::FakePwm;
    use embassy_futures::block_on;
    use ocellus_core::config::Config;
    use ocellus_drivers::pwm::BreathPattern;
    use ocellus_protocol::ActuatorCommand;

    fn run(p: BreathPattern) -> Option<BreathControl> {
        Some(BreathControl::Run(p))
    }

    fn writes(ctx: &AppContext<FakePwm>) -> Vec<u16> {
        block_on(ctx.pwm.lock())
            .as_ref()
            .unwrap()
            .writes
            .iter()
            .map(|&(_, v)| v)
            .collect()
    }

    #[test]
    fn test_worker_follows_pattern() {
        let mut worker = BreathWorker::new();
        assert_eq!(worker.advance(None), None);
        let pattern = BreathPattern::new(50, 50, 0, 100).unwrap();
        assert_eq!(worker.advance(run(pattern)), Some(0));
        assert_eq!(worker.advance(None), Some(50));
        assert_eq!(worker.advance(None), Some(100));
        assert_eq!(worker.advance(None), Some(50));
        assert_eq!(worker.advance(Some(BreathControl::Stop)), None);
        assert_eq!(worker.advance(None), None);
    }

    #[test]
    fn test_idle_pattern_writes_nothing() {
        let mut worker = BreathWorker::new();
        let idle = BreathPattern::new(0, 10, 0, 100).unwrap();
        assert_eq!(worker.advance(run(idle)), None);
        assert_eq!(worker.advance(None), None);
    }

    #[test]
    fn test_replacement_never_interleaves() {
        let ctx = AppContext::new(Config::default(), Some(FakePwm::default()));
        let mut worker = BreathWorker::new();
        let old = BreathPattern::new(1, 1, 1000, 2000).unwrap();
        let new = BreathPattern::new(7, 7, 0, 21).unwrap();

        ctx.breath(5).unwrap().signal(BreathControl::Run(old));
        for _ in 0..3 {
            assert!(block_on(breath_step(&ctx, 5, &mut worker)));
        }
        ctx.breath(5).unwrap().signal(BreathControl::Run(new));
        for _ in 0..5 {
            assert!(block_on(breath_step(&ctx, 5, &mut worker)));
        }

        let w = writes(&ctx);
        assert_eq!(w[..3], [1000, 1001, 1002]);
        assert_eq!(w[3..], [0, 7, 14, 21, 14]);
    }

    #[test]
    fn test_set_halts_breathing() {
        let ctx = AppContext::new(Config::default(), Some(FakePwm::default()));
        let mut worker = BreathWorker::new();
        ctx.breath(2)
            .unwrap()
            .signal(BreathControl::Run(BreathPattern::new(10, 10, 0, 4095).unwrap()));
        assert!(block_on(breath_step(&ctx, 2, &mut worker)));
        assert!(block_on(breath_step(&ctx, 2, &mut worker)));

        block_on(apply(
            &ctx,
            ActuatorCommand::Set {
                channel: 2,
                value: 3000,
            },
        ));
        for _ in 0..3 {
            assert!(!block_on(breath_step(&ctx, 2, &mut worker)));
        }
        assert_eq!(writes(&ctx), vec![0, 10, 3000]);
    }
}
