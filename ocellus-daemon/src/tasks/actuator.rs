//! Actuator command task
//!
//! Applies `set` commands directly and hands `breath` patterns to the
//! channel's breathing worker. A `set` stops the channel's breathing
//! before it writes.

use log::{debug, info, warn};

use ocellus_core::traits::PwmOutput;
use ocellus_drivers::pwm::BreathPattern;
use ocellus_protocol::ActuatorCommand;

use crate::context::{AppContext, BreathControl};

#[embassy_executor::task]
pub async fn actuator_task(ctx: &'static AppContext) {
    info!("Actuator task started");
    loop {
        let command = ctx.actuator.receive().await;
        apply(ctx, command).await;
    }
}

pub async fn apply<P: PwmOutput>(ctx: &AppContext<P>, command: ActuatorCommand) {
    let channel = command.channel();
    let Some(breath) = ctx.breath(channel) else {
        warn!("dropped actuator command for channel {}", channel);
        return;
    };

    match command {
        ActuatorCommand::Set { value, .. } => {
            breath.signal(BreathControl::Stop);
            let mut pwm = ctx.pwm.lock().await;
            let Some(pwm) = pwm.as_mut() else {
                warn!("actuator disabled, dropped set on channel {}", channel);
                return;
            };
            match pwm.set_duty(channel, value) {
                Ok(()) => debug!("channel {} = {}", channel, value),
                Err(e) => warn!("channel {}: set {} failed: {:?}", channel, value, e),
            }
        }
        ActuatorCommand::Breath {
            step_up,
            step_down,
            low,
            high,
            ..
        } => match BreathPattern::new(step_up, step_down, low, high) {
            Ok(pattern) => {
                debug!("channel {} breathing {:?}", channel, pattern);
                breath.signal(BreathControl::Run(pattern));
            }
            Err(e) => warn!("channel {}: {}", channel, e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::fake::FakePwm;
    use embassy_futures::block_on;
    use ocellus_core::config::Config;

    #[test]
    fn test_set_writes_and_stops_breathing() {
        let ctx = AppContext::new(Config::default(), Some(FakePwm::default()));
        block_on(apply(
            &ctx,
            ActuatorCommand::Set {
                channel: 3,
                value: 2048,
            },
        ));
        assert_eq!(ctx.breath(3).unwrap().try_take(), Some(BreathControl::Stop));
        let pwm = block_on(ctx.pwm.lock());
        assert_eq!(pwm.as_ref().unwrap().writes, vec![(3, 2048)]);
    }

    #[test]
    fn test_breath_signals_worker() {
        let ctx = AppContext::new(Config::default(), Some(FakePwm::default()));
        block_on(apply(
            &ctx,
            ActuatorCommand::Breath {
                channel: 0,
                step_up: 10,
                step_down: 5,
                low: 0,
                high: 100,
            },
        ));
        let expected = BreathPattern::new(10, 5, 0, 100).unwrap();
        assert_eq!(
            ctx.breath(0).unwrap().try_take(),
            Some(BreathControl::Run(expected))
        );
        assert!(block_on(ctx.pwm.lock()).as_ref().unwrap().writes.is_empty());
    }

    #[test]
    fn test_disabled_actuator_drops_set() {
        let ctx: AppContext<FakePwm> = AppContext::new(Config::default(), None);
        block_on(apply(&ctx, ActuatorCommand::Set { channel: 1, value: 1 }));
        assert!(block_on(ctx.pwm.lock()).is_none());
    }

    #[test]
    fn test_out_of_range_channel_dropped() {
        let ctx = AppContext::new(Config::default(), Some(FakePwm::default()));
        block_on(apply(&ctx, ActuatorCommand::Set { channel: 16, value: 1 }));
        assert!(block_on(ctx.pwm.lock()).as_ref().unwrap().writes.is_empty());
    }
}
