//! Application context
//!
//! Everything the tasks and threads share lives in one [`AppContext`],
//! created once at startup and handed out as a `'static` reference.

use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use ocellus_core::config::Config;
use ocellus_core::pipeline::{DeviceFrame, Eye, EyeState, FrameComposer, FrameQueue};
use ocellus_core::traits::PWM_CHANNELS;
use ocellus_drivers::pwm::BreathPattern;
use ocellus_protocol::ActuatorCommand;

use crate::boards::Pwm;

/// Decoded commands waiting for the dispatcher
const COMMAND_QUEUE_DEPTH: usize = 16;

/// Actuator commands waiting for the actuator task
const ACTUATOR_QUEUE_DEPTH: usize = 16;

/// A command after parsing and, for custom images, decoding
#[derive(Debug)]
pub enum Inbound {
    Gaze(EyeState),
    /// Left and right frames, each queued `repeat` times
    Custom {
        frames: [DeviceFrame; 2],
        repeat: u32,
    },
    Actuator(ActuatorCommand),
}

/// Instruction for one channel's breathing worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreathControl {
    Run(BreathPattern),
    Stop,
}

pub type CommandChannel = Channel<CriticalSectionRawMutex, Inbound, COMMAND_QUEUE_DEPTH>;
pub type ActuatorChannel = Channel<CriticalSectionRawMutex, ActuatorCommand, ACTUATOR_QUEUE_DEPTH>;

/// Shared runtime state
///
/// `P` is the PWM controller; `None` when the actuator is disabled or
/// failed to come up.
pub struct AppContext<P = Pwm> {
    pub config: Config,
    queues: [FrameQueue<DeviceFrame>; 2],
    /// Latest control state, consumed by the render task
    pub eye_state: Signal<CriticalSectionRawMutex, EyeState>,
    ready: AtomicBool,
    composer: OnceLock<FrameComposer>,
    failed: [AtomicBool; 2],
    pub commands: CommandChannel,
    pub actuator: ActuatorChannel,
    breath: [Signal<CriticalSectionRawMutex, BreathControl>; PWM_CHANNELS as usize],
    pub pwm: Mutex<CriticalSectionRawMutex, Option<P>>,
    /// Held around every complete panel transaction
    pub spi_bus: Mutex<CriticalSectionRawMutex, ()>,
}

impl<P> AppContext<P> {
    pub fn new(config: Config, pwm: Option<P>) -> Self {
        Self {
            config,
            queues: [FrameQueue::new(), FrameQueue::new()],
            eye_state: Signal::new(),
            ready: AtomicBool::new(false),
            composer: OnceLock::new(),
            failed: [AtomicBool::new(false), AtomicBool::new(false)],
            commands: Channel::new(),
            actuator: Channel::new(),
            breath: core::array::from_fn(|_| Signal::new()),
            pwm: Mutex::new(pwm),
            spi_bus: Mutex::new(()),
        }
    }

    pub fn queue(&self, eye: Eye) -> &FrameQueue<DeviceFrame> {
        &self.queues[eye.index()]
    }

    /// Control signal of one PWM channel
    pub fn breath(&self, channel: u8) -> Option<&Signal<CriticalSectionRawMutex, BreathControl>> {
        self.breath.get(channel as usize)
    }

    /// Stop producing frames for an eye whose panel gave up
    pub fn mark_failed(&self, eye: Eye) {
        self.failed[eye.index()].store(true, Ordering::Release);
    }

    pub fn is_failed(&self, eye: Eye) -> bool {
        self.failed[eye.index()].load(Ordering::Acquire)
    }

    /// Whether animation tables have been published
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Make the tables available and flip the readiness flag
    ///
    /// Only the first call has any effect.
    pub fn publish(&self, composer: FrameComposer) -> bool {
        let first = self.composer.set(composer).is_ok();
        if first {
            self.ready.store(true, Ordering::Release);
        }
        first
    }

    pub fn composer(&self) -> Option<&FrameComposer> {
        if self.is_ready() {
            self.composer.get()
        } else {
            None
        }
    }
}
