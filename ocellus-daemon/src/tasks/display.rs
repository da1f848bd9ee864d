//! Panel output task
//!
//! One per eye. Pops a frame from the eye's queue on a fixed cadence and
//! streams it to the panel with the SPI bus lock held. A bus failure drops
//! the panel back to uninitialized; the next frame re-initializes it. After
//! too many consecutive failures the eye is given up on and the other eye
//! carries on alone.

use embassy_time::{Duration, Ticker};
use log::{error, info, warn};

use ocellus_core::pipeline::{DeviceFrame, Eye};
use ocellus_core::traits::{EyePanel, PanelFault};

use crate::boards::Panel;
use crate::context::AppContext;

/// Colour shown right after initialization
const BLACK: u16 = 0x0000;

/// What became of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Shown,
    /// Not shown; the panel may recover
    Dropped,
    /// The panel has been given up on
    Failed,
}

/// Error accounting around one panel
pub struct PanelWorker<P> {
    eye: Eye,
    panel: P,
    max_reinit_attempts: u32,
    failures: u32,
    failed: bool,
}

impl<P: EyePanel> PanelWorker<P> {
    pub fn new(eye: Eye, panel: P, max_reinit_attempts: u32) -> Self {
        Self {
            eye,
            panel,
            max_reinit_attempts,
            failures: 0,
            failed: false,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Count a link failure; the first one plus `max_reinit_attempts`
    /// retries are allowed before the panel is given up on
    fn link_failure(&mut self, what: &str, e: &P::Error) {
        self.failures += 1;
        if self.failures > self.max_reinit_attempts {
            self.failed = true;
            error!(
                "{} panel {} failed ({:?}), giving up after {} attempts",
                self.eye.name(),
                what,
                e,
                self.failures
            );
        } else {
            warn!(
                "{} panel {} failed ({:?}), re-initializing ({}/{})",
                self.eye.name(),
                what,
                e,
                self.failures,
                self.max_reinit_attempts
            );
        }
    }

    /// Initialize and blank the panel unless it already is
    pub fn bring_up(&mut self) -> bool {
        if self.failed {
            return false;
        }
        if self.panel.is_initialized() {
            return true;
        }
        let result = self.panel.initialize().and_then(|_| self.panel.clear(BLACK));
        match result {
            Ok(()) => {
                info!("{} panel initialized", self.eye.name());
                true
            }
            Err(e) => {
                self.link_failure("initialization", &e);
                false
            }
        }
    }

    pub fn show(&mut self, frame: &DeviceFrame) -> Outcome {
        if !self.bring_up() {
            return self.not_shown();
        }
        match self.panel.show(frame.as_bytes()) {
            Ok(()) => {
                self.failures = 0;
                Outcome::Shown
            }
            Err(e) => match P::fault(&e) {
                PanelFault::Usage => {
                    warn!("{} panel rejected frame: {:?}", self.eye.name(), e);
                    Outcome::Dropped
                }
                PanelFault::Link => {
                    self.link_failure("transfer", &e);
                    self.not_shown()
                }
            },
        }
    }

    fn not_shown(&self) -> Outcome {
        if self.failed {
            Outcome::Failed
        } else {
            Outcome::Dropped
        }
    }
}

#[embassy_executor::task(pool_size = 2)]
pub async fn display_task(ctx: &'static AppContext, eye: Eye, panel: Panel) {
    let display = &ctx.config.display;
    info!("{} display task started ({} fps)", eye.name(), display.fps);

    let mut worker = PanelWorker::new(eye, panel, display.max_reinit_attempts);
    {
        let _bus = ctx.spi_bus.lock().await;
        worker.bring_up();
    }

    let queue = ctx.queue(eye);
    let mut ticker = Ticker::every(Duration::from_hz(display.fps as u64));
    while !worker.is_failed() {
        ticker.next().await;
        let Some(frame) = queue.pop() else {
            continue;
        };
        let _bus = ctx.spi_bus.lock().await;
        worker.show(&frame);
    }

    ctx.mark_failed(eye);
    queue.clear();
    error!("{} eye disabled", eye.name());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum FakeError {
        Bus,
        Length,
    }

    /// Panel whose next operations can be made to fail
    #[derive(Default)]
    struct FakePanel {
        initialized: bool,
        inits: u32,
        shown: Vec<Vec<u8>>,
        fail_ops: u32,
    }

    impl FakePanel {
        fn trip(&mut self) -> Result<(), FakeError> {
            if self.fail_ops > 0 {
                self.fail_ops -= 1;
                self.initialized = false;
                return Err(FakeError::Bus);
            }
            Ok(())
        }
    }

    impl EyePanel for FakePanel {
        type Error = FakeError;

        fn initialize(&mut self) -> Result<(), FakeError> {
            self.inits += 1;
            self.trip()?;
            self.initialized = true;
            Ok(())
        }

        fn show(&mut self, frame: &[u8]) -> Result<(), FakeError> {
            if frame.len() != 2 {
                return Err(FakeError::Length);
            }
            self.trip()?;
            self.shown.push(frame.to_vec());
            Ok(())
        }

        fn clear(&mut self, _color: u16) -> Result<(), FakeError> {
            self.trip()
        }

        fn is_initialized(&self) -> bool {
            self.initialized
        }

        fn fault(error: &FakeError) -> PanelFault {
            match error {
                FakeError::Bus => PanelFault::Link,
                FakeError::Length => PanelFault::Usage,
            }
        }
    }

    fn frame(v: u8) -> DeviceFrame {
        DeviceFrame::from_rgb565(1, 1, vec![v, v]).unwrap()
    }

    #[test]
    fn test_first_frame_initializes() {
        let mut worker = PanelWorker::new(Eye::Left, FakePanel::default(), 3);
        assert_eq!(worker.show(&frame(1)), Outcome::Shown);
        assert_eq!(worker.show(&frame(2)), Outcome::Shown);
        assert_eq!(worker.panel.inits, 1);
        assert_eq!(worker.panel.shown, vec![vec![1, 1], vec![2, 2]]);
    }

    #[test]
    fn test_transfer_failure_reinitializes() {
        let mut worker = PanelWorker::new(Eye::Left, FakePanel::default(), 3);
        assert!(worker.bring_up());
        worker.panel.fail_ops = 1;
        assert_eq!(worker.show(&frame(1)), Outcome::Dropped);
        assert_eq!(worker.show(&frame(2)), Outcome::Shown);
        assert_eq!(worker.panel.inits, 2);
        assert_eq!(worker.panel.shown, vec![vec![2, 2]]);
    }

    #[test]
    fn test_gives_up_after_max_attempts() {
        let mut worker = PanelWorker::new(Eye::Right, FakePanel::default(), 2);
        worker.panel.fail_ops = u32::MAX;
        assert_eq!(worker.show(&frame(1)), Outcome::Dropped);
        assert_eq!(worker.show(&frame(1)), Outcome::Dropped);
        assert_eq!(worker.show(&frame(1)), Outcome::Failed);
        assert!(worker.is_failed());
        let inits = worker.panel.inits;
        assert_eq!(worker.show(&frame(1)), Outcome::Failed);
        assert_eq!(worker.panel.inits, inits);
    }

    #[test]
    fn test_success_resets_failure_count() {
        let mut worker = PanelWorker::new(Eye::Left, FakePanel::default(), 1);
        for _ in 0..5 {
            worker.panel.fail_ops = 1;
            assert_eq!(worker.show(&frame(1)), Outcome::Dropped);
            assert_eq!(worker.show(&frame(2)), Outcome::Shown);
        }
        assert!(!worker.is_failed());
    }

    #[test]
    fn test_bad_frame_is_dropped_without_reinit() {
        let mut worker = PanelWorker::new(Eye::Left, FakePanel::default(), 0);
        let wide = DeviceFrame::from_rgb565(2, 1, vec![0; 4]).unwrap();
        assert_eq!(worker.show(&wide), Outcome::Dropped);
        assert!(!worker.is_failed());
        assert_eq!(worker.panel.inits, 1);
    }
}
