//! Loading animation task
//!
//! Shows a spinner on both panels until the animation tables are
//! published, then exits.

use embassy_time::{Duration, Ticker};
use log::info;

use ocellus_core::pipeline::{DeviceFrame, Eye};
use ocellus_core::render::spinner::spinner_frame;

use crate::context::AppContext;

/// Spinner step interval (10 Hz)
const SPINNER_PERIOD_MS: u64 = 100;

#[embassy_executor::task]
pub async fn loading_task(ctx: &'static AppContext) {
    info!("Loading animation started");
    let mut ticker = Ticker::every(Duration::from_millis(SPINNER_PERIOD_MS));
    let mut step = 0u32;
    while !ctx.is_ready() {
        push_spinner(ctx, step);
        step = step.wrapping_add(1);
        ticker.next().await;
    }
    info!("Loading animation stopped after {} steps", step);
}

/// Queue spinner frame `step` on both eyes
pub fn push_spinner<P>(ctx: &AppContext<P>, step: u32) {
    let display = &ctx.config.display;
    let frame = DeviceFrame::from_canvas(&spinner_frame(display.width, display.height, step));
    for eye in Eye::BOTH {
        ctx.queue(eye).push(frame.clone());
    }
}
