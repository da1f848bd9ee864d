//! Embassy async tasks
//!
//! Each task runs independently and communicates through the
//! [`AppContext`](crate::context::AppContext).

pub mod actuator;
pub mod breath;
pub mod dispatch;
pub mod display;
pub mod loading;
pub mod render;

pub use actuator::actuator_task;
pub use breath::breath_task;
pub use dispatch::dispatch_task;
pub use display::display_task;
pub use loading::loading_task;
pub use render::render_task;
