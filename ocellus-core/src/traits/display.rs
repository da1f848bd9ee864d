//! Eye panel driver trait

/// Coarse classification of a panel error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFault {
    /// Bus or pin I/O failed; re-initializing may recover
    Link,
    /// The request itself was wrong (buffer size, window); retrying cannot help
    Usage,
}

/// A panel that can be brought up and fed whole frames
pub trait EyePanel {
    /// Error type for panel operations
    type Error: core::fmt::Debug;

    /// Hardware reset and register bring-up
    fn initialize(&mut self) -> Result<(), Self::Error>;

    /// Push one full-panel RGB565 frame
    fn show(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Fill the panel with one RGB565 colour
    fn clear(&mut self, color: u16) -> Result<(), Self::Error>;

    /// Whether `initialize` has completed since the last failure
    fn is_initialized(&self) -> bool;

    /// Classify an error returned by this panel
    fn fault(error: &Self::Error) -> PanelFault;
}
