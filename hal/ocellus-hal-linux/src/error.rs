//! Error type shared by the Linux backends

use std::io;

/// Errors from kernel device access
#[derive(Debug, thiserror::Error)]
pub enum LinuxHalError {
    /// Opening or writing a device node failed
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    /// An ioctl was rejected by the driver
    #[error("{what} failed: {source}")]
    Ioctl {
        what: &'static str,
        #[source]
        source: nix::Error,
    },
    /// Pin number already handed out by the pin bank
    #[error("GPIO {0} already taken")]
    PinTaken(u32),
    /// Transfer larger than the kernel accepts in one message
    #[error("transfer of {len} bytes exceeds limit of {max}")]
    TransferTooLarge { len: usize, max: usize },
}

impl LinuxHalError {
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
