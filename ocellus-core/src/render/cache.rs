//! Versioned, content-addressed animation table cache format
//!
//! A cached table is identified by a [`TableKey`]: a SHA-256 digest over
//! the format version, the table kind, the source texture pixels and every
//! render parameter that shapes the frames. Changing any input, or bumping
//! [`CACHE_VERSION`], yields a different key and so a cache miss.
//!
//! # Format
//!
//! ```text
//! postcard { magic: "OCLT", version: u16, key: [u8; 32],
//!            kind, canvas_size: u32, frames: [[u8]] }
//! ```

use std::fmt;
use std::io;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::table::{AnimationTable, TableKind};
use super::Canvas;
use crate::config::{EyelidConfig, RenderConfig};

/// File magic
pub const CACHE_MAGIC: [u8; 4] = *b"OCLT";

/// Bump whenever rendering output or layout changes
pub const CACHE_VERSION: u16 = 1;

/// Errors loading or storing a cached table
///
/// Never fatal: the caller rebuilds the table instead.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O: {0}")]
    Io(#[from] io::Error),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("bad magic")]
    BadMagic,
    #[error("format version {found}, expected {CACHE_VERSION}")]
    Version { found: u16 },
    #[error("key mismatch")]
    KeyMismatch,
    #[error("table kind mismatch")]
    KindMismatch,
    #[error("expected {expected} frames, found {found}")]
    FrameCount { expected: usize, found: usize },
    #[error("frame {index} has wrong length")]
    FrameLength { index: usize },
}

/// Content address of one table
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableKey([u8; 32]);

impl TableKey {
    fn hasher(kind: TableKind) -> Sha256 {
        let mut h = Sha256::new();
        h.update(CACHE_MAGIC);
        h.update(CACHE_VERSION.to_le_bytes());
        h.update([kind as u8]);
        h
    }

    fn hash_texture(h: &mut Sha256, tex: &Canvas) {
        h.update(tex.width().to_le_bytes());
        h.update(tex.height().to_le_bytes());
        h.update(tex.as_bytes());
    }

    fn finish(h: Sha256) -> Self {
        Self(h.finalize().into())
    }

    /// Key for an iris/sclera table
    ///
    /// Texture paths are not hashed; their decoded pixels are.
    pub fn iris(iris: &Canvas, sclera: &Canvas, config: &RenderConfig) -> Self {
        let mut h = Self::hasher(TableKind::IrisSclera);
        Self::hash_texture(&mut h, iris);
        Self::hash_texture(&mut h, sclera);
        h.update(config.canvas_size.to_le_bytes());
        for axes in [
            config.sclera_inner,
            config.sclera_outer,
            config.iris_inner_normal,
            config.iris_inner_max,
            config.iris_outer,
        ] {
            h.update(axes.0.to_le_bytes());
            h.update(axes.1.to_le_bytes());
        }
        h.update((config.iris_steps as u64).to_le_bytes());
        Self::finish(h)
    }

    /// Key for an eyelid table
    pub fn eyelid(config: &EyelidConfig, canvas_size: u32) -> Self {
        let mut h = Self::hasher(TableKind::Eyelid);
        h.update(canvas_size.to_le_bytes());
        h.update(config.color.to_ascii_lowercase().as_bytes());
        h.update((config.steps as u64).to_le_bytes());
        for axes in [config.open, config.closed] {
            h.update(axes.0.to_le_bytes());
            h.update(axes.1.to_le_bytes());
        }
        h.update(config.angle_deg.to_le_bytes());
        h.update(config.sharpness.to_le_bytes());
        Self::finish(h)
    }

    /// Lowercase hex digest, used as the file name
    pub fn hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Debug for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableKey({})", &self.hex()[..12])
    }
}

#[derive(Serialize, Deserialize)]
struct CachedTable {
    magic: [u8; 4],
    version: u16,
    key: TableKey,
    kind: TableKind,
    canvas_size: u32,
    frames: Vec<Vec<u8>>,
}

/// Serialize `table` under `key`
///
/// Frames must be square; the first frame's edge is recorded.
pub fn encode(table: &AnimationTable, key: &TableKey) -> Result<Vec<u8>, CacheError> {
    let canvas_size = table.frames().first().map(|f| f.width()).unwrap_or(0);
    let cached = CachedTable {
        magic: CACHE_MAGIC,
        version: CACHE_VERSION,
        key: *key,
        kind: table.kind(),
        canvas_size,
        frames: table.frames().iter().map(|f| f.as_bytes().to_vec()).collect(),
    };
    postcard::to_allocvec(&cached).map_err(|e| CacheError::Encode(e.to_string()))
}

/// Deserialize and verify a cached table
///
/// Every header field and frame length is checked against what the caller
/// is about to build, so a stale or truncated file is never used.
pub fn decode(
    bytes: &[u8],
    key: &TableKey,
    kind: TableKind,
    canvas_size: u32,
    frame_count: usize,
) -> Result<AnimationTable, CacheError> {
    if bytes.len() < CACHE_MAGIC.len() || bytes[..CACHE_MAGIC.len()] != CACHE_MAGIC {
        return Err(CacheError::BadMagic);
    }
    let cached: CachedTable =
        postcard::from_bytes(bytes).map_err(|e| CacheError::Decode(e.to_string()))?;
    if cached.version != CACHE_VERSION {
        return Err(CacheError::Version {
            found: cached.version,
        });
    }
    if cached.key != *key {
        return Err(CacheError::KeyMismatch);
    }
    if cached.kind != kind || cached.canvas_size != canvas_size {
        return Err(CacheError::KindMismatch);
    }
    if cached.frames.len() != frame_count {
        return Err(CacheError::FrameCount {
            expected: frame_count,
            found: cached.frames.len(),
        });
    }

    let mut frames = Vec::with_capacity(frame_count);
    for (index, data) in cached.frames.into_iter().enumerate() {
        let frame = Canvas::from_rgba(canvas_size, canvas_size, data)
            .map_err(|_| CacheError::FrameLength { index })?;
        frames.push(frame);
    }
    AnimationTable::new(kind, frames).map_err(|e| CacheError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ring::Axes;

    fn table() -> AnimationTable {
        let frames = (0..3u8)
            .map(|i| Canvas::filled(4, 4, [i, i, i, 255]))
            .collect();
        AnimationTable::new(TableKind::Eyelid, frames).unwrap()
    }

    #[test]
    fn test_encode_decode() {
        let key = TableKey::eyelid(&EyelidConfig::default(), 4);
        let bytes = encode(&table(), &key).unwrap();
        assert_eq!(&bytes[..4], b"OCLT");
        let back = decode(&bytes, &key, TableKind::Eyelid, 4, 3).unwrap();
        assert_eq!(back, table());
    }

    #[test]
    fn test_key_mismatch_rejected() {
        let key = TableKey::eyelid(&EyelidConfig::default(), 4);
        let other = TableKey::eyelid(
            &EyelidConfig {
                open: Axes(100, 80),
                ..EyelidConfig::default()
            },
            4,
        );
        assert_ne!(key, other);
        let bytes = encode(&table(), &key).unwrap();
        assert!(matches!(
            decode(&bytes, &other, TableKind::Eyelid, 4, 3),
            Err(CacheError::KeyMismatch)
        ));
    }

    #[test]
    fn test_frame_count_checked() {
        let key = TableKey::eyelid(&EyelidConfig::default(), 4);
        let bytes = encode(&table(), &key).unwrap();
        assert!(matches!(
            decode(&bytes, &key, TableKind::Eyelid, 4, 16),
            Err(CacheError::FrameCount {
                expected: 16,
                found: 3
            })
        ));
    }

    #[test]
    fn test_truncated_and_garbage() {
        let key = TableKey::eyelid(&EyelidConfig::default(), 4);
        let bytes = encode(&table(), &key).unwrap();
        assert!(matches!(
            decode(&bytes[..bytes.len() / 2], &key, TableKind::Eyelid, 4, 3),
            Err(CacheError::Decode(_))
        ));
        assert!(matches!(
            decode(b"nope", &key, TableKind::Eyelid, 4, 3),
            Err(CacheError::BadMagic)
        ));
    }

    #[test]
    fn test_iris_key_depends_on_pixels() {
        let config = RenderConfig::default();
        let a = Canvas::filled(2, 2, [1, 2, 3, 255]);
        let b = Canvas::filled(2, 2, [1, 2, 4, 255]);
        let sclera = Canvas::filled(2, 2, [9, 9, 9, 255]);
        assert_eq!(
            TableKey::iris(&a, &sclera, &config),
            TableKey::iris(&a, &sclera, &config)
        );
        assert_ne!(
            TableKey::iris(&a, &sclera, &config),
            TableKey::iris(&b, &sclera, &config)
        );
        assert_eq!(TableKey::iris(&a, &sclera, &config).hex().len(), 64);
    }
}
