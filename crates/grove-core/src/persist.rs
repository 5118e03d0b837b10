//! Snapshot persistence sinks.
//!
//! The canvas hands a `CanvasSnapshot` to a `CanvasPersistence` whenever it
//! wants to save. Where the bytes end up is the sink's business.

use crate::error::CanvasError;
use crate::model::CanvasSnapshot;

/// Receives canvas snapshots to persist.
pub trait CanvasPersistence {
    /// # Errors
    /// Implementations report encoding or I/O failures.
    fn save(&mut self, snapshot: &CanvasSnapshot) -> Result<(), CanvasError>;
}

/// Encodes snapshots as MessagePack and keeps the most recent bytes in memory.
#[derive(Debug, Default)]
pub struct MsgpackBuffer {
    latest: Option<Vec<u8>>,
    saves: usize,
}

impl MsgpackBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes from the last successful save.
    pub fn latest(&self) -> Option<&[u8]> {
        self.latest.as_deref()
    }

    /// How many saves succeeded.
    pub fn save_count(&self) -> usize {
        self.saves
    }

    /// Decode the last saved snapshot.
    ///
    /// # Errors
    /// `Decode` if the stored bytes are not a valid snapshot.
    pub fn load(&self) -> Result<Option<CanvasSnapshot>, CanvasError> {
        self.latest
            .as_deref()
            .map(decode_snapshot)
            .transpose()
    }
}

impl CanvasPersistence for MsgpackBuffer {
    fn save(&mut self, snapshot: &CanvasSnapshot) -> Result<(), CanvasError> {
        self.latest = Some(encode_snapshot(snapshot)?);
        self.saves += 1;
        Ok(())
    }
}

/// # Errors
/// `Encode` if serialization fails.
pub fn encode_snapshot(snapshot: &CanvasSnapshot) -> Result<Vec<u8>, CanvasError> {
    Ok(rmp_serde::to_vec_named(snapshot)?)
}

/// # Errors
/// `Decode` if `bytes` is not a MessagePack snapshot.
pub fn decode_snapshot(bytes: &[u8]) -> Result<CanvasSnapshot, CanvasError> {
    Ok(rmp_serde::from_slice(bytes)?)
}
