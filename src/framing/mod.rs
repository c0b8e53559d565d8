//! Streaming frame synchronization, validation and synthesis.
//!
//! Bytes flow through a [`FrameBuffer`], the [`Synchronizer`] finds an
//! aligned candidate and checks its length field and checksum, and the
//! [`FrameDecoder`] turns validated frames into records.
//!
//! ## Resynchronization
//!
//! - Garbage before a preamble byte is skipped.
//! - A buffer with no preamble byte at all is dropped and reported once as a
//!   `NoPreamble` sync loss.
//! - An aligned frame with a bad length field or checksum is reported and the
//!   buffer slides by one byte, so a frame hidden inside a corrupted one is
//!   still found.

mod buffer;
pub mod checksum;
mod decoder;
mod encoder;
mod sync;

pub use buffer::FrameBuffer;
pub use decoder::{FrameDecoder, GAP_REPORT_FRAMES};
pub use encoder::encode_frame;
pub use sync::{SyncStep, Synchronizer, validate};
