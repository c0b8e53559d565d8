//! Streaming framing, validation and decoding for IMU and INS serial packets.
//!
//! imulink turns an unbounded, possibly corrupted byte stream from an inertial
//! unit (or a capture file of one) into typed, scaled records.
//!
//! # Features
//!
//! - **Self-healing framing**: preamble search, checksum validation and
//!   single-byte resync after a glitch, with every loss reported in-band
//! - **Static catalog**: seventeen packet types of the IMU38x, OpenIMU/INS and
//!   INS1000 lines, each with a typed record
//! - **Chunking independence**: the same bytes yield the same events however
//!   they are split across reads
//! - **Async streams**: one tokio task per device, with backpressure or
//!   latest-only delivery
//!
//! ## Example (capture replay)
//!
//! ```rust,no_run
//! use imulink::{ImuLink, StreamConfig};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> imulink::Result<()> {
//!     let config = StreamConfig::from_tag("S1")?;
//!     let mut stream = ImuLink::open("/path/to/ins381.bin", config).await?;
//!
//!     let mut records = Box::pin(stream.records());
//!     while let Some(record) = records.next().await {
//!         println!("{:?}", record);
//!     }
//!     drop(records);
//!
//!     let summary = stream.join().await?;
//!     println!("{} records, {} sync losses", summary.records, summary.sync_losses);
//!     Ok(())
//! }
//! ```
//!
//! ## Example (synchronous decoding)
//!
//! ```rust
//! use imulink::{FrameDecoder, PacketType, StreamEvent};
//!
//! let mut decoder = FrameDecoder::new(PacketType::S1);
//! decoder.feed(&[0x00, 0x13, 0x37]); // line noise, no frame yet
//! decoder.close();
//!
//! let events: Vec<StreamEvent> = decoder.events().collect();
//! assert_eq!(decoder.summary().records, 0);
//! assert_eq!(decoder.summary().bytes_discarded, 3);
//! assert!(events.iter().all(|event| event.record().is_none()));
//! ```

// Core types and error handling
pub mod catalog;
pub mod config;
mod error;
pub mod logging;
pub mod records;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Framing engine
pub mod framing;

// Stream-based architecture
pub mod connection;
mod driver;
pub mod sink;
pub mod source;
pub mod sources;
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;

pub use catalog::{PacketDefinition, definition, lookup};
pub use config::{SessionConfig, StreamConfig, UnitConfig};
pub use framing::{FrameDecoder, encode_frame};
pub use records::{DecodedRecord, PacketRecord};

// Main API exports
pub use connection::StreamHandle;
pub use sink::Delivery;
pub use source::{ByteSource, SourceKind};
pub use sources::{LiveSource, ReplaySource};
pub use stream::ThrottleExt;

/// Unified entry point for packet streams.
///
/// This factory provides a consistent API for streaming from capture files,
/// live devices, and any custom [`ByteSource`]. Every stream runs as its own
/// tokio task, so these functions must be called inside a runtime.
///
/// # Examples
///
/// ## Live device
/// ```rust,no_run
/// use imulink::{Delivery, ImuLink, PacketType, StreamConfig};
///
/// # async fn open_serial_port() -> tokio::io::DuplexStream { unimplemented!() }
/// #[tokio::main]
/// async fn main() -> imulink::Result<()> {
///     let port = open_serial_port().await;
///     let config = StreamConfig::new(PacketType::Nav).with_delivery(Delivery::Latest);
///     let stream = ImuLink::connect(port, config);
///     // Use stream...
///     Ok(())
/// }
/// ```
///
/// ## Capture file replay
/// ```rust,no_run
/// use imulink::{ImuLink, StreamConfig};
///
/// #[tokio::main]
/// async fn main() -> imulink::Result<()> {
///     let stream = ImuLink::open("ins381.bin", StreamConfig::from_tag("s1")?).await?;
///     // Use stream...
///     Ok(())
/// }
/// ```
pub struct ImuLink;

impl ImuLink {
    /// Stream from a live device transport.
    ///
    /// The transport is any `AsyncRead + AsyncWrite`, typically a serial
    /// port opened by the caller at the unit's baud rate. If the config has
    /// a reset command it is written once before reading starts.
    ///
    /// A live stream never ends on its own; close or drop the handle to stop
    /// it.
    pub fn connect<T>(transport: T, config: StreamConfig) -> StreamHandle
    where
        T: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin + Send + 'static,
    {
        StreamHandle::spawn(LiveSource::new(transport), config)
    }

    /// Replay a capture file.
    ///
    /// Loads the file and streams it through the same framing engine as a
    /// live device. The stream ends with
    /// [`StreamEvent::EndOfStream`] once the content is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not readable.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use imulink::{ImuLink, PacketType, StreamConfig};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> imulink::Result<()> {
    /// let mut stream = ImuLink::open("drive.bin", StreamConfig::new(PacketType::A2)).await?;
    /// while let Some(record) = stream.next_record().await {
    ///     println!("{:?}", record);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn open<P: AsRef<std::path::Path>>(path: P, config: StreamConfig) -> Result<StreamHandle> {
        let source = ReplaySource::open(path).await?;
        Ok(StreamHandle::spawn(source, config))
    }

    /// Stream from any byte source.
    pub fn attach<S: ByteSource>(source: S, config: StreamConfig) -> StreamHandle {
        StreamHandle::spawn(source, config)
    }
}
