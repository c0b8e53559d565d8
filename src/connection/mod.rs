//! Caller-facing handle for a running packet stream
//!
//! A [`StreamHandle`] owns the consumer side of one stream: it receives the
//! events the driver task produces, exposes them as futures `Stream`s, and
//! stops the task when closed or dropped.

use futures::stream::{BoxStream, Stream, StreamExt};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::driver::Driver;
use crate::records::DecodedRecord;
use crate::sink::EventReceiver;
use crate::source::{ByteSource, SourceKind};
use crate::stream::ThrottleExt;
use crate::types::{PacketType, StreamEvent, StreamSummary, UpdateRate};
use crate::{Result, StreamConfig, TelemetryError};

#[cfg(test)]
mod tests;

/// Handle to one running packet stream
pub struct StreamHandle {
    packet_type: PacketType,
    source_kind: SourceKind,
    events: EventReceiver,
    cancel: CancellationToken,
    task: Option<JoinHandle<Result<StreamSummary>>>,
    /// Last record handed to the consumer
    last_record: Option<DecodedRecord>,
}

impl StreamHandle {
    /// Start the stream task for `source`.
    pub(crate) fn spawn<S: ByteSource>(source: S, config: StreamConfig) -> Self {
        let packet_type = config.packet_type;
        let source_kind = source.kind();
        let channels = Driver::spawn(source, config);

        Self {
            packet_type,
            source_kind,
            events: channels.events,
            cancel: channels.cancel,
            task: Some(channels.task),
            last_record: None,
        }
    }

    /// Packet type this stream decodes
    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    /// Kind of the underlying source
    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    /// Next event, or `None` once the stream has ended.
    ///
    /// The last event of every stream is [`StreamEvent::EndOfStream`].
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        let event = self.events.recv().await?;
        if let StreamEvent::Record(record) = &event {
            self.last_record = Some(record.clone());
        }
        Some(event)
    }

    /// Next decoded record, skipping sync losses.
    pub async fn next_record(&mut self) -> Option<DecodedRecord> {
        while let Some(event) = self.next_event().await {
            if let StreamEvent::Record(record) = event {
                return Some(record);
            }
        }
        None
    }

    /// All remaining events as a `Stream`
    pub fn events(&mut self) -> impl Stream<Item = StreamEvent> + Send + '_ {
        futures::stream::unfold(self, |handle| async move {
            let event = handle.next_event().await?;
            Some((event, handle))
        })
    }

    /// All remaining decoded records as a `Stream`
    pub fn records(&mut self) -> impl Stream<Item = DecodedRecord> + Send + '_ {
        self.events().filter_map(|event| async move { event.into_record() })
    }

    /// Most recent record.
    ///
    /// With [`Delivery::Latest`](crate::Delivery::Latest) this is the newest
    /// record the stream has published, read or not. With backpressure it is
    /// the last record the consumer received.
    pub fn latest(&self) -> Option<DecodedRecord> {
        self.events.latest().or_else(|| self.last_record.clone())
    }

    /// Independent stream of the newest records, at most `rate` per second
    ///
    /// Only available with [`Delivery::Latest`](crate::Delivery::Latest);
    /// several subscribers can watch the same stream. The subscription ends
    /// with the stream.
    pub fn subscribe_latest(&self, rate: UpdateRate) -> Result<BoxStream<'static, DecodedRecord>> {
        let rx = self.events.watch().ok_or_else(|| {
            TelemetryError::config("subscribe_latest requires latest-only delivery")
        })?;

        // WatchStream yields the current value first; an empty slot means
        // nothing has been published yet.
        let records = WatchStream::new(rx)
            .take_while(|slot| {
                let ended = slot.event.as_ref().is_some_and(StreamEvent::is_end);
                async move { !ended }
            })
            .filter_map(|slot| async move { slot.event.and_then(StreamEvent::into_record) });

        Ok(match rate.throttle_interval(None) {
            None => records.boxed(),
            Some(interval) => records.throttle(interval).boxed(),
        })
    }

    /// Ask the stream task to stop. Buffered input is still flushed and
    /// an `EndOfStream` event follows.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Wait for the stream task and return its summary
    ///
    /// Events not yet received are discarded. Source failures surface here.
    /// A live stream runs until it is closed, so call [`close`](Self::close)
    /// first unless the source ends on its own.
    pub async fn join(mut self) -> Result<StreamSummary> {
        self.events.close();
        let task = self
            .task
            .take()
            .ok_or_else(|| TelemetryError::Task { reason: "stream already joined".into() })?;

        task.await.map_err(|e| TelemetryError::Task { reason: e.to_string() })?
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        if !self.cancel.is_cancelled() {
            debug!(packet = %self.packet_type, "Dropping stream handle");
        }
        // Cancel tasks on drop for clean shutdown
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamHandle")
            .field("packet_type", &self.packet_type)
            .field("source_kind", &self.source_kind)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}
