//! Driver spawns and manages packet stream tasks

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::framing::FrameDecoder;
use crate::sink::{self, EventReceiver, EventSink};
use crate::source::ByteSource;
use crate::types::{StreamEvent, StreamSummary};
use crate::{Result, StreamConfig, TelemetryError};

/// Result of spawning a stream task
pub(crate) struct DriverChannels {
    /// Receiver for stream events
    pub events: EventReceiver,
    /// Cancellation token for graceful shutdown
    pub cancel: CancellationToken,
    /// Completion of the stream task
    pub task: JoinHandle<Result<StreamSummary>>,
}

/// Driver spawns and manages packet stream tasks
///
/// Each stream is one task that exclusively owns its source and frame
/// decoder. Only [`StreamEvent`]s leave the task.
pub(crate) struct Driver;

/// Why the read loop stopped
enum Exit {
    EndOfStream,
    /// Cancelled, possibly while an event was waiting for queue space
    Cancelled(Option<StreamEvent>),
    ConsumerGone,
    Failed(TelemetryError),
}

impl Driver {
    /// Spawn the stream task for `source`
    pub fn spawn<S>(source: S, config: StreamConfig) -> DriverChannels
    where
        S: ByteSource,
    {
        let (events_tx, events_rx) = sink::channel(config.delivery);
        let cancel = CancellationToken::new();
        let decoder = FrameDecoder::new(config.packet_type);

        let task = tokio::spawn(Self::stream_task(
            source,
            decoder,
            config.reset_command,
            events_tx,
            cancel.clone(),
        ));

        DriverChannels { events: events_rx, cancel, task }
    }

    async fn stream_task<S>(
        mut source: S,
        mut decoder: FrameDecoder,
        reset_command: Option<Vec<u8>>,
        sink: EventSink,
        cancel: CancellationToken,
    ) -> Result<StreamSummary>
    where
        S: ByteSource,
    {
        let packet = decoder.definition().packet_type;
        info!(%packet, kind = ?source.kind(), "Packet stream started");

        let exit = match reset_command {
            Some(command) => match source.send_command(&command).await {
                Ok(()) => Self::read_loop(&mut source, &mut decoder, &sink, &cancel).await,
                Err(e) => Exit::Failed(e),
            },
            None => Self::read_loop(&mut source, &mut decoder, &sink, &cancel).await,
        };

        // Replay end and cancellation both flush what is already buffered
        let mut failure = None;
        match exit {
            Exit::EndOfStream => Self::flush(&mut decoder, &sink, None).await,
            Exit::Cancelled(parked) => Self::flush(&mut decoder, &sink, parked).await,
            Exit::ConsumerGone => debug!(%packet, "Event receiver dropped, shutting down"),
            Exit::Failed(e) => {
                error!(%packet, error = %e, "Byte source failed");
                failure = Some(e);
            }
        }

        let summary = decoder.summary();
        let _ = sink.deliver(StreamEvent::EndOfStream(summary)).await;
        info!(
            %packet,
            records = summary.records,
            sync_losses = summary.sync_losses,
            bytes_read = summary.bytes_read,
            bytes_discarded = summary.bytes_discarded,
            "Packet stream ended"
        );

        match failure {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    /// Deliver `parked` first, then whatever the closed decoder still holds.
    async fn flush(decoder: &mut FrameDecoder, sink: &EventSink, parked: Option<StreamEvent>) {
        decoder.close();
        let mut pending = parked;
        while let Some(event) = pending.take().or_else(|| decoder.next_event()) {
            if sink.deliver(event).await.is_err() {
                break;
            }
        }
    }

    async fn read_loop<S>(
        source: &mut S,
        decoder: &mut FrameDecoder,
        sink: &EventSink,
        cancel: &CancellationToken,
    ) -> Exit
    where
        S: ByteSource,
    {
        loop {
            let chunk = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Packet stream cancelled during read");
                    return Exit::Cancelled(None);
                }
                result = source.read() => result,
            };

            match chunk {
                Ok(Some(bytes)) => {
                    decoder.feed(&bytes);
                    while let Some(event) = decoder.next_event() {
                        // Backpressure may park here; cancellation still wins, and
                        // an unsent event goes back to the flush
                        let delivered = tokio::select! {
                            _ = cancel.cancelled() => return Exit::Cancelled(Some(event)),
                            delivered = sink.deliver(event.clone()) => delivered,
                        };
                        if delivered.is_err() {
                            return Exit::ConsumerGone;
                        }
                    }
                }
                Ok(None) => {
                    debug!("Byte source reached end of stream");
                    return Exit::EndOfStream;
                }
                Err(e) => return Exit::Failed(e),
            }
        }
    }
}
