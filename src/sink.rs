//! Delivery of stream events from the driver task to the consumer.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::records::DecodedRecord;
use crate::types::StreamEvent;
use crate::{Result, TelemetryError};

/// Default queue depth for [`Delivery::Backpressure`].
pub const DEFAULT_CAPACITY: usize = 256;

/// How events reach the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Bounded queue; the stream waits for the consumer when it is full, so
    /// no event is ever missed.
    Backpressure { capacity: usize },
    /// Only the most recent event is kept; sending never waits.
    Latest,
}

impl Default for Delivery {
    fn default() -> Self {
        Delivery::Backpressure { capacity: DEFAULT_CAPACITY }
    }
}

/// Value held by a latest-only channel.
#[derive(Debug, Clone, Default)]
pub(crate) struct LatestSlot {
    /// Most recent event of any kind
    pub event: Option<StreamEvent>,
    /// Most recent record, kept across later sync losses and the end marker
    pub record: Option<DecodedRecord>,
}

/// Producer half, owned by the driver task.
#[derive(Debug)]
pub(crate) enum EventSink {
    Queue(mpsc::Sender<StreamEvent>),
    Latest(watch::Sender<LatestSlot>),
}

/// Consumer half, owned by the stream handle.
#[derive(Debug)]
pub(crate) enum EventReceiver {
    Queue(mpsc::Receiver<StreamEvent>),
    Latest { rx: watch::Receiver<LatestSlot>, ended: bool },
}

/// Create a connected sink and receiver for `delivery`.
pub(crate) fn channel(delivery: Delivery) -> (EventSink, EventReceiver) {
    match delivery {
        Delivery::Backpressure { capacity } => {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            (EventSink::Queue(tx), EventReceiver::Queue(rx))
        }
        Delivery::Latest => {
            let (tx, rx) = watch::channel(LatestSlot::default());
            (EventSink::Latest(tx), EventReceiver::Latest { rx, ended: false })
        }
    }
}

impl EventSink {
    /// Deliver one event, waiting for queue capacity under backpressure.
    ///
    /// Fails with [`TelemetryError::ChannelClosed`] once the consumer is gone.
    pub(crate) async fn deliver(&self, event: StreamEvent) -> Result<()> {
        match self {
            EventSink::Queue(tx) => tx.send(event).await.map_err(|_| TelemetryError::ChannelClosed),
            EventSink::Latest(tx) => {
                if tx.is_closed() {
                    return Err(TelemetryError::ChannelClosed);
                }
                tx.send_modify(|slot| {
                    if let StreamEvent::Record(record) = &event {
                        slot.record = Some(record.clone());
                    }
                    slot.event = Some(event);
                });
                Ok(())
            }
        }
    }
}

impl EventReceiver {
    /// Next event, or `None` after the end-of-stream event has been seen and
    /// the producer is gone.
    pub(crate) async fn recv(&mut self) -> Option<StreamEvent> {
        match self {
            EventReceiver::Queue(rx) => rx.recv().await,
            EventReceiver::Latest { rx, ended } => {
                if *ended {
                    return None;
                }
                let event = match rx.changed().await {
                    Ok(()) => rx.borrow_and_update().event.clone(),
                    // Producer gone: the last value may still be an unseen end marker.
                    Err(_) => rx.borrow().event.clone().filter(StreamEvent::is_end),
                };
                if event.as_ref().is_none_or(StreamEvent::is_end) {
                    *ended = true;
                }
                event
            }
        }
    }

    /// Most recent record published on a latest-only channel.
    pub(crate) fn latest(&self) -> Option<DecodedRecord> {
        match self {
            EventReceiver::Queue(_) => None,
            EventReceiver::Latest { rx, .. } => rx.borrow().record.clone(),
        }
    }

    /// Stop accepting events. Pending sends on a full queue fail.
    pub(crate) fn close(&mut self) {
        match self {
            EventReceiver::Queue(rx) => rx.close(),
            EventReceiver::Latest { ended, .. } => *ended = true,
        }
    }

    /// Extra receiver for a latest-only channel.
    pub(crate) fn watch(&self) -> Option<watch::Receiver<LatestSlot>> {
        match self {
            EventReceiver::Queue(_) => None,
            EventReceiver::Latest { rx, .. } => Some(rx.clone()),
        }
    }
}
