//! Marker that follows the viewport center while the map is dragged, and
//! reverse-geocodes its final position when the gesture ends.
//!
//! Gesture cycle: `Idle -> Dragging (start) -> Idle (end, triggers lookup)`,
//! repeated for the lifetime of the marker.
//!
//! # Superseded lookups
//!
//! Every drag-end starts its lookup immediately on its own task. Only the
//! newest one is delivered: when a gesture ends while an earlier lookup is
//! still pending, the earlier task is detached and its answer never reaches
//! the result stream. The request itself runs to completion.
//!
//! Signals are handled before lookup results, so a lookup that has already
//! finished is still discarded if a newer drag-end arrives in the same wakeup.
//!
//! Lookup failures are delivered as `Err` items; the stream keeps running.

use futures::future::OptionFuture;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::geocoder::Geocoder;
use super::types::{GeoError, GeocodeResult, Position};

/// Map gesture signals, in arrival order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragSignal {
    Start,
    /// Viewport center while the map is being dragged.
    Drag(Position),
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging,
}

pub type DragResult = Result<Vec<GeocodeResult>, GeoError>;

pub struct MarkerDragStream {
    geocoder: Geocoder,
    marker: Position,
}

impl MarkerDragStream {
    pub fn new(geocoder: Geocoder, marker: Position) -> Self {
        Self { geocoder, marker }
    }

    /// Start consuming `signals` on the current tokio runtime.
    pub fn attach<S>(self, signals: S) -> DragSubscription
    where
        S: Stream<Item = DragSignal> + Send + Unpin + 'static,
    {
        let (marker_tx, marker_rx) = watch::channel(self.marker);
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(run(self.geocoder, signals, marker_tx, results_tx, stop_rx));

        DragSubscription {
            results: results_rx,
            marker: marker_rx,
            stop: Some(stop_tx),
            task,
        }
    }
}

/// Handle returned by [`MarkerDragStream::attach`].
///
/// Dropping the handle stops signal handling as well.
pub struct DragSubscription {
    results: mpsc::UnboundedReceiver<DragResult>,
    marker: watch::Receiver<Position>,
    stop: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl DragSubscription {
    /// Next delivered lookup; `None` once the signal source is exhausted or stopped.
    pub async fn next(&mut self) -> Option<DragResult> {
        self.results.recv().await
    }

    /// Current tracked marker position.
    pub fn marker_position(&self) -> Position {
        *self.marker.borrow()
    }

    /// Read-only view of the tracked marker position for the rendering layer.
    pub fn marker_watch(&self) -> watch::Receiver<Position> {
        self.marker.clone()
    }

    /// Stop receiving signals. A lookup still in flight is discarded.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn into_stream(self) -> impl Stream<Item = DragResult> {
        stream::unfold(self, |mut sub| async move { sub.next().await.map(|r| (r, sub)) })
    }
}

impl Drop for DragSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run<S>(
    geocoder: Geocoder,
    mut signals: S,
    marker: watch::Sender<Position>,
    results: mpsc::UnboundedSender<DragResult>,
    mut stop: oneshot::Receiver<()>,
) where
    S: Stream<Item = DragSignal> + Unpin,
{
    let mut state = DragState::Idle;
    let mut pending: Option<JoinHandle<DragResult>> = None;
    let mut signals_done = false;

    loop {
        tokio::select! {
            biased;

            _ = &mut stop => break,

            signal = signals.next(), if !signals_done => {
                let Some(signal) = signal else {
                    signals_done = true;
                    if pending.is_none() {
                        break;
                    }
                    continue;
                };

                match signal {
                    DragSignal::Start => state = DragState::Dragging,
                    DragSignal::Drag(center) => {
                        state = DragState::Dragging;
                        marker.send_replace(center);
                    }
                    DragSignal::End => {
                        if state == DragState::Idle {
                            log::debug!("drag end without a drag in progress");
                        }
                        state = DragState::Idle;
                        let at = *marker.borrow();
                        let lookup = tokio::spawn(geocoder.reverse(at));
                        if pending.replace(lookup).is_some() {
                            log::debug!("drag lookup superseded by a newer gesture at {}", at);
                        }
                    }
                }
            }

            Some(joined) = OptionFuture::from(pending.as_mut()), if pending.is_some() => {
                pending = None;
                let result = joined.unwrap_or_else(|e| {
                    Err(GeoError::Network(format!("drag lookup task failed: {}", e)))
                });
                if let Err(e) = &result {
                    log::debug!("drag lookup failed: {}", e);
                }
                if results.send(result).is_err() || signals_done {
                    break;
                }
            }
        }
    }

    log::debug!("marker drag stream stopped");
}
