//! Turns server-pushed message streams into caller-owned event channels.
//!
//! Every watch owns one source and one background task. The task forwards
//! decoded messages in arrival order into a bounded channel and is the only
//! party that ever closes it:
//!
//! - the source ends cleanly: the channel closes, no error event;
//! - the caller cancels its token: the channel closes, no error event;
//! - the source fails or a message does not decode: one `Err` event is
//!   delivered, then the channel closes and the source is not polled again.
//!
//! Sending into a full channel waits for the consumer, so a slow consumer
//! throttles the source instead of losing events.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use irpc::channel::mpsc as irpc_mpsc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result, ServiceError};

/// A server-driven sequence of messages.
pub trait MessageSource: Send + 'static {
    type Item: Send + 'static;

    /// The next message, `Ok(None)` once the server finished the stream.
    fn next(&mut self) -> impl Future<Output = Result<Option<Self::Item>>> + Send;
}

impl<T> MessageSource for irpc_mpsc::Receiver<Result<T, ServiceError>>
where
    T: std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + Unpin + 'static,
{
    type Item = T;

    async fn next(&mut self) -> Result<Option<T>> {
        match self.recv().await {
            Ok(Some(Ok(item))) => Ok(Some(item)),
            Ok(Some(Err(err))) => Err(err.into()),
            Ok(None) => Ok(None),
            Err(err) => Err(Error::Stream(err.to_string())),
        }
    }
}

/// Consumer side of a watch.
///
/// Yields `Ok` events in server order and at most one trailing `Err`.
/// `recv` returning `None` means the watch is over; drop the value or
/// cancel the token passed to the watch call to stop early.
#[derive(Debug)]
pub struct Events<T> {
    rx: mpsc::Receiver<Result<T>>,
}

impl<T> Events<T> {
    pub async fn recv(&mut self) -> Option<Result<T>> {
        self.rx.recv().await
    }
}

impl<T> Stream for Events<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Spawns the forwarding task for `source`.
///
/// `decode` turns each wire message into the caller-facing value; a decode
/// failure ends the watch like a transport failure.
pub fn spawn_forwarder<S, T, F>(
    kind: &'static str,
    mut source: S,
    decode: F,
    token: CancellationToken,
    capacity: usize,
) -> Events<T>
where
    S: MessageSource,
    T: Send + 'static,
    F: Fn(S::Item) -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("{kind} watch canceled");
                    break;
                }
                _ = tx.closed() => {
                    debug!("{kind} watch receiver dropped");
                    break;
                }
                next = source.next() => next,
            };
            let event = match next {
                Ok(Some(item)) => decode(item),
                Ok(None) => {
                    debug!("{kind} watch finished by service");
                    break;
                }
                Err(err) => Err(err),
            };
            let terminal = event.is_err();
            if let Err(err) = &event {
                warn!("{kind} watch failed: {err}");
            }
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("{kind} watch canceled");
                    break;
                }
                sent = tx.send(event) => {
                    if sent.is_err() {
                        debug!("{kind} watch receiver dropped");
                        break;
                    }
                }
            }
            if terminal {
                break;
            }
        }
        // source and tx drop here: the service sees the stream closed and the
        // consumer sees the end of the channel.
    });
    Events { rx }
}
