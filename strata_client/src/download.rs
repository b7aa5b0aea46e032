//! Reassembles a downloaded chunk stream into a reader.

use std::io;

use bytes::Bytes;
use futures::StreamExt;
use irpc::channel::mpsc;
use tokio::io::AsyncRead;
use tokio_util::io::StreamReader;

use crate::error::ServiceError;

/// Chunks are read in arrival order. A clean end of the server stream is
/// EOF; a failure surfaces as an I/O error and nothing is read after it.
pub(crate) fn into_reader(
    rx: mpsc::Receiver<Result<Bytes, ServiceError>>,
) -> impl AsyncRead + Send + Unpin + 'static {
    let chunks = futures::stream::unfold(Some(rx), |state| async move {
        let mut rx = state?;
        match rx.recv().await {
            Ok(Some(Ok(chunk))) => Some((Ok(chunk), Some(rx))),
            Ok(Some(Err(err))) => Some((Err(io::Error::other(err)), None)),
            Ok(None) => None,
            Err(err) => Some((Err(io::Error::other(err.to_string())), None)),
        }
    });
    StreamReader::new(chunks.boxed())
}
