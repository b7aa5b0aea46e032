//! Chunked upload of an arbitrary byte source.

use std::time::Duration;

use bytes::Bytes;
use irpc::channel::{mpsc, oneshot};
use strata_core::ContentAddress;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, warn};

use crate::error::{DecodeError, Error, Result, ServiceError};

/// Size of every upload frame except possibly the last one.
pub const CHUNK_SIZE: usize = 32 * 1024;

/// Reads until `buf` is full or the source is exhausted.
async fn fill_chunk<R: AsyncRead + Unpin>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Streams `source` as frames of [`CHUNK_SIZE`] bytes and waits for the
/// service to answer with the content address.
///
/// An empty source still produces one (empty) frame. If a frame is refused
/// because the service already ended the upload, the service's reply is
/// authoritative, whether it is an error or an address; it is awaited for
/// at most `recovery_timeout`.
pub(crate) async fn send_chunks<R>(
    mut source: R,
    tx: mpsc::Sender<Bytes>,
    reply: oneshot::Receiver<Result<String, ServiceError>>,
    recovery_timeout: Duration,
) -> Result<ContentAddress>
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut frames = 0usize;
    loop {
        let n = fill_chunk(&mut source, &mut buf).await?;
        if n == 0 && frames > 0 {
            break;
        }
        if let Err(err) = tx.send(Bytes::copy_from_slice(&buf[..n])).await {
            warn!("upload frame {frames} refused: {err}");
            return recover(reply, err.to_string(), recovery_timeout).await;
        }
        frames += 1;
        if n < CHUNK_SIZE {
            break;
        }
    }
    drop(tx);
    debug!("upload sent {frames} frames, awaiting address");

    let cid = reply
        .await
        .map_err(|err| Error::Stream(format!("no upload response: {err}")))??;
    Ok(ContentAddress::parse(&cid).map_err(DecodeError::from)?)
}

async fn recover(
    reply: oneshot::Receiver<Result<String, ServiceError>>,
    cause: String,
    after: Duration,
) -> Result<ContentAddress> {
    match tokio::time::timeout(after, reply).await {
        Ok(Ok(Err(service))) => Err(service.into()),
        // The service finished the upload before it stopped reading frames.
        Ok(Ok(Ok(cid))) => Ok(ContentAddress::parse(&cid).map_err(DecodeError::from)?),
        Ok(Err(_)) => Err(Error::Stream(cause)),
        Err(_) => Err(Error::UploadResponseTimeout { after, cause }),
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    const SHORT: Duration = Duration::from_millis(50);

    #[tokio::test]
    async fn fill_chunk_reads_across_short_reads() {
        let data = vec![3u8; 100];
        let (head, tail) = data.split_at(7);
        let mut source = head.chain(tail);

        let mut buf = [0u8; 64];
        assert_eq!(fill_chunk(&mut source, &mut buf).await.unwrap(), 64);
        assert_eq!(fill_chunk(&mut source, &mut buf).await.unwrap(), 36);
        assert_eq!(fill_chunk(&mut source, &mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn refused_frame_without_reply_times_out() {
        let (tx, rx) = mpsc::channel::<Bytes>(1);
        drop(rx);
        let (_reply_tx, reply_rx) = oneshot::channel::<Result<String, ServiceError>>();

        let err = send_chunks(&b"data"[..], tx, reply_rx, SHORT)
            .await
            .unwrap_err();
        match err {
            Error::UploadResponseTimeout { after, .. } => assert_eq!(after, SHORT),
            other => panic!("expected a timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn refused_frame_with_closed_reply_is_a_stream_error() {
        let (tx, rx) = mpsc::channel::<Bytes>(1);
        drop(rx);
        let (reply_tx, reply_rx) = oneshot::channel::<Result<String, ServiceError>>();
        drop(reply_tx);

        let err = send_chunks(&b"data"[..], tx, reply_rx, SHORT)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Stream(_)), "{err:?}");
    }

    #[tokio::test]
    async fn refused_frame_after_a_successful_reply_returns_the_address() {
        let (tx, rx) = mpsc::channel::<Bytes>(1);
        drop(rx);
        let (reply_tx, reply_rx) = oneshot::channel::<Result<String, ServiceError>>();
        let cid = ContentAddress::for_bytes(b"data");
        reply_tx.send(Ok(cid.to_string())).await.unwrap();

        let got = send_chunks(&b"data"[..], tx, reply_rx, SHORT).await.unwrap();
        assert_eq!(got, cid);
    }
}
