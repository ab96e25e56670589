//! Loopback listener whose connections can be cut off on demand.
//!
//! `axum::serve` runs every connection on its own task, so aborting the
//! serve task alone leaves in-flight requests running. Each accepted stream
//! here watches a shared [`CancellationToken`]; once it is cancelled, reads
//! and writes fail with `ConnectionAborted`, hyper drops the connection and
//! the request future with it.

use std::future::Future;
use std::io::{Error as IoError, ErrorKind, Result as IoResult};
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::serve::Listener;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

pub(crate) struct AbortableListener {
    inner: TcpListener,
    abort: CancellationToken,
}

impl AbortableListener {
    pub(crate) fn new(inner: TcpListener, abort: CancellationToken) -> Self {
        Self { inner, abort }
    }
}

impl Listener for AbortableListener {
    type Io = AbortableStream;
    type Addr = SocketAddr;

    async fn accept(&mut self) -> (Self::Io, Self::Addr) {
        let (stream, address) = Listener::accept(&mut self.inner).await;
        (AbortableStream::new(stream, self.abort.clone()), address)
    }

    fn local_addr(&self) -> IoResult<Self::Addr> {
        self.inner.local_addr()
    }
}

pub(crate) struct AbortableStream {
    inner: TcpStream,
    abort: CancellationToken,
    aborted: Pin<Box<WaitForCancellationFutureOwned>>,
}

impl AbortableStream {
    fn new(inner: TcpStream, abort: CancellationToken) -> Self {
        let aborted = Box::pin(abort.clone().cancelled_owned());
        Self {
            inner,
            abort,
            aborted,
        }
    }

    /// Fails once the token is cancelled; otherwise registers `cx` for it.
    fn poll_abort(&mut self, cx: &mut Context<'_>) -> IoResult<()> {
        if self.abort.is_cancelled() || self.aborted.as_mut().poll(cx).is_ready() {
            return Err(IoError::new(
                ErrorKind::ConnectionAborted,
                "connection force-closed at shutdown",
            ));
        }
        Ok(())
    }
}

impl AsyncRead for AbortableStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<IoResult<()>> {
        let this = self.get_mut();
        if let Err(e) = this.poll_abort(cx) {
            return Poll::Ready(Err(e));
        }
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for AbortableStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<IoResult<usize>> {
        let this = self.get_mut();
        if let Err(e) = this.poll_abort(cx) {
            return Poll::Ready(Err(e));
        }
        Pin::new(&mut this.inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<IoResult<()>> {
        let this = self.get_mut();
        if let Err(e) = this.poll_abort(cx) {
            return Poll::Ready(Err(e));
        }
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<IoResult<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}
