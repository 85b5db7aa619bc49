use std::{
    io::Error as IoError,
    pin::Pin,
    task::{ready, Context, Poll},
};

use futures_util::stream::Stream;
use hyper::body::{Bytes, Frame, SizeHint};
use tokio::{
    fs::File,
    io::{AsyncRead, AsyncSeek},
};

use crate::util::{FileBytesStream, FileBytesStreamRange};

/// Hyper Body implementation for responses produced by the chain.
pub enum Body<F = File> {
    /// No response body.
    Empty,
    /// An in-memory body, typically produced by a route handler.
    Bytes(Option<Bytes>),
    /// Serve a complete file.
    Full(FileBytesStream<F>),
    /// Serve a range from a file.
    Range(FileBytesStreamRange<F>),
}

impl<F> From<Bytes> for Body<F> {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(Some(bytes))
    }
}

impl<F> From<Vec<u8>> for Body<F> {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Some(bytes.into()))
    }
}

impl<F> From<String> for Body<F> {
    fn from(string: String) -> Self {
        Body::Bytes(Some(string.into()))
    }
}

impl<F> From<&'static str> for Body<F> {
    fn from(string: &'static str) -> Self {
        Body::Bytes(Some(Bytes::from_static(string.as_bytes())))
    }
}

impl<F> hyper::body::Body for Body<F>
where
    F: AsyncRead + AsyncSeek + Unpin,
{
    type Data = Bytes;
    type Error = IoError;

    fn poll_frame(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, IoError>>> {
        let opt = ready!(match *self {
            Body::Empty => return Poll::Ready(None),
            Body::Bytes(ref mut bytes) => {
                return Poll::Ready(bytes.take().map(|b| Ok(Frame::data(b))))
            }
            Body::Full(ref mut stream) => Pin::new(stream).poll_next(cx),
            Body::Range(ref mut stream) => Pin::new(stream).poll_next(cx),
        });
        Poll::Ready(opt.map(|res| res.map(Frame::data)))
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Body::Empty | Body::Bytes(None) => true,
            _ => false,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Body::Empty | Body::Bytes(None) => SizeHint::with_exact(0),
            Body::Bytes(Some(bytes)) => SizeHint::with_exact(bytes.len() as u64),
            _ => SizeHint::default(),
        }
    }
}

impl<F> std::fmt::Debug for Body<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Empty => f.write_str("Body::Empty"),
            Body::Bytes(bytes) => f.debug_tuple("Body::Bytes").field(bytes).finish(),
            Body::Full(_) => f.write_str("Body::Full(..)"),
            Body::Range(_) => f.write_str("Body::Range(..)"),
        }
    }
}
