use std::{
    cmp::min,
    io::{Error as IoError, SeekFrom},
    mem::MaybeUninit,
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::stream::Stream;
use http_range::HttpRange;
use hyper::body::Bytes;
use tokio::{
    fs::File,
    io::{AsyncRead, AsyncSeek, ReadBuf},
};

use crate::config::DEFAULT_CHUNK_SIZE;

fn chunk_buffer(chunk_size: usize) -> Box<[MaybeUninit<u8>]> {
    vec![MaybeUninit::uninit(); chunk_size.max(1)].into_boxed_slice()
}

/// Wraps an `AsyncRead`, like a tokio `File`, and implements a stream of `Bytes`s.
///
/// Each item is at most one chunk long, which bounds the memory held per response.
pub struct FileBytesStream<F = File> {
    file: F,
    buf: Box<[MaybeUninit<u8>]>,
    remaining: u64,
}

impl<F> FileBytesStream<F> {
    /// Create a new stream from the given file, using the default chunk size.
    pub fn new(file: F) -> Self {
        Self::with_chunk_size(file, DEFAULT_CHUNK_SIZE)
    }

    /// Create a new stream from the given file, producing chunks of up to `chunk_size` bytes.
    pub fn with_chunk_size(file: F, chunk_size: usize) -> Self {
        Self {
            file,
            buf: chunk_buffer(chunk_size),
            remaining: u64::MAX,
        }
    }

    /// Create a new stream from the given file, reading up to `limit` bytes.
    pub fn with_limit(file: F, chunk_size: usize, limit: u64) -> Self {
        Self {
            file,
            buf: chunk_buffer(chunk_size),
            remaining: limit,
        }
    }
}

impl<F> Stream for FileBytesStream<F>
where
    F: AsyncRead + Unpin,
{
    type Item = Result<Bytes, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        let Self {
            ref mut file,
            ref mut buf,
            ref mut remaining,
        } = *self;

        let max_read_length = min(*remaining, buf.len() as u64) as usize;
        if max_read_length == 0 {
            return Poll::Ready(None);
        }

        let mut read_buf = ReadBuf::uninit(&mut buf[..max_read_length]);
        match Pin::new(file).poll_read(cx, &mut read_buf) {
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                *remaining -= filled.len() as u64;
                if filled.is_empty() {
                    Poll::Ready(None)
                } else {
                    Poll::Ready(Some(Ok(Bytes::copy_from_slice(filled))))
                }
            }
            Poll::Ready(Err(e)) => Poll::Ready(Some(Err(e))),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[derive(PartialEq, Eq)]
enum FileSeekState {
    NeedSeek,
    Seeking,
    Reading,
}

/// Wraps an `AsyncRead + AsyncSeek`, like a tokio `File`, and implements a stream of `Bytes`s
/// reading a portion of the file given by `range`.
///
/// The stream ends after `range.length` bytes, or earlier if the file is shorter.
pub struct FileBytesStreamRange<F = File> {
    file_stream: FileBytesStream<F>,
    seek_state: FileSeekState,
    start_offset: u64,
}

impl<F> FileBytesStreamRange<F> {
    /// Create a new stream from the given file and range.
    pub fn new(file: F, range: HttpRange, chunk_size: usize) -> Self {
        Self {
            file_stream: FileBytesStream::with_limit(file, chunk_size, range.length),
            seek_state: FileSeekState::NeedSeek,
            start_offset: range.start,
        }
    }
}

impl<F> Stream for FileBytesStreamRange<F>
where
    F: AsyncRead + AsyncSeek + Unpin,
{
    type Item = Result<Bytes, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Option<Self::Item>> {
        let Self {
            ref mut file_stream,
            ref mut seek_state,
            start_offset,
        } = *self;
        if *seek_state == FileSeekState::NeedSeek {
            *seek_state = FileSeekState::Seeking;
            if let Err(e) =
                Pin::new(&mut file_stream.file).start_seek(SeekFrom::Start(start_offset))
            {
                return Poll::Ready(Some(Err(e)));
            }
        }
        if *seek_state == FileSeekState::Seeking {
            match Pin::new(&mut file_stream.file).poll_complete(cx) {
                Poll::Ready(Ok(..)) => *seek_state = FileSeekState::Reading,
                Poll::Ready(Err(e)) => return Poll::Ready(Some(Err(e))),
                Poll::Pending => return Poll::Pending,
            }
        }
        Pin::new(file_stream).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream::StreamExt;
    use std::io::Cursor;

    async fn collect_chunks<S>(mut stream: S) -> Vec<Bytes>
    where
        S: Stream<Item = Result<Bytes, IoError>> + Unpin,
    {
        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.unwrap());
        }
        chunks
    }

    #[tokio::test]
    async fn streams_in_chunks() {
        let stream = FileBytesStream::with_chunk_size(Cursor::new(b"abcdefghij".to_vec()), 4);
        let chunks = collect_chunks(stream).await;
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[tokio::test]
    async fn streams_a_range() {
        let range = HttpRange {
            start: 2,
            length: 5,
        };
        let stream = FileBytesStreamRange::new(Cursor::new(b"abcdefghij".to_vec()), range, 3);
        let chunks = collect_chunks(stream).await;
        assert_eq!(chunks, vec!["cde", "fg"]);
    }

    #[tokio::test]
    async fn range_stops_at_end_of_file() {
        let range = HttpRange {
            start: 8,
            length: 10,
        };
        let stream = FileBytesStreamRange::new(Cursor::new(b"abcdefghij".to_vec()), range, 16);
        let chunks = collect_chunks(stream).await;
        assert_eq!(chunks, vec!["ij"]);
    }
}
