//! Trait abstraction for the byte stream the synchronizer consumes

use std::io::{self, Read};

/// Sequential source of bus bytes
///
/// The synchronizer owns the stream position through this trait and never
/// seeks. Implementations block until `n` bytes are available.
#[cfg_attr(test, mockall::automock)]
pub trait ByteSource {
    /// Read exactly `n` bytes
    ///
    /// Returns `Ok(None)` at end-of-stream. Bytes of a short final read are
    /// discarded.
    fn read_exact(&mut self, n: usize) -> io::Result<Option<Vec<u8>>>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read_exact(&mut self, n: usize) -> io::Result<Option<Vec<u8>>> {
        (**self).read_exact(n)
    }
}

/// Adapter turning any [`Read`] into a [`ByteSource`]
///
/// Used for capture replay and tests.
#[derive(Debug)]
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn read_exact(&mut self, n: usize) -> io::Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; n];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => Ok(Some(buf)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }
}
