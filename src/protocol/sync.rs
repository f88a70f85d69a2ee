//! # Frame Synchronizer
//!
//! Locates frame boundaries in an untrusted byte stream.
//!
//! ```text
//! +-----------+   +-------------+   +--------------+   +--------------+
//! | SEEK_SYNC |-->| READ_LENGTH |-->| READ_ADDRESS |-->| READ_PAYLOAD |
//! +-----------+   +-------------+   +--------------+   +--------------+
//!    ^    |              |                                     |
//!    +----+ Desync       | ShortFrame                          v
//!    ^                   |          +------------------+   +---------------+
//!    +-------------------+          | READ_TERMINATOR  |<--| READ_CHECKSUM |
//!    ^                              +------------------+   +---------------+
//!    |                                       |
//!    +---------------------------------------+ Frame
//! ```
//!
//! Each state consumes a fixed number of bytes, so every call to
//! [`FrameSynchronizer::next_event`] reads one complete frame attempt.

use std::io;

use tracing::trace;

use super::frame::{RawFrame, LENGTH_OVERHEAD, MIN_LENGTH_BYTE, SYNC_BYTE};
use crate::serial::ByteSource;

/// Result of one frame attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// A byte other than the sync byte was read while seeking a frame
    Desync(u8),

    /// The length byte after a sync byte was below the minimum
    ///
    /// Only the sync and length bytes are consumed. The bytes that would have
    /// formed the frame body are read again as candidate sync bytes.
    ShortFrame(u8),

    /// A structurally complete frame; the terminator is not validated here
    Frame(RawFrame),
}

/// Frame synchronizer owning the stream position of a [`ByteSource`]
#[derive(Debug)]
pub struct FrameSynchronizer<S> {
    source: S,
}

impl<S: ByteSource> FrameSynchronizer<S> {
    /// Creates a synchronizer positioned at the start of `source`
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Read the next frame attempt
    ///
    /// # Returns
    ///
    /// * `Ok(Some(event))` - One sync attempt or frame
    /// * `Ok(None)` - End of stream; a partially read frame is dropped
    ///
    /// # Errors
    ///
    /// Returns the byte source's I/O error, if any
    pub fn next_event(&mut self) -> io::Result<Option<SyncEvent>> {
        // SEEK_SYNC
        let Some(sync) = self.read_u8()? else {
            return Ok(None);
        };
        if sync != SYNC_BYTE {
            trace!("Desync on 0x{:02X}", sync);
            return Ok(Some(SyncEvent::Desync(sync)));
        }

        // READ_LENGTH
        let Some(length) = self.read_u8()? else {
            return Ok(None);
        };
        if length < MIN_LENGTH_BYTE {
            trace!("Short frame length 0x{:02X}", length);
            return Ok(Some(SyncEvent::ShortFrame(length)));
        }

        // READ_ADDRESS
        let Some(address) = self.read_u8()? else {
            return Ok(None);
        };

        // READ_PAYLOAD
        let Some(payload) = self.source.read_exact(length as usize - LENGTH_OVERHEAD)? else {
            return Ok(None);
        };

        // READ_CHECKSUM
        let Some(checksum) = self.read_u8()? else {
            return Ok(None);
        };

        // READ_TERMINATOR
        let Some(terminator) = self.read_u8()? else {
            return Ok(None);
        };

        trace!("Frame from address {} ({} payload bytes)", address, payload.len());
        Ok(Some(SyncEvent::Frame(RawFrame {
            address,
            payload,
            checksum,
            terminator,
        })))
    }

    fn read_u8(&mut self) -> io::Result<Option<u8>> {
        Ok(self
            .source
            .read_exact(1)?
            .and_then(|bytes| bytes.first().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::source::MockByteSource;
    use crate::serial::ReaderSource;
    use std::io::Cursor;

    const CAPTURED_FRAME: [u8; 15] = [
        0xC0, 0x0E, 0x01, 0x00, 0x08, 0x00, 0x02, 0x07, 0x8E, 0x00, 0x02, 0x00, 0x00, 0x84, 0x01,
    ];

    fn synchronizer(bytes: &[u8]) -> FrameSynchronizer<ReaderSource<Cursor<Vec<u8>>>> {
        FrameSynchronizer::new(ReaderSource::new(Cursor::new(bytes.to_vec())))
    }

    fn collect(bytes: &[u8]) -> Vec<SyncEvent> {
        let mut sync = synchronizer(bytes);
        let mut events = Vec::new();
        while let Some(event) = sync.next_event().unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_captured_frame() {
        let events = collect(&CAPTURED_FRAME);
        assert_eq!(
            events,
            vec![SyncEvent::Frame(RawFrame {
                address: 1,
                payload: vec![0x00, 0x08, 0x00, 0x02, 0x07, 0x8E, 0x00, 0x02, 0x00, 0x00],
                checksum: 0x84,
                terminator: 0x01,
            })]
        );
    }

    #[test]
    fn test_garbage_byte_then_frame() {
        let mut bytes = vec![0xFF];
        bytes.extend_from_slice(&CAPTURED_FRAME);

        let events = collect(&bytes);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], SyncEvent::Desync(0xFF));
        assert!(matches!(events[1], SyncEvent::Frame(ref f) if f.address == 1));
    }

    #[test]
    fn test_desync_consumes_one_byte_per_attempt() {
        let events = collect(&[0x00, 0x01, 0x02]);
        assert_eq!(
            events,
            vec![SyncEvent::Desync(0x00), SyncEvent::Desync(0x01), SyncEvent::Desync(0x02)]
        );
    }

    #[test]
    fn test_minimum_length_frame() {
        let events = collect(&[0xC0, 0x05, 0x03, 0xAA, 0x42, 0x01]);
        assert_eq!(
            events,
            vec![SyncEvent::Frame(RawFrame {
                address: 3,
                payload: vec![0xAA],
                checksum: 0x42,
                terminator: 0x01,
            })]
        );
    }

    #[test]
    fn test_short_frame_does_not_realign() {
        // Length 3 is rejected, and the would-be body is re-read as a new
        // frame: the 0xC0 inside it is taken as a sync byte and 0x08 as its
        // length, swallowing bytes of the real frame that follows.
        let mut bytes = vec![0xC0, 0x03, 0xC0, 0x08, 0x03];
        bytes.extend_from_slice(&CAPTURED_FRAME);

        let events = collect(&bytes);
        assert_eq!(events[0], SyncEvent::ShortFrame(0x03));
        match &events[1] {
            SyncEvent::Frame(frame) => {
                assert_eq!(frame.address, 0x03);
                assert_eq!(frame.payload, vec![0xC0, 0x0E, 0x01, 0x00]);
                assert_eq!(frame.checksum, 0x08);
                assert_eq!(frame.terminator, 0x00);
            }
            other => panic!("Expected mis-parsed frame, got: {:?}", other),
        }
        assert!(!events.iter().skip(2).any(|e| matches!(e, SyncEvent::Frame(f) if f.address == 1)));
    }

    #[test]
    fn test_bad_terminator_still_delivers_frame() {
        let mut bytes = CAPTURED_FRAME.to_vec();
        bytes[14] = 0x02;

        let events = collect(&bytes);
        match &events[..] {
            [SyncEvent::Frame(frame)] => {
                assert_eq!(frame.terminator, 0x02);
                assert!(!frame.terminator_ok());
            }
            other => panic!("Expected one frame, got: {:?}", other),
        }
    }

    #[test]
    fn test_partial_frame_at_end_of_stream() {
        let events = collect(&CAPTURED_FRAME[..9]);
        assert!(events.is_empty());
    }

    #[test]
    fn test_empty_stream() {
        let mut sync = synchronizer(&[]);
        assert_eq!(sync.next_event().unwrap(), None);
    }

    #[test]
    fn test_io_error_propagates() {
        let mut source = MockByteSource::new();
        let mut seq = mockall::Sequence::new();
        source
            .expect_read_exact()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(vec![SYNC_BYTE])));
        source
            .expect_read_exact()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")));

        let mut sync = FrameSynchronizer::new(source);
        let err = sync.next_event().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_payload_read_size() {
        let mut source = MockByteSource::new();
        let mut seq = mockall::Sequence::new();
        for byte in [SYNC_BYTE, 0x08, 0x03] {
            source
                .expect_read_exact()
                .with(mockall::predicate::eq(1))
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| Ok(Some(vec![byte])));
        }
        source
            .expect_read_exact()
            .with(mockall::predicate::eq(4))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some(vec![0x03, 0x00, 0x0A, 0x00])));
        for byte in [0x51, 0x01] {
            source
                .expect_read_exact()
                .with(mockall::predicate::eq(1))
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| Ok(Some(vec![byte])));
        }

        let mut sync = FrameSynchronizer::new(source);
        let event = sync.next_event().unwrap();
        assert!(matches!(event, Some(SyncEvent::Frame(ref f)) if f.checksum == 0x51));
    }
}
