//! Length-prefixed envelope delimiting over a byte stream.
//!
//! [`framecore_proto::Envelope::marshal`] produces a self-describing CBOR
//! value but a byte stream has no natural message boundary, so each marshalled
//! envelope is sent as a 4-byte big-endian length prefix followed by that many
//! bytes. This framing is a stream-transport concern; it is not part of the
//! signed or wire-format envelope itself.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{Result, TransportError};

/// Writes one length-prefixed message to `stream`.
pub async fn write_framed<W: AsyncWrite + Unpin>(stream: &mut W, bytes: &[u8]) -> Result<()> {
    #[allow(clippy::cast_possible_truncation)]
    let len = bytes.len() as u32;
    stream.write_all(&len.to_be_bytes()).await.map_err(|e| TransportError::Io(e.to_string()))?;
    stream.write_all(bytes).await.map_err(|e| TransportError::Io(e.to_string()))?;
    Ok(())
}

/// Reads one length-prefixed message from `stream`. Returns `Ok(None)` on a
/// clean EOF between messages (the peer closed the stream); any other I/O
/// failure, including a partial read mid-message, is an error.
pub async fn read_framed<R: AsyncRead + Unpin>(
    stream: &mut R,
    max_len: u32,
) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];
    match stream.read_exact(&mut len_buf).await {
        Ok(()) => {},
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(TransportError::Io(e.to_string())),
    }

    let len = u32::from_be_bytes(len_buf);
    if len > max_len {
        return Err(TransportError::FrameTooLarge { len, max: max_len });
    }

    let mut buf = vec![0u8; len as usize];
    stream.read_exact(&mut buf).await.map_err(|e| TransportError::Io(e.to_string()))?;
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[tokio::test]
    async fn round_trips_a_single_message() {
        let mut buf = Vec::new();
        write_framed(&mut buf, b"hello").await.unwrap();

        let mut cursor = Cursor::new(buf);
        let read = read_framed(&mut cursor, 1024).await.unwrap();
        assert_eq!(read, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn clean_eof_between_messages_yields_none() {
        let mut cursor = Cursor::new(Vec::<u8>::new());
        let read = read_framed(&mut cursor, 1024).await.unwrap();
        assert_eq!(read, None);
    }

    #[tokio::test]
    async fn oversized_frame_is_rejected() {
        let mut buf = Vec::new();
        write_framed(&mut buf, &vec![0u8; 100]).await.unwrap();

        let mut cursor = Cursor::new(buf);
        let err = read_framed(&mut cursor, 10).await.unwrap_err();
        assert!(matches!(err, TransportError::FrameTooLarge { len: 100, max: 10 }));
    }
}
