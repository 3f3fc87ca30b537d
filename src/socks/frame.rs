//! Incremental reader for handshake messages
//!
//! TCP gives no guarantee that one read returns one message, so greeting and
//! request frames are accumulated until the length announced by their header
//! is reached. Bytes beyond that length in the same burst are a protocol
//! fault: the client must wait for our reply before sending anything else.

use crate::error::{ProxyError, Socks5Error};
use crate::socks::consts::MAX_FRAME_LEN;
use bytes::{BufMut, BytesMut};
use std::cmp::Ordering;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Read one complete frame from `stream`
///
/// `frame_len` inspects the bytes received so far and returns the total
/// frame length once the header makes it known, `None` while more header
/// bytes are needed, or an error as soon as the header is invalid.
pub async fn read_frame<S, F>(stream: &mut S, frame_len: F) -> Result<BytesMut, ProxyError>
where
    S: AsyncRead + Unpin,
    F: Fn(&[u8]) -> Result<Option<usize>, Socks5Error>,
{
    let mut buf = BytesMut::with_capacity(MAX_FRAME_LEN + 1);

    loop {
        if let Some(expected) = frame_len(&buf)? {
            match buf.len().cmp(&expected) {
                Ordering::Equal => return Ok(buf),
                Ordering::Greater => {
                    return Err(Socks5Error::LengthMismatch {
                        expected,
                        actual: buf.len(),
                    }
                    .into())
                }
                Ordering::Less => {}
            }
        }

        if buf.len() > MAX_FRAME_LEN {
            return Err(Socks5Error::MessageTooLarge(buf.len()).into());
        }

        // One byte of headroom past the largest frame so oversize input is seen
        let room = MAX_FRAME_LEN + 1 - buf.len();
        let n = stream.read_buf(&mut (&mut buf).limit(room)).await?;
        if n == 0 {
            return Err(Socks5Error::Truncated(buf.len()).into());
        }
    }
}
