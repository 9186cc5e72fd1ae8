//! Streaming MD5 content hashing.

use md5::{Digest, Md5};
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Fixed buffer size for streaming object bytes through the digest.
pub const READ_CHUNK_SIZE_BYTES: usize = 8 * 1024 * 1024;

/// Drain a reader through an incremental MD5 digest and return the result
/// as lowercase hexadecimal.
///
/// The object is never materialized: at most one
/// [`READ_CHUNK_SIZE_BYTES`] buffer is held regardless of object size.
/// Stream errors propagate unchanged.
pub async fn md5_hex<R: AsyncRead + Unpin>(mut reader: R) -> io::Result<String> {
    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; READ_CHUNK_SIZE_BYTES];
    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}
