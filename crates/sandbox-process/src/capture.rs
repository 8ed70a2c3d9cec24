use std::io;

use tokio::io::{AsyncRead, AsyncReadExt};

/// Appended to a stream that hit the capture limit.
pub const TRUNCATED_MARKER: &str = "\n[output truncated]";

const READ_CHUNK_SIZE: usize = 8 * 1024;

pub(crate) struct Captured {
    bytes: Vec<u8>,
    truncated: bool,
}

impl Captured {
    pub(crate) fn into_string(self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.truncated {
            text.push_str(TRUNCATED_MARKER);
        }
        text
    }
}

/// Read `reader` to EOF, keeping at most `limit` bytes.
///
/// The reader is drained past the limit so the writer never blocks on a
/// full pipe.
pub(crate) async fn read_capped<R>(mut reader: R, limit: usize) -> io::Result<Captured>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    let mut truncated = false;
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let keep = n.min(limit.saturating_sub(bytes.len()));
        bytes.extend_from_slice(chunk.get(..keep).unwrap_or_default());
        if keep < n {
            truncated = true;
        }
    }

    Ok(Captured { bytes, truncated })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn under_limit_is_verbatim() {
        let captured = read_capped(&b"hello\n"[..], 64).await.unwrap();
        assert_eq!(captured.into_string(), "hello\n");
    }

    #[tokio::test]
    async fn over_limit_truncates_and_marks() {
        let data = vec![b'x'; 100];
        let captured = read_capped(&data[..], 10).await.unwrap();
        assert_eq!(captured.into_string(), format!("xxxxxxxxxx{TRUNCATED_MARKER}"));
    }

    #[tokio::test]
    async fn exact_limit_is_not_truncated() {
        let captured = read_capped(&b"abcd"[..], 4).await.unwrap();
        assert_eq!(captured.into_string(), "abcd");
    }

    #[tokio::test]
    async fn drains_writer_past_the_limit() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let write = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            // Far more than the duplex buffer: only completes if the reader keeps draining.
            writer.write_all(&vec![b'y'; 64 * 1024]).await.unwrap();
        });
        let captured = read_capped(reader, 16).await.unwrap();
        write.await.unwrap();
        assert!(captured.truncated);
        assert_eq!(captured.bytes.len(), 16);
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let captured = read_capped(&[0x66, 0xff, 0x6f][..], 64).await.unwrap();
        assert_eq!(captured.into_string(), "f\u{fffd}o");
    }
}
