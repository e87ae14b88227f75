//! Bounded-memory tail: read the last N lines by walking a file backwards.

use std::collections::VecDeque;
use std::io::{self, SeekFrom};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};

/// Read the last `count` non-empty lines of `reader`, newest first.
///
/// The reader is consumed backwards in `chunk_size` steps. Only the lines
/// collected so far and one partial line are held in memory, so the cost
/// does not depend on the file size.
///
/// Lines are split on `\n`; a trailing `\r` is dropped and lines that end
/// up empty are skipped. Invalid UTF-8 is replaced per line.
pub async fn tail_lines<R>(reader: &mut R, count: usize, chunk_size: usize) -> io::Result<Vec<String>>
where
    R: AsyncRead + AsyncSeek + Unpin + ?Sized,
{
    if count == 0 {
        return Ok(Vec::new());
    }
    let chunk_size = chunk_size.max(1) as u64;

    let mut cursor = reader.seek(SeekFrom::End(0)).await?;
    // Bytes before the first line break seen so far: possibly a partial line.
    let mut carry: Vec<u8> = Vec::new();
    // File order, oldest at the front.
    let mut lines: VecDeque<String> = VecDeque::new();

    while cursor > 0 && lines.len() < count {
        let step = chunk_size.min(cursor);
        cursor -= step;
        reader.seek(SeekFrom::Start(cursor)).await?;

        let mut chunk = vec![0u8; step as usize];
        reader.read_exact(&mut chunk).await?;
        chunk.extend_from_slice(&carry);
        carry = chunk;

        let Some(first_break) = carry.iter().position(|&b| b == b'\n') else {
            continue;
        };
        let complete = carry.split_off(first_break + 1);
        carry.truncate(first_break);

        for raw in complete.split(|&b| b == b'\n').rev() {
            if let Some(line) = decode_line(raw) {
                lines.push_front(line);
            }
        }
    }

    // At the start of the file the carry is the first line, not a fragment.
    if cursor == 0 {
        if let Some(line) = decode_line(&carry) {
            lines.push_front(line);
        }
    }

    Ok(lines.into_iter().rev().take(count).collect())
}

fn decode_line(raw: &[u8]) -> Option<String> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    if raw.is_empty() {
        return None;
    }
    Some(String::from_utf8_lossy(raw).into_owned())
}
