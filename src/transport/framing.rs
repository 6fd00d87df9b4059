//! MCode frame construction and response delimiting.
//!
//! Pure functions over bytes; the connection layer feeds them socket reads.

use crate::error::ProtocolError;

/// Terminator appended to every outbound command.
pub const COMMAND_TERMINATOR: u8 = b'\r';

/// Character that ends a response frame.
///
/// Both sentinels complete a frame identically. Which one was seen is reported
/// so callers can apply stricter handling once device semantics are confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentinel {
    /// `'>'`
    Prompt,
    /// `'?'`
    Question,
}

impl Sentinel {
    /// Map a byte to a sentinel, if it is one.
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'>' => Some(Sentinel::Prompt),
            b'?' => Some(Sentinel::Question),
            _ => None,
        }
    }

    /// The sentinel character.
    #[inline]
    pub const fn as_char(self) -> char {
        match self {
            Sentinel::Prompt => '>',
            Sentinel::Question => '?',
        }
    }
}

/// One parsed reply: the non-empty lines and the sentinel that ended it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Non-empty lines in arrival order. Line 0 is the command echo.
    pub lines: Vec<String>,
    /// First sentinel character found in the reply.
    pub sentinel: Sentinel,
}

impl Response {
    /// The echo line, if any.
    pub fn echo(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    /// The line after the echo, if any.
    pub fn value(&self) -> Option<&str> {
        self.lines.get(1).map(String::as_str)
    }
}

/// Check that a command can be framed.
///
/// Rejects embedded CR/LF (they would split the command on the wire) and
/// non-ASCII text.
pub fn validate_command(command: &str) -> Result<(), ProtocolError> {
    let reason = if command.contains(['\r', '\n']) {
        "contains a line break"
    } else if !command.is_ascii() {
        "contains non-ASCII characters"
    } else {
        return Ok(());
    };

    Err(ProtocolError::InvalidCommand {
        command: command.to_owned(),
        reason,
    })
}

/// Build the outbound frame: command bytes followed by a single CR.
pub fn encode_command(command: &str) -> Result<Vec<u8>, ProtocolError> {
    validate_command(command)?;
    let mut frame = Vec::with_capacity(command.len() + 1);
    frame.extend_from_slice(command.as_bytes());
    frame.push(COMMAND_TERMINATOR);
    Ok(frame)
}

/// Accumulates response bytes until a sentinel appears.
///
/// A fresh accumulator is used for every command; nothing carries over.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    bytes: Vec<u8>,
    sentinel: Option<Sentinel>,
}

impl ResponseBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk. Returns `true` once the buffer holds a sentinel.
    pub fn push(&mut self, chunk: &[u8]) -> bool {
        if self.sentinel.is_none() {
            self.sentinel = chunk.iter().copied().find_map(Sentinel::from_byte);
        }
        self.bytes.extend_from_slice(chunk);
        self.is_complete()
    }

    /// True once a sentinel has been seen.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.sentinel.is_some()
    }

    /// Lossy text view of the bytes received so far, for diagnostics.
    pub fn lossy_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Parse a completed buffer into a [`Response`].
    ///
    /// Returns `None` if no sentinel has been seen yet.
    pub fn parse(&self) -> Option<Result<Response, ProtocolError>> {
        let sentinel = self.sentinel?;
        Some(parse_lines(&self.bytes).map(|lines| Response { lines, sentinel }))
    }
}

/// Strip the trailing sentinel run and split into non-empty lines.
///
/// Lines break on CR, LF or CRLF.
pub fn parse_lines(bytes: &[u8]) -> Result<Vec<String>, ProtocolError> {
    if !bytes.is_ascii() {
        return Err(ProtocolError::NonAscii {
            bytes: bytes.to_vec(),
        });
    }
    // ASCII is valid UTF-8.
    let text = String::from_utf8_lossy(bytes);
    let body = text.trim_end_matches(['>', '?']);

    Ok(body
        .split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_appends_single_cr() {
        assert_eq!(encode_command("PR VM").unwrap(), b"PR VM\r");
        assert_eq!(encode_command("TP=500,0").unwrap(), b"TP=500,0\r");
    }

    #[test]
    fn test_encode_rejects_line_breaks() {
        assert!(matches!(
            encode_command("PR VM\r"),
            Err(ProtocolError::InvalidCommand { .. })
        ));
        assert!(encode_command("HM 1\nPS").is_err());
        assert!(encode_command("MA=5µ").is_err());
    }

    #[test]
    fn test_parse_value_reply() {
        let mut buf = ResponseBuffer::new();
        assert!(buf.push(b"PR VM\r\n100\r\n>"));
        let response = buf.parse().unwrap().unwrap();
        assert_eq!(response.lines, vec!["PR VM", "100"]);
        assert_eq!(response.sentinel, Sentinel::Prompt);
        assert_eq!(response.echo(), Some("PR VM"));
        assert_eq!(response.value(), Some("100"));
    }

    #[test]
    fn test_chunked_reply_is_identical() {
        let mut buf = ResponseBuffer::new();
        assert!(!buf.push(b"PR VM\r\n"));
        assert!(buf.push(b"100\r\n>"));
        let response = buf.parse().unwrap().unwrap();
        assert_eq!(response.lines, vec!["PR VM", "100"]);
    }

    #[test]
    fn test_incomplete_buffer_does_not_finish() {
        let mut buf = ResponseBuffer::new();
        buf.push(b"PR VM\r\n10");
        assert!(buf.parse().is_none());
    }

    #[test]
    fn test_question_sentinel_is_reported() {
        let mut buf = ResponseBuffer::new();
        buf.push(b"XX=1\r\n?");
        let response = buf.parse().unwrap().unwrap();
        assert_eq!(response.lines, vec!["XX=1"]);
        assert_eq!(response.sentinel, Sentinel::Question);
        assert_eq!(response.sentinel.as_char(), '?');
    }

    #[test]
    fn test_all_trailing_sentinels_stripped() {
        let lines = parse_lines(b"PS\r\n>?>??").unwrap();
        assert_eq!(lines, vec!["PS"]);
    }

    #[test]
    fn test_empty_lines_dropped_and_bare_cr_splits() {
        let lines = parse_lines(b"\r\nPR MS\r\r\n256\r\n\r\n>").unwrap();
        assert_eq!(lines, vec!["PR MS", "256"]);
    }

    #[test]
    fn test_non_ascii_reply_rejected() {
        assert!(matches!(
            parse_lines(b"PR VM\r\n\xff\r\n>"),
            Err(ProtocolError::NonAscii { .. })
        ));
    }
}
