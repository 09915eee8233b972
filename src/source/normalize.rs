//! Text normalization ahead of CSV parsing.
//!
//! Raw bytes go through two adapters, both plain [`std::io::Read`]
//! implementations so the pipeline stays lazy and single-pass:
//!
//! ```text
//! raw bytes
//!     → DecodeReaderBytes (UTF-8 BOM stripped, UTF-16 LE/BE transcoded,
//!       BOM-less input passed through)
//!     → CommentFilter (drop lines starting with the comment prefix)
//!     → csv::Reader
//! ```

use std::io::{self, BufRead, BufReader, Cursor, Read};

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use encoding_rs_io::DecodeReaderBytesBuilder;

/// Encoding detected from the leading byte-order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// No BOM; bytes are passed through untouched.
    Unknown,
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    fn sniff(head: &[u8]) -> Self {
        match Encoding::for_bom(head) {
            Some((encoding, _)) if encoding == UTF_16LE => TextEncoding::Utf16Le,
            Some((encoding, _)) if encoding == UTF_16BE => TextEncoding::Utf16Be,
            Some((encoding, _)) if encoding == UTF_8 => TextEncoding::Utf8,
            _ => TextEncoding::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Unknown => "unknown",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
        }
    }
}

/// Strip any byte-order mark from `reader` and return a stream of UTF-8
/// (or untouched, if no BOM was present) bytes.
pub fn decode_bom<R>(mut reader: R) -> io::Result<(TextEncoding, Box<dyn Read + Send>)>
where
    R: Read + Send + 'static,
{
    // Peek the BOM for reporting, then hand the bytes back to the decoder.
    let mut head = Vec::with_capacity(3);
    reader.by_ref().take(3).read_to_end(&mut head)?;
    let encoding = TextEncoding::sniff(&head);

    let decoded = DecodeReaderBytesBuilder::new()
        .bom_sniffing(true)
        .strip_bom(true)
        .utf8_passthru(true)
        .build(Cursor::new(head).chain(reader));
    Ok((encoding, Box::new(decoded)))
}

/// Full normalization: BOM handling followed by comment filtering.
pub fn normalize<R>(reader: R, comment_prefix: &str) -> io::Result<(TextEncoding, CommentFilter<BufReader<Box<dyn Read + Send>>>)>
where
    R: Read + Send + 'static,
{
    let (encoding, decoded) = decode_bom(reader)?;
    Ok((encoding, CommentFilter::new(BufReader::new(decoded), comment_prefix)))
}

/// Drops every line that starts with the comment prefix.
///
/// The test is a literal prefix match on the untrimmed line: `"  # x"` is not
/// a comment for prefix `"#"`. An empty prefix disables filtering. Lines are
/// re-emitted with a bare `\n` terminator.
pub struct CommentFilter<R> {
    inner: R,
    prefix: Vec<u8>,
    line: Vec<u8>,
    pos: usize,
}

impl<R: BufRead> CommentFilter<R> {
    pub fn new(inner: R, prefix: &str) -> Self {
        Self {
            inner,
            prefix: prefix.as_bytes().to_vec(),
            line: Vec::new(),
            pos: 0,
        }
    }

    fn is_comment(&self, line: &[u8]) -> bool {
        !self.prefix.is_empty() && line.starts_with(&self.prefix)
    }

    /// Load the next kept line into `self.line`. Returns false at EOF.
    fn next_line(&mut self) -> io::Result<bool> {
        loop {
            self.line.clear();
            self.pos = 0;
            if self.inner.read_until(b'\n', &mut self.line)? == 0 {
                return Ok(false);
            }
            if self.line.last() == Some(&b'\n') {
                self.line.pop();
            }
            if self.line.last() == Some(&b'\r') {
                self.line.pop();
            }
            if self.is_comment(&self.line) {
                continue;
            }
            self.line.push(b'\n');
            return Ok(true);
        }
    }
}

impl<R: BufRead> Read for CommentFilter<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.pos >= self.line.len() && !self.next_line()? {
            return Ok(0);
        }
        let n = buf.len().min(self.line.len() - self.pos);
        buf[..n].copy_from_slice(&self.line[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
