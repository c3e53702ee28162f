use std::string::FromUtf8Error;

/// Splits a byte stream into text lines. Bytes are buffered until a `\n` arrives,
/// so multi-byte UTF-8 sequences split across chunks decode correctly. A complete
/// line that is not valid UTF-8 is an error.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    /// Feeds one chunk and returns every complete, non-blank line it finished.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, FromUtf8Error> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(text) = decode_line(line)? {
                lines.push(text);
            }
        }
        Ok(lines)
    }

    /// Returns whatever is left once the stream has ended.
    pub fn finish(&mut self) -> Result<Option<String>, FromUtf8Error> {
        decode_line(std::mem::take(&mut self.buffer))
    }
}

fn decode_line(bytes: Vec<u8>) -> Result<Option<String>, FromUtf8Error> {
    let text = String::from_utf8(bytes)?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}
