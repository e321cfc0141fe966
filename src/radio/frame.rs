/// Bytes collected from the modem during one receive cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioFrame {
    bytes: Vec<u8>,
}

impl RadioFrame {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lossy UTF-8 view with the line terminator stripped.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes)
            .trim_end_matches(['\r', '\n', '\0'])
            .to_string()
    }
}
