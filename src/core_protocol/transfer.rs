/// Book-keeping for one DOWNLOAD or UPLOAD payload.
///
/// Lives only as long as the transfer loop that owns it. `transferred`
/// never exceeds `declared`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    filename: String,
    declared: u64,
    transferred: u64,
}

impl Transfer {
    pub fn new(filename: impl Into<String>, declared: u64) -> Self {
        Self {
            filename: filename.into(),
            declared,
            transferred: 0,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn declared(&self) -> u64 {
        self.declared
    }

    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    pub fn remaining(&self) -> u64 {
        self.declared - self.transferred
    }

    pub fn is_complete(&self) -> bool {
        self.transferred == self.declared
    }

    /// Size of the next chunk given a buffer of `buffer_len` bytes.
    pub fn chunk_len(&self, buffer_len: usize) -> usize {
        // Bounded by buffer_len, so the cast back cannot truncate
        self.remaining().min(buffer_len as u64) as usize
    }

    pub fn advance(&mut self, n: usize) {
        let n = n as u64;
        debug_assert!(n <= self.remaining(), "transfer overran its declared length");
        self.transferred = (self.transferred + n).min(self.declared);
    }
}
