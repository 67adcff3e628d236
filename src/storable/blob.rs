use crate::storable::Storable;

/// Number of leading bytes inspected when guessing whether a blob is binary.
const BINARY_SNIFF_LEN: usize = 8000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    data: Vec<u8>,
}

impl Storable for Blob {
    const KIND: &'static str = "blob";

    fn payload(&self) -> Vec<u8> {
        self.data.clone()
    }
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Whether the content looks binary: a NUL byte somewhere in the first 8000 bytes.
    pub fn is_binary(&self) -> bool {
        let head = &self.data[..self.data.len().min(BINARY_SNIFF_LEN)];
        memchr::memchr(b'\0', head).is_some()
    }
}
