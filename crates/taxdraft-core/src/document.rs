use std::fmt;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// An uploaded PDF held fully in memory.
///
/// The bytes are read once up front and shared immutably, so every
/// extraction strategy sees the document from its first byte.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    bytes: Arc<[u8]>,
}

impl Document {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
        }
    }

    /// Read a whole document from a seekable source.
    ///
    /// The source is rewound first, so a reader that was already consumed
    /// (for instance by an earlier extraction attempt) is read from the start.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> std::io::Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(Self::from_bytes(buf))
    }

    pub fn open(path: &Path) -> std::io::Result<Self> {
        Ok(Self::from_bytes(std::fs::read(path)?))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether a `%PDF-` header appears within the first 1024 bytes, which
    /// is where PDF readers look for it.
    pub fn has_pdf_header(&self) -> bool {
        let head = &self.bytes[..self.bytes.len().min(1024)];
        head.windows(5).any(|w| w == b"%PDF-")
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("len", &self.bytes.len())
            .finish()
    }
}
