//! Image payload loading and output files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ProtocolError, ProtocolResult};

/// Where the exchange writes its results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    /// `<stem>.enc` next to the input.
    pub ciphertext: PathBuf,
    /// `<stem>_decrypted.<ext>` next to the input.
    pub decrypted: PathBuf,
}

impl OutputPaths {
    /// Output paths derived from the input path.
    pub fn for_input(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map_or_else(|| "image".into(), |s| s.to_string_lossy().into_owned());
        let decrypted_name = match path.extension() {
            Some(ext) => format!("{stem}_decrypted.{}", ext.to_string_lossy()),
            None => format!("{stem}_decrypted"),
        };
        Self {
            ciphertext: path.with_file_name(format!("{stem}.enc")),
            decrypted: path.with_file_name(decrypted_name),
        }
    }
}

/// Image bytes loaded once at the start of a run.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl ImagePayload {
    /// Read the whole file.
    ///
    /// A missing file is reported as [`ProtocolError::ImageNotFound`], an
    /// empty one as [`ProtocolError::EmptyImage`].
    pub fn load(path: impl AsRef<Path>) -> ProtocolResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ProtocolError::ImageNotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = fs::read(path).map_err(|e| ProtocolError::io(path, e))?;
        if bytes.is_empty() {
            return Err(ProtocolError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        let payload = Self {
            path: path.to_path_buf(),
            bytes,
        };
        info!(
            path = %payload.path.display(),
            bytes = payload.bytes.len(),
            bits = payload.bit_len(),
            "image loaded"
        );
        Ok(payload)
    }

    /// Wrap bytes already in memory.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }

    /// Source path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Payload length in bits; the required key length.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8
    }

    /// Output paths for this payload.
    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::for_input(&self.path)
    }

    /// Write ciphertext and decrypted copy next to the input.
    pub fn write_outputs(&self, ciphertext: &[u8], decrypted: &[u8]) -> ProtocolResult<OutputPaths> {
        let paths = self.output_paths();
        fs::write(&paths.ciphertext, ciphertext)
            .map_err(|e| ProtocolError::io(&paths.ciphertext, e))?;
        debug!(path = %paths.ciphertext.display(), "ciphertext written");
        fs::write(&paths.decrypted, decrypted)
            .map_err(|e| ProtocolError::io(&paths.decrypted, e))?;
        debug!(path = %paths.decrypted.display(), "decrypted copy written");
        Ok(paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_paths() {
        let paths = OutputPaths::for_input(Path::new("/tmp/pics/download.png"));
        assert_eq!(paths.ciphertext, PathBuf::from("/tmp/pics/download.enc"));
        assert_eq!(
            paths.decrypted,
            PathBuf::from("/tmp/pics/download_decrypted.png")
        );

        let paths = OutputPaths::for_input(Path::new("blob"));
        assert_eq!(paths.ciphertext, PathBuf::from("blob.enc"));
        assert_eq!(paths.decrypted, PathBuf::from("blob_decrypted"));
    }

    #[test]
    fn test_load_missing_image() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("download.png");
        let err = ImagePayload::load(&missing).unwrap_err();
        assert!(matches!(err, ProtocolError::ImageNotFound { .. }));
        assert!(err.to_string().contains("--image"));
    }

    #[test]
    fn test_load_empty_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        fs::write(&path, b"").unwrap();
        assert!(matches!(
            ImagePayload::load(&path),
            Err(ProtocolError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_load_and_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.bmp");
        fs::write(&path, [1u8, 2, 3]).unwrap();

        let payload = ImagePayload::load(&path).unwrap();
        assert_eq!(payload.bytes(), &[1, 2, 3]);
        assert_eq!(payload.bit_len(), 24);

        let paths = payload.write_outputs(&[9, 9, 9], &[1, 2, 3]).unwrap();
        assert_eq!(fs::read(&paths.ciphertext).unwrap(), vec![9, 9, 9]);
        assert_eq!(fs::read(&paths.decrypted).unwrap(), vec![1, 2, 3]);
        assert!(paths.decrypted.ends_with("tiny_decrypted.bmp"));
    }
}
