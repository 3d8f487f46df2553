//! Script checksums
//!
//! A regenerated script is compared against its previous content by digest,
//! in the form `sha256:<hex>`.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::{Error, Result};

/// Digest of a byte slice.
pub fn digest(bytes: &[u8]) -> String {
    format!("sha256:{:x}", Sha256::digest(bytes))
}

/// Digest of a file's bytes, BOM included.
pub fn compute_file_checksum(path: &Path) -> Result<String> {
    std::fs::read(path).map(|bytes| digest(&bytes)).map_err(|e| Error::io(path, e))
}

/// Digest of a file that may not exist yet.
pub fn existing_file_checksum(path: &Path) -> Result<Option<String>> {
    match compute_file_checksum(path) {
        Ok(checksum) => Ok(Some(checksum)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_empty_input() {
        assert_eq!(
            digest(b""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn bom_changes_the_digest() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plain.sql");
        let bom = dir.path().join("bom.sql");
        std::fs::write(&plain, "GO\n").unwrap();
        std::fs::write(&bom, b"\xEF\xBB\xBFGO\n").unwrap();

        assert_eq!(compute_file_checksum(&plain).unwrap(), digest(b"GO\n"));
        assert_ne!(compute_file_checksum(&plain).unwrap(), compute_file_checksum(&bom).unwrap());
    }

    #[test]
    fn missing_file_has_no_checksum() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(existing_file_checksum(&dir.path().join("nope.sql")).unwrap(), None);
    }
}
