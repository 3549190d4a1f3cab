//! Streaming SHA-256 verification of a bundle against its digest file.
//!
//! The digest file is plain text in `sha256sum` convention: the first
//! whitespace-separated token is the lowercase hex digest of the full
//! bundle contents; anything after it (typically the echoed filename) is
//! ignored.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::BundleError;

/// Parse the expected digest out of a `.sha256` companion file.
pub fn read_expected_digest(digest_path: &Path) -> Result<Vec<u8>, BundleError> {
    let text = fs::read_to_string(digest_path).map_err(|e| {
        BundleError::integrity(digest_path, format!("error reading digest file: {}", e))
    })?;
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| BundleError::integrity(digest_path, "empty digest file"))?;
    hex::decode(token)
        .map_err(|e| BundleError::integrity(digest_path, format!("error decoding digest: {}", e)))
}

/// Compute the SHA-256 of the file at `path`, streaming it through the
/// hash accumulator rather than reading it into memory.
pub fn file_digest(path: &Path) -> Result<[u8; 32], BundleError> {
    let mut file = File::open(path).map_err(|e| BundleError::filesystem(path, e))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(|e| BundleError::filesystem(path, e))?;
    Ok(hasher.finalize().into())
}

/// Verify the bundle at `bundle_path` against the expected digest in
/// `digest_path`. Exact byte-for-byte equality over the full digest
/// length; any inequality (including a truncated expected digest) is a
/// hash mismatch.
pub fn verify_bundle(digest_path: &Path, bundle_path: &Path) -> Result<(), BundleError> {
    let expected = read_expected_digest(digest_path)?;
    let computed = file_digest(bundle_path)?;
    if computed.as_slice() != expected.as_slice() {
        return Err(BundleError::integrity(bundle_path, "hash mismatch"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_pair(dir: &Path, content: &[u8], digest_text: &str) -> (PathBuf, PathBuf) {
        let bundle = dir.join("bundle.car");
        let digest = dir.join("bundle.sha256");
        fs::write(&bundle, content).unwrap();
        fs::write(&digest, digest_text).unwrap();
        (digest, bundle)
    }

    fn hex_digest(content: &[u8]) -> String {
        hex::encode(Sha256::digest(content))
    }

    #[test]
    fn test_matching_digest_verifies() {
        let td = tempfile::tempdir().unwrap();
        let content = b"car bundle content";
        let (digest, bundle) = write_pair(td.path(), content, &hex_digest(content));
        verify_bundle(&digest, &bundle).unwrap();
    }

    #[test]
    fn test_trailing_filename_token_is_ignored() {
        let td = tempfile::tempdir().unwrap();
        let content = b"car bundle content";
        let text = format!("{}  builtin-actors-mainnet.car\n", hex_digest(content));
        let (digest, bundle) = write_pair(td.path(), content, &text);
        verify_bundle(&digest, &bundle).unwrap();
    }

    #[test]
    fn test_single_byte_mutation_fails() {
        let td = tempfile::tempdir().unwrap();
        let content = b"car bundle content".to_vec();
        let mut mutated = content.clone();
        mutated[5] ^= 0x01;
        let (digest, bundle) = write_pair(td.path(), &mutated, &hex_digest(&content));

        let err = verify_bundle(&digest, &bundle).unwrap_err();
        match err {
            BundleError::Integrity { detail, .. } => assert_eq!(detail, "hash mismatch"),
            other => panic!("expected Integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_truncated_expected_digest_fails() {
        let td = tempfile::tempdir().unwrap();
        let content = b"car bundle content";
        let full = hex_digest(content);
        // Valid hex but only half the digest: prefix match must not pass.
        let (digest, bundle) = write_pair(td.path(), content, &full[..32]);

        let err = verify_bundle(&digest, &bundle).unwrap_err();
        assert!(matches!(err, BundleError::Integrity { .. }));
    }

    #[test]
    fn test_malformed_hex_fails() {
        let td = tempfile::tempdir().unwrap();
        let (digest, bundle) = write_pair(td.path(), b"content", "not-hex-at-all");
        let err = verify_bundle(&digest, &bundle).unwrap_err();
        match err {
            BundleError::Integrity { detail, .. } => {
                assert!(detail.contains("error decoding digest"))
            }
            other => panic!("expected Integrity error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_digest_file_fails() {
        let td = tempfile::tempdir().unwrap();
        let (digest, bundle) = write_pair(td.path(), b"content", "  \n");
        let err = verify_bundle(&digest, &bundle).unwrap_err();
        assert!(matches!(err, BundleError::Integrity { .. }));
    }

    #[test]
    fn test_missing_digest_file_is_integrity_error() {
        let td = tempfile::tempdir().unwrap();
        let bundle = td.path().join("bundle.car");
        fs::write(&bundle, b"content").unwrap();
        let digest = td.path().join("bundle.sha256");

        let err = verify_bundle(&digest, &bundle).unwrap_err();
        assert!(matches!(err, BundleError::Integrity { .. }));
    }

    #[test]
    fn test_missing_bundle_is_filesystem_error() {
        let td = tempfile::tempdir().unwrap();
        let digest = td.path().join("bundle.sha256");
        fs::write(&digest, hex_digest(b"content")).unwrap();
        let bundle = td.path().join("bundle.car");

        let err = verify_bundle(&digest, &bundle).unwrap_err();
        assert!(matches!(err, BundleError::Filesystem { .. }));
    }
}
