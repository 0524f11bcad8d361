use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::ReleaseError;

/// Parse a SHA-256 checksum written as 64 hex characters, optionally prefixed with `sha256:`.
pub fn parse_sha256(value: &str) -> Result<[u8; 32], ReleaseError> {
    let trimmed = value.trim();
    let digest = trimmed.strip_prefix("sha256:").unwrap_or(trimmed);

    let invalid = |reason: &str| ReleaseError::InvalidChecksum {
        value: value.to_string(),
        reason: reason.to_string(),
    };

    if digest.len() != 64 {
        return Err(invalid("expected exactly 64 hex characters"));
    }

    let bytes = hex::decode(digest).map_err(|_| invalid("not a hexadecimal string"))?;
    let mut array = [0u8; 32];
    array.copy_from_slice(&bytes);
    Ok(array)
}

pub fn format_digest(bytes: &[u8; 32]) -> String {
    hex::encode(bytes)
}

pub fn compute_sha256(path: &Path) -> Result<[u8; 32]> {
    let mut file = File::open(path)
        .with_context(|| format!("Failed to open file for checksum calculation at {:?}", path))?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = file
            .read(&mut buffer)
            .with_context(|| format!("Failed to read file {:?} while hashing", path))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hasher.finalize().into())
}

/// Compare a computed digest against the declared checksum.
pub fn verify(expected: &str, actual: &[u8; 32]) -> Result<(), ReleaseError> {
    let expected_bytes = parse_sha256(expected)?;
    if &expected_bytes != actual {
        return Err(ReleaseError::ChecksumMismatch {
            expected: format_digest(&expected_bytes),
            actual: format_digest(actual),
        });
    }
    Ok(())
}
