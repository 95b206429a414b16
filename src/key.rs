//! Private key loading and signer derivation

use std::path::Path;

use alloy::signers::local::PrivateKeySigner;
use tracing::debug;

use crate::error::{DeployError, Result};

/// Read the raw private key from `path`, trimmed of surrounding whitespace.
///
/// A missing file is reported as [`DeployError::KeyFileMissing`] so the caller
/// can exit before touching the network or the compiler.
pub async fn load_private_key(path: &Path) -> Result<String> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(DeployError::KeyFileMissing {
            path: path.to_path_buf(),
        });
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DeployError::KeyFileRead {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Loaded private key from {}", path.display());
    Ok(content.trim().to_string())
}

/// Derive the signing identity from a raw key (hex, with or without `0x`)
pub fn signer_from_key(private_key: &str) -> Result<PrivateKeySigner> {
    private_key
        .parse::<PrivateKeySigner>()
        .map_err(|e| DeployError::InvalidKey(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    // Well-known development key (anvil account #0)
    const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const DEV_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    #[tokio::test]
    async fn test_missing_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("privkey.txt");

        let err = load_private_key(&path).await.unwrap_err();
        assert!(err.is_key_missing());
        assert!(err.to_string().contains("privkey.txt"));
    }

    #[tokio::test]
    async fn test_key_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let with_newline = dir.path().join("a.txt");
        let bare = dir.path().join("b.txt");
        std::fs::write(&with_newline, "abc123\n").unwrap();
        std::fs::write(&bare, "abc123").unwrap();

        let a = load_private_key(&with_newline).await.unwrap();
        let b = load_private_key(&bare).await.unwrap();
        assert_eq!(a, "abc123");
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_padded_key_derives_same_signer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("privkey.txt");
        std::fs::write(&path, format!("  0x{}\r\n", DEV_KEY)).unwrap();

        let key = load_private_key(&path).await.unwrap();
        let signer = signer_from_key(&key).unwrap();
        assert_eq!(signer.address(), DEV_ADDRESS.parse::<Address>().unwrap());
        assert_eq!(signer_from_key(DEV_KEY).unwrap().address(), signer.address());
    }

    #[test]
    fn test_invalid_key_rejected() {
        let err = signer_from_key("abc123").unwrap_err();
        assert!(matches!(err, DeployError::InvalidKey(_)));
    }
}
