// src/vote/keystore.rs
//! Persistent secp256k1 signing identity.

use std::fs;
use std::io::Write;
use std::path::Path;

use alloy_primitives::{Address, B256};
use anyhow::{anyhow, Context};
use k256::ecdsa::SigningKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("invalid private key: {0}")]
    InvalidKey(String),
    #[error("signature failed: {0}")]
    Sign(String),
}

/// On-disk form of the key file.
#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    private_key: String,
    address: String,
}

pub struct VoteSigner {
    key: SigningKey,
    address: Address,
}

impl std::fmt::Debug for VoteSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl VoteSigner {
    pub fn from_key(key: SigningKey) -> Self {
        let point = key.verifying_key().to_encoded_point(false);
        let address = Address::from_raw_public_key(&point.as_bytes()[1..]);
        Self { key, address }
    }

    pub fn random() -> Self {
        Self::from_key(SigningKey::random(&mut rand::rngs::OsRng))
    }

    pub fn from_hex(s: &str) -> Result<Self, SignError> {
        let bytes = hex::decode(s.trim().trim_start_matches("0x"))
            .map_err(|e| SignError::InvalidKey(e.to_string()))?;
        let key = SigningKey::from_slice(&bytes).map_err(|e| SignError::InvalidKey(e.to_string()))?;
        Ok(Self::from_key(key))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 checksummed address.
    pub fn address_checksummed(&self) -> String {
        self.address.to_checksum(None)
    }

    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.key.to_bytes()))
    }

    pub fn verifying_key(&self) -> &k256::ecdsa::VerifyingKey {
        self.key.verifying_key()
    }

    /// 65-byte `r ‖ s ‖ v` signature over a prehashed digest, `v = 27 + recid`.
    pub fn sign_hash(&self, hash: &B256) -> Result<[u8; 65], SignError> {
        let (sig, recid) = self
            .key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|e| SignError::Sign(e.to_string()))?;
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&sig.to_bytes());
        out[64] = recid.to_byte() + 27;
        Ok(out)
    }
}

/// Load the key file at `path`, or generate a new key and persist it there.
/// A stored address that does not match the key is an error.
pub fn load_or_create(path: &Path) -> anyhow::Result<VoteSigner> {
    if path.exists() {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading key file {}", path.display()))?;
        let stored: KeyFile = serde_json::from_str(&content)
            .with_context(|| format!("parsing key file {}", path.display()))?;
        let signer = VoteSigner::from_hex(&stored.private_key)?;
        let stored_addr: Address = stored
            .address
            .parse()
            .map_err(|e| anyhow!("key file address {:?} is invalid: {e}", stored.address))?;
        if stored_addr != signer.address() {
            return Err(anyhow!(
                "key file {} lists address {} but the key derives {}",
                path.display(),
                stored.address,
                signer.address_checksummed()
            ));
        }
        info!(address = %signer.address_checksummed(), "loaded vote signing key");
        return Ok(signer);
    }

    let signer = VoteSigner::random();
    let file = KeyFile {
        private_key: signer.private_key_hex(),
        address: signer.address_checksummed(),
    };
    write_key_file(path, &serde_json::to_string_pretty(&file)?)
        .with_context(|| format!("writing key file {}", path.display()))?;
    info!(address = %file.address, path = %path.display(), "generated new vote signing key");
    Ok(signer)
}

fn write_key_file(path: &Path, json: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o600);
    }
    let mut f = opts.open(&tmp)?;
    f.write_all(json.as_bytes())?;
    f.sync_all()?;
    fs::rename(tmp, path)
}
