//! Key-pair JWT minting for the SQL API.
//!
//! The key file is read on every call so a rotated key takes effect without
//! a restart.

use std::path::PathBuf;

use ecotoken_core::Identity;
use ecotoken_core::constants::TOKEN_LIFETIME_SECS;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use pkcs8::{Document, EncryptedPrivateKeyInfo, LineEnding};
use serde::{Deserialize, Serialize};

use crate::error::WarehouseError;

const ENCRYPTED_PEM_LABEL: &str = "ENCRYPTED PRIVATE KEY";
const PKCS8_PEM_LABEL: &str = "PRIVATE KEY";

/// Registered claims of a key-pair token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn new(identity: &Identity, issued_at: i64) -> Self {
        Self {
            iss: identity.issuer(),
            sub: identity.qualified_user(),
            iat: issued_at,
            exp: issued_at.saturating_add(TOKEN_LIFETIME_SECS),
        }
    }
}

/// Mints RS256 tokens for one identity.
#[derive(Clone)]
pub struct KeyPairSigner {
    identity: Identity,
    key_path: PathBuf,
    passphrase: Option<String>,
}

impl std::fmt::Debug for KeyPairSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPairSigner")
            .field("identity", &self.identity)
            .field("key_path", &self.key_path)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "***"))
            .finish()
    }
}

impl KeyPairSigner {
    #[must_use]
    pub fn new(identity: Identity, key_path: impl Into<PathBuf>, passphrase: Option<String>) -> Self {
        Self { identity, key_path: key_path.into(), passphrase }
    }

    /// Mints a token issued now.
    ///
    /// # Errors
    /// Returns an error if the key cannot be read, decrypted, or used for signing.
    pub fn mint(&self) -> Result<String, WarehouseError> {
        self.mint_at(chrono::Utc::now().timestamp())
    }

    /// Mints a token issued at `issued_at` (Unix seconds).
    ///
    /// # Errors
    /// Returns an error if the key cannot be read, decrypted, or used for signing.
    pub fn mint_at(&self, issued_at: i64) -> Result<String, WarehouseError> {
        let key = self.load_key()?;
        let claims = Claims::new(&self.identity, issued_at);
        Ok(jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    fn load_key(&self) -> Result<EncodingKey, WarehouseError> {
        let pem = std::fs::read_to_string(&self.key_path)
            .map_err(|source| WarehouseError::KeyRead { path: self.key_path.clone(), source })?;
        decode_private_key(&pem, self.passphrase.as_deref())
    }
}

/// Accepts PKCS#1, PKCS#8 and encrypted PKCS#8 PEM.
fn decode_private_key(pem: &str, passphrase: Option<&str>) -> Result<EncodingKey, WarehouseError> {
    if !pem.contains(ENCRYPTED_PEM_LABEL) {
        return Ok(EncodingKey::from_rsa_pem(pem.as_bytes())?);
    }
    let passphrase = passphrase.ok_or(WarehouseError::MissingPassphrase)?;

    let (label, document) =
        Document::from_pem(pem).map_err(|e| WarehouseError::KeyDecrypt(e.to_string()))?;
    if label != ENCRYPTED_PEM_LABEL {
        return Err(WarehouseError::KeyDecrypt(format!("unexpected PEM label {label}")));
    }
    let info = EncryptedPrivateKeyInfo::try_from(document.as_bytes())
        .map_err(|e| WarehouseError::KeyDecrypt(e.to_string()))?;
    let decrypted =
        info.decrypt(passphrase).map_err(|e| WarehouseError::KeyDecrypt(e.to_string()))?;
    let plain = decrypted
        .to_pem(PKCS8_PEM_LABEL, LineEnding::LF)
        .map_err(|e| WarehouseError::KeyDecrypt(e.to_string()))?;
    Ok(EncodingKey::from_rsa_pem(plain.as_bytes())?)
}
