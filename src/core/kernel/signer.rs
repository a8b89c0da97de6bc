use crate::core::errors::ExchangeError;
use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signer as Ed25519SignerTrait, SigningKey, VerifyingKey};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Output of one signing operation.
///
/// `canonical` is kept for diagnostics only and is never sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureResult {
    pub token: String,
    pub canonical: String,
}

/// Which family of credentials a signer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignerKind {
    Hmac,
    Ed25519,
}

/// Signer trait for request authentication
///
/// Implementations turn a canonical string into a signature token. They know
/// nothing about parameter ordering or wire placement.
pub trait Signer: Send + Sync {
    fn kind(&self) -> SignerKind;

    /// Public key identity sent alongside the signature (API key or public key)
    fn key_id(&self) -> &str;

    /// Sign the UTF-8 bytes of `canonical`
    fn sign(&self, canonical: &str) -> Result<SignatureResult, ExchangeError>;
}

/// HMAC-SHA256 signer producing lowercase hex
pub struct HmacSigner {
    api_key: String,
    secret_key: Secret<String>,
}

impl HmacSigner {
    /// Create a new HMAC signer
    ///
    /// # Arguments
    /// * `api_key` - API key from the exchange
    /// * `secret_key` - Secret key for signing
    pub fn new(api_key: String, secret_key: String) -> Result<Self, ExchangeError> {
        if secret_key.is_empty() {
            return Err(ExchangeError::MissingCredentials(
                "HMAC secret key is empty".to_string(),
            ));
        }
        Ok(Self {
            api_key,
            secret_key: Secret::new(secret_key),
        })
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner").finish_non_exhaustive()
    }
}

impl Signer for HmacSigner {
    fn kind(&self) -> SignerKind {
        SignerKind::Hmac
    }

    fn key_id(&self) -> &str {
        &self.api_key
    }

    fn sign(&self, canonical: &str) -> Result<SignatureResult, ExchangeError> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .map_err(|e| ExchangeError::AuthError(format!("Invalid secret key: {}", e)))?;
        mac.update(canonical.as_bytes());

        Ok(SignatureResult {
            token: hex::encode(mac.finalize().into_bytes()),
            canonical: canonical.to_string(),
        })
    }
}

/// Ed25519 signer producing standard base64
pub struct Ed25519Signer {
    signing_key: SigningKey,
    public_key_b64: String,
}

impl Ed25519Signer {
    /// Create a new Ed25519 signer from a base64-encoded 32-byte seed
    ///
    /// When `public_key` is given it must match the key derived from the seed.
    pub fn new(private_key: &str, public_key: Option<&str>) -> Result<Self, ExchangeError> {
        let key_bytes = Zeroizing::new(
            general_purpose::STANDARD.decode(private_key).map_err(|e| {
                ExchangeError::AuthError(format!("Invalid private key format: {}", e))
            })?,
        );

        let seed: [u8; 32] = key_bytes.as_slice().try_into().map_err(|_| {
            ExchangeError::AuthError(format!(
                "Invalid private key length: expected 32 bytes, got {}",
                key_bytes.len()
            ))
        })?;
        let seed = Zeroizing::new(seed);

        let signing_key = SigningKey::from_bytes(&seed);
        let derived = general_purpose::STANDARD.encode(signing_key.verifying_key().to_bytes());

        let public_key_b64 = match public_key {
            Some(configured) if !configured.is_empty() => {
                if configured != derived {
                    return Err(ExchangeError::AuthError(
                        "Public key does not match the private key".to_string(),
                    ));
                }
                configured.to_string()
            }
            _ => derived,
        };

        Ok(Self {
            signing_key,
            public_key_b64,
        })
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}

impl std::fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("public_key", &self.public_key_b64)
            .finish_non_exhaustive()
    }
}

impl Signer for Ed25519Signer {
    fn kind(&self) -> SignerKind {
        SignerKind::Ed25519
    }

    fn key_id(&self) -> &str {
        &self.public_key_b64
    }

    fn sign(&self, canonical: &str) -> Result<SignatureResult, ExchangeError> {
        let signature = Ed25519SignerTrait::sign(&self.signing_key, canonical.as_bytes());
        Ok(SignatureResult {
            token: general_purpose::STANDARD.encode(signature.to_bytes()),
            canonical: canonical.to_string(),
        })
    }
}
