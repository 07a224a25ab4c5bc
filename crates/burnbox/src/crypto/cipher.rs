//! AES-256-GCM-SIV sealing and opening of secret payloads.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is nonce-misuse-resistant.
//! Keys here are generated fresh per secret and used exactly once, which
//! already rules out nonce reuse; SIV keeps the scheme safe even if that
//! assumption is ever violated.
//!
//! **Do NOT substitute plain AES-256-GCM with a fixed nonce.** GCM nonce reuse
//! is catastrophic — it breaks both confidentiality and authentication.

use aes_gcm_siv::{
    aead::{Aead, KeyInit, OsRng},
    Aes256GcmSiv, Nonce,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use thiserror::Error;

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Prefix that appears at the start of every sealed secret string.
pub const VERSION_PREFIX: &str = "v1";

// ---------------------------------------------------------------------------
// Per-secret key
// ---------------------------------------------------------------------------

/// A single-use symmetric key.
///
/// Generated for exactly one secret and handed to the caller inside the
/// token; the service never writes it anywhere. The buffer is wiped on drop
/// to shorten the window during which key material sits in process memory.
///
/// Deliberately not `Clone`: one key, one owner.
pub struct CipherKey(Box<[u8; KEY_LEN]>);

impl CipherKey {
    /// Generate a fresh random key from the OS CSPRNG.
    pub fn generate() -> Self {
        use aes_gcm_siv::aead::rand_core::RngCore;
        let mut buf = Box::new([0u8; KEY_LEN]);
        OsRng.fill_bytes(buf.as_mut_slice());
        Self(buf)
    }

    /// Encode the key for embedding in a token.
    ///
    /// Base64url without padding: 43 characters from an alphabet that cannot
    /// collide with the token separator.
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0.as_slice())
    }

    /// Parse a key from its token encoding.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKey`] if the input is not base64url or
    /// does not decode to exactly [`KEY_LEN`] bytes.
    pub fn decode(s: &str) -> Result<Self, CipherError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(s)
            .map_err(|_| CipherError::InvalidKey)?;
        if bytes.len() != KEY_LEN {
            return Err(CipherError::InvalidKey);
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(&bytes);
        Ok(Self(buf))
    }
}

impl Drop for CipherKey {
    fn drop(&mut self) {
        for b in self.0.iter_mut() {
            *b = 0;
        }
    }
}

impl std::fmt::Debug for CipherKey {
    /// Key material never appears in logs or panic output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CipherKey([REDACTED])")
    }
}

// ---------------------------------------------------------------------------
// Sealed payload
// ---------------------------------------------------------------------------

/// An encrypted secret payload, as held by the store.
///
/// The string representation is `v1.<base64url(nonce)>.<base64url(ciphertext+tag)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedSecret {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw ciphertext + authentication tag bytes.
    pub ciphertext: Vec<u8>,
}

impl SealedSecret {
    /// Encode this value to its canonical string representation.
    pub fn to_string_repr(&self) -> String {
        format!(
            "{}.{}.{}",
            VERSION_PREFIX,
            URL_SAFE_NO_PAD.encode(self.nonce),
            URL_SAFE_NO_PAD.encode(&self.ciphertext),
        )
    }

    /// Parse a sealed secret string back into a [`SealedSecret`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidFormat`] if the string does not match the
    /// expected `v1.<nonce>.<ciphertext>` structure.
    pub fn from_string_repr(s: &str) -> Result<Self, CipherError> {
        let parts: Vec<&str> = s.splitn(3, '.').collect();
        if parts.len() != 3 || parts[0] != VERSION_PREFIX {
            return Err(CipherError::InvalidFormat);
        }
        let nonce_bytes = URL_SAFE_NO_PAD
            .decode(parts[1])
            .map_err(|_| CipherError::InvalidFormat)?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CipherError::InvalidFormat);
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&nonce_bytes);

        let ciphertext = URL_SAFE_NO_PAD
            .decode(parts[2])
            .map_err(|_| CipherError::InvalidFormat)?;

        Ok(Self { nonce, ciphertext })
    }
}

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key is not valid base64url or has the wrong decoded length.
    #[error("invalid key: expected {KEY_LEN} base64url-encoded bytes")]
    InvalidKey,

    /// AES-GCM-SIV encryption or decryption failed (wrong key or tampered data).
    #[error("aead operation failed")]
    AeadFailure,

    /// The sealed secret string does not match the expected format.
    #[error("invalid sealed secret format")]
    InvalidFormat,
}

// ---------------------------------------------------------------------------
// Seal / open
// ---------------------------------------------------------------------------

/// Encrypt a secret payload under a fresh random key.
///
/// Generates a new key and a random 96-bit nonce from the OS CSPRNG on every
/// call. The returned key is the only way to open the sealed secret; once it
/// is dropped without being encoded, the payload is unrecoverable.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (should be
/// unreachable with a freshly generated key and nonce).
pub fn encrypt(plaintext: &[u8]) -> Result<(SealedSecret, CipherKey), CipherError> {
    let key = CipherKey::generate();
    let cipher = build_cipher(&key)?;

    // Use OsRng for a cryptographically secure random nonce.
    use aes_gcm_siv::aead::rand_core::RngCore;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CipherError::AeadFailure)?;

    Ok((
        SealedSecret {
            nonce: nonce_bytes,
            ciphertext,
        },
        key,
    ))
}

/// Decrypt a [`SealedSecret`] back to plaintext bytes.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] if authentication fails (wrong key or
/// tampered data).
pub fn decrypt(sealed: &SealedSecret, key: &CipherKey) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;
    let nonce = Nonce::from_slice(&sealed.nonce);
    cipher
        .decrypt(nonce, sealed.ciphertext.as_ref())
        .map_err(|_| CipherError::AeadFailure)
}

fn build_cipher(key: &CipherKey) -> Result<Aes256GcmSiv, CipherError> {
    // A CipherKey is KEY_LEN bytes by construction, so this cannot fail.
    Aes256GcmSiv::new_from_slice(key.0.as_slice()).map_err(|_| CipherError::InvalidKey)
}
