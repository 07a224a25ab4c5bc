//! Per-secret authenticated encryption.
//!
//! Every stored secret gets its own fresh 256-bit key. The key travels back
//! to the caller inside the token and is never persisted, so the backing
//! store alone can never recover a plaintext.
//!
//! # Sealed secret format
//!
//! ```text
//! v1.<base64url-no-pad(nonce)>.<base64url-no-pad(ciphertext+tag)>
//! ```
//!
//! The `v1` prefix leaves room for algorithm migration without invalidating
//! records already at rest.

pub mod cipher;
