//! Token codec: the caller-facing pairing of storage key and decryption key.
//!
//! A token is `<storage_key>~<decryption_key>`, or a bare `<storage_key>`
//! when no decryption key is carried. `~` cannot occur inside either
//! component: storage keys are lowercase hex and decryption keys are
//! base64url.
//!
//! Decoding is total. It splits on the first `~` only, and a token without a
//! separator decodes to a present storage key and an absent decryption key.
//! Rejecting unknown or mangled tokens is the store lookup's job, which keeps
//! every failure on the single not-found path.

/// Separator between the storage key and the decryption key in a token.
pub const TOKEN_SEPARATOR: char = '~';

/// Build a token from a storage key and an optional decryption key.
pub fn encode(storage_key: &str, decryption_key: Option<&str>) -> String {
    match decryption_key {
        Some(key) => format!("{storage_key}{TOKEN_SEPARATOR}{key}"),
        None => storage_key.to_owned(),
    }
}

/// Split a token into its storage key and optional decryption key.
///
/// Never fails: a token without a separator yields the whole input as the
/// storage key and no decryption key.
pub fn decode(token: &str) -> (&str, Option<&str>) {
    match token.split_once(TOKEN_SEPARATOR) {
        Some((storage_key, key)) => (storage_key, Some(key)),
        None => (token, None),
    }
}
