use std::collections::HashSet;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::types::Track;

/// Verifier length used when starting an authorization.
pub const DEFAULT_VERIFIER_LENGTH: usize = 96;

/// Base64url without padding: `+` becomes `-`, `/` becomes `_`, trailing `=` dropped.
pub fn base64_url_encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Draws `length` bytes from the thread-local CSPRNG and returns the first
/// `length` characters of their base64url encoding.
pub fn generate_code_verifier(length: usize) -> String {
    let mut bytes = vec![0u8; length];
    rand::rng().fill_bytes(&mut bytes);

    let mut verifier = base64_url_encode(&bytes);
    verifier.truncate(length);
    verifier
}

/// S256 PKCE challenge: base64url of the SHA-256 digest of the verifier.
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    base64_url_encode(&hash)
}

/// Keeps the first occurrence of every track id, preserving order.
pub fn remove_duplicate_tracks(tracks: &mut Vec<Track>) {
    let mut seen_ids = HashSet::new();
    tracks.retain(|track| seen_ids.insert(track.id.clone()));
}
