/// SHA-256 fingerprint of a card's user-visible content.
///
/// Used to recognise the server echo of an optimistic card, whose id differs
/// from the temporary one. Title and description are NFC-normalized, trimmed
/// and have CRLF folded to LF before hashing.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentFingerprint(pub String);

impl ContentFingerprint {
    pub fn of_card(title: &str, description: Option<&str>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(normalize(title).as_bytes());
        // Unit separator keeps ("ab", "c") and ("a", "bc") apart.
        hasher.update(b"\x1f");
        hasher.update(normalize(description.unwrap_or("")).as_bytes());
        Self(hex::encode(hasher.finalize()))
    }
}

fn normalize(text: &str) -> String {
    text.replace("\r\n", "\n").trim().nfc().collect()
}
