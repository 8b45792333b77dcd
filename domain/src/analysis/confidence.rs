//! Response confidence heuristics and query fingerprints

use sha2::{Digest, Sha256};

/// Confidence of a primary agent response: `min(1, chars / 1000)`.
pub fn response_confidence(text: &str) -> f64 {
    (text.chars().count() as f64 / 1000.0).min(1.0)
}

/// Confidence of a consultation response: `min(1, chars / 500)`.
pub fn consultation_confidence(text: &str) -> f64 {
    (text.chars().count() as f64 / 500.0).min(1.0)
}

/// Short stable fingerprint of a query (first 16 hex chars of SHA-256).
pub fn query_fingerprint(query: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(query.as_bytes()));
    digest[..16].to_string()
}
