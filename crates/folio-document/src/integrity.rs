// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Content fingerprints for documents and embedded image streams.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `data`.
///
/// A passed-through JPEG keeps its fingerprint inside the PDF, which is how
/// pages are matched back to their source files.
pub fn hash_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_of_abc() {
        // FIPS 180-2, appendix B.1.
        assert_eq!(
            hash_bytes(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn fingerprint_is_fixed_width() {
        let fingerprint = hash_bytes(&[0u8; 4096]);
        assert_eq!(fingerprint.len(), 64);
        assert!(fingerprint.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
        assert_ne!(fingerprint, hash_bytes(&[0u8; 4095]));
    }
}
