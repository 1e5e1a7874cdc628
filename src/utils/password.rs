use sha2::{Digest, Sha256};

/// Digest a password with the fixed scheme used by the credential store:
/// SHA-256 over the UTF-8 bytes, formatted as lowercase hexadecimal.
/// Stored credentials depend on this exact output, so the scheme must not
/// change without a migration.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    format!("{:x}", digest)
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex_sha256() {
        // Known vector for SHA-256("password").
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn digest_length_is_64_chars() {
        assert_eq!(hash_password("").len(), 64);
        assert_eq!(hash_password("secret123").len(), 64);
    }

    #[test]
    fn digest_never_equals_plaintext() {
        let password = "hunter2hunter2";
        assert_ne!(hash_password(password), password);
    }

    #[test]
    fn verify_matches_only_the_original_password() {
        let hash = hash_password("correct horse");
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
    }
}
