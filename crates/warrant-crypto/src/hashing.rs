/// BLAKE3 hash (32 bytes).
pub type Hash = [u8; 32];

/// Derive a 32-byte key from `material` under a domain-separation `context`.
///
/// The context string must be hardcoded and globally unique per use.
pub fn derive_key(context: &str, material: &[u8]) -> Hash {
    blake3::derive_key(context, material)
}
