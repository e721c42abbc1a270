// crates/protomcp-schema/src/naming.rs
// ============================================================================
// Module: Tool Naming
// Description: Tool identifiers derived from RPC method names.
// Purpose: Keep generated names within client length limits, deterministically.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! MCP clients cap tool names (64 characters is the common limit). Long names
//! keep their tail, which carries the service and method, and replace the head
//! with a short digest of the full name so distinct long names stay distinct.
//! The same input always mangles to the same output.

use sha2::Digest;
use sha2::Sha256;

/// Default maximum tool name length.
pub const DEFAULT_MAX_TOOL_NAME_LEN: usize = 64;

/// Hex digits of the digest kept as the name prefix.
const HASH_PREFIX_LEN: usize = 10;

/// Builds the tool name for a fully-qualified method (`pkg.Service.Method`).
#[must_use]
pub fn tool_name(method_full_name: &str) -> String {
    method_full_name.trim_start_matches('.').replace('.', "_")
}

/// Replaces the head of `name` with a digest prefix when it exceeds `max_len` bytes.
#[must_use]
pub fn mangle_head_if_too_long(name: &str, max_len: usize) -> String {
    if name.len() <= max_len {
        return name.to_string();
    }
    let mut hash = hex_encode(&Sha256::digest(name.as_bytes()));
    hash.truncate(HASH_PREFIX_LEN);
    if max_len <= HASH_PREFIX_LEN + 1 {
        hash.truncate(max_len);
        return hash;
    }
    let tail_len = max_len - HASH_PREFIX_LEN - 1;
    let mut start = name.len() - tail_len;
    while !name.is_char_boundary(start) {
        start += 1;
    }
    format!("{hash}_{}", &name[start..])
}

/// Lowercase hex encoding of `bytes`.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::missing_docs_in_private_items, reason = "Test functions are self-describing.")]

    use super::*;

    #[test]
    fn short_names_pass_through() {
        assert_eq!(mangle_head_if_too_long("pkg_Svc_Get", 64), "pkg_Svc_Get");
    }

    #[test]
    fn tool_name_replaces_dots() {
        assert_eq!(tool_name(".acme.v1.ItemService.GetItem"), "acme_v1_ItemService_GetItem");
    }

    #[test]
    fn long_names_keep_tail_and_limit() {
        let name = format!("{}_ItemService_GetItem", "very_long_package_segment".repeat(4));
        let mangled = mangle_head_if_too_long(&name, 64);
        assert_eq!(mangled.len(), 64);
        assert!(mangled.ends_with("_ItemService_GetItem"));
        assert_eq!(mangled.as_bytes()[HASH_PREFIX_LEN], b'_');
    }

    #[test]
    fn mangling_is_deterministic_and_distinct() {
        let first = format!("{}_A_Method", "x".repeat(80));
        let second = format!("{}_A_Method", "y".repeat(80));
        assert_eq!(mangle_head_if_too_long(&first, 40), mangle_head_if_too_long(&first, 40));
        assert_ne!(mangle_head_if_too_long(&first, 40), mangle_head_if_too_long(&second, 40));
    }

    #[test]
    fn tiny_limits_truncate_hash() {
        let mangled = mangle_head_if_too_long("abcdefghijklmnopqrstuvwxyz", 6);
        assert_eq!(mangled.len(), 6);
        assert!(mangled.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn hex_encode_is_lowercase_and_padded() {
        assert_eq!(hex_encode(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
    }

    #[test]
    fn mangled_prefix_is_digest_head() {
        let name = "n".repeat(80);
        let digest = hex_encode(&Sha256::digest(name.as_bytes()));
        let mangled = mangle_head_if_too_long(&name, 32);
        assert_eq!(&mangled[..HASH_PREFIX_LEN], &digest[..HASH_PREFIX_LEN]);
    }

    #[test]
    fn multibyte_tails_respect_char_boundaries() {
        let name = format!("{}é_Method", "z".repeat(70));
        let mangled = mangle_head_if_too_long(&name, 19);
        assert_eq!(mangled.len(), 18);
        assert!(mangled.ends_with("_Method"));
    }
}
