//! Minimal contract ABI encoding.
//!
//! Covers exactly what the stablecoin proxy contract needs: function
//! selectors (keccak-256 of the signature), static 32-byte word arguments,
//! and `Error(string)` revert decoding. Dynamic argument types are out of
//! scope on purpose.

use crate::{Error, Result};
use capability::Role;
use sha3::{Digest, Keccak256};

/// Selector for the standard `Error(string)` revert payload.
const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];

/// A static ABI argument, encoded as one 32-byte word.
#[derive(Debug, Clone, Copy)]
pub enum AbiValue {
    Address([u8; 20]),
    Uint(u128),
    Bytes32([u8; 32]),
}

impl AbiValue {
    fn to_word(self) -> [u8; 32] {
        let mut word = [0u8; 32];
        match self {
            Self::Address(addr) => word[12..].copy_from_slice(&addr),
            Self::Uint(value) => word[16..].copy_from_slice(&value.to_be_bytes()),
            Self::Bytes32(bytes) => word = bytes,
        }
        word
    }
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// First four bytes of the keccak-256 of a canonical function signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode a function call: selector followed by one word per argument.
pub fn encode_call(signature: &str, args: &[AbiValue]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + 32 * args.len());
    data.extend_from_slice(&selector(signature));
    for arg in args {
        data.extend_from_slice(&arg.to_word());
    }
    data
}

/// The on-chain id for a contract role. `DEFAULT_ADMIN_ROLE` is the zero
/// word; every other role id is the keccak-256 of its name.
pub fn role_id(role: Role) -> [u8; 32] {
    match role {
        Role::Admin => [0u8; 32],
        other => keccak256(other.contract_name().as_bytes()),
    }
}

/// Extract the reason from an ABI-encoded `Error(string)` revert payload.
pub fn decode_revert(data: &[u8]) -> Option<String> {
    if data.len() < 4 + 64 || data[..4] != ERROR_STRING_SELECTOR {
        return None;
    }
    let words = &data[4..];
    // Word 0 is the offset to the string head, word 1 its byte length.
    let len = u64::from_be_bytes(words[56..64].try_into().ok()?) as usize;
    let bytes = words.get(64..64 + len)?;
    String::from_utf8(bytes.to_vec()).ok()
}

/// Decode a `0x`-prefixed hex revert payload as carried in JSON-RPC error
/// data.
pub fn decode_revert_hex(data: &str) -> Result<Option<String>> {
    let stripped = data.strip_prefix("0x").unwrap_or(data);
    let bytes = hex::decode(stripped).map_err(|e| Error::Rpc(format!("bad revert data: {e}")))?;
    Ok(decode_revert(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_matches_known_value() {
        // keccak256("transfer(address,uint256)")[..4] == a9059cbb
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
    }

    #[test]
    fn encode_call_layout() {
        let data = encode_call(
            "mint(address,uint256)",
            &[AbiValue::Address([0x11; 20]), AbiValue::Uint(1000)],
        );
        assert_eq!(data.len(), 4 + 64);
        // Address is right-aligned in its word.
        assert_eq!(&data[4..16], &[0u8; 12]);
        assert_eq!(&data[16..36], &[0x11; 20]);
        // Uint is big-endian in the low bytes.
        assert_eq!(&data[66..68], &[0x03, 0xe8]);
    }

    #[test]
    fn admin_role_is_zero_word() {
        assert_eq!(role_id(Role::Admin), [0u8; 32]);
        assert_ne!(role_id(Role::CashIn), [0u8; 32]);
        assert_ne!(role_id(Role::CashIn), role_id(Role::Burn));
    }

    #[test]
    fn revert_roundtrip() {
        let reason = "insufficient balance";
        let mut data = ERROR_STRING_SELECTOR.to_vec();
        let mut offset = [0u8; 32];
        offset[31] = 0x20;
        data.extend_from_slice(&offset);
        let mut len = [0u8; 32];
        len[31] = reason.len() as u8;
        data.extend_from_slice(&len);
        let mut bytes = reason.as_bytes().to_vec();
        bytes.resize(32, 0);
        data.extend_from_slice(&bytes);

        assert_eq!(decode_revert(&data).as_deref(), Some(reason));
        assert_eq!(
            decode_revert_hex(&format!("0x{}", hex::encode(&data)))
                .unwrap()
                .as_deref(),
            Some(reason)
        );
    }

    #[test]
    fn revert_rejects_foreign_payloads() {
        assert!(decode_revert(&[0x12, 0x34]).is_none());
        assert!(decode_revert(&[0u8; 80]).is_none());
    }
}
