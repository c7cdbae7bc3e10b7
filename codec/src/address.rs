//! Appchain address codec.
//!
//! Address format: base58( prefix_bytes ++ public_key ++ checksum[0..2] )
//!
//! Checksum: first 2 bytes of Blake2b-512(`"SS58PRE"` ++ prefix_bytes ++ public_key).
//! Prefixes 0–63 encode as one byte; 64–16383 as two bytes.
//! Base58 alphabet: the Bitcoin alphabet (no `0`, `O`, `I`, `l`).

use blake2::{Blake2b512, Digest};
use trestle_types::BridgeError;

/// Base58 alphabet (58 chars, avoids visually ambiguous 0/O, I/l).
const BASE58_ALPHABET: &[u8; 58] =
    b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Reverse lookup table: ASCII byte → base58 value (0xFF = invalid).
const BASE58_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let alpha = BASE58_ALPHABET;
    let mut i = 0;
    while i < 58 {
        table[alpha[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Checksum preimage prefix defined by the address format.
const CHECKSUM_CONTEXT: &[u8] = b"SS58PRE";
/// Checksum bytes appended to a 32-byte account payload.
const CHECKSUM_LEN: usize = 2;
/// Highest prefix the two-byte form can carry (14 bits).
const MAX_PREFIX: u16 = 0b0011_1111_1111_1111;

/// Encode a byte slice as base58.
fn encode_base58(bytes: &[u8]) -> String {
    // Leading zero bytes map one-to-one onto leading '1' characters.
    let zeros = bytes.iter().take_while(|&&b| b == 0).count();

    let mut digits: Vec<u8> = Vec::with_capacity(bytes.len() * 138 / 100 + 1);
    for &byte in bytes {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut result = String::with_capacity(zeros + digits.len());
    for _ in 0..zeros {
        result.push(BASE58_ALPHABET[0] as char);
    }
    for &digit in digits.iter().rev() {
        result.push(BASE58_ALPHABET[digit as usize] as char);
    }
    result
}

/// Decode a base58 string. Returns `None` on invalid characters.
fn decode_base58(s: &str) -> Option<Vec<u8>> {
    let zeros = s.bytes().take_while(|&c| c == b'1').count();

    let mut bytes: Vec<u8> = Vec::with_capacity(s.len() * 733 / 1000 + 1);
    for c in s.bytes() {
        if c >= 128 {
            return None;
        }
        let val = BASE58_DECODE[c as usize];
        if val == 0xFF {
            return None;
        }
        let mut carry = val as u32;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xFF) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    let mut result = vec![0u8; zeros];
    result.extend(bytes.iter().rev());
    Some(result)
}

/// Encode an address-format prefix as its one- or two-byte wire form.
fn prefix_bytes(prefix: u16) -> Vec<u8> {
    let ident = prefix & MAX_PREFIX;
    if ident < 64 {
        vec![ident as u8]
    } else {
        let first = ((ident & 0b0000_0000_1111_1100) >> 2) as u8 | 0b0100_0000;
        let second = (ident >> 8) as u8 | ((ident & 0b11) as u8) << 6;
        vec![first, second]
    }
}

/// Decode the prefix from the head of a payload. Returns (prefix, consumed).
fn decode_prefix(data: &[u8]) -> Option<(u16, usize)> {
    match data.first()? {
        b @ 0..=63 => Some((*b as u16, 1)),
        b @ 64..=127 => {
            let second = *data.get(1)?;
            let lower = (b << 2) | (second >> 6);
            let upper = second & 0b0011_1111;
            Some((lower as u16 | ((upper as u16) << 8), 2))
        }
        _ => None,
    }
}

fn checksum(prefixed: &[u8], key: &[u8]) -> [u8; CHECKSUM_LEN] {
    let mut hasher = Blake2b512::new();
    hasher.update(CHECKSUM_CONTEXT);
    hasher.update(prefixed);
    hasher.update(key);
    let hash = hasher.finalize();
    [hash[0], hash[1]]
}

/// Whether a string looks like a raw hex key rather than a native address.
fn looks_like_hex(s: &str) -> bool {
    if s.starts_with("0x") || s.starts_with("0X") {
        return true;
    }
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Decode a chain-native encoded address into its raw 32-byte public key.
///
/// Fails closed with [`BridgeError::InvalidAddress`] on anything that is not
/// a well-formed native address for the given prefix — including an input
/// that is already raw hex. The hex case is a checked precondition: bytes
/// are never silently reinterpreted as a base58 payload.
pub fn to_native_bytes(address: &str, ss58_prefix: u16) -> Result<[u8; 32], BridgeError> {
    if looks_like_hex(address) {
        return Err(BridgeError::InvalidAddress(format!(
            "expected a native-encoded address, got raw hex: {address}"
        )));
    }

    let invalid = || BridgeError::InvalidAddress(address.to_string());

    let payload = decode_base58(address).ok_or_else(invalid)?;
    let (prefix, consumed) = decode_prefix(&payload).ok_or_else(invalid)?;
    if prefix != ss58_prefix {
        return Err(BridgeError::InvalidAddress(format!(
            "address {address} carries prefix {prefix}, expected {ss58_prefix}"
        )));
    }

    if payload.len() != consumed + 32 + CHECKSUM_LEN {
        return Err(invalid());
    }
    let key: [u8; 32] = payload[consumed..consumed + 32]
        .try_into()
        .map_err(|_| invalid())?;
    let expected = checksum(&payload[..consumed], &key);
    if payload[consumed + 32..] != expected {
        return Err(invalid());
    }
    Ok(key)
}

/// Encode a raw 32-byte public key as a chain-native address.
pub fn to_ss58(key: &[u8; 32], ss58_prefix: u16) -> String {
    let prefixed = prefix_bytes(ss58_prefix);
    let check = checksum(&prefixed, key);
    let mut payload = Vec::with_capacity(prefixed.len() + 32 + CHECKSUM_LEN);
    payload.extend_from_slice(&prefixed);
    payload.extend_from_slice(key);
    payload.extend_from_slice(&check);
    encode_base58(&payload)
}

/// Hex-encode raw key bytes with a `0x` prefix. Always succeeds.
pub fn to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a hex string (with or without `0x`) into a 32-byte key.
pub fn from_hex(s: &str) -> Result<[u8; 32], BridgeError> {
    let stripped = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    let bytes = hex::decode(stripped).map_err(|_| BridgeError::InvalidAddress(s.to_string()))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| BridgeError::InvalidAddress(format!("expected 32 bytes in {s}")))
}
