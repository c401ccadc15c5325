//! Minimal DER codec for elliptic-curve key structures.
//!
//! Only the shapes this client actually exchanges are implemented: the
//! SubjectPublicKeyInfo wrapper around an uncompressed P-256 point, and the
//! scalar hidden inside an ECPrivateKey (or PKCS#8) blob. Lengths follow the
//! usual DER rules: short form below 128, long form with a big-endian
//! length-of-length prefix otherwise.

use crate::error::CryptoError;

const TAG_SEQUENCE: u8 = 0x30;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_OCTET_STRING: u8 = 0x04;

/// AlgorithmIdentifier contents: id-ecPublicKey (1.2.840.10045.2.1) followed
/// by prime256v1 (1.2.840.10045.3.1.7), each as a pre-encoded OID TLV.
const OID_EC_PUBLIC_KEY: [u8; 9] = [0x06, 0x07, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];
const OID_PRIME256V1: [u8; 10] = [0x06, 0x08, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07];

// ---------------------------------------------------------------------------
// Length codec
// ---------------------------------------------------------------------------

/// Encode a DER length field.
pub fn encode_length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }
    let bytes = len.to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let mut out = Vec::with_capacity(1 + bytes.len() - skip);
    out.push(0x80 | (bytes.len() - skip) as u8);
    out.extend_from_slice(&bytes[skip..]);
    out
}

/// Decode a DER length field, returning `(length, bytes_consumed)`.
pub fn decode_length(data: &[u8]) -> Result<(usize, usize), CryptoError> {
    let first = *data
        .first()
        .ok_or_else(|| CryptoError::Decode("empty length field".into()))?;

    if first < 0x80 {
        return Ok((first as usize, 1));
    }

    let count = (first & 0x7f) as usize;
    if count == 0 || count > 8 {
        return Err(CryptoError::Decode(format!(
            "unsupported length-of-length {count}"
        )));
    }
    let bytes = data
        .get(1..1 + count)
        .ok_or_else(|| CryptoError::Decode("truncated long-form length".into()))?;

    let mut len: usize = 0;
    for &b in bytes {
        len = len
            .checked_shl(8)
            .and_then(|l| l.checked_add(b as usize))
            .ok_or_else(|| CryptoError::Decode("length overflow".into()))?;
    }
    Ok((len, 1 + count))
}

fn read_tlv(data: &[u8], expected_tag: u8) -> Result<(&[u8], usize), CryptoError> {
    let tag = *data
        .first()
        .ok_or_else(|| CryptoError::Decode("empty element".into()))?;
    if tag != expected_tag {
        return Err(CryptoError::Decode(format!(
            "expected tag 0x{expected_tag:02x}, found 0x{tag:02x}"
        )));
    }
    let (len, len_consumed) = decode_length(&data[1..])?;
    let start = 1 + len_consumed;
    let content = data
        .get(start..start + len)
        .ok_or_else(|| CryptoError::Decode("truncated element".into()))?;
    Ok((content, start + len))
}

// ---------------------------------------------------------------------------
// SubjectPublicKeyInfo
// ---------------------------------------------------------------------------

/// Wrap an uncompressed P-256 point in a SubjectPublicKeyInfo structure:
/// `SEQUENCE { SEQUENCE { OID, OID }, BIT STRING }`.
pub fn encode_spki(point: &[u8; 65]) -> Vec<u8> {
    let mut algorithm = Vec::with_capacity(21);
    algorithm.push(TAG_SEQUENCE);
    algorithm.extend_from_slice(&encode_length(
        OID_EC_PUBLIC_KEY.len() + OID_PRIME256V1.len(),
    ));
    algorithm.extend_from_slice(&OID_EC_PUBLIC_KEY);
    algorithm.extend_from_slice(&OID_PRIME256V1);

    let mut bit_string = Vec::with_capacity(68);
    bit_string.push(TAG_BIT_STRING);
    bit_string.extend_from_slice(&encode_length(1 + point.len()));
    bit_string.push(0x00); // no unused bits
    bit_string.extend_from_slice(point);

    let mut out = Vec::with_capacity(2 + algorithm.len() + bit_string.len());
    out.push(TAG_SEQUENCE);
    out.extend_from_slice(&encode_length(algorithm.len() + bit_string.len()));
    out.extend_from_slice(&algorithm);
    out.extend_from_slice(&bit_string);
    out
}

/// Extract the uncompressed point from a SubjectPublicKeyInfo blob.
///
/// Rejects wrong OIDs, a nonzero unused-bits octet, and any point that does
/// not begin with the 0x04 uncompressed marker.
pub fn parse_spki(der: &[u8]) -> Result<[u8; 65], CryptoError> {
    let (outer, _) = read_tlv(der, TAG_SEQUENCE)?;
    let (algorithm, alg_len) = read_tlv(outer, TAG_SEQUENCE)?;

    let mut expected = Vec::with_capacity(19);
    expected.extend_from_slice(&OID_EC_PUBLIC_KEY);
    expected.extend_from_slice(&OID_PRIME256V1);
    if algorithm != expected {
        return Err(CryptoError::Decode("unexpected algorithm identifier".into()));
    }

    let (bits, _) = read_tlv(&outer[alg_len..], TAG_BIT_STRING)?;
    if bits.len() != 66 {
        return Err(CryptoError::Decode(format!(
            "expected 66-byte bit string, got {}",
            bits.len()
        )));
    }
    if bits[0] != 0 {
        return Err(CryptoError::Decode("nonzero unused-bits count".into()));
    }
    if bits[1] != 0x04 {
        return Err(CryptoError::Decode("point is not uncompressed".into()));
    }

    let mut point = [0u8; 65];
    point.copy_from_slice(&bits[1..]);
    Ok(point)
}

// ---------------------------------------------------------------------------
// Private scalar extraction
// ---------------------------------------------------------------------------

/// Recover the raw 32-byte scalar from private-key material.
///
/// A bare 32-byte blob is returned as-is. Anything else is treated as DER
/// (ECPrivateKey, possibly nested inside PKCS#8) and searched for the
/// innermost 32-byte OCTET STRING: shallower 32-byte octet strings can occur
/// in these structures, so the deepest match wins.
pub fn private_scalar_from_blob(data: &[u8]) -> Result<[u8; 32], CryptoError> {
    if data.len() == 32 {
        let mut out = [0u8; 32];
        out.copy_from_slice(data);
        return Ok(out);
    }

    let mut best: Option<(u32, [u8; 32])> = None;
    scan_octet_strings(data, 0, &mut best);
    best.map(|(_, scalar)| scalar)
        .ok_or_else(|| CryptoError::Decode("no 32-byte octet string found".into()))
}

/// Depth-first TLV walk recording the first 32-byte OCTET STRING at the
/// greatest nesting depth. Constructed elements and octet strings that wrap
/// further DER are both descended into; malformed regions end the walk of
/// their enclosing element without failing the whole scan.
fn scan_octet_strings(data: &[u8], depth: u32, best: &mut Option<(u32, [u8; 32])>) {
    let mut pos = 0usize;
    while pos + 2 <= data.len() {
        let tag = data[pos];
        let Ok((len, len_consumed)) = decode_length(&data[pos + 1..]) else {
            return;
        };
        let content_start = pos + 1 + len_consumed;
        let Some(content) = data.get(content_start..content_start + len) else {
            return;
        };

        if tag == TAG_OCTET_STRING && len == 32 {
            if best.map_or(true, |(d, _)| depth > d) {
                *best = Some((depth, content.try_into().expect("length checked")));
            }
        } else if tag & 0x20 != 0 || tag == TAG_OCTET_STRING {
            scan_octet_strings(content, depth + 1, best);
        }

        pos = content_start + len;
    }
}
