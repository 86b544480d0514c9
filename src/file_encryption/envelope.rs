// Copyright 2020 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use byteorder::{BigEndian, ByteOrder};

use crate::error::KeyExportError;

pub(crate) const SALT_SIZE: usize = 16;
pub(crate) const IV_SIZE: usize = 16;
pub(crate) const MAC_SIZE: usize = 32;
pub(crate) const KEY_SIZE: usize = 32;
pub(crate) const VERSION: u8 = 1;

/// Version (1) + salt (16) + iv (16) + rounds (4) + mac (32), with an empty
/// ciphertext.
const MIN_ENVELOPE_LEN: usize = 1 + SALT_SIZE + IV_SIZE + 4 + MAC_SIZE;

/// A parsed, not-yet-verified envelope.
///
/// All fields borrow from the input buffer so that parsing never copies the
/// (still unauthenticated) ciphertext.
pub(crate) struct EnvelopeView<'a> {
    pub version: u8,
    pub salt: &'a [u8],
    pub iv: &'a [u8],
    pub rounds: u32,
    pub ciphertext: &'a [u8],
    pub stored_mac: &'a [u8],
    /// The exact byte range the MAC was computed over: version, salt, iv,
    /// rounds, ciphertext, in that order, and nothing else.
    pub mac_input: &'a [u8],
}

/// Build the binary envelope: `version || salt || iv || rounds || ciphertext
/// || hmac_sha256(version || salt || iv || rounds || ciphertext)`.
pub(crate) fn build(
    salt: &[u8; SALT_SIZE],
    iv: &[u8; IV_SIZE],
    rounds: u32,
    ciphertext: &[u8],
    hmac_key: &[u8],
) -> Vec<u8> {
    use hmac::{Hmac, Mac, NewMac};
    use sha2::Sha256;

    let mut payload = Vec::with_capacity(MIN_ENVELOPE_LEN + ciphertext.len());
    payload.push(VERSION);
    payload.extend_from_slice(salt);
    payload.extend_from_slice(iv);
    payload.extend_from_slice(&rounds.to_be_bytes());
    payload.extend_from_slice(ciphertext);

    let mut hmac = Hmac::<Sha256>::new_varkey(hmac_key).expect("HMAC accepts any key length");
    hmac.update(&payload);
    payload.extend_from_slice(&hmac.finalize().into_bytes());

    payload
}

/// Split a raw envelope into its fields without verifying the MAC. Callers
/// must verify `stored_mac` against `mac_input` before trusting `ciphertext`.
pub(crate) fn parse(bytes: &[u8]) -> Result<EnvelopeView<'_>, KeyExportError> {
    if bytes.len() < MIN_ENVELOPE_LEN {
        return Err(KeyExportError::MalformedEnvelope);
    }

    let version = bytes[0];
    if version != VERSION {
        return Err(KeyExportError::UnsupportedVersion(version));
    }

    let salt_start = 1;
    let iv_start = salt_start + SALT_SIZE;
    let rounds_start = iv_start + IV_SIZE;
    let body_start = rounds_start + 4;

    let salt = &bytes[salt_start..iv_start];
    let iv = &bytes[iv_start..rounds_start];
    let rounds = BigEndian::read_u32(&bytes[rounds_start..body_start]);

    let mac_start = bytes.len() - MAC_SIZE;
    let ciphertext = &bytes[body_start..mac_start];
    let stored_mac = &bytes[mac_start..];
    let mac_input = &bytes[..mac_start];

    Ok(EnvelopeView { version, salt, iv, rounds, ciphertext, stored_mac, mac_input })
}

/// Compare two byte slices in constant time: never short-circuits on the
/// first mismatch, so runtime depends only on length, not content.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn build_then_parse_round_trips() {
        let salt = [1u8; SALT_SIZE];
        let iv = [2u8; IV_SIZE];
        let hmac_key = [3u8; KEY_SIZE];
        let ciphertext = b"hello world";

        let envelope = build(&salt, &iv, 1000, ciphertext, &hmac_key);
        let view = parse(&envelope).unwrap();

        assert_eq!(view.version, VERSION);
        assert_eq!(view.salt, &salt);
        assert_eq!(view.iv, &iv);
        assert_eq!(view.rounds, 1000);
        assert_eq!(view.ciphertext, ciphertext);
        assert_eq!(view.mac_input, &envelope[..envelope.len() - MAC_SIZE]);
    }

    #[test]
    fn empty_ciphertext_is_structurally_valid() {
        let salt = [0u8; SALT_SIZE];
        let iv = [0u8; IV_SIZE];
        let hmac_key = [0u8; KEY_SIZE];

        let envelope = build(&salt, &iv, 500_000, &[], &hmac_key);
        assert_eq!(envelope.len(), MIN_ENVELOPE_LEN);

        let view = parse(&envelope).unwrap();
        assert!(view.ciphertext.is_empty());
    }

    #[test]
    fn rejects_short_input() {
        let bytes = vec![0u8; MIN_ENVELOPE_LEN - 1];
        assert!(matches!(parse(&bytes), Err(KeyExportError::MalformedEnvelope)));
    }

    #[test]
    fn rejects_unsupported_version() {
        let salt = [0u8; SALT_SIZE];
        let iv = [0u8; IV_SIZE];
        let hmac_key = [0u8; KEY_SIZE];

        let mut envelope = build(&salt, &iv, 1, &[], &hmac_key);
        envelope[0] = 0x02;

        assert!(matches!(parse(&envelope), Err(KeyExportError::UnsupportedVersion(2))));
    }

    #[test]
    fn constant_time_eq_matches_equal_slices() {
        assert!(constant_time_eq(b"abcdef", b"abcdef"));
    }

    #[test]
    fn constant_time_eq_rejects_mismatches() {
        assert!(!constant_time_eq(b"abcdef", b"abcxef"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
    }
}
