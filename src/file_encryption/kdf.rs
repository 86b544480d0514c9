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

use hmac::Hmac;
use pbkdf2::pbkdf2;
use sha2::Sha512;
use zeroize::Zeroizing;

use crate::error::KeyExportError;

/// Derive `length` bytes of key material from `passphrase` and `salt` using
/// PBKDF2 with HMAC-SHA-512 as the pseudorandom function.
///
/// This crate needs 64 bytes of output (32 for the AES key, 32 for the HMAC
/// key) rather than the 32 bytes most PBKDF2 call sites ask for, but the
/// `pbkdf2` crate already supports arbitrary-length output, so this is a
/// thin, validated wrapper rather than a reimplementation of the PBKDF2
/// block construction.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    rounds: u32,
    length: usize,
) -> Result<Zeroizing<Vec<u8>>, KeyExportError> {
    if rounds < 1 || length < 1 {
        return Err(KeyExportError::BadInput);
    }

    let mut output = Zeroizing::new(vec![0u8; length]);
    pbkdf2::<Hmac<Sha512>>(passphrase, salt, rounds, &mut output);

    Ok(output)
}
