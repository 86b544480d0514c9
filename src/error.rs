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

use thiserror::Error;

/// Error representing a failure during key export or import.
#[derive(Error, Debug)]
pub enum KeyExportError {
    /// The key export doesn't contain valid PEM-style armor headers.
    #[error("not a valid key export file")]
    MalformedArmor,
    /// The binary envelope inside the armor is too short or otherwise
    /// malformed.
    #[error("not a valid key export file")]
    MalformedEnvelope,
    /// The key export has been encrypted with an unsupported version.
    #[error("unsupported key export version: {0}")]
    UnsupportedVersion(u8),
    /// The MAC didn't verify, or the plaintext wasn't valid JSON after
    /// decryption. These two cases are deliberately indistinguishable to
    /// the caller so a malleable ciphertext can't be used as an oracle.
    #[error("wrong passphrase or corrupted file")]
    AuthFailure,
    /// The session store reported that encryption isn't enabled.
    #[error("encryption is not enabled")]
    EncryptionDisabled,
    /// There were no session keys to export.
    #[error("no session keys to export")]
    EmptyExport,
    /// Invalid key-derivation parameters (zero rounds or zero-length
    /// output).
    #[error("invalid key derivation input")]
    BadInput,
}

/// Error reported by a [`SessionStore`](crate::session::SessionStore)
/// implementation.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The session could not be reconstructed from its pickled form.
    #[error("session could not be reconstructed: {0}")]
    Reconstruction(String),
    /// The store failed to persist an incoming session record.
    #[error("session could not be stored: {0}")]
    Store(String),
}
