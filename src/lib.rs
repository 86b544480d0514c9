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

//! A symmetric, passphrase-protected codec for exporting and importing
//! Megolm room keys.
//!
//! The format is a PEM-style armored, PBKDF2/AES-CTR/HMAC-SHA-256 encrypted
//! envelope, byte-compatible with the export format used across the wider
//! Matrix ecosystem. See [`file_encryption::export`] and
//! [`file_encryption::import`] for the two operations this crate exposes;
//! both are generic over a caller-supplied [`session::SessionStore`].
//!
//! ```no_run
//! # use megolm_key_export::session::SessionStore;
//! # async fn run(store: impl SessionStore) -> Result<(), megolm_key_export::error::KeyExportError> {
//! let exported = megolm_key_export::file_encryption::export(&store, "correct horse battery staple").await?;
//! let count = megolm_key_export::file_encryption::import(&store, &exported, "correct horse battery staple").await?;
//! assert!(count > 0);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file_encryption;
pub mod session;

pub use error::KeyExportError;
pub use file_encryption::{export, import};
pub use session::{SessionRecord, SessionStore, SessionView};
