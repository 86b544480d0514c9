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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// A single exported Megolm session, ready to be JSON-serialized into (or
/// parsed out of) a key export file.
///
/// `sender_claimed_keys` is normalized to an empty map when absent or `null`
/// on import, so that round-tripping a record doesn't depend on whether the
/// source ever populated the field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// The group-messaging algorithm identifier, e.g. `m.megolm.v1.aes-sha2`.
    pub algorithm: String,
    /// The room this session belongs to.
    pub room_id: String,
    /// The session's unique identifier.
    pub session_id: String,
    /// The Curve25519 public key of the session's creator.
    pub sender_key: String,
    /// The sender's claimed identity keys, keyed by algorithm name.
    #[serde(default)]
    pub sender_claimed_keys: BTreeMap<String, String>,
    /// The chain of devices this session was forwarded through, oldest
    /// first.
    #[serde(default)]
    pub forwarding_curve25519_key_chain: Vec<String>,
    /// The session key material at the exported ratchet index.
    pub session_key: String,
}

/// A reconstructed view of a session, as handed back by
/// [`SessionStore::reconstruct`].
#[derive(Clone, Debug)]
pub struct SessionView {
    /// Whether the session is usable; invalid sessions are skipped on
    /// export.
    pub is_valid: bool,
    pub room_id: String,
    pub session_id: String,
    pub sender_key: String,
    pub sender_claimed_keys: BTreeMap<String, String>,
    pub forwarding_curve25519_key_chain: Vec<String>,
    /// The group session material at this session's first known ratchet
    /// index, as returned by `export_at_first_known_index()`.
    pub first_known_session_key: String,
}

/// The session store this codec is built against: an opaque sink and source
/// of Megolm sessions, injected by the caller. The codec never accesses
/// storage directly, only through this trait.
#[async_trait::async_trait]
pub trait SessionStore {
    /// The opaque handle this store uses to identify a stored session before
    /// it has been reconstructed into a [`SessionView`].
    type Session: Send + Sync;

    /// Return all sessions eligible for export.
    async fn list_inbound_sessions(&self) -> Vec<Self::Session>;

    /// Reconstruct a full view of `session`, unlocking it with
    /// `pickle_key`. May fail if the session is corrupt or the key is wrong.
    fn reconstruct(
        &self,
        session: &Self::Session,
        pickle_key: &str,
    ) -> Result<SessionView, SessionError>;

    /// Hand a freshly imported record to the store. `forwarded` is always
    /// `true` for records arriving through this codec.
    async fn set_inbound_group_session(
        &self,
        room_id: String,
        session_id: String,
        sender_key: String,
        full_record: SessionRecord,
        forwarded: bool,
        sender_claimed_keys: BTreeMap<String, String>,
    ) -> Result<(), SessionError>;

    /// Whether the store currently has encryption enabled.
    fn encryption_enabled(&self) -> bool;

    /// The identifier used as the pickle key when reconstructing sessions
    /// for export.
    fn user_id(&self) -> String;
}
