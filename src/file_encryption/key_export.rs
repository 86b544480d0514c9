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

use aes_ctr::{
    cipher::{NewStreamCipher, SyncStreamCipher},
    Aes256Ctr,
};
use getrandom::getrandom;
use hmac::{Hmac, Mac, NewMac};
use sha2::Sha256;
use tracing::{debug, info, instrument, warn};

use super::{
    armor,
    envelope::{self, constant_time_eq, IV_SIZE, KEY_SIZE, SALT_SIZE},
    kdf::derive_key,
};
use crate::{
    error::KeyExportError,
    session::{SessionRecord, SessionStore},
};

/// PBKDF2 iteration count used on export. Import accepts whatever value is
/// stored in the envelope, for forward compatibility with files produced at
/// other iteration counts.
const EXPORT_ROUNDS: u32 = 500_000;

/// Collect every exportable session from `store`, encrypt them with
/// `passphrase`, and return the armored export bytes.
#[instrument(skip(store, passphrase))]
pub async fn export<S: SessionStore>(
    store: &S,
    passphrase: &str,
) -> Result<Vec<u8>, KeyExportError> {
    let pickle_key = store.user_id();
    let sessions = store.list_inbound_sessions().await;

    let mut records = Vec::with_capacity(sessions.len());
    for session in &sessions {
        let view = match store.reconstruct(session, &pickle_key) {
            Ok(view) => view,
            Err(error) => {
                warn!(%error, "skipping session that failed to reconstruct");
                continue;
            }
        };

        if !view.is_valid {
            warn!(session_id = %view.session_id, "skipping invalid session");
            continue;
        }

        records.push(SessionRecord {
            algorithm: "m.megolm.v1.aes-sha2".to_owned(),
            room_id: view.room_id,
            session_id: view.session_id,
            sender_key: view.sender_key,
            sender_claimed_keys: view.sender_claimed_keys,
            forwarding_curve25519_key_chain: view.forwarding_curve25519_key_chain,
            session_key: view.first_known_session_key,
        });
    }

    if records.is_empty() {
        return Err(KeyExportError::EmptyExport);
    }

    let mut plaintext = serde_json::to_vec(&records).expect("session records always serialize");

    let mut salt = [0u8; SALT_SIZE];
    let mut iv = [0u8; IV_SIZE];
    getrandom(&mut salt).expect("the OS RNG is available");
    getrandom(&mut iv).expect("the OS RNG is available");

    let derived = derive_key(passphrase.as_bytes(), &salt, EXPORT_ROUNDS, KEY_SIZE * 2)?;
    let (aes_key, hmac_key) = derived.split_at(KEY_SIZE);

    let mut cipher =
        Aes256Ctr::new_var(aes_key, &iv).expect("AES-256-CTR accepts 32-byte keys and 16-byte IVs");
    cipher.apply_keystream(&mut plaintext);

    let envelope = envelope::build(&salt, &iv, EXPORT_ROUNDS, &plaintext, hmac_key);
    let armored = armor::wrap(&envelope);

    info!(records = records.len(), "exported session keys");
    Ok(armored.into_bytes())
}

/// Parse, verify, and decrypt an armored export produced by [`export`],
/// handing every recovered record to `store`. Returns the number of records
/// the store accepted.
#[instrument(skip(store, data, passphrase))]
pub async fn import<S: SessionStore>(
    store: &S,
    data: &[u8],
    passphrase: &str,
) -> Result<usize, KeyExportError> {
    let binary = armor::unwrap(data)?;
    let view = envelope::parse(&binary)?;

    let derived = derive_key(passphrase.as_bytes(), view.salt, view.rounds, KEY_SIZE * 2)?;
    let (aes_key, hmac_key) = derived.split_at(KEY_SIZE);

    let mut hmac = Hmac::<Sha256>::new_varkey(hmac_key).expect("HMAC accepts any key length");
    hmac.update(view.mac_input);
    let computed_mac = hmac.finalize().into_bytes();

    if !constant_time_eq(&computed_mac, view.stored_mac) {
        return Err(KeyExportError::AuthFailure);
    }

    let mut ciphertext = view.ciphertext.to_vec();
    let mut cipher = Aes256Ctr::new_var(aes_key, view.iv)
        .expect("AES-256-CTR accepts 32-byte keys and 16-byte IVs");
    cipher.apply_keystream(&mut ciphertext);

    // A JSON-parse failure here is deliberately mapped to the same error as
    // a MAC mismatch: a malleable CTR ciphertext can't reach this point
    // without the MAC already matching, but collapsing the two keeps no
    // format oracle available to an attacker who can't yet forge MACs.
    let records: Vec<SessionRecord> =
        serde_json::from_slice(&ciphertext).map_err(|_| KeyExportError::AuthFailure)?;

    let mut imported = 0usize;
    for record in records {
        debug!(session_id = %record.session_id, "importing session");

        let result = store
            .set_inbound_group_session(
                record.room_id.clone(),
                record.session_id.clone(),
                record.sender_key.clone(),
                record.clone(),
                true,
                record.sender_claimed_keys.clone(),
            )
            .await;

        match result {
            Ok(()) => imported += 1,
            Err(error) => warn!(%error, session_id = %record.session_id, "store rejected session"),
        }
    }

    if !store.encryption_enabled() {
        return Err(KeyExportError::EncryptionDisabled);
    }

    info!(imported, "imported session keys");
    Ok(imported)
}
