//! An in-memory [`SessionStore`] used as the test fixture for the codec's
//! integration tests, shaped after the ad-hoc fixture stores the teacher
//! crate builds in its own test module.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use megolm_key_export::{
    error::SessionError,
    session::{SessionRecord, SessionStore, SessionView},
};

/// A fixture session registered with [`MemoryStore`], modeling the ways a
/// real store's `reconstruct()` can behave: succeed with a usable session,
/// succeed but report the session invalid, or fail outright.
#[derive(Clone)]
pub enum FixtureSession {
    Valid(SessionView),
    Invalid(SessionView),
    Broken,
}

pub struct MemoryStore {
    fixtures: Mutex<Vec<FixtureSession>>,
    imported: Mutex<Vec<SessionRecord>>,
    encryption_enabled: AtomicBool,
    user_id: String,
}

impl MemoryStore {
    pub fn new(user_id: &str) -> Self {
        Self {
            fixtures: Mutex::new(Vec::new()),
            imported: Mutex::new(Vec::new()),
            encryption_enabled: AtomicBool::new(true),
            user_id: user_id.to_owned(),
        }
    }

    pub fn with_session(self, session: FixtureSession) -> Self {
        self.fixtures.lock().unwrap().push(session);
        self
    }

    pub fn set_encryption_enabled(&self, enabled: bool) {
        self.encryption_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn imported_records(&self) -> Vec<SessionRecord> {
        self.imported.lock().unwrap().clone()
    }
}

pub fn session_view(room_id: &str, session_id: &str, session_key: &str) -> SessionView {
    let mut sender_claimed_keys = BTreeMap::new();
    sender_claimed_keys.insert("ed25519".to_owned(), "K".to_owned());

    SessionView {
        is_valid: true,
        room_id: room_id.to_owned(),
        session_id: session_id.to_owned(),
        sender_key: "SK".to_owned(),
        sender_claimed_keys,
        forwarding_curve25519_key_chain: Vec::new(),
        first_known_session_key: session_key.to_owned(),
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    type Session = FixtureSession;

    async fn list_inbound_sessions(&self) -> Vec<FixtureSession> {
        self.fixtures.lock().unwrap().clone()
    }

    fn reconstruct(
        &self,
        session: &FixtureSession,
        _pickle_key: &str,
    ) -> Result<SessionView, SessionError> {
        match session {
            FixtureSession::Valid(view) => Ok(view.clone()),
            FixtureSession::Invalid(view) => {
                let mut view = view.clone();
                view.is_valid = false;
                Ok(view)
            }
            FixtureSession::Broken => {
                Err(SessionError::Reconstruction("could not unpickle session".to_owned()))
            }
        }
    }

    async fn set_inbound_group_session(
        &self,
        _room_id: String,
        _session_id: String,
        _sender_key: String,
        full_record: SessionRecord,
        _forwarded: bool,
        _sender_claimed_keys: BTreeMap<String, String>,
    ) -> Result<(), SessionError> {
        self.imported.lock().unwrap().push(full_record);
        Ok(())
    }

    fn encryption_enabled(&self) -> bool {
        self.encryption_enabled.load(Ordering::SeqCst)
    }

    fn user_id(&self) -> String {
        self.user_id.clone()
    }
}
