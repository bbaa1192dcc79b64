use std::sync::Mutex;

use log::warn;
use uuid::Uuid;

/// One connected actor. A session exists from the moment the transport
/// accepts a connection, whether or not the player ever authenticates —
/// it is not a user, it merely *may* point at one after login.
///
/// Commands receive a session by value, mutate their copy, and write the
/// result back through [`SessionRegistry::replace_or_store`]; nothing
/// relies on aliasing a live entry.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    /// Set on successful login / account creation, never a sentinel.
    pub player_id: Option<Uuid>,
    /// Asks the transport to tear the connection down after delivery.
    pub should_close: bool,
    /// Scratch buffer for multi-step interactions (target-name capture).
    pub current_string: String,
}

impl Session {
    pub fn new() -> Self {
        Session {
            id: Uuid::new_v4(),
            player_id: None,
            should_close: false,
            current_string: String::new(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.player_id.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// One message addressed to one session — the unit of output fan-out.
/// A command execution returns an ordered list of these; the invoker's
/// own response comes first, then fan-out in registry scan order.
#[derive(Debug, Clone)]
pub struct MudResponse {
    pub session: Session,
    pub message: String,
}

impl MudResponse {
    pub fn new(session: Session, message: impl Into<String>) -> Self {
        MudResponse {
            session,
            message: message.into(),
        }
    }
}

/// Process-wide store of live sessions in insertion order.
///
/// The mutex guards only the in-memory list and is never held across an
/// await point or while running caller code: predicates and fan-out
/// scans operate on a snapshot taken under the lock.
pub struct SessionRegistry {
    sessions: Mutex<Vec<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry {
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Overwrite the entry with the same id, or append a new one.
    pub fn replace_or_store(&self, session: Session) {
        let mut sessions = self.sessions.lock().expect("session list mutex poisoned");
        if let Some(existing) = sessions.iter_mut().find(|s| s.id == session.id) {
            *existing = session;
        } else {
            sessions.push(session);
        }
    }

    /// First session (insertion order) matching `predicate`. The
    /// predicate runs against a snapshot, so it may freely call back
    /// into the registry without deadlocking.
    pub fn first_where<P>(&self, predicate: P) -> Option<Session>
    where
        P: FnMut(&Session) -> bool,
    {
        let mut predicate = predicate;
        self.snapshot().into_iter().find(|s| predicate(s))
    }

    /// Remove the entry matching the session's id. A missing entry is
    /// reported but not an error: disconnect races are normal.
    pub fn delete(&self, session: &Session) {
        let mut sessions = self.sessions.lock().expect("session list mutex poisoned");
        match sessions.iter().position(|s| s.id == session.id) {
            Some(index) => {
                sessions.remove(index);
            }
            None => warn!("delete: no session registered with id {}", session.id),
        }
    }

    pub fn count(&self) -> usize {
        self.sessions.lock().expect("session list mutex poisoned").len()
    }

    /// Ordered copy of the live list; the basis for broadcast scans.
    pub fn snapshot(&self) -> Vec<Session> {
        self.sessions.lock().expect("session list mutex poisoned").clone()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_or_store_is_idempotent_per_id() {
        let registry = SessionRegistry::new();
        let mut session = Session::new();
        registry.replace_or_store(session.clone());
        session.current_string = "updated".into();
        registry.replace_or_store(session.clone());

        assert_eq!(registry.count(), 1);
        let stored = registry.first_where(|s| s.id == session.id).unwrap();
        assert_eq!(stored.current_string, "updated");
    }

    #[test]
    fn delete_of_unknown_session_is_a_noop() {
        let registry = SessionRegistry::new();
        registry.replace_or_store(Session::new());
        registry.delete(&Session::new());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn first_where_respects_insertion_order() {
        let registry = SessionRegistry::new();
        let first = Session::new();
        let second = Session::new();
        registry.replace_or_store(first.clone());
        registry.replace_or_store(second.clone());

        let found = registry.first_where(|s| !s.should_close).unwrap();
        assert_eq!(found.id, first.id);
    }
}
