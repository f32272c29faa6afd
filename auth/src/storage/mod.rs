//! Durable key-value slot holding the persisted session.
//!
//! The context is the only component that touches storage; views go through
//! [`AuthContext`](crate::AuthContext). Writes are last-writer-wins.

pub mod file;
pub mod memory;

pub use self::file::FileStorage;
pub use self::memory::MemoryStorage;

use campus_shared::types::{AuthError, Principal, SessionRecord, StorageError, keys};
use tracing::{debug, error, warn};

pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a key that is not present is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Write both entries of a session record.
///
/// If either write fails the previous entries are put back, so a reader
/// never sees the new principal paired with the old token. When even that
/// fails both entries are removed.
pub fn save_session(storage: &dyn SessionStorage, record: &SessionRecord) -> Result<(), AuthError> {
    let principal_json = serde_json::to_string(&record.principal)
        .map_err(|e| AuthError::CorruptedSession(e.to_string()))?;

    let previous_principal = storage.get(keys::PRINCIPAL)?;
    let previous_token = storage.get(keys::TOKEN)?;

    let written = storage
        .set(keys::PRINCIPAL, &principal_json)
        .and_then(|_| storage.set(keys::TOKEN, &record.token));

    if let Err(e) = written {
        warn!("Session write failed, rolling back: {}", e);
        let restored = put_back(storage, keys::PRINCIPAL, previous_principal.as_deref())
            .and_then(|_| put_back(storage, keys::TOKEN, previous_token.as_deref()));

        if let Err(rollback) = restored {
            error!("Rollback failed, clearing stored session: {}", rollback);
            // best effort; a half-cleared record still loads as corrupted
            let _ = clear_session(storage);
        }
        return Err(e.into());
    }

    debug!("Session persisted: {}", record);
    Ok(())
}

fn put_back(storage: &dyn SessionStorage, key: &str, value: Option<&str>) -> Result<(), StorageError> {
    match value {
        Some(v) => storage.set(key, v),
        None => storage.remove(key),
    }
}

/// Read the persisted record back.
///
/// `Ok(None)` when neither entry exists. A record with only one of its two
/// entries, or a principal that does not parse, is reported as
/// [`AuthError::CorruptedSession`]; token contents are not inspected here.
pub fn load_session(storage: &dyn SessionStorage) -> Result<Option<SessionRecord>, AuthError> {
    let principal_json = storage.get(keys::PRINCIPAL)?;
    let token = storage.get(keys::TOKEN)?;

    match (principal_json, token) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(AuthError::CorruptedSession(
            "principal stored without a token".into(),
        )),
        (None, Some(_)) => Err(AuthError::CorruptedSession(
            "token stored without a principal".into(),
        )),
        (Some(json), Some(token)) => {
            let principal: Principal = serde_json::from_str(&json)
                .map_err(|e| AuthError::CorruptedSession(format!("principal: {}", e)))?;

            if token.trim().is_empty() {
                return Err(AuthError::CorruptedSession("empty token".into()));
            }

            Ok(Some(SessionRecord::new(principal, token)))
        }
    }
}

/// Remove both entries. Attempts the second removal even if the first fails.
pub fn clear_session(storage: &dyn SessionStorage) -> Result<(), StorageError> {
    let principal = storage.remove(keys::PRINCIPAL);
    let token = storage.remove(keys::TOKEN);

    if let Err(e) = &principal {
        warn!("Failed to remove stored principal: {}", e);
    }
    principal?;
    token?;

    debug!("Session record cleared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_shared::types::{PermissionSet, Role};

    fn record() -> SessionRecord {
        SessionRecord::new(
            Principal {
                id: "1".into(),
                name: "Dr. Sarah Johnson".into(),
                email: "admin@university.edu".into(),
                role: Role::Admin,
                permissions: PermissionSet::wildcard(),
                department: "Administration".into(),
                student_id: None,
                year: None,
                title: Some("Registrar".into()),
                last_login: 1_700_000_000,
                switched_from: None,
            },
            "aGVhZGVy.cGF5bG9hZA.c2ln".into(),
        )
    }

    #[test]
    fn save_then_load_restores_identical_record() {
        let storage = MemoryStorage::new();
        save_session(&storage, &record()).unwrap();
        let back = load_session(&storage).unwrap().unwrap();
        assert_eq!(back, record());
    }

    #[test]
    fn empty_storage_loads_none() {
        let storage = MemoryStorage::new();
        assert!(load_session(&storage).unwrap().is_none());
    }

    #[test]
    fn half_written_record_is_corrupted() {
        let storage = MemoryStorage::new();
        storage.set(keys::TOKEN, "a.b.c").unwrap();
        let err = load_session(&storage).unwrap_err();
        assert!(matches!(err, AuthError::CorruptedSession(_)));
    }

    #[test]
    fn unparseable_principal_is_corrupted() {
        let storage = MemoryStorage::new();
        storage.set(keys::PRINCIPAL, "{not json").unwrap();
        storage.set(keys::TOKEN, "a.b.c").unwrap();
        let err = load_session(&storage).unwrap_err();
        assert_eq!(err.to_code(), "CORRUPTED_SESSION");
    }

    #[test]
    fn clear_removes_both_keys() {
        let storage = MemoryStorage::new();
        save_session(&storage, &record()).unwrap();
        clear_session(&storage).unwrap();
        assert!(storage.get(keys::PRINCIPAL).unwrap().is_none());
        assert!(storage.get(keys::TOKEN).unwrap().is_none());
        // idempotent
        clear_session(&storage).unwrap();
    }
}
