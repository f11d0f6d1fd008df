//! Where the current session lives between requests (and restarts).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use questline_protocol::{Codec, JsonCodec};

use crate::{Session, StoreError};

/// Durable holder of at most one [`Session`].
///
/// `set` replaces the whole record, so a reader never sees the access
/// token of one exchange next to the refresh token of another.
pub trait SessionStore: Send + Sync + 'static {
    /// The stored session, if any.
    fn get(&self) -> Result<Option<Session>, StoreError>;

    /// Replaces the stored session.
    fn set(&self, session: &Session) -> Result<(), StoreError>;

    /// Removes the stored session. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<S: SessionStore + ?Sized> SessionStore for Arc<S> {
    fn get(&self) -> Result<Option<Session>, StoreError> {
        (**self).get()
    }

    fn set(&self, session: &Session) -> Result<(), StoreError> {
        (**self).set(session)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

// ---------------------------------------------------------------------------
// MemorySessionStore
// ---------------------------------------------------------------------------

/// Keeps the session in process memory only.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn set(&self, session: &Session) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FileSessionStore
// ---------------------------------------------------------------------------

/// Persists the session as one JSON record on disk.
///
/// Writes go to a uniquely named sibling temp file that is then renamed
/// over the record, so a crash mid-write leaves either the old record or
/// the new one. A failed write removes its temp file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    codec: JsonCodec,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            codec: JsonCodec,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let mut name = std::ffi::OsString::from(".");
        name.push(self.path.file_name().unwrap_or_default());
        name.push(format!(".tmp.{}.{nanos}", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<Session>, StoreError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, session: &Session) -> Result<(), StoreError> {
        let bytes = self.codec.encode(session)?;
        let temp = self.temp_path();
        let written = fs::write(&temp, bytes).and_then(|()| fs::rename(&temp, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&temp) {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(
                        error = %cleanup,
                        path = %temp.display(),
                        "temp file left behind"
                    );
                }
            }
            return Err(e.into());
        }
        tracing::debug!(path = %self.path.display(), "session record written");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
