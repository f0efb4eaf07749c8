use std::{
    future::Future,
    ops::Deref,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tracing::{debug, error, instrument, warn};

use crate::fs::operations::{read_optional, remove_if_exists, write_atomic};

use super::entities::{OpenSessionEntity, SessionEntity, SessionState};

const SESSIONS_FILE: &str = "sessions.json";
const OPEN_SESSION_FILE: &str = "current_session.json";
const LOCK_FILE: &str = "tapclock.lock";

/// Interface for abstracting storage of sessions.
pub trait SessionStorage {
    /// Reads persisted state. Missing or unreadable entries come back empty, this never fails.
    fn load(&self) -> impl Future<Output = SessionState>;

    /// Persists the whole state. Without an open session its entry is removed.
    fn save(&self, state: &SessionState) -> impl Future<Output = Result<()>>;

    /// Erases everything that was persisted.
    fn clear(&self) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> SessionStorage for T
where
    T::Target: SessionStorage,
{
    fn load(&self) -> impl Future<Output = SessionState> {
        self.deref().load()
    }

    fn save(&self, state: &SessionState) -> impl Future<Output = Result<()>> {
        self.deref().save(state)
    }

    fn clear(&self) -> impl Future<Output = Result<()>> {
        self.deref().clear()
    }
}

/// The main realization of [SessionStorage]. Keeps one pretty printed json file per entry.
pub struct JsonSessionStorage {
    data_dir: PathBuf,
}

impl JsonSessionStorage {
    pub fn new(data_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&data_dir)?;

        Ok(Self { data_dir })
    }

    /// Advisory lock shared between tapclock processes, e.g. `watch` in one terminal and `in` in
    /// another.
    async fn open_lock(&self) -> Result<File, std::io::Error> {
        File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(self.data_dir.join(LOCK_FILE))
            .await
    }

    /// Lock used while loading. Loading goes on without it when it can't be taken.
    async fn try_lock(&self, exclusive: bool) -> Option<File> {
        let lock = match self.open_lock().await {
            Ok(lock) => lock,
            Err(e) => {
                warn!("Loading without a lock: {e}");
                return None;
            }
        };
        let locked = if exclusive {
            lock.lock_exclusive()
        } else {
            lock.lock_shared()
        };
        match locked {
            Ok(_) => Some(lock),
            Err(e) => {
                warn!("Loading without a lock: {e}");
                None
            }
        }
    }

    async fn release(lock: Option<File>) {
        if let Some(lock) = lock {
            if let Err(e) = lock.unlock_async().await {
                warn!("Failed to release storage lock: {e}");
            }
        }
    }

    async fn read_entry<T: DeserializeOwned>(&self, name: &str) -> Entry<T> {
        let path = self.data_dir.join(name);
        let text = match read_optional(&path).await {
            Ok(Some(text)) => text,
            Ok(None) => return Entry::Missing,
            Err(e) => {
                error!("Failed to read {path:?}, treating it as empty: {e}");
                return Entry::Missing;
            }
        };

        match serde_json::from_str::<T>(&text) {
            Ok(v) => Entry::Valid(v),
            Err(e) => {
                warn!("Found illegal json in {path:?}: {e}");
                Entry::Corrupted
            }
        }
    }

    async fn read_entries(&self) -> (Entry<Vec<SessionEntity>>, Entry<OpenSessionEntity>) {
        (
            self.read_entry(SESSIONS_FILE).await,
            self.read_entry(OPEN_SESSION_FILE).await,
        )
    }

    /// Moves a corrupted entry aside so the next save doesn't destroy what's left of it.
    /// Must be called under the exclusive lock.
    async fn quarantine(&self, name: &str) {
        let path = self.data_dir.join(name);
        let corrupted = corrupted_path(&path);
        warn!("Moving corrupted {path:?} to {corrupted:?}");
        if let Err(e) = tokio::fs::rename(&path, &corrupted).await {
            warn!("Failed to move corrupted file {path:?}: {e}");
        }
    }

    async fn save_with_lock(&self, state: &SessionState) -> Result<()> {
        let sessions = serde_json::to_vec_pretty(&state.sessions)?;
        write_atomic(&self.data_dir.join(SESSIONS_FILE), &sessions)
            .await
            .context("Failed to write sessions")?;

        let open_path = self.data_dir.join(OPEN_SESSION_FILE);
        match &state.open {
            Some(open) => {
                let open = serde_json::to_vec_pretty(open)?;
                write_atomic(&open_path, &open)
                    .await
                    .context("Failed to write current session")?;
            }
            None => remove_if_exists(&open_path)
                .await
                .context("Failed to remove current session")?,
        }
        Ok(())
    }

    async fn clear_with_lock(&self) -> Result<()> {
        for name in [SESSIONS_FILE, OPEN_SESSION_FILE] {
            let path = self.data_dir.join(name);
            for path in [corrupted_path(&path), path] {
                remove_if_exists(&path)
                    .await
                    .with_context(|| format!("Failed to remove {path:?}"))?;
            }
        }
        Ok(())
    }
}

enum Entry<T> {
    Missing,
    Valid(T),
    Corrupted,
}

impl<T> Entry<T> {
    fn is_corrupted(&self) -> bool {
        matches!(self, Entry::Corrupted)
    }

    fn into_option(self) -> Option<T> {
        match self {
            Entry::Valid(v) => Some(v),
            Entry::Missing | Entry::Corrupted => None,
        }
    }
}

fn corrupted_path(path: &Path) -> PathBuf {
    let mut corrupted = path.as_os_str().to_owned();
    corrupted.push(".corrupted");
    PathBuf::from(corrupted)
}

impl SessionStorage for JsonSessionStorage {
    #[instrument(skip(self), fields(dir = ?self.data_dir))]
    async fn load(&self) -> SessionState {
        let lock = self.try_lock(false).await;
        let (mut sessions, mut open) = self.read_entries().await;
        Self::release(lock).await;

        if sessions.is_corrupted() || open.is_corrupted() {
            let lock = self.try_lock(true).await;
            // Another process may have replaced or moved the files in between.
            (sessions, open) = self.read_entries().await;
            if sessions.is_corrupted() {
                self.quarantine(SESSIONS_FILE).await;
            }
            if open.is_corrupted() {
                self.quarantine(OPEN_SESSION_FILE).await;
            }
            Self::release(lock).await;
        }

        let sessions = sessions.into_option().unwrap_or_default();
        let mut open = open.into_option();

        // A tap out that died between its two writes leaves the closed session behind as open.
        if let Some(stale) = open
            .as_ref()
            .filter(|open| sessions.iter().any(|s| s.tap_in == open.tap_in))
        {
            warn!(
                "Open session from {} is already finished, ignoring it",
                stale.tap_in
            );
            open = None;
        }

        debug!(
            "Loaded {} sessions, tapped in: {}",
            sessions.len(),
            open.is_some()
        );
        SessionState { sessions, open }
    }

    #[instrument(skip_all, fields(sessions = state.sessions.len(), open = state.open.is_some()))]
    async fn save(&self, state: &SessionState) -> Result<()> {
        // Semi-safe acquire-release for the store
        let lock = self.open_lock().await?;
        lock.lock_exclusive()?;
        let result = self.save_with_lock(state).await;
        lock.unlock_async().await?;
        result
    }

    #[instrument(skip(self), fields(dir = ?self.data_dir))]
    async fn clear(&self) -> Result<()> {
        let lock = self.open_lock().await?;
        lock.lock_exclusive()?;
        let result = self.clear_with_lock().await;
        lock.unlock_async().await?;
        result
    }
}
