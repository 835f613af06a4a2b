//! Session manager for all known end devices
//!
//! Each session sits behind its own `Mutex`: every tracker operation and
//! admission query for one device is totally ordered by that lock, while
//! devices stay independent of each other.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::info;

use lwns_shared::{limits, DevEui};

use super::record::{DeviceSession, SessionSnapshot};

/// Shared handle to one device's session
pub type SessionHandle = Arc<Mutex<DeviceSession>>;

/// Manages the per-device session records
pub struct SessionManager {
    /// Map of DevEUI -> session
    sessions: Arc<RwLock<HashMap<DevEui, SessionHandle>>>,
    idle_timeout: Duration,
}

impl SessionManager {
    /// Create a session manager with the default idle timeout
    pub fn new() -> Self {
        Self::with_idle_timeout(Duration::from_millis(limits::SESSION_IDLE_TIMEOUT_MS))
    }

    /// Create a session manager reaping sessions idle longer than `idle_timeout`
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Get the session for a device, creating it on first observation
    pub async fn get_or_create(&self, dev_eui: DevEui) -> SessionHandle {
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(&dev_eui) {
                return handle.clone();
            }
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(dev_eui)
            .or_insert_with(|| {
                info!("New device session: {}", dev_eui);
                Arc::new(Mutex::new(DeviceSession::new(dev_eui)))
            })
            .clone()
    }

    /// Get the session for a device, if one exists
    pub async fn get(&self, dev_eui: &DevEui) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        sessions.get(dev_eui).cloned()
    }

    /// End a device session, dropping its sticky state
    pub async fn end_session(&self, dev_eui: &DevEui) -> bool {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(dev_eui).is_some();
        if removed {
            info!("Ended device session: {}", dev_eui);
        }
        removed
    }

    /// DevEUIs of all known devices
    pub async fn known_devices(&self) -> Vec<DevEui> {
        let sessions = self.sessions.read().await;
        sessions.keys().copied().collect()
    }

    /// Number of known devices
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Remove sessions idle past the timeout, returning their DevEUIs
    pub async fn reap_idle_sessions(&self) -> Vec<DevEui> {
        let mut idle = Vec::new();
        {
            let sessions = self.sessions.read().await;
            for (dev_eui, handle) in sessions.iter() {
                if handle.lock().await.idle_for() > self.idle_timeout {
                    idle.push(*dev_eui);
                }
            }
        }

        if !idle.is_empty() {
            let mut sessions = self.sessions.write().await;
            for dev_eui in &idle {
                sessions.remove(dev_eui);
                info!("Reaped idle device session: {}", dev_eui);
            }
        }

        idle
    }

    /// Snapshot every session for persistence
    pub async fn snapshot_all(&self) -> Vec<SessionSnapshot> {
        let sessions = self.sessions.read().await;
        let mut snapshots = Vec::with_capacity(sessions.len());
        for handle in sessions.values() {
            snapshots.push(handle.lock().await.snapshot());
        }
        snapshots
    }

    /// Restore sessions from persisted snapshots, replacing any existing
    /// entries for the same devices
    pub async fn restore_all(&self, snapshots: Vec<SessionSnapshot>) {
        let mut sessions = self.sessions.write().await;
        for snapshot in snapshots {
            let dev_eui = snapshot.dev_eui;
            let session = DeviceSession::restore(snapshot);
            sessions.insert(dev_eui, Arc::new(Mutex::new(session)));
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
