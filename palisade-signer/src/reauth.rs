//! Recent-authentication tracking for strict signing profiles

use parking_lot::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

/// Default window during which an authentication stays fresh
pub const DEFAULT_REAUTH_VALIDITY: Duration = Duration::from_secs(300);

/// Tracks when the user last authenticated.
///
/// Strict signing profiles demand a fresh authentication before key
/// material is decrypted. The tracker is shared behind the signer, so
/// state lives under a lock.
pub struct ReauthTracker {
    validity: Duration,
    last_auth: RwLock<Option<Instant>>,
}

impl ReauthTracker {
    /// Create a tracker with the default validity window
    pub fn new() -> Self {
        Self::with_validity(DEFAULT_REAUTH_VALIDITY)
    }

    /// Create a tracker with a custom validity window
    pub fn with_validity(validity: Duration) -> Self {
        Self {
            validity,
            last_auth: RwLock::new(None),
        }
    }

    /// Record a successful user authentication
    pub fn record_authentication(&self) {
        *self.last_auth.write() = Some(Instant::now());
        debug!("Authentication recorded");
    }

    /// Whether the last authentication is still inside the validity window
    pub fn is_session_valid(&self) -> bool {
        match *self.last_auth.read() {
            Some(at) => at.elapsed() < self.validity,
            None => false,
        }
    }

    /// Drop the current session, forcing re-authentication
    pub fn clear_session(&self) {
        *self.last_auth.write() = None;
        debug!("Authentication session cleared");
    }
}

impl Default for ReauthTracker {
    fn default() -> Self {
        Self::new()
    }
}
