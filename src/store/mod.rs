//! Activity roster store
//!
//! In-memory catalog of extracurricular activities keyed by activity name.
//! The catalog is seeded once at startup; activities are never created or
//! deleted at runtime, only their participant lists change.

mod seed;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tokio::sync::RwLock;

pub use seed::seed_catalog;

/// A single extracurricular activity.
///
/// `max_participants` is informational only; signup does not enforce it as a
/// capacity limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    pub participants: Vec<String>,
}

/// Roster operation failures, surfaced to clients as 4xx responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    ActivityNotFound,
    AlreadySignedUp { email: String, activity: String },
    NotSignedUp { email: String, activity: String },
}

impl RosterError {
    /// HTTP status code this error maps to
    pub const fn status(&self) -> hyper::StatusCode {
        match self {
            Self::ActivityNotFound => hyper::StatusCode::NOT_FOUND,
            Self::AlreadySignedUp { .. } | Self::NotSignedUp { .. } => {
                hyper::StatusCode::BAD_REQUEST
            }
        }
    }
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActivityNotFound => write!(f, "Activity not found"),
            Self::AlreadySignedUp { email, activity } => {
                write!(f, "{email} is already signed up for {activity}")
            }
            Self::NotSignedUp { email, activity } => {
                write!(f, "{email} is not signed up for {activity}")
            }
        }
    }
}

impl std::error::Error for RosterError {}

/// Shared activity catalog guarded by a single `RwLock`.
///
/// Each mutation holds the write lock across its membership check and the
/// list edit, so concurrent signups for the same activity cannot interleave
/// into duplicate roster entries.
pub struct ActivityStore {
    inner: RwLock<BTreeMap<String, Activity>>,
}

impl ActivityStore {
    pub fn new(catalog: BTreeMap<String, Activity>) -> Self {
        Self {
            inner: RwLock::new(catalog),
        }
    }

    /// Store populated with the built-in seed catalog
    pub fn with_seed() -> Self {
        Self::new(seed::seed_catalog())
    }

    /// Clone of the full catalog, for serialization
    pub async fn snapshot(&self) -> BTreeMap<String, Activity> {
        self.inner.read().await.clone()
    }

    /// Append `email` to the activity's roster.
    ///
    /// Preconditions checked in order: the activity must exist, and the email
    /// must not already be on the roster. An empty email is accepted.
    pub async fn signup(&self, activity: &str, email: &str) -> Result<(), RosterError> {
        let mut catalog = self.inner.write().await;
        let entry = catalog
            .get_mut(activity)
            .ok_or(RosterError::ActivityNotFound)?;

        if entry.participants.iter().any(|p| p == email) {
            return Err(RosterError::AlreadySignedUp {
                email: email.to_string(),
                activity: activity.to_string(),
            });
        }

        entry.participants.push(email.to_string());
        Ok(())
    }

    /// Remove `email` from the activity's roster.
    ///
    /// Preconditions checked in order: the activity must exist, and the email
    /// must currently be on the roster.
    pub async fn unregister(&self, activity: &str, email: &str) -> Result<(), RosterError> {
        let mut catalog = self.inner.write().await;
        let entry = catalog
            .get_mut(activity)
            .ok_or(RosterError::ActivityNotFound)?;

        let Some(pos) = entry.participants.iter().position(|p| p == email) else {
            return Err(RosterError::NotSignedUp {
                email: email.to_string(),
                activity: activity.to_string(),
            });
        };

        entry.participants.remove(pos);
        Ok(())
    }

    /// Replace the catalog with a known state (test fixtures)
    pub async fn reset(&self, catalog: BTreeMap<String, Activity>) {
        *self.inner.write().await = catalog;
    }
}
