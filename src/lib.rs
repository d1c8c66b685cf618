#![allow(clippy::module_inception)]

pub mod cli;
pub mod config;
pub mod content;
pub mod core;
pub mod error;
pub mod provider;
pub mod store;

pub use crate::error::{Category, Error, ErrorKind};
pub type Result<T, E = crate::error::Error> = std::result::Result<T, E>;

pub type Time = chrono::DateTime<chrono::Utc>;

pub use crate::config::Portal;
pub use crate::core::{
    AdminGate, Admission, GateDecision, Identity, Privilege, SessionAuthority, SessionPhase,
    SessionState, Subscription, UserId,
};

pub(crate) mod common {
    pub(crate) type Result<T, E = crate::error::Error> = std::result::Result<T, E>;

    pub(crate) type Error = crate::error::Error;
    pub(crate) type ErrorKind = crate::error::ErrorKind;

    pub use crate::Time;

    pub use tracing::{debug, error, info, trace, warn};
}
