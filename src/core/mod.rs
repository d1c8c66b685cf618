mod config;
pub use self::config::Config;

mod identity;
pub use self::identity::{Identity, UserId};

mod privilege;
pub use self::privilege::{Privilege, PrivilegeRecord};

mod state;
pub use self::state::{SessionPhase, SessionState};

mod observer;
pub use self::observer::Subscription;

mod gate;
pub use self::gate::{AdminGate, Admission, GateDecision};

pub mod validation;

mod session;
pub use self::session::SessionAuthority;
