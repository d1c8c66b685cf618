use std::fmt;

use crate::core::{Identity, Privilege};

/// Who is signed in and whether they are an admin, as last observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    pub privilege: Privilege,
    // True between an identity change and the end of its privilege lookup.
    pub resolving: bool,
}

/// Coarse view of a session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unresolved,
    Anonymous,
    AuthenticatedNonAdmin,
    AuthenticatedAdmin,
}

impl SessionState {
    pub(crate) fn unresolved() -> Self {
        Self {
            identity: None,
            privilege: Privilege::Denied,
            resolving: true,
        }
    }

    pub(crate) fn anonymous() -> Self {
        Self {
            identity: None,
            privilege: Privilege::Denied,
            resolving: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn is_admin(&self) -> bool {
        !self.resolving && self.identity.is_some() && self.privilege.is_granted()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.resolving {
            return SessionPhase::Unresolved;
        }
        match self.identity {
            None => SessionPhase::Anonymous,
            Some(_) if self.privilege.is_granted() => SessionPhase::AuthenticatedAdmin,
            Some(_) => SessionPhase::AuthenticatedNonAdmin,
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SessionPhase::Unresolved => "unresolved",
            SessionPhase::Anonymous => "anonymous",
            SessionPhase::AuthenticatedNonAdmin => "authenticated",
            SessionPhase::AuthenticatedAdmin => "admin",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases() {
        assert_eq!(SessionState::unresolved().phase(), SessionPhase::Unresolved);
        assert_eq!(SessionState::anonymous().phase(), SessionPhase::Anonymous);

        let mut state = SessionState {
            identity: Some(Identity::new("uid", "a@x.com")),
            privilege: Privilege::Granted,
            resolving: true,
        };
        assert!(!state.is_admin());
        assert_eq!(state.phase(), SessionPhase::Unresolved);

        state.resolving = false;
        assert!(state.is_admin());
        assert_eq!(state.phase(), SessionPhase::AuthenticatedAdmin);

        state.privilege = Privilege::Undetermined("store down".into());
        assert!(!state.is_admin());
        assert_eq!(state.phase(), SessionPhase::AuthenticatedNonAdmin);
    }
}
