use tokio::sync::watch;

use crate::common::{ErrorKind, Result};
use crate::core::{Identity, Privilege, SessionState};

/// What a management screen should do for a given session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Loading,
    SignInRequired,
    // Signed in without a privilege record.
    AccessDenied,
    // Privilege lookup failed. Never admits.
    Undetermined(String),
    Admitted(Identity),
}

/// Proof that the session was admitted by the gate. Management operations
/// that change content require one.
///
/// The admission follows the session it was issued by: once that session no
/// longer reports the same user as an admin, `check` fails.
#[derive(Debug, Clone)]
pub struct Admission {
    identity: Identity,
    session: watch::Receiver<SessionState>,
}

impl Admission {
    pub(crate) fn new(identity: Identity, session: watch::Receiver<SessionState>) -> Self {
        Self { identity, session }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Re-evaluate the gate against the current session state.
    pub fn check(&self) -> Result<&Identity> {
        let current = AdminGate::admit(&self.session.borrow())?;
        if current != self.identity {
            return Err(ErrorKind::Unauthorized(format!(
                "admission was issued to {}",
                self.identity
            ))
            .into());
        }
        Ok(&self.identity)
    }
}

pub struct AdminGate;

impl AdminGate {
    pub fn evaluate(state: &SessionState) -> GateDecision {
        if state.resolving {
            return GateDecision::Loading;
        }
        let identity = match &state.identity {
            Some(identity) => identity,
            None => return GateDecision::SignInRequired,
        };
        match &state.privilege {
            Privilege::Granted => GateDecision::Admitted(identity.clone()),
            Privilege::Denied => GateDecision::AccessDenied,
            Privilege::Undetermined(reason) => GateDecision::Undetermined(reason.clone()),
        }
    }

    /// The admitted identity, or an `Unauthorized` error telling why not.
    pub fn admit(state: &SessionState) -> Result<Identity> {
        let reason = match AdminGate::evaluate(state) {
            GateDecision::Admitted(identity) => return Ok(identity),
            GateDecision::Loading => "session is still resolving".to_owned(),
            GateDecision::SignInRequired => "Please sign in to access the admin panel.".to_owned(),
            GateDecision::AccessDenied => "Admin access required.".to_owned(),
            GateDecision::Undetermined(reason) => {
                format!("could not determine admin access. {}", reason)
            }
        };
        Err(ErrorKind::Unauthorized(reason).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in(privilege: Privilege) -> SessionState {
        SessionState {
            identity: Some(Identity::new("uid", "a@x.com")),
            privilege,
            resolving: false,
        }
    }

    #[test]
    fn decisions() {
        assert_eq!(
            AdminGate::evaluate(&SessionState::unresolved()),
            GateDecision::Loading
        );
        assert_eq!(
            AdminGate::evaluate(&SessionState::anonymous()),
            GateDecision::SignInRequired
        );
        assert_eq!(
            AdminGate::evaluate(&signed_in(Privilege::Denied)),
            GateDecision::AccessDenied
        );
        assert_eq!(
            AdminGate::evaluate(&signed_in(Privilege::Undetermined("down".into()))),
            GateDecision::Undetermined("down".into())
        );

        let identity = AdminGate::admit(&signed_in(Privilege::Granted)).unwrap();
        assert_eq!(identity.email, "a@x.com");
    }

    #[test]
    fn fail_closed() {
        let err = AdminGate::admit(&signed_in(Privilege::Undetermined("down".into()))).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Unauthorized(_)));

        let mut resolving = signed_in(Privilege::Granted);
        resolving.resolving = true;
        assert!(AdminGate::admit(&resolving).is_err());
    }

    #[test]
    fn admission_follows_session() {
        let (tx, rx) = watch::channel(signed_in(Privilege::Granted));
        let admission = Admission::new(Identity::new("uid", "a@x.com"), rx);
        assert!(admission.check().is_ok());

        tx.send_replace(signed_in(Privilege::Undetermined("down".into())));
        assert!(admission.check().is_err());

        tx.send_replace(SessionState {
            identity: Some(Identity::new("other", "b@x.com")),
            privilege: Privilege::Granted,
            resolving: false,
        });
        assert!(admission.check().is_err());

        tx.send_replace(signed_in(Privilege::Granted));
        assert!(admission.check().is_ok());
    }
}
