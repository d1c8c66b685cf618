//! Auth provider boundary.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::common::Result;
use crate::core::Identity;

mod local;
pub use self::local::LocalAuthProvider;

/// Stream of identity changes. `None` means signed out.
pub type AuthStateReceiver = mpsc::UnboundedReceiver<Option<Identity>>;
pub type AuthStateSender = mpsc::UnboundedSender<Option<Identity>>;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Subscribe to identity changes. Implementations must send the current
    /// identity first, then every change in the order it happens.
    fn auth_state_changes(&self) -> AuthStateReceiver;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;

    /// Create an account and sign it in.
    async fn create_user(&self, email: &str, password: &str) -> Result<Identity>;

    async fn sign_out(&self) -> Result<()>;

    async fn send_password_reset(&self, email: &str) -> Result<()>;
}

/// Fan out of identity changes to every subscribed stream.
#[derive(Default)]
pub(crate) struct AuthStateBroadcast {
    senders: Vec<AuthStateSender>,
}

impl AuthStateBroadcast {
    pub(crate) fn subscribe(&mut self, current: Option<Identity>) -> AuthStateReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive, send cannot fail.
        let _ = tx.send(current);
        self.senders.retain(|sender| !sender.is_closed());
        self.senders.push(tx);
        rx
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }

    pub(crate) fn send(&mut self, identity: Option<Identity>) {
        self.senders
            .retain(|sender| sender.send(identity.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_streams_are_pruned_on_subscribe() {
        let mut broadcast = AuthStateBroadcast::default();
        let first = broadcast.subscribe(None);
        let _second = broadcast.subscribe(None);
        assert_eq!(broadcast.len(), 2);

        drop(first);
        let _third = broadcast.subscribe(None);
        assert_eq!(broadcast.len(), 2);
    }
}
