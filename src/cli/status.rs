use clap::Args;

use crate::cli::Credentials;
use crate::core::{AdminGate, GateDecision};
use crate::{Portal, Result};

/// Sign in and show the session state
#[derive(Args, Debug)]
pub struct StatusCommand {
    #[command(flatten)]
    credentials: Credentials,
}

impl StatusCommand {
    pub async fn run(self, portal: Portal) -> Result<()> {
        let identity = self.credentials.sign_in(&portal).await?;
        let state = portal.session.resolved().await;

        let gate = match AdminGate::evaluate(&state) {
            GateDecision::Loading => "loading".to_owned(),
            GateDecision::SignInRequired => "sign in required".to_owned(),
            GateDecision::AccessDenied => "admin access required".to_owned(),
            GateDecision::Undetermined(reason) => format!("undetermined ({})", reason),
            GateDecision::Admitted(_) => "admitted".to_owned(),
        };
        println!("user:  {} ({})", identity.email, identity.id);
        println!("phase: {}", state.phase());
        println!("gate:  {}", gate);

        Ok(())
    }
}
