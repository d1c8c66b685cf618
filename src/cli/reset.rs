use clap::Args;

use crate::core::validation::ResetForm;
use crate::{Portal, Result};

/// Request a password reset email
#[derive(Args, Debug)]
pub struct ResetPasswordCommand {
    /// Account email
    #[arg(long)]
    email: String,
}

impl ResetPasswordCommand {
    pub async fn run(self, portal: Portal) -> Result<()> {
        let form = ResetForm { email: self.email };
        form.validate()?;

        portal.session.reset_password(&form.email).await?;

        println!("Password reset email sent to {}", form.email);
        Ok(())
    }
}

/// Set a new password with a reset code
#[derive(Args, Debug)]
pub struct ConfirmResetCommand {
    /// Code from the reset email
    #[arg(long)]
    code: String,
    /// New password
    #[arg(long, env = "CLEANPORTAL_PASSWORD", hide_env_values = true)]
    password: String,
}

impl ConfirmResetCommand {
    pub async fn run(self, portal: Portal) -> Result<()> {
        portal
            .provider()
            .confirm_password_reset(&self.code, &self.password)
            .await?;

        println!("Password updated");
        Ok(())
    }
}
