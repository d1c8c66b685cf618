use clap::Args;

use crate::core::validation::SignUpForm;
use crate::{Portal, Result};

/// Create an account
#[derive(Args, Debug)]
pub struct SignupCommand {
    /// Account email
    #[arg(long)]
    email: String,
    /// Account password
    #[arg(long, env = "CLEANPORTAL_PASSWORD", hide_env_values = true)]
    password: String,
    /// Password confirmation. Defaults to the password
    #[arg(long)]
    confirm_password: Option<String>,
    /// Display name
    #[arg(long, default_value = "")]
    name: String,
}

impl SignupCommand {
    pub async fn run(self, portal: Portal) -> Result<()> {
        let SignupCommand {
            email,
            password,
            confirm_password,
            name,
        } = self;

        let form = SignUpForm {
            email,
            confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
            password,
            display_name: name,
        };
        form.validate(portal.session.config().min_password_length())?;

        let identity = portal
            .session
            .signup(&form.email, &form.password, &form.display_name)
            .await?;
        let state = portal.session.resolved().await;

        println!("{} ({}) {}", identity.email, identity.id, state.phase());
        Ok(())
    }
}
