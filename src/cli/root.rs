use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::cli::{delete, list, reset, signup, status, submit, upload};
use crate::common::debug;
use crate::config::{Backend, Config, Initializer};
use crate::core::validation::SignInForm;
use crate::core::{Admission, Identity};
use crate::{Portal, Result};

/// Cleanportal command
#[derive(Parser, Debug)]
#[command(version, propagate_version = true, subcommand_required = true)]
pub struct PortalCommand {
    /// Portal options
    #[command(flatten)]
    pub options: PortalOptions,
    /// Subcommand
    #[command(subcommand)]
    pub command: Command,
}

/// Portal options
#[derive(Args, Debug)]
pub struct PortalOptions {
    /// Configuration file path. Defaults apply when the file does not exist
    #[arg(
        long,
        short = 'C',
        default_value = "./cleanportal.yaml",
        env = "CLEANPORTAL_CONFIG_PATH",
        global = true
    )]
    pub config: PathBuf,
    /// Storage backend
    #[arg(long, value_enum, env = "CLEANPORTAL_BACKEND", global = true)]
    pub backend: Option<Backend>,
    /// Root directory where the file backend stores its data
    #[arg(long, env = "CLEANPORTAL_DIR", global = true)]
    pub root_dir: Option<PathBuf>,
}

/// Admin credentials
#[derive(Args, Debug)]
pub struct Credentials {
    /// Admin email
    #[arg(long, env = "CLEANPORTAL_EMAIL")]
    pub email: String,
    /// Admin password
    #[arg(long, env = "CLEANPORTAL_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Signup(signup::SignupCommand),
    /// Request a password reset email
    ResetPassword(reset::ResetPasswordCommand),
    /// Set a new password with a reset code
    ConfirmReset(reset::ConfirmResetCommand),
    /// Sign in and show the session state
    Status(status::StatusCommand),
    /// List a collection
    List(list::ListCommand),
    /// Delete a document
    Delete(delete::DeleteCommand),
    /// Submit a public form
    Submit(submit::SubmitCommand),
    /// Upload an image
    Upload(upload::UploadCommand),
}

/// Parse command line args
pub fn parse() -> PortalCommand {
    PortalCommand::parse()
}

impl PortalCommand {
    pub async fn run(self) -> Result<()> {
        let PortalCommand { options, command } = self;
        let portal = options.portal().await?;

        match command {
            Command::Signup(cmd) => cmd.run(portal).await,
            Command::ResetPassword(cmd) => cmd.run(portal).await,
            Command::ConfirmReset(cmd) => cmd.run(portal).await,
            Command::Status(cmd) => cmd.run(portal).await,
            Command::List(cmd) => cmd.run(portal).await,
            Command::Delete(cmd) => cmd.run(portal).await,
            Command::Submit(cmd) => cmd.run(portal).await,
            Command::Upload(cmd) => cmd.run(portal).await,
        }
    }
}

impl PortalOptions {
    /// Load configuration, apply overrides and build the portal.
    pub async fn portal(self) -> Result<Portal> {
        let PortalOptions {
            config,
            backend,
            mut root_dir,
        } = self;

        let mut initializer = if config.exists() {
            Initializer::load_config_file(&config).await?
        } else {
            debug!(path=%config.display(), "Config file not found, using defaults");
            Initializer::from_config(Config::default())
        };

        let mut overrides = Config::default();
        overrides.storage.set_backend(backend);
        overrides.storage.set_root_dir(&mut root_dir);
        initializer.config.override_merge(&mut overrides);

        debug!("{:?}", initializer);

        initializer.init_dir().await?;
        let portal = initializer.build().await?;
        portal.session.resolved().await;

        Ok(portal)
    }
}

impl Credentials {
    /// Validate the form, then sign in.
    pub async fn sign_in(self, portal: &Portal) -> Result<Identity> {
        let form = SignInForm {
            email: self.email,
            password: self.password,
        };
        form.validate()?;

        portal.session.login(&form.email, &form.password).await
    }

    /// Sign in and pass the admin gate.
    pub async fn admit(self, portal: &Portal) -> Result<Admission> {
        self.sign_in(portal).await?;
        portal.session.admission()
    }
}
