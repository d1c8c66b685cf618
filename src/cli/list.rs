use clap::{Args, ValueEnum};

use crate::cli::Credentials;
use crate::content::{Collection, Entity};
use crate::core::Admission;
use crate::{Portal, Result};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionArg {
    Projects,
    Team,
    Services,
    Testimonials,
    Consultations,
    Quotes,
    Messages,
}

/// List a collection, newest first, one json document per line
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Collection
    #[arg(value_enum)]
    collection: CollectionArg,
    /// Admin email. Required for consultations, quotes and messages
    #[arg(long, env = "CLEANPORTAL_EMAIL")]
    email: Option<String>,
    /// Admin password
    #[arg(long, env = "CLEANPORTAL_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl ListCommand {
    pub async fn run(self, portal: Portal) -> Result<()> {
        let ListCommand {
            collection,
            email,
            password,
        } = self;

        let admission = match (email, password) {
            (Some(email), Some(password)) => {
                Some(Credentials { email, password }.admit(&portal).await?)
            }
            _ => None,
        };
        let viewer = admission.as_ref();
        let content = &portal.content;

        match collection {
            CollectionArg::Projects => print(content.projects(), viewer).await,
            CollectionArg::Team => print(content.team(), viewer).await,
            CollectionArg::Services => print(content.services(), viewer).await,
            CollectionArg::Testimonials => print(content.testimonials(), viewer).await,
            CollectionArg::Consultations => print(content.consultations(), viewer).await,
            CollectionArg::Quotes => print(content.quotes(), viewer).await,
            CollectionArg::Messages => print(content.messages(), viewer).await,
        }
    }
}

async fn print<T: Entity>(collection: Collection<T>, viewer: Option<&Admission>) -> Result<()> {
    for record in collection.list(viewer).await? {
        println!("{}", serde_json::to_string(&record)?);
    }
    Ok(())
}
