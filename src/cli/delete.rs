use clap::Args;

use crate::cli::list::CollectionArg;
use crate::cli::Credentials;
use crate::content::{
    Collection, Consultation, ContactMessage, Entity, Project, QuoteRequest, Service, TeamMember,
    Testimonial,
};
use crate::core::Admission;
use crate::{Portal, Result};

/// Delete a document
#[derive(Args, Debug)]
pub struct DeleteCommand {
    /// Collection
    #[arg(value_enum)]
    collection: CollectionArg,
    /// Document id
    id: String,
    #[command(flatten)]
    credentials: Credentials,
}

impl DeleteCommand {
    pub async fn run(self, portal: Portal) -> Result<()> {
        let DeleteCommand {
            collection,
            id,
            credentials,
        } = self;

        let admission = credentials.admit(&portal).await?;
        let content = &portal.content;

        match collection {
            CollectionArg::Projects => remove::<Project>(content.projects(), &admission, &id).await,
            CollectionArg::Team => remove::<TeamMember>(content.team(), &admission, &id).await,
            CollectionArg::Services => remove::<Service>(content.services(), &admission, &id).await,
            CollectionArg::Testimonials => {
                remove::<Testimonial>(content.testimonials(), &admission, &id).await
            }
            CollectionArg::Consultations => {
                remove::<Consultation>(content.consultations(), &admission, &id).await
            }
            CollectionArg::Quotes => remove::<QuoteRequest>(content.quotes(), &admission, &id).await,
            CollectionArg::Messages => {
                remove::<ContactMessage>(content.messages(), &admission, &id).await
            }
        }
    }
}

async fn remove<T: Entity>(collection: Collection<T>, admission: &Admission, id: &str) -> Result<()> {
    // The store ignores missing ids on delete.
    collection.get(id, Some(admission)).await?;
    collection.delete(admission, id).await?;
    println!("Deleted {}/{}", T::COLLECTION, id);
    Ok(())
}
