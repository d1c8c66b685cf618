use clap::{Args, Subcommand};

use crate::content::{Consultation, ContactMessage, QuoteRequest};
use crate::{Portal, Result};

#[derive(Args, Debug)]
pub struct SubmitCommand {
    #[command(subcommand)]
    form: Form,
}

#[derive(Subcommand, Debug)]
enum Form {
    /// Send a contact message
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// Request a quote
    Quote {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        /// Requested service
        #[arg(long, default_value = "")]
        service: String,
        #[arg(long, default_value = "")]
        message: String,
    },
    /// Book a consultation
    Consultation {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        /// Preferred date, e.g. 2024-05-01
        #[arg(long)]
        date: String,
        /// Preferred time, e.g. 10:30
        #[arg(long)]
        time: String,
    },
}

impl SubmitCommand {
    pub async fn run(self, portal: Portal) -> Result<()> {
        let content = &portal.content;

        let id = match self.form {
            Form::Contact {
                name,
                email,
                message,
            } => {
                content
                    .messages()
                    .submit(ContactMessage {
                        name,
                        email,
                        message,
                    })
                    .await?
            }
            Form::Quote {
                name,
                email,
                phone,
                service,
                message,
            } => {
                content
                    .quotes()
                    .submit(QuoteRequest {
                        name,
                        email,
                        phone,
                        service,
                        message,
                    })
                    .await?
            }
            Form::Consultation {
                name,
                email,
                phone,
                date,
                time,
            } => {
                content
                    .consultations()
                    .submit(Consultation {
                        name,
                        email,
                        phone,
                        date,
                        time,
                    })
                    .await?
            }
        };

        println!("Submitted {}", id);
        Ok(())
    }
}
