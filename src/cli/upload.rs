use std::path::PathBuf;

use bytes::Bytes;
use clap::Args;

use crate::cli::Credentials;
use crate::{Portal, Result};

/// Upload an image and print its download url
#[derive(Args, Debug)]
pub struct UploadCommand {
    /// Target folder, e.g. projects, team, services, testimonials
    #[arg(long)]
    folder: String,
    /// Image file
    file: PathBuf,
    #[command(flatten)]
    credentials: Credentials,
}

impl UploadCommand {
    pub async fn run(self, portal: Portal) -> Result<()> {
        let UploadCommand {
            folder,
            file,
            credentials,
        } = self;

        let admission = credentials.admit(&portal).await?;

        let bytes = Bytes::from(tokio::fs::read(&file).await?);
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let url = portal
            .content
            .images()
            .upload(&admission, &folder, &file_name, bytes)
            .await?;

        println!("{}", url);
        Ok(())
    }
}
