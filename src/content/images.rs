use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;

use crate::common::{info, Error, Result};
use crate::core::Admission;
use crate::store::BlobStore;

/// Upload then get url, the sequence every image field goes through.
#[derive(Clone)]
pub struct ImageUploader {
    blobs: Arc<dyn BlobStore>,
}

impl ImageUploader {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Store a single image as `<folder>/<millis>_<file_name>`.
    pub async fn upload(
        &self,
        admission: &Admission,
        folder: &str,
        file_name: &str,
        bytes: Bytes,
    ) -> Result<String> {
        let path = format!("{}/{}_{}", folder, now_millis(), file_name_of(file_name)?);
        self.put(admission, path, bytes).await
    }

    /// Store project gallery images as `<folder>/<millis>_additional_<index>_<file_name>`.
    pub async fn upload_gallery(
        &self,
        admission: &Admission,
        folder: &str,
        files: Vec<(String, Bytes)>,
    ) -> Result<Vec<String>> {
        let millis = now_millis();
        let mut urls = Vec::with_capacity(files.len());
        for (index, (file_name, bytes)) in files.into_iter().enumerate() {
            let path = format!(
                "{}/{}_additional_{}_{}",
                folder,
                millis,
                index,
                file_name_of(&file_name)?
            );
            urls.push(self.put(admission, path, bytes).await?);
        }
        Ok(urls)
    }

    async fn put(&self, admission: &Admission, path: String, bytes: Bytes) -> Result<String> {
        let user = admission.check()?;
        let len = bytes.len();
        self.blobs.upload(&path, bytes).await?;
        let url = self.blobs.download_url(&path).await?;
        info!(%user, %path, bytes=len, "Image uploaded");
        Ok(url)
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// Keep the last path component only, with whitespace replaced.
fn file_name_of(name: &str) -> Result<String> {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.split_whitespace().collect::<Vec<_>>().join("_"))
        .unwrap_or_default();
    if base.is_empty() {
        Err(Error::validation("file_name", "Please choose an image file"))
    } else {
        Ok(base)
    }
}
