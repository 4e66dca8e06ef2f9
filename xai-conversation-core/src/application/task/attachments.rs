use crate::domain::types::Attachment;
use crate::infrastructure::model::adapter::ImageUrls;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("attachment {path} does not exist")]
    NotFound { path: PathBuf },
    #[error("attachment {path} has type {mime_type}, only images are supported")]
    NotImage { path: PathBuf, mime_type: String },
    #[error("failed to read attachment {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Check that every attachment is an image, before anything is read.
pub fn ensure_images<'a>(
    attachments: impl IntoIterator<Item = &'a Attachment>,
) -> Result<(), AttachmentError> {
    for attachment in attachments {
        if !attachment.is_image() {
            return Err(AttachmentError::NotImage {
                path: attachment.path.clone(),
                mime_type: attachment.mime_type.clone(),
            });
        }
    }
    Ok(())
}

/// Read image attachments into `data:` URIs keyed by path.
pub async fn load_image_urls<'a>(
    attachments: impl IntoIterator<Item = &'a Attachment>,
) -> Result<ImageUrls, AttachmentError> {
    let mut urls = ImageUrls::new();
    for attachment in attachments {
        if urls.contains_key(&attachment.path) {
            continue;
        }
        ensure_images([attachment])?;
        let bytes = tokio::fs::read(&attachment.path)
            .await
            .map_err(|source| match source.kind() {
                io::ErrorKind::NotFound => AttachmentError::NotFound {
                    path: attachment.path.clone(),
                },
                _ => AttachmentError::Io {
                    path: attachment.path.clone(),
                    source,
                },
            })?;
        debug!(path = %attachment.path.display(), bytes = bytes.len(), "Attachment loaded");
        let url = format!("data:{};base64,{}", attachment.mime_type, STANDARD.encode(&bytes));
        urls.insert(attachment.path.clone(), url);
    }
    Ok(urls)
}
