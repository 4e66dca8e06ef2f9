use crate::application::task::{AttachmentError, ImageDecodeError, SchemaViolation};
use crate::config::Capability;
use crate::infrastructure::model::XaiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Upstream(#[from] XaiError),
    #[error("unknown model '{model}'")]
    UnknownModel { model: String },
    #[error("model '{model}' does not support {capability}")]
    CapabilityMismatch {
        model: String,
        capability: Capability,
    },
    #[error(transparent)]
    Attachment(#[from] AttachmentError),
    #[error("structured output is not valid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
    #[error("structured output does not match the schema at {path}: {reason}")]
    SchemaValidation { path: String, reason: String },
    #[error(transparent)]
    ImageDecode(#[from] ImageDecodeError),
    #[error("xAI returned an empty response")]
    EmptyResponse,
    #[error("no prompt provided for image generation")]
    MissingPrompt,
}

impl From<SchemaViolation> for AdapterError {
    fn from(violation: SchemaViolation) -> Self {
        Self::SchemaValidation {
            path: violation.path,
            reason: violation.reason,
        }
    }
}

impl AdapterError {
    pub fn capability_mismatch(model: impl Into<String>, capability: Capability) -> Self {
        Self::CapabilityMismatch {
            model: model.into(),
            capability,
        }
    }

    pub fn upstream(&self) -> Option<&XaiError> {
        match self {
            AdapterError::Upstream(err) => Some(err),
            _ => None,
        }
    }

    /// User-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AdapterError::Upstream(err) => err.user_message(),
            AdapterError::UnknownModel { model } => {
                format!("The model \"{model}\" is not known. Pick one of the supported Grok models.")
            }
            AdapterError::CapabilityMismatch { model, capability } => {
                format!("The model \"{model}\" does not support {capability}.")
            }
            AdapterError::Attachment(err) => err.to_string(),
            AdapterError::InvalidJson { .. } => {
                "The AI returned data that is not valid JSON.".to_string()
            }
            AdapterError::SchemaValidation { path, reason } => {
                format!("The AI returned data that does not match the requested structure ({path}: {reason}).")
            }
            AdapterError::ImageDecode(_) => "The generated image could not be decoded.".to_string(),
            AdapterError::EmptyResponse => "The AI returned an empty response.".to_string(),
            AdapterError::MissingPrompt => "No prompt provided for image generation.".to_string(),
        }
    }
}
