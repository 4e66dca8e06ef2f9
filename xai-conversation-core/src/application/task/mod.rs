//! AI-task helpers: structured data requests, attachments, image payloads.

pub mod attachments;
pub mod image;
pub mod schema;

pub use attachments::AttachmentError;
pub use image::{GeneratedImage, ImageDecodeError, ImageMime};
pub use schema::SchemaViolation;

use crate::domain::types::Attachment;
use serde_json::Value;

/// A request for output constrained to a JSON schema
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredTask {
    /// Task name, sent as the schema name
    pub name: String,
    pub instructions: String,
    /// Without a schema the reply text is returned as a JSON string
    pub schema: Option<Value>,
    pub attachments: Vec<Attachment>,
}

impl StructuredTask {
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            schema: None,
            attachments: Vec::new(),
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Schema name accepted by the API: ASCII letters, digits, `_` and `-`
    pub fn schema_name(&self) -> String {
        let name: String = self
            .name
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .take(64)
            .collect();
        if name.is_empty() { "structured_output".to_string() } else { name }
    }
}
