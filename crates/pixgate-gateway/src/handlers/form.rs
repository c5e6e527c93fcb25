//! Collecting file parts out of a multipart body

use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;

use crate::error::GatewayError;
use crate::services::IncomingFile;

/// File parts of a multipart form, in the order they arrived.
///
/// Parts without a `filename` are plain form fields and are ignored.
#[derive(Debug, Default)]
pub struct FormFiles {
    parts: Vec<(String, IncomingFile)>,
}

impl FormFiles {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, GatewayError> {
        let mut files = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| form_error(e, "Malformed multipart body"))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            let Some(filename) = field.file_name().map(str::to_string) else {
                continue;
            };
            let content_type = field.content_type().map(str::to_string);

            let data = field
                .bytes()
                .await
                .map_err(|e| form_error(e, &format!("Failed to read file '{}'", filename)))?;

            files.push(name, IncomingFile::new(filename, content_type, data));
        }

        Ok(files)
    }

    pub fn push(&mut self, field: impl Into<String>, file: IncomingFile) {
        self.parts.push((field.into(), file));
    }

    /// Remove and return the first file under the highest-priority field
    /// name present in `fields`
    pub fn take_first_of(&mut self, fields: &[&str]) -> Option<IncomingFile> {
        let index = fields
            .iter()
            .find_map(|wanted| self.parts.iter().position(|(name, _)| name == wanted))?;
        Some(self.parts.remove(index).1)
    }

    /// Remove and return every file under `field`, keeping their order
    pub fn take_all(&mut self, field: &str) -> Vec<IncomingFile> {
        let (taken, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.parts)
            .into_iter()
            .partition(|(name, _)| name == field);
        self.parts = rest;
        taken.into_iter().map(|(_, file)| file).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Body-limit overflows surface as `PayloadTooLarge`, everything else as a
/// validation error
fn form_error(err: MultipartError, context: &str) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge("Request body exceeds the upload size limit".to_string())
    } else {
        GatewayError::Validation(format!("{}: {}", context, err))
    }
}
