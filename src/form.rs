//! Flattened view over a multipart body: text fields plus uploaded files.

use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use bytes::Bytes;
use serde_json::{Map, Value};

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub async fn from_multipart(mut mp: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();
        while let Some(field) = mp.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .map(str::to_string)
                        .unwrap_or_else(|| "application/octet-stream".into());
                    let body = field.bytes().await?;
                    // browsers send an empty part for an untouched file input
                    if file_name.is_empty() && body.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            body,
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }
        Ok(form)
    }

    /// Flat JSON object; scalars become text fields, `null` counts as absent.
    pub fn from_json(object: Map<String, Value>) -> Result<Self, ApiError> {
        let mut form = FormData::default();
        for (name, value) in object {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ApiError::validation(format!(
                        "field `{name}` must be a string or a number"
                    )))
                }
            };
            form.fields.insert(name, text);
        }
        Ok(form)
    }

    /// Text value of `name`; blank values count as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn owned_text(&self, name: &str) -> Option<String> {
        self.text(name).map(str::to_string)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    #[cfg(test)]
    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Body of a partial update: multipart, a JSON object, or nothing at all.
///
/// Decoding errors are held until `into_form` so the caller can run its
/// own checks first.
pub struct PatchForm(Result<FormData, ApiError>);

impl PatchForm {
    pub fn into_form(self) -> Result<FormData, ApiError> {
        self.0
    }
}

#[async_trait]
impl<S> FromRequest<S> for PatchForm
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let form = match Multipart::from_request(req, state).await {
                Ok(mp) => FormData::from_multipart(mp).await,
                Err(rejection) => Err(rejection.into()),
            };
            return Ok(Self(form));
        }

        let body = match Bytes::from_request(req, state).await {
            Ok(body) => body,
            Err(rejection) => return Ok(Self(Err(ApiError::validation(rejection.body_text())))),
        };
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Ok(FormData::default())));
        }
        let form = serde_json::from_slice::<Map<String, Value>>(&body)
            .map_err(|e| ApiError::validation(format!("invalid JSON body: {e}")))
            .and_then(FormData::from_json);
        Ok(Self(form))
    }
}
