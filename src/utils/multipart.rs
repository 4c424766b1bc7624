use axum::extract::Multipart;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// File part pulled out of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}

/// Describes how text parts of a form are turned into JSON values.
#[derive(Debug, Clone, Copy)]
pub struct FormSpec<'a> {
    pub file_field: &'a str,
    /// Parts whose text is itself JSON (e.g. `car`, `languages`).
    pub json_fields: &'a [&'a str],
    pub bool_fields: &'a [&'a str],
}

#[derive(Debug, Default)]
pub struct FormFields {
    pub fields: Map<String, Value>,
    pub file: Option<UploadedFile>,
}

impl FormFields {
    /// Deserialize the collected text parts into a request schema.
    pub fn into_payload<T: DeserializeOwned>(self) -> Result<(T, Option<UploadedFile>), AppError> {
        let payload = serde_json::from_value(Value::Object(self.fields))
            .map_err(|e| AppError::BadRequest(format!("Invalid form data: {}", e)))?;
        Ok((payload, self.file))
    }
}

pub async fn read_form(mut multipart: Multipart, spec: &FormSpec<'_>) -> Result<FormFields, AppError> {
    let mut form = FormFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };

        if name == spec.file_field {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read uploaded file: {}", e)))?;
            // browsers send an empty part when no file was chosen
            if !bytes.is_empty() {
                form.file = Some(UploadedFile { file_name, content_type, bytes });
            }
            continue;
        }

        let raw = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;
        let value = coerce_field(&name, &raw, spec)?;
        form.fields.insert(name, value);
    }

    Ok(form)
}

/// Converts one text part to a JSON value according to `spec`.
pub fn coerce_field(name: &str, raw: &str, spec: &FormSpec<'_>) -> Result<Value, AppError> {
    if spec.json_fields.contains(&name) {
        return serde_json::from_str(raw).map_err(|_| AppError::invalid_field(name, "Must be valid JSON"));
    }
    if spec.bool_fields.contains(&name) {
        return match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => Ok(Value::Bool(true)),
            "false" | "0" | "off" | "" => Ok(Value::Bool(false)),
            _ => Err(AppError::invalid_field(name, "Must be true or false")),
        };
    }
    Ok(Value::String(raw.to_string()))
}
