use serde_json::json;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::AppError;

/// Validate a payload implementing `validator::Validate`, turning failures into
/// `AppError::Validation` so handlers can `?` it and stop immediately.
pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload
        .validate()
        .map_err(|errors| AppError::Validation(errors_map(&errors)))
}

/// Flattens validator errors into `field -> [messages]`. Nested structs and
/// lists contribute dotted keys such as `service_suburbs.suburbs[0].name`.
pub fn errors_map(errors: &ValidationErrors) -> serde_json::Map<String, serde_json::Value> {
    let mut map = serde_json::Map::new();
    collect(errors, None, &mut map);
    map
}

fn collect(
    errors: &ValidationErrors,
    prefix: Option<&str>,
    map: &mut serde_json::Map<String, serde_json::Value>,
) {
    for (field, kind) in errors.errors() {
        let key = match prefix {
            Some(p) => format!("{}.{}", p, field),
            None => field.to_string(),
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                let msgs: Vec<String> = errs
                    .iter()
                    .map(|e| e.message.clone().unwrap_or_else(|| "Invalid input".into()).to_string())
                    .collect();
                map.insert(key, json!(msgs));
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, Some(&key), map),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect(inner, Some(&format!("{}[{}]", key, index)), map);
                }
            }
        }
    }
}
