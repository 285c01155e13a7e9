use serde_json::Value;

use crate::error::FieldError;
use crate::store::{NewTask, TaskPatch, TEXT_REQUIRED};

pub const COMPLETED_NOT_BOOL: &str = "Completed must be a boolean";

/// `POST /api/tasks` body: `{ "text": string }`.
pub fn parse_create(body: &Value) -> Result<NewTask, Vec<FieldError>> {
    match body.get("text").and_then(Value::as_str) {
        Some(text) => Ok(NewTask {
            text: text.to_string(),
        }),
        None => Err(vec![FieldError::new("text", TEXT_REQUIRED)]),
    }
}

/// `PUT /api/tasks/{id}` body: `{ "text"?: string, "completed"?: bool }`.
/// Other fields are ignored, so `owner` and `id` can't be rewritten.
pub fn parse_update(body: &Value) -> Result<TaskPatch, Vec<FieldError>> {
    if !body.is_object() {
        return Err(vec![FieldError::new("body", "Request body must be a JSON object")]);
    }

    let mut errors = Vec::new();
    let mut patch = TaskPatch::default();

    match body.get("text") {
        None | Some(Value::Null) => {}
        Some(Value::String(text)) => patch.text = Some(text.clone()),
        Some(_) => errors.push(FieldError::new("text", TEXT_REQUIRED)),
    }

    match body.get("completed") {
        None | Some(Value::Null) => {}
        Some(Value::Bool(completed)) => patch.completed = Some(*completed),
        Some(_) => errors.push(FieldError::new("completed", COMPLETED_NOT_BOOL)),
    }

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}
