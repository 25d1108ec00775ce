//! Request DTOs for the task API
//!
//! Defines the structure of incoming HTTP request bodies and list queries, and
//! the validated shapes they convert into.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::{FieldErrors, Result, TaskError};
use crate::models::{NewTask, TaskChanges, TaskPriority, TaskStatus};

/// Longest accepted task title, in characters
pub const MAX_TITLE_LENGTH: usize = 255;

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const NULL: &str = "This field may not be null.";
const NOT_A_STRING: &str = "Not a valid string.";

/// Field name for errors about the body as a whole
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Raw JSON body for create and update requests.
///
/// Every field is optional at this layer; `into_new_task`, `into_full_update`
/// and `into_partial_update` decide which ones are required. Read-only fields
/// (`id`, `created_at`, `updated_at`) are ignored if a client sends them.
#[derive(Debug, Clone, Default)]
pub struct TaskPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

impl TaskPayload {
    /// Reads a payload out of a decoded JSON body.
    ///
    /// Wrongly typed fields are reported per field, the same way as failed
    /// validation. A body that is not an object fails as a whole.
    pub fn from_json(body: Value) -> Result<Self> {
        let mut errors = FieldErrors::new();
        let Value::Object(mut fields) = body else {
            errors.add(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected an object, but got {}.",
                    json_type_name(&body)
                ),
            );
            return Err(TaskError::Validation(errors));
        };

        let payload = Self {
            title: text_value(&mut errors, "title", fields.remove("title")),
            description: text_value(&mut errors, "description", fields.remove("description")),
            status: choice_value(&mut errors, "status", fields.remove("status")),
            priority: choice_value(&mut errors, "priority", fields.remove("priority")),
        };
        errors.into_result()?;
        Ok(payload)
    }

    /// Validates a create request. Status and priority fall back to their defaults.
    pub fn into_new_task(self) -> Result<NewTask> {
        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", self.title, Some(MAX_TITLE_LENGTH));
        let description = required_text(&mut errors, "description", self.description, None);
        let status = choice(&mut errors, "status", self.status, TaskStatus::parse);
        let priority = choice(&mut errors, "priority", self.priority, TaskPriority::parse);
        errors.into_result()?;

        Ok(NewTask {
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
            status: status.unwrap_or_default(),
            priority: priority.unwrap_or_default(),
        })
    }

    /// Validates a full (PUT) update.
    pub fn into_full_update(self) -> Result<FullUpdate> {
        let mut errors = FieldErrors::new();
        let title = required_text(&mut errors, "title", self.title, Some(MAX_TITLE_LENGTH));
        let description = required_text(&mut errors, "description", self.description, None);
        let status = choice(&mut errors, "status", self.status, TaskStatus::parse);
        let priority = choice(&mut errors, "priority", self.priority, TaskPriority::parse);
        errors.into_result()?;

        Ok(FullUpdate {
            title: title.unwrap_or_default(),
            description: description.unwrap_or_default(),
            status,
            priority,
        })
    }

    /// Validates a partial (PATCH) update. Only supplied fields are checked.
    pub fn into_partial_update(self) -> Result<PartialUpdate> {
        let mut errors = FieldErrors::new();
        let title = optional_text(&mut errors, "title", self.title, Some(MAX_TITLE_LENGTH));
        let description = optional_text(&mut errors, "description", self.description, None);
        let status = choice(&mut errors, "status", self.status, TaskStatus::parse);
        let priority = choice(&mut errors, "priority", self.priority, TaskPriority::parse);
        errors.into_result()?;

        Ok(PartialUpdate {
            title,
            description,
            status,
            priority,
        })
    }
}

/// Full update: title and description must be supplied.
///
/// Status and priority carry model defaults, so omitting them keeps the
/// stored value rather than failing validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FullUpdate {
    pub title: String,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// Partial update: every field optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// A validated update in one of its two shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdate {
    Full(FullUpdate),
    Partial(PartialUpdate),
}

impl From<TaskUpdate> for TaskChanges {
    fn from(update: TaskUpdate) -> Self {
        match update {
            TaskUpdate::Full(full) => TaskChanges {
                title: Some(full.title),
                description: Some(full.description),
                status: full.status,
                priority: full.priority,
            },
            TaskUpdate::Partial(partial) => TaskChanges {
                title: partial.title,
                description: partial.description,
                status: partial.status,
                priority: partial.priority,
            },
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn text_value(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text),
        Value::Null => {
            errors.add(field, NULL);
            None
        }
        _ => {
            errors.add(field, NOT_A_STRING);
            None
        }
    }
}

/// Strings are checked against the choices later. Any other JSON value can
/// never be a valid choice.
fn choice_value(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text),
        Value::Null => {
            errors.add(field, NULL);
            None
        }
        other => {
            errors.add(field, invalid_choice(&other.to_string()));
            None
        }
    }
}

fn invalid_choice(value: &str) -> String {
    format!("\"{}\" is not a valid choice.", value)
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max_len: Option<usize>,
) -> Option<String> {
    match value {
        None => {
            errors.add(field, REQUIRED);
            None
        }
        Some(v) => optional_text(errors, field, Some(v), max_len),
    }
}

fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max_len: Option<usize>,
) -> Option<String> {
    // Surrounding whitespace is never stored
    let value = value?.trim().to_string();
    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if let Some(max) = max_len {
        if value.chars().count() > max {
            errors.add(
                field,
                format!("Ensure this field has no more than {} characters.", max),
            );
            return None;
        }
    }
    Some(value)
}

fn choice<T>(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    parse: fn(&str) -> Option<T>,
) -> Option<T> {
    let value = value?;
    let parsed = parse(&value);
    if parsed.is_none() {
        errors.add(field, invalid_choice(&value));
    }
    parsed
}

// == List Query ==

/// Exact-match filters for list requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Sort order for list requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TaskOrdering {
    #[default]
    IdAscending,
    IdDescending,
}

/// Parsed list request: page number, filters and ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// 1-based page number
    pub page: usize,
    pub filter: TaskFilter,
    pub ordering: TaskOrdering,
}

impl ListQuery {
    /// Parses raw query pairs. Unrecognised parameters are ignored and empty
    /// filter values mean "no filter".
    pub fn from_pairs(params: &[(String, String)]) -> Result<Self> {
        let mut errors = FieldErrors::new();
        let mut query = ListQuery {
            page: 1,
            filter: TaskFilter::default(),
            ordering: TaskOrdering::default(),
        };

        for (name, value) in params {
            match name.as_str() {
                "page" => {
                    query.page = match value.parse::<usize>() {
                        Ok(page) if page >= 1 => page,
                        _ => return Err(TaskError::InvalidPage(value.clone())),
                    };
                }
                _ if value.is_empty() => {}
                "status" => match TaskStatus::parse(value) {
                    Some(status) => query.filter.status = Some(status),
                    None => errors.add("status", invalid_filter_choice(value)),
                },
                "priority" => match TaskPriority::parse(value) {
                    Some(priority) => query.filter.priority = Some(priority),
                    None => errors.add("priority", invalid_filter_choice(value)),
                },
                "created_at" => match DateTime::parse_from_rfc3339(value) {
                    Ok(ts) => query.filter.created_at = Some(ts.with_timezone(&Utc)),
                    Err(_) => errors.add("created_at", "Enter a valid date/time."),
                },
                "ordering" => match value.as_str() {
                    "id" => query.ordering = TaskOrdering::IdAscending,
                    "-id" => query.ordering = TaskOrdering::IdDescending,
                    _ => errors.add("ordering", invalid_filter_choice(value)),
                },
                _ => {}
            }
        }

        errors.into_result()?;
        Ok(query)
    }
}

fn invalid_filter_choice(value: &str) -> String {
    format!(
        "Select a valid choice. {} is not one of the available choices.",
        value
    )
}
