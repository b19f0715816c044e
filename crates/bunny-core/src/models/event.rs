use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use validator::Validate;

use super::media::MediaKind;
use super::upload::CompletedPart;
use crate::error::AppError;

/// Publication status of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Draft,
    Published,
}

impl FromStr for EventStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(EventStatus::Draft),
            "published" => Ok(EventStatus::Published),
            _ => Err(anyhow::anyhow!("Invalid event status: {}", s)),
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            EventStatus::Draft => write!(f, "draft"),
            EventStatus::Published => write!(f, "published"),
        }
    }
}

/// Event form data, everything except the media.
#[derive(Debug, Clone, Validate)]
pub struct EventDetails {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title must be between 1 and 200 characters"
    ))]
    pub title: String,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category_id: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    /// Free-form time of day, e.g. "09:00 - 12:00"
    pub time: Option<String>,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Location must be between 1 and 200 characters"
    ))]
    pub location: String,
    pub status: EventStatus,
    pub featured: bool,
}

impl EventDetails {
    /// Field rules plus the date ordering check.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(AppError::InvalidInput(
                    "End date cannot be before start date".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// One stored gallery item as sent to the event-creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMediaManifestEntry {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub caption: String,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<CompletedPart>>,
}

/// Body of the event-creation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub title: String,
    pub description: String,
    pub category_id: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub location: String,
    pub status: EventStatus,
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_key: Option<String>,
    pub media: Vec<EventMediaManifestEntry>,
}

impl EventPayload {
    pub fn new(
        details: &EventDetails,
        cover_image_key: Option<String>,
        media: Vec<EventMediaManifestEntry>,
    ) -> Self {
        Self {
            title: details.title.clone(),
            description: details.description.clone(),
            category_id: details.category_id.clone(),
            start_date: details.start_date,
            end_date: details.end_date,
            time: details.time.clone(),
            location: details.location.clone(),
            status: details.status,
            featured: details.featured,
            cover_image_key,
            media,
        }
    }
}

/// Event category shown in the category picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventCategory {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Event record returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Field-level validation error reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    #[serde(default, alias = "path", alias = "param")]
    pub field: Option<String>,
    #[serde(alias = "msg")]
    pub message: String,
}

/// Generic error body used by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<FieldError>>,
}

/// Fallback when the event-creation error carries no field errors.
pub const EVENT_CREATION_FALLBACK: &str = "Failed to create event. Please try again.";

impl ApiErrorBody {
    /// Best-effort single message: `message`, then `error`.
    pub fn summary(&self) -> Option<String> {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .filter(|m| !m.trim().is_empty())
    }

    /// Field errors joined into one message, if there are any.
    pub fn field_errors_message(&self) -> Option<String> {
        let errors = self.errors.as_ref().filter(|e| !e.is_empty())?;
        Some(
            errors
                .iter()
                .map(|e| match &e.field {
                    Some(field) if !field.is_empty() => format!("{}: {}", field, e.message),
                    _ => e.message.clone(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> EventDetails {
        EventDetails {
            title: "Sports Day".to_string(),
            description: "Races and games".to_string(),
            category_id: "3".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 5, 12).unwrap(),
            end_date: None,
            time: Some("09:00 - 12:00".to_string()),
            location: "Main playground".to_string(),
            status: EventStatus::Published,
            featured: true,
        }
    }

    #[test]
    fn payload_serializes_camel_case() {
        let entry = EventMediaManifestEntry {
            key: "events/sports-day/clip.mp4".to_string(),
            kind: MediaKind::Video,
            caption: "Relay".to_string(),
            featured: false,
            upload_id: Some("u-1".to_string()),
            parts: Some(vec![CompletedPart {
                part_number: 1,
                etag: "\"abc\"".to_string(),
            }]),
        };
        let payload = EventPayload::new(&details(), Some("events/cover.jpg".to_string()), vec![entry]);
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["categoryId"], "3");
        assert_eq!(json["startDate"], "2026-05-12");
        assert!(json.get("endDate").is_none());
        assert_eq!(json["status"], "published");
        assert_eq!(json["coverImageKey"], "events/cover.jpg");
        assert_eq!(json["media"][0]["type"], "video");
        assert_eq!(json["media"][0]["uploadId"], "u-1");
        assert_eq!(json["media"][0]["parts"][0]["partNumber"], 1);
    }

    #[test]
    fn details_reject_empty_title() {
        let mut d = details();
        d.title = String::new();
        assert!(matches!(d.check(), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn details_reject_end_before_start() {
        let mut d = details();
        d.end_date = NaiveDate::from_ymd_opt(2026, 5, 1);
        let err = d.check().unwrap_err();
        assert!(err.to_string().contains("End date"));
    }

    #[test]
    fn field_errors_are_joined() {
        let body: ApiErrorBody = serde_json::from_value(serde_json::json!({
            "errors": [
                { "field": "title", "message": "Title already used" },
                { "msg": "Location is required" }
            ]
        }))
        .unwrap();
        assert_eq!(
            body.field_errors_message().unwrap(),
            "title: Title already used; Location is required"
        );
    }

    #[test]
    fn category_accepts_numeric_id() {
        let cat: EventCategory =
            serde_json::from_value(serde_json::json!({ "id": 7, "name": "Sports" })).unwrap();
        assert_eq!(cat.id, "7");
    }
}
