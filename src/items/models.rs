// Item documents and request/response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiError;
use crate::validation::validate_not_blank;

/// Body keys the server owns; a client can never set them on create.
const RESERVED_KEYS: [&str; 5] = ["id", "_id", "date_added", "age_years", "updatedAt"];

/// A marketplace item as stored and returned.
///
/// `id` is the application-level decimal id assigned on creation, not the
/// store's own key. Fields the server does not know about are kept in
/// `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_days: Option<i32>,
    /// Always derived from `age_days`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_years: Option<f64>,
    /// Unix epoch seconds
    pub date_added: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Numeric form of `id`, if it is a canonical decimal
    pub fn numeric_id(&self) -> Option<i64> {
        parse_item_id(&self.id)
    }

    /// Overwrites the mutable fields and recomputes the derived ones.
    pub fn apply_update(&mut self, update: UpdateItemRequest, now: DateTime<Utc>) {
        self.category = Some(update.category);
        self.condition = Some(update.condition);
        self.description = Some(update.description);
        self.age_days = Some(update.age_days);
        self.age_years = Some(age_years_from_days(update.age_days));
        self.updated_at = Some(now);
    }
}

/// A submitted item before it has been given an id.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewItem {
    #[validate(custom = "validate_not_blank")]
    pub category: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub condition: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub age_days: Option<i32>,
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewItem {
    /// Builds a draft from submitted fields, dropping the server-owned keys.
    pub fn from_fields(mut fields: Map<String, Value>) -> Result<Self, ApiError> {
        for key in RESERVED_KEYS {
            fields.remove(key);
        }
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| ApiError::BadRequest(format!("Invalid item body: {}", e)))
    }

    /// Finalizes the draft under the assigned id.
    pub fn into_item(self, id: i64, date_added: i64) -> Item {
        Item {
            id: id.to_string(),
            category: self.category,
            condition: self.condition,
            description: self.description,
            age_years: self.age_days.map(age_years_from_days),
            age_days: self.age_days,
            date_added,
            image: self.image,
            updated_at: None,
            extra: self.extra,
        }
    }
}

/// Body of PUT /items/{id}
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateItemRequest {
    #[schema(example = "Living")]
    #[validate(custom = "validate_not_blank")]
    pub category: String,
    #[schema(example = "Like New")]
    #[validate(custom = "validate_not_blank")]
    pub condition: String,
    #[schema(example = 400, minimum = 0)]
    #[validate(range(min = 0))]
    pub age_days: i32,
    #[schema(example = "Two seater sofa, no stains")]
    pub description: String,
}

/// Outcome of PUT /items/{id}
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateItemResponse {
    #[schema(example = "success", pattern = "success|failed")]
    pub uploaded: String,
}

/// Outcome of DELETE /items/{id}
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteItemResponse {
    #[schema(example = "success")]
    pub deleted: String,
}

/// `age_days / 365` rounded to one decimal place
pub fn age_years_from_days(age_days: i32) -> f64 {
    ((age_days as f64 / 365.0) * 10.0).round() / 10.0
}

/// Parses an item id, accepting only canonical positive decimals ("7", not "07").
pub fn parse_item_id(id: &str) -> Option<i64> {
    let parsed: i64 = id.parse().ok()?;
    (parsed > 0 && parsed.to_string() == id).then_some(parsed)
}
