//! Domain entities for the example resource

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// Publication status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExampleStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

impl ExampleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExampleStatus::Draft => "draft",
            ExampleStatus::Published => "published",
            ExampleStatus::Archived => "archived",
        }
    }
}

impl std::fmt::Display for ExampleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for ExampleStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "draft" => Ok(ExampleStatus::Draft),
            "published" => Ok(ExampleStatus::Published),
            "archived" => Ok(ExampleStatus::Archived),
            other => Err(format!("unknown example status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: ExampleStatus,
    pub is_active: bool,
    pub display_order: i32,
    pub count: i32,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields of a new row; defaults already applied
#[derive(Debug, Clone, PartialEq)]
pub struct NewExample {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: ExampleStatus,
    pub is_active: bool,
    pub display_order: i32,
    pub metadata: Option<serde_json::Value>,
}

impl NewExample {
    pub fn into_example(self, now: DateTime<Utc>) -> Example {
        Example {
            id: self.id,
            title: self.title,
            description: self.description,
            status: self.status,
            is_active: self.is_active,
            display_order: self.display_order,
            count: 0,
            metadata: self.metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExampleChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ExampleStatus>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
    pub metadata: Option<serde_json::Value>,
}

impl ExampleChanges {
    pub fn apply(self, example: &mut Example, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            example.title = title;
        }
        if let Some(description) = self.description {
            example.description = Some(description);
        }
        if let Some(status) = self.status {
            example.status = status;
        }
        if let Some(is_active) = self.is_active {
            example.is_active = is_active;
        }
        if let Some(display_order) = self.display_order {
            example.display_order = display_order;
        }
        if let Some(metadata) = self.metadata {
            example.metadata = Some(metadata);
        }
        example.updated_at = now;
    }
}

/// `example_{unix millis}_{9 random base36 chars}`
pub fn generate_example_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect();
    format!("example_{}_{}", Utc::now().timestamp_millis(), suffix)
}
