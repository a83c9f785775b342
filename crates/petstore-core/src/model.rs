//! Pet records and the values embedded in them.
//!
//! All types serialize with the camelCase field names of the public HTTP API
//! (`photoUrls`), and `Status` always travels as its lowercase label.

use crate::CatalogError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sale state of a pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Available,
    Pending,
    Sold,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::Available, Status::Pending, Status::Sold];

    /// The canonical external form.
    pub fn label(self) -> &'static str {
        match self {
            Status::Available => "available",
            Status::Pending => "pending",
            Status::Sold => "sold",
        }
    }

    /// Lenient conversion: anything that is not an exact label is "no status".
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_label(s)
            .ok_or_else(|| CatalogError::InvalidArgument(format!("unknown status '{s}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

impl Category {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

impl Tag {
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_owned(),
        }
    }
}

/// A catalog entry.
///
/// `id` is `None` only for pets that have not been stored yet; the catalog
/// service assigns one on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub category: Option<Category>,
    pub name: String,
    pub photo_urls: Vec<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: Option<Status>,
}

impl Pet {
    pub fn new(name: &str) -> Self {
        Self {
            id: None,
            category: None,
            name: name.to_owned(),
            photo_urls: Vec::new(),
            tags: Vec::new(),
            status: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn with_photo_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.photo_urls = urls.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Check the field constraints a request body must satisfy.
    ///
    /// `photo_urls` presence is enforced by deserialization. An id, when
    /// present, must be addressable as a path id and so cannot be negative.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if let Some(id) = self.id.filter(|id| *id < 0) {
            return Err(CatalogError::InvalidArgument(format!("id {id} is invalid")));
        }
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidArgument(
                "pet name must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Overwrite every field of `self` with the corresponding field of `other`.
    pub fn overwrite_from(&mut self, other: Pet) {
        self.id = other.id;
        self.name = other.name;
        self.category = other.category;
        self.photo_urls = other.photo_urls;
        self.tags = other.tags;
        self.status = other.status;
    }

    pub fn status_label(&self) -> Option<&'static str> {
        self.status.map(Status::label)
    }
}

/// JSON body the HTTP API sends with every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub code: u16,
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ApiResponse {
    pub fn new(code: u16, kind: &str, message: impl Into<String>) -> Self {
        Self {
            code,
            kind: kind.to_owned(),
            message: message.into(),
        }
    }
}

fn lenient_status<'de, D>(deserializer: D) -> Result<Option<Status>, D::Error>
where
    D: Deserializer<'de>,
{
    // Anything other than a known label, including non-string JSON, is no status.
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(Status::from_label))
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
