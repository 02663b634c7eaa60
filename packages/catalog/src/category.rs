use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a category, a millisecond timestamp rendered as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(String);

impl CategoryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CategoryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stored category record.
///
/// The wire form is the stored JSON object, field for field:
/// `{"id", "generalName", "genType", "generalCode", "companyID", "imageUrl"}`.
/// `generalName` is the only operator-entered field; `genType`,
/// `generalCode` and `companyID` are classification constants stamped on at
/// creation. A category without an image stores `imageUrl` as the empty
/// string; in memory that is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Category {
    pub id: CategoryId,
    pub general_name: String,
    pub gen_type: String,
    pub general_code: i64,
    #[serde(rename = "companyID")]
    pub company_id: String,
    #[serde(default, with = "image_url_field")]
    pub image_url: Option<String>,
}

/// `imageUrl` is stored as a string, with the empty string meaning "no
/// image". `None` therefore serializes to `""` and `""` reads back as
/// `None`, so a URL is never empty.
mod image_url_field {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<String>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let url = String::deserialize(deserializer)?;
        Ok(if url.is_empty() { None } else { Some(url) })
    }
}
