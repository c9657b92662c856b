use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier. Compared by equality only.
///
/// The catalog API uses integers today; strings are accepted so the client
/// does not care.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Num(i64),
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Num(n) => write!(f, "{}", n),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<i64>() {
            Ok(n) => EntityId::Num(n),
            Err(_) => EntityId::Text(s.to_string()),
        })
    }
}

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub EntityId);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map($name)
            }
        }

        impl From<i64> for $name {
            fn from(n: i64) -> Self {
                $name(EntityId::Num(n))
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(EntityId::Text(s.to_string()))
            }
        }
    };
}

pub(crate) use id_newtype;

id_newtype!(CategoryId);
id_newtype!(TagId);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub category_id: CategoryId,
}

/// Tag as returned by the API. Older servers omit the owning category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagRecord {
    pub id: TagId,
    pub name: String,
    #[serde(default, alias = "category_id")]
    pub category_id: Option<CategoryId>,
}

impl TagRecord {
    /// Resolve the owner, using `requested` when the server did not echo one.
    pub fn into_tag(self, requested: &CategoryId) -> Tag {
        Tag {
            id: self.id,
            name: self.name,
            category_id: self.category_id.unwrap_or_else(|| requested.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryPayload<'a> {
    pub name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagPayload<'a> {
    pub name: &'a str,
    pub category_id: &'a CategoryId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_accept_numbers_and_strings() {
        let num: CategoryId = serde_json::from_str("7").unwrap();
        assert_eq!(num, CategoryId::from(7));
        let text: CategoryId = serde_json::from_str("\"c-7\"").unwrap();
        assert_eq!(text, CategoryId::from("c-7"));
        assert_ne!(num, text);

        assert_eq!("12".parse::<TagId>().unwrap(), TagId::from(12));
        assert_eq!("abc".parse::<TagId>().unwrap(), TagId::from("abc"));
        assert_eq!(TagId::from(12).to_string(), "12");
    }

    #[test]
    fn test_tag_record_backfills_category() {
        let record: TagRecord = serde_json::from_str(r#"{"id": 10, "name": "Running"}"#).unwrap();
        let tag = record.into_tag(&CategoryId::from(1));
        assert_eq!(tag.category_id, CategoryId::from(1));

        let record: TagRecord =
            serde_json::from_str(r#"{"id": 10, "name": "Running", "categoryId": 3}"#).unwrap();
        assert_eq!(record.into_tag(&CategoryId::from(1)).category_id, CategoryId::from(3));

        let record: TagRecord =
            serde_json::from_str(r#"{"id": 10, "name": "Running", "category_id": 4}"#).unwrap();
        assert_eq!(record.into_tag(&CategoryId::from(1)).category_id, CategoryId::from(4));
    }

    #[test]
    fn test_tag_payload_uses_snake_case() {
        let id = CategoryId::from(2);
        let body = serde_json::to_value(TagPayload {
            name: "Winter",
            category_id: &id,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "name": "Winter", "category_id": 2 }));
    }
}
