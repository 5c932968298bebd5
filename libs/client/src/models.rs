//! Typed journal records
//!
//! Optional fields left as `None` are not sent, so saving a record only
//! touches the fields it carries. Tags are decoded leniently: a list, JSON
//! text, comma-separated text and `null` are all accepted.

use common::tags;
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// A record type served by the journal API
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection segment in the API paths
    const PATH: &'static str;

    fn id(&self) -> Option<i64>;
    fn title(&self) -> &str;
    /// The main text of the record
    fn description(&self) -> &str;

    fn tags(&self) -> &[String] {
        &[]
    }

    fn category(&self) -> Option<&str> {
        None
    }

    fn status(&self) -> Option<&str> {
        None
    }

    fn priority(&self) -> Option<&str> {
        None
    }
}

fn lenient_tags<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => tags::decode(&text),
        Some(other) => tags::from_value(&other).ok().flatten(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub title: String,
    pub author: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_tags",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
}

impl Entity for Book {
    const PATH: &'static str = "books";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub title: String,
    pub author: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_tags",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Quote {
    const PATH: &'static str = "quotes";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub title: String,
    pub director: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Entity for Movie {
    const PATH: &'static str = "movies";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub title: String,
    pub body: String,
    /// Sent on create when set; the server stamps the entry otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_tags",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_notes: Option<String>,
}

impl Entity for Diary {
    const PATH: &'static str = "diaries";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.body
    }

    fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub category: String,
    pub date: String,
    /// Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: String,
    pub priority: String,
    #[serde(
        default,
        deserialize_with = "lenient_tags",
        skip_serializing_if = "Option::is_none"
    )]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing)]
    pub updated_at: Option<String>,
}

impl Entity for Activity {
    const PATH: &'static str = "activities";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or_default()
    }

    fn category(&self) -> Option<&str> {
        Some(self.category.as_str())
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.as_str())
    }

    fn priority(&self) -> Option<&str> {
        Some(self.priority.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn book_with_tags(tags: Value) -> Book {
        serde_json::from_value(json!({
            "id": 1,
            "userId": 1,
            "title": "Dune",
            "author": "Herbert",
            "description": "desc",
            "tags": tags,
            "status": null
        }))
        .unwrap()
    }

    #[test]
    fn test_tags_decode_leniently() {
        let expected = Some(vec!["a".to_string(), "b".to_string()]);

        assert_eq!(book_with_tags(json!(["a", "b"])).tags, expected);
        assert_eq!(book_with_tags(json!(r#"["a","b"]"#)).tags, expected);
        assert_eq!(book_with_tags(json!("a, b")).tags, expected);
        assert_eq!(book_with_tags(json!(["a", " ", "b "])).tags, expected);
        assert_eq!(book_with_tags(Value::Null).tags, None);
        assert_eq!(book_with_tags(json!("")).tags, None);
    }

    #[test]
    fn test_missing_tags_and_optionals_default() {
        let movie: Movie = serde_json::from_value(json!({
            "id": 4,
            "userId": 2,
            "title": "Alien",
            "director": "Scott",
            "description": "d",
            "releaseYear": 1979
        }))
        .unwrap();

        assert_eq!(movie.release_year, Some(1979));
        assert_eq!(movie.notes, None);
        assert!(movie.tags().is_empty());
    }

    #[test]
    fn test_unset_fields_are_not_sent() {
        let book = Book {
            title: "Dune".into(),
            author: "Herbert".into(),
            description: "desc".into(),
            pages: Some(412),
            created_at: Some("2024-01-01T00:00:00.000Z".into()),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            json!({"title": "Dune", "author": "Herbert", "description": "desc", "pages": 412})
        );
    }

    #[test]
    fn test_diary_sends_its_own_timestamp() {
        let diary = Diary {
            title: "Monday".into(),
            body: "Rain".into(),
            created_at: Some("2024-01-01T08:00:00.000Z".into()),
            ..Default::default()
        };

        let sent = serde_json::to_value(&diary).unwrap();
        assert_eq!(sent["createdAt"], "2024-01-01T08:00:00.000Z");
        assert_eq!(Diary::PATH, "diaries");
        assert_eq!(diary.description(), "Rain");
    }
}
