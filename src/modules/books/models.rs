use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A book held by the store.
///
/// Fields other than `id` are stored exactly as received, whatever their
/// JSON type; a field missing from the request stays absent and is omitted
/// from the JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "title": "1984",
    "author": "Ally Carter",
    "publishedDate": "1990-05-06",
    "summary": "A look into the life in 1984"
}))]
pub struct Book {
    /// The auto generated id of the book
    #[schema(required = false)]
    pub id: u64,
    /// The title of the book
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = String, required = true)]
    pub title: Option<Value>,
    /// The author of the book
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = String, required = true)]
    pub author: Option<Value>,
    /// The date the book was published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = String, format = Date, required = true)]
    pub published_date: Option<Value>,
    /// The summary of the book
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = String, required = true)]
    pub summary: Option<Value>,
}

impl Book {
    /// Build a record from a request payload under the given id.
    pub fn from_payload(id: u64, payload: BookPayload) -> Self {
        Self {
            id,
            title: payload.title,
            author: payload.author,
            published_date: payload.published_date,
            summary: payload.summary,
        }
    }

    /// Overwrite every field except `id`, including with absent values.
    pub fn replace_with(&mut self, payload: BookPayload) {
        self.title = payload.title;
        self.author = payload.author;
        self.published_date = payload.published_date;
        self.summary = payload.summary;
    }
}

/// Request body for creating or replacing a book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    /// The title of the book
    #[schema(value_type = String, required = true)]
    pub title: Option<Value>,
    /// The author of the book
    #[schema(value_type = String, required = true)]
    pub author: Option<Value>,
    /// The date the book was published.
    #[schema(value_type = String, format = Date, required = true)]
    pub published_date: Option<Value>,
    /// The summary of the book
    #[schema(value_type = String, required = true)]
    pub summary: Option<Value>,
}

/// The record every seeded store starts with.
pub fn sample_book() -> Book {
    Book {
        id: 1,
        title: Some(Value::from("1984")),
        author: Some(Value::from("Ally Carter")),
        published_date: Some(Value::from("1990-05-06")),
        summary: Some(Value::from("A look into the life in 1984")),
    }
}
