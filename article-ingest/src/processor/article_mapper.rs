//! Article mapper implementation.
//!
//! Transforms a decoded Pixiv novel payload into the relational record and the
//! search document for the same article.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use article_ingest_shared::{
    estimated_read_time, ArticleDocument, ArticleRecord, AuthorInfo, InteractionMetrics, Platform,
};

use crate::errors::{ExtractionError, IngestError};
use crate::processor::extract::{extract_int, extract_string, extract_tags};

/// Key of the object that wraps the novel entry.
pub const NOVEL_CONTAINER_KEY: &str = "novel";

/// The two projections built from one payload.
#[derive(Debug, Clone)]
pub struct MappedArticle {
    pub record: ArticleRecord,
    pub document: ArticleDocument,
}

/// Mapper that turns novel payloads into articles.
///
/// The mapper is stateless and pure apart from stamping `indexed_at` on the
/// document.
#[derive(Debug, Default, Clone)]
pub struct ArticleMapper {}

impl ArticleMapper {
    /// Create a new article mapper.
    pub fn new() -> Self {
        Self {}
    }

    /// Decode raw message bytes into a JSON tree.
    pub fn decode(&self, payload: &[u8]) -> Result<Value, IngestError> {
        if payload.is_empty() {
            return Err(IngestError::decode("empty payload"));
        }
        Ok(serde_json::from_slice(payload)?)
    }

    /// Map a decoded payload into a record and a document.
    ///
    /// The payload must be `{"novel": {"<key>": {...}}}` with exactly one entry.
    /// Every field inside the entry is optional.
    ///
    /// # Returns
    ///
    /// * `Ok(MappedArticle)` - Both projections, sharing title, content, counts and tags
    /// * `Err(ExtractionError)` - If the container shape is wrong
    #[instrument(skip(self, payload))]
    pub fn map_payload(&self, payload: &Value) -> Result<MappedArticle, ExtractionError> {
        let (key, entry) = Self::single_entry(payload)?;

        let tags = extract_tags(&Value::Object(entry.clone()));

        let record = Self::build_record(entry, tags.as_deref());
        let document = Self::build_document(key, entry, tags.unwrap_or_default());

        debug!(
            article_id = %document.article_id,
            title = %record.title,
            tag_count = document.tags.len(),
            "Mapped novel payload"
        );

        Ok(MappedArticle { record, document })
    }

    fn single_entry(payload: &Value) -> Result<(&String, &Map<String, Value>), ExtractionError> {
        let container = payload
            .get(NOVEL_CONTAINER_KEY)
            .and_then(Value::as_object)
            .ok_or(ExtractionError::MissingContainer)?;

        let mut entries = container.iter();
        let (key, entry) = match (entries.next(), container.len()) {
            (None, _) => return Err(ExtractionError::EmptyContainer),
            (Some(first), 1) => first,
            (Some(_), n) => return Err(ExtractionError::MultipleEntries(n)),
        };

        let entry = entry
            .as_object()
            .ok_or_else(|| ExtractionError::EntryNotObject(key.clone()))?;

        Ok((key, entry))
    }

    fn build_record(entry: &Map<String, Value>, tags: Option<&[String]>) -> ArticleRecord {
        let mut record = ArticleRecord::new(Platform::Pixiv);
        record.title = Self::string_field(entry, "title");
        record.author = Self::string_field(entry, "userName");
        record.summary = Self::string_field(entry, "description");
        record.content = Self::string_field(entry, "content");
        record.word_count = Self::int_field(entry, "wordCount");
        record.is_completed = false;
        record.kudos_count = Self::int_field(entry, "likeCount");
        record.comment_count = Self::int_field(entry, "commentCount");
        record.language = Self::string_field(entry, "language");
        record.tags = tags
            .and_then(|tags| serde_json::to_string(tags).ok())
            .unwrap_or_default();
        record
    }

    fn build_document(key: &str, entry: &Map<String, Value>, tags: Vec<String>) -> ArticleDocument {
        let mut article_id = Self::string_field(entry, "id");
        if article_id.is_empty() {
            article_id = key.to_string();
        }

        let author = AuthorInfo::new(
            Self::string_field(entry, "userName"),
            &Self::string_field(entry, "userId"),
        );
        let likes = Self::int_field(entry, "likeCount");

        let mut document =
            ArticleDocument::new(article_id, Self::string_field(entry, "title"), author);
        document.cover_image = Self::string_field(entry, "coverUrl");
        document.content = Self::string_field(entry, "content");
        document.word_count = Self::int_field(entry, "wordCount");
        document.language = Self::string_field(entry, "language");
        document.likes = likes;
        document.comments_count = Self::int_field(entry, "commentCount");
        document.tags = tags;
        document.published_at = Self::string_field(entry, "uploadDate");
        document.estimated_read_time = estimated_read_time(Self::int_field(entry, "readingTime"));
        document.interaction = InteractionMetrics {
            reaction_count: 0,
            likes_count: likes,
            views_count: Self::int_field(entry, "viewCount"),
        };
        document
    }

    fn string_field(entry: &Map<String, Value>, key: &str) -> String {
        entry.get(key).map(extract_string).unwrap_or_default()
    }

    fn int_field(entry: &Map<String, Value>, key: &str) -> i64 {
        entry.get(key).map(extract_int).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "novel": {
                "12345": {
                    "id": "12345",
                    "title": "T",
                    "userName": "A",
                    "userId": "777",
                    "description": "D",
                    "content": "C",
                    "coverUrl": "https://i.pximg.net/c/cover.jpg",
                    "wordCount": 100,
                    "likeCount": 5,
                    "commentCount": 2,
                    "viewCount": 40,
                    "readingTime": 185,
                    "language": "ja",
                    "uploadDate": "2024-03-01T10:00:00+00:00",
                    "tags": {"tags": [{"tag": "romance"}, {"tag": "fantasy"}]}
                }
            }
        })
    }

    #[test]
    fn test_map_full_payload() {
        let mapped = ArticleMapper::new().map_payload(&full_payload()).unwrap();
        let record = &mapped.record;
        let document = &mapped.document;

        assert_eq!(record.id, None);
        assert_eq!(record.title, "T");
        assert_eq!(record.author, "A");
        assert_eq!(record.platform, Platform::Pixiv);
        assert_eq!(record.summary, "D");
        assert_eq!(record.content, "C");
        assert_eq!(record.word_count, 100);
        assert!(!record.is_completed);
        assert_eq!(record.kudos_count, 5);
        assert_eq!(record.comment_count, 2);
        assert_eq!(record.language, "ja");
        assert_eq!(record.tags, r#"["romance","fantasy"]"#);

        assert_eq!(document.article_id, "12345");
        assert_eq!(document.author.name, "A");
        assert_eq!(document.author.profile_url, "https://www.pixiv.net/users/777");
        assert_eq!(document.author.status, "active");
        assert_eq!(document.cover_image, "https://i.pximg.net/c/cover.jpg");
        assert_eq!(document.status, "completed");
        assert!(document.chapters.is_empty());
        assert!(document.comments.is_empty());
        assert_eq!(document.published_at, "2024-03-01T10:00:00+00:00");
        assert_eq!(document.estimated_read_time, "3分");
        assert_eq!(document.interaction.reaction_count, 0);
        assert_eq!(document.interaction.likes_count, 5);
        assert_eq!(document.interaction.views_count, 40);
    }

    #[test]
    fn test_shared_values_agree() {
        let mapped = ArticleMapper::new().map_payload(&full_payload()).unwrap();
        let record = &mapped.record;
        let document = &mapped.document;

        assert_eq!(record.title, document.title);
        assert_eq!(record.content, document.content);
        assert_eq!(record.word_count, document.word_count);
        assert_eq!(record.kudos_count, document.likes);
        assert_eq!(record.comment_count, document.comments_count);
        assert_eq!(record.language, document.language);

        let record_tags: Vec<String> = serde_json::from_str(&record.tags).unwrap();
        assert_eq!(record_tags, document.tags);
    }

    #[test]
    fn test_sparse_entry_uses_defaults() {
        let payload = json!({"novel": {"99": {}}});
        let mapped = ArticleMapper::new().map_payload(&payload).unwrap();

        assert_eq!(mapped.record.title, "");
        assert_eq!(mapped.record.word_count, 0);
        assert_eq!(mapped.record.tags, "");
        assert_eq!(mapped.document.article_id, "99");
        assert!(mapped.document.tags.is_empty());
        assert_eq!(mapped.document.estimated_read_time, "0分");
        assert_eq!(mapped.document.author.profile_url, "https://www.pixiv.net/users/");
    }

    #[test]
    fn test_mistyped_fields_use_defaults() {
        let payload = json!({
            "novel": {
                "1": {"title": 5, "wordCount": "100", "likeCount": 3.7, "tags": {"tags": "x"}}
            }
        });
        let mapped = ArticleMapper::new().map_payload(&payload).unwrap();

        assert_eq!(mapped.record.title, "");
        assert_eq!(mapped.record.word_count, 0);
        assert_eq!(mapped.record.kudos_count, 3);
        assert_eq!(mapped.record.tags, "");
    }

    #[test]
    fn test_empty_tag_list_serializes_as_empty_array() {
        let payload = json!({"novel": {"1": {"tags": {"tags": []}}}});
        let mapped = ArticleMapper::new().map_payload(&payload).unwrap();

        assert_eq!(mapped.record.tags, "[]");
        assert!(mapped.document.tags.is_empty());
    }

    #[test]
    fn test_missing_container() {
        let mapper = ArticleMapper::new();

        for payload in [
            json!({}),
            json!({"illust": {"1": {}}}),
            json!({"novel": "12345"}),
            json!({"novel": [{"title": "T"}]}),
            json!([1, 2]),
            Value::Null,
        ] {
            assert_eq!(
                mapper.map_payload(&payload).unwrap_err(),
                ExtractionError::MissingContainer
            );
        }
    }

    #[test]
    fn test_empty_container() {
        let result = ArticleMapper::new().map_payload(&json!({"novel": {}}));
        assert_eq!(result.unwrap_err(), ExtractionError::EmptyContainer);
    }

    #[test]
    fn test_multiple_entries_rejected() {
        let payload = json!({"novel": {"1": {"title": "A"}, "2": {"title": "B"}}});
        let result = ArticleMapper::new().map_payload(&payload);
        assert_eq!(result.unwrap_err(), ExtractionError::MultipleEntries(2));
    }

    #[test]
    fn test_entry_not_object() {
        let result = ArticleMapper::new().map_payload(&json!({"novel": {"1": "T"}}));
        assert_eq!(
            result.unwrap_err(),
            ExtractionError::EntryNotObject("1".to_string())
        );
    }

    #[test]
    fn test_decode() {
        let mapper = ArticleMapper::new();

        assert!(mapper.decode(br#"{"novel":{}}"#).is_ok());
        assert!(matches!(
            mapper.decode(b"not json"),
            Err(IngestError::DecodeError(_))
        ));
        assert!(matches!(
            mapper.decode(b""),
            Err(IngestError::DecodeError(msg)) if msg == "empty payload"
        ));
    }
}
