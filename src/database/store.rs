use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::schema::{validate_document, Resource, SchemaError, ValidationMode};

/// Errors from Store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// A persisted resource document: validated domain fields plus the
/// store-owned system columns
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub data: Json<Map<String, Value>>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    /// Flatten into the wire shape: domain fields at the top level alongside
    /// the system fields
    pub fn to_api_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("id".to_string(), Value::String(self.id.to_string()));
        for (key, value) in self.data.iter() {
            out.insert(key.clone(), value.clone());
        }
        if let Some(user_id) = self.user_id {
            out.insert("user_id".to_string(), Value::String(user_id.to_string()));
        }
        out.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        out.insert(
            "updated_at".to_string(),
            Value::String(self.updated_at.to_rfc3339()),
        );
        Value::Object(out)
    }

    pub fn to_api_value_array(documents: &[Document]) -> Value {
        Value::Array(documents.iter().map(Document::to_api_value).collect())
    }
}

/// Thin persistence adapter for one resource table. Payloads are validated
/// against the resource's field specs before any write reaches the database.
pub struct Store<R: Resource> {
    pool: PgPool,
    _marker: std::marker::PhantomData<R>,
}

impl<R: Resource> Store<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _marker: std::marker::PhantomData,
        }
    }

    /// All documents, newest first
    pub async fn list(&self) -> Result<Vec<Document>, StoreError> {
        let documents = sqlx::query_as::<_, Document>(&Self::select_all_sql())
            .fetch_all(&self.pool)
            .await?;
        Ok(documents)
    }

    /// Validate and persist a new document. The owner comes from the
    /// authenticated request, never from the payload.
    pub async fn create(
        &self,
        payload: &Value,
        owner: Option<Uuid>,
    ) -> Result<Document, StoreError> {
        let doc = validate_document::<R>(payload, ValidationMode::Create)?;

        let created = sqlx::query_as::<_, Document>(&Self::insert_sql())
            .bind(Json(doc))
            .bind(owner)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    pub async fn fetch(&self, id: Uuid) -> Result<Option<Document>, StoreError> {
        let document = sqlx::query_as::<_, Document>(&Self::select_one_sql())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(document)
    }

    /// Merge the validated fields over the stored document (top-level
    /// field-set semantics) and return the post-update state.
    pub async fn update(&self, id: Uuid, payload: &Value) -> Result<Option<Document>, StoreError> {
        let patch = validate_document::<R>(payload, ValidationMode::Update)?;

        let updated = sqlx::query_as::<_, Document>(&Self::update_sql())
            .bind(id)
            .bind(Json(patch))
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    /// Remove a document. Returns false when no row matched.
    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let deleted: Option<(Uuid,)> = sqlx::query_as(&Self::delete_sql())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(deleted.is_some())
    }

    fn table() -> String {
        DatabaseManager::quote_identifier(R::TABLE)
    }

    fn select_all_sql() -> String {
        format!(
            "SELECT id, data, user_id, created_at, updated_at FROM {} ORDER BY created_at DESC",
            Self::table()
        )
    }

    fn select_one_sql() -> String {
        format!(
            "SELECT id, data, user_id, created_at, updated_at FROM {} WHERE id = $1",
            Self::table()
        )
    }

    fn insert_sql() -> String {
        format!(
            "INSERT INTO {} (data, user_id) VALUES ($1, $2) \
             RETURNING id, data, user_id, created_at, updated_at",
            Self::table()
        )
    }

    fn update_sql() -> String {
        format!(
            "UPDATE {} SET data = data || $2, updated_at = now() WHERE id = $1 \
             RETURNING id, data, user_id, created_at, updated_at",
            Self::table()
        )
    }

    fn delete_sql() -> String {
        format!("DELETE FROM {} WHERE id = $1 RETURNING id", Self::table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::{FieldKind, FieldSpec};
    use serde_json::json;

    struct Note;

    const NOTE_FIELDS: &[FieldSpec] = &[FieldSpec::required("title", FieldKind::Text)];

    impl Resource for Note {
        const TABLE: &'static str = "notes";
        const NAME: &'static str = "note";

        fn fields() -> &'static [FieldSpec] {
            NOTE_FIELDS
        }
    }

    #[test]
    fn sql_targets_quoted_table() {
        assert_eq!(
            Store::<Note>::select_all_sql(),
            "SELECT id, data, user_id, created_at, updated_at FROM \"notes\" ORDER BY created_at DESC"
        );
        assert!(Store::<Note>::insert_sql().starts_with("INSERT INTO \"notes\""));
        assert!(Store::<Note>::update_sql().contains("SET data = data || $2"));
        assert!(Store::<Note>::delete_sql().starts_with("DELETE FROM \"notes\""));
    }

    #[test]
    fn document_flattens_to_wire_shape() {
        let mut data = Map::new();
        data.insert("title".to_string(), json!("First"));

        let owner = Uuid::new_v4();
        let doc = Document {
            id: Uuid::new_v4(),
            data: Json(data),
            user_id: Some(owner),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = doc.to_api_value();
        assert_eq!(value["title"], json!("First"));
        assert_eq!(value["id"], json!(doc.id.to_string()));
        assert_eq!(value["user_id"], json!(owner.to_string()));
        assert!(value.get("created_at").is_some());
        assert!(value.get("updated_at").is_some());
    }

    #[test]
    fn document_without_owner_omits_user_id() {
        let doc = Document {
            id: Uuid::new_v4(),
            data: Json(Map::new()),
            user_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(doc.to_api_value().get("user_id").is_none());
    }
}
