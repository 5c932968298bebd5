//! Owner-scoped storage shared by every journal collection
//!
//! One [`EntityStore`] is built per [`EntitySchema`]. Statements are
//! assembled from the schema's column list, so adding a field to a
//! collection only means declaring it and migrating the table.

use chrono::{SecondsFormat, Utc};
use common::{error::is_foreign_key_violation, tags};
use serde_json::{Map, Value};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool, sqlite::SqliteRow};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{
    CREATED_AT_KEY, CreatedAt, EntitySchema, FieldKind, FieldUpdate, Record, SqlValue, TAGS_KEY,
    UPDATED_AT_KEY,
};

/// Entity store failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// The request body does not satisfy the schema
    #[error("{0}")]
    Validation(String),

    #[error("Record not found")]
    NotFound,

    /// The record exists but belongs to another user
    #[error("Record belongs to another user")]
    Forbidden,

    /// The owning user no longer exists, e.g. a token outlived its account
    #[error("Unknown owner")]
    UnknownOwner,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A column assignment collected from a request body
type Assignment = (&'static str, Option<SqlValue>);

/// CRUD over one collection, scoped to the owning user
#[derive(Clone)]
pub struct EntityStore {
    pool: SqlitePool,
    schema: &'static EntitySchema,
}

impl EntityStore {
    pub fn new(pool: SqlitePool, schema: &'static EntitySchema) -> Self {
        Self { pool, schema }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.schema
    }

    /// Every record of one owner, oldest first
    pub async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Record>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE owner_id = ? ORDER BY id",
            self.columns(),
            self.schema.table
        );

        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(
            "Listed {} {} rows for user {}",
            rows.len(),
            self.schema.name,
            owner_id
        );
        rows.iter().map(|row| self.decode(row)).collect()
    }

    /// Every record regardless of owner
    pub async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY id",
            self.columns(),
            self.schema.table
        );

        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(|row| self.decode(row)).collect()
    }

    /// One record, provided `owner_id` owns it
    pub async fn find(&self, id: i64, owner_id: i64) -> Result<Record, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            self.columns(),
            self.schema.table
        );

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        let record = self.decode(&row)?;
        if record.owner_id != owner_id {
            return Err(StoreError::Forbidden);
        }

        Ok(record)
    }

    /// Insert a record for `owner_id`
    ///
    /// Every required field must be present and non-blank; the error names
    /// all the missing ones and nothing is written.
    pub async fn create(
        &self,
        owner_id: i64,
        body: &Map<String, Value>,
    ) -> Result<Record, StoreError> {
        let mut assignments: Vec<Assignment> = Vec::new();
        let mut missing = Vec::new();

        for field in self.schema.required {
            match field.parse_required(body) {
                Ok(FieldUpdate::Assigned(value)) => assignments.push((field.column, Some(value))),
                _ => missing.push(field.name),
            }
        }

        if !missing.is_empty() {
            return Err(StoreError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        for field in self.schema.optional {
            let update = field.parse_optional(body).map_err(StoreError::Validation)?;
            assignments.push((field.column, update.into_insert_value()));
        }

        if self.schema.tags {
            assignments.push(("tags", parse_tags(body)?.into_insert_value()));
        }

        let now = timestamp();
        match self.schema.created_at {
            CreatedAt::Untracked => {}
            CreatedAt::Server => {
                assignments.push(("created_at", Some(SqlValue::Text(now.clone()))));
            }
            CreatedAt::CallerOrServer => {
                let created_at = body
                    .get(CREATED_AT_KEY)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map_or_else(|| now.clone(), str::to_string);
                assignments.push(("created_at", Some(SqlValue::Text(created_at))));
            }
        }
        if self.schema.tracks_updates {
            assignments.push(("updated_at", Some(SqlValue::Text(now))));
        }

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "INSERT INTO {} (owner_id",
            self.schema.table
        ));
        for (column, _) in &assignments {
            query.push(", ").push(*column);
        }
        query.push(") VALUES (").push_bind(owner_id);
        for (_, value) in assignments {
            query.push(", ");
            push_value(&mut query, value);
        }
        query.push(") RETURNING ").push(self.columns());

        let row = query
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    StoreError::UnknownOwner
                } else {
                    StoreError::Database(e)
                }
            })?;
        let record = self.decode(&row)?;

        info!(
            "Created {} {} for user {}",
            self.schema.name, record.id, owner_id
        );
        Ok(record)
    }

    /// Apply a partial update to a record owned by `owner_id`
    ///
    /// Absent keys keep their value, `null` or `""` clear an optional field,
    /// anything else overwrites it. Required fields may be omitted but not
    /// blanked. Ownership is part of the statement's condition.
    pub async fn update(
        &self,
        id: i64,
        owner_id: i64,
        body: &Map<String, Value>,
    ) -> Result<Record, StoreError> {
        let mut assignments: Vec<Assignment> = Vec::new();

        for field in self.schema.required {
            if let FieldUpdate::Assigned(value) =
                field.parse_required(body).map_err(StoreError::Validation)?
            {
                assignments.push((field.column, Some(value)));
            }
        }

        for field in self.schema.optional {
            match field.parse_optional(body).map_err(StoreError::Validation)? {
                FieldUpdate::Unchanged => {}
                FieldUpdate::Cleared => assignments.push((field.column, None)),
                FieldUpdate::Assigned(value) => assignments.push((field.column, Some(value))),
            }
        }

        if self.schema.tags {
            match parse_tags(body)? {
                FieldUpdate::Unchanged => {}
                FieldUpdate::Cleared => assignments.push(("tags", None)),
                FieldUpdate::Assigned(value) => assignments.push(("tags", Some(value))),
            }
        }

        if self.schema.tracks_updates {
            assignments.push(("updated_at", Some(SqlValue::Text(timestamp()))));
        }

        if assignments.is_empty() {
            return self.find(id, owner_id).await;
        }

        let mut query =
            QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", self.schema.table));
        for (i, (column, value)) in assignments.into_iter().enumerate() {
            if i > 0 {
                query.push(", ");
            }
            query.push(column).push(" = ");
            push_value(&mut query, value);
        }
        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(" AND owner_id = ")
            .push_bind(owner_id)
            .push(" RETURNING ")
            .push(self.columns());

        let Some(row) = query.build().fetch_optional(&self.pool).await? else {
            return Err(self.classify_miss(id).await);
        };

        info!("Updated {} {} for user {}", self.schema.name, id, owner_id);
        self.decode(&row)
    }

    /// Remove a record owned by `owner_id`
    pub async fn delete(&self, id: i64, owner_id: i64) -> Result<(), StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE id = ? AND owner_id = ?",
            self.schema.table
        );

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(self.classify_miss(id).await);
        }

        info!("Deleted {} {} for user {}", self.schema.name, id, owner_id);
        Ok(())
    }

    /// Tell a missing record from someone else's after a conditional
    /// statement touched no rows
    async fn classify_miss(&self, id: i64) -> StoreError {
        let sql = format!("SELECT owner_id FROM {} WHERE id = ?", self.schema.table);

        match sqlx::query_scalar::<_, i64>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
        {
            Ok(Some(_)) => StoreError::Forbidden,
            Ok(None) => StoreError::NotFound,
            Err(e) => StoreError::Database(e),
        }
    }

    fn columns(&self) -> String {
        let mut columns = vec!["id", "owner_id"];
        columns.extend(self.schema.required.iter().map(|f| f.column));
        columns.extend(self.schema.optional.iter().map(|f| f.column));
        if self.schema.tags {
            columns.push("tags");
        }
        if self.schema.created_at != CreatedAt::Untracked {
            columns.push("created_at");
        }
        if self.schema.tracks_updates {
            columns.push("updated_at");
        }
        columns.join(", ")
    }

    fn decode(&self, row: &SqliteRow) -> Result<Record, StoreError> {
        let mut fields = Map::new();

        for field in self.schema.required.iter().chain(self.schema.optional) {
            let value = match field.kind {
                FieldKind::Text => row
                    .try_get::<Option<String>, _>(field.column)?
                    .map_or(Value::Null, Value::from),
                FieldKind::Integer => row
                    .try_get::<Option<i64>, _>(field.column)?
                    .map_or(Value::Null, Value::from),
            };
            fields.insert(field.name.to_string(), value);
        }

        if self.schema.tags {
            let stored: Option<String> = row.try_get("tags")?;
            let decoded = stored.as_deref().and_then(tags::decode);
            fields.insert(TAGS_KEY.to_string(), decoded.map_or(Value::Null, Value::from));
        }

        if self.schema.created_at != CreatedAt::Untracked {
            let created_at: Option<String> = row.try_get("created_at")?;
            fields.insert(CREATED_AT_KEY.to_string(), created_at.map_or(Value::Null, Value::from));
        }

        if self.schema.tracks_updates {
            let updated_at: Option<String> = row.try_get("updated_at")?;
            fields.insert(UPDATED_AT_KEY.to_string(), updated_at.map_or(Value::Null, Value::from));
        }

        Ok(Record {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            fields,
        })
    }
}

fn parse_tags(body: &Map<String, Value>) -> Result<FieldUpdate, StoreError> {
    let Some(value) = body.get(TAGS_KEY) else {
        return Ok(FieldUpdate::Unchanged);
    };

    match tags::from_value(value) {
        Ok(Some(list)) => Ok(FieldUpdate::Assigned(SqlValue::Text(tags::encode(&list)))),
        Ok(None) => Ok(FieldUpdate::Cleared),
        Err(e) => Err(StoreError::Validation(e.to_string())),
    }
}

fn push_value(query: &mut QueryBuilder<'_, Sqlite>, value: Option<SqlValue>) {
    match value {
        Some(SqlValue::Text(text)) => query.push_bind(text),
        Some(SqlValue::Integer(n)) => query.push_bind(n),
        None => query.push_bind(None::<String>),
    };
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{activity, book, diary, movie};
    use common::database::init_memory_pool;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    async fn pool_with_users() -> SqlitePool {
        let pool = init_memory_pool().await.unwrap();
        for name in ["alice", "bob"] {
            sqlx::query("INSERT INTO users (name, email, password_hash) VALUES (?, ?, 'x')")
                .bind(name)
                .bind(format!("{name}@x.com"))
                .execute(&pool)
                .await
                .unwrap();
        }
        pool
    }

    fn dune() -> Map<String, Value> {
        body(json!({"title": "Dune", "author": "Herbert", "description": "desc"}))
    }

    #[tokio::test]
    async fn test_create_fills_every_declared_field() {
        let store = EntityStore::new(pool_with_users().await, &book::SCHEMA);

        let record = store.create(1, &dune()).await.unwrap();
        assert_eq!(record.owner_id, 1);
        assert_eq!(record.get("title"), Some(&json!("Dune")));
        for key in ["publicationYear", "genre", "rating", "pages", "status", "notes", "tags"] {
            assert_eq!(record.get(key), Some(&Value::Null), "{key}");
        }
        assert!(record.get("createdAt").unwrap().as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_create_reports_all_missing_fields_and_writes_nothing() {
        let store = EntityStore::new(pool_with_users().await, &book::SCHEMA);

        let err = store
            .create(1, &body(json!({"title": "Dune", "author": "  "})))
            .await
            .unwrap_err();
        match err {
            StoreError::Validation(msg) => {
                assert!(msg.contains("author"));
                assert!(msg.contains("description"));
                assert!(!msg.contains("title"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        assert!(store.list_by_owner(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tags_are_normalized_on_write() {
        let store = EntityStore::new(pool_with_users().await, &book::SCHEMA);

        let mut input = dune();
        input.insert("tags".into(), json!(" sci-fi , classic,, "));
        let record = store.create(1, &input).await.unwrap();
        assert_eq!(record.get("tags"), Some(&json!(["sci-fi", "classic"])));

        let stored: String = sqlx::query_scalar("SELECT tags FROM books WHERE id = ?")
            .bind(record.id)
            .fetch_one(&store.pool)
            .await
            .unwrap();
        assert_eq!(stored, r#"["sci-fi","classic"]"#);

        let cleared = store
            .update(record.id, 1, &body(json!({"tags": []})))
            .await
            .unwrap();
        assert_eq!(cleared.get("tags"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_legacy_comma_tags_read_as_list() {
        let store = EntityStore::new(pool_with_users().await, &book::SCHEMA);
        let record = store.create(1, &dune()).await.unwrap();

        sqlx::query("UPDATE books SET tags = 'a, b' WHERE id = ?")
            .bind(record.id)
            .execute(&store.pool)
            .await
            .unwrap();

        let read = store.find(record.id, 1).await.unwrap();
        assert_eq!(read.get("tags"), Some(&json!(["a", "b"])));
    }

    #[tokio::test]
    async fn test_update_three_state_notes() {
        let store = EntityStore::new(pool_with_users().await, &book::SCHEMA);
        let mut input = dune();
        input.insert("notes".into(), json!("x"));
        let id = store.create(1, &input).await.unwrap().id;

        let kept = store
            .update(id, 1, &body(json!({"status": "reading"})))
            .await
            .unwrap();
        assert_eq!(kept.get("notes"), Some(&json!("x")));
        assert_eq!(kept.get("status"), Some(&json!("reading")));

        let cleared = store.update(id, 1, &body(json!({"notes": ""}))).await.unwrap();
        assert_eq!(cleared.get("notes"), Some(&Value::Null));

        let set = store.update(id, 1, &body(json!({"notes": "y"}))).await.unwrap();
        assert_eq!(set.get("notes"), Some(&json!("y")));
        assert_eq!(set.get("title"), Some(&json!("Dune")));
    }

    #[tokio::test]
    async fn test_update_rejects_blanked_required_field() {
        let store = EntityStore::new(pool_with_users().await, &book::SCHEMA);
        let id = store.create(1, &dune()).await.unwrap().id;

        let err = store
            .update(id, 1, &body(json!({"title": ""})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(
            store.find(id, 1).await.unwrap().get("title"),
            Some(&json!("Dune"))
        );
    }

    #[tokio::test]
    async fn test_ownership_is_enforced() {
        let store = EntityStore::new(pool_with_users().await, &book::SCHEMA);
        let id = store.create(1, &dune()).await.unwrap().id;

        assert!(store.list_by_owner(2).await.unwrap().is_empty());
        assert!(matches!(
            store.find(id, 2).await,
            Err(StoreError::Forbidden)
        ));
        assert!(matches!(
            store.update(id, 2, &body(json!({"notes": "mine"}))).await,
            Err(StoreError::Forbidden)
        ));
        assert!(matches!(
            store.delete(id, 2).await,
            Err(StoreError::Forbidden)
        ));
        assert!(matches!(
            store.find(id + 100, 1).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete(id + 100, 1).await,
            Err(StoreError::NotFound)
        ));

        assert_eq!(store.find(id, 1).await.unwrap().get("notes"), Some(&Value::Null));
        store.delete(id, 1).await.unwrap();
        assert!(store.list_by_owner(1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_spans_owners_in_insertion_order() {
        let store = EntityStore::new(pool_with_users().await, &movie::SCHEMA);
        let movie = body(json!({"title": "Alien", "director": "Scott", "description": "d"}));
        store.create(2, &movie).await.unwrap();
        store.create(1, &movie).await.unwrap();

        let all = store.list_all().await.unwrap();
        let owners: Vec<i64> = all.iter().map(|r| r.owner_id).collect();
        assert_eq!(owners, vec![2, 1]);
        assert!(all[0].get("tags").is_none());
        assert!(all[0].get("createdAt").is_none());
    }

    #[tokio::test]
    async fn test_integer_fields_accept_numeric_strings() {
        let store = EntityStore::new(pool_with_users().await, &book::SCHEMA);
        let mut input = dune();
        input.insert("pages".into(), json!("412"));
        input.insert("publicationYear".into(), json!(1965));

        let record = store.create(1, &input).await.unwrap();
        assert_eq!(record.get("pages"), Some(&json!(412)));
        assert_eq!(record.get("publicationYear"), Some(&json!(1965)));

        let err = store
            .update(record.id, 1, &body(json!({"pages": "lots"})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_diary_keeps_caller_created_at() {
        let store = EntityStore::new(pool_with_users().await, &diary::SCHEMA);
        let record = store
            .create(
                1,
                &body(json!({
                    "title": "Monday",
                    "body": "Rain",
                    "createdAt": "2024-01-01T08:00:00.000Z"
                })),
            )
            .await
            .unwrap();
        assert_eq!(
            record.get("createdAt"),
            Some(&json!("2024-01-01T08:00:00.000Z"))
        );
    }

    #[tokio::test]
    async fn test_activity_refreshes_updated_at() {
        let store = EntityStore::new(pool_with_users().await, &activity::SCHEMA);
        let record = store
            .create(
                1,
                &body(json!({
                    "title": "Run",
                    "description": "5k",
                    "category": "sport",
                    "date": "2024-05-01",
                    "status": "planned",
                    "priority": "high",
                    "duration": 30
                })),
            )
            .await
            .unwrap();
        assert!(record.get("updatedAt").unwrap().is_string());

        sqlx::query("UPDATE activities SET updated_at = '2000-01-01T00:00:00.000Z' WHERE id = ?")
            .bind(record.id)
            .execute(&store.pool)
            .await
            .unwrap();

        let updated = store
            .update(record.id, 1, &body(json!({"status": "done"})))
            .await
            .unwrap();
        assert_eq!(updated.get("status"), Some(&json!("done")));
        assert_ne!(updated.get("updatedAt"), Some(&json!("2000-01-01T00:00:00.000Z")));
        assert_eq!(updated.get("createdAt"), record.get("createdAt"));
    }

    #[tokio::test]
    async fn test_create_for_missing_owner_writes_nothing() {
        let pool = pool_with_users().await;
        let store = EntityStore::new(pool.clone(), &book::SCHEMA);

        let err = store.create(99, &dune()).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownOwner));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_empty_update_still_checks_ownership() {
        let store = EntityStore::new(pool_with_users().await, &movie::SCHEMA);
        let movie = body(json!({"title": "Alien", "director": "Scott", "description": "d"}));
        let id = store.create(1, &movie).await.unwrap().id;

        assert_eq!(store.update(id, 1, &Map::new()).await.unwrap().id, id);
        assert!(matches!(
            store.update(id, 2, &Map::new()).await,
            Err(StoreError::Forbidden)
        ));
    }
}
