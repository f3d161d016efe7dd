//! PostgreSQL implementation of the file metadata store.

use async_trait::async_trait;
use sqlx::{postgres::PgRow, Pool, Postgres, Row};
use tracing::debug;
use uuid::Uuid;

use lds_core::{Error, FileMeta, FileQuery, MetadataStore, Result};

const FILE_META_COLUMNS: &str = "id, path, name, tags, size, content_type, is_image, \
                                 order_no, create_time, update_time";

/// PostgreSQL implementation of MetadataStore backed by the `file_meta` table.
#[derive(Clone)]
pub struct PgMetadataStore {
    pool: Pool<Postgres>,
}

impl PgMetadataStore {
    /// Create a new PgMetadataStore with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_meta(row: &PgRow) -> FileMeta {
    FileMeta {
        id: row.get("id"),
        path: row.get("path"),
        name: row.get("name"),
        tags: row.get("tags"),
        size: row.get("size"),
        content_type: row.get("content_type"),
        is_image: row.get("is_image"),
        order_no: row.get("order_no"),
        create_time: row.get("create_time"),
        update_time: row.get("update_time"),
    }
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn save(&self, meta: &FileMeta) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO file_meta (
                id, path, name, tags, size, content_type, is_image,
                order_no, create_time, update_time
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                path = EXCLUDED.path,
                name = EXCLUDED.name,
                tags = EXCLUDED.tags,
                size = EXCLUDED.size,
                content_type = EXCLUDED.content_type,
                is_image = EXCLUDED.is_image,
                order_no = EXCLUDED.order_no,
                update_time = EXCLUDED.update_time
            "#,
        )
        .bind(meta.id)
        .bind(&meta.path)
        .bind(&meta.name)
        .bind(&meta.tags)
        .bind(meta.size)
        .bind(&meta.content_type)
        .bind(meta.is_image)
        .bind(&meta.order_no)
        .bind(meta.create_time)
        .bind(meta.update_time)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "metadata",
            op = "save",
            file_id = %meta.id,
            storage_path = %meta.path,
            "file_meta upserted"
        );
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<FileMeta>> {
        let sql = format!("SELECT {} FROM file_meta WHERE id = $1", FILE_META_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.as_ref().map(row_to_meta))
    }

    async fn query_by_tags(&self, query: &FileQuery) -> Result<Vec<FileMeta>> {
        if query.limit <= 0 {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT {}
            FROM file_meta
            WHERE (cardinality($1::text[]) = 0 OR tags && $1::text[])
              AND ($2::text IS NULL OR order_no < $2::text)
            ORDER BY order_no DESC
            LIMIT $3
            "#,
            FILE_META_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(&query.tags)
            .bind(query.order_no.as_deref())
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "metadata",
            op = "query_by_tags",
            tag_count = query.tags.len(),
            limit = query.limit,
            result_count = rows.len(),
            "file_meta queried"
        );
        Ok(rows.iter().map(row_to_meta).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM file_meta WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM file_meta")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}
