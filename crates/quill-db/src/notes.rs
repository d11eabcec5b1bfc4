//! PostgreSQL note repository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use quill_core::{
    new_v7, CreateNoteRequest, Error, Note, NoteRepository, Result, UpdateNoteRequest,
};

const NOTE_COLUMNS: &str = "id, owner_id, title, content, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn row_to_note(row: &PgRow) -> Note {
        Note {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            title: row.get("title"),
            content: row.get("content"),
            created_at: row.get("created_at_utc"),
            updated_at: row.get("updated_at_utc"),
        }
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn insert(&self, req: CreateNoteRequest) -> Result<Note> {
        let id = new_v7();
        let now = Utc::now();
        let sql = format!(
            "INSERT INTO note (id, owner_id, title, content, created_at_utc, updated_at_utc) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {}",
            NOTE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(req.owner_id)
            .bind(&req.title)
            .bind(&req.content)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(Self::row_to_note(&row))
    }

    async fn fetch(&self, id: Uuid) -> Result<Note> {
        let sql = format!("SELECT {} FROM note WHERE id = $1", NOTE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))?;
        Ok(Self::row_to_note(&row))
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<Note>> {
        let sql = format!(
            "SELECT {} FROM note WHERE owner_id = $1 ORDER BY updated_at_utc DESC, id DESC",
            NOTE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(Self::row_to_note).collect())
    }

    async fn update(&self, id: Uuid, req: UpdateNoteRequest) -> Result<Note> {
        let sql = format!(
            "UPDATE note SET title = $1, content = $2, updated_at_utc = $3 \
             WHERE id = $4 RETURNING {}",
            NOTE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(&req.title)
            .bind(&req.content)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or(Error::NoteNotFound(id))?;
        Ok(Self::row_to_note(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::NoteNotFound(id));
        }
        Ok(())
    }
}
