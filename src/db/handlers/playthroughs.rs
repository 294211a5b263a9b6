//! Playthrough repository.
//!
//! Two write paths, matching the two-phase client protocol: `create` makes
//! the bare row when a session starts, `attach_payload` overwrites the
//! recording on each subsequent upload. Neither path checks row existence
//! up front; the statements are the check.

use sqlx::PgConnection;

use crate::db::errors::Result;
use crate::db::models::Playthrough;

/// Repository for playthrough row access.
pub struct Playthroughs<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Playthroughs<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert a bare row for `id`. The payload starts NULL and is filled in
    /// by a later [`attach_payload`](Self::attach_payload).
    pub async fn create(&mut self, id: &str) -> Result<Playthrough> {
        let row = sqlx::query_as::<_, Playthrough>(
            r#"
            INSERT INTO playthroughs (id)
            VALUES ($1)
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(row)
    }

    /// Overwrite the payload for an existing row, refreshing `updated_at`.
    ///
    /// Returns `false` when no row matched `id`. The statement itself still
    /// succeeded; callers treat the zero-row case as an accepted no-op.
    pub async fn attach_payload(&mut self, id: &str, payload: &[u8]) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE playthroughs
            SET payload = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(payload)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch a row by id.
    pub async fn get_by_id(&mut self, id: &str) -> Result<Option<Playthrough>> {
        let row = sqlx::query_as::<_, Playthrough>("SELECT * FROM playthroughs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DbError;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn create_stores_bare_row(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Playthroughs::new(&mut conn);

        let row = repo.create("42").await.unwrap();
        assert_eq!(row.id, "42");
        assert!(!row.has_payload());

        let fetched = repo.get_by_id("42").await.unwrap().unwrap();
        assert_eq!(fetched.payload, None);
    }

    #[sqlx::test]
    async fn create_rejects_duplicate_id(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Playthroughs::new(&mut conn);

        repo.create("42").await.unwrap();
        let err = repo.create("42").await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // the failed insert must not disturb the original row
        let row = repo.get_by_id("42").await.unwrap().unwrap();
        assert_eq!(row.payload, None);
    }

    #[sqlx::test]
    async fn attach_payload_overwrites_existing_row(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Playthroughs::new(&mut conn);

        repo.create("42").await.unwrap();
        assert!(repo.attach_payload("42", b"abc").await.unwrap());

        let row = repo.get_by_id("42").await.unwrap().unwrap();
        assert_eq!(row.payload.as_deref(), Some(&b"abc"[..]));

        // last write wins
        assert!(repo.attach_payload("42", b"xyz").await.unwrap());
        let row = repo.get_by_id("42").await.unwrap().unwrap();
        assert_eq!(row.payload.as_deref(), Some(&b"xyz"[..]));
    }

    #[sqlx::test]
    async fn attach_payload_without_row_is_a_no_op(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Playthroughs::new(&mut conn);

        assert!(!repo.attach_payload("99", b"xyz").await.unwrap());
        assert!(repo.get_by_id("99").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn repeated_attach_is_idempotent(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Playthroughs::new(&mut conn);

        repo.create("session-7").await.unwrap();
        for _ in 0..3 {
            assert!(repo.attach_payload("session-7", b"recording").await.unwrap());
        }

        let row = repo.get_by_id("session-7").await.unwrap().unwrap();
        assert_eq!(row.payload.as_deref(), Some(&b"recording"[..]));
    }

    #[sqlx::test]
    async fn hostile_ids_are_stored_verbatim(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Playthroughs::new(&mut conn);

        let ids = [
            "it's",
            r#"he said "hi""#,
            r"back\slash",
            "42; DROP TABLE playthroughs; --",
            "SELECT",
            "",
        ];
        for id in ids {
            let row = repo.create(id).await.unwrap();
            assert_eq!(row.id, id);
        }
        for id in ids {
            let row = repo.get_by_id(id).await.unwrap().unwrap();
            assert_eq!(row.id, id);
        }

        // the table survived and holds exactly the rows above
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM playthroughs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count as usize, ids.len());
    }

    #[sqlx::test]
    async fn binary_payloads_round_trip(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Playthroughs::new(&mut conn);

        let payload = vec![0x00, 0xFF, 0x27, 0x22, 0x5C, 0x00, 0x0A];
        repo.create("bin").await.unwrap();
        assert!(repo.attach_payload("bin", &payload).await.unwrap());

        let row = repo.get_by_id("bin").await.unwrap().unwrap();
        assert_eq!(row.payload.as_deref(), Some(payload.as_slice()));
    }
}
