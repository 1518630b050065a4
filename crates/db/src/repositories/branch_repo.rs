//! Repository for the `branches` table.

use sqlx::PgPool;

use gym_core::types::DbId;

use crate::models::branch::{Branch, CreateBranch, UpdateBranch};

/// Column list for branches queries.
const COLUMNS: &str = "id, name, email, contact, place, created_at, updated_at";

/// Provides CRUD operations for gym branches.
pub struct BranchRepo;

impl BranchRepo {
    /// Insert a new branch, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateBranch) -> Result<Branch, sqlx::Error> {
        let query = format!(
            "INSERT INTO branches (name, email, contact, place)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Branch>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.contact)
            .bind(&input.place)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Branch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM branches WHERE id = $1");
        sqlx::query_as::<_, Branch>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all branches ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Branch>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM branches ORDER BY name ASC");
        sqlx::query_as::<_, Branch>(&query).fetch_all(pool).await
    }

    /// Update a branch. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBranch,
    ) -> Result<Option<Branch>, sqlx::Error> {
        let query = format!(
            "UPDATE branches SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                contact = COALESCE($4, contact),
                place = COALESCE($5, place)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Branch>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.contact)
            .bind(&input.place)
            .fetch_optional(pool)
            .await
    }

    /// Delete a branch. Users in it keep their rows with no branch.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM branches WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
