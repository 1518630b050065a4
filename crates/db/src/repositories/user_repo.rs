//! Repository for the `users` table.

use sqlx::PgPool;

use gym_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list for users queries.
const COLUMNS: &str = "id, name, email, role, branch_id, gender, birth_date, \
    payment_customer_id, created_at, updated_at";

/// Provides lookups over the user directory projection.
pub struct UserRepo;

impl UserRepo {
    /// Insert a user, returning the created row.
    ///
    /// `role` must already be validated. The payment customer id is attached
    /// afterwards with [`UserRepo::set_payment_customer_id`].
    pub async fn create(pool: &PgPool, input: &CreateUser, role: &str) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, role, branch_id, gender, birth_date)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(role)
            .bind(input.branch_id)
            .bind(&input.gender)
            .bind(input.birth_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch every user whose id is in `ids`. Unknown ids are skipped.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<User>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = ANY($1) ORDER BY id");
        sqlx::query_as::<_, User>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Record the payment gateway customer id for a user.
    pub async fn set_payment_customer_id(
        pool: &PgPool,
        id: DbId,
        customer_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET payment_customer_id = $2 WHERE id = $1")
            .bind(id)
            .bind(customer_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user. Packages they coach keep their rows with no coach.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
