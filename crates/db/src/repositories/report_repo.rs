//! Read-only queries feeding the reporting aggregator.
//!
//! Reports read every package, soft-deleted ones included. The optional
//! branch filter always applies to the client's branch.

use sqlx::PgPool;

use gym_core::types::{DbId, Timestamp};

use crate::models::report::{DemographicRow, SaleRecord};

/// Provides the raw rows behind the report endpoints.
pub struct ReportRepo;

impl ReportRepo {
    /// Packages created at or after `since`, joined with their client.
    pub async fn sales_rows(
        pool: &PgPool,
        since: Timestamp,
        branch_id: Option<DbId>,
    ) -> Result<Vec<SaleRecord>, sqlx::Error> {
        sqlx::query_as::<_, SaleRecord>(
            "SELECT p.id, p.total, p.created_at,
                    u.name AS user_name, u.branch_id AS user_branch
             FROM training_packages p
             JOIN users u ON u.id = p.user_id
             WHERE p.created_at >= $1
               AND ($2::BIGINT IS NULL OR u.branch_id = $2)
             ORDER BY p.created_at DESC, p.id DESC",
        )
        .bind(since)
        .bind(branch_id)
        .fetch_all(pool)
        .await
    }

    /// Every training label of every session, flattened in a stable order
    /// (package creation, session index, label position).
    pub async fn training_labels(
        pool: &PgPool,
        branch_id: Option<DbId>,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT t.label
             FROM training_packages p
             JOIN users u ON u.id = p.user_id
             JOIN training_sessions s ON s.package_id = p.id
             CROSS JOIN LATERAL UNNEST(s.trainings) WITH ORDINALITY AS t(label, ord)
             WHERE ($1::BIGINT IS NULL OR u.branch_id = $1)
             ORDER BY p.created_at ASC, p.id ASC, s.session_index ASC, t.ord ASC",
        )
        .bind(branch_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(label,)| label).collect())
    }

    /// The training type of every package, oldest first.
    pub async fn training_types(
        pool: &PgPool,
        branch_id: Option<DbId>,
    ) -> Result<Vec<Option<String>>, sqlx::Error> {
        let rows: Vec<(Option<String>,)> = sqlx::query_as(
            "SELECT p.training_type
             FROM training_packages p
             JOIN users u ON u.id = p.user_id
             WHERE ($1::BIGINT IS NULL OR u.branch_id = $1)
             ORDER BY p.created_at ASC, p.id ASC",
        )
        .bind(branch_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(training_type,)| training_type).collect())
    }

    /// Packages with a training type, paired with their client's profile.
    pub async fn demographic_rows(
        pool: &PgPool,
        branch_id: Option<DbId>,
    ) -> Result<Vec<DemographicRow>, sqlx::Error> {
        sqlx::query_as::<_, DemographicRow>(
            "SELECT p.training_type, u.id AS user_id, u.name, u.gender, u.birth_date
             FROM training_packages p
             JOIN users u ON u.id = p.user_id
             WHERE p.training_type IS NOT NULL
               AND ($1::BIGINT IS NULL OR u.branch_id = $1)
             ORDER BY p.created_at ASC, p.id ASC",
        )
        .bind(branch_id)
        .fetch_all(pool)
        .await
    }
}
