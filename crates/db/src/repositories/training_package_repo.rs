//! Repository for the `training_packages` and `training_sessions` tables.

use sqlx::{PgConnection, PgExecutor, PgPool};

use gym_core::scheduling::{NewSession, SessionRecord};
use gym_core::storage::StoredObject;
use gym_core::types::DbId;

use crate::models::training_package::{
    CreateTrainingPackage, TrainingPackage, TrainingPackageWithSchedule, TrainingSession,
    UpdateTrainingPackage,
};

/// Column list for training_packages queries.
const COLUMNS: &str = "id, user_id, coach_id, sessions, status, training_type, total, \
    signature_url, signature_public_id, is_deleted, created_at, updated_at";

/// Same columns qualified with the `p` alias, for joined queries.
const P_COLUMNS: &str = "p.id, p.user_id, p.coach_id, p.sessions, p.status, p.training_type, \
    p.total, p.signature_url, p.signature_public_id, p.is_deleted, p.created_at, p.updated_at";

/// Column list for training_sessions queries.
const SESSION_COLUMNS: &str = "id, package_id, session_index, date_assigned, time_assigned, \
    status, trainings, created_at, updated_at";

/// Provides persistence for training packages and their schedules.
pub struct TrainingPackageRepo;

impl TrainingPackageRepo {
    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    /// Insert a package and its initial schedule in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTrainingPackage,
        signature: Option<&StoredObject>,
        schedule: &[NewSession],
    ) -> Result<TrainingPackageWithSchedule, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO training_packages
                (user_id, coach_id, sessions, training_type, total,
                 signature_url, signature_public_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let package = sqlx::query_as::<_, TrainingPackage>(&query)
            .bind(input.user_id)
            .bind(input.coach_id)
            .bind(input.sessions)
            .bind(&input.training_type)
            .bind(input.total.unwrap_or(0.0))
            .bind(signature.map(|s| s.url.as_str()))
            .bind(signature.map(|s| s.public_id.as_str()))
            .fetch_one(&mut *tx)
            .await?;

        let indices: Vec<i32> = schedule.iter().map(|s| s.index).collect();
        let statuses: Vec<&str> = schedule.iter().map(|s| s.status.as_str()).collect();

        let query = format!(
            "INSERT INTO training_sessions (package_id, session_index, status)
             SELECT $1, t.session_index, t.status
             FROM UNNEST($2::INTEGER[], $3::TEXT[]) AS t(session_index, status)
             RETURNING {SESSION_COLUMNS}"
        );
        let mut sessions = sqlx::query_as::<_, TrainingSession>(&query)
            .bind(package.id)
            .bind(&indices)
            .bind(&statuses)
            .fetch_all(&mut *tx)
            .await?;
        sessions.sort_by_key(|s| s.session_index);

        tx.commit().await?;

        Ok(TrainingPackageWithSchedule {
            package,
            schedule: sessions,
        })
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Find a package by id. Soft-deleted packages are excluded.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TrainingPackage>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM training_packages WHERE id = $1 AND is_deleted = false");
        sqlx::query_as::<_, TrainingPackage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a package by id, including soft-deleted rows.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TrainingPackage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM training_packages WHERE id = $1");
        sqlx::query_as::<_, TrainingPackage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Sessions of one package, ordered by index.
    pub async fn list_sessions<'e, E>(
        executor: E,
        package_id: DbId,
    ) -> Result<Vec<TrainingSession>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM training_sessions
             WHERE package_id = $1
             ORDER BY session_index ASC"
        );
        sqlx::query_as::<_, TrainingSession>(&query)
            .bind(package_id)
            .fetch_all(executor)
            .await
    }

    /// Sessions of several packages, grouped by package then ordered by index.
    pub async fn list_sessions_for_packages(
        pool: &PgPool,
        package_ids: &[DbId],
    ) -> Result<Vec<TrainingSession>, sqlx::Error> {
        if package_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {SESSION_COLUMNS} FROM training_sessions
             WHERE package_id = ANY($1)
             ORDER BY package_id ASC, session_index ASC"
        );
        sqlx::query_as::<_, TrainingSession>(&query)
            .bind(package_ids)
            .fetch_all(pool)
            .await
    }

    /// Non-deleted packages, newest first.
    ///
    /// With a branch, a package matches when its client **or** its coach
    /// belongs to that branch.
    pub async fn list_active(
        pool: &PgPool,
        branch_id: Option<DbId>,
    ) -> Result<Vec<TrainingPackage>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS} FROM training_packages p
             WHERE p.is_deleted = false
               AND ($1::BIGINT IS NULL OR EXISTS (
                    SELECT 1 FROM users u
                    WHERE u.branch_id = $1
                      AND (u.id = p.user_id OR u.id = p.coach_id)))
             ORDER BY p.created_at DESC, p.id DESC"
        );
        sqlx::query_as::<_, TrainingPackage>(&query)
            .bind(branch_id)
            .fetch_all(pool)
            .await
    }

    /// Non-deleted packages assigned to a coach, newest first.
    pub async fn list_by_coach(
        pool: &PgPool,
        coach_id: DbId,
    ) -> Result<Vec<TrainingPackage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM training_packages
             WHERE coach_id = $1 AND is_deleted = false
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, TrainingPackage>(&query)
            .bind(coach_id)
            .fetch_all(pool)
            .await
    }

    /// Non-deleted packages bought by a client, newest first.
    pub async fn list_by_client(
        pool: &PgPool,
        client_id: DbId,
    ) -> Result<Vec<TrainingPackage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM training_packages
             WHERE user_id = $1 AND is_deleted = false
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, TrainingPackage>(&query)
            .bind(client_id)
            .fetch_all(pool)
            .await
    }

    /// Active, non-deleted packages whose client is in the branch.
    ///
    /// The coach's branch never admits a row here.
    pub async fn list_with_active_training(
        pool: &PgPool,
        branch_id: Option<DbId>,
    ) -> Result<Vec<TrainingPackage>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS} FROM training_packages p
             JOIN users u ON u.id = p.user_id
             WHERE p.status = 'active'
               AND p.is_deleted = false
               AND ($1::BIGINT IS NULL OR u.branch_id = $1)
             ORDER BY p.created_at DESC, p.id DESC"
        );
        sqlx::query_as::<_, TrainingPackage>(&query)
            .bind(branch_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Updates and deletes
    // -----------------------------------------------------------------------

    /// Apply a generic patch. Only non-`None` fields are written.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTrainingPackage,
    ) -> Result<Option<TrainingPackage>, sqlx::Error> {
        let query = format!(
            "UPDATE training_packages SET
                coach_id = COALESCE($2, coach_id),
                training_type = COALESCE($3, training_type),
                total = COALESCE($4, total),
                status = COALESCE($5, status)
             WHERE id = $1 AND is_deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TrainingPackage>(&query)
            .bind(id)
            .bind(input.coach_id)
            .bind(&input.training_type)
            .bind(input.total)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a package. Returns `true` if a row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE training_packages SET is_deleted = true WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Permanently delete a package; its sessions go with it.
    pub async fn hard_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM training_packages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether any package, soft-deleted or not, belongs to `client_id`.
    pub async fn exists_for_client(pool: &PgPool, client_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM training_packages WHERE user_id = $1)")
            .bind(client_id)
            .fetch_one(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Transaction-scoped scheduling writes
    // -----------------------------------------------------------------------

    /// Lock a non-deleted package row for the rest of the transaction.
    ///
    /// Concurrent transitions on the same package wait here, so each one
    /// reads the schedule as the previous one left it.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<TrainingPackage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM training_packages
             WHERE id = $1 AND is_deleted = false
             FOR UPDATE"
        );
        sqlx::query_as::<_, TrainingPackage>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Write one session's mutable fields back.
    pub async fn update_session(
        conn: &mut PgConnection,
        package_id: DbId,
        session: &SessionRecord,
    ) -> Result<TrainingSession, sqlx::Error> {
        let query = format!(
            "UPDATE training_sessions SET
                date_assigned = $3,
                time_assigned = $4,
                status = $5,
                trainings = $6
             WHERE id = $1 AND package_id = $2
             RETURNING {SESSION_COLUMNS}"
        );
        sqlx::query_as::<_, TrainingSession>(&query)
            .bind(session.id)
            .bind(package_id)
            .bind(session.date_assigned)
            .bind(session.time_assigned)
            .bind(session.status.as_str())
            .bind(&session.trainings)
            .fetch_one(conn)
            .await
    }

    /// Set the lifecycle status of a package.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE training_packages SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(conn)
            .await?;
        Ok(())
    }
}
