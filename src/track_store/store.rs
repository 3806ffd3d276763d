//! SQLite store for the track-transformation service.
//!
//! One database holds users, sessions, tracks, transformations, jobs and
//! usage profiles. Multi-row operations (transform requests, cancellation,
//! worker write-back) run inside a single transaction.

use super::schema::TRACK_SCHEMA_SQL;
use crate::transform::models::{
    Job, JobStatus, Profile, Style, SubscriptionTier, Track, Transformation, TransformationStatus,
};
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Result of a transformation request, in request order.
#[derive(Debug)]
pub struct TransformOutcome {
    pub transformations: Vec<Transformation>,
    /// How many of the requested styles were created by this call (the rest
    /// already existed and were returned as-is).
    pub newly_created: usize,
}

/// Result of a cancellation attempt.
#[derive(Debug)]
pub enum CancelOutcome {
    Cancelled(Job),
    /// The job had already reached a terminal state.
    NotCancellable(JobStatus),
    NotFound,
}

/// Trait for track storage operations.
pub trait TrackStore: Send + Sync {
    // ==================== Users & Sessions ====================

    /// Create a user, failing if the handle is taken.
    fn create_user(&self, handle: &str) -> Result<i64>;

    /// Look up a user id by handle.
    fn get_user_id(&self, handle: &str) -> Result<Option<i64>>;

    /// Store (or replace) the password hash for a user.
    fn set_user_password_hash(&self, user_id: i64, hash: &str) -> Result<()>;

    /// Get the password hash for a user.
    fn get_user_password_hash(&self, user_id: i64) -> Result<Option<String>>;

    /// Register a session token for a user.
    fn add_auth_token(&self, user_id: i64, token: &str) -> Result<()>;

    /// Resolve a session token to its user, updating last_used.
    fn get_auth_token_user(&self, token: &str) -> Result<Option<i64>>;

    /// Delete a session token. Returns false if it did not exist.
    fn delete_auth_token(&self, token: &str) -> Result<bool>;

    // ==================== Tracks ====================

    /// Create a track and bump the owner's upload counters.
    fn create_track(
        &self,
        user_id: i64,
        name: &str,
        file_path: &str,
        duration_seconds: f64,
        file_size_mb: f64,
    ) -> Result<Track>;

    /// Get a track by id, scoped to its owner.
    fn get_track(&self, user_id: i64, track_id: i64) -> Result<Option<Track>>;

    /// List a user's tracks, newest first.
    fn list_tracks(&self, user_id: i64) -> Result<Vec<Track>>;

    /// Rename a track. Returns false if absent or foreign.
    fn rename_track(&self, user_id: i64, track_id: i64, name: &str) -> Result<bool>;

    /// Delete a track and cascade its transformations and jobs. Usage
    /// counters are left untouched. Returns false if absent or foreign.
    fn delete_track(&self, user_id: i64, track_id: i64) -> Result<bool>;

    /// Case-insensitive name substring search over a user's tracks.
    fn search_tracks(&self, user_id: i64, query: &str, limit: usize) -> Result<Vec<Track>>;

    // ==================== Transformations ====================

    /// Request transformations of a track into the given styles.
    ///
    /// Returns None if the track does not exist or belongs to someone else.
    /// Per style, either reuses the existing transformation row or creates a
    /// fresh pending one plus a queued job; the unique (track_id, style)
    /// index makes concurrent identical requests converge on one row.
    /// Counters are incremented by the newly-created count only.
    fn request_transformations(
        &self,
        user_id: i64,
        track_id: i64,
        styles: &[Style],
    ) -> Result<Option<TransformOutcome>>;

    /// Get a transformation by id, scoped to the track owner.
    fn get_transformation(&self, user_id: i64, id: i64) -> Result<Option<Transformation>>;

    /// List all transformations of a user's tracks, newest first.
    fn list_transformations(&self, user_id: i64) -> Result<Vec<Transformation>>;

    // ==================== Jobs ====================

    /// Get a job by its UUID, scoped to its owner.
    fn get_job(&self, user_id: i64, job_id: &str) -> Result<Option<Job>>;

    /// List a user's jobs, newest first.
    fn list_jobs(&self, user_id: i64) -> Result<Vec<Job>>;

    /// List a user's jobs still in queued or processing state.
    fn list_active_jobs(&self, user_id: i64) -> Result<Vec<Job>>;

    /// Cancel a queued or processing job and fail its transformation.
    fn cancel_job(&self, user_id: i64, job_id: &str) -> Result<CancelOutcome>;

    // ==================== Worker write-back ====================

    /// Claim a queued job for processing. Returns false if the job is
    /// missing or not queued.
    fn mark_job_processing(&self, job_id: &str) -> Result<bool>;

    /// Report a job's progress, clamped to [0, 100]. Only non-terminal jobs
    /// are updated.
    fn set_job_progress(&self, job_id: &str, percentage: i64) -> Result<bool>;

    /// Complete a job: job and transformation go to completed, the output
    /// reference and timing are recorded and the owner's total processing
    /// time is bumped. Returns false if the job is missing or terminal.
    fn complete_job(
        &self,
        job_id: &str,
        output_path: Option<&str>,
        processing_time_seconds: f64,
    ) -> Result<bool>;

    /// Fail a job: job and transformation go to failed with the given
    /// message. Returns false if the job is missing or terminal.
    fn fail_job(&self, job_id: &str, error: &str) -> Result<bool>;

    // ==================== Profiles ====================

    /// Get a user's profile, creating a zeroed one on first access.
    fn get_or_create_profile(&self, user_id: i64) -> Result<Profile>;
}

/// SQLite implementation of TrackStore.
pub struct SqliteTrackStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTrackStore {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open track database: {:?}", path))?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        conn.execute_batch(TRACK_SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        conn.execute_batch(TRACK_SCHEMA_SQL)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_track(row: &rusqlite::Row) -> rusqlite::Result<Track> {
        Ok(Track {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            file_path: row.get("file_path")?,
            duration_seconds: row.get("duration_seconds")?,
            file_size_mb: row.get("file_size_mb")?,
            tempo: row.get("tempo")?,
            key: row.get("key")?,
            energy: row.get("energy")?,
            valence: row.get("valence")?,
            created: row.get("created")?,
            updated: row.get("updated")?,
        })
    }

    fn row_to_transformation(row: &rusqlite::Row) -> rusqlite::Result<Transformation> {
        Ok(Transformation {
            id: row.get("id")?,
            track_id: row.get("track_id")?,
            style: Style::from_str(&row.get::<_, String>("style")?).unwrap_or(Style::Lofi),
            status: TransformationStatus::from_str(&row.get::<_, String>("status")?)
                .unwrap_or(TransformationStatus::Pending),
            output_path: row.get("output_path")?,
            processing_time_seconds: row.get("processing_time_seconds")?,
            error_message: row.get("error_message")?,
            tempo_shift: row.get("tempo_shift")?,
            pitch_shift: row.get("pitch_shift")?,
            reverb_amount: row.get("reverb_amount")?,
            filter_cutoff: row.get("filter_cutoff")?,
            created: row.get("created")?,
            updated: row.get("updated")?,
        })
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
        Ok(Job {
            id: row.get("id")?,
            transformation_id: row.get("transformation_id")?,
            user_id: row.get("user_id")?,
            job_id: row.get("job_id")?,
            status: JobStatus::from_str(&row.get::<_, String>("status")?)
                .unwrap_or(JobStatus::Queued),
            progress_percentage: row.get("progress_percentage")?,
            started_at: row.get("started_at")?,
            completed_at: row.get("completed_at")?,
            error_details: row.get("error_details")?,
            created: row.get("created")?,
            updated: row.get("updated")?,
        })
    }

    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        Ok(Profile {
            user_id: row.get("user_id")?,
            total_tracks_uploaded: row.get("total_tracks_uploaded")?,
            total_transformations: row.get("total_transformations")?,
            total_processing_time: row.get("total_processing_time")?,
            monthly_uploads: row.get("monthly_uploads")?,
            monthly_transformations: row.get("monthly_transformations")?,
            subscription_tier: SubscriptionTier::from_str(
                &row.get::<_, String>("subscription_tier")?,
            )
            .unwrap_or(SubscriptionTier::Free),
            created: row.get("created")?,
            updated: row.get("updated")?,
        })
    }
}

const NOW: &str = "cast(strftime('%s','now') as int)";

impl TrackStore for SqliteTrackStore {
    // ==================== Users & Sessions ====================

    fn create_user(&self, handle: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute("INSERT INTO user (handle) VALUES (?1)", params![handle])
            .with_context(|| format!("Failed to create user '{}'", handle))?;
        Ok(conn.last_insert_rowid())
    }

    fn get_user_id(&self, handle: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                "SELECT id FROM user WHERE handle = ?1",
                params![handle],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }

    fn set_user_password_hash(&self, user_id: i64, hash: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO user_credentials (user_id, hash) VALUES (?1, ?2)
            ON CONFLICT(user_id) DO UPDATE SET hash = excluded.hash
            "#,
            params![user_id, hash],
        )?;
        Ok(())
    }

    fn get_user_password_hash(&self, user_id: i64) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let hash = conn
            .query_row(
                "SELECT hash FROM user_credentials WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    fn add_auth_token(&self, user_id: i64, token: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO auth_token (user_id, value) VALUES (?1, ?2)",
            params![user_id, token],
        )?;
        Ok(())
    }

    fn get_auth_token_user(&self, token: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        let user_id: Option<i64> = conn
            .query_row(
                "SELECT user_id FROM auth_token WHERE value = ?1",
                params![token],
                |row| row.get(0),
            )
            .optional()?;
        if user_id.is_some() {
            conn.execute(
                &format!("UPDATE auth_token SET last_used = {NOW} WHERE value = ?1"),
                params![token],
            )?;
        }
        Ok(user_id)
    }

    fn delete_auth_token(&self, token: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM auth_token WHERE value = ?1", params![token])?;
        Ok(deleted > 0)
    }

    // ==================== Tracks ====================

    fn create_track(
        &self,
        user_id: i64,
        name: &str,
        file_path: &str,
        duration_seconds: f64,
        file_size_mb: f64,
    ) -> Result<Track> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            r#"
            INSERT INTO track (user_id, name, file_path, duration_seconds, file_size_mb)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![user_id, name, file_path, duration_seconds, file_size_mb],
        )?;
        let track_id = tx.last_insert_rowid();
        tx.execute(
            &format!(
                r#"
                INSERT INTO profile (user_id, total_tracks_uploaded, monthly_uploads)
                VALUES (?1, 1, 1)
                ON CONFLICT(user_id) DO UPDATE SET
                    total_tracks_uploaded = total_tracks_uploaded + 1,
                    monthly_uploads = monthly_uploads + 1,
                    updated = {NOW}
                "#
            ),
            params![user_id],
        )?;
        let track = tx.query_row(
            "SELECT * FROM track WHERE id = ?1",
            params![track_id],
            Self::row_to_track,
        )?;
        tx.commit()?;
        Ok(track)
    }

    fn get_track(&self, user_id: i64, track_id: i64) -> Result<Option<Track>> {
        let conn = self.conn.lock().unwrap();
        let track = conn
            .query_row(
                "SELECT * FROM track WHERE id = ?1 AND user_id = ?2",
                params![track_id, user_id],
                Self::row_to_track,
            )
            .optional()?;
        Ok(track)
    }

    fn list_tracks(&self, user_id: i64) -> Result<Vec<Track>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM track WHERE user_id = ?1 ORDER BY created DESC, id DESC")?;
        let tracks = stmt
            .query_map(params![user_id], Self::row_to_track)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tracks)
    }

    fn rename_track(&self, user_id: i64, track_id: i64, name: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!("UPDATE track SET name = ?1, updated = {NOW} WHERE id = ?2 AND user_id = ?3"),
            params![name, track_id, user_id],
        )?;
        Ok(changed > 0)
    }

    fn delete_track(&self, user_id: i64, track_id: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            "DELETE FROM track WHERE id = ?1 AND user_id = ?2",
            params![track_id, user_id],
        )?;
        Ok(deleted > 0)
    }

    fn search_tracks(&self, user_id: i64, query: &str, limit: usize) -> Result<Vec<Track>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM track
            WHERE user_id = ?1 AND name LIKE '%' || ?2 || '%'
            ORDER BY created DESC, id DESC
            LIMIT ?3
            "#,
        )?;
        let tracks = stmt
            .query_map(params![user_id, query, limit as i64], Self::row_to_track)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tracks)
    }

    // ==================== Transformations ====================

    fn request_transformations(
        &self,
        user_id: i64,
        track_id: i64,
        styles: &[Style],
    ) -> Result<Option<TransformOutcome>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let owned: Option<i64> = tx
            .query_row(
                "SELECT id FROM track WHERE id = ?1 AND user_id = ?2",
                params![track_id, user_id],
                |row| row.get(0),
            )
            .optional()?;
        if owned.is_none() {
            return Ok(None);
        }

        let mut transformations = Vec::with_capacity(styles.len());
        let mut newly_created = 0;
        for style in styles {
            // Transform parameters stay at their zero-valued schema defaults
            let inserted = tx.execute(
                r#"
                INSERT INTO transformation (track_id, style)
                VALUES (?1, ?2)
                ON CONFLICT(track_id, style) DO NOTHING
                "#,
                params![track_id, style.as_str()],
            )?;
            let transformation = tx.query_row(
                "SELECT * FROM transformation WHERE track_id = ?1 AND style = ?2",
                params![track_id, style.as_str()],
                Self::row_to_transformation,
            )?;
            if inserted > 0 {
                newly_created += 1;
                tx.execute(
                    "INSERT INTO job (transformation_id, user_id, job_id) VALUES (?1, ?2, ?3)",
                    params![transformation.id, user_id, Uuid::new_v4().to_string()],
                )?;
            }
            transformations.push(transformation);
        }

        if newly_created > 0 {
            tx.execute(
                &format!(
                    r#"
                    INSERT INTO profile (user_id, total_transformations, monthly_transformations)
                    VALUES (?1, ?2, ?2)
                    ON CONFLICT(user_id) DO UPDATE SET
                        total_transformations = total_transformations + ?2,
                        monthly_transformations = monthly_transformations + ?2,
                        updated = {NOW}
                    "#
                ),
                params![user_id, newly_created as i64],
            )?;
        }

        tx.commit()?;
        Ok(Some(TransformOutcome {
            transformations,
            newly_created,
        }))
    }

    fn get_transformation(&self, user_id: i64, id: i64) -> Result<Option<Transformation>> {
        let conn = self.conn.lock().unwrap();
        let transformation = conn
            .query_row(
                r#"
                SELECT t.* FROM transformation t
                JOIN track tr ON tr.id = t.track_id
                WHERE t.id = ?1 AND tr.user_id = ?2
                "#,
                params![id, user_id],
                Self::row_to_transformation,
            )
            .optional()?;
        Ok(transformation)
    }

    fn list_transformations(&self, user_id: i64) -> Result<Vec<Transformation>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT t.* FROM transformation t
            JOIN track tr ON tr.id = t.track_id
            WHERE tr.user_id = ?1
            ORDER BY t.created DESC, t.id DESC
            "#,
        )?;
        let transformations = stmt
            .query_map(params![user_id], Self::row_to_transformation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(transformations)
    }

    // ==================== Jobs ====================

    fn get_job(&self, user_id: i64, job_id: &str) -> Result<Option<Job>> {
        let conn = self.conn.lock().unwrap();
        let job = conn
            .query_row(
                "SELECT * FROM job WHERE job_id = ?1 AND user_id = ?2",
                params![job_id, user_id],
                Self::row_to_job,
            )
            .optional()?;
        Ok(job)
    }

    fn list_jobs(&self, user_id: i64) -> Result<Vec<Job>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT * FROM job WHERE user_id = ?1 ORDER BY created DESC, id DESC")?;
        let jobs = stmt
            .query_map(params![user_id], Self::row_to_job)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(jobs)
    }

    fn list_active_jobs(&self, user_id: i64) -> Result<Vec<Job>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM job
            WHERE user_id = ?1 AND status IN ('queued', 'processing')
            ORDER BY created DESC, id DESC
            "#,
        )?;
        let jobs = stmt
            .query_map(params![user_id], Self::row_to_job)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(jobs)
    }

    fn cancel_job(&self, user_id: i64, job_id: &str) -> Result<CancelOutcome> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let row: Option<(i64, String, i64)> = tx
            .query_row(
                "SELECT id, status, transformation_id FROM job WHERE job_id = ?1 AND user_id = ?2",
                params![job_id, user_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        let (id, status, transformation_id) = match row {
            None => return Ok(CancelOutcome::NotFound),
            Some(row) => row,
        };
        let status = JobStatus::from_str(&status).unwrap_or(JobStatus::Queued);
        if status.is_terminal() {
            return Ok(CancelOutcome::NotCancellable(status));
        }

        tx.execute(
            &format!(
                r#"
                UPDATE job SET
                    status = 'cancelled',
                    error_details = ?2,
                    completed_at = {NOW},
                    updated = {NOW}
                WHERE id = ?1
                "#
            ),
            params![id, CANCELLED_BY_USER],
        )?;
        tx.execute(
            &format!(
                r#"
                UPDATE transformation SET
                    status = 'failed',
                    error_message = ?2,
                    updated = {NOW}
                WHERE id = ?1
                "#
            ),
            params![transformation_id, CANCELLED_BY_USER],
        )?;

        let job = tx.query_row(
            "SELECT * FROM job WHERE id = ?1",
            params![id],
            Self::row_to_job,
        )?;
        tx.commit()?;
        Ok(CancelOutcome::Cancelled(job))
    }

    // ==================== Worker write-back ====================

    fn mark_job_processing(&self, job_id: &str) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let claimed = tx.execute(
            &format!(
                r#"
                UPDATE job SET
                    status = 'processing',
                    started_at = {NOW},
                    updated = {NOW}
                WHERE job_id = ?1 AND status = 'queued'
                "#
            ),
            params![job_id],
        )?;
        if claimed > 0 {
            tx.execute(
                &format!(
                    r#"
                    UPDATE transformation SET status = 'processing', updated = {NOW}
                    WHERE id = (SELECT transformation_id FROM job WHERE job_id = ?1)
                    "#
                ),
                params![job_id],
            )?;
        }
        tx.commit()?;
        Ok(claimed > 0)
    }

    fn set_job_progress(&self, job_id: &str, percentage: i64) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let changed = conn.execute(
            &format!(
                r#"
                UPDATE job SET progress_percentage = ?2, updated = {NOW}
                WHERE job_id = ?1 AND status IN ('queued', 'processing')
                "#
            ),
            params![job_id, percentage.clamp(0, 100)],
        )?;
        Ok(changed > 0)
    }

    fn complete_job(
        &self,
        job_id: &str,
        output_path: Option<&str>,
        processing_time_seconds: f64,
    ) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let row: Option<(i64, i64, i64)> = tx
            .query_row(
                r#"
                SELECT id, transformation_id, user_id FROM job
                WHERE job_id = ?1 AND status IN ('queued', 'processing')
                "#,
                params![job_id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;
        let (id, transformation_id, user_id) = match row {
            None => return Ok(false),
            Some(row) => row,
        };

        tx.execute(
            &format!(
                r#"
                UPDATE job SET
                    status = 'completed',
                    progress_percentage = 100,
                    completed_at = {NOW},
                    updated = {NOW}
                WHERE id = ?1
                "#
            ),
            params![id],
        )?;
        tx.execute(
            &format!(
                r#"
                UPDATE transformation SET
                    status = 'completed',
                    output_path = ?2,
                    processing_time_seconds = ?3,
                    updated = {NOW}
                WHERE id = ?1
                "#
            ),
            params![transformation_id, output_path, processing_time_seconds],
        )?;
        tx.execute(
            &format!(
                r#"
                UPDATE profile SET
                    total_processing_time = total_processing_time + ?2,
                    updated = {NOW}
                WHERE user_id = ?1
                "#
            ),
            params![user_id, processing_time_seconds],
        )?;

        tx.commit()?;
        Ok(true)
    }

    fn fail_job(&self, job_id: &str, error: &str) -> Result<bool> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let row: Option<(i64, i64)> = tx
            .query_row(
                r#"
                SELECT id, transformation_id FROM job
                WHERE job_id = ?1 AND status IN ('queued', 'processing')
                "#,
                params![job_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (id, transformation_id) = match row {
            None => return Ok(false),
            Some(row) => row,
        };

        tx.execute(
            &format!(
                r#"
                UPDATE job SET
                    status = 'failed',
                    error_details = ?2,
                    completed_at = {NOW},
                    updated = {NOW}
                WHERE id = ?1
                "#
            ),
            params![id, error],
        )?;
        tx.execute(
            &format!(
                r#"
                UPDATE transformation SET
                    status = 'failed',
                    error_message = ?2,
                    updated = {NOW}
                WHERE id = ?1
                "#
            ),
            params![transformation_id, error],
        )?;

        tx.commit()?;
        Ok(true)
    }

    // ==================== Profiles ====================

    fn get_or_create_profile(&self, user_id: i64) -> Result<Profile> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR IGNORE INTO profile (user_id) VALUES (?1)",
            params![user_id],
        )?;
        let profile = conn.query_row(
            "SELECT * FROM profile WHERE user_id = ?1",
            params![user_id],
            Self::row_to_profile,
        )?;
        Ok(profile)
    }
}

/// Message recorded on both the job and its transformation when a user
/// cancels the job.
pub const CANCELLED_BY_USER: &str = "Job cancelled by user";
