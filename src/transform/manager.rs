//! Transformation request handling on top of the store.
//!
//! The manager owns request validation and the HTTP-facing semantics
//! (dedup outcome shaping, cancellation, the download gate, usage stats);
//! everything transactional lives in the store.

use super::error::TransformError;
use super::models::{Job, Profile, Style, Transformation, TransformationStatus};
use crate::track_store::{CancelOutcome, TrackStore};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Most styles a single request may ask for. One per known style.
pub const MAX_STYLES_PER_REQUEST: usize = 4;

/// Body of POST /v1/tracks/{id}/transform.
#[derive(Debug, Deserialize)]
pub struct TransformRequest {
    pub track_id: i64,
    pub styles: Vec<Style>,
}

#[derive(Clone)]
pub struct TransformManager {
    store: Arc<dyn TrackStore>,
}

impl TransformManager {
    pub fn new(store: Arc<dyn TrackStore>) -> Self {
        Self { store }
    }

    /// Handle a transformation request against a track.
    ///
    /// `track_id` is the path parameter; the body must agree with it.
    /// Returns the full per-style transformation set in request order,
    /// whether each entry was created now or already existed.
    pub fn request(
        &self,
        user_id: i64,
        track_id: i64,
        request: TransformRequest,
    ) -> Result<Vec<Transformation>, TransformError> {
        if request.track_id != track_id {
            return Err(TransformError::IdentifierMismatch);
        }
        if request.styles.is_empty() {
            return Err(TransformError::Validation(
                "at least one style is required".to_string(),
            ));
        }
        if request.styles.len() > MAX_STYLES_PER_REQUEST {
            return Err(TransformError::Validation(format!(
                "at most {} styles per request",
                MAX_STYLES_PER_REQUEST
            )));
        }
        let mut seen = HashSet::new();
        if !request.styles.iter().all(|s| seen.insert(*s)) {
            return Err(TransformError::Validation(
                "duplicate styles in request".to_string(),
            ));
        }

        let outcome = self
            .store
            .request_transformations(user_id, track_id, &request.styles)?
            .ok_or(TransformError::NotFound)?;

        tracing::info!(
            user_id,
            track_id,
            requested = request.styles.len(),
            created = outcome.newly_created,
            "Transformation request handled"
        );
        Ok(outcome.transformations)
    }

    /// Cancel a queued or processing job by its UUID.
    pub fn cancel_job(&self, user_id: i64, job_id: &str) -> Result<Job, TransformError> {
        match self.store.cancel_job(user_id, job_id)? {
            CancelOutcome::Cancelled(job) => {
                tracing::info!(user_id, job_id, "Job cancelled");
                Ok(job)
            }
            CancelOutcome::NotCancellable(status) => Err(TransformError::InvalidState(format!(
                "job is already {}",
                status.as_str()
            ))),
            CancelOutcome::NotFound => Err(TransformError::NotFound),
        }
    }

    /// The download gate: release the output reference only for a completed
    /// transformation whose artifact reference exists. Returns the
    /// server-relative media path; the HTTP layer makes it absolute.
    pub fn download_path(
        &self,
        user_id: i64,
        transformation_id: i64,
    ) -> Result<String, TransformError> {
        let transformation = self
            .store
            .get_transformation(user_id, transformation_id)?
            .ok_or(TransformError::NotFound)?;
        if transformation.status != TransformationStatus::Completed {
            return Err(TransformError::NotReady);
        }
        // Completed but without an artifact reference counts as missing
        let output_path = transformation.output_path.ok_or(TransformError::NotFound)?;
        Ok(format!("/media/{}", output_path))
    }

    /// Usage counters for the stats endpoint.
    pub fn stats(&self, user_id: i64) -> Result<Profile, TransformError> {
        Ok(self.store.get_or_create_profile(user_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_store::SqliteTrackStore;

    fn manager_with_track() -> (TransformManager, Arc<SqliteTrackStore>, i64, i64) {
        let store = Arc::new(SqliteTrackStore::in_memory().unwrap());
        let user_id = store.create_user("tester").unwrap();
        let track = store
            .create_track(user_id, "Night Drive", "original_tracks/t.mp3", 180.0, 4.2)
            .unwrap();
        let manager = TransformManager::new(store.clone());
        (manager, store, user_id, track.id)
    }

    fn request_for(track_id: i64, styles: Vec<Style>) -> TransformRequest {
        TransformRequest { track_id, styles }
    }

    #[test]
    fn test_mismatched_track_id_rejected() {
        let (manager, _store, user_id, track_id) = manager_with_track();
        let err = manager
            .request(user_id, track_id, request_for(track_id + 1, vec![Style::Lofi]))
            .unwrap_err();
        assert!(matches!(err, TransformError::IdentifierMismatch));
    }

    #[test]
    fn test_empty_styles_rejected() {
        let (manager, _store, user_id, track_id) = manager_with_track();
        let err = manager
            .request(user_id, track_id, request_for(track_id, vec![]))
            .unwrap_err();
        assert!(matches!(err, TransformError::Validation(_)));
    }

    #[test]
    fn test_too_many_styles_rejected() {
        let (manager, _store, user_id, track_id) = manager_with_track();
        let styles = vec![
            Style::Lofi,
            Style::Phonk,
            Style::Melody,
            Style::EightD,
            Style::Lofi,
        ];
        let err = manager
            .request(user_id, track_id, request_for(track_id, styles))
            .unwrap_err();
        assert!(matches!(err, TransformError::Validation(_)));
    }

    #[test]
    fn test_duplicate_styles_rejected() {
        let (manager, _store, user_id, track_id) = manager_with_track();
        let err = manager
            .request(
                user_id,
                track_id,
                request_for(track_id, vec![Style::Lofi, Style::Lofi]),
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::Validation(_)));
    }

    #[test]
    fn test_unknown_track_is_not_found() {
        let (manager, _store, user_id, _track_id) = manager_with_track();
        let err = manager
            .request(user_id, 999, request_for(999, vec![Style::Lofi]))
            .unwrap_err();
        assert!(matches!(err, TransformError::NotFound));
    }

    #[test]
    fn test_request_returns_all_styles_in_order() {
        let (manager, _store, user_id, track_id) = manager_with_track();
        let transformations = manager
            .request(
                user_id,
                track_id,
                request_for(track_id, vec![Style::Phonk, Style::Lofi]),
            )
            .unwrap();
        assert_eq!(transformations.len(), 2);
        assert_eq!(transformations[0].style, Style::Phonk);
        assert_eq!(transformations[1].style, Style::Lofi);
    }

    #[test]
    fn test_download_gate() {
        let (manager, store, user_id, track_id) = manager_with_track();
        let transformations = manager
            .request(user_id, track_id, request_for(track_id, vec![Style::Lofi]))
            .unwrap();
        let transformation_id = transformations[0].id;
        let job_id = store.list_jobs(user_id).unwrap()[0].job_id.clone();

        // Still pending
        let err = manager.download_path(user_id, transformation_id).unwrap_err();
        assert!(matches!(err, TransformError::NotReady));

        // Completed without artifact reference
        store.complete_job(&job_id, None, 10.0).unwrap();
        let err = manager.download_path(user_id, transformation_id).unwrap_err();
        assert!(matches!(err, TransformError::NotFound));
    }

    #[test]
    fn test_download_of_completed_transformation() {
        let (manager, store, user_id, track_id) = manager_with_track();
        let transformations = manager
            .request(user_id, track_id, request_for(track_id, vec![Style::Lofi]))
            .unwrap();
        let job_id = store.list_jobs(user_id).unwrap()[0].job_id.clone();
        store
            .complete_job(&job_id, Some("transformed_tracks/out.mp3"), 10.0)
            .unwrap();

        let url = manager.download_path(user_id, transformations[0].id).unwrap();
        assert_eq!(url, "/media/transformed_tracks/out.mp3");
    }

    #[test]
    fn test_cancel_terminal_job_is_invalid_state() {
        let (manager, store, user_id, track_id) = manager_with_track();
        manager
            .request(user_id, track_id, request_for(track_id, vec![Style::Lofi]))
            .unwrap();
        let job_id = store.list_jobs(user_id).unwrap()[0].job_id.clone();
        store.complete_job(&job_id, None, 1.0).unwrap();

        let err = manager.cancel_job(user_id, &job_id).unwrap_err();
        assert!(matches!(err, TransformError::InvalidState(_)));
    }
}
