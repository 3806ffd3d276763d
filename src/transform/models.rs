//! Data models for tracks, transformations, jobs and usage profiles.

use serde::{Deserialize, Serialize};

/// Transformation style preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    #[serde(rename = "lofi")]
    Lofi,
    #[serde(rename = "phonk")]
    Phonk,
    #[serde(rename = "melody")]
    Melody,
    #[serde(rename = "8d")]
    EightD,
}

impl Style {
    pub const ALL: &'static [Style] = &[Style::Lofi, Style::Phonk, Style::Melody, Style::EightD];

    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Lofi => "lofi",
            Style::Phonk => "phonk",
            Style::Melody => "melody",
            Style::EightD => "8d",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "lofi" => Some(Style::Lofi),
            "phonk" => Some(Style::Phonk),
            "melody" => Some(Style::Melody),
            "8d" => Some(Style::EightD),
            _ => None,
        }
    }
}

/// Status of a transformation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl TransformationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransformationStatus::Pending => "pending",
            TransformationStatus::Processing => "processing",
            TransformationStatus::Completed => "completed",
            TransformationStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(TransformationStatus::Pending),
            "processing" => Some(TransformationStatus::Processing),
            "completed" => Some(TransformationStatus::Completed),
            "failed" => Some(TransformationStatus::Failed),
            _ => None,
        }
    }
}

/// Status of a processing job.
///
/// Transitions: queued → processing → {completed, failed}, and
/// queued|processing → cancelled (user-initiated only). No transition is
/// defined out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Returns true for Completed, Failed and Cancelled.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            "cancelled" => Some(JobStatus::Cancelled),
            _ => None,
        }
    }
}

/// Subscription tier of a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Pro,
    Enterprise,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(SubscriptionTier::Free),
            "pro" => Some(SubscriptionTier::Pro),
            "enterprise" => Some(SubscriptionTier::Enterprise),
            _ => None,
        }
    }
}

/// An uploaded source audio track.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    /// Storage path of the original upload, relative to the media root.
    pub file_path: String,
    pub duration_seconds: f64,
    pub file_size_mb: f64,
    pub tempo: Option<f64>,
    pub key: Option<String>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    /// Unix timestamps (seconds).
    pub created: i64,
    pub updated: i64,
}

/// A requested stylistic rendering of a track. At most one per (track, style).
#[derive(Debug, Clone, Serialize)]
pub struct Transformation {
    pub id: i64,
    pub track_id: i64,
    pub style: Style,
    pub status: TransformationStatus,
    /// Storage path of the transformed output, relative to the media root.
    pub output_path: Option<String>,
    pub processing_time_seconds: Option<f64>,
    pub error_message: Option<String>,
    /// Transform parameters, zero-valued at creation. The external worker
    /// owns the values it actually applies.
    pub tempo_shift: f64,
    pub pitch_shift: f64,
    pub reverb_amount: f64,
    pub filter_cutoff: f64,
    pub created: i64,
    pub updated: i64,
}

/// Execution-tracking record paired 1:1 with a transformation.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: i64,
    pub transformation_id: i64,
    pub user_id: i64,
    /// Externally visible unique identifier (UUID v4).
    pub job_id: String,
    pub status: JobStatus,
    /// Clamped to [0, 100].
    pub progress_percentage: i64,
    pub started_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub error_details: Option<String>,
    pub created: i64,
    pub updated: i64,
}

/// Per-user aggregate usage counters.
///
/// Counters represent historical activity, not current inventory: deleting a
/// track or transformation does not roll them back. The monthly counters are
/// never reset here, that belongs to an external billing-cycle job.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: i64,
    pub total_tracks_uploaded: i64,
    pub total_transformations: i64,
    pub total_processing_time: f64,
    pub monthly_uploads: i64,
    pub monthly_transformations: i64,
    pub subscription_tier: SubscriptionTier,
    pub created: i64,
    pub updated: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_round_trips_through_str() {
        for style in Style::ALL {
            assert_eq!(Style::from_str(style.as_str()), Some(*style));
        }
        assert_eq!(Style::from_str("vaporwave"), None);
    }

    #[test]
    fn eightd_uses_wire_name() {
        assert_eq!(Style::EightD.as_str(), "8d");
        assert_eq!(
            serde_json::to_string(&Style::EightD).unwrap(),
            "\"8d\"".to_string()
        );
    }

    #[test]
    fn job_terminal_states() {
        assert!(!JobStatus::Queued.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }
}
