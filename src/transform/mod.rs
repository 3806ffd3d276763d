//! Style-transformation domain: models, errors and the request manager.

pub mod error;
pub mod manager;
pub mod models;

pub use error::TransformError;
pub use manager::{TransformManager, TransformRequest, MAX_STYLES_PER_REQUEST};
pub use models::{
    Job, JobStatus, Profile, Style, SubscriptionTier, Track, Transformation, TransformationStatus,
};
