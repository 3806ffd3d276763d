//! SQLite persistence for users, tracks, transformations, jobs and profiles.

mod schema;
mod store;

pub use store::{
    CancelOutcome, SqliteTrackStore, TrackStore, TransformOutcome, CANCELLED_BY_USER,
};
