//! Backend for an audio-track upload and style-transformation service.
//!
//! Users upload tracks, request stylistic renderings (lofi, phonk, melody,
//! 8d), follow job status and fetch usage statistics. No audio processing
//! happens in-process; jobs are ledger rows an external worker honors.

pub mod config;
pub mod media;
pub mod server;
pub mod spotify;
pub mod track_store;
pub mod transform;
pub mod user;
