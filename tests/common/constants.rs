//! Shared constants for end-to-end tests
//!
//! When test data changes (user credentials, payloads, timeouts), update
//! only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user handle
pub const TEST_USER: &str = "testuser";

/// Regular test user password
pub const TEST_PASS: &str = "testpass123";

/// Second test user handle, for ownership-isolation tests
pub const OTHER_USER: &str = "otheruser";

/// Second test user password
pub const OTHER_PASS: &str = "otherpass123";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
