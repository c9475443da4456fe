//! Permission constants for the Lectern API.
//!
//! Centralized permission strings used by the static role table in
//! `lectern_auth::authorization` and by the permission extractors in the
//! server crate.
//!
//! # Example
//!
//! ```ignore
//! use lectern_core::permissions;
//!
//! if has_permission(&user, permissions::GRADES_UPDATE) {
//!     // Record a grade
//! }
//! ```

/// Grants every permission. Only the system administrator role holds it.
pub const ALL: &str = "*";

// =============================================================================
// Users permissions
// =============================================================================

/// Permission to create users
pub const USERS_CREATE: &str = "users:create";
/// Permission to read users
pub const USERS_READ: &str = "users:read";
/// Permission to update users
pub const USERS_UPDATE: &str = "users:update";
/// Permission to delete users
pub const USERS_DELETE: &str = "users:delete";

// =============================================================================
// Courses permissions
// =============================================================================

/// Permission to create courses
pub const COURSES_CREATE: &str = "courses:create";
/// Permission to read courses
pub const COURSES_READ: &str = "courses:read";
/// Permission to update courses
pub const COURSES_UPDATE: &str = "courses:update";
/// Permission to delete courses
pub const COURSES_DELETE: &str = "courses:delete";

// =============================================================================
// Grades permissions
// =============================================================================

pub const GRADES_CREATE: &str = "grades:create";
pub const GRADES_READ: &str = "grades:read";
pub const GRADES_UPDATE: &str = "grades:update";
pub const GRADES_DELETE: &str = "grades:delete";

// =============================================================================
// Messages permissions
// =============================================================================

pub const MESSAGES_SEND: &str = "messages:send";
pub const MESSAGES_READ: &str = "messages:read";

// =============================================================================
// Files permissions
// =============================================================================

pub const FILES_CREATE: &str = "files:create";
pub const FILES_READ: &str = "files:read";
pub const FILES_DELETE: &str = "files:delete";

// =============================================================================
// Reports and settings permissions
// =============================================================================

/// Permission to view reports
pub const REPORTS_VIEW: &str = "reports:view";
/// Permission to read settings
pub const SETTINGS_READ: &str = "settings:read";
/// Permission to update settings
pub const SETTINGS_UPDATE: &str = "settings:update";

// =============================================================================
// Sessions permissions
// =============================================================================

/// Permission to revoke other users' sessions
pub const SESSIONS_REVOKE: &str = "sessions:revoke";
