//! Session storage keys.

/// Keys under which values are stored in the tower-sessions session.
pub mod session_keys {
    /// The authenticated user (`CurrentUser`).
    pub const CURRENT_USER: &str = "current_user";
}
