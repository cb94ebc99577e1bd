//! Shared constants used across the client.

use std::time::Duration;

/// Number of posts requested per feed page.
pub const PAGE_LIMIT: u32 = 8;

/// How long a notification stays visible before it expires on its own.
pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(6);

/// Key under which the signed-in user record is persisted in the session file.
pub const SESSION_KEY: &str = "user";

/// User agent sent with every API request.
pub const CLIENT_USER_AGENT: &str = concat!("blogfeed/", env!("CARGO_PKG_VERSION"));

/// Notification messages shown to the user.
pub mod messages {
    pub const POST_ADDED: &str = "Post added successfully!";
    pub const POST_FAILED: &str = "Failed to add post";
    pub const LOAD_FAILED: &str = "Failed to load posts";
    pub const LOGIN_OK: &str = "Login successful!";
    pub const LOGIN_FAILED: &str = "Error logging in";
    pub const REGISTER_OK: &str = "Registration successful! Please sign in.";
    pub const REGISTER_FAILED: &str = "Failed to register user";
}
