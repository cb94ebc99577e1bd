//! Blog feed client library.
//!
//! Talks to a social blogging HTTP API: browses a paginated, filterable feed
//! of posts, signs users in and up, and creates new posts.

pub mod api;
pub mod auth;
pub mod config;
pub mod console;
pub mod constants;
pub mod feed;
pub mod models;
pub mod notification;
pub mod session;
