//! Feed controller: paginated post retrieval, local category filtering,
//! post creation and the notification shown after each action.
//!
//! Methods take `&self` so several page loads may be in flight at once.
//! Each load is tagged with a sequence number and only the latest issued
//! load is allowed to update the state.

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, PostApi};
use crate::constants::{messages, PAGE_LIMIT};
use crate::models::{CategoryFilter, DraftField, DraftPost, Post};
use crate::notification::{Notification, NotificationSlot};
use crate::session::SessionStore;

pub use state::FeedState;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("page numbers start at 1, got {0}")]
    InvalidPage(u32),
    #[error("not signed in")]
    Unauthenticated,
    #[error("the new post dialog is not open")]
    DialogClosed,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Result of a page load that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response replaced the loaded page.
    Applied,
    /// A newer load was issued while this one was in flight; the response was discarded.
    Superseded,
}

/// Point-in-time copy of everything the front end renders.
#[derive(Debug, Clone)]
pub struct FeedView {
    pub feed: FeedState,
    pub visible: Vec<Post>,
    /// Draft of the open creation dialog, `None` when the dialog is closed.
    pub dialog: Option<DraftPost>,
    pub notification: Option<Notification>,
}

#[derive(Debug, Default)]
struct Inner {
    feed: FeedState,
    dialog: Option<DraftPost>,
    notification: NotificationSlot,
    latest_load: u64,
}

pub struct FeedController {
    api: Arc<dyn PostApi>,
    session: Arc<dyn SessionStore>,
    inner: Mutex<Inner>,
}

impl FeedController {
    #[must_use]
    pub fn new(api: Arc<dyn PostApi>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            session,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Initial load of page 1.
    ///
    /// # Errors
    ///
    /// See [`FeedController::load_page`].
    pub async fn activate(&self) -> Result<LoadOutcome, FeedError> {
        self.load_page(1).await
    }

    /// Move to `page` and fetch it.
    ///
    /// The page number is recorded as soon as the request is issued. Posts and
    /// total pages are replaced only when this is still the latest load once
    /// the response arrives.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::InvalidPage`] for page 0, or [`FeedError::Api`] if
    /// the latest load failed. A failed load also raises an error notification.
    pub async fn load_page(&self, page: u32) -> Result<LoadOutcome, FeedError> {
        if page == 0 {
            return Err(FeedError::InvalidPage(page));
        }

        let seq = {
            let mut inner = self.lock();
            inner.latest_load += 1;
            inner.feed.page = page;
            inner.latest_load
        };
        debug!(page, seq, "Loading feed page");

        let result = self.api.fetch_page(page, PAGE_LIMIT).await;

        let mut inner = self.lock();
        if seq != inner.latest_load {
            match &result {
                Ok(_) => debug!(page, seq, "Discarding superseded page response"),
                Err(e) => warn!(page, seq, "Superseded page load failed: {e}"),
            }
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(response) => {
                info!(
                    page,
                    posts = response.posts.len(),
                    total_pages = response.total_pages,
                    "Feed page loaded"
                );
                inner.feed.posts = response.posts;
                inner.feed.total_pages = response.total_pages;
                Ok(LoadOutcome::Applied)
            }
            Err(e) => {
                error!(page, "Failed to fetch posts: {e}");
                inner.notification.error(messages::LOAD_FAILED);
                Err(e.into())
            }
        }
    }

    /// Apply a category filter to the loaded page. No request is made.
    pub fn set_category_filter(&self, filter: CategoryFilter) {
        let mut inner = self.lock();
        inner.feed.filter = filter;
        debug!(%filter, visible = inner.feed.visible_count(), "Category filter changed");
    }

    #[must_use]
    pub fn state(&self) -> FeedState {
        self.lock().feed.clone()
    }

    #[must_use]
    pub fn visible_posts(&self) -> Vec<Post> {
        self.lock().feed.visible().cloned().collect()
    }

    #[must_use]
    pub fn view(&self) -> FeedView {
        let mut inner = self.lock();
        FeedView {
            feed: inner.feed.clone(),
            visible: inner.feed.visible().cloned().collect(),
            dialog: inner.dialog.clone(),
            notification: inner.notification.active().cloned(),
        }
    }

    /// Open the creation dialog with an empty draft.
    pub fn open_dialog(&self) {
        self.lock().dialog = Some(DraftPost::default());
    }

    /// Close the creation dialog, discarding the draft.
    pub fn close_dialog(&self) {
        self.lock().dialog = None;
    }

    #[must_use]
    pub fn is_dialog_open(&self) -> bool {
        self.lock().dialog.is_some()
    }

    /// Set one field of the open draft.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::DialogClosed`] if no dialog is open.
    pub fn update_draft(
        &self,
        field: DraftField,
        value: impl Into<String>,
    ) -> Result<(), FeedError> {
        let mut inner = self.lock();
        let draft = inner.dialog.as_mut().ok_or(FeedError::DialogClosed)?;
        draft.set(field, value);
        Ok(())
    }

    /// Submit the draft held by the open dialog.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::DialogClosed`] if no dialog is open, otherwise see
    /// [`FeedController::submit_new_post`].
    pub async fn submit_dialog(&self) -> Result<Post, FeedError> {
        let draft = self.lock().dialog.clone().ok_or(FeedError::DialogClosed)?;
        self.submit_new_post(&draft).await
    }

    /// Create a post from `draft` using the stored session token.
    ///
    /// On success the created post is prepended to the loaded page, the dialog
    /// closes and a success notification is raised. On failure the posts are
    /// left unchanged, the dialog stays open and a failure notification is raised.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Unauthenticated`] without sending a request when no
    /// session is stored, or [`FeedError::Api`] if the API rejects the post.
    pub async fn submit_new_post(&self, draft: &DraftPost) -> Result<Post, FeedError> {
        let Some(session) = self.session.load().await else {
            warn!("Cannot add post without a session");
            self.lock().notification.error(messages::POST_FAILED);
            return Err(FeedError::Unauthenticated);
        };

        match self.api.create_post(draft, &session.token).await {
            Ok(post) => {
                info!(id = %post.id, title = %post.title, "Post added");
                let mut inner = self.lock();
                inner.feed.posts.insert(0, post.clone());
                inner.dialog = None;
                inner.notification.success(messages::POST_ADDED);
                Ok(post)
            }
            Err(e) => {
                error!("Error adding post: {e}");
                self.lock().notification.error(messages::POST_FAILED);
                Err(e.into())
            }
        }
    }

    /// The notification currently shown, if it has not timed out.
    #[must_use]
    pub fn notification(&self) -> Option<Notification> {
        self.lock().notification.active().cloned()
    }

    pub fn dismiss_notification(&self) {
        self.lock().notification.dismiss();
    }
}
