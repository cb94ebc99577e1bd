//! Sign-in and sign-up flows.
//!
//! Signing in stores the returned user record in the [`SessionStore`], which
//! is where [`crate::feed::FeedController`] reads its bearer token from.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{error, info, warn};

use crate::api::{ApiError, PostApi};
use crate::constants::messages;
use crate::models::{LoginRequest, RegisterRequest};
use crate::notification::{Notification, NotificationSlot};
use crate::session::{Session, SessionError, SessionStore};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct AuthController {
    api: Arc<dyn PostApi>,
    session: Arc<dyn SessionStore>,
    notification: Mutex<NotificationSlot>,
}

impl AuthController {
    #[must_use]
    pub fn new(api: Arc<dyn PostApi>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            session,
            notification: Mutex::new(NotificationSlot::default()),
        }
    }

    fn slot(&self) -> MutexGuard<'_, NotificationSlot> {
        self.notification
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Sign in and persist the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the credentials or the session
    /// cannot be written. The failure is also raised as a notification,
    /// using the server's message when it sent one.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let session = match self.api.login(&request).await {
            Ok(session) => session,
            Err(e) => {
                warn!(email, "Sign in failed: {e}");
                let message = e
                    .server_message()
                    .unwrap_or(messages::LOGIN_FAILED)
                    .to_string();
                self.slot().error(message);
                return Err(e.into());
            }
        };

        if let Err(e) = self.session.save(&session).await {
            error!("Failed to store session: {e}");
            self.slot().error(messages::LOGIN_FAILED);
            return Err(e.into());
        }

        info!(email, username = ?session.username(), "Signed in");
        self.slot().success(messages::LOGIN_OK);
        Ok(session)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the registration.
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.api.register(&request).await {
            Ok(()) => {
                info!(username, email, "Registered user");
                self.slot().success(messages::REGISTER_OK);
                Ok(())
            }
            Err(e) => {
                error!(username, "Error registering user: {e}");
                self.slot().error(messages::REGISTER_FAILED);
                Err(e.into())
            }
        }
    }

    /// Forget the stored session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session file cannot be rewritten.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.session.clear().await?;
        info!("Signed out");
        Ok(())
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.session.load().await
    }

    #[must_use]
    pub fn notification(&self) -> Option<Notification> {
        self.slot().active().cloned()
    }

    pub fn dismiss_notification(&self) {
        self.slot().dismiss();
    }
}
