//! Test doubles for email delivery.

use crate::email::EmailProvider;
use critique_core::{DomainError, Result};
use std::sync::{Arc, Mutex};

/// A confirmation email captured by [`RecordingEmailProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    /// Recipient address.
    pub to: String,
    /// Recipient username.
    pub username: String,
    /// Plaintext confirmation code.
    pub code: String,
}

/// Email provider that records messages instead of sending them.
///
/// Set `fail` to make every send return a `Delivery` error, for
/// exercising the persist-then-send behavior.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmailProvider {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingEmailProvider {
    /// Create a provider that accepts every message.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn set_fail(&self, fail: bool) {
        #[allow(clippy::unwrap_used)]
        {
            *self.fail.lock().unwrap() = fail;
        }
    }

    /// Messages recorded so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn sent(&self) -> Vec<SentEmail> {
        #[allow(clippy::unwrap_used)]
        self.sent.lock().unwrap().clone()
    }

    /// The code carried by the most recent message, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn last_code(&self) -> Option<String> {
        #[allow(clippy::unwrap_used)]
        self.sent.lock().unwrap().last().map(|e| e.code.clone())
    }
}

impl EmailProvider for RecordingEmailProvider {
    async fn send_confirmation_code(&self, to: &str, username: &str, code: &str) -> Result<()> {
        let failing = {
            let guard = self
                .fail
                .lock()
                .map_err(|_| DomainError::Internal("mock email lock poisoned".to_string()))?;
            *guard
        };
        if failing {
            return Err(DomainError::Delivery("simulated outage".to_string()));
        }
        self.sent
            .lock()
            .map_err(|_| DomainError::Internal("mock email lock poisoned".to_string()))?
            .push(SentEmail {
                to: to.to_string(),
                username: username.to_string(),
                code: code.to_string(),
            });
        Ok(())
    }
}
