//! Email/password checks for the login call.

use std::sync::Arc;

use questline_protocol::Identity;

use crate::accounts::constant_time_eq;
use crate::{AccountStore, AuthError};

// Compared against when the email is unknown, so both failure paths do a
// password comparison.
const DUMMY_PASSWORD: &[u8] = b"questline-dummy-password-for-uniform-timing";

/// Checks a presented email and password against the account store.
#[derive(Clone)]
pub struct CredentialValidator {
    accounts: Arc<dyn AccountStore>,
}

impl CredentialValidator {
    pub fn new(accounts: Arc<dyn AccountStore>) -> Self {
        Self { accounts }
    }

    /// Returns the account's identity if both email and password match.
    ///
    /// The email is matched case-insensitively (surrounding whitespace is
    /// ignored); the password must match exactly.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] for an unknown email and for a
    /// wrong password alike.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let account = self.accounts.find_by_email(email.trim());

        let password_ok = match &account {
            Some(account) => account.password_matches(password),
            None => {
                let _ = std::hint::black_box(constant_time_eq(DUMMY_PASSWORD, password.as_bytes()));
                false
            }
        };

        match account {
            Some(account) if password_ok => {
                tracing::info!(user_id = %account.identity.id, "credentials accepted");
                Ok(account.identity)
            }
            _ => {
                tracing::info!("credentials rejected");
                Err(AuthError::InvalidCredentials)
            }
        }
    }
}
