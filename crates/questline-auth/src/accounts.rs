//! Account lookup: the injected source of known identities.
//!
//! Questline ships with exactly one account, but nothing above this module
//! assumes that. Login, refresh, and request validation all resolve
//! identities through an [`AccountStore`], so supporting more accounts (or
//! a database) is a matter of passing a different store.

use std::sync::Arc;

use questline_protocol::{Identity, UserId};

/// A known account: its identity and the password it logs in with.
///
/// Password hashing is handled outside this crate; the store hands over
/// whatever secret it compares against.
#[derive(Clone)]
pub struct Account {
    pub identity: Identity,
    password: String,
}

impl Account {
    pub fn new(identity: Identity, password: impl Into<String>) -> Self {
        Self {
            identity,
            password: password.into(),
        }
    }

    /// Exact, constant-time comparison against the stored password.
    pub fn password_matches(&self, candidate: &str) -> bool {
        constant_time_eq(self.password.as_bytes(), candidate.as_bytes())
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Looks up accounts by email (login) and by id (refresh, validation).
///
/// `Send + Sync + 'static` because one store is shared by every request
/// handler for the lifetime of the service.
pub trait AccountStore: Send + Sync + 'static {
    /// Finds the account whose email matches `email`, ignoring case.
    fn find_by_email(&self, email: &str) -> Option<Account>;

    /// Finds the identity with the given id.
    fn find_by_id(&self, id: &UserId) -> Option<Identity>;
}

impl<S: AccountStore + ?Sized> AccountStore for Arc<S> {
    fn find_by_email(&self, email: &str) -> Option<Account> {
        (**self).find_by_email(email)
    }

    fn find_by_id(&self, id: &UserId) -> Option<Identity> {
        (**self).find_by_id(id)
    }
}

/// A fixed set of accounts held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    accounts: Vec<Account>,
}

impl InMemoryAccountStore {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }

    /// A store holding exactly one account.
    pub fn single(account: Account) -> Self {
        Self::new(vec![account])
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_email(&self, email: &str) -> Option<Account> {
        let wanted = email.trim().to_lowercase();
        self.accounts
            .iter()
            .find(|a| a.identity.email.to_lowercase() == wanted)
            .cloned()
    }

    fn find_by_id(&self, id: &UserId) -> Option<Identity> {
        self.accounts
            .iter()
            .find(|a| &a.identity.id == id)
            .map(|a| a.identity.clone())
    }
}

/// Compares two byte strings without short-circuiting on the first
/// differing byte. Length is not hidden.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
