//! Storage wiring shared by all handlers.

use std::sync::Arc;

use agencyhub_auth::{PasswordError, Role};
use agencyhub_infra::{
    Client, InMemoryRepository, InMemoryUserDirectory, Invoice, Project, Reminder, Repository,
    RepositoryError, UserAccount, UserDirectory,
};

use crate::config::BootstrapAdmin;

#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserDirectory>,
    pub clients: Arc<dyn Repository<Client>>,
    pub projects: Arc<dyn Repository<Project>>,
    pub invoices: Arc<dyn Repository<Invoice>>,
    pub reminders: Arc<dyn Repository<Reminder>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Store(#[from] RepositoryError),
}

impl AppServices {
    /// In-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserDirectory::new()),
            clients: Arc::new(InMemoryRepository::<Client>::new()),
            projects: Arc::new(InMemoryRepository::<Project>::new()),
            invoices: Arc::new(InMemoryRepository::<Invoice>::new()),
            reminders: Arc::new(InMemoryRepository::<Reminder>::new()),
        }
    }

    /// Seed the configured super-admin account.
    pub fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> Result<(), BootstrapError> {
        if self.users.find_by_email(&admin.email).is_some() {
            tracing::info!(email = %admin.email, "bootstrap super-admin already present");
            return Ok(());
        }

        let account = UserAccount::new(admin.email.clone(), &admin.password, Role::SuperAdmin, None)?;
        self.users.insert(account)?;
        tracing::info!(email = %admin.email, "bootstrap super-admin created");
        Ok(())
    }
}
