use std::sync::Arc;

use super::{EventRepository, InviteeRepository, UnimplementedRepository, UserRepository};

/// One consistent set of repositories, all backed by the same store.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub invitees: Arc<dyn InviteeRepository>,
}

impl Repositories {
    /// Starts a set for the named backend.
    pub fn builder(backend: &'static str) -> RepositoriesBuilder {
        RepositoriesBuilder {
            backend,
            users: None,
            events: None,
            invitees: None,
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories").finish_non_exhaustive()
    }
}

/// Assembles a [`Repositories`] set.
///
/// Slots left empty are filled with [`UnimplementedRepository`], so a backend
/// that lacks an entity fails loudly on use instead of returning nothing.
pub struct RepositoriesBuilder {
    backend: &'static str,
    users: Option<Arc<dyn UserRepository>>,
    events: Option<Arc<dyn EventRepository>>,
    invitees: Option<Arc<dyn InviteeRepository>>,
}

impl RepositoriesBuilder {
    pub fn users(mut self, repo: Arc<dyn UserRepository>) -> Self {
        self.users = Some(repo);
        self
    }

    pub fn events(mut self, repo: Arc<dyn EventRepository>) -> Self {
        self.events = Some(repo);
        self
    }

    pub fn invitees(mut self, repo: Arc<dyn InviteeRepository>) -> Self {
        self.invitees = Some(repo);
        self
    }

    pub fn build(self) -> Repositories {
        let stand_in = UnimplementedRepository::new(self.backend);
        Repositories {
            users: self.users.unwrap_or_else(|| Arc::new(stand_in)),
            events: self.events.unwrap_or_else(|| Arc::new(stand_in)),
            invitees: self.invitees.unwrap_or_else(|| Arc::new(stand_in)),
        }
    }
}
