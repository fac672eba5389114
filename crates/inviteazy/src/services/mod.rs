//! Service layer between handlers and repositories.
//!
//! Services forward to the repository traits and return their errors
//! unchanged. The exceptions are password hashing in [`UserService`] and the
//! check-in and guest-insight operations in [`InviteeService`].

mod event;
mod invitee;
mod user;

pub use event::EventService;
pub use invitee::InviteeService;
pub use user::{UserService, BCRYPT_COST};

use inviteazy_core::storage::Repositories;

/// The three services, wired to one set of repositories.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub events: EventService,
    pub invitees: InviteeService,
}

impl Services {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            users: UserService::new(repositories.users.clone()),
            events: EventService::new(repositories.events.clone()),
            invitees: InviteeService::new(repositories.invitees.clone()),
        }
    }
}
