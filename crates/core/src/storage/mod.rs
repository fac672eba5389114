mod backend;
mod error;
mod http_mapping;
mod repositories;
mod traits;
mod unimplemented;

pub use backend::{BackendKind, StorageConfigError};
pub use error::{RepositoryError, Result};
pub use http_mapping::repository_error_to_status_code;
pub use repositories::{Repositories, RepositoriesBuilder};
pub use traits::{EventRepository, InviteeRepository, UserRepository};
pub use unimplemented::UnimplementedRepository;
