pub mod error;
pub mod events;
pub mod health;
pub mod invitations;
mod response;
pub mod users;

pub use error::AppError;
pub use response::ApiResponse;
