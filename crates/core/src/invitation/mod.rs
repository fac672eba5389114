mod error;
mod insights;
mod requests;
mod types;

pub use error::ValidationError;
pub use insights::{guest_insights, GuestInsights};
pub use requests::{EventPatch, InviteePatch, NewEvent, NewInvitee, NewUser, UserPatch};
pub use types::{
    check_in_token, timestamp_now, Event, Invitee, InviteeStatus, User, UserRole,
    CHECK_IN_BASE_URL,
};
