//! Guest insight aggregation for a single event.

use serde::{Deserialize, Serialize};

use super::types::{Invitee, InviteeStatus};

/// Attendance counters for one event.
///
/// `confirmed` and `attended` are independent: an accepted invitee need not
/// have checked in, and a checked-in invitee may never have accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestInsights {
    pub total_invited: usize,
    pub confirmed: usize,
    pub attended: usize,
    pub pending: usize,
}

impl GuestInsights {
    fn record(&mut self, invitee: &Invitee) {
        self.total_invited += 1;

        // Every status other than `accept` counts as still pending, including
        // explicit declines.
        match invitee.status {
            InviteeStatus::Accept => self.confirmed += 1,
            InviteeStatus::Pending
            | InviteeStatus::Maybe
            | InviteeStatus::No
            | InviteeStatus::Busy => self.pending += 1,
        }

        if invitee.is_checked_in {
            self.attended += 1;
        }
    }
}

/// Counts invitees by status and check-in flag in one pass.
pub fn guest_insights<'a, I>(invitees: I) -> GuestInsights
where
    I: IntoIterator<Item = &'a Invitee>,
{
    invitees
        .into_iter()
        .fold(GuestInsights::default(), |mut insights, invitee| {
            insights.record(invitee);
            insights
        })
}
