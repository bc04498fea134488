//! Browser-side flows modelled as explicit state machines, driven against
//! any [`RsvpApi`]: the live server through [`HttpRsvpApi`], or a fake in tests.

pub mod api;
pub mod events;
pub mod join;
pub mod rsvp;
pub mod search;

pub use api::{HttpRsvpApi, RsvpApi};
pub use events::{RosterEvent, RosterEvents};
pub use join::{JoinPhase, JoinRequestForm};
pub use rsvp::{Attendance, Banner, BannerKind, RsvpFlowError, RsvpForm, RsvpPhase};
pub use search::{GuestSearch, SearchState};
