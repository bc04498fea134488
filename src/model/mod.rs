pub mod entourage;
pub mod guest;
pub mod legacy;
pub mod records;

pub use entourage::{EntourageGroup, EntourageMember, MemberPair, group_entourage};
pub use guest::{Companion, Guest, GuestStatus};
pub use legacy::LegacyGuest;
pub use records::{GuestRequest, Message, PrincipalSponsor};
