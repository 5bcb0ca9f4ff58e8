pub mod claims;
pub mod participants;
pub mod prize_slots;

pub use claims as claim_entity;
pub use participants as participant_entity;
pub use prize_slots as prize_slot_entity;
pub use prize_slots::PrizeKind;
