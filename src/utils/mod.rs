pub mod code_generator;
pub mod phone;
pub mod reference_day;

pub use code_generator::{generate_claim_code, normalize_claim_code};
pub use phone::normalize_phone;
pub use reference_day::{Clock, ReferenceDay, SystemClock};

#[cfg(test)]
pub use reference_day::ManualClock;
