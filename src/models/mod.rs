pub mod campaign;
pub mod claim;
pub mod participant;

pub use campaign::*;
pub use claim::*;
pub use participant::*;
