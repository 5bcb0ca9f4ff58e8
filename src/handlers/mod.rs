pub mod admin;
pub mod campaign;
pub mod participant;

pub use admin::admin_config;
pub use campaign::campaign_config;
pub use participant::participant_config;
