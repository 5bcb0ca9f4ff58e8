pub mod campaign_service;
pub mod participant_service;
pub mod prize_inventory;
pub mod quota_tracker;
pub mod redemption_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use campaign_service::CampaignService;
pub use participant_service::ParticipantService;
pub use prize_inventory::PrizeInventory;
pub use quota_tracker::QuotaTracker;
pub use redemption_service::RedemptionService;
