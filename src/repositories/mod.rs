//! API repositories
//!
//! Repositories translate API envelopes into normalized models. Reads degrade
//! to empty results; writes propagate failures to the caller.

pub mod campaign_repo;
pub mod user_repo;

pub use campaign_repo::CampaignRepository;
pub use user_repo::UserRepository;
