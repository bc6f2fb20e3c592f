//! Models for data received from Steam.

mod asset;
mod badges;
mod sent_offer;
mod user_details;

pub use asset::{Asset, ClassInfo, Tag};
pub use badges::{Badge, BadgeSummary};
pub use sent_offer::SentOffer;
pub use user_details::UserDetails;
