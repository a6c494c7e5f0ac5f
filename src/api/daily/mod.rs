pub mod client;
pub mod types;

pub use client::DailyClient;
pub use types::{ClaimedReward, DailyRewardInfo, MonthlyReward};
