//! Stable, renamed schema for the daily check-in endpoints.

use serde::{Deserialize, Serialize};

/// Whether the user signed in today and how many rewards they claimed so
/// far this month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyRewardInfo {
    #[serde(rename(deserialize = "is_sign"))]
    pub signed_in: bool,
    #[serde(rename(deserialize = "total_sign_day"))]
    pub claimed_rewards: u32,
}

/// One reward from the current month's check-in calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyReward {
    pub name: String,
    #[serde(rename(deserialize = "cnt"))]
    pub amount: u32,
    pub icon: String,
}

/// A reward the user already claimed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimedReward {
    pub id: u64,
    pub name: String,
    #[serde(rename(deserialize = "cnt"))]
    pub amount: u32,
    #[serde(rename(deserialize = "created_at"))]
    pub time: String,
}
