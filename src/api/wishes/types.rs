//! Stable, renamed schema for the wish-history endpoints.

use serde::{Deserialize, Serialize};

/// One gacha pull.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wish {
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    pub rarity: u32,
    pub time: String,
    pub id: u64,
    /// Name of the banner the pull was made on, when known.
    pub banner: Option<String>,
    pub banner_type: u32,
    pub uid: u64,
}

/// A banner id and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BannerType {
    pub banner_type: u32,
    pub name: String,
}

/// An item obtainable from the gacha.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GachaItem {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub rarity: u32,
    pub id: u64,
}

/// Details of one specific banner rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerDetails {
    pub banner_type_name: String,
    pub banner_type: u32,
    /// Banner title with markup stripped.
    pub banner: String,
    pub title: String,
    pub content: String,
    pub date_range: String,
    pub r5_up_prob: Option<f64>,
    pub r4_up_prob: Option<f64>,
    pub r5_prob: Option<f64>,
    pub r4_prob: Option<f64>,
    pub r3_prob: Option<f64>,
    pub r5_guarantee_prob: Option<f64>,
    pub r4_guarantee_prob: Option<f64>,
    pub r3_guarantee_prob: Option<f64>,
    pub r5_up_items: Vec<UpItem>,
    pub r4_up_items: Vec<UpItem>,
    pub r5_items: Vec<BannerItem>,
    pub r4_items: Vec<BannerItem>,
    pub r3_items: Vec<BannerItem>,
    /// All items of the banner in display order.
    pub items: Vec<BannerItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    pub rarity: u32,
    pub is_up: bool,
    pub order_value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpItem {
    #[serde(rename = "type")]
    pub item_type: String,
    pub name: String,
    pub element: Option<String>,
    pub icon: String,
}
