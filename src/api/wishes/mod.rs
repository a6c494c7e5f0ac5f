pub mod client;
pub mod converters;
pub mod types;

pub use client::{extract_authkey, GachaClient};
pub use types::{BannerDetails, BannerItem, BannerType, GachaItem, UpItem, Wish};
