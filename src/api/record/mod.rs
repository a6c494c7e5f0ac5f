pub mod client;
pub mod converters;
pub mod types;

pub use client::RecordClient;
pub use types::{
    Character, CharacterSummary, DailyNotes, Exploration, GameAccount, PlayerInfo, PlayerStats,
    SpiralAbyss, TcgStats, Teapot, UserStats,
};
