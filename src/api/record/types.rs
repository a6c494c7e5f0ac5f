//! Stable, renamed schema for the game-record endpoints.
//!
//! The service still uses development-era field names on the wire
//! (`fetter`, `actived_constellation_num`, `magic_chest_number`, ...); these
//! types serialize under the corrected names. Fields that deserialize
//! straight off the wire carry `rename(deserialize = ...)`; everything that
//! needs real reshaping goes through `converters`.

use crate::api::de;
use serde::{Deserialize, Serialize};

/// Basic profile, stats and world progress for one account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub info: PlayerInfo,
    pub stats: PlayerStats,
    pub characters: Vec<CharacterSummary>,
    pub teapot: Option<Teapot>,
    pub explorations: Vec<Exploration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    #[serde(rename(deserialize = "nickname"))]
    pub nick: String,
    pub level: u32,
    pub region: String,
    #[serde(rename(deserialize = "AvatarUrl"))]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(rename(deserialize = "achievement_number"))]
    pub achievements: u32,
    #[serde(rename(deserialize = "active_day_number"))]
    pub active_days: u32,
    #[serde(rename(deserialize = "avatar_number"))]
    pub characters: u32,
    pub spiral_abyss: String,
    #[serde(rename(deserialize = "anemoculus_number"))]
    pub anemoculi: u32,
    #[serde(rename(deserialize = "geoculus_number"))]
    pub geoculi: u32,
    #[serde(rename(deserialize = "electroculus_number"))]
    pub electroculi: u32,
    #[serde(rename(deserialize = "dendroculus_number"))]
    pub dendroculi: u32,
    #[serde(rename(deserialize = "common_chest_number"))]
    pub common_chests: u32,
    #[serde(rename(deserialize = "exquisite_chest_number"))]
    pub exquisite_chests: u32,
    #[serde(rename(deserialize = "precious_chest_number"))]
    pub precious_chests: u32,
    #[serde(rename(deserialize = "luxurious_chest_number"))]
    pub luxurious_chests: u32,
    #[serde(rename(deserialize = "magic_chest_number"))]
    pub remarkable_chests: u32,
    #[serde(rename(deserialize = "way_point_number"))]
    pub unlocked_waypoints: u32,
    #[serde(rename(deserialize = "domain_number"))]
    pub unlocked_domains: u32,
}

/// Character entry as it appears in the stats overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterSummary {
    pub name: String,
    pub rarity: u32,
    pub element: String,
    pub level: u32,
    pub friendship: u32,
    pub constellation: u32,
    pub icon: String,
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teapot {
    pub realms: Vec<Realm>,
    pub level: u32,
    pub comfort: u32,
    pub comfort_name: String,
    pub comfort_icon: String,
    pub items: u32,
    pub visitors: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Realm {
    pub name: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exploration {
    pub id: u32,
    pub name: String,
    pub explored: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: u32,
    pub icon: String,
    pub icon_dark: String,
    pub offerings: Vec<Offering>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offering {
    pub name: String,
    pub level: u32,
}

/// Full character detail, including equipment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub rarity: u32,
    pub element: String,
    pub level: u32,
    pub friendship: u32,
    pub constellation: u32,
    pub icon: String,
    pub image: String,
    pub id: u64,
    pub collab: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traveler_name: Option<String>,
    pub weapon: Weapon,
    pub artifacts: Vec<Artifact>,
    pub constellations: Vec<Constellation>,
    pub outfits: Vec<Outfit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Weapon {
    pub name: String,
    pub rarity: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub level: u32,
    pub ascension: u32,
    pub refinement: u32,
    pub description: String,
    pub icon: String,
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    pub pos_name: String,
    pub full_pos_name: String,
    pub pos: u32,
    pub rarity: u32,
    pub level: u32,
    pub set: ArtifactSet,
    pub icon: String,
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactSet {
    pub name: String,
    pub effect_type: String,
    pub effects: Vec<SetEffect>,
    pub set_id: Option<u32>,
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetEffect {
    pub pieces: u32,
    pub effect: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constellation {
    pub name: String,
    pub effect: String,
    pub is_activated: bool,
    pub index: u32,
    pub icon: String,
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outfit {
    pub name: String,
    pub icon: String,
    pub id: u64,
}

/// One spiral abyss season.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiralAbyss {
    pub season: u32,
    pub season_start_time: String,
    pub season_end_time: String,
    pub stats: AbyssStats,
    pub character_ranks: CharacterRanks,
    pub floors: Vec<Floor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbyssStats {
    pub total_battles: u32,
    pub total_wins: u32,
    pub max_floor: String,
    pub total_stars: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterRanks {
    pub most_played: Vec<RankedCharacter>,
    pub most_kills: Vec<RankedCharacter>,
    pub strongest_strike: Vec<RankedCharacter>,
    pub most_damage_taken: Vec<RankedCharacter>,
    pub most_bursts_used: Vec<RankedCharacter>,
    pub most_skills_used: Vec<RankedCharacter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCharacter {
    pub value: u64,
    pub name: String,
    pub rarity: u32,
    pub icon: String,
    pub id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Floor {
    pub floor: u32,
    pub stars: u32,
    pub max_stars: u32,
    pub icon: String,
    pub chambers: Vec<Chamber>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chamber {
    pub chamber: u32,
    pub stars: u32,
    pub max_stars: u32,
    pub has_halves: bool,
    pub battles: Vec<Battle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    pub half: u32,
    pub timestamp: String,
    pub characters: Vec<BattleCharacter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleCharacter {
    pub name: String,
    pub rarity: u32,
    pub level: u32,
    pub icon: String,
    pub id: u64,
}

/// Real-time notes: resin, commissions, expeditions, realm currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyNotes {
    pub resin: u32,
    pub until_resin_limit: String,
    pub max_resin: u32,
    pub total_commissions: u32,
    pub completed_commissions: u32,
    pub claimed_commission_reward: bool,
    pub max_boss_discounts: u32,
    pub remaining_boss_discounts: u32,
    pub expeditions: Vec<Expedition>,
    pub max_expeditions: u32,
    pub realm_currency: u32,
    pub max_realm_currency: u32,
    pub until_realm_currency_limit: String,
    pub transformer_recovery: Option<TransformerRecovery>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expedition {
    #[serde(rename(deserialize = "avatar_side_icon"))]
    pub icon: String,
    #[serde(rename(deserialize = "remained_time"))]
    pub remaining_time: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformerRecovery {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
    pub reached: bool,
}

/// Card-game progression counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TcgStats {
    pub level: u32,
    #[serde(rename(deserialize = "avatar_card_num_gained"))]
    pub characters_unlocked: u32,
    #[serde(rename(deserialize = "avatar_card_num_total"))]
    pub characters_card_total_num: u32,
    #[serde(rename(deserialize = "action_card_num_gained"))]
    pub actions_unlocked: u32,
    #[serde(rename(deserialize = "action_card_num_total"))]
    pub action_card_total_num: u32,
}

/// A game account bound to a set of login cookies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameAccount {
    #[serde(
        rename(deserialize = "game_uid"),
        deserialize_with = "de::from_string"
    )]
    pub uid: u64,
    #[serde(rename(deserialize = "region_name"))]
    pub server: String,
    /// Server code as the API expects it in parameters (e.g. `cn_gf01`).
    pub region: String,
    pub level: u32,
    pub nickname: String,
    #[serde(rename(deserialize = "game_biz"))]
    pub biz: String,
    pub is_chosen: bool,
    pub is_official: bool,
}
