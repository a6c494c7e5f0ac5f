//! Wire-format structs and the reshaping that plain field renames cannot
//! express: derived rarities, icon-name recognition, nested restructuring.

use crate::api::decode;
use crate::api::record::types::{
    AbyssStats, Artifact, ArtifactSet, Battle, BattleCharacter, Chamber, Character,
    CharacterRanks, CharacterSummary, Constellation, DailyNotes, Exploration, Floor, Offering,
    Outfit, PlayerInfo, PlayerStats, RankedCharacter, SetEffect, SpiralAbyss, TcgStats, Teapot,
    TransformerRecovery, UserStats, Weapon,
};
use crate::core::errors::ServiceError;
use chrono::{Local, TimeZone};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

// Old icon names the service never migrated to the characters' real names.
const CHARACTER_ALIASES: &[(&str, &str)] = &[
    ("PlayerGirl", "Traveler"),
    ("PlayerBoy", "Traveler"),
    ("Ambor", "Amber"),
    ("Qin", "Jean"),
    ("Hutao", "Hu Tao"),
    ("Feiyan", "Yanfei"),
    ("Kazuha", "Kadehara Kazuha"),
    ("Sara", "Kujou Sara"),
    ("Shougun", "Raiden Shogun"),
    ("Tohma", "Thoma"),
    ("Heizo", "Shikanoin Heizou"),
    ("Shinobu", "Kuki Shinobu"),
    ("Yunjin", "Yun Jin"),
    ("Itto", "Arataki Itto"),
    ("Ayaka", "Kamisato Ayaka"),
    ("Ayato", "Kamisato Ayato"),
    ("Kokomi", "Sangonomiya Kokomi"),
    ("Yae", "Yae Miko"),
    ("Noel", "Noelle"),
];

/// Collab characters are reported with rarity offset by 100.
const fn adjust_rarity(rarity: u32) -> u32 {
    if rarity >= 100 {
        rarity - 100
    } else {
        rarity
    }
}

fn icon_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"game_record/genshin/character_.*_(\w+)(?:@\dx)?\.png").expect("static regex")
    })
}

fn set_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"UI_RelicIcon_(\d+)_\d+").expect("static regex"))
}

/// Recognize a character from its icon url, resolving old aliases.
fn recognize_character_icon(url: &str) -> Result<String, ServiceError> {
    let captures = icon_regex().captures(url).ok_or_else(|| {
        ServiceError::MalformedResponse(format!("{:?} is not a character icon or image url", url))
    })?;
    let name = &captures[1];
    let resolved = CHARACTER_ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |(_, real)| *real);
    Ok(resolved.to_string())
}

// --- user stats ---

#[derive(Debug, Deserialize)]
struct RawUserStats {
    role: PlayerInfo,
    stats: PlayerStats,
    #[serde(default)]
    homes: Vec<RawHome>,
    #[serde(default)]
    avatars: Vec<RawAvatarSummary>,
    #[serde(default)]
    world_explorations: Vec<RawExploration>,
}

#[derive(Debug, Deserialize)]
struct RawHome {
    name: String,
    icon: String,
    level: u32,
    comfort_num: u32,
    comfort_level_name: String,
    comfort_level_icon: String,
    item_num: u32,
    visit_num: u32,
}

#[derive(Debug, Deserialize)]
struct RawAvatarSummary {
    id: u64,
    image: String,
    name: String,
    element: String,
    fetter: u32,
    level: u32,
    rarity: u32,
    actived_constellation_num: u32,
}

#[derive(Debug, Deserialize)]
struct RawExploration {
    id: u32,
    name: String,
    exploration_percentage: u32,
    #[serde(rename = "type")]
    kind: String,
    level: u32,
    icon: String,
    inner_icon: String,
    #[serde(default)]
    offerings: Vec<Offering>,
}

pub(crate) fn convert_stats(value: Value) -> Result<UserStats, ServiceError> {
    let raw: RawUserStats = decode(value, "user stats")?;

    let teapot = raw.homes.first().map(|home| Teapot {
        // Only names and icons differ between realms of one teapot.
        realms: raw
            .homes
            .iter()
            .map(|realm| crate::api::record::types::Realm {
                name: realm.name.clone(),
                icon: realm.icon.clone(),
            })
            .collect(),
        level: home.level,
        comfort: home.comfort_num,
        comfort_name: home.comfort_level_name.clone(),
        comfort_icon: home.comfort_level_icon.clone(),
        items: home.item_num,
        visitors: home.visit_num,
    });

    Ok(UserStats {
        info: raw.role,
        stats: raw.stats,
        characters: raw
            .avatars
            .into_iter()
            .map(|avatar| CharacterSummary {
                name: avatar.name,
                rarity: adjust_rarity(avatar.rarity),
                element: avatar.element,
                level: avatar.level,
                friendship: avatar.fetter,
                constellation: avatar.actived_constellation_num,
                icon: avatar.image,
                id: avatar.id,
            })
            .collect(),
        teapot,
        explorations: raw
            .world_explorations
            .into_iter()
            .map(|exploration| Exploration {
                id: exploration.id,
                name: exploration.name,
                explored: f64::from(exploration.exploration_percentage) / 10.0,
                kind: exploration.kind,
                level: exploration.level,
                icon: exploration.icon,
                icon_dark: exploration.inner_icon,
                offerings: exploration.offerings,
            })
            .collect(),
    })
}

// --- characters ---

#[derive(Debug, Deserialize)]
struct RawCharacterList {
    avatars: Vec<RawCharacter>,
}

#[derive(Debug, Deserialize)]
struct RawCharacter {
    id: u64,
    image: String,
    icon: String,
    name: String,
    element: String,
    fetter: u32,
    level: u32,
    rarity: u32,
    weapon: RawWeapon,
    reliquaries: Vec<RawArtifact>,
    constellations: Vec<RawConstellation>,
    #[serde(default)]
    costumes: Vec<Outfit>,
}

#[derive(Debug, Deserialize)]
struct RawWeapon {
    id: u64,
    name: String,
    icon: String,
    type_name: String,
    rarity: u32,
    level: u32,
    promote_level: u32,
    affix_level: u32,
    desc: String,
}

#[derive(Debug, Deserialize)]
struct RawArtifact {
    id: u64,
    name: String,
    icon: String,
    pos: u32,
    rarity: u32,
    level: u32,
    pos_name: String,
    set: RawArtifactSet,
}

#[derive(Debug, Deserialize)]
struct RawArtifactSet {
    id: u64,
    name: String,
    affixes: Vec<RawAffix>,
}

#[derive(Debug, Deserialize)]
struct RawAffix {
    activation_number: u32,
    effect: String,
}

#[derive(Debug, Deserialize)]
struct RawConstellation {
    id: u64,
    name: String,
    icon: String,
    effect: String,
    is_actived: bool,
    pos: u32,
}

const fn artifact_slot_name(pos: u32) -> &'static str {
    match pos {
        1 => "flower",
        2 => "feather",
        3 => "hourglass",
        4 => "goblet",
        5 => "crown",
        _ => "unknown",
    }
}

fn convert_artifact(raw: RawArtifact) -> Artifact {
    let set_id = set_id_regex()
        .captures(&raw.icon)
        .and_then(|captures| captures[1].parse().ok());
    let effect_type = match raw.set.affixes.len() {
        0 => "none",
        1 => "single",
        _ => "classic",
    };

    Artifact {
        name: raw.name,
        pos_name: artifact_slot_name(raw.pos).to_string(),
        full_pos_name: raw.pos_name,
        pos: raw.pos,
        rarity: raw.rarity,
        level: raw.level,
        set: ArtifactSet {
            name: raw.set.name,
            effect_type: effect_type.to_string(),
            effects: raw
                .set
                .affixes
                .into_iter()
                .map(|affix| SetEffect {
                    pieces: affix.activation_number,
                    effect: affix.effect,
                })
                .collect(),
            set_id,
            id: raw.set.id,
        },
        icon: raw.icon,
        id: raw.id,
    }
}

pub(crate) fn convert_characters(value: Value) -> Result<Vec<Character>, ServiceError> {
    let raw: RawCharacterList = decode(value, "character list")?;

    Ok(raw
        .avatars
        .into_iter()
        .map(|avatar| {
            let traveler_name = avatar.icon.contains("Player").then(|| {
                if avatar.icon.contains("Boy") {
                    "Aether".to_string()
                } else {
                    "Lumine".to_string()
                }
            });

            Character {
                name: avatar.name,
                rarity: adjust_rarity(avatar.rarity),
                element: avatar.element,
                level: avatar.level,
                friendship: avatar.fetter,
                constellation: avatar
                    .constellations
                    .iter()
                    .filter(|c| c.is_actived)
                    .count() as u32,
                icon: avatar.icon,
                image: avatar.image,
                id: avatar.id,
                collab: avatar.rarity >= 100,
                traveler_name,
                weapon: Weapon {
                    name: avatar.weapon.name,
                    rarity: avatar.weapon.rarity,
                    kind: avatar.weapon.type_name,
                    level: avatar.weapon.level,
                    ascension: avatar.weapon.promote_level,
                    refinement: avatar.weapon.affix_level,
                    description: avatar.weapon.desc,
                    icon: avatar.weapon.icon,
                    id: avatar.weapon.id,
                },
                artifacts: avatar.reliquaries.into_iter().map(convert_artifact).collect(),
                constellations: avatar
                    .constellations
                    .into_iter()
                    .map(|c| Constellation {
                        name: c.name,
                        effect: c.effect,
                        is_activated: c.is_actived,
                        index: c.pos,
                        icon: c.icon,
                        id: c.id,
                    })
                    .collect(),
                outfits: avatar.costumes,
            }
        })
        .collect())
}

// --- spiral abyss ---

#[derive(Debug, Deserialize)]
struct RawAbyss {
    schedule_id: u32,
    start_time: String,
    end_time: String,
    total_battle_times: u32,
    total_win_times: u32,
    max_floor: String,
    total_star: u32,
    reveal_rank: Vec<RawRank>,
    defeat_rank: Vec<RawRank>,
    damage_rank: Vec<RawRank>,
    take_damage_rank: Vec<RawRank>,
    normal_skill_rank: Vec<RawRank>,
    energy_skill_rank: Vec<RawRank>,
    floors: Vec<RawFloor>,
}

#[derive(Debug, Deserialize)]
struct RawRank {
    avatar_id: u64,
    avatar_icon: String,
    value: u64,
    rarity: u32,
}

#[derive(Debug, Deserialize)]
struct RawFloor {
    index: u32,
    star: u32,
    max_star: u32,
    icon: String,
    levels: Vec<RawLevel>,
}

#[derive(Debug, Deserialize)]
struct RawLevel {
    index: u32,
    star: u32,
    max_star: u32,
    battles: Vec<RawBattle>,
}

#[derive(Debug, Deserialize)]
struct RawBattle {
    index: u32,
    timestamp: String,
    avatars: Vec<RawBattleAvatar>,
}

#[derive(Debug, Deserialize)]
struct RawBattleAvatar {
    id: u64,
    icon: String,
    level: u32,
    rarity: u32,
}

fn format_timestamp(raw: &str, format: &str) -> Result<String, ServiceError> {
    let seconds: i64 = raw.parse().map_err(|_| {
        ServiceError::MalformedResponse(format!("{:?} is not a unix timestamp", raw))
    })?;
    let time = Local.timestamp_opt(seconds, 0).single().ok_or_else(|| {
        ServiceError::MalformedResponse(format!("{:?} is out of range for a timestamp", raw))
    })?;
    Ok(time.format(format).to_string())
}

fn convert_ranks(ranks: Vec<RawRank>) -> Result<Vec<RankedCharacter>, ServiceError> {
    ranks
        .into_iter()
        .map(|rank| {
            Ok(RankedCharacter {
                value: rank.value,
                name: recognize_character_icon(&rank.avatar_icon)?,
                rarity: adjust_rarity(rank.rarity),
                icon: rank.avatar_icon,
                id: rank.avatar_id,
            })
        })
        .collect()
}

pub(crate) fn convert_abyss(value: Value) -> Result<SpiralAbyss, ServiceError> {
    let raw: RawAbyss = decode(value, "spiral abyss")?;

    let floors = raw
        .floors
        .into_iter()
        .map(|floor| {
            let chambers = floor
                .levels
                .into_iter()
                .map(|level| {
                    let battles = level
                        .battles
                        .into_iter()
                        .map(|battle| {
                            let characters = battle
                                .avatars
                                .into_iter()
                                .map(|avatar| {
                                    Ok(BattleCharacter {
                                        name: recognize_character_icon(&avatar.icon)?,
                                        rarity: adjust_rarity(avatar.rarity),
                                        level: avatar.level,
                                        icon: avatar.icon,
                                        id: avatar.id,
                                    })
                                })
                                .collect::<Result<Vec<_>, ServiceError>>()?;
                            Ok(Battle {
                                half: battle.index,
                                timestamp: format_timestamp(
                                    &battle.timestamp,
                                    "%Y-%m-%d %H:%M:%S",
                                )?,
                                characters,
                            })
                        })
                        .collect::<Result<Vec<_>, ServiceError>>()?;
                    Ok(Chamber {
                        chamber: level.index,
                        stars: level.star,
                        max_stars: level.max_star,
                        has_halves: battles.len() == 2,
                        battles,
                    })
                })
                .collect::<Result<Vec<_>, ServiceError>>()?;
            Ok(Floor {
                floor: floor.index,
                stars: floor.star,
                max_stars: floor.max_star,
                icon: floor.icon,
                chambers,
            })
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;

    Ok(SpiralAbyss {
        season: raw.schedule_id,
        season_start_time: format_timestamp(&raw.start_time, "%Y-%m-%d")?,
        season_end_time: format_timestamp(&raw.end_time, "%Y-%m-%d")?,
        stats: AbyssStats {
            total_battles: raw.total_battle_times,
            total_wins: raw.total_win_times,
            max_floor: raw.max_floor,
            total_stars: raw.total_star,
        },
        character_ranks: CharacterRanks {
            most_played: convert_ranks(raw.reveal_rank)?,
            most_kills: convert_ranks(raw.defeat_rank)?,
            strongest_strike: convert_ranks(raw.damage_rank)?,
            most_damage_taken: convert_ranks(raw.take_damage_rank)?,
            most_bursts_used: convert_ranks(raw.normal_skill_rank)?,
            most_skills_used: convert_ranks(raw.energy_skill_rank)?,
        },
        floors,
    })
}

// --- real-time notes ---

#[derive(Debug, Deserialize)]
struct RawNotes {
    current_resin: u32,
    resin_recovery_time: String,
    max_resin: u32,
    total_task_num: u32,
    finished_task_num: u32,
    is_extra_task_reward_received: bool,
    resin_discount_num_limit: u32,
    remain_resin_discount_num: u32,
    expeditions: Vec<crate::api::record::types::Expedition>,
    max_expedition_num: u32,
    current_home_coin: u32,
    max_home_coin: u32,
    home_coin_recovery_time: String,
    transformer: Option<RawTransformer>,
}

#[derive(Debug, Deserialize)]
struct RawTransformer {
    recovery_time: RawRecoveryTime,
}

#[derive(Debug, Deserialize)]
struct RawRecoveryTime {
    #[serde(rename = "Day")]
    day: u32,
    #[serde(rename = "Hour")]
    hour: u32,
    #[serde(rename = "Minute")]
    minute: u32,
    #[serde(rename = "Second")]
    second: u32,
    reached: bool,
}

pub(crate) fn convert_notes(value: Value) -> Result<DailyNotes, ServiceError> {
    let raw: RawNotes = decode(value, "daily notes")?;

    Ok(DailyNotes {
        resin: raw.current_resin,
        until_resin_limit: raw.resin_recovery_time,
        max_resin: raw.max_resin,
        total_commissions: raw.total_task_num,
        completed_commissions: raw.finished_task_num,
        claimed_commission_reward: raw.is_extra_task_reward_received,
        max_boss_discounts: raw.resin_discount_num_limit,
        remaining_boss_discounts: raw.remain_resin_discount_num,
        expeditions: raw.expeditions,
        max_expeditions: raw.max_expedition_num,
        realm_currency: raw.current_home_coin,
        max_realm_currency: raw.max_home_coin,
        until_realm_currency_limit: raw.home_coin_recovery_time,
        transformer_recovery: raw.transformer.map(|transformer| TransformerRecovery {
            days: transformer.recovery_time.day,
            hours: transformer.recovery_time.hour,
            minutes: transformer.recovery_time.minute,
            seconds: transformer.recovery_time.second,
            reached: transformer.recovery_time.reached,
        }),
    })
}

pub(crate) fn convert_tcg_stats(value: Value) -> Result<TcgStats, ServiceError> {
    decode(value, "card game stats")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognize_character_icon() {
        let url = "https://upload-os-bbs.mihoyo.com/game_record/genshin/character_icon/UI_AvatarIcon_Ambor.png";
        assert_eq!(recognize_character_icon(url).unwrap(), "Amber");

        let url = "https://upload-os-bbs.mihoyo.com/game_record/genshin/character_image/UI_AvatarIcon_Hutao@2x.png";
        assert_eq!(recognize_character_icon(url).unwrap(), "Hu Tao");
    }

    #[test]
    fn test_unrecognized_icon_is_an_error() {
        assert!(recognize_character_icon("https://example.com/not_an_icon.jpg").is_err());
    }

    #[test]
    fn test_unaliased_name_passes_through() {
        let url = "https://x/game_record/genshin/character_icon/UI_AvatarIcon_Diluc.png";
        assert_eq!(recognize_character_icon(url).unwrap(), "Diluc");
    }

    #[test]
    fn test_adjust_rarity_for_collab_characters() {
        assert_eq!(adjust_rarity(5), 5);
        assert_eq!(adjust_rarity(105), 5);
    }

    #[test]
    fn test_artifact_set_id_from_icon() {
        let icon = "https://x/UI_RelicIcon_15001_4.png";
        let set_id: Option<u32> = set_id_regex()
            .captures(icon)
            .and_then(|captures| captures[1].parse().ok());
        assert_eq!(set_id, Some(15001));
    }

    #[test]
    fn test_convert_stats_shapes_payload() {
        let value = serde_json::json!({
            "role": {"nickname": "Traveler", "level": 58, "region": "os_euro", "AvatarUrl": ""},
            "stats": {
                "achievement_number": 512, "active_day_number": 801, "avatar_number": 40,
                "spiral_abyss": "12-3", "anemoculus_number": 66, "geoculus_number": 131,
                "electroculus_number": 181, "dendroculus_number": 0,
                "common_chest_number": 1000, "exquisite_chest_number": 800,
                "precious_chest_number": 300, "luxurious_chest_number": 100,
                "magic_chest_number": 40, "way_point_number": 200, "domain_number": 35
            },
            "homes": [{
                "name": "Cool Isle", "icon": "i", "level": 9, "comfort_num": 20000,
                "comfort_level_name": "Fit for a King", "comfort_level_icon": "c",
                "item_num": 500, "visit_num": 25
            }],
            "avatars": [{
                "id": 10000021, "image": "img", "name": "Amber", "element": "Pyro",
                "fetter": 10, "level": 80, "rarity": 4, "actived_constellation_num": 6
            }],
            "world_explorations": [{
                "id": 1, "name": "Mondstadt", "exploration_percentage": 1000,
                "type": "Reputation", "level": 8, "icon": "w", "inner_icon": "b",
                "offerings": []
            }]
        });

        let stats = convert_stats(value).unwrap();
        assert_eq!(stats.info.nick, "Traveler");
        assert_eq!(stats.stats.remarkable_chests, 40);
        assert_eq!(stats.characters[0].friendship, 10);
        assert_eq!(stats.teapot.as_ref().unwrap().comfort, 20000);
        assert!((stats.explorations[0].explored - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_convert_notes_nests_transformer() {
        let value = serde_json::json!({
            "current_resin": 140, "resin_recovery_time": "1600", "max_resin": 160,
            "total_task_num": 4, "finished_task_num": 4,
            "is_extra_task_reward_received": true,
            "resin_discount_num_limit": 3, "remain_resin_discount_num": 1,
            "expeditions": [
                {"avatar_side_icon": "i", "remained_time": "0", "status": "Finished"}
            ],
            "max_expedition_num": 5,
            "current_home_coin": 2400, "max_home_coin": 2400,
            "home_coin_recovery_time": "0",
            "transformer": {
                "obtained": true,
                "recovery_time": {"Day": 6, "Hour": 0, "Minute": 0, "Second": 0, "reached": false}
            }
        });

        let notes = convert_notes(value).unwrap();
        assert_eq!(notes.resin, 140);
        assert_eq!(notes.expeditions[0].status, "Finished");
        let transformer = notes.transformer_recovery.unwrap();
        assert_eq!(transformer.days, 6);
        assert!(!transformer.reached);
    }
}
