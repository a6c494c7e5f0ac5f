//! Wire-format structs and reshaping for the wish-history endpoints. The
//! service sends most numbers as strings here.

use crate::api::decode;
use crate::api::wishes::types::{BannerDetails, BannerItem, BannerType, GachaItem, UpItem, Wish};
use crate::core::errors::ServiceError;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::OnceLock;

fn markup_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<.*?>").expect("static regex"))
}

fn parse_number<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, ServiceError> {
    raw.parse()
        .map_err(|_| ServiceError::MalformedResponse(format!("{} {:?} is not a number", what, raw)))
}

// --- pulls ---

#[derive(Debug, Deserialize)]
struct RawWish {
    uid: String,
    gacha_type: String,
    time: String,
    name: String,
    item_type: String,
    rank_type: String,
    id: String,
}

pub(crate) fn convert_wishes(
    value: Value,
    banner_name: Option<&str>,
) -> Result<Vec<Wish>, ServiceError> {
    let raw: Vec<RawWish> = decode(value, "wish history")?;
    raw.into_iter()
        .map(|wish| {
            Ok(Wish {
                item_type: wish.item_type,
                name: wish.name,
                rarity: parse_number(&wish.rank_type, "rank")?,
                time: wish.time,
                id: parse_number(&wish.id, "pull id")?,
                banner: banner_name.map(str::to_string),
                banner_type: parse_number(&wish.gacha_type, "banner type")?,
                uid: parse_number(&wish.uid, "uid")?,
            })
        })
        .collect()
}

// --- banner types ---

#[derive(Debug, Deserialize)]
struct RawBannerTypeList {
    gacha_type_list: Vec<RawBannerType>,
}

#[derive(Debug, Deserialize)]
struct RawBannerType {
    key: String,
    name: String,
}

pub(crate) fn convert_banner_types(value: Value) -> Result<Vec<BannerType>, ServiceError> {
    let raw: RawBannerTypeList = decode(value, "banner types")?;
    raw.gacha_type_list
        .into_iter()
        .map(|banner| {
            Ok(BannerType {
                banner_type: parse_number(&banner.key, "banner key")?,
                name: banner.name,
            })
        })
        .collect()
}

// --- static item list ---

#[derive(Debug, Deserialize)]
struct RawGachaItem {
    name: String,
    item_type: String,
    rank_type: String,
    item_id: String,
}

pub(crate) fn convert_gacha_items(value: Value) -> Result<Vec<GachaItem>, ServiceError> {
    let raw: Vec<RawGachaItem> = decode(value, "gacha items")?;
    raw.into_iter()
        .map(|item| {
            let short_id = item.item_id.len() == 4;
            let id: u64 = parse_number(&item.item_id, "item id")?;
            Ok(GachaItem {
                name: item.name,
                item_type: item.item_type,
                rarity: parse_number(&item.rank_type, "rank")?,
                // Characters are listed with a legacy 4-digit id.
                id: if short_id { 10_000_000 + id - 1000 } else { id },
            })
        })
        .collect()
}

// --- banner details ---

#[derive(Debug, Deserialize)]
struct RawBannerDetails {
    gacha_type: Value,
    title: String,
    content: String,
    date_range: String,
    r5_up_prob: String,
    r4_up_prob: String,
    r5_prob: String,
    r4_prob: String,
    r3_prob: String,
    r5_baodi_prob: String,
    r4_baodi_prob: String,
    r3_baodi_prob: String,
    r5_up_items: Option<Vec<RawUpItem>>,
    r4_up_items: Option<Vec<RawUpItem>>,
    r5_prob_list: Option<Vec<RawProbItem>>,
    r4_prob_list: Option<Vec<RawProbItem>>,
    r3_prob_list: Option<Vec<RawProbItem>>,
}

#[derive(Debug, Deserialize)]
struct RawUpItem {
    item_type: String,
    item_name: String,
    item_attr: String,
    item_img: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawProbItem {
    item_type: String,
    item_name: String,
    rank: Value,
    is_up: Value,
    order_value: Value,
}

/// `"0%"` means not applicable; otherwise a percentage with a locale comma.
fn parse_percent(raw: &str) -> Result<Option<f64>, ServiceError> {
    if raw == "0%" {
        return Ok(None);
    }
    let trimmed = raw.strip_suffix('%').unwrap_or(raw).replace(',', ".");
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| {
            ServiceError::MalformedResponse(format!("{:?} is not a percentage", raw))
        })
}

fn number_from(value: &Value, what: &str) -> Result<i64, ServiceError> {
    match value {
        Value::Number(n) => n.as_i64().ok_or_else(|| {
            ServiceError::MalformedResponse(format!("{} {:?} is out of range", what, n))
        }),
        Value::String(s) => parse_number(s, what),
        other => Err(ServiceError::MalformedResponse(format!(
            "{} {:?} is not a number",
            what, other
        ))),
    }
}

fn element_name(attr: &str) -> Result<Option<String>, ServiceError> {
    let element = match attr {
        "风" => "Anemo",
        "火" => "Pyro",
        "水" => "Hydro",
        "雷" => "Electro",
        "冰" => "Cryo",
        "岩" => "Geo",
        "？" => "Dendro",
        "" => return Ok(None),
        other => {
            return Err(ServiceError::MalformedResponse(format!(
                "unknown element {:?}",
                other
            )))
        }
    };
    Ok(Some(element.to_string()))
}

fn convert_up_items(items: Option<Vec<RawUpItem>>) -> Result<Vec<UpItem>, ServiceError> {
    items
        .unwrap_or_default()
        .into_iter()
        .map(|item| {
            Ok(UpItem {
                item_type: item.item_type,
                name: item.item_name,
                element: element_name(&item.item_attr)?,
                icon: item.item_img,
            })
        })
        .collect()
}

fn convert_prob_items(items: Vec<RawProbItem>) -> Result<Vec<BannerItem>, ServiceError> {
    items
        .into_iter()
        .map(|item| {
            Ok(BannerItem {
                item_type: item.item_type,
                name: item.item_name,
                rarity: u32::try_from(number_from(&item.rank, "rank")?).unwrap_or_default(),
                is_up: number_from(&item.is_up, "is_up")? != 0,
                order_value: number_from(&item.order_value, "order value")?,
            })
        })
        .collect()
}

const fn banner_type_name(banner_type: u32) -> &'static str {
    match banner_type {
        100 => "Novice Wishes",
        200 => "Permanent Wish",
        301 => "Character Event Wish",
        302 => "Weapon Event Wish",
        _ => "Event Wish",
    }
}

pub(crate) fn convert_banner_details(value: Value) -> Result<BannerDetails, ServiceError> {
    let raw: RawBannerDetails = decode(value, "banner details")?;

    let banner_type = u32::try_from(number_from(&raw.gacha_type, "banner type")?)
        .map_err(|_| ServiceError::MalformedResponse("negative banner type".to_string()))?;

    let r5 = raw.r5_prob_list.unwrap_or_default();
    let r4 = raw.r4_prob_list.unwrap_or_default();
    let r3 = raw.r3_prob_list.unwrap_or_default();

    let mut combined: Vec<RawProbItem> = r5.iter().chain(&r4).chain(&r3).cloned().collect();
    combined.sort_by_key(|item| number_from(&item.order_value, "order value").unwrap_or(i64::MAX));

    Ok(BannerDetails {
        banner_type_name: banner_type_name(banner_type).to_string(),
        banner_type,
        banner: markup_regex().replace_all(&raw.title, "").trim().to_string(),
        title: raw.title,
        content: raw.content,
        date_range: raw.date_range,
        r5_up_prob: parse_percent(&raw.r5_up_prob)?,
        r4_up_prob: parse_percent(&raw.r4_up_prob)?,
        r5_prob: parse_percent(&raw.r5_prob)?,
        r4_prob: parse_percent(&raw.r4_prob)?,
        r3_prob: parse_percent(&raw.r3_prob)?,
        r5_guarantee_prob: parse_percent(&raw.r5_baodi_prob)?,
        r4_guarantee_prob: parse_percent(&raw.r4_baodi_prob)?,
        r3_guarantee_prob: parse_percent(&raw.r3_baodi_prob)?,
        r5_up_items: convert_up_items(raw.r5_up_items)?,
        r4_up_items: convert_up_items(raw.r4_up_items)?,
        r5_items: convert_prob_items(r5)?,
        r4_items: convert_prob_items(r4)?,
        r3_items: convert_prob_items(r3)?,
        items: convert_prob_items(combined)?,
    })
}
