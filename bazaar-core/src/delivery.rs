//! Delivery zones: named shipping fees keyed by districts

use crate::{
    db,
    error::MarketError,
    models::*,
    reqres,
    utils,
};
use log::{
    debug,
    info,
};

fn validate_zone(r: &reqres::ZoneRequest) -> Result<Vec<String>, MarketError> {
    utils::validate_text("zone name", &r.name, utils::string_limit())?;
    let mut districts: Vec<String> = Vec::new();
    for d in &r.districts {
        let n = utils::normalize(d);
        utils::validate_text("district", &n, utils::string_limit())?;
        if !districts.contains(&n) {
            districts.push(n);
        }
    }
    if districts.is_empty() {
        return Err(MarketError::InvalidInput(String::from(
            "a zone needs at least one district",
        )));
    }
    Ok(districts)
}

/// A district belongs to one zone only. `zid` is the zone being edited.
fn check_overlap(districts: &[String], zid: &str) -> Result<(), MarketError> {
    for z in find_all()? {
        if z.zid == zid {
            continue;
        }
        if let Some(d) = districts.iter().find(|d| z.districts.contains(d)) {
            return Err(MarketError::Conflict(format!(
                "district {} already belongs to zone {}",
                d, z.name
            )));
        }
    }
    Ok(())
}

/// Create a new zone
pub fn create(r: &reqres::ZoneRequest) -> Result<DeliveryZone, MarketError> {
    let districts = validate_zone(r)?;
    let _guard = db::lock_records()?;
    check_overlap(&districts, "")?;
    let zone = DeliveryZone {
        zid: utils::generate_id(crate::ZONE_DB_KEY),
        name: String::from(r.name.trim()),
        fee: r.fee,
        districts,
    };
    info!("create delivery zone: {}", &zone.name);
    db::put(&zone.zid, &zone)?;
    db::index_push(crate::ZONE_LIST_DB_KEY, &zone.zid)?;
    Ok(zone)
}

/// Zone lookup
pub fn find(zid: &str) -> Result<DeliveryZone, MarketError> {
    if !utils::is_id(zid, crate::ZONE_DB_KEY) {
        return Err(MarketError::NotFound);
    }
    db::get::<DeliveryZone>(zid)?.ok_or(MarketError::NotFound)
}

/// Lookup all zones
pub fn find_all() -> Result<Vec<DeliveryZone>, MarketError> {
    let mut zones: Vec<DeliveryZone> = Vec::new();
    for zid in db::index_read(crate::ZONE_LIST_DB_KEY)? {
        if let Some(z) = db::get::<DeliveryZone>(&zid)? {
            zones.push(z);
        }
    }
    Ok(zones)
}

/// Rename, re-price or re-district a zone
pub fn modify(r: &reqres::ZoneRequest) -> Result<DeliveryZone, MarketError> {
    let districts = validate_zone(r)?;
    let _guard = db::lock_records()?;
    let f_zone = find(&r.zid)?;
    check_overlap(&districts, &f_zone.zid)?;
    let zone = DeliveryZone {
        zid: f_zone.zid,
        name: String::from(r.name.trim()),
        fee: r.fee,
        districts,
    };
    debug!("update delivery zone: {:?}", &zone);
    db::put(&zone.zid, &zone)?;
    Ok(zone)
}

/// Delete a zone, its districts become undeliverable
pub fn remove(zid: &str) -> Result<(), MarketError> {
    find(zid)?;
    info!("remove delivery zone: {}", zid);
    db::remove(zid)?;
    db::index_remove(crate::ZONE_LIST_DB_KEY, zid)
}

/// Zone covering a district
pub fn lookup(district: &str) -> Result<DeliveryZone, MarketError> {
    let d = utils::normalize(district);
    if d.is_empty() {
        return Err(MarketError::Delivery(String::from("district is required")));
    }
    find_all()?
        .into_iter()
        .find(|z| z.districts.contains(&d))
        .ok_or_else(|| MarketError::Delivery(format!("no delivery zone covers {}", d)))
}

/// Shipping fee for a district
pub fn quote(district: &str) -> Result<reqres::DeliveryQuote, MarketError> {
    let z = lookup(district)?;
    Ok(reqres::DeliveryQuote {
        district: utils::normalize(district),
        zone: z.name,
        fee: z.fee,
    })
}

// Tests
//-------------------------------------------------------------------------------
