//! Seller storefront applications and approvals

use crate::{
    db,
    error::MarketError,
    models::*,
    reqres,
    user,
    utils,
};
use log::{
    debug,
    error,
    info,
};

fn user_key(uid: &str) -> String {
    format!("{}-{}", crate::VENDOR_USER_DB_KEY, uid)
}

fn validate_store(r: &reqres::StoreRequest) -> Result<(), MarketError> {
    utils::validate_text("store name", &r.name, utils::string_limit())?;
    if r.description.len() > utils::description_limit() {
        return Err(MarketError::InvalidInput(String::from("description is too long")));
    }
    Ok(())
}

/// A user applies for a store. Stores start pending admin approval.
pub fn apply(uid: &str, r: &reqres::StoreRequest) -> Result<Vendor, MarketError> {
    validate_store(r)?;
    user::find(uid)?;
    let _guard = db::lock_records()?;
    if db::get::<String>(&user_key(uid))?.is_some() {
        return Err(MarketError::Conflict(String::from("user already owns a store")));
    }
    let new_vendor = Vendor {
        vid: utils::generate_id(crate::VENDOR_DB_KEY),
        uid: String::from(uid),
        name: String::from(r.name.trim()),
        description: String::from(&r.description),
        status: StoreStatus::Pending,
        commission_bps: None,
        created: utils::now(),
    };
    info!("store application: {}", &new_vendor.vid);
    db::put(&new_vendor.vid, &new_vendor)?;
    db::put(&user_key(uid), &new_vendor.vid)?;
    db::index_push(crate::VENDOR_LIST_DB_KEY, &new_vendor.vid)?;
    Ok(new_vendor)
}

/// Vendor lookup
pub fn find(vid: &str) -> Result<Vendor, MarketError> {
    if !utils::is_id(vid, crate::VENDOR_DB_KEY) {
        return Err(MarketError::NotFound);
    }
    match db::get::<Vendor>(vid)? {
        Some(v) => Ok(v),
        None => {
            error!("vendor not found");
            Err(MarketError::NotFound)
        }
    }
}

/// Store owned by a user, if any
pub fn find_by_user(uid: &str) -> Result<Option<Vendor>, MarketError> {
    match db::get::<String>(&user_key(uid))? {
        Some(vid) => db::get::<Vendor>(&vid),
        None => Ok(None),
    }
}

/// Lookup all stores
pub fn find_all() -> Result<Vec<Vendor>, MarketError> {
    let mut vendors: Vec<Vendor> = Vec::new();
    for vid in db::index_read(crate::VENDOR_LIST_DB_KEY)? {
        if let Some(v) = db::get::<Vendor>(&vid)? {
            vendors.push(v);
        }
    }
    Ok(vendors)
}

/// Whether the store may currently sell
pub fn is_approved(vid: &str) -> Result<bool, MarketError> {
    Ok(matches!(db::get::<Vendor>(vid)?, Some(v) if v.status == StoreStatus::Approved))
}

/// Owner edits of the store profile
pub fn update_profile(vid: &str, r: &reqres::StoreRequest) -> Result<Vendor, MarketError> {
    validate_store(r)?;
    let mut v = find(vid)?;
    v.name = String::from(r.name.trim());
    v.description = String::from(&r.description);
    debug!("update store: {}", vid);
    db::put(&v.vid, &v)?;
    Ok(v)
}

/// Admin approval, the owner becomes a vendor
pub fn approve(vid: &str) -> Result<Vendor, MarketError> {
    info!("approving store: {}", vid);
    let mut v = find(vid)?;
    v.status = StoreStatus::Approved;
    db::put(&v.vid, &v)?;
    let owner = user::find(&v.uid)?;
    if owner.role == Role::Customer {
        user::set_role(&v.uid, Role::Vendor)?;
    }
    Ok(v)
}

/// Admin suspension, the store's products leave the storefront
pub fn suspend(vid: &str) -> Result<Vendor, MarketError> {
    info!("suspending store: {}", vid);
    let mut v = find(vid)?;
    v.status = StoreStatus::Suspended;
    db::put(&v.vid, &v)?;
    Ok(v)
}

/// Store specific commission, `None` clears the override
pub fn set_commission(vid: &str, bps: Option<u32>) -> Result<Vendor, MarketError> {
    if let Some(b) = bps {
        if b > crate::MAX_COMMISSION_BPS {
            return Err(MarketError::InvalidInput(String::from("commission too high")));
        }
    }
    let mut v = find(vid)?;
    v.commission_bps = bps;
    db::put(&v.vid, &v)?;
    Ok(v)
}

/// Removes a store record, only used to clean up tests and seeds
pub fn delete(vid: &str) -> Result<(), MarketError> {
    let v = find(vid)?;
    db::remove(&user_key(&v.uid))?;
    db::remove(vid)?;
    db::index_remove(crate::VENDOR_LIST_DB_KEY, vid)
}

// Tests
//-------------------------------------------------------------------------------
