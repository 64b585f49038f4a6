//! Admin managed discount codes

use crate::{
    db,
    error::MarketError,
    models::*,
    utils,
};
use log::{
    debug,
    info,
};

fn coupon_key(code: &str) -> String {
    format!("{}-{}", crate::COUPON_DB_KEY, utils::normalize_code(code))
}

fn validate_coupon(c: &Coupon) -> Result<(), MarketError> {
    let code = utils::normalize_code(&c.code);
    if code.is_empty() || code.len() > 32 || !code.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Err(MarketError::InvalidInput(String::from(
            "coupon codes are 1 to 32 letters or digits",
        )));
    }
    if c.value == 0 {
        return Err(MarketError::InvalidInput(String::from("coupon value must be positive")));
    }
    if c.kind == CouponKind::Percent && c.value > crate::BPS_DENOMINATOR {
        return Err(MarketError::InvalidInput(String::from(
            "percent coupons can't exceed 10000 basis points",
        )));
    }
    Ok(())
}

/// Create a new coupon, codes are unique case-insensitively
pub fn create(c: &Coupon) -> Result<Coupon, MarketError> {
    validate_coupon(c)?;
    let _guard = db::lock_records()?;
    let k = coupon_key(&c.code);
    if db::get::<Coupon>(&k)?.is_some() {
        return Err(MarketError::Conflict(String::from("coupon code exists")));
    }
    let new_coupon = Coupon {
        code: utils::normalize_code(&c.code),
        used: 0,
        ..c.clone()
    };
    info!("create coupon: {}", &new_coupon.code);
    db::put(&k, &new_coupon)?;
    db::index_push(crate::COUPON_LIST_DB_KEY, &new_coupon.code)?;
    Ok(new_coupon)
}

/// Coupon lookup
pub fn find(code: &str) -> Result<Coupon, MarketError> {
    db::get::<Coupon>(&coupon_key(code))?.ok_or(MarketError::NotFound)
}

/// Lookup all coupons
pub fn find_all() -> Result<Vec<Coupon>, MarketError> {
    let mut coupons: Vec<Coupon> = Vec::new();
    for code in db::index_read(crate::COUPON_LIST_DB_KEY)? {
        if let Some(c) = db::get::<Coupon>(&coupon_key(&code))? {
            coupons.push(c);
        }
    }
    Ok(coupons)
}

/// Admin edit, usage count is preserved
pub fn modify(c: &Coupon) -> Result<Coupon, MarketError> {
    validate_coupon(c)?;
    let _guard = db::lock_records()?;
    let f_coupon = find(&c.code)?;
    let u_coupon = Coupon {
        code: f_coupon.code,
        used: f_coupon.used,
        ..c.clone()
    };
    debug!("update coupon: {:?}", &u_coupon);
    db::put(&coupon_key(&u_coupon.code), &u_coupon)?;
    Ok(u_coupon)
}

/// Coupons are never deleted so past orders stay explainable
pub fn deactivate(code: &str) -> Result<Coupon, MarketError> {
    let _guard = db::lock_records()?;
    let mut c = find(code)?;
    c.active = false;
    db::put(&coupon_key(&c.code), &c)?;
    Ok(c)
}

/// Discount a coupon grants on a subtotal at time `now`
pub fn discount(c: &Coupon, subtotal: u64, now: i64) -> Result<u64, MarketError> {
    if !c.active {
        return Err(MarketError::Coupon(String::from("coupon is inactive")));
    }
    if c.expires != 0 && now > c.expires {
        return Err(MarketError::Coupon(String::from("coupon has expired")));
    }
    if c.usage_limit != 0 && c.used >= c.usage_limit {
        return Err(MarketError::Coupon(String::from("coupon has been used up")));
    }
    if subtotal < c.min_order {
        return Err(MarketError::Coupon(format!(
            "order must be at least {}",
            c.min_order
        )));
    }
    let amount = match c.kind {
        CouponKind::Percent => {
            let d = ((subtotal as u128 * c.value as u128) / crate::BPS_DENOMINATOR as u128) as u64;
            if c.max_discount != 0 {
                d.min(c.max_discount)
            } else {
                d
            }
        }
        CouponKind::Fixed => c.value,
    };
    Ok(amount.min(subtotal))
}

/// Storefront preview before checkout
pub fn preview(code: &str, subtotal: u64) -> Result<u64, MarketError> {
    let c = find(code).map_err(|_| MarketError::Coupon(String::from("unknown coupon")))?;
    discount(&c, subtotal, utils::now())
}

/// Count a use at checkout. The caller holds `db::lock_records`.
pub(crate) fn redeem(code: &str) -> Result<Coupon, MarketError> {
    let mut c = find(code)?;
    c.used += 1;
    db::put(&coupon_key(&c.code), &c)?;
    Ok(c)
}

/// Give a use back when an order that redeemed the coupon is cancelled.
///
/// The caller holds `db::lock_records`.
pub(crate) fn release(code: &str) -> Result<(), MarketError> {
    if let Some(mut c) = db::get::<Coupon>(&coupon_key(code))? {
        c.used = c.used.saturating_sub(1);
        db::put(&coupon_key(&c.code), &c)?;
    }
    Ok(())
}

/// Removes a coupon record, only used to clean up tests and seeds
pub fn delete(code: &str) -> Result<(), MarketError> {
    db::remove(&coupon_key(code))?;
    db::index_remove(crate::COUPON_LIST_DB_KEY, &utils::normalize_code(code))
}

// Tests
//-------------------------------------------------------------------------------
