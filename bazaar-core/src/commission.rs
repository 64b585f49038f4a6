//! Platform commission on vendor sales

use crate::{
    db,
    error::MarketError,
    models::Vendor,
    utils,
};
use log::info;

/// Platform rate in basis points, the configured default until an admin stores one
pub fn platform_rate() -> Result<u32, MarketError> {
    Ok(db::get::<u32>(crate::COMMISSION_DB_KEY)?.unwrap_or_else(utils::get_default_commission_bps))
}

/// Admin update of the platform rate
pub fn set_platform_rate(bps: u32) -> Result<u32, MarketError> {
    if bps > crate::MAX_COMMISSION_BPS {
        return Err(MarketError::InvalidInput(format!(
            "commission can't exceed {} basis points",
            crate::MAX_COMMISSION_BPS
        )));
    }
    info!("setting platform commission to {} bps", bps);
    db::put(crate::COMMISSION_DB_KEY, &bps)?;
    Ok(bps)
}

/// Store override if any, otherwise the platform rate
pub fn rate_for(vendor: &Vendor) -> Result<u32, MarketError> {
    match vendor.commission_bps {
        Some(bps) => Ok(bps),
        None => platform_rate(),
    }
}

/// `(commission, vendor_net)` for a line total. Commission rounds down.
pub fn split(line_total: u64, bps: u32) -> (u64, u64) {
    let commission =
        ((line_total as u128 * bps as u128) / crate::BPS_DENOMINATOR as u128) as u64;
    (commission, line_total - commission.min(line_total))
}
