pub mod args;
pub mod auth;
pub mod commission;
pub mod coupon;
pub mod db;
pub mod delivery;
pub mod error;
pub mod models;
pub mod order;
pub mod payment;
pub mod product;
pub mod refund;
pub mod reqres;
pub mod seed;
pub mod stats;
#[cfg(test)]
pub(crate) mod test_support;
pub mod trending;
pub mod user;
pub mod utils;
pub mod vendor;

pub const APP_NAME: &str = "bazaar";
pub const BAZAAR_JWT_SECRET_KEY: &str = "BAZAAR_JWT_SECRET_KEY";
/// Environment variable overriding the LMDB directory
pub const BAZAAR_DATA_DIR: &str = "BAZAAR_DATA_DIR";
/// Name of the cookie carrying the signed session token
pub const SESSION_COOKIE: &str = "bazaar_token";
/// Header fallback for non-browser clients
pub const SESSION_HEADER: &str = "token";
/// Header carrying the payment provider signature
pub const WEBHOOK_SIGNATURE_HEADER: &str = "X-Bazaar-Signature";

// LMDB Keys
pub const USER_DB_KEY:                  &str = "u";
pub const USER_EMAIL_DB_KEY:            &str = "ue";
pub const VENDOR_DB_KEY:                &str = "v";
pub const VENDOR_USER_DB_KEY:           &str = "vu";
pub const PRODUCT_DB_KEY:               &str = "p";
pub const ORDER_DB_KEY:                 &str = "o";
pub const COUPON_DB_KEY:                &str = "cp";
pub const ZONE_DB_KEY:                  &str = "z";
pub const PAYMENT_DB_KEY:               &str = "pay";
pub const REFUND_DB_KEY:                &str = "r";
pub const COMMISSION_DB_KEY:            &str = "commission-bps";
pub const USER_LIST_DB_KEY:             &str = "ul";
pub const VENDOR_LIST_DB_KEY:           &str = "vl";
pub const PRODUCT_LIST_DB_KEY:          &str = "pl";
pub const VENDOR_PRODUCT_LIST_DB_KEY:   &str = "vpl";
pub const ORDER_LIST_DB_KEY:            &str = "ol";
pub const CUSTOMER_ORDER_LIST_DB_KEY:   &str = "olc";
pub const VENDOR_ORDER_LIST_DB_KEY:     &str = "olv";
pub const COUPON_LIST_DB_KEY:           &str = "cpl";
pub const ZONE_LIST_DB_KEY:             &str = "zl";
pub const REFUND_LIST_DB_KEY:           &str = "rl";
pub const CUSTOMER_REFUND_LIST_DB_KEY:  &str = "rlc";
// End LMDB Keys

/// Basis point denominator for commission and percent coupons
pub const BPS_DENOMINATOR: u64 = 10_000;
/// Platform commission can never be set above 50 percent
pub const MAX_COMMISSION_BPS: u32 = 5_000;
/// Rounds of HMAC-SHA384 applied to stored passwords
pub const PASSWORD_HASH_ROUNDS: u32 = 10_000;
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Default app port
pub const DEFAULT_APP_PORT: u16 = 9000;
/// Largest page the storefront search will return
pub const MAX_PAGE_SIZE: usize = 100;
// DO NOT EDIT BELOW THIS LINE
