use crate::{
    args,
    db,
    error::MarketError,
    seed,
};
use log::{
    error,
    info,
    warn,
};
use rand::RngCore;

#[derive(Debug, PartialEq)]
pub enum ReleaseEnvironment {
    Development,
    Production,
}

impl ReleaseEnvironment {
    pub fn value(&self) -> String {
        match *self {
            ReleaseEnvironment::Development => String::from("development"),
            ReleaseEnvironment::Production => String::from("production"),
        }
    }
    /// LMDB environment directory name
    pub fn db_env_name(&self) -> String {
        match *self {
            ReleaseEnvironment::Development => String::from("test-lmdb"),
            ReleaseEnvironment::Production => String::from("lmdb"),
        }
    }
}

/// Random data generation for auth / primary keys
pub fn generate_rnd() -> String {
    let mut data = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut data);
    hex::encode(data)
}

/// Primary key for a record, `prefix` being one of the LMDB key constants
pub fn generate_id(prefix: &str) -> String {
    format!("{}{}", prefix, generate_rnd())
}

/// Whether `id` has the shape `generate_id(prefix)` gives
pub fn is_id(id: &str, prefix: &str) -> bool {
    match id.strip_prefix(prefix) {
        Some(rnd) => rnd.len() == 64 && rnd.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Helper for separation of dev and prod concerns
pub fn get_release_env() -> ReleaseEnvironment {
    if args::get().release_env == "prod" {
        ReleaseEnvironment::Production
    } else {
        ReleaseEnvironment::Development
    }
}

/// LMDB location. `BAZAAR_DATA_DIR` wins over `--data-dir`, which wins
///
/// over ~/.bazaar
pub fn get_data_dir() -> String {
    if let Ok(dir) = std::env::var(crate::BAZAAR_DATA_DIR) {
        if !dir.is_empty() {
            return dir;
        }
    }
    let arg = &args::get().data_dir;
    if !arg.is_empty() {
        return String::from(arg);
    }
    match std::env::var("HOME") {
        Ok(home) if !home.is_empty() => format!("{}/.{}", home, crate::APP_NAME),
        _ => format!(
            "{}/.{}",
            std::env::temp_dir().to_string_lossy(),
            crate::APP_NAME
        ),
    }
}

/// storefront port
pub fn get_app_port() -> u16 {
    args::get().port
}

/// app auth port
pub fn get_app_auth_port() -> u16 {
    args::get().auth_port
}

/// seller dashboard port
pub fn get_app_market_port() -> u16 {
    args::get().market_port
}

/// admin dashboard port
pub fn get_app_admin_port() -> u16 {
    args::get().admin_port
}

/// token expiration in seconds
pub fn get_token_timeout() -> i64 {
    args::get().token_timeout * 60
}

/// platform commission used until an admin stores one
pub fn get_default_commission_bps() -> u32 {
    args::get().commission_bps
}

/// refund window in seconds
pub fn get_refund_window() -> i64 {
    args::get().refund_window_days * 24 * 60 * 60
}

pub fn get_webhook_secret() -> String {
    String::from(&args::get().webhook_secret)
}

/// Current UNIX timestamp
pub fn now() -> i64 {
    chrono::offset::Utc::now().timestamp()
}

/// Trimmed and lowercased, used for emails and districts
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Coupon codes are stored upper case
pub fn normalize_code(s: &str) -> String {
    s.trim().to_uppercase()
}

// DoS prevention
pub const fn string_limit() -> usize {
    512
}
pub const fn description_limit() -> usize {
    4096
}
pub const fn image_limit() -> usize {
    8
}
pub const fn cart_limit() -> usize {
    50
}

/// Reject empty or oversized text fields
pub fn validate_text(field: &str, value: &str, limit: usize) -> Result<(), MarketError> {
    if value.trim().is_empty() {
        return Err(MarketError::InvalidInput(format!("{} is required", field)));
    }
    if value.len() > limit {
        return Err(MarketError::InvalidInput(format!("{} is too long", field)));
    }
    Ok(())
}

/// Secret key for signing session tokens, generated on first use
pub fn get_jwt_secret_key() -> Result<String, MarketError> {
    let _guard = db::lock_records()?;
    if let Some(key) = db::get::<String>(crate::BAZAAR_JWT_SECRET_KEY)? {
        return Ok(key);
    }
    info!("generating signing keys");
    let key = generate_rnd();
    db::put(crate::BAZAAR_JWT_SECRET_KEY, &key)?;
    Ok(key)
}

/// Invalidates every issued session token. The next token
///
/// request generates a fresh key.
pub fn revoke_signing_keys() -> Result<(), MarketError> {
    info!("revoking signing keys");
    db::remove(crate::BAZAAR_JWT_SECRET_KEY)
}

/// Put all app pre-checks here
pub fn start_up() -> Result<(), MarketError> {
    let env = get_release_env();
    info!("{} is starting up in {}", crate::APP_NAME, env.value());
    info!("data directory: {}", get_data_dir());
    if args::get().clear_sessions {
        revoke_signing_keys()?;
    }
    get_jwt_secret_key()?;
    if args::get().seed {
        if !seed::permitted(&env) {
            warn!("demo data is never seeded in {}", env.value());
        } else if let Err(e) = seed::run() {
            error!("failed to seed demo data: {:?}", e);
            return Err(e);
        }
    }
    Ok(())
}

// Tests
//-------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_rnd_test() {
        let a = generate_rnd();
        let b = generate_rnd();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(generate_id(crate::PRODUCT_DB_KEY).starts_with("p"));
    }

    #[test]
    fn is_id_test() {
        let pid = generate_id(crate::PRODUCT_DB_KEY);
        assert!(is_id(&pid, crate::PRODUCT_DB_KEY));
        assert!(!is_id(&pid, crate::ORDER_DB_KEY));
        assert!(!is_id(&generate_id(crate::PAYMENT_DB_KEY), crate::PRODUCT_DB_KEY));
        assert!(!is_id("p-missing", crate::PRODUCT_DB_KEY));
        assert!(!is_id(&format!("{}zz", &pid[..pid.len() - 2]), crate::PRODUCT_DB_KEY));
    }

    #[test]
    fn normalize_test() {
        assert_eq!(normalize("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_code(" save10 "), "SAVE10");
    }

    #[test]
    fn validate_text_test() {
        assert!(validate_text("name", "ok", string_limit()).is_ok());
        assert!(validate_text("name", "   ", string_limit()).is_err());
        let long = "x".repeat(string_limit() + 1);
        assert!(validate_text("name", &long, string_limit()).is_err());
    }

    #[test]
    fn release_env_test() {
        assert_eq!(get_release_env(), ReleaseEnvironment::Development);
        assert_eq!(get_release_env().db_env_name(), "test-lmdb");
    }

    #[test]
    fn jwt_secret_key_is_stable_test() -> Result<(), MarketError> {
        let a = get_jwt_secret_key()?;
        let b = get_jwt_secret_key()?;
        assert_eq!(a, b);
        Ok(())
    }
}
