//! core command line arguments
use clap::Parser;
use std::sync::OnceLock;

static ARGS: OnceLock<Args> = OnceLock::new();

/// cmd line args
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// set release environment
    #[arg(
        short,
        long,
        help = "Set release environment (dev, prod)",
        default_value = "dev"
    )]
    pub release_env: String,
    /// Storefront port
    #[arg(long, help = "Set app storefront port", default_value = "9000")]
    pub port: u16,
    /// Auth port
    #[arg(long, help = "Set app auth port", default_value = "9043")]
    pub auth_port: u16,
    /// Seller dashboard port
    #[arg(long, help = "Set app seller dashboard port", default_value = "9046")]
    pub market_port: u16,
    /// Admin dashboard port
    #[arg(long, help = "Set app admin dashboard port", default_value = "9047")]
    pub admin_port: u16,
    /// LMDB location
    #[arg(
        long,
        help = "Directory holding the LMDB environment. Defaults to ~/.bazaar",
        default_value = ""
    )]
    pub data_dir: String,
    /// Token expiration in minutes
    #[arg(
        short,
        long,
        help = "Set the token expiration limit in minutes.",
        default_value = "60"
    )]
    pub token_timeout: i64,
    /// Platform commission
    #[arg(
        long,
        help = "Default platform commission in basis points (1000 = 10%)",
        default_value = "1000"
    )]
    pub commission_bps: u32,
    /// Refund window
    #[arg(
        long,
        help = "Days after ordering during which a refund may be requested",
        default_value = "14"
    )]
    pub refund_window_days: i64,
    /// Payment webhook secret
    #[arg(
        long,
        help = "Shared secret used to verify payment provider webhooks",
        default_value = "bazaar-dev-webhook-secret"
    )]
    pub webhook_secret: String,
    /// Write demo data on start-up
    #[arg(
        long,
        help = "this will write an admin, delivery zones and a demo store",
        default_value = "false"
    )]
    pub seed: bool,
    /// Rotate the token signing key on start-up
    #[arg(
        long,
        help = "this will invalidate every issued session token",
        default_value = "false"
    )]
    pub clear_sessions: bool,
}

/// Install the arguments parsed by a binary so library code can read them
pub fn install(args: Args) {
    if ARGS.set(args).is_err() {
        log::warn!("command line arguments were already installed");
    }
}

/// Installed arguments, or the defaults when no binary installed any
pub fn get() -> &'static Args {
    ARGS.get_or_init(|| Args::parse_from([crate::APP_NAME]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_test() {
        let args = Args::parse_from([crate::APP_NAME]);
        assert_eq!(args.port, crate::DEFAULT_APP_PORT);
        assert_eq!(args.commission_bps, 1000);
        assert_eq!(args.refund_window_days, 14);
        assert!(!args.seed);
    }

    #[test]
    fn override_test() {
        let args = Args::parse_from([
            crate::APP_NAME,
            "--release-env",
            "prod",
            "--commission-bps",
            "250",
            "--seed",
        ]);
        assert_eq!(args.release_env, "prod");
        assert_eq!(args.commission_bps, 250);
        assert!(args.seed);
    }
}
