#[macro_use]
extern crate rocket;

use bazaar_core::*;
use clap::Parser;

// The only changes in here should be mounting new controller methods

#[launch]
async fn rocket() -> _ {
    args::install(args::Args::parse());
    env_logger::init();
    if let Err(e) = utils::start_up() {
        log::error!("start up failed: {}", e);
        std::process::exit(1);
    }
    let config = rocket::Config {
        port: utils::get_app_market_port(),
        ..rocket::Config::debug_default()
    };
    log::info!("bazaar-market is online");
    bazaar_market::build().configure(config)
}
