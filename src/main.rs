#[macro_use]
extern crate rocket;

use bazaar_core::*;
use clap::Parser;

#[launch]
async fn rocket() -> _ {
    args::install(args::Args::parse());
    env_logger::init();
    if let Err(e) = utils::start_up() {
        log::error!("start up failed: {}", e);
        std::process::exit(1);
    }
    let config = rocket::Config {
        ident: rocket::config::Ident::none(),
        ip_header: None,
        port: utils::get_app_port(),
        ..rocket::Config::debug_default()
    };
    log::info!("bazaar storefront is online");
    bazaar::build().configure(config)
}
