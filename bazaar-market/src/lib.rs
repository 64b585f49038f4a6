#[macro_use]
extern crate rocket;

use bazaar_core::error;
use rocket::{
    Build,
    Rocket,
};

pub mod controller;

/// Seller dashboard server
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount(
            "/",
            routes![
                controller::get_store,
                controller::update_store,
                controller::create_product,
                controller::update_product,
                controller::delete_product,
                controller::get_products,
                controller::get_orders,
                controller::update_order_status,
                controller::get_stats,
            ],
        )
        .register("/", error::catchers())
}

// Tests
//-------------------------------------------------------------------------------
