#[macro_use]
extern crate rocket;

use bazaar_core::error;
use rocket::{
    Build,
    Rocket,
};

pub mod controller;

/// Admin dashboard server
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount(
            "/",
            routes![
                controller::get_users,
                controller::suspend_user,
                controller::reinstate_user,
                controller::get_vendors,
                controller::approve_vendor,
                controller::suspend_vendor,
                controller::set_vendor_commission,
                controller::get_orders,
                controller::get_refunds,
                controller::approve_refund,
                controller::reject_refund,
                controller::get_coupons,
                controller::create_coupon,
                controller::update_coupon,
                controller::delete_coupon,
                controller::get_zones,
                controller::create_zone,
                controller::update_zone,
                controller::delete_zone,
                controller::get_commission,
                controller::set_commission,
                controller::get_stats,
            ],
        )
        .register("/", error::catchers())
}

// Tests
//-------------------------------------------------------------------------------
