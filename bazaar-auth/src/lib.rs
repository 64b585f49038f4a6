#[macro_use]
extern crate rocket;

use bazaar_core::error;
use rocket::{
    Build,
    Rocket,
};

pub mod controller;

/// Account server: registration and sessions
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount(
            "/",
            routes![
                controller::register,
                controller::login,
                controller::logout,
                controller::me,
            ],
        )
        .register("/", error::catchers())
}

// Tests
//-------------------------------------------------------------------------------
