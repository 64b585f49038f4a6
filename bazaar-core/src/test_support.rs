//! Fixtures shared by the core module tests

use crate::{
    error::MarketError,
    models::*,
    product,
    reqres,
    user,
    utils,
    vendor,
};

pub fn test_email() -> String {
    format!("{}@test.bazaar", &utils::generate_rnd()[..12])
}

pub fn product_request(name: &str, price: u64, stock: u64) -> reqres::ProductRequest {
    reqres::ProductRequest {
        pid: String::new(),
        name: String::from(name),
        description: String::from("made for tests"),
        category: String::from("Kitchen"),
        price,
        stock,
        images: Vec::new(),
        active: true,
    }
}

/// A user, and for vendor fixtures an approved store owned by that user
pub struct Fixture {
    pub uid: String,
    pub vid: String,
}

impl Fixture {
    pub fn customer() -> Result<Fixture, MarketError> {
        let u = user::create(&test_email(), "Customer", String::from("h"), String::from("s"))?;
        Ok(Fixture {
            uid: u.uid,
            vid: String::new(),
        })
    }

    pub fn vendor() -> Result<Fixture, MarketError> {
        let u = user::create(&test_email(), "Seller", String::from("h"), String::from("s"))?;
        let v = vendor::apply(
            &u.uid,
            &reqres::StoreRequest {
                name: String::from("Fixture Store"),
                description: String::new(),
            },
        )?;
        vendor::approve(&v.vid)?;
        Ok(Fixture {
            uid: u.uid,
            vid: v.vid,
        })
    }

    pub fn product(&self, name: &str, price: u64, stock: u64) -> Result<Product, MarketError> {
        product::create(&self.vid, &product_request(name, price, stock))
    }

    pub fn cleanup(&self) -> Result<(), MarketError> {
        if !self.vid.is_empty() {
            for p in product::find_by_vendor(&self.vid)? {
                product::delete(&p.pid)?;
            }
            vendor::delete(&self.vid)?;
        }
        user::delete(&self.uid)
    }
}
