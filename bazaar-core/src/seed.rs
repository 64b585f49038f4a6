//! Demo data for development environments, written with `--seed`

use crate::{
    auth,
    coupon,
    delivery,
    error::MarketError,
    models::*,
    product,
    reqres,
    user,
    utils::ReleaseEnvironment,
    vendor,
};
use log::{
    info,
    warn,
};

pub const ADMIN_EMAIL: &str = "admin@bazaar.local";
pub const SELLER_EMAIL: &str = "seller@bazaar.local";
/// Shared by the seeded accounts, change it before exposing the app
pub const SEED_PASSWORD: &str = "bazaar-demo";
pub const DEMO_COUPON: &str = "WELCOME10";

/// Whether demo accounts may be written in `env`
pub fn permitted(env: &ReleaseEnvironment) -> bool {
    *env != ReleaseEnvironment::Production
}

fn account(email: &str, name: &str) -> Result<User, MarketError> {
    auth::register(&reqres::RegisterRequest {
        email: String::from(email),
        password: String::from(SEED_PASSWORD),
        name: String::from(name),
    })
}

fn zones() -> Result<(), MarketError> {
    let demo = [
        ("Central", 300, vec!["downtown", "old town", "harbor"]),
        ("Outskirts", 700, vec!["riverside", "hillview"]),
    ];
    for (name, fee, districts) in demo {
        let r = delivery::create(&reqres::ZoneRequest {
            zid: String::new(),
            name: String::from(name),
            fee,
            districts: districts.into_iter().map(String::from).collect(),
        });
        match r {
            Ok(z) => info!("seeded zone {}", z.name),
            Err(MarketError::Conflict(msg)) => warn!("skipping zone {}: {}", name, msg),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn store() -> Result<(), MarketError> {
    let seller = account(SELLER_EMAIL, "Demo Seller")?;
    let v = vendor::apply(
        &seller.uid,
        &reqres::StoreRequest {
            name: String::from("Demo Goods"),
            description: String::from("Everything a demo needs"),
        },
    )?;
    vendor::approve(&v.vid)?;
    let demo = [
        ("Enamel Mug", "Kitchen", 1_200, 40),
        ("Cast Iron Pan", "Kitchen", 4_500, 12),
        ("Linen Tote", "Bags", 2_000, 25),
        ("Desk Lamp", "Home", 3_800, 8),
    ];
    for (name, category, price, stock) in demo {
        product::create(
            &v.vid,
            &reqres::ProductRequest {
                pid: String::new(),
                name: String::from(name),
                description: format!("{} from the demo store", name),
                category: String::from(category),
                price,
                stock,
                images: Vec::new(),
                active: true,
            },
        )?;
    }
    info!("seeded store {}", v.name);
    Ok(())
}

fn welcome_coupon() -> Result<(), MarketError> {
    let r = coupon::create(&Coupon {
        code: String::from(DEMO_COUPON),
        kind: CouponKind::Percent,
        value: 1_000,
        max_discount: 5_000,
        active: true,
        ..Default::default()
    });
    match r {
        Ok(_) | Err(MarketError::Conflict(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Write demo data once. Skipped when the admin account exists.
pub fn run() -> Result<(), MarketError> {
    if user::find_by_email(ADMIN_EMAIL)?.is_some() {
        info!("demo data already present");
        return Ok(());
    }
    info!("seeding demo data");
    let admin = account(ADMIN_EMAIL, "Administrator")?;
    user::set_role(&admin.uid, Role::Admin)?;
    warn!("seeded accounts use the password {}", SEED_PASSWORD);
    zones()?;
    if user::find_by_email(SELLER_EMAIL)?.is_none() {
        store()?;
    }
    welcome_coupon()
}

// Tests
//-------------------------------------------------------------------------------
