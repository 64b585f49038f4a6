#[macro_use]
extern crate rocket;

use bazaar_core::error;
use rocket::{
    Build,
    Rocket,
};

pub mod controller;

// The only changes in here should be mounting new controller methods

/// Storefront server with every customer route mounted
pub fn build() -> Rocket<Build> {
    rocket::build()
        .mount(
            "/",
            routes![
                controller::get_products,
                controller::get_product,
                controller::get_categories,
                controller::get_trending,
                controller::get_delivery_quote,
                controller::preview_coupon,
                controller::create_order,
                controller::get_orders,
                controller::get_order,
                controller::cancel_order,
                controller::create_payment,
                controller::payment_webhook,
                controller::create_refund,
                controller::get_refunds,
                controller::get_store,
                controller::apply_store,
            ],
        )
        .register("/", error::catchers())
}

// Tests
//-------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{
        error::MarketError,
        models::*,
        reqres,
        *,
    };
    use hmac::{
        Hmac,
        Mac,
    };
    use rocket::{
        http::{
            ContentType,
            Header,
            Status,
        },
        local::blocking::Client,
    };
    use sha2::Sha256;

    const PASSWORD: &str = "correct horse";

    fn email() -> String {
        format!("{}@test.bazaar", &utils::generate_rnd()[..12])
    }

    /// Registered customer and a session token for it
    fn customer() -> Result<(String, String), MarketError> {
        let email = email();
        let u = auth::register(&reqres::RegisterRequest {
            email: String::from(&email),
            password: String::from(PASSWORD),
            name: String::from("Shopper"),
        })?;
        let s = auth::login(&reqres::LoginRequest {
            email,
            password: String::from(PASSWORD),
        })?;
        Ok((u.uid, s.token))
    }

    fn token(t: &str) -> Header<'static> {
        Header::new(bazaar_core::SESSION_HEADER, String::from(t))
    }

    fn sign(body: &str) -> String {
        let mut mac: Hmac<Sha256> =
            Hmac::new_from_slice(utils::get_webhook_secret().as_bytes()).expect("hmac key");
        mac.update(body.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn unknown_product_test() {
        let client = Client::tracked(build()).expect("valid rocket instance");
        let response = client.get("/product/p-missing").dispatch();
        assert_eq!(response.status(), Status::NotFound);
        let body = response
            .into_json::<reqres::ErrorResponse>()
            .expect("json error");
        assert_eq!(body.error, "Resource does not exist");
    }

    #[test]
    fn product_route_other_record_test() -> Result<(), MarketError> {
        let client = Client::tracked(build()).expect("valid rocket instance");
        let zone = delivery::create(&reqres::ZoneRequest {
            name: String::from("Not A Product"),
            fee: 100,
            districts: vec![format!("district-{}", &utils::generate_rnd()[..10])],
            ..Default::default()
        })?;
        let response = client.get(format!("/product/{}", zone.zid)).dispatch();
        assert_eq!(response.status(), Status::NotFound);
        delivery::remove(&zone.zid)
    }

    #[test]
    fn session_required_test() {
        let client = Client::tracked(build()).expect("valid rocket instance");
        let response = client.get("/orders").dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
        let response = client
            .get("/orders")
            .header(token("not.a.token"))
            .dispatch();
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[test]
    fn webhook_signature_test() {
        let client = Client::tracked(build()).expect("valid rocket instance");
        let body = r#"{"reference":"pay-none","status":"succeeded","amount":1}"#;
        let unsigned = client
            .post("/payment/webhook")
            .header(ContentType::JSON)
            .body(body)
            .dispatch();
        assert_eq!(unsigned.status(), Status::Unauthorized);
        let forged = client
            .post("/payment/webhook")
            .header(ContentType::JSON)
            .header(Header::new(bazaar_core::WEBHOOK_SIGNATURE_HEADER, "00ff"))
            .body(body)
            .dispatch();
        assert_eq!(forged.status(), Status::Unauthorized);
        let signed = client
            .post("/payment/webhook")
            .header(ContentType::JSON)
            .header(Header::new(bazaar_core::WEBHOOK_SIGNATURE_HEADER, sign(body)))
            .body(body)
            .dispatch();
        assert_eq!(signed.status(), Status::NotFound);
    }

    #[test]
    fn checkout_and_pay_test() -> Result<(), MarketError> {
        let client = Client::tracked(build()).expect("valid rocket instance");
        // seller side is set up directly in core
        let seller = auth::register(&reqres::RegisterRequest {
            email: email(),
            password: String::from(PASSWORD),
            name: String::from("Seller"),
        })?;
        let store = vendor::apply(
            &seller.uid,
            &reqres::StoreRequest {
                name: String::from("Route Store"),
                description: String::new(),
            },
        )?;
        vendor::approve(&store.vid)?;
        let p = product::create(
            &store.vid,
            &reqres::ProductRequest {
                name: String::from("Route Mug"),
                category: String::from("Kitchen"),
                price: 1_000,
                stock: 2,
                active: true,
                ..Default::default()
            },
        )?;
        let district = format!("district-{}", &utils::generate_rnd()[..10]);
        let zone = delivery::create(&reqres::ZoneRequest {
            name: String::from("Route Zone"),
            fee: 150,
            districts: vec![String::from(&district)],
            ..Default::default()
        })?;
        let (uid, t) = customer()?;

        let quote = client
            .get(format!("/delivery/quote/{}", district))
            .dispatch();
        assert_eq!(quote.status(), Status::Ok);

        let checkout = client
            .post("/order/create")
            .header(token(&t))
            .json(&reqres::OrderRequest {
                lines: vec![reqres::CartLine {
                    pid: String::from(&p.pid),
                    quantity: 2,
                }],
                district: String::from(&district),
                ship_address: String::from("2 Route Road"),
                ..Default::default()
            })
            .dispatch();
        assert_eq!(checkout.status(), Status::Created);
        let o = checkout.into_json::<Order>().expect("order");
        assert_eq!(o.total, 2_150);
        assert_eq!(o.status, OrderStatus::Pending);

        let sold_out = client.get(format!("/product/{}", p.pid)).dispatch();
        assert_eq!(sold_out.status(), Status::NotFound);

        let started = client
            .post(format!("/payment/{}", o.orid))
            .header(token(&t))
            .dispatch();
        assert_eq!(started.status(), Status::Created);
        let pay = started
            .into_json::<reqres::PaymentResponse>()
            .expect("payment");
        let body = format!(
            r#"{{"reference":"{}","status":"succeeded","amount":{}}}"#,
            pay.reference, pay.amount
        );
        let ack = client
            .post("/payment/webhook")
            .header(ContentType::JSON)
            .header(Header::new(bazaar_core::WEBHOOK_SIGNATURE_HEADER, sign(&body)))
            .body(&body)
            .dispatch();
        assert_eq!(ack.status(), Status::Ok);

        let fetched = client
            .get(format!("/order/{}", o.orid))
            .header(token(&t))
            .dispatch()
            .into_json::<Order>()
            .expect("order");
        assert_eq!(fetched.status, OrderStatus::Paid);
        let cancel = client
            .post(format!("/order/{}/cancel", o.orid))
            .header(token(&t))
            .dispatch();
        assert_eq!(cancel.status(), Status::Conflict);

        payment::delete(&pay.reference)?;
        order::delete(&o.orid)?;
        delivery::remove(&zone.zid)?;
        product::delete(&p.pid)?;
        vendor::delete(&store.vid)?;
        user::delete(&seller.uid)?;
        user::delete(&uid)
    }

    #[test]
    fn store_apply_test() -> Result<(), MarketError> {
        let client = Client::tracked(build()).expect("valid rocket instance");
        let (uid, t) = customer()?;
        let apply = |name: &str| {
            client
                .post("/store/apply")
                .header(token(&t))
                .json(&reqres::StoreRequest {
                    name: String::from(name),
                    description: String::new(),
                })
                .dispatch()
        };
        let first = apply("Fresh Store");
        assert_eq!(first.status(), Status::Created);
        let v = first.into_json::<Vendor>().expect("vendor");
        assert_eq!(v.status, StoreStatus::Pending);
        assert_eq!(apply("Second Store").status(), Status::Conflict);
        // pending stores have no public page
        let page = client.get(format!("/store/{}", v.vid)).dispatch();
        assert_eq!(page.status(), Status::NotFound);
        vendor::delete(&v.vid)?;
        user::delete(&uid)
    }
}
