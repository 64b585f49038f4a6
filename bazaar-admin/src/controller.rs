use rocket::{
    delete,
    get,
    http::Status,
    patch,
    post,
    response::status::Custom,
    serde::json::Json,
};

use bazaar_core::{
    error::MarketError,
    *,
};

// JSON APIs for platform operators, every route requires an admin session

#[get("/users")]
pub async fn get_users(
    _admin: auth::AdminSession,
) -> Result<Custom<Json<Vec<models::User>>>, MarketError> {
    Ok(Custom(Status::Ok, Json(user::find_all()?)))
}

/// Suspended users can't log in and live sessions stop working
#[patch("/user/<uid>/suspend")]
pub async fn suspend_user(
    uid: String,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::User>>, MarketError> {
    Ok(Custom(Status::Ok, Json(user::set_suspended(&uid, true)?)))
}

#[patch("/user/<uid>/reinstate")]
pub async fn reinstate_user(
    uid: String,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::User>>, MarketError> {
    Ok(Custom(Status::Ok, Json(user::set_suspended(&uid, false)?)))
}

#[get("/vendors")]
pub async fn get_vendors(
    _admin: auth::AdminSession,
) -> Result<Custom<Json<Vec<models::Vendor>>>, MarketError> {
    Ok(Custom(Status::Ok, Json(vendor::find_all()?)))
}

#[patch("/vendor/<vid>/approve")]
pub async fn approve_vendor(
    vid: String,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::Vendor>>, MarketError> {
    Ok(Custom(Status::Ok, Json(vendor::approve(&vid)?)))
}

/// Hides every product of the store
#[patch("/vendor/<vid>/suspend")]
pub async fn suspend_vendor(
    vid: String,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::Vendor>>, MarketError> {
    Ok(Custom(Status::Ok, Json(vendor::suspend(&vid)?)))
}

/// Store specific commission, `{"bps": null}` clears it
#[patch("/vendor/<vid>/commission", data = "<req>")]
pub async fn set_vendor_commission(
    vid: String,
    req: Json<reqres::CommissionOverride>,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::Vendor>>, MarketError> {
    Ok(Custom(Status::Ok, Json(vendor::set_commission(&vid, req.bps)?)))
}

#[get("/orders")]
pub async fn get_orders(
    _admin: auth::AdminSession,
) -> Result<Custom<Json<Vec<models::Order>>>, MarketError> {
    Ok(Custom(Status::Ok, Json(order::find_all()?)))
}

#[get("/refunds")]
pub async fn get_refunds(
    _admin: auth::AdminSession,
) -> Result<Custom<Json<Vec<models::Refund>>>, MarketError> {
    Ok(Custom(Status::Ok, Json(refund::find_all()?)))
}

#[patch("/refund/<rid>/approve", data = "<req>")]
pub async fn approve_refund(
    rid: String,
    req: Json<reqres::ResolveRefundRequest>,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::Refund>>, MarketError> {
    Ok(Custom(Status::Ok, Json(refund::approve(&rid, &req.note)?)))
}

#[patch("/refund/<rid>/reject", data = "<req>")]
pub async fn reject_refund(
    rid: String,
    req: Json<reqres::ResolveRefundRequest>,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::Refund>>, MarketError> {
    Ok(Custom(Status::Ok, Json(refund::reject(&rid, &req.note)?)))
}

#[get("/coupons")]
pub async fn get_coupons(
    _admin: auth::AdminSession,
) -> Result<Custom<Json<Vec<models::Coupon>>>, MarketError> {
    Ok(Custom(Status::Ok, Json(coupon::find_all()?)))
}

#[post("/coupon/create", data = "<req>")]
pub async fn create_coupon(
    req: Json<models::Coupon>,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::Coupon>>, MarketError> {
    Ok(Custom(Status::Created, Json(coupon::create(&req)?)))
}

#[patch("/coupon/update", data = "<req>")]
pub async fn update_coupon(
    req: Json<models::Coupon>,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::Coupon>>, MarketError> {
    Ok(Custom(Status::Ok, Json(coupon::modify(&req)?)))
}

/// Coupons are deactivated, not erased
#[delete("/coupon/<code>")]
pub async fn delete_coupon(
    code: String,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::Coupon>>, MarketError> {
    Ok(Custom(Status::Ok, Json(coupon::deactivate(&code)?)))
}

#[get("/zones")]
pub async fn get_zones(
    _admin: auth::AdminSession,
) -> Result<Custom<Json<Vec<models::DeliveryZone>>>, MarketError> {
    Ok(Custom(Status::Ok, Json(delivery::find_all()?)))
}

#[post("/zone/create", data = "<req>")]
pub async fn create_zone(
    req: Json<reqres::ZoneRequest>,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::DeliveryZone>>, MarketError> {
    Ok(Custom(Status::Created, Json(delivery::create(&req)?)))
}

#[patch("/zone/update", data = "<req>")]
pub async fn update_zone(
    req: Json<reqres::ZoneRequest>,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<models::DeliveryZone>>, MarketError> {
    Ok(Custom(Status::Ok, Json(delivery::modify(&req)?)))
}

#[delete("/zone/<zid>")]
pub async fn delete_zone(zid: String, _admin: auth::AdminSession) -> Result<Status, MarketError> {
    delivery::remove(&zid)?;
    Ok(Status::NoContent)
}

#[get("/commission")]
pub async fn get_commission(
    _admin: auth::AdminSession,
) -> Result<Custom<Json<reqres::CommissionRate>>, MarketError> {
    Ok(Custom(
        Status::Ok,
        Json(reqres::CommissionRate {
            bps: commission::platform_rate()?,
        }),
    ))
}

/// Platform rate for new orders, past orders keep their split
#[patch("/commission", data = "<req>")]
pub async fn set_commission(
    req: Json<reqres::CommissionRate>,
    _admin: auth::AdminSession,
) -> Result<Custom<Json<reqres::CommissionRate>>, MarketError> {
    Ok(Custom(
        Status::Ok,
        Json(reqres::CommissionRate {
            bps: commission::set_platform_rate(req.bps)?,
        }),
    ))
}

#[get("/stats")]
pub async fn get_stats(
    _admin: auth::AdminSession,
) -> Result<Custom<Json<reqres::AdminStats>>, MarketError> {
    Ok(Custom(Status::Ok, Json(stats::admin()?)))
}
