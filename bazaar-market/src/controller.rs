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

// JSON APIs for sellers, every route requires an approved store

/// Own store profile
#[get("/store")]
pub async fn get_store(
    seller: auth::VendorSession,
) -> Result<Custom<Json<models::Vendor>>, MarketError> {
    Ok(Custom(Status::Ok, Json(seller.vendor)))
}

#[patch("/store/update", data = "<req>")]
pub async fn update_store(
    req: Json<reqres::StoreRequest>,
    seller: auth::VendorSession,
) -> Result<Custom<Json<models::Vendor>>, MarketError> {
    Ok(Custom(
        Status::Ok,
        Json(vendor::update_profile(&seller.vendor.vid, &req)?),
    ))
}

/// Create a product by passing json product
#[post("/product/create", data = "<req_product>")]
pub async fn create_product(
    req_product: Json<reqres::ProductRequest>,
    seller: auth::VendorSession,
) -> Result<Custom<Json<models::Product>>, MarketError> {
    Ok(Custom(
        Status::Created,
        Json(product::create(&seller.vendor.vid, &req_product)?),
    ))
}

/// Update product information
#[patch("/product/update", data = "<req_product>")]
pub async fn update_product(
    req_product: Json<reqres::ProductRequest>,
    seller: auth::VendorSession,
) -> Result<Custom<Json<models::Product>>, MarketError> {
    Ok(Custom(
        Status::Ok,
        Json(product::modify(&seller.vendor.vid, &req_product)?),
    ))
}

/// Delist a product, past orders keep referencing it
#[delete("/product/<pid>")]
pub async fn delete_product(
    pid: String,
    seller: auth::VendorSession,
) -> Result<Custom<Json<models::Product>>, MarketError> {
    Ok(Custom(
        Status::Ok,
        Json(product::remove(&seller.vendor.vid, &pid)?),
    ))
}

/// Return all products of the store, delisted ones included
#[get("/products")]
pub async fn get_products(
    seller: auth::VendorSession,
) -> Result<Custom<Json<Vec<models::Product>>>, MarketError> {
    Ok(Custom(
        Status::Ok,
        Json(product::find_by_vendor(&seller.vendor.vid)?),
    ))
}

/// Orders holding at least one line of the store
#[get("/orders")]
pub async fn get_orders(
    seller: auth::VendorSession,
) -> Result<Custom<Json<Vec<models::Order>>>, MarketError> {
    Ok(Custom(
        Status::Ok,
        Json(order::find_by_vendor(&seller.vendor.vid)?),
    ))
}

/// Fulfillment: processing, shipped, delivered
#[patch("/order/<orid>/status", data = "<req>")]
pub async fn update_order_status(
    orid: String,
    req: Json<reqres::StatusUpdateRequest>,
    seller: auth::VendorSession,
) -> Result<Custom<Json<models::Order>>, MarketError> {
    Ok(Custom(
        Status::Ok,
        Json(order::update_status(&seller.vendor.vid, &orid, req.status)?),
    ))
}

#[get("/stats")]
pub async fn get_stats(
    seller: auth::VendorSession,
) -> Result<Custom<Json<reqres::VendorStats>>, MarketError> {
    Ok(Custom(Status::Ok, Json(stats::vendor(&seller.vendor.vid)?)))
}
