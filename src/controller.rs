use rocket::{
    get,
    http::Status,
    post,
    response::status::Custom,
    serde::json::Json,
};

use bazaar_core::{
    error::MarketError,
    *,
};

// JSON APIs for customers

/// Search listed products
///
/// Protected: false
#[get("/products?<query..>")]
pub async fn get_products(
    query: reqres::ProductQuery,
) -> Result<Custom<Json<reqres::ProductPage>>, MarketError> {
    Ok(Custom(Status::Ok, Json(product::search(&query)?)))
}

/// Product detail, counts as a view
///
/// Protected: false
#[get("/product/<pid>")]
pub async fn get_product(pid: String) -> Result<Custom<Json<models::Product>>, MarketError> {
    let p = product::find(&pid)?;
    if !product::is_listed(&p)? {
        return Err(MarketError::NotFound);
    }
    Ok(Custom(Status::Ok, Json(product::record_view(&pid)?)))
}

/// Protected: false
#[get("/categories")]
pub async fn get_categories() -> Result<Custom<Json<Vec<String>>>, MarketError> {
    Ok(Custom(Status::Ok, Json(product::categories()?)))
}

/// Trending shelf, 10 products unless `limit` says otherwise
///
/// Protected: false
#[get("/trending?<limit>")]
pub async fn get_trending(
    limit: Option<usize>,
) -> Result<Custom<Json<Vec<reqres::TrendingProduct>>>, MarketError> {
    Ok(Custom(Status::Ok, Json(product::trending(limit.unwrap_or(10))?)))
}

/// Protected: false
#[get("/delivery/quote/<district>")]
pub async fn get_delivery_quote(
    district: String,
) -> Result<Custom<Json<reqres::DeliveryQuote>>, MarketError> {
    Ok(Custom(Status::Ok, Json(delivery::quote(&district)?)))
}

/// Check a coupon against a cart subtotal before checkout
///
/// Protected: false
#[post("/coupon/preview", data = "<req>")]
pub async fn preview_coupon(
    req: Json<reqres::CouponPreviewRequest>,
) -> Result<Custom<Json<reqres::CouponPreviewResponse>>, MarketError> {
    let discount = coupon::preview(&req.code, req.subtotal)?;
    Ok(Custom(
        Status::Ok,
        Json(reqres::CouponPreviewResponse {
            code: utils::normalize_code(&req.code),
            discount,
        }),
    ))
}

/// Checkout
///
/// Protected: true
#[post("/order/create", data = "<req>")]
pub async fn create_order(
    req: Json<reqres::OrderRequest>,
    session: auth::Session,
) -> Result<Custom<Json<models::Order>>, MarketError> {
    Ok(Custom(Status::Created, Json(order::create(&session.uid, &req)?)))
}

/// Protected: true
#[get("/orders")]
pub async fn get_orders(
    session: auth::Session,
) -> Result<Custom<Json<Vec<models::Order>>>, MarketError> {
    Ok(Custom(Status::Ok, Json(order::find_by_customer(&session.uid)?)))
}

/// Protected: true
#[get("/order/<orid>")]
pub async fn get_order(
    orid: String,
    session: auth::Session,
) -> Result<Custom<Json<models::Order>>, MarketError> {
    Ok(Custom(
        Status::Ok,
        Json(order::find_for_customer(&session.uid, &orid)?),
    ))
}

/// Protected: true
#[post("/order/<orid>/cancel")]
pub async fn cancel_order(
    orid: String,
    session: auth::Session,
) -> Result<Custom<Json<models::Order>>, MarketError> {
    Ok(Custom(Status::Ok, Json(order::cancel(&session.uid, &orid)?)))
}

/// Start a card payment, the reference is handed to the provider
///
/// Protected: true
#[post("/payment/<orid>")]
pub async fn create_payment(
    orid: String,
    session: auth::Session,
) -> Result<Custom<Json<reqres::PaymentResponse>>, MarketError> {
    Ok(Custom(
        Status::Created,
        Json(payment::initiate(&session.uid, &orid)?),
    ))
}

/// Payment provider callback
///
/// Protected: signed with the webhook secret
#[post("/payment/webhook", data = "<body>")]
pub async fn payment_webhook(
    body: String,
    signature: payment::WebhookSignature,
) -> Result<Custom<Json<reqres::WebhookAck>>, MarketError> {
    Ok(Custom(
        Status::Ok,
        Json(payment::webhook(&body, &signature.0)?),
    ))
}

/// Protected: true
#[post("/refund/create", data = "<req>")]
pub async fn create_refund(
    req: Json<reqres::RefundRequest>,
    session: auth::Session,
) -> Result<Custom<Json<models::Refund>>, MarketError> {
    Ok(Custom(Status::Created, Json(refund::request(&session.uid, &req)?)))
}

/// Protected: true
#[get("/refunds")]
pub async fn get_refunds(
    session: auth::Session,
) -> Result<Custom<Json<Vec<models::Refund>>>, MarketError> {
    Ok(Custom(Status::Ok, Json(refund::find_by_customer(&session.uid)?)))
}

/// Protected: false
#[get("/store/<vid>")]
pub async fn get_store(vid: String) -> Result<Custom<Json<reqres::StorePage>>, MarketError> {
    Ok(Custom(Status::Ok, Json(product::store_page(&vid)?)))
}

/// Apply to become a seller
///
/// Protected: true
#[post("/store/apply", data = "<req>")]
pub async fn apply_store(
    req: Json<reqres::StoreRequest>,
    session: auth::Session,
) -> Result<Custom<Json<models::Vendor>>, MarketError> {
    Ok(Custom(Status::Created, Json(vendor::apply(&session.uid, &req)?)))
}
