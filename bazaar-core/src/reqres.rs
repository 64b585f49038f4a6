//! Structs for all http requests

use crate::models::*;
use rocket::serde::{
    Deserialize,
    Serialize,
};

// All http requests and responses are here

/// For handling 4xx and 500 error responses
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ErrorResponse {
    pub error: String,
}

// START auth structs

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Returned on login, the token is also set as a cookie
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct SessionResponse {
    pub uid: String,
    pub role: Role,
    pub token: String,
    pub expiration: i64,
}

// END auth structs

// START store structs

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", default)]
pub struct StoreRequest {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", default)]
pub struct ProductRequest {
    /// Ignored on create
    pub pid: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: u64,
    pub stock: u64,
    pub images: Vec<String>,
    pub active: bool,
}

/// Storefront listing filters, all optional
#[derive(Debug, Default, Deserialize, Serialize, rocket::FromForm)]
#[serde(crate = "rocket::serde", default)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TrendingProduct {
    pub product: Product,
    pub score: f64,
}

/// Public store page: the profile and what it currently lists
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StorePage {
    pub vid: String,
    pub name: String,
    pub description: String,
    pub products: Vec<Product>,
}

// END store structs

// START checkout structs

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CartLine {
    pub pid: String,
    pub quantity: u64,
}

/// Handle checkout information for request
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", default)]
pub struct OrderRequest {
    pub lines: Vec<CartLine>,
    /// Empty when no coupon is applied
    pub coupon: String,
    pub district: String,
    pub ship_address: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CouponPreviewRequest {
    pub code: String,
    pub subtotal: u64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CouponPreviewResponse {
    pub code: String,
    pub discount: u64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DeliveryQuote {
    pub district: String,
    pub zone: String,
    pub fee: u64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", default)]
pub struct ZoneRequest {
    /// Ignored on create
    pub zid: String,
    pub name: String,
    pub fee: u64,
    pub districts: Vec<String>,
}

// END checkout structs

// START payment structs

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct PaymentResponse {
    pub reference: String,
    pub orid: String,
    pub amount: u64,
}

/// Body the payment provider posts to the webhook
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WebhookEvent {
    pub reference: String,
    /// `succeeded` or `failed`
    pub status: String,
    pub amount: u64,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct WebhookAck {
    pub reference: String,
    pub state: PaymentState,
}

// END payment structs

// START refund structs

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct RefundRequest {
    pub orid: String,
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde", default)]
pub struct ResolveRefundRequest {
    pub note: String,
}

// END refund structs

// START admin structs

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CommissionRate {
    pub bps: u32,
}

/// Per store rate, `null` falls back to the platform rate
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct CommissionOverride {
    pub bps: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

/// Platform wide report for the admin dashboard
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct AdminStats {
    pub users: usize,
    pub vendors: usize,
    pub products: usize,
    pub orders: usize,
    pub orders_by_status: Vec<StatusCount>,
    /// Sum of totals of paid orders
    pub gross_merchandise_value: u64,
    pub commission_earned: u64,
    pub refunded: u64,
}

/// Earnings report for a single store
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(crate = "rocket::serde")]
pub struct VendorStats {
    pub vid: String,
    pub orders: usize,
    pub gross_sales: u64,
    pub commission: u64,
    pub net_earnings: u64,
}

// END admin structs
