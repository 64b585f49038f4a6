//! Records persisted to LMDB with bincode

use rocket::serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub enum Role {
    #[default]
    Customer,
    Vendor,
    Admin,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct User {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Hex encoded iterated HMAC-SHA384, never leaves core
    pub password_hash: String,
    pub salt: String,
    pub suspended: bool,
    pub created: i64,
}

impl User {
    /// Copy safe to hand to a client
    pub fn redacted(&self) -> User {
        User {
            password_hash: String::new(),
            salt: String::new(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub enum StoreStatus {
    #[default]
    Pending,
    Approved,
    Suspended,
}

/// A seller's storefront
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct Vendor {
    pub vid: String,
    /// Owner of the store
    pub uid: String,
    pub name: String,
    pub description: String,
    pub status: StoreStatus,
    /// Overrides the platform rate when set
    pub commission_bps: Option<u32>,
    pub created: i64,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct Product {
    pub pid: String,
    pub vid: String,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Minor currency units
    pub price: u64,
    pub stock: u64,
    pub images: Vec<String>,
    pub active: bool,
    pub views: u64,
    pub sales: u64,
    pub created: i64,
}

impl Product {
    /// Fields a vendor may change, counters and ownership are kept
    pub fn update(p: Product, up: &Product) -> Product {
        Product {
            name: String::from(&up.name),
            description: String::from(&up.description),
            category: String::from(&up.category),
            price: up.price,
            stock: up.stock,
            images: up.images.to_vec(),
            active: up.active,
            ..p
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub enum CouponKind {
    /// `value` is basis points of the subtotal
    #[default]
    Percent,
    /// `value` is minor currency units
    Fixed,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct Coupon {
    pub code: String,
    pub kind: CouponKind,
    pub value: u64,
    pub min_order: u64,
    /// 0 means uncapped
    pub max_discount: u64,
    /// 0 means unlimited
    pub usage_limit: u64,
    pub used: u64,
    /// UNIX timestamp, 0 means never
    pub expires: i64,
    pub active: bool,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct DeliveryZone {
    pub zid: String,
    pub name: String,
    pub fee: u64,
    /// Normalized district names
    pub districts: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Legal order life cycle moves
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (*self, next),
            (Pending, Paid)
                | (Pending, Cancelled)
                | (Paid, Processing)
                | (Paid, Refunded)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Processing, Refunded)
                | (Shipped, Delivered)
                | (Delivered, Refunded)
        )
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub enum PaymentMethod {
    #[default]
    Card,
    CashOnDelivery,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Refunded,
}

/// One product line of an order, priced at checkout time
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct OrderLine {
    pub pid: String,
    pub vid: String,
    pub name: String,
    pub quantity: u64,
    pub unit_price: u64,
    pub line_total: u64,
    pub commission: u64,
    pub vendor_net: u64,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct Order {
    pub orid: String,
    /// Customer uid
    pub uid: String,
    pub lines: Vec<OrderLine>,
    pub subtotal: u64,
    pub coupon: String,
    pub discount: u64,
    pub district: String,
    pub zone: String,
    pub delivery_fee: u64,
    pub total: u64,
    pub ship_address: String,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created: i64,
    pub updated: i64,
}

impl Order {
    /// Whether any line of this order belongs to the vendor
    pub fn involves_vendor(&self, vid: &str) -> bool {
        self.lines.iter().any(|l| l.vid == vid)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub enum PaymentState {
    #[default]
    Initiated,
    Succeeded,
    Failed,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct Payment {
    /// Reference handed to the payment provider
    pub reference: String,
    pub orid: String,
    pub uid: String,
    pub amount: u64,
    pub state: PaymentState,
    pub created: i64,
    pub settled: i64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub enum RefundStatus {
    #[default]
    Requested,
    Approved,
    Rejected,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct Refund {
    pub rid: String,
    pub orid: String,
    pub uid: String,
    pub reason: String,
    pub amount: u64,
    pub status: RefundStatus,
    /// Admin note on resolution
    pub note: String,
    pub created: i64,
    pub resolved: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_transition_test() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Refunded));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Refunded.can_transition_to(OrderStatus::Refunded));
    }

    #[test]
    fn redacted_user_test() {
        let u = User {
            uid: String::from("u1"),
            password_hash: String::from("secret"),
            salt: String::from("salt"),
            ..Default::default()
        };
        let r = u.redacted();
        assert_eq!(r.uid, "u1");
        assert!(r.password_hash.is_empty());
        assert!(r.salt.is_empty());
    }

    #[test]
    fn product_update_keeps_counters_test() {
        let p = Product {
            pid: String::from("p1"),
            vid: String::from("v1"),
            views: 10,
            sales: 3,
            ..Default::default()
        };
        let up = Product {
            pid: String::from("other"),
            vid: String::from("other"),
            name: String::from("new name"),
            price: 500,
            views: 0,
            ..Default::default()
        };
        let u = Product::update(p, &up);
        assert_eq!(u.pid, "p1");
        assert_eq!(u.vid, "v1");
        assert_eq!(u.views, 10);
        assert_eq!(u.sales, 3);
        assert_eq!(u.name, "new name");
        assert_eq!(u.price, 500);
    }
}
