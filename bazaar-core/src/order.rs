//! Marketplace order logic module

use crate::{
    commission,
    coupon,
    db,
    delivery,
    error::MarketError,
    models::*,
    product,
    reqres,
    utils,
    vendor,
};
use log::{
    debug,
    error,
    info,
};
use std::collections::HashMap;

fn customer_list_key(uid: &str) -> String {
    format!("{}-{}", crate::CUSTOMER_ORDER_LIST_DB_KEY, uid)
}

fn vendor_list_key(vid: &str) -> String {
    format!("{}-{}", crate::VENDOR_ORDER_LIST_DB_KEY, vid)
}

/// Merge repeated products and check cart bounds
fn validate_cart(r: &reqres::OrderRequest) -> Result<Vec<(String, u64)>, MarketError> {
    if r.lines.is_empty() {
        return Err(MarketError::InvalidInput(String::from("cart is empty")));
    }
    if r.lines.len() > utils::cart_limit() {
        return Err(MarketError::InvalidInput(String::from("too many cart lines")));
    }
    utils::validate_text("shipping address", &r.ship_address, utils::description_limit())?;
    let mut merged: Vec<(String, u64)> = Vec::new();
    for l in &r.lines {
        if l.quantity == 0 {
            return Err(MarketError::InvalidInput(String::from("quantity must be positive")));
        }
        match merged.iter_mut().find(|(pid, _)| pid == &l.pid) {
            Some((_, qty)) => {
                *qty = qty
                    .checked_add(l.quantity)
                    .ok_or_else(|| MarketError::InvalidInput(String::from("quantity too large")))?
            }
            None => merged.push((String::from(&l.pid), l.quantity)),
        }
    }
    Ok(merged)
}

fn overflow() -> MarketError {
    MarketError::InvalidInput(String::from("order total too large"))
}

/// Checkout. Prices, commission, discount and delivery fee are fixed
///
/// here; stock is reserved until the order is cancelled or refunded.
pub fn create(uid: &str, r: &reqres::OrderRequest) -> Result<Order, MarketError> {
    info!("creating order");
    let cart = validate_cart(r)?;
    let zone = delivery::lookup(&r.district)?;
    let _guard = db::lock_records()?;
    let mut rates: HashMap<String, u32> = HashMap::new();
    let mut products: Vec<Product> = Vec::new();
    let mut lines: Vec<OrderLine> = Vec::new();
    let mut subtotal: u64 = 0;
    for (pid, quantity) in cart {
        let p = product::find(&pid)?;
        if !product::is_listed(&p)? {
            return Err(MarketError::Conflict(format!("{} is not available", p.name)));
        }
        if p.stock < quantity {
            return Err(MarketError::Conflict(format!("insufficient stock for {}", p.name)));
        }
        let bps = match rates.get(&p.vid) {
            Some(bps) => *bps,
            None => {
                let bps = commission::rate_for(&vendor::find(&p.vid)?)?;
                rates.insert(String::from(&p.vid), bps);
                bps
            }
        };
        let line_total = p.price.checked_mul(quantity).ok_or_else(overflow)?;
        let (line_commission, vendor_net) = commission::split(line_total, bps);
        subtotal = subtotal.checked_add(line_total).ok_or_else(overflow)?;
        lines.push(OrderLine {
            pid: String::from(&p.pid),
            vid: String::from(&p.vid),
            name: String::from(&p.name),
            quantity,
            unit_price: p.price,
            line_total,
            commission: line_commission,
            vendor_net,
        });
        products.push(p);
    }
    let code = utils::normalize_code(&r.coupon);
    let discount = if code.is_empty() {
        0
    } else {
        let c = coupon::find(&code)
            .map_err(|_| MarketError::Coupon(String::from("unknown coupon")))?;
        coupon::discount(&c, subtotal, utils::now())?
    };
    let total = (subtotal - discount)
        .checked_add(zone.fee)
        .ok_or_else(overflow)?;
    // every check passed, reserve stock and redeem
    for (p, l) in products.iter_mut().zip(lines.iter()) {
        p.stock -= l.quantity;
        p.sales += l.quantity;
        product::save(p)?;
    }
    if !code.is_empty() {
        coupon::redeem(&code)?;
    }
    let status = match r.payment_method {
        PaymentMethod::Card => OrderStatus::Pending,
        PaymentMethod::CashOnDelivery => OrderStatus::Processing,
    };
    let ts = utils::now();
    let new_order = Order {
        orid: utils::generate_id(crate::ORDER_DB_KEY),
        uid: String::from(uid),
        lines,
        subtotal,
        coupon: code,
        discount,
        district: utils::normalize(&r.district),
        zone: zone.name,
        delivery_fee: zone.fee,
        total,
        ship_address: String::from(r.ship_address.trim()),
        status,
        payment_method: r.payment_method,
        payment_status: PaymentStatus::Unpaid,
        created: ts,
        updated: ts,
    };
    debug!("insert order: {:?}", &new_order);
    db::put(&new_order.orid, &new_order)?;
    db::index_push(crate::ORDER_LIST_DB_KEY, &new_order.orid)?;
    db::index_push(&customer_list_key(uid), &new_order.orid)?;
    let mut vendors: Vec<&str> = new_order.lines.iter().map(|l| l.vid.as_str()).collect();
    vendors.sort_unstable();
    vendors.dedup();
    for vid in vendors {
        db::index_push(&vendor_list_key(vid), &new_order.orid)?;
    }
    Ok(new_order)
}

/// Lookup order
pub fn find(orid: &str) -> Result<Order, MarketError> {
    if !utils::is_id(orid, crate::ORDER_DB_KEY) {
        return Err(MarketError::NotFound);
    }
    match db::get::<Order>(orid)? {
        Some(o) => Ok(o),
        None => {
            error!("order not found");
            Err(MarketError::NotFound)
        }
    }
}

/// Order lookup restricted to the customer who placed it
pub fn find_for_customer(uid: &str, orid: &str) -> Result<Order, MarketError> {
    let o = find(orid)?;
    if o.uid != uid {
        return Err(MarketError::Forbidden);
    }
    Ok(o)
}

fn collect(ids: Vec<String>) -> Result<Vec<Order>, MarketError> {
    let mut orders: Vec<Order> = Vec::new();
    for orid in ids {
        if let Some(o) = db::get::<Order>(&orid)? {
            orders.push(o);
        }
    }
    orders.sort_by(|a, b| b.created.cmp(&a.created));
    Ok(orders)
}

/// Lookup all orders from admin server
pub fn find_all() -> Result<Vec<Order>, MarketError> {
    collect(db::index_read(crate::ORDER_LIST_DB_KEY)?)
}

/// Lookup all orders for customer
pub fn find_by_customer(uid: &str) -> Result<Vec<Order>, MarketError> {
    collect(db::index_read(&customer_list_key(uid))?)
}

/// Lookup all orders holding at least one line of the vendor
pub fn find_by_vendor(vid: &str) -> Result<Vec<Order>, MarketError> {
    collect(db::index_read(&vendor_list_key(vid))?)
}

/// Put reserved stock back. The caller holds `db::lock_records`.
fn restock(o: &Order) -> Result<(), MarketError> {
    for l in &o.lines {
        match db::get::<Product>(&l.pid)? {
            Some(mut p) => {
                p.stock += l.quantity;
                p.sales = p.sales.saturating_sub(l.quantity);
                product::save(&p)?;
            }
            None => error!("can't restock missing product {}", l.pid),
        }
    }
    Ok(())
}

fn transition(o: &mut Order, next: OrderStatus) -> Result<(), MarketError> {
    if !o.status.can_transition_to(next) {
        return Err(MarketError::Conflict(format!(
            "order can't move from {:?} to {:?}",
            o.status, next
        )));
    }
    info!("order {} {:?} -> {:?}", o.orid, o.status, next);
    o.status = next;
    o.updated = utils::now();
    Ok(())
}

/// Customer cancellation of an unpaid order
pub fn cancel(uid: &str, orid: &str) -> Result<Order, MarketError> {
    let _guard = db::lock_records()?;
    let mut o = find_for_customer(uid, orid)?;
    if o.payment_status != PaymentStatus::Unpaid {
        return Err(MarketError::Conflict(String::from(
            "paid orders are refunded, not cancelled",
        )));
    }
    transition(&mut o, OrderStatus::Cancelled)?;
    restock(&o)?;
    if !o.coupon.is_empty() {
        coupon::release(&o.coupon)?;
    }
    db::put(&o.orid, &o)?;
    Ok(o)
}

/// Fulfillment updates from a vendor holding a line of the order
pub fn update_status(vid: &str, orid: &str, next: OrderStatus) -> Result<Order, MarketError> {
    let allowed = matches!(
        next,
        OrderStatus::Processing | OrderStatus::Shipped | OrderStatus::Delivered
    );
    if !allowed {
        return Err(MarketError::InvalidInput(format!(
            "vendors can't set {:?}",
            next
        )));
    }
    let _guard = db::lock_records()?;
    let mut o = find(orid)?;
    if !o.involves_vendor(vid) {
        return Err(MarketError::Forbidden);
    }
    transition(&mut o, next)?;
    if next == OrderStatus::Delivered && o.payment_method == PaymentMethod::CashOnDelivery {
        o.payment_status = PaymentStatus::Paid;
    }
    db::put(&o.orid, &o)?;
    Ok(o)
}

/// Successful card payment. The caller holds `db::lock_records`.
pub(crate) fn mark_paid(orid: &str) -> Result<Order, MarketError> {
    let mut o = find(orid)?;
    transition(&mut o, OrderStatus::Paid)?;
    o.payment_status = PaymentStatus::Paid;
    db::put(&o.orid, &o)?;
    Ok(o)
}

/// Approved refund. The caller holds `db::lock_records`.
pub(crate) fn mark_refunded(orid: &str) -> Result<Order, MarketError> {
    let mut o = find(orid)?;
    if o.payment_status != PaymentStatus::Paid {
        return Err(MarketError::Conflict(String::from("order was never paid")));
    }
    transition(&mut o, OrderStatus::Refunded)?;
    o.payment_status = PaymentStatus::Refunded;
    restock(&o)?;
    db::put(&o.orid, &o)?;
    Ok(o)
}

/// Removes an order record, only used to clean up tests
pub fn delete(orid: &str) -> Result<(), MarketError> {
    let o = find(orid)?;
    db::remove(orid)?;
    db::index_remove(crate::ORDER_LIST_DB_KEY, orid)?;
    db::index_remove(&customer_list_key(&o.uid), orid)?;
    for l in &o.lines {
        db::index_remove(&vendor_list_key(&l.vid), orid)?;
    }
    Ok(())
}

// Tests
//-------------------------------------------------------------------------------
