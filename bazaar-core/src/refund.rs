//! Customer refund requests resolved by admins

use crate::{
    db,
    error::MarketError,
    models::*,
    order,
    reqres,
    utils,
};
use log::{
    debug,
    error,
    info,
};

fn customer_list_key(uid: &str) -> String {
    format!("{}-{}", crate::CUSTOMER_REFUND_LIST_DB_KEY, uid)
}

/// Pointer from an order to its latest refund
fn order_refund_key(orid: &str) -> String {
    format!("{}-{}", crate::REFUND_DB_KEY, orid)
}

/// Open a refund request on a paid order
pub fn request(uid: &str, r: &reqres::RefundRequest) -> Result<Refund, MarketError> {
    utils::validate_text("reason", &r.reason, utils::description_limit())?;
    let _guard = db::lock_records()?;
    let o = order::find_for_customer(uid, &r.orid)?;
    if o.payment_status != PaymentStatus::Paid {
        return Err(MarketError::Conflict(String::from("only paid orders can be refunded")));
    }
    if !o.status.can_transition_to(OrderStatus::Refunded) {
        return Err(MarketError::Conflict(format!(
            "{:?} orders can't be refunded",
            o.status
        )));
    }
    if utils::now() - o.created > utils::get_refund_window() {
        return Err(MarketError::Conflict(String::from("refund window has closed")));
    }
    if let Some(rid) = db::get::<String>(&order_refund_key(&o.orid))? {
        if let Some(prev) = db::get::<Refund>(&rid)? {
            if prev.status != RefundStatus::Rejected {
                return Err(MarketError::Conflict(String::from(
                    "a refund already exists for this order",
                )));
            }
        }
    }
    let new_refund = Refund {
        rid: utils::generate_id(crate::REFUND_DB_KEY),
        orid: String::from(&o.orid),
        uid: String::from(uid),
        reason: String::from(r.reason.trim()),
        amount: o.total,
        status: RefundStatus::Requested,
        note: String::new(),
        created: utils::now(),
        resolved: 0,
    };
    info!("refund requested: {}", &new_refund.rid);
    db::put(&new_refund.rid, &new_refund)?;
    db::put(&order_refund_key(&o.orid), &new_refund.rid)?;
    db::index_push(crate::REFUND_LIST_DB_KEY, &new_refund.rid)?;
    db::index_push(&customer_list_key(uid), &new_refund.rid)?;
    Ok(new_refund)
}

/// Refund lookup
pub fn find(rid: &str) -> Result<Refund, MarketError> {
    if !utils::is_id(rid, crate::REFUND_DB_KEY) {
        return Err(MarketError::NotFound);
    }
    match db::get::<Refund>(rid)? {
        Some(r) => Ok(r),
        None => {
            error!("refund not found");
            Err(MarketError::NotFound)
        }
    }
}

fn collect(ids: Vec<String>) -> Result<Vec<Refund>, MarketError> {
    let mut refunds: Vec<Refund> = Vec::new();
    for rid in ids {
        if let Some(r) = db::get::<Refund>(&rid)? {
            refunds.push(r);
        }
    }
    refunds.sort_by(|a, b| b.created.cmp(&a.created));
    Ok(refunds)
}

/// Lookup all refunds from admin server
pub fn find_all() -> Result<Vec<Refund>, MarketError> {
    collect(db::index_read(crate::REFUND_LIST_DB_KEY)?)
}

/// Lookup all refunds for customer
pub fn find_by_customer(uid: &str) -> Result<Vec<Refund>, MarketError> {
    collect(db::index_read(&customer_list_key(uid))?)
}

fn resolve(
    rid: &str,
    note: &str,
    status: RefundStatus,
) -> Result<Refund, MarketError> {
    if note.len() > utils::description_limit() {
        return Err(MarketError::InvalidInput(String::from("note is too long")));
    }
    let _guard = db::lock_records()?;
    let mut r = find(rid)?;
    if r.status != RefundStatus::Requested {
        return Err(MarketError::Conflict(format!("refund is already {:?}", r.status)));
    }
    if status == RefundStatus::Approved {
        order::mark_refunded(&r.orid)?;
    }
    r.status = status;
    r.note = String::from(note.trim());
    r.resolved = utils::now();
    debug!("resolve refund: {:?}", &r);
    db::put(&r.rid, &r)?;
    Ok(r)
}

/// Approve a refund, the order is refunded and stock goes back on sale
pub fn approve(rid: &str, note: &str) -> Result<Refund, MarketError> {
    info!("approving refund {}", rid);
    resolve(rid, note, RefundStatus::Approved)
}

/// Reject a refund with an explanation for the customer
pub fn reject(rid: &str, note: &str) -> Result<Refund, MarketError> {
    info!("rejecting refund {}", rid);
    resolve(rid, note, RefundStatus::Rejected)
}

/// Removes a refund record, only used to clean up tests
pub fn delete(rid: &str) -> Result<(), MarketError> {
    let r = find(rid)?;
    db::remove(rid)?;
    db::remove(&order_refund_key(&r.orid))?;
    db::index_remove(crate::REFUND_LIST_DB_KEY, rid)?;
    db::index_remove(&customer_list_key(&r.uid), rid)
}

// Tests
//-------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        delivery,
        order::tests::*,
        payment,
        product,
        test_support::*,
    };

    fn refund_request(orid: &str) -> reqres::RefundRequest {
        reqres::RefundRequest {
            orid: String::from(orid),
            reason: String::from("arrived broken"),
        }
    }

    #[test]
    fn approve_test() -> Result<(), MarketError> {
        let seller = Fixture::vendor()?;
        let buyer = Fixture::customer()?;
        let (zone, district) = test_zone(300)?;
        let p = seller.product("Bowl", 1_500, 4)?;
        let o = order::create(
            &buyer.uid,
            &order_request(vec![(&p.pid, 2)], &district, PaymentMethod::Card),
        )?;
        assert!(matches!(
            request(&buyer.uid, &refund_request(&o.orid)),
            Err(MarketError::Conflict(_))
        ));
        let pay = payment::tests::pay(&buyer.uid, &o.orid)?;
        assert!(matches!(
            request(&seller.uid, &refund_request(&o.orid)),
            Err(MarketError::Forbidden)
        ));
        let r = request(&buyer.uid, &refund_request(&o.orid))?;
        assert_eq!(r.amount, 3_300);
        assert_eq!(r.status, RefundStatus::Requested);
        assert!(matches!(
            request(&buyer.uid, &refund_request(&o.orid)),
            Err(MarketError::Conflict(_))
        ));
        assert_eq!(product::find(&p.pid)?.stock, 2);
        let a = approve(&r.rid, "sorry about that")?;
        assert_eq!(a.status, RefundStatus::Approved);
        assert_eq!(a.note, "sorry about that");
        let refunded = order::find(&o.orid)?;
        assert_eq!(refunded.status, OrderStatus::Refunded);
        assert_eq!(refunded.payment_status, PaymentStatus::Refunded);
        assert_eq!(product::find(&p.pid)?.stock, 4);
        assert!(matches!(reject(&r.rid, ""), Err(MarketError::Conflict(_))));
        assert!(find_by_customer(&buyer.uid)?.iter().any(|x| x.rid == r.rid));
        delete(&r.rid)?;
        payment::delete(&pay.reference)?;
        order::delete(&o.orid)?;
        delivery::remove(&zone.zid)?;
        buyer.cleanup()?;
        seller.cleanup()
    }

    #[test]
    fn reject_then_request_again_test() -> Result<(), MarketError> {
        let seller = Fixture::vendor()?;
        let buyer = Fixture::customer()?;
        let (zone, district) = test_zone(0)?;
        let p = seller.product("Cup", 500, 2)?;
        let o = order::create(
            &buyer.uid,
            &order_request(vec![(&p.pid, 1)], &district, PaymentMethod::Card),
        )?;
        let pay = payment::tests::pay(&buyer.uid, &o.orid)?;
        let first = request(&buyer.uid, &refund_request(&o.orid))?;
        let rejected = reject(&first.rid, "no damage visible")?;
        assert_eq!(rejected.status, RefundStatus::Rejected);
        assert_eq!(order::find(&o.orid)?.status, OrderStatus::Paid);
        let second = request(&buyer.uid, &refund_request(&o.orid))?;
        assert_ne!(second.rid, first.rid);
        delete(&first.rid)?;
        delete(&second.rid)?;
        payment::delete(&pay.reference)?;
        order::delete(&o.orid)?;
        delivery::remove(&zone.zid)?;
        buyer.cleanup()?;
        seller.cleanup()
    }

    #[test]
    fn shipped_order_refund_test() -> Result<(), MarketError> {
        let seller = Fixture::vendor()?;
        let buyer = Fixture::customer()?;
        let (zone, district) = test_zone(0)?;
        let p = seller.product("Teapot", 2_000, 1)?;
        let o = order::create(
            &buyer.uid,
            &order_request(vec![(&p.pid, 1)], &district, PaymentMethod::Card),
        )?;
        let pay = payment::tests::pay(&buyer.uid, &o.orid)?;
        order::update_status(&seller.vid, &o.orid, OrderStatus::Processing)?;
        order::update_status(&seller.vid, &o.orid, OrderStatus::Shipped)?;
        // in transit orders can't be refunded until they arrive
        assert!(matches!(
            request(&buyer.uid, &refund_request(&o.orid)),
            Err(MarketError::Conflict(_))
        ));
        assert!(find_by_customer(&buyer.uid)?.is_empty());
        order::update_status(&seller.vid, &o.orid, OrderStatus::Delivered)?;
        let r = request(&buyer.uid, &refund_request(&o.orid))?;
        let a = approve(&r.rid, "")?;
        assert_eq!(a.status, RefundStatus::Approved);
        assert_eq!(order::find(&o.orid)?.status, OrderStatus::Refunded);
        delete(&r.rid)?;
        payment::delete(&pay.reference)?;
        order::delete(&o.orid)?;
        delivery::remove(&zone.zid)?;
        buyer.cleanup()?;
        seller.cleanup()
    }

    #[test]
    fn refund_window_test() -> Result<(), MarketError> {
        let seller = Fixture::vendor()?;
        let buyer = Fixture::customer()?;
        let (zone, district) = test_zone(0)?;
        let p = seller.product("Plate", 800, 1)?;
        let o = order::create(
            &buyer.uid,
            &order_request(vec![(&p.pid, 1)], &district, PaymentMethod::Card),
        )?;
        let pay = payment::tests::pay(&buyer.uid, &o.orid)?;
        let mut old = order::find(&o.orid)?;
        old.created -= utils::get_refund_window() + 1;
        db::put(&old.orid, &old)?;
        assert!(matches!(
            request(&buyer.uid, &refund_request(&o.orid)),
            Err(MarketError::Conflict(_))
        ));
        payment::delete(&pay.reference)?;
        order::delete(&o.orid)?;
        delivery::remove(&zone.zid)?;
        buyer.cleanup()?;
        seller.cleanup()
    }
}
