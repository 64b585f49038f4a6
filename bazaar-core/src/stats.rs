//! Dashboard reports

use crate::{
    error::MarketError,
    models::*,
    order,
    product,
    reqres,
    user,
    vendor,
};

const STATUSES: [OrderStatus; 7] = [
    OrderStatus::Pending,
    OrderStatus::Paid,
    OrderStatus::Processing,
    OrderStatus::Shipped,
    OrderStatus::Delivered,
    OrderStatus::Cancelled,
    OrderStatus::Refunded,
];

/// Platform totals over a set of orders
pub fn admin_report(
    users: usize,
    vendors: usize,
    products: usize,
    orders: &[Order],
) -> reqres::AdminStats {
    let orders_by_status = STATUSES
        .iter()
        .map(|s| reqres::StatusCount {
            status: *s,
            count: orders.iter().filter(|o| o.status == *s).count(),
        })
        .collect();
    let paid = orders.iter().filter(|o| o.payment_status == PaymentStatus::Paid);
    let gross_merchandise_value = paid.clone().map(|o| o.total).sum();
    let commission_earned = paid
        .flat_map(|o| o.lines.iter())
        .map(|l| l.commission)
        .sum();
    let refunded = orders
        .iter()
        .filter(|o| o.payment_status == PaymentStatus::Refunded)
        .map(|o| o.total)
        .sum();
    reqres::AdminStats {
        users,
        vendors,
        products,
        orders: orders.len(),
        orders_by_status,
        gross_merchandise_value,
        commission_earned,
        refunded,
    }
}

/// Earnings of one store over its lines on paid orders
pub fn vendor_report(vid: &str, orders: &[Order]) -> reqres::VendorStats {
    let mut stats = reqres::VendorStats {
        vid: String::from(vid),
        ..Default::default()
    };
    for o in orders.iter().filter(|o| o.payment_status == PaymentStatus::Paid) {
        let mut counted = false;
        for l in o.lines.iter().filter(|l| l.vid == vid) {
            stats.gross_sales += l.line_total;
            stats.commission += l.commission;
            stats.net_earnings += l.vendor_net;
            counted = true;
        }
        if counted {
            stats.orders += 1;
        }
    }
    stats
}

/// Admin dashboard report
pub fn admin() -> Result<reqres::AdminStats, MarketError> {
    Ok(admin_report(
        user::find_all()?.len(),
        vendor::find_all()?.len(),
        product::find_all()?.len(),
        &order::find_all()?,
    ))
}

/// Seller dashboard report
pub fn vendor(vid: &str) -> Result<reqres::VendorStats, MarketError> {
    Ok(vendor_report(vid, &order::find_by_vendor(vid)?))
}

// Tests
//-------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn line(vid: &str, line_total: u64, commission: u64) -> OrderLine {
        OrderLine {
            vid: String::from(vid),
            quantity: 1,
            unit_price: line_total,
            line_total,
            commission,
            vendor_net: line_total - commission,
            ..Default::default()
        }
    }

    fn sample() -> Vec<Order> {
        vec![
            Order {
                lines: vec![line("va", 1_000, 100), line("vb", 2_000, 300)],
                total: 3_500,
                status: OrderStatus::Delivered,
                payment_status: PaymentStatus::Paid,
                ..Default::default()
            },
            Order {
                lines: vec![line("va", 500, 50)],
                total: 500,
                status: OrderStatus::Pending,
                ..Default::default()
            },
            Order {
                lines: vec![line("va", 4_000, 400)],
                total: 4_000,
                status: OrderStatus::Refunded,
                payment_status: PaymentStatus::Refunded,
                ..Default::default()
            },
        ]
    }

    #[test]
    fn admin_report_test() {
        let s = admin_report(3, 2, 5, &sample());
        assert_eq!(s.orders, 3);
        assert_eq!(s.gross_merchandise_value, 3_500);
        assert_eq!(s.commission_earned, 400);
        assert_eq!(s.refunded, 4_000);
        assert_eq!(s.orders_by_status.len(), 7);
        let pending = s
            .orders_by_status
            .iter()
            .find(|c| c.status == OrderStatus::Pending)
            .map(|c| c.count);
        assert_eq!(pending, Some(1));
    }

    #[test]
    fn vendor_report_test() {
        let a = vendor_report("va", &sample());
        assert_eq!(a.orders, 1);
        assert_eq!(a.gross_sales, 1_000);
        assert_eq!(a.commission, 100);
        assert_eq!(a.net_earnings, 900);
        let c = vendor_report("vc", &sample());
        assert_eq!(c.orders, 0);
        assert_eq!(c.gross_sales, 0);
    }

    #[test]
    fn vendor_stats_test() -> Result<(), MarketError> {
        let seller = crate::test_support::Fixture::vendor()?;
        let s = vendor(&seller.vid)?;
        assert_eq!(s.vid, seller.vid);
        assert_eq!(s.orders, 0);
        seller.cleanup()
    }
}
