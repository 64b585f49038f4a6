//! Trending score used to order the storefront's trending shelf

/// A sale counts as much as this many views
pub const SALES_WEIGHT: f64 = 5.0;
pub const VIEW_WEIGHT: f64 = 1.0;
/// Hours added to the age so brand new listings don't divide by zero
const AGE_OFFSET_HOURS: f64 = 2.0;
/// How quickly old listings sink
const GRAVITY: f64 = 1.5;

/// `(sales * 5 + views) / (age_hours + 2)^1.5`
pub fn score(sales: u64, views: u64, age_hours: f64) -> f64 {
    let weighted = sales as f64 * SALES_WEIGHT + views as f64 * VIEW_WEIGHT;
    weighted / (age_hours.max(0.0) + AGE_OFFSET_HOURS).powf(GRAVITY)
}

/// Age of a listing in hours at `now`, both UNIX timestamps
pub fn age_hours(created: i64, now: i64) -> f64 {
    ((now - created).max(0) as f64) / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sales_outweigh_views_test() {
        assert!(score(1, 0, 10.0) > score(0, 4, 10.0));
        assert_eq!(score(1, 0, 10.0), score(0, 5, 10.0));
    }

    #[test]
    fn older_listings_sink_test() {
        assert!(score(10, 100, 1.0) > score(10, 100, 48.0));
    }

    #[test]
    fn untouched_listing_scores_zero_test() {
        assert_eq!(score(0, 0, 0.0), 0.0);
    }

    #[test]
    fn age_hours_test() {
        assert_eq!(age_hours(0, 7200), 2.0);
        // clock skew never yields a negative age
        assert_eq!(age_hours(100, 0), 0.0);
    }
}
