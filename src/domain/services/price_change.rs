use crate::domain::entities::PriceObservation;

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Percent change from `previous` to `current`, 2 decimals.
///
/// A non-positive `previous` has no meaningful base and yields 0.0.
pub fn percentage_change(current: f64, previous: f64) -> f64 {
    if previous <= 0.0 || !previous.is_finite() || !current.is_finite() {
        return 0.0;
    }
    round_to((current - previous) / previous * 100.0, 2)
}

/// Price change between the two most recent observations.
///
/// `latest_first` must be ordered by date descending. Fewer than two rows
/// yields 0.0.
pub fn latest_price_change(latest_first: &[PriceObservation]) -> f64 {
    match latest_first {
        [current, previous, ..] => percentage_change(current.closing_price, previous.closing_price),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(day: u32, price: f64) -> PriceObservation {
        PriceObservation {
            id: day as i64,
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            commodity: "옥수수".to_string(),
            closing_price: price,
        }
    }

    #[test]
    fn test_percentage_change() {
        assert_eq!(percentage_change(110.0, 100.0), 10.0);
        assert_eq!(percentage_change(90.0, 100.0), -10.0);
        assert_eq!(percentage_change(100.0, 100.0), 0.0);
        assert_eq!(percentage_change(101.0, 300.0), -66.33);
        assert_eq!(percentage_change(2.0, 3.0), -33.33);
    }

    #[test]
    fn test_non_positive_previous_is_zero() {
        assert_eq!(percentage_change(10.0, 0.0), 0.0);
        assert_eq!(percentage_change(10.0, -5.0), 0.0);
    }

    #[test]
    fn test_latest_price_change_uses_two_most_recent() {
        let rows = vec![obs(3, 612.0), obs(2, 600.0), obs(1, 100.0)];
        assert_eq!(latest_price_change(&rows), 2.0);
    }

    #[test]
    fn test_latest_price_change_needs_two_rows() {
        assert_eq!(latest_price_change(&[]), 0.0);
        assert_eq!(latest_price_change(&[obs(1, 600.0)]), 0.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(-3.14159, 1), -3.1);
        assert_eq!(round_to(2.5, 0), 3.0);
    }
}
