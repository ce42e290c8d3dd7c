//! Monetary arithmetic and formatting shared by layout and any preview.

use serde::{Deserialize, Serialize};

use super::{finite_or_zero, LineItem};

/// Round to 2 decimal places, half away from zero.
///
/// The scaled value is nudged by a few ULPs first so that inputs such as
/// `1.005` (stored as `1.00499999...`) round the way they read.
pub fn round2(value: f64) -> f64 {
    let value = finite_or_zero(value);
    let scaled = value * 100.0;
    let nudge = scaled.abs().max(1.0) * f64::EPSILON * 8.0;
    let rounded = (scaled + nudge.copysign(scaled)).round() / 100.0;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// `"{symbol} {value}"` with exactly two fraction digits.
pub fn format_money(symbol: &str, value: f64) -> String {
    format!("{} {:.2}", symbol, round2(value))
}

/// Shortest plain rendering of a number: `2`, `1.5`, `8.25`.
pub fn format_plain_number(value: f64) -> String {
    let value = finite_or_zero(value);
    if value == 0.0 {
        return "0".to_string();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Invoice totals, computed once per snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl Totals {
    /// `subtotal = Σ amount`, `tax = round2(subtotal × rate / 100)`,
    /// `total = round2(subtotal + tax)`.
    pub fn compute(items: &[LineItem], tax_rate_percent: f64) -> Self {
        let subtotal = round2(items.iter().map(LineItem::amount).sum());
        let tax = round2(subtotal * finite_or_zero(tax_rate_percent) / 100.0);
        let total = round2(subtotal + tax);
        Self {
            subtotal,
            tax,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2_half_away_from_zero() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(1.005), 1.01);
        assert_eq!(round2(2.675), 2.68);
        assert_eq!(round2(10.0), 10.0);
        assert_eq!(round2(f64::NAN), 0.0);
        assert_eq!(round2(-0.001), 0.0);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money("$", 100.0), "$ 100.00");
        assert_eq!(format_money("€", 0.1 + 0.2), "€ 0.30");
        assert_eq!(format_money("$", -0.001), "$ 0.00");
    }

    #[test]
    fn test_format_plain_number() {
        assert_eq!(format_plain_number(2.0), "2");
        assert_eq!(format_plain_number(1.5), "1.5");
        assert_eq!(format_plain_number(8.25), "8.25");
        assert_eq!(format_plain_number(f64::NAN), "0");
        assert_eq!(format_plain_number(-0.0), "0");
    }

    #[test]
    fn test_totals_scenario() {
        let items = vec![LineItem::new("Design", 2.0, 50.0)];
        let totals = Totals::compute(&items, 10.0);
        assert_eq!(totals.subtotal, 100.0);
        assert_eq!(totals.tax, 10.0);
        assert_eq!(totals.total, 110.0);
    }

    #[test]
    fn test_totals_properties_over_grid() {
        let quantities = [0.0, 1.0, 1.5, 3.0, 7.25, 12.0, 0.333];
        let rates = [0.0, 0.99, 10.0, 19.995, 49.5, 120.125];
        let tax_rates = [0.0, 5.0, 8.25, 10.0, 21.0];

        let items: Vec<LineItem> = quantities
            .iter()
            .zip(rates.iter().cycle())
            .map(|(&q, &r)| LineItem::new("x", q, r))
            .collect();

        for item in &items {
            assert!((item.amount() - round2(item.quantity * item.unit_rate)).abs() < 1e-9);
        }

        for &rate in &tax_rates {
            let totals = Totals::compute(&items, rate);
            let sum: f64 = items.iter().map(LineItem::amount).sum();
            assert!((sum - totals.subtotal).abs() < 1e-9);
            assert!((totals.tax - round2(totals.subtotal * rate / 100.0)).abs() < 1e-9);
            assert!((totals.total - round2(totals.subtotal + totals.tax)).abs() < 1e-9);
        }
    }
}
