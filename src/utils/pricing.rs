//! Money arithmetic for carts and orders.
//!
//! All amounts are minor currency units (cents). Decimal strings only exist at
//! the boundary with providers that want them, see [`format_minor`] and
//! [`parse_minor`].

/// Price inputs of one cart or order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinePrice {
    pub unit_price: i64,
    pub printing_cost: i64,
    pub quantity: i32,
    pub customized: bool,
}

impl LinePrice {
    /// Price of a single unit, surcharge included when the line is customized.
    pub fn unit_total(&self) -> i64 {
        if self.customized {
            self.unit_price + self.printing_cost
        } else {
            self.unit_price
        }
    }

    pub fn total(&self) -> i64 {
        self.unit_total() * i64::from(self.quantity)
    }
}

pub fn cart_total<'a>(lines: impl IntoIterator<Item = &'a LinePrice>) -> i64 {
    lines.into_iter().map(LinePrice::total).sum()
}

/// Instant buy: plain unit price, no customization.
pub fn instant_total(unit_price: i64, quantity: i32) -> i64 {
    unit_price * i64::from(quantity)
}

/// `13000` -> `"130.00"`
pub fn format_minor(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Parses a non-negative decimal amount with at most two fraction digits.
/// Thousands separators are tolerated: `"1,300.5"` -> `130050`.
pub fn parse_minor(raw: &str) -> Option<i64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let (whole, frac) = match cleaned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (cleaned.as_str(), ""),
    };
    if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(frac)
}

/// Loyalty points earned for an order: one per whole major unit.
pub fn loyalty_points_for(total: i64) -> i64 {
    total.max(0) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(unit: i64, qty: i32, customized: bool) -> LinePrice {
        LinePrice {
            unit_price: unit,
            printing_cost: 1500,
            quantity: qty,
            customized,
        }
    }

    #[test]
    fn test_surcharge_only_when_customized() {
        assert_eq!(line(12000, 2, false).total(), 24000);
        assert_eq!(line(12000, 2, true).total(), 27000);
        assert_eq!(line(12000, 1, true).unit_total(), 13500);
    }

    #[test]
    fn test_cart_total_sums_lines() {
        let lines = [line(12000, 1, false), line(14000, 2, true)];
        assert_eq!(cart_total(&lines), 12000 + 2 * 15500);
        assert_eq!(cart_total(&[]), 0);
    }

    #[test]
    fn test_instant_total_ignores_printing() {
        assert_eq!(instant_total(17000, 3), 51000);
    }

    #[test]
    fn test_format_minor() {
        assert_eq!(format_minor(13000), "130.00");
        assert_eq!(format_minor(5), "0.05");
        assert_eq!(format_minor(123456), "1234.56");
        assert_eq!(format_minor(-250), "-2.50");
    }

    #[test]
    fn test_parse_minor() {
        assert_eq!(parse_minor("130"), Some(13000));
        assert_eq!(parse_minor("130.0"), Some(13000));
        assert_eq!(parse_minor("130.05"), Some(13005));
        assert_eq!(parse_minor("1,300.5"), Some(130050));
        assert_eq!(parse_minor(" 10.00 "), Some(1000));
        assert_eq!(parse_minor("10.005"), None);
        assert_eq!(parse_minor("-1"), None);
        assert_eq!(parse_minor(".5"), None);
        assert_eq!(parse_minor("abc"), None);
    }

    #[test]
    fn test_loyalty_points() {
        assert_eq!(loyalty_points_for(13099), 130);
        assert_eq!(loyalty_points_for(99), 0);
        assert_eq!(loyalty_points_for(-500), 0);
    }
}
