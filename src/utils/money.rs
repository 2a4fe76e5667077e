// src/utils/money.rs
//
// All monetary amounts in the crate are integer paise (1 rupee = 100 paise).
// Cumulative driver stats accumulate in paise so thousands of rides never
// drift the way floating-point accumulation would.

/// Monetary amount in paise (minor units of INR).
pub type Paise = i64;

pub const PAISE_PER_RUPEE: i64 = 100;

pub fn rupees(amount: i64) -> Paise {
    amount * PAISE_PER_RUPEE
}

/// Round-half-up a fractional rupee amount to whole rupees, returned in paise.
///
/// This is the crate's one canonical rounding rule: fares and payouts are
/// settled to the whole rupee, ties round up (140.625 -> 141).
pub fn round_rupees_half_up(amount_rupees: f64) -> Paise {
    ((amount_rupees + 0.5).floor() as i64) * PAISE_PER_RUPEE
}

/// Format a paise amount as a rupee string for logs and responses.
pub fn format_rupees(amount: Paise) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.abs();
    format!("{}₹{}.{:02}", sign, abs / PAISE_PER_RUPEE, abs % PAISE_PER_RUPEE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_rupees_half_up(75.0), rupees(75));
        assert_eq!(round_rupees_half_up(140.625), rupees(141));
        assert_eq!(round_rupees_half_up(140.4999), rupees(140));
        assert_eq!(round_rupees_half_up(140.5), rupees(141));
        assert_eq!(round_rupees_half_up(0.0), 0);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_rupees(rupees(75)), "₹75.00");
        assert_eq!(format_rupees(12_345), "₹123.45");
        assert_eq!(format_rupees(-2_550), "-₹25.50");
    }
}
