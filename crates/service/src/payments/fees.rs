//! Platform fee split.

/// Basis points per whole (10000 bps = 100 %).
pub const BPS_DENOMINATOR: i64 = 10_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeeSplit {
    pub amount_cents: i64,
    pub platform_fee_cents: i64,
    pub provider_amount_cents: i64,
}

/// `fee = round_half_up(amount * bps / 10000)`, provider gets the remainder.
pub fn split(amount_cents: i64, fee_bps: u32) -> FeeSplit {
    let amount = amount_cents.max(0);
    let bps = i64::from(fee_bps).min(BPS_DENOMINATOR);
    let fee = (amount * bps + BPS_DENOMINATOR / 2) / BPS_DENOMINATOR;
    FeeSplit { amount_cents: amount, platform_fee_cents: fee, provider_amount_cents: amount - fee }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_percent_of_round_amount() {
        let s = split(10_000, 1000);
        assert_eq!(s.platform_fee_cents, 1_000);
        assert_eq!(s.provider_amount_cents, 9_000);
    }

    #[test]
    fn rounds_half_up() {
        // 10% of 5 cents is 0.5 -> 1
        assert_eq!(split(5, 1000).platform_fee_cents, 1);
        // 10% of 4 cents is 0.4 -> 0
        assert_eq!(split(4, 1000).platform_fee_cents, 0);
        assert_eq!(split(12_345, 1000).platform_fee_cents, 1_235);
    }

    #[test]
    fn parts_always_sum_to_amount() {
        for amount in [0, 1, 99, 1_001, 7_777, 123_456] {
            for bps in [0, 250, 1000, 10_000] {
                let s = split(amount, bps);
                assert_eq!(s.platform_fee_cents + s.provider_amount_cents, amount);
                assert!(s.provider_amount_cents >= 0);
            }
        }
    }
}
