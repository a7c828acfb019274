// ABOUTME: Platform fee calculation and proportional fee splitting
// ABOUTME: Largest-remainder allocation keeps shares summing to the fee exactly

use bountyboard_core::Cents;

/// Processing fee rate in hundredths of a percent (2.9%).
const FEE_RATE_HUNDREDTHS: i64 = 290;
/// Flat per-settlement fee component.
const FEE_FLAT: Cents = Cents(30);

/// One bidder's share of the platform fee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeShare {
    pub user_id: String,
    pub share: Cents,
}

/// Platform fee for a settlement: 2.9% of the total, rounded half up,
/// plus 30 cents.
pub fn platform_fee(total: Cents) -> Cents {
    total.percent_hundredths(FEE_RATE_HUNDREDTHS) + FEE_FLAT
}

/// Split the platform fee across bidders in proportion to their pledges.
///
/// Each share starts at its floored proportional amount; the leftover cents
/// go to the largest remainders so the shares always sum to the fee exactly.
/// Zero pledges get no entry, and a zero total yields no shares.
pub fn distribute(total: Cents, contributions: &[(String, Cents)]) -> Vec<FeeShare> {
    if total.is_zero() {
        return Vec::new();
    }
    let contributors: Vec<&(String, Cents)> = contributions
        .iter()
        .filter(|(_, pledged)| pledged.value() > 0)
        .collect();
    if contributors.is_empty() {
        return Vec::new();
    }

    let pool: i128 = contributors.iter().map(|(_, c)| c.value() as i128).sum();
    let fee = platform_fee(total).value() as i128;

    // Floor each share, remembering the remainder for the second pass.
    let mut shares: Vec<(usize, i64, i128)> = contributors
        .iter()
        .enumerate()
        .map(|(idx, (_, pledged))| {
            let exact = fee * pledged.value() as i128;
            let floor = exact / pool;
            let remainder = exact % pool;
            (idx, floor as i64, remainder)
        })
        .collect();

    let allocated: i64 = shares.iter().map(|(_, floor, _)| floor).sum();
    let mut leftover = fee as i64 - allocated;

    // Hand the leftover cents to the largest remainders, biggest pledge
    // breaking ties, original order after that.
    shares.sort_by(|a, b| {
        b.2.cmp(&a.2)
            .then_with(|| contributors[b.0].1.cmp(&contributors[a.0].1))
            .then_with(|| a.0.cmp(&b.0))
    });
    for share in shares.iter_mut() {
        if leftover == 0 {
            break;
        }
        share.1 += 1;
        leftover -= 1;
    }
    shares.sort_by_key(|(idx, _, _)| *idx);

    shares
        .into_iter()
        .map(|(idx, cents, _)| FeeShare {
            user_id: contributors[idx].0.clone(),
            share: Cents(cents),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pledge(user: &str, cents: i64) -> (String, Cents) {
        (user.to_string(), Cents(cents))
    }

    #[test]
    fn test_platform_fee_reference_amount() {
        // 2.9% of 1000.00 + 0.30 = 29.30
        assert_eq!(platform_fee(Cents(100_000)), Cents(2_930));
    }

    #[test]
    fn test_reference_split() {
        // 1000.00 total, pledges 600.00 / 400.00 -> 17.58 / 11.72
        let shares = distribute(
            Cents(100_000),
            &[pledge("usr-a", 60_000), pledge("usr-b", 40_000)],
        );
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].share, Cents(1_758));
        assert_eq!(shares[1].share, Cents(1_172));
    }

    #[test]
    fn test_shares_sum_to_fee_exactly() {
        let pledges = [
            pledge("usr-a", 3_333),
            pledge("usr-b", 3_333),
            pledge("usr-c", 3_334),
        ];
        let total = Cents(10_000);
        let shares = distribute(total, &pledges);
        let sum: Cents = shares.iter().map(|s| s.share).sum();
        assert_eq!(sum, platform_fee(total));
    }

    #[test]
    fn test_uneven_split_sums_exactly() {
        let pledges = [
            pledge("usr-a", 100),
            pledge("usr-b", 100),
            pledge("usr-c", 100),
            pledge("usr-d", 100),
            pledge("usr-e", 100),
            pledge("usr-f", 100),
            pledge("usr-g", 100),
        ];
        let total = Cents(700);
        let shares = distribute(total, &pledges);
        let sum: Cents = shares.iter().map(|s| s.share).sum();
        assert_eq!(sum, platform_fee(total));
        assert_eq!(shares.len(), 7);
    }

    #[test]
    fn test_zero_pledges_are_skipped() {
        let shares = distribute(
            Cents(10_000),
            &[pledge("usr-a", 10_000), pledge("usr-b", 0)],
        );
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].user_id, "usr-a");
    }

    #[test]
    fn test_zero_total_yields_nothing() {
        assert!(distribute(Cents(0), &[pledge("usr-a", 0)]).is_empty());
    }

    #[test]
    fn test_single_bidder_carries_full_fee() {
        let total = Cents(5_000);
        let shares = distribute(total, &[pledge("usr-a", 5_000)]);
        assert_eq!(shares[0].share, platform_fee(total));
    }
}
