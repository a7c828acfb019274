// ABOUTME: Payout distribution phase of settlement
// ABOUTME: Re-verifies the ratio sum before any transfer leaves the platform

use std::collections::HashMap;

use bountyboard_accounts::User;
use bountyboard_core::Cents;
use bountyboard_requests::FeatureRequest;
use tracing::{info, warn};

use crate::error::{SettlementError, SettlementResult};
use crate::processor::PaymentProcessor;
use crate::transactions::{TransactionRecord, TransactionStorage};
use crate::types::{Direction, PaymentRatio, PhaseReport, SettlementWarning, TransactionType};

const SUM_TOLERANCE: f64 = 0.01;

/// Pay each developer their accepted share of the pledged total.
///
/// The ratio sum is re-checked here even though `set_ratios` validated it,
/// since rows may have changed between acceptance and settlement. A bad sum
/// aborts before any transfer.
pub async fn distribute(
    processor: &dyn PaymentProcessor,
    transactions: &TransactionStorage,
    request: &FeatureRequest,
    ratios: &[PaymentRatio],
    developers: &HashMap<String, User>,
) -> SettlementResult<PhaseReport> {
    let sum: f64 = ratios.iter().map(|r| r.ratio_percentage).sum();
    if (sum - 100.0).abs() > SUM_TOLERANCE {
        return Err(SettlementError::Consistency(format!(
            "payout ratios for request {} sum to {:.2}, expected 100",
            request.id, sum
        )));
    }

    let mut report = PhaseReport::default();
    let description = format!("Bountyboard payout: {}", request.title);
    let payouts = allocate_payouts(request.total_bid_cents, ratios);

    for (ratio, payout) in ratios.iter().zip(payouts) {
        let developer = match developers.get(&ratio.developer_id) {
            Some(dev) => dev,
            None => {
                report.failed += 1;
                report.warnings.push(SettlementWarning::for_user(
                    &ratio.developer_id,
                    "payout skipped: developer account missing",
                ));
                continue;
            }
        };
        let destination = match &developer.stripe_account_id {
            Some(account) => account,
            None => {
                warn!(
                    "Payout to {} on request {} skipped: no connected account",
                    developer.id, request.id
                );
                report.failed += 1;
                report.warnings.push(SettlementWarning::for_user(
                    &developer.id,
                    format!("payout of {} skipped: no connected payment account", payout),
                ));
                continue;
            }
        };

        match processor
            .transfer(destination, payout, developer.preferred_currency, &description)
            .await
        {
            Ok(processor_id) => {
                transactions
                    .record(TransactionRecord {
                        user_id: Some(&developer.id),
                        guest_email: None,
                        transaction_type: TransactionType::FeatureRequest,
                        amount_cents: payout,
                        currency: developer.preferred_currency,
                        app_id: Some(&request.app_id),
                        feature_request_id: Some(&request.id),
                        processor_transaction_id: Some(&processor_id),
                        direction: Direction::Paid,
                    })
                    .await?;
                report.succeeded += 1;
            }
            Err(err) => {
                warn!(
                    "Transfer failed for {} on request {}: {}",
                    developer.id, request.id, err
                );
                report.failed += 1;
                report.warnings.push(SettlementWarning::for_user(
                    &developer.id,
                    format!("payout of {} failed: {}", payout, err),
                ));
            }
        }
    }

    info!(
        "Distribution for request {}: {} paid, {} failed",
        request.id, report.succeeded, report.failed
    );
    Ok(report)
}

/// Split the total across the ratio rows so the payouts sum exactly.
///
/// Rounding each share independently can drift a cent on odd totals, so each
/// payout is floored and the leftover cents go to the largest remainders,
/// same as the fee split.
fn allocate_payouts(total: Cents, ratios: &[PaymentRatio]) -> Vec<Cents> {
    if ratios.is_empty() || total.is_zero() {
        return vec![Cents::ZERO; ratios.len()];
    }

    const DENOM: i64 = 10_000;
    let hundredths: Vec<i64> = ratios
        .iter()
        .map(|r| (r.ratio_percentage * 100.0).round() as i64)
        .collect();

    let mut rows: Vec<(usize, i64, i128)> = hundredths
        .iter()
        .enumerate()
        .map(|(idx, pct)| {
            let exact = total.value() as i128 * *pct as i128;
            (idx, (exact / DENOM as i128) as i64, exact % DENOM as i128)
        })
        .collect();

    let target = total.mul_ratio(hundredths.iter().sum(), DENOM).value();
    let allocated: i64 = rows.iter().map(|(_, floor, _)| floor).sum();
    let mut leftover = target - allocated;

    rows.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));
    for row in rows.iter_mut() {
        if leftover == 0 {
            break;
        }
        row.1 += 1;
        leftover -= 1;
    }
    rows.sort_by_key(|(idx, _, _)| *idx);

    rows.into_iter().map(|(_, cents, _)| Cents(cents)).collect()
}
