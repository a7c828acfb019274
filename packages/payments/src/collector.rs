// ABOUTME: Payment collection phase of settlement
// ABOUTME: Charges each bidder their pledge plus fee share, isolating failures

use bountyboard_accounts::User;
use bountyboard_core::Cents;
use bountyboard_requests::FeatureRequest;
use tracing::{info, warn};

use crate::error::SettlementResult;
use crate::fees;
use crate::processor::PaymentProcessor;
use crate::transactions::{TransactionRecord, TransactionStorage};
use crate::types::{Direction, PhaseReport, SettlementWarning, TransactionType};

/// Charge every bidder their aggregate pledge plus their proportional fee
/// share, in their own currency.
///
/// A failed or uncollectable item becomes a warning and does not stop the
/// loop; the report marks the phase failed if any item failed.
pub async fn collect(
    processor: &dyn PaymentProcessor,
    transactions: &TransactionStorage,
    request: &FeatureRequest,
    bidders: &[(User, Cents)],
) -> SettlementResult<PhaseReport> {
    let contributions: Vec<(String, Cents)> = bidders
        .iter()
        .map(|(user, pledged)| (user.id.clone(), *pledged))
        .collect();
    let fee_shares = fees::distribute(request.total_bid_cents, &contributions);

    let mut report = PhaseReport::default();
    let description = format!("Bountyboard pledge: {}", request.title);

    for (user, pledged) in bidders {
        let fee_share = fee_shares
            .iter()
            .find(|s| s.user_id == user.id)
            .map(|s| s.share)
            .unwrap_or(Cents::ZERO);
        let amount = *pledged + fee_share;

        let account = match &user.stripe_account_id {
            Some(account) => account,
            None => {
                warn!(
                    "Pledge from {} on request {} is uncollectable: no connected account",
                    user.id, request.id
                );
                report.failed += 1;
                report.warnings.push(SettlementWarning::for_user(
                    &user.id,
                    format!(
                        "pledge of {} uncollectable: no connected payment account",
                        pledged
                    ),
                ));
                continue;
            }
        };

        match processor
            .charge(account, amount, user.preferred_currency, &description)
            .await
        {
            Ok(processor_id) => {
                transactions
                    .record(TransactionRecord {
                        user_id: Some(&user.id),
                        guest_email: None,
                        transaction_type: TransactionType::FeatureRequest,
                        amount_cents: amount,
                        currency: user.preferred_currency,
                        app_id: Some(&request.app_id),
                        feature_request_id: Some(&request.id),
                        processor_transaction_id: Some(&processor_id),
                        direction: Direction::Charged,
                    })
                    .await?;
                report.succeeded += 1;
            }
            Err(err) => {
                warn!(
                    "Charge failed for {} on request {}: {}",
                    user.id, request.id, err
                );
                report.failed += 1;
                report.warnings.push(SettlementWarning::for_user(
                    &user.id,
                    format!("charge of {} failed: {}", amount, err),
                ));
            }
        }
    }

    info!(
        "Collection for request {}: {} charged, {} failed",
        request.id, report.succeeded, report.failed
    );
    Ok(report)
}
