// ABOUTME: Confirmation and settlement orchestration
// ABOUTME: Quorum of bidders gates the single compare-and-swap settlement run

use std::collections::HashMap;
use std::sync::Arc;

use bountyboard_accounts::{User, UserStorage};
use bountyboard_core::Cents;
use bountyboard_requests::{RequestStatus, RequestStorage};
use tracing::{info, warn};

use crate::collector;
use crate::distributor;
use crate::error::{SettlementError, SettlementResult};
use crate::processor::PaymentProcessor;
use crate::ratios::RatioStorage;
use crate::transactions::TransactionStorage;
use crate::types::{ConfirmOutcome, SettlementOutcome, SettlementWarning};

pub const DEFAULT_QUORUM_PERCENTAGE: u8 = 80;

pub struct SettlementService {
    requests: Arc<RequestStorage>,
    users: Arc<UserStorage>,
    ratios: Arc<RatioStorage>,
    transactions: Arc<TransactionStorage>,
    processor: Arc<dyn PaymentProcessor>,
    quorum_percentage: u8,
}

impl SettlementService {
    pub fn new(
        requests: Arc<RequestStorage>,
        users: Arc<UserStorage>,
        ratios: Arc<RatioStorage>,
        transactions: Arc<TransactionStorage>,
        processor: Arc<dyn PaymentProcessor>,
        quorum_percentage: u8,
    ) -> Self {
        Self {
            requests,
            users,
            ratios,
            transactions,
            processor,
            quorum_percentage,
        }
    }

    /// Record a bidder's confirmation of a completed request and settle once
    /// enough bidders have confirmed.
    ///
    /// The `completed -> confirmed` transition is a compare-and-swap, so
    /// exactly one caller runs collection and distribution no matter how many
    /// reach the quorum concurrently.
    pub async fn confirm_request(
        &self,
        request_id: &str,
        caller: &User,
    ) -> SettlementResult<ConfirmOutcome> {
        let request = self.requests.get_request(request_id).await?;
        if request.status != RequestStatus::Completed {
            return Err(SettlementError::Validation(
                "only completed requests can be confirmed".into(),
            ));
        }

        let caller_bid = self.requests.user_bid_cents(request_id, &caller.id).await?;
        if caller_bid.is_zero() {
            return Err(SettlementError::Validation(
                "only bidders may confirm completion".into(),
            ));
        }

        self.requests
            .record_confirmation(request_id, &caller.id)
            .await?;

        let confirmations = self.requests.confirmation_count(request_id).await?;
        let bidders = self.requests.distinct_bidders(request_id).await?;
        let required = quorum_required(self.quorum_percentage, bidders);

        if confirmations < required {
            info!(
                "Request {} confirmation {}/{} recorded, waiting for quorum",
                request_id, confirmations, required
            );
            return Ok(ConfirmOutcome::Pending {
                confirmations,
                required,
            });
        }

        if !self.requests.try_mark_confirmed(request_id).await? {
            // Another caller won the race; settlement already ran or is running.
            return Ok(ConfirmOutcome::Pending {
                confirmations,
                required,
            });
        }

        info!("Request {} confirmed, settling", request_id);
        let outcome = self.settle(request_id).await?;
        Ok(ConfirmOutcome::Settled(outcome))
    }

    /// Run collection then distribution, aggregating warnings from both.
    async fn settle(&self, request_id: &str) -> SettlementResult<SettlementOutcome> {
        let request = self.requests.get_request(request_id).await?;
        let mut warnings = Vec::new();

        let aggregates = self.requests.bidder_aggregates(request_id).await?;
        let bidder_ids: Vec<String> = aggregates.iter().map(|a| a.user_id.clone()).collect();
        let bidder_users = self.users.get_users(&bidder_ids).await?;
        let bidders: Vec<(User, Cents)> = aggregates
            .iter()
            .filter_map(|aggregate| {
                bidder_users
                    .iter()
                    .find(|u| u.id == aggregate.user_id)
                    .map(|u| (u.clone(), aggregate.total_cents))
            })
            .collect();

        let collection = collector::collect(
            self.processor.as_ref(),
            &self.transactions,
            &request,
            &bidders,
        )
        .await?;
        let collected = collection.all_succeeded();
        warnings.extend(collection.warnings);

        // Materialize the default split if nobody ever viewed the ratios, so
        // a sole developer's auto-accepted 100% still pays out.
        let active_developer_ids: Vec<String> = self
            .requests
            .list_developers(request_id, true)
            .await?
            .into_iter()
            .map(|d| d.developer_id)
            .collect();
        let ratios = self
            .ratios
            .ensure_default_ratios(request_id, &active_developer_ids)
            .await?;
        let distributed = if self.ratios.all_accepted(request_id).await? {
            let developer_ids: Vec<String> =
                ratios.iter().map(|r| r.developer_id.clone()).collect();
            let developers: HashMap<String, User> = self
                .users
                .get_users(&developer_ids)
                .await?
                .into_iter()
                .map(|u| (u.id.clone(), u))
                .collect();

            let distribution = distributor::distribute(
                self.processor.as_ref(),
                &self.transactions,
                &request,
                &ratios,
                &developers,
            )
            .await?;
            let ok = distribution.all_succeeded();
            warnings.extend(distribution.warnings);
            ok
        } else {
            warn!(
                "Request {} settled without distribution: ratios not fully accepted",
                request_id
            );
            warnings.push(SettlementWarning::general(
                "payout ratios not fully accepted; distribution skipped",
            ));
            false
        };

        Ok(SettlementOutcome {
            collected,
            distributed,
            warnings,
        })
    }
}

/// Distinct confirmers needed before settlement runs.
fn quorum_required(percentage: u8, distinct_bidders: i64) -> i64 {
    if distinct_bidders <= 0 {
        return 1;
    }
    let required = (percentage as i64 * distinct_bidders + 99) / 100;
    required.max(1)
}

#[cfg(test)]
mod tests {
    use super::quorum_required;

    #[test]
    fn test_quorum_rounds_up() {
        assert_eq!(quorum_required(80, 1), 1);
        assert_eq!(quorum_required(80, 2), 2);
        assert_eq!(quorum_required(80, 5), 4);
        assert_eq!(quorum_required(80, 6), 5);
        assert_eq!(quorum_required(50, 3), 2);
    }

    #[test]
    fn test_quorum_never_zero() {
        assert_eq!(quorum_required(1, 1), 1);
        assert_eq!(quorum_required(80, 0), 1);
    }
}
