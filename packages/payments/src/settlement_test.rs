// ABOUTME: Tests for ratio negotiation and end-to-end settlement
// ABOUTME: Uses a recording mock processor against in-memory SQLite

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use bountyboard_accounts::{User, UserCreateInput, UserRole, UserStorage};
use bountyboard_core::{Cents, Currency};
use bountyboard_requests::{
    CommentInput, RequestCategory, RequestCreateInput, RequestStatus, RequestStorage, RequestType,
};

use crate::error::{ProcessorError, SettlementError};
use crate::processor::PaymentProcessor;
use crate::ratios::RatioStorage;
use crate::settlement::SettlementService;
use crate::transactions::TransactionStorage;
use crate::types::{ConfirmOutcome, Direction, RatioInput};

/// Records every call and fails for configured accounts.
#[derive(Default)]
struct MockProcessor {
    fail_accounts: HashSet<String>,
    charges: Mutex<Vec<(String, i64)>>,
    transfers: Mutex<Vec<(String, i64)>>,
}

impl MockProcessor {
    fn failing_for(accounts: &[&str]) -> Self {
        Self {
            fail_accounts: accounts.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn charge(
        &self,
        account: &str,
        amount: Cents,
        _currency: Currency,
        _description: &str,
    ) -> Result<String, ProcessorError> {
        if self.fail_accounts.contains(account) {
            return Err(ProcessorError::Declined("card declined".to_string()));
        }
        self.charges
            .lock()
            .unwrap()
            .push((account.to_string(), amount.value()));
        Ok(format!("pi_mock_{}", account))
    }

    async fn transfer(
        &self,
        destination: &str,
        amount: Cents,
        _currency: Currency,
        _description: &str,
    ) -> Result<String, ProcessorError> {
        if self.fail_accounts.contains(destination) {
            return Err(ProcessorError::Declined("transfer rejected".to_string()));
        }
        self.transfers
            .lock()
            .unwrap()
            .push((destination.to_string(), amount.value()));
        Ok(format!("tr_mock_{}", destination))
    }
}

struct Fixture {
    pool: sqlx::SqlitePool,
    users: Arc<UserStorage>,
    requests: Arc<RequestStorage>,
    ratios: Arc<RatioStorage>,
    transactions: Arc<TransactionStorage>,
}

async fn setup() -> Fixture {
    let pool = bountyboard_storage::connect_in_memory().await.unwrap();
    Fixture {
        users: Arc::new(UserStorage::new(pool.clone())),
        requests: Arc::new(RequestStorage::new(pool.clone())),
        ratios: Arc::new(RatioStorage::new(pool.clone())),
        transactions: Arc::new(TransactionStorage::new(pool.clone())),
        pool,
    }
}

impl Fixture {
    fn service(&self, processor: Arc<dyn PaymentProcessor>, quorum: u8) -> SettlementService {
        SettlementService::new(
            self.requests.clone(),
            self.users.clone(),
            self.ratios.clone(),
            self.transactions.clone(),
            processor,
            quorum,
        )
    }

    async fn user(&self, name: &str, role: UserRole) -> User {
        let user = self
            .users
            .create_user(UserCreateInput {
                name: name.to_string(),
                email: format!("{name}@example.com"),
                role,
                preferred_currency: None,
            })
            .await
            .unwrap();
        self.users
            .set_stripe_account(&user.id, Some(&format!("acct_{name}")))
            .await
            .unwrap()
    }

    /// A completed request with the given pledges and one active developer.
    async fn completed_request(
        &self,
        creator: &User,
        dev: &User,
        pledges: &[(&User, i64)],
    ) -> String {
        let app = bountyboard_accounts::AppStorage::new(self.pool.clone())
            .create_app(bountyboard_accounts::AppCreateInput {
                name: "testapp".to_string(),
                display_name: "Test App".to_string(),
                description: None,
            })
            .await
            .unwrap();

        let request = self
            .requests
            .create_request(
                creator,
                RequestCreateInput {
                    title: "Add dark mode".to_string(),
                    app_id: app.id,
                    request_type: RequestType::UiUx,
                    request_category: RequestCategory::Enhancement,
                    body: "Please add a dark theme".to_string(),
                },
            )
            .await
            .unwrap();

        for (user, cents) in pledges {
            self.requests
                .add_comment(
                    &request.id,
                    user,
                    CommentInput {
                        body: "pledging".to_string(),
                        bid_cents: *cents,
                    },
                )
                .await
                .unwrap();
        }

        self.requests.add_developer(&request.id, dev).await.unwrap();
        self.requests
            .set_status(&request.id, RequestStatus::Completed, None)
            .await
            .unwrap();
        request.id
    }
}

// ---- Ratio negotiation -----------------------------------------------------

#[tokio::test]
async fn test_even_split_materialized_for_three_developers() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let dev_a = fx.user("dev-a", UserRole::Dev).await;
    let dev_b = fx.user("dev-b", UserRole::Dev).await;
    let dev_c = fx.user("dev-c", UserRole::Dev).await;
    let request_id = fx
        .completed_request(&alice, &dev_a, &[(&alice, 10_000)])
        .await;
    let devs = vec![dev_a.id.clone(), dev_b.id.clone(), dev_c.id.clone()];

    let ratios = fx
        .ratios
        .ensure_default_ratios(&request_id, &devs)
        .await
        .unwrap();
    assert_eq!(ratios.len(), 3);
    let sum: f64 = ratios.iter().map(|r| r.ratio_percentage).sum();
    assert!((sum - 100.0).abs() < 0.001);
    assert!(ratios.iter().all(|r| !r.is_accepted));
    // 33.34 + 33.33 + 33.33
    let mut pcts: Vec<f64> = ratios.iter().map(|r| r.ratio_percentage).collect();
    pcts.sort_by(|a, b| b.partial_cmp(a).unwrap());
    assert_eq!(pcts, vec![33.34, 33.33, 33.33]);
}

#[tokio::test]
async fn test_single_developer_auto_accepts() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let carol = fx.user("carol", UserRole::Dev).await;
    let request_id = fx
        .completed_request(&alice, &carol, &[(&alice, 10_000)])
        .await;

    let ratios = fx
        .ratios
        .ensure_default_ratios(&request_id, &[carol.id.clone()])
        .await
        .unwrap();
    assert_eq!(ratios.len(), 1);
    assert_eq!(ratios[0].ratio_percentage, 100.0);
    assert!(ratios[0].is_accepted);
    assert!(fx.ratios.all_accepted(&request_id).await.unwrap());
}

#[tokio::test]
async fn test_set_ratios_validates_sum() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let dev_a = fx.user("dev-a", UserRole::Dev).await;
    let dev_b = fx.user("dev-b", UserRole::Dev).await;
    let dev_c = fx.user("dev-c", UserRole::Dev).await;
    let request_id = fx
        .completed_request(&alice, &dev_a, &[(&alice, 10_000)])
        .await;

    let err = fx
        .ratios
        .set_ratios(
            &request_id,
            &[
                RatioInput {
                    developer_id: dev_a.id.clone(),
                    percentage: 50.0,
                },
                RatioInput {
                    developer_id: dev_b.id.clone(),
                    percentage: 49.0,
                },
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::Validation(_)));

    // Within the +-0.01 tolerance.
    fx.ratios
        .set_ratios(
            &request_id,
            &[
                RatioInput {
                    developer_id: dev_a.id.clone(),
                    percentage: 33.33,
                },
                RatioInput {
                    developer_id: dev_b.id.clone(),
                    percentage: 33.33,
                },
                RatioInput {
                    developer_id: dev_c.id.clone(),
                    percentage: 33.33,
                },
            ],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_set_ratios_resets_acceptance_and_drops_absent_rows() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let dev_a = fx.user("dev-a", UserRole::Dev).await;
    let dev_b = fx.user("dev-b", UserRole::Dev).await;
    let dev_c = fx.user("dev-c", UserRole::Dev).await;
    let request_id = fx
        .completed_request(&alice, &dev_a, &[(&alice, 10_000)])
        .await;

    let devs = vec![dev_a.id.clone(), dev_b.id.clone()];
    fx.ratios
        .ensure_default_ratios(&request_id, &devs)
        .await
        .unwrap();
    fx.ratios.accept_ratio(&request_id, &dev_a.id).await.unwrap();
    fx.ratios.accept_ratio(&request_id, &dev_b.id).await.unwrap();
    assert!(fx.ratios.all_accepted(&request_id).await.unwrap());

    // Rewrite to a 70/30 split dropping dev-b, adding dev-c.
    fx.ratios
        .set_ratios(
            &request_id,
            &[
                RatioInput {
                    developer_id: dev_a.id.clone(),
                    percentage: 70.0,
                },
                RatioInput {
                    developer_id: dev_c.id.clone(),
                    percentage: 30.0,
                },
            ],
        )
        .await
        .unwrap();

    let ratios = fx.ratios.list(&request_id).await.unwrap();
    assert_eq!(ratios.len(), 2);
    assert!(ratios.iter().all(|r| !r.is_accepted));
    assert!(!ratios.iter().any(|r| r.developer_id == dev_b.id));
    assert!(!fx.ratios.all_accepted(&request_id).await.unwrap());
}

#[tokio::test]
async fn test_out_of_range_ratio_rejected() {
    let fx = setup().await;
    let err = fx
        .ratios
        .set_ratios(
            "req-x",
            &[RatioInput {
                developer_id: "dev-a".to_string(),
                percentage: 101.0,
            }],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::Validation(_)));
}

// ---- Confirmation and settlement --------------------------------------------

#[tokio::test]
async fn test_full_settlement_with_quorum() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let bob = fx.user("bob", UserRole::Requester).await;
    let carol = fx.user("carol", UserRole::Dev).await;

    let request_id = fx
        .completed_request(&alice, &carol, &[(&alice, 60_000), (&bob, 40_000)])
        .await;
    fx.ratios
        .ensure_default_ratios(&request_id, &[carol.id.clone()])
        .await
        .unwrap();

    let processor = Arc::new(MockProcessor::default());
    let service = fx.service(processor.clone(), 80);

    // 80% of 2 bidders requires both.
    let outcome = service.confirm_request(&request_id, &alice).await.unwrap();
    assert!(matches!(
        outcome,
        ConfirmOutcome::Pending {
            confirmations: 1,
            required: 2
        }
    ));
    let request = fx.requests.get_request(&request_id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Completed);

    let outcome = service.confirm_request(&request_id, &bob).await.unwrap();
    let settled = match outcome {
        ConfirmOutcome::Settled(outcome) => outcome,
        other => panic!("expected settlement, got {:?}", other),
    };
    assert!(settled.collected);
    assert!(settled.distributed);
    assert!(settled.warnings.is_empty());

    let request = fx.requests.get_request(&request_id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Confirmed);
    assert!(request.delivered_date.is_some());

    // Pledge + fee share: 600.00 + 17.58 and 400.00 + 11.72.
    let charges = processor.charges.lock().unwrap().clone();
    let mut amounts: Vec<i64> = charges.iter().map(|(_, cents)| *cents).collect();
    amounts.sort();
    assert_eq!(amounts, vec![41_172, 61_758]);

    // Sole developer receives the full pledged total.
    let transfers = processor.transfers.lock().unwrap().clone();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].1, 100_000);

    let ledger = fx.transactions.list_for_request(&request_id).await.unwrap();
    assert_eq!(ledger.len(), 3);
    assert_eq!(
        ledger
            .iter()
            .filter(|t| t.direction == Direction::Charged)
            .count(),
        2
    );
    assert_eq!(
        ledger
            .iter()
            .filter(|t| t.direction == Direction::Paid)
            .count(),
        1
    );
}

#[tokio::test]
async fn test_single_developer_settles_without_prior_ratio_read() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let carol = fx.user("carol", UserRole::Dev).await;

    // Nobody ever fetched the payout ratios for this request; settlement has
    // to materialize the auto-accepted 100% itself.
    let request_id = fx
        .completed_request(&alice, &carol, &[(&alice, 10_000)])
        .await;

    let processor = Arc::new(MockProcessor::default());
    let service = fx.service(processor.clone(), 80);

    let outcome = service.confirm_request(&request_id, &alice).await.unwrap();
    let settled = match outcome {
        ConfirmOutcome::Settled(outcome) => outcome,
        other => panic!("expected settlement, got {:?}", other),
    };
    assert!(settled.collected);
    assert!(settled.distributed);
    assert!(settled.warnings.is_empty());

    let transfers = processor.transfers.lock().unwrap().clone();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].1, 10_000);
}

#[tokio::test]
async fn test_confirm_rejected_for_non_bidders_and_wrong_status() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let mallory = fx.user("mallory", UserRole::Requester).await;
    let carol = fx.user("carol", UserRole::Dev).await;

    let request_id = fx
        .completed_request(&alice, &carol, &[(&alice, 10_000)])
        .await;

    let service = fx.service(Arc::new(MockProcessor::default()), 80);

    // Mallory never bid.
    let err = service
        .confirm_request(&request_id, &mallory)
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::Validation(_)));

    // Once confirmed, further confirmations are rejected.
    fx.ratios
        .ensure_default_ratios(&request_id, &[carol.id.clone()])
        .await
        .unwrap();
    service.confirm_request(&request_id, &alice).await.unwrap();
    let err = service
        .confirm_request(&request_id, &alice)
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::Validation(_)));
}

#[tokio::test]
async fn test_repeat_confirmation_does_not_advance_quorum() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let bob = fx.user("bob", UserRole::Requester).await;
    let carol = fx.user("carol", UserRole::Dev).await;

    let request_id = fx
        .completed_request(&alice, &carol, &[(&alice, 5_000), (&bob, 5_000)])
        .await;

    let service = fx.service(Arc::new(MockProcessor::default()), 80);

    for _ in 0..3 {
        let outcome = service.confirm_request(&request_id, &alice).await.unwrap();
        assert!(matches!(
            outcome,
            ConfirmOutcome::Pending {
                confirmations: 1,
                required: 2
            }
        ));
    }
    let request = fx.requests.get_request(&request_id).await.unwrap();
    assert_eq!(request.status, RequestStatus::Completed);
}

#[tokio::test]
async fn test_partial_collection_failure_isolates_siblings() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let bob = fx.user("bob", UserRole::Requester).await;
    let carol = fx.user("carol", UserRole::Dev).await;

    let request_id = fx
        .completed_request(&alice, &carol, &[(&alice, 60_000), (&bob, 40_000)])
        .await;
    fx.ratios
        .ensure_default_ratios(&request_id, &[carol.id.clone()])
        .await
        .unwrap();

    // Bob's card declines; Alice's charge and Carol's payout still run.
    let processor = Arc::new(MockProcessor::failing_for(&["acct_bob"]));
    let service = fx.service(processor.clone(), 80);

    service.confirm_request(&request_id, &alice).await.unwrap();
    let outcome = service.confirm_request(&request_id, &bob).await.unwrap();
    let settled = match outcome {
        ConfirmOutcome::Settled(outcome) => outcome,
        other => panic!("expected settlement, got {:?}", other),
    };
    assert!(!settled.collected);
    assert!(settled.distributed);
    assert_eq!(settled.warnings.len(), 1);
    assert_eq!(settled.warnings[0].user_id.as_deref(), Some(bob.id.as_str()));

    assert_eq!(processor.charges.lock().unwrap().len(), 1);
    assert_eq!(processor.transfers.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_disconnected_bidder_surfaces_warning() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let bob = fx.user("bob", UserRole::Requester).await;
    let carol = fx.user("carol", UserRole::Dev).await;

    let request_id = fx
        .completed_request(&alice, &carol, &[(&alice, 60_000), (&bob, 40_000)])
        .await;
    fx.ratios
        .ensure_default_ratios(&request_id, &[carol.id.clone()])
        .await
        .unwrap();

    // Bob disconnects his account after pledging.
    fx.users.set_stripe_account(&bob.id, None).await.unwrap();

    let processor = Arc::new(MockProcessor::default());
    let service = fx.service(processor.clone(), 80);

    service.confirm_request(&request_id, &alice).await.unwrap();
    let outcome = service.confirm_request(&request_id, &bob).await.unwrap();
    let settled = match outcome {
        ConfirmOutcome::Settled(outcome) => outcome,
        other => panic!("expected settlement, got {:?}", other),
    };
    assert!(!settled.collected);
    assert_eq!(settled.warnings.len(), 1);
    assert!(settled.warnings[0].message.contains("no connected payment account"));
    assert_eq!(processor.charges.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unaccepted_ratios_skip_distribution() {
    let fx = setup().await;
    let alice = fx.user("alice", UserRole::Requester).await;
    let carol = fx.user("carol", UserRole::Dev).await;
    let dave = fx.user("dave", UserRole::Dev).await;

    let request_id = fx
        .completed_request(&alice, &carol, &[(&alice, 10_000)])
        .await;
    fx.requests.add_developer(&request_id, &dave).await.unwrap();
    // Two developers, neither accepted the default split.
    fx.ratios
        .ensure_default_ratios(&request_id, &[carol.id.clone(), dave.id.clone()])
        .await
        .unwrap();

    let processor = Arc::new(MockProcessor::default());
    let service = fx.service(processor.clone(), 80);

    let outcome = service.confirm_request(&request_id, &alice).await.unwrap();
    let settled = match outcome {
        ConfirmOutcome::Settled(outcome) => outcome,
        other => panic!("expected settlement, got {:?}", other),
    };
    assert!(settled.collected);
    assert!(!settled.distributed);
    assert!(processor.transfers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_record_tip_for_guest() {
    let fx = setup().await;
    let app = bountyboard_accounts::AppStorage::new(fx.pool.clone())
        .create_app(bountyboard_accounts::AppCreateInput {
            name: "tipapp".to_string(),
            display_name: "Tip App".to_string(),
            description: None,
        })
        .await
        .unwrap();

    let tip = fx
        .transactions
        .record_tip(
            &app.id,
            None,
            Some("fan@example.com"),
            Cents(500),
            Currency::Usd,
            Some("pi_tip_1"),
        )
        .await
        .unwrap();

    assert!(tip.is_guest);
    assert_eq!(tip.direction, Direction::Tip);
    assert_eq!(tip.amount_cents, Cents(500));
    assert_eq!(tip.guest_email.as_deref(), Some("fan@example.com"));
}
