// ABOUTME: Shared application state injected into every handler
// ABOUTME: Storage layers, the settlement service, and the notification scheduler

use std::sync::Arc;

use sqlx::SqlitePool;

use bountyboard_accounts::{AppStorage, UserStorage};
use bountyboard_notify::{DebounceScheduler, NotificationStorage};
use bountyboard_payments::{PaymentProcessor, RatioStorage, SettlementService, TransactionStorage};
use bountyboard_requests::RequestStorage;

/// Tunables the handlers need beyond storage access.
#[derive(Clone)]
pub struct ApiSettings {
    /// Minimum similarity score before a new request is flagged as a
    /// possible duplicate.
    pub similar_threshold: f64,
    pub similar_max_results: usize,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            similar_threshold: 0.6,
            similar_max_results: 5,
        }
    }
}

#[derive(Clone)]
pub struct DbState {
    pub pool: SqlitePool,
    pub users: Arc<UserStorage>,
    pub apps: Arc<AppStorage>,
    pub requests: Arc<RequestStorage>,
    pub ratios: Arc<RatioStorage>,
    pub transactions: Arc<TransactionStorage>,
    pub notifications: Arc<NotificationStorage>,
    pub scheduler: Arc<DebounceScheduler>,
    pub settlement: Arc<SettlementService>,
    pub settings: ApiSettings,
}

impl DbState {
    pub fn new(
        pool: SqlitePool,
        processor: Arc<dyn PaymentProcessor>,
        scheduler: Arc<DebounceScheduler>,
        quorum_percentage: u8,
        settings: ApiSettings,
    ) -> Self {
        let users = Arc::new(UserStorage::new(pool.clone()));
        let apps = Arc::new(AppStorage::new(pool.clone()));
        let requests = Arc::new(RequestStorage::new(pool.clone()));
        let ratios = Arc::new(RatioStorage::new(pool.clone()));
        let transactions = Arc::new(TransactionStorage::new(pool.clone()));
        let notifications = Arc::new(NotificationStorage::new(pool.clone()));

        let settlement = Arc::new(SettlementService::new(
            requests.clone(),
            users.clone(),
            ratios.clone(),
            transactions.clone(),
            processor,
            quorum_percentage,
        ));

        Self {
            pool,
            users,
            apps,
            requests,
            ratios,
            transactions,
            notifications,
            scheduler,
            settlement,
            settings,
        }
    }
}
