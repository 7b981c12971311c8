//! PaymentService unit tests.

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use initiation_types::{
        AccountRef, AccountType, AppError, CustomerAccount, FundsOracle, InitiatePaymentRequest,
        LimitKind, OracleError, PaymentId, PaymentInstruction, PaymentRejection, PaymentStatus,
        PaymentStore, PolicySet, PolicySettings, RepoError,
    };

    use crate::funds::FundsChecker;
    use crate::service::{DailyTotalSource, PaymentService, start_of_day};

    // ─────────────────────────────────────────────────────────────────────────────
    // Test doubles
    // ─────────────────────────────────────────────────────────────────────────────

    /// Simple in-memory store for testing the service layer.
    #[derive(Default)]
    pub struct MockStore {
        payments: Mutex<Vec<PaymentInstruction>>,
        /// When set, every update loses the compare-and-set.
        lose_updates: bool,
    }

    impl MockStore {
        pub fn new() -> Self {
            Self::default()
        }

        fn racing() -> Self {
            Self {
                lose_updates: true,
                ..Self::default()
            }
        }

        fn len(&self) -> usize {
            self.payments.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PaymentStore for MockStore {
        async fn insert(&self, instruction: &PaymentInstruction) -> Result<(), RepoError> {
            self.payments.lock().unwrap().push(instruction.clone());
            Ok(())
        }

        async fn find_by_id(
            &self,
            id: PaymentId,
        ) -> Result<Option<PaymentInstruction>, RepoError> {
            let payments = self.payments.lock().unwrap();
            Ok(payments.iter().find(|p| p.id == id).cloned())
        }

        async fn find_all_ordered_by_created_at_desc(
            &self,
        ) -> Result<Vec<PaymentInstruction>, RepoError> {
            let mut payments: Vec<_> = self.payments.lock().unwrap().iter().rev().cloned().collect();
            payments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(payments)
        }

        async fn update(
            &self,
            instruction: &PaymentInstruction,
            expected: PaymentStatus,
        ) -> Result<(), RepoError> {
            if self.lose_updates {
                return Err(RepoError::Conflict("status changed underneath".into()));
            }
            let mut payments = self.payments.lock().unwrap();
            let stored = payments
                .iter_mut()
                .find(|p| p.id == instruction.id)
                .ok_or(RepoError::NotFound)?;
            if stored.status != expected {
                return Err(RepoError::Conflict("status changed underneath".into()));
            }
            stored.status = instruction.status;
            Ok(())
        }

        async fn sum_amount_for_debtor_since(
            &self,
            debtor_account_id: &str,
            since: DateTime<Utc>,
        ) -> Result<Decimal, RepoError> {
            let payments = self.payments.lock().unwrap();
            Ok(payments
                .iter()
                .filter(|p| p.debtor_account.account_id == debtor_account_id)
                .filter(|p| p.status != PaymentStatus::Failed && p.created_at >= since)
                .map(|p| p.amount.value())
                .sum())
        }
    }

    /// Oracle answering from the customer-mock dataset.
    pub struct StaticOracle;

    #[async_trait]
    impl FundsOracle for StaticOracle {
        async fn accounts_for_customer(
            &self,
            customer_id: &str,
        ) -> Result<Vec<CustomerAccount>, OracleError> {
            let all = [
                ("acc1", "cust1", dec!(15000.00)),
                ("acc2", "cust1", dec!(400.00)),
                ("acc3", "cust2", dec!(800.00)),
            ];
            Ok(all
                .into_iter()
                .filter(|(_, owner, _)| *owner == customer_id)
                .map(|(id, owner, balance)| CustomerAccount {
                    id: id.into(),
                    customer_id: Some(owner.into()),
                    account_type: Some("Current".into()),
                    iban: None,
                    balance,
                    currency: Some("GBP".into()),
                })
                .collect())
        }
    }

    struct UnreachableOracle;

    #[async_trait]
    impl FundsOracle for UnreachableOracle {
        async fn accounts_for_customer(
            &self,
            _customer_id: &str,
        ) -> Result<Vec<CustomerAccount>, OracleError> {
            Err(OracleError::Unavailable("connection refused".into()))
        }
    }

    struct SlowOracle;

    #[async_trait]
    impl FundsOracle for SlowOracle {
        async fn accounts_for_customer(
            &self,
            customer_id: &str,
        ) -> Result<Vec<CustomerAccount>, OracleError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            StaticOracle.accounts_for_customer(customer_id).await
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────────

    fn service() -> PaymentService<MockStore, StaticOracle> {
        service_with(PolicySet::default())
    }

    fn service_with(policies: PolicySet) -> PaymentService<MockStore, StaticOracle> {
        PaymentService::new(MockStore::new(), FundsChecker::new(StaticOracle), policies)
    }

    /// Ceilings raised above `amount` so the pipeline reaches later checks.
    fn raised_limits(single: Decimal, daily: Decimal) -> PolicySet {
        PolicySet::from_settings(&PolicySettings {
            single_payment_limit: single,
            daily_payment_limit: daily,
            ..PolicySettings::default()
        })
        .unwrap()
    }

    fn request(debtor: &str, amount: Decimal, currency: &str) -> InitiatePaymentRequest {
        InitiatePaymentRequest {
            debtor_account: AccountRef::new(debtor, AccountType::Current).with_customer("cust1"),
            creditor_account: AccountRef::new("acc3", AccountType::Current)
                .with_iban("GB00CUST2000000001"),
            amount,
            currency: currency.to_string(),
            reference: Some("Test payment".into()),
            requested_execution_date: None,
        }
    }

    fn assert_rejected(result: Result<PaymentInstruction, AppError>, expected: PaymentRejection) {
        match result {
            Err(AppError::Rejected(r)) => assert_eq!(r, expected),
            other => panic!("expected {expected:?}, got {other:?}"),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Initiation pipeline
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_initiate_small_gbp_payment_succeeds() {
        let service = service();
        let started = Utc::now();

        let payment = service
            .initiate(request("acc1", dec!(10.5), "GBP"))
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.amount.to_string(), "10.50");
        assert!(payment.created_at >= started);
        assert_eq!(service.store().len(), 1);
    }

    #[tokio::test]
    async fn test_initiate_assigns_distinct_ids() {
        let service = service();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(
                service
                    .initiate(request("acc1", dec!(1), "GBP"))
                    .await
                    .unwrap()
                    .id,
            );
        }
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[tokio::test]
    async fn test_amount_over_single_limit_is_rejected() {
        let service = service();
        for amount in [dec!(500.01), dec!(600), dec!(1999.99), dec!(2000)] {
            let result = service.initiate(request("acc1", amount, "GBP")).await;
            assert_rejected(result, PaymentRejection::LimitExceeded(LimitKind::Single));
        }
        assert_eq!(service.store().len(), 0);
    }

    #[tokio::test]
    async fn test_amount_over_daily_limit_is_rejected_first() {
        let service = service();
        for amount in [dec!(2000.01), dec!(20000), dec!(9999999.99)] {
            let result = service.initiate(request("acc1", amount, "USD")).await;
            assert_rejected(result, PaymentRejection::LimitExceeded(LimitKind::Daily));
        }
    }

    #[tokio::test]
    async fn test_amount_over_fraud_threshold_is_flagged() {
        let service = service_with(raised_limits(dec!(100000), dec!(100000)));

        // Funds would fail for this amount; fraud is checked before funds.
        let result = service.initiate(request("acc1", dec!(20000), "GBP")).await;
        assert_rejected(result, PaymentRejection::FraudFlagged);
    }

    #[tokio::test]
    async fn test_insufficient_balance_is_rejected() {
        let service = service_with(raised_limits(dec!(5000), dec!(50000)));

        let result = service.initiate(request("acc2", dec!(2000), "GBP")).await;
        assert_rejected(result, PaymentRejection::InsufficientFunds);
        assert_eq!(service.store().len(), 0);
    }

    #[tokio::test]
    async fn test_debtor_not_owned_by_customer_is_insufficient() {
        let service = service();

        // acc3 belongs to cust2, the request claims cust1.
        let result = service.initiate(request("acc3", dec!(10), "GBP")).await;
        assert_rejected(result, PaymentRejection::InsufficientFunds);
    }

    #[tokio::test]
    async fn test_non_scheme_currency_is_ineligible() {
        let service = service();

        let result = service.initiate(request("acc1", dec!(100), "USD")).await;
        assert_rejected(result, PaymentRejection::SchemeIneligible);
    }

    #[tokio::test]
    async fn test_scheme_ceiling_applies() {
        let policies = PolicySet::from_settings(&PolicySettings {
            scheme_max_amount: dec!(100),
            ..PolicySettings::default()
        })
        .unwrap();
        let service = service_with(policies);

        service.initiate(request("acc1", dec!(100), "GBP")).await.unwrap();
        let result = service.initiate(request("acc1", dec!(100.01), "GBP")).await;
        assert_rejected(result, PaymentRejection::SchemeIneligible);
    }

    #[tokio::test]
    async fn test_custom_fraud_screen_is_consulted() {
        struct BlockCreditor;

        impl initiation_types::FraudScreen for BlockCreditor {
            fn is_risky(&self, _amount: initiation_types::Amount, _debtor: &str, creditor: &str) -> bool {
                creditor == "acc3"
            }
        }

        let service = service_with(PolicySet::default().with_fraud_screen(Arc::new(BlockCreditor)));

        let result = service.initiate(request("acc1", dec!(1), "GBP")).await;
        assert_rejected(result, PaymentRejection::FraudFlagged);
    }

    #[tokio::test]
    async fn test_unreachable_oracle_fails_closed() {
        let service = PaymentService::new(
            MockStore::new(),
            FundsChecker::new(UnreachableOracle),
            PolicySet::default(),
        );

        let result = service.initiate(request("acc1", dec!(10.5), "GBP")).await;
        assert_rejected(result, PaymentRejection::InsufficientFunds);
        assert_eq!(service.store().len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_oracle_times_out_as_insufficient() {
        let service = PaymentService::new(
            MockStore::new(),
            FundsChecker::with_timeout(SlowOracle, Duration::from_millis(100)),
            PolicySet::default(),
        );

        let result = service.initiate(request("acc1", dec!(10.5), "GBP")).await;
        assert_rejected(result, PaymentRejection::InsufficientFunds);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Input validation
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_invalid_input_is_bad_request() {
        let service = service();

        let mut missing_customer = request("acc1", dec!(10), "GBP");
        missing_customer.debtor_account.customer_id = None;

        let mut blank_creditor = request("acc1", dec!(10), "GBP");
        blank_creditor.creditor_account.account_id = "  ".into();

        let cases = [
            request("acc1", dec!(0), "GBP"),
            request("acc1", dec!(-5), "GBP"),
            request("acc1", dec!(10.555), "GBP"),
            request("acc1", dec!(10), "gbp"),
            request("acc1", dec!(10), "GBPX"),
            request("", dec!(10), "GBP"),
            missing_customer,
            blank_creditor,
        ];

        for req in cases {
            let result = service.initiate(req).await;
            assert!(
                matches!(result, Err(AppError::BadRequest(_))),
                "expected BadRequest, got {result:?}"
            );
        }
        assert_eq!(service.store().len(), 0);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Daily running total
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_default_daily_source_ignores_prior_payments() {
        let service = service_with(raised_limits(dec!(500), dec!(1000)));

        for _ in 0..4 {
            service
                .initiate(request("acc1", dec!(400), "GBP"))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_store_daily_source_accumulates() {
        let service = service_with(raised_limits(dec!(500), dec!(1000)))
            .with_daily_totals(DailyTotalSource::Store);

        service.initiate(request("acc1", dec!(400), "GBP")).await.unwrap();
        service.initiate(request("acc1", dec!(400), "GBP")).await.unwrap();

        let result = service.initiate(request("acc1", dec!(400), "GBP")).await;
        assert_rejected(result, PaymentRejection::LimitExceeded(LimitKind::Daily));

        // Exactly up to the ceiling is still allowed.
        service.initiate(request("acc1", dec!(200), "GBP")).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_daily_source_skips_failed_payments() {
        let service = service_with(raised_limits(dec!(500), dec!(1000)))
            .with_daily_totals(DailyTotalSource::Store);

        let first = service.initiate(request("acc1", dec!(500), "GBP")).await.unwrap();
        service.initiate(request("acc1", dec!(500), "GBP")).await.unwrap();
        service.transition(first.id, PaymentStatus::Failed).await.unwrap();

        service.initiate(request("acc1", dec!(500), "GBP")).await.unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_initiations_respect_daily_limit() {
        let service = Arc::new(
            service_with(raised_limits(dec!(500), dec!(1000)))
                .with_daily_totals(DailyTotalSource::Store),
        );

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.initiate(request("acc1", dec!(400), "GBP")).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }

        assert_eq!(accepted, 2);
        assert_eq!(service.store().len(), 2);
        assert_eq!(service.open_debtor_gates(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_initiations_release_debtor_gates() {
        let service = PaymentService::new(
            MockStore::new(),
            FundsChecker::with_timeout(SlowOracle, Duration::from_secs(60)),
            PolicySet::default(),
        );

        for i in 0..50 {
            let debtor = format!("acc-{i}");
            let outcome = tokio::time::timeout(
                Duration::from_millis(100),
                service.initiate(request(&debtor, dec!(10), "GBP")),
            )
            .await;
            assert!(outcome.is_err());
        }

        assert_eq!(service.open_debtor_gates(), 0);
        assert_eq!(service.store().len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debtor_gate_outlives_cancelled_peer() {
        let service = Arc::new(PaymentService::new(
            MockStore::new(),
            FundsChecker::with_timeout(SlowOracle, Duration::from_secs(60)),
            PolicySet::default(),
        ));

        let holder = {
            let service = service.clone();
            tokio::spawn(async move { service.initiate(request("acc1", dec!(10), "GBP")).await })
        };
        tokio::task::yield_now().await;

        let waiter = tokio::time::timeout(
            Duration::from_millis(100),
            service.initiate(request("acc1", dec!(10), "GBP")),
        )
        .await;
        assert!(waiter.is_err());
        assert_eq!(service.open_debtor_gates(), 1);

        assert!(holder.await.unwrap().is_ok());
        assert_eq!(service.open_debtor_gates(), 0);
    }

    #[test]
    fn test_daily_total_source_parsing() {
        assert_eq!("none".parse::<DailyTotalSource>().unwrap(), DailyTotalSource::None);
        assert_eq!("Store".parse::<DailyTotalSource>().unwrap(), DailyTotalSource::Store);
        assert!("weekly".parse::<DailyTotalSource>().is_err());
    }

    #[test]
    fn test_start_of_day_is_utc_midnight() {
        let now = "2024-06-01T17:45:12.5Z".parse::<DateTime<Utc>>().unwrap();
        let midnight = "2024-06-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(start_of_day(now), midnight);
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let service = service();
        let result = service.get(PaymentId::new()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let service = service();
        for amount in [dec!(1), dec!(2), dec!(3)] {
            service.initiate(request("acc1", amount, "GBP")).await.unwrap();
        }

        let listed = service.list().await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Status transitions
    // ─────────────────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_execute_completes_pending_payment() {
        let service = service();
        let payment = service.initiate(request("acc1", dec!(10.5), "GBP")).await.unwrap();

        let executed = service.execute(payment.id).await.unwrap();
        assert_eq!(executed.status, PaymentStatus::Completed);

        let stored = service.get(payment.id).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn test_execute_unknown_is_not_found() {
        let service = service();
        let result = service.execute(PaymentId::new()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_terminal_states_refuse_transitions() {
        let service = service();
        let payment = service.initiate(request("acc1", dec!(10), "GBP")).await.unwrap();
        service.execute(payment.id).await.unwrap();

        for target in [
            PaymentStatus::Pending,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
        ] {
            let result = service.transition(payment.id, target).await;
            assert!(
                matches!(result, Err(AppError::InvalidTransition { from: PaymentStatus::Completed, .. })),
                "got {result:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_pending_cannot_target_pending() {
        let service = service();
        let payment = service.initiate(request("acc1", dec!(10), "GBP")).await.unwrap();

        let result = service.transition(payment.id, PaymentStatus::Pending).await;
        assert!(matches!(result, Err(AppError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_notify_without_status_only_acknowledges() {
        let service = service();
        let payment = service.initiate(request("acc1", dec!(10), "GBP")).await.unwrap();

        assert!(service.notify(payment.id, None).await.unwrap().is_none());
        let stored = service.get(payment.id).await.unwrap();
        assert_eq!(stored.status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_notify_with_status_transitions() {
        let service = service();
        let payment = service.initiate(request("acc1", dec!(10), "GBP")).await.unwrap();

        let updated = service
            .notify(payment.id, Some(PaymentStatus::Failed))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, PaymentStatus::Failed);
    }

    #[tokio::test]
    async fn test_lost_update_race_is_conflict() {
        let service = PaymentService::new(
            MockStore::racing(),
            FundsChecker::new(StaticOracle),
            PolicySet::default(),
        );
        let payment = service.initiate(request("acc1", dec!(10), "GBP")).await.unwrap();

        let result = service.execute(payment.id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
