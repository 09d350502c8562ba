// 💳 Payment - gateway contract and the upgrade checkout flow
//
// quote → validate request → charge (awaits) → upgrade on success.
// A declined or invalid charge leaves the store exactly as it was.

use crate::error::{ProfileError, ProfileResult};
use crate::pricing::{PricingEngine, PricingQuote};
use crate::store::ProfileStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

// ============================================================================
// PAYMENT METHOD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Credit,
    EWallet,
    Bank,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Credit, PaymentMethod::EWallet, PaymentMethod::Bank];

    pub fn id(&self) -> &'static str {
        match self {
            PaymentMethod::Credit => "credit",
            PaymentMethod::EWallet => "ewallet",
            PaymentMethod::Bank => "bank",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaymentMethod::Credit => "Credit/Debit Card",
            PaymentMethod::EWallet => "E-Wallet",
            PaymentMethod::Bank => "Bank Transfer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PaymentMethod::Credit => "Visa, Mastercard, JCB",
            PaymentMethod::EWallet => "GoPay, OVO, Dana",
            PaymentMethod::Bank => "BCA, Mandiri, BRI",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProfileError::payment_failed("Please select a payment method"))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// REQUEST / RECEIPT
// ============================================================================

/// What the payer typed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayerDetails {
    pub name: String,
    pub email: String,
    /// Raw method id; checked against the known methods
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeRequest {
    pub payer_name: String,
    pub payer_email: String,
    pub method: PaymentMethod,
    pub plan_label: String,
    /// Always the total of the quote it was built from
    pub amount: u64,
    pub coupon_code: Option<String>,
}

impl ChargeRequest {
    /// Validate payer details and bind them to a quote
    pub fn from_quote(
        details: &PayerDetails,
        quote: &PricingQuote,
        coupon_code: &str,
    ) -> ProfileResult<Self> {
        let name = details.name.trim();
        let email = details.email.trim();

        if name.is_empty() || email.is_empty() {
            return Err(ProfileError::payment_failed("Please fill in all fields"));
        }
        if !is_valid_email(email) {
            return Err(ProfileError::payment_failed(
                "Please enter a valid email address",
            ));
        }
        let method: PaymentMethod = details.method.parse()?;

        Ok(ChargeRequest {
            payer_name: name.to_string(),
            payer_email: email.to_string(),
            method,
            plan_label: quote.plan_label.clone(),
            amount: quote.total,
            coupon_code: (!coupon_code.is_empty()).then(|| coupon_code.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeReceipt {
    pub transaction_id: String,
    pub amount: u64,
    pub timestamp: DateTime<Utc>,
}

/// local@domain.tld, no whitespace
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

// ============================================================================
// GATEWAY CONTRACT
// ============================================================================

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Resolves to a receipt, or `Err(reason)` when declined
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, String>;
}

/// Deterministic gateway for demos and tests: always approves or always declines.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    approve: bool,
    delay: Duration,
}

impl SimulatedGateway {
    pub fn approving() -> Self {
        SimulatedGateway {
            approve: true,
            delay: Duration::ZERO,
        }
    }

    pub fn declining() -> Self {
        SimulatedGateway {
            approve: false,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if !self.approve {
            return Err(
                "Payment failed. Please try again or use a different payment method.".to_string(),
            );
        }

        let now = Utc::now();
        Ok(ChargeReceipt {
            transaction_id: format!("TXN{}", now.timestamp_millis()),
            amount: request.amount,
            timestamp: now,
        })
    }
}

// ============================================================================
// CHECKOUT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutOutcome {
    pub quote: PricingQuote,
    pub receipt: ChargeReceipt,
}

/// Price, charge and upgrade. Holding `&mut store` across the await keeps
/// a second charge for the same store from starting meanwhile. A store that
/// is already VIP is rejected before the gateway is called.
pub async fn checkout(
    store: &mut ProfileStore,
    engine: &PricingEngine,
    gateway: &dyn PaymentGateway,
    details: &PayerDetails,
    plan_id: &str,
    coupon_code: &str,
) -> ProfileResult<CheckoutOutcome> {
    if store.tier().is_vip() {
        warn!(plan = plan_id, "checkout on a VIP profile refused");
        return Err(ProfileError::payment_failed("VIP already active"));
    }

    let quote = engine.quote(plan_id, coupon_code);
    let request = ChargeRequest::from_quote(details, &quote, coupon_code)?;

    info!(
        plan = %quote.plan_id,
        amount = request.amount,
        method = request.method.id(),
        "submitting charge"
    );

    let receipt = match gateway.charge(&request).await {
        Ok(receipt) => receipt,
        Err(reason) => {
            warn!(plan = %quote.plan_id, %reason, "charge declined");
            return Err(ProfileError::PaymentFailed(reason));
        }
    };

    if receipt.amount != request.amount {
        warn!(
            expected = request.amount,
            charged = receipt.amount,
            "gateway charged a different amount"
        );
        return Err(ProfileError::payment_failed(
            "Charged amount does not match the quoted total",
        ));
    }

    store.upgrade();
    info!(transaction_id = %receipt.transaction_id, "charge approved, vip active");

    Ok(CheckoutOutcome { quote, receipt })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PlanTier;

    fn payer(method: &str) -> PayerDetails {
        PayerDetails {
            name: "Alex Johnson".to_string(),
            email: "alex@example.com".to_string(),
            method: method.to_string(),
        }
    }

    /// Charges a fixed amount no matter what was asked
    struct SkimmingGateway;

    #[async_trait]
    impl PaymentGateway for SkimmingGateway {
        async fn charge(&self, request: &ChargeRequest) -> Result<ChargeReceipt, String> {
            Ok(ChargeReceipt {
                transaction_id: "TXN1".to_string(),
                amount: request.amount + 1,
                timestamp: Utc::now(),
            })
        }
    }

    /// Fails the test if a charge is ever submitted
    struct RefusingGateway;

    #[async_trait]
    impl PaymentGateway for RefusingGateway {
        async fn charge(&self, _request: &ChargeRequest) -> Result<ChargeReceipt, String> {
            panic!("gateway must not be charged");
        }
    }

    #[tokio::test]
    async fn test_checkout_on_vip_does_not_charge() {
        let mut store = ProfileStore::new();
        store.upgrade();
        store.take_events();
        let before = store.snapshot();

        let result = checkout(
            &mut store,
            &PricingEngine::default(),
            &RefusingGateway,
            &payer("credit"),
            "monthly",
            "",
        )
        .await;

        assert_eq!(result, Err(ProfileError::payment_failed("VIP already active")));
        assert_eq!(store.snapshot(), before);
        assert!(store.pending_events().is_empty());
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("alex@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.co"));
        assert!(!is_valid_email("alex@example"));
        assert!(!is_valid_email("alex example@x.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alex@@example.com"));
        assert!(!is_valid_email("alex@.com"));
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("credit".parse::<PaymentMethod>(), Ok(PaymentMethod::Credit));
        assert_eq!("EWALLET".parse::<PaymentMethod>(), Ok(PaymentMethod::EWallet));
        assert!("paypal".parse::<PaymentMethod>().is_err());
        assert_eq!(PaymentMethod::Bank.to_string(), "Bank Transfer");
    }

    #[test]
    fn test_request_amount_comes_from_quote() {
        let engine = PricingEngine::default();
        let quote = engine.quote("quarterly", "vip30");
        let request = ChargeRequest::from_quote(&payer("bank"), &quote, "vip30").unwrap();

        assert_eq!(request.amount, quote.total);
        assert_eq!(request.plan_label, "Quarterly");
        assert_eq!(request.coupon_code.as_deref(), Some("vip30"));
    }

    #[test]
    fn test_request_validation_messages() {
        let quote = PricingEngine::default().quote("monthly", "");

        let mut details = payer("credit");
        details.name = "   ".to_string();
        assert_eq!(
            ChargeRequest::from_quote(&details, &quote, ""),
            Err(ProfileError::payment_failed("Please fill in all fields"))
        );

        let mut details = payer("credit");
        details.email = "nope".to_string();
        assert_eq!(
            ChargeRequest::from_quote(&details, &quote, ""),
            Err(ProfileError::payment_failed("Please enter a valid email address"))
        );

        assert_eq!(
            ChargeRequest::from_quote(&payer(""), &quote, ""),
            Err(ProfileError::payment_failed("Please select a payment method"))
        );
    }

    #[tokio::test]
    async fn test_checkout_success_upgrades() {
        let mut store = ProfileStore::new();
        let engine = PricingEngine::default();
        let gateway = SimulatedGateway::approving();

        let outcome = checkout(&mut store, &engine, &gateway, &payer("credit"), "monthly", "VIP50")
            .await
            .unwrap();

        assert_eq!(store.tier(), PlanTier::Vip);
        assert_eq!(outcome.receipt.amount, engine.quote("monthly", "VIP50").total);
        assert!(outcome.receipt.transaction_id.starts_with("TXN"));
        assert!(store.can_add_link());
    }

    #[tokio::test]
    async fn test_checkout_decline_leaves_state_unchanged() {
        let mut store = ProfileStore::new();
        let before = store.snapshot();
        let engine = PricingEngine::default();

        let result = checkout(
            &mut store,
            &engine,
            &SimulatedGateway::declining(),
            &payer("ewallet"),
            "yearly",
            "",
        )
        .await;

        assert!(matches!(result, Err(ProfileError::PaymentFailed(_))));
        assert_eq!(store.snapshot(), before);
        assert!(store.pending_events().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_rejects_invalid_request_before_charging() {
        let mut store = ProfileStore::new();
        let mut details = payer("credit");
        details.email.clear();

        let result = checkout(
            &mut store,
            &PricingEngine::default(),
            &SimulatedGateway::approving(),
            &details,
            "monthly",
            "",
        )
        .await;

        assert!(matches!(result, Err(ProfileError::PaymentFailed(_))));
        assert_eq!(store.tier(), PlanTier::Free);
    }

    #[tokio::test]
    async fn test_checkout_rejects_amount_mismatch() {
        let mut store = ProfileStore::new();

        let result = checkout(
            &mut store,
            &PricingEngine::default(),
            &SkimmingGateway,
            &payer("credit"),
            "monthly",
            "",
        )
        .await;

        assert!(matches!(result, Err(ProfileError::PaymentFailed(_))));
        assert_eq!(store.tier(), PlanTier::Free);
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_delay() {
        let gateway = SimulatedGateway::approving().with_delay(Duration::from_secs(2));
        let quote = PricingEngine::default().quote("monthly", "");
        let request = ChargeRequest::from_quote(&payer("credit"), &quote, "").unwrap();

        let started = tokio::time::Instant::now();
        let receipt = gateway.charge(&request).await.unwrap();

        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(receipt.amount, quote.total);
    }
}
