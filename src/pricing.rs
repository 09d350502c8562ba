// 💰 Pricing Engine - Plans, coupons and tax as data
// (plan, coupon) → subtotal, discount, tax, total
//
// Amounts are in the smallest currency unit. Discount and tax are kept
// unrounded; only the final total is rounded, once.

use anyhow::{bail, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDefinition {
    /// Display label ("Monthly")
    pub label: String,

    /// Flat plan price. Multi-period discounts are already folded in.
    pub price: u64,

    /// Short billing note ("per month")
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyFormat {
    pub code: String,
    pub symbol: String,
    pub thousands_separator: char,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            code: "IDR".to_string(),
            symbol: "Rp".to_string(),
            thousands_separator: '.',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub currency: CurrencyFormat,

    pub plans: BTreeMap<String, PlanDefinition>,

    /// code → discount fraction in (0, 1]
    pub coupons: BTreeMap<String, f64>,

    pub tax_rate: f64,

    /// Used when a quote asks for an unknown plan
    pub default_plan: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        let mut plans = BTreeMap::new();
        plans.insert(
            "monthly".to_string(),
            PlanDefinition {
                label: "Monthly".to_string(),
                price: 49_999,
                description: "per month".to_string(),
            },
        );
        plans.insert(
            "quarterly".to_string(),
            PlanDefinition {
                label: "Quarterly".to_string(),
                price: 134_997,
                description: "every 3 months (save 10%)".to_string(),
            },
        );
        plans.insert(
            "yearly".to_string(),
            PlanDefinition {
                label: "Yearly".to_string(),
                price: 479_992,
                description: "per year (save 20%)".to_string(),
            },
        );

        let mut coupons = BTreeMap::new();
        coupons.insert("VIP50".to_string(), 0.5);
        coupons.insert("VIP30".to_string(), 0.3);
        coupons.insert("WELCOME".to_string(), 0.2);

        PricingConfig {
            currency: CurrencyFormat::default(),
            plans,
            coupons,
            tax_rate: 0.10,
            default_plan: "monthly".to_string(),
        }
    }
}

impl PricingConfig {
    /// Load pricing from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read pricing file: {:?}", path.as_ref()))?;

        let config: PricingConfig =
            serde_json::from_str(&content).context("Failed to parse pricing JSON")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.plans.is_empty() {
            bail!("pricing catalog has no plans");
        }
        if !self.plans.contains_key(&self.default_plan) {
            bail!("default plan '{}' is not in the catalog", self.default_plan);
        }
        if !(self.tax_rate >= 0.0 && self.tax_rate.is_finite()) {
            bail!("tax rate must be a non-negative number, got {}", self.tax_rate);
        }
        let mut seen = HashSet::new();
        for (code, fraction) in &self.coupons {
            if code.trim().is_empty() {
                bail!("coupon code must not be empty");
            }
            if !seen.insert(code.to_uppercase()) {
                bail!("coupon {} is defined twice (codes are case-insensitive)", code);
            }
            if !(*fraction > 0.0 && *fraction <= 1.0) {
                bail!("coupon {} has fraction {} outside (0, 1]", code, fraction);
            }
        }
        Ok(())
    }
}

// ============================================================================
// QUOTE
// ============================================================================

/// Transient result of pricing a plan. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingQuote {
    pub plan_id: String,
    pub plan_label: String,
    pub subtotal: u64,
    pub discount_amount: f64,
    pub tax_amount: f64,
    pub total: u64,
    pub coupon_applied: bool,
}

// ============================================================================
// ENGINE
// ============================================================================

#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
    /// Coupon table keyed by upper-cased code
    coupons: BTreeMap<String, f64>,
    default_plan: (String, PlanDefinition),
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Result<Self> {
        config.validate()?;

        let coupons = config
            .coupons
            .iter()
            .map(|(code, fraction)| (code.to_uppercase(), *fraction))
            .collect();

        let default_plan = config
            .plans
            .get_key_value(&config.default_plan)
            .map(|(id, plan)| (id.clone(), plan.clone()))
            .with_context(|| format!("default plan '{}' missing", config.default_plan))?;

        Ok(PricingEngine {
            config,
            coupons,
            default_plan,
        })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Discount fraction for a code, case-insensitive. Empty or unknown → None.
    pub fn coupon_fraction(&self, code: &str) -> Option<f64> {
        if code.is_empty() {
            return None;
        }
        self.coupons.get(&code.to_uppercase()).copied()
    }

    /// Price a plan with an optional coupon. Unknown plans fall back to the default plan.
    pub fn quote(&self, plan_id: &str, coupon_code: &str) -> PricingQuote {
        let (plan_id, plan) = match self.config.plans.get_key_value(plan_id) {
            Some((id, plan)) => (id.as_str(), plan),
            None => (self.default_plan.0.as_str(), &self.default_plan.1),
        };

        let subtotal = plan.price;
        let fraction = self.coupon_fraction(coupon_code);

        // Discount first, then tax on what remains
        let discount_amount = subtotal as f64 * fraction.unwrap_or(0.0);
        let taxable = subtotal as f64 - discount_amount;
        let tax_amount = taxable * self.config.tax_rate;
        let total = (taxable + tax_amount).round().max(0.0) as u64;

        PricingQuote {
            plan_id: plan_id.to_string(),
            plan_label: plan.label.clone(),
            subtotal,
            discount_amount,
            tax_amount,
            total,
            coupon_applied: fraction.is_some(),
        }
    }

    /// Plans ordered by price, for display
    pub fn catalog(&self) -> Vec<(&str, &PlanDefinition)> {
        let mut plans: Vec<_> = self
            .config
            .plans
            .iter()
            .map(|(id, plan)| (id.as_str(), plan))
            .collect();
        plans.sort_by_key(|(_, plan)| plan.price);
        plans
    }

    pub fn format_amount(&self, amount: u64) -> String {
        format_currency(amount, &self.config.currency)
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        let config = PricingConfig::default();
        let default_plan = (
            config.default_plan.clone(),
            config.plans[&config.default_plan].clone(),
        );
        let coupons = config.coupons.clone();
        PricingEngine {
            config,
            coupons,
            default_plan,
        }
    }
}

/// "Rp 54.999" style formatting, no fraction digits
pub fn format_currency(amount: u64, currency: &CurrencyFormat) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(currency.thousands_separator);
        }
        grouped.push(ch);
    }

    format!("{} {}", currency.symbol, grouped)
}

// ============================================================================
// TESTS
// ============================================================================
