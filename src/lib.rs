// Link-in-bio profile builder - Core Library
// Profile/link state with plan-gated limits, pricing, checkout and export.
// Used by the CLI and by tests.

pub mod config;
pub mod error;
pub mod export;
pub mod gate;
pub mod model;
pub mod payment;
pub mod persistence;
pub mod pricing;
pub mod store;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{ProfileError, ProfileResult};
pub use export::{export_file_name, render, render_html, render_json, ExportFormat};
pub use gate::{PlanEvent, PlanGate, Transition, FREE_LINK_LIMIT};
pub use model::{
    icon_label, Link, LinkId, LinkPatch, PlanState, PlanTier, Profile, ProfileField, Theme,
    ICON_CHOICES, VIP_FEATURES,
};
pub use payment::{
    checkout, ChargeReceipt, ChargeRequest, CheckoutOutcome, PayerDetails, PaymentGateway,
    PaymentMethod, SimulatedGateway,
};
pub use persistence::{
    decode_snapshot, encode_snapshot, Event, MemoryStore, PersistenceAdapter, SqliteStore,
};
pub use pricing::{PlanDefinition, PricingConfig, PricingEngine, PricingQuote};
pub use store::{DowngradeOutcome, ProfileStore, Snapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
