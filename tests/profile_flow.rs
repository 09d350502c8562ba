// End-to-end: edit a profile, pay for VIP, downgrade, persist to SQLite.

use linkbio::{
    checkout, render_json, DowngradeOutcome, LinkId, PayerDetails, PersistenceAdapter, PlanTier,
    PricingEngine, ProfileError, ProfileStore, SimulatedGateway, SqliteStore,
};

fn payer() -> PayerDetails {
    PayerDetails {
        name: "Alex Johnson".to_string(),
        email: "alex@example.com".to_string(),
        method: "credit".to_string(),
    }
}

#[tokio::test]
async fn test_free_to_vip_and_back() {
    let mut store = ProfileStore::new();
    let engine = PricingEngine::default();

    assert!(matches!(
        store.add_link("Shop", "https://shop.example", "fas fa-shopping-cart"),
        Err(ProfileError::LimitExceeded { limit: 5 })
    ));

    // Declined charge changes nothing
    let declined = checkout(
        &mut store,
        &engine,
        &SimulatedGateway::declining(),
        &payer(),
        "monthly",
        "",
    )
    .await;
    assert!(matches!(declined, Err(ProfileError::PaymentFailed(_))));
    assert_eq!(store.tier(), PlanTier::Free);

    checkout(&mut store, &engine, &SimulatedGateway::approving(), &payer(), "yearly", "welcome")
        .await
        .unwrap();
    assert_eq!(store.tier(), PlanTier::Vip);

    for label in ["Shop", "Podcast", "Newsletter"] {
        store.add_link(label, "https://example.com", "fas fa-globe").unwrap();
    }
    assert_eq!(store.links().len(), 8);

    let original: Vec<LinkId> = store.links().iter().map(|l| l.id).collect();

    match store.downgrade(true) {
        DowngradeOutcome::Downgraded { removed } => assert_eq!(removed.len(), 3),
        DowngradeOutcome::NoOp => panic!("downgrade should apply"),
    }

    let kept: Vec<LinkId> = store.links().iter().map(|l| l.id).collect();
    assert_eq!(kept, original[..5].to_vec());
    assert_eq!(store.tier(), PlanTier::Free);
}

#[test]
fn test_sqlite_round_trip_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("linkbio.db");

    let mut store = ProfileStore::new();
    store.upgrade();
    store.add_link("Shop", "https://shop.example", "fas fa-shopping-cart").unwrap();
    store.promote_link(LinkId(6)).unwrap();
    store.set_theme("sunset");

    {
        let db = SqliteStore::open(&path).unwrap();
        store.save_to(&db, "alex").unwrap();
        db.append_events(&store.take_events()).unwrap();
    }

    let db = SqliteStore::open(&path).unwrap();
    let loaded = ProfileStore::load_or_seed(&db, "alex").unwrap();

    assert_eq!(loaded.snapshot(), store.snapshot());
    assert_eq!(loaded.links()[0].label, "Shop");
    assert_eq!(loaded.tier(), PlanTier::Vip);

    let history = db.events_for_entity("link", "6").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].event_type, "link_promoted");

    // A corrupted row falls back to the seed instead of failing
    db.save("alex", "garbage").unwrap();
    let fallback = ProfileStore::load_or_seed(&db, "alex").unwrap();
    assert_eq!(fallback.snapshot(), ProfileStore::new().snapshot());
}

#[test]
fn test_json_export_of_restored_profile() {
    let mut store = ProfileStore::new();
    store.remove_link(LinkId(3)).unwrap();

    let restored = ProfileStore::restore(store.snapshot()).unwrap();
    let json = render_json(restored.profile(), restored.tier(), chrono::Utc::now()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["tier"], "free");
    assert_eq!(value["profile"]["links"].as_array().unwrap().len(), 4);
    assert!(value["exportTimestamp"].is_string());
}
