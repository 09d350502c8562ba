use anyhow::{bail, Context, Result};
use chrono::Utc;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use linkbio::{
    checkout, export_file_name, icon_label, render, AppConfig, DowngradeOutcome, ExportFormat,
    LinkId, LinkPatch, PayerDetails, PaymentMethod, ProfileField,
    ProfileStore, SimulatedGateway, SqliteStore, VIP_FEATURES,
};

const USAGE: &str = "\
Usage: linkbio <command>

  show                                   Profile, plan and links
  add <label> <url> [icon]               Add a link
  remove <id>                            Remove a link
  promote <id>                           Move a link to the top
  edit <id> <label|url|icon> <value>     Change one field of a link
  set <name|bio|avatar> <value>          Change a profile field
  theme <id>                             default, vip, ocean, sunset, forest
  plans                                  List plans and payment methods
  quote <plan> [coupon]                  Price a plan
  upgrade <plan> <name> <email> <method> [coupon]
  downgrade --yes                        Switch back to free (keeps first 5 links)
  export <html|json> [path]              Write a static page or JSON export
  history                                Recent changes
  reset                                  Delete the saved profile";

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };

    let config = AppConfig::from_env();
    let db = SqliteStore::open(&config.database_path)?;

    match command.as_str() {
        "show" => show(&ProfileStore::load_or_seed(&db, &config.profile_key)?),
        "plans" => plans(&config)?,
        "quote" => quote(&config, &args[1..])?,
        "upgrade" => upgrade(&config, &db, &args[1..]).await?,
        "export" => export(&config, &db, &args[1..])?,
        "history" => history(&db)?,
        "reset" => {
            ProfileStore::delete(&db, &config.profile_key)?;
            println!("✓ Saved profile deleted");
        }
        _ => mutate(&config, &db, command, &args[1..])?,
    }

    Ok(())
}

fn init_logging() {
    let filter = env::var("LINKBIO_LOG")
        .ok()
        .and_then(|f| EnvFilter::try_new(f).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("missing <{}>\n\n{}", name, USAGE))
}

fn link_id(args: &[String], index: usize) -> Result<LinkId> {
    let raw = arg(args, index, "id")?;
    raw.parse()
        .with_context(|| format!("'{}' is not a link id", raw))
}

/// Load, apply one change, save, and append its events to the audit trail
fn mutate(config: &AppConfig, db: &SqliteStore, command: &str, args: &[String]) -> Result<()> {
    let mut store = ProfileStore::load_or_seed(db, &config.profile_key)?;

    match command {
        "add" => {
            let icon = args.get(2).map(String::as_str).unwrap_or(linkbio::model::DEFAULT_LINK_ICON);
            let id = store.add_link(arg(args, 0, "label")?, arg(args, 1, "url")?, icon)?;
            println!("✓ New link added (id {})", id);
        }
        "remove" => {
            let removed = store.remove_link(link_id(args, 0)?)?;
            println!("✓ Link removed: {}", removed.label);
        }
        "promote" => {
            store.promote_link(link_id(args, 0)?)?;
            println!("✓ Link moved to top");
        }
        "edit" => {
            let id = link_id(args, 0)?;
            let value = arg(args, 2, "value")?;
            let patch = match arg(args, 1, "field")? {
                "label" | "name" => LinkPatch::default().label(value),
                "url" => LinkPatch::default().target(value),
                "icon" => LinkPatch::default().icon(value),
                other => bail!("unknown link field '{}'", other),
            };
            store.update_link(id, patch)?;
            println!("✓ Link {} updated", id);
        }
        "set" => {
            let field: ProfileField = arg(args, 0, "field")?
                .parse()
                .map_err(anyhow::Error::msg)?;
            store.set_profile_field(field, arg(args, 1, "value")?);
            println!("✓ Profile {} updated", field.as_str());
        }
        "theme" => {
            store.set_theme(arg(args, 0, "theme")?);
            println!("✓ Theme set to {}", store.profile().theme);
        }
        "downgrade" => {
            let confirmed = args.iter().any(|a| a == "--yes");
            match store.downgrade(confirmed) {
                DowngradeOutcome::NoOp if !confirmed => {
                    println!("Switch to free plan? You will lose VIP features.");
                    println!("   Re-run with --yes to confirm.");
                }
                DowngradeOutcome::NoOp => println!("Already on the free plan"),
                DowngradeOutcome::Downgraded { removed } => {
                    println!("✓ Switched to free plan");
                    for link in removed {
                        println!("   removed: {} ({})", link.label, link.target);
                    }
                }
            }
        }
        other => bail!("unknown command '{}'\n\n{}", other, USAGE),
    }

    persist(&mut store, config, db)
}

fn persist(store: &mut ProfileStore, config: &AppConfig, db: &SqliteStore) -> Result<()> {
    store.save_to(db, &config.profile_key)?;
    db.append_events(&store.take_events())?;
    Ok(())
}

fn show(store: &ProfileStore) {
    let profile = store.profile();

    println!("👤 {}", profile.display_name);
    println!("   {}", profile.bio);
    println!("   avatar: {}", profile.avatar_ref);
    println!("   theme:  {}", profile.theme);

    match store.remaining_link_slots() {
        Some(0) => println!("   plan:   {} (link limit reached - upgrade for more links)", store.tier()),
        Some(n) => println!("   plan:   {} ({} link slots left)", store.tier(), n),
        None => println!("   plan:   {} (unlimited links)", store.tier()),
    }

    println!("\n🔗 Links");
    for (i, link) in store.links().iter().enumerate() {
        println!(
            "   {}. [{}] {} → {} ({})",
            i + 1,
            link.id,
            link.label,
            link.target,
            icon_label(&link.icon)
        );
    }
}

fn plans(config: &AppConfig) -> Result<()> {
    let engine = config.pricing_engine()?;

    println!("💳 Plans");
    for (id, plan) in engine.catalog() {
        println!(
            "   {:<10} {:<10} {:>12}  {}",
            id,
            plan.label,
            engine.format_amount(plan.price),
            plan.description
        );
    }

    println!("\n   Payment methods");
    for method in PaymentMethod::ALL {
        println!("   {:<8} {} ({})", method.id(), method.name(), method.description());
    }
    Ok(())
}

fn quote(config: &AppConfig, args: &[String]) -> Result<()> {
    let engine = config.pricing_engine()?;
    let coupon = args.get(1).map(String::as_str).unwrap_or("");
    let quote = engine.quote(arg(args, 0, "plan")?, coupon);

    println!("🧾 {} plan", quote.plan_label);
    println!("   subtotal: {}", engine.format_amount(quote.subtotal));
    if quote.coupon_applied {
        println!("   discount: -{}", engine.format_amount(quote.discount_amount.round() as u64));
    } else if !coupon.is_empty() {
        println!("   coupon '{}' not recognized", coupon);
    }
    println!("   tax:      {}", engine.format_amount(quote.tax_amount.round() as u64));
    println!("   total:    {}", engine.format_amount(quote.total));
    Ok(())
}

async fn upgrade(config: &AppConfig, db: &SqliteStore, args: &[String]) -> Result<()> {
    let engine = config.pricing_engine()?;
    let mut store = ProfileStore::load_or_seed(db, &config.profile_key)?;

    if store.tier().is_vip() {
        println!("VIP already active");
        return Ok(());
    }

    let plan = arg(args, 0, "plan")?;
    let details = PayerDetails {
        name: arg(args, 1, "name")?.to_string(),
        email: arg(args, 2, "email")?.to_string(),
        method: arg(args, 3, "method")?.to_string(),
    };
    let coupon = args.get(4).map(String::as_str).unwrap_or("");

    println!("⏳ Processing payment...");
    let gateway = SimulatedGateway::approving().with_delay(std::time::Duration::from_millis(500));
    let outcome = checkout(&mut store, &engine, &gateway, &details, plan, coupon).await?;

    persist(&mut store, config, db)?;

    println!("🎉 Payment successful! VIP activated.");
    println!("   transaction: {}", outcome.receipt.transaction_id);
    println!("   charged:     {}", engine.format_amount(outcome.receipt.amount));
    println!("\n   VIP features unlocked:");
    for feature in VIP_FEATURES {
        println!("   ✓ {}", feature);
    }
    Ok(())
}

fn export(config: &AppConfig, db: &SqliteStore, args: &[String]) -> Result<()> {
    let raw = arg(args, 0, "format")?;
    let format = ExportFormat::parse(raw).with_context(|| format!("unknown export format '{}'", raw))?;

    let store = ProfileStore::load_or_seed(db, &config.profile_key)?;
    let document = render(store.profile(), store.tier(), format, Utc::now())?;

    let path = args
        .get(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(export_file_name(store.profile(), format)));

    fs::write(&path, document).with_context(|| format!("Failed to write {:?}", path))?;
    println!("✓ Exported {} to {:?}", format.extension(), path);
    Ok(())
}

fn history(db: &SqliteStore) -> Result<()> {
    let events = db.recent_events(20)?;
    if events.is_empty() {
        println!("No changes recorded yet");
        return Ok(());
    }

    println!("📜 Recent changes");
    for event in events {
        println!(
            "   {}  {:<16} {}:{}",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.event_type,
            event.entity_type,
            event.entity_id
        );
    }
    Ok(())
}
