use clap::{Parser, Subcommand};
use tracing::info;

use procure_client::config::RuntimeConfig;
use procure_client::domain::order::{DraftItem, OrderDraft};
use procure_client::domain::Address;
use procure_client::logging;
use procure_client::services::{CoreContext, Services};

#[derive(Parser)]
#[command(name = "procure_client")]
#[command(about = "Developer tooling for the procurement client runtime")]
#[command(version = "0.1.0")]
struct Cli {
    /// State directory for the offline runtime
    #[arg(long, default_value = ".procure-state")]
    state_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive a scripted end-to-end flow against the offline runtime
    Smoke,
    /// Print the current offline snapshot
    State,
    /// Clear the offline snapshot and the stored token
    Reset,
}

fn demo_address() -> Address {
    Address {
        id: None,
        contact_name: "Receiving Dept".to_string(),
        phone: "13800000000".to_string(),
        province: "Zhejiang".to_string(),
        city: "Hangzhou".to_string(),
        district: "Binjiang".to_string(),
        detail: "88 Factory Rd, Gate 3".to_string(),
        is_default: true,
    }
}

async fn run_smoke(services: &Services) -> anyhow::Result<()> {
    info!("starting offline smoke flow");

    let session = services.auth.login().await?;
    println!("🔑 Session: {}", session.token);

    let detail = services.catalog.get_product_detail("spu-1001").await?;
    println!("📦 Product: {} ({} SKUs)", detail.name, detail.skus.len());

    let first_sku = detail.skus[0].id.clone();
    services.cart.add_item(&first_sku, 2).await?;
    let cart = services.cart.add_item(&first_sku, 3).await?;
    println!(
        "🛒 Cart: {} line(s), total {} fen",
        cart.lines.len(),
        cart.total_fen
    );

    let order = services
        .orders
        .submit(OrderDraft {
            items: vec![DraftItem { sku_id: first_sku, qty: 5 }],
            address: demo_address(),
            remark: Some("smoke run".to_string()),
        })
        .await?;
    println!("🧾 Order {} submitted, total {} fen", order.id, order.total_fen());

    let tracking = services.tracking.get_tracking(&order.id).await?;
    println!("🚚 Tracking events: {}", tracking.events.len());

    let ticket = services
        .after_sales
        .create_ticket(&order.id, "one carton arrived dented")
        .await?;
    services
        .after_sales
        .post_message(&ticket.id, "photos attached, please advise")
        .await?;
    println!("🎫 Ticket {} opened", ticket.id);

    let cart_after = services.cart.get_cart().await?;
    println!("🛒 Cart after order: {} line(s)", cart_after.lines.len());

    println!("✅ Smoke flow completed");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();

    // This binary is offline tooling: honor config.toml when present, but
    // always pin the runtime to isolated mock mode.
    let mut config = RuntimeConfig::load()
        .unwrap_or_else(|_| RuntimeConfig::offline(cli.state_dir.clone().into()));
    config.isolated_mock = true;
    config.state_dir = cli.state_dir.clone().into();

    let context = CoreContext::new(config, None);
    let services = Services::new(context);

    match cli.command {
        Commands::Smoke => {
            run_smoke(&services).await?;
        }
        Commands::State => {
            let state = services.context().mock.load().await;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Commands::Reset => {
            services.reset_offline_state().await;
            println!("✅ Offline state cleared");
        }
    }

    Ok(())
}
