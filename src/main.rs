use anyhow::Context;
use clap::{Parser, Subcommand};

use mamifood::admin::{OrderFilter, StatusFilter};
use mamifood::announcements::active_announcements;
use mamifood::catalog::{categories, filter_menu, MenuFilter};
use mamifood::checkout::{CheckoutError, CustomerDetails};
use mamifood::format::{format_currency, format_timestamp};
use mamifood::id::EntityId;
use mamifood::state::AppState;
use mamifood::storefront::Storefront;
use mamifood::tracking::{progress, OrderRecord, OrderStatus, PhoneLookup};

#[derive(Parser)]
#[command(name = "mamifood")]
#[command(about = "Mami Food storefront client")]
#[command(
    after_help = "Environment:\n  API_BASE_URL       Backend origin (default http://localhost:5000)\n  MAMIFOOD_DATA_DIR  Where the cart and admin token are kept"
)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the menu
    Menu {
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Cart {
        #[command(subcommand)]
        command: CartCommand,
    },
    /// Place an order for the current cart
    Checkout {
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        promo: Option<String>,
    },
    /// Track an order by id and tracking code
    Track { order_id: String, code: String },
    /// Find orders placed with a phone number
    Lookup { phone: String },
    Announcements,
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand)]
enum CartCommand {
    Show {
        #[arg(long)]
        promo: Option<String>,
    },
    Add { id: String },
    Remove { id: String },
    Qty {
        id: String,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    Clear,
}

#[derive(Subcommand)]
enum AdminCommand {
    Login {
        email: String,
        #[arg(long, env = "MAMIFOOD_ADMIN_PASSWORD")]
        password: String,
    },
    Logout,
    Orders {
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long)]
        search: Option<String>,
    },
    SetStatus { id: String, status: OrderStatus },
    DeleteOrder { id: String },
    Menu {
        #[command(subcommand)]
        command: AdminMenuCommand,
    },
}

#[derive(Subcommand)]
enum AdminMenuCommand {
    List,
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "mamifood=warn,reqwest=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();
    let state = AppState::init().context("failed to initialise client")?;
    let mut shop = Storefront::new(state);

    let result = run(&mut shop, cli.command, cli.json).await;
    for note in shop.notifier().visible() {
        eprintln!("[{:?}] {}", note.severity, note.message);
    }
    result
}

async fn run(shop: &mut Storefront, command: Commands, json: bool) -> anyhow::Result<()> {
    let currency = shop.state().config.currency.clone();
    let money = |amount: f64| format_currency(amount, &currency);

    match command {
        Commands::Menu { category, search } => {
            shop.load_menu().await?;
            let filter = MenuFilter { category, search };
            let items = filter_menu(shop.menu(), &filter);
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
                return Ok(());
            }
            println!("Categories: {}", categories(shop.menu()).join(", "));
            for item in items {
                println!("{:>6}  {:<32} {}", item.id, item.name, money(item.price));
            }
        }
        Commands::Cart { command } => cart(shop, command, json, &money).await?,
        Commands::Checkout {
            name,
            phone,
            address,
            notes,
            promo,
        } => {
            if let Some(code) = promo {
                shop.apply_promo(&code)?;
            }
            shop.checkout_mut().set_form(CustomerDetails {
                name,
                phone,
                address,
                notes,
            });
            match shop.place_order().await {
                Ok(created) => {
                    println!("Order {} placed", created.order_id);
                    println!("Tracking code: {}", created.tracking_code);
                }
                Err(CheckoutError::Invalid(fields)) => {
                    for (field, message) in &fields {
                        eprintln!("{}: {message}", field.as_str());
                    }
                    anyhow::bail!("checkout form is invalid");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Commands::Track { order_id, code } => {
            let order = shop.track(&order_id, &code).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&order)?);
            } else {
                print_order(&order, &money);
            }
        }
        Commands::Lookup { phone } => match shop.lookup(&phone).await? {
            PhoneLookup::NoMatches => println!("No orders found"),
            PhoneLookup::Matches(orders) => {
                for order in &orders {
                    print_order(order, &money);
                    println!();
                }
            }
        },
        Commands::Announcements => {
            let shown = active_announcements(shop.state().api.as_ref()).await?;
            for a in shown {
                println!("* {}: {}", a.title, a.message);
            }
        }
        Commands::Admin { command } => admin(shop, command, json, &money).await?,
    }
    Ok(())
}

async fn cart(
    shop: &mut Storefront,
    command: CartCommand,
    json: bool,
    money: &dyn Fn(f64) -> String,
) -> anyhow::Result<()> {
    match command {
        CartCommand::Show { promo } => {
            if let Some(code) = promo {
                shop.apply_promo(&code)?;
            }
            let pricing = shop.checkout().pricing(shop.cart());
            if json {
                let body = serde_json::json!({ "items": shop.cart().lines(), "pricing": pricing });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }
            if shop.cart().is_empty() {
                println!("Your cart is empty");
                return Ok(());
            }
            for line in shop.cart().lines() {
                println!(
                    "{:>3} x {:<32} {}",
                    line.qty,
                    line.name,
                    money(line.line_total())
                );
            }
            println!("Subtotal:     {}", money(pricing.subtotal));
            println!("Delivery fee: {}", money(pricing.delivery_fee));
            if pricing.discount > 0.0 {
                println!("Discount:    -{}", money(pricing.discount));
            }
            println!("Total:        {}", money(pricing.total));
        }
        CartCommand::Add { id } => {
            shop.load_menu().await?;
            if shop.add_by_id(&EntityId::parse(&id)).is_none() {
                anyhow::bail!("no menu item with id {id}");
            }
        }
        CartCommand::Remove { id } => {
            shop.remove_item(&EntityId::parse(&id));
        }
        CartCommand::Qty { id, delta } => {
            let change = shop.change_qty(&EntityId::parse(&id), delta);
            println!("{change:?}");
        }
        CartCommand::Clear => shop.clear_cart(),
    }
    Ok(())
}

async fn admin(
    shop: &mut Storefront,
    command: AdminCommand,
    json: bool,
    money: &dyn Fn(f64) -> String,
) -> anyhow::Result<()> {
    match command {
        AdminCommand::Login { email, password } => shop.admin_login(&email, &password).await?,
        AdminCommand::Logout => shop.admin().logout(),
        AdminCommand::Orders { status, search } => {
            let board = shop.admin().load_orders().await?;
            let stats = board.stats();
            let rows = board.filtered(&OrderFilter { status, search });
            if json {
                let body = serde_json::json!({ "stats": stats, "orders": rows });
                println!("{}", serde_json::to_string_pretty(&body)?);
                return Ok(());
            }
            println!(
                "{} orders: {} pending, {} preparing, {} ready, {} delivered. Revenue {}",
                stats.total,
                stats.pending,
                stats.preparing,
                stats.ready,
                stats.delivered,
                money(stats.revenue)
            );
            for order in rows {
                let customer = order.customer.as_ref().map(|c| c.name.as_str()).unwrap_or("-");
                println!(
                    "{:>8}  {:<10} {:<20} {:>14}  {}",
                    order.id,
                    order.status,
                    customer,
                    money(order.total),
                    format_timestamp(order.created_at)
                );
            }
        }
        AdminCommand::SetStatus { id, status } => {
            let mut board = shop.admin().load_orders().await?;
            shop.set_order_status(&mut board, &EntityId::parse(&id), status)
                .await?;
        }
        AdminCommand::DeleteOrder { id } => {
            let mut board = shop.admin().load_orders().await?;
            shop.delete_order(&mut board, &EntityId::parse(&id)).await?;
        }
        AdminCommand::Menu { command } => match command {
            AdminMenuCommand::List => {
                for item in shop.admin().menu_items().await? {
                    println!("{:>6}  {:<32} {}", item.id, item.name, money(item.price));
                }
            }
            AdminMenuCommand::Delete { id } => {
                shop.admin().delete_menu_item(&EntityId::parse(&id)).await?;
            }
        },
    }
    Ok(())
}

fn print_order(order: &OrderRecord, money: &dyn Fn(f64) -> String) {
    println!("Order {} ({})", order.id, order.status.label());
    for stage in progress(order.status) {
        let mark = match (stage.current, stage.reached) {
            (true, _) => ">",
            (false, true) => "x",
            (false, false) => " ",
        };
        println!("  [{mark}] {}", stage.status.label());
    }
    for line in &order.items {
        println!("  {} x {}  {}", line.qty, line.name, money(line.line_total()));
    }
    println!("  Total: {}", money(order.total));
    println!("  Last updated {}", format_timestamp(order.updated_at));
}
