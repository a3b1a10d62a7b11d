//! `dine` - terminal ordering for one table
//!
//! ```text
//! dine <token>                                   menu and order history
//! dine <token> order <kind>:<id>[x<qty>][@request] ...
//! ```
//!
//! `kind` is `menu` or `inventory`, e.g. `menu:3x2@no onions inventory:9`.

use anyhow::{Context, bail};
use dine_client::history::{compute_order_total, order_lines};
use dine_client::logger::init_logger;
use dine_client::{Catalog, ClientConfig, DineClient, ItemRef, normalize_token};
use std::path::PathBuf;

const USAGE: &str = "usage: dine <token> [order <kind>:<id>[x<qty>][@request] ...]";

#[derive(Debug, PartialEq)]
struct OrderItem {
    item: ItemRef,
    quantity: usize,
    request: Option<String>,
}

#[derive(Debug, PartialEq)]
enum Command {
    Browse,
    Order(Vec<OrderItem>),
}

fn parse_item(arg: &str) -> anyhow::Result<OrderItem> {
    let (head, request) = match arg.split_once('@') {
        Some((head, request)) => (head, Some(request.trim().to_string())),
        None => (arg, None),
    };
    let (kind, rest) = head
        .split_once(':')
        .with_context(|| format!("missing kind in '{}'", arg))?;
    let (id, quantity) = match rest.split_once('x') {
        Some((id, qty)) => (id, qty.parse().with_context(|| format!("bad quantity in '{}'", arg))?),
        None => (rest, 1),
    };
    let id: i64 = id.parse().with_context(|| format!("bad id in '{}'", arg))?;
    let item = match kind {
        "menu" | "m" => ItemRef::Menu(id),
        "inventory" | "inv" | "i" => ItemRef::Inventory(id),
        other => bail!("unknown item kind '{}'", other),
    };
    Ok(OrderItem {
        item,
        quantity,
        request: request.filter(|r| !r.is_empty()),
    })
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    match args.split_first() {
        None => Ok(Command::Browse),
        Some((cmd, items)) if cmd == "order" => {
            if items.is_empty() {
                bail!(USAGE);
            }
            let items = items
                .iter()
                .map(|a| parse_item(a))
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(Command::Order(items))
        }
        Some((cmd, _)) => bail!("unknown command '{}'\n{}", cmd, USAGE),
    }
}

fn print_catalog(catalog: &Catalog) {
    for group in catalog.menu_by_category() {
        let title = group
            .category
            .as_ref()
            .map(|c| c.name.as_str())
            .unwrap_or("Other");
        println!("== {} ==", title);
        for item in &group.items {
            println!("  menu:{:<6} {:<30} {:>8.2}", item.id, item.name, item.price);
        }
    }
    if !catalog.inventory_items().is_empty() {
        println!("== Drinks & extras ==");
        for item in catalog.inventory_items() {
            println!(
                "  inventory:{:<3} {:<30} {:>8.2}  ({} left)",
                item.id, item.name, item.unit_cost, item.stock
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let level = std::env::var("DINE_LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_dir = std::env::var("DINE_LOG_DIR").ok().map(PathBuf::from);
    init_logger(&level, log_dir.as_deref())?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((token, rest)) = args.split_first() else {
        bail!(USAGE);
    };
    let command = parse_command(rest)?;

    let client = DineClient::connect(ClientConfig::from_env())?;
    let ctx = client.open_session(&normalize_token(token));

    let table_id = match client.resolve_table(&ctx, token).await {
        Ok(id) => id,
        Err(e) => {
            println!("{}", e.user_message());
            return Ok(());
        }
    };
    println!("Table {}", table_id);

    let (catalog, catalog_error) = client.load_catalog(&ctx).await;
    if let Some(e) = catalog_error {
        println!("{}", e.user_message());
    }

    match command {
        Command::Browse => {
            print_catalog(&catalog);

            let history = client.load_orders(&ctx, token).await?;
            if let Some(e) = &history.error {
                println!("{}", e.user_message());
            }
            for order in &history.orders {
                println!(
                    "Order #{} [{:?}] {:.2}",
                    order.id,
                    order.status,
                    compute_order_total(order)
                );
                for line in order_lines(order, &catalog) {
                    match &line.request {
                        Some(r) => println!("  {} ({})", line.name, r),
                        None => println!("  {}", line.name),
                    }
                }
            }
            println!("Total for this table: {:.2}", history.grand_total());
        }
        Command::Order(items) => {
            for item in items {
                if let Err(e) = client.add_to_cart(&ctx, item.item, item.quantity, item.request) {
                    println!("{}", e.user_message());
                    return Ok(());
                }
            }
            match client.submit_order(&ctx, token).await {
                Ok(order) => {
                    let b = client.breakdown(order.total_amount);
                    println!("Order #{} sent", order.id);
                    println!("Subtotal {:>10.2}", b.subtotal);
                    println!("VAT {:>3}%  {:>10.2}", b.vat_percentage, b.vat);
                    println!("Total    {:>10.2}", b.total);
                }
                Err(e) => println!("{}", e.user_message()),
            }
        }
    }

    Ok(())
}
