//! Client-side command handlers: browse, cart, sign-in, checkout.
//!
//! Cart mutations are purely local and never build an HTTP client; anything
//! priced or session-bound goes through [`ClientFlow`] so the CLI behaves
//! exactly like the interactive surface.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use reqwest::cookie::Jar;

use blc_cart::{CartStore, QuantityChange};
use blc_config::Config;
use blc_dashboard::{ClientFlow, FlowError};
use blc_lifecycle::{change_due, format_brl, parse_brl_cents, PaymentMethod};

use super::{clear_session, exit_refused, print_order, print_product, save_session, session_client};

fn open_flow(cfg: &Config) -> Result<(ClientFlow, Arc<Jar>)> {
    let (client, jar) = session_client(cfg)?;
    let flow = ClientFlow::open(client, &cfg.data_dir)?;
    Ok((flow, jar))
}

/// Like [`exit_refused`], unwrapping the flow's wrapper first.
fn exit_refused_flow(err: FlowError) -> anyhow::Error {
    match err {
        FlowError::Api(api) => exit_refused(api),
        other => other.into(),
    }
}

// ---------------------------------------------------------------------------
// Browsing
// ---------------------------------------------------------------------------

pub async fn menu(cfg: &Config) -> Result<()> {
    let (flow, _jar) = open_flow(cfg)?;
    let menu = flow.menu().await?;
    for product in &menu {
        print_product(product);
    }
    println!("menu_len={}", menu.len());
    Ok(())
}

pub async fn cart_show(cfg: &Config) -> Result<()> {
    let (flow, _jar) = open_flow(cfg)?;
    let (lines, total) = flow.cart_view().await?;
    for line in &lines {
        println!(
            "item={} qty={} unit={} line_total={} name={}",
            line.product_id,
            line.quantity,
            format_brl(line.unit_price),
            format_brl(line.line_total),
            line.name,
        );
    }
    println!("count={} total={}", flow.cart().count(), format_brl(total));
    Ok(())
}

// ---------------------------------------------------------------------------
// Cart mutations (local only)
// ---------------------------------------------------------------------------

pub fn cart_add(cfg: &Config, product_id: &str) -> Result<()> {
    let mut store = CartStore::open(&cfg.data_dir)?;
    store.add(product_id)?;
    println!("cart_count={}", store.count());
    Ok(())
}

pub fn cart_remove(cfg: &Config, product_id: &str) -> Result<()> {
    let mut store = CartStore::open(&cfg.data_dir)?;
    store.remove(product_id)?;
    println!("cart_count={}", store.count());
    Ok(())
}

pub fn cart_step(cfg: &Config, product_id: &str, change: QuantityChange) -> Result<()> {
    let mut store = CartStore::open(&cfg.data_dir)?;
    store.update_quantity(product_id, change)?;
    println!("cart_count={}", store.count());
    Ok(())
}

pub fn cart_clear(cfg: &Config) -> Result<()> {
    let mut store = CartStore::open(&cfg.data_dir)?;
    store.clear()?;
    println!("cart_count=0");
    Ok(())
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub async fn login(cfg: &Config, name: &str, phone: &str) -> Result<()> {
    let (client, jar) = session_client(cfg)?;
    let mut flow = ClientFlow::open(client, &cfg.data_dir)?;
    let user = flow.login(name, phone).await?;
    save_session(cfg, &jar)?;
    println!(
        "logged_in=true user={} phone={} next={} name={}",
        user.id,
        user.phone.as_deref().unwrap_or(""),
        flow.resume().path(),
        user.name,
    );
    Ok(())
}

pub async fn profile(cfg: &Config, name: Option<&str>, phone: Option<&str>) -> Result<()> {
    let (flow, _jar) = open_flow(cfg)?;
    let user = match (name, phone) {
        (Some(name), Some(phone)) => flow.update_profile(name, phone).await?,
        (None, None) => flow.profile().await?,
        _ => bail!("profile updates need both --name and --phone"),
    };
    super::print_user(&user);
    Ok(())
}

pub async fn logout(cfg: &Config) -> Result<()> {
    let (client, _jar) = session_client(cfg)?;
    let mut flow = ClientFlow::open(client, &cfg.data_dir)?;
    let next = flow.logout().await?;
    clear_session(cfg);
    println!("logged_out=true next={}", next.path());
    Ok(())
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

pub async fn checkout(cfg: &Config, payment: &str, change_for: Option<&str>) -> Result<()> {
    let payment = parse_payment(payment)?;
    let change_for = match change_for {
        Some(raw) => Some(
            parse_brl_cents(raw).with_context(|| format!("invalid --change-for '{raw}'"))?,
        ),
        None => None,
    };

    let (mut flow, _jar) = open_flow(cfg)?;
    let order = flow
        .submit_order(payment, change_for)
        .await
        .map_err(exit_refused_flow)?;

    print_order(&order, false);
    if let Some(tendered) = order.change_for {
        println!(
            "change_due={}",
            format_brl(change_due(order.total_amount, tendered))
        );
    }
    println!("order_placed=true order_id={}", order.id);
    Ok(())
}

pub async fn my_orders(cfg: &Config) -> Result<()> {
    let (flow, _jar) = open_flow(cfg)?;
    let orders = flow.order_history().await?;
    for order in &orders {
        print_order(order, false);
    }
    println!("orders_len={}", orders.len());
    Ok(())
}

/// Parse a CLI `--payment` string. `CARD` is accepted as the legacy alias
/// for `CREDIT_CARD`, mirroring the wire schema.
fn parse_payment(raw: &str) -> Result<PaymentMethod> {
    match raw.trim().to_uppercase().as_str() {
        "PIX" => Ok(PaymentMethod::Pix),
        "CASH" => Ok(PaymentMethod::Cash),
        "CREDIT_CARD" | "CARD" => Ok(PaymentMethod::CreditCard),
        other => bail!(
            "invalid --payment '{}'. expected one of: PIX | CASH | CREDIT_CARD",
            other
        ),
    }
}
