//! Staff-side command handlers: login, queues, live watch, transitions.

use anyhow::{anyhow, bail, Result};

use blc_config::Config;
use blc_dashboard::{staff_landing, BoardScope, OrdersBoard};
use blc_lifecycle::{OrderAction, OrderStatus};
use blc_live::{Channel, LiveFeed};
use blc_schemas::StaffLogin;

use super::{exit_refused, print_order, print_product, print_user, save_session, session_client};

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

pub async fn staff_login(cfg: &Config, email: &str, password: &str) -> Result<()> {
    let (client, jar) = session_client(cfg)?;
    let user = client
        .staff_login(&StaffLogin {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;
    save_session(cfg, &jar)?;

    let roles: Vec<&str> = user.roles.iter().map(|r| r.as_str()).collect();
    println!(
        "logged_in=true user={} roles={} landing={}",
        user.id,
        roles.join(","),
        staff_landing(&user.roles).path(),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Queues
// ---------------------------------------------------------------------------

pub async fn queue(cfg: &Config, role: &str, status: Option<&str>) -> Result<()> {
    let scope = parse_scope(role, status)?;
    let (client, _jar) = session_client(cfg)?;
    let board = OrdersBoard::open(client, scope)
        .await
        .map_err(|route| anyhow!("queue refused for this session, go to {}", route.path()))?;
    print_board(&board);
    Ok(())
}

/// Follow a queue, refetching whenever the live channel signals. Runs until
/// `limit` refreshes have printed, or forever when `limit` is zero, or until
/// the channel gives up reconnecting.
pub async fn watch(cfg: &Config, channel: &str, limit: u64) -> Result<()> {
    let channel = parse_channel(channel)?;
    let scope = match channel {
        Channel::Cashier => BoardScope::Cashier,
        Channel::Dispatcher => BoardScope::Dispatcher,
    };

    let (client, _jar) = session_client(cfg)?;
    let mut board = OrdersBoard::open(client.clone(), scope)
        .await
        .map_err(|route| anyhow!("watch refused for this session, go to {}", route.path()))?;
    let mut feed = LiveFeed::subscribe(client, channel, cfg.live);

    println!("refresh=0");
    print_board(&board);

    let mut refreshes = 0u64;
    while limit == 0 || refreshes < limit {
        match feed.refreshed().await {
            Some(()) => {
                refreshes += 1;
                board.refresh().await;
                println!("refresh={refreshes}");
                print_board(&board);
            }
            None => {
                println!("live_channel=closed refreshes={refreshes}");
                break;
            }
        }
    }
    Ok(())
}

fn print_board(board: &OrdersBoard) {
    if let Some(err) = board.last_error() {
        println!("error={err}");
    }
    for order in board.orders() {
        print_order(order, true);
    }
    println!("queue_len={}", board.orders().len());
}

fn parse_scope(role: &str, status: Option<&str>) -> Result<BoardScope> {
    match role.trim().to_lowercase().as_str() {
        "cashier" | "dispatcher" if status.is_some() => {
            bail!("--status only applies to the admin queue")
        }
        "cashier" => Ok(BoardScope::Cashier),
        "dispatcher" => Ok(BoardScope::Dispatcher),
        "admin" => {
            let filter = status.map(parse_status).transpose()?;
            Ok(BoardScope::Admin { filter })
        }
        other => bail!(
            "invalid queue '{}'. expected one of: cashier | dispatcher | admin",
            other
        ),
    }
}

fn parse_channel(raw: &str) -> Result<Channel> {
    match raw.trim().to_lowercase().as_str() {
        "cashier" => Ok(Channel::Cashier),
        "dispatcher" => Ok(Channel::Dispatcher),
        other => bail!(
            "invalid channel '{}'. expected one of: cashier | dispatcher",
            other
        ),
    }
}

/// Statuses parse through the wire schema, so input aliases like `PENDING`
/// are accepted here as well.
fn parse_status(raw: &str) -> Result<OrderStatus> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_uppercase())).map_err(|_| {
        anyhow!(
            "invalid status '{}'. expected one of: AWAITING_PAYMENT | AWAITING_DISPATCH | DELIVERED | CANCELLED",
            raw
        )
    })
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

pub async fn transition(cfg: &Config, order_id: &str, action: OrderAction) -> Result<()> {
    let (client, _jar) = session_client(cfg)?;
    let order = client
        .apply_order_action(order_id, action)
        .await
        .map_err(exit_refused)?;
    println!(
        "applied={} order={} status={}",
        action.as_str(),
        order.id,
        order.status.as_str(),
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Admin listings
// ---------------------------------------------------------------------------

pub async fn admin_users(cfg: &Config) -> Result<()> {
    let (client, _jar) = session_client(cfg)?;
    let users = client.users().await?;
    for user in &users {
        print_user(user);
    }
    println!("users_len={}", users.len());
    Ok(())
}

pub async fn admin_products(cfg: &Config) -> Result<()> {
    let (client, _jar) = session_client(cfg)?;
    let products = client.products().await?;
    for product in &products {
        print_product(product);
    }
    println!("products_len={}", products.len());
    Ok(())
}
