//! Command handler modules for the `blc` binary.
//!
//! Shared plumbing lives here: the on-disk session cookie that lets one
//! login serve many invocations, client construction over that cookie, and
//! the key=value line printers both sides use. Command-specific logic lives
//! in the submodules.

pub mod client;
pub mod staff;

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Url;

use blc_client::{ApiClient, ApiError};
use blc_config::Config;
use blc_lifecycle::{format_brl, format_order_number, format_shop_time};
use blc_schemas::{Order, Product, SessionUser};

/// Session cookie file under the data dir, alongside the cart store.
pub const SESSION_FILE: &str = "balcao-session.txt";

// ---------------------------------------------------------------------------
// Session persistence
// ---------------------------------------------------------------------------

fn session_path(cfg: &Config) -> PathBuf {
    cfg.data_dir.join(SESSION_FILE)
}

fn api_url(cfg: &Config) -> Result<Url> {
    Url::parse(&cfg.api_base_url).context("api_base_url is not a valid URL")
}

/// Build a cookie jar seeded from the saved session, if any. An unreadable
/// file behaves like being logged out.
pub fn load_session_jar(cfg: &Config) -> Result<Arc<Jar>> {
    let jar = Arc::new(Jar::default());
    match fs::read_to_string(session_path(cfg)) {
        Ok(raw) => {
            let cookie = raw.trim();
            if !cookie.is_empty() {
                jar.add_cookie_str(cookie, &api_url(cfg)?);
            }
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(error = %e, "session file unreadable, starting logged out");
        }
    }
    Ok(jar)
}

/// Persist whatever session cookie the jar now holds. No cookie means
/// logged out, so the file goes away.
pub fn save_session(cfg: &Config, jar: &Jar) -> Result<()> {
    let path = session_path(cfg);
    match jar.cookies(&api_url(cfg)?) {
        Some(header) => {
            let cookie = header
                .to_str()
                .context("session cookie is not valid ASCII")?;
            fs::create_dir_all(&cfg.data_dir)
                .with_context(|| format!("create data dir failed: {}", cfg.data_dir.display()))?;
            fs::write(&path, format!("{cookie}\n"))
                .with_context(|| format!("write session failed: {}", path.display()))?;
        }
        None => {
            let _ = fs::remove_file(&path);
        }
    }
    Ok(())
}

pub fn clear_session(cfg: &Config) {
    let _ = fs::remove_file(session_path(cfg));
}

/// An [`ApiClient`] riding on the saved session, plus the jar so the caller
/// can persist any cookie a login sets.
pub fn session_client(cfg: &Config) -> Result<(ApiClient, Arc<Jar>)> {
    let jar = load_session_jar(cfg)?;
    let client = ApiClient::with_cookie_jar(&cfg.api_base_url, jar.clone())?;
    Ok((client, jar))
}

// ---------------------------------------------------------------------------
// Refusal mapping
// ---------------------------------------------------------------------------

/// Collaborator refusals exit with code 2 so scripts can tell "refused"
/// from "broken". Everything else propagates as a normal failure.
pub fn exit_refused(err: ApiError) -> anyhow::Error {
    if let ApiError::Refused { status, message } = &err {
        eprintln!("refused=true status={status} message={message}");
        std::process::exit(2);
    }
    err.into()
}

// ---------------------------------------------------------------------------
// Line printers
// ---------------------------------------------------------------------------

/// One order per line. Free-text fields go last so the `key=value` prefix
/// stays machine-splittable.
pub fn print_order(order: &Order, staff_view: bool) {
    let status_label = if staff_view {
        order.status.staff_label()
    } else {
        order.status.client_label()
    };
    println!(
        "order={} number={} status={} total={} payment={} created={} label={} client={}",
        order.id,
        format_order_number(Some(order.order_number)),
        order.status.as_str(),
        format_brl(order.total_amount),
        order.payment_method.as_str(),
        format_shop_time(order.created_at),
        status_label,
        order.client_name,
    );
}

pub fn print_product(product: &Product) {
    println!(
        "product={} price={} category={} active={} name={}",
        product.id,
        format_brl(product.price),
        product.category,
        product.is_active,
        product.name,
    );
}

pub fn print_user(user: &SessionUser) {
    let roles: Vec<&str> = user.roles.iter().map(|r| r.as_str()).collect();
    println!(
        "user={} roles={} phone={} email={} name={}",
        user.id,
        roles.join(","),
        user.phone.as_deref().unwrap_or(""),
        user.email.as_deref().unwrap_or(""),
        user.name,
    );
}
