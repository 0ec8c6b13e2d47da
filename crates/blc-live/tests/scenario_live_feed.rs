//! End-to-end scenario tests for the live feed against the in-process fake
//! collaborator: handshake silence, refresh signals for lifecycle events,
//! channel scoping, and the bounded-retry giving-up contract.

use std::time::Duration;

use blc_client::ApiClient;
use blc_config::LiveRetryConfig;
use blc_live::{Channel, LiveFeed};
use blc_schemas::{ClientLogin, ClientRef, NewOrder, NewOrderItem, Order, StaffLogin};
use blc_testkit::{
    CASHIER_EMAIL, CASHIER_PASSWORD, DISPATCHER_EMAIL, DISPATCHER_PASSWORD, SEED_CLIENT_NAME,
    SEED_CLIENT_PHONE,
};
use tokio::time::timeout;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn staff_client(base_url: &str, email: &str, password: &str) -> ApiClient {
    let client = ApiClient::new(base_url).expect("client build");
    client
        .staff_login(&StaffLogin {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await
        .expect("staff fixture login");
    client
}

/// Log the seed client in and check out one unit of the first active product.
async fn place_seed_order(base_url: &str) -> Order {
    let client = ApiClient::new(base_url).expect("client build");
    client
        .client_login(&ClientLogin {
            phone: SEED_CLIENT_PHONE.to_string(),
            name: SEED_CLIENT_NAME.to_string(),
        })
        .await
        .expect("seed client login");

    let products = client.products().await.expect("catalog");
    let product = products
        .iter()
        .find(|p| p.is_active)
        .expect("an active seed product");

    client
        .create_order(&NewOrder {
            client_info: ClientRef {
                name: SEED_CLIENT_NAME.to_string(),
                phone: SEED_CLIENT_PHONE.to_string(),
            },
            items: vec![NewOrderItem {
                product_id: product.id.clone(),
                quantity: 1,
            }],
            payment_method: blc_lifecycle::PaymentMethod::Pix,
            change_for: None,
        })
        .await
        .expect("checkout")
}

fn fast_retry() -> LiveRetryConfig {
    LiveRetryConfig {
        max_attempts: 2,
        base_delay_ms: 5,
        max_delay_ms: 20,
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn handshake_is_quiet_then_lifecycle_events_signal_refreshes() {
    let server = blc_testkit::spawn().await.expect("spawn fake");
    let cashier = staff_client(&server.base_url, CASHIER_EMAIL, CASHIER_PASSWORD).await;

    let mut feed = LiveFeed::subscribe(cashier.clone(), Channel::Cashier, LiveRetryConfig::default());

    // The CONNECTED greeting must not produce a refresh signal.
    assert!(
        timeout(Duration::from_millis(300), feed.refreshed()).await.is_err(),
        "handshake alone must stay quiet"
    );

    // A checkout notifies the cashier channel: exactly one refresh signal.
    let order = place_seed_order(&server.base_url).await;
    let signal = timeout(Duration::from_secs(5), feed.refreshed())
        .await
        .expect("creation must signal a refresh");
    assert_eq!(signal, Some(()));
    assert!(
        timeout(Duration::from_millis(200), feed.refreshed()).await.is_err(),
        "one event, one signal"
    );

    // A transition notifies as well.
    cashier.confirm_payment(&order.id).await.expect("confirm");
    let signal = timeout(Duration::from_secs(5), feed.refreshed())
        .await
        .expect("transition must signal a refresh");
    assert_eq!(signal, Some(()));
}

#[tokio::test]
async fn feed_is_scoped_to_its_channel() {
    let server = blc_testkit::spawn().await.expect("spawn fake");
    let dispatcher = staff_client(&server.base_url, DISPATCHER_EMAIL, DISPATCHER_PASSWORD).await;

    let mut feed = LiveFeed::subscribe(
        dispatcher.clone(),
        Channel::Dispatcher,
        LiveRetryConfig::default(),
    );
    // Let the subscription come up before the event fires.
    tokio::time::sleep(Duration::from_millis(200)).await;

    // Creations go to the cashier channel only.
    let order = place_seed_order(&server.base_url).await;
    assert!(
        timeout(Duration::from_millis(300), feed.refreshed()).await.is_err(),
        "dispatcher feed must not hear creations"
    );

    // The payment confirmation reaches both channels.
    let cashier = staff_client(&server.base_url, CASHIER_EMAIL, CASHIER_PASSWORD).await;
    cashier.confirm_payment(&order.id).await.expect("confirm");
    let signal = timeout(Duration::from_secs(5), feed.refreshed())
        .await
        .expect("dispatcher feed hears transitions");
    assert_eq!(signal, Some(()));
}

#[tokio::test]
async fn retries_exhaust_into_a_closed_channel() {
    // Nothing listens on the discard port; every connect attempt fails.
    let client = ApiClient::new("http://127.0.0.1:9").expect("client build");
    let mut feed = LiveFeed::subscribe(client, Channel::Cashier, fast_retry());

    // 1 initial try + 2 retries at 5ms/10ms, then the channel closes.
    let signal = timeout(Duration::from_secs(5), feed.refreshed())
        .await
        .expect("exhaustion must resolve quickly");
    assert_eq!(signal, None, "exhausted retries must close the signal channel");
}

#[tokio::test]
async fn zero_max_attempts_means_no_reconnect() {
    let client = ApiClient::new("http://127.0.0.1:9").expect("client build");
    let retry = LiveRetryConfig {
        max_attempts: 0,
        base_delay_ms: 5,
        max_delay_ms: 20,
    };
    let mut feed = LiveFeed::subscribe(client, Channel::Cashier, retry);

    let signal = timeout(Duration::from_secs(2), feed.refreshed())
        .await
        .expect("give-up must resolve quickly");
    assert_eq!(
        signal, None,
        "a single failed connect must close the channel when reconnects are disabled"
    );
}
