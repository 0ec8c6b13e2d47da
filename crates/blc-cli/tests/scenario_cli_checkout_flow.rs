//! The whole client side through the binary: login once, mutate the cart
//! across separate invocations, check out, and read the history back. The
//! session cookie and the cart both live under the data dir, which is what
//! lets each step run in its own process.

use std::path::Path;
use std::time::Duration;

use predicates::prelude::*;

fn blc(base_url: &str, data_dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("blc").expect("blc binary");
    cmd.env("BLC_API_BASE_URL", base_url)
        .env("BLC_DATA_DIR", data_dir)
        .env_remove("BLC_CONFIG")
        .env_remove("RUST_LOG")
        .timeout(Duration::from_secs(10));
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_checkout_spans_processes_via_the_saved_session() {
    let server = blc_testkit::spawn().await.expect("spawn fake");
    let dir = tempfile::tempdir().expect("tempdir");

    // Find real product ids the way a client would.
    let probe = blc_client::ApiClient::new(&server.base_url).expect("client build");
    let products = probe.products().await.expect("catalog");
    let burger = &products.iter().find(|p| p.name == "X-Burger").expect("seed").id;
    let soda = &products
        .iter()
        .find(|p| p.name == "Coca-Cola Lata")
        .expect("seed")
        .id;

    blc(&server.base_url, dir.path())
        .args([
            "login",
            "--name",
            blc_testkit::SEED_CLIENT_NAME,
            "--phone",
            blc_testkit::SEED_CLIENT_PHONE,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("logged_in=true"));

    blc(&server.base_url, dir.path())
        .args(["cart", "add", "--product-id", burger])
        .assert()
        .success()
        .stdout(predicate::str::contains("cart_count=1"));
    blc(&server.base_url, dir.path())
        .args(["cart", "inc", "--product-id", burger])
        .assert()
        .success()
        .stdout(predicate::str::contains("cart_count=2"));
    blc(&server.base_url, dir.path())
        .args(["cart", "add", "--product-id", soda])
        .assert()
        .success()
        .stdout(predicate::str::contains("cart_count=3"));

    // 2x 18,00 + 6,00 priced against the live catalog.
    blc(&server.base_url, dir.path())
        .args(["cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("total=R$ 42,00"));

    // CASH checkout with change math on top of the collaborator total.
    blc(&server.base_url, dir.path())
        .args(["checkout", "--payment", "CASH", "--change-for", "50,00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("order_placed=true"))
        .stdout(predicate::str::contains("number=#0001"))
        .stdout(predicate::str::contains("total=R$ 42,00"))
        .stdout(predicate::str::contains("change_due=R$ 8,00"));

    // The cart was cleared by the successful checkout.
    blc(&server.base_url, dir.path())
        .args(["cart", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("count=0"));

    blc(&server.base_url, dir.path())
        .args(["my-orders"])
        .assert()
        .success()
        .stdout(predicate::str::contains("number=#0001"))
        .stdout(predicate::str::contains("orders_len=1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_menu_is_public_and_hides_inactive_products() {
    let server = blc_testkit::spawn().await.expect("spawn fake");
    let dir = tempfile::tempdir().expect("tempdir");

    blc(&server.base_url, dir.path())
        .args(["menu"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name=X-Burger"))
        .stdout(predicate::str::contains("name=Pudim").not())
        .stdout(predicate::str::contains("menu_len=4"));
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_logout_clears_cart_and_session() {
    let server = blc_testkit::spawn().await.expect("spawn fake");
    let dir = tempfile::tempdir().expect("tempdir");

    blc(&server.base_url, dir.path())
        .args([
            "login",
            "--name",
            blc_testkit::SEED_CLIENT_NAME,
            "--phone",
            blc_testkit::SEED_CLIENT_PHONE,
        ])
        .assert()
        .success();
    blc(&server.base_url, dir.path())
        .args(["cart", "add", "--product-id", "whatever"])
        .assert()
        .success();

    blc(&server.base_url, dir.path())
        .args(["logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("logged_out=true next=/"));

    // No session left behind: checkout is back to needing a login.
    blc(&server.base_url, dir.path())
        .args(["cart", "add", "--product-id", "whatever"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cart_count=1"));
    blc(&server.base_url, dir.path())
        .args(["checkout", "--payment", "PIX"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not authenticated"));
}
