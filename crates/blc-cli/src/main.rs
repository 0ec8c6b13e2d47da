use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "blc")]
#[command(about = "Balcão order lifecycle CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browsable menu (active products only)
    Menu,

    /// Cart commands
    Cart {
        #[command(subcommand)]
        cmd: CartCmd,
    },

    /// Client sign-in by name and phone (unknown phones are registered)
    Login {
        #[arg(long)]
        name: String,

        /// Masks are fine; digits are extracted before anything is sent
        #[arg(long)]
        phone: String,
    },

    /// Place an order from the current cart
    Checkout {
        /// Payment method: PIX | CASH | CREDIT_CARD
        #[arg(long)]
        payment: String,

        /// Cash tendered, pt-BR decimal (e.g. "50,00"); CASH only
        #[arg(long = "change-for")]
        change_for: Option<String>,
    },

    /// The signed-in client's order history, newest first
    MyOrders,

    /// Show the client profile, or update it when both flags are given
    Profile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        phone: Option<String>,
    },

    /// End the client session and clear the cart
    Logout,

    /// Staff sign-in by email and password
    StaffLogin {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// One staff queue: cashier | dispatcher | admin
    Queue {
        role: String,

        /// Narrow the admin overview to one status
        #[arg(long)]
        status: Option<String>,
    },

    /// Follow a queue, refetching on live channel events: cashier | dispatcher
    Watch {
        channel: String,

        /// Stop after this many refreshes (0 = follow forever)
        #[arg(long, default_value_t = 0)]
        limit: u64,
    },

    /// Confirm payment on an order (cashier/admin)
    ConfirmPayment {
        #[arg(long = "order-id")]
        order_id: String,
    },

    /// Send a paid order out (dispatcher/admin)
    Dispatch {
        #[arg(long = "order-id")]
        order_id: String,
    },

    /// Cancel an order (admin)
    Cancel {
        #[arg(long = "order-id")]
        order_id: String,
    },

    /// Admin listings
    Admin {
        #[command(subcommand)]
        cmd: AdminCmd,
    },
}

#[derive(Subcommand)]
enum CartCmd {
    /// Cart contents priced against the live catalog
    Show,

    /// Add one unit of a product
    Add {
        #[arg(long = "product-id")]
        product_id: String,
    },

    /// Remove a product entirely, whatever its quantity
    Remove {
        #[arg(long = "product-id")]
        product_id: String,
    },

    /// Increase a product's quantity by one
    Inc {
        #[arg(long = "product-id")]
        product_id: String,
    },

    /// Decrease a product's quantity by one (quantity 1 removes it)
    Dec {
        #[arg(long = "product-id")]
        product_id: String,
    },

    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AdminCmd {
    /// All user accounts with their roles
    Users,

    /// The full catalog, inactive products included
    Products,
}

#[tokio::main]
async fn main() -> Result<()> {
    blc_config::bootstrap_dotenv();
    init_tracing();

    let cfg = blc_config::Config::load()?;
    let cli = Cli::parse();

    match cli.cmd {
        Commands::Menu => commands::client::menu(&cfg).await?,
        Commands::Cart { cmd } => match cmd {
            CartCmd::Show => commands::client::cart_show(&cfg).await?,
            CartCmd::Add { product_id } => commands::client::cart_add(&cfg, &product_id)?,
            CartCmd::Remove { product_id } => commands::client::cart_remove(&cfg, &product_id)?,
            CartCmd::Inc { product_id } => commands::client::cart_step(
                &cfg,
                &product_id,
                blc_cart::QuantityChange::Increase,
            )?,
            CartCmd::Dec { product_id } => commands::client::cart_step(
                &cfg,
                &product_id,
                blc_cart::QuantityChange::Decrease,
            )?,
            CartCmd::Clear => commands::client::cart_clear(&cfg)?,
        },
        Commands::Login { name, phone } => commands::client::login(&cfg, &name, &phone).await?,
        Commands::Checkout {
            payment,
            change_for,
        } => commands::client::checkout(&cfg, &payment, change_for.as_deref()).await?,
        Commands::MyOrders => commands::client::my_orders(&cfg).await?,
        Commands::Profile { name, phone } => {
            commands::client::profile(&cfg, name.as_deref(), phone.as_deref()).await?
        }
        Commands::Logout => commands::client::logout(&cfg).await?,

        Commands::StaffLogin { email, password } => {
            commands::staff::staff_login(&cfg, &email, &password).await?
        }
        Commands::Queue { role, status } => {
            commands::staff::queue(&cfg, &role, status.as_deref()).await?
        }
        Commands::Watch { channel, limit } => {
            commands::staff::watch(&cfg, &channel, limit).await?
        }
        Commands::ConfirmPayment { order_id } => {
            commands::staff::transition(&cfg, &order_id, blc_lifecycle::OrderAction::ConfirmPayment)
                .await?
        }
        Commands::Dispatch { order_id } => {
            commands::staff::transition(&cfg, &order_id, blc_lifecycle::OrderAction::Dispatch)
                .await?
        }
        Commands::Cancel { order_id } => {
            commands::staff::transition(&cfg, &order_id, blc_lifecycle::OrderAction::Cancel).await?
        }
        Commands::Admin { cmd } => match cmd {
            AdminCmd::Users => commands::staff::admin_users(&cfg).await?,
            AdminCmd::Products => commands::staff::admin_products(&cfg).await?,
        },
    }

    Ok(())
}

/// Quiet by default; RUST_LOG opens it up.
fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
