//! # Storefront Cart
//!
//! Cart page and hosted checkout service.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export BASE_URL=http://localhost:8080
//! export LOCALES=en,de
//!
//! # Run the server
//! storefront-cart
//! ```

use cart_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Locales: {:?}", state.config.locales);
    info!("Default currency: {}", state.config.default_currency);
    info!("Checkout endpoint: {}", state.config.checkout_endpoint_url);
    info!("Catalog: {} products", state.catalog.len());

    let default_locale = state.config.default_locale().to_string();
    let app = routes::create_router(state);

    info!("Storefront cart starting on http://{}", addr);

    if !is_prod {
        info!("Cart page: GET http://{}/{}/cart/{{cart_id}}", addr, default_locale);
        info!("Checkout sessions: POST http://{}/api/stripe/create-checkout-session", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Storefront Cart
  ━━━━━━━━━━━━━━━━━━━━━━━
  Cart page + hosted checkout
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
