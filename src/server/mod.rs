//! Interactive web front-end
//!
//! A single-page form backed by a small JSON API. Handlers share one
//! read-only [`AppContext`].

pub mod handlers;
pub mod page;
pub mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::{AppContext, Result};

/// Bind `addr` and serve until the process is stopped
pub async fn serve(ctx: Arc<AppContext>, addr: SocketAddr) -> Result<()> {
    let app = create_router(ctx);

    let listener = TcpListener::bind(addr).await?;
    log::info!("Serving on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
