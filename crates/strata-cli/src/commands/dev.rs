//! `strata dev` command implementation.
//!
//! Development server with per-request device routing.
//!
//! ## Architecture
//!
//! ```text
//! Browser requests GET /src/desktop/Home.js
//!   → derive device category from headers (opaque classifier)
//!   → classify (tablet / phone pattern, desktop fallback)
//!   → rewrite path onto the classified device tree
//!   → continue to static file serving
//! ```
//!
//! The middleware never terminates a request; paths under the reserved
//! `/@modules/` prefix and paths outside every device root pass through
//! untouched.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use miette::{IntoDiagnostic, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;

use strata_core::config::load_project_config;
use strata_core::dev::RequestRewriter;
use strata_core::roots::{RootOptions, RootRegistry};

use crate::ua;

/// Dev server action.
#[derive(Debug, Clone)]
pub struct DevAction {
    /// Working directory (project root).
    pub cwd: PathBuf,
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
    /// Device root overrides (override the config file).
    pub roots: RootOptions,
}

/// Run the dev server.
pub async fn run(action: DevAction) -> Result<()> {
    let cwd = dunce::canonicalize(&action.cwd).into_diagnostic()?;

    let project = match load_project_config(&cwd).into_diagnostic()? {
        Some((path, config)) => {
            let rel = path.strip_prefix(&cwd).unwrap_or(&path);
            println!("  Loaded config from {}", rel.display());
            config
        }
        None => strata_core::ProjectConfig::default(),
    };

    // CLI flags override config file values; defaults lose to the file.
    let effective_port = if action.port == 3000 {
        project.server.port.unwrap_or(action.port)
    } else {
        action.port
    };
    let effective_host = if action.host == "localhost" {
        project.server.host.unwrap_or(action.host)
    } else {
        action.host
    };

    let roots = project.roots.clone().merge(action.roots);
    let registry = RootRegistry::new(&roots).into_diagnostic()?;
    let rewriter = Arc::new(RequestRewriter::new(registry));

    let app = Router::new()
        .fallback_service(ServeDir::new(&cwd))
        .layer(middleware::from_fn_with_state(rewriter, route_device));

    let host_ip = if effective_host == "localhost" {
        "127.0.0.1".to_string()
    } else {
        effective_host.clone()
    };
    let addr: SocketAddr = format!("{host_ip}:{effective_port}")
        .parse()
        .into_diagnostic()?;

    println!();
    println!("  Dev server running at http://{effective_host}:{effective_port}");
    println!("  Per-request device routing enabled");
    println!();
    println!("  Press Ctrl+C to stop");
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;
    axum::serve(listener, app).await.into_diagnostic()?;

    Ok(())
}

/// Rewrite the request path onto the classified device tree, then continue
/// down the chain.
///
/// Classification and rewrite are fully local to the request; nothing is
/// shared across requests beyond the read-only rewriter.
async fn route_device(
    State(rewriter): State<Arc<RequestRewriter>>,
    mut req: Request,
    next: Next,
) -> Response {
    let category = ua::device_category(req.headers());
    let path = req.uri().path().to_string();

    if let Some(rewritten) = rewriter.rewrite(&path, category.as_deref()) {
        tracing::debug!(from = %path, to = %rewritten, "rewrote request path");
        let path_and_query = match req.uri().query() {
            Some(query) => format!("{rewritten}?{query}"),
            None => rewritten,
        };
        if let Ok(uri) = path_and_query.parse() {
            *req.uri_mut() = uri;
        }
    }

    next.run(req).await
}
