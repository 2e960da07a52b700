//! Embedded web dashboard.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that renders the
//! dashboard page server-side. Buttons and tabs are plain forms: each POST runs
//! the matching controller action and redirects back to `/`.
//!
//! Launched via `stockdash serve` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::{Cursor, Read};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

use crate::api::{ApiClient, DashboardApi};
use crate::config::DashboardConfig;
use crate::controller::Dashboard;
use crate::dom::{MemoryDocument, Tab};

pub use frontend::render_page;

const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
/// Form posts are empty; anything past this is left unread.
const MAX_DRAINED_BODY: u64 = 64 * 1024;

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server.
///
/// Blocks the current thread. Requests are handled one at a time, so a slow
/// prediction service holds up every other request until it answers.
pub fn serve(config: &DashboardConfig) -> Result<()> {
    let addr = config.server.addr.as_str();
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let client = ApiClient::from_config(&config.backend);
    let mut dashboard = Dashboard::new(client, MemoryDocument::dashboard(), config.display.clone());
    dashboard
        .on_ready()
        .context("dashboard page is missing required elements")?;

    println!("stockdash dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    if config.server.open_browser {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            tracing::debug!(error = %e, "could not open browser");
        }
    }

    for request in server.incoming_requests() {
        handle(&mut dashboard, request);
    }

    Ok(())
}

/// Answer one request. Errors become a 500 JSON body; the server keeps going.
pub fn handle<A: DashboardApi>(dashboard: &mut Dashboard<A, MemoryDocument>, mut request: Request) {
    let method = request.method().clone();
    let url = request.url().to_string();

    // Form posts carry no fields we use; drain so keep-alive stays in sync.
    if matches!(method, Method::Post)
        && let Err(e) = drain_body(request.as_reader())
    {
        tracing::debug!(%url, error = %e, "failed to drain request body");
    }

    let page = dispatch(dashboard, &method, &url).unwrap_or_else(|e| {
        tracing::error!(%method, %url, error = %e, "request failed");
        Page::error(&e)
    });
    let status = page.status;

    match page.into_response() {
        Ok(resp) => {
            if let Err(e) = request.respond(resp) {
                tracing::warn!(error = %e, "failed to write response");
            }
        }
        Err(e) => tracing::error!(error = %e, "failed to build response"),
    }

    tracing::info!(%method, %url, status, "request");
}

/// Read and discard at most [`MAX_DRAINED_BODY`] bytes of a request body.
fn drain_body<R: Read>(body: R) -> std::io::Result<u64> {
    std::io::copy(&mut body.take(MAX_DRAINED_BODY), &mut std::io::sink())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub fn dispatch<A: DashboardApi>(
    dashboard: &mut Dashboard<A, MemoryDocument>,
    method: &Method,
    url: &str,
) -> Result<Page> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Page
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(Page::html(render_page(
            dashboard.document(),
            dashboard.state(),
            dashboard.api().base_url(),
        ))),

        // Navigation
        (&Method::Post, p) if p.starts_with("/tabs/") => {
            match p.trim_start_matches("/tabs/").parse::<Tab>() {
                Ok(tab) => {
                    dashboard.show_tab(tab)?;
                    Ok(Page::redirect("/"))
                }
                Err(_) => Ok(Page::not_found()),
            }
        }

        // Actions
        (&Method::Post, "/actions/dataset_info") => {
            dashboard.load_dataset_info()?;
            Ok(Page::redirect("/"))
        }
        (&Method::Post, "/actions/backtest") => {
            dashboard.run_backtest()?;
            Ok(Page::redirect("/"))
        }
        (&Method::Post, "/actions/predict") => {
            dashboard.generate_predictions()?;
            Ok(Page::redirect("/"))
        }
        (&Method::Post, "/actions/feature_importance") => {
            dashboard.load_feature_importance()?;
            Ok(Page::redirect("/"))
        }

        // Health
        (&Method::Get, "/health") => api::get_health(
            dashboard.api().base_url(),
            dashboard.api().is_reachable(),
            dashboard.state(),
        ),

        // 404
        _ => Ok(Page::not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// A rendered response, kept independent of `tiny_http` so routes are
/// testable without a socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub location: Option<String>,
}

impl Page {
    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: CONTENT_TYPE_HTML,
            body,
            location: None,
        }
    }

    pub fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body,
            location: None,
        }
    }

    /// 303 See Other, so a refresh after a form post does not resubmit it.
    pub fn redirect(to: &str) -> Self {
        Self {
            status: 303,
            content_type: CONTENT_TYPE_HTML,
            body: String::new(),
            location: Some(to.to_string()),
        }
    }

    pub fn not_found() -> Self {
        Self::json(404, r#"{"error": "not found"}"#.to_string())
    }

    pub fn error(err: &anyhow::Error) -> Self {
        Self::json(500, serde_json::json!({ "error": err.to_string() }).to_string())
    }

    fn into_response(self) -> Result<Response<Cursor<Vec<u8>>>> {
        let mut resp = Response::from_data(self.body.into_bytes())
            .with_header(header("Content-Type", self.content_type)?)
            .with_status_code(StatusCode(self.status));
        if let Some(location) = self.location {
            resp = resp.with_header(header("Location", &location)?);
        }
        Ok(resp)
    }
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow::anyhow!("invalid header {name}: {value}"))
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
