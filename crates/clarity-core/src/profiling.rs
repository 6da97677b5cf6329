//! Profiling utilities based on the `puffin` crate.

pub use puffin::{GlobalProfiler, profile_function, profile_scope};

#[cfg(feature = "profiling")]
use std::sync::OnceLock;

/// Global profiling server instance.
#[cfg(feature = "profiling")]
static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

/// Enable puffin scopes and serve them to `puffin_viewer` over HTTP.
///
/// # Example
/// ```no_run
/// clarity_core::profiling::init_profiling("0.0.0.0:8585");
/// ```
#[cfg(feature = "profiling")]
pub fn init_profiling(bind_addr: &str) {
    puffin::set_scopes_on(true);

    match puffin_http::Server::new(bind_addr) {
        Ok(server) => {
            tracing::info!("Puffin profiler server started on http://{}", bind_addr);
            let _ = PROFILING_SERVER.set(server);
        }
        Err(e) => {
            tracing::error!("Failed to start puffin server: {}", e);
        }
    }
}

/// Mark the start of a new frame for profiling.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}
