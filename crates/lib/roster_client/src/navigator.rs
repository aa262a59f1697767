//! Redirect seam for the request pipeline.

use log::warn;

/// Receives the hard redirects the pipeline decides on (e.g. to `/login`
/// after a 401).
pub trait Navigator: Send + Sync {
    fn redirect(&self, location: &str);
}

/// Navigator for non-interactive front ends: the redirect becomes a warning.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, location: &str) {
        warn!("session expired; sign in again via {location}");
    }
}
