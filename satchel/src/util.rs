//! Misc utilities.

use std::future::Future;

use tokio::runtime::Handle;

/// Runs a cleanup future when dropped, unless disarmed.
///
/// Used for external resources whose lifetime is awkward to model with
/// ownership, like a staged upload that must disappear if the request
/// handler bails out halfway.
///
/// The future is spawned on the current Tokio runtime. Outside of a
/// runtime the cleanup is skipped.
pub struct Finally<F>
where
    F: Future<Output = ()> + Send + 'static,
{
    f: Option<F>,
}

impl<F> Finally<F>
where
    F: Future<Output = ()> + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { f: Some(f) }
    }

    /// Drops the guard without running the cleanup.
    pub fn disarm(mut self) {
        self.f = None;
    }
}

impl<F> Drop for Finally<F>
where
    F: Future<Output = ()> + Send + 'static,
{
    fn drop(&mut self) {
        if let Some(f) = self.f.take() {
            if let Ok(handle) = Handle::try_current() {
                handle.spawn(f);
            }
        }
    }
}
