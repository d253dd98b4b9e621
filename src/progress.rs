// src/progress.rs
/// Lightweight progress reporting used by the batch phases (fetch/aggregate).
/// Frontends (GUI/CLI) implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of items (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one company's unit completes, whatever the outcome.
    fn item_done(&mut self, _company_id: &str, _summary: &str) {}

    /// Called when a unit failed; `item_done` is not called for it.
    fn item_failed(&mut self, _company_id: &str, _cause: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// Re-lend an optional progress sink to a callee without giving it up.
pub fn reborrow<'s>(progress: &'s mut Option<&mut dyn Progress>) -> Option<&'s mut dyn Progress> {
    match progress {
        Some(p) => Some(&mut **p),
        None => None,
    }
}
