// src/config/state.rs
use super::options::AppOptions;

#[derive(Clone, Debug)]
pub struct GuiState {
    /// ROC year as typed into the query bar
    pub year: String,
    /// Month as typed; normalized to two digits when a job starts
    pub month: String,
    /// Roster path as typed
    pub roster_text: String,
    /// Output directory as typed
    pub out_text: String,

    pub window_w: u32,
    pub window_h: u32,
}

impl Default for GuiState {
    fn default() -> Self {
        Self {
            year: s!(),
            month: s!(),
            roster_text: s!(super::consts::DEFAULT_ROSTER_FILE),
            out_text: s!(super::consts::DEFAULT_OUT_DIR),
            window_w: 900,
            window_h: 600,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub options: AppOptions,
    pub gui: GuiState,
}
