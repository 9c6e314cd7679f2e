// Application state module
// Read-only state shared by every connection

use std::sync::Arc;

use super::types::Config;
use crate::git::CommandRunner;

/// Application state
pub struct AppState {
    pub config: Config,
    pub runner: Arc<dyn CommandRunner>,
}

impl AppState {
    pub fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }
}
