use super::*;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: Arc<SynthConfig>,
}

impl AppState {
    pub(crate) fn new(config: SynthConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}
