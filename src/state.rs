use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{config::Config, device::DeviceController};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub device: Arc<Mutex<DeviceController>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        Self {
            device: Arc::new(Mutex::new(DeviceController::new(Arc::clone(&config)))),
            config,
        }
    }
}
