use crate::config::Config;
use crate::proxy::Proxy;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub proxy: Proxy,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            proxy: Proxy::new(config.clone())?,
            config,
        })
    }
}
