// @file: symbol_poller/src/utils/logger.rs
// @description: Logging capability handed to each component, plus env_logger bootstrap.
// @author: LAS.

use log::{error, info, warn};

//
// CAPABILITY
//

pub trait EventLog: Send + Sync {
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards to the `log` facade, tagging every line with the service instance name.
#[derive(Debug, Clone)]
pub struct LogFacade {
    source: String,
}

impl LogFacade {
    pub fn new(source: impl Into<String>) -> Self {
        Self { source: source.into() }
    }
}

impl EventLog for LogFacade {
    fn info(&self, message: &str) {
        info!("[{}] {}", self.source, message);
    }

    fn warn(&self, message: &str) {
        warn!("[{}] {}", self.source, message);
    }

    fn error(&self, message: &str) {
        error!("[{}] {}", self.source, message);
    }
}


//
// BOOTSTRAP
//

// `RUST_LOG` wins over the configured level when both are present.
pub fn init_logger(default_level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .try_init();
}
