//! Server shared state
//!
//! Holds configuration and shared resources for the HTTP server. Built once
//! at startup and never mutated.

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::MapPipeline;
use std::time::Instant;

/// Shared state for the HTTP server
pub struct AppState {
    /// Providers and the config they were built from
    pub pipeline: MapPipeline,

    started_at: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            pipeline: MapPipeline::new(config)?,
            started_at: Instant::now(),
        })
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        self.pipeline.config()
    }

    /// Seconds since the state was built
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
