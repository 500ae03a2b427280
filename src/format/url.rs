//! URL output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{MapReport, OutputFormatter};

/// URL formatter - outputs an external map link for the map center
pub struct UrlFormatter;

impl UrlFormatter {
    /// Format URL with optional provider override
    pub fn format_with_provider(
        &self,
        report: &MapReport,
        config: &Config,
        provider: Option<&str>,
    ) -> Result<String> {
        config.format_url(provider, report.center.lat, report.center.lng)
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "External map link for the map center"
    }

    fn format(&self, report: &MapReport, config: &Config) -> Result<String> {
        self.format_with_provider(report, config, None)
    }
}
