//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{MapReport, OutputFormatter};

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, report: &MapReport, config: &Config) -> Result<String> {
        let mut output = String::new();
        let position = &report.location.position;

        // Header
        output.push_str(&format!("IP: {}\n", report.identity.ip_address));
        output.push_str(&format!("{}\n", report.location.status));
        output.push_str(&format!(
            "Position: ({:.6}, {:.6}) via {}\n",
            position.coords.lat, position.coords.lng, position.source
        ));

        // Places
        if let Some(places) = &report.places {
            output.push_str(&format!("\n{}\n", places.status));
            for candidate in &places.candidates {
                match candidate.distance_km {
                    Some(d) => output.push_str(&format!(
                        "  {} ({:.6}, {:.6}) {:.2} km\n",
                        candidate.name, candidate.coords.lat, candidate.coords.lng, d
                    )),
                    None => output.push_str(&format!(
                        "  {} ({:.6}, {:.6})\n",
                        candidate.name, candidate.coords.lat, candidate.coords.lng
                    )),
                }
            }
        }

        if let Ok(url) = config.format_url(None, report.center.lat, report.center.lng) {
            output.push_str(&format!("\nMap: {}\n", url));
        }

        Ok(output)
    }
}
