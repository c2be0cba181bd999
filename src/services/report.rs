use anyhow::Result;
use chrono::{DateTime, Utc};
use colored::Colorize;
use log::info;

use crate::domain::{Timestamp, faction_key_name};
use crate::engine::{Engine, LoadRequest, SeasonResponse};

/// Runs the aggregation once and prints it, without starting the server
pub struct ReportService {
    engine: Engine,
}

impl ReportService {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }

    pub async fn run(&self, request: &LoadRequest, now: Option<Timestamp>, json: bool) -> Result<()> {
        let now = now.unwrap_or_else(|| Utc::now().timestamp_millis());
        info!("Building report for {} as of {}", request.season, format_timestamp(now));

        let response = self.engine.load(request, now).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&response)?);
        } else {
            println!("{}", render_summary(&response));
        }
        Ok(())
    }
}

pub fn render_summary(response: &SeasonResponse) -> String {
    let mut lines = vec![format!("{}", response.season.to_string().bold())];

    for result in response.regions.values() {
        let Some(latest) = result.series.last() else {
            lines.push(format!("  {}  {}", result.region.to_string().to_uppercase().bold(), "no data".dimmed()));
            continue;
        };

        lines.push(format!(
            "  {}  {} days, last {} at {}",
            result.region.to_string().to_uppercase().bold(),
            result.series.len(),
            format!("{:.1}", latest.score).cyan(),
            format_timestamp(latest.timestamp),
        ));

        for forecast in &result.forecasts {
            let outlook = match (&forecast.confirmed_cutoff, &forecast.score) {
                (Some(cutoff), _) => format!("confirmed {:.1}", cutoff).green().to_string(),
                (None, Some(projection)) => format!(
                    "projected {:.0} by {}",
                    projection.value,
                    format_timestamp(projection.timestamp)
                )
                .yellow()
                .to_string(),
                (None, None) => "no projection".dimmed().to_string(),
            };
            lines.push(format!("    {:<9} {}", faction_key_name(forecast.faction), outlook));
        }

        if let Some(week) = result.week {
            lines.push(format!(
                "    week {} (slot {}, occurrence {})",
                week.weeks_passed + 1,
                week.slot + 1,
                week.occurrence()
            ));
        }
    }

    lines.join("\n")
}

fn format_timestamp(timestamp: Timestamp) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineSettings, get_seasons};
    use crate::domain::{DAY_MS, RawRow, Region, SeasonTable};
    use crate::engine::SnapshotSource;
    use std::sync::Arc;

    struct StaticSource(Vec<RawRow>);

    impl SnapshotSource for StaticSource {
        fn fetch_rows(&self, region: Region, _from: Timestamp, _to: Timestamp) -> Result<Vec<RawRow>> {
            Ok(self.0.iter().filter(|r| r.region == region.as_str()).cloned().collect())
        }
    }

    #[tokio::test]
    async fn test_summary_lists_every_region() {
        colored::control::set_override(false);

        // df-season-3 EU start
        let start = 1700020800000;
        let rows = (0..10)
            .map(|day| RawRow {
                timestamp: start + day * DAY_MS,
                region: "eu".to_string(),
                faction: None,
                score: 2800.0 + day as f64,
                rank: None,
            })
            .collect();
        let engine = Engine::new(
            SeasonTable::new(get_seasons()).unwrap(),
            EngineSettings::default(),
            Arc::new(StaticSource(rows)),
        );
        let request = LoadRequest::parse("df-season-3", Some("eu,us"), None, None).unwrap();
        let response = engine.load(&request, start + 9 * DAY_MS).await.unwrap();

        let summary = render_summary(&response);

        assert!(summary.starts_with("df-season-3"));
        assert!(summary.contains("US  no data"));
        assert!(summary.contains("EU  10 days, last 2809.0"));
        assert!(summary.contains("xfaction  projected 2823 by"));
        assert!(summary.contains("week 2 (slot 2, occurrence 1)"));
    }
}
