//! Simulated Power BI publishing.
//!
//! Nothing here talks to a BI service. A publish run is a fixed list of
//! status messages paced by short sleeps, ending with a fabricated embed URL.

use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use uuid::Uuid;

use crate::config::PublishTiming;
use crate::error::AppError;
use crate::services::report::ReportSummary;
use crate::services::session::{random_token, UserSession};
use crate::services::templates::find_template;

const EMBED_BASE: &str = "https://app.powerbi.com/reportEmbed";

pub const GENERIC_STEPS: [&str; 6] = [
    "Connecting to Power BI service...",
    "Uploading CSV data...",
    "Creating dataset...",
    "Generating visualizations...",
    "Publishing report...",
    "Generating embed URL...",
];

pub const TEMPLATE_STEPS: [&str; 8] = [
    "Connecting to Power BI workspace...",
    "Cloning template report for user session...",
    "Uploading CSV data to isolated dataset...",
    "Replacing template data source...",
    "Refreshing report calculations...",
    "Generating user-specific embed URL...",
    "Applying security filters...",
    "Report ready for viewing",
];

#[derive(Debug, Clone, Serialize)]
pub struct PublishedReport {
    pub report_name: String,
    pub embed_url: String,
    pub data_rows: usize,
    pub steps: Vec<String>,
    pub summary: ReportSummary,
    pub summary_file_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PublishEvent {
    Step {
        index: usize,
        total: usize,
        message: String,
    },
    Ready(PublishedReport),
}

#[derive(Debug, Clone)]
pub struct MockPublisher {
    steps: &'static [&'static str],
    report_name: String,
    embed_url: String,
    data_rows: usize,
    timing: PublishTiming,
}

impl MockPublisher {
    /// Stand-alone upload: random report id in a shared mock workspace.
    pub fn generic(report_name: String, data_rows: usize, timing: PublishTiming) -> Self {
        let embed_url = format!(
            "{}?reportId={}&groupId=mock-workspace&config=mock-config",
            EMBED_BASE,
            random_token(9)
        );
        Self {
            steps: &GENERIC_STEPS,
            report_name,
            embed_url,
            data_rows,
            timing,
        }
    }

    /// Upload into a cloned template owned by the session's user.
    pub fn for_session(session: &UserSession, data_rows: usize, timing: PublishTiming) -> Result<Self, AppError> {
        let template = find_template(&session.template_id)?;
        tracing::info!(
            "Processing CSV for user {} with template {} (instance {})",
            session.user_id,
            template.id,
            session.report_instance_id
        );

        let embed_url = format!(
            "{}?reportId={}&groupId=workspace-{}&config={}&filter=user_id eq '{}'",
            EMBED_BASE,
            session.report_instance_id,
            session.user_id,
            session.session_id,
            session.user_id
        );

        Ok(Self {
            steps: &TEMPLATE_STEPS,
            report_name: format!("{} - {}", template.name, session.user_id),
            embed_url,
            data_rows,
            timing,
        })
    }

    pub fn embed_url(&self) -> &str {
        &self.embed_url
    }

    /// Step events in order, each followed by a pause, then the finished report.
    pub fn events(self) -> impl Stream<Item = PublishEvent> {
        let steps = self.steps;
        let total = steps.len();
        let timing = self.timing;

        let progress = stream::iter(steps.iter().enumerate()).then(move |(index, message)| async move {
            if index > 0 {
                tokio::time::sleep(step_pause(timing)).await;
            }
            tracing::info!("Publish step {}/{}: {}", index + 1, total, message);
            PublishEvent::Step {
                index: index + 1,
                total,
                message: message.to_string(),
            }
        });

        let ready = stream::once(async move {
            tokio::time::sleep(step_pause(timing)).await;
            PublishEvent::Ready(self.into_report())
        });

        progress.chain(ready)
    }

    /// Runs every step and returns the finished report.
    pub async fn publish(self) -> Result<PublishedReport, AppError> {
        let start = std::time::Instant::now();
        let events: Vec<PublishEvent> = self.events().collect().await;
        tracing::info!("Mock publish finished in {:?}", start.elapsed());

        events
            .into_iter()
            .find_map(|event| match event {
                PublishEvent::Ready(report) => Some(report),
                PublishEvent::Step { .. } => None,
            })
            .ok_or_else(|| AppError::Internal("Publishing ended without a report".to_string()))
    }

    fn into_report(self) -> PublishedReport {
        let summary = ReportSummary::new(&self.report_name, &self.embed_url, self.data_rows);
        PublishedReport {
            summary_file_name: summary.download_name(),
            report_name: self.report_name,
            embed_url: self.embed_url,
            data_rows: self.data_rows,
            steps: self.steps.iter().map(|s| s.to_string()).collect(),
            summary,
        }
    }
}

fn step_pause(timing: PublishTiming) -> Duration {
    let jitter_ms = timing.step_jitter.as_millis() as u64;
    if jitter_ms == 0 {
        return timing.step_delay;
    }
    let roll = (Uuid::new_v4().as_u128() % jitter_ms as u128) as u64;
    timing.step_delay + Duration::from_millis(roll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::session::SessionStore;

    fn paced() -> PublishTiming {
        PublishTiming {
            step_delay: Duration::from_millis(1000),
            step_jitter: Duration::from_millis(1000),
        }
    }

    #[test]
    fn generic_flow_runs_six_steps() {
        let publisher = MockPublisher::generic("Q1 sales".into(), 42, PublishTiming::none());
        let report = tokio_test::assert_ok!(tokio_test::block_on(publisher.publish()));
        assert_eq!(report.steps.len(), 6);
        assert_eq!(report.steps[0], "Connecting to Power BI service...");
        assert_eq!(report.data_rows, 42);
        assert!(report.embed_url.starts_with("https://app.powerbi.com/reportEmbed?reportId="));
        assert!(report.embed_url.ends_with("&groupId=mock-workspace&config=mock-config"));
        assert_eq!(report.summary_file_name, "Q1_sales_powerbi_report.json");
    }

    #[tokio::test]
    async fn session_flow_targets_the_user_workspace() {
        let sessions = SessionStore::new(Duration::from_secs(60));
        let session = sessions.create("ana", "customer-insights").unwrap();
        let publisher = MockPublisher::for_session(&session, 3, PublishTiming::none()).unwrap();
        let report = publisher.publish().await.unwrap();

        assert_eq!(report.steps.len(), 8);
        assert_eq!(report.report_name, "Customer Insights - ana");
        assert!(report.embed_url.contains(&format!("reportId={}", session.report_instance_id)));
        assert!(report.embed_url.contains("groupId=workspace-ana"));
        assert!(report.embed_url.ends_with("filter=user_id eq 'ana'"));
    }

    #[tokio::test]
    async fn events_end_with_ready() {
        let publisher = MockPublisher::generic("r".into(), 0, PublishTiming::none());
        let events: Vec<PublishEvent> = publisher.events().collect().await;
        assert_eq!(events.len(), GENERIC_STEPS.len() + 1);
        assert!(matches!(events[0], PublishEvent::Step { index: 1, total: 6, .. }));
        assert!(matches!(events.last(), Some(PublishEvent::Ready(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn steps_are_paced_by_the_configured_delay() {
        let start = tokio::time::Instant::now();
        let publisher = MockPublisher::generic("r".into(), 0, paced());
        publisher.publish().await.unwrap();
        let elapsed = start.elapsed();
        // one pause after each of the six steps
        assert!(elapsed >= Duration::from_secs(6), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(12), "elapsed {:?}", elapsed);
    }

    #[test]
    fn pause_stays_within_jitter_window() {
        for _ in 0..50 {
            let pause = step_pause(paced());
            assert!(pause >= Duration::from_millis(1000));
            assert!(pause < Duration::from_millis(2000));
        }
    }
}
