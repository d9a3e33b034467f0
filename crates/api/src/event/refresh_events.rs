use crate::error::CalendarError;
use crate::shared::usecase::UseCase;
use econ_calendar_api_structs::dtos::RefreshReportDTO;
use econ_calendar_infra::{CalendarContext, UpsertResult};
use tracing::{error, info, warn};

/// Pulls the upcoming occurrences from the calendar feed into the event store
/// and prunes events that are past the retention window
#[derive(Debug)]
pub struct RefreshEventsUseCase;

#[derive(Debug, Default, PartialEq)]
pub struct RefreshReport {
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub pruned: u64,
}

impl From<RefreshReport> for RefreshReportDTO {
    fn from(r: RefreshReport) -> Self {
        Self {
            fetched: r.fetched,
            inserted: r.inserted,
            updated: r.updated,
            unchanged: r.unchanged,
            failed: r.failed,
            pruned: r.pruned,
        }
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    FeedUnavailable(anyhow::Error),
}

impl From<UseCaseError> for CalendarError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::FeedUnavailable(e) => Self::FeedUnavailable(e.to_string()),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for RefreshEventsUseCase {
    type Response = RefreshReport;
    type Error = UseCaseError;

    const NAME: &'static str = "RefreshEvents";

    async fn execute(&mut self, ctx: &CalendarContext) -> Result<Self::Response, Self::Error> {
        let occurrences = ctx
            .feed
            .fetch_upcoming()
            .await
            .map_err(UseCaseError::FeedUnavailable)?;
        let now = ctx.sys.get_timestamp_millis();

        let mut report = RefreshReport {
            fetched: occurrences.len(),
            ..Default::default()
        };

        for occurrence in occurrences {
            let event = match occurrence.to_event(now) {
                Ok(event) => event,
                Err(e) => {
                    warn!("Skipping feed occurrence: {}", e);
                    report.failed += 1;
                    continue;
                }
            };
            match ctx.repos.events.upsert(&event).await {
                Ok(UpsertResult::Inserted) => report.inserted += 1,
                Ok(UpsertResult::Updated) => report.updated += 1,
                Ok(UpsertResult::Unchanged) => report.unchanged += 1,
                Err(e) => {
                    error!(
                        "Unable to store event: {}/{}. Error: {:?}",
                        event.entity_type, event.event_key, e
                    );
                    report.failed += 1;
                }
            }
        }

        let cutoff = now - ctx.config.event_retention;
        match ctx.repos.events.delete_scheduled_before(cutoff).await {
            Ok(pruned) => report.pruned = pruned,
            Err(e) => error!("Unable to prune expired events. Error: {:?}", e),
        }

        info!("Refreshed events: {:?}", report);
        Ok(report)
    }
}
