use crate::dispatch::{dispatch, Trigger};
use actix_web::rt::time::{interval_at, Instant};
use econ_calendar_infra::CalendarContext;
use std::time::Duration;
use tracing::{error, info_span};
use tracing_futures::Instrument;

/// The refresh tick runs this many seconds before its interval boundary,
/// so that the push tick at the boundary sees the fresh events
const REFRESH_SECS_BEFORE_BOUNDARY: usize = 30;

/// Seconds from `now_ts` (millis) until `secs_before` seconds ahead of the next
/// multiple of `interval_secs`
pub fn get_start_delay(now_ts: usize, interval_secs: usize, secs_before: usize) -> usize {
    let secs_to_next_boundary = interval_secs - (now_ts / 1000) % interval_secs;
    if secs_to_next_boundary > secs_before {
        secs_to_next_boundary - secs_before
    } else {
        secs_to_next_boundary + (interval_secs - secs_before)
    }
}

fn start_job_scheduler(
    ctx: CalendarContext,
    name: &'static str,
    trigger: Trigger,
    every: Duration,
    secs_before_boundary: usize,
) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let interval_secs = every.as_secs().max(1) as usize;
        let secs_to_first_run = get_start_delay(
            now as usize,
            interval_secs,
            secs_before_boundary.min(interval_secs - 1),
        );
        let start = Instant::now() + Duration::from_secs(secs_to_first_run as u64);

        let mut interval = interval_at(start, every);
        loop {
            interval.tick().await;
            let context = ctx.clone();
            let trigger = trigger.clone();
            actix_web::rt::spawn(
                async move {
                    if let Err(e) = dispatch(trigger, &context).await {
                        error!("Scheduled job failed: {}", e);
                    }
                }
                .instrument(info_span!("Job scheduler", job = name)),
            );
        }
    });
}

pub fn start_refresh_events_job(ctx: CalendarContext) {
    let every = ctx.config.refresh_interval;
    start_job_scheduler(
        ctx,
        "update-events",
        Trigger::RefreshTick,
        every,
        REFRESH_SECS_BEFORE_BOUNDARY,
    );
}

pub fn start_push_updates_job(ctx: CalendarContext) {
    let every = ctx.config.push_interval;
    start_job_scheduler(ctx, "push-updates", Trigger::PushTick, every, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_delay_works() {
        assert_eq!(get_start_delay(50 * 1000, 60, 5), 5);
        assert_eq!(get_start_delay(50 * 1000, 60, 10), 60);
        assert_eq!(get_start_delay(50 * 1000, 60, 15), 55);
        assert_eq!(get_start_delay(60 * 1000, 60, 60), 60);
        assert_eq!(get_start_delay(60 * 1000, 60, 10), 50);
        assert_eq!(get_start_delay(59 * 1000, 60, 0), 1);
        assert_eq!(get_start_delay(59 * 1000, 60, 1), 60);
    }

    #[test]
    fn start_delay_aligns_to_longer_intervals() {
        // 10:59:00 with an hourly interval
        let ts = (10 * 3600 + 59 * 60) * 1000;
        assert_eq!(get_start_delay(ts, 3600, 0), 60);
        assert_eq!(get_start_delay(ts, 3600, 30), 30);
        // 10:59:45, too late for this hour
        assert_eq!(get_start_delay(ts + 45 * 1000, 3600, 30), 3600 - 15);
        // Every two minutes, at 10:59:00
        assert_eq!(get_start_delay(ts, 120, 0), 60);
    }
}
