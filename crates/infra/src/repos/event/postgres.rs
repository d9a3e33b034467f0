use super::{IEventRepo, UpsertResult};
use econ_calendar_domain::{CalendarEvent, EventKey, Impact, TimeSpan};
use sqlx::{FromRow, PgPool};

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRaw {
    entity_type: String,
    event_key: String,
    source_id: String,
    title: String,
    country: String,
    impact: String,
    scheduled_at: i64,
    forecast: Option<String>,
    previous: Option<String>,
    actual: Option<String>,
    notified: Vec<String>,
    delivered: bool,
    delivered_at: Option<i64>,
    created: i64,
    updated: i64,
}

impl From<EventRaw> for CalendarEvent {
    fn from(raw: EventRaw) -> Self {
        Self {
            entity_type: raw.entity_type,
            event_key: raw.event_key,
            source_id: raw.source_id,
            title: raw.title,
            country: raw.country,
            impact: Impact::parse(&raw.impact),
            scheduled_at: raw.scheduled_at,
            forecast: raw.forecast,
            previous: raw.previous,
            actual: raw.actual,
            notified: raw.notified,
            delivered: raw.delivered,
            delivered_at: raw.delivered_at,
            created: raw.created,
            updated: raw.updated,
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn upsert(&self, e: &CalendarEvent) -> anyhow::Result<UpsertResult> {
        // `xmax` is zero only for freshly inserted rows. No row is returned
        // when the conflicting row already has the same display fields.
        let inserted: Option<bool> = sqlx::query_scalar(
            r#"
            INSERT INTO calendar_events(
                entity_type,
                event_key,
                source_id,
                title,
                country,
                impact,
                scheduled_at,
                forecast,
                previous,
                actual,
                created,
                updated
            )
            VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (entity_type, event_key) DO UPDATE SET
                title = EXCLUDED.title,
                country = EXCLUDED.country,
                impact = EXCLUDED.impact,
                scheduled_at = EXCLUDED.scheduled_at,
                forecast = EXCLUDED.forecast,
                previous = EXCLUDED.previous,
                actual = EXCLUDED.actual,
                updated = EXCLUDED.updated
            WHERE (
                calendar_events.title,
                calendar_events.country,
                calendar_events.impact,
                calendar_events.scheduled_at,
                calendar_events.forecast,
                calendar_events.previous,
                calendar_events.actual
            ) IS DISTINCT FROM (
                EXCLUDED.title,
                EXCLUDED.country,
                EXCLUDED.impact,
                EXCLUDED.scheduled_at,
                EXCLUDED.forecast,
                EXCLUDED.previous,
                EXCLUDED.actual
            )
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(&e.entity_type)
        .bind(&e.event_key)
        .bind(&e.source_id)
        .bind(&e.title)
        .bind(&e.country)
        .bind(e.impact.as_str())
        .bind(e.scheduled_at)
        .bind(&e.forecast)
        .bind(&e.previous)
        .bind(&e.actual)
        .bind(e.created)
        .bind(e.updated)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match inserted {
            Some(true) => UpsertResult::Inserted,
            Some(false) => UpsertResult::Updated,
            None => UpsertResult::Unchanged,
        })
    }

    async fn find(&self, key: &EventKey) -> anyhow::Result<Option<CalendarEvent>> {
        let event: Option<EventRaw> = sqlx::query_as(
            r#"
            SELECT * FROM calendar_events AS e
            WHERE e.entity_type = $1 AND e.event_key = $2
            "#,
        )
        .bind(&key.entity_type)
        .bind(&key.event_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event.map(|e| e.into()))
    }

    async fn find_by_entity_type(
        &self,
        entity_type: &str,
        timespan: Option<&TimeSpan>,
    ) -> anyhow::Result<Vec<CalendarEvent>> {
        let events: Vec<EventRaw> = match timespan {
            Some(timespan) => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM calendar_events AS e
                    WHERE e.entity_type = $1 AND
                    e.scheduled_at >= $2 AND e.scheduled_at <= $3
                    ORDER BY e.scheduled_at
                    "#,
                )
                .bind(entity_type)
                .bind(timespan.start())
                .bind(timespan.end())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(
                    r#"
                    SELECT * FROM calendar_events AS e
                    WHERE e.entity_type = $1
                    ORDER BY e.scheduled_at
                    "#,
                )
                .bind(entity_type)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(events.into_iter().map(|e| e.into()).collect())
    }

    async fn find_undelivered(&self, timespan: &TimeSpan) -> anyhow::Result<Vec<CalendarEvent>> {
        let events: Vec<EventRaw> = sqlx::query_as(
            r#"
            SELECT * FROM calendar_events AS e
            WHERE NOT e.delivered AND
            e.scheduled_at >= $1 AND e.scheduled_at <= $2
            ORDER BY e.scheduled_at
            "#,
        )
        .bind(timespan.start())
        .bind(timespan.end())
        .fetch_all(&self.pool)
        .await?;

        Ok(events.into_iter().map(|e| e.into()).collect())
    }

    async fn mark_notified(&self, key: &EventKey, subscriber: &str) -> anyhow::Result<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE calendar_events AS e
            SET notified = array_append(e.notified, $3)
            WHERE e.entity_type = $1 AND e.event_key = $2 AND
            NOT ($3 = ANY(e.notified))
            "#,
        )
        .bind(&key.entity_type)
        .bind(&key.event_key)
        .bind(subscriber)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn mark_delivered(&self, key: &EventKey, delivered_at: i64) -> anyhow::Result<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE calendar_events AS e
            SET delivered = TRUE, delivered_at = $3
            WHERE e.entity_type = $1 AND e.event_key = $2 AND NOT e.delivered
            "#,
        )
        .bind(&key.entity_type)
        .bind(&key.event_key)
        .bind(delivered_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn delete(&self, key: &EventKey) -> anyhow::Result<Option<CalendarEvent>> {
        let event: Option<EventRaw> = sqlx::query_as(
            r#"
            DELETE FROM calendar_events AS e
            WHERE e.entity_type = $1 AND e.event_key = $2
            RETURNING *
            "#,
        )
        .bind(&key.entity_type)
        .bind(&key.event_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event.map(|e| e.into()))
    }

    async fn delete_scheduled_before(&self, timestamp: i64) -> anyhow::Result<u64> {
        let deleted = sqlx::query(
            r#"
            DELETE FROM calendar_events AS e
            WHERE e.scheduled_at < $1
            "#,
        )
        .bind(timestamp)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(deleted)
    }
}
