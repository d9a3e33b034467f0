use super::ISubscriberRepo;
use econ_calendar_domain::{Subscriber, SubscriberKey};
use sqlx::{FromRow, PgPool};

pub struct PostgresSubscriberRepo {
    pool: PgPool,
}

impl PostgresSubscriberRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SubscriberRaw {
    subscription: String,
    subscriber: String,
    created: i64,
}

impl From<SubscriberRaw> for Subscriber {
    fn from(raw: SubscriberRaw) -> Self {
        Self {
            subscription: raw.subscription,
            subscriber: raw.subscriber,
            created: raw.created,
        }
    }
}

#[async_trait::async_trait]
impl ISubscriberRepo for PostgresSubscriberRepo {
    async fn insert(&self, subscriber: &Subscriber) -> anyhow::Result<bool> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO subscribers(subscription, subscriber, created)
            VALUES($1, $2, $3)
            ON CONFLICT (subscription, subscriber) DO NOTHING
            "#,
        )
        .bind(&subscriber.subscription)
        .bind(&subscriber.subscriber)
        .bind(subscriber.created)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(inserted > 0)
    }

    async fn find(&self, key: &SubscriberKey) -> anyhow::Result<Option<Subscriber>> {
        let subscriber: Option<SubscriberRaw> = sqlx::query_as(
            r#"
            SELECT * FROM subscribers AS s
            WHERE s.subscription = $1 AND s.subscriber = $2
            "#,
        )
        .bind(&key.subscription)
        .bind(&key.subscriber)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscriber.map(|s| s.into()))
    }

    async fn find_by_subscription(&self, subscription: &str) -> anyhow::Result<Vec<Subscriber>> {
        let subscribers: Vec<SubscriberRaw> = sqlx::query_as(
            r#"
            SELECT * FROM subscribers AS s
            WHERE s.subscription = $1
            "#,
        )
        .bind(subscription)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers.into_iter().map(|s| s.into()).collect())
    }

    async fn find_by_subscriber(&self, subscriber: &str) -> anyhow::Result<Vec<Subscriber>> {
        let subscribers: Vec<SubscriberRaw> = sqlx::query_as(
            r#"
            SELECT * FROM subscribers AS s
            WHERE s.subscriber = $1
            ORDER BY s.subscription
            "#,
        )
        .bind(subscriber)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers.into_iter().map(|s| s.into()).collect())
    }

    async fn delete(&self, key: &SubscriberKey) -> anyhow::Result<Option<Subscriber>> {
        let subscriber: Option<SubscriberRaw> = sqlx::query_as(
            r#"
            DELETE FROM subscribers AS s
            WHERE s.subscription = $1 AND s.subscriber = $2
            RETURNING *
            "#,
        )
        .bind(&key.subscription)
        .bind(&key.subscriber)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscriber.map(|s| s.into()))
    }
}
