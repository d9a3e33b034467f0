use crate::error::CalendarError;
use crate::shared::usecase::UseCase;
use econ_calendar_infra::CalendarContext;

#[derive(Debug)]
pub struct ListSubscriptionsUseCase {
    pub subscriber: String,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError(anyhow::Error),
}

impl From<UseCaseError> for CalendarError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError(e) => Self::StoreUnavailable(e.to_string()),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for ListSubscriptionsUseCase {
    /// Sorted subscription names
    type Response = Vec<String>;
    type Error = UseCaseError;

    const NAME: &'static str = "ListSubscriptions";

    async fn execute(&mut self, ctx: &CalendarContext) -> Result<Self::Response, Self::Error> {
        let mut subscriptions = ctx
            .repos
            .subscribers
            .find_by_subscriber(&self.subscriber)
            .await
            .map_err(UseCaseError::StorageError)?
            .into_iter()
            .map(|s| s.subscription)
            .collect::<Vec<_>>();
        subscriptions.sort();
        Ok(subscriptions)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use econ_calendar_domain::{Subscriber, Subscription};

    #[actix_web::test]
    async fn lists_only_the_subscriptions_of_the_chat() {
        let ctx = CalendarContext::create_inmemory();
        for (subscription, chat) in [("oil", "chat42"), ("gold-prices", "chat42"), ("usd", "chat7")] {
            let subscription: Subscription = subscription.parse().unwrap();
            ctx.repos
                .subscribers
                .insert(&Subscriber::new(&subscription, chat, 0))
                .await
                .unwrap();
        }

        let mut usecase = ListSubscriptionsUseCase {
            subscriber: "chat42".into(),
        };
        let res = usecase.execute(&ctx).await.unwrap();
        assert_eq!(res, vec!["gold-prices".to_string(), "oil".to_string()]);

        let mut usecase = ListSubscriptionsUseCase {
            subscriber: "chat1".into(),
        };
        assert!(usecase.execute(&ctx).await.unwrap().is_empty());
    }
}
