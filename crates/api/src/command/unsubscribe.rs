use crate::error::CalendarError;
use crate::shared::usecase::UseCase;
use econ_calendar_domain::{SubscriberKey, Subscription};
use econ_calendar_infra::CalendarContext;

#[derive(Debug)]
pub struct UnsubscribeUseCase {
    pub subscription: Subscription,
    pub subscriber: String,
}

#[derive(Debug)]
pub struct UseCaseRes {
    /// False when there was no such subscription to remove
    pub removed: bool,
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
impl UseCase for UnsubscribeUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "Unsubscribe";

    async fn execute(&mut self, ctx: &CalendarContext) -> Result<Self::Response, Self::Error> {
        let key = SubscriberKey {
            subscription: self.subscription.as_str().to_string(),
            subscriber: self.subscriber.clone(),
        };
        ctx.repos
            .subscribers
            .delete(&key)
            .await
            .map(|deleted| UseCaseRes {
                removed: deleted.is_some(),
            })
            .map_err(UseCaseError::StorageError)
    }
}
