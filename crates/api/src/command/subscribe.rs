use crate::error::CalendarError;
use crate::shared::usecase::UseCase;
use econ_calendar_domain::{Subscriber, Subscription};
use econ_calendar_infra::CalendarContext;

#[derive(Debug)]
pub struct SubscribeUseCase {
    pub subscription: Subscription,
    pub subscriber: String,
}

#[derive(Debug)]
pub struct UseCaseRes {
    /// False when the chat was already subscribed
    pub created: bool,
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
impl UseCase for SubscribeUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "Subscribe";

    async fn execute(&mut self, ctx: &CalendarContext) -> Result<Self::Response, Self::Error> {
        let subscriber = Subscriber::new(
            &self.subscription,
            &self.subscriber,
            ctx.sys.get_timestamp_millis(),
        );
        ctx.repos
            .subscribers
            .insert(&subscriber)
            .await
            .map(|created| UseCaseRes { created })
            .map_err(UseCaseError::StorageError)
    }
}
