mod push_updates;
mod refresh_events;

pub use push_updates::PushUpdatesUseCase;
pub use refresh_events::RefreshEventsUseCase;
