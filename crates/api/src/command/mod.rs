mod handle_command;
mod list_subscriptions;
mod subscribe;
mod unsubscribe;

pub use handle_command::HandleCommandUseCase;
