use econ_calendar_api::Application;
use econ_calendar_infra::{
    CalendarContext, InMemoryCalendarFeed, InMemoryChatPlatform, Repos, StaticTimeSys,
};
use serde_json::Value;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub ctx: CalendarContext,
    pub feed: Arc<InMemoryCalendarFeed>,
    pub chat: Arc<InMemoryChatPlatform>,
    client: reqwest::Client,
}

impl TestApp {
    pub async fn invoke(&self, payload: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/v1/invoke", self.address))
            .json(payload)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn invoke_raw(&self, body: &'static str, content_type: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/api/v1/invoke", self.address))
            .header("Content-Type", content_type)
            .body(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

// Launch the application as a background task, with a clock frozen at `now`
pub async fn spawn_app(now: i64) -> TestApp {
    spawn_app_with_repos(now, Repos::create_inmemory()).await
}

/// Like `spawn_app`, but on top of the stores of an earlier app
pub async fn spawn_app_with_repos(now: i64, repos: Repos) -> TestApp {
    let feed = Arc::new(InMemoryCalendarFeed::new());
    let chat = Arc::new(InMemoryChatPlatform::new());
    let mut ctx = CalendarContext {
        feed: feed.clone(),
        chat: chat.clone(),
        sys: Arc::new(StaticTimeSys(now)),
        repos,
        ..CalendarContext::create_inmemory()
    };
    ctx.config.port = 0; // Random port
    ctx.config.run_job_schedulers = false;

    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    TestApp {
        address,
        ctx,
        feed,
        chat,
        client: reqwest::Client::new(),
    }
}
