mod command;
mod dispatch;
mod error;
mod event;
mod job_schedulers;
mod shared;
mod status;

use actix_web::{dev::Server, web, App, HttpServer};
pub use dispatch::{dispatch, Trigger};
use econ_calendar_infra::CalendarContext;
pub use error::CalendarError;
use job_schedulers::{start_push_updates_job, start_refresh_events_job};
use std::net::TcpListener;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    dispatch::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: CalendarContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        Application::start_job_schedulers(context);

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: CalendarContext) {
        if !context.config.run_job_schedulers {
            info!("Job schedulers are disabled, waiting for external triggers");
            return;
        }
        start_refresh_events_job(context.clone());
        start_push_updates_job(context);
    }

    async fn configure_server(context: CalendarContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
