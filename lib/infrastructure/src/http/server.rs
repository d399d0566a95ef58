use actix_web::*;
use anyhow::Context as _;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct HttpServerConfig {
    pub port: u16,
    #[serde(default = "default_workers")]
    pub workers: usize,
}

fn default_workers() -> usize {
    1
}

impl HttpServerConfig {
    /// Signals are handled by the caller, the returned future only completes when the server stops.
    pub async fn run_server<F>(&self, scopes: F) -> anyhow::Result<()>
    where
        F: Fn() -> Vec<Scope> + Send + Clone + 'static,
    {
        let http_server = HttpServer::new(move || {
            scopes()
                .into_iter()
                .fold(App::new().wrap(tracing_actix_web::TracingLogger::default()), |app, scope| {
                    app.service(scope)
                })
        })
        .workers(self.workers)
        .disable_signals()
        .bind(("0.0.0.0", self.port))
        .with_context(|| format!("Error binding HTTP server to port {}", self.port))?;

        tracing::info!("Listening on port {}", self.port);

        http_server
            .run()
            .await
            .with_context(|| format!("Error running HTTP server on port {}", self.port))
    }
}
