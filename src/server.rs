//! Transport listener.
//!
//! Accepts TCP connections and serves them with hyper's HTTP/1.1 connection driver, each
//! request is handed to the [`RequestDriver`].
//!
//! ```no_run
//! use switchyard::{Handler, HandlerRegistry, RequestContext};
//!
//! fn start(_: &RequestContext) -> &'static str {
//!     "Hello World"
//! }
//!
//! let registry = HandlerRegistry::builder()
//!     .route("/", Handler::sync(start))
//!     .build()
//!     .unwrap();
//!
//! switchyard::start(registry, 8888).unwrap();
//! ```
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

use crate::{
    config::Config,
    error::StartError,
    log,
    registry::HandlerRegistry,
};

mod service;

pub use service::RequestDriver;

/// Start the server on `port` with default configuration.
///
/// Blocks the current thread, running a single threaded runtime.
///
/// # Errors
///
/// Returns error if the runtime cannot be created or the port cannot be bound.
pub fn start(registry: HandlerRegistry, port: u16) -> Result<(), StartError> {
    Server::new(registry).config(Config::default().port(port)).start()
}

/// HTTP server over a [`HandlerRegistry`].
#[derive(Debug)]
pub struct Server {
    registry: HandlerRegistry,
    config: Config,
}

impl Server {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry, config: Config::default() }
    }

    /// Replace configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Run on a new single threaded runtime until the process exits.
    pub fn start(self) -> Result<(), StartError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(StartError::Runtime)?;

        rt.block_on(async move {
            let listener = self.bind().await?;
            self.serve(listener).await;
            Ok::<_, StartError>(())
        })
    }

    /// Bind listener to the configured address.
    pub async fn bind(&self) -> Result<TcpListener, StartError> {
        let addr = self.config.addr();
        match TcpListener::bind(&addr).await {
            Ok(ok) => Ok(ok),
            Err(source) => Err(StartError::Bind { addr, source }),
        }
    }

    /// Serve connections from `listener` forever.
    pub async fn serve(self, listener: TcpListener) {
        self.serve_with_shutdown(listener, std::future::pending()).await
    }

    /// Serve connections from `listener` until `signal` completes.
    ///
    /// Connections already accepted are served to completion.
    pub async fn serve_with_shutdown(
        self,
        listener: TcpListener,
        signal: impl Future<Output = ()>,
    ) {
        let config = Arc::new(self.config);
        let driver = RequestDriver::new(self.registry, Arc::clone(&config));

        if let Ok(_addr) = listener.local_addr() {
            log::info!("Server has started on {_addr}");
        }

        tokio::pin!(signal);

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => serve_connection(stream, driver.clone(), &config),
                    Err(_err) => {
                        log::error!("failed to connect peer: {_err}");
                    }
                },
                () = &mut signal => {
                    log::info!("Server is shutting down");
                    break;
                }
            }
        }
    }
}

fn serve_connection(stream: TcpStream, driver: RequestDriver, config: &Config) {
    let mut builder = http1::Builder::new();
    builder
        .timer(TokioTimer::new())
        .title_case_headers(config.title_case_headers);

    tokio::spawn(async move {
        if let Err(_err) = builder.serve_connection(TokioIo::new(stream), driver).await {
            log::error!("failed to serve connection: {_err}");
        }
    });
}

#[cfg(test)]
mod test;
