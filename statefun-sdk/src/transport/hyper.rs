//! `Transport` that uses [Hyper](http://docs.rs/hyper) to serve stateful functions.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::header::CONTENT_TYPE;
use hyper::service::{make_service_fn, service_fn};
use hyper::{http, Body, Method, Request, Response, Server, StatusCode};
use thiserror::Error;
use tokio::runtime;

use crate::context::CancellationToken;
use crate::invocation_bridge::RequestReplyHandler;
use crate::transport::Transport;

/// A [Transport](crate::transport::Transport) that serves stateful functions
/// on a http endpoint at the given `bind_address`.
pub struct HyperHttpTransport {
    bind_address: SocketAddr,
}

impl HyperHttpTransport {
    /// Creates a new `HyperHttpTransport` that can serve stateful functions
    /// at the given `bind_address`.
    pub fn new(bind_address: SocketAddr) -> HyperHttpTransport {
        HyperHttpTransport { bind_address }
    }
}

impl Transport for HyperHttpTransport {
    type Error = HyperTransportError;

    fn run(self, handler: RequestReplyHandler) -> Result<(), Self::Error> {
        log::info!(
            "Hyper transport will start listening on {}",
            self.bind_address
        );

        let mut runtime = runtime::Builder::new()
            .threaded_scheduler()
            .enable_all()
            .build()
            .map_err(HyperTransportError::TokioInitializationFailure)?;

        let handler = Arc::new(handler);

        runtime.block_on(async {
            let make_svc = make_service_fn(|_conn| {
                let handler = Arc::clone(&handler);
                async move {
                    Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                        let handler = Arc::clone(&handler);
                        async move { handle_request(handler, req).await }
                    }))
                }
            });
            let server = Server::bind(&self.bind_address).serve(make_svc);
            let graceful = server.with_graceful_shutdown(shutdown_signal());

            if let Err(e) = graceful.await {
                log::error!("server error: {}", e);
            }
        });

        Ok(())
    }
}

pub(crate) async fn handle_request(
    handler: Arc<RequestReplyHandler>,
    req: Request<Body>,
) -> Result<Response<Body>, HyperTransportError> {
    if req.method() != Method::POST {
        return text_response(StatusCode::METHOD_NOT_ALLOWED, "invalid request method");
    }

    if !content_type_is_acceptable(&req) {
        return text_response(StatusCode::UNSUPPORTED_MEDIA_TYPE, "invalid content type");
    }

    let body = hyper::body::to_bytes(req.into_body()).await?;
    if body.is_empty() {
        return text_response(StatusCode::BAD_REQUEST, "empty request body");
    }

    let cancellation = CancellationToken::new();
    match handler.invoke(&cancellation, &body) {
        Ok(encoded) => {
            log::debug!("successfully encoded response of {} bytes", encoded.len());
            Response::builder()
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(encoded.into())
                .map_err(HyperTransportError::from)
        }
        Err(err) => {
            let status = if err.is_client_error() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            let message = error_chain(&err);
            log::error!("request failed: {}", message);
            text_response(status, &message)
        }
    }
}

fn content_type_is_acceptable(req: &Request<Body>) -> bool {
    match req.headers().get(CONTENT_TYPE) {
        None => true,
        Some(value) => {
            value.as_bytes().is_empty() || value.as_bytes() == b"application/octet-stream"
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

fn text_response(
    status: StatusCode,
    message: &str,
) -> Result<Response<Body>, HyperTransportError> {
    Response::builder()
        .status(status)
        .body(Body::from(message.to_owned()))
        .map_err(HyperTransportError::from)
}

/// The error type for the `HyperHttpTransport` `Transport`.
///
/// Errors can originate from many different sources because a `Transport` is
/// the entry point that pulls everything together. This mostly wraps error
/// types of other crates/modules that we use.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HyperTransportError {
    /// An error from the underlying hyper.
    #[error(transparent)]
    HyperError(#[from] hyper::error::Error),

    /// An error from the underlying hyper/http.
    #[error(transparent)]
    HttpError(#[from] http::Error),

    /// Something went wrong with Tokio.
    #[error("Tokio runtime could not be initialized")]
    TokioInitializationFailure(#[source] std::io::Error),
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
}
