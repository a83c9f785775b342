//! HTTP server for the Petstore pet catalog.
//!
//! Serves the `/pet` resource routes on top of a [`CatalogService`]. Request
//! bodies are decoded and validated here; failures are answered with a JSON
//! [`ApiResponse`] and the matching status code (400, 404, 405 or 500).
//!
//! The [`TestServer`] helper starts a server on a random port for integration testing.

pub mod config;
pub mod routes;

pub use config::{SeedSource, ServerConfig};
pub use routes::{parse_pet_id, parse_route, status_filter, Route};

use petstore_core::{ApiResponse, CatalogError, CatalogService, Pet};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("invalid request body: {0}")]
    Body(String),
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("no route for {0}")]
    NoRoute(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl RequestError {
    pub fn status_code(&self) -> u16 {
        match self {
            RequestError::Catalog(CatalogError::NotFound(_)) | RequestError::NoRoute(_) => 404,
            RequestError::Catalog(CatalogError::InvalidArgument(_)) | RequestError::Body(_) => 400,
            RequestError::MethodNotAllowed => 405,
            RequestError::Catalog(CatalogError::Io(_) | CatalogError::Json(_))
            | RequestError::Internal(_) => 500,
        }
    }

    fn kind(&self) -> &'static str {
        match self.status_code() {
            404 => "not_found",
            400 => "invalid_argument",
            405 => "method_not_allowed",
            _ => "internal_error",
        }
    }

    pub fn to_api_response(&self) -> ApiResponse {
        let message = match self {
            RequestError::Catalog(
                CatalogError::NotFound(msg) | CatalogError::InvalidArgument(msg),
            ) => msg.clone(),
            other => other.to_string(),
        };
        ApiResponse::new(self.status_code(), self.kind(), message)
    }
}

/// A fully rendered response: status code and JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Reply {
    fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Result<Self, RequestError> {
        let body =
            serde_json::to_vec(value).map_err(|e| RequestError::Internal(e.to_string()))?;
        Ok(Self { status, body })
    }

    fn from_error(err: &RequestError) -> Self {
        let api = err.to_api_response();
        let body = serde_json::to_vec(&api).unwrap_or_else(|_| api.message.into_bytes());
        Self {
            status: err.status_code(),
            body,
        }
    }
}

#[derive(Serialize)]
struct Deleted {
    deleted: bool,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

/// Decode and validate a pet from a JSON request body.
pub fn parse_pet(body: &[u8]) -> Result<Pet, RequestError> {
    let pet: Pet = serde_json::from_slice(body).map_err(|e| RequestError::Body(e.to_string()))?;
    pet.validate()?;
    Ok(pet)
}

/// Route one request to the catalog. Pure with respect to I/O, so it can be
/// exercised without a socket.
pub fn dispatch(
    service: &CatalogService,
    method: &Method,
    url: &str,
    body: &[u8],
) -> Result<Reply, RequestError> {
    let route = parse_route(url).ok_or_else(|| RequestError::NoRoute(url.to_owned()))?;
    match (route, method) {
        (Route::Health, Method::Get) => Reply::json(200, &Health { status: "ok" }),
        (Route::Collection, Method::Get) => Reply::json(200, &service.find_all()),
        (Route::Collection, Method::Post) => {
            let pet = parse_pet(body)?;
            Reply::json(201, &service.save(pet)?)
        }
        (Route::Collection, Method::Put) => {
            let pet = parse_pet(body)?;
            Reply::json(200, &service.replace(pet)?)
        }
        (Route::Pet(raw), Method::Get) => {
            let id = parse_pet_id(raw)?;
            Reply::json(200, &service.find_by_id(id)?)
        }
        (Route::Pet(raw), Method::Put) => {
            let id = parse_pet_id(raw)?;
            let pet = parse_pet(body)?;
            Reply::json(200, &service.update_by_id(pet, id)?)
        }
        (Route::Pet(raw), Method::Delete) => {
            let id = parse_pet_id(raw)?;
            service.delete_by_id(id);
            Reply::json(200, &Deleted { deleted: true })
        }
        (Route::FindByStatus(query), Method::Get) => {
            let filter = status_filter(query)?;
            Reply::json(200, &service.get_pets_by_status(&filter))
        }
        _ => Err(RequestError::MethodNotAllowed),
    }
}

fn read_body(req: &mut tiny_http::Request) -> Option<Vec<u8>> {
    let mut body = Vec::new();
    if req.as_reader().read_to_end(&mut body).is_ok() {
        Some(body)
    } else {
        None
    }
}

fn respond(req: tiny_http::Request, reply: Reply) {
    let header = Header::from_bytes("Content-Type", "application/json").expect("valid header");
    let response = Response::from_data(reply.body)
        .with_header(header)
        .with_status_code(StatusCode(reply.status));
    if let Err(e) = req.respond(response) {
        warn!("failed to send response: {e}");
    }
}

/// Handle a single HTTP request, dispatching to the appropriate route handler.
pub fn handle_request(service: &CatalogService, mut req: tiny_http::Request) {
    let method = req.method().clone();
    let url = req.url().to_owned();
    debug!("{method} {url}");

    let body = if matches!(method, Method::Post | Method::Put) {
        let Some(body) = read_body(&mut req) else {
            let err = RequestError::Body("unreadable request body".to_owned());
            respond(req, Reply::from_error(&err));
            return;
        };
        body
    } else {
        Vec::new()
    };

    let reply = match dispatch(service, &method, &url, &body) {
        Ok(reply) => reply,
        Err(e) => {
            let code = e.status_code();
            if code >= 500 {
                error!("{method} {url}: {e}");
            } else {
                warn!("{method} {url} -> {code}: {e}");
            }
            Reply::from_error(&e)
        }
    };
    respond(req, reply);
}

/// Start the server loop, blocking the current thread.
pub fn run_server(
    service: &CatalogService,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let server = Server::http(addr)?;
    for request in server.incoming_requests() {
        handle_request(service, request);
    }
    Ok(())
}

/// A test helper that starts a petstore server on a random port in a background thread.
///
/// The server listens on `127.0.0.1:{port}`. Dropping the `TestServer` stops
/// the accept loop via `Server::unblock`.
pub struct TestServer {
    pub url: String,
    pub port: u16,
    pub service: Arc<CatalogService>,
    server: Arc<Server>,
    _handle: std::thread::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server over `service`. Binds to `127.0.0.1:0` (random port).
    pub fn start(service: CatalogService) -> Self {
        let server =
            Arc::new(Server::http("127.0.0.1:0").expect("failed to bind test HTTP server"));
        let port = server.server_addr().to_ip().expect("not an IP addr").port();
        let url = format!("http://127.0.0.1:{port}");

        let service = Arc::new(service);
        let srv = Arc::clone(&server);
        let svc = Arc::clone(&service);
        let handle = std::thread::spawn(move || {
            for request in srv.incoming_requests() {
                handle_request(&svc, request);
            }
        });

        Self {
            url,
            port,
            service,
            server,
            _handle: handle,
        }
    }

    /// Start a test server with the built-in three-pet catalog.
    pub fn start_seeded() -> Self {
        let service = ServerConfig::default()
            .build_service()
            .expect("built-in seed is valid");
        Self::start(service)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.unblock();
    }
}
