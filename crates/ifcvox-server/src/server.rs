//! HTTP server implementation.

use std::io::Cursor;
use std::thread::{self, JoinHandle};

use serde::Serialize;
use tiny_http::{Header, Method, Request, Response, Server};

use crate::jobs::JobStore;
use crate::route::Route;
use crate::{RequestError, ServerError};

type Reply = Response<Cursor<Vec<u8>>>;

/// HTTP server for slice images and job results.
/// Runs on a background thread; requests are answered one at a time.
pub struct SliceServer {
    addr: String,
    actual_port: Option<u16>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
struct CountResponse {
    count: usize,
}

#[derive(Serialize)]
struct ProgressResponse {
    progress: u32,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl SliceServer {
    /// `addr` is `host:port`; port 0 lets the OS choose.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            actual_port: None,
            handle: None,
        }
    }

    pub fn start(&mut self, jobs: JobStore) -> Result<(), ServerError> {
        let server = Server::http(&self.addr).map_err(|e| ServerError::BindError {
            addr: self.addr.clone(),
            error: e.to_string(),
        })?;

        self.actual_port = server.server_addr().to_ip().map(|addr| addr.port());
        tracing::info!(
            addr = %self.addr,
            port = ?self.actual_port,
            data_root = %jobs.data_root().display(),
            "slice server listening"
        );

        let handle = thread::Builder::new()
            .name("slice-server".into())
            .spawn(move || Self::run_server(server, jobs))
            .map_err(|e| ServerError::BindError {
                addr: self.addr.clone(),
                error: e.to_string(),
            })?;
        self.handle = Some(handle);
        Ok(())
    }

    /// Blocks until the server thread exits.
    pub fn wait(&mut self) -> Result<(), ServerError> {
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| ServerError::ThreadPanic),
            None => Ok(()),
        }
    }

    pub fn stop(&mut self) {
        // tiny_http has no graceful shutdown; the thread ends with the process.
        if let Some(handle) = self.handle.take() {
            std::mem::forget(handle);
        }
    }

    /// Bound port, or 0 if the server has not started.
    pub fn actual_port(&self) -> u16 {
        self.actual_port.unwrap_or(0)
    }

    fn run_server(server: Server, jobs: JobStore) {
        for request in server.incoming_requests() {
            if let Err(e) = Self::handle_request(request, &jobs) {
                tracing::warn!(error = %e, "failed to send response");
            }
        }
    }

    fn handle_request(request: Request, jobs: &JobStore) -> std::io::Result<()> {
        let url = request.url().to_string();
        let result = match request.method() {
            Method::Get => Route::parse(&url).and_then(|route| Self::dispatch(route, jobs)),
            other => Err(RequestError::NotFound(format!("{other} {url}"))),
        };

        let mut response = match result {
            Ok(response) => {
                tracing::debug!(%url, "served");
                response
            }
            Err(e) => {
                let status = e.status();
                if status >= 500 {
                    tracing::error!(%url, status, error = %e, "request failed");
                } else {
                    tracing::info!(%url, status, error = %e, "request rejected");
                }
                let body = serde_json::to_string(&ErrorResponse {
                    error: e.to_string(),
                })
                .unwrap_or_default();
                with_content_type(Response::from_string(body), "application/json")
                    .with_status_code(status)
            }
        };
        if let Ok(cors) = Header::from_bytes(&b"Access-Control-Allow-Origin"[..], &b"*"[..]) {
            response.add_header(cors);
        }
        request.respond(response)
    }

    fn dispatch(route: Route, jobs: &JobStore) -> Result<Reply, RequestError> {
        let response = match route {
            Route::Health => json(&HealthResponse { status: "ok" })?,
            Route::Info { job, num } => json(&jobs.info(&job, num)?)?,
            Route::Slice {
                job,
                num,
                axis,
                offset,
            } => png(jobs.slice_png(&job, num, axis, offset)?),
            Route::CountSlice {
                job,
                num,
                axis,
                offset,
            } => json(&CountResponse {
                count: jobs.count_slice(&job, num, axis, offset)?,
            })?,
            Route::MultiSlice {
                job,
                background,
                axis,
                offset,
                layers,
            } => png(jobs.multi_slice_png(&job, background, axis, offset, &layers)?),
            Route::Progress { job } => json(&jobs.progress(&job)?)?,
            Route::SafetyBarrierProgress { job } => json(&ProgressResponse {
                progress: jobs.safety_barrier_progress(&job)?,
            })?,
            Route::Log { job } => json(&jobs.log(&job)?)?,
            Route::File { check, job, part } => {
                let path = jobs.result_file(check, &job, &part)?;
                with_content_type(
                    Response::from_data(std::fs::read(path)?),
                    "application/octet-stream",
                )
            }
        };
        Ok(response)
    }
}

fn with_content_type(mut response: Reply, content_type: &str) -> Reply {
    if let Ok(header) = Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes()) {
        response.add_header(header);
    }
    response
}

fn json<T: Serialize>(value: &T) -> Result<Reply, RequestError> {
    let body = serde_json::to_string(value)?;
    Ok(with_content_type(Response::from_string(body), "application/json"))
}

fn png(bytes: Vec<u8>) -> Reply {
    with_content_type(Response::from_data(bytes), "image/png")
}

impl Drop for SliceServer {
    fn drop(&mut self) {
        self.stop();
    }
}
