use crate::error::TransportError;
use crate::session::SessionEvent;
use crate::transport::{HttpRequest, RoomHttpClient};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

/// Why a request was made; decides how its outcome is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpPurpose {
    /// `message` post carrying a signaling message to the room server.
    Message,
    /// `leave` notification.
    Leave,
    /// DELETE of the socket registration.
    Unregister,
}

#[derive(Debug)]
pub struct HttpOutcome {
    pub purpose: HttpPurpose,
    pub url: String,
    pub result: Result<String, TransportError>,
}

struct HttpJob {
    purpose: HttpPurpose,
    request: HttpRequest,
    done: Option<oneshot::Sender<()>>,
}

/// Runs the session's room-server requests one at a time, in submission order.
#[derive(Clone)]
pub struct HttpOutbox {
    jobs: mpsc::UnboundedSender<HttpJob>,
}

impl HttpOutbox {
    pub fn spawn(client: Arc<dyn RoomHttpClient>, outcomes: mpsc::Sender<SessionEvent>) -> Self {
        let (jobs, mut job_rx) = mpsc::unbounded_channel::<HttpJob>();

        tokio::spawn(async move {
            while let Some(job) = job_rx.recv().await {
                let url = job.request.url.clone();
                let result = client.request(job.request).await;
                debug!("HTTP {:?} to {} finished (ok: {})", job.purpose, url, result.is_ok());

                let outcome = HttpOutcome {
                    purpose: job.purpose,
                    url,
                    result,
                };
                if outcomes.send(SessionEvent::Http(outcome)).await.is_err() {
                    break;
                }
                if let Some(done) = job.done {
                    let _ = done.send(());
                }
            }
            info!("HTTP outbox stopped");
        });

        Self { jobs }
    }

    pub fn submit(&self, purpose: HttpPurpose, request: HttpRequest) {
        self.push(purpose, request, None);
    }

    /// Like [`submit`](Self::submit), resolving the receiver once the request finished.
    pub fn submit_tracked(&self, purpose: HttpPurpose, request: HttpRequest) -> oneshot::Receiver<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.push(purpose, request, Some(done_tx));
        done_rx
    }

    fn push(&self, purpose: HttpPurpose, request: HttpRequest, done: Option<oneshot::Sender<()>>) {
        let job = HttpJob {
            purpose,
            request,
            done,
        };
        if self.jobs.send(job).is_err() {
            tracing::error!("HTTP outbox is gone, dropping {:?} request", purpose);
        }
    }
}
