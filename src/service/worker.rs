use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::service::client::{ConceptService, Endpoint};
use crate::service::error::ServiceError;
use crate::service::schema::{AnalysisResult, TestBundle};

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one issued request so its reply can be matched to the view
/// state that asked for it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn next() -> Self {
        Ticket(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ServiceRequest {
    Analyze {
        ticket: Ticket,
        question: String,
    },
    GenerateTest {
        ticket: Ticket,
        concepts: Vec<String>,
        num_questions: usize,
    },
}

impl ServiceRequest {
    pub fn ticket(&self) -> Ticket {
        match self {
            ServiceRequest::Analyze { ticket, .. } | ServiceRequest::GenerateTest { ticket, .. } => {
                *ticket
            }
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            ServiceRequest::Analyze { .. } => Endpoint::Analyze,
            ServiceRequest::GenerateTest { .. } => Endpoint::GenerateTest,
        }
    }

    /// Run the request synchronously against `service`.
    pub fn execute<S: ConceptService + ?Sized>(self, service: &S) -> ServiceReply {
        match self {
            ServiceRequest::Analyze { ticket, question } => ServiceReply::Analysis {
                ticket,
                result: service.analyze(&question),
            },
            ServiceRequest::GenerateTest {
                ticket,
                concepts,
                num_questions,
            } => ServiceReply::TestBundle {
                ticket,
                result: service.generate_test(&concepts, num_questions),
            },
        }
    }
}

#[derive(Debug)]
pub enum ServiceReply {
    Analysis {
        ticket: Ticket,
        result: Result<AnalysisResult, ServiceError>,
    },
    TestBundle {
        ticket: Ticket,
        result: Result<TestBundle, ServiceError>,
    },
}

impl ServiceReply {
    pub fn ticket(&self) -> Ticket {
        match self {
            ServiceReply::Analysis { ticket, .. } | ServiceReply::TestBundle { ticket, .. } => {
                *ticket
            }
        }
    }
}

/// Background thread that performs service calls one at a time and forwards
/// each reply into the UI's event channel.
pub struct RequestWorker {
    tx: mpsc::Sender<ServiceRequest>,
}

impl RequestWorker {
    pub fn spawn<S, T>(service: S, replies: mpsc::Sender<T>) -> Result<Self>
    where
        S: ConceptService + Send + 'static,
        T: From<ServiceReply> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<ServiceRequest>();

        thread::Builder::new()
            .name("mathprep::request_worker".to_string())
            .spawn(move || {
                while let Ok(request) = rx.recv() {
                    let ticket = request.ticket();
                    let endpoint = request.endpoint();
                    info!(ticket = ticket.id(), %endpoint, "request started");

                    let reply = request.execute(&service);
                    debug!(ticket = ticket.id(), %endpoint, "request finished");

                    if replies.send(reply.into()).is_err() {
                        warn!("reply channel closed, request worker exiting");
                        return;
                    }
                }
                debug!("request channel closed, request worker exiting");
            })
            .context("failed to spawn request worker thread")?;

        Ok(Self { tx })
    }

    pub fn submit(&self, request: ServiceRequest) -> Result<()> {
        self.tx
            .send(request)
            .map_err(|_| anyhow::anyhow!("request worker has stopped"))
    }
}
