use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use crate::service::client::Endpoint;
use crate::service::error::ServiceError;
use crate::service::schema::{AnalysisResult, QUESTIONS_PER_TEST, TestBundle};
use crate::service::worker::{ServiceReply, ServiceRequest, Ticket};
use crate::ui::line_input::LineInput;

/// Error-slot message when a test is requested before any concepts exist.
pub const NO_CONCEPTS: &str = "No concepts to generate a test from";

/// A service call that ended without data. Kept in the analyzer's error slot
/// for an embedding UI to display; the analyzer itself only logs it.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceFailure {
    pub endpoint: Endpoint,
    pub message: String,
    pub detail: String,
    pub at: DateTime<Local>,
}

impl ServiceFailure {
    /// One-line form for a status bar: time, endpoint, message, and the
    /// underlying detail when it adds anything.
    pub fn status_text(&self) -> String {
        let mut text = format!(
            "{} {}: {}",
            self.at.format("%H:%M:%S"),
            self.endpoint,
            self.message
        );
        if !self.detail.is_empty() && self.detail != self.message {
            text.push_str(&format!(" ({})", self.detail));
        }
        text
    }

    pub fn from_error(err: &ServiceError) -> Self {
        Self {
            endpoint: err.endpoint(),
            message: err.user_message(),
            detail: err.to_string(),
            at: Local::now(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyOutcome {
    Applied,
    Failed,
    /// The reply did not belong to the request this state is waiting on.
    Stale,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct InFlight {
    ticket: Ticket,
    endpoint: Endpoint,
}

#[derive(Debug, Default)]
pub struct AnalyzerState {
    pub input: LineInput,
    pub loading: bool,
    pub analysis: Option<AnalysisResult>,
    pub current_test: Option<TestBundle>,
    pub last_failure: Option<ServiceFailure>,
    in_flight: Option<InFlight>,
}

impl AnalyzerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn question(&self) -> &str {
        self.input.value()
    }

    pub fn pending_endpoint(&self) -> Option<Endpoint> {
        self.in_flight.map(|f| f.endpoint)
    }

    /// Any non-empty text is sent as typed, whitespace included.
    pub fn can_analyze(&self) -> bool {
        !self.loading && !self.question().is_empty()
    }

    /// The generate trigger is gated on `loading` only; a missing analysis is
    /// caught by `generate_test` itself.
    pub fn can_generate(&self) -> bool {
        !self.loading
    }

    pub fn analyze(&mut self) -> Option<ServiceRequest> {
        if !self.can_analyze() {
            debug!(loading = self.loading, "analyze ignored");
            return None;
        }
        let ticket = self.begin(Endpoint::Analyze);
        info!(ticket = ticket.id(), "analyzing question");
        Some(ServiceRequest::Analyze {
            ticket,
            question: self.question().to_string(),
        })
    }

    pub fn generate_test(&mut self) -> Option<ServiceRequest> {
        if !self.can_generate() {
            debug!("generate test ignored while a request is in flight");
            return None;
        }
        let concepts = match &self.analysis {
            Some(analysis) if !analysis.related_concepts.is_empty() => analysis.concept_names(),
            _ => {
                error!("no concepts available to generate a test from");
                self.last_failure = Some(ServiceFailure {
                    endpoint: Endpoint::GenerateTest,
                    message: NO_CONCEPTS.to_string(),
                    detail: "generate test skipped: the last analysis has no concepts".to_string(),
                    at: Local::now(),
                });
                return None;
            }
        };
        let ticket = self.begin(Endpoint::GenerateTest);
        info!(ticket = ticket.id(), concepts = concepts.len(), "generating test");
        Some(ServiceRequest::GenerateTest {
            ticket,
            concepts,
            num_questions: QUESTIONS_PER_TEST,
        })
    }

    pub fn apply_reply(&mut self, reply: ServiceReply) -> ReplyOutcome {
        let ticket = reply.ticket();
        if self.in_flight.map(|f| f.ticket) != Some(ticket) {
            debug!(ticket = ticket.id(), "ignoring reply for a request this view no longer tracks");
            return ReplyOutcome::Stale;
        }
        self.finish();

        match reply {
            ServiceReply::Analysis { result: Ok(analysis), .. } => {
                self.analysis = Some(analysis);
                self.last_failure = None;
                ReplyOutcome::Applied
            }
            ServiceReply::TestBundle { result: Ok(bundle), .. } => {
                self.current_test = Some(bundle);
                self.last_failure = None;
                ReplyOutcome::Applied
            }
            ServiceReply::Analysis { result: Err(err), .. }
            | ServiceReply::TestBundle { result: Err(err), .. } => {
                self.record_failure(&err);
                ReplyOutcome::Failed
            }
        }
    }

    /// The request for `ticket` will never produce a reply (for example the
    /// worker is gone). Clears `loading` as a failed call would.
    pub fn abandon(&mut self, ticket: Ticket, reason: &str) {
        let Some(in_flight) = self.in_flight else {
            return;
        };
        if in_flight.ticket != ticket {
            return;
        }
        self.finish();
        error!(endpoint = %in_flight.endpoint, reason, "request abandoned");
        self.last_failure = Some(ServiceFailure {
            endpoint: in_flight.endpoint,
            message: reason.to_string(),
            detail: reason.to_string(),
            at: Local::now(),
        });
    }

    fn begin(&mut self, endpoint: Endpoint) -> Ticket {
        let ticket = Ticket::next();
        self.loading = true;
        self.in_flight = Some(InFlight { ticket, endpoint });
        ticket
    }

    fn finish(&mut self) {
        self.loading = false;
        self.in_flight = None;
    }

    fn record_failure(&mut self, err: &ServiceError) {
        match err {
            ServiceError::Transport { .. } => error!(error = %err, "service call failed"),
            _ => warn!(error = %err, "service call failed"),
        }
        self.last_failure = Some(ServiceFailure::from_error(err));
    }
}
