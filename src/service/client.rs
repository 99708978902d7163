use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::service::error::{ANALYZE_FAILED, GENERATE_FAILED, ServiceError};
use crate::service::schema::{
    AnalysisResult, AnalyzeRequest, ErrorBody, GenerateTestRequest, TestBundle,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Analyze,
    GenerateTest,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Analyze => "/analyze",
            Endpoint::GenerateTest => "/generate_test",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// The backend the views talk to. Implemented over HTTP for the app and by
/// scripted fakes in tests.
pub trait ConceptService {
    fn analyze(&self, question: &str) -> Result<AnalysisResult, ServiceError>;

    fn generate_test(
        &self,
        concepts: &[String],
        num_questions: usize,
    ) -> Result<TestBundle, ServiceError>;
}

impl<S: ConceptService + ?Sized> ConceptService for Box<S> {
    fn analyze(&self, question: &str) -> Result<AnalysisResult, ServiceError> {
        (**self).analyze(question)
    }

    fn generate_test(
        &self,
        concepts: &[String],
        num_questions: usize,
    ) -> Result<TestBundle, ServiceError> {
        (**self).generate_test(concepts, num_questions)
    }
}

/// `/analyze` may answer 200 with `{"error": ..., "concepts": []}` when the
/// question matched nothing.
#[derive(Deserialize)]
struct AnalyzeBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(flatten)]
    result: AnalysisResult,
}

pub struct HttpConceptService {
    base_url: String,
    client: Client,
}

impl HttpConceptService {
    /// `timeout` of `None` leaves the transport's own behaviour in place.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    fn post<B: serde::Serialize>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<Response, ServiceError> {
        let url = self.url(endpoint);
        debug!(%url, "posting");
        self.client
            .post(&url)
            .json(body)
            .send()
            .map_err(|source| ServiceError::Transport { endpoint, source })
    }

    fn read_json<T: DeserializeOwned>(
        endpoint: Endpoint,
        response: Response,
    ) -> Result<T, ServiceError> {
        let text = response
            .text()
            .map_err(|source| ServiceError::Transport { endpoint, source })?;
        serde_json::from_str(&text).map_err(|source| ServiceError::Decode { endpoint, source })
    }
}

impl ConceptService for HttpConceptService {
    fn analyze(&self, question: &str) -> Result<AnalysisResult, ServiceError> {
        let endpoint = Endpoint::Analyze;
        let response = self.post(endpoint, &AnalyzeRequest { question })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                endpoint,
                status: status.as_u16(),
                message: ANALYZE_FAILED.to_string(),
            });
        }

        let body: AnalyzeBody = Self::read_json(endpoint, response)?;
        if let Some(message) = body.error {
            return Err(ServiceError::Rejected { endpoint, message });
        }
        info!(
            concepts = body.result.related_concepts.len(),
            "analysis received"
        );
        Ok(body.result)
    }

    fn generate_test(
        &self,
        concepts: &[String],
        num_questions: usize,
    ) -> Result<TestBundle, ServiceError> {
        let endpoint = Endpoint::GenerateTest;
        let request = GenerateTestRequest {
            concepts,
            num_questions,
        };
        let response = self.post(endpoint, &request)?;

        let status = response.status();
        if !status.is_success() {
            // Best effort: a missing or non-JSON body falls back to the generic text.
            let message = response
                .text()
                .ok()
                .and_then(|text| serde_json::from_str::<ErrorBody>(&text).ok())
                .map(|body| body.error)
                .unwrap_or_else(|| GENERATE_FAILED.to_string());
            return Err(ServiceError::Status {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        let bundle: TestBundle = Self::read_json(endpoint, response)?;
        info!(
            tests = bundle.tests.len(),
            questions = bundle.question_count(),
            "test bundle received"
        );
        Ok(bundle)
    }
}
