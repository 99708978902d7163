pub mod client;
pub mod error;
pub mod schema;
pub mod worker;

pub use client::{ConceptService, Endpoint, HttpConceptService};
pub use error::ServiceError;
pub use schema::{AnalysisResult, ConceptScore, ConceptTest, GeneratedQuestion, TestBundle};
pub use worker::{RequestWorker, ServiceReply, ServiceRequest, Ticket};
