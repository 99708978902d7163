use serde::{Deserialize, Serialize};

/// Questions requested per generated test. The service accepts other values
/// but the client never exposes the knob.
pub const QUESTIONS_PER_TEST: usize = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptScore {
    pub concept: String,
    pub probability: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub related_concepts: Vec<ConceptScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_concept: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<String>,
}

impl AnalysisResult {
    /// Bare concept identifiers in display order.
    pub fn concept_names(&self) -> Vec<String> {
        self.related_concepts
            .iter()
            .map(|c| c.concept.clone())
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    pub expected_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptTest {
    pub concept: String,
    #[serde(default)]
    pub questions: Vec<GeneratedQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_questions: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes_prerequisites: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts_covered: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TestBundle {
    #[serde(default)]
    pub tests: Vec<ConceptTest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts_covered: Vec<String>,
}

impl TestBundle {
    pub fn question_count(&self) -> usize {
        self.tests.iter().map(|t| t.questions.len()).sum()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub question: &'a str,
}

#[derive(Clone, Debug, Serialize)]
pub struct GenerateTestRequest<'a> {
    pub concepts: &'a [String],
    pub num_questions: usize,
}

/// Error payload the service attaches to failed (and some 200) responses.
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_minimal_body() {
        let json = r#"{"related_concepts":[{"concept":"linear_equations","probability":0.62}]}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.related_concepts.len(), 1);
        assert_eq!(result.related_concepts[0].concept, "linear_equations");
        assert_eq!(result.related_concepts[0].difficulty, None);
        assert!(result.main_concept.is_none());
        assert!(result.prerequisites.is_empty());
    }

    #[test]
    fn test_analysis_full_backend_body() {
        let json = r#"{
            "main_concept": "derivatives",
            "confidence": 0.0012,
            "prerequisites": ["quadratic_equations", "trigonometry"],
            "related_concepts": [
                {"concept": "derivatives", "probability": 0.8, "difficulty": 0.8},
                {"concept": "integrals", "probability": 0.2, "difficulty": 0.9}
            ],
            "observations": ["derivative", "function"]
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.main_concept.as_deref(), Some("derivatives"));
        assert_eq!(result.concept_names(), vec!["derivatives", "integrals"]);
        assert_eq!(result.related_concepts[1].difficulty, Some(0.9));
        assert_eq!(result.observations.len(), 2);
    }

    #[test]
    fn test_generate_request_wire_shape() {
        let concepts = vec!["trigonometry".to_string(), "geometry_basics".to_string()];
        let req = GenerateTestRequest {
            concepts: &concepts,
            num_questions: QUESTIONS_PER_TEST,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "concepts": ["trigonometry", "geometry_basics"],
                "num_questions": 10
            })
        );
    }

    #[test]
    fn test_bundle_counts_questions_across_tests() {
        let json = r#"{
            "tests": [
                {"concept": "integrals", "num_questions": 2, "questions": [
                    {"question": "Evaluate ∫(2x^2 + 1)dx", "expected_answer": "a", "concept": "integrals"},
                    {"question": "Find ∫[x^3 - 2x]dx", "expected_answer": "b"}
                ]},
                {"concept": "derivatives", "questions": [
                    {"question": "Find d/dx [3x^2 + 4x]", "expected_answer": "6x^1 + 4"}
                ]}
            ],
            "total_questions": 3,
            "concepts_covered": ["integrals", "derivatives"]
        }"#;
        let bundle: TestBundle = serde_json::from_str(json).unwrap();
        assert_eq!(bundle.question_count(), 3);
        assert_eq!(bundle.total_questions, Some(3));
        assert_eq!(bundle.tests[0].questions[0].concept.as_deref(), Some("integrals"));
    }
}
