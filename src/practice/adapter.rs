use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::practice::session::PracticeQuestion;
use crate::service::schema::TestBundle;

/// Flatten a generated bundle into practice input, concept by concept, in
/// the order the service returned them.
pub fn from_bundle(bundle: &TestBundle) -> Vec<PracticeQuestion> {
    bundle
        .tests
        .iter()
        .flat_map(|test| test.questions.iter())
        .map(|q| PracticeQuestion {
            question: q.question.clone(),
            correct_answer: q.expected_answer.clone(),
        })
        .collect()
}

/// Read a JSON array of `{ "question", "correctAnswer" }` objects.
pub fn load_questions(path: &Path) -> Result<Vec<PracticeQuestion>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let questions: Vec<PracticeQuestion> = serde_json::from_str(&content)
        .with_context(|| format!("parsing practice questions in {}", path.display()))?;
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::service::schema::{ConceptTest, GeneratedQuestion};

    fn generated(question: &str, answer: &str) -> GeneratedQuestion {
        GeneratedQuestion {
            question: question.to_string(),
            expected_answer: answer.to_string(),
            concept: None,
            prerequisites: Vec::new(),
        }
    }

    fn concept_test(concept: &str, questions: Vec<GeneratedQuestion>) -> ConceptTest {
        ConceptTest {
            concept: concept.to_string(),
            questions,
            num_questions: None,
            includes_prerequisites: None,
            concepts_covered: Vec::new(),
        }
    }

    #[test]
    fn test_from_bundle_flattens_in_order() {
        let bundle = TestBundle {
            tests: vec![
                concept_test(
                    "linear_equations",
                    vec![
                        generated("Find x: 2x = 8", "x = 4.00"),
                        generated("Solve for x: 1x + 2 = 5", "x = 3.00"),
                    ],
                ),
                concept_test("basic_arithmetic", vec![generated("Calculate 2 + 2", "4")]),
            ],
            ..Default::default()
        };
        let questions = from_bundle(&bundle);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].question, "Find x: 2x = 8");
        assert_eq!(questions[0].correct_answer, "x = 4.00");
        assert_eq!(questions[2].correct_answer, "4");
    }

    #[test]
    fn test_from_empty_bundle() {
        assert!(from_bundle(&TestBundle::default()).is_empty());
    }

    #[test]
    fn test_load_questions_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"question":"What is 6 * 7?","correctAnswer":"42"}}]"#
        )
        .unwrap();
        let questions = load_questions(file.path()).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "42");
    }

    #[test]
    fn test_load_questions_rejects_wrong_shape() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"question":"q","expected_answer":"a"}}]"#).unwrap();
        assert!(load_questions(file.path()).is_err());
    }
}
