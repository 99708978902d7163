use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeQuestion {
    pub question: String,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerEntry {
    pub answer: String,
    pub revealed: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Feedback {
    /// Nothing typed yet; no indicator is drawn.
    Hidden,
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
}

/// Answer and reveal state for a fixed list of questions.
///
/// State is keyed by position. The question list cannot be changed after
/// construction; practising a different list means building a new session,
/// which starts with empty answers and hidden solutions.
#[derive(Clone, Debug)]
pub struct PracticeSession {
    questions: Vec<PracticeQuestion>,
    entries: Vec<AnswerEntry>,
    selected: usize,
}

impl PracticeSession {
    pub fn new(questions: Vec<PracticeQuestion>) -> Self {
        let entries = vec![AnswerEntry::default(); questions.len()];
        Self {
            questions,
            entries,
            selected: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn questions(&self) -> &[PracticeQuestion] {
        &self.questions
    }

    pub fn answer(&self, index: usize) -> &str {
        self.entries
            .get(index)
            .map(|e| e.answer.as_str())
            .unwrap_or("")
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| e.revealed)
    }

    /// Stores `text` verbatim.
    pub fn record_answer(&mut self, index: usize, text: &str) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.answer.clear();
            entry.answer.push_str(text);
        }
    }

    pub fn toggle_reveal(&mut self, index: usize) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.revealed = !entry.revealed;
        }
    }

    /// Trimmed, case-sensitive equality. No numeric normalisation: "42.0" is
    /// not "42".
    pub fn is_correct(&self, index: usize) -> bool {
        let (Some(question), Some(entry)) = (self.questions.get(index), self.entries.get(index))
        else {
            return false;
        };
        let answer = entry.answer.trim();
        !answer.is_empty() && answer == question.correct_answer.trim()
    }

    /// Feedback shows once at least one character has been typed.
    pub fn shows_feedback(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|e| !e.answer.is_empty())
    }

    pub fn feedback(&self, index: usize) -> Feedback {
        if !self.shows_feedback(index) {
            Feedback::Hidden
        } else if self.is_correct(index) {
            Feedback::Correct
        } else {
            Feedback::Incorrect
        }
    }

    pub fn score(&self) -> Score {
        Score {
            correct: (0..self.len()).filter(|&i| self.is_correct(i)).count(),
            total: self.len(),
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(pairs: &[(&str, &str)]) -> PracticeSession {
        PracticeSession::new(
            pairs
                .iter()
                .map(|(q, a)| PracticeQuestion {
                    question: q.to_string(),
                    correct_answer: a.to_string(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_trimmed_exact_match() {
        let mut s = session(&[("What is 6 * 7?", "42")]);
        s.record_answer(0, " 42 ");
        assert!(s.is_correct(0));
        s.record_answer(0, "42.0");
        assert!(!s.is_correct(0));
    }

    #[test]
    fn test_correct_answer_side_is_trimmed_too() {
        let mut s = session(&[("Find x: 2x = 8", " x = 4.00\n")]);
        s.record_answer(0, "x = 4.00");
        assert!(s.is_correct(0));
        s.record_answer(0, "X = 4.00");
        assert!(!s.is_correct(0), "comparison is case-sensitive");
    }

    #[test]
    fn test_answer_stored_verbatim() {
        let mut s = session(&[("q", "a")]);
        s.record_answer(0, "  spaced  ");
        assert_eq!(s.answer(0), "  spaced  ");
    }

    #[test]
    fn test_toggle_reveal_twice_restores() {
        let mut s = session(&[("q1", "a1"), ("q2", "a2")]);
        assert!(!s.is_revealed(1));
        s.toggle_reveal(1);
        assert!(s.is_revealed(1));
        assert!(!s.is_revealed(0), "toggles are independent per question");
        s.toggle_reveal(1);
        assert!(!s.is_revealed(1));
    }

    #[test]
    fn test_empty_answer_hides_feedback_but_reveal_works() {
        let mut s = session(&[("Calculate 3 + 4", "7")]);
        s.record_answer(0, "");
        assert!(!s.shows_feedback(0));
        assert_eq!(s.feedback(0), Feedback::Hidden);
        assert!(!s.is_correct(0));
        s.toggle_reveal(0);
        assert!(s.is_revealed(0));
        assert_eq!(s.feedback(0), Feedback::Hidden);
    }

    #[test]
    fn test_whitespace_answer_shows_incorrect() {
        let mut s = session(&[("q", "7")]);
        s.record_answer(0, "   ");
        assert!(s.shows_feedback(0));
        assert_eq!(s.feedback(0), Feedback::Incorrect);
    }

    #[test]
    fn test_blank_correct_answer_never_matches() {
        let mut s = session(&[("q", "   ")]);
        s.record_answer(0, " ");
        assert!(!s.is_correct(0));
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut s = session(&[("q", "a")]);
        s.record_answer(5, "a");
        s.toggle_reveal(5);
        assert!(!s.is_correct(5));
        assert!(!s.is_revealed(5));
        assert_eq!(s.answer(5), "");
        assert_eq!(s.feedback(5), Feedback::Hidden);
    }

    #[test]
    fn test_score_counts_correct() {
        let mut s = session(&[("q1", "1"), ("q2", "2"), ("q3", "3")]);
        s.record_answer(0, "1");
        s.record_answer(1, "two");
        s.record_answer(2, " 3");
        assert_eq!(s.score(), Score { correct: 2, total: 3 });
    }

    #[test]
    fn test_selection_clamps() {
        let mut s = session(&[("q1", "1"), ("q2", "2")]);
        s.select_prev();
        assert_eq!(s.selected(), 0);
        s.select_next();
        s.select_next();
        assert_eq!(s.selected(), 1);

        let mut empty = PracticeSession::new(Vec::new());
        empty.select_next();
        assert_eq!(empty.selected(), 0);
    }

    #[test]
    fn test_practice_question_wire_name() {
        let q: PracticeQuestion =
            serde_json::from_str(r#"{"question":"2+2","correctAnswer":"4"}"#).unwrap();
        assert_eq!(q.correct_answer, "4");
    }
}
