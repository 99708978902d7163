use crossterm::event::KeyEvent;
use tracing::{info, warn};

use crate::analyzer::state::{AnalyzerState, ReplyOutcome};
use crate::config::Config;
use crate::practice::adapter;
use crate::practice::session::{PracticeQuestion, PracticeSession};
use crate::service::worker::{ServiceReply, ServiceRequest, Ticket};
use crate::ui::line_input::{InputResult, LineInput};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Analyzer,
    Practice,
}

pub struct App {
    pub screen: AppScreen,
    pub config: Config,
    pub theme: &'static Theme,
    pub analyzer: AnalyzerState,
    pub practice: Option<PracticeSession>,
    /// Editor for the selected practice answer; reloaded on selection change.
    pub answer_input: LineInput,
    pub transcript_scroll: u16,
    pub should_quit: bool,
    /// Requests produced by key handling, drained by the run loop.
    outbox: Vec<ServiceRequest>,
}

impl App {
    pub fn new(config: Config, theme: &'static Theme) -> Self {
        Self {
            screen: AppScreen::Analyzer,
            config,
            theme,
            analyzer: AnalyzerState::new(),
            practice: None,
            answer_input: LineInput::default(),
            transcript_scroll: 0,
            should_quit: false,
            outbox: Vec::new(),
        }
    }

    pub fn submit_question(&mut self) -> bool {
        match self.analyzer.analyze() {
            Some(request) => {
                self.outbox.push(request);
                true
            }
            None => false,
        }
    }

    pub fn request_test(&mut self) -> bool {
        match self.analyzer.generate_test() {
            Some(request) => {
                self.outbox.push(request);
                true
            }
            None => false,
        }
    }

    pub fn take_requests(&mut self) -> Vec<ServiceRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn handle_reply(&mut self, reply: ServiceReply) -> ReplyOutcome {
        let new_bundle = matches!(reply, ServiceReply::TestBundle { .. });
        let outcome = self.analyzer.apply_reply(reply);
        if outcome == ReplyOutcome::Applied && new_bundle {
            self.transcript_scroll = 0;
        }
        outcome
    }

    /// The worker refused `ticket`; nothing will ever answer it.
    pub fn request_failed(&mut self, ticket: Ticket, reason: &str) {
        self.analyzer.abandon(ticket, reason);
    }

    /// Clears the question, results and error slot. A reply still in flight
    /// becomes stale.
    pub fn reset_analyzer(&mut self) {
        info!("analyzer reset");
        self.analyzer = AnalyzerState::new();
        self.transcript_scroll = 0;
    }

    pub fn scroll_transcript_down(&mut self) {
        let lines = self.analyzer.current_test.as_ref().map_or(0, |bundle| {
            bundle
                .tests
                .iter()
                .map(|t| 2 + t.questions.len().max(1) * 2)
                .sum::<usize>()
        });
        if (self.transcript_scroll as usize) + 1 < lines {
            self.transcript_scroll += 1;
        }
    }

    pub fn scroll_transcript_up(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
    }

    /// Starts a fresh practice session; any previous answers are dropped.
    pub fn open_practice(&mut self, questions: Vec<PracticeQuestion>) {
        info!(questions = questions.len(), "opening practice session");
        self.practice = Some(PracticeSession::new(questions));
        self.answer_input = LineInput::default();
        self.screen = AppScreen::Practice;
    }

    pub fn open_practice_from_test(&mut self) -> bool {
        let Some(bundle) = self.analyzer.current_test.as_ref() else {
            warn!("no generated test to practise");
            return false;
        };
        let questions = adapter::from_bundle(bundle);
        if questions.is_empty() {
            warn!("generated test has no questions");
            return false;
        }
        self.open_practice(questions);
        true
    }

    /// Returns to a session opened earlier, answers intact.
    pub fn resume_practice(&mut self) -> bool {
        let Some(session) = self.practice.as_ref() else {
            return false;
        };
        self.answer_input = LineInput::new(session.answer(session.selected()));
        self.screen = AppScreen::Practice;
        true
    }

    pub fn go_to_analyzer(&mut self) {
        self.screen = AppScreen::Analyzer;
    }

    pub fn practice_next(&mut self) {
        if let Some(session) = self.practice.as_mut() {
            session.select_next();
            self.answer_input = LineInput::new(session.answer(session.selected()));
        }
    }

    pub fn practice_prev(&mut self) {
        if let Some(session) = self.practice.as_mut() {
            session.select_prev();
            self.answer_input = LineInput::new(session.answer(session.selected()));
        }
    }

    pub fn practice_toggle_reveal(&mut self) {
        if let Some(session) = self.practice.as_mut() {
            session.toggle_reveal(session.selected());
        }
    }

    /// Feeds `key` to the answer editor and stores the result on every edit.
    pub fn practice_edit(&mut self, key: KeyEvent) -> InputResult {
        let result = self.answer_input.handle(key);
        if result == InputResult::Edited
            && let Some(session) = self.practice.as_mut()
        {
            session.record_answer(session.selected(), self.answer_input.value());
        }
        result
    }
}
