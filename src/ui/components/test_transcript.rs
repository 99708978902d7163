use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use crate::analyzer::format::display_name;
use crate::service::schema::TestBundle;
use crate::ui::theme::Theme;

/// Read-only dump of the last generated test: one section per concept, each
/// question followed by the answer the service expects.
pub struct TestTranscript<'a> {
    pub bundle: Option<&'a TestBundle>,
    pub theme: &'a Theme,
    pub scroll: u16,
}

impl<'a> TestTranscript<'a> {
    pub fn new(bundle: Option<&'a TestBundle>, theme: &'a Theme) -> Self {
        Self {
            bundle,
            theme,
            scroll: 0,
        }
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let colors = &self.theme.colors;
        let Some(bundle) = self.bundle else {
            return vec![Line::from(Span::styled(
                "  No test generated yet",
                Style::default().fg(colors.text_pending()),
            ))];
        };

        let mut lines = Vec::new();
        for (i, test) in bundle.tests.iter().enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            lines.push(Line::from(Span::styled(
                format!(" {}", display_name(&test.concept)),
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )));
            if test.questions.is_empty() {
                lines.push(Line::from(Span::styled(
                    "   (no questions)",
                    Style::default().fg(colors.text_pending()),
                )));
            }
            for question in &test.questions {
                lines.push(Line::from(vec![
                    Span::styled("   Q: ", Style::default().fg(colors.text_pending())),
                    Span::styled(question.question.clone(), Style::default().fg(colors.fg())),
                ]));
                lines.push(Line::from(vec![
                    Span::styled("   Expected: ", Style::default().fg(colors.text_pending())),
                    Span::styled(
                        question.expected_answer.clone(),
                        Style::default().fg(colors.success()),
                    ),
                ]));
            }
        }
        lines
    }
}

impl Widget for TestTranscript<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let title = match self.bundle {
            Some(bundle) => format!(" Generated Test ({} questions) ", bundle.question_count()),
            None => " Generated Test ".to_string(),
        };

        let block = Block::bordered()
            .title(title)
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));

        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .render(area, buf);
    }
}
