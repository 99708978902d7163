use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::practice::session::{Feedback, PracticeSession};
use crate::ui::line_input::LineInput;
use crate::ui::theme::Theme;

pub struct PracticeSheet<'a> {
    pub session: &'a PracticeSession,
    /// Editor bound to the selected question's answer.
    pub input: &'a LineInput,
    pub theme: &'a Theme,
}

impl<'a> PracticeSheet<'a> {
    pub fn new(session: &'a PracticeSession, input: &'a LineInput, theme: &'a Theme) -> Self {
        Self {
            session,
            input,
            theme,
        }
    }

    /// All lines plus the line range occupied by the selected question.
    fn lines(&self) -> (Vec<Line<'a>>, usize, usize) {
        let colors = &self.theme.colors;
        let mut lines: Vec<Line> = Vec::new();
        let mut selected_range = (0, 0);

        for (i, q) in self.session.questions().iter().enumerate() {
            let selected = i == self.session.selected();
            let start = lines.len();

            let marker = if selected { "▸" } else { " " };
            let number_style = if selected {
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(colors.text_pending())
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{marker}{:>3}. ", i + 1), number_style),
                Span::styled(q.question.as_str(), Style::default().fg(colors.fg())),
            ]));

            let mut answer_line = vec![Span::styled(
                "      Your answer: ",
                Style::default().fg(colors.text_pending()),
            )];
            if selected {
                let (before, cursor_ch, after) = self.input.render_parts();
                let cursor_style = Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg());
                answer_line.push(Span::styled(before, Style::default().fg(colors.fg())));
                match cursor_ch {
                    Some(ch) => {
                        answer_line.push(Span::styled(ch.to_string(), cursor_style));
                        answer_line.push(Span::styled(after, Style::default().fg(colors.fg())));
                    }
                    None => answer_line.push(Span::styled(" ", cursor_style)),
                }
            } else {
                answer_line.push(Span::styled(
                    self.session.answer(i),
                    Style::default().fg(colors.fg()),
                ));
            }
            match self.session.feedback(i) {
                Feedback::Hidden => {}
                Feedback::Correct => answer_line.push(Span::styled(
                    "  ✓ Correct",
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD),
                )),
                Feedback::Incorrect => answer_line.push(Span::styled(
                    "  ✗ Incorrect",
                    Style::default()
                        .fg(colors.error())
                        .add_modifier(Modifier::BOLD),
                )),
            }
            lines.push(Line::from(answer_line));

            if self.session.is_revealed(i) {
                lines.push(Line::from(vec![
                    Span::styled("      Answer: ", Style::default().fg(colors.text_pending())),
                    Span::styled(
                        q.correct_answer.as_str(),
                        Style::default().fg(colors.warning()),
                    ),
                ]));
            }
            lines.push(Line::default());

            if selected {
                selected_range = (start, lines.len());
            }
        }

        (lines, selected_range.0, selected_range.1)
    }
}

/// Smallest scroll offset that keeps `start..end` inside `height` rows.
fn scroll_for(start: usize, end: usize, height: usize) -> usize {
    if end > height {
        (end - height).min(start)
    } else {
        0
    }
}

impl Widget for PracticeSheet<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let score = self.session.score();

        let block = Block::bordered()
            .title(format!(
                " Practice Test  {}/{} correct ",
                score.correct, score.total
            ))
            .border_style(Style::default().fg(colors.border_focused()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.session.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "  No questions to practise",
                Style::default().fg(colors.text_pending()),
            )))
            .render(inner, buf);
            return;
        }

        let (lines, start, end) = self.lines();
        let scroll = scroll_for(start, end, inner.height as usize);
        Paragraph::new(lines)
            .scroll((scroll as u16, 0))
            .render(inner, buf);
    }
}
