use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::analyzer::format::{ConfidenceTier, display_name, format_percent};
use crate::service::schema::ConceptScore;
use crate::ui::theme::Theme;

pub struct ConceptList<'a> {
    pub concepts: &'a [ConceptScore],
    pub theme: &'a Theme,
}

impl<'a> ConceptList<'a> {
    pub fn new(concepts: &'a [ConceptScore], theme: &'a Theme) -> Self {
        Self { concepts, theme }
    }
}

impl Widget for ConceptList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Related Concepts ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.concepts.is_empty() {
            Paragraph::new(Line::from(Span::styled(
                "  Analyze a question to see related concepts",
                Style::default().fg(colors.text_pending()),
            )))
            .render(inner, buf);
            return;
        }

        let width = inner.width as usize;
        let lines: Vec<Line> = self
            .concepts
            .iter()
            .map(|score| {
                let name = format!(" {}", display_name(&score.concept));
                let percent = format!("{} ", format_percent(score.probability));
                let tier = ConfidenceTier::from_probability(score.probability);
                let pad = width.saturating_sub(name.chars().count() + percent.chars().count());
                Line::from(vec![
                    Span::styled(name, Style::default().fg(colors.fg())),
                    Span::raw(" ".repeat(pad)),
                    Span::styled(
                        percent,
                        Style::default()
                            .fg(colors.confidence(tier))
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::ThemeColors;

    fn theme() -> Theme {
        Theme {
            name: "test".to_string(),
            colors: ThemeColors::default(),
        }
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect()
    }

    fn find_col(buf: &Buffer, y: u16, needle: &str) -> Option<u16> {
        let width = buf.area.width;
        let len = needle.chars().count() as u16;
        (0..=width.saturating_sub(len)).find(|&x| {
            needle
                .chars()
                .enumerate()
                .all(|(i, ch)| buf[(x + i as u16, y)].symbol() == ch.to_string())
        })
    }

    #[test]
    fn test_renders_display_names_and_percentages() {
        let theme = theme();
        let concepts = vec![
            ConceptScore {
                concept: "linear_equations".to_string(),
                probability: 0.7555,
                difficulty: None,
            },
            ConceptScore {
                concept: "basic_arithmetic".to_string(),
                probability: 0.2445,
                difficulty: None,
            },
        ];
        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        ConceptList::new(&concepts, &theme).render(area, &mut buf);

        let first = row_text(&buf, 1);
        assert!(first.contains("linear equations"), "{first}");
        assert!(first.contains("75.6%"), "{first}");
        let second = row_text(&buf, 2);
        assert!(second.contains("basic arithmetic"), "{second}");
        assert!(second.contains("24.5%"), "{second}");
    }

    #[test]
    fn test_percent_is_tier_colored() {
        let theme = theme();
        let concepts = vec![ConceptScore {
            concept: "integrals".to_string(),
            probability: 0.75,
            difficulty: None,
        }];
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        ConceptList::new(&concepts, &theme).render(area, &mut buf);

        let col = find_col(&buf, 1, "75.0%").unwrap();
        assert_eq!(
            buf[(col, 1)].fg,
            theme.colors.confidence(ConfidenceTier::Mid)
        );
    }

    #[test]
    fn test_empty_list_shows_hint() {
        let theme = theme();
        let area = Rect::new(0, 0, 60, 3);
        let mut buf = Buffer::empty(area);
        ConceptList::new(&[], &theme).render(area, &mut buf);
        assert!(row_text(&buf, 1).contains("Analyze a question"));
    }
}
