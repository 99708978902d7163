use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Paragraph, Widget};

use crate::analyzer::format::{ChartPoint, percent_ticks};
use crate::ui::layout::pack_hint_lines;
use crate::ui::theme::Theme;

const GUTTER_WIDTH: u16 = 5;
const BAR_GAP: u16 = 1;
const MAX_BAR_WIDTH: u16 = 12;
/// Bars are scaled against 100.0% expressed in tenths.
const FULL_SCALE: u64 = 1000;

pub struct ConceptChart<'a> {
    pub points: &'a [ChartPoint],
    pub theme: &'a Theme,
}

impl<'a> ConceptChart<'a> {
    pub fn new(points: &'a [ChartPoint], theme: &'a Theme) -> Self {
        Self { points, theme }
    }
}

/// Widest bar that lets `count` bars fit in `width` columns.
pub fn bar_width(width: u16, count: usize) -> u16 {
    if count == 0 {
        return 0;
    }
    let count = count as u16;
    let gaps = BAR_GAP.saturating_mul(count.saturating_sub(1));
    (width.saturating_sub(gaps) / count).clamp(1, MAX_BAR_WIDTH)
}

/// When any name is wider than its bar, bars are labelled `1..n` and the
/// full names move to a legend. Returns the bar labels and legend entries.
pub fn bar_labels(points: &[ChartPoint], width: u16) -> (Vec<String>, Vec<String>) {
    let fits = points
        .iter()
        .all(|p| p.label.chars().count() <= width as usize);
    if fits {
        return (points.iter().map(|p| p.label.clone()).collect(), Vec::new());
    }
    points
        .iter()
        .enumerate()
        .map(|(i, p)| ((i + 1).to_string(), format!("{} {}", i + 1, p.label)))
        .unzip()
}

/// Row (relative to the top of the bar area) for a tick at `fraction`.
fn tick_row(fraction: f64, bar_rows: u16) -> u16 {
    let span = bar_rows.saturating_sub(1) as f64;
    bar_rows.saturating_sub(1) - (fraction * span).round() as u16
}

impl Widget for ConceptChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Concept Probabilities ")
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.points.is_empty() || inner.height < 3 || inner.width <= GUTTER_WIDTH {
            return;
        }

        let width = bar_width(inner.width - GUTTER_WIDTH, self.points.len());
        let (labels, legend) = bar_labels(self.points, width);
        let entries: Vec<&str> = legend.iter().map(String::as_str).collect();
        let mut legend_lines = pack_hint_lines(&entries, inner.width as usize);
        legend_lines.truncate(inner.height.saturating_sub(3) as usize);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(legend_lines.len() as u16),
            ])
            .split(inner);

        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(GUTTER_WIDTH), Constraint::Min(1)])
            .split(rows[0]);
        let (gutter, plot) = (split[0], split[1]);

        // Last row of the plot carries the category labels.
        let bar_rows = plot.height - 1;
        let steps = if bar_rows >= 9 { 4 } else { 2 };
        for (fraction, label) in percent_ticks(steps) {
            let y = gutter.y + tick_row(fraction, bar_rows);
            let x = gutter.x + gutter.width.saturating_sub(label.len() as u16 + 1);
            buf.set_string(x, y, &label, Style::default().fg(colors.text_pending()));
        }

        let bars: Vec<Bar> = self
            .points
            .iter()
            .zip(labels)
            .map(|(point, label)| {
                let color = colors.confidence(point.tier);
                Bar::default()
                    .value(point.value)
                    .text_value(point.value_text.clone())
                    .label(Line::from(label))
                    .style(Style::default().fg(color))
                    .value_style(
                        Style::default()
                            .fg(colors.bg())
                            .bg(color)
                            .add_modifier(Modifier::BOLD),
                    )
            })
            .collect();

        if !legend_lines.is_empty() {
            let style = Style::default().fg(colors.fg());
            let lines: Vec<Line> = legend_lines
                .into_iter()
                .map(|l| Line::from(Span::styled(l, style)))
                .collect();
            Paragraph::new(lines).render(rows[1], buf);
        }

        BarChart::default()
            .data(BarGroup::default().bars(&bars))
            .bar_width(width)
            .bar_gap(BAR_GAP)
            .max(FULL_SCALE)
            .label_style(Style::default().fg(colors.fg()))
            .render(plot, buf);
    }
}
