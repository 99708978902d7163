use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{error, info, warn};

use mathprep::analyzer::format::{chart_points, display_name, format_percent};
use mathprep::app::{App, AppScreen};
use mathprep::config::Config;
use mathprep::event::{AppEvent, EventHandler};
use mathprep::logging;
use mathprep::practice::adapter::load_questions;
use mathprep::service::client::{Endpoint, HttpConceptService};
use mathprep::service::worker::RequestWorker;
use mathprep::ui::components::concept_chart::ConceptChart;
use mathprep::ui::components::concept_list::ConceptList;
use mathprep::ui::components::practice_sheet::PracticeSheet;
use mathprep::ui::components::test_transcript::TestTranscript;
use mathprep::ui::layout::{AnalyzerLayout, centered_rect, pack_hint_lines};
use mathprep::ui::line_input::{InputResult, LineInput};
use mathprep::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "mathprep",
    version,
    about = "Terminal math tutor: question concept analysis and practice tests"
)]
struct Cli {
    #[arg(short = 'u', long, help = "Base URL of the concept service")]
    service_url: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Show service failures in the status line")]
    show_errors: bool,

    #[arg(long, value_name = "PATH", help = "Write logs to this file")]
    log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Open a JSON list of {question, correctAnswer} for practice"
    )]
    practice: Option<PathBuf>,

    #[arg(long, help = "Write the effective config to the config file and exit")]
    init_config: bool,

    #[arg(long, help = "List bundled themes and exit")]
    list_themes: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_themes {
        for name in Theme::available_themes() {
            println!("{name}");
        }
        return Ok(());
    }

    let mut config = Config::load().context("loading config")?;
    if let Some(url) = cli.service_url {
        config.service_url = url;
        config.normalize_service_url();
    }
    if let Some(theme_name) = cli.theme {
        config.theme = theme_name;
    }
    if cli.show_errors {
        config.show_errors = true;
    }
    if let Some(path) = cli.log_file {
        config.log_file = Some(path.display().to_string());
    }

    if cli.init_config {
        let path = Config::config_path();
        config.save_to(&path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    if let Err(err) = logging::init(&config.log_path()) {
        eprintln!("Logging disabled: {err:#}");
    }
    info!(service_url = %config.service_url, "starting mathprep");

    let practice = match cli.practice.as_deref() {
        Some(path) => Some(load_questions(path)?),
        None => None,
    };

    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        warn!(theme = %config.theme, "unknown theme, using default");
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));

    let service = HttpConceptService::new(&config.service_url, config.request_timeout())
        .context("building HTTP client")?;

    let mut app = App::new(config, theme);
    if let Some(questions) = practice {
        app.open_practice(questions);
    }

    let events = EventHandler::new(Duration::from_millis(100));
    let worker = RequestWorker::spawn(service, events.sender())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &events, &worker);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!("{err:#}");
        eprintln!("Error: {err:?}");
    }
    info!("exiting");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    worker: &RequestWorker,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Service(reply) => {
                app.handle_reply(reply);
            }
            AppEvent::Tick | AppEvent::Resize(_, _) => {}
        }

        for request in app.take_requests() {
            let ticket = request.ticket();
            if let Err(err) = worker.submit(request) {
                app.request_failed(ticket, &err.to_string());
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Analyzer => handle_analyzer_key(app, key),
        AppScreen::Practice => handle_practice_key(app, key),
    }
}

fn handle_analyzer_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('g') if ctrl => {
            app.request_test();
        }
        KeyCode::Char('p') if ctrl => {
            app.open_practice_from_test();
        }
        KeyCode::Char('r') if ctrl => app.reset_analyzer(),
        KeyCode::Tab => {
            app.resume_practice();
        }
        KeyCode::PageDown => app.scroll_transcript_down(),
        KeyCode::PageUp => app.scroll_transcript_up(),
        _ => {
            if app.analyzer.input.handle(key) == InputResult::Submit {
                app.submit_question();
            }
        }
    }
}

fn handle_practice_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.go_to_analyzer(),
        KeyCode::Up | KeyCode::BackTab => app.practice_prev(),
        KeyCode::Down | KeyCode::Tab => app.practice_next(),
        KeyCode::Char('t') if ctrl => app.practice_toggle_reveal(),
        _ => {
            if app.practice_edit(key) == InputResult::Submit {
                app.practice_next();
            }
        }
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Analyzer => render_analyzer(frame, app),
        AppScreen::Practice => render_practice(frame, app),
    }
}

fn render_header(frame: &mut ratatui::Frame, app: &App, area: Rect, title: &str) {
    let colors = &app.theme.colors;
    let info = format!(" {title} | {}", app.config.service_url);
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " mathprep ",
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            info,
            Style::default()
                .fg(colors.text_pending())
                .bg(colors.header_bg()),
        ),
    ]))
    .style(Style::default().bg(colors.header_bg()));
    frame.render_widget(header, area);
}

fn render_footer(frame: &mut ratatui::Frame, app: &App, lines: Vec<String>, area: Rect) {
    let style = Style::default().fg(app.theme.colors.text_pending());
    let lines: Vec<Line> = lines
        .into_iter()
        .map(|l| Line::from(Span::styled(l, style)))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_analyzer(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let analyzer = &app.analyzer;

    let mut hints = vec![
        "[Enter] Analyze",
        "[Ctrl+G] Generate test",
        "[Ctrl+P] Practise test",
        "[PgUp/PgDn] Scroll test",
        "[Ctrl+R] Reset",
    ];
    if app.practice.is_some() {
        hints.push("[Tab] Resume practice");
    }
    hints.push("[Esc] Quit");
    let footer_lines = pack_hint_lines(&hints, area.width as usize);
    let layout = AnalyzerLayout::new(area, footer_lines.len() as u16);

    render_header(frame, app, layout.header, "Question Analyzer");
    render_question_input(frame, app, layout.input);
    frame.render_widget(Paragraph::new(status_line(app)), layout.status);

    let concepts = analyzer
        .analysis
        .as_ref()
        .map(|a| a.related_concepts.as_slice())
        .unwrap_or(&[]);
    frame.render_widget(ConceptList::new(concepts, app.theme), layout.concepts);

    let points = analyzer
        .analysis
        .as_ref()
        .map(chart_points)
        .unwrap_or_default();
    frame.render_widget(ConceptChart::new(&points, app.theme), layout.chart);

    let transcript = TestTranscript::new(analyzer.current_test.as_ref(), app.theme)
        .scroll(app.transcript_scroll);
    frame.render_widget(transcript, layout.transcript);

    render_footer(frame, app, footer_lines, layout.footer);
}

fn render_question_input(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let colors = &app.theme.colors;
    let border = if app.analyzer.loading {
        colors.border()
    } else {
        colors.border_focused()
    };
    let block = Block::bordered()
        .title(" Question ")
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(colors.bg()));

    let line = input_line(&app.analyzer.input, app, "Type a math question, e.g. Solve 2x + 3 = 7");
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn input_line<'a>(input: &'a LineInput, app: &App, placeholder: &'a str) -> Line<'a> {
    let colors = &app.theme.colors;
    let cursor_style = Style::default().fg(colors.cursor_fg()).bg(colors.cursor_bg());

    if input.is_empty() {
        return Line::from(vec![
            Span::styled(" ", cursor_style),
            Span::styled(format!(" {placeholder}"), Style::default().fg(colors.text_pending())),
        ]);
    }

    let (before, cursor_ch, after) = input.render_parts();
    let text_style = Style::default().fg(colors.fg());
    let mut spans = vec![Span::styled(before, text_style)];
    match cursor_ch {
        Some(ch) => {
            spans.push(Span::styled(ch.to_string(), cursor_style));
            spans.push(Span::styled(after, text_style));
        }
        None => spans.push(Span::styled(" ", cursor_style)),
    }
    Line::from(spans)
}

fn status_line(app: &App) -> Line<'static> {
    let colors = &app.theme.colors;
    let analyzer = &app.analyzer;

    if let Some(endpoint) = analyzer.pending_endpoint() {
        let text = match endpoint {
            Endpoint::Analyze => " Analyzing question...",
            Endpoint::GenerateTest => " Generating test...",
        };
        return Line::from(Span::styled(text, Style::default().fg(colors.accent())));
    }

    if app.config.show_errors
        && let Some(failure) = &analyzer.last_failure
    {
        return Line::from(Span::styled(
            format!(" {}", failure.status_text()),
            Style::default().fg(colors.error()),
        ));
    }

    if let Some(analysis) = &analyzer.analysis
        && let Some(main) = &analysis.main_concept
    {
        let mut text = format!(" Main concept: {}", display_name(main));
        if let Some(confidence) = analysis.confidence {
            text.push_str(&format!(" ({})", format_percent(confidence)));
        }
        if !analysis.prerequisites.is_empty() {
            let prerequisites: Vec<String> =
                analysis.prerequisites.iter().map(|p| display_name(p)).collect();
            text.push_str(&format!("  Prerequisites: {}", prerequisites.join(", ")));
        }
        return Line::from(Span::styled(text, Style::default().fg(colors.text_pending())));
    }

    Line::default()
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let hints = [
        "[↑/↓] Select",
        "[Enter] Next",
        "[Ctrl+T] Show/hide answer",
        "[Esc] Back",
    ];
    let footer_lines = pack_hint_lines(&hints, area.width as usize);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(footer_lines.len().max(1) as u16),
        ])
        .split(area);

    render_header(frame, app, layout[0], "Practice");
    if let Some(session) = app.practice.as_ref() {
        let sheet = PracticeSheet::new(session, &app.answer_input, app.theme);
        frame.render_widget(sheet, centered_rect(80, 100, layout[1]));
    }
    render_footer(frame, app, footer_lines, layout[2]);
}
