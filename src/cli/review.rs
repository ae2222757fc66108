use std::path::PathBuf;

use colored::Colorize;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{LineGauge, Paragraph},
    Frame,
};

use crate::context::{
    day_context, CalendarSource, DayContext, LocationSource, NoCalendar, NoLocations, NoPhotos,
    PhotoSource, TimelineFile,
};
use crate::error::Result;
use crate::models::Category;
use crate::session::ReviewSession;
use crate::store::save_store;
use crate::tui::{euro_span, wrap_text, FOOTER_STYLE};

enum ReviewState {
    PickCategory,
    ConfirmSplit,
    ChooseScope,
}

struct SessionReviewer {
    session: ReviewSession,
    store_path: PathBuf,
    calendar: Box<dyn CalendarSource>,
    photos: Box<dyn PhotoSource>,
    locations: Box<dyn LocationSource>,
    context: DayContext,
    similar_count: usize,
    state: ReviewState,
    cat_query: String,
    cat_selection: usize,
    selected_category: Option<Category>,
    split_value: bool,
    scope_all: bool,
}

impl SessionReviewer {
    fn new(
        session: ReviewSession,
        store_path: PathBuf,
        calendar: Box<dyn CalendarSource>,
        photos: Box<dyn PhotoSource>,
        locations: Box<dyn LocationSource>,
    ) -> Self {
        let mut reviewer = Self {
            session,
            store_path,
            calendar,
            photos,
            locations,
            context: DayContext::default(),
            similar_count: 0,
            state: ReviewState::PickCategory,
            cat_query: String::new(),
            cat_selection: 0,
            selected_category: None,
            split_value: false,
            scope_all: false,
        };
        reviewer.refresh();
        reviewer
    }

    fn refresh(&mut self) {
        let Some(txn) = self.session.selected() else {
            self.context = DayContext::default();
            self.similar_count = 0;
            return;
        };
        let date = txn.actual_date.date();
        self.similar_count = self.session.similar().len();
        self.context = day_context(date, &*self.calendar, &*self.photos, &*self.locations);
    }

    fn reset(&mut self) {
        self.state = ReviewState::PickCategory;
        self.cat_query.clear();
        self.cat_selection = 0;
        self.selected_category = None;
        self.split_value = false;
        self.scope_all = false;
    }

    fn filtered_categories(&self) -> Vec<Category> {
        if self.cat_query.is_empty() {
            return vec![];
        }
        let q = self.cat_query.to_lowercase();
        Category::ALL
            .into_iter()
            .filter(|c| c.name().to_lowercase().contains(&q))
            .take(9)
            .collect()
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let Some(txn) = self.session.selected() else {
            return;
        };
        let total = self.session.len();
        let reviewed = total - self.session.remaining();

        // Category chart dimensions
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.name()).collect();
        let col_width = labels.iter().map(|l| l.len()).max().unwrap_or(16) + 2;
        let cols = (area.width as usize / col_width).max(1);
        let rows = (labels.len() + cols - 1) / cols;
        let chart_rows = rows as u16 + 1;

        let (description, desc_lines) = wrap_text(&txn.description, area.width.saturating_sub(16) as usize);

        let [chart_area, progress_area, detail_area, context_area, interaction_area, hints_area] =
            Layout::vertical([
                Constraint::Length(chart_rows),
                Constraint::Length(1),
                Constraint::Length(8 + desc_lines),
                Constraint::Fill(1),
                Constraint::Length(11),
                Constraint::Length(1),
            ])
            .areas(area);

        // Category chart
        let mut chart_lines: Vec<Line> = vec![Line::from(Span::styled(
            "Categories",
            Style::default().fg(Color::DarkGray),
        ))];
        for row in 0..rows {
            let mut spans = Vec::new();
            for col in 0..cols {
                let idx = col * rows + row;
                if let Some(label) = labels.get(idx) {
                    spans.push(Span::styled(
                        format!("{:<width$}", label, width = col_width),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            chart_lines.push(Line::from(spans));
        }
        frame.render_widget(Paragraph::new(chart_lines), chart_area);

        // Progress
        let ratio = if total > 0 {
            reviewed as f64 / total as f64
        } else {
            1.0
        };
        let gauge = LineGauge::default()
            .label(format!("{reviewed} of {total} categorized"))
            .ratio(ratio)
            .filled_style(Style::default().fg(Color::Green).bold())
            .unfilled_style(Style::default().fg(Color::DarkGray))
            .line_set(ratatui::symbols::line::THICK);
        frame.render_widget(gauge, progress_area);

        // Transaction details
        let mut detail_lines = vec![
            Line::from(""),
            Line::from(format!(
                "  Date:        {}",
                txn.actual_date.format("%a %d %b %Y %H:%M")
            )),
        ];
        for (i, line) in description.lines().enumerate() {
            let prefix = if i == 0 { "  Description: " } else { "               " };
            detail_lines.push(Line::from(format!("{prefix}{line}")));
        }
        detail_lines.push(Line::from(vec![
            Span::raw("  Amount:      "),
            euro_span(txn.amount),
        ]));
        if let Some(name) = &txn.counterparty_name {
            detail_lines.push(Line::from(format!("  Counterparty: {name}")));
        }
        if let Some(reference) = txn.structured_ref.as_ref().or(txn.free_ref.as_ref()) {
            detail_lines.push(Line::from(format!("  Reference:   {reference}")));
        }
        detail_lines.push(Line::from(format!(
            "  Balance:     {}",
            crate::fmt::euro(txn.balance)
        )));
        detail_lines.push(Line::from(format!(
            "  Category:    {}{}",
            txn.category,
            if txn.split { " (split)" } else { "" }
        )));
        frame.render_widget(Paragraph::new(detail_lines), detail_area);

        // Day context and similar transactions
        let mut context_lines: Vec<Line> = Vec::new();
        if !self.context.events.is_empty() {
            context_lines.push(Line::from(Span::styled(
                "  Calendar that day",
                Style::default().fg(Color::Cyan),
            )));
            for event in self.context.events.iter().take(3) {
                context_lines.push(Line::from(format!(
                    "    {} {}",
                    event.time.format("%H:%M"),
                    event.title
                )));
            }
        }
        if !self.context.photos.is_empty() {
            context_lines.push(Line::from(format!(
                "  Photos that day: {}",
                self.context.photos.len()
            )));
        }
        if !self.context.fixes.is_empty() {
            let first = &self.context.fixes[0];
            context_lines.push(Line::from(format!(
                "  Location fixes:  {} (first at {:.5}, {:.5})",
                self.context.fixes.len(),
                first.lat,
                first.lon
            )));
        }
        let similar = self.session.similar();
        if !similar.is_empty() {
            context_lines.push(Line::from(Span::styled(
                format!("  Similar transactions ({})", similar.len()),
                Style::default().fg(Color::Cyan),
            )));
            for other in similar.iter().take(4) {
                context_lines.push(Line::from(vec![
                    Span::raw(format!(
                        "    {}  ",
                        other.actual_date.format("%Y-%m-%d")
                    )),
                    euro_span(other.amount),
                    Span::raw(format!("  {}", other.category)),
                ]));
            }
        }
        frame.render_widget(Paragraph::new(context_lines), context_area);

        // Interaction area — changes per state
        let interaction_lines: Vec<Line> = match &self.state {
            ReviewState::PickCategory => {
                let matches = self.filtered_categories();
                let mut lines = vec![Line::from(format!(
                    "  Category: {}\u{2588}",
                    self.cat_query
                ))];
                if !self.cat_query.is_empty() && matches.is_empty() {
                    lines.push(Line::from(Span::styled(
                        "    (no matches)",
                        Style::default().fg(Color::DarkGray),
                    )));
                } else {
                    for (i, cat) in matches.iter().enumerate() {
                        let marker = if i == self.cat_selection { ">" } else { " " };
                        lines.push(Line::from(format!("  {marker} {}", cat.name())));
                    }
                }
                lines
            }
            ReviewState::ConfirmSplit => {
                let mut spans = vec![Span::raw("  Split this transaction?  ")];
                spans.extend(yes_no(self.split_value));
                vec![Line::from(spans)]
            }
            ReviewState::ChooseScope => {
                let mut spans = vec![Span::raw(format!(
                    "  Apply to all {} similar transactions too?  ",
                    self.similar_count
                ))];
                spans.extend(yes_no(self.scope_all));
                vec![Line::from(spans)]
            }
        };
        frame.render_widget(Paragraph::new(interaction_lines), interaction_area);

        // Hints
        let hints = match &self.state {
            ReviewState::PickCategory => "Type to filter, Enter=select, Esc=skip, Ctrl+C=quit",
            ReviewState::ConfirmSplit | ReviewState::ChooseScope => {
                "y/n or Left/Right to toggle, Enter=confirm, Ctrl+C=quit"
            }
        };
        frame.render_widget(Paragraph::new(hints).style(FOOTER_STYLE), hints_area);
    }

    fn handle_key(&mut self, code: KeyCode) -> HandleResult {
        match &self.state {
            ReviewState::PickCategory => match code {
                KeyCode::Char(c) => {
                    self.cat_query.push(c);
                    self.cat_selection = 0;
                    HandleResult::Continue
                }
                KeyCode::Backspace => {
                    self.cat_query.pop();
                    self.cat_selection = 0;
                    HandleResult::Continue
                }
                KeyCode::Up => {
                    self.cat_selection = self.cat_selection.saturating_sub(1);
                    HandleResult::Continue
                }
                KeyCode::Down => {
                    let matches = self.filtered_categories();
                    if !matches.is_empty() {
                        self.cat_selection = (self.cat_selection + 1).min(matches.len() - 1);
                    }
                    HandleResult::Continue
                }
                KeyCode::Enter => {
                    let matches = self.filtered_categories();
                    if !matches.is_empty() {
                        let sel = self.cat_selection.min(matches.len() - 1);
                        self.selected_category = Some(matches[sel]);
                        self.split_value = self
                            .session
                            .selected()
                            .map(|t| t.split)
                            .unwrap_or(false);
                        self.state = ReviewState::ConfirmSplit;
                    }
                    HandleResult::Continue
                }
                KeyCode::Esc => HandleResult::Skip,
                _ => HandleResult::Continue,
            },
            ReviewState::ConfirmSplit => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.split_value = true;
                    HandleResult::Continue
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.split_value = false;
                    HandleResult::Continue
                }
                KeyCode::Left | KeyCode::Right => {
                    self.split_value = !self.split_value;
                    HandleResult::Continue
                }
                KeyCode::Enter => {
                    if self.similar_count > 0 {
                        self.scope_all = false;
                        self.state = ReviewState::ChooseScope;
                        HandleResult::Continue
                    } else {
                        HandleResult::Commit
                    }
                }
                _ => HandleResult::Continue,
            },
            ReviewState::ChooseScope => match code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.scope_all = true;
                    HandleResult::Continue
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.scope_all = false;
                    HandleResult::Continue
                }
                KeyCode::Left | KeyCode::Right => {
                    self.scope_all = !self.scope_all;
                    HandleResult::Continue
                }
                KeyCode::Enter => HandleResult::Commit,
                _ => HandleResult::Continue,
            },
        }
    }

    /// Apply the pending decision, persist the store, move on.
    fn commit(&mut self) -> Result<()> {
        let Some(category) = self.selected_category else {
            return Ok(());
        };
        if self.scope_all {
            self.session.assign_to_group(category, self.split_value);
        } else {
            self.session.assign(category, self.split_value);
        }
        save_store(&self.store_path, self.session.transactions())?;
        self.session.advance();
        self.reset();
        self.refresh();
        Ok(())
    }

    fn skip(&mut self) {
        self.session.skip();
        self.reset();
        self.refresh();
    }

    fn is_done(&self) -> bool {
        self.session.selected().is_none()
    }
}

enum HandleResult {
    Continue,
    Commit,
    Skip,
}

fn yes_no(value: bool) -> Vec<Span<'static>> {
    let (yes_style, no_style) = if value {
        (
            Style::default().fg(Color::White).bg(Color::Blue),
            Style::default(),
        )
    } else {
        (
            Style::default(),
            Style::default().fg(Color::White).bg(Color::Blue),
        )
    };
    vec![
        Span::styled(" Yes ", yes_style),
        Span::raw("  "),
        Span::styled(" No ", no_style),
    ]
}

pub fn run() -> Result<()> {
    let (settings, outcome) = super::load_table()?;
    let session = ReviewSession::new(outcome.transactions);
    if session.is_empty() {
        println!("No transactions to review.");
        return Ok(());
    }

    let locations: Box<dyn LocationSource> = if settings.timeline_path().exists() {
        match TimelineFile::open(&settings.timeline_path()) {
            Ok(timeline) => Box::new(timeline),
            Err(e) => {
                eprintln!("{} location history unavailable: {e}", Colorize::yellow("warning:"));
                Box::new(NoLocations)
            }
        }
    } else {
        Box::new(NoLocations)
    };

    let total = session.len();
    println!("{} of {total} transactions still uncategorized", session.remaining());

    let mut reviewer = SessionReviewer::new(
        session,
        settings.store_path(),
        Box::new(NoCalendar),
        Box::new(NoPhotos),
        locations,
    );
    let mut terminal = ratatui::init();

    let result = loop {
        terminal.draw(|frame| reviewer.draw(frame)).unwrap();

        if let Event::Key(key) = event::read().unwrap() {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                break Ok(());
            }

            match reviewer.handle_key(key.code) {
                HandleResult::Continue => {}
                HandleResult::Commit => {
                    if let Err(e) = reviewer.commit() {
                        break Err(e);
                    }
                    if reviewer.is_done() {
                        break Ok(());
                    }
                }
                HandleResult::Skip => {
                    reviewer.skip();
                    if reviewer.is_done() {
                        break Ok(());
                    }
                }
            }
        }
    };

    ratatui::restore();

    match &result {
        Ok(()) => println!("Review complete. Decisions saved to {}", reviewer.store_path.display()),
        Err(e) => eprintln!("Review error: {e}"),
    }
    result
}
