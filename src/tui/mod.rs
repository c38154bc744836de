//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing a model, currency,
//! stroke and quantity, a checkbox grid for the twelve configurable
//! options, and renders the live quotation with its itemized cost
//! breakdown.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::pipeline::{QuoteRun, quote_from_catalog};
use crate::cli::QuoteArgs;
use crate::data::rates::RateResolver;
use crate::domain::{Currency, OPTION_COUNT, OptionKey, OptionSelection, QuoteConfig};
use crate::error::AppError;
use crate::io::catalog::Catalog;
use crate::report::{fmt_kg, fmt_line_item, fmt_money, fmt_rate, origin_label};

/// Settings rows above the option grid: model, currency, stroke, qty.
const SETTING_ROWS: usize = 4;
const TOTAL_ROWS: usize = SETTING_ROWS + OPTION_COUNT;

/// Stroke adjustment step in millimeters.
const STROKE_STEP: u32 = 50;

/// Start the TUI.
pub fn run(args: QuoteArgs) -> Result<(), AppError> {
    // Load the catalog (and run the picker, if needed) before switching
    // the terminal into raw mode.
    let (path, catalog) = crate::app::load_catalog_interactive(&args.file)?;
    let resolver = if args.offline {
        RateResolver::offline()
    } else {
        RateResolver::live()
    };

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(args, path, catalog, resolver)?;
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    catalog_path: PathBuf,
    catalog: Catalog,
    resolver: RateResolver,
    model_idx: usize,
    currency: Currency,
    stroke_mm: u32,
    quantity: u32,
    options: OptionSelection,
    offline: bool,
    selected_row: usize,
    status: String,
    run: Option<QuoteRun>,
}

impl App {
    fn new(
        args: QuoteArgs,
        catalog_path: PathBuf,
        catalog: Catalog,
        resolver: RateResolver,
    ) -> Result<Self, AppError> {
        let model_idx = match &args.model {
            Some(model) => catalog
                .entries
                .iter()
                .position(|e| e.model == *model)
                .ok_or_else(|| {
                    AppError::new(3, format!("Model '{model}' not found in the catalog."))
                })?,
            None => 0,
        };

        let mut app = Self {
            catalog_path,
            catalog,
            resolver,
            model_idx,
            currency: args.currency,
            stroke_mm: args.stroke,
            quantity: args.qty,
            options: args.options(),
            offline: args.offline,
            selected_row: 0,
            status: "Ready.".to_string(),
            run: None,
        };
        app.recompute();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                if self.selected_row > 0 {
                    self.selected_row -= 1;
                }
            }
            KeyCode::Down => {
                if self.selected_row < TOTAL_ROWS - 1 {
                    self.selected_row += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(key) = self.selected_option() {
                    self.options.toggle(key);
                    self.recompute();
                    let state = if self.options.is_selected(key) { "on" } else { "off" };
                    self.status = format!("{}: {state}", key.short_name());
                }
            }
            KeyCode::Char('r') => {
                self.recompute();
                if let Some(run) = &self.run {
                    self.status = format!(
                        "Rate for {}: {} ({})",
                        run.currency.code(),
                        fmt_rate(run.rate.multiplier),
                        origin_label(run.rate.origin)
                    );
                }
            }
            _ => {}
        }

        false
    }

    fn selected_option(&self) -> Option<OptionKey> {
        self.selected_row
            .checked_sub(SETTING_ROWS)
            .map(|idx| OptionKey::ALL[idx])
    }

    fn adjust_field(&mut self, delta: i32) {
        match self.selected_row {
            0 => {
                let n = self.catalog.len();
                self.model_idx = if delta >= 0 {
                    (self.model_idx + 1) % n
                } else {
                    (self.model_idx + n - 1) % n
                };
                self.recompute();
                self.status = format!("model: {}", self.current_model());
            }
            1 => {
                self.currency = if delta >= 0 {
                    self.currency.next()
                } else {
                    self.currency.prev()
                };
                self.recompute();
                self.status = format!("currency: {}", self.currency.code());
            }
            2 => {
                self.stroke_mm = if delta >= 0 {
                    self.stroke_mm.saturating_add(STROKE_STEP)
                } else {
                    self.stroke_mm.saturating_sub(STROKE_STEP)
                };
                self.recompute();
                self.status = format!("stroke: {}mm", self.stroke_mm);
            }
            3 => {
                self.quantity = if delta >= 0 {
                    self.quantity.saturating_add(1)
                } else {
                    self.quantity.saturating_sub(1).max(1)
                };
                self.recompute();
                self.status = format!("qty: {}", self.quantity);
            }
            _ => {}
        }
    }

    fn current_model(&self) -> &str {
        &self.catalog.entries[self.model_idx].model
    }

    fn recompute(&mut self) {
        let config = QuoteConfig {
            catalog_path: self.catalog_path.clone(),
            model: self.current_model().to_string(),
            currency: self.currency,
            stroke_mm: self.stroke_mm,
            quantity: self.quantity,
            options: self.options,
            offline: self.offline,
        };

        match quote_from_catalog(&self.catalog, &self.resolver, &config) {
            Ok(run) => self.run = Some(run),
            Err(err) => {
                self.run = None;
                self.status = format!("Quote failed: {err}");
            }
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("sq", Style::default().fg(Color::Cyan)),
            Span::raw(" — 智能报价 (Smart Quote)"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "model: {} | currency: {} | stroke: {}mm | qty: {} | options: {}",
                self.current_model(),
                self.currency.code(),
                self.stroke_mm,
                self.quantity,
                self.options.count(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(46), Constraint::Min(0)])
            .split(area);

        self.draw_controls(frame, chunks[0]);
        self.draw_quote(frame, chunks[1]);
    }

    fn draw_controls(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0)])
            .split(area);

        let settings = [
            format!("Model: {}", self.current_model()),
            format!("Currency: {}", self.currency.code()),
            format!("Stroke: {} mm", self.stroke_mm),
            format!("Qty: {}", self.quantity),
        ];
        let items: Vec<ListItem> = settings.iter().map(|s| ListItem::new(s.clone())).collect();
        let list = List::new(items)
            .block(Block::default().title("参数 (Settings)").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");
        let mut state = ListState::default();
        if self.selected_row < SETTING_ROWS {
            state.select(Some(self.selected_row));
        }
        frame.render_stateful_widget(list, chunks[0], &mut state);

        self.draw_options(frame, chunks[1]);
    }

    /// Option checkboxes in two columns: mechanical options on the
    /// left, electronics and controllers on the right.
    fn draw_options(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("选配 (Options)").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(inner);

        let half = OPTION_COUNT / 2;
        for (col, column_area) in columns.iter().enumerate() {
            let keys = &OptionKey::ALL[col * half..(col + 1) * half];
            let items: Vec<ListItem> = keys
                .iter()
                .map(|key| {
                    let mark = if self.options.is_selected(*key) { "[x]" } else { "[ ]" };
                    ListItem::new(format!("{mark} {}", key.display_name()))
                })
                .collect();

            let list = List::new(items)
                .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
                .highlight_symbol("» ");

            let mut state = ListState::default();
            if let Some(opt_idx) = self.selected_row.checked_sub(SETTING_ROWS)
                && opt_idx / half == col
            {
                state.select(Some(opt_idx % half));
            }
            frame.render_stateful_widget(list, *column_area, &mut state);
        }
    }

    fn draw_quote(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9),
                Constraint::Min(0),
                Constraint::Length(6),
            ])
            .split(area);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No quotation available.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default().title("报价 (Quotation)").borders(Borders::ALL));
            frame.render_widget(msg, area);
            return;
        };

        let code = run.currency.code();
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from("单价 (Unit Price)"));
        lines.push(Line::from(Span::styled(
            format!("  {} {code}", fmt_money(run.unit_price)),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "  ≈ {} CNY (汇率: {}, {})",
                fmt_money(f64::from(run.quote.total_cny)),
                fmt_rate(run.rate.multiplier),
                origin_label(run.rate.origin),
            ),
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(format!("总价 (Total Price) - {} Pcs", run.quantity)));
        lines.push(Line::from(Span::styled(
            format!("  {} {code}", fmt_money(run.total_price)),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!(
                "重量预估: 单个净重 {} kg | 总净重 {} kg",
                fmt_kg(run.weight.single_kg),
                fmt_kg(run.weight.batch_kg),
            ),
            Style::default().fg(Color::Green),
        )));

        let card = Paragraph::new(Text::from(lines))
            .block(Block::default().title("报价 (Quotation)").borders(Borders::ALL));
        frame.render_widget(card, chunks[0]);

        let mut breakdown: Vec<ListItem> = run
            .quote
            .items
            .iter()
            .map(|item| ListItem::new(format!("• {}", fmt_line_item(item))))
            .collect();
        for warning in &run.warnings {
            breakdown.push(ListItem::new(Span::styled(
                format!("! {warning}"),
                Style::default().fg(Color::Yellow),
            )));
        }
        let list = List::new(breakdown).block(
            Block::default()
                .title("费用明细 (Cost Breakdown)")
                .borders(Borders::ALL),
        );
        frame.render_widget(list, chunks[1]);

        let desc = run.description.as_deref().unwrap_or("(no description)");
        let desc_widget = Paragraph::new(desc)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Gray))
            .block(
                Block::default()
                    .title("产品描述 (Description)")
                    .borders(Borders::ALL),
            );
        frame.render_widget(desc_widget, chunks[2]);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Space toggle  r rate  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}
