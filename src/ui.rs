use std::error::Error;
use std::io;
use std::time::Duration as StdDuration;

use chrono::{Datelike, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use crate::controller::{Command, ViewController};
use crate::dates::{date_key, day_heading, is_same_calendar_day, is_today, month_title, weekday_label, Clock};
use crate::notes::has_note;
use crate::storage::Storage;

const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const INACTIVE_PANEL_BORDER_COLOR: Color = Color::DarkGray;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);
const TODAY_COLOR: Color = Color::LightBlue;
const NOTE_PLACEHOLDER: &str = "Press Enter to write a note";

pub fn run_dashboard<S: Storage, C: Clock>(controller: &mut ViewController<S, C>) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, controller);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop<S: Storage, C: Clock>(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	controller: &mut ViewController<S, C>,
) -> Result<(), Box<dyn Error>> {
	let mut app = App::default();

	loop {
		let view = build_view(controller);
		app.clamp_selection(&view);
		terminal.draw(|frame| draw_dashboard(frame, &app, &view))?;

		// The frame for the new cursor is on screen; now the section exists.
		if let Some(index) = controller.after_render(&view.day_keys()) {
			app.focus = index;
			continue;
		}

		if event::poll(StdDuration::from_millis(250))? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				if handle_key(&mut app, key.code, controller, &view) {
					break;
				}
			}
		}
	}

	Ok(())
}

fn draw_dashboard(frame: &mut Frame, app: &App, view: &ViewModel) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Length(4), Constraint::Min(6), Constraint::Length(4)])
		.split(frame.area());

	render_header(frame, layout[0], view);
	render_days_panel(frame, layout[1], app, view);
	render_footer(frame, layout[2], app, view);
}

fn render_header(frame: &mut Frame, area: Rect, view: &ViewModel) {
	let mut spans = vec![Span::styled(
		"< [ ",
		Style::default().fg(Color::DarkGray),
	)];
	for (index, cell) in view.week.iter().enumerate() {
		let mut style = Style::default();
		if cell.is_cursor {
			style = style.fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD);
		} else if cell.is_today {
			style = style.fg(TODAY_COLOR).add_modifier(Modifier::BOLD);
		}
		if cell.is_today {
			style = style.add_modifier(Modifier::UNDERLINED);
		}

		spans.push(Span::styled(
			format!(
				"{}:{} {:>2}{}",
				index + 1,
				cell.label,
				cell.date.day(),
				if cell.has_note { "*" } else { " " }
			),
			style,
		));
		spans.push(Span::raw(" "));
	}
	spans.push(Span::styled("] >", Style::default().fg(Color::DarkGray)));

	let lines = vec![
		Line::from(Span::styled(
			view.title.clone(),
			Style::default().add_modifier(Modifier::BOLD),
		)),
		Line::from(spans),
	];
	let header = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Daily Notes"));
	frame.render_widget(header, area);
}

fn render_days_panel(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	let editing_key = match &app.mode {
		InputMode::Editing { key, .. } => Some(key.as_str()),
		InputMode::Normal => None,
	};

	let mut lines = Vec::new();
	let mut section_starts = Vec::with_capacity(view.days.len());
	for (index, row) in view.days.iter().enumerate() {
		section_starts.push(lines.len());

		let mut heading_style = Style::default().add_modifier(Modifier::BOLD);
		if index == app.focus {
			heading_style = heading_style.bg(HIGHLIGHT_BACKGROUND_COLOR).fg(Color::Yellow);
		}
		let mut heading = vec![Span::styled(row.heading.clone(), heading_style)];
		if row.is_today {
			heading.push(Span::styled(" today", Style::default().fg(TODAY_COLOR)));
		}
		lines.push(Line::from(heading));

		let text = match &app.mode {
			InputMode::Editing { key, buffer } if *key == row.key => Some(format!("{buffer}█")),
			_ if !row.has_note => None,
			_ => Some(row.note.clone()),
		};
		match text {
			Some(text) => {
				for line in text.split('\n') {
					lines.push(Line::from(format!("  {line}")));
				}
			}
			None => lines.push(Line::from(Span::styled(
				format!("  {NOTE_PLACEHOLDER}"),
				Style::default().fg(Color::DarkGray),
			))),
		}
		lines.push(Line::from(""));
	}

	let offset = section_starts.get(app.focus).copied().unwrap_or(0);
	let block = Block::default()
		.borders(Borders::ALL)
		.title(format!("{} days", view.days.len()))
		.border_style(border_style(editing_key.is_some()));
	let panel = Paragraph::new(lines)
		.block(block)
		.scroll((u16::try_from(offset).unwrap_or(u16::MAX), 0));
	frame.render_widget(panel, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, view: &ViewModel) {
	let footer_lines = match &app.mode {
		InputMode::Normal => vec![
			Line::from("[/] month | 1-7 week day | t today | j/k move | Enter edit | q quit"),
			Line::from(view.status.clone()),
		],
		InputMode::Editing { key, .. } => vec![
			Line::from(format!("Editing {key} | type to write, saved on every key | Enter newline | Esc done")),
			Line::from(view.status.clone()),
		],
	};

	let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn handle_key<S: Storage, C: Clock>(
	app: &mut App,
	code: KeyCode,
	controller: &mut ViewController<S, C>,
	view: &ViewModel,
) -> bool {
	if code == KeyCode::Esc && matches!(app.mode, InputMode::Editing { .. }) {
		app.mode = InputMode::Normal;
		return false;
	}

	if let InputMode::Editing { key, buffer } = &mut app.mode {
		match code {
			KeyCode::Enter => buffer.push('\n'),
			KeyCode::Backspace => {
				if buffer.pop().is_none() {
					return false;
				}
			}
			KeyCode::Char(value) => buffer.push(value),
			_ => return false,
		}

		controller.dispatch(Command::EditNote {
			key: key.clone(),
			text: buffer.clone(),
		});
		return false;
	}

	match code {
		KeyCode::Char('q') | KeyCode::Esc => true,
		KeyCode::Char('[') | KeyCode::Char('p') | KeyCode::Left | KeyCode::Char('h') => {
			controller.dispatch(Command::PrevMonth);
			app.focus = 0;
			false
		}
		KeyCode::Char(']') | KeyCode::Char('n') | KeyCode::Right | KeyCode::Char('l') => {
			controller.dispatch(Command::NextMonth);
			app.focus = 0;
			false
		}
		KeyCode::Char('t') => {
			controller.dispatch(Command::Today);
			false
		}
		KeyCode::Char(value @ '1'..='7') => {
			let index = value as usize - '1' as usize;
			if let Some(cell) = view.week.get(index) {
				controller.dispatch(Command::SelectWeekDay(cell.date));
			}
			false
		}
		KeyCode::Down | KeyCode::Char('j') => {
			app.move_focus(1, view);
			false
		}
		KeyCode::Up | KeyCode::Char('k') => {
			app.move_focus(-1, view);
			false
		}
		KeyCode::Enter | KeyCode::Char('e') => {
			if let Some(row) = view.days.get(app.focus) {
				app.mode = InputMode::Editing {
					key: row.key.clone(),
					buffer: row.note.clone(),
				};
			}
			false
		}
		_ => false,
	}
}

fn build_view<S: Storage, C: Clock>(controller: &ViewController<S, C>) -> ViewModel {
	let cursor = controller.cursor();
	let clock = controller.clock();
	let notes = controller.notes();

	let days = controller
		.days_in_month()
		.into_iter()
		.map(|date| {
			let key = date_key(&date);
			DayRow {
				heading: day_heading(date),
				note: controller.note_for(date).to_string(),
				is_today: is_today(&date, clock),
				has_note: has_note(notes, &key),
				key,
			}
		})
		.collect::<Vec<_>>();

	let week = controller
		.week_header()
		.into_iter()
		.map(|date| WeekCell {
			label: weekday_label(date),
			is_cursor: is_same_calendar_day(&date, &cursor),
			is_today: is_today(&date, clock),
			has_note: has_note(notes, &date_key(&date)),
			date,
		})
		.collect::<Vec<_>>();

	ViewModel {
		title: month_title(cursor),
		days,
		week,
		status: controller.status().to_string(),
	}
}

fn border_style(focused: bool) -> Style {
	if focused {
		Style::default().fg(FOCUSED_PANEL_BORDER_COLOR)
	} else {
		Style::default().fg(INACTIVE_PANEL_BORDER_COLOR)
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InputMode {
	Normal,
	Editing { key: String, buffer: String },
}

#[derive(Debug, Clone)]
struct App {
	focus: usize,
	mode: InputMode,
}

impl Default for App {
	fn default() -> Self {
		Self {
			focus: 0,
			mode: InputMode::Normal,
		}
	}
}

impl App {
	fn clamp_selection(&mut self, view: &ViewModel) {
		if view.days.is_empty() {
			self.focus = 0;
		} else {
			self.focus = self.focus.min(view.days.len() - 1);
		}
	}

	fn move_focus(&mut self, delta: i32, view: &ViewModel) {
		if view.days.is_empty() {
			self.focus = 0;
			return;
		}

		if delta > 0 {
			self.focus = (self.focus + delta as usize).min(view.days.len() - 1);
		} else {
			self.focus = self.focus.saturating_sub(delta.unsigned_abs() as usize);
		}
	}
}

struct ViewModel {
	title: String,
	days: Vec<DayRow>,
	week: Vec<WeekCell>,
	status: String,
}

impl ViewModel {
	fn day_keys(&self) -> Vec<&str> {
		self.days.iter().map(|row| row.key.as_str()).collect()
	}
}

#[derive(Clone)]
struct DayRow {
	key: String,
	heading: String,
	note: String,
	is_today: bool,
	has_note: bool,
}

#[derive(Clone)]
struct WeekCell {
	date: NaiveDate,
	label: String,
	is_cursor: bool,
	is_today: bool,
	has_note: bool,
}
