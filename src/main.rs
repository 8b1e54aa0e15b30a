use std::error::Error;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use daily_notes::config::{load_config, resolve_log_dir, resolve_notes_dir};
use daily_notes::controller::ViewController;
use daily_notes::dates::{date_key, day_heading, month_title, parse_date_key, Clock, SystemClock};
use daily_notes::logging::{default_log_level, init_logging};
use daily_notes::notes::{preview, NoteStore, NOTES_STORAGE_KEY};
use daily_notes::storage::{FileStorage, Storage};
use daily_notes::ui::run_dashboard;

#[derive(Debug, Parser)]
#[command(name = "daily-notes", about = "A month of days, one note per day")]
struct Cli {
	#[arg(long)]
	notes_dir: Option<PathBuf>,
	#[arg(long)]
	log_level: Option<String>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Dashboard,
	Show {
		#[arg(long)]
		day: Option<String>,
	},
	Edit {
		#[arg(long)]
		day: String,
		#[arg(long)]
		text: String,
	},
	Month {
		#[arg(long)]
		month: Option<String>,
	},
	Path,
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	let config = load_config()?;

	let level = cli
		.log_level
		.clone()
		.or_else(|| config.log_level.clone())
		.unwrap_or_else(|| default_log_level().to_string());
	let _logger = match init_logging(&level, &resolve_log_dir(&config)) {
		Ok(handle) => Some(handle),
		Err(err) => {
			eprintln!("warning: logging disabled: {err}");
			None
		}
	};

	let storage = FileStorage::new(resolve_notes_dir(cli.notes_dir, &config));
	let storage_path = storage.path_for(NOTES_STORAGE_KEY)?;
	let mut controller = ViewController::new(NoteStore::new(storage), SystemClock);

	match cli.command.unwrap_or(Command::Dashboard) {
		Command::Dashboard => {
			run_dashboard(&mut controller)?;
		}
		Command::Show { day } => {
			let day = parse_day(day.as_deref(), &SystemClock)?;
			let note = controller.note_for(day);
			println!("{}", day_heading(day));
			if note.is_empty() {
				println!("(no note)");
			} else {
				println!("{note}");
			}
		}
		Command::Edit { day, text } => {
			let day = parse_day(Some(&day), &SystemClock)?;
			let key = date_key(&day);
			controller.edit_note(&key, &text)?;
			println!("saved note for {key}");
		}
		Command::Month { month } => {
			if let Some(raw) = month.as_deref() {
				controller.goto_date(parse_month(raw)?);
			}
			print_month(&controller);
		}
		Command::Path => {
			println!("{}", storage_path.display());
		}
	}

	Ok(())
}

fn parse_day(input: Option<&str>, clock: &impl Clock) -> Result<NaiveDate, Box<dyn Error>> {
	match input {
		Some(raw) => parse_date_key(raw).ok_or_else(|| format!("invalid day '{raw}', expected YYYY-MM-DD").into()),
		None => Ok(clock.today()),
	}
}

fn parse_month(input: &str) -> Result<NaiveDate, Box<dyn Error>> {
	parse_date_key(&format!("{}-01", input.trim()))
		.ok_or_else(|| format!("invalid month '{input}', expected YYYY-MM").into())
}

fn print_month<S: Storage, C: Clock>(controller: &ViewController<S, C>) {
	println!("{}", month_title(controller.cursor()));
	for day in controller.days_in_month() {
		let note = preview(controller.note_for(day));
		if note.is_empty() {
			println!("{} |", date_key(&day));
		} else {
			println!("{} | {}", date_key(&day), note);
		}
	}
}
