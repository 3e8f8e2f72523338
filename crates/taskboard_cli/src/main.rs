//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskboard_core` linkage end to end: store, service and engine.
//! - Print a deterministic week grid for a fixed pivot date.
//! - Route core diagnostics to rolling log files under the temp directory.

use chrono::{NaiveDate, Weekday};
use std::error::Error;
use std::process::ExitCode;
use taskboard_core::db::open_db_in_memory;
use taskboard_core::{
    core_version, default_log_level, init_logging, parse_wall_clock, tooltip_text, RepeatMask,
    SqliteTaskRepository, TaskDraft, TaskService, UserId, ViewGranularity, Viewer,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("taskboard smoke run failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    println!("taskboard_core version={}", core_version());

    let log_path = std::env::temp_dir().join("taskboard-logs");
    let log_dir = log_path
        .to_str()
        .ok_or_else(|| format!("log dir `{}` is not valid UTF-8", log_path.display()))?;
    init_logging(default_log_level(), log_dir)?;
    println!("taskboard logs dir={log_dir}");

    let conn = open_db_in_memory()?;
    let service = TaskService::new(SqliteTaskRepository::new(&conn));
    let employer = Viewer::employer(UserId::new("employer-demo"));
    let helper = Viewer::helper(UserId::new("helper-demo"), employer.user_id.clone());

    let instant = |text: &str| parse_wall_clock(text).ok_or(format!("bad instant `{text}`"));
    let mut weekly = TaskDraft::new(
        "Water the plants",
        instant("2024-03-04T09:00")?,
        instant("2024-03-04T09:20")?,
    );
    weekly.repeat_mask = RepeatMask::from_weekdays([Weekday::Mon, Weekday::Thu]);
    weekly.assigned_to = Some(helper.user_id.clone());
    weekly.description = "Use the **blue** can".to_string();
    service.create_task(&employer, weekly)?;

    let mut once = TaskDraft::new(
        "Pick up dry cleaning",
        instant("2024-03-05T14:10")?,
        instant("2024-03-05T15:00")?,
    );
    once.assigned_to = Some(helper.user_id.clone());
    service.create_task(&employer, once)?;

    let pivot = NaiveDate::from_ymd_opt(2024, 3, 6).ok_or("bad pivot")?;
    let board = service.load_board(&helper, ViewGranularity::Week, pivot)?;
    for ((date, slot), cell) in board.slot_grid() {
        for (stack_index, occurrence) in cell.iter().enumerate() {
            println!(
                "{date} {slot} #{stack_index} [{}] {} ({})",
                if occurrence.is_done { "x" } else { " " },
                occurrence.task.title,
                tooltip_text(occurrence.task)
            );
        }
    }

    Ok(())
}
