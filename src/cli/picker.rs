//! Interactive CSV picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `folio --pick` and choose the exports" UX
//!
//! The picker searches for `*.csv` files under the current working directory
//! and asks once per upload slot.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::domain::FileSlot;
use crate::error::AppError;

/// Default directory recursion depth for finding CSV files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Prompt for a CSV file for each of `slots`, in order.
///
/// Behavior per slot:
/// - list discovered `*.csv` files (once, before the first prompt)
/// - accept either a number (from the list) or an explicit path
/// - an empty line skips the slot
/// - `q` cancels
pub fn prompt_for_slots(slots: &[FileSlot]) -> Result<Vec<(FileSlot, PathBuf)>, AppError> {
    let files = discover_csv_files();
    if files.is_empty() {
        return Err(AppError::usage(
            "No .csv files found. Pass files with `folio upload --account <file.csv>`.",
        ));
    }

    println!("Found {} CSV file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut picked = Vec::new();
    for &slot in slots {
        if let Some(path) = prompt_for_slot(slot, &files, &mut input)? {
            picked.push((slot, path));
        }
    }
    Ok(picked)
}

fn prompt_for_slot(slot: FileSlot, files: &[PathBuf], input: &mut impl BufRead) -> Result<Option<PathBuf>, AppError> {
    loop {
        print!(
            "{} file: number (1-{}), path, empty to skip, q to quit: ",
            slot.display_name(),
            files.len()
        );
        io::stdout()
            .flush()
            .map_err(|e| AppError::usage(format!("Failed to write prompt: {e}")))?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::usage(format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::usage(
                "No input received. Pass files with `folio upload --account <file.csv>`.",
            ));
        }

        match parse_choice(line.trim(), files) {
            Choice::Skip => return Ok(None),
            Choice::Quit => return Err(AppError::usage("Canceled.")),
            Choice::Path(path) => match validate_csv_path(&path) {
                Ok(path) => return Ok(Some(path)),
                Err(err) => println!("{err}"),
            },
            Choice::OutOfRange(n) => {
                println!("Invalid choice: {n}. Enter a number between 1 and {}.", files.len());
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Choice {
    Skip,
    Quit,
    Path(PathBuf),
    OutOfRange(usize),
}

fn parse_choice(input: &str, files: &[PathBuf]) -> Choice {
    if input.is_empty() {
        return Choice::Skip;
    }
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    if let Ok(n) = input.parse::<usize>() {
        return match n.checked_sub(1).and_then(|idx| files.get(idx)) {
            Some(path) => Choice::Path(path.clone()),
            None => Choice::OutOfRange(n),
        };
    }
    Choice::Path(PathBuf::from(input))
}

/// Validate the provided path points to a `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::usage(format!("CSV file not found: {}", path.display())));
    }
    if path.is_dir() {
        return Err(AppError::usage(format!(
            "Expected a file, got a directory: {}",
            path.display()
        )));
    }
    if !has_csv_extension(path) {
        return Err(AppError::usage(format!(
            "Expected a .csv file (got: {}).",
            path.display()
        )));
    }

    Ok(path.to_path_buf())
}

/// Discover `*.csv` files under the current directory (deterministic order).
pub fn discover_csv_files() -> Vec<PathBuf> {
    find_csv_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_csv_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_csv_files_inner(root, 0, max_depth, &mut out);
    out.sort_by(|a, b| pretty_path(a).cmp(&pretty_path(b)));
    out
}

fn find_csv_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };

        if file_type.is_dir() {
            if !should_skip_dir(&path) {
                find_csv_files_inner(&path, depth + 1, max_depth, out);
            }
        } else if file_type.is_file() && has_csv_extension(&path) {
            out.push(path);
        }
    }
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}
