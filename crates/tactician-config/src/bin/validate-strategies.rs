//! Strategy catalog validation CLI tool
//!
//! Validates a tactician `strategies.json` and reports any errors.

use std::path::PathBuf;
use std::process::ExitCode;
use tactician_api::StopMode;
use tactician_util::{DataPaths, default_data_dir};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let catalog_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = DataPaths::new(default_data_dir()).strategies;
            eprintln!("Usage: validate-strategies [strategies-file]");
            eprintln!();
            eprintln!("Validates a tactician strategy catalog.");
            eprintln!();
            eprintln!("Example:");
            eprintln!("  validate-strategies {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    // Loading would create a default catalog, which is not what a validator should do
    if !catalog_path.exists() {
        eprintln!("Error: Strategy file not found: {}", catalog_path.display());
        return ExitCode::from(1);
    }

    let content = match std::fs::read_to_string(&catalog_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read file: {}", e);
            return ExitCode::from(1);
        }
    };

    match tactician_config::parse_strategies(&content) {
        Ok(catalog) => {
            println!("✓ Strategy catalog is valid");
            println!();
            println!("Strategies ({}):", catalog.len());
            for strategy in catalog.iter() {
                let stop = match strategy.stop_mode {
                    StopMode::PuzzleCount => format!("{} puzzles", strategy.puzzles_per_day),
                    StopMode::TargetRating => format!("rating {}", strategy.target_rating),
                };
                println!(
                    "  - {}: stop at {}, time mode {}, submit mode {}",
                    strategy.name, stop, strategy.time_mode, strategy.submit_mode
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Strategy catalog validation failed");
            eprintln!();
            match &e {
                tactician_config::ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                tactician_config::ConfigError::ParseError(parse_err) => {
                    eprintln!("JSON parse error:");
                    eprintln!("  {}", parse_err);
                }
                tactician_config::ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
            }
            ExitCode::from(1)
        }
    }
}
