use anyhow::Result;
use clap::Parser;
use simplelog::{CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fs::File;
use std::io;
use takeoutfix::takeoutfix_core::cleanup::{prune_empty_dirs, purge_sidecars};
use takeoutfix::takeoutfix_core::{
    Cli, RunOptions, apply_manual_dates, process_directory, prompt_manual_dates,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize loggers
    let term_level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];

    if cli.log {
        loggers.push(WriteLogger::new(
            cli.log_level,
            Config::default(),
            File::create("takeoutfix.log")?,
        ));
    }

    CombinedLogger::init(loggers)?;

    let options = RunOptions {
        dry_run: cli.dry_run,
    };

    let stats = process_directory(&cli.work_dir, options)?;

    println!();
    if options.dry_run {
        println!("[DRY RUN] No files were modified.");
    }
    print!("{}", stats);

    if !stats.not_found.is_empty() && !cli.no_prompt {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();

        let resolutions = prompt_manual_dates(&mut input, &mut output, &stats.not_found)?;
        if !resolutions.is_empty() {
            let manual = apply_manual_dates(&resolutions, options);
            println!("\nManual dates set: {}", manual.applied);
            if manual.failed > 0 {
                println!("Manual dates failed: {}", manual.failed);
            }
        }
    }

    if cli.purge_sidecars {
        let deleted = purge_sidecars(&cli.work_dir, options)?;
        println!("Sidecar files deleted: {}", deleted);
    }

    if cli.prune_empty_dirs {
        let removed = prune_empty_dirs(&cli.work_dir, options)?;
        println!("Empty directories deleted: {}", removed);
    }

    Ok(())
}
