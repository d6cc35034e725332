use clap::Parser;
use simplelog::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Restore capture dates on exported photo and video archives from their JSON sidecars"
)]
pub struct Cli {
    /// Working directory with folders and media files
    #[arg(required = true)]
    pub work_dir: PathBuf,

    /// Activate verbose debug output
    #[arg(short = 'v', long = "debug")]
    pub debug: bool,

    /// Simulate processing without modifying files
    #[arg(long)]
    pub dry_run: bool,

    /// Never ask for manual dates; just print the report
    #[arg(long)]
    pub no_prompt: bool,

    /// Delete every JSON sidecar under the working directory afterwards
    #[arg(long)]
    pub purge_sidecars: bool,

    /// Delete empty directories under the working directory afterwards
    #[arg(long)]
    pub prune_empty_dirs: bool,

    /// Enable file logging to takeoutfix.log
    #[arg(long = "log")]
    pub log: bool,

    /// Log level for file logging (debug, info, warn, error)
    #[arg(long, default_value_t = LevelFilter::Debug)]
    pub log_level: LevelFilter,
}
