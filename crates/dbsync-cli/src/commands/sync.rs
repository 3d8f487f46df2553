//! Sync command implementation

use std::path::Path;

use colored::Colorize;

use dbsync_core::{SnapshotCatalog, SqlProject, SyncEngine, SyncReport};

use crate::cli::SyncArgs;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::progress::ProgressReporter;

/// Run the sync command
///
/// Exports every object of the snapshot into the project and saves the
/// project file. Object failures are reported together after the save.
pub fn run_sync(cwd: &Path, args: &SyncArgs) -> Result<()> {
    let context = ProjectContext::resolve(cwd, &args.source)?;

    let mut options = context.config.sync_options();
    if let Some(jobs) = args.jobs {
        options.parallelism = Some(jobs);
    }

    println!(
        "{} Syncing {} from {}",
        "=>".blue().bold(),
        context.project_file.display().to_string().cyan(),
        context.snapshot.display()
    );

    let catalog = SnapshotCatalog::open(&context.snapshot)?;
    let project = SqlProject::load(&context.project_file)?;
    let mut engine = SyncEngine::new(catalog.clone(), catalog.scripter(), project, options);

    let mut progress = ProgressReporter::new(!args.no_progress);
    let result = engine.run(&mut progress);
    progress.finish();

    let report = result?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &SyncReport) {
    println!(
        "{} Exported {} objects from {} schemas",
        "OK".green().bold(),
        report.exported,
        report.schemas
    );
    println!(
        "   {} new project items, {} new folders",
        report.items_added, report.folders_added
    );
    println!(
        "   {} scripts changed, {} unchanged",
        report.files_changed, report.files_unchanged
    );
    if report.is_noop() {
        println!("{}", "Project is up to date.".dimmed());
    }
}
