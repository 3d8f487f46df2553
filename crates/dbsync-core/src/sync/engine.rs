//! SyncEngine implementation
//!
//! A run moves through `Idle → StructurePreparation → Exporting → Saving →
//! Done`, or ends in `Failed`. Structure preparation completes before any
//! object is exported, and every export completes before the project is
//! saved.

use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use dbsync_fs::{NormalizedPath, checksum, io};

use super::progress::{ProgressSink, ProgressTick};
use super::report::SyncReport;
use crate::backend::{ScriptJob, ScriptingOptions, ScriptingSession, SessionFactory};
use crate::catalog::{Catalog, enumerate_objects, exportable_schemas};
use crate::error::ObjectFailure;
use crate::layout::{self, DirectoryConvention};
use crate::manifest::{ManifestHandle, ProjectManifest};
use crate::model::DatabaseObject;
use crate::transform::to_alter_script;
use crate::{Error, Result};

/// Lifecycle of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    StructurePreparation,
    Exporting,
    Saving,
    Done,
    Failed,
}

/// Options for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Worker count; host parallelism when `None`
    pub parallelism: Option<NonZeroUsize>,
    pub scripting: ScriptingOptions,
}

impl SyncOptions {
    /// Number of workers used for `jobs` objects, at least one.
    pub fn worker_count(&self, jobs: usize) -> usize {
        let degree = self
            .parallelism
            .or_else(|| thread::available_parallelism().ok())
            .map_or(1, NonZeroUsize::get);
        degree.min(jobs).max(1)
    }
}

/// Engine exporting a database into a project.
///
/// Owns the catalog used for enumeration, the factory that opens one
/// scripting session per worker, and the project manifest.
pub struct SyncEngine<C, F, M> {
    catalog: C,
    scripter: F,
    manifest: ManifestHandle<M>,
    options: SyncOptions,
    state: SyncState,
}

/// What happened to one exported object.
struct ObjectOutcome {
    registered: bool,
    changed: bool,
}

/// Tallies of one worker.
#[derive(Default)]
struct WorkerOutcome {
    exported: usize,
    items_added: usize,
    files_changed: usize,
    failures: Vec<ObjectFailure>,
    fatal: Option<Error>,
}

impl<C, F, M> SyncEngine<C, F, M>
where
    C: Catalog,
    F: SessionFactory,
    M: ProjectManifest,
{
    pub fn new(catalog: C, scripter: F, manifest: M, options: SyncOptions) -> Self {
        Self {
            catalog,
            scripter,
            manifest: ManifestHandle::new(manifest),
            options,
            state: SyncState::Idle,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn manifest(&self) -> &ManifestHandle<M> {
        &self.manifest
    }

    pub fn into_manifest(self) -> M {
        self.manifest.into_inner()
    }

    /// Run a full export.
    ///
    /// Object failures do not stop the run: every other object is still
    /// exported, the project is saved, and the failures are returned
    /// together as [`Error::Export`]. A connection failure, or a project
    /// skeleton that cannot be created, stops the run without saving.
    pub fn run(&mut self, progress: &mut dyn ProgressSink) -> Result<SyncReport> {
        self.state = SyncState::Idle;
        match self.execute(progress) {
            Ok(report) => {
                self.transition(SyncState::Done);
                Ok(report)
            }
            Err(err) => {
                match &err {
                    Error::Export { failures, .. } => {
                        tracing::warn!(failed = failures.len(), "sync finished with failures")
                    }
                    _ => tracing::error!(error = %err, "sync aborted"),
                }
                self.transition(SyncState::Failed);
                Err(err)
            }
        }
    }

    fn execute(&mut self, progress: &mut dyn ProgressSink) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        self.transition(SyncState::StructurePreparation);
        self.prepare_structure(&mut report)?;

        self.transition(SyncState::Exporting);
        let objects = enumerate_objects(&self.catalog)?;
        report.objects = objects.len();

        let (jobs, mut failures) = self.plan(objects);
        for _ in &failures {
            progress.report(ProgressTick::completed(report.objects));
        }

        let outcome = self.export(&jobs, report.objects, progress)?;
        report.exported = outcome.exported;
        report.items_added = outcome.items_added;
        report.files_changed = outcome.files_changed;
        report.files_unchanged = outcome.exported - outcome.files_changed;
        failures.extend(outcome.failures);

        self.transition(SyncState::Saving);
        self.save()?;

        if !failures.is_empty() {
            return Err(Error::Export {
                exported: report.exported,
                failures,
            });
        }

        tracing::info!(
            objects = report.objects,
            items_added = report.items_added,
            files_changed = report.files_changed,
            "sync complete"
        );
        Ok(report)
    }

    fn transition(&mut self, next: SyncState) {
        tracing::info!(from = ?self.state, to = ?next, "sync state changed");
        self.state = next;
    }

    /// Create the schema/type directory skeleton and register its folders.
    fn prepare_structure(&self, report: &mut SyncReport) -> Result<()> {
        let schemas = exportable_schemas(&self.catalog)?;

        for schema in &schemas {
            let folder = layout::schema_folder(&schema.name);
            if self.register_folder(&folder)? {
                report.folders_added += 1;
            }

            for (kind, _) in DirectoryConvention::entries() {
                let folder = layout::type_folder(&schema.name, kind);
                io::ensure_dir(&self.manifest.absolute_path(&folder)).map_err(|e| structure_error(&folder, e))?;
                if self.register_folder(&folder)? {
                    report.folders_added += 1;
                }
            }
        }

        report.schemas = schemas.len();
        tracing::debug!(schemas = report.schemas, folders_added = report.folders_added, "structure prepared");
        Ok(())
    }

    /// Register a folder unless the project already has it.
    fn register_folder(&self, folder: &NormalizedPath) -> Result<bool> {
        if self.manifest.has_item(folder) {
            return Ok(false);
        }
        self.manifest.add_folder(folder).map_err(|e| structure_error(folder, e))
    }

    /// Resolve every object's path.
    ///
    /// Objects without a schema, and objects whose path was already claimed
    /// by an earlier object, become failures instead of jobs.
    fn plan(&self, objects: Vec<DatabaseObject>) -> (Vec<ScriptJob>, Vec<ObjectFailure>) {
        let mut jobs = Vec::with_capacity(objects.len());
        let mut failures = Vec::new();
        let mut claimed: HashMap<String, String> = HashMap::new();

        for object in objects {
            let schema = match object.owning_schema() {
                Ok(schema) => schema.to_string(),
                Err(err) => {
                    tracing::warn!(object = %object, error = %err, "object not exported");
                    failures.push(ObjectFailure::new(&object, &err));
                    continue;
                }
            };

            let relative = layout::resolve(object.kind, &schema, &object.name);
            match claimed.entry(relative.item_key()) {
                Entry::Occupied(first) => {
                    let err = Error::PathCollision {
                        path: relative.to_string(),
                        claimed_by: first.get().clone(),
                    };
                    tracing::warn!(object = %object, error = %err, "object not exported");
                    failures.push(ObjectFailure::new(&object, &err));
                    continue;
                }
                Entry::Vacant(slot) => {
                    slot.insert(object.to_string());
                }
            }

            let target = self.manifest.absolute_path(&relative);
            jobs.push(ScriptJob::new(object, relative, target, self.options.scripting.clone()));
        }

        (jobs, failures)
    }

    /// Export jobs across the worker pool.
    ///
    /// Jobs are split into one contiguous share per worker up front. Each
    /// worker opens its own session inside its thread and keeps it until its
    /// share is done.
    fn export(
        &self,
        jobs: &[ScriptJob],
        total: usize,
        progress: &mut dyn ProgressSink,
    ) -> Result<WorkerOutcome> {
        let mut outcome = WorkerOutcome::default();
        if jobs.is_empty() {
            return Ok(outcome);
        }

        let workers = self.options.worker_count(jobs.len());
        let share = jobs.len().div_ceil(workers);
        let abort = AtomicBool::new(false);
        tracing::info!(objects = jobs.len(), workers, "exporting objects");

        let scripter = &self.scripter;
        let manifest = &self.manifest;
        let results = thread::scope(|scope| {
            let (tx, rx) = mpsc::channel();
            let handles: Vec<_> = jobs
                .chunks(share)
                .enumerate()
                .map(|(index, chunk)| {
                    let tx = tx.clone();
                    let abort = &abort;
                    scope.spawn(move || {
                        let _span = tracing::debug_span!("worker", index).entered();
                        run_worker(scripter, manifest, index, chunk, total, abort, &tx)
                    })
                })
                .collect();
            drop(tx);

            for tick in rx {
                progress.report(tick);
            }

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
                .collect::<Vec<_>>()
        });

        for result in results {
            if let Some(fatal) = result.fatal {
                outcome.fatal.get_or_insert(fatal);
            }
            outcome.exported += result.exported;
            outcome.items_added += result.items_added;
            outcome.files_changed += result.files_changed;
            outcome.failures.extend(result.failures);
        }

        match outcome.fatal.take() {
            Some(fatal) => Err(fatal),
            None => Ok(outcome),
        }
    }

    fn save(&self) -> Result<()> {
        self.manifest.save().map_err(|err| match err {
            Error::ManifestPersist { .. } => err,
            other => Error::ManifestPersist {
                path: self.manifest.directory().to_path_buf(),
                message: other.to_string(),
            },
        })
    }
}

fn structure_error(folder: &NormalizedPath, err: impl std::fmt::Display) -> Error {
    Error::Structure {
        path: folder.to_string(),
        message: err.to_string(),
    }
}

/// Export one worker's share with a session of its own.
fn run_worker<F, M>(
    scripter: &F,
    manifest: &ManifestHandle<M>,
    index: usize,
    chunk: &[ScriptJob],
    total: usize,
    abort: &AtomicBool,
    ticks: &mpsc::Sender<ProgressTick>,
) -> WorkerOutcome
where
    F: SessionFactory,
    M: ProjectManifest,
{
    let mut outcome = WorkerOutcome::default();
    let mut session = match scripter.connect(index) {
        Ok(session) => session,
        Err(err) => {
            abort.store(true, Ordering::SeqCst);
            outcome.fatal = Some(err);
            return outcome;
        }
    };

    for job in chunk {
        if abort.load(Ordering::SeqCst) {
            tracing::debug!("stopping after abort");
            break;
        }

        match export_object(&mut session, manifest, job) {
            Ok(result) => {
                outcome.exported += 1;
                outcome.items_added += usize::from(result.registered);
                outcome.files_changed += usize::from(result.changed);
            }
            Err(err) if err.is_fatal() => {
                abort.store(true, Ordering::SeqCst);
                outcome.fatal = Some(err);
                break;
            }
            Err(err) => {
                tracing::warn!(object = %job.object, error = %err, "object export failed");
                outcome.failures.push(ObjectFailure::new(&job.object, &err));
            }
        }

        // The receiver outlives every worker.
        let _ = ticks.send(ProgressTick::completed(total));
    }

    outcome
}

/// Script, transform and register one object.
fn export_object<S, M>(session: &mut S, manifest: &ManifestHandle<M>, job: &ScriptJob) -> Result<ObjectOutcome>
where
    S: ScriptingSession,
    M: ProjectManifest,
{
    let before = checksum::existing_file_checksum(&job.target_path)?;

    session.script(job)?;

    if job.object.kind.supports_alter() {
        let script = io::read_text(&job.target_path)?;
        if let Cow::Owned(altered) = to_alter_script(&script, job.object.kind) {
            io::write_text(&job.target_path, &altered)?;
        }
    }

    let after = checksum::compute_file_checksum(&job.target_path)?;

    let registered = !manifest.has_item(&job.relative_path) && manifest.add_build_item(&job.relative_path)?;

    let changed = before.as_deref() != Some(after.as_str());
    tracing::debug!(object = %job.object, path = %job.relative_path, registered, changed, "exported");
    Ok(ObjectOutcome { registered, changed })
}
