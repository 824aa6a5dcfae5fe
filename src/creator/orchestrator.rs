use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::cancel::CancellationToken;
use super::config::CreatorConfig;
use super::error::{CreateError, ErrorKind};
use super::request::CreationRequest;
use crate::constants::HASHING_PROGRESS_SPAN;
use crate::metainfo::{DescriptorBuilder, InfoHash, MetainfoError, TorrentDescriptor};
use crate::piece::{PieceHash, PieceHasher, PiecePlan};
use crate::storage::{enumerate, FileList, StorageError};

/// Stage of a creation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreationState {
    Idle,
    Enumerating,
    Hashing,
    Building,
    Writing,
    Done,
    Cancelled,
    Failed,
}

impl CreationState {
    /// Returns `true` while a run is between start and a final state.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            CreationState::Enumerating
                | CreationState::Hashing
                | CreationState::Building
                | CreationState::Writing
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CreationState::Done | CreationState::Cancelled | CreationState::Failed
        )
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTorrent {
    /// Where the torrent file was written.
    pub output_path: PathBuf,
    /// Directory that the torrent's file paths are relative to.
    pub base_path: PathBuf,
    pub info_hash: InfoHash,
    pub piece_count: u32,
    pub total_length: u64,
}

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationStatus {
    Created(CreatedTorrent),
    Cancelled,
}

/// Notifications sent by a spawned run.
///
/// A run sends `Progress` events with non-decreasing percentages, then
/// exactly one of `Created` or `Failed`, or nothing further when cancelled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorEvent {
    Progress(u8),
    Created(CreatedTorrent),
    Failed { kind: ErrorKind, message: String },
}

/// Handle to a run started with [`TorrentCreator::create`].
#[derive(Debug)]
pub struct CreationHandle {
    events: mpsc::UnboundedReceiver<CreatorEvent>,
    cancel: CancellationToken,
    task: JoinHandle<Result<CreationStatus, CreateError>>,
}

impl CreationHandle {
    /// Receives the next event. Returns `None` once the run has finished
    /// and every event was delivered.
    pub async fn next_event(&mut self) -> Option<CreatorEvent> {
        self.events.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the run to finish. Undelivered events are dropped.
    pub async fn join(self) -> Result<CreationStatus, CreateError> {
        self.task
            .await
            .map_err(|e| CreateError::TaskFailed(e.to_string()))?
    }
}

/// Drives enumeration, hashing, descriptor assembly and output for one
/// torrent at a time.
///
/// # Examples
///
/// ```no_run
/// use rbit_create::creator::{CreationRequest, CreatorEvent, TorrentCreator};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let creator = TorrentCreator::new();
/// let request = CreationRequest::new("./album", "./album.torrent")
///     .trackers(["http://tracker.example.com/announce"]);
///
/// let mut handle = creator.create(request)?;
/// while let Some(event) = handle.next_event().await {
///     match event {
///         CreatorEvent::Progress(p) => println!("{p}%"),
///         CreatorEvent::Created(t) => println!("created {}", t.info_hash),
///         CreatorEvent::Failed { message, .. } => eprintln!("failed: {message}"),
///     }
/// }
/// handle.join().await?;
/// # Ok(())
/// # }
/// ```
///
/// Dropping the creator cancels a run it spawned.
#[derive(Debug)]
pub struct TorrentCreator {
    config: CreatorConfig,
    state: Arc<RwLock<CreationState>>,
    spawned: Mutex<Option<CancellationToken>>,
}

impl Default for TorrentCreator {
    fn default() -> Self {
        Self::new()
    }
}

impl TorrentCreator {
    pub fn new() -> Self {
        Self::with_config(CreatorConfig::default())
    }

    pub fn with_config(config: CreatorConfig) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(CreationState::Idle)),
            spawned: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &CreatorConfig {
        &self.config
    }

    pub fn state(&self) -> CreationState {
        *self.state.read()
    }

    /// Runs the pipeline on the current task.
    ///
    /// `progress` receives percentages from 0 to 100, each value once and in
    /// non-decreasing order. On cancellation no output file is left behind.
    ///
    /// # Errors
    ///
    /// - [`CreateError::AlreadyRunning`] if another run is in progress
    /// - [`CreateError::InvalidConfig`] if the request or config is invalid
    /// - [`CreateError::EmptyInput`] if the input has no bytes
    /// - [`CreateError::Io`] if reading the input or writing the output fails
    pub async fn run(
        &self,
        request: &CreationRequest,
        cancel: &CancellationToken,
        progress: impl FnMut(u8),
    ) -> Result<CreationStatus, CreateError> {
        let run = ActiveRun::claim(&self.state)?;
        execute(&run, &self.config, request, cancel, progress).await
    }

    /// Spawns the pipeline on a new tokio task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn create(&self, request: CreationRequest) -> Result<CreationHandle, CreateError> {
        let run = ActiveRun::claim(&self.state)?;
        let cancel = CancellationToken::new();
        *self.spawned.lock() = Some(cancel.clone());

        let (tx, rx) = mpsc::unbounded_channel();
        let config = self.config.clone();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let result = execute(&run, &config, &request, &task_cancel, |percent| {
                let _ = tx.send(CreatorEvent::Progress(percent));
            })
            .await;

            let event = match &result {
                Ok(CreationStatus::Created(created)) => Some(CreatorEvent::Created(created.clone())),
                Ok(CreationStatus::Cancelled) => None,
                Err(e) => Some(CreatorEvent::Failed {
                    kind: e.kind(),
                    message: e.to_string(),
                }),
            };
            if let Some(event) = event {
                let _ = tx.send(event);
            }
            result
        });

        Ok(CreationHandle {
            events: rx,
            cancel,
            task,
        })
    }
}

impl Drop for TorrentCreator {
    fn drop(&mut self) {
        if let Some(cancel) = self.spawned.get_mut().take() {
            cancel.cancel();
        }
    }
}

/// Counts the pieces `input_path` would have at `piece_size`, without
/// hashing anything. An empty path yields 0.
pub async fn estimate_piece_count(input_path: &Path, piece_size: u64) -> Result<u64, CreateError> {
    if input_path.as_os_str().is_empty() {
        return Ok(0);
    }
    let list = enumerate(input_path).await?;
    let plan = PiecePlan::new(&list.files, piece_size)?;
    Ok(u64::from(plan.piece_count()))
}

/// Marks the creator busy for the lifetime of one run.
///
/// If the run is dropped before reaching a final state, as when the task
/// panics or is aborted, the state becomes `Failed` so the creator can be
/// used again.
struct ActiveRun {
    state: Arc<RwLock<CreationState>>,
}

impl ActiveRun {
    fn claim(state: &Arc<RwLock<CreationState>>) -> Result<Self, CreateError> {
        let mut current = state.write();
        if current.is_active() {
            return Err(CreateError::AlreadyRunning);
        }
        *current = CreationState::Enumerating;
        Ok(Self {
            state: Arc::clone(state),
        })
    }

    fn enter(&self, stage: CreationState) {
        debug!("Torrent creation entering {:?}", stage);
        *self.state.write() = stage;
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        let mut state = self.state.write();
        if state.is_active() {
            *state = CreationState::Failed;
        }
    }
}

/// Emits each percentage once, never going backwards.
struct Progress<F> {
    report: F,
    last: Option<u8>,
}

impl<F: FnMut(u8)> Progress<F> {
    fn new(report: F) -> Self {
        Self { report, last: None }
    }

    fn set(&mut self, percent: u8) {
        if self.last.is_some_and(|last| percent <= last) {
            return;
        }
        self.last = Some(percent);
        (self.report)(percent);
    }

    fn hashed(&mut self, hashed: u64, total: u64) {
        if total == 0 {
            return;
        }
        let percent = u128::from(hashed) * u128::from(HASHING_PROGRESS_SPAN) / u128::from(total);
        self.set(percent as u8);
    }
}

async fn execute(
    run: &ActiveRun,
    config: &CreatorConfig,
    request: &CreationRequest,
    cancel: &CancellationToken,
    progress: impl FnMut(u8),
) -> Result<CreationStatus, CreateError> {
    let result = pipeline(run, config, request, cancel, Progress::new(progress)).await;

    match &result {
        Ok(CreationStatus::Created(created)) => {
            run.enter(CreationState::Done);
            info!(
                "Created torrent {} ({} pieces, {} bytes) at {}",
                created.info_hash,
                created.piece_count,
                created.total_length,
                created.output_path.display()
            );
        }
        Ok(CreationStatus::Cancelled) => {
            run.enter(CreationState::Cancelled);
            info!("Torrent creation for {} cancelled", request.input_path.display());
        }
        Err(e) => {
            run.enter(CreationState::Failed);
            warn!("Torrent creation for {} failed: {}", request.input_path.display(), e);
        }
    }

    result
}

async fn pipeline<F: FnMut(u8)>(
    run: &ActiveRun,
    config: &CreatorConfig,
    request: &CreationRequest,
    cancel: &CancellationToken,
    mut progress: Progress<F>,
) -> Result<CreationStatus, CreateError> {
    progress.set(0);

    request.validate()?;
    if config.chunk_size == 0 {
        return Err(CreateError::InvalidConfig(
            "read chunk size must be greater than zero".into(),
        ));
    }

    if cancel.is_cancelled() {
        return Ok(CreationStatus::Cancelled);
    }
    run.enter(CreationState::Enumerating);
    let list = enumerate(&request.input_path).await?;
    let total = list.total_length();
    if total == 0 {
        return Err(CreateError::EmptyInput(request.input_path.clone()));
    }
    let plan = PiecePlan::new(&list.files, request.piece_size)?;

    if cancel.is_cancelled() {
        return Ok(CreationStatus::Cancelled);
    }
    run.enter(CreationState::Hashing);
    let mut hasher = PieceHasher::new(&list, &plan, config.chunk_size);
    let mut pieces = Vec::with_capacity(plan.piece_count() as usize);
    loop {
        if cancel.is_cancelled() {
            return Ok(CreationStatus::Cancelled);
        }
        let Some(hash) = hasher.next_piece().await else {
            break;
        };
        let hash = hash?;
        trace!("Hashed piece {}: {}", pieces.len(), hash);
        pieces.push(hash);
        progress.hashed(hasher.bytes_hashed(), total);
    }

    if cancel.is_cancelled() {
        return Ok(CreationStatus::Cancelled);
    }
    run.enter(CreationState::Building);
    let created_by = request
        .created_by
        .as_deref()
        .unwrap_or(&config.created_by);
    let descriptor = describe(&list, &plan, pieces, request, created_by)?;
    let info_hash = descriptor.info_hash()?;
    let encoded = descriptor.encode()?;

    if cancel.is_cancelled() {
        return Ok(CreationStatus::Cancelled);
    }
    run.enter(CreationState::Writing);
    write_output(&request.output_path, &encoded).await?;

    progress.set(100);

    Ok(CreationStatus::Created(CreatedTorrent {
        output_path: request.output_path.clone(),
        base_path: list.base_path().to_path_buf(),
        info_hash,
        piece_count: plan.piece_count(),
        total_length: total,
    }))
}

/// Assembles the descriptor for hashed content.
fn describe(
    list: &FileList,
    plan: &PiecePlan,
    pieces: Vec<PieceHash>,
    request: &CreationRequest,
    created_by: &str,
) -> Result<TorrentDescriptor, MetainfoError> {
    let mut builder = DescriptorBuilder::new(&list.name, plan.piece_size());

    if list.single_file {
        builder = builder.single_file(list.total_length());
    } else {
        for file in &list.files {
            builder = builder.add_file(file.torrent_path(), file.length);
        }
    }

    builder = builder
        .pieces(pieces)
        .trackers(&request.trackers)
        .private(request.private)
        .source(request.source.as_str())
        .comment(request.comment.as_str())
        .created_by(created_by);

    for url in &request.url_seeds {
        builder = builder.add_url_seed(url);
    }

    if let Some(timestamp) = request.creation_date {
        builder = builder.creation_date(timestamp);
    }

    builder.build()
}

/// Writes the torrent file. A file that was opened is removed again if
/// writing it fails.
async fn write_output(path: &Path, data: &[u8]) -> Result<(), CreateError> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|e| StorageError::at(path, e))?;

    let written = async {
        file.write_all(data).await?;
        file.flush().await?;
        file.sync_all().await
    }
    .await;
    drop(file);

    if let Err(e) = written {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!(
                "Failed to remove partial torrent file {}: {}",
                path.display(),
                remove_err
            );
        }
        return Err(StorageError::at(path, e).into());
    }

    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}
