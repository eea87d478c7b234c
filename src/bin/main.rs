use std::{
    fs, io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, ValueEnum};
use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_time::{Duration, Instant, Timer};
use log::{debug, error, info, warn};
use swiftread_core::{
    content::{self, Document, DocumentFormat},
    error::IngestError,
    fixation::Alignment,
    input::ReaderCommand,
    playback::{AdvanceOutcome, CommandOutcome, PlaybackController},
    settings::{ReaderSettings, SettingsStore},
    storage::{DocumentId, JsonFileStore},
};

use settings_sync::SettingsSyncState;
use terminal::{BellCue, TerminalPresenter, TerminalWakeLock};

#[path = "main/settings_sync.rs"]
mod settings_sync;
#[path = "main/stdin_input.rs"]
mod stdin_input;
#[path = "main/terminal.rs"]
mod terminal;

const COMMAND_QUEUE_DEPTH: usize = 8;
const SETTINGS_SAVE_DEBOUNCE_MS: u64 = 1_500;
const WPM_REPORT_INTERVAL_SECS: u64 = 5;
const DEFAULT_STATE_DIR: &str = ".swiftread";

static COMMANDS: Channel<CriticalSectionRawMutex, ReaderCommand, COMMAND_QUEUE_DEPTH> =
    Channel::new();

type HostController = PlaybackController<TerminalPresenter, JsonFileStore, BellCue, TerminalWakeLock>;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlignArg {
    Center,
    Edge,
}

impl From<AlignArg> for Alignment {
    fn from(value: AlignArg) -> Self {
        match value {
            AlignArg::Center => Self::Center,
            AlignArg::Edge => Self::Edge,
        }
    }
}

/// Terminal RSVP speed reader.
#[derive(Debug, Parser)]
#[command(name = "swiftread", version)]
struct Args {
    /// Document to read (.txt, .html, .xhtml, .epub). Several markup files
    /// are read as one document with one section each.
    paths: Vec<PathBuf>,

    /// Reading speed in words per minute.
    #[arg(long)]
    wpm: Option<u16>,

    #[arg(long, value_enum)]
    align: Option<AlignArg>,

    /// Ring the terminal bell on every word.
    #[arg(long)]
    audio: bool,

    /// Directory holding positions, the current document and settings.
    #[arg(long, default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    /// Resume the last opened document when no paths are given.
    #[arg(long)]
    restore: bool,
}

impl Args {
    fn apply_overrides(&self, settings: ReaderSettings) -> ReaderSettings {
        let mut settings = settings;
        if let Some(wpm) = self.wpm {
            settings.wpm = wpm;
        }
        if let Some(align) = self.align {
            settings.alignment = align.into();
        }
        if self.audio {
            settings.audio_enabled = true;
        }
        settings.sanitized()
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let code = run(Args::parse()).await;
    if code != ExitCode::SUCCESS {
        std::process::exit(1);
    }
}

async fn run(args: Args) -> ExitCode {
    let mut store = match JsonFileStore::open(&args.state_dir) {
        Ok(store) => store,
        Err(err) => {
            error!(
                "store: open failed root={} err={}",
                args.state_dir.display(),
                err
            );
            return ExitCode::FAILURE;
        }
    };

    let stored_settings = match SettingsStore::load(&mut store) {
        Ok(settings) => settings.unwrap_or_default(),
        Err(err) => {
            warn!("settings: load failed, using defaults err={}", err);
            ReaderSettings::default()
        }
    };
    let settings = args.apply_overrides(stored_settings);
    info!(
        "Reader started: wpm={} alignment={:?} audio={} state_dir={}",
        settings.wpm,
        settings.alignment,
        settings.audio_enabled,
        store.root().display()
    );

    let mut controller: HostController = PlaybackController::new(
        TerminalPresenter::new(),
        store,
        BellCue::new(),
        TerminalWakeLock,
        settings,
    );
    let mut settings_sync = SettingsSyncState::new(stored_settings.sanitized());

    if !args.paths.is_empty() {
        if args.restore {
            warn!("session: --restore ignored, documents given on the command line");
        }
        match read_document(&args.paths) {
            Ok((id, Ok(document))) => {
                // The controller already showed the failure notice.
                if let Err(err) = controller.open_document(id, document) {
                    debug!("session: document not opened err={}", err);
                }
            }
            Ok((_, Err(err))) => controller.reject_document(&err),
            Err(err) => {
                error!("content: read failed err={}", err);
                return ExitCode::FAILURE;
            }
        }
    } else if args.restore {
        controller.restore_session();
    }

    println!("\n{}", stdin_input::HELP);

    if let Err(err) = std::thread::Builder::new()
        .name("stdin".into())
        .spawn(|| stdin_input::run(COMMANDS.sender()))
    {
        error!("input: stdin thread failed to start err={}", err);
        return ExitCode::FAILURE;
    }

    let mut report_words = 0u64;
    let mut report_start = Instant::now();

    loop {
        let wake_at_ms = [controller.next_advance_ms(), settings_sync.due_at_ms()]
            .into_iter()
            .flatten()
            .min();

        let command = match wake_at_ms {
            Some(at_ms) => {
                match select(COMMANDS.receive(), Timer::at(Instant::from_millis(at_ms))).await {
                    Either::First(command) => Some(command),
                    Either::Second(()) => None,
                }
            }
            None => Some(COMMANDS.receive().await),
        };

        let now_ms = Instant::now().as_millis();
        let outcome = match command {
            Some(command) => controller.apply(command, now_ms),
            None => {
                let (outcome, advanced) = advance(&mut controller, now_ms).await;
                if advanced {
                    report_words += 1;
                }
                outcome
            }
        };

        settings_sync.track_current(*controller.settings(), now_ms);
        settings_sync.flush_if_due(controller.store_mut(), now_ms);

        let elapsed = report_start.elapsed();
        if elapsed >= Duration::from_secs(WPM_REPORT_INTERVAL_SECS) && report_words > 0 {
            let elapsed_ms = elapsed.as_millis().max(1);
            let wpm_x100 = report_words * 6_000_000 / elapsed_ms;
            debug!(
                "effective_wpm={}.{:02} words={} elapsed_ms={}",
                wpm_x100 / 100,
                wpm_x100 % 100,
                report_words,
                elapsed_ms
            );
            report_words = 0;
            report_start = Instant::now();
        }

        if outcome == CommandOutcome::Quit {
            break;
        }
    }

    settings_sync.flush_now(controller.store_mut(), Instant::now().as_millis());
    info!("Reader stopped pointer={}", controller.pointer());
    ExitCode::SUCCESS
}

/// One timed advance. A command arriving while the cue plays cuts the cue
/// short and is applied before the advance is committed; the controller
/// drops the advance if that command invalidated it.
async fn advance(controller: &mut HostController, now_ms: u64) -> (CommandOutcome, bool) {
    let Some(ticket) = controller.begin_advance(now_ms) else {
        return (CommandOutcome::Continue, false);
    };

    let interrupted = match select(controller.emit_cue(), COMMANDS.receive()).await {
        Either::First(()) => None,
        Either::Second(command) => Some(command),
    };

    let outcome = match interrupted {
        Some(command) => {
            debug!(
                "playback: cue interrupted pointer={} command={:?}",
                ticket.pointer(),
                command
            );
            controller.apply(command, Instant::now().as_millis())
        }
        None => CommandOutcome::Continue,
    };

    let advanced = !matches!(
        controller.complete_advance(ticket, now_ms),
        AdvanceOutcome::Discarded
    );
    (outcome, advanced)
}

/// Read `paths` into one document. A single path is ingested by its
/// extension; several paths must all be markup and become one section each.
fn read_document(paths: &[PathBuf]) -> io::Result<(DocumentId, Result<Document, IngestError>)> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(fs::read(path)?);
    }

    let first_name = paths.first().map(|path| file_name(path)).unwrap_or_default();
    let total_bytes: u64 = sources.iter().map(|source| source.len() as u64).sum();
    let id = DocumentId::from_file(&first_name, total_bytes);

    let document = match sources.as_slice() {
        [single] => content::ingest(&first_name, single),
        _ => paths
            .iter()
            .try_for_each(|path| match DocumentFormat::from_file_name(&file_name(path))? {
                DocumentFormat::Markup => Ok(()),
                _ => Err(IngestError::UnsupportedFormat {
                    extension: path
                        .extension()
                        .map(|extension| extension.to_string_lossy().to_ascii_lowercase())
                        .unwrap_or_default(),
                }),
            })
            .and_then(|()| content::ingest_sections(&sources)),
    };

    Ok((id, document))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
