//! asciilab CLI (made by FontLab https://www.fontlab.com/)

pub mod config;
pub mod engine;
pub mod repl;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use serde::Serialize;
use tokio::io::BufReader;
use tokio::sync::mpsc;

use asciilab_core::catalog::{TypefaceCatalog, TypefaceCatalogEntry};
use asciilab_core::codec;
use asciilab_core::export::{app_link, qr_code_url, share_url, write_text};
use asciilab_core::fallback::FallbackController;
use asciilab_core::ledger::Ledger;
use asciilab_core::live::LivePreview;
use asciilab_core::output::{write_json_pretty, write_ndjson};
use asciilab_core::params::{Layout, RenderParameters};
use asciilab_core::probe::HttpProbe;
use asciilab_core::query::{compile_patterns, CatalogQuery};
use asciilab_core::resolver::AvailabilityResolver;
use asciilab_core::scheduler::{RenderPhase, QUIET_PERIOD};
use asciilab_core::session::{Change, Session};
use asciilab_core::store::FileStore;

use crate::config::{Config, FIGLET_VAR, SHARE_BASE_VAR};
use crate::engine::FigletCommand;

type CliSession = Session<HttpProbe, FigletCommand, FileStore>;

/// CLI entrypoint for asciilab.
#[derive(Debug, Parser)]
#[command(
    name = "asciilab",
    about = "FIGlet-style text art with typeface fallback (made by FontLab https://www.fontlab.com/)"
)]
pub struct Cli {
    /// Log debug details to stderr
    #[arg(short = 'v', long = "verbose", global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render text once and print it
    Render(RenderArgs),
    /// List the typeface catalog
    Fonts(FontsArgs),
    /// Toggle a typeface in the favorites
    Favorite(FavoriteArgs),
    /// Show or clear the render history
    History(HistoryArgs),
    /// Encode parameters into a shareable state, or decode one
    State(StateArgs),
    /// Interactive preview driven by lines on stdin
    Live(LiveArgs),
}

#[derive(Debug, Args, Default)]
struct ParamArgs {
    /// Start from an encoded state (e.g. "t=HI&f=Slant&w=80")
    #[arg(long = "state", value_hint = ValueHint::Other)]
    state: Option<String>,

    /// Typeface name
    #[arg(short = 'f', long = "font")]
    font: Option<String>,

    /// Wrap width in columns (clamped to 10-200)
    #[arg(short = 'w', long = "width", allow_negative_numbers = true)]
    width: Option<i64>,

    /// Do not wrap at all
    #[arg(long = "auto-width", action = ArgAction::SetTrue)]
    auto_width: bool,

    /// Horizontal layout (default|full|fitted|controlled-smushing|universal-smushing)
    #[arg(long = "hl", value_parser = parse_layout)]
    horizontal: Option<Layout>,

    /// Vertical layout (same choices as --hl)
    #[arg(long = "vl", value_parser = parse_layout)]
    vertical: Option<Layout>,

    /// Preview size hint (clamped to 10-20)
    #[arg(long = "size", allow_negative_numbers = true)]
    preview_size: Option<i64>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Text to render (up to 100 characters)
    text: Option<String>,

    #[command(flatten)]
    params: ParamArgs,

    /// Copy the result to the clipboard
    #[arg(long = "copy", action = ArgAction::SetTrue)]
    copy: bool,

    /// Also save the result as a text file in this directory
    #[arg(long = "save", value_hint = ValueHint::DirPath)]
    save: Option<PathBuf>,

    /// Print share links (needs ASCIILAB_SHARE_BASE)
    #[arg(long = "share", action = ArgAction::SetTrue)]
    share: bool,

    /// Emit the preview as JSON
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args)]
struct FontsArgs {
    /// Case-insensitive substring filter
    #[arg(short = 's', long = "search")]
    search: Option<String>,

    /// Regex patterns that must match the typeface name
    #[arg(short = 'n', long = "name", value_hint = ValueHint::Other)]
    name_patterns: Vec<String>,

    /// Only list favorites
    #[arg(long = "favorites", action = ArgAction::SetTrue)]
    favorites: bool,

    /// Print one random typeface instead of the listing
    #[arg(
        long = "random",
        action = ArgAction::SetTrue,
        conflicts_with_all = ["search", "name_patterns", "favorites", "json", "ndjson"]
    )]
    random: bool,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,
}

#[derive(Debug, Args)]
struct FavoriteArgs {
    /// Typeface to add or remove
    name: String,
}

#[derive(Debug, Args)]
struct HistoryArgs {
    /// Forget all history entries
    #[arg(long = "clear", action = ArgAction::SetTrue, conflicts_with_all = ["json", "ndjson"])]
    clear: bool,

    /// Emit a single JSON array
    #[arg(long = "json", action = ArgAction::SetTrue, conflicts_with = "ndjson")]
    json: bool,

    /// Emit newline-delimited JSON
    #[arg(long = "ndjson", action = ArgAction::SetTrue)]
    ndjson: bool,
}

#[derive(Debug, Args)]
struct StateArgs {
    /// Text to encode
    text: Option<String>,

    #[command(flatten)]
    params: ParamArgs,

    /// Decode this state and print the parameters as JSON
    #[arg(long = "decode", conflicts_with_all = ["text", "link"])]
    decode: Option<String>,

    /// Print a link to the app instead of the bare state (needs ASCIILAB_SHARE_BASE)
    #[arg(long = "link", action = ArgAction::SetTrue)]
    link: bool,
}

#[derive(Debug, Args)]
struct LiveArgs {
    /// Initial text
    text: Option<String>,

    #[command(flatten)]
    params: ParamArgs,

    /// Quiet period before re-rendering, in milliseconds
    #[arg(long = "quiet-ms", default_value_t = QUIET_PERIOD.as_millis() as u64)]
    quiet_ms: u64,
}

/// Row of `asciilab fonts` output.
#[derive(Debug, Serialize)]
struct FontRow {
    #[serde(flatten)]
    entry: TypefaceCatalogEntry,
    favorite: bool,
}

/// Parse CLI args and execute the selected command.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::from_env()?;

    match cli.command {
        Command::Render(args) => run_render(args, &config),
        Command::Fonts(args) => run_fonts(args, &config),
        Command::Favorite(args) => run_favorite(args, &config),
        Command::History(args) => run_history(args, &config),
        Command::State(args) => run_state(args, &config),
        Command::Live(args) => run_live(args, &config),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")
}

async fn build_session(config: &Config) -> Result<CliSession> {
    let probe = HttpProbe::new(&config.font_base_url)?.with_cache_dir(&config.font_cache);
    let engine = FigletCommand::new(&config.figlet, &config.font_cache);
    let resolver = AvailabilityResolver::new(probe, TypefaceCatalog::builtin());
    let ledger = Ledger::load(FileStore::new(&config.state_dir)).await;
    Ok(Session::new(FallbackController::new(resolver, engine), ledger))
}

/// Apply command-line parameters on top of the session's defaults.
fn apply_params(session: &mut CliSession, args: &ParamArgs, text: Option<&str>) {
    let mut changes = Vec::new();
    if let Some(state) = &args.state {
        changes.push(Change::Restore(state.clone()));
    }
    if let Some(text) = text {
        changes.push(Change::Text(text.to_string()));
    }
    if let Some(font) = &args.font {
        if session.offer_typeface(font) {
            tracing::debug!(typeface = %font, "offering typeface outside the catalog");
        }
        changes.push(Change::Typeface(font.clone()));
    }
    if let Some(width) = args.width {
        changes.push(Change::Width(width));
    }
    if args.auto_width {
        changes.push(Change::AutoWidth(true));
    }
    if let Some(size) = args.preview_size {
        changes.push(Change::PreviewSize(size));
    }
    if let Some(layout) = args.horizontal {
        changes.push(Change::HorizontalLayout(layout));
    }
    if let Some(layout) = args.vertical {
        changes.push(Change::VerticalLayout(layout));
    }

    for change in changes {
        session.apply(change);
    }
}

fn run_render(args: RenderArgs, config: &Config) -> Result<()> {
    let runtime = runtime()?;
    let mut session = runtime.block_on(build_session(config))?;
    apply_params(&mut session, &args.params, args.text.as_deref());

    let phase = runtime.block_on(session.render_once());
    let preview = session.preview();

    if let Some(warning) = &preview.warning {
        eprintln!("warning: {warning}");
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut handle, preview)?;
        writeln!(handle)?;
    } else {
        write!(handle, "{}", preview.output)?;
        if !preview.output.ends_with('\n') {
            writeln!(handle)?;
        }
    }

    if phase == RenderPhase::Failed {
        bail!(
            "even the default typeface failed to render; is figlet installed? (set {FIGLET_VAR})"
        );
    }

    if args.copy {
        copy_to_clipboard(&preview.output)?;
    }
    if let Some(dir) = &args.save {
        let typeface = preview
            .used_typeface
            .as_deref()
            .unwrap_or(&session.params().typeface);
        let path = write_text(&preview.output, dir, typeface)?;
        eprintln!("saved {}", path.display());
    }
    if args.share {
        write_share_links(config, session.params(), &mut handle)?;
    }
    Ok(())
}

fn run_fonts(args: FontsArgs, config: &Config) -> Result<()> {
    let mut session = runtime()?.block_on(build_session(config))?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if args.random {
        session.apply(Change::RandomTypeface);
        writeln!(handle, "{}", session.params().typeface)?;
        return Ok(());
    }

    let query = CatalogQuery::new()
        .with_search(args.search.as_deref().unwrap_or_default())
        .with_name_patterns(compile_patterns(&args.name_patterns)?)
        .require_favorite(args.favorites);
    session.set_query(query);

    let rows: Vec<FontRow> = session
        .listing()
        .iter()
        .filter_map(|name| session.catalog().entry(name))
        .map(|entry| FontRow {
            favorite: session.ledger().is_favorite(&entry.name),
            entry,
        })
        .collect();

    if args.ndjson {
        write_ndjson(&rows, &mut handle)?;
    } else if args.json {
        write_json_pretty(&rows, &mut handle)?;
    } else {
        for row in &rows {
            let marker = if row.favorite { "*" } else { " " };
            writeln!(handle, "{marker} {}", row.entry.name)?;
        }
    }
    Ok(())
}

fn run_favorite(args: FavoriteArgs, config: &Config) -> Result<()> {
    let name = args.name.trim();
    if name.is_empty() {
        bail!("typeface name is empty");
    }

    let runtime = runtime()?;
    let mut session = runtime.block_on(build_session(config))?;
    if runtime.block_on(session.toggle_favorite(name)) {
        println!("{name} is now a favorite");
    } else {
        println!("{name} is no longer a favorite");
    }
    Ok(())
}

fn run_history(args: HistoryArgs, config: &Config) -> Result<()> {
    let runtime = runtime()?;
    let mut session = runtime.block_on(build_session(config))?;
    if args.clear {
        runtime.block_on(session.clear_history());
        return Ok(());
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let history = session.ledger().history();
    if args.ndjson {
        write_ndjson(history, &mut handle)?;
    } else if args.json {
        write_json_pretty(history, &mut handle)?;
    } else {
        for (idx, entry) in history.iter().enumerate() {
            writeln!(handle, "{idx:>2}  {}  ({})", entry.text, entry.typeface)?;
        }
    }
    Ok(())
}

fn run_state(args: StateArgs, config: &Config) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    if let Some(raw) = &args.decode {
        serde_json::to_writer_pretty(&mut handle, &codec::decode(raw))?;
        writeln!(handle)?;
        return Ok(());
    }

    let mut session = runtime()?.block_on(build_session(config))?;
    apply_params(&mut session, &args.params, args.text.as_deref());
    if args.link {
        let base = share_base(config)?;
        writeln!(handle, "{}", app_link(base, session.params()))?;
    } else {
        writeln!(handle, "{}", session.fragment())?;
    }
    Ok(())
}

fn run_live(args: LiveArgs, config: &Config) -> Result<()> {
    let runtime = runtime()?;
    let mut session = runtime.block_on(build_session(config))?;
    apply_params(&mut session, &args.params, args.text.as_deref());

    let (live, handle) = LivePreview::new(session);
    let live = live.with_quiet_period(Duration::from_millis(args.quiet_ms));
    let (tx, rx) = mpsc::unbounded_channel();

    let result = runtime.block_on(async {
        let stdin = BufReader::new(tokio::io::stdin());
        let front = repl::front_end(stdin, tx, handle, config, io::stdout());
        let (session, front) = tokio::join!(live.run(rx), front);
        front?;
        eprintln!("state: {}", session.fragment());
        Ok::<(), anyhow::Error>(())
    });
    // A blocked stdin read must not hold the process open.
    runtime.shutdown_background();
    result
}

fn share_base(config: &Config) -> Result<&url::Url> {
    config
        .share_base
        .as_ref()
        .ok_or_else(|| anyhow!("set {SHARE_BASE_VAR} to build share links"))
}

/// Print the app link, the standalone output page and its QR code.
pub(crate) fn write_share_links(
    config: &Config,
    params: &RenderParameters,
    mut w: impl Write,
) -> Result<()> {
    let base = share_base(config)?;
    let page = share_url(base, params)?;
    writeln!(w, "link: {}", app_link(base, params))?;
    writeln!(w, "page: {page}")?;
    writeln!(w, "qr:   {}", qr_code_url(page.as_str())?)?;
    Ok(())
}

fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("clipboard not available")?;
    clipboard
        .set_text(text.to_string())
        .context("copying to clipboard")?;
    eprintln!("copied to clipboard");
    Ok(())
}

/// Accept layout names with spaces or dashes.
pub(crate) fn parse_layout(raw: &str) -> std::result::Result<Layout, String> {
    let normalized = raw.trim().to_lowercase().replace(['-', '_'], " ");
    normalized.parse().map_err(|_| {
        let names: Vec<&str> = Layout::ALL.iter().map(|l| l.as_str()).collect();
        format!("unknown layout {raw:?}; expected one of: {}", names.join(", "))
    })
}
