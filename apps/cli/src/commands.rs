//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use rankscope_core::{Applied, CsvQuoting, Pipelines, QueryHandle, QueryStatus, Session, ViewConfig};
use rankscope_shared::{
    AiEngine, AppConfig, Domain, MaxPosition, RankScopeError, Region, SortKey, SourceKind,
    init_config, load_config,
};
use rankscope_source::build_source;

use crate::render;

/// How often the spinner re-checks the query handle.
const POLL_INTERVAL: Duration = Duration::from_millis(80);

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// RankScope: keyword rankings and AI search visibility for a domain.
#[derive(Parser)]
#[command(
    name = "rankscope",
    version,
    about = "Keyword rankings and AI search visibility for a domain.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print results as JSON instead of tables.
    #[arg(long, global = true)]
    pub json: bool,

    /// Record Source to query.
    #[arg(long, global = true)]
    pub source: Option<SourceArg>,

    /// Base URL of the HTTP Record Source.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Seed for reproducible mock data.
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Skip the mock source's simulated network latency.
    #[arg(long, global = true)]
    pub no_latency: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum SourceArg {
    Mock,
    Http,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Mock => SourceKind::Mock,
            SourceArg::Http => SourceKind::Http,
        }
    }
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Show keyword rankings for a domain.
    Keywords {
        /// Domain or URL to analyze.
        domain: String,

        #[command(flatten)]
        view: ViewArgs,

        /// Target region (US, UK, CA, AU, Global).
        #[arg(long)]
        region: Option<Region>,

        /// Save the shown rows as CSV into DIR (defaults to the working directory).
        #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = ".")]
        export: Option<PathBuf>,

        /// Quote CSV fields that contain commas or quotes.
        #[arg(long)]
        quote_csv: bool,
    },

    /// Show AI answer-engine visibility for a domain.
    Ai {
        /// Domain or URL to analyze.
        domain: String,

        /// Target region (US, UK, CA, AU, Global).
        #[arg(long)]
        region: Option<Region>,

        /// Toggle an engine's detail card; may be repeated.
        #[arg(long = "select", value_name = "ENGINE")]
        select: Vec<AiEngine>,
    },

    /// Run both pipelines and show rankings and AI visibility together.
    Analyze {
        /// Domain or URL to analyze.
        domain: String,

        /// Target region (US, UK, CA, AU, Global).
        #[arg(long)]
        region: Option<Region>,

        #[command(flatten)]
        view: ViewArgs,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Filter and sort selection for the keyword view.
#[derive(Args)]
pub(crate) struct ViewArgs {
    /// Only show rankings at or above this position (10, 20, 50 or 100).
    #[arg(long, value_name = "N")]
    top: Option<MaxPosition>,

    /// Order rows by position or search volume.
    #[arg(long)]
    sort: Option<SortKey>,
}

impl ViewArgs {
    fn apply(&self, session: &mut Session) {
        if let Some(top) = self.top {
            session.set_max_position(top);
        }
        if let Some(sort) = self.sort {
            session.set_sort(sort);
        }
    }
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// parseable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "rankscope=info",
        1 => "rankscope=debug",
        _ => "rankscope=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Resolved settings shared by every command.
struct Context {
    config: AppConfig,
    json: bool,
}

impl Context {
    /// Load the config file and layer CLI overrides on top.
    fn resolve(cli: &Cli) -> Result<Self> {
        let mut config = load_config()?;

        if let Some(kind) = cli.source {
            config.source.kind = kind.into();
        }
        if let Some(base_url) = &cli.base_url {
            config.source.base_url = base_url.clone();
        }
        if cli.seed.is_some() {
            config.source.seed = cli.seed;
        }
        if cli.no_latency {
            config.source.simulate_latency = false;
        }

        Ok(Self {
            config,
            json: cli.json,
        })
    }

    fn session(&self) -> Session {
        Session::new(ViewConfig::from(&self.config.defaults))
    }
}

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let ctx = Context::resolve(&cli)?;

    match cli.command {
        Command::Keywords {
            domain,
            view,
            region,
            export,
            quote_csv,
        } => cmd_keywords(&ctx, &domain, &view, region, export, quote_csv).await,
        Command::Ai {
            domain,
            region,
            select,
        } => cmd_ai(&ctx, &domain, region, &select).await,
        Command::Analyze {
            domain,
            region,
            view,
        } => cmd_analyze(&ctx, &domain, region, &view).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&ctx.config).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Query execution
// ---------------------------------------------------------------------------

/// Start a query on `session`, show a spinner while it is in flight, and
/// install the outcome.
async fn run_analysis(
    ctx: &Context,
    session: &mut Session,
    domain: Domain,
    region: Region,
    pipelines: Pipelines,
) -> Result<()> {
    let source = build_source(&ctx.config.source)?;
    info!(source = source.name(), %domain, %region, "analyzing domain");

    let ticket = session.begin(domain, region, pipelines);
    let handle = QueryHandle::spawn(source, ticket);

    let progress = CliProgress::new(!ctx.json);
    progress.analyzing(handle.domain());
    while handle.status() == QueryStatus::Pending {
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    progress.done();

    let outcome = handle.join().await?;
    match session.apply(outcome) {
        Applied::Applied => Ok(()),
        Applied::Stale => Err(eyre!("query was superseded before it settled")),
    }
}

/// Report a failed pipeline the way the result panels do: a fixed message
/// with no domain detail. The underlying error is already logged.
fn check_pipeline(error: Option<&RankScopeError>, what: &str) -> Result<()> {
    match error {
        Some(_) => {
            eprintln!("Error loading {what} data");
            eprintln!("Please try again later");
            Err(eyre!("{what} lookup failed"))
        }
        None => Ok(()),
    }
}

fn keyword_error(session: &Session) -> Option<&RankScopeError> {
    session.current().and_then(|s| s.keywords.error())
}

fn ai_error(session: &Session) -> Option<&RankScopeError> {
    session.current().and_then(|s| s.ai.error())
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_keywords(
    ctx: &Context,
    domain: &str,
    view: &ViewArgs,
    region: Option<Region>,
    export: Option<PathBuf>,
    quote_csv: bool,
) -> Result<()> {
    let domain = Domain::parse_input(domain)?;
    let region = region.unwrap_or(ctx.config.defaults.region);

    let mut session = ctx.session();
    run_analysis(ctx, &mut session, domain, region, Pipelines::Keywords).await?;
    check_pipeline(keyword_error(&session), "keyword")?;
    view.apply(&mut session);

    let exported = match export {
        Some(dir) => {
            let quoting = if quote_csv || ctx.config.defaults.quote_csv {
                CsvQuoting::Rfc4180
            } else {
                CsvQuoting::None
            };
            let csv = session
                .export(quoting)
                .ok_or_else(|| eyre!("no keyword data to export"))?;
            Some(csv.write_to(&dir)?)
        }
        None => None,
    };

    if ctx.json {
        let value = render::keywords_json(&session, exported.as_deref());
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render::keyword_section(&session));
        if let Some(path) = &exported {
            println!();
            println!("  Exported: {}", path.display());
        }
    }

    Ok(())
}

async fn cmd_ai(
    ctx: &Context,
    domain: &str,
    region: Option<Region>,
    select: &[AiEngine],
) -> Result<()> {
    let domain = Domain::parse_input(domain)?;
    let region = region.unwrap_or(ctx.config.defaults.region);

    let mut session = ctx.session();
    run_analysis(ctx, &mut session, domain, region, Pipelines::Ai).await?;
    check_pipeline(ai_error(&session), "AI visibility")?;

    for &engine in select {
        session.select_engine(engine);
    }

    if ctx.json {
        let value = render::ai_json(&session);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print!("{}", render::ai_section(&session));
    }

    Ok(())
}

async fn cmd_analyze(
    ctx: &Context,
    domain: &str,
    region: Option<Region>,
    view: &ViewArgs,
) -> Result<()> {
    let domain = Domain::parse_input(domain)?;
    let region = region.unwrap_or(ctx.config.defaults.region);

    let mut session = ctx.session();
    run_analysis(ctx, &mut session, domain, region, Pipelines::Both).await?;
    view.apply(&mut session);

    // Each pipeline renders independently; a failure in one still shows the other.
    if ctx.json {
        let value = serde_json::json!({
            "keywords": render::keywords_json(&session, None),
            "ai": render::ai_json(&session),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        if keyword_error(&session).is_none() {
            print!("{}", render::keyword_section(&session));
            println!();
        }
        if ai_error(&session).is_none() {
            print!("{}", render::ai_section(&session));
        }
    }

    let keywords = check_pipeline(keyword_error(&session), "keyword");
    let ai = check_pipeline(ai_error(&session), "AI visibility");
    keywords.and(ai)
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner shown while a query is pending.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new(visible: bool) -> Self {
        if !visible {
            return Self {
                spinner: ProgressBar::hidden(),
            };
        }

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(POLL_INTERVAL);
        Self { spinner }
    }

    fn analyzing(&self, domain: &Domain) {
        self.spinner.set_message(format!("Analyzing {domain}…"));
    }

    fn done(&self) {
        self.spinner.finish_and_clear();
    }
}
