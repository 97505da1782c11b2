use crate::infra::build_pipeline;
use crate::reply::{render_reply, INVALID_ZIP_REPLY};
use crate::server;
use burnban::config::AppConfig;
use burnban::error::AppError;
use burnban::resolution::{Inquiry, ZipCode};
use burnban::telemetry;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Burn Ban SMS",
    about = "Answer whether an outdoor burn ban is in effect for a U.S. ZIP code",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Resolve a single ZIP code and print the reply an SMS sender would get
    Lookup(LookupArgs),
    /// Download the county burn ban table now
    Refresh(RefreshArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

#[derive(Args, Debug)]
pub(crate) struct LookupArgs {
    /// ZIP code, free text allowed (non-digits are ignored)
    #[arg(long)]
    pub(crate) zip: String,
    /// Channel identifier reported to the notification sink
    #[arg(long, default_value = "")]
    pub(crate) from: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RefreshArgs {
    /// Download even if the cached table is still within its TTL
    #[arg(long)]
    pub(crate) force: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Lookup(args) => run_lookup(args).await,
        Command::Refresh(args) => run_refresh(args).await,
    }
}

async fn run_lookup(args: LookupArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let Some(zip) = ZipCode::parse(&args.zip) else {
        println!("{INVALID_ZIP_REPLY}");
        return Ok(());
    };

    let pipeline = build_pipeline(&config)?;
    let resolution = pipeline.resolve(&Inquiry::new(zip, args.from, "cli")).await;

    println!("{}", render_reply(&resolution));
    if let Some(error) = resolution.outcome.error.as_deref() {
        println!("(reason: {error})");
    }
    Ok(())
}

async fn run_refresh(args: RefreshArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let pipeline = build_pipeline(&config)?;
    let dataset = pipeline.dataset();
    dataset.ensure_fresh(args.force).await?;
    let snapshot = dataset.read()?;

    println!(
        "Burn ban table: {} counties ({} under a ban) stored at {}",
        snapshot.len(),
        snapshot
            .records
            .iter()
            .filter(|record| record.ban_status.eq_ignore_ascii_case("YES"))
            .count(),
        config.dataset.cache_path.display()
    );
    Ok(())
}
