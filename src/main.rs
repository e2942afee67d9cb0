use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use tm_screen::cli::{Cli, Commands, ReportFormat};
use tm_screen::config::{ApiKey, Config};
use tm_screen::fetcher::HttpTransport;
use tm_screen::pipeline;
use tm_screen::query::QueryBuilder;
use tm_screen::reporter::{ReportOutput, Reporter};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // RUST_LOG も .env から読めるよう、ログ初期化より先に読み込む
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli).await {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config;

    match cli.command {
        None => screen(config_path, None, None, None, ReportFormat::default()).await,
        Some(Commands::Run { pairs, threshold, output, format }) => {
            screen(config_path, pairs, threshold, output, format).await
        }
        Some(Commands::VerifyKey) => verify_key(config_path).await,
        Some(Commands::Config { show, init }) => manage_config(config_path, show, init),
    }
}

async fn screen(
    config_path: Option<PathBuf>,
    pairs: Option<PathBuf>,
    threshold: Option<f64>,
    output: Option<PathBuf>,
    format: ReportFormat,
) -> Result<()> {
    println!("🔎 tm-screen - trademark screening\n");

    // 1. 設定の読み込み
    println!("[1/3] Loading configuration...");
    let mut config = Config::load(config_path.as_deref()).context("loading configuration")?;
    if let Some(pairs_path) = pairs {
        config.load_pairs(&pairs_path)?;
    }
    if let Some(threshold) = threshold {
        config.scoring.fuzzy_threshold = threshold;
    }
    if let Some(dir) = output {
        config.output.dir = dir;
    }
    config.validate()?;
    let thresholds = pipeline::thresholds_for(&config)?;
    let api_key = ApiKey::from_env()?;
    println!(
        "✔ {} pairs, {} targets (threshold {}, high risk {})\n",
        config.pairs.len(),
        config.target_names().len(),
        thresholds.fuzzy_threshold(),
        thresholds.high_risk_cutoff()
    );

    // 2. 検索とスコア付け
    println!("[2/3] Searching the registry...");
    let transport = HttpTransport::new(&config.search, api_key)?;
    let mut fetcher = pipeline::fetcher_for(&config, transport);
    let mut reporter = Reporter::stdout(thresholds);
    let stats = pipeline::run(&config, &mut fetcher, &mut reporter).await?;
    println!(
        "\n✔ {} searches, {} failed, {} matches, {} API calls\n",
        stats.pairs_attempted, stats.pairs_failed, stats.matches, stats.api_calls
    );

    // 3. レポート出力
    println!("[3/3] Writing report...");
    let report_output = ReportOutput::new(
        &config.output.dir,
        &config.output.file_prefix,
        format,
        Local::now(),
    );
    let targets = config.target_names();
    reporter.finish(&report_output, &targets)?;
    reporter.print_summary(&targets)?;

    println!("\n✅ Done");
    Ok(())
}

async fn verify_key(config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path.as_deref()).context("loading configuration")?;
    let api_key = ApiKey::from_env()?;

    let Some(first_target) = config.target_names().first().copied() else {
        bail!("no search pairs configured to check the key with");
    };
    let check = QueryBuilder::from_settings(&config.search).build_exact(first_target)?;

    println!("Checking API key against {}...", config.search.api_host);
    let transport = HttpTransport::new(&config.search, api_key)?;
    transport
        .verify(&check)
        .await
        .context("provider rejected the check search")?;
    println!("✔ API key accepted");
    Ok(())
}

fn manage_config(config_path: Option<PathBuf>, show: bool, init: bool) -> Result<()> {
    let path = match config_path {
        Some(path) => path,
        None => Config::config_path()?,
    };

    if init {
        if path.exists() {
            println!("Config already exists: {}", path.display());
        } else {
            Config::default().save(&path)?;
            println!("✔ Wrote default config: {}", path.display());
        }
    }

    if show || !init {
        let config = if path.exists() {
            Config::load(Some(&path))?
        } else {
            Config::default()
        };
        println!("Config ({}):", path.display());
        println!("{}", serde_json::to_string_pretty(&config)?);
        println!(
            "API key: {}",
            if ApiKey::from_env().is_ok() { "set" } else { "not set" }
        );
    }

    Ok(())
}
