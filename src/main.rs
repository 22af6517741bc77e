use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use impairscope::config::AnalyzerConfig;
use impairscope::experiment::{
    analyze_pair, AnalysisOptions, BatchAnalyzer, BatchJob, ImpairmentProfile, ResultsTable,
    SweepRunner, SweepTraffic,
};
use impairscope::metrics;
use impairscope::simulate::{uniform_sender_trace, ChannelConfig, ImpairmentChannel};
use impairscope::trace::{load_trace, save_trace};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Delay and loss analysis of sender/receiver packet traces", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,
    /// Print Prometheus metrics after the run
    #[arg(long, global = true)]
    metrics: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one sender/receiver trace pair
    Analyze {
        /// Sender-side trace (tshark fields: frame,time_epoch,sequence)
        sender: PathBuf,
        /// Receiver-side trace
        receiver: PathBuf,
        /// Delay reported for lost packets, in seconds
        #[arg(long, allow_hyphen_values = true)]
        max_delay: Option<f64>,
        /// Stop at the end of the receiver trace instead of counting the rest as lost
        #[arg(long)]
        keep_trailing: bool,
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Analyse every experiment listed in the config file
    Batch {
        /// Results table to write (overrides `results_path`)
        #[arg(long)]
        results: Option<PathBuf>,
    },
    /// Run the config's `[sweep]` grid through the simulated channel
    Sweep {
        #[arg(long, default_value_t = 10_000)]
        count: usize,
        /// Seconds between sent packets
        #[arg(long, default_value_t = 0.0003)]
        interval: f64,
        #[arg(long)]
        seed: Option<u64>,
        /// Results table to write (overrides `results_path`)
        #[arg(long)]
        results: Option<PathBuf>,
    },
    /// Generate a sender/receiver trace pair through a simulated channel
    Simulate {
        #[arg(long, default_value_t = 1000)]
        count: usize,
        /// Seconds between sent packets
        #[arg(long, default_value_t = 0.0003)]
        interval: f64,
        #[arg(long, default_value_t = 25.0)]
        delay_ms: f64,
        #[arg(long, default_value_t = 2.0)]
        jitter_ms: f64,
        /// Long-run loss probability
        #[arg(long, default_value_t = 0.01)]
        loss: f64,
        #[arg(long, default_value_t = 3.0)]
        mean_burst_len: f64,
        /// Share of delivered time spent congested; 0 for a two-state loss chain
        #[arg(long, default_value_t = 0.5)]
        mu: f64,
        #[arg(long, default_value_t = 10.0)]
        mean_good_burst_len: f64,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AnalyzerConfig> {
    match path {
        Some(path) => AnalyzerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(AnalyzerConfig::default()),
    }
}

async fn run_analyze(
    config: &AnalyzerConfig,
    sender_path: PathBuf,
    receiver_path: PathBuf,
    max_delay: Option<f64>,
    keep_trailing: bool,
    json: bool,
) -> anyhow::Result<()> {
    let sender = load_trace(&sender_path)
        .await
        .with_context(|| format!("reading {}", sender_path.display()))?;
    let receiver = load_trace(&receiver_path)
        .await
        .with_context(|| format!("reading {}", receiver_path.display()))?;

    let options = AnalysisOptions {
        max_delay: max_delay.unwrap_or(config.max_delay),
        mark_trailing_lost: config.mark_trailing_lost && !keep_trailing,
        ..config.analysis_options()
    };
    let name = sender_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "trace".to_string());
    let report = analyze_pair(&name, &sender, &receiver, &options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let s = &report.summary;
    println!(
        "packets: {} sent, {} received, {} lost",
        report.sender_packets, report.receiver_packets, report.lost
    );
    if report.excluded_non_causal > 0 {
        println!("excluded (non-causal): {}", report.excluded_non_causal);
    }
    println!("average loss: {}", s.average_loss);
    match s.average_delay {
        Some(delay) => println!("average delay: {}", delay),
        None => println!("average delay: n/a (nothing delivered)"),
    }
    match s.jitter {
        Some(jitter) => println!("jitter: {}", jitter),
        None => println!("jitter: n/a"),
    }
    println!("average loss burst len: {}", s.average_burst_length);
    println!("Pearson corr: {}", s.correlation);
    Ok(())
}

async fn run_batch(config: &AnalyzerConfig, results: Option<PathBuf>) -> anyhow::Result<()> {
    if config.experiments.is_empty() {
        bail!("no [[experiments]] in config");
    }

    let analyzer =
        BatchAnalyzer::new(config.analysis_options()).with_parallelism(config.parallelism);
    let outcomes = analyzer.run(config.experiments.clone()).await;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!("{} of {} analyses succeeded", outcomes.len() - failed, outcomes.len());

    match results.or_else(|| config.results_path.clone()) {
        Some(path) => {
            let mut table = create_table(&path)?;
            for outcome in &outcomes {
                table.write_row(
                    &outcome.job.name,
                    outcome.job.profile.as_ref(),
                    outcome.result.as_ref().ok().map(|r| &r.summary),
                )?;
            }
            info!("wrote {} rows to {}", table.rows(), path.display());
        }
        None => {
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(report) => println!("{}: {}", outcome.job.name, report.summary),
                    Err(e) => println!("{}: failed: {}", outcome.job.name, e),
                }
            }
        }
    }

    if failed > 0 {
        warn!("{} analyses failed", failed);
    }
    Ok(())
}

fn create_table(path: &Path) -> anyhow::Result<ResultsTable<BufWriter<File>>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(ResultsTable::new(BufWriter::new(file))?)
}

async fn run_sweep(
    config: &AnalyzerConfig,
    traffic: SweepTraffic,
    results: Option<PathBuf>,
) -> anyhow::Result<()> {
    let Some(sweep) = &config.sweep else {
        bail!("no [sweep] in config");
    };

    let runner = SweepRunner::new(traffic, config.analysis_options())
        .with_parallelism(config.parallelism);
    let outcomes = runner.run(sweep).await?;

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    match results.or_else(|| config.results_path.clone()) {
        Some(path) => {
            let mut table = create_table(&path)?;
            for outcome in &outcomes {
                table.write_row(
                    &outcome.params.exp_i.to_string(),
                    Some(&outcome.params.profile),
                    outcome.result.as_ref().ok().map(|r| &r.summary),
                )?;
            }
            info!("wrote {} rows to {}", table.rows(), path.display());
        }
        None => {
            for outcome in &outcomes {
                let p = &outcome.params.profile;
                match &outcome.result {
                    Ok(report) => println!(
                        "loss={} mu={} jitter={}ms #{}: {}",
                        p.loss, p.mu, p.jitter_ms, outcome.params.exp_i, report.summary
                    ),
                    Err(e) => println!(
                        "loss={} mu={} jitter={}ms #{}: failed: {}",
                        p.loss, p.mu, p.jitter_ms, outcome.params.exp_i, e
                    ),
                }
            }
        }
    }

    if failed > 0 {
        warn!("{} sweep runs failed", failed);
    }
    Ok(())
}

async fn run_simulate(
    count: usize,
    interval: f64,
    profile: ImpairmentProfile,
    seed: Option<u64>,
    out_dir: PathBuf,
) -> anyhow::Result<()> {
    let sender = uniform_sender_trace(count, 0.0, interval);
    let mut channel = ImpairmentChannel::new(ChannelConfig::from_profile(&profile, seed)?);
    let receiver = channel.transmit(&sender);

    tokio::fs::create_dir_all(&out_dir)
        .await
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let clt = out_dir.join("clt.csv");
    let srv = out_dir.join("srv.csv");
    save_trace(&sender, &clt).await?;
    save_trace(&receiver, &srv).await?;

    let job = BatchJob::new("simulated", &clt, &srv).with_profile(profile);
    let mut doc = toml::Table::new();
    doc.insert("experiments".to_string(), toml::Value::try_from(vec![job])?);
    println!("{}", toml::to_string(&doc)?);
    info!(
        "simulated {} packets, {} lost; traces in {}",
        sender.len(),
        channel.stats().packets_lost,
        out_dir.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let filter = std::env::var("IMPAIRSCOPE_LOG").unwrap_or_else(|_| config.log_filter.clone());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.metrics {
        metrics::install_recorder()?;
    }

    match cli.command {
        Commands::Analyze {
            sender,
            receiver,
            max_delay,
            keep_trailing,
            json,
        } => run_analyze(&config, sender, receiver, max_delay, keep_trailing, json).await?,
        Commands::Batch { results } => run_batch(&config, results).await?,
        Commands::Sweep {
            count,
            interval,
            seed,
            results,
        } => {
            let traffic = SweepTraffic {
                packets: count,
                interval,
                seed,
            };
            run_sweep(&config, traffic, results).await?
        }
        Commands::Simulate {
            count,
            interval,
            delay_ms,
            jitter_ms,
            loss,
            mean_burst_len,
            mu,
            mean_good_burst_len,
            seed,
            out_dir,
        } => {
            let profile = ImpairmentProfile {
                delay_ms,
                jitter_ms,
                loss,
                mu,
                mean_burst_len,
                mean_good_burst_len,
            };
            run_simulate(count, interval, profile, seed, out_dir).await?
        }
    }

    if cli.metrics {
        if let Some(text) = metrics::render_metrics() {
            print!("{}", text);
        }
    }
    Ok(())
}
