use anyhow::Context;
use clap::Parser;
use simstalker::config::RuntimeConfig;
use simstalker::provider::MemorySimulator;
use simstalker::replay::Trace;
use simstalker::runtime::Runtime;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Simulation trace to replay (JSON)
    #[arg(value_name = "TRACE")]
    trace_file: PathBuf,

    /// Runtime configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Control channel address, overrides configuration and SIMSTALKER_PORT
    #[arg(short, long)]
    listen: Option<String>,

    /// Symbol table to attach on start
    #[arg(long)]
    database: Option<PathBuf>,

    /// Log every control message
    #[arg(long)]
    trace: bool,

    /// Don't wait for a client before simulation starts
    #[arg(long)]
    no_wait: bool,

    /// Send log records to the client
    #[arg(long)]
    forward_logs: bool,
}

impl Args {
    fn runtime_config(&self) -> anyhow::Result<RuntimeConfig> {
        let mut config = match &self.config {
            Some(path) => RuntimeConfig::from_file(path)?,
            None => RuntimeConfig::default(),
        }
        .with_env();

        if let Some(listen) = &self.listen {
            config.listen = listen.clone();
        }
        if let Some(database) = &self.database {
            config.database = Some(database.clone());
        }
        config.trace |= self.trace;
        config.forward_logs |= self.forward_logs;
        if self.no_wait {
            config.start_paused = false;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    simstalker::log::init_default();

    let args = Args::parse();
    let config = args.runtime_config()?;
    let trace = Trace::from_file(&args.trace_file)?;

    let sim = Arc::new(MemorySimulator::new());
    trace.load_signals(&sim);

    let runtime = Runtime::start(&config, sim.clone()).context("start runtime")?;
    log::info!(target: "simstalker", "control channel at {}", runtime.local_addr());

    let steps = trace.replay(&sim, runtime.session());
    log::info!(target: "simstalker", "replayed {steps} of {} steps", trace.steps.len());

    runtime.teardown()
}
