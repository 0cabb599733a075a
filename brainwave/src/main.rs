use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use engine::{Backend, Circuit, Lwe, Simulation};

use brainwave::{BackendKind, Config, LogFormat, PipelineError, RangePolicy, Session, compile, init_logging};

/// Classify the dominant brainwave band of encrypted (power, frequency) samples.
#[derive(Parser, Debug)]
#[command(name = "brainwave", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "BRAINWAVE_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    backend: Option<BackendKind>,

    /// Comma-separated sample powers, on the 0..100 scale.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    powers: Option<Vec<f64>>,

    /// Comma-separated sample frequencies, in Hz.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    frequencies: Option<Vec<f64>>,

    #[arg(long, value_enum)]
    range_policy: Option<RangePolicy>,

    #[arg(long)]
    log_level: Option<String>,

    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config: Config = match &self.config {
            Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(backend) = self.backend {
            config.engine.backend = backend;
        }
        if let Some(powers) = self.powers {
            config.input.powers = powers;
        }
        if let Some(frequencies) = self.frequencies {
            config.input.frequencies = frequencies;
        }
        if let Some(policy) = self.range_policy {
            config.input.range_policy = policy;
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        if let Some(format) = self.log_format {
            config.log.format = format;
        }
        config.validate()?;
        Ok(config)
    }
}

fn run<B: Backend>(config: &Config) -> Result<()> {
    println!("Compilation...");
    let circuit: Circuit<B> = compile::<B>(config)?;

    println!("Key generation...");
    let session: Session<B> = Session::with_circuit(circuit, config)?;

    let outcome = session.classify_hz(&config.input.powers, &config.input.frequencies);
    session.close();
    match outcome {
        Ok(classification) => {
            println!("{}", classification.render());
            Ok(())
        }
        Err(PipelineError::Inconsistent { ordinal }) => {
            println!("Brainwave Type: Unknown");
            bail!("decrypted ordinal {ordinal} is not a band")
        }
        Err(e) => Err(e.into()),
    }
}

fn main() -> Result<()> {
    let config: Config = Cli::parse().into_config()?;
    init_logging(&config.log)?;

    match config.engine.backend {
        BackendKind::Lwe => run::<Lwe>(&config),
        BackendKind::Simulation => run::<Simulation>(&config),
    }
}
