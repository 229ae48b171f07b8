//! pom-settings CLI
//!
//! Entry point for the `pom-settings` command-line tool.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use pom_settings::render::render;
use pom_settings::{Error, Generator, GeneratorConfig};
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pom-settings")]
#[command(about = "Generate a Maven settings file carrying the CI build number", version)]
struct Cli {
    /// Build descriptor to read (default: pom.xml)
    #[arg(long, value_name = "FILE")]
    pom: Option<PathBuf>,

    /// Settings file to write (default: maven-settings.xml)
    #[arg(long, short = 'o', value_name = "FILE")]
    output: Option<PathBuf>,

    /// Config file (none is read unless given)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extra exclusion pattern, on top of "capture" and "test" (repeatable)
    #[arg(long, value_name = "REGEX")]
    exclude: Vec<String>,

    /// Version-control client to query (default: git)
    #[arg(long, value_name = "PROGRAM")]
    git: Option<String>,

    /// Use this build number instead of querying version control
    #[arg(long, value_name = "ID")]
    build_number: Option<String>,

    /// Print the document to stdout instead of writing the settings file
    #[arg(long)]
    stdout: bool,

    /// Verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    /// Flags given on the command line, as the highest config layer
    fn overrides(&self) -> Value {
        let mut map = Map::new();
        if let Some(pom) = &self.pom {
            map.insert("descriptor".into(), Value::String(pom.display().to_string()));
        }
        if let Some(output) = &self.output {
            map.insert("output".into(), Value::String(output.display().to_string()));
        }
        if !self.exclude.is_empty() {
            map.insert(
                "exclude".into(),
                Value::Array(self.exclude.iter().cloned().map(Value::String).collect()),
            );
        }
        if let Some(git) = &self.git {
            let mut vcs = Map::new();
            vcs.insert("program".into(), Value::String(git.clone()));
            map.insert("vcs".into(), Value::Object(vcs));
        }
        if let Some(build_number) = &self.build_number {
            map.insert("build_number".into(), Value::String(build_number.clone()));
        }
        Value::Object(map)
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pom_settings={}", log_level).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();

    if let Err(e) = run(&cli) {
        eprintln!("error: {} ({}): {}", e.step(), e.kind(), e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = GeneratorConfig::load(cli.config.as_deref(), cli.overrides())?;
    let generator = Generator::new(&config)?;

    if cli.stdout {
        let generated = generator.generate()?;
        print!("{}", render(&generated.document)?);
    } else {
        generator.run()?;
    }
    Ok(())
}
