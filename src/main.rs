use clap::{Parser, Subcommand};
use rayon::prelude::*;
use sapa_iiif::iiif::{BaseSettings, base_metadata};
use sapa_iiif::resolver::{DimensionResolver, HttpResolver};
use sapa_iiif::storage::{DirectorySink, S3Sink, StorageSink};
use sapa_iiif::{config, job, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

/// Where `build` puts finished manifests.
#[derive(clap::Args, Clone)]
struct TargetArgs {
    /// Write manifests to {DIR}/{bucket}/{key} instead of object storage
    #[arg(long, value_name = "DIR", conflicts_with = "dry_run")]
    output_dir: Option<PathBuf>,

    /// Print manifests to stdout without storing them
    #[arg(long)]
    dry_run: bool,

    /// Object storage access key
    #[arg(long, env = "SAPA_IIIF_ACCESS_KEY", hide_env_values = true)]
    access_key: Option<String>,

    /// Object storage secret key
    #[arg(long, env = "SAPA_IIIF_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,
}

#[derive(Parser)]
#[command(name = "sapa-iiif")]
#[command(about = "Build IIIF Presentation 3 manifests for SAPA archive items")]
#[command(long_about = "\
Build IIIF Presentation 3 manifests for SAPA archive items

Each job file describes one manifest: its base URL, multilingual label and
metadata, and the ordered list of IIIF image services that become canvases.

  {
    \"manifest_base_url\": \"https://iiif.sapa.swiss/manifests/programme-1952\",
    \"label\": {\"de\": \"Programmheft\", \"fr\": \"Programme\"},
    \"identifier\": \"SAPA-PH-1952\",
    \"creator\": [\"Stadttheater Bern\"],
    \"record\": {\"uri\": \"https://performing-arts.ch/record/1\"},
    \"images\": [
      {\"base_url\": \"https://iiif.sapa.swiss/iiif/3/a\", \"width\": 1000, \"height\": 800},
      {\"base_url\": \"https://iiif.sapa.swiss/iiif/3/b\"}
    ]
  }

Images without width and height are measured through their info.json.
Images that cannot be measured are left out of the manifest.

Run 'sapa-iiif gen-config' to generate a documented config file.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = "sapa-iiif.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build manifests from job files and store them
    Build {
        /// Job files (JSON)
        #[arg(required = true)]
        jobs: Vec<PathBuf>,

        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print the pixel size of IIIF image services
    Resolve {
        #[arg(required = true)]
        base_urls: Vec<String>,
    },
    /// Print a stock config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Build { jobs, target } => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);

            let resolver = HttpResolver::new(&config.resolver)?;
            let sink = make_sink(&target, &config.storage)?;
            let base = base_metadata(&BaseSettings::from(&config.manifest));
            let languages = &config.manifest.languages;

            let outcomes: Vec<_> = jobs
                .iter()
                .map(|path| {
                    let outcome =
                        job::run_job_file(path, &base, languages, &resolver, sink.as_deref());
                    (path.as_path(), outcome)
                })
                .collect();

            if target.dry_run {
                for (_, outcome) in &outcomes {
                    if let Ok(report) = outcome {
                        println!("{}", serde_json::to_string_pretty(&report.manifest)?);
                    }
                }
            } else {
                let rows: Vec<output::BuildOutcome> =
                    outcomes.iter().map(|(path, outcome)| (*path, outcome)).collect();
                output::print_build_output(&rows);
            }

            let failed = outcomes.iter().filter(|(_, o)| o.is_err()).count();
            if failed > 0 {
                for (path, outcome) in &outcomes {
                    if let Err(err) = outcome {
                        tracing::error!(job = %path.display(), error = %err, "job failed");
                    }
                }
                return Err(format!("{failed} of {} jobs failed", outcomes.len()).into());
            }
        }
        Command::Resolve { base_urls } => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);
            let resolver = HttpResolver::new(&config.resolver)?;

            let results: Vec<_> = base_urls
                .par_iter()
                .map(|url| (url.as_str(), resolver.resolve(url)))
                .collect();
            output::print_resolve_output(&results);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so `--dry-run` output stays clean JSON.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sapa_iiif=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Pick the sink for `build`: none for a dry run, a directory, or S3.
fn make_sink(
    target: &TargetArgs,
    storage: &config::StorageConfig,
) -> Result<Option<Box<dyn StorageSink>>, Box<dyn std::error::Error>> {
    if target.dry_run {
        return Ok(None);
    }
    if let Some(dir) = &target.output_dir {
        return Ok(Some(Box::new(DirectorySink::new(
            dir,
            storage.default_bucket.as_str(),
        ))));
    }
    let sink = S3Sink::new(
        storage,
        target.access_key.as_deref().unwrap_or_default(),
        target.secret_key.as_deref().unwrap_or_default(),
    )?;
    Ok(Some(Box::new(sink)))
}
