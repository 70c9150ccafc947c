use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lsif_transform::{transform, TransformConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "lsifpack",
    version,
    about = "Transform an LSIF dump into a zip archive of code-intelligence sidecar files"
)]
struct Cli {
    /// Path to the LSIF dump (newline-delimited JSON); `-` reads stdin
    input: PathBuf,
    /// Output archive path (defaults to `<input>.zip`, or `lsif.zip` for stdin)
    #[arg(long)]
    out: Option<PathBuf>,
    /// Also index reference lists (larger archive, slower transform)
    #[arg(long)]
    references: bool,
    /// Directory for the transform's scratch files
    #[arg(long)]
    temp_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let from_stdin = cli.input.as_os_str() == "-";
    let out_path = cli.out.unwrap_or_else(|| {
        if from_stdin {
            PathBuf::from("lsif.zip")
        } else {
            let mut path = cli.input.clone().into_os_string();
            path.push(".zip");
            PathBuf::from(path)
        }
    });

    let config = TransformConfig {
        temp_dir: cli.temp_dir.unwrap_or_else(std::env::temp_dir),
        process_references: cli.references,
    };

    let input: Box<dyn BufRead> = if from_stdin {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("failed to open dump {}", cli.input.display()))?;
        Box::new(BufReader::new(file))
    };

    let output = File::create(&out_path)
        .with_context(|| format!("failed to create archive {}", out_path.display()))?;

    transform(&config, input, output)
        .with_context(|| format!("failed to transform {}", cli.input.display()))?;

    println!("{}", out_path.display());
    Ok(())
}
