//! mtb CLI - Matrix Market to MTB conversion and inspection

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use mtb::{
    convert_with_config, read_header, read_mtb_dynamic, ConvertConfig, Mirroring, MtbHeader, NoProgress,
    Progress, Width,
};
use std::path::PathBuf;

const PROGRESS_STEPS: u64 = 10_000;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(about = "Convert Matrix Market coordinate files to the MTB binary triplet format")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an MTX file to MTB
    Convert {
        /// Matrix Market input file
        input: PathBuf,

        /// MTB output file
        output: PathBuf,

        /// Sort records by (row, col) before writing
        #[arg(long)]
        sort: bool,

        /// Raw text block size in bytes
        #[arg(long, default_value_t = mtb::DEFAULT_BLOCK_SIZE)]
        block_size: usize,

        /// Records encoded per bulk write
        #[arg(long)]
        batch_records: Option<usize>,

        /// Stored width of integer values
        #[arg(long, value_enum, default_value_t = WidthArg::Four)]
        integer_width: WidthArg,

        /// Stored width of real and complex components
        #[arg(long, value_enum, default_value_t = WidthArg::Eight)]
        real_width: WidthArg,

        /// Also mirror diagonal entries of symmetric matrices
        #[arg(long)]
        mirror_diagonal: bool,

        /// Show progress bar
        #[arg(long)]
        progress: bool,

        /// Output the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the header of an MTB file
    Info {
        /// MTB file
        file: PathBuf,

        /// Output the header as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the records of an MTB file
    Dump {
        /// MTB file
        file: PathBuf,

        /// Print at most this many records
        #[arg(long)]
        limit: Option<usize>,

        /// Print one-based indices as in Matrix Market files
        #[arg(long)]
        one_based: bool,
    },
}

/// Stored scalar width in bytes
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum WidthArg {
    #[value(name = "4")]
    Four,
    #[value(name = "8")]
    Eight,
}

impl From<WidthArg> for Width {
    fn from(arg: WidthArg) -> Self {
        match arg {
            WidthArg::Four => Width::Four,
            WidthArg::Eight => Width::Eight,
        }
    }
}

/// Progress observer drawing an indicatif bar
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(PROGRESS_STEPS);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent}% ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Progress for BarProgress {
    fn init(&mut self, label: &str) {
        self.bar.set_message(label.to_string());
        self.bar.set_position(0);
    }

    fn set(&mut self, fraction: f64) {
        self.bar.set_position((fraction * PROGRESS_STEPS as f64) as u64);
    }

    fn finish(&mut self) {
        self.bar.finish_and_clear();
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = env_logger::Builder::from_env(env_logger::Env::new().filter_or("MTB_LOG", "warn")).try_init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert {
            input,
            output,
            sort,
            block_size,
            batch_records,
            integer_width,
            real_width,
            mirror_diagonal,
            progress,
            json,
        } => {
            let mut config = ConvertConfig::default()
                .with_sort(sort)
                .with_block_size(block_size)
                .with_integer_width(integer_width.into())
                .with_real_width(real_width.into());
            if let Some(batch_records) = batch_records {
                config = config.with_batch_records(batch_records);
            }
            if mirror_diagonal {
                config = config.with_mirroring(Mirroring::All);
            }

            let start_time = std::time::Instant::now();
            let summary = if progress {
                convert_with_config(&input, &output, &config, &mut BarProgress::new())?
            } else {
                convert_with_config(&input, &output, &config, &mut NoProgress)?
            };
            let elapsed = start_time.elapsed();

            if json {
                let report = serde_json::json!({
                    "config": config,
                    "summary": summary,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{} -> {}: {} records from {} entries ({} declared){} in {elapsed:.2?}",
                    input.display(),
                    output.display(),
                    summary.records,
                    summary.entries,
                    summary.declared_nz,
                    if summary.sorted { ", sorted" } else { "" },
                );
            }
        }
        Commands::Info { file, json } => {
            let header = read_header(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&header)?);
            } else {
                print_header(&header);
            }
        }
        Commands::Dump {
            file,
            limit,
            one_based,
        } => {
            let (_, triplets) = read_mtb_dynamic(&file)?;
            let base = i64::from(one_based);
            for (row, col, val) in triplets.entries().take(limit.unwrap_or(usize::MAX)) {
                println!("{} {} {}", row + base, col + base, val);
            }
        }
    }

    Ok(())
}

fn print_header(header: &MtbHeader) {
    match header.matrix_type() {
        Ok(matrix_type) => println!("Matrix type: {matrix_type}"),
        Err(err) => println!("Matrix type: {err}"),
    }
    match header.value_encoding() {
        Ok(encoding) => println!("Values: {encoding}"),
        Err(err) => println!("Values: {err}"),
    }
    println!("Dimensions: {} x {}", header.nrows, header.ncols);
    println!("Records: {}", header.nz);
}
