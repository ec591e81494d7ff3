//! hirelens CLI - resume extraction and HR report generation

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use crossbeam_channel::RecvTimeoutError;
use indicatif::{ProgressBar, ProgressStyle};

use hirelens::detect::{detect_signature, sniff, Signature};
use hirelens::extract::{progress_channel, LopdfLoader, PdfLoader, PROGRESS_CHANNEL_CAPACITY};
use hirelens::{
    parse_analysis_response, ExtractOptions, ExtractionSupervisor, Hirelens, InputFile,
    OutputFormat, SourceFormat,
};

#[derive(Parser)]
#[command(name = "hirelens")]
#[command(version)]
#[command(about = "Extract resume text and generate HR analysis reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract plain text from a PDF or DOCX resume
    Extract {
        /// Input resume file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Print the extraction result as JSON
        #[arg(long)]
        json: bool,

        /// Extraction deadline in seconds (0 disables it)
        #[arg(long, value_name = "SECS", default_value = "30")]
        timeout: u64,
    },

    /// Generate a report from an analysis JSON file
    Report {
        /// Analysis result produced by the model
        #[arg(value_name = "ANALYSIS.json")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "pdf")]
        format: Format,

        /// Report date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Add the competency chart
        #[arg(long)]
        charts: bool,
    },

    /// Check an analysis JSON file without rendering it
    Validate {
        /// Analysis result produced by the model
        #[arg(value_name = "ANALYSIS.json")]
        input: PathBuf,
    },

    /// Show what would be extracted from a file
    Info {
        /// Input resume file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Paginated PDF document
    Pdf,
    /// Plain text preview
    Text,
    /// Layout instructions as JSON
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Pdf => OutputFormat::Pdf,
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            input,
            output,
            json,
            timeout,
        } => cmd_extract(&input, output.as_deref(), json, timeout),
        Commands::Report {
            input,
            output,
            format,
            date,
            charts,
        } => cmd_report(&input, output.as_deref(), format, date.as_deref(), charts),
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        if let Some(hint) = e
            .downcast_ref::<hirelens::Error>()
            .and_then(hirelens::Error::remediation_hint)
        {
            eprintln!("{}: {}", "Hint".yellow(), hint);
        }
        std::process::exit(1);
    }
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    json: bool,
    timeout: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let options = if timeout == 0 {
        ExtractOptions::new().without_timeout()
    } else {
        ExtractOptions::new().with_timeout(Duration::from_secs(timeout))
    };

    let (sender, receiver) = progress_channel(PROGRESS_CHANNEL_CAPACITY);
    let supervisor = ExtractionSupervisor::new(options).with_progress(sender);

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}")?
            .progress_chars("#>-"),
    );

    let path = input.to_path_buf();
    let worker = thread::spawn(move || supervisor.extract_path(path));

    loop {
        match receiver.recv_timeout(Duration::from_millis(50)) {
            Ok(event) => {
                pb.set_position(event.percent as u64);
                pb.set_message(event.stage.label());
            }
            Err(RecvTimeoutError::Timeout) if !worker.is_finished() => continue,
            Err(_) => break,
        }
    }

    let result = worker
        .join()
        .map_err(|_| "extraction thread panicked".to_string())?;
    let doc = match result {
        Ok(doc) => {
            pb.finish_with_message("Done!");
            doc
        }
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };

    let content = if json {
        serde_json::to_string_pretty(&doc)?
    } else {
        doc.text.clone()
    };

    if let Some(path) = output {
        fs::write(path, &content)?;
        println!(
            "{} {} ({} characters, {})",
            "Saved to".green(),
            path.display(),
            doc.char_count,
            doc.strategy_used
        );
    } else {
        println!("{}", content);
    }

    Ok(())
}

fn cmd_report(
    input: &Path,
    output: Option<&Path>,
    format: Format,
    date: Option<&str>,
    charts: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let analysis = fs::read_to_string(input)?;

    let mut builder = Hirelens::new();
    if let Some(date) = date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| format!("Invalid date '{}': {}", date, e))?;
        builder = builder.with_date(date);
    }
    if charts {
        builder = builder.with_charts();
    }

    let report = builder.analysis(&analysis)?.render(format.into())?;

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let path = output_dir.join(&report.filename);
    fs::write(&path, &report.bytes)?;

    println!(
        "{} {} ({} pages, {} bytes)",
        "Saved to".green(),
        path.display(),
        report.page_count,
        report.len()
    );

    Ok(())
}

fn cmd_validate(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let analysis = fs::read_to_string(input)?;
    let model = parse_analysis_response(&analysis)?;
    let overall = hirelens::overall_score(&model);
    let tier = hirelens::RecommendationTier::from_score(overall);

    println!("{} {}", "Valid analysis:".green().bold(), input.display());
    println!("{}: {}%", "Overall score".bold(), overall);
    println!("{}: {}", "Tier".bold(), tier);
    println!(
        "{}: {}",
        "Recommendation".bold(),
        if model.hiring_recommendation.is_empty() {
            "-"
        } else {
            model.hiring_recommendation.as_str()
        }
    );

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let limits = ExtractOptions::default();
    let bytes = InputFile::open_with_limit(input, limits.max_file_size)?.bytes;
    let name = input.to_string_lossy();
    let sniffed = sniff(&name, &bytes)?;

    println!("{}", "File Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), sniffed.format);
    println!(
        "{}: {} bytes (limit {})",
        "Size".bold(),
        bytes.len(),
        limits.max_file_size
    );

    let signature = match detect_signature(&bytes) {
        Signature::Pdf(header) => format!("PDF {}", header.version),
        Signature::Zip => "ZIP package".to_string(),
        Signature::Unknown => "unknown".to_string(),
    };
    let marker = if sniffed.signature.matches(sniffed.format) {
        "ok".green()
    } else {
        "mismatch".yellow()
    };
    println!("{}: {} ({})", "Signature".bold(), signature, marker);

    if sniffed.format == SourceFormat::Pdf {
        match LopdfLoader.load(&bytes) {
            Ok(backend) => println!("{}: {}", "Pages".bold(), backend.pages().len()),
            Err(e) => println!("{}: {}", "Pages".bold(), e.to_string().yellow()),
        }
    }

    let strategies: Vec<String> = ExtractionSupervisor::new(limits)
        .plan()
        .strategies(sniffed.format)
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("{}: {}", "Strategies".bold(), strategies.join(" -> "));

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "hirelens".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Resume extraction and HR report generation");
    println!();
    println!("License: MIT");
}
