//! docmend CLI - document improvement tool

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docmend::{
    detect_format, improve, list_printers, Config, OutputFormat, Pipeline, PrintOutcome, Provider,
    RewritePath,
};

#[derive(Parser)]
#[command(name = "docmend")]
#[command(version)]
#[command(about = "Improve documents and write them back with formatting preserved", long_about = None)]
struct Cli {
    /// Input document file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on one file: extract, improve, save, print
    Process {
        /// Input document file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Directory for the improved document (defaults to DATA_DIR/processed)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Print the improved document after saving
        #[arg(long)]
        print: bool,

        /// Printer to use (overrides PRINTER_NAME)
        #[arg(long, env = "PRINTER_NAME")]
        printer: Option<String>,

        /// Rebuild from plain text instead of preserving DOCX formatting
        #[arg(long)]
        no_preserve: bool,
    },

    /// Watch the incoming directory and process files as they arrive
    Watch {
        /// Data directory root
        #[arg(short, long, value_name = "DIR", env = "DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// Poll interval in seconds
        #[arg(long, default_value = "5")]
        interval: u64,
    },

    /// Extract plain text from a document
    Extract {
        /// Input document file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Improve text from a file or stdin and write the result to stdout
    Improve {
        /// Input text file (stdin if not specified)
        #[arg(value_name = "FILE")]
        input: Option<PathBuf>,

        /// Show the change summary on stderr
        #[arg(long)]
        summary: bool,
    },

    /// List printers known to the system spooler
    Printers,

    /// Show document information
    Info {
        /// Input document file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Txt,
    Docx,
    Pdf,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Txt => OutputFormat::Txt,
            Format::Docx => OutputFormat::Docx,
            Format::Pdf => OutputFormat::Pdf,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Process {
            output,
            input,
            format,
            print,
            printer,
            no_preserve,
        }) => cmd_process(&input, format, output, print, printer, no_preserve),
        Some(Commands::Watch { data_dir, interval }) => cmd_watch(data_dir, interval),
        Some(Commands::Extract { input, output }) => cmd_extract(&input, output.as_deref()),
        Some(Commands::Improve { input, summary }) => cmd_improve(input.as_deref(), summary),
        Some(Commands::Printers) => cmd_printers(),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        None => {
            if let Some(input) = cli.input {
                cmd_process(&input, None, None, false, None, false)
            } else {
                println!("{}", "Usage: docmend <FILE>".yellow());
                println!("       docmend --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_config() -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::from_env()?)
}

fn cmd_process(
    input: &Path,
    format: Option<Format>,
    output: Option<PathBuf>,
    print: bool,
    printer: Option<String>,
    no_preserve: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config()?;
    if let Some(format) = format {
        config.output_format = format.into();
    }
    if output.is_some() {
        config.output_dir = output;
    }
    if print {
        config.auto_print = true;
    }
    if let Some(printer) = printer {
        config.printer_name = Some(printer);
    }
    if no_preserve {
        config.preserve_formatting = false;
    }
    config.ensure_dirs()?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(format!("Processing {}...", input.display()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let pipeline = Pipeline::new(config)?;
    let record = pipeline.process_file(input)?;

    pb.finish_and_clear();

    println!("{} {}", "Improved:".green().bold(), record.output_file.display());
    println!("  {} {}", "Changes:".cyan(), record.change_summary);
    println!(
        "  {} {} -> {} chars",
        "Length:".cyan(),
        record.original_length,
        record.improved_length
    );
    let path_label = match record.rewrite_path {
        RewritePath::Preserved => "formatting preserved",
        RewritePath::Plain => "plain rebuild",
    };
    println!("  {} {}", "Rewrite:".cyan(), path_label);
    match &record.print_outcome {
        PrintOutcome::Sent(printer) => {
            println!("  {} sent to {}", "Print:".cyan(), printer)
        }
        PrintOutcome::Failed(reason) => {
            println!("  {} {} ({})", "Print:".cyan(), "failed".yellow(), reason)
        }
        PrintOutcome::Skipped => {}
    }

    Ok(())
}

fn cmd_watch(data_dir: Option<PathBuf>, interval: u64) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config()?;
    if let Some(dir) = data_dir {
        config = config.with_data_dir(dir);
    }
    config.ensure_dirs()?;

    println!(
        "{} {}",
        "Watching:".green().bold(),
        config.incoming_dir().display()
    );
    println!("Drop documents there to process them. Press Ctrl+C to stop.");

    let pipeline = Pipeline::new(config)?;
    pipeline.watch(Duration::from_secs(interval))?;
    Ok(())
}

fn cmd_extract(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let text = docmend::extract_text(input)?;
    match output {
        Some(path) => {
            std::fs::write(path, &text)?;
            println!("{} {}", "Saved:".green().bold(), path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

fn cmd_improve(input: Option<&Path>, summary: bool) -> Result<(), Box<dyn std::error::Error>> {
    let hint = input
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    let text = match input {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            use std::io::Read;
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let config = load_config()?;
    let improver: Box<dyn improve::TextImprover> = match config.provider {
        Provider::Rules => Box::new(improve::RuleImprover::new()),
        Provider::OpenAi => Box::new(improve::OpenAiImprover::with_endpoint(
            config.openai_api_key.clone().unwrap_or_default(),
            &config.openai_base_url,
            &config.openai_model,
            config.max_processing_secs,
        )?),
    };

    let improvement = improver.improve(&text, hint.as_deref())?;
    println!("{}", improvement.improved_text);
    if summary {
        eprintln!("{} {}", "Changes:".cyan(), improvement.summary);
    }
    Ok(())
}

fn cmd_printers() -> Result<(), Box<dyn std::error::Error>> {
    let printers = list_printers()?;
    if printers.is_empty() {
        println!("{}", "No printers found".yellow());
        return Ok(());
    }
    for printer in printers {
        if printer.is_default {
            println!("{} {}", printer.name.green().bold(), "(default)".cyan());
        } else {
            println!("{}", printer.name);
        }
    }
    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let format = detect_format(input)?;
    let size = std::fs::metadata(input)?.len();

    if json {
        let registry = docmend::ExtractorRegistry::with_defaults();
        let mut info = serde_json::json!({
            "file": input.display().to_string(),
            "format": format.to_string(),
            "size_bytes": size,
        });
        if let Ok(extraction) = registry.extract_as(input, format) {
            info["chars"] = extraction.char_count().into();
            info["strategy"] = extraction.strategy.into();
            if let Some(pages) = extraction.pages {
                info["pages"] = pages.into();
            }
            if let Some(paragraphs) = extraction.paragraphs {
                info["paragraphs"] = paragraphs.into();
            }
            if let Some(encoding) = extraction.encoding {
                info["encoding"] = encoding.into();
            }
        }
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Document Information".green().bold());
    println!("  {} {}", "File:".cyan(), input.display());
    println!("  {} {}", "Format:".cyan(), format);
    println!("  {} {} bytes", "Size:".cyan(), size);

    let registry = docmend::ExtractorRegistry::with_defaults();
    match registry.extract_as(input, format) {
        Ok(extraction) => {
            println!("  {} {} chars", "Text:".cyan(), extraction.char_count());
            println!("  {} {}", "Strategy:".cyan(), extraction.strategy);
            if let Some(pages) = extraction.pages {
                println!("  {} {}", "Pages:".cyan(), pages);
            }
            if let Some(paragraphs) = extraction.paragraphs {
                println!("  {} {}", "Paragraphs:".cyan(), paragraphs);
            }
            if let Some(encoding) = extraction.encoding {
                println!("  {} {}", "Encoding:".cyan(), encoding);
            }
        }
        Err(e) => {
            println!("  {} {}", "Text:".cyan(), format!("unreadable ({e})").yellow());
        }
    }
    Ok(())
}
