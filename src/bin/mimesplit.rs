//! Command-line front end: explode a MIME message into one file per leaf part.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use mimesplit::{
    ContentTypeFallback, Diagnostics, DiskStorage, ExtractError, ExtractorBuilder, IndentedTrace,
    Message, NamingPolicy, NoopDiagnostics,
};
use tokio::io::AsyncRead;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Message file to read; stdin when omitted or `-`
    input: Option<PathBuf>,

    /// Directory receiving the decoded parts
    #[arg(short, long, default_value = "out")]
    out_dir: PathBuf,

    /// Number synthesized names per sibling and never reuse a name
    #[arg(long)]
    unique_names: bool,

    /// Skip parts whose Content-Type does not parse instead of writing them
    #[arg(long)]
    reject_unparsable: bool,

    /// Maximum multipart nesting depth (top level is 1)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Do not print the part trace
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("mimesplit: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: &Args) -> Result<(), ExtractError> {
    let input: Box<dyn AsyncRead + Unpin + Send> = match args.input.as_deref() {
        None => Box::new(tokio::io::stdin()),
        Some(path) if path.as_os_str() == "-" => Box::new(tokio::io::stdin()),
        Some(path) => Box::new(tokio::fs::File::open(path).await.map_err(|err| {
            ExtractError::FatalInput {
                message: format!("cannot open `{}`: {err}", path.display()),
            }
        })?),
    };

    let message = Message::read(input).await?;
    println!("{}", message.summary());

    if args.quiet {
        extract(args, message, NoopDiagnostics).await
    } else {
        extract(args, message, IndentedTrace::new(std::io::stdout())).await
    }
}

async fn extract<R, D>(args: &Args, message: Message<R>, diagnostics: D) -> Result<(), ExtractError>
where
    R: AsyncRead + Unpin + Send,
    D: Diagnostics,
{
    let storage = DiskStorage::builder().destination(&args.out_dir).build()?;

    let mut builder = ExtractorBuilder::new()
        .naming(if args.unique_names {
            NamingPolicy::Unique
        } else {
            NamingPolicy::Literal
        })
        .content_type_fallback(if args.reject_unparsable {
            ContentTypeFallback::Reject
        } else {
            ContentTypeFallback::Leaf
        });
    if let Some(max_depth) = args.max_depth {
        builder = builder.max_depth(max_depth);
    }

    let mut extractor = builder.build_with_diagnostics(storage, diagnostics)?;
    let report = extractor.extract_message(message).await?;

    tracing::info!(
        outputs = report.outputs.len(),
        failures = report.failures.len(),
        "extraction finished"
    );
    println!(
        "\n{} part(s) written to {}, {} skipped",
        report.outputs.len(),
        args.out_dir.display(),
        report.failures.len()
    );

    Ok(())
}
