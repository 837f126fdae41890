//! Extract command - run one extraction without starting the server.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use tracing::info;

use docintel_core::PdfTextExtractor;
use docintel_server::AppState;
use docintel_server::api::UploadKind;
use docintel_server::service::{load_conversation, load_easy_ocr, load_ocr};

use super::load_config;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Engine to run (default: pdf for .pdf files, ocr otherwise)
    #[arg(short, long, value_enum)]
    engine: Option<Engine>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Mirrors the three upload routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Engine {
    /// `/extract-text/`
    Pdf,
    /// `/extract-ocr/`
    Ocr,
    /// `/extract-ocr-easy/` (OCR plus LLM validation)
    Easy,
}

impl Engine {
    fn upload_kind(&self) -> UploadKind {
        match self {
            Engine::Pdf => UploadKind::Pdf,
            Engine::Ocr | Engine::Easy => UploadKind::Image,
        }
    }
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let file_name = args
        .input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let engine = args.engine.unwrap_or(if UploadKind::Pdf.accepts(&file_name) {
        Engine::Pdf
    } else {
        Engine::Ocr
    });
    engine.upload_kind().check(&file_name)?;

    let bytes = fs::read(&args.input)?;
    info!("Running {:?} on {} ({} bytes)", engine, file_name, bytes.len());

    // Only load what the chosen engine needs.
    let state = AppState::new(Arc::new(PdfTextExtractor::new()));
    let json = match engine {
        Engine::Pdf => serde_json::to_string_pretty(&state.extract_pdf(bytes).await?)?,
        Engine::Ocr => {
            let state = state.with_ocr(load_ocr(&config));
            serde_json::to_string_pretty(&state.extract_ocr(bytes).await?)?
        }
        Engine::Easy => {
            let state = state
                .with_easy_ocr(load_easy_ocr(&config))
                .with_conversation(load_conversation(&config));
            serde_json::to_string_pretty(&state.extract_and_validate(bytes).await?)?
        }
    };

    match args.output {
        Some(path) => {
            fs::write(&path, &json)?;
            eprintln!(
                "{} Wrote {} in {:.2}s",
                style("✓").green(),
                path.display(),
                start.elapsed().as_secs_f64()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
