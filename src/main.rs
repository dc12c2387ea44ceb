//! # Timesheet CLI
//!
//! Command-line interface for rendering and collecting timesheets.
//!
//! ## Usage
//!
//! ```bash
//! # Render a sheet to a PNG file
//! timesheet render --template template.png --fields shift.json --strokes sig.json --out sheet.png
//!
//! # Render with a custom layout and TrueType font
//! timesheet render --template template.png --layout layout.json --font Inter.ttf \
//!     --fields shift.json --signature sig.png --out sheet.png
//!
//! # Render and upload to Telegram (TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID)
//! timesheet render --template template.png --fields shift.json --signature sig.png --upload
//!
//! # Run the HTTP server, storing submissions in a directory
//! timesheet serve --template template.png --upload-dir submissions
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timesheet::{
    TimesheetError,
    config::{UploadTarget, load_font, load_layout},
    record::FormFields,
    render::{Compositor, TemplateSource},
    server::{AppState, DEFAULT_MAX_UPLOAD_BYTES, ServerConfig},
    signature::{StrokeRecording, flatten_onto_white},
    submit::{SignatureInput, Submission, Submitter, status_message},
};

/// Timesheet - template compositing renderer
#[derive(Parser, Debug)]
#[command(name = "timesheet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that renders.
#[derive(Args, Debug)]
struct RenderSetup {
    /// Template image (PNG or JPEG)
    #[arg(long, value_name = "FILE")]
    template: PathBuf,

    /// Layout JSON overriding the built-in coordinates
    #[arg(long, value_name = "FILE")]
    layout: Option<PathBuf>,

    /// TrueType/OpenType font (defaults to the built-in bitmap font)
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,
}

/// Where uploads go. Telegram is used when neither option is set.
#[derive(Args, Debug)]
struct UploadOptions {
    /// Store submissions in this directory
    #[arg(long, value_name = "DIR")]
    upload_dir: Option<PathBuf>,

    /// Forward submissions to an `/api/submit`-style endpoint
    #[arg(long, value_name = "URL")]
    upload_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render a timesheet to PNG, optionally uploading it
    Render {
        #[command(flatten)]
        setup: RenderSetup,

        /// Form fields as a JSON object of strings
        #[arg(long, value_name = "FILE")]
        fields: PathBuf,

        /// Signature raster (white background, dark ink)
        #[arg(long, value_name = "FILE", conflicts_with = "strokes")]
        signature: Option<PathBuf>,

        /// Signature as a recorded stroke JSON
        #[arg(long, value_name = "FILE")]
        strokes: Option<PathBuf>,

        /// Output PNG path
        #[arg(long, value_name = "FILE", default_value = "timesheet.png")]
        out: PathBuf,

        /// Upload the result instead of only writing it
        #[arg(long)]
        upload: bool,

        #[command(flatten)]
        target: UploadOptions,
    },

    /// Run the HTTP server
    Serve {
        #[command(flatten)]
        setup: RenderSetup,

        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Request body limit in bytes
        #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,

        #[command(flatten)]
        target: UploadOptions,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "timesheet=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), TimesheetError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            setup,
            fields,
            signature,
            strokes,
            out,
            upload,
            target,
        } => {
            let compositor = Arc::new(build_compositor(&setup)?);
            let submission = Submission {
                fields: read_fields(&fields)?,
                signature: read_signature(signature.as_deref(), strokes.as_deref())?,
            };

            if upload {
                let uploader =
                    UploadTarget::resolve(target.upload_dir, target.upload_url).build()?;
                let submitter = Submitter::new(compositor, uploader);
                let result = submitter.submit(submission).await;
                println!("{}", status_message(&result));
                let outcome = result?;
                println!("Uploaded {} (id {})", outcome.filename, outcome.receipt.id);
            } else {
                let prepared = submission.prepare(&compositor)?;
                let png = compositor.render_png(&prepared.record, &prepared.signature)?;
                std::fs::write(&out, png)?;
                println!("Saved to {}", out.display());
            }
        }

        Commands::Serve {
            setup,
            listen,
            max_upload_bytes,
            target,
        } => {
            let compositor = build_compositor(&setup)?;
            // Fail at startup rather than on the first request
            compositor.template().load()?;

            let uploader = UploadTarget::resolve(target.upload_dir, target.upload_url).build()?;
            let config = ServerConfig {
                listen_addr: listen,
                max_upload_bytes,
            };
            let state = AppState::new(config, Arc::new(compositor), uploader);
            timesheet::server::serve(state).await?;
        }
    }

    Ok(())
}

fn build_compositor(setup: &RenderSetup) -> Result<Compositor, TimesheetError> {
    let layout = load_layout(setup.layout.as_deref())?;
    let font = load_font(setup.font.as_deref())?;
    Ok(Compositor::new(
        TemplateSource::Path(setup.template.clone()),
        layout,
        font,
    ))
}

fn read_fields(path: &Path) -> Result<FormFields, TimesheetError> {
    let json = std::fs::read_to_string(path)?;
    serde_json::from_str(&json)
        .map_err(|e| TimesheetError::Config(format!("Invalid fields file {}: {}", path.display(), e)))
}

fn read_signature(
    signature: Option<&Path>,
    strokes: Option<&Path>,
) -> Result<Option<SignatureInput>, TimesheetError> {
    if let Some(path) = signature {
        let image = image::open(path)
            .map_err(|e| TimesheetError::Image(format!("Failed to read {}: {}", path.display(), e)))?;
        return Ok(Some(SignatureInput::Raster(flatten_onto_white(&image))));
    }
    if let Some(path) = strokes {
        let recording: StrokeRecording = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        return Ok(Some(SignatureInput::Strokes(recording)));
    }
    Ok(None)
}
