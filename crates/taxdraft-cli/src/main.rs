use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use taxdraft_assist::{CitationAudit, DraftTask, NoticeAssistant};
use taxdraft_core::config_file::{self, ConfigFile};
use taxdraft_extract::{Document, ExtractionReport, ExtractionResult};
use tracing_subscriber::EnvFilter;

mod config;
mod output;

use config::{ExtractFlags, ModelFlags};
use output::ColorMode;

/// Extract text from GST notices and draft replies grounded in verified case law
#[derive(Parser, Debug)]
#[command(name = "taxdraft", version, about, long_about = None)]
struct Cli {
    /// More log output on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ExtractArgs {
    /// Skip the text layer and read every page with OCR
    #[arg(long)]
    force_ocr: bool,

    /// Fall back to OCR in the same run when the text layer is missing or short
    #[arg(long, conflicts_with = "force_ocr")]
    auto_ocr: bool,

    /// Minimum characters for extracted text to count as usable [default: 50]
    #[arg(long, value_name = "N")]
    min_chars: Option<usize>,

    /// Raster magnification for OCR, in (0, 4] [default: 2.0]
    #[arg(long, value_name = "F")]
    ocr_scale: Option<f32>,

    /// Tesseract language(s), e.g. eng or eng+hin [default: eng]
    #[arg(long, value_name = "LANG")]
    ocr_lang: Option<String>,
}

impl ExtractArgs {
    fn flags(&self) -> ExtractFlags {
        ExtractFlags {
            auto_ocr: self.auto_ocr,
            min_chars: self.min_chars,
            ocr_scale: self.ocr_scale,
            ocr_lang: self.ocr_lang.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the text of a notice PDF
    Extract {
        /// Path to the notice PDF
        file_path: PathBuf,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Print the result as JSON ({success, text, method, error})
        #[arg(long)]
        json: bool,

        /// Write the text (or JSON) to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize a notice, research case law and draft a reply as .docx
    Draft {
        /// Path to the notice PDF
        file_path: PathBuf,

        /// What to draft, or @FILE to read the instructions from a file
        #[arg(short, long, required_unless_present = "task", conflicts_with = "task")]
        instructions: Option<String>,

        /// Canned task instead of free-form instructions:
        /// adjournment, retraction, scn-summary or scn-reply
        #[arg(short, long, value_name = "TASK")]
        task: Option<DraftTask>,

        /// Extra facts for --task (hearing dates, circumstances), or @FILE
        #[arg(long, requires = "task")]
        facts: Option<String>,

        #[command(flatten)]
        extract: ExtractArgs,

        /// Where to write the drafted document
        #[arg(short, long, default_value = "draft.docx")]
        output: PathBuf,

        /// OpenAI API key
        #[arg(long)]
        openai_key: Option<String>,

        /// Perplexity API key
        #[arg(long)]
        perplexity_key: Option<String>,

        /// Model for summary and drafting [default: gpt-4o-mini]
        #[arg(long)]
        drafting_model: Option<String>,

        /// Model for case-law research [default: sonar-pro]
        #[arg(long)]
        research_model: Option<String>,
    },

    /// Convert a plain-text file into a .docx, one paragraph per line
    Export {
        /// Text file to convert
        file_path: PathBuf,

        /// Where to write the document
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "warn,taxdraft_extract=info,taxdraft_assist=info,taxdraft_core=info",
        _ => {
            "info,taxdraft_extract=debug,taxdraft_assist=debug,taxdraft_core=debug,\
             taxdraft_ocr=debug,taxdraft_pdf_mupdf=debug"
        }
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let color = ColorMode(!cli.no_color && std::env::var_os("NO_COLOR").is_none());
    let file_config = config_file::load_config();

    match cli.command {
        Command::Extract {
            file_path,
            extract,
            json,
            output,
        } => run_extract(&file_path, &extract, json, output, &file_config, color).await,
        Command::Draft {
            file_path,
            instructions,
            task,
            facts,
            extract,
            output,
            openai_key,
            perplexity_key,
            drafting_model,
            research_model,
        } => {
            let models = ModelFlags {
                openai_key,
                perplexity_key,
                drafting_model,
                research_model,
            };
            let request = match (task, instructions) {
                (Some(task), _) => DraftRequest::Task { task, facts },
                (None, Some(instructions)) => DraftRequest::Instructions(instructions),
                (None, None) => anyhow::bail!("pass --instructions or --task"),
            };
            run_draft(
                &file_path,
                &request,
                &extract,
                &models,
                &output,
                &file_config,
                color,
            )
            .await
        }
        Command::Export { file_path, output } => {
            let text = std::fs::read_to_string(&file_path)
                .with_context(|| format!("failed to read {}", file_path.display()))?;
            taxdraft_assist::write_docx(&text, &output)?;
            eprintln!("Wrote {}", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Open the document and run extraction off the async runtime.
async fn extract_document(
    file_path: &Path,
    args: &ExtractArgs,
    file_config: &ConfigFile,
) -> anyhow::Result<ExtractionReport> {
    let (config, ocr) =
        config::resolve_extraction(&args.flags(), file_config, &config::process_env)?;
    let document = Document::open(file_path)
        .with_context(|| format!("failed to read {}", file_path.display()))?;
    if !document.has_pdf_header() {
        tracing::warn!(path = %file_path.display(), "file does not look like a PDF");
    }

    let force_ocr = args.force_ocr;
    let report = tokio::task::spawn_blocking(move || {
        taxdraft_extract::default_extractor(config, &ocr).extract_report(&document, force_ocr)
    })
    .await
    .context("extraction task panicked")?;
    Ok(report)
}

async fn run_extract(
    file_path: &Path,
    args: &ExtractArgs,
    json: bool,
    output: Option<PathBuf>,
    file_config: &ConfigFile,
    color: ColorMode,
) -> anyhow::Result<ExitCode> {
    let report = extract_document(file_path, args, file_config).await?;

    let mut stderr = std::io::stderr();
    let mut writer: Box<dyn Write> = match output {
        Some(ref path) => Box::new(
            std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };

    if json {
        serde_json::to_writer_pretty(&mut writer, &report.result)?;
        writeln!(writer)?;
        if !report.diagnostics.is_empty() {
            output::print_extraction_status(&mut stderr, &report, color)?;
        }
    } else {
        output::print_extraction_status(&mut stderr, &report, color)?;
        if let Some(text) = report.result.text() {
            writeln!(writer, "{text}")?;
        }
    }
    writer.flush()?;

    Ok(if report.result.success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// What the `draft` command was asked to produce.
enum DraftRequest {
    /// Free-form instructions through summary, research and drafting.
    Instructions(String),
    /// A canned task over the notice text plus optional extra facts.
    Task {
        task: DraftTask,
        facts: Option<String>,
    },
}

async fn run_draft(
    file_path: &Path,
    request: &DraftRequest,
    args: &ExtractArgs,
    models: &ModelFlags,
    output: &Path,
    file_config: &ConfigFile,
    color: ColorMode,
) -> anyhow::Result<ExitCode> {
    // Fail on missing keys or instructions before any slow work.
    let request = match request {
        DraftRequest::Instructions(arg) => {
            DraftRequest::Instructions(config::read_instructions(arg)?)
        }
        DraftRequest::Task { task, facts } => DraftRequest::Task {
            task: *task,
            facts: facts.as_deref().map(config::read_instructions).transpose()?,
        },
    };
    let (drafting, research) = config::resolve_models(models, file_config, &config::process_env)?;
    let assistant = NoticeAssistant::new(Arc::new(drafting), Arc::new(research));

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    let bar = output::spinner("Extracting notice text...");
    let report = extract_document(file_path, args, file_config).await;
    bar.finish_and_clear();
    let report = report?;
    output::print_extraction_status(&mut stderr, &report, color)?;
    let ExtractionResult::Success { text, .. } = &report.result else {
        return Ok(ExitCode::FAILURE);
    };

    let (note, draft) = match request {
        DraftRequest::Instructions(instructions) => {
            let bar = output::spinner("Summarizing notice...");
            let summary = assistant.summarize_notice(text).await;
            bar.finish_and_clear();
            let summary = summary.context("summary failed")?;
            output::print_section(&mut stdout, "Notice summary", &summary, color)?;

            let bar = output::spinner("Researching case law...");
            let note = assistant.research_support(&instructions, &summary).await;
            bar.finish_and_clear();
            let note = note.context("research failed")?;
            output::print_section(&mut stdout, "Research note", &note, color)?;

            let bar = output::spinner("Drafting document...");
            let draft = assistant.draft_document(&instructions, &summary, &note).await;
            bar.finish_and_clear();
            (Some(note), draft.context("drafting failed")?)
        }
        DraftRequest::Task { task, facts } => {
            let details = task_details(text, facts.as_deref());
            let bar = output::spinner(&format!("Running {task}..."));
            let result = assistant.run_task(task, &details).await;
            bar.finish_and_clear();
            let result = result.with_context(|| format!("{task} failed"))?;
            if let Some(note) = &result.research_note {
                output::print_section(&mut stdout, "Research note", note, color)?;
            }
            (result.research_note, result.draft)
        }
    };

    if let Some(note) = &note {
        let audit = CitationAudit::audit(note, &draft);
        output::print_citation_audit(&mut stderr, &audit, color)?;
    }

    taxdraft_assist::write_docx(&draft, output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    eprintln!("Wrote {}", output.display());
    Ok(ExitCode::SUCCESS)
}

/// The notice text, followed by any facts the user added.
fn task_details(notice_text: &str, facts: Option<&str>) -> String {
    match facts {
        Some(facts) if !facts.trim().is_empty() => {
            format!("{notice_text}\n\nAdditional facts:\n{}", facts.trim())
        }
        _ => notice_text.to_string(),
    }
}
