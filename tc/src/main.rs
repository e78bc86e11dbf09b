//! task-cli - conversational task planner
//!
//! CLI entry point: planning conversation, saved-plan browsing, config display.

use std::fs;
use std::future::Future;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result, bail};
use tracing::{debug, info, warn};

use taskcli::cli::{Cli, Command, OutputFormat, get_log_path};
use taskcli::config::{self, Config};
use taskcli::format::{format_as_json, format_as_markdown};
use taskcli::llm::{LlmError, create_client};
use taskcli::prompts::PromptLoader;
use taskcli::render::{self, Interrupted, MarkdownRenderer, Prompter};
use taskcli::session::{self, Conversation, ConversationError, SessionConfig};
use taskcli::storage::{PlanStore, StorageError};
use taskcli::{ClarifyingQuestion, Plan};

const EXIT_INTERRUPTED: u8 = 130;

fn parse_level(s: &str) -> Option<tracing::Level> {
    match s.to_uppercase().as_str() {
        "TRACE" => Some(tracing::Level::TRACE),
        "DEBUG" => Some(tracing::Level::DEBUG),
        "INFO" => Some(tracing::Level::INFO),
        "WARN" | "WARNING" => Some(tracing::Level::WARN),
        "ERROR" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => parse_level(s).unwrap_or_else(|| {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }),
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    if let Err(e) = setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()) {
        eprintln!("Warning: logging disabled: {e:#}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

async fn run(cli: Cli) -> Result<()> {
    debug!(command = ?cli.command, "run: dispatching command");
    let Some(command) = cli.command else {
        return Ok(());
    };
    if let Command::Version = command {
        return cmd_version();
    }

    let config = config::init(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(model = %config.llm.model, "task-cli loaded config");
    let renderer = MarkdownRenderer::new(!cli.no_color && std::io::stdout().is_terminal());

    match command {
        Command::Plan {
            task,
            format,
            output,
            max_questions,
            skip_questions,
            save,
        } => {
            debug!(?format, ?output, ?max_questions, skip_questions, save, "run: matched Plan command");
            cmd_plan(&config, &renderer, task, format, output, max_questions, skip_questions, save).await
        }
        Command::Config => cmd_config(&config),
        Command::List => cmd_list(&config),
        Command::Load { name, format } => cmd_load(&config, &renderer, &name, format),
        Command::Version => cmd_version(),
    }
}

/// Print an error and pick the exit code
fn report(err: &eyre::Report) -> ExitCode {
    if err.chain().any(|cause| cause.is::<Interrupted>()) {
        println!();
        render::print_warning("Cancelled by user.");
        return ExitCode::from(EXIT_INTERRUPTED);
    }

    if let Some(llm_err) = find_llm_error(err) {
        warn!(error = %llm_err, "report: provider failure");
        render::print_llm_error(llm_err);
    } else if let Some(StorageError::NotFound(path)) = err.chain().find_map(|c| c.downcast_ref::<StorageError>()) {
        render::print_error("Plan not found", &path.display().to_string());
        render::print_info("Use 'task-cli list' to see available plans.");
    } else if let Some(ConversationError::PlanParse { .. }) =
        err.chain().find_map(|c| c.downcast_ref::<ConversationError>())
    {
        render::print_error("Error generating plan", &format!("{err:#}"));
    } else {
        render::print_error("Error", &format!("{err:#}"));
    }
    ExitCode::FAILURE
}

fn find_llm_error(err: &eyre::Report) -> Option<&LlmError> {
    err.chain().find_map(|cause| {
        cause
            .downcast_ref::<LlmError>()
            .or_else(|| match cause.downcast_ref::<ConversationError>() {
                Some(ConversationError::Llm(e)) => Some(e),
                _ => None,
            })
    })
}

/// Await a model call, giving up if Ctrl+C arrives first
async fn interruptible<T, F>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T, ConversationError>>,
{
    tokio::select! {
        res = fut => Ok(res?),
        _ = tokio::signal::ctrl_c() => {
            debug!("interruptible: ctrl-c received");
            Err(Interrupted.into())
        }
    }
}

/// Run the planning conversation and output the plan
async fn cmd_plan(
    config: &Config,
    renderer: &MarkdownRenderer,
    task: Option<String>,
    format: OutputFormat,
    output: Option<PathBuf>,
    max_questions: Option<u32>,
    skip_questions: bool,
    save: bool,
) -> Result<()> {
    debug!(?task, "cmd_plan: called");
    let task = match task {
        Some(task) => task,
        None => {
            render::print_welcome();
            Prompter::new()?.read_line("What task would you like to plan?")?
        }
    };
    if task.trim().is_empty() {
        bail!("Task description cannot be empty.");
    }

    let llm = create_client(&config.llm)?;
    let mut session_config = SessionConfig::from_config(config);
    if let Some(n) = max_questions {
        session_config = session_config.with_max_questions(n);
    }
    let project_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let mut conversation = Conversation::new(llm, session_config, PromptLoader::new(project_root));
    let mut prompter = Prompter::new()?;

    println!();
    render::print_info(&format!("Planning task: {task}"));

    if skip_questions {
        render::print_warning("Skipping questions, generating plan directly...");
        interruptible(conversation.start(&task)).await?;
        conversation.force_ready();
    } else {
        let mut questions = interruptible(conversation.start(&task)).await?;
        while !questions.is_empty() {
            let answers = ask_batch(&mut prompter, &questions)?;
            if conversation.is_ready() {
                // Cap was hit by this batch; keep the answers without another round-trip
                conversation.add_context(&answers);
                break;
            }
            questions = interruptible(conversation.answer(&answers)).await?;
        }
        if !conversation.is_ready() {
            // Model sent an empty question batch without signalling ready
            debug!(questions_asked = conversation.questions_asked(), "cmd_plan: no more questions");
            conversation.force_ready();
        }
        println!();
        render::print_success("Great! Generating your task plan...");
    }

    let plan = interruptible(conversation.generate_plan()).await?;
    let text = match format {
        OutputFormat::Json => format_as_json(&plan)?,
        OutputFormat::Markdown => format_as_markdown(&plan),
    };

    match &output {
        Some(path) => {
            fs::write(path, &text).context(format!("Failed to write {}", path.display()))?;
            render::print_success(&format!("Plan saved to: {}", path.display()));
        }
        None => print_plan_text(renderer, &text, format),
    }

    let store = PlanStore::new(config.storage.expanded_plans_dir());
    let should_save = save
        || (output.is_none()
            && prompter.confirm(&format!("\nSave this plan to {}?", store.dir().display()), false)?);
    if should_save {
        save_plan(&store, &plan);
    }
    Ok(())
}

/// Ask every question in the batch and combine the answers into one message
fn ask_batch(prompter: &mut Prompter, questions: &[ClarifyingQuestion]) -> Result<String> {
    let total = questions.len();
    let mut answers = Vec::with_capacity(total);
    for (i, question) in questions.iter().enumerate() {
        render::print_question(i + 1, total, question);
        answers.push(prompter.read_line("Your answer:")?);
    }
    Ok(session::combine_answers(questions, &answers))
}

fn save_plan(store: &PlanStore, plan: &Plan) {
    match store.save(plan) {
        Ok(base) => {
            println!();
            render::print_success("Plan saved!");
            println!("  JSON: {}.json", base.display());
            println!("  Markdown: {}.md", base.display());
        }
        Err(e) => {
            warn!(error = %e, "save_plan: failed");
            render::print_error("Failed to save plan", &e.to_string());
        }
    }
}

fn print_plan_text(renderer: &MarkdownRenderer, text: &str, format: OutputFormat) {
    match format {
        OutputFormat::Markdown => println!("{}", renderer.render(text)),
        OutputFormat::Json => println!("{text}"),
    }
}

/// Show current configuration with the API key masked
fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    let key_state = match config.llm.api_key() {
        Some(_) => format!("{}... {}", "*".repeat(20), "(set)".green()),
        None => "(not set)".red().to_string(),
    };

    println!("{}", "Current Configuration".bold().green());
    println!("{} {}", "Model:".bold(), config.llm.model);
    println!("{} {}", "Max Tokens:".bold(), config.llm.max_tokens);
    println!("{} {}", "Max Questions:".bold(), config.conversation.max_questions);
    println!("{} {}", "Plans Dir:".bold(), config.storage.expanded_plans_dir().display());
    println!("{} {} {}", "API Key:".bold(), key_state, format!("[{}]", config.llm.api_key_env).dimmed());
    println!("{} {}", "Log File:".bold(), get_log_path().display());
    Ok(())
}

/// List saved plans, newest first
fn cmd_list(config: &Config) -> Result<()> {
    debug!("cmd_list: called");
    let store = PlanStore::new(config.storage.expanded_plans_dir());
    let plans = store.list()?;

    if plans.is_empty() {
        render::print_warning("No saved plans found.");
        render::print_info("Create a plan with: task-cli plan \"your task\"");
        return Ok(());
    }

    println!("{}", "Saved Plans".bold());
    print!("{}", render::plans_table(&plans));
    println!();
    render::print_info("Load a plan with: task-cli load <filename>");
    Ok(())
}

/// Print a saved plan
fn cmd_load(config: &Config, renderer: &MarkdownRenderer, name: &str, format: OutputFormat) -> Result<()> {
    debug!(%name, ?format, "cmd_load: called");
    let store = PlanStore::new(config.storage.expanded_plans_dir());
    let plan = store.load(name)?;
    let text = match format {
        OutputFormat::Json => format_as_json(&plan)?,
        OutputFormat::Markdown => format_as_markdown(&plan),
    };
    print_plan_text(renderer, &text, format);
    Ok(())
}

fn cmd_version() -> Result<()> {
    println!("{} version {}", "task-cli".bold(), env!("GIT_DESCRIBE"));
    Ok(())
}
