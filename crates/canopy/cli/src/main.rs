//! Canopy CLI
//!
//! `canopy check <file>` runs the DSL front end and prints diagnostics;
//! `canopy run <file>` checks and then executes the program against a demo
//! registry built from its own agent declarations.

use anyhow::Context;
use canopy_dsl::{parse_source, validate, SemanticError, SyntaxError};
use canopy_engine::{AgentRegistry, ExecutionResult, Runtime};
use canopy_types::Program;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "canopy", about = "Canopy agent platform CLI")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a program, printing all diagnostics
    Check {
        /// Path to the program source
        file: PathBuf,

        /// Emit diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a program, then execute it against a demo registry
    Run {
        /// Path to the program source
        file: PathBuf,

        /// Run only the named task instead of the whole program
        #[arg(long)]
        task: Option<String>,

        /// Emit the execution result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct Diagnostics {
    syntax_errors: Vec<SyntaxError>,
    semantic_errors: Vec<SemanticError>,
}

fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check { file, json } => {
            let (_, diagnostics) = load_program(&file)?;
            report(&diagnostics, json)?;
            if diagnostics.has_errors() {
                std::process::exit(1);
            }
        }
        Commands::Run { file, task, json } => {
            let (program, diagnostics) = load_program(&file)?;
            if diagnostics.has_errors() {
                report(&diagnostics, json)?;
                std::process::exit(1);
            }

            let registry = demo_registry(&program);
            let runtime = Runtime::new();
            let result = match task {
                Some(name) => runtime
                    .run_task(&program, &name, &registry)
                    .with_context(|| format!("cannot run task '{}'", name))?,
                None => runtime.run(&program, &registry),
            };
            render_result(&result, json)?;
            if result.failed_steps() > 0 || result.timed_out {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

impl Diagnostics {
    fn has_errors(&self) -> bool {
        !self.syntax_errors.is_empty() || !self.semantic_errors.is_empty()
    }
}

fn load_program(file: &Path) -> anyhow::Result<(Program, Diagnostics)> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;
    let (program, syntax_errors) = parse_source(&source);
    let semantic_errors = validate(&program);
    Ok((
        program,
        Diagnostics {
            syntax_errors,
            semantic_errors,
        },
    ))
}

fn report(diagnostics: &Diagnostics, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(diagnostics)?);
        return Ok(());
    }

    for err in &diagnostics.syntax_errors {
        eprintln!("syntax error: {}", err);
    }
    for err in &diagnostics.semantic_errors {
        eprintln!("semantic error: {}", err);
    }
    if diagnostics.has_errors() {
        eprintln!(
            "{} syntax, {} semantic error(s)",
            diagnostics.syntax_errors.len(),
            diagnostics.semantic_errors.len()
        );
    } else {
        println!("ok");
    }
    Ok(())
}

/// Build a registry from the program's own declarations: every declared
/// agent gets echoing `validate` and `process` handlers, so a checked
/// program always runs end to end.
fn demo_registry(program: &Program) -> AgentRegistry {
    let mut registry = AgentRegistry::new();
    for agent in &program.agents {
        registry.register(&agent.name);
        for capability in ["validate", "process"] {
            let agent_name = agent.name.clone();
            // The agent was registered on the line above
            let _ = registry.add_capability(&agent.name, capability, move |input| {
                Ok(format!("{} handled {}", agent_name, input))
            });
        }
    }
    registry
}

fn render_result(result: &ExecutionResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("run {}", result.run_id);
    println!(
        "  agents created:    {} [{}]",
        result.created_agents.len(),
        result.created_agents.join(", ")
    );
    println!(
        "  workflows deployed: {} [{}]",
        result.created_workflows.len(),
        result.created_workflows.join(", ")
    );
    println!(
        "  tasks assigned:    {} [{}]",
        result.assigned_tasks.len(),
        result.assigned_tasks.join(", ")
    );
    println!(
        "  failed steps: {}  timed out: {}  elapsed: {:?}",
        result.failed_steps(),
        result.timed_out,
        result.elapsed
    );
    println!("log:");
    for entry in &result.log {
        println!(
            "  [{}] {} {}",
            entry.timestamp.format("%H:%M:%S%.3f"),
            entry.level,
            entry.message
        );
    }
    Ok(())
}
