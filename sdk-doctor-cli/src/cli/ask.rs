//! Ask command - interactive Q&A loop

use anyhow::{Context, Result};
use console::style;
use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::{load_project_config, UserConfig};
use crate::models::Report;
use crate::qa::{build_generator, ContextLimits, ProjectContext, QaError, QaSession};

const HELP: &str = "\
Commands:
  :context on|off   Include project excerpts in each question
  :rescan           Re-read the project excerpts
  :help             Show this help
  quit, exit, q     Leave the session";

/// What one input line asks the loop to do
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    Skip,
    Help,
    Context(bool),
    Rescan,
    Unknown(&'a str),
    Question(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => Input::Skip,
        "quit" | "exit" | "q" => Input::Quit,
        ":help" => Input::Help,
        ":context on" => Input::Context(true),
        ":context off" => Input::Context(false),
        ":rescan" => Input::Rescan,
        _ if line.starts_with(':') => Input::Unknown(line),
        _ => Input::Question(line),
    }
}

struct AskState<'a> {
    root: &'a Path,
    scan: crate::config::ScanConfig,
    context_enabled: bool,
    context: Option<ProjectContext>,
}

impl AskState<'_> {
    fn rescan(&mut self) -> Result<()> {
        let ctx = ProjectContext::scan(self.root, &self.scan, &ContextLimits::default())
            .with_context(|| format!("Failed to read project at {}", self.root.display()))?;
        eprintln!(
            "{} {} source files from {}",
            style("Context:").dim(),
            ctx.file_count(),
            self.root.display()
        );
        self.context = Some(ctx);
        Ok(())
    }

    fn enable_context(&mut self) -> Result<()> {
        if self.context.is_none() {
            self.rescan()?;
        }
        self.context_enabled = true;
        Ok(())
    }

    fn active_context(&self) -> Option<&ProjectContext> {
        self.context.as_ref().filter(|_| self.context_enabled)
    }
}

pub fn run(path: &Path, report: Option<&Path>, context: bool, knowledge: Option<&Path>) -> Result<()> {
    let user_config = UserConfig::load()?;
    let retriever = super::load_retriever(knowledge, &user_config)?;
    let generator = build_generator(&user_config)
        .context("Cannot start Q&A; `sdk-doctor lookup` works without a generator")?;
    let session = QaSession::new(retriever, generator)
        .with_context_max_lines(user_config.context_max_lines());

    let report = report
        .map(|p| {
            Report::from_json_file(p)
                .with_context(|| format!("Failed to load report {}", p.display()))
        })
        .transpose()?;

    let mut state = AskState {
        root: path,
        scan: load_project_config(path).scan,
        context_enabled: false,
        context: None,
    };
    if context {
        state.enable_context()?;
    }

    println!("{}", style("TrustArc SDK assistant").bold());
    if let Some(r) = &report {
        println!("Platform: {} (score {}/100)", style(r.platform).cyan(), r.score);
    }
    println!("Generator: {}", session.generator_description());
    println!("Type :help for commands, quit to leave.\n");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", style(">").green().bold());
        io::stdout().flush().ok();

        let Some(line) = lines.next() else { break };
        let line = line.context("Failed to read from stdin")?;

        match parse_input(&line) {
            Input::Quit => break,
            Input::Skip => continue,
            Input::Help => println!("{HELP}"),
            Input::Context(true) => match state.enable_context() {
                Ok(()) => println!("Project context on"),
                Err(e) => eprintln!("{} {:#}", style("error:").red(), e),
            },
            Input::Context(false) => {
                state.context_enabled = false;
                println!("Project context off");
            }
            Input::Rescan => {
                if let Err(e) = state.rescan() {
                    eprintln!("{} {:#}", style("error:").red(), e);
                }
            }
            Input::Unknown(cmd) => println!("Unknown command {cmd}; try :help"),
            Input::Question(question) => {
                match session.ask(question, report.as_ref(), state.active_context()) {
                    Ok(answer) => println!("\n{answer}\n"),
                    Err(e @ QaError::RetrievalMiss) => println!("{e}"),
                    Err(e) => eprintln!("{} {}", style("error:").red(), e),
                }
            }
        }
    }
    println!();
    Ok(())
}
