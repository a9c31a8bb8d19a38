//! Per-run context: verbosity, progress display and the confirmation hook.
//!
//! Bulk operations (filter, slice, merge, download) ask for confirmation
//! before touching output. The question is answered by a [`Confirm`]
//! implementation injected into the [`RunContext`], so commands never read
//! the terminal themselves: `--accept-all` swaps in [`AcceptAll`], and tests
//! can script answers through [`StdinPrompt`] over an in-memory reader.

use crate::error::ToolboxError;
use crate::utils::progress::ProgressBar;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::debug;

/// Decides whether a bulk operation may proceed.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Accepts every prompt without asking.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Confirm for AcceptAll {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Line-based yes/no prompt.
///
/// Accepts `y`, `yes`, `Y`, `Yes`, `YES` and `n`, `no`, `N`, `No`, `NO`;
/// anything else is asked again. End of input counts as "no".
pub struct StdinPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for StdinPrompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            write!(self.output, "{} (y/n): ", question).context("Failed to write prompt")?;
            self.output.flush().context("Failed to write prompt")?;

            let mut answer = String::new();
            let read = self
                .input
                .read_line(&mut answer)
                .context("Failed to read answer")?;
            if read == 0 {
                return Ok(false);
            }

            match answer.trim() {
                "y" | "yes" | "Y" | "Yes" | "YES" => return Ok(true),
                "n" | "no" | "N" | "No" | "NO" => return Ok(false),
                _ => writeln!(self.output, "Please enter yes or no.")
                    .context("Failed to write prompt")?,
            }
        }
    }
}

/// Prompt on the terminal: question on stderr, answer from stdin.
///
/// Stdin is only locked while a question is pending.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl Confirm for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        StdinPrompt::new(std::io::stdin().lock(), std::io::stderr()).confirm(question)
    }
}

/// State shared by every command for one invocation.
pub struct RunContext {
    verbose: bool,
    show_progress: bool,
    confirmer: Box<dyn Confirm>,
}

impl RunContext {
    /// Context for a CLI run: terminal prompt unless `accept_all`.
    pub fn new(verbose: bool, show_progress: bool, accept_all: bool) -> Self {
        let confirmer: Box<dyn Confirm> = if accept_all {
            Box::new(AcceptAll)
        } else {
            Box::new(TerminalPrompt)
        };
        Self {
            verbose,
            show_progress,
            confirmer,
        }
    }

    /// Non-interactive, silent context.
    pub fn headless() -> Self {
        Self {
            verbose: false,
            show_progress: false,
            confirmer: Box::new(AcceptAll),
        }
    }

    #[must_use]
    pub fn with_confirmer(mut self, confirmer: Box<dyn Confirm>) -> Self {
        self.confirmer = confirmer;
        self
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Ask to continue; a refusal becomes [`ToolboxError::Aborted`].
    pub fn confirm_or_abort(&mut self) -> Result<()> {
        if self.confirmer.confirm("Continue?")? {
            Ok(())
        } else {
            debug!("confirmation declined");
            Err(ToolboxError::Aborted.into())
        }
    }

    /// Progress bar for an input of the given size, hidden when disabled.
    pub fn progress(&self, total_bytes: Option<u64>, label: &str) -> ProgressBar {
        if self.show_progress {
            ProgressBar::for_input(total_bytes, label)
        } else {
            ProgressBar::hidden()
        }
    }
}

/// Install the global tracing subscriber on stderr.
///
/// `RUST_LOG` wins over `verbose`. Safe to call more than once.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose {
        "gcp_log_tools=debug,gcp_log=debug"
    } else {
        "gcp_log_tools=info,gcp_log=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
