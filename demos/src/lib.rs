//! qadapt Demo Suite
//!
//! Reproduces the ADAPT-VQE tutorial end to end: a molecule is turned into a
//! qubit Hamiltonian, solved once with a fixed UCCSD ansatz and once with
//! ADAPT-VQE, and the two runs are compared side by side.
//!
//! ```no_run
//! use qadapt_demos::{config::PipelineConfig, pipeline::Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let report = Pipeline::new(PipelineConfig::default()).run()?;
//! println!("{}", report.render_table());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod pipeline;
pub mod report;

use std::fmt::Display;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

const RULE_WIDTH: usize = 64;

/// Spinner shown while the pipeline runs; stage names replace its message.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner().with_message(message.to_owned());
    if let Ok(template) = ProgressStyle::with_template("{spinner:.cyan} {elapsed:>4} {wide_msg}") {
        spinner.set_style(template);
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub fn print_header(title: &str) {
    let rule = "━".repeat(RULE_WIDTH);
    println!("\n{}\n {}\n{}\n", style(&rule).cyan(), style(title).bold(), style(&rule).cyan());
}

pub fn print_section(title: &str) {
    println!("\n{} {}", style("»").cyan().bold(), style(title).bold().underlined());
}

/// Aligned `label  value` line.
pub fn print_result(label: &str, value: impl Display) {
    println!("   {:<24}{value}", style(label).dim());
}

pub fn print_success(message: &str) {
    println!("{} {message}", style("✔").green());
}

pub fn print_info(message: &str) {
    println!("{} {message}", style("•").blue());
}
