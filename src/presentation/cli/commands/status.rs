use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;

use crate::application::use_cases::manifest_sync::ManifestSync;
use crate::application::use_cases::status_check::{
    CheckoutState, ComponentStatus, StatusCheckUseCase, StatusReport,
};

/// Output format options for status command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Handler for the status command
pub struct StatusCommand {
    pub components: Vec<String>,
    pub output: OutputFormat,
}

impl StatusCommand {
    pub fn new(components: Vec<String>, output: OutputFormat) -> Self {
        Self { components, output }
    }

    pub async fn execute(&self, sync: &ManifestSync) -> Result<()> {
        let report = StatusCheckUseCase::new(sync)
            .execute(&self.components)
            .await?;

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report)?),
            OutputFormat::Text => self.print_detailed_status(&report),
        }
        Ok(())
    }

    fn print_detailed_status(&self, report: &StatusReport) {
        let width = name_column(report);
        for status in &report.components {
            let version = match &status.observed {
                Some(observed) if status.drift => observed.to_string().yellow(),
                Some(observed) => observed.to_string().normal(),
                None => "not cloned".red(),
            };
            println!("{:<width$} | {}", status.name.bold(), version, width = width);

            if status.state == CheckoutState::Dirty {
                for line in status.formatted_changes().lines() {
                    println!("{:<width$}   {}", "", line, width = width);
                }
            }
        }

        if report.dirty_count() + report.missing_count() > 0 {
            println!(
                "{} {} clean, {} dirty, {} missing",
                "::".blue().bold(),
                report.clean_count(),
                report.dirty_count(),
                report.missing_count()
            );
        }
    }
}

/// Handler for the compare command: pinned vs. checked-out versions
pub struct CompareCommand {
    pub components: Vec<String>,
}

impl CompareCommand {
    pub fn new(components: Vec<String>) -> Self {
        Self { components }
    }

    pub async fn execute(&self, sync: &ManifestSync) -> Result<()> {
        let report = StatusCheckUseCase::new(sync)
            .execute(&self.components)
            .await?;

        let width = name_column(&report).max("Component".len());
        let pinned_width = report
            .components
            .iter()
            .map(|c| c.pinned.to_string().chars().count())
            .max()
            .unwrap_or(0)
            .max("Pinned".len());

        println!(
            "{:<width$} | {:<pinned_width$} | {}",
            "Component".bold(),
            "Pinned".bold(),
            "Current".bold(),
            width = width,
            pinned_width = pinned_width
        );
        for status in &report.components {
            println!(
                "{:<width$} | {:<pinned_width$} | {}",
                status.name,
                status.pinned.to_string(),
                current_column(status),
                width = width,
                pinned_width = pinned_width
            );
        }

        if report.drift_count() > 0 {
            println!(
                "{} {} component(s) differ from the manifest",
                "::".yellow().bold(),
                report.drift_count()
            );
        }
        Ok(())
    }
}

fn name_column(report: &StatusReport) -> usize {
    report
        .components
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
}

fn current_column(status: &ComponentStatus) -> String {
    match &status.observed {
        Some(observed) if status.drift => observed.to_string().yellow().to_string(),
        Some(observed) => observed.to_string(),
        None => "not cloned".red().to_string(),
    }
}
