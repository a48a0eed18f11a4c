//! Output formatting for multiple formats
//!
//! Resolution reports and inspected descriptors render as JSON, YAML or
//! human-readable text.
//!
//! # Example
//!
//! ```ignore
//! use jlinkpath::cli::output::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format_report(&report)?;
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};

use crate::module::ModuleDescriptor;
use crate::report::{InspectedArtifact, ProjectKind, ResolutionReport};

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// YAML format (human-friendly, version-control friendly)
    Yaml,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &ResolutionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize resolution report to JSON"),
            OutputFormat::Yaml => serde_yaml::to_string(report)
                .context("Failed to serialize resolution report to YAML"),
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_inspection(&self, artifacts: &[InspectedArtifact]) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(artifacts)
                .context("Failed to serialize descriptors to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(artifacts).context("Failed to serialize descriptors to YAML")
            }
            OutputFormat::Human => Ok(self.format_inspection_human(artifacts)),
        }
    }

    // Human-readable formatting methods

    fn format_report_human(&self, report: &ResolutionReport) -> String {
        let mut output = String::new();

        if report.path_exceptions.is_empty() {
            output.push_str("\u{2713} Module Path Resolution\n");
        } else {
            output.push_str("\u{26A0} Module Path Resolution (with path exceptions)\n");
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        let kind = match report.project_kind {
            ProjectKind::Application => "APPLICATION",
            ProjectKind::Library => "LIBRARY",
            ProjectKind::NonModular => "non-modular",
        };
        output.push_str(&format!("Project:      {}\n", kind));
        match &report.main_module {
            Some(main) => {
                output.push_str(&format!("Main Module:  {}", main.name));
                if let Some(version) = &main.version {
                    output.push_str(&format!("@{}", version));
                }
                output.push('\n');
                if let Some(main_class) = &main.main_class {
                    output.push_str(&format!("Main Class:   {}\n", main_class));
                }
            }
            None => output.push_str("Main Module:  (not found)\n"),
        }
        output.push('\n');

        output.push_str("Module Path:\n");
        let entries: Vec<_> = report.entries.entries().collect();
        if entries.is_empty() {
            output.push_str("\u{2514}\u{2500} (empty)\n");
        }
        for (i, entry) in entries.iter().enumerate() {
            let connector = if i == entries.len() - 1 {
                "\u{2514}"
            } else {
                "\u{251C}"
            };
            output.push_str(&format!("{}\u{2500} {}\n", connector, entry.display()));
        }
        output.push('\n');

        output.push_str(&format!(
            "Modulepath Elements ({}):\n",
            report.modulepath_elements.len()
        ));
        for element in &report.modulepath_elements {
            match (&element.module, element.name_source) {
                (Some(module), Some(source)) => output.push_str(&format!(
                    "  - {} [{} from {}]\n",
                    element.path.display(),
                    module,
                    source
                )),
                _ => output.push_str(&format!("  - {}\n", element.path.display())),
            }
        }
        output.push_str(&format!(
            "Classpath Elements ({}):\n",
            report.classpath_elements.len()
        ));
        for element in &report.classpath_elements {
            output.push_str(&format!("  - {}\n", element.path.display()));
        }
        output.push('\n');

        if !report.dependencies.is_empty() {
            output.push_str("Dependencies:\n");
            for decision in &report.dependencies {
                let mark = if decision.included { "\u{2713}" } else { "\u{2717}" };
                output.push_str(&format!("  {} {}", mark, decision.path.display()));
                if let Some(reason) = decision.reason {
                    output.push_str(&format!(" ({})", reason));
                }
                output.push('\n');
            }
        }

        if !report.filename_based_modules.is_empty() {
            output.push_str("\n\u{26A0} Filename based automatic modules:\n");
            for path in &report.filename_based_modules {
                output.push_str(&format!("  - {}\n", path.display()));
            }
            output.push_str("  [!] Please don't publish this project to a public artifact repository\n");
        }

        if !report.path_exceptions.is_empty() {
            output.push_str(&format!(
                "\n\u{26A0} Path Exceptions ({}):\n",
                report.path_exceptions.len()
            ));
            for exception in &report.path_exceptions {
                output.push_str(&format!(
                    "  - {}: {}\n",
                    exception.path.display(),
                    exception.cause
                ));
            }
        }

        output.push_str(&format!("\n{}\n", report.module_path));
        output
    }

    fn format_inspection_human(&self, artifacts: &[InspectedArtifact]) -> String {
        let mut output = String::new();
        for artifact in artifacts {
            match (&artifact.descriptor, &artifact.error) {
                (_, Some(error)) => {
                    output.push_str(&format!(
                        "\u{2717} {}\n\u{2514}\u{2500} Error: {}\n\n",
                        artifact.path.display(),
                        error
                    ));
                }
                (Some(descriptor), None) => {
                    output.push_str(&format!("\u{2713} {}\n", artifact.path.display()));
                    output.push_str(&describe(descriptor));
                    output.push('\n');
                }
                (None, None) => {
                    output.push_str(&format!(
                        "- {}\n\u{2514}\u{2500} No module descriptor (classpath element)\n\n",
                        artifact.path.display()
                    ));
                }
            }
        }
        output
    }
}

fn describe(descriptor: &ModuleDescriptor) -> String {
    let mut lines = vec![format!(
        "Module:    {}{} ({})",
        if descriptor.open { "open " } else { "" },
        descriptor.name,
        descriptor.source
    )];
    if let Some(version) = &descriptor.version {
        lines.push(format!("Version:   {}", version));
    }
    if let Some(main_class) = &descriptor.main_class {
        lines.push(format!("Main:      {}", main_class));
    }
    for requires in &descriptor.requires {
        let modifiers: Vec<String> = requires.modifiers.iter().map(|m| m.to_string()).collect();
        if modifiers.is_empty() {
            lines.push(format!("Requires:  {}", requires.name));
        } else {
            lines.push(format!(
                "Requires:  {} {{ {} }}",
                requires.name,
                modifiers.join(", ")
            ));
        }
    }
    for exports in &descriptor.exports {
        match &exports.targets {
            Some(targets) => lines.push(format!(
                "Exports:   {} to {}",
                exports.source,
                targets.join(", ")
            )),
            None => lines.push(format!("Exports:   {}", exports.source)),
        }
    }
    for provides in &descriptor.provides {
        lines.push(format!(
            "Provides:  {} with {}",
            provides.service,
            provides.providers.join(", ")
        ));
    }
    for uses in &descriptor.uses {
        lines.push(format!("Uses:      {}", uses));
    }

    let mut output = String::new();
    for (i, line) in lines.iter().enumerate() {
        let connector = if i == lines.len() - 1 {
            "\u{2514}"
        } else {
            "\u{251C}"
        };
        output.push_str(&format!("{}\u{2500} {}\n", connector, line));
    }
    output
}
