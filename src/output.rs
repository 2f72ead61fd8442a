//! Shared output formatting for gitlet CLI commands.

use serde::Serialize;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: &str = "gitlet.v1";

/// Global flags whose next argument is a value, not a command
const VALUE_FLAGS: &[&str] = &["--repo"];

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    details: Vec<String>,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
            next_steps: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }

    pub fn push_next_step(&mut self, value: impl Into<String>) {
        self.next_steps.push(value.into());
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    schema_version: &'static str,
    command: &'a str,
    status: &'static str,
    data: &'a T,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    next_steps: Vec<String>,
}

fn print_envelope<T: Serialize>(
    command: &str,
    data: &T,
    warnings: Vec<String>,
    next_steps: Vec<String>,
) -> Result<()> {
    let payload = Envelope {
        schema_version: SCHEMA_VERSION,
        command,
        status: "success",
        data,
        warnings,
        next_steps,
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();
        let next_steps = human.map(|h| h.next_steps.clone()).unwrap_or_default();
        return print_envelope(command, data, warnings, next_steps);
    }

    if options.quiet {
        return Ok(());
    }

    if let Some(human) = human {
        println!("{}", format_human(human));
    }

    Ok(())
}

/// Emit a report whose human form is preformatted text (log, status, find).
pub fn emit_text<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    text: &str,
) -> Result<()> {
    if options.json {
        return print_envelope(command, data, Vec::new(), Vec::new());
    }

    if options.quiet {
        return Ok(());
    }

    print!("{text}");
    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let next_steps = error_next_steps(err);
    let hint = next_steps.first().map(|step| step.as_str());
    if json {
        #[derive(Serialize)]
        struct ErrorBody<'a> {
            message: &'a str,
            code: i32,
            kind: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<serde_json::Value>,
        }

        #[derive(Serialize)]
        struct ErrorEnvelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            error: ErrorBody<'a>,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            next_steps: Vec<String>,
        }

        let payload = ErrorEnvelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            error: ErrorBody {
                message: &err.to_string(),
                code: err.exit_code(),
                kind: err.kind(),
                details: err.details(),
            },
            next_steps,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    push_summary(&mut lines, &output.summary);
    push_section(&mut lines, "Details", &output.details);
    push_section(&mut lines, "Warnings", &output.warnings);
    push_section(&mut lines, "Next steps", &output.next_steps);

    lines.join("\n")
}

/// First positional argument, used to label error envelopes before clap runs.
pub fn infer_command_name_from_args() -> String {
    command_name_from(std::env::args().skip(1))
}

fn command_name_from(mut args: impl Iterator<Item = String>) -> String {
    while let Some(arg) = args.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            args.next();
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        return arg;
    }
    "gitlet".to_string()
}

fn error_next_steps(err: &Error) -> Vec<String> {
    match err {
        Error::NotInitialized(_) => vec!["gitlet init".to_string()],
        Error::UncommittedChanges => vec!["gitlet commit <message>".to_string()],
        Error::UntrackedFileInTheWay(path) => {
            vec![format!("gitlet add {path} && gitlet commit <message>")]
        }
        Error::PushRejected { remote, branch } => vec![format!("gitlet pull {remote} {branch}")],
        Error::AmbiguousCommit { .. } => vec!["use a longer commit id prefix".to_string()],
        Error::InvalidConfig(_) => vec!["fix .gitlet/config.toml then retry".to_string()],
        _ => Vec::new(),
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push("Summary:".to_string());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("- {key}"));
        } else {
            lines.push(format!("- {key}: {value}"));
        }
    }
}

fn push_section(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> impl Iterator<Item = String> {
        raw.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn command_name_skips_flags_and_repo_value() {
        assert_eq!(command_name_from(args(&["--json", "status"])), "status");
        assert_eq!(
            command_name_from(args(&["--repo", "/tmp/r", "global-log"])),
            "global-log"
        );
        assert_eq!(command_name_from(args(&["--quiet"])), "gitlet");
    }

    #[test]
    fn human_output_sections() {
        let mut human = HumanOutput::new("gitlet merge: merged feature into master");
        human.push_summary("commit", "abc1234");
        human.push_warning("Encountered a merge conflict.");
        let text = format_human(&human);
        assert!(text.starts_with("gitlet merge: merged feature into master"));
        assert!(text.contains("Summary:\n- commit: abc1234"));
        assert!(text.contains("Warnings:\n- Encountered a merge conflict."));
        assert!(!text.contains("Next steps:"));
    }
}
