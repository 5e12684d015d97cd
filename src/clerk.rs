//! Interactive terminal clerking session.
//!
//! Lines typed by the student go to the simulated patient; slash commands
//! move the case forward:
//!
//! - `/investigate [<preliminary diagnosis> |] <plan>`
//! - `/diagnose <final diagnosis> | <management plan>`
//! - `/quit`

use std::io::Write;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::models::{CaseCategory, Department, Difficulty, Feedback, InvestigationResult, Message};
use crate::pipeline::simulation::{
    classify_failure, FailureKind, SimulationEngine, SimulationError, QUOTA_EXCEEDED_MESSAGE,
};
use crate::session::ClerkingContext;

pub const HELP_TEXT: &str = "Type to talk to the patient.\n  /investigate [<preliminary diagnosis> |] <plan>\n  /diagnose <final diagnosis> | <management plan>\n  /quit";

#[derive(Error, Debug)]
pub enum ClerkError {
    #[error("Unknown department: {0}")]
    UnknownDepartment(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One parsed line of student input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClerkCommand {
    Say(String),
    Investigate {
        preliminary: Option<String>,
        plan: String,
    },
    Diagnose {
        diagnosis: String,
        plan: String,
    },
    Quit,
    Help,
    Empty,
}

fn split_pipe(rest: &str) -> Option<(String, String)> {
    let (left, right) = rest.split_once('|')?;
    Some((left.trim().to_string(), right.trim().to_string()))
}

pub fn parse_command(line: &str) -> ClerkCommand {
    let line = line.trim();
    if line.is_empty() {
        return ClerkCommand::Empty;
    }
    if !line.starts_with('/') {
        return ClerkCommand::Say(line.to_string());
    }

    let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match cmd {
        "/quit" | "/exit" => ClerkCommand::Quit,
        "/investigate" if !rest.is_empty() => match split_pipe(rest) {
            Some((preliminary, plan)) => ClerkCommand::Investigate {
                preliminary: Some(preliminary).filter(|p| !p.is_empty()),
                plan,
            },
            None => ClerkCommand::Investigate {
                preliminary: None,
                plan: rest.to_string(),
            },
        },
        "/diagnose" => match split_pipe(rest) {
            Some((diagnosis, plan)) => ClerkCommand::Diagnose { diagnosis, plan },
            None if !rest.is_empty() => ClerkCommand::Diagnose {
                diagnosis: rest.to_string(),
                plan: String::new(),
            },
            None => ClerkCommand::Help,
        },
        _ => ClerkCommand::Help,
    }
}

fn describe_failure(err: &SimulationError) -> String {
    match classify_failure(err) {
        FailureKind::QuotaExceeded => QUOTA_EXCEEDED_MESSAGE.to_string(),
        _ => err.to_string(),
    }
}

fn write_results<W: Write>(out: &mut W, results: &[InvestigationResult]) -> std::io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "No results could be simulated for that plan.");
    }
    for r in results {
        writeln!(
            out,
            "  {:<14} {:>8} {:<10} [{} - {}] {}",
            r.name, r.value, r.unit, r.range.low, r.range.high, r.status
        )?;
    }
    Ok(())
}

fn write_feedback<W: Write>(out: &mut W, feedback: &Feedback) -> std::io::Result<()> {
    writeln!(out, "\n=== Feedback ===")?;
    writeln!(out, "Diagnosis: {}", feedback.diagnosis)?;
    writeln!(out, "Key takeaway: {}", feedback.key_takeaway)?;
    writeln!(out, "What you did well:")?;
    for item in &feedback.what_you_did_well {
        writeln!(out, "  + {item}")?;
    }
    writeln!(out, "What could be improved:")?;
    for item in &feedback.what_could_be_improved {
        writeln!(out, "  - {item}")?;
    }
    writeln!(out, "Clinical tip: {}", feedback.clinical_tip)
}

/// Options for one terminal session.
#[derive(Debug, Clone)]
pub struct ClerkOptions {
    pub department: String,
    pub difficulty: Option<Difficulty>,
    pub category: Option<CaseCategory>,
}

/// Run one case from greeting to feedback.
///
/// Returns the feedback if the student reached a diagnosis, `None` if they
/// quit or input ended first. Patient and investigation failures are shown
/// and the loop continues with state unchanged.
pub async fn run_clerk<R, W>(
    ctx: &mut ClerkingContext,
    engine: &SimulationEngine,
    options: ClerkOptions,
    input: R,
    out: &mut W,
) -> Result<Option<Feedback>, ClerkError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let department: Department = crate::models::find_department(&options.department)
        .ok_or_else(|| ClerkError::UnknownDepartment(options.department.clone()))?;

    writeln!(out, "Generating a {} case...", department.name)?;
    let state = ctx
        .generate_new_case(engine, department, options.difficulty, options.category)
        .await?;
    if let Some(greeting) = state.messages.first() {
        writeln!(out, "\n{}\n", greeting.text)?;
    }
    writeln!(out, "{HELP_TEXT}\n")?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let Some(case) = ctx.session().state().case_details.clone() else {
            break;
        };

        match parse_command(&line) {
            ClerkCommand::Empty => continue,
            ClerkCommand::Help => writeln!(out, "{HELP_TEXT}")?,
            ClerkCommand::Quit => {
                tracing::info!("Clerking session abandoned");
                return Ok(None);
            }
            ClerkCommand::Say(text) => {
                let student = Message::student(text);
                let mut history = ctx.session().state().messages.clone();
                history.push(student.clone());

                match engine.patient_response(&case, &history).await {
                    Ok(reply) => {
                        writeln!(out, "Patient: {}", reply.response)?;
                        let session = ctx.session_mut();
                        session.append_message(student);
                        session.append_message(Message::patient(reply.response));
                    }
                    Err(e) => writeln!(out, "Error: {}", describe_failure(&e))?,
                }
            }
            ClerkCommand::Investigate { preliminary, plan } => {
                let preliminary = preliminary
                    .unwrap_or_else(|| ctx.session().state().preliminary_diagnosis.clone());
                match engine.investigation_results(&plan, &case).await {
                    Ok(results) => {
                        write_results(out, &results)?;
                        let session = ctx.session_mut();
                        session.set_preliminary(&preliminary, &plan);
                        session.set_investigation_results(results);
                    }
                    Err(e) => writeln!(out, "Error: {}", describe_failure(&e))?,
                }
            }
            ClerkCommand::Diagnose { diagnosis, plan } => {
                ctx.session_mut().set_final(&diagnosis, &plan);
                match engine.feedback(ctx.session().state()).await {
                    Ok(feedback) => {
                        write_feedback(out, &feedback)?;
                        ctx.session_mut().set_feedback(feedback.clone());
                        return Ok(Some(feedback));
                    }
                    Err(e) => writeln!(out, "Error: {}", describe_failure(&e))?,
                }
            }
        }
    }

    Ok(None)
}
