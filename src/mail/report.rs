use serde::{Deserialize, Serialize};

use super::OutgoingEmail;
use crate::models::{Case, Feedback, InvestigationResult};

pub const REPORT_SUBJECT: &str = "Your Clerkly clerking report";

/// Everything the student chose to include in an emailed report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClerkingReport {
    pub recipient_email: String,
    pub feedback: Option<Feedback>,
    pub case_details: Option<Case>,
    pub preliminary_diagnosis: String,
    pub investigation_plan: String,
    pub investigation_results: Vec<InvestigationResult>,
    pub final_diagnosis: String,
    pub management_plan: String,
}

impl ClerkingReport {
    /// Recipient and feedback are the minimum for a report.
    pub fn is_complete(&self) -> bool {
        !self.recipient_email.trim().is_empty() && self.feedback.is_some()
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

fn result_line(r: &InvestigationResult) -> String {
    format!(
        "{}: {} {} (range {}-{}, {})",
        r.name, r.value, r.unit, r.range.low, r.range.high, r.status
    )
}

fn text_list(items: &[String]) -> String {
    items.iter().map(|i| format!("  - {i}\n")).collect()
}

fn html_list(items: &[String]) -> String {
    let lis: String = items
        .iter()
        .map(|i| format!("<li>{}</li>", escape_html(i)))
        .collect();
    format!("<ul>{lis}</ul>")
}

/// Render the report as plain text and HTML.
pub fn render_report(report: &ClerkingReport) -> OutgoingEmail {
    let feedback = report.feedback.clone().unwrap_or_default();
    let diagnosis = report
        .case_details
        .as_ref()
        .map(|c| c.diagnosis.as_str())
        .unwrap_or(feedback.diagnosis.as_str());

    let results_text: String = if report.investigation_results.is_empty() {
        "  -\n".to_string()
    } else {
        report
            .investigation_results
            .iter()
            .map(|r| format!("  - {}\n", result_line(r)))
            .collect()
    };

    let text = format!(
        "CLERKLY CLERKING REPORT\n\n\
         Correct diagnosis: {diagnosis}\n\
         Your preliminary diagnosis: {prelim}\n\
         Your investigation plan: {plan}\n\
         Investigation results:\n{results_text}\
         Your final diagnosis: {final_dx}\n\
         Your management plan: {mgmt}\n\n\
         KEY TAKEAWAY\n{takeaway}\n\n\
         WHAT YOU DID WELL\n{well}\n\
         WHAT COULD BE IMPROVED\n{improve}\n\
         CLINICAL TIP\n{tip}\n",
        prelim = or_dash(&report.preliminary_diagnosis),
        plan = or_dash(&report.investigation_plan),
        final_dx = or_dash(&report.final_diagnosis),
        mgmt = or_dash(&report.management_plan),
        takeaway = feedback.key_takeaway,
        well = text_list(&feedback.what_you_did_well),
        improve = text_list(&feedback.what_could_be_improved),
        tip = feedback.clinical_tip,
    );

    let results_html: String = report
        .investigation_results
        .iter()
        .map(|r| format!("<li>{}</li>", escape_html(&result_line(r))))
        .collect();

    let html = format!(
        "<h1>Clerkly clerking report</h1>\
         <p><strong>Correct diagnosis:</strong> {diagnosis}</p>\
         <p><strong>Your preliminary diagnosis:</strong> {prelim}</p>\
         <p><strong>Your investigation plan:</strong> {plan}</p>\
         <h2>Investigation results</h2><ul>{results_html}</ul>\
         <p><strong>Your final diagnosis:</strong> {final_dx}</p>\
         <p><strong>Your management plan:</strong> {mgmt}</p>\
         <h2>Key takeaway</h2><p>{takeaway}</p>\
         <h2>What you did well</h2>{well}\
         <h2>What could be improved</h2>{improve}\
         <h2>Clinical tip</h2><p>{tip}</p>",
        diagnosis = escape_html(diagnosis),
        prelim = escape_html(or_dash(&report.preliminary_diagnosis)),
        plan = escape_html(or_dash(&report.investigation_plan)),
        final_dx = escape_html(or_dash(&report.final_diagnosis)),
        mgmt = escape_html(or_dash(&report.management_plan)),
        takeaway = escape_html(&feedback.key_takeaway),
        well = html_list(&feedback.what_you_did_well),
        improve = html_list(&feedback.what_could_be_improved),
        tip = escape_html(&feedback.clinical_tip),
    );

    OutgoingEmail {
        to: report.recipient_email.trim().to_string(),
        subject: REPORT_SUBJECT.to_string(),
        html,
        text,
    }
}
