use chrono::{DateTime, NaiveDateTime};
use colored::*;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::contract::{CheckOutcome, ContractCheck};
use crate::controller::{Availability, CapabilityReporter, EmailState, Generated, SubmissionState};
use crate::page::ComposerPage;

fn header(cells: &[&str]) -> Vec<Cell> {
    cells
        .iter()
        .map(|c| Cell::new(c).fg(Color::Cyan).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn yes_no(value: Option<bool>) -> Cell {
    match value {
        Some(true) => Cell::new("yes").fg(Color::Green),
        Some(false) => Cell::new("no").fg(Color::Red),
        None => Cell::new("unknown").fg(Color::DarkGrey),
    }
}

/// Renders the backend's timestamp for people; `None` if it is not ISO-8601.
pub fn format_generated_at(raw: &str) -> Option<String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format("%Y-%m-%d %H:%M:%S %:z").to_string());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

pub fn print_compliment(generated: &Generated) {
    println!();
    println!("{}", format!("For {}", generated.request.recipient_name).bold());
    println!("{}", generated.result.compliment.bright_cyan());
    if let Some(when) = generated
        .result
        .generated_at
        .as_deref()
        .and_then(format_generated_at)
    {
        println!("{}", format!("Generated {}", when).bright_black());
    }
    println!();
}

pub fn print_error(message: &str) {
    println!("{}", message.red());
}

pub fn print_notice(message: &str) {
    println!("{}", message.yellow());
}

/// Current field values and which affordances are enabled.
pub fn display_form(page: &ComposerPage) {
    let form = page.form();
    let mut table = new_table();
    table.set_header(header(&["Field", "Value"]));

    let missing = "—".bright_black().to_string();
    let or_missing = |value: String| if value.is_empty() { missing.clone() } else { value };

    table.add_row(vec![Cell::new("Recipient"), Cell::new(or_missing(form.recipient_name().to_string()))]);
    table.add_row(vec![
        Cell::new("Relationship"),
        Cell::new(or_missing(form.relationship().map(|r| r.to_string()).unwrap_or_default())),
    ]);
    table.add_row(vec![
        Cell::new("Qualities"),
        Cell::new(or_missing(form.qualities().iter().collect::<Vec<_>>().join(", "))),
    ]);
    table.add_row(vec![Cell::new("Context"), Cell::new(or_missing(form.context().to_string()))]);
    table.add_row(vec![
        Cell::new("Tone"),
        Cell::new(or_missing(form.tone().map(|t| t.label().to_string()).unwrap_or_default())),
    ]);
    table.add_row(vec![Cell::new("Email to"), Cell::new(or_missing(page.email_draft().recipient_email().to_string()))]);
    table.add_row(vec![Cell::new("Email from"), Cell::new(or_missing(page.email_draft().sender_name().to_string()))]);
    println!("\n{}", table);

    if page.can_submit() {
        println!("{}", "Ready to generate".green());
    } else {
        println!("{}", format!("Still needed: {}", form.missing_fields().join(", ")).yellow());
    }

    match page.submission().state() {
        SubmissionState::Failed(message) => print_error(message),
        SubmissionState::Submitting => print_notice("Generating…"),
        SubmissionState::Idle | SubmissionState::Succeeded => {}
    }
    if let Some(generated) = page.generated() {
        print_compliment(generated);
    }
    match page.email().state() {
        EmailState::Sent(message) => println!("{}", message.green()),
        EmailState::Failed(failure) => print_error(failure.message()),
        EmailState::Idle | EmailState::Sending => {}
    }
}

pub fn display_status(reporter: &CapabilityReporter) {
    let mut table = new_table();
    table.set_header(header(&["Capability", "Ready", "Details"]));

    let (llm_details, email_details) = match reporter.health() {
        Availability::Known(health) => {
            let llm = format!(
                "{} · required {} · api v{}",
                health.llm.service, health.llm.required_model, health.version
            );
            let email = &health.email_service;
            let email = if email.ready() {
                format!("{}:{} as {}", email.smtp_host, email.smtp_port, email.from_email)
            } else {
                "not configured".to_string()
            };
            (llm, email)
        }
        Availability::Unavailable(reason) => (reason.clone(), reason.clone()),
        Availability::Unknown => ("not checked".to_string(), "not checked".to_string()),
    };

    table.add_row(vec![Cell::new("LLM"), yes_no(reporter.llm_ready()), Cell::new(llm_details)]);
    table.add_row(vec![Cell::new("Email"), yes_no(reporter.email_ready()), Cell::new(email_details)]);

    let models = match reporter.models() {
        Availability::Known(models) => match (&models.error, models.installed_models.is_empty()) {
            (Some(error), true) => error.clone(),
            _ => models.installed_models.join(", "),
        },
        Availability::Unavailable(reason) => reason.clone(),
        Availability::Unknown => "not checked".to_string(),
    };
    table.add_row(vec![
        Cell::new("Models"),
        yes_no(reporter.models().known().map(|m| !m.installed_models.is_empty())),
        Cell::new(models),
    ]);

    println!("\n{}", table);
    if let Some(at) = reporter.checked_at() {
        println!("{}", format!("Checked {}", at.format("%Y-%m-%d %H:%M:%S UTC")).bright_black());
    }
}

pub fn display_contract(checks: &[ContractCheck]) {
    let mut table = new_table();
    table.set_header(header(&["#", "Check", "Result", "Details"]));

    for (i, check) in checks.iter().enumerate() {
        let (result, details) = match &check.outcome {
            CheckOutcome::Pass => (Cell::new("pass").fg(Color::Green), String::new()),
            CheckOutcome::Fail(reason) => (Cell::new("FAIL").fg(Color::Red).add_attribute(Attribute::Bold), reason.clone()),
            CheckOutcome::Skipped(reason) => (Cell::new("skip").fg(Color::DarkGrey), reason.clone()),
        };
        table.add_row(vec![
            Cell::new(i + 1).set_alignment(CellAlignment::Right),
            Cell::new(check.name),
            result.set_alignment(CellAlignment::Center),
            Cell::new(details),
        ]);
    }

    let passed = checks.iter().filter(|c| c.passed()).count();
    let failed = checks.iter().filter(|c| c.failed()).count();
    println!("\n{}", table);
    let summary = format!("{} passed, {} failed, {} skipped", passed, failed, checks.len() - passed - failed);
    if failed == 0 {
        println!("{}", summary.bright_green());
    } else {
        println!("{}", summary.red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_naive_backend_timestamps() {
        assert_eq!(
            format_generated_at("2025-01-31T09:15:42.123456").as_deref(),
            Some("2025-01-31 09:15:42 UTC")
        );
    }

    #[test]
    fn formats_offset_timestamps() {
        assert_eq!(
            format_generated_at("2025-01-31T09:15:42+00:00").as_deref(),
            Some("2025-01-31 09:15:42 +00:00")
        );
    }

    #[test]
    fn ignores_unparseable_timestamps() {
        assert_eq!(format_generated_at("yesterday"), None);
    }
}
