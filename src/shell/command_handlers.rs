use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use super::display::{display_form, display_status, print_compliment, print_error, print_notice};
use crate::api::ApiClient;
use crate::api::ComplimentApi;
use crate::error::ClientError;
use crate::form::{FormChange, FormEvent, QualityChange, Relationship, Tone};
use crate::page::ComposerPage;

/// A parsed line of shell input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum ShellCommand {
    Help,
    Exit,
    Clear,
    Show,
    Edit(FormEvent),
    Generate,
    EmailTo(String),
    EmailFrom(String),
    EmailSend,
    Status,
    /// Start over with a fresh page.
    New,
}

/// Everything a handler needs for one command.
pub(super) struct ShellContext<'a> {
    pub api: &'a ApiClient,
    pub page: &'a mut ComposerPage,
}

fn split_verb(input: &str) -> (String, &str) {
    match input.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb.to_lowercase(), rest.trim()),
        None => (input.to_lowercase(), ""),
    }
}

/// Turns a line into a command, or a usage message.
pub(super) fn parse_command(input: &str) -> Result<ShellCommand, String> {
    let (verb, rest) = split_verb(input.trim());
    let clear = rest.eq_ignore_ascii_case("clear");

    match verb.as_str() {
        "help" | "?" => Ok(ShellCommand::Help),
        "exit" | "quit" | "bye" => Ok(ShellCommand::Exit),
        "clear" => Ok(ShellCommand::Clear),
        "show" | "form" => Ok(ShellCommand::Show),
        "generate" | "submit" => Ok(ShellCommand::Generate),
        "status" | "health" => Ok(ShellCommand::Status),
        "new" => Ok(ShellCommand::New),
        "reset" => Ok(ShellCommand::Edit(FormEvent::Reset)),
        "name" => Ok(ShellCommand::Edit(FormEvent::RecipientNameChanged(rest.to_string()))),
        "context" if clear => Ok(ShellCommand::Edit(FormEvent::ContextChanged(String::new()))),
        "context" => Ok(ShellCommand::Edit(FormEvent::ContextChanged(rest.to_string()))),
        "add" => Ok(ShellCommand::Edit(FormEvent::QualityAdded(rest.to_string()))),
        "remove" | "rm" => {
            if rest.is_empty() {
                Err("Usage: remove <quality>".to_string())
            } else {
                Ok(ShellCommand::Edit(FormEvent::QualityRemoved(rest.to_string())))
            }
        }
        "relationship" | "rel" if clear => Ok(ShellCommand::Edit(FormEvent::RelationshipSelected(None))),
        "relationship" | "rel" => rest
            .parse::<Relationship>()
            .map(|r| ShellCommand::Edit(FormEvent::RelationshipSelected(Some(r))))
            .map_err(|e| e.to_string()),
        "tone" if clear => Ok(ShellCommand::Edit(FormEvent::ToneSelected(None))),
        "tone" => rest
            .parse::<Tone>()
            .map(|t| ShellCommand::Edit(FormEvent::ToneSelected(Some(t))))
            .map_err(|e| e.to_string()),
        "email" => {
            let (action, value) = split_verb(rest);
            match action.as_str() {
                "to" if !value.is_empty() => Ok(ShellCommand::EmailTo(value.to_string())),
                "from" if !value.is_empty() => Ok(ShellCommand::EmailFrom(value.to_string())),
                "send" => Ok(ShellCommand::EmailSend),
                _ => Err("Usage: email to <address> | email from <name> | email send".to_string()),
            }
        }
        _ => Err(format!("Unknown command '{}'. Type 'help' for the list of commands.", verb)),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());
    pb
}

pub(super) fn handle_edit(context: &mut ShellContext<'_>, event: FormEvent) {
    let change = context.page.apply(event);
    match change {
        FormChange::Quality(QualityChange::RejectedEmpty) => print_notice("Quality is empty; nothing added."),
        FormChange::Quality(QualityChange::RejectedDuplicate) => print_notice("That quality is already listed."),
        FormChange::Quality(QualityChange::NotPresent) => print_notice("That quality is not in the list."),
        FormChange::Quality(_) | FormChange::Updated | FormChange::Unchanged => {}
    }
    let qualities: Vec<&str> = context.page.form().qualities().iter().collect();
    if !qualities.is_empty() && change.changed() {
        println!("{} {}", "Qualities:".bright_black(), qualities.join(", "));
    }
}

/// Generates a compliment; Ctrl-C while waiting abandons the page.
pub(super) async fn handle_generate(context: &mut ShellContext<'_>) {
    let pending = match context.page.begin_submission() {
        Ok(pending) => pending,
        Err(e) => {
            print_notice(&e.user_message());
            return;
        }
    };

    let pb = spinner(&format!("Writing a {} compliment for {}…", pending.request.tone.label().to_lowercase(), pending.request.recipient_name));
    let outcome = tokio::select! {
        outcome = context.api.generate_compliment(&pending.request) => Some(outcome),
        _ = tokio::signal::ctrl_c() => None,
    };
    pb.finish_and_clear();

    let Some(outcome) = outcome else {
        context.page.leave();
        print_notice("Generation abandoned; the form has been cleared.");
        return;
    };

    match context.page.complete_submission(pending.ticket, outcome) {
        Ok(generated) => {
            print_compliment(generated);
            println!("{}", "Use 'email to <address>' then 'email send' to share it.".bright_black());
        }
        Err(ClientError::StaleResponse) => {}
        Err(e) => {
            print_error(&e.user_message());
            println!("{}", "Your input is unchanged; fix anything needed and 'generate' again.".bright_black());
        }
    }
}

pub(super) async fn handle_email_send(context: &mut ShellContext<'_>) {
    if context.page.capabilities().email_ready() == Some(false) {
        print_notice("The backend reports email is not configured; trying anyway.");
    }
    let pending = match context.page.begin_email() {
        Ok(pending) => pending,
        Err(e) => {
            print_notice(&e.user_message());
            return;
        }
    };

    let pb = spinner(&format!("Emailing the compliment for {}…", pending.request.recipient_name));
    let outcome = context.api.send_email(&pending.request).await;
    pb.finish_and_clear();

    match context.page.complete_email(pending.ticket, outcome) {
        Ok(message) => println!("{}", message.green()),
        Err(ClientError::StaleResponse) => {}
        Err(e) => print_error(&e.user_message()),
    }
}

pub(super) fn handle_email_field(context: &mut ShellContext<'_>, command: ShellCommand) {
    let draft = context.page.email_draft_mut();
    match command {
        ShellCommand::EmailTo(address) => draft.set_recipient_email(address),
        ShellCommand::EmailFrom(name) => draft.set_sender_name(name),
        _ => return,
    }
    let missing = draft.missing_fields();
    if !missing.is_empty() {
        print_notice(&format!("Email still needs: {}", missing.join(", ")));
    } else if context.page.generated().is_none() {
        print_notice("Generate a compliment first, then 'email send'.");
    }
}

pub(super) async fn handle_status(context: &mut ShellContext<'_>) {
    let pb = spinner("Checking backend…");
    context.page.refresh_capabilities(context.api).await;
    pb.finish_and_clear();
    display_status(context.page.capabilities());
}

pub(super) fn handle_show(context: &ShellContext<'_>) {
    display_form(context.page);
}
