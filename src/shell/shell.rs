use std::io::Write;

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{info, warn};

use super::command_handlers::{
    handle_edit, handle_email_field, handle_email_send, handle_generate, handle_show, handle_status,
    parse_command, ShellCommand, ShellContext,
};
use super::display::{display_status, print_error};
use crate::api::ApiClient;
use crate::config::Settings;
use crate::form::{Relationship, Tone};
use crate::page::ComposerPage;

const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const BRIGHT_CYAN: &str = "\x1b[96m";
const RESET: &str = "\x1b[0m";
const BRIGHT_BLACK: &str = "\x1b[90m";

fn print_help() {
    let relationships: Vec<&str> = Relationship::ALL.iter().map(|r| r.as_str()).collect();
    let tones: Vec<&str> = Tone::ALL.iter().map(|t| t.as_str()).collect();

    println!("\n{CYAN}Nurture Commands{RESET}");
    println!("{BRIGHT_CYAN}{}{RESET}", "=".repeat(60));
    println!("{GREEN}name <text>{RESET}              - Recipient's name");
    println!("{GREEN}relationship <choice>{RESET}    - One of: {}", relationships.join(", "));
    println!("{GREEN}add <quality>{RESET}            - Add a quality you appreciate");
    println!("{GREEN}remove <quality>{RESET}         - Remove a quality");
    println!("{GREEN}context <text>|clear{RESET}     - Optional situation or achievement");
    println!("{GREEN}tone <choice>|clear{RESET}      - One of: {}", tones.join(", "));
    println!("{GREEN}show{RESET}                     - Show the form and the last compliment");
    println!("{GREEN}generate{RESET}                 - Write the compliment (Ctrl-C abandons the page)");
    println!("{GREEN}email to <address>{RESET}       - Recipient's email address");
    println!("{GREEN}email from <name>{RESET}        - Your name as the sender");
    println!("{GREEN}email send{RESET}               - Email the last compliment");
    println!("{GREEN}status{RESET}                   - Check the LLM and email backends");
    println!("{GREEN}reset{RESET}                    - Clear the form");
    println!("{GREEN}new{RESET}                      - Start over with a fresh page");
    println!("{GREEN}clear{RESET}                    - Clear the screen");
    println!("{GREEN}help{RESET}                     - Show this help message");
    println!("{GREEN}exit, bye, quit{RESET}          - Leave");
    println!();
}

fn prompt(page: &ComposerPage) -> String {
    if page.can_submit() {
        format!("{GREEN}nurture ✓{RESET} > ")
    } else {
        format!("{BRIGHT_BLACK}nurture{RESET} > ")
    }
}

/// Interactive compliment composer.
pub async fn run_shell(settings: &Settings, api: &ApiClient) -> Result<()> {
    info!("Starting shell against {}", api.base_url());
    println!("Compliment composer connected to {}", api.base_url());

    let mut page = ComposerPage::new(&settings.email.default_sender);
    if settings.health.check_on_start {
        page.refresh_capabilities(api).await;
        display_status(page.capabilities());
        if page.capabilities().llm_ready() == Some(false) {
            print_error("The compliment backend is not ready; generation will likely fail.");
        }
    }
    print_help();

    let mut rl = DefaultEditor::new()?;

    loop {
        let input = match rl.readline(&prompt(&page)) {
            Ok(input) => input,
            Err(ReadlineError::Interrupted) => {
                page.leave();
                println!("Form cleared. Type 'exit' to leave.");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(e) => {
                warn!("Readline error: {}", e);
                println!("Goodbye!");
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(input);

        let command = match parse_command(input) {
            Ok(command) => command,
            Err(usage) => {
                println!("{}", usage);
                continue;
            }
        };

        let mut context = ShellContext { api, page: &mut page };

        match command {
            ShellCommand::Exit => {
                context.page.leave();
                println!("Goodbye!");
                break;
            }
            ShellCommand::Help => print_help(),
            ShellCommand::Clear => {
                print!("\x1B[2J\x1B[1;1H");
                std::io::stdout().flush()?;
            }
            ShellCommand::Show => handle_show(&context),
            ShellCommand::Edit(event) => handle_edit(&mut context, event),
            ShellCommand::Generate => handle_generate(&mut context).await,
            ShellCommand::EmailSend => handle_email_send(&mut context).await,
            command @ (ShellCommand::EmailTo(_) | ShellCommand::EmailFrom(_)) => {
                handle_email_field(&mut context, command)
            }
            ShellCommand::Status => handle_status(&mut context).await,
            ShellCommand::New => {
                context.page.leave();
                page = ComposerPage::new(&settings.email.default_sender);
                println!("Started a new compliment.");
            }
        }
    }

    Ok(())
}
