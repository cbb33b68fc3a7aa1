//! Interactive chat application for the Achuan AI chat service.
//!
//! This binary provides a streaming REPL interface over the service's
//! session and completion endpoints.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage; reads the token from ACHUAN_TOKEN
//! achuan-chat
//!
//! # Pass the token and pick a model for new sessions
//! achuan-chat --token <TOKEN> --model deepseek-r1
//!
//! # Disable colors (useful for piping output)
//! achuan-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/sessions` - List sessions, grouped by day
//! - `/open <id>` - Open a session and load its history
//! - `/new [model]` - Create a session
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use achuan::chat::{
    ChatArgs, ChatCommand, ChatConfig, ChatWorkspace, PlainTextRenderer, Renderer, help_text,
    parse_command,
};
use achuan::{Achuan, ModelCatalog};

/// Main entry point for the achuan-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("achuan-chat [OPTIONS]");
    let config = ChatConfig::from(args);

    let mut client = Achuan::with_options(config.token.clone(), config.base_url.clone(), None)?;
    client.set_params(config.params.clone());
    let mut workspace = ChatWorkspace::new(client, config.model.clone());

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));
    let mut renderer =
        PlainTextRenderer::with_color(config.use_color).with_interrupt(interrupted.clone());
    renderer.set_show_thinking(config.show_thinking);

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    let mut rl = DefaultEditor::new()?;

    println!("Achuan Chat");
    match workspace.connect().await {
        Ok(Some(name)) => renderer.print_info(&format!("Connected to session: {name}")),
        Ok(None) => renderer.print_info("No sessions yet; use /new to create one."),
        Err(e) => renderer.print_error(&e.to_string()),
    }
    println!("Type /help for commands, /quit to exit\n");

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::New(model) => {
                            match workspace.new_session(model.as_deref()).await {
                                Ok(id) => {
                                    renderer.print_info(&format!("Created session {id}"));
                                }
                                Err(e) => renderer.print_error(&e.to_string()),
                            }
                        }
                        ChatCommand::Sessions => match workspace.refresh_sessions().await {
                            Ok(()) => print_sessions(&workspace),
                            Err(e) => renderer.print_error(&e.to_string()),
                        },
                        ChatCommand::Open(id) => match workspace.open_session(id).await {
                            Ok(count) => renderer.print_info(&format!(
                                "Opened session {id} ({count} records loaded)"
                            )),
                            Err(e) => renderer.print_error(&e.to_string()),
                        },
                        ChatCommand::Name(name) => match workspace.rename_current(&name).await {
                            Ok(()) => renderer.print_info(&format!("Session renamed to: {name}")),
                            Err(e) => renderer.print_error(&e.to_string()),
                        },
                        ChatCommand::Pin => match workspace.toggle_pin_current().await {
                            Ok(true) => renderer.print_info("Session pinned."),
                            Ok(false) => renderer.print_info("Session unpinned."),
                            Err(e) => renderer.print_error(&e.to_string()),
                        },
                        ChatCommand::DeleteSession(id) => {
                            match workspace.delete_session(id).await {
                                Ok(id) => renderer.print_info(&format!("Deleted session {id}")),
                                Err(e) => renderer.print_error(&e.to_string()),
                            }
                        }
                        ChatCommand::Models => match workspace.model_catalog().await {
                            Ok(catalog) => print_models(&catalog),
                            Err(e) => renderer.print_error(&e.to_string()),
                        },
                        ChatCommand::Model(model) => match workspace.change_model(&model).await {
                            Ok(()) => renderer.print_info(&format!("Switched to model: {model}")),
                            Err(e) => renderer.print_error(&e.to_string()),
                        },
                        ChatCommand::Attach(path) => match workspace.attach(&path) {
                            Ok(name) => renderer.print_info(&format!("Staged attachment: {name}")),
                            Err(e) => renderer.print_error(&e.to_string()),
                        },
                        ChatCommand::Attachments => {
                            let staged = workspace.state().staged();
                            if staged.is_empty() {
                                renderer.print_info("No attachments staged.");
                            } else {
                                for attachment in staged {
                                    println!("    {}", attachment.name);
                                }
                            }
                        }
                        ChatCommand::ClearAttachments => {
                            workspace.clear_attachments();
                            renderer.print_info("Staged attachments cleared.");
                        }
                        ChatCommand::Delete(record_id) => {
                            match workspace.delete_record(record_id).await {
                                Ok(count) => renderer.print_info(&format!(
                                    "Record deleted ({count} remaining)"
                                )),
                                Err(e) => renderer.print_error(&e.to_string()),
                            }
                        }
                        ChatCommand::Token(token) => {
                            workspace.set_token(token);
                            match workspace.connect().await {
                                Ok(Some(name)) => renderer
                                    .print_info(&format!("Connected to session: {name}")),
                                Ok(None) => renderer
                                    .print_info("Token set; no sessions yet, use /new."),
                                Err(e) => renderer.print_error(&e.to_string()),
                            }
                        }
                        ChatCommand::Thinking(show) => {
                            renderer.set_show_thinking(show);
                            if show {
                                renderer.print_info("Reasoning output shown.");
                            } else {
                                renderer.print_info("Reasoning output hidden.");
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&workspace);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the service
                println!("Assistant:");
                if let Err(e) = workspace.send_streaming(line, &mut renderer).await {
                    renderer.print_error(&e.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_sessions(workspace: &ChatWorkspace) {
    let groups = workspace.sessions_by_day();
    if groups.is_empty() {
        println!("    No sessions.");
        return;
    }
    let current = workspace.state().current();
    for (label, sessions) in groups {
        println!("    {label}:");
        for session in sessions {
            let marker = if current == Some(session.id) { "*" } else { " " };
            let model = session.model.as_deref().unwrap_or("?");
            println!(
                "     {marker} [{}] {} ({model})",
                session.id,
                session.display_name()
            );
        }
    }
}

fn print_models(catalog: &ModelCatalog) {
    let groups = catalog.by_family();
    if groups.is_empty() {
        println!("    No models available.");
        return;
    }
    for (family, models) in groups {
        println!("    {family}:");
        for model in models {
            println!("      {model}");
        }
    }
}

fn print_stats(workspace: &ChatWorkspace) {
    let stats = workspace.stats();
    println!("    Session Statistics:");
    match (stats.session_id, stats.session_name.as_deref()) {
        (Some(id), Some(name)) => println!("      Session: {name} [{id}]"),
        (Some(id), None) => println!("      Session: [{id}]"),
        _ => println!("      Session: (none)"),
    }
    println!("      Model: {}", stats.model);
    println!("      Messages: {}", stats.message_count);
    println!("      Staged attachments: {}", stats.staged_attachments);
    match stats.last_turn_tokens {
        Some(tokens) => println!("      Last turn tokens: {tokens}"),
        None => println!("      Last turn tokens: (none)"),
    }
    println!(
        "      Token: {}",
        if stats.has_token { "set" } else { "(not set)" }
    );
}
