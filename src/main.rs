//! Terminal front end for the translation session
//!
//! Plain lines are translated. Slash commands drive the other intents; see
//! `/help`.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use traduza::{build_session, AppSettings, TranslationSession, MAX_CHARACTERS};

const HELP: &str = "\
Type text and press Enter to translate it.
  /from <code>      set the source language (auto to detect)
  /to <code>        set the target language
  /swap             swap languages and texts
  /clear            clear the current exchange
  /history          list retained translations
  /delete <id>      delete one history record
  /clear-history    delete every history record
  /copy [id]        copy the current translation, or a record's
  /speak [id]       read the current translation, or a record's, aloud
  /langs            list available languages
  /quit            exit";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "traduza=info".into());
    let fmt_layer = if std::env::var_os("TRADUZA_LOG_JSON").is_some() {
        tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).boxed()
    };
    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let settings = AppSettings::load()
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "failed to load settings, using defaults");
            AppSettings::default()
        })
        .with_env_overrides();

    let (mut session, mut outcomes) = match build_session(&settings) {
        Ok(parts) => parts,
        Err(e) => {
            error!(error = %e, "failed to start translation session");
            std::process::exit(1);
        }
    };
    info!(provider = %settings.provider.base_url, durable = session.is_history_durable(), "session ready");

    println!("{}", HELP);
    print_prompt(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if !handle_line(&mut session, line.trim_end()) {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!(error = %e, "failed to read input");
                        break;
                    }
                }
            }
            Some(outcome) = outcomes.recv() => {
                session.apply_outcome(outcome);
                print_exchange(&session);
            }
        }
        print_prompt(&session);
    }
}

/// Returns false when the user asked to quit
fn handle_line(session: &mut TranslationSession, line: &str) -> bool {
    let Some(command) = line.strip_prefix('/') else {
        if line.is_empty() {
            return true;
        }
        session.set_source_text(line);
        if session.state().char_count() == MAX_CHARACTERS {
            println!("(input cut at {} characters)", MAX_CHARACTERS);
        }
        if session.submit_current().is_some() {
            println!("Translating...");
        }
        return true;
    };

    let (name, arg) = match command.split_once(' ') {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    match name {
        "quit" | "exit" => return false,
        "help" => println!("{}", HELP),
        "from" => report(session.set_source_language(arg)),
        "to" => report(session.set_target_language(arg)),
        "swap" => {
            if session.swap_languages() {
                print_exchange(session);
            } else {
                println!("Pick a source language first; detected text cannot be swapped.");
            }
        }
        "clear" => session.clear_current_exchange(),
        "history" => print_history(session),
        "delete" => {
            if !session.delete_history_record(arg) {
                println!("No record with id {}", arg);
            }
        }
        "clear-history" => session.clear_all_history(),
        "copy" => {
            let text = pick_text(session, arg).map(|(text, _)| text);
            if session.copy_text(text.as_deref().unwrap_or_default()) {
                println!("Copied!");
            }
        }
        "speak" => {
            if let Some((text, lang)) = pick_text(session, arg) {
                session.speak(&text, &lang);
            }
        }
        "langs" => {
            for entry in session.catalog().list_sources() {
                println!("  {:<5} {}", entry.code, entry.label());
            }
        }
        other => println!("Unknown command /{}; try /help", other),
    }
    true
}

/// Translation text and its language, from a history record or the current exchange
fn pick_text(session: &TranslationSession, id: &str) -> Option<(String, String)> {
    if id.is_empty() {
        let state = session.state();
        return Some((state.translated_text.clone(), state.target_language_code.clone()));
    }
    session
        .history()
        .iter()
        .find(|record| record.id == id)
        .map(|record| (record.translated_text.clone(), record.target_language.clone()))
}

fn report(result: traduza::AppResult<()>) {
    if let Err(e) = result {
        println!("{}", e);
    }
}

fn print_prompt(session: &TranslationSession) {
    let state = session.state();
    let catalog = session.catalog();
    println!(
        "[{} -> {}] {}/{}{}",
        catalog.display_label(&state.source_language_code),
        catalog.display_label(&state.target_language_code),
        state.char_count(),
        MAX_CHARACTERS,
        if state.is_translating { " (translating)" } else { "" }
    );
}

fn print_exchange(session: &TranslationSession) {
    let state = session.state();
    if !state.source_text.is_empty() {
        println!("  you: {}", state.source_text);
    }
    if !state.translated_text.is_empty() {
        println!("  => {}", state.translated_text);
    }
}

fn print_history(session: &TranslationSession) {
    let catalog = session.catalog();
    if session.history().is_empty() {
        println!("History is empty.");
        return;
    }
    for record in session.history() {
        println!(
            "{} {} {} -> {}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            catalog.display_label(&record.source_language),
            catalog.display_label(&record.target_language)
        );
        println!("    {}", record.source_text);
        println!("    {}", record.translated_text);
    }
}
