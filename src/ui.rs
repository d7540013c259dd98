//! Interactive terminal session and output rendering.
//!
//! A menu-driven loop over one [`Session`]. Every failure is printed and the
//! menu comes back; nothing here ends the session except "Quit".

use crate::agent::{LlmClient, Transport};
use crate::config::Config;
use crate::document::Document;
use crate::export;
use crate::qa::Answer;
use crate::session::{LoadedDocument, PipelineSettings, Session};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use std::path::PathBuf;

pub const SAMPLE_QUESTIONS: [&str; 5] = [
    "What is the tender deadline?",
    "What are the eligibility criteria?",
    "What is the contract value?",
    "What documents are required?",
    "What is the payment terms?",
];

enum Action {
    Ask,
    Sample(&'static str),
    History,
    Info,
    Export,
    Load,
    Clear,
    Quit,
}

/// Run the interactive session, optionally starting with `initial` loaded.
pub async fn run(config: &Config, initial: Option<PathBuf>) -> anyhow::Result<()> {
    let settings = PipelineSettings::from_config(config)?;
    let client = LlmClient::from_config(&config.llm)?;
    let mut session = Session::new();

    println!("{}", "Bid Analyser".bold().cyan());
    println!("Document analysis and Q&A for bids and tenders\n");
    warn_if_no_api_key(config);

    if let Some(path) = initial {
        load_and_summarize(&mut session, &client, &settings, path).await;
    }

    let theme = ColorfulTheme::default();
    loop {
        let action = if session.document().is_some() {
            document_menu(&theme)?
        } else {
            empty_menu(&theme)?
        };

        match action {
            Action::Ask => {
                let question: String = Input::with_theme(&theme)
                    .with_prompt("Your question")
                    .allow_empty(true)
                    .interact_text()?;
                if !question.trim().is_empty() {
                    ask(&mut session, &client, &settings, &question).await;
                }
            }
            Action::Sample(question) => ask(&mut session, &client, &settings, question).await,
            Action::History => print_history(&session, config.pipeline.history_limit),
            Action::Info => {
                if let Some(loaded) = session.document() {
                    print_document_info(loaded);
                }
            }
            Action::Export => match session.summary() {
                Some(summary) => {
                    match export::write_summary(
                        &config.pipeline.export_dir,
                        summary,
                        &chrono::Local::now(),
                    ) {
                        Ok(path) => println!("{} {}\n", "Saved".green(), path.display()),
                        Err(e) => print_error(&format!("export failed: {}", e)),
                    }
                }
                None => print_error("no summary to export yet"),
            },
            Action::Load => {
                let path: String = Input::with_theme(&theme)
                    .with_prompt("Path to a PDF or TXT file")
                    .interact_text()?;
                load_and_summarize(&mut session, &client, &settings, PathBuf::from(path.trim()))
                    .await;
            }
            Action::Clear => {
                session.reset();
                println!("{}\n", "Analysis cleared.".dimmed());
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

fn empty_menu(theme: &ColorfulTheme) -> dialoguer::Result<Action> {
    let choice = Select::with_theme(theme)
        .with_prompt("No document loaded")
        .items(&["Load a document", "Quit"])
        .default(0)
        .interact()?;
    Ok(if choice == 0 { Action::Load } else { Action::Quit })
}

fn document_menu(theme: &ColorfulTheme) -> dialoguer::Result<Action> {
    let mut items: Vec<String> = vec!["Ask a question".to_string()];
    items.extend(SAMPLE_QUESTIONS.iter().map(|q| format!("Sample: {}", q)));
    items.extend(
        [
            "Show Q&A history",
            "Document info",
            "Export summary",
            "Load another document",
            "Clear analysis",
            "Quit",
        ]
        .map(String::from),
    );

    let choice = Select::with_theme(theme)
        .with_prompt("What next?")
        .items(&items)
        .default(0)
        .interact()?;

    let samples = SAMPLE_QUESTIONS.len();
    Ok(match choice {
        0 => Action::Ask,
        n if n <= samples => Action::Sample(SAMPLE_QUESTIONS[n - 1]),
        n => match n - samples {
            1 => Action::History,
            2 => Action::Info,
            3 => Action::Export,
            4 => Action::Load,
            5 => Action::Clear,
            _ => Action::Quit,
        },
    })
}

async fn load_and_summarize<T: Transport>(
    session: &mut Session,
    client: &LlmClient<T>,
    settings: &PipelineSettings,
    path: PathBuf,
) {
    println!("Processing {}...", path.display());
    let document = match Document::open(&path) {
        Ok(document) => document,
        Err(e) => {
            print_error(&e.to_string());
            return;
        }
    };

    let loaded = session.load(document, &settings.splitter);
    println!(
        "Split into {} chunk(s). Summarising, this can take a while...\n",
        loaded.chunks.len()
    );
    let summary = session.summarize(client, settings).await;
    print_summary(summary);
}

async fn ask<T: Transport>(
    session: &mut Session,
    client: &LlmClient<T>,
    settings: &PipelineSettings,
    question: &str,
) {
    println!("Scanning document for: {}\n", question.italic());
    let answer = session.ask(client, settings, question).await;
    print_answer(question, &answer);
}

/// Tell the user up front that every LLM call is going to fail.
pub fn warn_if_no_api_key(config: &Config) {
    if let Some(warning) = missing_api_key_warning(config) {
        println!("{} {}\n", "Warning:".yellow().bold(), warning);
    }
}

fn missing_api_key_warning(config: &Config) -> Option<String> {
    config.llm.api_key.is_none().then(|| {
        format!(
            "{} is not set; summaries and answers will fail until it is.",
            config.llm.api_key_env
        )
    })
}

pub fn print_summary(summary: &str) {
    println!("{}", "Extracted Key Information".bold().cyan());
    println!("{}\n", summary);
}

pub fn print_answer(question: &str, answer: &Answer) {
    println!("{} {}", "Question:".bold(), question);
    let label = if answer.is_found() {
        "Answer:".bold().green()
    } else {
        "Answer:".bold().yellow()
    };
    println!("{} {}\n", label, answer);
}

pub fn print_document_info(loaded: &LoadedDocument) {
    let stats = &loaded.stats;
    println!("{}", "Document Info".bold().cyan());
    println!("  Name:       {}", loaded.document.name);
    println!("  Processed:  {}", loaded.processed_at.format("%H:%M:%S"));
    println!("  Words:      {}", stats.words);
    println!("  Characters: {}", stats.chars);
    match stats.pages {
        Some(pages) => println!("  Pages:      {}", pages),
        None => println!("  Pages:      ~{} (estimated)", stats.estimated_pages),
    }
    println!("  Chunks:     {}", loaded.chunks.len());
    for chunk in &loaded.chunks {
        println!(
            "    #{:<3} chars {}..{}",
            chunk.index + 1,
            chunk.start,
            chunk.end
        );
    }
    println!();
}

fn print_history(session: &Session, limit: usize) {
    let history = session.history();
    if history.is_empty() {
        println!("{}\n", "No questions answered yet.".dimmed());
        return;
    }
    println!("{}", "Previous Q&A".bold().cyan());
    for (n, pair) in history.recent(limit) {
        println!("{} {}", format!("Q{}:", n).bold(), pair.question);
        println!("{} {}", format!("A{}:", n).bold(), pair.answer);
        println!("{}", "---".dimmed());
    }
    println!();
}

pub fn print_error(message: &str) {
    eprintln!("{} {}\n", "Error:".red().bold(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_names_the_missing_variable() {
        let config = Config::default();
        let warning = missing_api_key_warning(&config).unwrap();
        assert!(warning.starts_with("GROQ_API_KEY is not set"));
    }

    #[test]
    fn no_warning_with_api_key() {
        let mut config = Config::default();
        config.llm.api_key = Some("test-key".into());
        assert_eq!(missing_api_key_warning(&config), None);
    }
}
