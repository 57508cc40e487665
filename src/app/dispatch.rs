use crate::api::client::{ApiClient, CompanyFetch, CsvDownload};
use crate::api::types::{display_metric, Citation, CompareResponse};
use crate::chat::render::{render_blocks, TableExport};
use crate::chat::session::{ChatSession, SubmitOutcome};
use crate::chat::types::Block;
use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::export;
use anyhow::Result;
use console::style;
use std::path::Path;
use std::sync::Arc;

pub async fn dispatch(cli: Cli, config: Config) -> Result<()> {
    let client = ApiClient::new(&config);
    match cli.command {
        Commands::Chat {
            message,
            cvr,
            years,
        } => run_chat(client, message, cvr, years).await,
        Commands::Search { query, limit } => run_search(&client, &query, limit).await,
        Commands::Company { cvr, etag } => run_company(&client, &cvr, etag.as_deref()).await,
        Commands::Compare { cvr, export } => run_compare(&client, &cvr, export).await,
        Commands::Filings { cvr, limit } => run_filings(&client, &cvr, limit).await,
        Commands::Accounts { cvr } => run_accounts(&client, &cvr).await,
        Commands::Export { thread_id } => run_export(&client, &thread_id).await,
    }
}

// ── Chat ─────────────────────────────────────────────────────────────────

async fn run_chat(
    client: ApiClient,
    message: Option<String>,
    cvr: Option<String>,
    years: Vec<u16>,
) -> Result<()> {
    let years = if years.is_empty() { None } else { Some(years) };
    let mut session = ChatSession::new(Arc::new(client)).with_hints(cvr, years);

    if let Some(message) = message {
        turn(&mut session, &message).await;
        return Ok(());
    }

    println!("Ask about Danish companies. /export saves the thread as CSV,");
    println!("/csv saves the latest table, /quit exits.");
    loop {
        let input: String = dialoguer::Input::new()
            .with_prompt("you")
            .allow_empty(true)
            .interact_text()?;
        let input = input.trim().to_string();
        match input.as_str() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/export" => {
                match session.export_current_thread().await {
                    Some(download) => save_download(&download)?,
                    None => match session.last_error() {
                        Some(error) => print_error(error),
                        None => println!("Nothing to export yet - send a message first."),
                    },
                }
            }
            "/csv" => save_latest_table(session.blocks())?,
            _ => {
                // An input matching a pending choice id selects that choice;
                // both paths send the same request.
                let is_choice = render_blocks(session.blocks())
                    .iter()
                    .any(|r| r.choice_ids.iter().any(|id| id == &input));
                if is_choice {
                    let outcome = session.select_choice(&input).await;
                    print_turn(&session, outcome);
                } else {
                    turn(&mut session, &input).await;
                }
            }
        }
    }
    Ok(())
}

async fn turn(session: &mut ChatSession, text: &str) {
    let outcome = session.submit(text).await;
    print_turn(session, outcome);
}

fn print_turn(session: &ChatSession, outcome: SubmitOutcome) {
    match outcome {
        SubmitOutcome::Sent => {
            for rendered in render_blocks(session.blocks()) {
                for line in &rendered.lines {
                    println!("{line}");
                }
                if rendered.table_export.is_some() {
                    println!("{}", style("(save this table with /csv)").dim());
                }
                println!();
            }
        }
        SubmitOutcome::Failed => {
            if let Some(error) = session.last_error() {
                print_error(error);
            }
        }
        SubmitOutcome::Ignored => {}
    }
}

fn save_latest_table(blocks: &[Block]) -> Result<()> {
    let export: Option<TableExport> = render_blocks(blocks)
        .into_iter()
        .filter_map(|r| r.table_export)
        .next_back();
    match export {
        Some(table) => {
            let path = Path::new(table.filename);
            export::save_csv(path, &table.columns, &table.rows)?;
            println!("Saved {}", table.filename);
        }
        None => println!("No table in the current response."),
    }
    Ok(())
}

// ── Resource commands ────────────────────────────────────────────────────

async fn run_search(client: &ApiClient, query: &str, limit: u32) -> Result<()> {
    match client.search(query, limit).await {
        Ok(response) => {
            if response.items.is_empty() {
                println!("No results.");
            }
            for item in &response.items {
                let status = item
                    .status
                    .as_deref()
                    .map(|s| format!(" - {s}"))
                    .unwrap_or_default();
                println!("{}  {}{status}", item.cvr, style(&item.name).bold());
            }
            print_citations(&response.citations);
        }
        Err(err) => print_error(&err.user_message()),
    }
    Ok(())
}

async fn run_company(client: &ApiClient, cvr: &str, etag: Option<&str>) -> Result<()> {
    match client.company(cvr, etag).await {
        Ok(CompanyFetch::NotModified) => println!("Not modified."),
        Ok(CompanyFetch::Fresh { profile, etag }) => {
            let company = &profile.company;
            println!("{}", style(&company.name).bold());
            println!("  CVR      {}", company.cvr);
            if let Some(status) = &company.status {
                println!("  Status   {status}");
            }
            if let Some(address) = &company.address {
                println!("  Address  {address}");
            }
            if let Some(industry) = &company.industry {
                let code = industry.code.as_deref().unwrap_or("?");
                let text = industry.text.as_deref().unwrap_or("");
                println!("  Industry {code} {text}");
            }
            print_citations(&profile.citations);
            if let Some(etag) = etag {
                println!("{}", style(format!("etag: {etag}")).dim());
            }
        }
        Err(err) => print_error(&err.user_message()),
    }
    Ok(())
}

async fn run_compare(client: &ApiClient, cvr: &str, export_csv: bool) -> Result<()> {
    match client.compare(cvr).await {
        Ok(response) => {
            print_compare(&response);
            if export_csv {
                match client.export_compare_csv(cvr).await {
                    Ok(download) => save_download(&download)?,
                    Err(err) => print_error(&err.user_message()),
                }
            }
        }
        Err(err) => print_error(&err.user_message()),
    }
    Ok(())
}

fn print_compare(response: &CompareResponse) {
    let current = response.current_period.as_deref().unwrap_or("current");
    let previous = response.previous_period.as_deref().unwrap_or("previous");
    let columns = vec![
        "Metric".to_string(),
        current.to_string(),
        previous.to_string(),
        "Change".to_string(),
        "Change %".to_string(),
    ];
    let rows: Vec<Vec<String>> = response
        .key_changes
        .iter()
        .map(|delta| {
            vec![
                delta.field.clone(),
                display_metric(delta.current_value),
                display_metric(delta.previous_value),
                display_metric(delta.absolute_change),
                delta
                    .percentage_change
                    .map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v * 100.0)),
            ]
        })
        .collect();

    for rendered in render_blocks(&[Block::table(columns, rows)]) {
        for line in &rendered.lines {
            println!("{line}");
        }
    }
    println!("{}", response.narrative);
    print_citations(&response.sources);
}

async fn run_filings(client: &ApiClient, cvr: &str, limit: u32) -> Result<()> {
    match client.filings(cvr, limit).await {
        Ok(response) => {
            if response.filings.is_empty() {
                println!("No filings.");
            }
            for filing in &response.filings {
                let url = filing
                    .url
                    .as_deref()
                    .map(|u| format!("  {u}"))
                    .unwrap_or_default();
                println!("{}  {} ({}){url}", filing.id, filing.kind, filing.year);
            }
            print_citations(&response.citations);
        }
        Err(err) => print_error(&err.user_message()),
    }
    Ok(())
}

async fn run_accounts(client: &ApiClient, cvr: &str) -> Result<()> {
    match client.latest_accounts(cvr).await {
        Ok(accounts) => {
            println!("{}", style(format!("Accounts {}", accounts.year)).bold());
            println!("  Revenue  {}", display_metric(accounts.revenue));
            println!("  EBIT     {}", display_metric(accounts.ebit));
            println!("  Equity   {}", display_metric(accounts.equity));
            print_citations(&accounts.citations);
        }
        Err(err) => print_error(&err.user_message()),
    }
    Ok(())
}

async fn run_export(client: &ApiClient, thread_id: &str) -> Result<()> {
    match client.export_chat_csv(thread_id).await {
        Ok(download) => save_download(&download)?,
        Err(err) => print_error(&err.user_message()),
    }
    Ok(())
}

// ── Output helpers ───────────────────────────────────────────────────────

fn save_download(download: &CsvDownload) -> Result<()> {
    export::save_bytes(Path::new(&download.filename), &download.bytes)?;
    println!("Saved {}", download.filename);
    Ok(())
}

fn print_citations(citations: &[Citation]) {
    if citations.is_empty() {
        return;
    }
    println!("{}", style("Sources:").dim());
    for citation in citations {
        match &citation.title {
            Some(title) => println!("{}", style(format!("  {title}: {}", citation.url)).dim()),
            None => println!("{}", style(format!("  {}", citation.url)).dim()),
        }
    }
}

fn print_error(message: &str) {
    eprintln!("{}", style(message).red());
}
