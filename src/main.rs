use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use itertools::Itertools as _;
use serde_json::Value;
use tokio::{fs, task};
use tracing::info;
use tracing_subscriber::{
    layer::SubscriberExt as _, util::SubscriberInitExt as _, EnvFilter,
};

use ticket_status::{
    api::{ticket, JoinedTicket},
    board::{BulkState, Progress},
    Client, Config, StatusBoard,
};

/// Administers ticket statuses through the ticketing REST API.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every ticket with the email of its customer.
    List,
    /// Flip a ticket between pending and received.
    Toggle { id: i64 },
    /// Set the status of a single ticket.
    Set { id: i64, status: String },
    /// Set every ticket not already in the given status to it.
    SetAll { status: String },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = fs::read_to_string(&cli.config).await?;
    let config = toml::from_str::<Config>(&config)?;

    let client = Client::from_config(&config)?;
    let mut board = StatusBoard::new();

    match cli.command {
        Command::List => {
            board.refresh(&client).await?;
            print_table(board.tickets());
        }
        Command::Toggle { id } => {
            let id = ticket::Id::from(id);
            board.refresh(&client).await?;
            let status = board.toggle_row_status(&client, id).await?;
            println!("ticket #{id} is now {status}");
        }
        Command::Set { id, status } => {
            let id = ticket::Id::from(id);
            board.set_status(&client, id, &status).await?;
            println!("ticket #{id} is now {status}");
        }
        Command::SetAll { status } => {
            board.refresh(&client).await?;

            let mut progress = board.progress();
            let reporter = task::spawn(async move {
                while progress.changed().await.is_ok() {
                    let Progress { updated, total } =
                        *progress.borrow_and_update();
                    info!("updated {updated}/{total}");
                }
            });

            match board.bulk_update(&client, &status).await {
                BulkState::Completed(outcome) => {
                    println!(
                        "updated {}/{} tickets to {}",
                        outcome.updated, outcome.total, outcome.target,
                    );
                    for failure in &outcome.failures {
                        println!("  #{}: {}", failure.id, failure.error);
                    }
                }
                BulkState::Failed { message } => {
                    return Err(message.clone().into());
                }
                BulkState::Idle | BulkState::Running(_) => {}
            }
            reporter.abort();

            if let Some(error) = board.error() {
                println!("tickets could not be reloaded: {error}");
            }
        }
    }

    Ok(())
}

fn print_table(tickets: &[JoinedTicket]) {
    const HEADER: [&str; 8] = [
        "ID",
        "Passport Name",
        "Facebook Name",
        "Customer Email",
        "Member Code",
        "Priority Date",
        "1st",
        "Status",
    ];

    if tickets.is_empty() {
        println!("No tickets found.");
        return;
    }

    println!("{}", HEADER.iter().join("\t"));
    for row in tickets {
        let t = &row.ticket;
        let fst_pt = match &t.fst_pt {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        };
        let cells = [
            Some(t.id.to_string()),
            t.passport_name.clone(),
            t.facebook_name.clone(),
            row.customer_email.clone(),
            t.member_code.clone(),
            t.priority_date.clone(),
            fst_pt,
            t.status.clone(),
        ];
        println!(
            "{}",
            cells
                .iter()
                .map(|cell| match cell.as_deref() {
                    None | Some("") => "—",
                    Some(cell) => cell,
                })
                .join("\t")
        );
    }
}
