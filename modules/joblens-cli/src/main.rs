use std::collections::BTreeSet;
use std::env;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use joblens_client::{
    AuthGateway, Credentials, HttpIdentityProvider, IdentityProvider, JobsClient, SessionSink,
};
use joblens_common::{Config, FilterCriteria};
use joblens_sync::build_query;

#[derive(Parser)]
#[command(name = "joblens")]
#[command(about = "Operator CLI for the jobs sync client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the credential pair for the environment
    Login { username: String, password: String },

    /// List job postings
    List {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        search: Option<String>,
        /// Location preference, repeatable (remote, hybrid, onsite)
        #[arg(long)]
        category: Vec<String>,
        /// Resume after this posting id
        #[arg(long)]
        cursor: Option<String>,
    },

    /// Pin a posting (or unpin with --off)
    Pin {
        job_id: String,
        #[arg(long)]
        off: bool,
    },

    /// Hide a posting
    Hide { job_id: String },

    /// Hide every posting from a company
    HideCompany { company: String },

    /// Start a similarity search for a posting
    Similar { job_id: String },
}

struct CliSession;

impl SessionSink for CliSession {
    fn session_expired(&self) {
        warn!("session expired; run `joblens login` again");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("joblens=info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    let http = JobsClient::http_client(&config)?;
    let identity = Arc::new(HttpIdentityProvider::new(
        http.clone(),
        config.api_base_url.clone(),
    ));
    let gateway = Arc::new(AuthGateway::new(
        http,
        identity.clone(),
        Arc::new(CliSession),
    ));
    if let (Ok(access), Ok(refresh)) = (env::var("ACCESS_TOKEN"), env::var("REFRESH_TOKEN")) {
        gateway.set_credentials(Credentials { access, refresh });
    }
    let client = JobsClient::new(&config, gateway)?;

    match cli.command {
        Commands::Login { username, password } => {
            let creds = identity.login(&username, &password).await?;
            println!("export ACCESS_TOKEN={}", creds.access);
            println!("export REFRESH_TOKEN={}", creds.refresh);
        }
        Commands::List {
            title,
            company,
            search,
            category,
            cursor,
        } => {
            let filters = FilterCriteria {
                title: title.unwrap_or_default(),
                company: company.unwrap_or_default(),
                search: search.unwrap_or_default(),
                categories: category.into_iter().collect::<BTreeSet<_>>(),
            };
            let query = build_query(&filters, cursor, config.page_size);
            let jobs = client.list(&query).await?;
            for job in &jobs {
                let locations = job
                    .locations
                    .iter()
                    .map(|l| format!("{} {}", l.kind, l.text))
                    .collect::<Vec<_>>()
                    .join(", ");
                let pin = if job.is_pinned { " [pinned]" } else { "" };
                println!(
                    "{}  {} — {} ({}){}",
                    job.id, job.title, job.company, locations, pin
                );
            }
            if jobs.len() as u32 == config.page_size {
                if let Some(last) = jobs.last() {
                    println!("-- more available, pass --cursor {}", last.id);
                }
            }
        }
        Commands::Pin { job_id, off } => {
            client.set_pinned(&job_id, !off).await?;
            println!("{job_id} {}", if off { "unpinned" } else { "pinned" });
        }
        Commands::Hide { job_id } => {
            client.hide_job(&job_id).await?;
            println!("{job_id} hidden");
        }
        Commands::HideCompany { company } => {
            client.hide_company(&company).await?;
            println!("postings from {company} hidden");
        }
        Commands::Similar { job_id } => {
            client.find_similar(&job_id).await?;
            println!("similarity search started for {job_id}; re-run `joblens list` shortly");
        }
    }

    Ok(())
}
