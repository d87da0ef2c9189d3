use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt::Write;
use tracing_subscriber::EnvFilter;
use url::Url;

use domquery::{FetchConfig, Fetcher, Node, Query};

/// Fetch a page and list its elements or attribute values.
#[derive(Parser, Debug)]
#[command(name = "dq", version)]
struct Cli {
    /// Page to fetch. Redirects are reported, never followed.
    url: Url,

    /// Tag filter, applied in order. Repeat to narrow: -t ul -t a
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    /// Print this attribute's values instead of the matched nodes
    #[arg(short, long)]
    attr: Option<String>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,

    #[arg(long, env = "DQ_PROXY")]
    proxy: Option<String>,

    #[arg(long, env = "DQ_USER_AGENT")]
    user_agent: Option<String>,
}

fn apply_filters(query: Query, tags: &[String]) -> Query {
    tags.iter()
        .fold(query, |query, tag| query.elements_by_tag_name(tag))
}

fn render_nodes(query: &Query) -> String {
    let mut out = String::new();
    for node in query {
        write!(out, "{}", node.tag_name().unwrap_or("#document").bright_cyan()).unwrap();
        for attr in &node.attributes {
            write!(out, " {}={}", format!("@{}", attr.key).yellow(), attr.value).unwrap();
        }
        writeln!(out).unwrap();
    }
    out
}

fn render_values(values: &[String]) -> String {
    let mut out = String::new();
    for value in values {
        out.push_str(value);
        out.push('\n');
    }
    out
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = FetchConfig::new();
    if let Some(proxy) = cli.proxy {
        config = config.proxy(proxy);
    }
    if let Some(user_agent) = cli.user_agent {
        config = config.user_agent(user_agent);
    }
    let fetcher = Fetcher::new(config).context("Failed to build HTTP client")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")?
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message(format!("Fetching {}", cli.url));

    let query = match Query::from_url_with(&fetcher, &cli.url).await {
        Ok(query) => {
            pb.finish_and_clear();
            query
        }
        Err(e) => {
            pb.finish_with_message("Fetch failed");
            return Err(e).with_context(|| format!("Failed to load {}", cli.url));
        }
    };

    let matched = apply_filters(query, &cli.tags);
    tracing::debug!(matched = matched.len(), "filters applied");

    let output = match (&cli.attr, cli.json) {
        (Some(key), false) => render_values(&matched.attr(key)),
        (Some(key), true) => serde_json::to_string_pretty(&matched.attr(key))? + "\n",
        (None, false) => render_nodes(&matched),
        (None, true) => {
            let nodes: Vec<&Node> = matched.iter().collect();
            serde_json::to_string_pretty(&nodes)? + "\n"
        }
    };
    print!("{output}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}
