// ABOUTME: The `parse` subcommand: normalize a feed offline and print the records as JSON.
// ABOUTME: Reads from a file, stdin ("-"), or an http(s) URL.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use euraxess_feed::parse_job_feed;
use euraxess_fetch::Client;

use crate::config::ParseArgs;

pub async fn run(args: &ParseArgs) -> Result<()> {
    let text = load_text(&args.target, Duration::from_secs(args.timeout_secs)).await?;
    let mut records = parse_job_feed(&text).map_err(anyhow::Error::new)?;
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }

    let out = if args.compact {
        serde_json::to_string(&records)?
    } else {
        serde_json::to_string_pretty(&records)?
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", out)?;
    Ok(())
}

async fn load_text(target: &str, timeout: Duration) -> Result<String> {
    if target == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }

    if target.starts_with("http://") || target.starts_with("https://") {
        let client = Client::builder().timeout(timeout).build();
        return client.fetch_feed(target).await.map_err(anyhow::Error::new);
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", path.display()));
    }
    fs::read_to_string(&path).with_context(|| format!("failed to read {}", path.display()))
}
