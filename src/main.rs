use std::path::PathBuf;

use anyhow::{bail, Context};
use serde::Serialize;

mod app;
mod config;
mod db;
mod error;
mod feed;
mod models;
mod scheduler;
mod services;
mod sync;

use app::App;
use config::Config;

const USAGE: &str = "\
usage: feedsync <command>

  --search <query>             resolve a feed URL or search stored titles
  --refresh <feed-id>          fetch new items for one feed
  --refresh-all                refresh every stored feed once
  --pull <feed-id> [<item-id>] page through stored items, newest first
  --pull-since <feed-id> [<item-id>]
                               items newer than the given item
  --authors <feed-id>          authors of a feed
  --item-authors <item-id>     authors of an item
  --import <file.opml>         subscribe to every feed in an OPML file
  --watch                      refresh on the configured interval until Ctrl-C";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Search(String),
    Refresh(String),
    RefreshAll,
    Pull { feed_id: String, after: Option<String> },
    PullSince { feed_id: String, since: Option<String> },
    Authors(String),
    ItemAuthors(String),
    Import(PathBuf),
    Watch,
}

fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let flag = args.first().map(String::as_str).unwrap_or("");
    let arg = |i: usize| -> anyhow::Result<String> {
        match args.get(i) {
            Some(value) => Ok(value.clone()),
            None => bail!("{} needs an argument\n\n{}", flag, USAGE),
        }
    };

    let command = match flag {
        "--search" => Command::Search(arg(1)?),
        "--refresh" => Command::Refresh(arg(1)?),
        "--refresh-all" => Command::RefreshAll,
        "--pull" => Command::Pull {
            feed_id: arg(1)?,
            after: args.get(2).cloned(),
        },
        "--pull-since" => Command::PullSince {
            feed_id: arg(1)?,
            since: args.get(2).cloned(),
        },
        "--authors" => Command::Authors(arg(1)?),
        "--item-authors" => Command::ItemAuthors(arg(1)?),
        "--import" => Command::Import(PathBuf::from(arg(1)?)),
        "--watch" => Command::Watch,
        "" => bail!("{}", USAGE),
        other => bail!("unknown command {}\n\n{}", other, USAGE),
    };
    Ok(command)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_args(&args)?;

    let config = Config::load().context("loading configuration")?;
    let app = App::new(&config)
        .await
        .with_context(|| format!("opening store at {}", config.db_path))?;

    match command {
        Command::Search(query) => print_json(&app.search(&query).await?)?,
        Command::Refresh(feed_id) => print_json(&app.refresh(&feed_id).await?)?,
        Command::RefreshAll => print_json(&app.refresh_all().await?)?,
        Command::Pull { feed_id, after } => {
            print_json(&app.pull(&feed_id, after.as_deref()).await?)?
        }
        Command::PullSince { feed_id, since } => {
            print_json(&app.pull_since(&feed_id, since.as_deref()).await?)?
        }
        Command::Authors(feed_id) => print_json(&app.feed_authors(&feed_id).await?)?,
        Command::ItemAuthors(item_id) => print_json(&app.item_authors(&item_id).await?)?,
        Command::Import(path) => {
            let report = app
                .import_opml(&path)
                .await
                .with_context(|| format!("importing {}", path.display()))?;
            print_json(&report)?
        }
        Command::Watch => app.watch().await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_pull_with_and_without_cursor() {
        assert_eq!(
            parse_args(&args(&["--pull", "F1"])).unwrap(),
            Command::Pull {
                feed_id: "F1".to_string(),
                after: None
            }
        );
        assert_eq!(
            parse_args(&args(&["--pull", "F1", "I9"])).unwrap(),
            Command::Pull {
                feed_id: "F1".to_string(),
                after: Some("I9".to_string())
            }
        );
    }

    #[test]
    fn parses_simple_flags() {
        assert_eq!(parse_args(&args(&["--watch"])).unwrap(), Command::Watch);
        assert_eq!(parse_args(&args(&["--refresh-all"])).unwrap(), Command::RefreshAll);
        assert_eq!(
            parse_args(&args(&["--search", "golang"])).unwrap(),
            Command::Search("golang".to_string())
        );
        assert_eq!(
            parse_args(&args(&["--import", "subs.opml"])).unwrap(),
            Command::Import(PathBuf::from("subs.opml"))
        );
    }

    #[test]
    fn missing_argument_is_an_error() {
        let err = parse_args(&args(&["--refresh"])).unwrap_err();
        assert!(err.to_string().contains("--refresh needs an argument"));
    }

    #[test]
    fn unknown_or_empty_command_is_an_error() {
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
        assert!(parse_args(&[]).is_err());
    }
}
