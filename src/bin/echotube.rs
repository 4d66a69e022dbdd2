// Line-oriented front end for the dashboard engine.
// Reads commands from stdin, prints a JSON snapshot and pending notices after each.

use anyhow::{anyhow, Context, Result};
use echotube::api::HttpApi;
use echotube::store::Notice;
use echotube::tabs::Tab;
use echotube::types::SortOrder;
use echotube::Dashboard;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, PartialEq)]
enum Command {
    Tab(Tab),
    Like(String),
    Heart(String),
    Draft(String, String),
    Reply(String),
    HideOwner(bool),
    Unreplied(bool),
    Sort(SortOrder),
    Refresh,
    Show,
    Help,
    Quit,
}

fn parse_switch(s: &str) -> Result<bool> {
    match s {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        other => Err(anyhow!("expected on|off, got '{other}'")),
    }
}

fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim();
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    let need_arg = |what: &str| -> Result<String> {
        if rest.is_empty() {
            Err(anyhow!("usage: {head} <{what}>"))
        } else {
            Ok(rest.to_string())
        }
    };

    match head {
        "tab" => Ok(Command::Tab(need_arg("tab")?.parse()?)),
        "like" => Ok(Command::Like(need_arg("comment-id")?)),
        "heart" => Ok(Command::Heart(need_arg("comment-id")?)),
        "draft" => {
            let (id, text) = rest
                .split_once(' ')
                .ok_or_else(|| anyhow!("usage: draft <comment-id> <text>"))?;
            Ok(Command::Draft(id.to_string(), text.to_string()))
        }
        "reply" => Ok(Command::Reply(need_arg("comment-id")?)),
        "hide-owner" => Ok(Command::HideOwner(parse_switch(&need_arg("on|off")?)?)),
        "unreplied" => Ok(Command::Unreplied(parse_switch(&need_arg("on|off")?)?)),
        "sort" => Ok(Command::Sort(need_arg("newest|oldest")?.parse()?)),
        "refresh" => Ok(Command::Refresh),
        "show" | "" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(anyhow!("unknown command '{other}' (try 'help')")),
    }
}

const HELP: &str = "\
commands:
  tab comments|videos|live|hashtags
  like <comment-id>        heart <comment-id>
  draft <comment-id> <text>
  reply <comment-id>
  hide-owner on|off        unreplied on|off
  sort newest|oldest
  refresh                  show
  quit";

fn print_notices(notices: Vec<Notice>) {
    for n in notices {
        println!("[{:?}] {}", n.level, n.message);
    }
}

fn print_snapshot(dashboard: &Dashboard) -> Result<()> {
    let snapshot = dashboard.snapshot();
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
    println!("{json}");
    Ok(())
}

async fn run(dashboard: &Dashboard, cmd: Command) -> Result<bool> {
    match cmd {
        Command::Tab(tab) => dashboard.select_tab(tab),
        Command::Like(id) => {
            if let Err(e) = dashboard.toggle_like(&id).await {
                log::debug!("like {id}: {e}");
            }
        }
        Command::Heart(id) => {
            if let Err(e) = dashboard.toggle_heart(&id).await {
                log::debug!("heart {id}: {e}");
            }
        }
        Command::Draft(id, text) => dashboard.set_reply_draft(&id, text),
        Command::Reply(id) => {
            if let Err(e) = dashboard.reply(&id).await {
                log::debug!("reply {id}: {e}");
            }
        }
        Command::HideOwner(on) => dashboard.set_hide_owner_comments(on),
        Command::Unreplied(on) => dashboard.set_show_unreplied_only(on),
        Command::Sort(order) => dashboard.set_sort_order(order),
        Command::Refresh => {
            let (c, v) = futures::join!(dashboard.refresh_comments(), dashboard.refresh_videos());
            if let Err(e) = c.and(v) {
                log::debug!("refresh: {e}");
            }
        }
        Command::Show => {}
        Command::Help => {
            println!("{HELP}");
            return Ok(true);
        }
        Command::Quit => return Ok(false),
    }
    print_snapshot(dashboard)?;
    print_notices(dashboard.drain_notices());
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (safe to ignore if not found)
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = echotube::config::load().context("Failed to load configuration")?;
    config.print_summary();

    let api = HttpApi::new(&config.api_base_url, config.request_timeout_ms)?;
    log::info!("📡 Backend: {}", api.base_url());
    let dashboard = Dashboard::new(config, Arc::new(api));

    if !dashboard.bootstrap().await {
        match dashboard.login_url().await {
            Ok(url) => println!("Not logged in. Open this URL to connect your channel:\n{url}"),
            Err(e) => log::error!("{e:#}"),
        }
    }
    print_snapshot(&dashboard)?;
    print_notices(dashboard.drain_notices());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(cmd) => {
                if !run(&dashboard, cmd).await? {
                    break;
                }
            }
            Err(e) => eprintln!("{e}"),
        }
    }

    dashboard.shutdown();
    Ok(())
}
