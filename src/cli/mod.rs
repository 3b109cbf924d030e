pub mod demo;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use view_navigator::navigation::events::{
    TOPIC_NAVIGATION_COMPLETE, TOPIC_NAVIGATION_ERROR, TOPIC_NAVIGATION_STARTED,
    TOPIC_VIEW_REGISTERED,
};
use view_navigator::{
    EventBus, MountRoot, NavigateOptions, Navigation, NavigationError, NavigatorSettings,
    ViewManager,
};

#[derive(Parser)]
#[command(name = "view-navigator")]
#[command(about = "Drive the view navigation manager through a navigation script")]
pub struct Cli {
    /// Log to stderr instead of view-navigator.log
    #[arg(long, global = true)]
    pub stderr: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a navigation script against the demo views
    Run(RunArgs),
    /// List the demo views
    Views,
}

#[derive(Args)]
pub struct RunArgs {
    /// Settings file (TOML); defaults to the user config directory
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Comma separated steps: view ids, `back` or `refresh`
    #[arg(long, default_value = "settings,detail,home,back")]
    pub script: String,

    /// Starting view (defaults to the settings' default view)
    #[arg(long)]
    pub start: Option<String>,

    /// Issue every step at once so they go through the transition queue
    #[arg(long)]
    pub burst: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    Navigate(String),
    Back,
    Refresh,
}

fn parse_script(script: &str) -> Vec<Step> {
    script
        .split(',')
        .map(str::trim)
        .filter(|step| !step.is_empty())
        .map(|step| match step {
            "back" => Step::Back,
            "refresh" => Step::Refresh,
            id => Step::Navigate(id.to_string()),
        })
        .collect()
}

async fn run_step(manager: &ViewManager, step: &Step) -> Result<Option<Navigation>, NavigationError> {
    match step {
        Step::Navigate(id) => manager
            .navigate_to(id, NavigateOptions::default())
            .await
            .map(Some),
        Step::Back => manager.go_back().await,
        Step::Refresh => manager.refresh().await,
    }
}

fn print_outcome(step: &Step, outcome: &Result<Option<Navigation>, NavigationError>) {
    let label = match step {
        Step::Navigate(id) => id.clone(),
        Step::Back => "back".to_string(),
        Step::Refresh => "refresh".to_string(),
    };
    match outcome {
        Ok(Some(nav)) => println!(
            "  {} {} {} {}",
            "→".bright_green(),
            label.bright_white().bold(),
            format!("({:.2}ms)", nav.duration.as_secs_f64() * 1000.0).dimmed(),
            if nav.deferred { "queued".yellow().to_string() } else { String::new() }
        ),
        Ok(None) => println!("  {} {} {}", "·".dimmed(), label, "nothing to do".dimmed()),
        Err(e) => println!("  {} {} {}", "✗".bright_red(), label.bright_white().bold(), e.to_string().red()),
    }
}

fn subscribe_counter(bus: &EventBus, topic: &'static str) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = count.clone();
    bus.subscribe(topic, move |event| {
        seen.fetch_add(1, Ordering::Relaxed);
        log::debug!("event {}: {}", topic, event);
    });
    count
}

pub async fn run_command(args: RunArgs) -> Result<()> {
    let settings = match &args.settings {
        Some(path) => NavigatorSettings::load(path)?,
        None => NavigatorSettings::load(&NavigatorSettings::default_path()?)?,
    };

    let bus = EventBus::new();
    let topics = [
        TOPIC_VIEW_REGISTERED,
        TOPIC_NAVIGATION_STARTED,
        TOPIC_NAVIGATION_COMPLETE,
        TOPIC_NAVIGATION_ERROR,
    ];
    let counters: Vec<_> = topics
        .into_iter()
        .map(|topic| (topic, subscribe_counter(&bus, topic)))
        .collect();

    let manager = ViewManager::new(Arc::new(bus));
    let registry = demo::demo_registry()?;
    for config in registry.list_all() {
        manager.register_view(config.id.clone(), (**config).clone());
    }

    println!();
    println!("  {}", "🧭 View Navigator".bright_blue().bold());
    println!("  {}", "═════════════════".bright_blue());

    let first = manager
        .initialize(MountRoot::new("#app"), args.start.as_deref(), settings)
        .await
        .context("Failed to initialize the view manager")?;
    println!("  {} {}", "Started at".dimmed(), first.view.to_string().bright_green().bold());

    let steps = parse_script(&args.script);
    if args.burst {
        let outcomes = futures::future::join_all(steps.iter().map(|step| run_step(&manager, step))).await;
        for (step, outcome) in steps.iter().zip(outcomes.iter()) {
            print_outcome(step, outcome);
        }
    } else {
        for step in &steps {
            let outcome = run_step(&manager, step).await;
            print_outcome(step, &outcome);
        }
    }

    println!();
    println!("  {}", "Navigation state".bright_white().bold());
    println!("{}", serde_json::to_string_pretty(&manager.navigation_state())?);
    println!();
    println!("  {}", "Metrics".bright_white().bold());
    println!("{}", serde_json::to_string_pretty(&manager.metrics())?);
    println!();
    println!("  {}", "Events".bright_white().bold());
    for (topic, count) in &counters {
        println!("    {}: {}", topic.dimmed(), count.load(Ordering::Relaxed));
    }

    manager.destroy();
    Ok(())
}

pub fn views_command() -> Result<()> {
    let registry = demo::demo_registry()?;

    println!();
    println!("  {}", "Registered views:".bright_white().bold());
    for config in registry.list_all() {
        let mut flags = Vec::new();
        if !config.cache {
            flags.push("no-cache");
        }
        if !config.show_in_nav {
            flags.push("hidden");
        }
        println!(
            "  {} {} {} {}",
            config.icon.as_deref().unwrap_or("•"),
            config.id.to_string().bright_green().bold(),
            config.route.cyan(),
            flags.join(", ").dimmed()
        );
        if !config.description.is_empty() {
            println!("      {}", config.description.dimmed());
        }
    }
    Ok(())
}
