// src/cli.rs
use crate::app::{Controller, Intent};
use crate::board::JobBoard;
use crate::config::AppConfig;
use crate::form::JobForm;
use crate::listing::{posted_ago, CategoryFilter, ExperienceFilter, ListingIntent, PageItem};
use crate::router::Route;
use crate::scout::EXAMPLE_QUERIES;
use crate::web::start_web_server;
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "jobofficer")]
#[command(about = "Job board API server and admin tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// YAML file with `local` and `production` sections
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP API
    Serve,
    /// Print one page of the public listing
    List(ListArgs),
    /// Draft a description for a job title
    Describe { title: String },
    /// Generate postings for a free-text query
    Scout(ScoutArgs),
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// all, tech or non-tech
    #[arg(long)]
    pub category: Option<String>,
    /// all, fresher or experienced
    #[arg(long)]
    pub experience: Option<String>,
    #[arg(long)]
    pub remote: bool,
    #[arg(long)]
    pub internship: bool,
    /// Matches title, company or location
    #[arg(long, short)]
    pub search: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(Args, Debug)]
pub struct ScoutArgs {
    pub query: String,
    /// Add every generated posting to the board
    #[arg(long, requires_all = ["email", "password"])]
    pub save: bool,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
}

pub async fn handle_command(cli: Cli, config: AppConfig) -> Result<()> {
    if let Command::Serve = cli.command {
        return start_web_server(&config).await;
    }

    let board = Arc::new(JobBoard::new(config.build_store()?));
    let mut controller = Controller::new(board, config.build_generator()?);
    controller.load().await;

    let lines = match cli.command {
        Command::Serve => Vec::new(),
        Command::List(args) => list(&mut controller, &args).await?,
        Command::Describe { title } => describe(&mut controller, &title).await?,
        Command::Scout(args) => scout(&mut controller, &args).await?,
    };

    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

async fn list(controller: &mut Controller, args: &ListArgs) -> Result<Vec<String>> {
    if let Some(category) = &args.category {
        let filter = CategoryFilter::parse(category)
            .with_context(|| format!("Unknown category filter: {}", category))?;
        controller
            .dispatch(Intent::Listing(ListingIntent::SetCategory(filter)))
            .await;
    }
    if let Some(experience) = &args.experience {
        let filter = ExperienceFilter::parse(experience)
            .with_context(|| format!("Unknown experience filter: {}", experience))?;
        controller
            .dispatch(Intent::Listing(ListingIntent::SetExperience(filter)))
            .await;
    }
    if args.remote {
        controller
            .dispatch(Intent::Listing(ListingIntent::ToggleRemoteOnly))
            .await;
    }
    if args.internship {
        controller
            .dispatch(Intent::Listing(ListingIntent::ToggleInternshipOnly))
            .await;
    }
    if let Some(term) = &args.search {
        controller
            .dispatch(Intent::Listing(ListingIntent::SetSearchTerm(term.clone())))
            .await;
    }
    controller
        .dispatch(Intent::Listing(ListingIntent::GoToPage(args.page)))
        .await;

    let view = controller.state().listing_view();
    if let Some(message) = view.empty_message {
        return Ok(vec![message.to_string()]);
    }

    let now = Utc::now();
    let mut lines: Vec<String> = view
        .page
        .items
        .iter()
        .map(|job| {
            format!(
                "#{} {} | {} | {} | {} | {}",
                job.id,
                job.title,
                job.company,
                job.location,
                job.job_type,
                posted_ago(job.posted_date, now)
            )
        })
        .collect();
    lines.push(format!(
        "Page {} of {} ({} jobs)",
        view.page.page, view.page.total_pages, view.page.total_count
    ));
    if !view.page_strip.is_empty() {
        lines.push(render_strip(&view.page_strip, view.page.page));
    }
    Ok(lines)
}

fn render_strip(strip: &[PageItem], current: usize) -> String {
    strip
        .iter()
        .map(|item| match item {
            PageItem::Page(page) if *page == current => format!("[{}]", page),
            PageItem::Page(page) => page.to_string(),
            PageItem::Ellipsis => "...".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

async fn describe(controller: &mut Controller, title: &str) -> Result<Vec<String>> {
    controller.dispatch(Intent::AddNew).await;
    let form = JobForm {
        title: title.to_string(),
        ..JobForm::blank()
    };
    controller.dispatch(Intent::UpdateForm(form)).await;
    controller.dispatch(Intent::GenerateDescription).await;

    let form = &controller.state().form;
    if let Some(error) = &form.error {
        anyhow::bail!("{}", error);
    }

    let mut lines = vec![
        form.description.clone(),
        format!("Category: {}", form.category),
        format!("Experience: {}", form.experience_level),
        "Requirements:".to_string(),
    ];
    lines.extend(form.requirements.lines().map(|r| format!("  - {}", r)));
    lines.push("Qualifications:".to_string());
    lines.extend(form.qualifications.lines().map(|q| format!("  - {}", q)));
    Ok(lines)
}

async fn scout(controller: &mut Controller, args: &ScoutArgs) -> Result<Vec<String>> {
    if args.save {
        let (Some(email), Some(password)) = (&args.email, &args.password) else {
            anyhow::bail!("--save needs --email and --password");
        };
        controller.login(email, password).await;
        controller.drain_events().await;
        if let Some(error) = &controller.state().login_error {
            anyhow::bail!("Login failed: {}", error);
        }
        controller.dispatch(Intent::Navigate(Route::Admin)).await;
    }

    controller.dispatch(Intent::OpenScout).await;
    controller.dispatch(Intent::RunScout(args.query.clone())).await;

    let workspace = &controller.state().scout;
    if let Some(error) = &workspace.error {
        warn!("Scout failed for '{}'", args.query);
        let mut message = error.clone();
        if args.query.trim().is_empty() {
            message = format!("{} Try: {}", message, EXAMPLE_QUERIES.join(" / "));
        }
        anyhow::bail!("{}", message);
    }

    let count = workspace.results.len();
    let mut lines: Vec<String> = workspace
        .results
        .iter()
        .map(|job| format!("{} | {} | {} | {}", job.title, job.company, job.location, job.job_type))
        .collect();

    if args.save {
        for index in 0..count {
            controller.dispatch(Intent::AddScouted(index)).await;
        }
        let workspace = &controller.state().scout;
        if let Some(error) = &workspace.error {
            anyhow::bail!("{}", error);
        }
        let added = workspace.results.iter().filter(|job| workspace.is_added(job)).count();
        info!("Added {} scouted jobs", added);
        lines.push(format!("Added {} of {} jobs to the board", added, count));
    }
    Ok(lines)
}
