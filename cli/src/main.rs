//! Folio - headless host
//!
//! Builds a site from configuration, renders the default view, then applies
//! each step (a view name, `follow:<view>`, `back` or `forward`) in order.

mod report;
mod step;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use folio_core::{Config, Locale, Site};

use report::{FinalState, Reporter};
use step::Step;

#[derive(Parser, Debug)]
#[command(name = "folio", version, about = "Drive the Folio view router headlessly")]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fragment root: a directory or an http(s) URL
    #[arg(long)]
    root: Option<String>,

    /// View rendered at startup
    #[arg(long = "default")]
    default_view: Option<String>,

    #[arg(long)]
    locale: Option<Locale>,

    /// File with the sidebar markup
    #[arg(long)]
    sidebar: Option<PathBuf>,

    /// Settings database
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// View names, `follow:<view>`, `back` or `forward`
    steps: Vec<Step>,
}

impl Args {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(root) = &self.root {
            config.fragment_root = root.clone();
        }
        if let Some(view) = &self.default_view {
            config.default_view = view.as_str().into();
        }
        if let Some(locale) = self.locale {
            config.locale = locale;
        }
        if let Some(sidebar) = &self.sidebar {
            config.sidebar_path = Some(sidebar.clone());
        }
        if let Some(settings) = &self.settings {
            config.settings_path = settings.clone();
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    folio_core::init_logging();

    let args = Args::parse();
    let config = args.config()?;
    let site = Site::new(config).context("Failed to create site")?;
    let reporter = Reporter::new(args.json);

    let outcome = site.initialize().await;
    reporter.step("initialize", &outcome)?;

    for step in &args.steps {
        match step.apply(&site).await {
            Ok(outcome) => reporter.step(&step.to_string(), &outcome)?,
            Err(e) => reporter.rejected(&step.to_string(), &e)?,
        }
    }

    let router = site.router();
    let state = FinalState {
        state: router.state(),
        location: router.location(),
        theme: site.theme().theme(),
        scrollspy_active: site.scrollspy().active(),
        sidebar: site.sidebar().map(|sidebar| sidebar.snapshot()),
        links: router.links().iter().map(|view| view.to_string()).collect(),
    };
    reporter.finish(&state)?;

    tracing::debug!(steps = args.steps.len(), "All steps applied");
    site.shutdown();

    Ok(())
}
