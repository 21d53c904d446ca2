pub mod actions;
pub mod config;
pub mod store;
pub mod task;
pub mod theme;
pub mod view;

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::actions::{ActionError, Intent};
use crate::config::Config;
use crate::store::{StoreError, TodoStore};
use crate::task::Task;
use crate::theme::Theme;
use crate::view::View;

/// Everything the render layer needs for one GET: the full task list, the
/// view picked by the query string, and the cookie-derived theme.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub tasks: Vec<Task>,
    pub view: View,
    pub theme: Theme,
}

/// The application behind both endpoints. The embedding HTTP layer owns
/// request plumbing; this owns everything from decoded input down.
#[derive(Debug)]
pub struct App {
    store: TodoStore,
    default_theme: Theme,
}

impl App {
    #[tracing::instrument(skip(rc_override, data_override))]
    pub fn open(rc_override: Option<&Path>, data_override: Option<&Path>) -> anyhow::Result<Self> {
        let cfg = Config::load(rc_override)?;
        let data_dir = config::resolve_data_dir(&cfg, data_override)
            .context("failed to resolve data directory")?;

        let store = TodoStore::open(&data_dir)
            .with_context(|| format!("failed to open todo store at {}", data_dir.display()))?;

        info!(data_dir = %data_dir.display(), "application ready");

        Ok(Self {
            store,
            default_theme: cfg.default_theme(),
        })
    }

    /// Read endpoint: the full ordered task list, JSON-ready.
    pub fn tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.store.read()
    }

    /// Write endpoint: decoded form pairs in, one store mutation out.
    /// Returns the created/updated record, or `None` when the caller
    /// should just re-read the list.
    #[tracing::instrument(skip(self, form, now))]
    pub fn submit(
        &self,
        form: &[(String, String)],
        now: DateTime<Utc>,
    ) -> Result<Option<Task>, ActionError> {
        let intent = Intent::from_form(form)?;
        debug!(intent = intent.label(), "dispatching");
        actions::dispatch(&self.store, intent, now)
    }

    /// Per-request render input: tasks plus view and theme parsed from the
    /// query string and cookie header.
    #[tracing::instrument(skip(self, view_param, cookie_header))]
    pub fn page(
        &self,
        view_param: Option<&str>,
        cookie_header: Option<&str>,
    ) -> Result<PageContext, StoreError> {
        Ok(PageContext {
            tasks: self.store.read()?,
            view: View::parse(view_param),
            theme: Theme::from_cookie_header(cookie_header, self.default_theme),
        })
    }
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
