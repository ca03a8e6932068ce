use anyhow::{Context, Result};
use chrono::{Local, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use forecast_core::{
    Config, Coordinates, ForecastView, HostDefaults, RequestBuilder, RequestDescriptor, Units,
    provider::{default_provider, request_builder_from_config},
};
use inquire::{Password, Select, Text};
use tokio::task::JoinSet;

use crate::{host, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "tomorrow.io weather forecasts")]
pub struct Cli {
    /// API key; takes precedence over the configured one.
    #[arg(long, global = true, env = "TOMORROW_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set API key, units, timezone and home location.
    Configure,

    /// Show the forecast for a location.
    Show(QueryArgs),

    /// Print the request URL without fetching it. The API key is masked.
    Url(QueryArgs),

    /// Show a summary for every saved location.
    Saved,

    /// Add a "lat,long" location to the saved list.
    Save { location: String },

    /// Remove a location from the saved list.
    Forget { location: String },
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// "lat,long" or a place identifier; defaults to the configured location.
    pub location: Option<String>,

    #[arg(long, value_enum, default_value_t = ViewArg::Detail)]
    pub view: ViewArg,

    /// Overrides the configured units.
    #[arg(long, value_enum)]
    pub units: Option<UnitsArg>,

    /// IANA timezone; overrides the configured and host timezone.
    #[arg(long)]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ViewArg {
    Detail,
    List,
}

impl From<ViewArg> for ForecastView {
    fn from(arg: ViewArg) -> Self {
        match arg {
            ViewArg::Detail => ForecastView::Detail,
            ViewArg::List => ForecastView::List,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitsArg {
    Imperial,
    Metric,
    System,
}

impl From<UnitsArg> for Units {
    fn from(arg: UnitsArg) -> Self {
        match arg {
            UnitsArg::Imperial => Units::Imperial,
            UnitsArg::Metric => Units::Metric,
            UnitsArg::System => Units::HostDefault,
        }
    }
}

/// Everything needed to build requests, resolved once per invocation.
struct Session {
    config: Config,
    host: HostDefaults,
    builder: RequestBuilder,
}

impl Session {
    fn open(api_key: Option<String>) -> Result<Self> {
        let mut config = Config::load()?;
        if api_key.is_some() {
            config.api_key = api_key;
        }
        let host = host::detect();
        let builder = request_builder_from_config(&config, host.clone())?;
        Ok(Self {
            config,
            host,
            builder,
        })
    }

    fn location(&self, args: &QueryArgs) -> String {
        match &args.location {
            Some(location) => location.clone(),
            None => self.config.location.to_string(),
        }
    }

    fn request(&self, args: &QueryArgs) -> Result<(RequestDescriptor, Units)> {
        let view = ForecastView::from(args.view);
        let units = args.units.map(Units::from).or(self.config.units);
        self.request_for(view, self.location(args), units, args.timezone.clone())
    }

    fn request_for(
        &self,
        view: ForecastView,
        location: String,
        units: Option<Units>,
        timezone: Option<String>,
    ) -> Result<(RequestDescriptor, Units)> {
        let now = Utc::now();
        let query = view.query(location, &self.config.fields, now);
        let mut query = query.units(units);
        if let Some(tz) = timezone.or_else(|| self.config.timezone.clone()) {
            query = query.timezone(tz);
        }
        let request = self.builder.build_at(&query, now)?;
        Ok((request, Units::resolve(units, &self.host)))
    }

    fn labels(&self, units: Units) -> render::Labels {
        render::Labels::new(units.is_metric(&self.host))
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(self.api_key),
            Command::Show(args) => {
                let session = Session::open(self.api_key)?;
                let (request, units) = session.request(&args)?;
                let title = session.location(&args);

                let result = default_provider()
                    .fetch(&request)
                    .await
                    .with_context(|| format!("Unable to load forecast for {title}"))?;

                let now = Local::now();
                let labels = session.labels(units);
                match ForecastView::from(args.view) {
                    ForecastView::Detail => {
                        print!("{}", render::detail(&title, &result, &now, labels))
                    }
                    ForecastView::List => {
                        println!("{}", render::card(&title, &result, &now, labels))
                    }
                }
                Ok(())
            }
            Command::Url(args) => {
                let session = Session::open(self.api_key)?;
                let (request, _) = session.request(&args)?;
                println!("{} {}", request.method, request.redacted_url());
                Ok(())
            }
            Command::Saved => saved(Session::open(self.api_key)?).await,
            Command::Save { location } => {
                let location: Coordinates = location.parse()?;
                let mut config = Config::load()?;
                if config.save_location(location) {
                    config.save()?;
                    println!("Saved {location}.");
                } else {
                    println!("{location} is already saved.");
                }
                Ok(())
            }
            Command::Forget { location } => {
                let location: Coordinates = location.parse()?;
                let mut config = Config::load()?;
                if config.forget_location(location) {
                    config.save()?;
                    println!("Removed {location}.");
                } else {
                    println!("{location} was not saved.");
                }
                Ok(())
            }
        }
    }
}

/// List-view fetches for every saved location, run concurrently. Each task
/// owns its own request and result.
async fn saved(session: Session) -> Result<()> {
    if session.config.saved_locations.is_empty() {
        println!("No saved locations. Add one with `forecast save <lat,long>`.");
        return Ok(());
    }

    let provider = default_provider();
    let mut tasks = JoinSet::new();
    for (index, location) in session.config.saved_locations.iter().enumerate() {
        let (request, _) = session.request_for(
            ForecastView::List,
            location.to_string(),
            session.config.units,
            None,
        )?;
        let provider = provider.clone();
        let title = location.to_string();
        tasks.spawn(async move { (index, title, provider.fetch(&request).await) });
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        outcomes.push(joined.context("Saved location task panicked")?);
    }
    outcomes.sort_by_key(|(index, _, _)| *index);

    let now = Local::now();
    let labels = session.labels(Units::resolve(session.config.units, &session.host));
    for (_, title, outcome) in outcomes {
        match outcome {
            Ok(result) => println!("{}", render::card(&title, &result, &now, labels)),
            Err(err) => {
                tracing::warn!(%title, error = %err, "saved location failed to load");
                println!("{title}: {}", err.user_message());
            }
        }
    }
    Ok(())
}

fn configure(api_key: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    let entered = match api_key {
        Some(key) => key,
        None => Password::new("tomorrow.io API key (leave empty to keep current):")
            .without_confirmation()
            .prompt()
            .context("Failed to read API key")?,
    };
    if !entered.trim().is_empty() {
        config.api_key = Some(entered.trim().to_string());
    }

    let current_units = config.units.unwrap_or(Units::HostDefault);
    let units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(current_units.code() as usize)
        .prompt()
        .context("Failed to read units")?;
    config.units = Some(units);

    let timezone = Text::new("Timezone (IANA, empty for system):")
        .with_default(config.timezone.as_deref().unwrap_or(""))
        .prompt()
        .context("Failed to read timezone")?;
    let timezone = timezone.trim();
    config.timezone = (!timezone.is_empty()).then(|| timezone.to_string());

    let current = config.location.to_string();
    let location = Text::new("Home location (lat,long):")
        .with_default(&current)
        .prompt()
        .context("Failed to read location")?;
    config.location = location.parse()?;

    config.save()?;
    let path = Config::config_file_path()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}
