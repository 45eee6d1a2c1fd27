//! reelbox - browse, search and bookmark movies and TV shows from TMDB.

/// Application configuration (TOML + environment).
mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppPaths, ResolvedConfig};
use reelbox_api::tmdb::{
    ApiError, MediaApi, MediaDetail, MediaItem, MediaKind, MediaQuery, TmdbClient, genres_for,
    resolve_genre_id,
};
use reelbox_core::{FetchController, ProfileStore, SavedRegistry, UserProfile};
use reelbox_db::SqliteStore;

/// Number of popular titles shown per kind on the home view.
const HOME_POPULAR_LIMIT: usize = 10;

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Greeting, trending and popular titles.
    Home,
    /// Search by text, or discover by popularity optionally filtered by genre.
    Browse(BrowseArgs),
    /// Weekly trending titles.
    Trending(KindArgs),
    /// Full detail record for one title.
    Details(ItemArgs),
    /// Manage saved titles.
    Saved(SavedCommand),
    /// Manage the local user profile.
    Profile(ProfileCommand),
    /// List the built-in genre catalog.
    Genres(KindArgs),
}

/// Arguments naming a media kind.
#[derive(clap::Args)]
struct KindArgs {
    /// Media kind: "movie" or "tv".
    kind: MediaKind,
}

/// Arguments naming a single title.
#[derive(clap::Args)]
struct ItemArgs {
    /// Media kind: "movie" or "tv".
    kind: MediaKind,
    /// TMDB ID.
    id: u64,
}

/// Arguments for the `browse` subcommand.
#[derive(clap::Args)]
struct BrowseArgs {
    /// Media kind: "movie" or "tv".
    kind: MediaKind,
    /// Free-text search query.
    #[arg(long, conflicts_with = "genre")]
    query: Option<String>,
    /// Genre name or ID (see `reelbox genres`).
    #[arg(long)]
    genre: Option<String>,
}

/// Arguments for the `saved` subcommand.
#[derive(clap::Args)]
struct SavedCommand {
    /// Saved subcommand to run.
    #[command(subcommand)]
    command: SavedSubcommands,
}

/// Available saved-items subcommands.
#[derive(Subcommand)]
enum SavedSubcommands {
    /// Save the title, or unsave it if already saved.
    Toggle(ItemArgs),
    /// Report whether the title is saved.
    Status(ItemArgs),
    /// Show details for every saved title.
    List(KindArgs),
}

/// Arguments for the `profile` subcommand.
#[derive(clap::Args)]
struct ProfileCommand {
    /// Profile subcommand to run.
    #[command(subcommand)]
    command: ProfileSubcommands,
}

/// Available profile subcommands.
#[derive(Subcommand)]
enum ProfileSubcommands {
    /// Show the stored profile.
    Show,
    /// Create or replace the profile.
    Set(ProfileSetArgs),
    /// Delete the profile.
    Delete,
}

/// Arguments for the `profile set` subcommand.
#[derive(clap::Args)]
struct ProfileSetArgs {
    /// First name.
    #[arg(long)]
    first_name: String,
    /// Last name.
    #[arg(long)]
    last_name: String,
    /// Age.
    #[arg(long)]
    age: String,
    /// City.
    #[arg(long)]
    city: String,
}

/// Builds a `TmdbClient` from the resolved configuration.
///
/// # Errors
///
/// Returns an error if no API token is configured or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &ResolvedConfig) -> Result<Arc<TmdbClient>> {
    let mut builder = TmdbClient::builder()
        .api_token(config.api_token()?)
        .language(config.language())
        .user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
    if let Some(url) = config.base_url() {
        builder = builder.base_url(url.clone());
    }
    let client = builder.build().context("failed to build TMDB client")?;
    Ok(Arc::new(client))
}

/// Opens the key-value store under `dir` (or the default data directory).
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
fn open_store(dir: Option<&Path>) -> Result<Arc<SqliteStore>> {
    let store = SqliteStore::open(dir).context("failed to open reelbox database")?;
    Ok(Arc::new(store))
}

/// Controller for the weekly trending list of `kind`, fetched on creation.
fn trending_controller(
    client: &Arc<TmdbClient>,
    kind: MediaKind,
) -> FetchController<Vec<MediaItem>, ApiError> {
    let client = Arc::clone(client);
    FetchController::new(
        move || {
            let client = Arc::clone(&client);
            async move { client.trending(kind).await }
        },
        true,
    )
}

/// Controller for a search/discover request, fetched on creation.
fn listing_controller(
    client: &Arc<TmdbClient>,
    kind: MediaKind,
    query: MediaQuery,
) -> FetchController<Vec<MediaItem>, ApiError> {
    let client = Arc::clone(client);
    let query = Arc::new(query);
    FetchController::new(
        move || {
            let client = Arc::clone(&client);
            let query = Arc::clone(&query);
            async move { client.search_or_discover(kind, &query).await }
        },
        true,
    )
}

/// Waits for `controller` to settle and returns its data.
///
/// # Errors
///
/// Returns the controller's generic error message if the fetch failed.
async fn settled_data<T>(controller: &FetchController<T, ApiError>) -> Result<T>
where
    T: Clone + Send + Sync + 'static,
{
    let state = controller.wait_settled().await;
    if let Some(message) = state.error_message() {
        bail!(message);
    }
    state.data.context("fetch finished without data")
}

/// Logs one list row per item.
fn print_items(items: &[MediaItem]) {
    if items.is_empty() {
        tracing::info!("  (none)");
        return;
    }
    for item in items {
        tracing::info!(
            "  {}\t{}\t{}\t{:.1} ({} votes)",
            item.id(),
            item.title(),
            item.date().unwrap_or("-"),
            item.vote_average(),
            item.vote_count(),
        );
    }
}

/// Logs a detail record.
fn print_detail(detail: &MediaDetail) {
    let joined = |names: Vec<&str>| {
        if names.is_empty() {
            String::from("-")
        } else {
            names.join(", ")
        }
    };

    tracing::info!("ID: {}", detail.id());
    tracing::info!("Title: {}", detail.title());
    tracing::info!("Date: {}", detail.date().unwrap_or("-"));
    tracing::info!(
        "Rating: {:.1} ({} votes)",
        detail.vote_average(),
        detail.vote_count()
    );
    tracing::info!(
        "Runtime: {}",
        detail
            .runtime()
            .map_or_else(|| String::from("-"), |m| format!("{m} min"))
    );
    tracing::info!(
        "Genres: {}",
        joined(detail.genres().iter().map(|g| g.name.as_str()).collect())
    );
    tracing::info!(
        "Production: {}",
        joined(
            detail
                .production_companies()
                .iter()
                .map(|c| c.name.as_str())
                .collect()
        )
    );
    match detail {
        MediaDetail::Movie(movie) => {
            tracing::info!("Budget: {}", movie.budget);
            tracing::info!("Revenue: {}", movie.revenue);
        }
        MediaDetail::Tv(tv) => {
            tracing::info!("Seasons: {}", tv.number_of_seasons);
            tracing::info!("Episodes: {}", tv.number_of_episodes);
        }
    }
    tracing::info!("Overview: {}", detail.overview().unwrap_or("-"));
}

/// Runs the `home` subcommand.
///
/// The four lists load concurrently; a failed list is reported with a
/// generic message and does not hide the others.
///
/// # Errors
///
/// Returns an error if the client or store cannot be opened.
#[instrument(skip_all)]
async fn run_home(config: &ResolvedConfig, dir: Option<&Path>) -> Result<()> {
    let client = build_tmdb_client(config)?;
    let store = open_store(dir)?;
    let profiles = ProfileStore::load(store)
        .await
        .context("failed to load user profile")?;

    let sections = [
        ("Trending movies", trending_controller(&client, MediaKind::Movie)),
        ("Trending TV shows", trending_controller(&client, MediaKind::Tv)),
        (
            "Popular movies",
            listing_controller(&client, MediaKind::Movie, MediaQuery::popular()),
        ),
        (
            "Popular TV shows",
            listing_controller(&client, MediaKind::Tv, MediaQuery::popular()),
        ),
    ];

    if let Some(greeting) = profiles.greeting().await {
        tracing::info!("{greeting}");
    }

    for (heading, controller) in &sections {
        tracing::info!("{heading}:");
        match settled_data(controller).await {
            Ok(mut items) => {
                items.truncate(HOME_POPULAR_LIMIT);
                print_items(&items);
            }
            Err(e) => tracing::error!("  {e:#}"),
        }
    }

    Ok(())
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the genre is unknown or the request fails.
#[instrument(skip_all, fields(kind = %args.kind))]
async fn run_browse(args: &BrowseArgs, config: &ResolvedConfig) -> Result<()> {
    let query = match (&args.query, &args.genre) {
        (Some(text), _) => MediaQuery::search(text.as_str()),
        (None, Some(genre)) => {
            let id = resolve_genre_id(args.kind, genre)
                .with_context(|| format!("unknown {} genre: {genre}", args.kind))?;
            MediaQuery::genre(id)
        }
        (None, None) => MediaQuery::popular(),
    };

    let client = build_tmdb_client(config)?;
    let items = settled_data(&listing_controller(&client, args.kind, query)).await?;

    tracing::info!("Results: {}", items.len());
    print_items(&items);
    Ok(())
}

/// Runs the `trending` subcommand.
///
/// # Errors
///
/// Returns an error if the request fails.
#[instrument(skip_all, fields(kind = %args.kind))]
async fn run_trending(args: &KindArgs, config: &ResolvedConfig) -> Result<()> {
    let client = build_tmdb_client(config)?;
    let items = settled_data(&trending_controller(&client, args.kind)).await?;

    tracing::info!("Trending {} this week:", args.kind.label());
    print_items(&items);
    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the request fails or the store cannot be read.
#[instrument(skip_all, fields(kind = %args.kind, id = args.id))]
async fn run_details(args: &ItemArgs, config: &ResolvedConfig, dir: Option<&Path>) -> Result<()> {
    let client = build_tmdb_client(config)?;
    let registry = SavedRegistry::new(open_store(dir)?);

    let (kind, id) = (args.kind, args.id);
    let detail_client = Arc::clone(&client);
    let controller = FetchController::new(
        move || {
            let client = Arc::clone(&detail_client);
            async move { client.detail(kind, id).await }
        },
        true,
    );
    let saved = registry
        .is_saved(kind, &id.to_string())
        .await
        .context("failed to read saved items")?;
    let detail = settled_data(&controller).await?;

    print_detail(&detail);
    tracing::info!("Saved: {}", if saved { "yes" } else { "no" });
    Ok(())
}

/// Opens the saved-items registry over the local store.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
fn saved_registry(dir: Option<&Path>) -> Result<SavedRegistry<SqliteStore>> {
    Ok(SavedRegistry::new(open_store(dir)?))
}

/// Runs the `saved toggle` subcommand.
///
/// # Errors
///
/// Returns an error if the saved set cannot be read or written.
#[instrument(skip_all, fields(kind = %args.kind, id = args.id))]
async fn run_saved_toggle(args: &ItemArgs, dir: Option<&Path>) -> Result<()> {
    let registry = saved_registry(dir)?;
    let outcome = registry
        .toggle(args.kind, &args.id.to_string())
        .await
        .context("failed to update saved items")?;

    if outcome.saved {
        tracing::info!("Saved {} {}", args.kind, args.id);
    } else {
        tracing::info!("Removed {} {} from saved", args.kind, args.id);
    }
    Ok(())
}

/// Runs the `saved status` subcommand.
///
/// # Errors
///
/// Returns an error if the saved set cannot be read.
#[instrument(skip_all, fields(kind = %args.kind, id = args.id))]
async fn run_saved_status(args: &ItemArgs, dir: Option<&Path>) -> Result<()> {
    let registry = saved_registry(dir)?;
    let saved = registry
        .is_saved(args.kind, &args.id.to_string())
        .await
        .context("failed to read saved items")?;

    tracing::info!(
        "{} {} is {}",
        args.kind,
        args.id,
        if saved { "saved" } else { "not saved" }
    );
    Ok(())
}

/// Runs the `saved list` subcommand.
///
/// Titles whose lookup fails are skipped.
///
/// # Errors
///
/// Returns an error if the client cannot be built or the saved set cannot be read.
#[instrument(skip_all, fields(kind = %args.kind))]
async fn run_saved_list(args: &KindArgs, config: &ResolvedConfig, dir: Option<&Path>) -> Result<()> {
    let registry = saved_registry(dir)?;
    let ids = registry
        .saved_ids(args.kind)
        .await
        .context("failed to read saved items")?;
    if ids.is_empty() {
        tracing::info!("No saved {}", args.kind.label());
        return Ok(());
    }

    let client = build_tmdb_client(config)?;
    let details = registry
        .list_saved_details(args.kind, client.as_ref())
        .await
        .context("failed to read saved items")?;

    tracing::info!("Saved {} ({}):", args.kind.label(), details.len());
    for detail in &details {
        tracing::info!(
            "  {}\t{}\t{}",
            detail.id(),
            detail.title(),
            detail.date().unwrap_or("-"),
        );
    }
    Ok(())
}

/// Runs the `profile` subcommands.
///
/// # Errors
///
/// Returns an error if validation fails or the store cannot be accessed.
#[instrument(skip_all)]
async fn run_profile(command: ProfileSubcommands, dir: Option<&Path>) -> Result<()> {
    let profiles = ProfileStore::load(open_store(dir)?)
        .await
        .context("failed to load user profile")?;

    match command {
        ProfileSubcommands::Show => match profiles.current().await {
            Some(profile) => {
                tracing::info!("First name: {}", profile.first_name);
                tracing::info!("Last name: {}", profile.last_name);
                tracing::info!("Age: {}", profile.age);
                tracing::info!("City: {}", profile.city);
            }
            None => tracing::info!("No profile"),
        },
        ProfileSubcommands::Set(args) => {
            profiles
                .submit(UserProfile {
                    first_name: args.first_name,
                    last_name: args.last_name,
                    age: args.age,
                    city: args.city,
                })
                .await
                .context("failed to save user profile")?;
            if let Some(greeting) = profiles.greeting().await {
                tracing::info!("{greeting}");
            }
        }
        ProfileSubcommands::Delete => {
            profiles
                .delete()
                .await
                .context("failed to delete user profile")?;
            tracing::info!("Profile deleted");
        }
    }
    Ok(())
}

/// Runs the `genres` subcommand.
fn run_genres(args: &KindArgs) {
    tracing::info!("ID\tName");
    for genre in genres_for(args.kind) {
        tracing::info!("{}\t{}", genre.id, genre.name);
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid or subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let paths = AppPaths::resolve(cli.dir.as_deref())?;
    if let Ok(db_path) = paths.db_path() {
        tracing::debug!(
            config = %paths.config_file().display(),
            db = %db_path.display(),
            "Resolved paths"
        );
    }
    let config = ResolvedConfig::from_env(paths.config_file())?;
    let dir = paths.data_dir();

    match cli.command {
        Commands::Home => run_home(&config, dir).await,
        Commands::Browse(args) => run_browse(&args, &config).await,
        Commands::Trending(args) => run_trending(&args, &config).await,
        Commands::Details(args) => run_details(&args, &config, dir).await,
        Commands::Saved(saved) => match saved.command {
            SavedSubcommands::Toggle(args) => run_saved_toggle(&args, dir).await,
            SavedSubcommands::Status(args) => run_saved_status(&args, dir).await,
            SavedSubcommands::List(args) => run_saved_list(&args, &config, dir).await,
        },
        Commands::Profile(profile) => run_profile(profile.command, dir).await,
        Commands::Genres(args) => {
            run_genres(&args);
            Ok(())
        }
    }
}
