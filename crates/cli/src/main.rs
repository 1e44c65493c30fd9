use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use pipeline::RequestParams;
use rand::Rng;
use records::{parser, RecordId, User, UserDraft, UserPatch};
use repository::{PagedResult, UploadedFile};
use server::{ControllerConfig, UserController};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// Roster - user directory with filterable listings
///
/// Users are loaded from the seed file on every run; changes made by
/// `create`, `update`, `delete` and `upload` last for that run only.
#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Filter, page and manage a user directory", long_about = None)]
struct Cli {
    /// Seed file with one `name::email::age::role` user per line
    #[arg(short, long, default_value = "data/users.dat")]
    seed_file: PathBuf,

    /// Directory uploaded files are written to
    #[arg(long, default_value = "storage/app")]
    storage_root: PathBuf,

    /// Public URL prefix for uploaded files
    #[arg(long, default_value = "http://localhost/storage")]
    base_url: String,

    /// Page size used when a listing names none
    #[arg(long, default_value = "15")]
    per_page: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List users, filtered and paginated
    List {
        /// Filter as key=value (repeatable), e.g. --filter role=admin --filter age=30,50
        #[arg(short, long = "filter")]
        filters: Vec<String>,

        /// Filters as a query string, e.g. "name=ann&sort=-age"
        #[arg(short, long)]
        query: Option<String>,

        /// Page number (1-based)
        #[arg(long)]
        page: Option<usize>,

        /// Rows per page
        #[arg(long)]
        per_page: Option<usize>,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single user
    Show {
        #[arg(long)]
        id: RecordId,
    },

    /// Create a user
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        age: Option<u32>,

        #[arg(long)]
        role: Option<String>,
    },

    /// Update fields of a user
    Update {
        #[arg(long)]
        id: RecordId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        age: Option<u32>,

        #[arg(long)]
        role: Option<String>,
    },

    /// Delete a user
    Delete {
        #[arg(long)]
        id: RecordId,
    },

    /// Upload a profile picture for a user
    Upload {
        #[arg(long)]
        id: RecordId,

        /// Picture to upload
        #[arg(long)]
        file: PathBuf,
    },

    /// Run benchmark to test listing performance
    Benchmark {
        /// Number of requests to make
        #[arg(long, default_value = "1000")]
        requests: usize,

        /// Number of concurrent requests
        #[arg(long, default_value = "10")]
        concurrent: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let start = Instant::now();
    let seed = parser::parse_users(&cli.seed_file)
        .with_context(|| format!("Failed to load seed file {}", cli.seed_file.display()))?;
    info!("Parsed {} users from {}", seed.len(), cli.seed_file.display());

    let config = ControllerConfig {
        per_page: cli.per_page,
        storage_root: cli.storage_root,
        base_url: cli.base_url,
    };
    let controller =
        UserController::in_memory(config, seed).context("Failed to initialize controller")?;
    println!("{} Loaded users in {:?}", "✓".green(), start.elapsed());

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::List {
            filters,
            query,
            page,
            per_page,
            json,
        } => {
            let request = build_request(&filters, query.as_deref(), page, per_page)?;
            handle_list(&controller, &request, json)?
        }
        Commands::Show { id } => {
            let user = controller.read(id)?;
            print_user(&user);
        }
        Commands::Create {
            name,
            email,
            age,
            role,
        } => {
            let user = controller.store(UserDraft {
                name,
                email,
                age,
                role,
            })?;
            println!("{} Created user {}", "✓".green(), user.id);
            print_user(&user);
        }
        Commands::Update {
            id,
            name,
            email,
            age,
            role,
        } => {
            let patch = UserPatch {
                name,
                email,
                age,
                role,
                profile_picture_path: None,
            };
            if patch.is_empty() {
                bail!("Nothing to update: pass at least one of --name, --email, --age, --role");
            }
            let user = controller.update(id, patch)?;
            println!("{} Updated user {}", "✓".green(), user.id);
            print_user(&user);
        }
        Commands::Delete { id } => {
            let user = controller.destroy(id)?;
            println!("{} Deleted user {} ({})", "✓".green(), user.id, user.name);
        }
        Commands::Upload { id, file } => handle_upload(&controller, id, &file).await?,
        Commands::Benchmark {
            requests,
            concurrent,
        } => handle_benchmark(controller, requests, concurrent).await?,
    }

    Ok(())
}

/// Merge `--query`, `--filter` and paging flags into one parameter map.
///
/// Later sources win: query string, then filters, then `--page`/`--per-page`.
fn build_request(
    filters: &[String],
    query: Option<&str>,
    page: Option<usize>,
    per_page: Option<usize>,
) -> Result<RequestParams> {
    let mut request = query
        .map(RequestParams::from_query_string)
        .unwrap_or_default();

    for filter in filters {
        let (key, value) = filter
            .split_once('=')
            .ok_or_else(|| anyhow!("Filter '{}' is not in key=value form", filter))?;
        request.insert(key.trim(), value);
    }
    if let Some(page) = page {
        request.insert("page", page.to_string());
    }
    if let Some(per_page) = per_page {
        request.insert("per_page", per_page.to_string());
    }
    Ok(request)
}

/// Handle the 'list' command
fn handle_list(controller: &UserController, request: &RequestParams, json: bool) -> Result<()> {
    let page = controller.index(request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let active: Vec<String> = request
        .iter()
        .filter(|(key, _)| !matches!(*key, "page" | "per_page"))
        .map(|(key, value)| format!("{key}={value}"))
        .collect();
    if !active.is_empty() {
        println!("{}Filters: {}", "• ".cyan(), active.join(", "));
    }
    print_users(page.items());
    if let PagedResult::LengthAware {
        page,
        per_page,
        total,
        last_page,
        ..
    } = page
    {
        println!(
            "{}",
            format!(
                "Page {} of {} ({} per page, {} users total)",
                page, last_page, per_page, total
            )
            .dimmed()
        );
    }
    Ok(())
}

/// Handle the 'upload' command
async fn handle_upload(controller: &UserController, id: RecordId, file: &Path) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let picture = controller
        .upload_profile_picture(id, UploadedFile::new(file_name, bytes))
        .await?;

    println!("{} Uploaded profile picture for user {}", "✓".green(), picture.user_id);
    println!("{}Path: {}", "• ".cyan(), picture.path);
    println!("{}URL: {}", "• ".cyan(), picture.url);
    Ok(())
}

/// Random listing request of the kind a directory UI would send
fn random_request(rng: &mut impl Rng) -> RequestParams {
    const NAME_FRAGMENTS: [&str; 5] = ["a", "an", "er", "li", "son"];
    const ROLES: [&str; 3] = ["member", "admin", "editor"];
    const SORTS: [&str; 4] = ["name", "-name", "age", "-age"];

    let mut request = RequestParams::new().with("page", rng.random_range(1..=3).to_string());
    if rng.random_bool(0.5) {
        let fragment = NAME_FRAGMENTS[rng.random_range(0..NAME_FRAGMENTS.len())];
        request.insert("name", fragment);
    }
    if rng.random_bool(0.3) {
        request.insert("role", ROLES[rng.random_range(0..ROLES.len())]);
    }
    if rng.random_bool(0.3) {
        let low: u32 = rng.random_range(18..60);
        request.insert("age", format!("{},{}", low, low + 30));
    }
    if rng.random_bool(0.5) {
        request.insert("sort", SORTS[rng.random_range(0..SORTS.len())]);
    }
    request
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    controller: UserController,
    requests: usize,
    concurrent: usize,
) -> Result<()> {
    if requests == 0 {
        bail!("Benchmark needs at least one request");
    }

    // Generate the request mix up front so timing covers only the listing
    let request_mix: Vec<RequestParams> = {
        let mut rng = rand::rng();
        (0..requests).map(|_| random_request(&mut rng)).collect()
    };

    let permits = Arc::new(Semaphore::new(concurrent.max(1)));
    let wall_clock = Instant::now();

    let mut handles = vec![];
    for request in request_mix {
        let controller = controller.clone();
        let permits = permits.clone();
        let handle = tokio::spawn(async move {
            let _permit = permits.acquire_owned().await?;
            let start = Instant::now();
            controller.index(&request)?;
            Ok::<_, anyhow::Error>(start.elapsed())
        });
        handles.push(handle);
    }

    // Wait for all tasks to complete and collect timings
    let mut timings = vec![];
    for handle in handles {
        let elapsed = handle.await??;
        timings.push(elapsed);
    }
    let total_time = wall_clock.elapsed();

    let busy_time: Duration = timings.iter().sum();
    let avg_latency = busy_time / (timings.len() as u32);
    timings.sort();
    let p50 = percentile(&timings, 0.50);
    let p95 = percentile(&timings, 0.95);
    let p99 = percentile(&timings, 0.99);
    let throughput = requests as f64 / total_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Requests: {} ({} concurrent)", requests, concurrent.max(1));
    println!("Total time: {:?}", total_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", p50);
    println!("P95 latency: {:?}", p95);
    println!("P99 latency: {:?}", p99);
    println!("Throughput: {:.2} requests/second", throughput);

    Ok(())
}

/// Nearest-rank percentile of sorted, non-empty timings
fn percentile(sorted: &[Duration], fraction: f64) -> Duration {
    let rank = ((sorted.len() as f64 * fraction) as usize).min(sorted.len() - 1);
    sorted[rank]
}

/// Print users as an aligned table
fn print_users(users: &[User]) {
    if users.is_empty() {
        println!("{}", "No users matched.".yellow());
        return;
    }

    println!(
        "{}",
        format!("{:>4}  {:<22} {:<26} {:>4}  {}", "ID", "Name", "Email", "Age", "Role")
            .bold()
            .blue()
    );
    for user in users {
        let age = user.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{:>4}  {:<22} {:<26} {:>4}  {}",
            user.id.to_string().green(),
            user.name,
            user.email,
            age,
            user.role
        );
    }
}

/// Print one user's details
fn print_user(user: &User) {
    println!("{}", format!("User ID: {}", user.id).bold().blue());
    println!("{}Name: {}", "• ".green(), user.name);
    println!("{}Email: {}", "• ".green(), user.email);
    match user.age {
        Some(age) => println!("{}Age: {}", "• ".green(), age),
        None => println!("{}Age: unknown", "• ".green()),
    }
    println!("{}Role: {}", "• ".green(), user.role);
    if let Some(path) = &user.profile_picture_path {
        println!("{}Profile picture: {}", "• ".cyan(), path);
    }
}
