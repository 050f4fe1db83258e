#![forbid(unsafe_code)]

//! `bookstore` command-line client.
//!
//! Each subcommand is one screen of the catalog app: it reads the persisted
//! session, calls the backend through the shared `ApiClient`, and prints the
//! result or a single-line error.

use anyhow::{Context, Result};
use bookstore_client::auth::{ChangePasswordForm, RegisterForm, ResetPasswordForm};
use bookstore_client::catalog::WriteOutcome;
use bookstore_client::{
    ApiClient, AuthService, Book, BookDraft, BookStats, CatalogService, Config, SessionStore,
};
use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about = "Browse and manage the bookstore catalog")]
struct Cli {
    /// Backend base URL (overrides config and BOOKSTORE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Path to config.toml (default: ~/.bookstore/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep the session in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        username: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the current session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Create an account
    Register {
        username: String,
        email: String,
        /// Prompted for (twice) when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Request a password reset token
    ForgotPassword { email: String },
    /// Set a new password using a reset token
    ResetPassword {
        token: String,
        #[arg(long)]
        new_password: Option<String>,
    },
    /// Change the password of the logged-in account
    ChangePassword,
    /// Browse and manage books
    #[command(subcommand)]
    Books(BooksCommand),
}

#[derive(Debug, Subcommand)]
enum BooksCommand {
    /// List books, optionally filtered by title or author
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one book
    Show { id: u64 },
    /// Add a book (admin)
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        /// YYYY-MM-DD
        #[arg(long)]
        published_date: Option<String>,
        #[arg(long)]
        unavailable: bool,
    },
    /// Edit a book; omitted fields keep their current value (admin)
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        published_date: Option<String>,
        #[arg(long)]
        available: Option<bool>,
    },
    /// Delete a book (admin)
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Availability totals (admin dashboard)
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e:#}", style("error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let log_filter = init_tracing();
    let config = Config::resolve(cli.config.as_deref(), cli.api_url.as_deref())?;
    apply_log_level(log_filter, &config.log_level);

    let session = SessionStore::open(&config, cli.ephemeral);
    let api = ApiClient::from_config(&config, Arc::new(session))
        .context("Failed to build HTTP client")?;
    let auth = AuthService::new(api.clone());
    let catalog = CatalogService::new(api.clone());

    match cli.command {
        Command::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password("Password")?,
            };
            let user = auth.login(&username, &password).await?;
            println!(
                "{} Logged in as {} ({})",
                style("✓").green(),
                style(&user.username).bold(),
                user.role
            );
        }
        Command::Logout => {
            auth.logout();
            println!("Logged out.");
        }
        Command::Whoami => match api.session().user() {
            Some(user) => println!("{} ({})", style(&user.username).bold(), user.role),
            None => println!("Not logged in."),
        },
        Command::Register {
            username,
            email,
            password,
        } => {
            let (password, confirm_password) = match password {
                Some(p) => (p.clone(), p),
                None => (
                    prompt_password("Password")?,
                    prompt_password("Confirm password")?,
                ),
            };
            let form = RegisterForm {
                username,
                email,
                password,
                confirm_password,
            };
            let message = auth.register(&form).await?;
            println!("{} {message}", style("✓").green());
        }
        Command::ForgotPassword { email } => {
            let reply = auth.forgot_password(&email).await?;
            println!("{}", reply.message);
            if let Some(token) = reply.reset_token {
                println!("Reset token: {}", style(token).bold());
            }
        }
        Command::ResetPassword {
            token,
            new_password,
        } => {
            let (new_password, confirm_password) = match new_password {
                Some(p) => (p.clone(), p),
                None => (
                    prompt_password("New password")?,
                    prompt_password("Confirm password")?,
                ),
            };
            let form = ResetPasswordForm {
                token,
                new_password,
                confirm_password,
            };
            println!("{}", auth.reset_password(&form).await?);
        }
        Command::ChangePassword => {
            let form = ChangePasswordForm {
                current_password: prompt_password("Current password")?,
                new_password: prompt_password("New password")?,
                confirm_password: prompt_password("Confirm password")?,
            };
            println!("{}", auth.change_password(&form).await?);
        }
        Command::Books(command) => run_books(&catalog, command).await?,
    }

    Ok(())
}

async fn run_books(catalog: &CatalogService, command: BooksCommand) -> Result<()> {
    match command {
        BooksCommand::List { search } => {
            let books = match search.as_deref() {
                Some(term) => catalog.search(term).await?,
                None => catalog.list().await?,
            };
            if books.is_empty() {
                println!("No books found.");
            } else {
                print_books(&books);
            }
        }
        BooksCommand::Show { id } => print_book(&catalog.get(id).await?),
        BooksCommand::Add {
            title,
            author,
            published_date,
            unavailable,
        } => {
            let mut draft = BookDraft::new(title, author).available(!unavailable);
            draft.published_date = published_date;
            print_outcome(&catalog.create(&draft).await?);
        }
        BooksCommand::Update {
            id,
            title,
            author,
            published_date,
            available,
        } => {
            let mut draft = BookDraft::from_book(&catalog.get(id).await?);
            if let Some(title) = title {
                draft.title = title;
            }
            if let Some(author) = author {
                draft.author = author;
            }
            if let Some(date) = published_date {
                draft.published_date = Some(date);
            }
            if let Some(available) = available {
                draft.available = available;
            }
            print_outcome(&catalog.update(id, &draft).await?);
        }
        BooksCommand::Delete { id, yes } => {
            let confirmed = yes
                || dialoguer::Confirm::new()
                    .with_prompt("Are you sure you want to delete this book?")
                    .default(false)
                    .interact()?;
            if !confirmed {
                println!("Cancelled.");
                return Ok(());
            }
            match catalog.delete(id).await? {
                Some(outcome) => print_outcome(&outcome),
                None => println!("{} Book deleted", style("✓").green()),
            }
        }
        BooksCommand::Stats => print_stats(&catalog.stats().await?),
    }
    Ok(())
}

// ── Rendering ───────────────────────────────────────────────────

type LogFilter = reload::Handle<EnvFilter, Registry>;

/// Install the subscriber before config is read so config loading can log.
/// `RUST_LOG` wins; otherwise start at `warn` and return a handle for
/// switching to the configured `log_level` once it is known.
fn init_tracing() -> Option<LogFilter> {
    let from_env = EnvFilter::try_from_default_env().ok();
    let env_set = from_env.is_some();
    let (filter, handle) =
        reload::Layer::new(from_env.unwrap_or_else(|| EnvFilter::new("warn")));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init()
        .ok()?;

    (!env_set).then_some(handle)
}

fn apply_log_level(handle: Option<LogFilter>, level: &str) {
    let Some(handle) = handle else {
        return;
    };
    match EnvFilter::try_new(level) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                tracing::debug!("Could not apply log_level: {e}");
            }
        }
        Err(e) => tracing::warn!(log_level = level, "Ignoring invalid log_level: {e}"),
    }
}

fn prompt_password(prompt: &str) -> Result<String> {
    dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(true)
        .interact()
        .context("Failed to read password")
}

fn availability(available: bool) -> console::StyledObject<&'static str> {
    if available {
        style("Available").green()
    } else {
        style("Unavailable").red()
    }
}

fn print_books(books: &[Book]) {
    println!(
        "{}",
        style(format!(
            "{:>5}  {:<40}  {:<24}  {:<12}  {}",
            "ID", "TITLE", "AUTHOR", "PUBLISHED", "STATUS"
        ))
        .bold()
    );
    for book in books {
        println!(
            "{:>5}  {:<40}  {:<24}  {:<12}  {}",
            book.id,
            console::truncate_str(&book.title, 40, "…"),
            console::truncate_str(&book.author, 24, "…"),
            book.published_date.as_deref().unwrap_or("-"),
            availability(book.available)
        );
    }
}

fn print_book(book: &Book) {
    println!("{}", style(&book.title).bold());
    println!("  Author:    {}", book.author);
    println!(
        "  Published: {}",
        book.published_date.as_deref().unwrap_or("-")
    );
    println!("  Status:    {}", availability(book.available));
    if let Some(description) = &book.description {
        println!();
        println!("{description}");
    }
}

fn print_outcome(outcome: &WriteOutcome) {
    println!("{} {}", style("✓").green(), outcome.message());
}

fn print_stats(stats: &BookStats) {
    println!("Total books:     {}", stats.total);
    println!("Available books: {}", style(stats.available).green());
    println!("Unavailable:     {}", style(stats.unavailable).red());
}
