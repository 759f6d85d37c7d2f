use advisor_client::context::FileStore;
use advisor_client::dto::{CareerOutlook, UserSettings};
use advisor_client::notify::NotificationLevel;
use advisor_client::pages::*;
use advisor_client::view::{render_text, view};
use advisor_client::{AdvisorApiClient, Config, Notifier, PageContext, PageLoadState, PageSource};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "advisor")]
#[command(about = "AI Academic Advisor CLI", long_about = None)]
struct Cli {
    /// Path to config.toml (default: ./config.toml, falling back to defaults)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        email: String,
        /// Password (or set ADVISOR_PASSWORD)
        #[arg(short, long, env = "ADVISOR_PASSWORD")]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Select the career target (and optionally the country) for later pages
    Target {
        career: String,
        #[arg(short, long)]
        country: Option<String>,
    },
    /// Careers related to the selected target
    Careers,
    /// Step-by-step roadmap for the selected target
    Roadmap,
    /// Recommended certificates
    Certificates,
    /// Recommended courses
    Courses,
    /// Skills to build
    Skills,
    /// Degree programs
    Degrees,
    /// Salary, growth and demand projections
    Demand,
    /// Profile settings of the signed-in user
    Settings,
    /// Registered users (admin)
    Users,
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::from_path(path)?,
        None => Config::new().unwrap_or_else(|err| {
            debug!("Using default config: {}", err);
            Config::default()
        }),
    };
    Ok(config.with_env_overrides())
}

async fn show<S: PageSource>(
    client: &AdvisorApiClient,
    source: S,
    content: impl FnOnce(&S::Data) -> String,
) {
    let resource = source.resource();
    let loader = client.page(source);
    let loading: PageLoadState<S::Data> = PageLoadState::Loading;
    println!("{}", render_text(&view(resource, &loading), |_| String::new()));
    let state = loader.load().await;
    println!("{}", render_text(&view(resource, &state), content));
}

fn bullet_list<T>(items: &[T], line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return "No results.".to_string();
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{:>3}. {}", i + 1, line(item)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe_outlook(outlook: &Option<CareerOutlook>) -> String {
    let Some(outlook) = outlook else {
        return "No demand data available.".to_string();
    };
    let mut lines = vec![format!("{} ({})", outlook.career, outlook.country)];
    if let Some(salary) = outlook.salary {
        lines.push(format!("Median salary: {salary:.0}"));
    }
    if let Some(growth) = outlook.growth {
        lines.push(format!("Growth rate: {growth:.1}%"));
    }
    for point in &outlook.projections {
        if let Some(demand) = point.demand {
            lines.push(format!("  {}: {:.0}", point.year, demand));
        }
    }
    if let Some(change) = outlook.projected_change() {
        lines.push(format!("Projected change: {change:+.1}%"));
    }
    lines.join("\n")
}

fn describe_settings(settings: &Option<UserSettings>) -> String {
    let Some(settings) = settings else {
        return "No profile found.".to_string();
    };
    [
        ("Name", &settings.name),
        ("Email", &settings.email),
        ("Country", &settings.country),
        ("Career", &settings.career),
    ]
    .iter()
    .map(|(label, value)| format!("{label}: {}", value.as_deref().unwrap_or("-")))
    .collect::<Vec<_>>()
    .join("\n")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;
    let store = FileStore::new(&config.session.path);
    let context = PageContext::from_store(&store);

    let (notifier, mut notifications) = Notifier::channel();
    let banners = tokio::spawn(async move {
        while let Some(note) = notifications.recv().await {
            let tag = match note.level {
                NotificationLevel::Info => "info",
                NotificationLevel::Warning => "warn",
                NotificationLevel::Error => "error",
            };
            eprintln!("[{tag}] {}", note.message);
        }
    });

    let mut client = AdvisorApiClient::new(config)
        .with_context(context)
        .with_notifier(notifier);

    match cli.command {
        Commands::Login { email, password } => match client.login(&email, &password).await {
            Ok(response) if client.get_session_token().is_some() => {
                client.context().save_to(&store)?;
                info!("Session stored in {:?}", store.path());
                println!("{}", response.message.unwrap_or_else(|| "Logged in.".to_string()));
            }
            Ok(response) => {
                eprintln!("{}", response.message.unwrap_or_else(|| "Login failed.".to_string()));
            }
            Err(err) => eprintln!("{err}"),
        },
        Commands::Logout => {
            client.logout();
            client.context().save_to(&store)?;
            println!("Logged out.");
        }
        Commands::Target { career, country } => {
            let ctx = client.context_mut();
            ctx.career_target = Some(career);
            ctx.country = country;
            client.context().save_to(&store)?;
            println!("Career target saved.");
        }
        Commands::Careers => {
            show(&client, CareersPage, |careers| {
                bullet_list(careers, |c| match c.salary {
                    Some(salary) => format!("{} (avg. {salary:.0})", c.title),
                    None => c.title.clone(),
                })
            })
            .await
        }
        Commands::Roadmap => {
            show(&client, RoadmapPage, |steps| {
                bullet_list(steps, |step| {
                    let mut line = step.title.clone();
                    if !step.skills.is_empty() {
                        line.push_str(&format!(" [{}]", step.skills.join(", ")));
                    }
                    if let Some(url) = step.video_url() {
                        line.push_str(&format!(" video: {url}"));
                    }
                    line
                })
            })
            .await
        }
        Commands::Certificates => {
            show(&client, CertificatesPage, |certs| {
                bullet_list(certs, |c| match &c.provider {
                    Some(provider) => format!("{} ({provider})", c.name),
                    None => c.name.clone(),
                })
            })
            .await
        }
        Commands::Courses => {
            show(&client, CoursesPage, |courses| {
                bullet_list(courses, |c| match &c.provider {
                    Some(provider) => format!("{} on {provider}", c.title),
                    None => c.title.clone(),
                })
            })
            .await
        }
        Commands::Skills => {
            show(&client, SkillsPage, |skills| bullet_list(skills, |s| s.name.clone())).await
        }
        Commands::Degrees => {
            show(&client, DegreesPage, |degrees| {
                bullet_list(degrees, |d| match &d.institution {
                    Some(institution) => format!("{} at {institution}", d.name),
                    None => d.name.clone(),
                })
            })
            .await
        }
        Commands::Demand => show(&client, FutureDemandPage, describe_outlook).await,
        Commands::Settings => show(&client, SettingsPage, describe_settings).await,
        Commands::Users => {
            show(&client, AdminUsersPage, |users| {
                bullet_list(users, |u| match &u.name {
                    Some(name) => format!("{name} <{}>", u.email),
                    None => u.email.clone(),
                })
            })
            .await
        }
    }

    drop(client);
    let _ = banners.await;
    Ok(())
}
