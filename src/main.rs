use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rn_publish::appcenter::{AppCenterClient, WaitOutcome, BUILD_POLL_INTERVAL};
use rn_publish::cli::orchestration::{self, ReleaseOptions};
use rn_publish::config::{self, Config};
use rn_publish::domain::{Environment, Platform};
use rn_publish::env_file;
use rn_publish::git::Git2Repository;
use rn_publish::native::NativeProject;
use rn_publish::ui;

#[derive(Parser, Debug)]
#[command(
    name = "rn-publish",
    version,
    about = "Release mobile apps: git flow, changelogs, version bumps and AppCenter builds"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, global = true, help = "Verbose output")]
    verbose: bool,

    #[arg(short = 'y', long, global = true, help = "Skip confirmation prompts")]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Release an environment branch and build it
    Release {
        #[arg(short, long, help = "Environment to release (staging, pre-prod, prod)")]
        env: Option<Environment>,

        #[arg(short, long = "platform", help = "Platform to build, repeatable")]
        platforms: Vec<Platform>,

        #[arg(long, help = "Do not merge the upstream environment branch")]
        hotfix: bool,

        #[arg(long, help = "Tag the production version")]
        tag: bool,

        #[arg(long, help = "Skip the AppCenter builds")]
        no_build: bool,

        #[arg(long, help = "Wait for the builds to complete")]
        wait: bool,
    },

    /// Print the next version and its changelog
    Changelog,

    /// Create the environment branches, distribution groups and env.js
    Init,

    /// Trigger AppCenter builds of an environment branch
    Build {
        #[arg(short, long, help = "Environment to build (staging, pre-prod, prod)")]
        env: Option<Environment>,

        #[arg(short, long = "platform", help = "Platform to build, repeatable")]
        platforms: Vec<Platform>,

        #[arg(long, help = "Wait for the builds to complete")]
        wait: bool,
    },
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("rn_publish=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rn_publish=warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;
    config.validate().context("Invalid configuration")?;

    match args.command {
        Command::Release {
            env,
            platforms,
            hotfix,
            tag,
            no_build,
            wait,
        } => {
            if !no_build {
                config.appcenter().context("AppCenter settings are needed to build")?;
            }

            let environment = resolve_environment(env)?;
            let platforms = if no_build {
                Vec::new()
            } else {
                resolve_platforms(platforms, args.yes)?
            };
            let tag_release = environment.is_prod()
                && (tag || (!args.yes && ui::confirm_action("Tag this version?")?));

            if !args.yes
                && !ui::confirm_action(&format!(
                    "Release {} from branch {}?",
                    environment,
                    config.branch(environment)
                ))?
            {
                println!("Release cancelled by user.");
                return Ok(());
            }

            release(&config, environment, hotfix, tag_release)?;

            build(&config, environment, &platforms, wait)
        }
        Command::Changelog => preview(&config),
        Command::Init => init(&config),
        Command::Build {
            env,
            platforms,
            wait,
        } => {
            let environment = resolve_environment(env)?;
            let platforms = resolve_platforms(platforms, args.yes)?;
            build(&config, environment, &platforms, wait)
        }
    }
}

fn resolve_environment(env: Option<Environment>) -> Result<Environment> {
    match env {
        Some(env) => Ok(env),
        None => ui::select_environment(),
    }
}

fn resolve_platforms(platforms: Vec<Platform>, yes: bool) -> Result<Vec<Platform>> {
    if !platforms.is_empty() {
        return Ok(platforms);
    }
    if yes {
        return Ok(Platform::ALL.to_vec());
    }
    ui::select_platforms()
}

fn open_repository() -> Result<Git2Repository> {
    Git2Repository::open(".").context("Git repository error")
}

fn release(config: &Config, environment: Environment, hotfix: bool, tag_release: bool) -> Result<()> {
    let repo = open_repository()?;
    let project = NativeProject::new(repo.work_tree());
    let options = ReleaseOptions {
        environment,
        hotfix,
        tag_release,
        date: Utc::now().date_naive(),
    };

    let outcome = orchestration::manage_git_flow(&repo, config, &project, &options)
        .with_context(|| format!("Failed to release {}", environment))?;

    for warning in &outcome.warnings {
        ui::display_boundary_warning(warning);
    }
    ui::display_success(&format!(
        "Published {} version {} from {}",
        outcome.environment, outcome.version, outcome.branch
    ));
    if outcome.tagged {
        ui::display_success(&format!("Tagged {}", outcome.version));
    }

    Ok(())
}

fn preview(config: &Config) -> Result<()> {
    let repo = open_repository()?;
    let plan = orchestration::plan_release(&repo, config, Utc::now().date_naive())
        .context("Failed to generate the changelog")?;

    for warning in &plan.warnings {
        ui::display_boundary_warning(warning);
    }
    ui::display_release_preview(&plan.previous_version, &plan.version, &plan.changelog);
    Ok(())
}

fn init(config: &Config) -> Result<()> {
    let repo = open_repository()?;

    let created = orchestration::manage_git_branches(&repo, config)
        .context("Failed to create the environment branches")?;
    if created.is_empty() {
        ui::display_success("Every environment branch already exists");
    } else {
        ui::display_success(&format!("Created branches: {}", created.join(", ")));
    }

    if env_file::write_env_js(
        repo.work_tree(),
        &config.environment_variables,
        Environment::Staging,
    )? {
        ui::display_success(&format!("Wrote {}", env_file::ENV_JS_FILE));
    }

    if config.appcenter.is_none() {
        ui::display_status("No [appcenter] section, skipping distribution groups");
        return Ok(());
    }

    let client = AppCenterClient::new(config.appcenter()?)?;
    let (groups, warnings) = orchestration::create_distribution_groups(&client, config)
        .context("Failed to create the distribution groups")?;
    for warning in &warnings {
        ui::display_boundary_warning(warning);
    }
    for group in groups {
        ui::display_success(&format!("Created distribution group {}", group));
    }

    Ok(())
}

fn build(config: &Config, environment: Environment, platforms: &[Platform], wait: bool) -> Result<()> {
    if platforms.is_empty() {
        return Ok(());
    }

    let appcenter = config.appcenter()?;
    let client = AppCenterClient::new(appcenter)?;
    let branch = config.branch(environment);

    let (triggered, failed) = client.trigger_builds(appcenter, platforms, branch);
    for build in &triggered {
        ui::display_triggered_build(build);
    }
    for (platform, e) in &failed {
        ui::display_error(&format!("Could not build {}: {}", platform.label(), e));
    }

    if wait && !triggered.is_empty() {
        match client.wait_for_builds(&triggered, BUILD_POLL_INTERVAL, ui::display_build_statuses)? {
            WaitOutcome::Completed => ui::display_success("AppCenter builds completed"),
            WaitOutcome::StatusUnavailable => {
                ui::display_error("Build status unavailable, check AppCenter for the result")
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("{} build(s) could not be triggered", failed.len());
    }
    Ok(())
}
