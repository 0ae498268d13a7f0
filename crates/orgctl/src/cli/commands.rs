//! # CLI Layer
//!
//! One UI client for orgctl. This is the only place that:
//! - Parses arguments
//! - Writes to the terminal, including the disambiguation prompt
//! - Decides where credentials come from
//! - Formats failures as JSON under `--json`
//!
//! Everything else is delegated to [`OrgApi`], which returns a [`CmdResult`]
//! that [`print_result`] turns into colored text or JSON.

use super::print::{print_error_json, print_result};
use super::prompt::TerminalChooser;
use super::setup::{Cli, Commands, GroupCommands, OrgCommands, PermsetCommands, UserCommands};
use clap::Parser;
use orgctlapp::api::{AssignRequest, OrgApi};
use orgctlapp::commands::{self, org::NewOrg, resolve_group::GroupRef, CmdResult};
use orgctlapp::config::{config_dir, EnvOverrides, OrgConfig};
use orgctlapp::error::{OrgError, Result};
use orgctlapp::model::PhotoKind;
use orgctlapp::platform::rest::RestConnection;
use orgctlapp::query::{Chooser, FailOnAmbiguity};
use std::io::IsTerminal;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::EnvFilter;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json = cli.json;

    let outcome = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(OrgError::from)
        .and_then(|runtime| runtime.block_on(dispatch(cli)));

    match outcome {
        Err(err) if json => {
            print_error_json(&err)?;
            std::process::exit(1);
        }
        other => other,
    }
}

fn init_logging(verbose: bool) {
    let fallback = if verbose {
        "orgctl=debug,orgctlapp=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config_dir = config_dir()?;
    debug!(config_dir = %config_dir.display(), "using config directory");

    let result = match cli.command {
        Commands::Org(cmd) => handle_org(&config_dir, cmd)?,
        Commands::Permset(PermsetCommands::Assign {
            name,
            lastname,
            firstname,
        }) => {
            let api = connect(&config_dir, cli.target_org.as_deref())?;
            let request = AssignRequest {
                permission_set: name,
                last_name: lastname,
                first_name: firstname,
            };
            let chooser = pick_chooser(cli.no_prompt);
            api.assign_permission_set(&request, chooser.as_ref()).await?
        }
        Commands::User(UserCommands::Photo {
            file,
            lastname,
            firstname,
            banner,
        }) => {
            let api = connect(&config_dir, cli.target_org.as_deref())?;
            api.upload_user_photo(
                lastname.as_deref(),
                firstname.as_deref(),
                &file,
                photo_kind(banner),
            )
            .await?
        }
        Commands::Group(GroupCommands::Photo {
            file,
            id,
            name,
            banner,
        }) => {
            let group = match (id, name) {
                (Some(id), _) => GroupRef::Id(id),
                (None, Some(name)) => GroupRef::Name(name),
                (None, None) => {
                    return Err(OrgError::InvalidInput(
                        "pass either --id or --name".to_string(),
                    ))
                }
            };
            let api = connect(&config_dir, cli.target_org.as_deref())?;
            let chooser = pick_chooser(cli.no_prompt);
            api.upload_group_photo(&group, &file, photo_kind(banner), chooser.as_ref())
                .await?
        }
    };

    print_result(&result, cli.json)
}

fn handle_org(config_dir: &Path, cmd: OrgCommands) -> Result<CmdResult> {
    match cmd {
        OrgCommands::Add {
            alias,
            instance_url,
            access_token,
            api_version,
            set_default,
        } => commands::org::add(
            config_dir,
            NewOrg {
                alias,
                instance_url,
                access_token,
                api_version,
                set_default,
            },
        ),
        OrgCommands::List => commands::org::list(config_dir),
        OrgCommands::Remove { alias } => commands::org::remove(config_dir, &alias),
    }
}

fn connect(config_dir: &Path, target_org: Option<&str>) -> Result<OrgApi<RestConnection>> {
    let config = OrgConfig::load(config_dir)?;
    let creds = config.credentials(target_org, &EnvOverrides::from_env())?;
    debug!(
        alias = creds.alias.as_deref().unwrap_or("<env>"),
        instance_url = %creds.instance_url,
        api_version = %creds.api_version,
        "connecting"
    );
    Ok(OrgApi::new(RestConnection::new(
        &creds.instance_url,
        &creds.access_token,
        &creds.api_version,
    )))
}

/// Prompt only when someone is there to answer.
fn pick_chooser(no_prompt: bool) -> Box<dyn Chooser> {
    if !no_prompt && std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
        Box::new(TerminalChooser::new())
    } else {
        Box::new(FailOnAmbiguity)
    }
}

fn photo_kind(banner: bool) -> PhotoKind {
    if banner {
        PhotoKind::Banner
    } else {
        PhotoKind::Profile
    }
}
