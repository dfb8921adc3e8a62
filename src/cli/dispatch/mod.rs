//! Maps parsed command-line arguments to an [`Action`] plus the
//! [`GlobalArgs`] every action runs with.

use crate::{
    auth::Registration,
    cli::{
        actions::{
            Action,
            inventory::{AlertAction, MovementAction, ProductAction, ProductChanges},
        },
        commands::{self, inventory as inv, session},
        globals::GlobalArgs,
    },
    inventory::{MovementInput, MovementKind, Price, ProductInput},
};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use secrecy::SecretString;
use std::{env, path::PathBuf, time::Duration};

const DEFAULT_SESSION_DIR: &str = ".saep";
const DEFAULT_SESSION_FILE: &str = "session.json";

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &ArgMatches) -> Result<(Action, GlobalArgs)> {
    let globals = globals(matches)?;

    let action = match matches.subcommand() {
        Some((session::CMD_LOGIN, sub)) => Action::Login {
            email: required::<String>(sub, session::ARG_EMAIL)?,
            password: SecretString::from(required::<String>(sub, session::ARG_PASSWORD)?),
        },
        Some((session::CMD_LOGOUT, _)) => Action::Logout,
        Some((session::CMD_WHOAMI, _)) => Action::Whoami,
        Some((session::CMD_REGISTER, sub)) => Action::Register(Box::new(registration(sub)?)),
        Some((inv::CMD_PRODUCTS, sub)) => Action::Products(products(sub)?),
        Some((inv::CMD_MOVEMENTS, sub)) => Action::Movements(movements(sub)?),
        Some((inv::CMD_ALERTS, sub)) => Action::Alerts(alerts(sub)?),
        Some((inv::CMD_DASHBOARD, _)) => Action::Dashboard,
        Some((other, _)) => return Err(anyhow!("unknown command: {other}")),
        None => return Err(anyhow!("missing command, see --help")),
    };

    Ok((action, globals))
}

fn globals(matches: &ArgMatches) -> Result<GlobalArgs> {
    let api_url = required::<String>(matches, commands::ARG_API_URL)?;

    let session_file = match matches.get_one::<String>(commands::ARG_SESSION_FILE) {
        Some(path) => PathBuf::from(path),
        None => default_session_file()?,
    };

    let timeout = matches
        .get_one::<u64>(commands::ARG_TIMEOUT)
        .copied()
        .map_or(Duration::from_secs(30), Duration::from_secs);

    Ok(GlobalArgs::new(api_url, session_file).with_timeout(timeout))
}

fn default_session_file() -> Result<PathBuf> {
    let home = env::var_os("HOME")
        .filter(|home| !home.is_empty())
        .context("HOME is not set, pass --session-file or SAEP_SESSION_FILE")?;
    Ok(PathBuf::from(home)
        .join(DEFAULT_SESSION_DIR)
        .join(DEFAULT_SESSION_FILE))
}

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, name: &str) -> Result<T> {
    matches
        .get_one::<T>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn registration(matches: &ArgMatches) -> Result<Registration> {
    Ok(Registration {
        username: required(matches, session::ARG_USERNAME)?,
        email: required(matches, session::ARG_EMAIL)?,
        password: SecretString::from(required::<String>(matches, session::ARG_PASSWORD)?),
        password2: SecretString::from(required::<String>(
            matches,
            session::ARG_PASSWORD_CONFIRM,
        )?),
        first_name: required(matches, session::ARG_FIRST_NAME)?,
        last_name: required(matches, session::ARG_LAST_NAME)?,
        empresa: matches.get_one::<String>(session::ARG_COMPANY).cloned(),
    })
}

fn products(matches: &ArgMatches) -> Result<ProductAction> {
    match matches.subcommand() {
        Some((inv::CMD_LIST, sub)) => Ok(ProductAction::List {
            search: sub.get_one::<String>(inv::ARG_SEARCH).cloned(),
        }),
        Some((inv::CMD_GET, sub)) => Ok(ProductAction::Get {
            id: required(sub, inv::ARG_ID)?,
        }),
        Some((inv::CMD_CREATE, sub)) => Ok(ProductAction::Create(ProductInput {
            nome: required(sub, inv::ARG_NAME)?,
            descricao: sub.get_one::<String>(inv::ARG_DESCRIPTION).cloned(),
            quantidade: sub.get_one::<u32>(inv::ARG_QUANTITY).copied().unwrap_or(0),
            estoque_minimo: sub.get_one::<u32>(inv::ARG_MIN_STOCK).copied().unwrap_or(0),
            preco: sub.get_one::<Price>(inv::ARG_PRICE).cloned(),
        })),
        Some((inv::CMD_UPDATE, sub)) => Ok(ProductAction::Update {
            id: required(sub, inv::ARG_ID)?,
            changes: ProductChanges {
                nome: sub.get_one::<String>(inv::ARG_NAME).cloned(),
                descricao: sub.get_one::<String>(inv::ARG_DESCRIPTION).cloned(),
                quantidade: sub.get_one::<u32>(inv::ARG_QUANTITY).copied(),
                estoque_minimo: sub.get_one::<u32>(inv::ARG_MIN_STOCK).copied(),
                preco: sub.get_one::<Price>(inv::ARG_PRICE).cloned(),
            },
        }),
        Some((inv::CMD_DELETE, sub)) => Ok(ProductAction::Delete {
            id: required(sub, inv::ARG_ID)?,
        }),
        _ => Err(anyhow!("missing products command, see `saep products --help`")),
    }
}

fn movements(matches: &ArgMatches) -> Result<MovementAction> {
    match matches.subcommand() {
        Some((inv::CMD_LIST, _)) => Ok(MovementAction::List),
        Some((inv::CMD_CREATE, sub)) => {
            let kind = match required::<String>(sub, inv::ARG_KIND)?.as_str() {
                "entrada" => MovementKind::Entrada,
                "saida" => MovementKind::Saida,
                other => return Err(anyhow!("invalid movement type: {other}")),
            };
            Ok(MovementAction::Create(MovementInput {
                produto: required(sub, inv::ARG_PRODUCT)?,
                tipo_movimentacao: kind,
                quantidade: required(sub, inv::ARG_QUANTITY)?,
                observacao: sub.get_one::<String>(inv::ARG_NOTE).cloned(),
            }))
        }
        _ => Err(anyhow!("missing movements command, see `saep movements --help`")),
    }
}

fn alerts(matches: &ArgMatches) -> Result<AlertAction> {
    match matches.subcommand() {
        Some((inv::CMD_LIST, _)) => Ok(AlertAction::List),
        Some((inv::CMD_READ, sub)) => Ok(AlertAction::Read {
            id: required(sub, inv::ARG_ID)?,
        }),
        _ => Err(anyhow!("missing alerts command, see `saep alerts --help`")),
    }
}
