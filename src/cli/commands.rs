//! Command dispatch

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::cli::args::{
    Cli, Commands, CompanyCommands, ConfigCommands, PositionArgs, ProcessCommands, UnitCommands,
};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{expand_path, global_config_path, local_config_path, Settings};
use crate::domain::{CompanyId, NewUnit, ParentChange, TreeNodeConvert, UnitUpdate};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::Registry;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Err(CliError::Usage(
            "no command given, see `orgtree --help`".to_string(),
        ));
    };

    match command {
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Commands::Config { command } => execute_config(cli, command),
        Commands::Company { command } => execute_company(&container(cli)?, command),
        Commands::Process { command } => execute_process(&container(cli)?, command),
        Commands::Unit { command } => execute_unit(&container(cli)?, command),
        Commands::Tree { company, json } => tree(&container(cli)?, *company, *json),
        Commands::Flat { company, json } => flat(&container(cli)?, *company, *json),
    }
}

fn config_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.config_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::InvalidArgs(format!("cannot determine current directory: {e}"))),
    }
}

/// Settings for this invocation; `--data-file` wins over every configured layer.
pub(crate) fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let dir = config_dir(cli)?;
    let mut settings = Settings::load(Some(&dir))?;
    if let Some(data_file) = &cli.data_file {
        settings.data_file = PathBuf::from(expand_path(&data_file.to_string_lossy()));
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    Ok(ServiceContainer::new(load_settings(cli)?)?)
}

fn execute_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no global config directory on this platform"),
            }
            output::action("local", &local_config_path(&config_dir(cli)?).display());
            output::action("data", &load_settings(cli)?.data_file.display());
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn execute_company(container: &ServiceContainer, command: &CompanyCommands) -> CliResult<()> {
    match command {
        CompanyCommands::Add { name } => {
            let company = container.store.add_company(name)?;
            output::success(&format!("company {} ({})", company.name, company.id));
        }
        CompanyCommands::List => {
            for company in container.store.companies()? {
                output::info(&format!("{}\t{}", company.id, company.name));
            }
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn execute_process(container: &ServiceContainer, command: &ProcessCommands) -> CliResult<()> {
    match command {
        ProcessCommands::Add { unit, name } => {
            let process = container.store.add_process(*unit, name)?;
            output::success(&format!(
                "process {} ({}) on unit {}",
                process.name, process.id, process.business_unit_id
            ));
        }
    }
    Ok(())
}

fn parent_change(position: &PositionArgs) -> ParentChange {
    match (position.parent, position.root) {
        (Some(parent), _) => ParentChange::MoveTo(parent),
        (None, true) => ParentChange::Detach,
        (None, false) => ParentChange::Keep,
    }
}

#[instrument(level = "debug", skip(container))]
fn execute_unit(container: &ServiceContainer, command: &UnitCommands) -> CliResult<()> {
    let hierarchy = &container.hierarchy;
    match command {
        UnitCommands::Create {
            company,
            name,
            fte,
            description,
            parent,
        } => {
            let unit = hierarchy.create_unit(NewUnit {
                company_id: *company,
                name: name.clone(),
                fte: *fte,
                description: description.clone(),
                parent_id: *parent,
            })?;
            output::success(&format!("created {} ({})", unit.name, unit.id));
        }
        UnitCommands::Update {
            id,
            name,
            fte,
            description,
            position,
        } => {
            let unit = hierarchy.update_unit(
                *id,
                UnitUpdate {
                    name: name.clone(),
                    fte: *fte,
                    description: description.clone(),
                    parent: parent_change(position),
                },
            )?;
            output::success(&format!("updated {} ({})", unit.name, unit.id));
        }
        UnitCommands::Move { id, position } => {
            let new_parent = match parent_change(position) {
                ParentChange::MoveTo(parent) => Some(parent),
                ParentChange::Detach => None,
                ParentChange::Keep => {
                    return Err(CliError::Usage(
                        "move needs either --parent <id> or --root".to_string(),
                    ))
                }
            };
            let unit = hierarchy.move_unit(*id, new_parent)?;
            output::success(&format!("moved {} ({})", unit.name, unit.id));
        }
        UnitCommands::Delete { id } => {
            let unit = hierarchy.delete_unit(*id)?;
            output::success(&format!("deleted {} ({})", unit.name, unit.id));
        }
        UnitCommands::Show { id } => {
            let unit = hierarchy.get_unit(*id)?;
            output::info(&serde_json::to_string_pretty(&unit)?);
        }
        UnitCommands::Capacity { id } => {
            let unit = hierarchy.get_unit(*id)?;
            let report = hierarchy.capacity_report(*id)?;
            output::header(&unit.name);
            output::capacity(&report);
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn tree(container: &ServiceContainer, company: Option<CompanyId>, json: bool) -> CliResult<()> {
    if json {
        let tree = container.hierarchy.get_tree(company)?;
        output::info(&serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    let forest = container.hierarchy.forest(company)?;
    if forest.is_empty() {
        output::warning("no business units");
    }
    for tree in forest.to_tree_strings() {
        output::info(&tree);
    }
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn flat(container: &ServiceContainer, company: Option<CompanyId>, json: bool) -> CliResult<()> {
    let units = container.hierarchy.get_flat(company)?;
    if json {
        output::info(&serde_json::to_string_pretty(&units)?);
        return Ok(());
    }
    for entry in &units {
        output::unit_line(entry);
    }
    Ok(())
}
