//! Command dispatch: load the document, apply one model operation, save

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::DocumentService;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::render::ToTermTree;
use crate::config::{global_config_path, Settings};
use crate::domain::{NodeId, TreeModel};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Init { payload, force }) => cmd_init(cli, payload, *force),
        Some(Commands::Add { parent, payload }) => cmd_add(cli, *parent, payload),
        Some(Commands::Remove { id }) => cmd_remove(cli, *id),
        Some(Commands::Move { from, to }) => cmd_move(cli, *from, *to),
        Some(Commands::Show {
            fold,
            positions,
            offset,
        }) => cmd_show(cli, fold, *positions, offset.as_deref()),
        Some(Commands::Info) => cmd_info(cli),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

/// One opened tree document together with the service that persists it.
struct Session {
    docs: DocumentService,
    path: PathBuf,
    model: TreeModel<String>,
}

impl Session {
    /// Load the document named on the command line or in the config.
    ///
    /// With `allow_missing` a non-existing file yields an empty tree.
    #[instrument(level = "debug", skip(cli))]
    fn open(cli: &Cli, allow_missing: bool) -> CliResult<Self> {
        let settings = Settings::load(None)?;
        let container = ServiceContainer::new(settings);
        let path = cli
            .file
            .clone()
            .or_else(|| container.settings.default_file.clone())
            .ok_or_else(|| {
                CliError::Usage("no tree document: pass --file or set default_file".into())
            })?;

        let docs = container.documents(&path, cli.format);
        let mut model = container.new_model();
        if docs.exists(&path) {
            docs.load(&mut model, &path)?;
        } else if !allow_missing {
            return Err(CliError::MissingDocument(path));
        } else {
            debug!("{} does not exist, starting empty", path.display());
        }
        Ok(Self { docs, path, model })
    }

    fn save(&self) -> CliResult<usize> {
        Ok(self.docs.save(&self.model, &self.path)?)
    }

    fn describe(&self, id: NodeId) -> String {
        self.model
            .node(id)
            .map(|n| n.to_string())
            .unwrap_or_else(|| id.to_string())
    }
}

fn cmd_init(cli: &Cli, payload: &str, force: bool) -> CliResult<()> {
    let mut session = Session::open(cli, true)?;
    if !session.model.is_empty() && !force {
        return Err(CliError::Usage(format!(
            "{} already holds a tree, use --force to replace it",
            session.path.display()
        )));
    }
    session.model.clear();
    let root = session.model.new_node(payload.to_string());
    let id = session.model.add(root, None)?;
    session.save()?;
    output::created(&format!(
        "created {} with root {}",
        session.path.display(),
        session.describe(id)
    ));
    Ok(())
}

fn cmd_add(cli: &Cli, parent: Option<u32>, payload: &str) -> CliResult<()> {
    let mut session = Session::open(cli, true)?;
    let parent = parent.map(NodeId).or_else(|| session.model.root());
    let node = session.model.new_node(payload.to_string());
    let id = session.model.add(node, parent)?;
    session.save()?;
    match parent {
        Some(p) => output::edited(
            "Added",
            &format!("{} under {}", session.describe(id), session.describe(p)),
        ),
        None => output::edited("Added", &format!("{} as root", session.describe(id))),
    }
    Ok(())
}

fn cmd_remove(cli: &Cli, id: u32) -> CliResult<()> {
    let mut session = Session::open(cli, false)?;
    let label = session.describe(NodeId(id));
    let removed = session.model.remove(NodeId(id))?;
    session.save()?;
    output::edited(
        "Removed",
        &format!("{} ({} nodes: {})", label, removed.len(), removed.iter().join(", ")),
    );
    Ok(())
}

fn cmd_move(cli: &Cli, from: u32, to: u32) -> CliResult<()> {
    let mut session = Session::open(cli, false)?;
    let (from, to) = (NodeId(from), NodeId(to));
    if !session.model.move_to_node(from, to)? {
        output::warning(&format!(
            "{} is inside the subtree of {}, nothing moved",
            session.describe(to),
            session.describe(from)
        ));
        return Ok(());
    }
    session.save()?;
    output::edited(
        "Moved",
        &format!("{} under {}", session.describe(from), session.describe(to)),
    );
    Ok(())
}

/// Print the visible tree; folds and offsets only affect this rendering.
fn cmd_show(cli: &Cli, fold: &[u32], positions: bool, offset: Option<&[f64]>) -> CliResult<()> {
    let mut session = Session::open(cli, false)?;
    for &id in fold {
        session.model.fold(NodeId(id))?;
    }
    let mut positions = positions;
    if let Some(&[dx, dy]) = offset {
        session.model.move_to_position(dx, dy);
        positions = true;
    }
    let tree = session.model.to_term_tree(positions);
    output::tree(&tree).map_err(|e| InfraError::output("tree", e))?;
    Ok(())
}

fn cmd_info(cli: &Cli) -> CliResult<()> {
    let session = Session::open(cli, false)?;
    let model = &session.model;
    output::title(&session.path.display());
    output::stat("nodes", &model.len());
    output::stat("depth", &model.depth());
    let leaves = model.leaf_nodes();
    output::stat(
        "leaves",
        &format!("{} ({})", leaves.len(), leaves.iter().join(", ")),
    );
    output::stat("format", &session.docs.codec());
    Ok(())
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(None)?;
            if let Some(global) = global_config_path().filter(|p| p.exists()) {
                output::title(&format!("# global: {}", global.display()));
            }
            output::raw(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::raw(&Settings::template()),
    }
    Ok(())
}
