// Discovery turns a directory tree into a Module.
//
// Layout (defaults shown):
//
//   <root>/commands/ping.json        -> top-level command `ping`
//   <root>/commands/mod.json         -> category `mod`
//   <root>/commands/mod/ban.json     -> subcommand `ban` of `mod`
//   <root>/events/ready.json         -> handler for the `ready` event
//
// A file's base name is the only source of a command's name. What a file turns
// into is up to the ModuleLoader; the shipped one reads JSON manifests and binds
// handlers registered in code. Any bad file fails the whole run: a Module is
// either complete or not returned at all.

pub mod handler_table;
pub mod manifest;

pub use handler_table::HandlerTable;
pub use manifest::{Manifest, ManifestLoader};

use crate::core::commands::UnknownPermission;
use crate::discord::commands::{Command, SubCommand};
use crate::discord::events::{EventHandler, InvalidEventName};
use crate::discord::module::{Module, ModuleError};
use async_trait::async_trait;
use futures::future::try_join_all;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Category `{category}` has no readable subcommand directory at {}: {source}", .path.display())]
    MissingSubcommandDir {
        category: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a valid module manifest: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} exports a {found}, expected a {expected}", .path.display())]
    UnexpectedExport {
        path: PathBuf,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{} has a file name that is not valid UTF-8", .path.display())]
    InvalidFileName { path: PathBuf },

    #[error("{} is named `{file_name}` but handles the `{declared}` event", .path.display())]
    EventMismatch {
        path: PathBuf,
        file_name: String,
        declared: String,
    },

    #[error("{}: {source}", .path.display())]
    InvalidEvent {
        path: PathBuf,
        #[source]
        source: InvalidEventName,
    },

    #[error("No handler registered under `{key}` (needed by {})", .path.display())]
    MissingHandler { path: PathBuf, key: String },

    #[error("{}: {source}", .path.display())]
    Permission {
        path: PathBuf,
        #[source]
        source: UnknownPermission,
    },

    #[error("{}: {source}", .path.display())]
    Module {
        path: PathBuf,
        #[source]
        source: ModuleError,
    },
}

/// Where commands and events live under the discovery root, and which files count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub commands_dir: PathBuf,
    pub events_dir: PathBuf,
    /// Extension (without the dot) of module files; everything else is skipped.
    pub extension: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            commands_dir: PathBuf::from("commands"),
            events_dir: PathBuf::from("events"),
            extension: "json".to_string(),
        }
    }
}

/// One module file as handed to a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File base name, extension stripped. Becomes the command name.
    pub name: String,
    /// Key handlers are looked up by: `name`, or `category/name` for subcommands.
    pub key: String,
}

/// What a module file turned out to contain.
pub enum Export {
    Command(Command),
    SubCommand(SubCommand),
    Event(EventHandler),
}

impl Export {
    pub fn type_name(&self) -> &'static str {
        match self {
            Export::Command(command) => command.kind_name(),
            Export::SubCommand(_) => "SubCommand",
            Export::Event(_) => "EventHandler",
        }
    }
}

/// Turns one module file into its export.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn load(&self, source: &SourceFile) -> Result<Export, DiscoveryError>;
}

pub struct Discovery<L> {
    loader: L,
    layout: Layout,
}

impl<L: ModuleLoader> Discovery<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            layout: Layout::default(),
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Load every command and event handler under `root` into one Module.
    pub async fn discover(&self, root: impl AsRef<Path>) -> Result<Module, DiscoveryError> {
        let root = root.as_ref();
        fs::metadata(root)
            .await
            .map_err(|source| DiscoveryError::Io {
                path: root.to_path_buf(),
                source,
            })?;

        let commands_dir = root.join(&self.layout.commands_dir);
        let events_dir = root.join(&self.layout.events_dir);

        let (commands, events) = tokio::try_join!(
            self.discover_commands(&commands_dir),
            self.discover_events(&events_dir)
        )?;

        tracing::info!(
            root = %root.display(),
            commands = commands.len(),
            events = events.len(),
            "Discovered module"
        );
        Ok(Module::from_parts(commands, events))
    }

    async fn discover_commands(&self, dir: &Path) -> Result<Vec<Command>, DiscoveryError> {
        let files = self.area_files(dir).await?;
        try_join_all(files.into_iter().map(|path| self.load_command(dir, path))).await
    }

    async fn discover_events(&self, dir: &Path) -> Result<Vec<EventHandler>, DiscoveryError> {
        let files = self.area_files(dir).await?;
        try_join_all(files.into_iter().map(|path| self.load_event(path))).await
    }

    async fn load_command(&self, dir: &Path, path: PathBuf) -> Result<Command, DiscoveryError> {
        let name = base_name(&path)?;
        let source = SourceFile {
            key: name.clone(),
            name,
            path,
        };

        let mut command = match self.loader.load(&source).await? {
            Export::Command(command) => command,
            other => return Err(unexpected(&source, "Command", &other)),
        };
        command.set_name(source.name.clone());

        if let Command::Category(category) = &mut command {
            let sub_dir = dir.join(&source.name);
            for (name, subcommand) in self.load_subcommands(&source.name, &sub_dir).await? {
                category
                    .insert_subcommand(name, subcommand)
                    .map_err(|err| DiscoveryError::Module {
                        path: source.path.clone(),
                        source: err,
                    })?;
            }
        }

        Ok(command)
    }

    async fn load_subcommands(
        &self,
        category: &str,
        dir: &Path,
    ) -> Result<Vec<(String, SubCommand)>, DiscoveryError> {
        let files = self.list_files(dir).await.map_err(|source| {
            DiscoveryError::MissingSubcommandDir {
                category: category.to_string(),
                path: dir.to_path_buf(),
                source,
            }
        })?;

        try_join_all(
            files
                .into_iter()
                .map(|path| self.load_subcommand(category, path)),
        )
        .await
    }

    async fn load_subcommand(
        &self,
        category: &str,
        path: PathBuf,
    ) -> Result<(String, SubCommand), DiscoveryError> {
        let name = base_name(&path)?;
        let source = SourceFile {
            key: format!("{category}/{name}"),
            name,
            path,
        };

        match self.loader.load(&source).await? {
            Export::SubCommand(subcommand) => Ok((source.name, subcommand)),
            other => Err(unexpected(&source, "SubCommand", &other)),
        }
    }

    async fn load_event(&self, path: PathBuf) -> Result<EventHandler, DiscoveryError> {
        let name = base_name(&path)?;
        let source = SourceFile {
            key: name.clone(),
            name,
            path,
        };

        match self.loader.load(&source).await? {
            Export::Event(handler) if handler.event().as_str() == source.name => Ok(handler),
            Export::Event(handler) => Err(DiscoveryError::EventMismatch {
                path: source.path,
                file_name: source.name,
                declared: handler.event().as_str().to_string(),
            }),
            other => Err(unexpected(&source, "EventHandler", &other)),
        }
    }

    /// Module files in a commands or events area. A missing area is just empty.
    async fn area_files(&self, dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        match self.list_files(dir).await {
            Ok(files) => Ok(files),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(dir = %dir.display(), "Module area not present, skipping");
                Ok(Vec::new())
            }
            Err(source) => Err(DiscoveryError::Io {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }

    /// Files directly in `dir` with the layout's extension, sorted by file name.
    async fn list_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = fs::read_dir(dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let matches_extension = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == self.layout.extension);
            if matches_extension && fs::metadata(&path).await?.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}

fn base_name(path: &Path) -> Result<String, DiscoveryError> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| DiscoveryError::InvalidFileName {
            path: path.to_path_buf(),
        })
}

fn unexpected(source: &SourceFile, expected: &'static str, found: &Export) -> DiscoveryError {
    DiscoveryError::UnexpectedExport {
        path: source.path.clone(),
        expected,
        found: found.type_name(),
    }
}
