use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use funnel_export::ExportFormat;
use funnel_types::EntityKind;

#[derive(Parser)]
#[command(
    name = "funnel",
    about = "Marketing funnel store: projects, funnel entities, and exports",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    /// Storage root (overrides --config and FUNNEL_DATA_DIR)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML file with `root = "..."`
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, inspect, update, or delete projects
    Project(ProjectArgs),
    /// Create, inspect, update, or delete funnel entities
    Entity(EntityArgs),
    /// Export a project with its entities
    Export(ExportArgs),
}

#[derive(Args)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create an empty project
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Show one project
    Get { id: String },
    /// List projects, most recently updated first
    List,
    /// Change name, description, or tags
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        /// Empty string clears the description
        #[arg(long)]
        description: Option<String>,
        /// Replaces all tags
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Delete a project and all of its entities
    Delete { id: String },
}

#[derive(Args)]
pub struct EntityArgs {
    #[command(subcommand)]
    pub action: EntityAction,
}

#[derive(Subcommand)]
pub enum EntityAction {
    /// Create an entity from a JSON payload (`-` reads stdin)
    Create {
        project_id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Show one entity
    Get { id: String },
    /// List a project's entities in reference order
    List {
        project_id: String,
        #[arg(long = "type")]
        kind: Option<EntityKind>,
    },
    /// Merge a JSON object over a stored entity (`-` reads stdin)
    Update {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Delete an entity and unlink it from its project
    Delete { id: String },
}

#[derive(Args)]
pub struct ExportArgs {
    pub project_id: String,
    #[arg(long, default_value = "markdown")]
    pub format: ExportFormat,
    /// Write to a file instead of stdout; a directory gets `<project-id>.<json|md>`
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_project_create() {
        let cli = Cli::try_parse_from([
            "funnel", "project", "create", "--name", "Demo", "--tag", "a", "--tag", "b",
        ])
        .unwrap();
        match cli.command {
            Command::Project(ProjectArgs {
                action: ProjectAction::Create { name, tags, description },
            }) => {
                assert_eq!(name, "Demo");
                assert_eq!(tags, vec!["a", "b"]);
                assert!(description.is_none());
            }
            _ => panic!("expected project create"),
        }
    }

    #[test]
    fn parses_entity_kind_filter() {
        let cli = Cli::try_parse_from([
            "funnel", "entity", "list", "p1", "--type", "customer-journey",
        ])
        .unwrap();
        match cli.command {
            Command::Entity(EntityArgs {
                action: EntityAction::List { kind, .. },
            }) => assert_eq!(kind, Some(EntityKind::CustomerJourney)),
            _ => panic!("expected entity list"),
        }
        assert!(Cli::try_parse_from(["funnel", "entity", "list", "p1", "--type", "nope"]).is_err());
    }

    #[test]
    fn export_format_accepts_only_json_and_markdown() {
        let cli = Cli::try_parse_from(["funnel", "export", "p1"]).unwrap();
        match cli.command {
            Command::Export(args) => assert_eq!(args.format, ExportFormat::Markdown),
            _ => panic!("expected export"),
        }
        assert!(Cli::try_parse_from(["funnel", "export", "p1", "--format", "json"]).is_ok());
        assert!(Cli::try_parse_from(["funnel", "export", "p1", "--format", "pdf"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "funnel", "project", "list", "--output", "json", "--root", "/tmp/f",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/f")));
    }
}
