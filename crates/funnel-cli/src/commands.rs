use std::path::{Path, PathBuf};
use std::process::ExitCode;

use colored::Colorize;
use funnel_export::{ExportError, ExportFormat, Exporter};
use funnel_store::{FunnelStore, StoreConfig, StoreError};
use funnel_types::{Entity, EntityId, NewEntity, Project, ProjectId};
use serde_json::{json, Value};
use tokio::io::AsyncReadExt;

use crate::cli::*;

/// Entity fields a patch may not change.
const IMMUTABLE_ENTITY_FIELDS: [&str; 5] = ["id", "projectId", "type", "createdAt", "updatedAt"];

/// Successful command result: structured data plus its text rendering.
pub struct Reply {
    pub data: Value,
    pub text: String,
}

impl Reply {
    fn new(data: Value, text: impl Into<String>) -> Self {
        Self {
            data,
            text: text.into(),
        }
    }
}

pub async fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = resolve_config(&cli)?;
    let store = FunnelStore::open(&config);
    let output = cli.output;

    match execute(&store, cli.command).await {
        Ok(reply) => {
            match output {
                OutputFormat::Json => {
                    println!("{}", json!({ "success": true, "data": reply.data }));
                }
                OutputFormat::Text => println!("{}", reply.text),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match expected_failure(&err) {
            Some(message) => {
                match output {
                    OutputFormat::Json => {
                        println!("{}", json!({ "success": false, "message": message }));
                    }
                    OutputFormat::Text => eprintln!("{} {message}", "error:".red().bold()),
                }
                Ok(ExitCode::FAILURE)
            }
            None => Err(err),
        },
    }
}

fn resolve_config(cli: &Cli) -> anyhow::Result<StoreConfig> {
    if let Some(root) = &cli.root {
        return Ok(StoreConfig::new(root));
    }
    if let Some(path) = &cli.config {
        return Ok(StoreConfig::load(path)?);
    }
    Ok(StoreConfig::from_env())
}

/// Not-found and invalid-input failures are reported to the caller as a
/// structured failure; anything else propagates.
fn expected_failure(err: &anyhow::Error) -> Option<String> {
    if let Some(e) = err.downcast_ref::<ExportError>() {
        return (e.is_not_found() || e.is_invalid_data()).then(|| e.to_string());
    }
    match err.downcast_ref::<StoreError>() {
        Some(e) if e.is_not_found() || matches!(e, StoreError::InvalidData(_)) => {
            Some(e.to_string())
        }
        _ => None,
    }
}

pub async fn execute(store: &FunnelStore, command: Command) -> anyhow::Result<Reply> {
    match command {
        Command::Project(args) => project_command(store, args.action).await,
        Command::Entity(args) => entity_command(store, args.action).await,
        Command::Export(args) => cmd_export(store, args).await,
    }
}

async fn project_command(store: &FunnelStore, action: ProjectAction) -> anyhow::Result<Reply> {
    let projects = store.projects();
    match action {
        ProjectAction::Create {
            name,
            description,
            tags,
        } => {
            let project = projects.create(name, description, tags).await?;
            let text = format!("{} Created project {}", "✓".green().bold(), project_line(&project));
            Ok(Reply::new(serde_json::to_value(&project)?, text))
        }
        ProjectAction::Get { id } => {
            let project = require_project(store, &id).await?;
            let text = project_detail(&project);
            Ok(Reply::new(serde_json::to_value(&project)?, text))
        }
        ProjectAction::List => {
            let listing = projects.list().await?;
            let mut lines: Vec<String> = listing.records.iter().map(project_line).collect();
            if lines.is_empty() {
                lines.push("No projects.".into());
            }
            for skipped in &listing.skipped {
                lines.push(format!(
                    "{} skipped {}: {}",
                    "warning:".yellow(),
                    skipped.path.display(),
                    skipped.reason
                ));
            }
            let data = json!({
                "projects": listing.records,
                "skipped": listing.skipped.iter().map(|s| json!({
                    "path": s.path.display().to_string(),
                    "reason": s.reason,
                })).collect::<Vec<_>>(),
            });
            Ok(Reply::new(data, lines.join("\n")))
        }
        ProjectAction::Update {
            id,
            name,
            description,
            tags,
            clear_tags,
        } => {
            let mut project = require_project(store, &id).await?;
            apply_project_update(&mut project, name, description, tags, clear_tags);
            projects.update(&mut project).await?;
            let text = format!("{} Updated project {}", "✓".green().bold(), project_line(&project));
            Ok(Reply::new(serde_json::to_value(&project)?, text))
        }
        ProjectAction::Delete { id } => {
            let deleted = projects.delete(&ProjectId::from(id.as_str())).await?;
            if !deleted {
                return Err(not_found("project", &id));
            }
            let text = format!("{} Deleted project {}", "✓".green().bold(), id.yellow());
            Ok(Reply::new(json!({ "deleted": id }), text))
        }
    }
}

async fn entity_command(store: &FunnelStore, action: EntityAction) -> anyhow::Result<Reply> {
    let entities = store.entities();
    match action {
        EntityAction::Create { project_id, file } => {
            let payload = read_payload(&file).await?;
            let new: NewEntity = serde_json::from_value(payload)
                .map_err(|e| StoreError::InvalidData(format!("entity payload: {e}")))?;
            let entity = entities.create(&ProjectId::from(project_id), new).await?;
            let text = format!("{} Created entity {}", "✓".green().bold(), entity_line(&entity));
            Ok(Reply::new(serde_json::to_value(&entity)?, text))
        }
        EntityAction::Get { id } => {
            let entity = require_entity(store, &id).await?;
            let text = serde_json::to_string_pretty(&entity)?;
            Ok(Reply::new(serde_json::to_value(&entity)?, text))
        }
        EntityAction::List { project_id, kind } => {
            let project_id = ProjectId::from(project_id);
            let listed = match kind {
                Some(kind) => entities.list_by_type(&project_id, kind).await?,
                None => entities.list_by_project(&project_id).await?,
            };
            let text = if listed.is_empty() {
                "No entities.".to_string()
            } else {
                listed.iter().map(entity_line).collect::<Vec<_>>().join("\n")
            };
            Ok(Reply::new(serde_json::to_value(&listed)?, text))
        }
        EntityAction::Update { id, file } => {
            let existing = require_entity(store, &id).await?;
            let patch = read_payload(&file).await?;
            let mut merged = merge_entity(&existing, patch)?;
            entities.update(&mut merged).await?;
            let text = format!("{} Updated entity {}", "✓".green().bold(), entity_line(&merged));
            Ok(Reply::new(serde_json::to_value(&merged)?, text))
        }
        EntityAction::Delete { id } => {
            let deleted = entities.delete(&EntityId::from(id.as_str())).await?;
            if !deleted {
                return Err(not_found("entity", &id));
            }
            let text = format!("{} Deleted entity {}", "✓".green().bold(), id.yellow());
            Ok(Reply::new(json!({ "deleted": id }), text))
        }
    }
}

async fn cmd_export(store: &FunnelStore, args: ExportArgs) -> anyhow::Result<Reply> {
    let project_id = ProjectId::from(args.project_id);
    let rendered = Exporter::new(store).export(&project_id, args.format).await?;
    match args.out {
        Some(out) => {
            let path = export_path(out, &project_id, args.format).await;
            tokio::fs::write(&path, &rendered).await?;
            let text = format!(
                "{} Exported {} to {}",
                "✓".green().bold(),
                args.format,
                path.display()
            );
            Ok(Reply::new(
                json!({ "format": args.format, "path": path.display().to_string() }),
                text,
            ))
        }
        None => Ok(Reply::new(
            json!({ "format": args.format, "content": rendered }),
            rendered,
        )),
    }
}

/// An existing directory as `--out` receives `<project-id>.<ext>`.
async fn export_path(out: PathBuf, project_id: &ProjectId, format: ExportFormat) -> PathBuf {
    let is_dir = tokio::fs::metadata(&out)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);
    if is_dir {
        out.join(format!("{project_id}.{}", format.extension()))
    } else {
        out
    }
}

async fn require_project(store: &FunnelStore, id: &str) -> anyhow::Result<Project> {
    store
        .projects()
        .get(&ProjectId::from(id))
        .await?
        .ok_or_else(|| not_found("project", id))
}

async fn require_entity(store: &FunnelStore, id: &str) -> anyhow::Result<Entity> {
    store
        .entities()
        .get(&EntityId::from(id))
        .await?
        .ok_or_else(|| not_found("entity", id))
}

fn not_found(collection: &'static str, id: &str) -> anyhow::Error {
    StoreError::NotFound {
        collection,
        id: id.to_string(),
    }
    .into()
}

async fn read_payload(path: &Path) -> anyhow::Result<Value> {
    let read = if path == Path::new("-") {
        let mut buf = String::new();
        tokio::io::stdin().read_to_string(&mut buf).await.map(|_| buf)
    } else {
        tokio::fs::read_to_string(path).await
    };
    let raw = read.map_err(|e| StoreError::InvalidData(format!("{}: {e}", path.display())))?;
    let value = serde_json::from_str(&raw)
        .map_err(|e| StoreError::InvalidData(format!("{}: {e}", path.display())))?;
    Ok(value)
}

/// Fold CLI flags into a fetched project before it is written back.
pub fn apply_project_update(
    project: &mut Project,
    name: Option<String>,
    description: Option<String>,
    tags: Vec<String>,
    clear_tags: bool,
) {
    if let Some(name) = name {
        project.name = name;
    }
    if let Some(description) = description {
        project.description = (!description.is_empty()).then_some(description);
    }
    if clear_tags {
        project.tags.clear();
    } else if !tags.is_empty() {
        project.tags = tags;
    }
}

/// Overlay the top-level keys of `patch` on a stored entity.
///
/// Identity and timestamp fields are kept from the stored record; a `null`
/// clears an optional field.
pub fn merge_entity(existing: &Entity, patch: Value) -> Result<Entity, StoreError> {
    let Value::Object(patch) = patch else {
        return Err(StoreError::InvalidData(
            "entity patch must be a JSON object".into(),
        ));
    };
    let mut merged = serde_json::to_value(existing)
        .map_err(|e| StoreError::InvalidData(e.to_string()))?;
    let Some(fields) = merged.as_object_mut() else {
        return Err(StoreError::InvalidData("entity is not a JSON object".into()));
    };
    for (key, value) in patch {
        if IMMUTABLE_ENTITY_FIELDS.contains(&key.as_str()) {
            tracing::warn!(field = %key, "ignoring patch of immutable entity field");
            continue;
        }
        if value.is_null() {
            fields.remove(&key);
        } else {
            fields.insert(key, value);
        }
    }
    serde_json::from_value(merged).map_err(|e| StoreError::InvalidData(format!("entity patch: {e}")))
}

fn project_line(project: &Project) -> String {
    format!(
        "{} {} ({} entities, updated {})",
        project.id.to_string().yellow(),
        project.name.bold(),
        project.entities.len(),
        project.updated_at
    )
}

fn project_detail(project: &Project) -> String {
    let mut lines = vec![project_line(project)];
    if let Some(description) = &project.description {
        lines.push(format!("  {description}"));
    }
    if !project.tags.is_empty() {
        lines.push(format!("  Tags: {}", project.tags.join(", ").cyan()));
    }
    for r in &project.entities {
        lines.push(format!("  - {} {}", r.id.to_string().yellow(), r.kind));
    }
    lines.join("\n")
}

fn entity_line(entity: &Entity) -> String {
    format!(
        "{} {} [{}]",
        entity.id.to_string().yellow(),
        entity.name.bold(),
        entity.kind().to_string().cyan()
    )
}
