//! CLI command implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use ripple_core::{ChangeDescriptor, ChangeKind, FsStore, NodeId, ValueDescriptor};
use ripple_impact::ImpactAnalyzer;
use ripple_indexer::{Coordinator, ProjectAnalysis};
use ripple_patch::PatchEngine;

/// Arguments of `ripple impact`.
pub struct ImpactRequest {
    pub node: String,
    pub change: ChangeKind,
    pub before_name: Option<String>,
    pub before_type: Option<String>,
    pub after_name: Option<String>,
    pub after_type: Option<String>,
    pub apply: bool,
    pub yes: bool,
}

async fn run_analysis(root: &Path) -> anyhow::Result<ProjectAnalysis> {
    let coordinator = Coordinator::for_root(root)
        .with_context(|| format!("failed to load configuration for {}", root.display()))?;
    coordinator
        .run_full_index()
        .await
        .with_context(|| format!("failed to analyze {}", root.display()))
}

pub async fn analyze(root: PathBuf, json: bool) -> anyhow::Result<()> {
    let analysis = run_analysis(&root).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis.to_result())?);
        return Ok(());
    }

    println!("Project:   {}", analysis.project_name);
    println!("Files:     {}", analysis.total_files);
    println!("Nodes:     {}", analysis.graph.node_count());
    println!("Edges:     {}", analysis.graph.edge_count());
    println!("Coherence: {}/100", analysis.coherence.score);
    for issue in &analysis.coherence.issues {
        println!("  [{:?}] {}", issue.severity, issue.message);
        if let Some(suggestion) = &issue.suggestion {
            println!("      {suggestion}");
        }
    }
    for path in &analysis.skipped {
        println!("  skipped {path}");
    }
    Ok(())
}

pub async fn impact(root: PathBuf, request: ImpactRequest) -> anyhow::Result<()> {
    let analysis = run_analysis(&root).await?;

    // Accept a primary name when no node has that id
    let node_id = NodeId::from(request.node.as_str());
    let node_id = if analysis.graph.contains(&node_id) {
        node_id
    } else if let Some(node) = analysis.graph.find_node_by_name(&request.node) {
        node.id.clone()
    } else {
        bail!("no node named or located at '{}'", request.node);
    };

    let mut change = ChangeDescriptor::new(node_id, request.change);
    if let Some(value) = descriptor(request.before_name, request.before_type) {
        change = change.before(value);
    }
    if let Some(value) = descriptor(request.after_name, request.after_type) {
        change = change.after(value);
    }

    let store = FsStore::new(&root);
    let report = ImpactAnalyzer::new(&analysis.graph, &store, analysis.resolver())
        .analyze_impact(&change)
        .await
        .context("impact analysis failed")?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !request.apply {
        return Ok(());
    }
    if report.requires_confirmation() && !request.yes {
        bail!("risk level is {}; re-run with --yes to apply", report.risk_level);
    }

    let fixes = report.auto_fixes();
    if fixes.is_empty() {
        tracing::info!("No auto-fixable patches to apply");
        return Ok(());
    }

    let mut engine = engine_with_history(&root, &analysis)?;
    let result = engine.apply_patches(&fixes).await;
    save_history(&root, &engine)?;

    tracing::info!(
        "Applied {} patches to {} files; {} failed",
        result.patches_applied.len(),
        result.files_modified.len(),
        result.patches_failed.len()
    );
    for error in &result.errors {
        tracing::warn!("{error}");
    }
    if !result.success {
        bail!("{} patches could not be applied", result.patches_failed.len());
    }
    Ok(())
}

pub async fn rollback(root: PathBuf, ids: Vec<String>) -> anyhow::Result<()> {
    let config = ripple_core::RippleConfig::load(&root).context("failed to load configuration")?;
    let mut engine = PatchEngine::with_config(FsStore::new(&root), &config);
    engine.restore_history(ripple_patch::load_history(&root).context("failed to load patch history")?);
    if engine.history().is_empty() && ids.is_empty() {
        tracing::info!("Nothing to roll back");
        return Ok(());
    }

    let selected = if ids.is_empty() { None } else { Some(ids.as_slice()) };
    let result = engine.rollback(selected).await;
    save_history(&root, &engine)?;

    tracing::info!(
        "Rolled back {} patches in {} files",
        result.patches_applied.len(),
        result.files_modified.len()
    );
    for error in &result.errors {
        tracing::warn!("{error}");
    }
    if !result.success {
        bail!("rollback incomplete: {} errors", result.errors.len());
    }
    Ok(())
}

pub fn history(root: PathBuf) -> anyhow::Result<()> {
    let patches = ripple_patch::load_history(&root).context("failed to load patch history")?;
    if patches.is_empty() {
        println!("No applied patches");
        return Ok(());
    }
    for patch in &patches {
        println!("{}  {}:{}  {}", patch.id, patch.path, patch.line, patch.description);
    }
    Ok(())
}

pub fn clear(root: PathBuf) -> anyhow::Result<()> {
    tracing::info!("Clearing state for: {}", root.display());
    ripple_patch::clear_state(&root)?;
    tracing::info!("State cleared");
    Ok(())
}

fn descriptor(name: Option<String>, type_name: Option<String>) -> Option<ValueDescriptor> {
    if name.is_none() && type_name.is_none() {
        return None;
    }
    Some(ValueDescriptor { name, type_name })
}

fn engine_with_history(root: &Path, analysis: &ProjectAnalysis) -> anyhow::Result<PatchEngine<FsStore>> {
    let mut engine = PatchEngine::with_config(FsStore::new(root), &analysis.config);
    engine.restore_history(ripple_patch::load_history(root).context("failed to load patch history")?);
    Ok(engine)
}

fn save_history(root: &Path, engine: &PatchEngine<FsStore>) -> anyhow::Result<()> {
    let patches: Vec<_> = engine.history().iter().cloned().collect();
    ripple_patch::save_history(root, &patches).context("failed to save patch history")
}
