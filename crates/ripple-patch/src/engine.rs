//! Applies line patches to files and rolls them back

use std::collections::{BTreeMap, HashSet, VecDeque};

use tracing::{debug, info, warn};

use ripple_core::{Patch, PatchApplyResult, RippleConfig, SourceStore};

use crate::document::{Document, indentation};
use crate::error::PatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Record into history; unindented replacements keep the line's indentation.
    Apply,
    /// Text is restored verbatim and nothing is recorded.
    Rollback,
}

/// The only component that writes source files.
///
/// Owns the ordered history of applied patches, bounded to `history_limit`
/// entries with the oldest evicted first.
pub struct PatchEngine<S: SourceStore> {
    store: S,
    history: VecDeque<Patch>,
    history_limit: usize,
    drift_window: usize,
}

impl<S: SourceStore> PatchEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, &RippleConfig::default())
    }

    pub fn with_config(store: S, config: &RippleConfig) -> Self {
        Self {
            store,
            history: VecDeque::new(),
            history_limit: config.history_limit,
            drift_window: config.drift_window,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Applied patches, oldest first, as actually written.
    pub fn history(&self) -> &VecDeque<Patch> {
        &self.history
    }

    /// Seed the history, e.g. from a persisted file. The limit still applies.
    pub fn restore_history(&mut self, patches: impl IntoIterator<Item = Patch>) {
        for patch in patches {
            self.record(patch);
        }
    }

    /// Apply patches grouped by file. Failures are isolated per patch and per file.
    pub async fn apply_patches(&mut self, patches: &[Patch]) -> PatchApplyResult {
        info!("Applying {} patches", patches.len());
        self.apply(patches.to_vec(), Mode::Apply).await
    }

    /// Undo the given history entries, or all of them when `ids` is `None`.
    ///
    /// Entries are undone newest first, one at a time, each against the file as the
    /// previous undo left it. History is pruned only for ids whose inverse applied.
    /// Unknown ids are reported as errors.
    pub async fn rollback(&mut self, ids: Option<&[String]>) -> PatchApplyResult {
        let mut result = PatchApplyResult::default();
        let selected: Vec<String> = match ids {
            None => self.history.iter().map(|p| p.id.clone()).collect(),
            Some(ids) => {
                for id in ids {
                    if !self.history.iter().any(|p| &p.id == id) {
                        result.errors.push(format!("{id}: not in patch history"));
                    }
                }
                self.history
                    .iter()
                    .filter(|p| ids.contains(&p.id))
                    .map(|p| p.id.clone())
                    .collect()
            }
        };
        info!("Rolling back {} patches", selected.len());

        // Walk the selection from the newest end; failed entries stay where they are
        let mut skip = HashSet::new();
        for id in selected.iter().rev() {
            let Some(index) = self
                .history
                .iter()
                .enumerate()
                .rposition(|(i, p)| &p.id == id && !skip.contains(&i))
            else {
                continue;
            };
            let mut inverse = self.history[index].inverse();
            inverse.line = self.current_line(index);

            let step = self.apply(vec![inverse], Mode::Rollback).await;
            if step.patches_applied.is_empty() {
                skip.insert(index);
            } else if let Some(undone) = self.history.remove(index) {
                self.rebase_after_undo(index, &undone);
                skip = skip.into_iter().map(|i| if i > index { i - 1 } else { i }).collect();
            }
            merge(&mut result, step);
        }

        result.success = result.patches_failed.is_empty() && result.errors.is_empty();
        result
    }

    /// Where the entry at `index` sits now, after every entry recorded later in the same file.
    ///
    /// A later deletion above the position pulls it up one line.
    fn current_line(&self, index: usize) -> u32 {
        let entry = &self.history[index];
        let mut line = entry.line;
        for later in self.history.iter().skip(index + 1) {
            if later.path == entry.path && later.is_deletion() && later.line < line {
                line -= 1;
            }
        }
        line
    }

    /// Re-base the entries recorded after `undone` (now at `index`) onto a file
    /// where `undone` never happened. Only a restored line shifts anything.
    fn rebase_after_undo(&mut self, index: usize, undone: &Patch) {
        if !undone.is_deletion() {
            return;
        }
        let mut restored = undone.line;
        for later in self.history.iter_mut().skip(index) {
            if later.path != undone.path {
                continue;
            }
            let was = later.line;
            if was >= restored {
                later.line += 1;
            }
            if later.is_deletion() && was < restored {
                restored -= 1;
            }
        }
    }

    async fn apply(&mut self, patches: Vec<Patch>, mode: Mode) -> PatchApplyResult {
        let mut result = PatchApplyResult::default();

        let mut by_file: BTreeMap<String, Vec<Patch>> = BTreeMap::new();
        for patch in patches {
            by_file.entry(patch.path.clone()).or_default().push(patch);
        }

        for (path, mut file_patches) in by_file {
            // Bottom-up so earlier edits never shift later targets; inserts go last on ties
            file_patches.sort_by(|a, b| {
                b.line
                    .cmp(&a.line)
                    .then(inserts(a, mode).cmp(&inserts(b, mode)))
            });

            let content = match self.store.read(&path).await {
                Ok(content) => content,
                Err(source) => {
                    let error = if source.kind() == std::io::ErrorKind::NotFound {
                        PatchError::FileMissing(path.clone())
                    } else {
                        PatchError::Read {
                            path: path.clone(),
                            source,
                        }
                    };
                    warn!("{}", error);
                    for patch in file_patches {
                        fail(&mut result, patch, &error);
                    }
                    continue;
                }
            };

            let mut doc = Document::parse(&content);
            let mut applied = Vec::new();
            for patch in file_patches {
                match self.apply_one(&mut doc, &patch, mode) {
                    Ok(done) => applied.push(done),
                    Err(error) => {
                        warn!("Patch {} failed: {}", patch.id, error);
                        fail(&mut result, patch, &error);
                    }
                }
            }
            if applied.is_empty() {
                continue;
            }

            match self.store.write(&path, &doc.render()).await {
                Ok(()) => {
                    debug!("Wrote {} ({} patches)", path, applied.len());
                    result.files_modified.push(path);
                    for patch in applied {
                        if mode == Mode::Apply {
                            self.record(patch.clone());
                        }
                        result.patches_applied.push(patch);
                    }
                }
                Err(source) => {
                    let error = PatchError::Write { path, source };
                    warn!("{}", error);
                    for patch in applied {
                        fail(&mut result, patch, &error);
                    }
                }
            }
        }

        result.success = result.patches_failed.is_empty() && result.errors.is_empty();
        result
    }

    /// Apply one patch to the buffer and return it as actually applied.
    fn apply_one(&self, doc: &mut Document, patch: &Patch, mode: Mode) -> Result<Patch, PatchError> {
        let len = doc.len();
        let out_of_range = || PatchError::LineOutOfRange {
            path: patch.path.clone(),
            line: patch.line,
            len,
        };
        if patch.line == 0 {
            return Err(out_of_range());
        }
        let index = patch.line as usize - 1;

        if inserts(patch, mode) {
            if index > len {
                return Err(out_of_range());
            }
            doc.insert(index, patch.new_code.clone());
            return Ok(applied(patch, patch.line, String::new(), patch.new_code.clone()));
        }

        if index >= len + self.drift_window {
            return Err(out_of_range());
        }
        let Some(found) = doc.find(index, &patch.old_code, self.drift_window) else {
            return Err(PatchError::Drift {
                path: patch.path.clone(),
                line: patch.line,
                expected: patch.old_code.trim().to_string(),
                found: doc.line(index).unwrap_or_default().trim().to_string(),
                window: self.drift_window,
            });
        };
        if found != index {
            debug!("Patch {} drifted from line {} to {}", patch.id, patch.line, found + 1);
        }

        let current = doc.line(found).unwrap_or_default().to_string();
        let line = found as u32 + 1;
        if patch.is_deletion() {
            doc.delete(found);
            return Ok(applied(patch, line, current, String::new()));
        }

        let text = if mode == Mode::Apply && indentation(&patch.new_code).is_empty() {
            format!("{}{}", indentation(&current), patch.new_code)
        } else {
            patch.new_code.clone()
        };
        doc.replace(found, text.clone());
        Ok(applied(patch, line, current, text))
    }

    fn record(&mut self, patch: Patch) {
        if self.history_limit == 0 {
            return;
        }
        while self.history.len() >= self.history_limit {
            if let Some(evicted) = self.history.pop_front() {
                warn!("Patch history full; dropping {} ({})", evicted.id, evicted.path);
            }
        }
        self.history.push_back(patch);
    }
}

fn merge(into: &mut PatchApplyResult, step: PatchApplyResult) {
    for path in step.files_modified {
        if !into.files_modified.contains(&path) {
            into.files_modified.push(path);
        }
    }
    into.patches_applied.extend(step.patches_applied);
    into.patches_failed.extend(step.patches_failed);
    into.errors.extend(step.errors);
}

/// Whether `patch` adds a line. A rollback entry with empty `old_code` restores a deleted line, even a blank one.
fn inserts(patch: &Patch, mode: Mode) -> bool {
    patch.is_insertion() || (mode == Mode::Rollback && patch.old_code.is_empty())
}

fn applied(patch: &Patch, line: u32, old_code: String, new_code: String) -> Patch {
    Patch {
        line,
        old_code,
        new_code,
        applied: Some(true),
        error: None,
        ..patch.clone()
    }
}

fn fail(result: &mut PatchApplyResult, mut patch: Patch, error: &PatchError) {
    let message = error.to_string();
    result.errors.push(format!("{}: {}", patch.id, message));
    patch.applied = Some(false);
    patch.error = Some(message);
    result.patches_failed.push(patch);
}
