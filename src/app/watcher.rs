//! Watches the open root and emits a debounced change notification.

use globset::GlobSet;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

use super::debounce::DebouncedScheduler;
use super::events::UserEvent;
use super::proxy::EventProxy;
use crate::core::{build_watch_globset, relative_path, BuiltinExclusions, CoreError};

/// Keeps a recursive watch on one root. Dropping it stops the watch and
/// discards any pending notification.
pub struct RootWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
    scheduler: Arc<DebouncedScheduler>,
}

impl RootWatcher {
    pub fn start<P: EventProxy>(
        root: &Path,
        builtins: &BuiltinExclusions,
        delay: Duration,
        runtime: Handle,
        proxy: P,
    ) -> Result<Self, CoreError> {
        let excluded = build_watch_globset(builtins)?;
        let event_root = root.to_path_buf();
        let scheduler = Arc::new(DebouncedScheduler::new(runtime, delay, move || {
            tracing::info!("Change detected under {:?}", event_root);
            proxy.send_event(UserEvent::FileSystemChanged {
                root: event_root.clone(),
            });
        }));

        // Event paths may come back canonicalized.
        let roots = [
            root.to_path_buf(),
            root.canonicalize().unwrap_or_else(|_| root.to_path_buf()),
        ];
        let trigger = scheduler.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) if is_relevant(&event, &roots, &excluded) => trigger.trigger(),
                Ok(_) => {}
                Err(e) => tracing::warn!("Watch error: {}", e),
            },
            Config::default(),
        )?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        tracing::info!("Watching {:?} (debounce {:?})", root, delay);

        Ok(Self {
            root: root.to_path_buf(),
            _watcher: watcher,
            scheduler,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Drop for RootWatcher {
    fn drop(&mut self) {
        self.scheduler.cancel();
        tracing::debug!("Stopped watching {:?}", self.root);
    }
}

/// A content-changing event with at least one path outside the excluded set.
fn is_relevant(event: &Event, roots: &[PathBuf], excluded: &GlobSet) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    ) {
        return false;
    }
    event
        .paths
        .iter()
        .any(|path| !is_excluded(path, roots, excluded))
}

fn is_excluded(path: &Path, roots: &[PathBuf], excluded: &GlobSet) -> bool {
    let Some(root) = roots.iter().find(|root| path.starts_with(root)) else {
        return false;
    };
    let relative = relative_path(path, root);
    !relative.is_empty() && excluded.is_match(&relative)
}
