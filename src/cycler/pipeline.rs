//! Multi-stage cycler.
//!
//! Stage 0 is the most upstream (typically the application stage); each
//! call to [`PipelineCycler::cycle`] hands every stage the page its
//! upstream neighbour held. Stages that see the same snapshot share one
//! node, so a cycler costs one page per distinct snapshot, not per stage.

use crate::cycler::node::{PageNode, PageReadHandle, RefCounts};
use crate::cycler::shared::{make_exclusive, PageWriteHandle};
use crate::error::{PageError, Result};
use crate::page::{copy_page, CycleData};
use crate::CyclerConfig;
use log::{debug, trace};
use parking_lot::{RwLock, RwLockWriteGuard};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cycler statistics
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CyclerStats {
    pub name: String,
    pub num_stages: usize,
    /// Number of different snapshots currently held by stages
    pub distinct_pages: usize,
    pub dirty: bool,
}

/// One slot per pipeline stage
pub struct PipelineCycler<T: CycleData> {
    name: String,
    stages: Vec<RwLock<Arc<PageNode<T>>>>,
    /// Set when stages disagree, so a cycle has work to do
    dirty: AtomicBool,
}

impl<T: CycleData> PipelineCycler<T> {
    /// Create a cycler whose stages all start on `page`
    pub fn new(page: T, config: &CyclerConfig) -> Result<Self> {
        config.validate()?;
        let node = Arc::new(PageNode::new(page));
        let stages = (0..config.num_stages)
            .map(|_| RwLock::new(Arc::clone(&node)))
            .collect();

        Ok(Self {
            name: config.name.clone(),
            stages,
            dirty: AtomicBool::new(false),
        })
    }

    /// Create a cycler with `num_stages` stages and default settings
    pub fn with_stages(page: T, num_stages: usize) -> Result<Self> {
        Self::new(page, &CyclerConfig::default().num_stages(num_stages))
    }

    /// Diagnostic name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stages
    pub fn num_stages(&self) -> usize {
        self.stages.len()
    }

    /// Check if some stage holds a snapshot its downstream neighbour lacks
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    fn stage(&self, stage: usize) -> Result<&RwLock<Arc<PageNode<T>>>> {
        self.stages.get(stage).ok_or(PageError::InvalidStage {
            stage,
            num_stages: self.stages.len(),
        })
    }

    /// Take an external reference to the page `stage` sees
    pub fn read(&self, stage: usize) -> Result<PageReadHandle<T>> {
        Ok(PageReadHandle::new(&self.stage(stage)?.read()))
    }

    /// Get write access to the page `stage` sees.
    ///
    /// The page is copied first if any other stage or reader holds it.
    /// While the handle is alive, the same thread must not call
    /// [`cycle`](Self::cycle) or [`write_upstream`](Self::write_upstream)
    /// with a stage at or after `stage`: both wait for this stage's lock.
    pub fn write(&self, stage: usize) -> Result<PageWriteHandle<'_, T>> {
        let mut guard = self.stage(stage)?.write();
        make_exclusive(&mut guard)?;
        // The page is now exclusive to `stage`, so its neighbours differ
        if self.stages.len() > 1 {
            self.dirty.store(true, Ordering::Release);
        }
        PageWriteHandle::map(guard)
    }

    /// Modify the page at `stage` and give the result to every upstream stage.
    ///
    /// Without this, the next cycle would overwrite the change with whatever
    /// stage `stage - 1` holds.
    pub fn write_upstream<F>(&self, stage: usize, modify: F) -> Result<()>
    where
        F: FnOnce(&mut T),
    {
        self.stage(stage)?;
        let mut guards: Vec<RwLockWriteGuard<'_, Arc<PageNode<T>>>> =
            self.stages[..=stage].iter().map(|s| s.write()).collect();

        let target = &mut guards[stage];
        let node = match Arc::get_mut(target) {
            Some(node) => {
                modify(node.page_mut());
                None
            }
            None => {
                let mut page = copy_page(target.page())?;
                modify(&mut page);
                Some(Arc::new(PageNode::new(page)))
            }
        };
        let node = node.unwrap_or_else(|| Arc::clone(&guards[stage]));

        for guard in guards.iter_mut() {
            **guard = Arc::clone(&node);
        }
        // The node is new or was exclusive to `stage`, so stage + 1 never
        // holds it; with no stage after `stage`, every stage now agrees.
        let still_dirty = stage + 1 < self.stages.len();
        self.dirty.store(still_dirty, Ordering::Release);
        debug!("{}: wrote stage {} upstream", self.name, stage);
        Ok(())
    }

    /// Advance the pipeline by one step.
    ///
    /// Every stage after the first takes its upstream neighbour's page.
    /// Returns `true` if any stage changed. Pages no stage or reader holds
    /// any more are destroyed here.
    pub fn cycle(&self) -> bool {
        let mut guards: Vec<RwLockWriteGuard<'_, Arc<PageNode<T>>>> =
            self.stages.iter().map(|s| s.write()).collect();

        let mut changed = false;
        for i in (1..guards.len()).rev() {
            if !Arc::ptr_eq(&guards[i], &guards[i - 1]) {
                let upstream = Arc::clone(&guards[i - 1]);
                *guards[i] = upstream;
                changed = true;
            }
        }

        let still_dirty = guards.windows(2).any(|w| !Arc::ptr_eq(&w[0], &w[1]));
        self.dirty.store(still_dirty, Ordering::Release);
        trace!("{}: cycled (changed: {}, dirty: {})", self.name, changed, still_dirty);
        changed
    }

    /// Holders of the page `stage` sees
    pub fn ref_counts(&self, stage: usize) -> Result<RefCounts> {
        Ok(RefCounts::of(&self.stage(stage)?.read()))
    }

    /// Snapshot of cycler state
    pub fn stats(&self) -> CyclerStats {
        let nodes: Vec<Arc<PageNode<T>>> =
            self.stages.iter().map(|s| Arc::clone(&s.read())).collect();
        let mut distinct = 0;
        for (i, node) in nodes.iter().enumerate() {
            if !nodes[..i].iter().any(|seen| Arc::ptr_eq(seen, node)) {
                distinct += 1;
            }
        }

        CyclerStats {
            name: self.name.clone(),
            num_stages: nodes.len(),
            distinct_pages: distinct,
            dirty: self.is_dirty(),
        }
    }
}
