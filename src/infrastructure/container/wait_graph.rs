//! 构建等待图
//!
//! Records which resolution is building each `Shared` key and which key every
//! blocked resolution is waiting for. Waiting on a key whose builder is
//! (transitively) waiting on the caller, or is suspended further down the
//! caller's own thread, would never wake up; that wait is reported as a cycle.

use super::key::CapabilityKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

pub(crate) type ResolutionId = u64;

#[derive(Debug, Clone, Copy)]
struct Builder {
    resolution: ResolutionId,
    thread: ThreadId,
}

#[derive(Debug, Default)]
struct Graph {
    builders: HashMap<CapabilityKey, Builder>,
    waiting: HashMap<ResolutionId, CapabilityKey>,
}

impl Graph {
    /// Keys of the loop a wait for `key` would close, if any
    fn cycle_through(
        &self,
        resolution: ResolutionId,
        key: &CapabilityKey,
        stack: &[CapabilityKey],
    ) -> Option<Vec<CapabilityKey>> {
        let current = thread::current().id();
        let mut chain = vec![key.clone()];
        let mut next = key.clone();

        for _ in 0..=self.waiting.len() {
            let builder = self.builders.get(&next)?;
            if builder.thread == current {
                let mut cycle = match stack.iter().position(|entry| *entry == next) {
                    Some(start) if builder.resolution == resolution => stack[start..].to_vec(),
                    _ => {
                        let mut outer = vec![next.clone()];
                        outer.extend_from_slice(stack);
                        outer
                    }
                };
                cycle.extend(chain);
                return Some(cycle);
            }
            next = self.waiting.get(&builder.resolution)?.clone();
            chain.push(next.clone());
        }
        None
    }
}

#[derive(Debug, Default)]
pub(crate) struct WaitGraph {
    graph: Mutex<Graph>,
    next_resolution: AtomicU64,
}

impl WaitGraph {
    pub(crate) fn next_resolution(&self) -> ResolutionId {
        self.next_resolution.fetch_add(1, Ordering::Relaxed)
    }

    /// Announce that `resolution` may block on `key`.
    ///
    /// Check and registration happen under one lock, so of two resolutions
    /// closing the same loop at least one sees it. The error carries the loop.
    pub(crate) fn wait_for(
        &self,
        resolution: ResolutionId,
        key: &CapabilityKey,
        stack: &[CapabilityKey],
    ) -> Result<WaitGuard<'_>, Vec<CapabilityKey>> {
        let mut graph = self.graph.lock();
        if let Some(cycle) = graph.cycle_through(resolution, key, stack) {
            return Err(cycle);
        }
        graph.waiting.insert(resolution, key.clone());
        Ok(WaitGuard {
            graph: self,
            resolution,
            key: key.clone(),
        })
    }

    /// Record that `resolution` is now building `key` rather than waiting for it
    pub(crate) fn building(&self, resolution: ResolutionId, key: &CapabilityKey) -> BuildGuard<'_> {
        let mut graph = self.graph.lock();
        graph.waiting.remove(&resolution);
        graph.builders.insert(
            key.clone(),
            Builder {
                resolution,
                thread: thread::current().id(),
            },
        );
        BuildGuard {
            graph: self,
            key: key.clone(),
        }
    }
}

pub(crate) struct WaitGuard<'g> {
    graph: &'g WaitGraph,
    resolution: ResolutionId,
    key: CapabilityKey,
}

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        let mut graph = self.graph.graph.lock();
        if graph.waiting.get(&self.resolution) == Some(&self.key) {
            graph.waiting.remove(&self.resolution);
        }
    }
}

pub(crate) struct BuildGuard<'g> {
    graph: &'g WaitGraph,
    key: CapabilityKey,
}

impl Drop for BuildGuard<'_> {
    fn drop(&mut self) {
        self.graph.graph.lock().builders.remove(&self.key);
    }
}
