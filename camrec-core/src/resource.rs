//! Scoped resource management for camrec
//!
//! Capture streams, recorders and object URLs are host resources that must
//! be given back: a stream keeps the camera light on, an object URL pins the
//! recording in memory. Each one is held in a [`Lease`] which releases it
//! exactly once, either explicitly or when the lease drops. A shared
//! [`ResourceTracker`] counts the leases that are still live.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Kinds of host resources held by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Live camera stream
    CaptureStream,
    /// Media recorder bound to a stream
    Recorder,
    /// Temporary object URL pointing at a recording
    ObjectUrl,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::CaptureStream => "capture_stream",
            ResourceKind::Recorder => "recorder",
            ResourceKind::ObjectUrl => "object_url",
        };
        f.write_str(name)
    }
}

/// A host resource that has to be given back when no longer needed
pub trait Release {
    /// Resource kind, used for accounting and logs
    fn kind(&self) -> ResourceKind;

    /// Give the resource back to the host.
    ///
    /// Called at most once per lease.
    fn release(&mut self);
}

/// Number of live leases per resource kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    /// Live capture streams
    pub capture_streams: u32,
    /// Live recorders
    pub recorders: u32,
    /// Live object URLs
    pub object_urls: u32,
}

impl ResourceUsage {
    /// Total number of live leases
    pub fn total(&self) -> u32 {
        self.capture_streams + self.recorders + self.object_urls
    }

    fn slot(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::CaptureStream => &mut self.capture_streams,
            ResourceKind::Recorder => &mut self.recorders,
            ResourceKind::ObjectUrl => &mut self.object_urls,
        }
    }
}

/// Counts live leases; cheap to clone, clones share the counters
#[derive(Debug, Clone, Default)]
pub struct ResourceTracker {
    usage: Arc<Mutex<ResourceUsage>>,
}

impl ResourceTracker {
    /// Create a tracker with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current counters
    pub fn usage(&self) -> ResourceUsage {
        *self.usage.lock()
    }

    fn acquired(&self, kind: ResourceKind) {
        *self.usage.lock().slot(kind) += 1;
    }

    fn released(&self, kind: ResourceKind) {
        let mut usage = self.usage.lock();
        let slot = usage.slot(kind);
        *slot = slot.saturating_sub(1);
    }
}

/// Owns a host resource and releases it exactly once
pub struct Lease<R: Release> {
    id: Uuid,
    resource: Option<R>,
    acquired_at: DateTime<Utc>,
    tracker: ResourceTracker,
}

impl<R: Release> Lease<R> {
    /// Take ownership of `resource`, counting it against `tracker`
    pub fn new(resource: R, tracker: &ResourceTracker) -> Self {
        let id = Uuid::new_v4();
        let kind = resource.kind();
        tracker.acquired(kind);
        debug!(lease = %id, %kind, "Resource acquired");

        Self {
            id,
            resource: Some(resource),
            acquired_at: Utc::now(),
            tracker: tracker.clone(),
        }
    }

    /// Lease identifier
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// When the resource was acquired
    pub fn acquired_at(&self) -> DateTime<Utc> {
        self.acquired_at
    }

    /// Release the resource now instead of at drop
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(mut resource) = self.resource.take() {
            let kind = resource.kind();
            resource.release();
            self.tracker.released(kind);
            debug!(lease = %self.id, %kind, "Resource released");
        }
    }
}

impl<R: Release> Deref for Lease<R> {
    type Target = R;

    fn deref(&self) -> &R {
        // Only `release_inner` empties the slot, and it consumes or drops the lease.
        match self.resource.as_ref() {
            Some(resource) => resource,
            None => unreachable!("lease accessed after release"),
        }
    }
}

impl<R: Release> DerefMut for Lease<R> {
    fn deref_mut(&mut self) -> &mut R {
        match self.resource.as_mut() {
            Some(resource) => resource,
            None => unreachable!("lease accessed after release"),
        }
    }
}

impl<R: Release> Drop for Lease<R> {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl<R: Release + fmt::Debug> fmt::Debug for Lease<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .field("acquired_at", &self.acquired_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Counted {
        kind: ResourceKind,
        releases: Arc<AtomicU32>,
    }

    impl Release for Counted {
        fn kind(&self) -> ResourceKind {
            self.kind
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counted(kind: ResourceKind) -> (Counted, Arc<AtomicU32>) {
        let releases = Arc::new(AtomicU32::new(0));
        (
            Counted {
                kind,
                releases: releases.clone(),
            },
            releases,
        )
    }

    #[test]
    fn test_lease_releases_on_drop() {
        let tracker = ResourceTracker::new();
        let (resource, releases) = counted(ResourceKind::CaptureStream);

        {
            let _lease = Lease::new(resource, &tracker);
            assert_eq!(tracker.usage().capture_streams, 1);
        }

        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.usage(), ResourceUsage::default());
    }

    #[test]
    fn test_explicit_release_happens_once() {
        let tracker = ResourceTracker::new();
        let (resource, releases) = counted(ResourceKind::ObjectUrl);

        let lease = Lease::new(resource, &tracker);
        assert_eq!(tracker.usage().object_urls, 1);
        lease.release();

        assert_eq!(releases.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.usage().total(), 0);
    }

    #[test]
    fn test_tracker_counts_per_kind() {
        let tracker = ResourceTracker::new();
        let (stream, _) = counted(ResourceKind::CaptureStream);
        let (recorder, _) = counted(ResourceKind::Recorder);
        let (url, _) = counted(ResourceKind::ObjectUrl);

        let leases = (
            Lease::new(stream, &tracker),
            Lease::new(recorder, &tracker),
            Lease::new(url, &tracker),
        );

        let usage = tracker.usage();
        assert_eq!(usage.capture_streams, 1);
        assert_eq!(usage.recorders, 1);
        assert_eq!(usage.object_urls, 1);
        assert_eq!(usage.total(), 3);

        drop(leases);
        assert_eq!(tracker.usage().total(), 0);
    }

    #[test]
    fn test_lease_derefs_to_resource() {
        let tracker = ResourceTracker::new();
        let (resource, _) = counted(ResourceKind::Recorder);
        let lease = Lease::new(resource, &tracker);

        assert_eq!(lease.kind(), ResourceKind::Recorder);
        assert!(lease.acquired_at() <= Utc::now());
    }
}
