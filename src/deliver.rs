//! Payload delivery.
//!
//! Hands an encoded document to the host environment, choosing between two
//! strategies by capability probe: a native save-or-open-blob primitive
//! when the host has one, otherwise a synthetic anchor-click download bound
//! to a data URI. Anchor deliveries leave a transient element and a
//! temporary object URL behind; their removal is deferred onto a
//! [`CleanupQueue`] so it runs only after the click's synchronous effects,
//! on the host's next tick.

use crate::error::{SheetcastError, SheetcastResult};
use crate::naming::generate_file_name;
use crate::template;
use crate::types::{Payload, RenderContext, TargetEncoding};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Identifier given to the transient download anchor.
pub const ANCHOR_ID: &str = "xlsButton";

/// Handle to a transient download-trigger element owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorHandle(pub u64);

/// Platform capability surface consumed by the dispatcher.
///
/// Exactly one of the two strategies is exercised per delivery: a
/// blob-capable host only sees `save_blob`, the rest of the surface exists
/// for hosts that deliver through a transient anchor element.
pub trait DeliveryHost {
    /// Native "save or open blob" capability probe.
    fn supports_blob_save(&self) -> bool;

    /// Save a byte payload under the given file name.
    fn save_blob(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        mime: &'static str,
    ) -> SheetcastResult<()>;

    /// Attach an invisible download anchor bound to `href` and return its
    /// handle.
    fn attach_anchor(&mut self, id: &str, href: &str, download: &str)
        -> SheetcastResult<AnchorHandle>;

    /// Programmatically activate a previously attached anchor.
    fn click(&mut self, anchor: AnchorHandle) -> SheetcastResult<()>;

    /// Remove a transient anchor.
    fn remove_anchor(&mut self, anchor: AnchorHandle);

    /// Release the temporary object URL registered under `key`.
    fn revoke_object_url(&mut self, key: &str);
}

type CleanupTask = Box<dyn FnOnce(&mut dyn DeliveryHost)>;

/// FIFO of deferred cleanup tasks.
///
/// Tasks queued during a delivery run strictly after the triggering action's
/// synchronous effects, when the host drains the queue on its next tick.
/// Concurrent deliveries queue independent tasks; each cleans up only its
/// own anchor and object URL.
#[derive(Default)]
pub struct CleanupQueue {
    tasks: Vec<CleanupTask>,
}

impl CleanupQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a task for the next drain.
    pub fn defer(&mut self, task: impl FnOnce(&mut dyn DeliveryHost) + 'static) {
        self.tasks.push(Box::new(task));
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Drain and run every pending task in queueing order.
    pub fn run_pending(&mut self, host: &mut dyn DeliveryHost) {
        let tasks = std::mem::take(&mut self.tasks);
        debug!(tasks = tasks.len(), "running deferred cleanup");
        for task in tasks {
            task(host);
        }
    }
}

/// Delivery strategy, chosen by capability probe at call time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStrategy {
    /// Native save-or-open-blob primitive.
    Blob,
    /// Synthetic anchor-click download of a data URI.
    Anchor,
}

impl DeliveryStrategy {
    pub fn select(host: &dyn DeliveryHost) -> Self {
        if host.supports_blob_save() {
            Self::Blob
        } else {
            Self::Anchor
        }
    }

    fn target_encoding(self) -> TargetEncoding {
        match self {
            Self::Blob => TargetEncoding::Blob,
            Self::Anchor => TargetEncoding::DataUri,
        }
    }
}

/// Encode `custom_template` with `ctx` and hand the result to the host
/// under a name generated from the context's `title`.
///
/// Host failures are not caught here; they propagate to whatever error
/// boundary the surrounding application provides.
pub fn deliver(
    host: &mut dyn DeliveryHost,
    queue: &mut CleanupQueue,
    custom_template: &str,
    ctx: &RenderContext,
    utc_offset_minutes: i32,
) -> SheetcastResult<()> {
    deliver_at(
        host,
        queue,
        custom_template,
        ctx,
        Utc::now(),
        utc_offset_minutes,
    )
}

/// [`deliver`] with an explicit timestamp, for deterministic file names.
pub fn deliver_at(
    host: &mut dyn DeliveryHost,
    queue: &mut CleanupQueue,
    custom_template: &str,
    ctx: &RenderContext,
    now: DateTime<Utc>,
    utc_offset_minutes: i32,
) -> SheetcastResult<()> {
    let title = ctx.get("title").map(String::as_str).unwrap_or_default();
    let file_name = generate_file_name(title, now, utc_offset_minutes);
    let strategy = DeliveryStrategy::select(host);
    debug!(?strategy, %file_name, "delivering document");

    match template::encode(custom_template, ctx, strategy.target_encoding()) {
        Payload::Blob { bytes, mime } => host.save_blob(&file_name, &bytes, mime),
        Payload::DataUri(uri) => {
            let anchor = host.attach_anchor(ANCHOR_ID, &uri, &file_name)?;
            host.click(anchor)?;

            // The object URL is registered under the document title, so
            // revocation is keyed by title rather than by href.
            let title = title.to_string();
            queue.defer(move |host| {
                host.remove_anchor(anchor);
                host.revoke_object_url(&title);
            });
            Ok(())
        }
    }
}

/// Disk-backed host: exposes the native blob-save capability and writes
/// delivered documents into a target directory.
pub struct DiskHost {
    out_dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DiskHost {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            saved: Vec::new(),
        }
    }

    /// Paths written by this host, in delivery order.
    pub fn saved_files(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl DeliveryHost for DiskHost {
    fn supports_blob_save(&self) -> bool {
        true
    }

    fn save_blob(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        _mime: &'static str,
    ) -> SheetcastResult<()> {
        let path = self.out_dir.join(file_name);
        fs::write(&path, bytes)?;
        debug!(path = %path.display(), "saved blob");
        self.saved.push(path);
        Ok(())
    }

    fn attach_anchor(
        &mut self,
        _id: &str,
        _href: &str,
        _download: &str,
    ) -> SheetcastResult<AnchorHandle> {
        Err(SheetcastError::Delivery(
            "disk host has no anchor surface".to_string(),
        ))
    }

    fn click(&mut self, _anchor: AnchorHandle) -> SheetcastResult<()> {
        Err(SheetcastError::Delivery(
            "disk host has no anchor surface".to_string(),
        ))
    }

    fn remove_anchor(&mut self, _anchor: AnchorHandle) {}

    fn revoke_object_url(&mut self, _key: &str) {}
}
