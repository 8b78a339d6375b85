//! Delivery dispatcher tests

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use sheetcast::deliver::{
    deliver_at, AnchorHandle, CleanupQueue, DeliveryHost, DeliveryStrategy, DiskHost, ANCHOR_ID,
};
use sheetcast::error::{SheetcastError, SheetcastResult};
use sheetcast::template::URI_PREFIX;
use sheetcast::types::RenderContext;
use std::collections::HashMap;
use tempfile::TempDir;

const FRAGMENT: &str = "<table border=\"1\"><thead></thead><tbody></tbody></table>";

fn ctx(title: &str, worksheet: &str) -> RenderContext {
    [("title", title), ("worksheet", worksheet)]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 9, 30, 3, 12, 4).unwrap()
}

/// Host double recording the full capability surface.
#[derive(Default)]
struct MockHost {
    blob_capable: bool,
    next_handle: u64,
    live_anchors: HashMap<u64, (String, String, String)>,
    clicked: Vec<u64>,
    removed: Vec<u64>,
    revoked: Vec<String>,
    saved: Vec<(String, Vec<u8>, &'static str)>,
}

impl MockHost {
    fn anchor_only() -> Self {
        Self::default()
    }

    fn blob_capable() -> Self {
        Self {
            blob_capable: true,
            ..Self::default()
        }
    }
}

impl DeliveryHost for MockHost {
    fn supports_blob_save(&self) -> bool {
        self.blob_capable
    }

    fn save_blob(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        mime: &'static str,
    ) -> SheetcastResult<()> {
        self.saved
            .push((file_name.to_string(), bytes.to_vec(), mime));
        Ok(())
    }

    fn attach_anchor(
        &mut self,
        id: &str,
        href: &str,
        download: &str,
    ) -> SheetcastResult<AnchorHandle> {
        self.next_handle += 1;
        self.live_anchors.insert(
            self.next_handle,
            (id.to_string(), href.to_string(), download.to_string()),
        );
        Ok(AnchorHandle(self.next_handle))
    }

    fn click(&mut self, anchor: AnchorHandle) -> SheetcastResult<()> {
        if !self.live_anchors.contains_key(&anchor.0) {
            return Err(SheetcastError::Delivery(format!(
                "click on detached anchor {}",
                anchor.0
            )));
        }
        self.clicked.push(anchor.0);
        Ok(())
    }

    fn remove_anchor(&mut self, anchor: AnchorHandle) {
        self.live_anchors.remove(&anchor.0);
        self.removed.push(anchor.0);
    }

    fn revoke_object_url(&mut self, key: &str) {
        self.revoked.push(key.to_string());
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// STRATEGY SELECTION
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_capability_probe_picks_the_strategy() {
    assert_eq!(
        DeliveryStrategy::select(&MockHost::blob_capable()),
        DeliveryStrategy::Blob
    );
    assert_eq!(
        DeliveryStrategy::select(&MockHost::anchor_only()),
        DeliveryStrategy::Anchor
    );
}

// ═══════════════════════════════════════════════════════════════════════════
// BLOB STRATEGY
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_blob_delivery_saves_under_the_generated_name() {
    let mut host = MockHost::blob_capable();
    let mut queue = CleanupQueue::new();

    deliver_at(
        &mut host,
        &mut queue,
        FRAGMENT,
        &ctx("lorem ipsum sit amet", "Orders"),
        fixed_now(),
        0,
    )
    .unwrap();

    assert_eq!(host.saved.len(), 1);
    let (file_name, bytes, mime) = &host.saved[0];
    assert_eq!(file_name, "LoremIpsumSitAmet_30_09_2016_031204.xls");
    assert_eq!(*mime, "application/vnd.ms-excel;charset=utf-8;");
    assert_eq!(&bytes[..3], [0xEF, 0xBB, 0xBF]);

    // No transient resources on the blob path.
    assert!(queue.is_empty());
    assert!(host.live_anchors.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// ANCHOR STRATEGY
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_anchor_delivery_attaches_clicks_then_defers_cleanup() {
    let mut host = MockHost::anchor_only();
    let mut queue = CleanupQueue::new();

    deliver_at(
        &mut host,
        &mut queue,
        FRAGMENT,
        &ctx("order export", "Orders"),
        fixed_now(),
        0,
    )
    .unwrap();

    // Synchronous effects: one live anchor, already clicked.
    assert_eq!(host.live_anchors.len(), 1);
    let (id, href, download) = host.live_anchors.values().next().unwrap();
    assert_eq!(id, ANCHOR_ID);
    assert!(href.starts_with(URI_PREFIX));
    assert_eq!(download, "OrderExport_30_09_2016_031204.xls");
    assert_eq!(host.clicked.len(), 1);

    // Cleanup has not run yet; it sits on the queue.
    assert_eq!(queue.len(), 1);
    assert!(host.removed.is_empty());
    assert!(host.revoked.is_empty());

    queue.run_pending(&mut host);

    assert!(host.live_anchors.is_empty());
    assert_eq!(host.removed.len(), 1);
    assert_eq!(host.revoked, vec!["order export".to_string()]);
    assert!(queue.is_empty());
}

#[test]
fn test_two_deliveries_are_independent_and_leak_nothing() {
    let mut host = MockHost::anchor_only();
    let mut queue = CleanupQueue::new();

    deliver_at(
        &mut host,
        &mut queue,
        FRAGMENT,
        &ctx("first", "Orders"),
        fixed_now(),
        0,
    )
    .unwrap();
    deliver_at(
        &mut host,
        &mut queue,
        FRAGMENT,
        &ctx("second", "Orders"),
        fixed_now(),
        0,
    )
    .unwrap();

    // Both transient anchors coexist until the deferred cleanups run.
    assert_eq!(host.live_anchors.len(), 2);
    assert_eq!(queue.len(), 2);

    queue.run_pending(&mut host);

    assert!(host.live_anchors.is_empty());
    assert_eq!(host.removed, vec![1, 2]);
    assert_eq!(host.revoked, vec!["first".to_string(), "second".to_string()]);
    assert!(queue.is_empty());
}

#[test]
fn test_missing_title_degrades_to_date_only_name() {
    let mut host = MockHost::anchor_only();
    let mut queue = CleanupQueue::new();

    let context: RenderContext = [("worksheet".to_string(), "Orders".to_string())]
        .into_iter()
        .collect();
    deliver_at(&mut host, &mut queue, FRAGMENT, &context, fixed_now(), 0).unwrap();

    let (_, _, download) = host.live_anchors.values().next().unwrap();
    assert_eq!(download, "_30_09_2016_031204.xls");
}

// ═══════════════════════════════════════════════════════════════════════════
// HOST FAILURES PROPAGATE
// ═══════════════════════════════════════════════════════════════════════════

struct FailingHost;

impl DeliveryHost for FailingHost {
    fn supports_blob_save(&self) -> bool {
        true
    }
    fn save_blob(&mut self, _: &str, _: &[u8], _: &'static str) -> SheetcastResult<()> {
        Err(SheetcastError::Delivery("save dialog rejected".to_string()))
    }
    fn attach_anchor(&mut self, _: &str, _: &str, _: &str) -> SheetcastResult<AnchorHandle> {
        unreachable!("blob-capable host never attaches anchors")
    }
    fn click(&mut self, _: AnchorHandle) -> SheetcastResult<()> {
        unreachable!("blob-capable host never clicks anchors")
    }
    fn remove_anchor(&mut self, _: AnchorHandle) {}
    fn revoke_object_url(&mut self, _: &str) {}
}

#[test]
fn test_platform_failure_is_not_caught() {
    let mut queue = CleanupQueue::new();
    let result = deliver_at(
        &mut FailingHost,
        &mut queue,
        FRAGMENT,
        &ctx("x", "Orders"),
        fixed_now(),
        0,
    );

    assert!(matches!(result, Err(SheetcastError::Delivery(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// DISK HOST
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_disk_host_writes_the_document() {
    let dir = TempDir::new().unwrap();
    let mut host = DiskHost::new(dir.path());
    let mut queue = CleanupQueue::new();

    deliver_at(
        &mut host,
        &mut queue,
        FRAGMENT,
        &ctx("lorem ipsum sit amet", "Orders"),
        fixed_now(),
        0,
    )
    .unwrap();

    let expected = dir.path().join("LoremIpsumSitAmet_30_09_2016_031204.xls");
    assert_eq!(host.saved_files(), &[expected.clone()]);
    assert!(expected.exists());

    let content = std::fs::read_to_string(&expected).unwrap();
    assert!(content.starts_with('\u{feff}'));
    assert!(content.contains("<x:Name>Orders</x:Name>"));
    assert!(content.ends_with(FRAGMENT));
}

#[test]
fn test_disk_host_into_missing_directory_fails() {
    let mut host = DiskHost::new("/nonexistent/dir");
    let mut queue = CleanupQueue::new();

    let result = deliver_at(
        &mut host,
        &mut queue,
        FRAGMENT,
        &ctx("x", "Orders"),
        fixed_now(),
        0,
    );

    assert!(matches!(result, Err(SheetcastError::Io(_))));
}
