//! Pipeline orchestration

use crate::backend::{CaptureBackend, CaptureRequest};
use crate::inputs::fingerprint_inputs;
use moka::future::Cache;
use parking_lot::Mutex;
use reportsmith_artifact::status::validate_transition;
use reportsmith_artifact::{ArtifactKind, ArtifactStatus, Fingerprint, Raster};
use reportsmith_bus::{BusEvent, NotificationBus, Subscription, Topic};
use reportsmith_state::DocumentState;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Pipeline tuning
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Wait after a triggering change before capturing, so layout and paint
    /// settle; latency deliberately traded for correctness
    pub settle_delay: Duration,
    /// Entries kept in the fingerprint-to-raster reuse cache
    pub cache_capacity: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(250),
            cache_capacity: 32,
        }
    }
}

impl PipelineConfig {
    /// Override the settle delay
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}

struct Slot {
    status: ArtifactStatus,
    /// Last good raster; retained across failed passes
    raster: Option<Raster>,
    /// Fingerprint the raster was produced from
    fingerprint: Option<Fingerprint>,
    in_flight: bool,
    rerun_pending: bool,
}

impl Slot {
    fn new() -> Self {
        Self {
            status: ArtifactStatus::Missing,
            raster: None,
            fingerprint: None,
            in_flight: false,
            rerun_pending: false,
        }
    }
}

struct SlotHandle {
    slot: Mutex<Slot>,
    /// (status, busy) — busy covers an in-flight pass or a coalesced rerun
    report: watch::Sender<(ArtifactStatus, bool)>,
}

struct PipelineInner {
    state: Arc<DocumentState>,
    bus: Arc<NotificationBus>,
    backend: Arc<dyn CaptureBackend>,
    config: PipelineConfig,
    cache: Cache<Fingerprint, Raster>,
    runtime: tokio::runtime::Handle,
    slots: HashMap<ArtifactKind, SlotHandle>,
}

impl PipelineInner {
    fn handle(&self, kind: ArtifactKind) -> &SlotHandle {
        self.slots.get(&kind).expect("slot exists for every kind")
    }

    fn report(&self, kind: ArtifactKind) {
        let handle = self.handle(kind);
        let (status, busy) = {
            let slot = handle.slot.lock();
            (slot.status, slot.in_flight || slot.rerun_pending)
        };
        handle.report.send_replace((status, busy));
    }

    fn set_status(&self, kind: ArtifactKind, to: ArtifactStatus) {
        {
            let mut slot = self.handle(kind).slot.lock();
            if let Err(e) = validate_transition(slot.status, to) {
                tracing::error!(%kind, error = %e, "unexpected status transition");
            }
            slot.status = to;
        }
        self.report(kind);
    }

    /// Ready -> Stale on input change; other statuses are left for the
    /// running or upcoming pass to resolve
    fn mark_stale(&self, kind: ArtifactKind) {
        let changed = {
            let mut slot = self.handle(kind).slot.lock();
            if slot.status == ArtifactStatus::Ready {
                slot.status = ArtifactStatus::Stale;
                true
            } else {
                false
            }
        };
        if changed {
            self.report(kind);
        }
    }

    /// Start a pass, or coalesce into the one already in flight
    fn schedule(self: &Arc<Self>, kind: ArtifactKind) {
        {
            let mut slot = self.handle(kind).slot.lock();
            if slot.in_flight {
                slot.rerun_pending = true;
                drop(slot);
                self.report(kind);
                tracing::debug!(%kind, "regeneration coalesced into in-flight pass");
                return;
            }
            slot.in_flight = true;
        }
        self.report(kind);
        let inner = Arc::clone(self);
        self.runtime.spawn(async move { inner.run_passes(kind).await });
    }

    async fn run_passes(self: Arc<Self>, kind: ArtifactKind) {
        loop {
            // A ready artifact reaches Generating only through Stale.
            {
                let mut slot = self.handle(kind).slot.lock();
                if slot.status == ArtifactStatus::Ready {
                    slot.status = ArtifactStatus::Stale;
                }
            }
            self.set_status(kind, ArtifactStatus::Generating);
            tokio::time::sleep(self.config.settle_delay).await;
            self.run_single_pass(kind).await;

            let rerun = {
                let mut slot = self.handle(kind).slot.lock();
                if slot.rerun_pending {
                    slot.rerun_pending = false;
                    true
                } else {
                    slot.in_flight = false;
                    false
                }
            };
            self.report(kind);
            if !rerun {
                break;
            }
        }
    }

    async fn run_single_pass(&self, kind: ArtifactKind) {
        let snapshot = self.state.snapshot();
        let chart = match kind {
            ArtifactKind::Preview => self.state.chart_raster(),
            ArtifactKind::Chart => None,
        };

        let fp = match fingerprint_inputs(kind, &snapshot, chart.as_ref()) {
            Ok(fp) => fp,
            Err(e) => {
                self.fail(kind, &e.to_string());
                return;
            }
        };

        let already_current = {
            let slot = self.handle(kind).slot.lock();
            slot.fingerprint == Some(fp) && slot.raster.is_some()
        };
        if already_current {
            tracing::debug!(%kind, fingerprint = %fp.short(), "inputs unchanged, keeping raster");
            self.set_status(kind, ArtifactStatus::Ready);
            return;
        }

        if let Some(raster) = self.cache.get(&fp).await {
            tracing::debug!(%kind, fingerprint = %fp.short(), "raster reused from cache");
            self.install(kind, fp, raster);
            return;
        }

        let request = CaptureRequest {
            kind,
            snapshot,
            chart,
        };
        match self.backend.capture(request).await {
            Ok(raster) => {
                self.cache.insert(fp, raster.clone()).await;
                self.install(kind, fp, raster);
            }
            Err(e) => self.fail(kind, &e.to_string()),
        }
    }

    fn install(&self, kind: ArtifactKind, fp: Fingerprint, raster: Raster) {
        {
            let mut slot = self.handle(kind).slot.lock();
            slot.raster = Some(raster.clone());
            slot.fingerprint = Some(fp);
            slot.status = ArtifactStatus::Ready;
        }
        self.report(kind);
        if kind == ArtifactKind::Chart {
            // Publishes FieldChanged(ChartRaster), which invalidates the preview.
            self.state.set_chart_raster(Some(raster));
        }
        tracing::info!(%kind, fingerprint = %fp.short(), "artifact ready");
        self.bus.publish(&BusEvent::ArtifactReady { kind });
    }

    fn fail(&self, kind: ArtifactKind, reason: &str) {
        self.set_status(kind, ArtifactStatus::Failed);
        tracing::warn!(%kind, reason, "artifact capture failed, last good raster retained");
        self.bus.publish(&BusEvent::ArtifactFailed {
            kind,
            reason: reason.to_string(),
        });
    }
}

/// Owns regenerate-versus-reuse decisions for every derived artifact
///
/// # Guarantees
/// - At most one capture pass per artifact is in flight; a request arriving
///   mid-pass triggers exactly one follow-up pass, never an unbounded queue
/// - An artifact whose recomputed fingerprint matches its stored one is
///   never regenerated
/// - A failed pass keeps the last good raster; retry is explicit or rides
///   the next qualifying change
pub struct ArtifactPipeline {
    inner: Arc<PipelineInner>,
    _field_sub: Subscription,
    _regen_sub: Subscription,
}

impl ArtifactPipeline {
    /// Wire the pipeline to canonical state and the bus
    ///
    /// Must be called inside a tokio runtime; capture passes are spawned on
    /// it. Subscriptions live as long as the pipeline.
    #[must_use]
    pub fn new(
        state: Arc<DocumentState>,
        bus: Arc<NotificationBus>,
        backend: Arc<dyn CaptureBackend>,
        config: PipelineConfig,
    ) -> Self {
        let slots = ArtifactKind::ALL
            .iter()
            .map(|&kind| {
                (
                    kind,
                    SlotHandle {
                        slot: Mutex::new(Slot::new()),
                        report: watch::Sender::new((ArtifactStatus::Missing, false)),
                    },
                )
            })
            .collect();

        let inner = Arc::new(PipelineInner {
            state,
            bus: Arc::clone(&bus),
            backend,
            config,
            cache: Cache::new(config.cache_capacity),
            runtime: tokio::runtime::Handle::current(),
            slots,
        });

        // A change to a declared input marks the artifact stale and
        // announces that regeneration is needed...
        let field_sub = {
            let inner = Arc::clone(&inner);
            let publisher = Arc::clone(&bus);
            bus.subscribe(Topic::FieldChanged, move |event| {
                if let BusEvent::FieldChanged { field } = event {
                    for kind in ArtifactKind::ALL {
                        if kind.depends_on(*field) {
                            inner.mark_stale(kind);
                            publisher.publish(&BusEvent::RegenerationNeeded { kind });
                        }
                    }
                }
                Ok(())
            })
        };

        // ...and the announcement, from us or from a collaborator, is what
        // actually enqueues a pass.
        let regen_sub = {
            let inner = Arc::clone(&inner);
            bus.subscribe(Topic::RegenerationNeeded, move |event| {
                if let BusEvent::RegenerationNeeded { kind } = event {
                    inner.schedule(*kind);
                }
                Ok(())
            })
        };

        Self {
            inner,
            _field_sub: field_sub,
            _regen_sub: regen_sub,
        }
    }

    /// Current status of `kind`
    #[must_use]
    pub fn status(&self, kind: ArtifactKind) -> ArtifactStatus {
        self.inner.handle(kind).slot.lock().status
    }

    /// Last good raster of `kind`, if any
    #[must_use]
    pub fn raster(&self, kind: ArtifactKind) -> Option<Raster> {
        self.inner.handle(kind).slot.lock().raster.clone()
    }

    /// Fingerprint the stored raster was produced from
    #[must_use]
    pub fn fingerprint(&self, kind: ArtifactKind) -> Option<Fingerprint> {
        self.inner.handle(kind).slot.lock().fingerprint
    }

    /// Lazily generate `kind` if it is missing, stale, or failed
    ///
    /// A ready artifact whose fingerprint still matches is left untouched.
    pub fn ensure_ready(&self, kind: ArtifactKind) {
        let inner = &self.inner;
        let snapshot = inner.state.snapshot();
        let chart = match kind {
            ArtifactKind::Preview => inner.state.chart_raster(),
            ArtifactKind::Chart => None,
        };
        let fp = fingerprint_inputs(kind, &snapshot, chart.as_ref()).ok();

        {
            let mut slot = inner.handle(kind).slot.lock();
            let current = fp.is_some() && slot.fingerprint == fp && slot.raster.is_some();
            if slot.status == ArtifactStatus::Ready {
                if current {
                    return;
                }
                slot.status = ArtifactStatus::Stale;
            }
        }
        inner.report(kind);
        inner.schedule(kind);
    }

    /// Explicit retry after a failed pass
    pub fn retry(&self, kind: ArtifactKind) {
        tracing::info!(%kind, "manual artifact retry");
        self.inner.schedule(kind);
    }

    /// Wait until no pass is running or pending for `kind`
    ///
    /// Returns the settled status: `Ready`, `Failed`, or `Missing` when
    /// nothing was ever scheduled.
    pub async fn wait_settled(&self, kind: ArtifactKind) -> ArtifactStatus {
        let mut rx = self.inner.handle(kind).report.subscribe();
        loop {
            let (status, busy) = *rx.borrow_and_update();
            if !busy && status != ArtifactStatus::Generating {
                return status;
            }
            if rx.changed().await.is_err() {
                return status;
            }
        }
    }
}

impl std::fmt::Debug for ArtifactPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ArtifactPipeline");
        for kind in ArtifactKind::ALL {
            s.field(&kind.to_string(), &self.status(kind));
        }
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::backend::CaptureError;
    use reportsmith_model::{ClientRef, MetricsPatch, RgbColor, ThemePatch};
    use reportsmith_store::{DurableStore, FieldConfig, MemoryStore};
    use std::collections::HashSet;

    #[derive(Default)]
    struct ScriptedBackend {
        counts: Mutex<HashMap<ArtifactKind, usize>>,
        failing: Mutex<HashSet<ArtifactKind>>,
    }

    impl ScriptedBackend {
        fn captures(&self, kind: ArtifactKind) -> usize {
            *self.counts.lock().get(&kind).unwrap_or(&0)
        }

        fn set_failing(&self, kind: ArtifactKind, failing: bool) {
            if failing {
                self.failing.lock().insert(kind);
            } else {
                self.failing.lock().remove(&kind);
            }
        }
    }

    #[async_trait]
    impl CaptureBackend for ScriptedBackend {
        async fn capture(&self, request: CaptureRequest) -> Result<Raster, CaptureError> {
            *self.counts.lock().entry(request.kind).or_default() += 1;
            if self.failing.lock().contains(&request.kind) {
                return Err(CaptureError::TargetNotMounted { kind: request.kind });
            }
            let shade = self.captures(request.kind) as u8;
            Ok(Raster::filled(8, 12, [shade, shade, shade, 255]))
        }
    }

    struct Fixture {
        state: Arc<DocumentState>,
        bus: Arc<NotificationBus>,
        backend: Arc<ScriptedBackend>,
        pipeline: ArtifactPipeline,
    }

    fn fixture() -> Fixture {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let bus = Arc::new(NotificationBus::new());
        let state = Arc::new(DocumentState::open(
            &store,
            Arc::clone(&bus),
            FieldConfig::default(),
        ));
        let backend = Arc::new(ScriptedBackend::default());
        let pipeline = ArtifactPipeline::new(
            Arc::clone(&state),
            Arc::clone(&bus),
            Arc::clone(&backend) as Arc<dyn CaptureBackend>,
            PipelineConfig::default(),
        );
        Fixture {
            state,
            bus,
            backend,
            pipeline,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn chart_goes_missing_generating_ready() {
        let fx = fixture();
        assert_eq!(fx.pipeline.status(ArtifactKind::Chart), ArtifactStatus::Missing);

        fx.state.apply_metrics(MetricsPatch::cameras(12));
        let settled = fx.pipeline.wait_settled(ArtifactKind::Chart).await;

        assert_eq!(settled, ArtifactStatus::Ready);
        assert_eq!(fx.backend.captures(ArtifactKind::Chart), 1);
        assert!(fx.pipeline.raster(ArtifactKind::Chart).is_some());
        assert!(fx.pipeline.fingerprint(ArtifactKind::Chart).is_some());
        // The chart lands in canonical state for the preview to embed.
        assert!(fx.state.chart_raster().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn theme_change_regenerates_chart_with_new_fingerprint() {
        let fx = fixture();
        fx.state.apply_metrics(MetricsPatch::cameras(12));
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        let first = fx.pipeline.fingerprint(ArtifactKind::Chart).unwrap();

        fx.state.apply_theme(ThemePatch::accent(RgbColor::new(0, 128, 255)));
        let settled = fx.pipeline.wait_settled(ArtifactKind::Chart).await;

        assert_eq!(settled, ArtifactStatus::Ready);
        let second = fx.pipeline.fingerprint(ArtifactKind::Chart).unwrap();
        assert_ne!(first, second);
        assert_eq!(fx.backend.captures(ArtifactKind::Chart), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn undeclared_fields_do_not_touch_the_chart() {
        let fx = fixture();
        fx.state.apply_metrics(MetricsPatch::cameras(12));
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        let fingerprint = fx.pipeline.fingerprint(ArtifactKind::Chart);

        fx.state.select_client(ClientRef::new("Acme"));
        fx.state.set_notes("client and entries are not chart inputs");
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        fx.pipeline.wait_settled(ArtifactKind::Preview).await;

        // select_client reseeds metrics+theme, so one regeneration is
        // expected from the reseed — but notes alone add nothing.
        let captures_after_reseed = fx.backend.captures(ArtifactKind::Chart);
        fx.state.set_notes("still not a chart input");
        fx.pipeline.wait_settled(ArtifactKind::Preview).await;
        assert_eq!(fx.backend.captures(ArtifactKind::Chart), captures_after_reseed);
        assert!(fingerprint.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn unchanged_inputs_never_recapture() {
        let fx = fixture();
        fx.state.apply_metrics(MetricsPatch::cameras(12));
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        assert_eq!(fx.backend.captures(ArtifactKind::Chart), 1);

        // Publishes FieldChanged(Metrics) without changing the value.
        fx.state.apply_metrics(MetricsPatch::default());
        let settled = fx.pipeline.wait_settled(ArtifactKind::Chart).await;

        assert_eq!(settled, ArtifactStatus::Ready);
        assert_eq!(fx.backend.captures(ArtifactKind::Chart), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_coalesce_into_bounded_passes() {
        let fx = fixture();
        for cameras in 1..=10 {
            fx.state.apply_metrics(MetricsPatch::cameras(cameras));
        }
        let settled = fx.pipeline.wait_settled(ArtifactKind::Chart).await;

        assert_eq!(settled, ArtifactStatus::Ready);
        // The burst lands before the settle delay elapses, so the single
        // in-flight pass sees the final value; the coalesced follow-up
        // skips on fingerprint match.
        assert_eq!(fx.backend.captures(ArtifactKind::Chart), 1);
        assert_eq!(fx.state.metrics().total_cameras, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_capture_retains_last_raster_and_recovers_on_retry() {
        let fx = fixture();
        let failures = Arc::new(Mutex::new(Vec::new()));
        let _sub = {
            let failures = Arc::clone(&failures);
            fx.bus.subscribe(Topic::ArtifactFailed, move |event| {
                if let BusEvent::ArtifactFailed { kind, reason } = event {
                    failures.lock().push((*kind, reason.clone()));
                }
                Ok(())
            })
        };

        fx.state.apply_metrics(MetricsPatch::cameras(3));
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        let good_raster = fx.pipeline.raster(ArtifactKind::Chart).unwrap();

        fx.backend.set_failing(ArtifactKind::Chart, true);
        fx.state.apply_metrics(MetricsPatch::cameras(4));
        let settled = fx.pipeline.wait_settled(ArtifactKind::Chart).await;

        assert_eq!(settled, ArtifactStatus::Failed);
        assert_eq!(fx.pipeline.raster(ArtifactKind::Chart), Some(good_raster));
        assert!(failures
            .lock()
            .iter()
            .any(|(kind, reason)| *kind == ArtifactKind::Chart && reason.contains("not mounted")));

        fx.backend.set_failing(ArtifactKind::Chart, false);
        fx.pipeline.retry(ArtifactKind::Chart);
        let recovered = fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        assert_eq!(recovered, ArtifactStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn revisited_fingerprint_reuses_cached_raster() {
        let fx = fixture();
        fx.state.apply_metrics(MetricsPatch::cameras(5));
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        fx.state.apply_metrics(MetricsPatch::cameras(6));
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        assert_eq!(fx.backend.captures(ArtifactKind::Chart), 2);

        // Back to a fingerprint the cache has seen.
        fx.state.apply_metrics(MetricsPatch::cameras(5));
        let settled = fx.pipeline.wait_settled(ArtifactKind::Chart).await;

        assert_eq!(settled, ArtifactStatus::Ready);
        assert_eq!(fx.backend.captures(ArtifactKind::Chart), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn chart_completion_invalidates_preview() {
        let fx = fixture();
        fx.state.apply_metrics(MetricsPatch::cameras(7));
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        let settled = fx.pipeline.wait_settled(ArtifactKind::Preview).await;

        assert_eq!(settled, ArtifactStatus::Ready);
        let preview_fp = fx.pipeline.fingerprint(ArtifactKind::Preview).unwrap();

        // A fresh chart raster must flow into a fresh preview fingerprint.
        fx.state.apply_metrics(MetricsPatch::cameras(8));
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        fx.pipeline.wait_settled(ArtifactKind::Preview).await;
        assert_ne!(fx.pipeline.fingerprint(ArtifactKind::Preview).unwrap(), preview_fp);
    }

    #[tokio::test(start_paused = true)]
    async fn ensure_ready_is_noop_when_current() {
        let fx = fixture();
        fx.state.apply_metrics(MetricsPatch::cameras(2));
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        let captures = fx.backend.captures(ArtifactKind::Chart);

        fx.pipeline.ensure_ready(ArtifactKind::Chart);
        fx.pipeline.wait_settled(ArtifactKind::Chart).await;
        assert_eq!(fx.backend.captures(ArtifactKind::Chart), captures);
    }
}
