//! The canonical document aggregate

use chrono::Weekday;
use parking_lot::RwLock;
use reportsmith_artifact::Raster;
use reportsmith_bus::{BusEvent, NotificationBus};
use reportsmith_model::{
    ClientRef, ContactChannel, DailyEntries, DailyEntryPatch, DateRange, DocumentField,
    DocumentSnapshot, MediaAttachment, MediaSet, MetricsPatch, Theme, ThemePatch, WeeklyMetrics,
};
use reportsmith_store::{DurableStore, FieldConfig, PersistentField};
use std::sync::Arc;
use uuid::Uuid;

/// The one authoritative in-memory representation of the report
///
/// # Invariants
/// - After any setter returns, a reader obtaining the same field observes
///   the new value; durable writes lag behind and never gate visibility
/// - Patch setters merge with the existing value, so stages updating
///   disjoint sub-fields cannot clobber each other
/// - Every successful mutation publishes [`BusEvent::FieldChanged`] after
///   the new value is visible
///
/// Writer discipline is by convention: the active stage writes only its own
/// fields. The chart raster slot is written by the artifact pipeline alone.
pub struct DocumentState {
    client: PersistentField<Option<ClientRef>>,
    metrics: PersistentField<WeeklyMetrics>,
    daily_entries: PersistentField<DailyEntries>,
    notes: PersistentField<String>,
    signature: PersistentField<String>,
    contact_channel: PersistentField<ContactChannel>,
    theme: PersistentField<Theme>,
    media: PersistentField<MediaSet>,
    date_range: PersistentField<DateRange>,
    /// Reconstructible cache, never persisted across reloads
    chart_raster: RwLock<Option<Raster>>,
    bus: Arc<NotificationBus>,
}

impl DocumentState {
    /// Open canonical state, rehydrating every durable field
    ///
    /// Absent or malformed stored values fall back to per-field defaults;
    /// rehydration never fails. Must be called inside a tokio runtime (the
    /// fields spawn their debounced flushers).
    #[must_use]
    pub fn open(
        store: &Arc<dyn DurableStore>,
        bus: Arc<NotificationBus>,
        config: FieldConfig,
    ) -> Self {
        fn open_field<T>(
            store: &Arc<dyn DurableStore>,
            field: DocumentField,
            default: T,
            config: FieldConfig,
        ) -> PersistentField<T>
        where
            T: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync + 'static,
        {
            PersistentField::open(Arc::clone(store), field.storage_key(), default, config)
        }

        Self {
            client: open_field(store, DocumentField::Client, None, config),
            metrics: open_field(store, DocumentField::Metrics, WeeklyMetrics::default(), config),
            daily_entries: open_field(
                store,
                DocumentField::DailyEntries,
                DailyEntries::default(),
                config,
            ),
            notes: open_field(store, DocumentField::Notes, String::new(), config),
            signature: open_field(store, DocumentField::Signature, String::new(), config),
            contact_channel: open_field(
                store,
                DocumentField::ContactChannel,
                ContactChannel::default(),
                config,
            ),
            theme: open_field(store, DocumentField::Theme, Theme::default(), config),
            media: open_field(store, DocumentField::Media, MediaSet::default(), config),
            date_range: open_field(store, DocumentField::DateRange, DateRange::default(), config),
            chart_raster: RwLock::new(None),
            bus,
        }
    }

    fn changed(&self, field: DocumentField) {
        self.bus.publish(&BusEvent::FieldChanged { field });
    }

    // --- client -----------------------------------------------------------

    /// Currently selected client
    #[must_use]
    pub fn client(&self) -> Option<ClientRef> {
        self.client.get()
    }

    /// Select a client, seeding a fresh document when the identity changes
    ///
    /// Choosing a different client discards the report being edited: every
    /// other field is reset to its default and re-announced. Re-selecting
    /// the same client (updated name or site) touches only the client field.
    pub fn select_client(&self, client: ClientRef) {
        let fresh = self.client.get().map_or(true, |c| c.id != client.id);
        tracing::info!(client = %client.name, fresh, "client selected");
        self.client.set(Some(client));
        self.changed(DocumentField::Client);

        if fresh {
            self.metrics.set(WeeklyMetrics::default());
            self.changed(DocumentField::Metrics);
            self.daily_entries.set(DailyEntries::default());
            self.changed(DocumentField::DailyEntries);
            self.notes.set(String::new());
            self.changed(DocumentField::Notes);
            self.signature.set(String::new());
            self.changed(DocumentField::Signature);
            self.contact_channel.set(ContactChannel::default());
            self.changed(DocumentField::ContactChannel);
            self.theme.set(Theme::default());
            self.changed(DocumentField::Theme);
            self.media.set(MediaSet::default());
            self.changed(DocumentField::Media);
            self.date_range.set(DateRange::default());
            self.changed(DocumentField::DateRange);
            self.set_chart_raster(None);
        }
    }

    // --- metrics ----------------------------------------------------------

    /// Weekly metrics
    #[must_use]
    pub fn metrics(&self) -> WeeklyMetrics {
        self.metrics.get()
    }

    /// Merge a sparse metrics patch
    pub fn apply_metrics(&self, patch: MetricsPatch) {
        self.metrics.update(|m| m.merge(patch));
        self.changed(DocumentField::Metrics);
    }

    // --- daily entries ----------------------------------------------------

    /// The seven daily narratives
    #[must_use]
    pub fn daily_entries(&self) -> DailyEntries {
        self.daily_entries.get()
    }

    /// Merge a sparse patch into one day's entry
    pub fn apply_daily_entry(&self, day: Weekday, patch: DailyEntryPatch) {
        self.daily_entries.update(|entries| entries.apply(day, patch));
        self.changed(DocumentField::DailyEntries);
    }

    // --- free-text fields -------------------------------------------------

    /// Free-form notes
    #[must_use]
    pub fn notes(&self) -> String {
        self.notes.get()
    }

    /// Replace the notes text
    pub fn set_notes(&self, notes: impl Into<String>) {
        self.notes.set(notes.into());
        self.changed(DocumentField::Notes);
    }

    /// Sign-off signature
    #[must_use]
    pub fn signature(&self) -> String {
        self.signature.get()
    }

    /// Replace the signature
    pub fn set_signature(&self, signature: impl Into<String>) {
        self.signature.set(signature.into());
        self.changed(DocumentField::Signature);
    }

    // --- delivery ---------------------------------------------------------

    /// Delivery contact channel
    #[must_use]
    pub fn contact_channel(&self) -> ContactChannel {
        self.contact_channel.get()
    }

    /// Replace the delivery contact channel
    pub fn set_contact_channel(&self, channel: ContactChannel) {
        self.contact_channel.set(channel);
        self.changed(DocumentField::ContactChannel);
    }

    // --- theme ------------------------------------------------------------

    /// Visual theme
    #[must_use]
    pub fn theme(&self) -> Theme {
        self.theme.get()
    }

    /// Merge a sparse theme patch
    pub fn apply_theme(&self, patch: ThemePatch) {
        self.theme.update(|t| t.merge(patch));
        self.changed(DocumentField::Theme);
    }

    // --- media ------------------------------------------------------------

    /// Media attachments
    #[must_use]
    pub fn media(&self) -> MediaSet {
        self.media.get()
    }

    /// Append an attachment, returning its id
    pub fn add_media(&self, attachment: MediaAttachment) -> Uuid {
        let id = attachment.id;
        self.media.update(|m| {
            m.insert(attachment);
        });
        self.changed(DocumentField::Media);
        id
    }

    /// Remove an attachment
    pub fn remove_media(&self, id: Uuid) -> Option<MediaAttachment> {
        let mut removed = None;
        self.media.update(|m| removed = m.remove(id));
        if removed.is_some() {
            self.changed(DocumentField::Media);
        }
        removed
    }

    /// Update an attachment caption; false if the id is unknown
    pub fn set_media_caption(&self, id: Uuid, caption: impl Into<String>) -> bool {
        let caption = caption.into();
        let mut updated = false;
        self.media.update(|m| updated = m.set_caption(id, caption));
        if updated {
            self.changed(DocumentField::Media);
        }
        updated
    }

    // --- period -----------------------------------------------------------

    /// Reporting period
    #[must_use]
    pub fn date_range(&self) -> DateRange {
        self.date_range.get()
    }

    /// Replace the reporting period
    ///
    /// [`DateRange`] is ordered by construction, so the setter is total.
    pub fn set_date_range(&self, range: DateRange) {
        self.date_range.set(range);
        self.changed(DocumentField::DateRange);
    }

    // --- chart raster (in-memory only) ------------------------------------

    /// Current chart raster, if generated
    #[must_use]
    pub fn chart_raster(&self) -> Option<Raster> {
        self.chart_raster.read().clone()
    }

    /// Replace the chart raster slot
    ///
    /// Written by the artifact pipeline when a chart pass completes; the
    /// change notification lets the preview invalidate.
    pub fn set_chart_raster(&self, raster: Option<Raster>) {
        *self.chart_raster.write() = raster;
        self.changed(DocumentField::ChartRaster);
    }

    // --- reads ------------------------------------------------------------

    /// Owned copy of every durable field at this instant
    #[must_use]
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            client: self.client.get(),
            metrics: self.metrics.get(),
            daily_entries: self.daily_entries.get(),
            notes: self.notes.get(),
            signature: self.signature.get(),
            contact_channel: self.contact_channel.get(),
            theme: self.theme.get(),
            media: self.media.get(),
            date_range: self.date_range.get(),
        }
    }

    /// Write every dirty field durably right now (shutdown path)
    pub fn flush_all(&self) {
        self.client.flush_now();
        self.metrics.flush_now();
        self.daily_entries.flush_now();
        self.notes.flush_now();
        self.signature.flush_now();
        self.contact_channel.flush_now();
        self.theme.flush_now();
        self.media.flush_now();
        self.date_range.flush_now();
    }
}

impl std::fmt::Debug for DocumentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentState")
            .field("client", &self.client.get().map(|c| c.name))
            .field("chart_raster", &self.chart_raster.read().is_some())
            .finish_non_exhaustive()
    }
}
