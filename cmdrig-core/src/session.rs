//! The session controller: one owned state object holding selection, rendered
//! controls, the field store and the preview tracker. Rendering surfaces
//! mutate control values in place and report edits back through
//! [`FormSession::form_changed`].

use crate::form::{collect_snapshot, render_fields, Control, FormSnapshot};
use crate::preview::PreviewTracker;
use crate::store::{FieldStore, SelectionRecord, StoreError};
use schema::{ConnectorRegistry, FieldSchema};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    pub connector: Option<String>,
    pub sub: Option<String>,
}

/// One issued preview request: the sequence number to match the response
/// against and the snapshot to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewTicket {
    pub seq: u64,
    pub snapshot: FormSnapshot,
}

pub struct FormSession {
    registry: ConnectorRegistry,
    store: FieldStore,
    selection: SelectionState,
    globals: Vec<Control>,
    extras: Vec<Control>,
    preview: PreviewTracker,
}

impl FormSession {
    pub fn new(registry: ConnectorRegistry, store: FieldStore) -> Self {
        Self {
            registry,
            store,
            selection: SelectionState::default(),
            globals: Vec::new(),
            extras: Vec::new(),
            preview: PreviewTracker::default(),
        }
    }

    pub fn registry(&self) -> &ConnectorRegistry {
        &self.registry
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn globals(&self) -> &[Control] {
        &self.globals
    }

    pub fn globals_mut(&mut self) -> &mut [Control] {
        &mut self.globals
    }

    pub fn extras(&self) -> &[Control] {
        &self.extras
    }

    pub fn extras_mut(&mut self) -> &mut [Control] {
        &mut self.extras
    }

    /// Documentation of the active sub, when it has any.
    pub fn doc(&self) -> Option<&str> {
        self.registry
            .doc_of(self.selection.connector.as_deref(), self.selection.sub.as_deref())
    }

    /// Activates a connector/sub pair. Globals are rebuilt only when the
    /// connector changed; extras are always rebuilt. The pair is persisted as
    /// the last selection, and a preview request is issued for the fresh
    /// state. Names that do not resolve in the registry yield empty control
    /// sets, not an error.
    pub fn select(&mut self, name: &str, sub: &str) -> Result<Option<PreviewTicket>, StoreError> {
        let connector_changed = self.selection.connector.as_deref() != Some(name);
        self.selection = SelectionState {
            connector: Some(name.to_string()),
            sub: Some(sub.to_string()),
        };
        // Controls are rebuilt before the selection is persisted so a failed
        // write never leaves them trailing the in-memory selection.
        if connector_changed {
            self.globals = self.seed(self.registry.globals_of(Some(name)));
        }
        self.extras = self.seed(
            self.registry
                .extras_of(Some(name), Some(sub)),
        );
        self.store.save_selection(&SelectionRecord {
            name: name.to_string(),
            sub: sub.to_string(),
        })?;
        Ok(self.begin_preview())
    }

    /// Replays the persisted last selection, if any. Returns whether a
    /// selection was restored and, when it was, the preview request for the
    /// restored state.
    pub fn restore_last_selection(&mut self) -> Result<Option<PreviewTicket>, StoreError> {
        match self.store.load_selection() {
            Some(record) => self.select(&record.name, &record.sub),
            None => Ok(None),
        }
    }

    /// Collects the live control values into a snapshot.
    pub fn collect(&self) -> FormSnapshot {
        collect_snapshot(
            self.selection.connector.as_deref(),
            self.selection.sub.as_deref(),
            self.globals.iter().chain(self.extras.iter()),
        )
    }

    /// Fired on every control edit: persists the snapshot, then issues a
    /// preview request. No request is issued while no connector is selected.
    pub fn form_changed(&mut self) -> Result<Option<PreviewTicket>, StoreError> {
        let snapshot = self.collect();
        self.store.save_snapshot(&snapshot)?;
        Ok(self.begin_preview())
    }

    /// Routes a preview response; stale sequence numbers are discarded.
    /// Returns whether the displayed preview changed.
    pub fn resolve_preview(&mut self, seq: u64, text: String) -> bool {
        self.preview.resolve(seq, text)
    }

    pub fn preview(&self) -> &PreviewTracker {
        &self.preview
    }

    fn begin_preview(&mut self) -> Option<PreviewTicket> {
        self.selection.connector.as_ref()?;
        Some(PreviewTicket {
            seq: self.preview.begin(),
            snapshot: self.collect(),
        })
    }

    fn seed(&self, fields: &[FieldSchema]) -> Vec<Control> {
        let saved = self.store.load_fields(fields);
        render_fields(fields, &saved)
    }
}
