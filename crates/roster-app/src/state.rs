// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};

use crate::{
    BulkAction, BulkDispatcher, BulkPayload, BulkRequest, CaptureGuard, ClientId, ClientRecord,
    ClientUpdate, Column, ColumnResizer, ColumnWidths, OpenBulkDialog, PointerCapture,
    ResizePhase, RosterCounts, Selection, SortField, SortState, TypeFilter, ViewMode,
    project_rows,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Top,
    Client(ClientId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterCommand {
    SetSearch(String),
    SetTypeFilter(TypeFilter),
    SortBy(SortField),
    SetViewMode(ViewMode),
    ClickClient(ClientId),
    /// The host's selected client changed underneath the roster.
    SyncSelectedClient(Option<ClientId>),
    CollapseExpanded,
    ToggleSelect(ClientId),
    SelectAll,
    ClearSelection,
    OpenBulk(BulkAction),
    CloseBulk,
    ConfirmBulk(BulkPayload),
    ToggleTag { client: ClientId, tag: String },
    AddTag { client: ClientId, tag: String },
    AssignTo { client: ClientId, member: String },
    ToggleFilters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterEvent {
    SelectClient(ClientId),
    UpdateClient { id: ClientId, update: ClientUpdate },
    ViewModeChanged(ViewMode),
    ToggleFilters,
    ScrollRequested(ScrollTarget),
    SelectionChanged(usize),
    BulkOpened {
        action: BulkAction,
        selected_count: usize,
    },
    BulkClosed(BulkAction),
    BulkConfirmed(BulkRequest),
}

/// View state for one roster panel. Records stay with the host and are
/// passed in per call.
#[derive(Debug, Default)]
pub struct RosterView {
    search_term: String,
    type_filter: TypeFilter,
    sort: SortState,
    expanded: Option<ClientId>,
    selection: Selection,
    view_mode: ViewMode,
    resizer: ColumnResizer,
    bulk: BulkDispatcher,
}

impl RosterView {
    pub fn new(view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..Self::default()
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn expanded(&self) -> Option<ClientId> {
        self.expanded
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn column_widths(&self) -> &ColumnWidths {
        self.resizer.widths()
    }

    pub fn resize_phase(&self) -> ResizePhase {
        self.resizer.phase()
    }

    pub fn open_bulk(&self) -> Option<&OpenBulkDialog> {
        self.bulk.current()
    }

    /// Render order: filtered, sorted, expanded client first.
    pub fn rows<'a>(&self, clients: &'a [ClientRecord]) -> Vec<&'a ClientRecord> {
        project_rows(
            clients,
            &self.search_term,
            self.type_filter,
            self.sort,
            self.expanded,
        )
    }

    pub fn visible_ids(&self, clients: &[ClientRecord]) -> Vec<ClientId> {
        self.rows(clients).iter().map(|client| client.id).collect()
    }

    pub fn all_visible_selected(&self, clients: &[ClientRecord]) -> bool {
        self.selection.covers(&self.visible_ids(clients))
    }

    pub fn counts(&self, clients: &[ClientRecord]) -> RosterCounts {
        RosterCounts::from_clients(clients)
    }

    pub fn dispatch(
        &mut self,
        clients: &[ClientRecord],
        command: RosterCommand,
    ) -> Result<Vec<RosterEvent>> {
        let events = match command {
            RosterCommand::SetSearch(term) => {
                self.search_term = term;
                Vec::new()
            }
            RosterCommand::SetTypeFilter(filter) => {
                self.type_filter = filter;
                Vec::new()
            }
            RosterCommand::SortBy(field) => {
                self.sort.toggle(field);
                tracing::debug!(
                    field = self.sort.field.as_str(),
                    direction = self.sort.direction.as_str(),
                    "sort changed"
                );
                Vec::new()
            }
            RosterCommand::SetViewMode(mode) => self.set_view_mode(mode),
            RosterCommand::ClickClient(id) => self.click_client(id),
            RosterCommand::SyncSelectedClient(selected) => self.sync_selected(selected),
            RosterCommand::CollapseExpanded => {
                self.expanded = None;
                Vec::new()
            }
            RosterCommand::ToggleSelect(id) => {
                self.selection.toggle(id);
                vec![RosterEvent::SelectionChanged(self.selection.len())]
            }
            RosterCommand::SelectAll => {
                let visible = self.visible_ids(clients);
                self.selection.select_all(&visible);
                vec![RosterEvent::SelectionChanged(self.selection.len())]
            }
            RosterCommand::ClearSelection => {
                self.selection.clear();
                vec![RosterEvent::SelectionChanged(0)]
            }
            RosterCommand::OpenBulk(action) => self.open_bulk_dialog(action)?,
            RosterCommand::CloseBulk => self
                .bulk
                .close()
                .map(RosterEvent::BulkClosed)
                .into_iter()
                .collect(),
            RosterCommand::ConfirmBulk(payload) => self.confirm_bulk(payload)?,
            RosterCommand::ToggleTag { client, tag } => {
                update_client(clients, client, |record| {
                    let mut tags = record.tags.clone();
                    if let Some(position) = tags.iter().position(|existing| *existing == tag) {
                        tags.remove(position);
                    } else {
                        tags.push(tag);
                    }
                    Some(ClientUpdate::tags(tags))
                })
            }
            RosterCommand::AddTag { client, tag } => update_client(clients, client, |record| {
                if record.has_tag(&tag) {
                    return None;
                }
                let mut tags = record.tags.clone();
                tags.push(tag);
                Some(ClientUpdate::tags(tags))
            }),
            RosterCommand::AssignTo { client, member } => update_client(clients, client, |_| {
                Some(ClientUpdate::assigned_to(member))
            }),
            RosterCommand::ToggleFilters => vec![RosterEvent::ToggleFilters],
        };
        Ok(events)
    }

    /// Starts a column drag. Only the table view has resizable columns;
    /// elsewhere the capture is released straight away.
    pub fn begin_resize(
        &mut self,
        column: Column,
        pointer_x: i32,
        capture: Box<dyn PointerCapture>,
    ) -> bool {
        if self.view_mode != ViewMode::Table {
            drop(CaptureGuard::new(capture));
            return false;
        }
        self.resizer.begin(column, pointer_x, capture);
        tracing::debug!(column = column.label(), pointer_x, "resize started");
        true
    }

    pub fn pointer_move(&mut self, pointer_x: i32) -> Option<(Column, u32)> {
        self.resizer.pointer_move(pointer_x)
    }

    pub fn pointer_up(&mut self) -> Option<Column> {
        let column = self.resizer.pointer_up()?;
        tracing::debug!(
            column = column.label(),
            width = self.resizer.widths().get(column),
            "resize finished"
        );
        Some(column)
    }

    /// Selection is cleared on every mode change, including a same-mode set.
    fn set_view_mode(&mut self, mode: ViewMode) -> Vec<RosterEvent> {
        if mode != ViewMode::Table && self.resizer.cancel().is_some() {
            tracing::debug!("resize cancelled by view change");
        }
        self.view_mode = mode;
        self.selection.clear();
        tracing::debug!(mode = mode.as_str(), "view mode changed");
        vec![RosterEvent::ViewModeChanged(mode)]
    }

    fn click_client(&mut self, id: ClientId) -> Vec<RosterEvent> {
        let mut events = Vec::new();
        let from_table = self.view_mode == ViewMode::Table;
        if from_table {
            events.extend(self.set_view_mode(ViewMode::Card));
        }
        events.push(RosterEvent::SelectClient(id));
        self.expanded = Some(id);
        if from_table {
            events.push(RosterEvent::ScrollRequested(ScrollTarget::Top));
        }
        events
    }

    fn sync_selected(&mut self, selected: Option<ClientId>) -> Vec<RosterEvent> {
        let Some(id) = selected else {
            return Vec::new();
        };
        if self.view_mode != ViewMode::Card {
            return Vec::new();
        }
        self.expanded = Some(id);
        vec![RosterEvent::ScrollRequested(ScrollTarget::Client(id))]
    }

    fn open_bulk_dialog(&mut self, action: BulkAction) -> Result<Vec<RosterEvent>> {
        if self.selection.is_empty() {
            bail!(
                "cannot {} with no clients selected -- select at least one client and retry",
                action.label()
            );
        }
        let opened = self.bulk.open(action, self.selection.snapshot());
        Ok(vec![RosterEvent::BulkOpened {
            action,
            selected_count: opened.selected_count(),
        }])
    }

    fn confirm_bulk(&mut self, payload: BulkPayload) -> Result<Vec<RosterEvent>> {
        let request = self.bulk.confirm(payload)?;
        tracing::info!(
            action = request.action().as_str(),
            clients = request.snapshot.count(),
            "bulk action confirmed"
        );
        let mut events = Vec::new();
        if request.action() == BulkAction::Delete {
            self.selection.clear();
            events.push(RosterEvent::SelectionChanged(0));
        }
        events.push(RosterEvent::BulkConfirmed(request));
        Ok(events)
    }
}

/// Unknown ids and no-op edits produce no event.
fn update_client(
    clients: &[ClientRecord],
    id: ClientId,
    build: impl FnOnce(&ClientRecord) -> Option<ClientUpdate>,
) -> Vec<RosterEvent> {
    clients
        .iter()
        .find(|client| client.id == id)
        .and_then(build)
        .map(|update| RosterEvent::UpdateClient { id, update })
        .into_iter()
        .collect()
}

/// Receiver for roster events, implemented by whatever embeds the panel.
pub trait RosterHost {
    fn select_client(&mut self, id: ClientId);
    fn update_client(&mut self, id: ClientId, update: &ClientUpdate) -> Result<()>;
    fn view_mode_changed(&mut self, mode: ViewMode);
    fn toggle_filters(&mut self);
    fn run_bulk_action(&mut self, request: &BulkRequest) -> Result<()>;

    /// Hosts without a scrollable viewport can ignore scroll requests.
    fn request_scroll(&mut self, _target: ScrollTarget) {}
}

/// Forwards host-facing events in order; view-only events are skipped.
pub fn deliver<H: RosterHost + ?Sized>(host: &mut H, events: &[RosterEvent]) -> Result<()> {
    for event in events {
        match event {
            RosterEvent::SelectClient(id) => host.select_client(*id),
            RosterEvent::UpdateClient { id, update } => host.update_client(*id, update)?,
            RosterEvent::ViewModeChanged(mode) => host.view_mode_changed(*mode),
            RosterEvent::ToggleFilters => host.toggle_filters(),
            RosterEvent::ScrollRequested(target) => host.request_scroll(*target),
            RosterEvent::BulkConfirmed(request) => host.run_bulk_action(request)?,
            RosterEvent::SelectionChanged(_)
            | RosterEvent::BulkOpened { .. }
            | RosterEvent::BulkClosed(_) => {}
        }
    }
    Ok(())
}
