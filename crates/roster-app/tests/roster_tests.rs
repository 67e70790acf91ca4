// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use roster_app::{
    BulkAction, BulkPayload, ClientId, ClientRecord, ClientType, Column, PointerCapture,
    RosterCommand, RosterEvent, RosterView, SortField, SortIcon, TypeFilter, ViewMode,
    snapshot_client_names,
};
use std::cell::Cell;
use std::rc::Rc;
use time::macros::date;

fn record(id: i64, first: &str, last: &str) -> ClientRecord {
    ClientRecord {
        id: ClientId::new(id),
        name: format!("{first} {last}"),
        first_name: first.to_owned(),
        last_name: last.to_owned(),
        client_type: ClientType::Individual,
        email: format!("{}@example.com", first.to_lowercase()),
        phone: "555-0101".to_owned(),
        tags: vec!["1040".to_owned()],
        assigned_to: "Sarah Johnson".to_owned(),
        created_date: date!(2024 - 11 - 05),
    }
}

fn names(view: &RosterView, clients: &[ClientRecord]) -> Vec<String> {
    view.rows(clients)
        .into_iter()
        .map(|client| client.name.clone())
        .collect()
}

#[test]
fn search_sort_then_pin_expanded() -> Result<()> {
    let clients = vec![record(1, "Bob", "Lee"), record(2, "Ann", "Lee")];
    let mut view = RosterView::default();

    view.dispatch(&clients, RosterCommand::SetSearch("lee".to_owned()))?;
    assert_eq!(names(&view, &clients), vec!["Ann Lee", "Bob Lee"]);

    view.dispatch(&clients, RosterCommand::ClickClient(ClientId::new(1)))?;
    assert_eq!(names(&view, &clients), vec!["Bob Lee", "Ann Lee"]);
    Ok(())
}

#[test]
fn switching_to_table_empties_selection() -> Result<()> {
    let clients = vec![record(1, "Bob", "Lee"), record(2, "Ann", "Lee")];
    let mut view = RosterView::default();
    view.dispatch(&clients, RosterCommand::ToggleSelect(ClientId::new(1)))?;
    view.dispatch(&clients, RosterCommand::ToggleSelect(ClientId::new(2)))?;
    assert_eq!(view.selection().len(), 2);

    let events = view.dispatch(&clients, RosterCommand::SetViewMode(ViewMode::Table))?;
    assert_eq!(events, vec![RosterEvent::ViewModeChanged(ViewMode::Table)]);
    assert!(view.selection().is_empty());
    Ok(())
}

#[test]
fn sort_icons_track_active_field() -> Result<()> {
    let clients: Vec<ClientRecord> = Vec::new();
    let mut view = RosterView::default();
    assert_eq!(view.sort().icon(SortField::Name), SortIcon::Ascending);
    assert_eq!(view.sort().icon(SortField::CreatedDate), SortIcon::Neutral);

    view.dispatch(&clients, RosterCommand::SortBy(SortField::CreatedDate))?;
    view.dispatch(&clients, RosterCommand::SortBy(SortField::CreatedDate))?;
    assert_eq!(
        view.sort().icon(SortField::CreatedDate),
        SortIcon::Descending
    );
    assert_eq!(view.sort().icon(SortField::Name), SortIcon::Neutral);
    Ok(())
}

#[test]
fn missing_info_filter_and_counts() -> Result<()> {
    let mut incomplete = record(3, "Cara", "Diaz");
    incomplete.phone.clear();
    let mut business = record(4, "Acme", "Holdings");
    business.client_type = ClientType::Business;
    let clients = vec![record(1, "Bob", "Lee"), incomplete, business];
    let mut view = RosterView::default();

    let counts = view.counts(&clients);
    assert_eq!(counts.all, 3);
    assert_eq!(counts.business, 1);
    assert_eq!(counts.for_filter(TypeFilter::MissingInfo), 1);

    view.dispatch(&clients, RosterCommand::SetTypeFilter(TypeFilter::MissingInfo))?;
    assert_eq!(names(&view, &clients), vec!["Cara Diaz"]);
    Ok(())
}

#[test]
fn bulk_snapshot_survives_later_selection_changes() -> Result<()> {
    let clients = vec![record(1, "Bob", "Lee"), record(2, "Ann", "Lee")];
    let mut view = RosterView::default();
    view.dispatch(&clients, RosterCommand::SelectAll)?;
    view.dispatch(&clients, RosterCommand::OpenBulk(BulkAction::Delete))?;
    view.dispatch(&clients, RosterCommand::ToggleSelect(ClientId::new(2)))?;

    let dialog = view.open_bulk().expect("delete dialog open");
    assert_eq!(dialog.selected_count(), 2);
    assert_eq!(
        snapshot_client_names(dialog.snapshot(), &clients[..1]),
        vec!["Bob Lee".to_owned(), "Unknown Client".to_owned()]
    );

    let mismatch = view.dispatch(&clients, RosterCommand::ConfirmBulk(BulkPayload::SendLogin));
    assert!(mismatch.is_err());
    assert!(view.open_bulk().is_some());

    let events = view.dispatch(&clients, RosterCommand::ConfirmBulk(BulkPayload::Delete))?;
    let confirmed = events.iter().find_map(|event| match event {
        RosterEvent::BulkConfirmed(request) => Some(request.snapshot.count()),
        _ => None,
    });
    assert_eq!(confirmed, Some(2));
    Ok(())
}

struct Released(Rc<Cell<u32>>);

impl PointerCapture for Released {
    fn release(&mut self) {
        self.0.set(self.0.get() + 1);
    }
}

#[test]
fn table_resize_round_trip() {
    let mut view = RosterView::new(ViewMode::Table);
    let count = Rc::new(Cell::new(0));

    assert!(view.begin_resize(Column::Client, 300, Box::new(Released(Rc::clone(&count)))));
    view.pointer_move(100);
    assert_eq!(view.column_widths().get(Column::Client), 100);
    view.pointer_move(350);
    assert_eq!(view.column_widths().get(Column::Client), 270);
    assert_eq!(view.pointer_up(), Some(Column::Client));
    assert_eq!(view.pointer_up(), None);
    assert_eq!(count.get(), 1);
}
