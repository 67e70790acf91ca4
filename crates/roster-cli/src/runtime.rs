// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use roster_app::{
    BulkPayload, BulkRequest, ClientGroups, ClientId, ClientRecord, ClientUpdate,
    ContextualInfoProvider, QuickClientRequest, RosterHost, ViewMode,
};
use roster_testkit::{ClientFaker, SeededContextProvider};
use time::OffsetDateTime;

/// In-memory host over a seeded demo roster.
pub struct DemoRuntime {
    clients: Vec<ClientRecord>,
    selected: Option<ClientId>,
    filters_visible: bool,
    provider: SeededContextProvider,
    groups: ClientGroups,
    next_id: i64,
}

impl DemoRuntime {
    pub fn new(seed: u64, client_count: usize, now: OffsetDateTime) -> Self {
        let clients = ClientFaker::new(seed).roster(client_count);
        Self::with_clients(clients, seed, now)
    }

    pub fn with_clients(clients: Vec<ClientRecord>, seed: u64, now: OffsetDateTime) -> Self {
        let next_id = clients.iter().map(|client| client.id.get()).max().unwrap_or(0) + 1;
        Self {
            clients,
            selected: None,
            filters_visible: false,
            provider: SeededContextProvider::new(seed, now),
            groups: ClientGroups::default(),
            next_id,
        }
    }

    fn client_mut(&mut self, id: ClientId) -> Result<&mut ClientRecord> {
        match self.clients.iter_mut().find(|client| client.id == id) {
            Some(client) => Ok(client),
            None => bail!("client {id} not found -- reload the roster and retry"),
        }
    }
}

impl RosterHost for DemoRuntime {
    fn select_client(&mut self, id: ClientId) {
        self.selected = Some(id);
    }

    fn update_client(&mut self, id: ClientId, update: &ClientUpdate) -> Result<()> {
        let client = self.client_mut(id)?;
        update.apply_to(client);
        tracing::debug!(client = %id, "client updated");
        Ok(())
    }

    fn view_mode_changed(&mut self, mode: ViewMode) {
        tracing::debug!(mode = mode.as_str(), "view mode changed");
    }

    fn toggle_filters(&mut self) {
        self.filters_visible = !self.filters_visible;
    }

    fn run_bulk_action(&mut self, request: &BulkRequest) -> Result<()> {
        let ids = request.snapshot.ids();
        match &request.payload {
            BulkPayload::AssignTo { team_member_ids } => {
                let assigned = team_member_ids.join(", ");
                for client in self.clients.iter_mut().filter(|client| ids.contains(&client.id)) {
                    client.assigned_to.clone_from(&assigned);
                }
            }
            BulkPayload::Delete => {
                self.clients.retain(|client| !ids.contains(&client.id));
                if self.selected.is_some_and(|id| ids.contains(&id)) {
                    self.selected = None;
                }
            }
            BulkPayload::CreateFolders(template) => {
                tracing::info!(template = %template.name, clients = ids.len(), "folders requested");
            }
            BulkPayload::CreateProject(project) => {
                tracing::info!(project = %project.project_name, clients = ids.len(), "project requested");
            }
            BulkPayload::InviteToMeeting { meeting_id } => {
                tracing::info!(meeting = %meeting_id, clients = ids.len(), "meeting invites requested");
            }
            BulkPayload::SendLogin => {
                tracing::info!(clients = ids.len(), "login emails requested");
            }
        }
        Ok(())
    }
}

impl roster_tui::RosterRuntime for DemoRuntime {
    fn clients(&self) -> &[ClientRecord] {
        &self.clients
    }

    fn selected_client(&self) -> Option<ClientId> {
        self.selected
    }

    fn filters_visible(&self) -> bool {
        self.filters_visible
    }

    fn context_provider(&self) -> &dyn ContextualInfoProvider {
        &self.provider
    }

    fn groups(&self) -> &ClientGroups {
        &self.groups
    }

    fn groups_mut(&mut self) -> &mut ClientGroups {
        &mut self.groups
    }

    fn create_client(&mut self, request: QuickClientRequest) -> Result<ClientId> {
        let Some(group) = self.groups.get(&request.group_id) else {
            bail!(
                "unknown client group {:?} -- pick a group from the list and retry",
                request.group_id
            );
        };
        let id = ClientId::new(self.next_id);
        self.next_id += 1;
        self.clients.push(ClientRecord {
            id,
            name: request.display_name(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            client_type: request.client_type,
            email: request.email.clone(),
            phone: request.phone.clone().unwrap_or_default(),
            tags: vec![group.name.clone()],
            assigned_to: String::new(),
            created_date: self.provider.now().date(),
        });
        Ok(id)
    }

    fn now(&self) -> OffsetDateTime {
        self.provider.now()
    }
}

#[cfg(test)]
mod tests {
    use super::DemoRuntime;
    use anyhow::Result;
    use roster_app::{
        BulkAction, BulkPayload, ClientId, ClientType, QuickClientForm, RosterCommand,
        RosterEvent, RosterView, deliver,
    };
    use roster_testkit::{reference_now, sample_roster};
    use roster_tui::RosterRuntime;

    fn runtime() -> DemoRuntime {
        DemoRuntime::with_clients(sample_roster(), 3, reference_now())
    }

    #[test]
    fn bulk_delete_removes_snapshot_clients() -> Result<()> {
        let mut runtime = runtime();
        let mut view = RosterView::default();
        for id in [1, 3] {
            view.dispatch(runtime.clients(), RosterCommand::ToggleSelect(ClientId::new(id)))?;
        }
        view.dispatch(runtime.clients(), RosterCommand::OpenBulk(BulkAction::Delete))?;
        let events = view.dispatch(runtime.clients(), RosterCommand::ConfirmBulk(BulkPayload::Delete))?;
        assert!(events.contains(&RosterEvent::SelectionChanged(0)));

        deliver(&mut runtime, &events)?;
        let remaining: Vec<i64> = runtime.clients().iter().map(|client| client.id.get()).collect();
        assert_eq!(remaining, vec![2, 4]);
        Ok(())
    }

    #[test]
    fn bulk_assign_updates_every_snapshot_client() -> Result<()> {
        let mut runtime = runtime();
        let mut view = RosterView::default();
        view.dispatch(runtime.clients(), RosterCommand::SelectAll)?;
        view.dispatch(runtime.clients(), RosterCommand::OpenBulk(BulkAction::AssignTo))?;
        let events = view.dispatch(
            runtime.clients(),
            RosterCommand::ConfirmBulk(BulkPayload::AssignTo {
                team_member_ids: vec!["Lisa Chen".to_owned()],
            }),
        )?;
        deliver(&mut runtime, &events)?;
        assert!(runtime.clients().iter().all(|client| client.assigned_to == "Lisa Chen"));
        Ok(())
    }

    #[test]
    fn unknown_client_update_is_an_error() {
        let mut runtime = runtime();
        let events = vec![RosterEvent::UpdateClient {
            id: ClientId::new(99),
            update: roster_app::ClientUpdate::assigned_to("Mike Brown"),
        }];
        let error = deliver(&mut runtime, &events).expect_err("missing client should fail");
        assert!(error.to_string().contains("client 99 not found"));
    }

    #[test]
    fn created_client_gets_next_id_and_group_tag() -> Result<()> {
        let mut runtime = runtime();
        let mut form = QuickClientForm::default();
        form.client_type = ClientType::Business;
        form.business_name = "Birch Bakery".to_owned();
        form.first_name = "Dana".to_owned();
        form.last_name = "Birch".to_owned();
        form.email = "dana@birch.io".to_owned();
        form.group_id = "advisory".to_owned();

        let id = runtime.create_client(form.request())?;
        assert_eq!(id, ClientId::new(5));
        let created = runtime
            .clients()
            .iter()
            .find(|client| client.id == id)
            .expect("created client");
        assert_eq!(created.tags, vec!["Advisory".to_owned()]);
        assert_eq!(created.created_date, reference_now().date());
        Ok(())
    }

    #[test]
    fn unknown_group_is_rejected() {
        let mut runtime = runtime();
        let mut form = QuickClientForm::default();
        form.group_id = "nope".to_owned();
        let error = runtime
            .create_client(form.request())
            .expect_err("unknown group should fail");
        assert!(error.to_string().contains("unknown client group"));
    }
}
