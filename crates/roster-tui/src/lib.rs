// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use roster_app::{
    BulkAction, BulkPayload, ClientGroup, ClientGroups, ClientId, ClientRecord, ClientType,
    Column, ColumnWidths, CommunicationSubTab, ContextualInfoProvider, FieldErrors, FolderNode,
    FolderTab, FolderTemplate, PointerCapture, ProjectRequest, QuickClientForm, QuickField,
    QuickClientRequest, ResizePhase, RosterCommand, RosterCounts, RosterEvent, RosterHost,
    RosterView, ScrollTarget, SortField, SubmissionGate, SubmitOutcome, TEAM_MEMBERS,
    TypeFilter, ViewMode, annotate, deliver, snapshot_client_names, submit,
};
use std::cell::Cell as FlagCell;
use std::io;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

const PAGE_ROWS: usize = 10;
const PX_PER_CELL: u32 = 8;
const CHECKBOX_CELLS: u16 = 3;
const SCROLL_DELAY: Duration = Duration::from_millis(100);
const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);

/// What the terminal host needs beyond the roster's event callbacks.
pub trait RosterRuntime: RosterHost {
    fn clients(&self) -> &[ClientRecord];
    fn selected_client(&self) -> Option<ClientId>;
    fn filters_visible(&self) -> bool;
    fn context_provider(&self) -> &dyn ContextualInfoProvider;
    fn groups(&self) -> &ClientGroups;
    fn groups_mut(&mut self) -> &mut ClientGroups;
    fn create_client(&mut self, request: QuickClientRequest) -> Result<ClientId>;

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    Scroll { token: u64, target: ScrollTarget },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct TagPickerState {
    query: String,
    cursor: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuickInput {
    Type,
    BusinessName,
    FirstName,
    MiddleName,
    LastName,
    Email,
    Phone,
    Group,
    SendCredentials,
    PlaceholderEmail,
}

impl QuickInput {
    const ALL: [Self; 10] = [
        Self::Type,
        Self::BusinessName,
        Self::FirstName,
        Self::MiddleName,
        Self::LastName,
        Self::Email,
        Self::Phone,
        Self::Group,
        Self::SendCredentials,
        Self::PlaceholderEmail,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::BusinessName => "business name",
            Self::FirstName => "first name",
            Self::MiddleName => "middle name",
            Self::LastName => "last name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Group => "group",
            Self::SendCredentials => "send credentials",
            Self::PlaceholderEmail => "placeholder email",
        }
    }

    const fn error_key(self) -> Option<QuickField> {
        match self {
            Self::BusinessName => Some(QuickField::BusinessName),
            Self::FirstName => Some(QuickField::FirstName),
            Self::LastName => Some(QuickField::LastName),
            Self::Email => Some(QuickField::Email),
            _ => None,
        }
    }

    fn text_mut(self, form: &mut QuickClientForm) -> Option<&mut String> {
        match self {
            Self::BusinessName => Some(&mut form.business_name),
            Self::FirstName => Some(&mut form.first_name),
            Self::MiddleName => Some(&mut form.middle_name),
            Self::LastName => Some(&mut form.last_name),
            Self::Email if !form.uses_placeholder_email() => Some(&mut form.email),
            Self::Phone => Some(&mut form.phone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct QuickAddState {
    form: QuickClientForm,
    field: usize,
    errors: FieldErrors,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Normal,
    Search,
    BulkPending,
    BulkDialog {
        choice: usize,
    },
    TagPicker(TagPickerState),
    QuickAdd(QuickAddState),
}

#[derive(Debug, Default)]
struct ViewData {
    cursor: usize,
    scroll_top: usize,
    tab: FolderTab,
    sub_tab: Option<CommunicationSubTab>,
    input: InputMode,
    status: Option<String>,
    status_token: u64,
    scroll_token: u64,
    capture: Rc<CaptureSlot>,
    submit_gate: SubmissionGate,
}

impl ViewData {
    fn move_cursor(&mut self, delta: isize, row_count: usize) {
        if row_count == 0 {
            self.cursor = 0;
            self.scroll_top = 0;
            return;
        }
        let max = row_count as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, max) as usize;
        self.keep_cursor_visible();
    }

    fn keep_cursor_visible(&mut self) {
        if self.cursor < self.scroll_top {
            self.scroll_top = self.cursor;
        } else if self.cursor >= self.scroll_top + PAGE_ROWS {
            self.scroll_top = self.cursor + 1 - PAGE_ROWS;
        }
    }
}

/// Which drag, if any, currently owns the pointer. Each capture carries its
/// own generation so a stale release cannot drop a newer drag's hold.
#[derive(Debug, Default)]
struct CaptureSlot {
    holder: FlagCell<Option<u64>>,
    issued: FlagCell<u64>,
}

impl CaptureSlot {
    fn is_held(&self) -> bool {
        self.holder.get().is_some()
    }
}

struct TuiCapture {
    slot: Rc<CaptureSlot>,
    generation: u64,
}

impl TuiCapture {
    fn acquire(slot: &Rc<CaptureSlot>) -> Self {
        let generation = slot.issued.get().wrapping_add(1);
        slot.issued.set(generation);
        slot.holder.set(Some(generation));
        Self {
            slot: Rc::clone(slot),
            generation,
        }
    }
}

impl PointerCapture for TuiCapture {
    fn release(&mut self) {
        if self.slot.holder.get() == Some(self.generation) {
            self.slot.holder.set(None);
        }
    }
}

pub fn run_app<R: RosterRuntime>(view: &mut RosterView, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    let mut area = Rect::default();

    let mut result = Ok(());
    loop {
        process_internal_events(view, runtime, &mut data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| {
            area = frame.area();
            render(frame, view, runtime, &data);
        }) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(view, runtime, &mut data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse_event(view, &mut data, &internal_tx, area, mouse);
                }
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(
        io::stdout(),
        DisableMouseCapture,
        terminal::LeaveAlternateScreen
    )
    .context("leave alternate screen")?;
    result
}

fn process_internal_events<R: RosterRuntime>(
    view: &RosterView,
    runtime: &R,
    data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == data.status_token => {
                data.status = None;
            }
            InternalEvent::Scroll { token, target } if token == data.scroll_token => {
                apply_scroll(view, runtime.clients(), data, target);
            }
            InternalEvent::ClearStatus { .. } | InternalEvent::Scroll { .. } => {}
        }
    }
}

fn apply_scroll(view: &RosterView, clients: &[ClientRecord], data: &mut ViewData, target: ScrollTarget) {
    match target {
        ScrollTarget::Top => {
            data.cursor = 0;
            data.scroll_top = 0;
        }
        ScrollTarget::Client(id) => {
            if let Some(index) = view.rows(clients).iter().position(|client| client.id == id) {
                data.cursor = index;
                data.scroll_top = index;
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_DELAY);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

/// Later requests supersede earlier ones through the token check.
fn schedule_scroll(internal_tx: &Sender<InternalEvent>, data: &mut ViewData, target: ScrollTarget) {
    data.scroll_token = data.scroll_token.saturating_add(1);
    let token = data.scroll_token;
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(SCROLL_DELAY);
        let _ = sender.send(InternalEvent::Scroll { token, target });
    });
}

fn emit_status(data: &mut ViewData, internal_tx: &Sender<InternalEvent>, message: impl Into<String>) {
    data.status = Some(message.into());
    data.status_token = data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, data.status_token);
}

/// Runs one command through the roster and hands the events to the host.
fn apply_command<R: RosterRuntime>(
    view: &mut RosterView,
    runtime: &mut R,
    data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: RosterCommand,
) {
    let events = match view.dispatch(runtime.clients(), command) {
        Ok(events) => events,
        Err(error) => {
            emit_status(data, internal_tx, format!("{error:#}"));
            return;
        }
    };
    let previously_selected = runtime.selected_client();
    react_to_events(data, internal_tx, &events);
    if let Err(error) = deliver(runtime, &events) {
        tracing::warn!(error = %format!("{error:#}"), "host rejected roster event");
        emit_status(data, internal_tx, format!("{error:#}"));
    }

    let selected = runtime.selected_client();
    if selected != previously_selected {
        match view.dispatch(runtime.clients(), RosterCommand::SyncSelectedClient(selected)) {
            Ok(events) => react_to_events(data, internal_tx, &events),
            Err(error) => emit_status(data, internal_tx, format!("{error:#}")),
        }
    }
    let row_count = view.rows(runtime.clients()).len();
    data.move_cursor(0, row_count);
}

fn react_to_events(data: &mut ViewData, internal_tx: &Sender<InternalEvent>, events: &[RosterEvent]) {
    for event in events {
        match event {
            RosterEvent::ScrollRequested(target) => schedule_scroll(internal_tx, data, *target),
            RosterEvent::ViewModeChanged(mode) => {
                emit_status(data, internal_tx, format!("{} view", mode.as_str()));
            }
            RosterEvent::BulkOpened { .. } => data.input = InputMode::BulkDialog { choice: 0 },
            RosterEvent::BulkClosed(_) => data.input = InputMode::Normal,
            RosterEvent::BulkConfirmed(request) => {
                data.input = InputMode::Normal;
                emit_status(
                    data,
                    internal_tx,
                    format!(
                        "{} sent for {} client(s)",
                        request.action().label(),
                        request.snapshot.count()
                    ),
                );
            }
            RosterEvent::SelectClient(_)
            | RosterEvent::UpdateClient { .. }
            | RosterEvent::ToggleFilters
            | RosterEvent::SelectionChanged(_) => {}
        }
    }
}

fn current_client_id<R: RosterRuntime>(view: &RosterView, runtime: &R, data: &ViewData) -> Option<ClientId> {
    view.rows(runtime.clients())
        .get(data.cursor)
        .map(|client| client.id)
}

fn handle_key_event<R: RosterRuntime>(
    view: &mut RosterView,
    runtime: &mut R,
    data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    match data.input.clone() {
        InputMode::Normal => handle_normal_key(view, runtime, data, internal_tx, key),
        InputMode::Search => {
            handle_search_key(view, runtime, data, internal_tx, key);
            false
        }
        InputMode::BulkPending => {
            data.input = InputMode::Normal;
            if let KeyCode::Char(ch) = key.code
                && let Some(action) = bulk_action_for_digit(ch)
            {
                apply_command(view, runtime, data, internal_tx, RosterCommand::OpenBulk(action));
            }
            false
        }
        InputMode::BulkDialog { choice } => {
            handle_bulk_dialog_key(view, runtime, data, internal_tx, key, choice);
            false
        }
        InputMode::TagPicker(picker) => {
            handle_tag_picker_key(view, runtime, data, internal_tx, key, picker);
            false
        }
        InputMode::QuickAdd(state) => {
            handle_quick_add_key(view, runtime, data, internal_tx, key, state);
            false
        }
    }
}

fn handle_normal_key<R: RosterRuntime>(
    view: &mut RosterView,
    runtime: &mut R,
    data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let command = match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Esc if view.expanded().is_some() => Some(RosterCommand::CollapseExpanded),
        KeyCode::Esc => return true,
        KeyCode::Char('/') => {
            data.input = InputMode::Search;
            None
        }
        KeyCode::Tab => Some(RosterCommand::SetTypeFilter(view.type_filter().next())),
        KeyCode::Char(digit @ '1'..='4') => {
            let index = digit as usize - '1' as usize;
            Some(RosterCommand::SortBy(SortField::ALL[index]))
        }
        KeyCode::Char('v') => Some(RosterCommand::SetViewMode(view.view_mode().next())),
        KeyCode::Char('j') | KeyCode::Down => {
            data.move_cursor(1, view.rows(runtime.clients()).len());
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            data.move_cursor(-1, view.rows(runtime.clients()).len());
            None
        }
        KeyCode::Char(' ') => current_client_id(view, runtime, data).map(RosterCommand::ToggleSelect),
        KeyCode::Char('a') => Some(RosterCommand::SelectAll),
        KeyCode::Char('x') => Some(RosterCommand::ClearSelection),
        KeyCode::Enter => current_client_id(view, runtime, data).map(RosterCommand::ClickClient),
        KeyCode::Char('c') => Some(RosterCommand::CollapseExpanded),
        KeyCode::Char('f') => Some(RosterCommand::ToggleFilters),
        KeyCode::Char(']') => {
            data.tab = data.tab.next();
            None
        }
        KeyCode::Char('[') => {
            data.tab = data.tab.prev();
            None
        }
        KeyCode::Char('}') => {
            data.sub_tab = next_sub_tab(data.sub_tab);
            None
        }
        KeyCode::Char('b') => {
            data.input = InputMode::BulkPending;
            emit_status(data, internal_tx, bulk_menu_hint());
            None
        }
        KeyCode::Char('g') => current_assignment(view, runtime, data),
        KeyCode::Char('t') => {
            if current_client_id(view, runtime, data).is_some() {
                data.input = InputMode::TagPicker(TagPickerState::default());
            }
            None
        }
        KeyCode::Char('n') => {
            data.input = InputMode::QuickAdd(QuickAddState::default());
            None
        }
        _ => None,
    };
    if let Some(command) = command {
        apply_command(view, runtime, data, internal_tx, command);
    }
    false
}

fn handle_search_key<R: RosterRuntime>(
    view: &mut RosterView,
    runtime: &mut R,
    data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let mut term = view.search_term().to_owned();
    match key.code {
        KeyCode::Enter => {
            data.input = InputMode::Normal;
            return;
        }
        KeyCode::Esc => {
            data.input = InputMode::Normal;
            term.clear();
        }
        KeyCode::Backspace => {
            term.pop();
        }
        KeyCode::Char(ch) => term.push(ch),
        _ => return,
    }
    apply_command(view, runtime, data, internal_tx, RosterCommand::SetSearch(term));
}

fn handle_bulk_dialog_key<R: RosterRuntime>(
    view: &mut RosterView,
    runtime: &mut R,
    data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    choice: usize,
) {
    let Some(action) = view.open_bulk().map(|open| open.action()) else {
        data.input = InputMode::Normal;
        return;
    };
    let choices = bulk_choices(action).len();
    match key.code {
        KeyCode::Esc | KeyCode::Char('n') => {
            apply_command(view, runtime, data, internal_tx, RosterCommand::CloseBulk);
        }
        KeyCode::Char('j') | KeyCode::Down if choices > 0 => {
            data.input = InputMode::BulkDialog {
                choice: (choice + 1) % choices,
            };
        }
        KeyCode::Char('k') | KeyCode::Up if choices > 0 => {
            data.input = InputMode::BulkDialog {
                choice: (choice + choices - 1) % choices,
            };
        }
        KeyCode::Char('y') | KeyCode::Enter => {
            let payload = bulk_payload(action, choice, runtime.now());
            apply_command(view, runtime, data, internal_tx, RosterCommand::ConfirmBulk(payload));
        }
        _ => {}
    }
}

fn handle_tag_picker_key<R: RosterRuntime>(
    view: &mut RosterView,
    runtime: &mut R,
    data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    mut picker: TagPickerState,
) {
    let Some(client) = current_client_id(view, runtime, data) else {
        data.input = InputMode::Normal;
        return;
    };
    let matches: Vec<String> = picker_groups(runtime.groups(), &picker.query)
        .into_iter()
        .map(|group| group.name.clone())
        .collect();
    match key.code {
        KeyCode::Esc => {
            data.input = InputMode::Normal;
            return;
        }
        KeyCode::Down => picker.cursor = (picker.cursor + 1).min(matches.len().saturating_sub(1)),
        KeyCode::Up => picker.cursor = picker.cursor.saturating_sub(1),
        KeyCode::Backspace => {
            picker.query.pop();
            picker.cursor = 0;
        }
        KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let query = picker.query.trim().to_owned();
            let added = runtime
                .groups_mut()
                .add(&query, "")
                .map(|group| group.name.clone());
            match added {
                Some(tag) => {
                    tracing::info!(group = %tag, "client group added");
                    apply_command(view, runtime, data, internal_tx, RosterCommand::AddTag { client, tag });
                    data.input = InputMode::Normal;
                }
                None => emit_status(
                    data,
                    internal_tx,
                    "group name is blank or already exists -- type a new name and retry",
                ),
            }
            return;
        }
        KeyCode::Char(ch) => {
            picker.query.push(ch);
            picker.cursor = 0;
        }
        KeyCode::Enter => {
            if let Some(tag) = matches.get(picker.cursor).cloned() {
                apply_command(view, runtime, data, internal_tx, RosterCommand::ToggleTag { client, tag });
            }
        }
        _ => {}
    }
    if matches!(data.input, InputMode::TagPicker(_)) {
        data.input = InputMode::TagPicker(picker);
    }
}

fn handle_quick_add_key<R: RosterRuntime>(
    view: &mut RosterView,
    runtime: &mut R,
    data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
    mut state: QuickAddState,
) {
    let field = QuickInput::ALL[state.field];
    match key.code {
        KeyCode::Esc => {
            if !data.submit_gate.is_submitting() {
                data.input = InputMode::Normal;
            }
            return;
        }
        KeyCode::Tab | KeyCode::Down => state.field = (state.field + 1) % QuickInput::ALL.len(),
        KeyCode::BackTab | KeyCode::Up => {
            state.field = (state.field + QuickInput::ALL.len() - 1) % QuickInput::ALL.len();
        }
        KeyCode::Enter => {
            let outcome = submit(&mut state.form, &data.submit_gate, |request| {
                runtime.create_client(request)
            });
            match outcome {
                Ok(SubmitOutcome::Created(id)) => {
                    data.input = InputMode::Normal;
                    emit_status(data, internal_tx, "client created");
                    apply_command(view, runtime, data, internal_tx, RosterCommand::ClickClient(id));
                    return;
                }
                Ok(SubmitOutcome::Rejected(errors)) => state.errors = errors,
                Ok(SubmitOutcome::Busy) => emit_status(data, internal_tx, "already submitting"),
                Err(error) => emit_status(
                    data,
                    internal_tx,
                    format!("failed to create client: {error:#}"),
                ),
            }
        }
        KeyCode::Left | KeyCode::Right if field == QuickInput::Group => {
            let groups = runtime.groups().all();
            if !groups.is_empty() {
                let current = groups
                    .iter()
                    .position(|group| group.id == state.form.group_id)
                    .unwrap_or(0);
                let next = if key.code == KeyCode::Right {
                    (current + 1) % groups.len()
                } else {
                    (current + groups.len() - 1) % groups.len()
                };
                state.form.group_id = groups[next].id.clone();
            }
        }
        KeyCode::Char(' ') if field == QuickInput::Type => {
            state.form.client_type = match state.form.client_type {
                ClientType::Individual => ClientType::Business,
                ClientType::Business => ClientType::Individual,
            };
        }
        KeyCode::Char(' ') if field == QuickInput::SendCredentials => {
            state.form.send_credentials = !state.form.send_credentials;
        }
        KeyCode::Char(' ') if field == QuickInput::PlaceholderEmail => {
            let enabled = !state.form.uses_placeholder_email();
            let unique_id = u64::try_from(runtime.now().unix_timestamp()).unwrap_or_default();
            state.form.set_placeholder_email(enabled, unique_id);
        }
        KeyCode::Backspace => {
            if let Some(text) = field.text_mut(&mut state.form) {
                text.pop();
            }
        }
        KeyCode::Char(ch) => {
            if let Some(text) = field.text_mut(&mut state.form) {
                text.push(ch);
            }
        }
        _ => {}
    }
    data.input = InputMode::QuickAdd(state);
}

fn handle_mouse_event(
    view: &mut RosterView,
    data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    area: Rect,
    mouse: MouseEvent,
) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if view.view_mode() != ViewMode::Table {
                return;
            }
            let layout = TableLayout::new(body_area(area), view.column_widths());
            if mouse.row != layout.header_row {
                return;
            }
            let Some(column) = layout.edge_at(mouse.column) else {
                return;
            };
            let capture = TuiCapture::acquire(&data.capture);
            if view.begin_resize(column, pointer_px(mouse.column), Box::new(capture)) {
                emit_status(data, internal_tx, format!("resizing {}", column.label()));
            }
        }
        MouseEventKind::Drag(MouseButton::Left) if data.capture.is_held() => {
            view.pointer_move(pointer_px(mouse.column));
        }
        MouseEventKind::Up(MouseButton::Left) if data.capture.is_held() => {
            if let Some(column) = view.pointer_up() {
                let width = view.column_widths().get(column);
                emit_status(data, internal_tx, format!("{} width {width}px", column.label()));
            }
        }
        _ => {}
    }
}

fn pointer_px(column: u16) -> i32 {
    i32::from(column) * PX_PER_CELL as i32
}

fn column_cells(width_px: u32) -> u16 {
    u16::try_from((width_px / PX_PER_CELL).max(1)).unwrap_or(u16::MAX)
}

/// Cell geometry of the table view, shared by rendering and hit-testing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TableLayout {
    header_row: u16,
    edges: Vec<(Column, u16)>,
}

impl TableLayout {
    fn new(body: Rect, widths: &ColumnWidths) -> Self {
        // Inside the border, past the checkbox column and its spacer.
        let mut x = body.x + 1 + CHECKBOX_CELLS + 1;
        let mut edges = Vec::with_capacity(Column::COUNT);
        for (column, width) in widths.iter() {
            x = x.saturating_add(column_cells(width));
            edges.push((column, x));
            x = x.saturating_add(1);
        }
        Self {
            header_row: body.y + 1,
            edges,
        }
    }

    fn edge_at(&self, x: u16) -> Option<Column> {
        self.edges
            .iter()
            .find(|(_, edge)| x == *edge || x.saturating_add(1) == *edge)
            .map(|(column, _)| *column)
    }
}

fn body_area(area: Rect) -> Rect {
    main_layout(area)[1]
}

fn main_layout(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(area)
}

fn next_sub_tab(current: Option<CommunicationSubTab>) -> Option<CommunicationSubTab> {
    match current {
        None => Some(CommunicationSubTab::ALL[0]),
        Some(sub_tab) => {
            let index = CommunicationSubTab::ALL
                .iter()
                .position(|candidate| *candidate == sub_tab)
                .unwrap_or(0);
            CommunicationSubTab::ALL.get(index + 1).copied()
        }
    }
}

fn current_assignment<R: RosterRuntime>(
    view: &RosterView,
    runtime: &R,
    data: &ViewData,
) -> Option<RosterCommand> {
    let rows = view.rows(runtime.clients());
    let client = rows.get(data.cursor)?;
    let next = TEAM_MEMBERS
        .iter()
        .position(|member| *member == client.assigned_to)
        .map_or(0, |index| (index + 1) % TEAM_MEMBERS.len());
    Some(RosterCommand::AssignTo {
        client: client.id,
        member: TEAM_MEMBERS[next].to_owned(),
    })
}

fn bulk_action_for_digit(ch: char) -> Option<BulkAction> {
    let index = ch.to_digit(10)?.checked_sub(1)? as usize;
    BulkAction::ALL.get(index).copied()
}

fn bulk_menu_hint() -> String {
    BulkAction::ALL
        .iter()
        .enumerate()
        .map(|(index, action)| format!("{} {}", index + 1, action.label()))
        .collect::<Vec<_>>()
        .join(" · ")
}

const FOLDER_TEMPLATES: [&str; 3] = ["Standard Tax Client", "Business Client", "Minimal"];
const WORKFLOWS: [&str; 3] = ["Tax Preparation", "Bookkeeping", "Advisory"];
const MEETINGS: [&str; 3] = ["Quarterly Review", "Tax Planning Session", "Document Walkthrough"];

fn bulk_choices(action: BulkAction) -> &'static [&'static str] {
    match action {
        BulkAction::AssignTo => &TEAM_MEMBERS,
        BulkAction::CreateFolders => &FOLDER_TEMPLATES,
        BulkAction::CreateProject => &WORKFLOWS,
        BulkAction::InviteToMeeting => &MEETINGS,
        BulkAction::SendLogin | BulkAction::Delete => &[],
    }
}

fn slug(value: &str) -> String {
    value.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

fn bulk_payload(action: BulkAction, choice: usize, now: OffsetDateTime) -> BulkPayload {
    let choices = bulk_choices(action);
    let picked = choices.get(choice).or(choices.first()).copied().unwrap_or_default();
    match action {
        BulkAction::AssignTo => BulkPayload::AssignTo {
            team_member_ids: vec![picked.to_owned()],
        },
        BulkAction::CreateFolders => BulkPayload::CreateFolders(FolderTemplate {
            id: slug(picked),
            name: picked.to_owned(),
            description: String::new(),
            folders: ["Tax Returns", "Source Documents", "Correspondence"]
                .iter()
                .map(|name| FolderNode {
                    id: slug(name),
                    name: (*name).to_owned(),
                    children: Vec::new(),
                    permissions: None,
                })
                .collect(),
            is_default: choice == 0,
        }),
        BulkAction::CreateProject => BulkPayload::CreateProject(ProjectRequest {
            project_name: format!("{picked} {}", now.year()),
            workflow: slug(picked),
            starting_stage: "intake".to_owned(),
            account_manager: TEAM_MEMBERS[0].to_owned(),
        }),
        BulkAction::InviteToMeeting => BulkPayload::InviteToMeeting {
            meeting_id: slug(picked),
        },
        BulkAction::SendLogin => BulkPayload::SendLogin,
        BulkAction::Delete => BulkPayload::Delete,
    }
}

fn picker_groups<'a>(groups: &'a ClientGroups, query: &str) -> Vec<&'a ClientGroup> {
    let found = groups.search(query);
    ClientGroups::categorized(&found)
        .into_iter()
        .flat_map(|(_, members)| members)
        .collect()
}

fn render<R: RosterRuntime>(
    frame: &mut ratatui::Frame<'_>,
    view: &RosterView,
    runtime: &R,
    data: &ViewData,
) {
    let layout = main_layout(frame.area());
    let clients = runtime.clients();
    let counts = view.counts(clients);

    let filter_titles = TypeFilter::ALL
        .iter()
        .map(|filter| format!("{} ({})", filter.label(), counts.for_filter(*filter)))
        .collect::<Vec<String>>();
    let selected_filter = TypeFilter::ALL
        .iter()
        .position(|filter| *filter == view.type_filter())
        .unwrap_or(0);
    let tabs = Tabs::new(filter_titles)
        .block(
            Block::default()
                .title(title_text(view, data))
                .borders(Borders::ALL),
        )
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected_filter);
    frame.render_widget(tabs, layout[0]);

    let rows = view.rows(clients);
    let provider = runtime.context_provider();
    let now = runtime.now();
    match view.view_mode() {
        ViewMode::Table => render_table(frame, layout[1], view, &rows, data),
        ViewMode::Card => {
            let body = Paragraph::new(render_card_text(view, &rows, data, provider, now))
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("clients"));
            frame.render_widget(body, layout[1]);
        }
        ViewMode::List => {
            let body = Paragraph::new(render_list_text(view, &rows, data, provider, now))
                .block(Block::default().borders(Borders::ALL).title("clients"));
            frame.render_widget(body, layout[1]);
        }
    }

    let status = Paragraph::new(status_text(view, rows.len(), counts, runtime.filters_visible(), data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    let overlay = match &data.input {
        InputMode::BulkDialog { choice } => view
            .open_bulk()
            .map(|open| ("bulk action", render_bulk_dialog_text(view, clients, open.action(), *choice))),
        InputMode::TagPicker(picker) => rows.get(data.cursor).map(|client| {
            (
                "client groups",
                render_tag_picker_text(runtime.groups(), client, picker),
            )
        }),
        InputMode::QuickAdd(state) => Some((
            "quick add client",
            render_quick_add_text(state, runtime.groups(), data.submit_gate.is_submitting()),
        )),
        InputMode::Normal | InputMode::Search | InputMode::BulkPending => None,
    };
    if let Some((title, text)) = overlay {
        let area = centered_rect(70, 60, frame.area());
        frame.render_widget(Clear, area);
        let widget = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(widget, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    view: &RosterView,
    rows: &[&ClientRecord],
    data: &ViewData,
) {
    let widths = view.column_widths();
    let resizing = match view.resize_phase() {
        ResizePhase::Resizing(column) => Some(column),
        ResizePhase::Idle => None,
    };
    let header_cells = std::iter::once(Cell::from(if view.selection().is_empty() {
        "[ ]"
    } else {
        "[-]"
    }))
    .chain(
        table_header_labels(view)
            .into_iter()
            .zip(Column::ALL)
            .map(|(label, column)| {
                let style = if resizing == Some(column) {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
                };
                Cell::from(label).style(style)
            }),
    );
    let header = Row::new(header_cells);

    let body_rows = rows
        .iter()
        .enumerate()
        .skip(data.scroll_top)
        .map(|(index, client)| {
            let mut style = Style::default();
            if index == data.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Row::new(
                std::iter::once(checkbox(view, client.id).to_owned())
                    .chain(table_cells(client))
                    .map(Cell::from)
                    .collect::<Vec<_>>(),
            )
            .style(style)
        });

    let constraints = std::iter::once(Constraint::Length(CHECKBOX_CELLS))
        .chain(widths.iter().map(|(_, width)| Constraint::Length(column_cells(width))))
        .collect::<Vec<_>>();
    let table = Table::new(body_rows, constraints)
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL).title("clients"));
    frame.render_widget(table, area);
}

fn title_text(view: &RosterView, data: &ViewData) -> String {
    let sort = view.sort();
    let tab = match (data.tab, data.sub_tab) {
        (FolderTab::Communication, Some(sub_tab)) => {
            format!("{}/{}", data.tab.label(), sub_tab.as_str())
        }
        _ => data.tab.label().to_owned(),
    };
    format!(
        "roster · {} view · sort {} {} · {tab}",
        view.view_mode().as_str(),
        sort.field.label(),
        sort.icon(sort.field).glyph()
    )
}

fn table_header_labels(view: &RosterView) -> Vec<String> {
    let sort = view.sort();
    Column::ALL
        .iter()
        .map(|column| match sort_field_for(*column) {
            Some(field) => format!("{} {}", column.label(), sort.icon(field).glyph()),
            None => column.label().to_owned(),
        })
        .collect()
}

fn sort_field_for(column: Column) -> Option<SortField> {
    match column {
        Column::Client => Some(SortField::Name),
        Column::AssignedTo => Some(SortField::AssignedTo),
        Column::Created => Some(SortField::CreatedDate),
        Column::Contact | Column::Tags => None,
    }
}

fn table_cells(client: &ClientRecord) -> [String; Column::COUNT] {
    [
        format!("{} ({})", client.name, client.client_type.as_str()),
        contact_text(client),
        client.assigned_to.clone(),
        client.created_date.to_string(),
        client.tags.join(", "),
    ]
}

fn contact_text(client: &ClientRecord) -> String {
    match (client.email.is_empty(), client.phone.is_empty()) {
        (false, false) => format!("{} / {}", client.email, client.phone),
        (false, true) => client.email.clone(),
        (true, false) => client.phone.clone(),
        (true, true) => "-".to_owned(),
    }
}

fn checkbox(view: &RosterView, id: ClientId) -> &'static str {
    if view.selection().contains(id) {
        "[x]"
    } else {
        "[ ]"
    }
}

fn context_text(
    provider: &dyn ContextualInfoProvider,
    client: &ClientRecord,
    data: &ViewData,
    now: OffsetDateTime,
) -> String {
    annotate(provider, client, data.tab, data.sub_tab)
        .iter()
        .map(|(field, value)| format!("{field}: {}", value.render(now)))
        .collect::<Vec<_>>()
        .join(" · ")
}

fn cursor_marker(index: usize, data: &ViewData) -> &'static str {
    if index == data.cursor { ">" } else { " " }
}

fn render_card_text(
    view: &RosterView,
    rows: &[&ClientRecord],
    data: &ViewData,
    provider: &dyn ContextualInfoProvider,
    now: OffsetDateTime,
) -> String {
    if rows.is_empty() {
        return "no clients match -- clear the search or change the filter".to_owned();
    }
    let mut lines = Vec::new();
    for (index, client) in rows.iter().enumerate().skip(data.scroll_top) {
        lines.push(format!(
            "{}{} {} · {}",
            cursor_marker(index, data),
            checkbox(view, client.id),
            client.name,
            client.client_type.as_str()
        ));
        lines.push(format!("      {}", context_text(provider, client, data, now)));
        if view.expanded() == Some(client.id) {
            lines.push(format!("      contact: {}", contact_text(client)));
            lines.push(format!(
                "      assigned: {}",
                if client.assigned_to.is_empty() {
                    "unassigned"
                } else {
                    client.assigned_to.as_str()
                }
            ));
            lines.push(format!("      tags: {}", client.tags.join(", ")));
            lines.push(format!("      created: {}", client.created_date));
            if client.has_missing_info() {
                lines.push("      ! missing info".to_owned());
            }
        }
    }
    lines.join("\n")
}

fn render_list_text(
    view: &RosterView,
    rows: &[&ClientRecord],
    data: &ViewData,
    provider: &dyn ContextualInfoProvider,
    now: OffsetDateTime,
) -> String {
    if rows.is_empty() {
        return "no clients match -- clear the search or change the filter".to_owned();
    }
    rows.iter()
        .enumerate()
        .skip(data.scroll_top)
        .map(|(index, client)| {
            format!(
                "{}{} {} | {} | {}",
                cursor_marker(index, data),
                checkbox(view, client.id),
                client.name,
                client.client_type.as_str(),
                context_text(provider, client, data, now)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn status_text(
    view: &RosterView,
    visible: usize,
    counts: RosterCounts,
    filters_visible: bool,
    data: &ViewData,
) -> String {
    if data.input == InputMode::Search {
        return format!("search: {}_ | enter keep · esc clear", view.search_term());
    }
    let mut parts = vec![format!("{visible}/{} clients", counts.all)];
    if !view.selection().is_empty() {
        parts.push(format!("{} selected", view.selection().len()));
    }
    if !view.search_term().is_empty() {
        parts.push(format!("search \"{}\"", view.search_term()));
    }
    if filters_visible {
        parts.push("filters open".to_owned());
    }
    if let Some(status) = &data.status {
        parts.push(status.clone());
    }
    parts.push(
        "/ search · tab filter · 1-4 sort · v view · space/a select · enter open · b bulk · t tags · g assign · n new · q quit"
            .to_owned(),
    );
    parts.join(" | ")
}

fn render_bulk_dialog_text(
    view: &RosterView,
    clients: &[ClientRecord],
    action: BulkAction,
    choice: usize,
) -> String {
    let Some(open) = view.open_bulk() else {
        return String::new();
    };
    let mut lines = vec![format!(
        "{} · {} client(s) selected",
        action.label(),
        open.selected_count()
    )];
    for (index, option) in bulk_choices(action).iter().enumerate() {
        let marker = if index == choice { ">" } else { " " };
        lines.push(format!("{marker} {option}"));
    }
    if action == BulkAction::Delete {
        lines.push("these clients will be deleted:".to_owned());
        lines.extend(
            snapshot_client_names(open.snapshot(), clients)
                .into_iter()
                .map(|name| format!("  - {name}")),
        );
    }
    lines.push(String::new());
    lines.push("y confirm · esc cancel · j/k choose".to_owned());
    lines.join("\n")
}

fn render_tag_picker_text(groups: &ClientGroups, client: &ClientRecord, picker: &TagPickerState) -> String {
    let found = groups.search(&picker.query);
    let mut lines = vec![
        format!("{} · search: {}_", client.name, picker.query),
        String::new(),
    ];
    let mut index = 0;
    for (category, members) in ClientGroups::categorized(&found) {
        lines.push(category.label().to_owned());
        for group in members {
            let marker = if index == picker.cursor { ">" } else { " " };
            let check = if client.has_tag(&group.name) { "[x]" } else { "[ ]" };
            lines.push(format!("{marker} {check} {} - {}", group.name, group.description));
            index += 1;
        }
    }
    if index == 0 {
        lines.push("no groups match -- ctrl+n adds it as a new group".to_owned());
    }
    lines.push(String::new());
    lines.push("enter toggle · ctrl+n add group · esc close".to_owned());
    lines.join("\n")
}

fn render_quick_add_text(state: &QuickAddState, groups: &ClientGroups, submitting: bool) -> String {
    let form = &state.form;
    let flag = |value: bool| if value { "yes" } else { "no" };
    let mut lines = Vec::new();
    for (index, field) in QuickInput::ALL.iter().enumerate() {
        if *field == QuickInput::BusinessName && form.client_type != ClientType::Business {
            continue;
        }
        let value = match field {
            QuickInput::Type => form.client_type.as_str().to_owned(),
            QuickInput::BusinessName => form.business_name.clone(),
            QuickInput::FirstName => form.first_name.clone(),
            QuickInput::MiddleName => form.middle_name.clone(),
            QuickInput::LastName => form.last_name.clone(),
            QuickInput::Email => form.email.clone(),
            QuickInput::Phone => form.phone.clone(),
            QuickInput::Group => groups
                .get(&form.group_id)
                .map_or_else(|| form.group_id.clone(), |group| group.name.clone()),
            QuickInput::SendCredentials => flag(form.send_credentials).to_owned(),
            QuickInput::PlaceholderEmail => flag(form.uses_placeholder_email()).to_owned(),
        };
        let marker = if index == state.field { ">" } else { " " };
        lines.push(format!("{marker} {}: {value}", field.label()));
        if let Some(error) = field.error_key().and_then(|key| state.errors.get(&key)) {
            lines.push(format!("    ! {error}"));
        }
    }
    lines.push(String::new());
    lines.push(if submitting {
        "creating...".to_owned()
    } else {
        "tab next · space toggle · ←/→ group · enter create · esc cancel".to_owned()
    });
    lines.join("\n")
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
