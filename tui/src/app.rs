//! Transient view state and the actions that change it.
//!
//! `App` holds everything the screen shows. It never patches its task list
//! locally: every successful mutation is followed by a full [`App::refresh`]
//! of tasks and stats together. Failed mutations open a blocking alert and
//! leave the rest of the state untouched.

use std::thread;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use task_core::{ApiResponse, CreateTask, Task, TaskApi, TaskStats, TaskStatus, Transport, UpdateTask};
use tracing::{debug, info, warn};

/// Sidebar destinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Tasks,
}

impl View {
    pub const ALL: [View; 2] = [View::Dashboard, View::Tasks];

    pub fn title(self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Tasks => "Tasks",
        }
    }

    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::Tasks,
            View::Tasks => View::Dashboard,
        }
    }
}

/// Local, fetch-free filter over the loaded tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(status) => task.status == status,
        }
    }

    /// Matching tasks in their original order.
    pub fn apply(self, tasks: &[Task]) -> Vec<&Task> {
        tasks.iter().filter(|task| self.matches(task)).collect()
    }

    /// all -> pending -> in_progress -> completed -> all
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(TaskStatus::Pending),
            StatusFilter::Only(TaskStatus::Pending) => StatusFilter::Only(TaskStatus::InProgress),
            StatusFilter::Only(TaskStatus::InProgress) => StatusFilter::Only(TaskStatus::Completed),
            StatusFilter::Only(TaskStatus::Completed) => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All Tasks",
            StatusFilter::Only(TaskStatus::Pending) => "Pending",
            StatusFilter::Only(TaskStatus::InProgress) => "In Progress",
            StatusFilter::Only(TaskStatus::Completed) => "Completed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
}

/// In-progress "new task" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub title: String,
    pub description: String,
    pub focus: FormField,
}

impl CreateForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Title,
        };
    }

    /// Trimmed payload, or `None` when the title is blank.
    pub fn payload(&self) -> Option<CreateTask> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        Some(CreateTask::new(title).with_description(self.description.trim()))
    }
}

/// Blocking overlay. While one is open every other key is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Alert(String),
    ConfirmDelete { id: i64, title: String },
}

pub struct App<T> {
    api: TaskApi<T>,
    pub tasks: Vec<Task>,
    pub stats: Option<TaskStats>,
    pub loading: bool,
    /// Banner text for a failed refresh; cleared by the next refresh.
    pub error: Option<String>,
    pub view: View,
    pub filter: StatusFilter,
    pub form: Option<CreateForm>,
    pub modal: Option<Modal>,
    /// Row index into the filtered list.
    pub selected: usize,
    pub should_quit: bool,
}

impl<T> App<T> {
    /// Tasks passing the current filter, in server order.
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        self.filter.apply(&self.tasks)
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.filtered_tasks().get(self.selected).copied()
    }

    /// Placeholder for an empty task list.
    pub fn empty_message(&self) -> String {
        match self.filter {
            _ if self.tasks.is_empty() => "No tasks found. Create your first task!".to_string(),
            StatusFilter::All => "No tasks found.".to_string(),
            StatusFilter::Only(status) => format!("No {} tasks found.", status.label()),
        }
    }

    pub fn select_next(&mut self) {
        let len = self.filtered_tasks().len();
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.selected = 0;
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.selected = 0;
    }

    /// Open a blank form, or close (and discard) the open one.
    pub fn toggle_form(&mut self) {
        self.form = match self.form {
            Some(_) => None,
            None => Some(CreateForm::default()),
        };
    }

    /// Ask for confirmation before deleting the selected task.
    pub fn request_delete(&mut self) {
        if let Some(task) = self.selected_task() {
            self.modal = Some(Modal::ConfirmDelete {
                id: task.id,
                title: task.title.clone(),
            });
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered_tasks().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    fn alert(&mut self, message: String) {
        warn!("{message}");
        self.modal = Some(Modal::Alert(message));
    }
}

impl<T: Transport> App<T> {
    pub fn new(api: TaskApi<T>) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            stats: None,
            loading: true,
            error: None,
            view: View::default(),
            filter: StatusFilter::default(),
            form: None,
            modal: None,
            selected: 0,
            should_quit: false,
        }
    }

    pub fn api(&self) -> &TaskApi<T> {
        &self.api
    }

    /// Fetch tasks and stats concurrently and apply both results.
    ///
    /// A failing half keeps whatever was loaded before and sets the banner.
    /// When both fail the stats message is the one left showing; both are
    /// logged.
    pub fn refresh(&mut self) {
        self.loading = true;
        self.error = None;

        let api = &self.api;
        let (tasks, stats) = thread::scope(|scope| {
            let tasks = scope.spawn(|| api.get_tasks());
            let stats = api.get_stats();
            let tasks = tasks
                .join()
                .unwrap_or_else(|_| ApiResponse::failure("tasks request panicked"));
            (tasks, stats)
        });

        match tasks.into_result() {
            Ok(tasks) => {
                self.tasks = tasks;
                self.clamp_selection();
            }
            Err(err) => {
                let message = format!("Failed to fetch tasks: {err}");
                warn!("{message}");
                self.error = Some(message);
            }
        }

        match stats.into_result() {
            Ok(stats) => self.stats = Some(stats),
            Err(err) => {
                let message = format!("Failed to fetch stats: {err}");
                warn!("{message}");
                self.error = Some(message);
            }
        }

        self.loading = false;
        info!(
            tasks = self.tasks.len(),
            failed = self.error.is_some(),
            "refresh finished"
        );
    }

    /// Submit the open form. A blank title is ignored without a request.
    pub fn submit_form(&mut self) {
        let Some(payload) = self.form.as_ref().and_then(CreateForm::payload) else {
            debug!("create form submitted without a title");
            return;
        };

        let response = self.api.create_task(&payload);
        if response.success {
            self.form = None;
            self.refresh();
        } else {
            self.alert(format!("Error creating task: {}", response.error_text()));
        }
    }

    /// Set the selected task's status. Any status can follow any other.
    pub fn set_selected_status(&mut self, status: TaskStatus) {
        let Some(task) = self.selected_task() else {
            return;
        };
        if task.status == status {
            return;
        }
        let id = task.id;

        let response = self.api.update_task(id, &UpdateTask::status(status));
        if response.success {
            self.refresh();
        } else {
            self.alert(format!("Error updating task: {}", response.error_text()));
        }
    }

    /// Delete after the user confirmed the modal.
    pub fn delete_task(&mut self, id: i64) {
        let response = self.api.delete_task(id);
        if response.success {
            self.refresh();
        } else {
            self.alert(format!("Error deleting task: {}", response.error_text()));
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        if let Some(modal) = self.modal.take() {
            self.on_modal_key(modal, key.code);
            return;
        }
        if self.view == View::Tasks && self.form.is_some() {
            self.on_form_key(key.code);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::Char('1') => self.view = View::Dashboard,
            KeyCode::Char('2') => self.view = View::Tasks,
            KeyCode::Char('r') => self.refresh(),
            code if self.view == View::Tasks => self.on_task_key(code),
            _ => {}
        }
    }

    fn on_modal_key(&mut self, modal: Modal, code: KeyCode) {
        match modal {
            Modal::Alert(_) if matches!(code, KeyCode::Enter | KeyCode::Esc) => {}
            Modal::ConfirmDelete { id, .. } if matches!(code, KeyCode::Char('y' | 'Y')) => {
                self.delete_task(id)
            }
            Modal::ConfirmDelete { .. } if matches!(code, KeyCode::Char('n' | 'N') | KeyCode::Esc) => {}
            // Blocking: anything else leaves the modal up.
            modal => self.modal = Some(modal),
        }
    }

    fn on_form_key(&mut self, code: KeyCode) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match code {
            KeyCode::Esc => self.form = None,
            KeyCode::Tab => form.toggle_focus(),
            KeyCode::Backspace => {
                form.focused_mut().pop();
            }
            KeyCode::Enter => self.submit_form(),
            KeyCode::Char(c) => form.focused_mut().push(c),
            _ => {}
        }
    }

    fn on_task_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Char('a') => self.toggle_form(),
            KeyCode::Char('f') => self.cycle_filter(),
            KeyCode::Char('p') => self.set_selected_status(TaskStatus::Pending),
            KeyCode::Char('i') => self.set_selected_status(TaskStatus::InProgress),
            KeyCode::Char('c') => self.set_selected_status(TaskStatus::Completed),
            KeyCode::Char('d') => self.request_delete(),
            _ => {}
        }
    }
}
