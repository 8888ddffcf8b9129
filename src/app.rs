use crate::cache::{PetCache, PetStore};
use crate::pet::{validate, FieldValue, PetField, PetRecord, StoredPet, ValidationErrors};
use crate::pet_client::SubmitError;

pub const CREATE_FAILED_MESSAGE: &str = "Failed to add pet";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update pet";

/// Where the user currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    NewPet,
    EditPet { id: String },
}

impl Route {
    /// Record identifier carried by the route, if any.
    pub fn pet_id(&self) -> Option<&str> {
        match self {
            Route::EditPet { id } => Some(id.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Submitting,
}

/// Network call the form wants dispatched.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitRequest {
    Create(PetRecord),
    Update { id: String, record: PetRecord },
}

/// What a successful network call returned.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitSuccess {
    Created,
    Updated { id: String, data: PetRecord },
}

/// Outcome of applying a background list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRefresh {
    Applied,
    /// Fetched before a confirmed write landed; dropped and re-queued.
    Discarded,
    Failed,
}

/// Where the form goes after a submit settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitFinish {
    NavigateHome,
    StayOnForm,
}

/// Editable draft of a pet plus its validation and failure state.
#[derive(Debug, Clone)]
pub struct FormController {
    pub form: PetRecord,
    pub errors: ValidationErrors,
    /// Last submission failure, empty when none.
    pub message: String,
    pub for_new_pet: bool,
    pub phase: FormPhase,
    pub focused: PetField,
    /// Identifies this form instance in submit results. Assigned by [`App`].
    pub token: u64,
    /// Raw text of the focused control.
    buffer: String,
}

impl FormController {
    pub fn new(pet_form: PetRecord, for_new_pet: bool) -> Self {
        let focused = PetField::Name;
        let buffer = pet_form.field_text(focused);
        Self {
            form: pet_form,
            errors: ValidationErrors::new(),
            message: String::new(),
            for_new_pet,
            phase: FormPhase::Idle,
            focused,
            token: 0,
            buffer,
        }
    }

    pub fn title(&self) -> &'static str {
        if self.for_new_pet {
            "Add a Pet"
        } else {
            "Edit Pet"
        }
    }

    /// Replace exactly one field of the draft.
    pub fn handle_field_change(&mut self, field: PetField, value: FieldValue) {
        self.form = self.form.with_field(field, value);
    }

    pub fn validate(&self) -> ValidationErrors {
        validate(&self.form)
    }

    pub fn is_submitting(&self) -> bool {
        self.phase == FormPhase::Submitting
    }

    /// Text to display for `field`: the live buffer when focused, the draft otherwise.
    pub fn display_text(&self, field: PetField) -> String {
        if field == self.focused && !field.is_checkbox() {
            self.buffer.clone()
        } else {
            self.form.field_text(field)
        }
    }

    pub fn focus(&mut self, field: PetField) {
        self.focused = field;
        self.buffer = self.form.field_text(field);
    }

    pub fn focus_next(&mut self) {
        self.focus(self.focused.next());
    }

    pub fn focus_prev(&mut self) {
        self.focus(self.focused.prev());
    }

    /// Type one character into the focused text control.
    pub fn type_char(&mut self, c: char) {
        let field = self.focused;
        if field.is_checkbox() {
            if c == ' ' {
                self.toggle_checkbox();
            }
            return;
        }
        if field == PetField::Age && !c.is_ascii_digit() {
            return;
        }
        if let Some(max) = field.max_len() {
            if self.buffer.chars().count() >= max {
                return;
            }
        }
        self.buffer.push(c);
        self.handle_field_change(field, FieldValue::Text(self.buffer.clone()));
    }

    pub fn backspace(&mut self) {
        let field = self.focused;
        if field.is_checkbox() || self.buffer.pop().is_none() {
            return;
        }
        self.handle_field_change(field, FieldValue::Text(self.buffer.clone()));
    }

    pub fn toggle_checkbox(&mut self) {
        if self.focused.is_checkbox() {
            let checked = !self.form.poddy_trained;
            self.handle_field_change(PetField::PoddyTrained, FieldValue::Checked(checked));
        }
    }

    /// Validate and, when clean, hand back the request to dispatch.
    /// Ignored entirely while an earlier submit is still in flight.
    pub fn submit(&mut self, route: &Route) -> Option<SubmitRequest> {
        if self.is_submitting() {
            tracing::debug!("submit ignored, previous submit still in flight");
            return None;
        }

        self.errors = self.validate();
        if !self.errors.is_empty() {
            let fields: Vec<&str> = self.errors.keys().map(|f| f.as_str()).collect();
            tracing::debug!(?fields, "submit blocked by validation");
            return None;
        }

        let request = if self.for_new_pet {
            SubmitRequest::Create(self.form.clone())
        } else {
            match route.pet_id() {
                Some(id) => SubmitRequest::Update {
                    id: id.to_string(),
                    record: self.form.clone(),
                },
                None => {
                    tracing::warn!(error = %SubmitError::MissingId, "update not dispatched");
                    self.message = UPDATE_FAILED_MESSAGE.to_string();
                    return None;
                }
            }
        };

        self.message.clear();
        self.phase = FormPhase::Submitting;
        Some(request)
    }

    /// Apply the outcome of a dispatched request.
    pub fn finish_submit(
        &mut self,
        result: Result<SubmitSuccess, SubmitError>,
        store: &mut impl PetStore,
    ) -> SubmitFinish {
        self.phase = FormPhase::Idle;
        match result {
            Ok(SubmitSuccess::Created) => SubmitFinish::NavigateHome,
            Ok(SubmitSuccess::Updated { id, data }) => {
                store.upsert(&id, data);
                SubmitFinish::NavigateHome
            }
            Err(e) => {
                let message = if self.for_new_pet {
                    CREATE_FAILED_MESSAGE
                } else {
                    UPDATE_FAILED_MESSAGE
                };
                tracing::warn!(error = %e, "{}", message);
                self.message = message.to_string();
                SubmitFinish::StayOnForm
            }
        }
    }
}

/// Full application state.
pub struct App {
    pub cache: PetCache,
    pub route: Route,
    /// Open form, present unless the route is Home.
    pub form: Option<FormController>,
    /// Index of the selected pet on the home list.
    pub selected_index: usize,
    /// True while the initial pet list is loading.
    pub loading: bool,
    /// True while a background list refresh is running.
    pub list_refreshing: bool,
    /// A refresh was asked for while another was running.
    pub refresh_queued: bool,
    /// Pet whose record is being fetched to open the edit form.
    pub pending_edit: Option<String>,
    /// Flash message (error or success), cleared on next keypress.
    pub flash: Option<String>,
    /// Age of the snapshot loaded at startup, in seconds.
    pub cache_stale_age_secs: Option<u64>,
    pub show_keybindings: bool,
    pub should_quit: bool,
    next_form_token: u64,
    /// Bumped on every confirmed write to the store.
    cache_generation: u64,
}

impl App {
    pub fn new() -> Self {
        Self {
            cache: PetCache::empty(),
            route: Route::Home,
            form: None,
            selected_index: 0,
            loading: true,
            list_refreshing: false,
            refresh_queued: false,
            pending_edit: None,
            flash: None,
            cache_stale_age_secs: None,
            show_keybindings: false,
            should_quit: false,
            next_form_token: 0,
            cache_generation: 0,
        }
    }

    pub fn is_form_open(&self) -> bool {
        self.form.is_some()
    }

    fn install_form(&mut self, route: Route, mut form: FormController) {
        self.next_form_token += 1;
        form.token = self.next_form_token;
        self.route = route;
        self.form = Some(form);
        self.pending_edit = None;
    }

    pub fn open_new_form(&mut self) {
        self.install_form(Route::NewPet, FormController::new(PetRecord::default(), true));
    }

    /// Open the form in update mode seeded from `pet_form`.
    pub fn open_edit_form_with(&mut self, id: &str, pet_form: PetRecord) {
        self.install_form(
            Route::EditPet { id: id.to_string() },
            FormController::new(pet_form, false),
        );
    }

    /// Open the form in update mode seeded from the store. Returns false for unknown ids.
    pub fn open_edit_form(&mut self, id: &str) -> bool {
        match self.cache.get_by_id(id).cloned() {
            Some(record) => {
                self.open_edit_form_with(id, record);
                true
            }
            None => false,
        }
    }

    /// Mark `id` as being fetched for editing.
    pub fn begin_edit_fetch(&mut self, id: &str) {
        self.pending_edit = Some(id.to_string());
    }

    /// Open the edit form from a fetched record, unless the user moved on meanwhile.
    /// Returns true when the form was opened.
    pub fn apply_fetched_pet(&mut self, id: &str, result: Result<StoredPet, String>) -> bool {
        if self.pending_edit.as_deref() != Some(id) {
            tracing::debug!(%id, "fetched pet no longer wanted");
            return false;
        }
        self.pending_edit = None;
        match result {
            Ok(pet) => {
                self.open_edit_form_with(id, pet.record);
                true
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "could not load pet for editing");
                self.flash = Some(format!("Could not load pet {}", id));
                false
            }
        }
    }

    pub fn navigate_home(&mut self) {
        self.route = Route::Home;
        self.form = None;
        self.clamp_selection();
    }

    /// Submit the open form. The returned token must come back with the result.
    pub fn submit_form(&mut self) -> Option<(u64, SubmitRequest)> {
        let route = self.route.clone();
        let form = self.form.as_mut()?;
        let token = form.token;
        form.submit(&route).map(|request| (token, request))
    }

    /// Apply a finished submit sent by the form holding `token`.
    /// Returns true when the app navigated home.
    pub fn finish_submit(&mut self, token: u64, result: Result<SubmitSuccess, SubmitError>) -> bool {
        if matches!(result, Ok(SubmitSuccess::Updated { .. })) {
            self.cache_generation += 1;
        }
        let form = match self.form.as_mut() {
            Some(form) if form.token == token => form,
            _ => {
                // Sender was closed mid-flight; the confirmed write still lands.
                match result {
                    Ok(SubmitSuccess::Updated { id, data }) => self.cache.upsert(&id, data),
                    Ok(SubmitSuccess::Created) => {}
                    Err(e) => tracing::warn!(error = %e, "submit failed after its form closed"),
                }
                return false;
            }
        };
        match form.finish_submit(result, &mut self.cache) {
            SubmitFinish::NavigateHome => {
                self.navigate_home();
                true
            }
            SubmitFinish::StayOnForm => false,
        }
    }

    /// Start a list refresh unless one is running. Returns the store generation the
    /// refresh must carry back, or None when it was queued behind the running one.
    pub fn begin_list_refresh(&mut self) -> Option<u64> {
        if self.list_refreshing {
            self.refresh_queued = true;
            return None;
        }
        self.list_refreshing = true;
        self.refresh_queued = false;
        Some(self.cache_generation)
    }

    /// Apply a list fetched at store generation `generation`.
    pub fn apply_pet_list(
        &mut self,
        generation: u64,
        result: Result<Vec<StoredPet>, String>,
    ) -> ListRefresh {
        self.list_refreshing = false;
        self.loading = false;
        match result {
            Ok(_) if generation != self.cache_generation => {
                tracing::debug!(generation, current = self.cache_generation, "stale pet list dropped");
                self.refresh_queued = true;
                ListRefresh::Discarded
            }
            Ok(pets) => {
                tracing::info!(count = pets.len(), "pet list refreshed");
                self.cache.replace_all(pets);
                self.cache_stale_age_secs = None;
                self.clamp_selection();
                ListRefresh::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "pet list refresh failed");
                self.flash = Some(format!("Refresh failed: {}", e));
                ListRefresh::Failed
            }
        }
    }

    pub fn replace_cache(&mut self, cache: PetCache) {
        self.cache = cache;
        self.clamp_selection();
    }

    pub fn selected_pet_id(&self) -> Option<String> {
        self.cache
            .pets()
            .get(self.selected_index)
            .map(|(id, _)| id.to_string())
    }

    pub fn clamp_selection(&mut self) {
        let count = self.cache.len();
        if count == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= count {
            self.selected_index = count - 1;
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.cache.len() {
            self.selected_index += 1;
        }
    }

    pub fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn toggle_keybindings(&mut self) {
        self.show_keybindings = !self.show_keybindings;
    }

    pub fn close_keybindings(&mut self) {
        self.show_keybindings = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(name: &str) -> PetRecord {
        PetRecord {
            name: name.to_string(),
            owner_name: "Sam".to_string(),
            species: "Cat".to_string(),
            image_url: "http://x/y.png".to_string(),
            ..PetRecord::default()
        }
    }

    fn app_with_pet(id: &str, record: PetRecord) -> App {
        let mut app = App::new();
        app.loading = false;
        app.cache.replace_all(vec![StoredPet {
            id: id.to_string(),
            record,
        }]);
        app
    }

    #[test]
    fn missing_name_blocks_submit_with_message() {
        let mut form = FormController::new(seeded(""), true);
        let request = form.submit(&Route::NewPet);

        assert_eq!(request, None);
        assert_eq!(form.errors.len(), 1);
        assert_eq!(form.errors.get(&PetField::Name), Some(&"Name is required"));
        assert_eq!(form.phase, FormPhase::Idle);
    }

    #[test]
    fn errors_are_recomputed_on_each_attempt() {
        let mut form = FormController::new(PetRecord::default(), true);
        assert!(form.submit(&Route::NewPet).is_none());
        assert_eq!(form.errors.len(), 4);

        form.handle_field_change(PetField::Name, FieldValue::Text("Rex".into()));
        form.handle_field_change(PetField::OwnerName, FieldValue::Text("Sam".into()));
        assert!(form.submit(&Route::NewPet).is_none());
        assert_eq!(
            form.errors.keys().copied().collect::<Vec<_>>(),
            vec![PetField::Species, PetField::ImageUrl]
        );
    }

    #[test]
    fn valid_new_pet_submits_create_with_current_draft() {
        let mut form = FormController::new(seeded("Rex"), true);
        let request = form.submit(&Route::NewPet);

        assert_eq!(request, Some(SubmitRequest::Create(seeded("Rex"))));
        assert!(form.errors.is_empty());
        assert!(form.is_submitting());
    }

    #[test]
    fn edit_submits_update_with_route_id() {
        let mut form = FormController::new(seeded("Rex"), false);
        let request = form.submit(&Route::EditPet { id: "42".into() });

        assert_eq!(
            request,
            Some(SubmitRequest::Update {
                id: "42".into(),
                record: seeded("Rex"),
            })
        );
    }

    #[test]
    fn edit_without_route_id_fails_without_dispatch() {
        let mut form = FormController::new(seeded("Rex"), false);
        assert_eq!(form.submit(&Route::NewPet), None);
        assert_eq!(form.message, UPDATE_FAILED_MESSAGE);
        assert_eq!(form.phase, FormPhase::Idle);
    }

    #[test]
    fn second_submit_is_ignored_while_in_flight() {
        let mut form = FormController::new(seeded("Rex"), true);
        assert!(form.submit(&Route::NewPet).is_some());
        assert!(form.submit(&Route::NewPet).is_none());

        let mut cache = PetCache::empty();
        form.finish_submit(Err(SubmitError::Status(500)), &mut cache);
        assert!(form.submit(&Route::NewPet).is_some());
    }

    #[test]
    fn create_failure_sets_message_and_keeps_draft() {
        let mut form = FormController::new(seeded("Rex"), true);
        form.submit(&Route::NewPet);
        let mut cache = PetCache::empty();

        let finish = form.finish_submit(Err(SubmitError::Status(400)), &mut cache);

        assert_eq!(finish, SubmitFinish::StayOnForm);
        assert_eq!(form.message, CREATE_FAILED_MESSAGE);
        assert_eq!(form.form, seeded("Rex"));
        assert!(cache.is_empty());
    }

    #[test]
    fn update_failure_leaves_cache_untouched() {
        let mut app = app_with_pet("42", seeded("Rex"));
        assert!(app.open_edit_form("42"));
        if let Some(form) = app.form.as_mut() {
            form.handle_field_change(PetField::Name, FieldValue::Text("Max".into()));
        }
        let (token, _) = app.submit_form().expect("update dispatched");

        let navigated = app.finish_submit(token, Err(SubmitError::Status(500)));

        assert!(!navigated);
        assert_eq!(app.route, Route::EditPet { id: "42".into() });
        let form = app.form.as_ref().expect("form stays open");
        assert_eq!(form.message, UPDATE_FAILED_MESSAGE);
        assert_eq!(form.form.name, "Max");
        assert_eq!(app.cache.get_by_id("42").map(|r| r.name.as_str()), Some("Rex"));
    }

    #[test]
    fn update_success_writes_server_data_and_navigates_home() {
        let mut app = app_with_pet("42", seeded("Rex"));
        app.open_edit_form("42");
        let (token, _) = app.submit_form().expect("update dispatched");

        let mut data = seeded("Rex");
        data.age = Some(9);
        let navigated = app.finish_submit(token, Ok(SubmitSuccess::Updated {
            id: "42".into(),
            data: data.clone(),
        }));

        assert!(navigated);
        assert_eq!(app.route, Route::Home);
        assert!(app.form.is_none());
        assert_eq!(app.cache.get_by_id("42"), Some(&data));
    }

    #[test]
    fn create_success_navigates_home_without_cache_write() {
        let mut app = App::new();
        app.open_new_form();
        if let Some(form) = app.form.as_mut() {
            form.form = seeded("Rex");
        }
        let (token, _) = app.submit_form().expect("create dispatched");

        assert!(app.finish_submit(token, Ok(SubmitSuccess::Created)));
        assert_eq!(app.route, Route::Home);
        assert!(app.cache.is_empty());
    }

    #[test]
    fn message_survives_edits_and_clears_on_next_dispatch() {
        let mut form = FormController::new(seeded("Rex"), true);
        form.submit(&Route::NewPet);
        form.finish_submit(Err(SubmitError::Status(503)), &mut PetCache::empty());

        form.type_char('y');
        assert_eq!(form.message, CREATE_FAILED_MESSAGE);

        form.handle_field_change(PetField::Name, FieldValue::Text(String::new()));
        assert!(form.submit(&Route::NewPet).is_none());
        assert_eq!(form.message, CREATE_FAILED_MESSAGE);

        form.handle_field_change(PetField::Name, FieldValue::Text("Rex".into()));
        assert!(form.submit(&Route::NewPet).is_some());
        assert!(form.message.is_empty());
    }

    #[test]
    fn typing_respects_max_length() {
        let mut form = FormController::new(PetRecord::default(), true);
        for _ in 0..25 {
            form.type_char('a');
        }
        assert_eq!(form.form.name.chars().count(), 20);
        assert_eq!(form.display_text(PetField::Name), form.form.name);
    }

    #[test]
    fn age_accepts_digits_only() {
        let mut form = FormController::new(PetRecord::default(), true);
        form.focus(PetField::Age);
        for c in "1x2".chars() {
            form.type_char(c);
        }
        assert_eq!(form.form.age, Some(12));
        form.backspace();
        form.backspace();
        assert_eq!(form.form.age, None);
    }

    #[test]
    fn list_buffer_keeps_raw_text_while_draft_holds_items() {
        let mut form = FormController::new(PetRecord::default(), true);
        form.focus(PetField::Diet);
        for c in "fish, ".chars() {
            form.type_char(c);
        }
        assert_eq!(form.display_text(PetField::Diet), "fish, ");
        assert_eq!(form.form.diet, vec!["fish"]);

        form.focus_next();
        assert_eq!(form.display_text(PetField::Diet), "fish");
    }

    #[test]
    fn space_toggles_checkbox_only_when_focused() {
        let mut form = FormController::new(PetRecord::default(), true);
        form.focus(PetField::PoddyTrained);
        form.type_char(' ');
        assert!(form.form.poddy_trained);
        form.type_char('x');
        assert!(form.form.poddy_trained);
        form.toggle_checkbox();
        assert!(!form.form.poddy_trained);
    }

    #[test]
    fn keystroke_changes_only_focused_field() {
        let before = seeded("Rex");
        let mut form = FormController::new(before.clone(), true);
        form.focus(PetField::Species);
        form.type_char('s');

        assert_eq!(form.form.species, "Cats");
        assert_eq!(
            PetRecord {
                species: before.species.clone(),
                ..form.form.clone()
            },
            before
        );
    }

    #[test]
    fn update_landing_after_cancel_still_writes_cache() {
        let mut app = app_with_pet("42", seeded("Rex"));
        app.open_edit_form("42");
        let (token, _) = app.submit_form().expect("update dispatched");
        app.navigate_home();

        let navigated = app.finish_submit(token, Ok(SubmitSuccess::Updated {
            id: "42".into(),
            data: seeded("Max"),
        }));

        assert!(!navigated);
        assert_eq!(app.cache.get_by_id("42").map(|r| r.name.as_str()), Some("Max"));
    }

    #[test]
    fn open_edit_form_requires_known_id() {
        let mut app = app_with_pet("1", seeded("Rex"));
        assert!(!app.open_edit_form("2"));
        assert!(app.form.is_none());
        assert!(app.open_edit_form("1"));
        assert_eq!(app.form.as_ref().map(|f| f.title()), Some("Edit Pet"));
    }

    #[test]
    fn selection_clamps_after_cache_shrinks() {
        let mut app = app_with_pet("1", seeded("Rex"));
        let mut bigger = PetCache::empty();
        bigger.replace_all(vec![
            StoredPet { id: "1".into(), record: seeded("Rex") },
            StoredPet { id: "2".into(), record: seeded("Tom") },
        ]);
        app.replace_cache(bigger);
        app.move_selection_down();
        app.move_selection_down();
        assert_eq!(app.selected_index, 1);
        assert_eq!(app.selected_pet_id().as_deref(), Some("2"));

        app.replace_cache(PetCache::empty());
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_pet_id(), None);
    }

    /// Submit an update for pet 42, close that form and open a fresh create form.
    fn update_in_flight_then_new_form() -> (App, u64) {
        let mut app = app_with_pet("42", seeded("Rex"));
        app.open_edit_form("42");
        let (token, _) = app.submit_form().expect("update dispatched");
        app.navigate_home();
        app.open_new_form();
        if let Some(form) = app.form.as_mut() {
            form.type_char('B');
        }
        (app, token)
    }

    #[test]
    fn stale_update_failure_does_not_touch_new_form() {
        let (mut app, token) = update_in_flight_then_new_form();

        let navigated = app.finish_submit(token, Err(SubmitError::Status(500)));

        assert!(!navigated);
        assert_eq!(app.route, Route::NewPet);
        let form = app.form.as_ref().expect("new form stays open");
        assert!(form.message.is_empty());
        assert_eq!(form.form.name, "B");
        assert_eq!(form.phase, FormPhase::Idle);
    }

    #[test]
    fn stale_update_success_lands_without_closing_new_form() {
        let (mut app, token) = update_in_flight_then_new_form();

        let navigated = app.finish_submit(token, Ok(SubmitSuccess::Updated {
            id: "42".into(),
            data: seeded("Max"),
        }));

        assert!(!navigated);
        assert_eq!(app.route, Route::NewPet);
        assert_eq!(app.form.as_ref().map(|f| f.form.name.as_str()), Some("B"));
        assert_eq!(app.cache.get_by_id("42").map(|r| r.name.as_str()), Some("Max"));
    }

    #[test]
    fn reopened_form_gets_a_fresh_token() {
        let mut app = app_with_pet("42", seeded("Rex"));
        app.open_edit_form("42");
        let first = app.form.as_ref().map(|f| f.token);
        app.navigate_home();
        app.open_edit_form("42");
        assert_ne!(app.form.as_ref().map(|f| f.token), first);
    }

    #[test]
    fn list_fetched_before_confirmed_update_is_dropped() {
        let mut app = app_with_pet("42", seeded("Rex"));
        let generation = app.begin_list_refresh().expect("startup refresh starts");

        app.open_edit_form("42");
        let (token, _) = app.submit_form().expect("update dispatched");
        assert!(app.finish_submit(token, Ok(SubmitSuccess::Updated {
            id: "42".into(),
            data: seeded("Max"),
        })));
        // Refresh on returning home queues behind the one still running.
        assert_eq!(app.begin_list_refresh(), None);

        let stale = vec![StoredPet { id: "42".into(), record: seeded("Rex") }];
        assert_eq!(app.apply_pet_list(generation, Ok(stale)), ListRefresh::Discarded);

        assert_eq!(app.cache.get_by_id("42").map(|r| r.name.as_str()), Some("Max"));
        assert!(!app.list_refreshing);
        assert!(app.refresh_queued);

        let next = app.begin_list_refresh().expect("queued refresh starts");
        let fresh = vec![StoredPet { id: "42".into(), record: seeded("Max") }];
        assert_eq!(app.apply_pet_list(next, Ok(fresh)), ListRefresh::Applied);
        assert!(!app.refresh_queued);
    }

    #[test]
    fn current_list_replaces_store_and_failure_flashes() {
        let mut app = App::new();
        let generation = app.begin_list_refresh().expect("refresh starts");
        let pets = vec![StoredPet { id: "1".into(), record: seeded("Rex") }];
        assert_eq!(app.apply_pet_list(generation, Ok(pets)), ListRefresh::Applied);
        assert!(!app.loading);
        assert_eq!(app.cache.len(), 1);

        let generation = app.begin_list_refresh().expect("refresh starts");
        assert_eq!(
            app.apply_pet_list(generation, Err("connection refused".into())),
            ListRefresh::Failed
        );
        assert_eq!(app.cache.len(), 1);
        assert_eq!(app.flash.as_deref(), Some("Refresh failed: connection refused"));
    }

    #[test]
    fn fetched_pet_opens_edit_form_when_still_wanted() {
        let mut app = App::new();
        app.begin_edit_fetch("42");

        let pet = StoredPet { id: "42".into(), record: seeded("Rex") };
        assert!(app.apply_fetched_pet("42", Ok(pet)));

        assert_eq!(app.route, Route::EditPet { id: "42".into() });
        assert_eq!(app.pending_edit, None);
        assert_eq!(app.form.as_ref().map(|f| f.title()), Some("Edit Pet"));
    }

    #[test]
    fn fetched_pet_is_ignored_after_user_opened_another_form() {
        let mut app = App::new();
        app.begin_edit_fetch("42");
        app.open_new_form();

        let pet = StoredPet { id: "42".into(), record: seeded("Rex") };
        assert!(!app.apply_fetched_pet("42", Ok(pet)));
        assert_eq!(app.route, Route::NewPet);
    }

    #[test]
    fn failed_fetch_flashes_and_stays_home() {
        let mut app = App::new();
        app.begin_edit_fetch("42");

        assert!(!app.apply_fetched_pet("42", Err("404".into())));
        assert_eq!(app.route, Route::Home);
        assert_eq!(app.flash.as_deref(), Some("Could not load pet 42"));
        assert_eq!(app.pending_edit, None);
    }
}
