//! Ward list controller.
//!
//! [`PatientListCtrl`] owns the patients shown on the list and drives the modal editing
//! workflow: [`PatientListCtrl::edit_item`] switches to [`ListState::Editing`] and opens a modal
//! for one item, [`PatientListCtrl::settle`] awaits the modal and applies its outcome.
//!
//! Only one edit is expected at a time; nothing here prevents a second `edit_item` while a
//! modal is open.

use crate::config::UiConfig;
use crate::modal::{
    DialogConfig, DialogResolve, Dismissed, ModalOutcome, ModalPromise, ModalService,
};
use crate::patient::{Item, Patient};
use crate::schema::Schema;
use crate::{OpalError, OpalResult};
use serde_json::{Map, Value};
use std::sync::Arc;

/// UI state of the list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListState {
    #[default]
    Normal,
    Editing,
}

/// Row, column and item indices of an edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditTarget {
    pub rix: usize,
    pub cix: usize,
    pub iix: usize,
}

/// An open edit modal waiting to be settled.
#[derive(Debug)]
#[must_use = "an edit must be settled to leave the editing state"]
pub struct PendingEdit {
    target: EditTarget,
    promise: ModalPromise,
}

impl PendingEdit {
    pub fn target(&self) -> EditTarget {
        self.target
    }
}

/// How a modal edit ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditClose {
    Cancelled,
    Saved,
    Dismissed,
}

/// Result of settling a [`PendingEdit`].
#[derive(Debug)]
pub enum EditResolution {
    Closed(EditClose),
    /// The modal asked for another item; a new modal is open on the next slot.
    Reopened(PendingEdit),
}

/// Controller for the patient list and its edit modals.
pub struct PatientListCtrl<M> {
    cfg: Arc<UiConfig>,
    schema: Arc<Schema>,
    patients: Vec<Patient>,
    modal_service: M,
    state: ListState,
    target: Option<EditTarget>,
}

impl<M: ModalService> PatientListCtrl<M> {
    pub fn new(
        cfg: Arc<UiConfig>,
        schema: Arc<Schema>,
        patients: Vec<Patient>,
        modal_service: M,
    ) -> Self {
        Self {
            cfg,
            schema,
            patients,
            modal_service,
            state: ListState::Normal,
            target: None,
        }
    }

    pub fn state(&self) -> ListState {
        self.state
    }

    /// Indices of the most recent edit; meaningful while the state is `Editing`.
    pub fn target(&self) -> Option<EditTarget> {
        self.target
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    pub fn modal_service(&self) -> &M {
        &self.modal_service
    }

    /// Opens the edit modal for item `iix` of column `cix` of patient `rix`.
    ///
    /// An `iix` at or past the end of the column addresses a new item: the modal is opened with
    /// an empty item, which is appended if the modal saves. Appending always lands at the end of
    /// the column, so a save on `iix` past `len` stores the item at index `len`.
    ///
    /// # Errors
    ///
    /// Returns `OpalError::RowOutOfRange` / `ColumnOutOfRange` for bad indices; the state is
    /// left unchanged in that case.
    pub fn edit_item(&mut self, rix: usize, cix: usize, iix: usize) -> OpalResult<PendingEdit> {
        let column = self.schema.column(cix).ok_or(OpalError::ColumnOutOfRange {
            cix,
            len: self.schema.len(),
        })?;
        let patient = self.patients.get(rix).ok_or(OpalError::RowOutOfRange {
            rix,
            len: self.patients.len(),
        })?;

        let target = EditTarget { rix, cix, iix };
        self.target = Some(target);
        self.state = ListState::Editing;

        let item = patient.item(&column.name, iix).cloned().unwrap_or_default();
        tracing::info!(
            "editing patient {} column '{}' item {}",
            patient.id(),
            column.name,
            iix
        );

        let config = DialogConfig {
            template_url: self.cfg.modal_template_url(&column.name),
            controller: self.cfg.edit_controller().to_string(),
            resolve: DialogResolve::new(item),
        };
        let promise = self.modal_service.dialog(config).open();

        Ok(PendingEdit { target, promise })
    }

    /// Awaits the modal of `pending` and applies its outcome.
    ///
    /// - add-another opens a new modal on the next item slot and stays `Editing`;
    /// - cancel and dismissal return to `Normal` without touching data;
    /// - save merges the payload into the item (appending a new item) and returns to `Normal`;
    ///   a rejected payload leaves the data untouched but still returns to `Normal`.
    pub async fn settle(&mut self, pending: PendingEdit) -> OpalResult<EditResolution> {
        let PendingEdit { target, promise } = pending;

        let outcome = match promise.await {
            Ok(outcome) => outcome,
            Err(Dismissed) => {
                tracing::debug!("edit modal dismissed");
                self.state = ListState::Normal;
                return Ok(EditResolution::Closed(EditClose::Dismissed));
            }
        };
        tracing::debug!("edit modal closed with '{}'", outcome.kind());

        match outcome {
            ModalOutcome::AddAnother => {
                let next = self.edit_item(target.rix, target.cix, target.iix + 1)?;
                Ok(EditResolution::Reopened(next))
            }
            ModalOutcome::Cancel => {
                self.state = ListState::Normal;
                Ok(EditResolution::Closed(EditClose::Cancelled))
            }
            ModalOutcome::Saved(payload) => {
                let applied = self.apply_saved(target, &payload);
                self.state = ListState::Normal;
                applied?;
                Ok(EditResolution::Closed(EditClose::Saved))
            }
        }
    }

    /// Opens an edit and settles it, following add-another requests until a modal closes.
    pub async fn run_edit(&mut self, rix: usize, cix: usize, iix: usize) -> OpalResult<EditClose> {
        let mut pending = self.edit_item(rix, cix, iix)?;
        loop {
            match self.settle(pending).await? {
                EditResolution::Closed(close) => return Ok(close),
                EditResolution::Reopened(next) => pending = next,
            }
        }
    }

    /// Applies a save payload to the target item, or appends a new item when the target slot is
    /// past the end. Single columns never grow past one item.
    fn apply_saved(&mut self, target: EditTarget, payload: &Map<String, Value>) -> OpalResult<()> {
        let column = self
            .schema
            .column(target.cix)
            .ok_or(OpalError::ColumnOutOfRange {
                cix: target.cix,
                len: self.schema.len(),
            })?;
        let len = self.patients.len();
        let patient = self
            .patients
            .get_mut(target.rix)
            .ok_or(OpalError::RowOutOfRange { rix: target.rix, len })?;
        let patient_id = patient.id();
        let items = patient
            .items_mut(&column.name)
            .ok_or_else(|| OpalError::UnknownColumn(column.name.clone()))?;

        let occupied = column.single && !items.is_empty();
        let index = match items.get_mut(target.iix) {
            Some(item) => {
                item.apply(column, payload)?;
                target.iix
            }
            None if occupied => {
                return Err(OpalError::SingleColumnOccupied(column.name.clone()));
            }
            None => {
                let mut item = Item::default();
                item.apply(column, payload)?;
                items.push(item);
                items.len() - 1
            }
        };
        tracing::info!("saved patient {} column '{}' item {}", patient_id, column.name, index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::{Modal, ModalResolver};
    use crate::patient::tests::patient_data;
    use crate::schema::tests::ward_schema;
    use crate::values::FieldValue;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Modal service that records every dialog and keeps the resolvers for the test to settle.
    #[derive(Clone, Default)]
    struct ManualModals {
        configs: Rc<RefCell<Vec<DialogConfig>>>,
        resolvers: Rc<RefCell<Vec<ModalResolver>>>,
        opened: Rc<RefCell<usize>>,
    }

    struct ManualModal {
        resolvers: Rc<RefCell<Vec<ModalResolver>>>,
        opened: Rc<RefCell<usize>>,
    }

    impl Modal for ManualModal {
        fn open(self: Box<Self>) -> ModalPromise {
            let (resolver, promise) = ModalPromise::channel();
            self.resolvers.borrow_mut().push(resolver);
            *self.opened.borrow_mut() += 1;
            promise
        }
    }

    impl ModalService for ManualModals {
        fn dialog(&self, config: DialogConfig) -> Box<dyn Modal> {
            self.configs.borrow_mut().push(config);
            Box::new(ManualModal {
                resolvers: self.resolvers.clone(),
                opened: self.opened.clone(),
            })
        }
    }

    impl ManualModals {
        fn last_config(&self) -> DialogConfig {
            self.configs.borrow().last().cloned().expect("a dialog was configured")
        }

        fn resolve_next(&self, outcome: ModalOutcome) {
            let resolver = self.resolvers.borrow_mut().remove(0);
            resolver.resolve(outcome);
        }

        fn dismiss_next(&self) {
            let resolver = self.resolvers.borrow_mut().remove(0);
            resolver.dismiss();
        }
    }

    fn controller() -> (PatientListCtrl<ManualModals>, ManualModals) {
        let schema = ward_schema();
        let patients = vec![Patient::new(&patient_data(), &schema).expect("patient")];
        let modals = ManualModals::default();
        let ctrl = PatientListCtrl::new(
            Arc::new(UiConfig::default()),
            Arc::new(schema),
            patients,
            modals.clone(),
        );
        (ctrl, modals)
    }

    fn saved(payload: Value) -> ModalOutcome {
        ModalOutcome::from_value(payload).expect("payload")
    }

    #[test]
    fn new_controller_is_normal() {
        let (ctrl, _) = controller();
        assert_eq!(ctrl.state(), ListState::Normal);
        assert_eq!(ctrl.target(), None);
    }

    #[test]
    fn edit_item_selects_item_and_enters_editing() {
        let (mut ctrl, _) = controller();
        let pending = ctrl.edit_item(0, 0, 0).expect("edit");
        assert_eq!(ctrl.state(), ListState::Editing);
        assert_eq!(ctrl.target(), Some(EditTarget { rix: 0, cix: 0, iix: 0 }));
        assert_eq!(pending.target(), EditTarget { rix: 0, cix: 0, iix: 0 });
    }

    #[test]
    fn edit_item_configures_and_opens_demographics_modal() {
        let (mut ctrl, modals) = controller();
        let _pending = ctrl.edit_item(0, 0, 0).expect("edit");

        assert_eq!(modals.configs.borrow().len(), 1);
        assert_eq!(*modals.opened.borrow(), 1);

        let config = modals.last_config();
        assert_eq!(config.template_url, "/templates/modals/demographics.html/");
        assert_eq!(config.controller, "EditItemModalCtrl");
        assert_eq!(
            Some(&config.resolve.item()),
            ctrl.patients()[0].item("demographics", 0)
        );
    }

    #[test]
    fn bad_indices_leave_state_alone() {
        let (mut ctrl, modals) = controller();

        let err = ctrl.edit_item(1, 0, 0).expect_err("no second patient");
        assert!(matches!(err, OpalError::RowOutOfRange { rix: 1, len: 1 }));

        let err = ctrl.edit_item(0, 3, 0).expect_err("no fourth column");
        assert!(matches!(err, OpalError::ColumnOutOfRange { cix: 3, len: 3 }));

        assert_eq!(ctrl.state(), ListState::Normal);
        assert!(modals.configs.borrow().is_empty());
    }

    #[tokio::test]
    async fn save_returns_to_normal() {
        let (mut ctrl, modals) = controller();
        let pending = ctrl.edit_item(0, 0, 0).expect("edit");
        assert_eq!(ctrl.state(), ListState::Editing);

        modals.resolve_next(saved(json!("save")));
        let resolution = ctrl.settle(pending).await.expect("settle");

        assert!(matches!(resolution, EditResolution::Closed(EditClose::Saved)));
        assert_eq!(ctrl.state(), ListState::Normal);
    }

    #[tokio::test]
    async fn save_payload_updates_item_in_place() {
        let (mut ctrl, modals) = controller();
        let pending = ctrl.edit_item(0, 2, 1).expect("edit");

        modals.resolve_next(saved(json!({"condition": "Malaria (P. falciparum)"})));
        ctrl.settle(pending).await.expect("settle");

        let diagnosis = ctrl.patients()[0].item("diagnosis", 1).expect("diagnosis");
        assert_eq!(diagnosis.id(), Some(103));
        assert_eq!(
            diagnosis.get("condition").and_then(FieldValue::as_str),
            Some("Malaria (P. falciparum)")
        );
        assert_eq!(diagnosis.get("provisional").and_then(FieldValue::as_bool), Some(false));
        assert_eq!(ctrl.patients()[0].items("diagnosis").len(), 2);
    }

    #[tokio::test]
    async fn add_another_reopens_on_next_item() {
        let (mut ctrl, modals) = controller();
        let pending = ctrl.edit_item(0, 0, 0).expect("edit");

        modals.resolve_next(ModalOutcome::AddAnother);
        let resolution = ctrl.settle(pending).await.expect("settle");

        let next = match resolution {
            EditResolution::Reopened(next) => next,
            other => panic!("expected Reopened, got {other:?}"),
        };
        assert_eq!(next.target(), EditTarget { rix: 0, cix: 0, iix: 1 });
        assert_eq!(ctrl.target(), Some(EditTarget { rix: 0, cix: 0, iix: 1 }));
        assert_eq!(ctrl.state(), ListState::Editing);

        assert_eq!(modals.configs.borrow().len(), 2);
        assert!(modals.last_config().resolve.item().is_empty());
    }

    #[tokio::test]
    async fn saving_a_new_slot_appends_an_item() {
        let (mut ctrl, modals) = controller();
        let pending = ctrl.edit_item(0, 2, 2).expect("edit new slot");

        modals.resolve_next(saved(json!({"condition": "Typhoid", "provisional": true})));
        ctrl.settle(pending).await.expect("settle");

        let items = ctrl.patients()[0].items("diagnosis");
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].get("condition").and_then(FieldValue::as_str), Some("Typhoid"));
        assert_eq!(items[2].id(), None);
    }

    #[tokio::test]
    async fn cancel_and_dismiss_leave_data_untouched() {
        let (mut ctrl, modals) = controller();
        let before = ctrl.patients().to_vec();

        let pending = ctrl.edit_item(0, 2, 0).expect("edit");
        modals.resolve_next(ModalOutcome::Cancel);
        let resolution = ctrl.settle(pending).await.expect("settle");
        assert!(matches!(resolution, EditResolution::Closed(EditClose::Cancelled)));
        assert_eq!(ctrl.state(), ListState::Normal);

        let pending = ctrl.edit_item(0, 2, 0).expect("edit");
        modals.dismiss_next();
        let resolution = ctrl.settle(pending).await.expect("settle");
        assert!(matches!(resolution, EditResolution::Closed(EditClose::Dismissed)));
        assert_eq!(ctrl.state(), ListState::Normal);

        assert_eq!(ctrl.patients(), before.as_slice());
    }

    #[tokio::test]
    async fn invalid_payload_still_returns_to_normal() {
        let (mut ctrl, modals) = controller();
        let before = ctrl.patients().to_vec();
        let pending = ctrl.edit_item(0, 2, 0).expect("edit");

        modals.resolve_next(saved(json!({"condition": "Typhoid", "id": "not-a-number"})));
        let err = ctrl.settle(pending).await.expect_err("bad id");

        assert!(matches!(err, OpalError::InvalidRecord(_)));
        assert_eq!(ctrl.state(), ListState::Normal);
        assert_eq!(
            ctrl.patients()[0]
                .item("diagnosis", 0)
                .and_then(|d| d.get("condition"))
                .and_then(FieldValue::as_str),
            Some("Dengue")
        );
        assert_eq!(ctrl.patients(), before.as_slice());
    }

    #[tokio::test]
    async fn saving_another_item_on_a_single_column_is_rejected() {
        let (mut ctrl, modals) = controller();
        let before = ctrl.patients().to_vec();
        let pending = ctrl.edit_item(0, 0, 0).expect("edit");

        modals.resolve_next(ModalOutcome::AddAnother);
        let next = match ctrl.settle(pending).await.expect("settle") {
            EditResolution::Reopened(next) => next,
            other => panic!("expected Reopened, got {other:?}"),
        };
        assert_eq!(next.target(), EditTarget { rix: 0, cix: 0, iix: 1 });

        modals.resolve_next(saved(json!({"name": "Second Person"})));
        let err = ctrl.settle(next).await.expect_err("single column");

        assert!(matches!(err, OpalError::SingleColumnOccupied(name) if name == "demographics"));
        assert_eq!(ctrl.state(), ListState::Normal);
        assert_eq!(ctrl.patients()[0].items("demographics").len(), 1);
        assert_eq!(ctrl.patients(), before.as_slice());
    }

    #[tokio::test]
    async fn saving_an_empty_single_column_adds_its_item() {
        let schema = ward_schema();
        let patient = Patient::new(&json!({"id": 1}), &schema).expect("patient");
        let modals = ManualModals::default();
        let mut ctrl = PatientListCtrl::new(
            Arc::new(UiConfig::default()),
            Arc::new(schema),
            vec![patient],
            modals.clone(),
        );

        let pending = ctrl.edit_item(0, 0, 0).expect("edit");
        modals.resolve_next(saved(json!({"name": "Jane Doe"})));
        ctrl.settle(pending).await.expect("settle");

        let items = ctrl.patients()[0].items("demographics");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get("name").and_then(FieldValue::as_str), Some("Jane Doe"));
    }

    /// Modal service whose modals resolve immediately from a script.
    struct ScriptedModals {
        outcomes: RefCell<Vec<Option<ModalOutcome>>>,
        configs: RefCell<Vec<DialogConfig>>,
    }

    struct Scripted(Option<ModalOutcome>);

    impl Modal for Scripted {
        fn open(self: Box<Self>) -> ModalPromise {
            match self.0 {
                Some(outcome) => ModalPromise::resolved(outcome),
                None => ModalPromise::dismissed(),
            }
        }
    }

    impl ModalService for ScriptedModals {
        fn dialog(&self, config: DialogConfig) -> Box<dyn Modal> {
            self.configs.borrow_mut().push(config);
            Box::new(Scripted(self.outcomes.borrow_mut().remove(0)))
        }
    }

    #[tokio::test]
    async fn run_edit_follows_add_another_chain() {
        let schema = ward_schema();
        let patients = vec![Patient::new(&patient_data(), &schema).expect("patient")];
        let modals = ScriptedModals {
            outcomes: RefCell::new(vec![
                Some(ModalOutcome::AddAnother),
                Some(ModalOutcome::AddAnother),
                Some(saved(json!({"condition": "Typhoid"}))),
            ]),
            configs: RefCell::new(Vec::new()),
        };
        let mut ctrl = PatientListCtrl::new(
            Arc::new(UiConfig::default()),
            Arc::new(schema),
            patients,
            modals,
        );

        let close = ctrl.run_edit(0, 2, 1).await.expect("run edit");
        assert_eq!(close, EditClose::Saved);
        assert_eq!(ctrl.state(), ListState::Normal);
        // the recorded target keeps the requested slot; the item itself is appended at the end
        assert_eq!(ctrl.target(), Some(EditTarget { rix: 0, cix: 2, iix: 3 }));

        let configs = ctrl.modal_service().configs.borrow();
        assert_eq!(configs.len(), 3);
        assert!(configs
            .iter()
            .all(|c| c.template_url == "/templates/modals/diagnosis.html/"));

        let items = ctrl.patients()[0].items("diagnosis");
        assert_eq!(items.len(), 3);
        assert_eq!(items[2].get("condition").and_then(FieldValue::as_str), Some("Typhoid"));
    }

    #[tokio::test]
    async fn run_edit_returns_dismissed() {
        let schema = ward_schema();
        let patients = vec![Patient::blank(1, &schema)];
        let modals = ScriptedModals {
            outcomes: RefCell::new(vec![None]),
            configs: RefCell::new(Vec::new()),
        };
        let mut ctrl = PatientListCtrl::new(
            Arc::new(UiConfig::default()),
            Arc::new(schema),
            patients,
            modals,
        );

        assert_eq!(ctrl.run_edit(0, 1, 0).await.expect("run edit"), EditClose::Dismissed);
        assert_eq!(ctrl.state(), ListState::Normal);
    }
}
