//! # OPAL Core
//!
//! Record layer behind the OPAL ward list.
//!
//! This crate contains the schema-driven data binding and the editing workflow:
//! - [`Schema`]: ordered column/field declarations, loaded from YAML or JSON
//! - [`Patient`]: raw records bound to a schema, with normalised field values
//! - [`PatientSummary`]: display fields derived from a summary payload
//! - [`PatientListCtrl`]: the list controller driving edit modals through a [`ModalService`]
//!
//! **No UI concerns**: rendering, templates and the modal dialogs themselves belong to
//! whatever implements [`ModalService`] (the `opal-run` binary ships a terminal one).

pub mod config;
pub mod constants;
pub mod error;
pub mod list;
pub mod modal;
pub mod patient;
pub mod schema;
pub mod summary;
pub mod tags;
pub mod validation;
pub mod values;

pub use config::UiConfig;
pub use error::{OpalError, OpalResult};
pub use list::{EditClose, EditResolution, EditTarget, ListState, PatientListCtrl, PendingEdit};
pub use modal::{
    DialogConfig, DialogResolve, Dismissed, Modal, ModalOutcome, ModalPromise, ModalResolver,
    ModalService,
};
pub use patient::{load_patients, patients_from_json, Item, Patient};
pub use schema::{Column, FieldDef, FieldType, Schema};
pub use summary::{PatientSummary, SummaryPayload};
pub use values::{DateValue, FieldValue};
