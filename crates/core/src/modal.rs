//! Modal dialog capability.
//!
//! The list controller never talks to a UI toolkit directly. It asks a [`ModalService`] for a
//! dialog configured with a [`DialogConfig`], opens it, and awaits the returned
//! [`ModalPromise`]. The promise either resolves with a [`ModalOutcome`] or is rejected with
//! [`Dismissed`] when the dialog is closed without an outcome.

use crate::patient::Item;
use crate::{OpalError, OpalResult};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Values the modal may be opened with.
#[derive(Clone, Debug, PartialEq)]
pub struct DialogResolve {
    item: Item,
}

impl DialogResolve {
    pub fn new(item: Item) -> Self {
        Self { item }
    }

    /// The item being edited, as it was when the dialog was configured.
    pub fn item(&self) -> Item {
        self.item.clone()
    }
}

/// Configuration handed to [`ModalService::dialog`].
#[derive(Clone, Debug, PartialEq)]
pub struct DialogConfig {
    pub template_url: String,
    /// Identifier of the controller driving the dialog.
    pub controller: String,
    pub resolve: DialogResolve,
}

/// How an edit modal was closed.
#[derive(Clone, Debug, PartialEq)]
pub enum ModalOutcome {
    Cancel,
    /// Close this modal and open another one on the next item slot.
    AddAnother,
    /// Updated field values to merge into the item; may be empty.
    Saved(Map<String, Value>),
}

impl ModalOutcome {
    /// Maps the untyped result channel used by existing modal templates: the strings
    /// `"cancel"`, `"add-another"` and `"save"`, or an object carrying updated fields.
    ///
    /// # Errors
    ///
    /// Returns `OpalError::InvalidInput` for any other value.
    pub fn from_value(value: Value) -> OpalResult<Self> {
        match value {
            Value::String(s) => match s.as_str() {
                "cancel" => Ok(ModalOutcome::Cancel),
                "add-another" => Ok(ModalOutcome::AddAnother),
                "save" => Ok(ModalOutcome::Saved(Map::new())),
                other => Err(OpalError::InvalidInput(format!(
                    "unknown modal result '{other}'"
                ))),
            },
            Value::Object(map) => Ok(ModalOutcome::Saved(map)),
            other => Err(OpalError::InvalidInput(format!(
                "unsupported modal result {other}"
            ))),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ModalOutcome::Cancel => "cancel",
            ModalOutcome::AddAnother => "add-another",
            ModalOutcome::Saved(_) => "save",
        }
    }
}

/// The modal was closed without producing an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("modal dismissed")]
pub struct Dismissed;

/// Pending result of an open modal.
#[derive(Debug)]
pub struct ModalPromise {
    rx: oneshot::Receiver<ModalOutcome>,
}

impl ModalPromise {
    /// Creates a promise and the resolver that settles it.
    pub fn channel() -> (ModalResolver, ModalPromise) {
        let (tx, rx) = oneshot::channel();
        (ModalResolver { tx }, ModalPromise { rx })
    }

    /// A promise that is already fulfilled with `outcome`.
    pub fn resolved(outcome: ModalOutcome) -> Self {
        let (resolver, promise) = Self::channel();
        resolver.resolve(outcome);
        promise
    }

    /// A promise that is already rejected.
    pub fn dismissed() -> Self {
        let (resolver, promise) = Self::channel();
        resolver.dismiss();
        promise
    }
}

impl Future for ModalPromise {
    type Output = Result<ModalOutcome, Dismissed>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| Dismissed))
    }
}

/// Settles a [`ModalPromise`]. Dropping the resolver rejects the promise.
#[derive(Debug)]
pub struct ModalResolver {
    tx: oneshot::Sender<ModalOutcome>,
}

impl ModalResolver {
    pub fn resolve(self, outcome: ModalOutcome) {
        // The receiver may already be gone if the controller was dropped.
        let _ = self.tx.send(outcome);
    }

    pub fn dismiss(self) {
        drop(self.tx);
    }
}

/// A configured, not yet opened modal.
pub trait Modal {
    fn open(self: Box<Self>) -> ModalPromise;
}

/// Factory for modal dialogs.
pub trait ModalService {
    fn dialog(&self, config: DialogConfig) -> Box<dyn Modal>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_string_results() {
        assert_eq!(
            ModalOutcome::from_value(json!("cancel")).expect("cancel"),
            ModalOutcome::Cancel
        );
        assert_eq!(
            ModalOutcome::from_value(json!("add-another")).expect("add-another"),
            ModalOutcome::AddAnother
        );
        assert_eq!(
            ModalOutcome::from_value(json!("save")).expect("save"),
            ModalOutcome::Saved(Map::new())
        );
    }

    #[test]
    fn maps_object_results_to_saved_payloads() {
        let outcome = ModalOutcome::from_value(json!({"condition": "Malaria"})).expect("payload");
        match outcome {
            ModalOutcome::Saved(map) => assert_eq!(map["condition"], json!("Malaria")),
            other => panic!("expected Saved, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_results() {
        assert!(ModalOutcome::from_value(json!("close")).is_err());
        assert!(ModalOutcome::from_value(json!(3)).is_err());
    }

    #[tokio::test]
    async fn promise_resolves_with_outcome() {
        let (resolver, promise) = ModalPromise::channel();
        resolver.resolve(ModalOutcome::Cancel);
        assert_eq!(promise.await, Ok(ModalOutcome::Cancel));
    }

    #[tokio::test]
    async fn dropped_resolver_rejects() {
        let (resolver, promise) = ModalPromise::channel();
        drop(resolver);
        assert_eq!(promise.await, Err(Dismissed));

        assert_eq!(ModalPromise::dismissed().await, Err(Dismissed));
    }
}
