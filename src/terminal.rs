//! Terminal implementation of the modal service.
//!
//! Each "modal" prints the item being edited and reads commands from an input stream until the
//! user saves, cancels, asks for another item, or the input ends (which dismisses the modal).

use opal_core::{DialogConfig, FieldValue, Item, Modal, ModalOutcome, ModalPromise, ModalService};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::io::BufRead;
use std::rc::Rc;

/// Modal service reading from a shared line source.
pub struct TerminalModals<R> {
    input: Rc<RefCell<R>>,
}

impl<R: BufRead> TerminalModals<R> {
    pub fn new(input: Rc<RefCell<R>>) -> Self {
        Self { input }
    }
}

struct TerminalModal<R> {
    config: DialogConfig,
    input: Rc<RefCell<R>>,
}

impl<R: BufRead + 'static> ModalService for TerminalModals<R> {
    fn dialog(&self, config: DialogConfig) -> Box<dyn Modal> {
        Box::new(TerminalModal {
            config,
            input: self.input.clone(),
        })
    }
}

impl<R: BufRead> Modal for TerminalModal<R> {
    fn open(self: Box<Self>) -> ModalPromise {
        println!(
            "== {} ({})",
            self.config.template_url, self.config.controller
        );
        print_item(&self.config.resolve.item());
        println!("   field=value to change, then: save | cancel | another | dismiss");

        let mut payload = Map::new();
        let mut input = self.input.borrow_mut();
        let mut line = String::new();
        loop {
            line.clear();
            match input.read_line(&mut line) {
                Ok(0) => return ModalPromise::dismissed(),
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!("failed to read modal input: {}", err);
                    return ModalPromise::dismissed();
                }
            }

            match parse_modal_line(line.trim()) {
                Some(ModalLine::Outcome(ModalOutcome::Saved(_))) => {
                    return ModalPromise::resolved(ModalOutcome::Saved(payload));
                }
                Some(ModalLine::Outcome(outcome)) => return ModalPromise::resolved(outcome),
                Some(ModalLine::Dismiss) => return ModalPromise::dismissed(),
                Some(ModalLine::Set(field, value)) => {
                    payload.insert(field, value);
                }
                None => println!("   ?"),
            }
        }
    }
}

#[derive(Debug, PartialEq)]
enum ModalLine {
    Outcome(ModalOutcome),
    Dismiss,
    Set(String, Value),
}

/// Parses one line typed into a modal. Values are read as JSON when possible
/// (`provisional=true`, `tags={"mine": true}`) and as plain text otherwise.
fn parse_modal_line(line: &str) -> Option<ModalLine> {
    match line {
        "save" => return Some(ModalLine::Outcome(ModalOutcome::Saved(Map::new()))),
        "cancel" => return Some(ModalLine::Outcome(ModalOutcome::Cancel)),
        "another" | "add-another" => return Some(ModalLine::Outcome(ModalOutcome::AddAnother)),
        "dismiss" => return Some(ModalLine::Dismiss),
        _ => {}
    }

    let (field, raw) = line.split_once('=')?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    let raw = raw.trim();
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Some(ModalLine::Set(field.to_string(), value))
}

pub fn print_item(item: &Item) {
    if let Some(id) = item.id() {
        println!("   id: {id}");
    }
    if item.is_empty() {
        println!("   (new item)");
    }
    for (name, value) in item.fields() {
        println!("   {name}: {}", describe(value));
    }
}

pub fn describe(value: &FieldValue) -> String {
    match value {
        FieldValue::Date(date) => date.to_string(),
        FieldValue::Tags(tags) => tags.join(", "),
        FieldValue::Value(Value::String(s)) => s.clone(),
        FieldValue::Value(other) => other.to_string(),
    }
}
