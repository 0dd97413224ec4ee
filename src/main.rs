mod terminal;

use opal_core::{EditClose, Patient, PatientListCtrl, Schema, UiConfig, load_patients};
use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use terminal::{TerminalModals, describe, print_item};

/// Main entry point for the OPAL ward list
///
/// Loads the schema and patient records, then reads list commands from stdin and drives the
/// edit modals through the terminal.
///
/// # Environment Variables
/// - `OPAL_SCHEMA_PATH`: schema file (YAML or JSON); the built-in schema is used when unset
/// - `OPAL_PATIENTS_PATH`: JSON array of raw patient records; the list starts empty when unset
/// - `OPAL_MODAL_TEMPLATE_ROOT`: root of modal template URLs (default: "/templates/modals")
/// - `OPAL_EDIT_CONTROLLER`: edit modal controller (default: "EditItemModalCtrl")
/// - `OPAL_EPISODE_LINK_PREFIX`: prefix of episode links (default: "#/episode/")
#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("opal_run=info".parse()?)
                .add_directive("opal_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = UiConfig::from_values(
        std::env::var("OPAL_MODAL_TEMPLATE_ROOT").ok(),
        std::env::var("OPAL_EDIT_CONTROLLER").ok(),
        std::env::var("OPAL_EPISODE_LINK_PREFIX").ok(),
    )?;

    let schema = match std::env::var("OPAL_SCHEMA_PATH").ok().map(PathBuf::from) {
        Some(path) => Schema::load(&path)?,
        None => Schema::default_opal()?,
    };

    let patients = match std::env::var("OPAL_PATIENTS_PATH").ok().map(PathBuf::from) {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("Patients file does not exist: {}", path.display());
            }
            load_patients(&path, &schema)?
        }
        None => Vec::new(),
    };

    tracing::info!(
        "++ Starting OPAL ward list with {} columns and {} patients",
        schema.len(),
        patients.len()
    );

    let input = Rc::new(RefCell::new(std::io::stdin().lock()));
    let modals = TerminalModals::new(input.clone());
    let mut ctrl = PatientListCtrl::new(Arc::new(cfg), Arc::new(schema), patients, modals);

    let mut line = String::new();
    loop {
        print!("opal> ");
        std::io::stdout().flush()?;

        line.clear();
        if input.borrow_mut().read_line(&mut line)? == 0 {
            break;
        }

        match Command::parse(line.trim()) {
            Some(Command::List) => print_list(&ctrl),
            Some(Command::Show(rix)) => match ctrl.patients().get(rix) {
                Some(patient) => print_patient(patient, ctrl.schema()),
                None => println!("no patient at row {rix}"),
            },
            Some(Command::Edit { rix, cix, iix }) => match ctrl.run_edit(rix, cix, iix).await {
                Ok(EditClose::Saved) => println!("saved"),
                Ok(EditClose::Cancelled) => println!("cancelled"),
                Ok(EditClose::Dismissed) => println!("dismissed"),
                Err(e) => {
                    tracing::error!("edit failed: {}", e);
                    println!("edit failed: {e}");
                }
            },
            Some(Command::Dump) => {
                let raw: Vec<_> = ctrl
                    .patients()
                    .iter()
                    .map(|p| p.to_raw(ctrl.schema()))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&raw)?);
            }
            Some(Command::Help) => print_help(),
            Some(Command::Quit) => break,
            None => println!("unknown command, try 'help'"),
        }
    }

    tracing::info!("-- OPAL ward list closed");
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Show(usize),
    Edit { rix: usize, cix: usize, iix: usize },
    Dump,
    Help,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let command = match parts.next()? {
            "list" | "ls" => Command::List,
            "show" => Command::Show(parts.next()?.parse().ok()?),
            "edit" => Command::Edit {
                rix: parts.next()?.parse().ok()?,
                cix: parts.next()?.parse().ok()?,
                iix: parts.next()?.parse().ok()?,
            },
            "dump" => Command::Dump,
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            _ => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(command)
    }
}

fn print_help() {
    println!("list                 list patients");
    println!("show <row>           show one patient");
    println!("edit <row> <col> <item>  edit an item (item = count to add one)");
    println!("dump                 print patients as raw JSON");
    println!("quit");
}

fn print_list<M>(ctrl: &PatientListCtrl<M>)
where
    M: opal_core::ModalService,
{
    if ctrl.patients().is_empty() {
        println!("No patients found.");
        return;
    }
    for (rix, patient) in ctrl.patients().iter().enumerate() {
        let name = patient
            .item("demographics", 0)
            .and_then(|d| d.get("name"))
            .map(describe)
            .unwrap_or_default();
        let tags = patient.tags();
        println!("[{rix}] #{} {} {}", patient.id(), name, tags.join(" "));
    }
}

fn print_patient(patient: &Patient, schema: &Schema) {
    println!("Patient #{}", patient.id());
    for (cix, column) in schema.iter().enumerate() {
        let items = patient.items(&column.name);
        println!("[{cix}] {} ({} items)", column.name, items.len());
        for (iix, item) in items.iter().enumerate() {
            println!("  [{iix}]");
            print_item(item);
        }
    }
}
