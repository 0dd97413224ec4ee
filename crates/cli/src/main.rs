use clap::{Parser, Subcommand};
use opal_core::{
    patients_from_json, tags, FieldValue, PatientSummary, Schema, SummaryPayload, UiConfig,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "opal")]
#[command(about = "OPAL ward list record tools")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a schema and print its columns
    Schema {
        /// Schema file (YAML or JSON); the built-in schema when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Load raw patient records and list them
    Patients {
        /// JSON file holding an array of patient records
        file: PathBuf,
        /// Schema file (YAML or JSON)
        #[arg(long)]
        schema: Option<PathBuf>,
    },
    /// Render patient summaries
    Summary {
        /// JSON file holding one summary payload or an array of them
        file: PathBuf,
        /// Prefix of episode links
        #[arg(long)]
        link_prefix: Option<String>,
    },
    /// List known ward tags
    Tags,
}

fn load_schema(file: Option<&Path>) -> Result<Schema, opal_core::OpalError> {
    match file {
        Some(path) => Schema::load(path),
        None => Schema::default_opal(),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Schema { file }) => {
            let schema = load_schema(file.as_deref())?;
            for (cix, column) in schema.iter().enumerate() {
                let cardinality = if column.single { "single" } else { "list" };
                println!("[{}] {} ({})", cix, column.name, cardinality);
                for field in &column.fields {
                    println!("      {}: {}", field.name, field.field_type);
                }
            }
        }
        Some(Commands::Patients { file, schema }) => {
            let schema = load_schema(schema.as_deref())?;
            let text = std::fs::read_to_string(&file)?;
            let patients = patients_from_json(&text, &schema)?;
            if patients.is_empty() {
                println!("No patients found.");
            }
            for patient in patients {
                let name = patient
                    .item("demographics", 0)
                    .and_then(|d| d.get("name"))
                    .and_then(FieldValue::as_str)
                    .unwrap_or("");
                let counts: Vec<String> = schema
                    .iter()
                    .map(|c| format!("{}={}", c.name, patient.items(&c.name).len()))
                    .collect();
                println!("ID: {}, Name: {}, {}", patient.id(), name, counts.join(" "));
            }
        }
        Some(Commands::Summary { file, link_prefix }) => {
            let cfg = UiConfig::from_values(None, None, link_prefix)?;
            let text = std::fs::read_to_string(&file)?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            let payloads: Vec<SummaryPayload> = match value {
                serde_json::Value::Array(_) => serde_json::from_value(value)?,
                other => vec![serde_json::from_value(other)?],
            };
            for payload in &payloads {
                let summary = PatientSummary::new(payload, &cfg);
                let dob = summary
                    .date_of_birth
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                println!(
                    "{} ({}) born {} | {} | {} episodes {} | {}",
                    summary.name,
                    summary.hospital_number,
                    dob,
                    summary.categories,
                    summary.count,
                    summary.years.as_deref().unwrap_or("-"),
                    summary.link
                );
            }
        }
        Some(Commands::Tags) => {
            for (name, label) in tags::TAGS {
                println!("{name}: {label}");
            }
        }
        None => {
            println!("Use 'opal --help' for commands");
        }
    }

    Ok(())
}
