use anyhow::Result;
use biomed_search::models::{DataProduct, Indication, Procedure, Study};
use biomed_search::state::{RecordStore, SledStore};
use chrono::{Duration, NaiveDate};
use clap::{Parser, Subcommand};
use reqwest::Client;

#[derive(Parser)]
#[command(name = "biomed-search-cli")]
#[command(about = "BioMed Search CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search query
    Search {
        #[arg(value_name = "QUERY")]
        q: String,

        /// Record-type scope: all, studies, indications, or procedures
        #[arg(short, long)]
        category: Option<String>,

        #[arg(short, long)]
        status: Option<String>,

        #[arg(short = 'P', long)]
        phase: Option<String>,

        #[arg(short = 'S', long)]
        severity: Option<String>,

        #[arg(short, long, default_value = "1")]
        page: u32,

        #[arg(short = 'n', long, default_value = "10")]
        per_page: u32,
    },

    /// Get suggestions for a partial query
    Suggest {
        #[arg(value_name = "FRAGMENT")]
        q: String,
    },

    /// Check server health
    Health,

    /// Populate the embedded database with sample records
    Seed {
        /// Path of the Sled database to seed
        #[arg(short, long, default_value = "./data/state")]
        data_path: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Search {
            q,
            category,
            status,
            phase,
            severity,
            page,
            per_page,
        } => {
            let mut params = vec![
                ("q", q),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ];
            if let Some(category) = category {
                params.push(("category", category));
            }
            if let Some(status) = status {
                params.push(("status", status));
            }
            if let Some(phase) = phase {
                params.push(("phase", phase));
            }
            if let Some(severity) = severity {
                params.push(("severity", severity));
            }

            let response = client
                .get(format!("{}/api/search", cli.endpoint))
                .query(&params)
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Suggest { q } => {
            let response = client
                .get(format!("{}/api/suggest", cli.endpoint))
                .query(&[("q", q)])
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Seed { data_path } => {
            let store = SledStore::new(&data_path)?;
            let counts = seed_sample_data(&store).await?;
            println!(
                "Seeded {} studies, {} indications, {} procedures into {}",
                counts.0, counts.1, counts.2, data_path
            );
        }
    }

    Ok(())
}

/// Populate deterministic sample records for local development
async fn seed_sample_data(store: &SledStore) -> Result<(usize, usize, usize)> {
    let statuses = ["Recruiting", "Active", "Completed", "Not yet recruiting"];
    let phases = ["Phase I", "Phase II", "Phase III", "Phase IV"];
    let therapies = ["Immunotherapy", "Targeted Therapy", "Chemotherapy", "Radiation"];
    let product_types = ["raw", "processed"];

    let base_date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date");

    for i in 1..=30usize {
        let start_date = base_date + Duration::days((i * 37 % 365) as i64);
        let end_date = start_date + Duration::days((180 + i * 18 % 550) as i64);

        let mut study = Study::new(
            format!("Cancer Study {}: {}", i, therapies[i % therapies.len()]),
            format!("Investigation of novel cancer treatment approach #{}", i),
            statuses[i % statuses.len()].to_string(),
            phases[i % phases.len()].to_string(),
            start_date,
            end_date,
        );
        study.relevance_score = 1.0 + (i % 26) as f64 * 0.1;
        store.save_study(&study).await?;

        let product = DataProduct::new(
            study.id,
            format!("Study {} Data", i),
            format!("Clinical data from cancer study #{}", i),
            product_types[i % product_types.len()].to_string(),
            "CSV".to_string(),
        );
        store.save_data_product(&product).await?;
    }

    let indications = [
        ("Metastatic Melanoma", "Oncology", "Severe"),
        ("Chronic Heart Failure", "Cardiology", "Severe"),
        ("Type 2 Diabetes", "Endocrinology", "Moderate"),
        ("Chronic Migraine", "Neurology", "Moderate"),
        ("Seasonal Allergies", "Immunology", "Mild"),
        ("Hypertension", "Cardiology", "Moderate"),
    ];
    for (title, category, severity) in indications {
        let indication = Indication::new(
            title.to_string(),
            format!("Patients presenting with {}", title.to_lowercase()),
            category.to_string(),
            severity.to_string(),
        );
        store.save_indication(&indication).await?;
    }

    let procedures = [
        ("Cardiac Catheterization", "Cardiology", "Medium", 90u32),
        ("Tumor Biopsy", "Oncology", "Medium", 45),
        ("MRI Scan", "Imaging", "Low", 60),
        ("Coronary Bypass", "Surgery", "High", 240),
        ("Colonoscopy", "Diagnostic", "Low", 30),
        ("Lumbar Puncture", "Neurology", "Medium", 30),
    ];
    for (title, category, risk_level, duration) in procedures {
        let procedure = Procedure::new(
            title.to_string(),
            format!("Standard {} protocol", title.to_lowercase()),
            category.to_string(),
            risk_level.to_string(),
            duration,
        );
        store.save_procedure(&procedure).await?;
    }

    store.flush().await?;

    Ok((30, indications.len(), procedures.len()))
}
