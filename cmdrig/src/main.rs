use clap::{Parser, Subcommand};
use cmdrig_core::{AppSettings, FieldStore, FormSession};
use cmdrig_gui::{fetch_preview, run_gui, GuiConfig};
use schema::ConnectorRegistry;

#[derive(Parser)]
#[command(name = "cmdrig", version, about = "Connector form builder with live command preview")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available connectors and their subs
    Connectors,
    /// Compute one preview from stored field values and print it
    Preview {
        #[arg(long)]
        connector: String,
        #[arg(long)]
        sub: String,
    },
    /// Clear all stored field values
    Reset,
}

fn load_registry(settings: &AppSettings) -> ConnectorRegistry {
    let mut registry = ConnectorRegistry::builtin();
    registry.merge(ConnectorRegistry::load_dir(&settings.connectors_dir));
    registry
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = AppSettings::load_or_create(&AppSettings::default_path());

    match cli.command {
        None => run_gui(GuiConfig::default())?,
        Some(Commands::Connectors) => {
            let registry = load_registry(&settings);
            for (name, connector) in registry.iter() {
                println!("{name}");
                for sub in &connector.subs {
                    println!("  {}", sub.key);
                }
            }
        }
        Some(Commands::Preview { connector, sub }) => {
            let registry = load_registry(&settings);
            let store = FieldStore::open(settings.fields_path());
            let mut session = FormSession::new(registry, store);
            let Some(ticket) = session.select(&connector, &sub)? else {
                eprintln!("No selection, nothing to preview");
                return Ok(());
            };
            match fetch_preview(&settings.preview_url, &ticket.snapshot) {
                Ok(response) => println!("{}", response.display_text()),
                Err(err) => eprintln!("{err}"),
            }
        }
        Some(Commands::Reset) => {
            let mut store = FieldStore::open(settings.fields_path());
            let removed = store.clear_fields()?;
            println!("Removed {removed} stored field values");
        }
    }
    Ok(())
}
