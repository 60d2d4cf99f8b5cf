use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ordertrack_core::form::customer::CUSTOMER_TYPE_FIELD;
use ordertrack_core::form::order::{SERVICE_SELECTION_GROUP, TYPE_FIELD};
use ordertrack_core::{
    AppConfig, CustomerSchema, DynamicForm, FileStore, FormFields, MemoryForm,
    NavigationLog, OrderSchema, Popup, PopupLog, ServiceOption, Theme, clear_draft,
    restore_draft, save_draft,
};
use ordertrack_lookup::{
    LiveSearch, LookupClient, PanelRenderer, PanelView, RecentOrdersPanel, RecentOrdersView,
    SearchKey, SearchPorts,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "ordertrack",
    about = "Customer search, order form rules and registration drafts",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Live-search customers, optionally walking the results with the keyboard.
    Search {
        query: String,
        /// Press ArrowDown this many times once results arrive.
        #[arg(long, default_value = "0")]
        down: usize,
        /// Press Enter after moving.
        #[arg(long)]
        enter: bool,
    },

    /// Show the recent orders table.
    Recent,

    /// Apply the order form rules and run submit-time validation.
    Order {
        #[arg(long = "type")]
        order_type: String,
        /// Field value as name=value.
        #[arg(long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
        /// Tick a box in the Service Selection group.
        #[arg(long = "service")]
        services: Vec<String>,
    },

    /// Apply the customer form rules.
    Customer {
        #[arg(long = "type")]
        customer_type: String,
    },

    /// Registration form drafts.
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Show or toggle the stored light/dark preference.
    Theme {
        #[arg(long)]
        toggle: bool,
    },

    /// Show the effective configuration.
    Config,
}

#[derive(Subcommand)]
enum DraftAction {
    /// Save registration fields as the current draft.
    Save {
        #[arg(long = "field", value_parser = parse_key_val)]
        fields: Vec<(String, String)>,
    },
    /// Restore the draft into an empty registration form and print it.
    Restore,
    /// Forget the stored draft.
    Clear,
}

fn parse_key_val(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))
}

// ─── Ports ───────────────────────────────────────────────────────────────────

/// Forwards every panel render to the command loop.
struct ChannelRenderer(mpsc::UnboundedSender<PanelView>);

impl PanelRenderer for ChannelRenderer {
    fn render(&self, view: &PanelView) {
        let _ = self.0.send(view.clone());
    }
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    tracing::debug!(path = %AppConfig::config_path().display(), "configuration loaded");

    match cli.command {
        Commands::Search { query, down, enter } => {
            run_search(&config, &query, down, enter, cli.json).await?;
        }

        Commands::Recent => {
            let client = LookupClient::new(&config.lookup)?;
            let mut panel = RecentOrdersPanel::new();
            let view = panel.refresh(&client).await;
            if cli.json {
                print_json(&serde_json::to_value(view)?)?;
            } else {
                match view {
                    RecentOrdersView::Loading => {}
                    RecentOrdersView::Failed { message } => eprintln!("{message}"),
                    RecentOrdersView::Loaded { rows } if rows.is_empty() => {
                        println!("No recent orders.");
                    }
                    RecentOrdersView::Loaded { rows } => {
                        println!(
                            "{:<12} {:<12} {:<13} {:<8} {:<20} {:<10} Created",
                            "Order", "Status", "Type", "Priority", "Customer", "Vehicle"
                        );
                        for r in rows {
                            println!(
                                "{:<12} {:<12} {:<13} {:<8} {:<20} {:<10} {}",
                                r.order_number,
                                r.status,
                                r.order_type,
                                r.priority,
                                r.customer,
                                r.vehicle,
                                r.created
                            );
                        }
                    }
                }
            }
        }

        Commands::Order {
            order_type,
            fields,
            services,
        } => {
            let mut form = MemoryForm::order_form();
            form.set_value(TYPE_FIELD, &order_type);
            for (name, value) in &fields {
                if !form.set_value(name, value) {
                    bail!("order form has no field `{name}`");
                }
            }
            for service in &services {
                let option = ServiceOption::from_value(service)
                    .with_context(|| format!("unknown service `{service}`"))?;
                form.set_checked(SERVICE_SELECTION_GROUP, option.value(), true);
            }

            let controller = DynamicForm::<OrderSchema>::attach(&mut form);
            let popups = PopupLog::new();
            let outcome = controller.submit(&mut form, &popups);
            report_form(
                &form,
                controller.current().map(|k| k.as_str()),
                outcome.is_ok(),
                &popups.popups(),
                cli.json,
            )?;
            if outcome.is_err() {
                std::process::exit(3);
            }
        }

        Commands::Customer { customer_type } => {
            let mut form = MemoryForm::customer_form();
            form.set_value(CUSTOMER_TYPE_FIELD, &customer_type);
            let controller = DynamicForm::<CustomerSchema>::attach(&mut form);
            report_form(
                &form,
                controller.current().map(|k| k.as_str()),
                true,
                &[],
                cli.json,
            )?;
        }

        Commands::Draft { action } => {
            let mut store = FileStore::open(config.storage_path());
            match action {
                DraftAction::Save { fields } => {
                    let mut form = MemoryForm::registration_form();
                    for (name, value) in &fields {
                        if !form.set_value(name, value) {
                            bail!("registration form has no field `{name}`");
                        }
                    }
                    save_draft(&form, &mut store);
                    println!("Draft saved to {}", store.path().display());
                }
                DraftAction::Restore => {
                    let mut form = MemoryForm::registration_form();
                    let restored = restore_draft(&mut form, &store);
                    let values = form.named_values();
                    if cli.json {
                        let fields: BTreeMap<_, _> = values.into_iter().collect();
                        print_json(&serde_json::json!({
                            "restored": restored,
                            "fields": fields,
                        }))?;
                    } else if restored == 0 {
                        println!("No draft to restore.");
                    } else {
                        for (name, value) in values.iter().filter(|(_, v)| !v.is_empty()) {
                            println!("{name:<20} {value}");
                        }
                    }
                }
                DraftAction::Clear => {
                    clear_draft(&mut store);
                    println!("Draft cleared.");
                }
            }
        }

        Commands::Theme { toggle } => {
            let mut store = FileStore::open(config.storage_path());
            let mut theme = Theme::load(&store);
            if toggle {
                theme = theme.toggled();
                theme.save(&mut store)?;
            }
            println!("{}", theme.as_str());
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

async fn run_search(
    config: &AppConfig,
    query: &str,
    down: usize,
    enter: bool,
    json: bool,
) -> Result<()> {
    let client = LookupClient::new(&config.lookup)?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    let navigator = Arc::new(NavigationLog::new());
    let popups = Arc::new(PopupLog::new());
    let ports = SearchPorts {
        renderer: Arc::new(ChannelRenderer(tx)),
        navigator: navigator.clone(),
        popups: popups.clone(),
    };
    let mut search = LiveSearch::new(Arc::new(client), ports, config.debounce())
        .with_fallback_type(&config.search.fallback_type);

    search.input(query);
    let deadline = config.debounce() + config.timeout() + Duration::from_secs(1);
    loop {
        match tokio::time::timeout(deadline, rx.recv()).await {
            Ok(Some(PanelView::Loading)) => continue,
            _ => break,
        }
    }

    for _ in 0..down {
        search.key(SearchKey::ArrowDown);
    }
    if enter {
        search.key(SearchKey::Enter);
    }

    let view = search.view();
    let targets = navigator.targets();
    let shown = popups.popups();

    if json {
        print_json(&serde_json::json!({
            "query": query,
            "panel": view,
            "navigated_to": targets.first(),
            "popups": shown,
        }))?;
        return Ok(());
    }

    match &view {
        PanelView::Hidden | PanelView::Loading => println!("(panel closed)"),
        PanelView::NoResults => println!("No results"),
        PanelView::Failed { message } => println!("! {message}"),
        PanelView::Results { rows } => {
            for row in rows {
                let marker = if row.selected { ">" } else { " " };
                println!("{marker} {:<28} {:<28} [{}]", row.name, row.secondary, row.pill);
            }
        }
    }
    for popup in &shown {
        println!("{}: {}", popup.title(), popup.text);
    }
    if let Some(target) = targets.first() {
        println!("→ {target}");
    }
    Ok(())
}

fn report_form(
    form: &MemoryForm,
    kind: Option<&str>,
    submittable: bool,
    popups: &[Popup],
    json: bool,
) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "type": kind,
            "visible_sections": form.visible_sections(),
            "required_fields": form.required_fields(),
            "submittable": submittable,
            "focused": form.focused(),
            "popups": popups,
        }));
    }

    println!("type:      {}", kind.unwrap_or("(none)"));
    println!("sections:  {}", form.visible_sections().join(", "));
    println!("required:  {}", form.required_fields().join(", "));
    for popup in popups {
        println!("{}: {}", popup.title(), popup.text);
    }
    if let Some(field) = form.focused() {
        println!("focus:     {field}");
    }
    println!("submit:    {}", if submittable { "ok" } else { "blocked" });
    Ok(())
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use ordertrack_core::FormSchema;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("quantity=3").unwrap(),
            ("quantity".to_string(), "3".to_string())
        );
        assert_eq!(
            parse_key_val("notes=a=b").unwrap(),
            ("notes".to_string(), "a=b".to_string())
        );
        assert!(parse_key_val("quantity").is_err());
    }

    #[test]
    fn test_cli_parses_order_command() {
        let cli = Cli::try_parse_from([
            "ordertrack", "order", "--type", "sales", "--field", "quantity=0", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let Commands::Order { order_type, fields, services } = cli.command else {
            panic!("expected order command");
        };
        assert_eq!(order_type, "sales");
        assert_eq!(fields, vec![("quantity".to_string(), "0".to_string())]);
        assert!(services.is_empty());
    }

    #[test]
    fn test_selector_names_match_schemas() {
        assert_eq!(OrderSchema::SELECTOR, TYPE_FIELD);
        assert_eq!(CustomerSchema::SELECTOR, CUSTOMER_TYPE_FIELD);
    }
}
