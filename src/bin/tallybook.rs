use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use tallybook::{
    BudgetAlert, CategoryName, Granularity, NewRecord, RecordId, RecordKind, SettingsSynchronizer,
    SettingsUpdate, SyncConfig, aggregate, budget_status, display_max, expense_by_category,
    init_logging, now_in_timezone, period_total, previous_average, record_transaction,
    stores::{RecordStore, SettingsStore, sqlite::create_stores},
    summarize,
};

/// Track income and expenses and summarise them by day, week or month.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: PathBuf,

    /// Canonical timezone used for "today", e.g. "Pacific/Auckland".
    ///
    /// Defaults to the system timezone.
    #[arg(long)]
    timezone: Option<String>,

    /// Also write debug logs to this file.
    #[arg(long)]
    debug_log: Option<PathBuf>,

    /// The key the settings document is stored under.
    #[arg(long, default_value = tallybook::config::DEFAULT_SETTINGS_KEY)]
    settings_key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record income or an expense.
    Add {
        #[arg(long)]
        kind: RecordKind,

        /// The amount of money, without a sign.
        #[arg(long)]
        amount: Decimal,

        #[arg(long)]
        category: CategoryName,

        /// When it happened, e.g. "2024-01-15" or "2024-01-15T10:30:00+13:00".
        /// Defaults to now.
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        note: Option<String>,

        /// Reference to a receipt image.
        #[arg(long)]
        receipt: Option<String>,
    },
    /// List every record.
    List,
    /// Delete a record by its ID.
    Delete { id: RecordId },
    /// Show totals per day, week or month up to today.
    Summary {
        #[arg(long, default_value_t = Granularity::Day)]
        granularity: Granularity,

        /// Number of periods to show, defaults to 7 days, 5 weeks or 6 months.
        #[arg(long)]
        window: Option<usize>,
    },
    /// Show how expenses are split between categories.
    Categories,
    /// Show or change settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    Show,
    SetName {
        name: String,
    },
    AddCategory {
        name: CategoryName,
    },
    RemoveCategory {
        name: CategoryName,
    },
    /// Change the monthly budget.
    Budget {
        #[arg(long)]
        enabled: Option<bool>,

        #[arg(long)]
        limit: Option<Decimal>,

        /// Percentage of the limit at which to warn.
        #[arg(long)]
        threshold: Option<u8>,
    },
    /// Turn a visual toggle such as "dark_mode" on or off.
    Toggle {
        name: String,

        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    init_logging(args.debug_log.as_deref())?;

    let now = now_in_timezone(args.timezone.as_deref())?;
    let connection = Connection::open(&args.db_path)?;
    let (mut record_store, settings_store) = create_stores(connection)?;
    let settings = SettingsSynchronizer::new(
        settings_store,
        SyncConfig::default().with_settings_key(&args.settings_key),
    );

    match args.command {
        Command::Add {
            kind,
            amount,
            category,
            date,
            note,
            receipt,
        } => {
            if let Err(error) = settings.load().await {
                tracing::warn!(
                    "settings could not be loaded, the category list will not be saved: {error}"
                );
            }

            let occurred_at = match date {
                Some(date) => date,
                None => now.format(&Rfc3339)?,
            };
            let mut new_record = NewRecord::new(amount, kind, category, &occurred_at)?;
            if let Some(note) = note {
                new_record = new_record.note(&note);
            }
            if let Some(receipt) = receipt {
                new_record = new_record.receipt_ref(&receipt);
            }

            let record = record_transaction(&mut record_store, &settings, new_record)?;
            println!("Added {} record {}", record.kind, record.id);
        }
        Command::List => {
            let mut records = record_store.get_all()?;
            records.sort_by_key(|record| record.id);

            for record in records {
                println!(
                    "{:>5}  {:<25}  {:>7}  {:>12}  {}{}",
                    record.id,
                    record.occurred_at,
                    record.kind,
                    record.amount,
                    record.category,
                    record
                        .note
                        .as_deref()
                        .map(|note| format!("  ({note})"))
                        .unwrap_or_default()
                );
            }
        }
        Command::Delete { id } => {
            record_store.delete(id)?;
            println!("Deleted record {id}");
        }
        Command::Summary {
            granularity,
            window,
        } => {
            if let Err(error) = settings.load().await {
                tracing::warn!("settings could not be loaded, using the default budget: {error}");
            }
            print_summary(
                &record_store,
                &settings,
                granularity,
                window.unwrap_or(granularity.default_window_size()),
                now,
            )?;
        }
        Command::Categories => {
            for share in expense_by_category(&record_store.get_all()?) {
                println!(
                    "{:<20} {:>12} {:>7}%",
                    share.category, share.total, share.percentage
                );
            }
        }
        Command::Settings(command) => {
            settings.load().await?;
            run_settings_command(&settings, command)?;
        }
    }

    settings.flush().await?;

    Ok(())
}

fn print_summary<R: RecordStore, S: SettingsStore>(
    record_store: &R,
    settings: &SettingsSynchronizer<S>,
    granularity: Granularity,
    window_size: usize,
    now: OffsetDateTime,
) -> Result<(), Box<dyn Error>> {
    let records = record_store.get_all()?;
    let buckets = aggregate(&records, granularity, window_size, now)?;
    let scale = display_max(&buckets);

    println!("{:<12} {:<10} {:>12} {:>12}", "period", "label", "income", "expense");
    for bucket in &buckets {
        println!(
            "{:<12} {:<10} {:>12} {:>12}{}",
            bucket.key,
            bucket.label,
            bucket.income_total,
            bucket.expense_total,
            if bucket.is_current { "  *" } else { "" }
        );
    }

    println!();
    println!("Chart scale: {scale}");
    for kind in [RecordKind::Income, RecordKind::Expense] {
        println!(
            "{kind}: {} over the period, {} per previous {granularity} on average",
            period_total(&buckets, kind),
            previous_average(&buckets, kind).round_dp(2)
        );
    }

    let totals = summarize(&records);
    println!(
        "All time: income {}, expense {}, balance {}",
        totals.income, totals.expense, totals.balance
    );

    let budget = settings.snapshot()?.budget;
    let this_month = aggregate(&records, Granularity::Month, 1, now)?;
    let status = budget_status(&budget, period_total(&this_month, RecordKind::Expense));
    match status.alert {
        BudgetAlert::Disabled => {}
        BudgetAlert::UnderThreshold => println!(
            "Budget: {} of {} spent this month ({}%)",
            status.spent, budget.limit, status.percent_used
        ),
        BudgetAlert::Warning => println!(
            "Budget warning: {} of {} spent this month ({}%)",
            status.spent, budget.limit, status.percent_used
        ),
        BudgetAlert::OverLimit => println!(
            "Over budget: {} of {} spent this month ({}%)",
            status.spent, budget.limit, status.percent_used
        ),
    }

    Ok(())
}

fn run_settings_command<S: SettingsStore>(
    settings: &SettingsSynchronizer<S>,
    command: SettingsCommand,
) -> Result<(), Box<dyn Error>> {
    match command {
        SettingsCommand::Show => {
            let state = settings.snapshot()?;
            println!("Display name: {}", state.display_name);
            println!(
                "Categories: {}",
                state
                    .categories
                    .iter()
                    .map(|category| category.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            println!(
                "Budget: {}, limit {}, warn at {}%",
                if state.budget.enabled { "on" } else { "off" },
                state.budget.limit,
                state.budget.alert_threshold_percent
            );
            for (name, enabled) in &state.visual_toggles {
                println!("{name}: {}", if *enabled { "on" } else { "off" });
            }
        }
        SettingsCommand::SetName { name } => {
            settings.update_field(SettingsUpdate::DisplayName(name))?;
        }
        SettingsCommand::AddCategory { name } => {
            settings.update_field(SettingsUpdate::AddCategory(name))?;
        }
        SettingsCommand::RemoveCategory { name } => {
            settings.update_field(SettingsUpdate::RemoveCategory(name))?;
        }
        SettingsCommand::Budget {
            enabled,
            limit,
            threshold,
        } => {
            if let Some(enabled) = enabled {
                settings.update_field(SettingsUpdate::BudgetEnabled(enabled))?;
            }
            if let Some(limit) = limit {
                settings.update_field(SettingsUpdate::BudgetLimit(limit))?;
            }
            if let Some(threshold) = threshold {
                settings.update_field(SettingsUpdate::AlertThreshold(threshold))?;
            }
        }
        SettingsCommand::Toggle { name, enabled } => {
            settings.update_field(SettingsUpdate::VisualToggle(name, enabled))?;
        }
    }

    Ok(())
}
