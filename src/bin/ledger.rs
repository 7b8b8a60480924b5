use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use pocket_ledger::{
    Error, TransactionId,
    config::{ConfigStore, parse_category_list, parse_salary},
    export::ExportFormat,
    initialize_db, local_now,
    summary::{calculate_totals, current_month_expenses, expenses_by_category, is_over_budget},
    transaction::{
        SortColumn, SortOrder, Transaction, TransactionBuilder, TransactionKind,
        create_transaction, date_range, delete_transaction, get_all_transactions,
        get_transaction, get_transactions, parse_amount, parse_timestamp, sort_transactions,
        update_transaction,
    },
};

/// Record income and expenses from the command line.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// File path to the application SQLite database.
    #[arg(long, global = true, default_value = "ledger.db")]
    db_path: PathBuf,

    /// File path to the JSON settings file. Created with the default settings if missing.
    #[arg(long, global = true, default_value = "config.json")]
    config_path: PathBuf,

    /// The canonical name of the local timezone, used when a date is left out.
    #[arg(long, global = true, default_value = "Etc/UTC")]
    timezone: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new transaction.
    Add {
        /// One of the configured categories.
        #[arg(long)]
        category: String,
        /// "income" or "expense".
        #[arg(long)]
        kind: TransactionKind,
        /// The amount of money, e.g. 12.50.
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        /// YYYY-MM-DD or YYYY-MM-DD HH:MM:SS, defaults to now.
        #[arg(long)]
        date: Option<String>,
    },
    /// Print the transactions as a table.
    List {
        /// Only show transactions on or after this day (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,
        /// Only show transactions on or before this day (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,
        /// The column to sort by.
        #[arg(long, default_value_t = SortColumn::Id)]
        sort: SortColumn,
        /// Sort largest first.
        #[arg(long)]
        descending: bool,
    },
    /// Change some of the fields of a transaction.
    Edit {
        /// The ID shown by `list`.
        id: TransactionId,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        kind: Option<TransactionKind>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove a transaction.
    Delete {
        /// The ID shown by `list`.
        id: TransactionId,
    },
    /// Print the income, expenses and balance, and the expenses per category.
    Summary {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
    /// Write every transaction to a file.
    Export {
        #[arg(long, value_enum)]
        format: ExportFormat,
        /// Where to write the file.
        #[arg(long)]
        output: PathBuf,
    },
    /// Show or change the settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the current settings.
    Show,
    /// Set the monthly salary.
    Salary {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Replace the categories with a comma separated list.
    Categories { list: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Errors from the library plus failures to write the output.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Ledger(#[from] Error),
    #[error("could not write output: {0}")]
    Io(#[from] io::Error),
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), CliError> {
    let store = ConfigStore::new(&cli.config_path);

    let connection = match cli.command {
        Command::Config { action } => return configure(&store, action, out),
        _ => open_database(&cli.db_path)?,
    };

    match cli.command {
        Command::Add {
            category,
            kind,
            amount,
            date,
        } => {
            let date = match date {
                Some(date) => parse_timestamp(&date)?,
                None => local_now(&cli.timezone)?,
            };
            let builder =
                Transaction::build(date, &category, kind, parse_amount(&amount)?)
                    .validate(&store.load()?)?;
            let transaction = create_transaction(builder, &connection)?;
            writeln!(out, "Added transaction {}", transaction.id)?;
        }
        Command::List {
            from,
            to,
            sort,
            descending,
        } => {
            let range = date_range(from.as_deref(), to.as_deref())?;
            let mut transactions = get_transactions(range.as_ref(), &connection)?;
            let order = if descending {
                SortOrder::Desc
            } else {
                SortOrder::Asc
            };
            sort_transactions(&mut transactions, sort, order);
            write_table(&transactions, out)?;
            warn_if_over_budget(&store, &connection, &cli.timezone, out)?;
        }
        Command::Edit {
            id,
            category,
            kind,
            amount,
            date,
        } => {
            let existing = get_transaction(id, &connection).map_err(|error| match error {
                Error::NotFound => Error::UpdateMissingTransaction,
                error => error,
            })?;
            let builder = TransactionBuilder {
                date: match date {
                    Some(date) => parse_timestamp(&date)?,
                    None => existing.date,
                },
                category: category.unwrap_or_else(|| existing.category.clone()),
                kind: kind.unwrap_or(existing.kind),
                amount: match amount {
                    Some(amount) => parse_amount(&amount)?,
                    None => existing.amount,
                },
            }
            .validate_edit(&existing.category, &store.load()?)?;
            update_transaction(id, builder, &connection)?;
            writeln!(out, "Updated transaction {id}")?;
        }
        Command::Delete { id } => {
            delete_transaction(id, &connection)?;
            writeln!(out, "Deleted transaction {id}")?;
        }
        Command::Summary { from, to } => {
            let range = date_range(from.as_deref(), to.as_deref())?;
            let transactions = get_transactions(range.as_ref(), &connection)?;
            write_summary(&transactions, out)?;
            warn_if_over_budget(&store, &connection, &cli.timezone, out)?;
        }
        Command::Export { format, output } => {
            let transactions = get_all_transactions(&connection)?;
            let bytes = format.write(&transactions)?;
            fs::write(&output, bytes).map_err(|error| {
                Error::ExportError(format!("could not write {}: {error}", output.display()))
            })?;
            tracing::info!("Exported {} transactions as {format}", transactions.len());
            writeln!(
                out,
                "Exported {} transactions to {}",
                transactions.len(),
                output.display()
            )?;
        }
        Command::Config { .. } => {}
    }

    Ok(())
}

fn open_database(path: &Path) -> Result<Connection, Error> {
    let connection = Connection::open(path)?;
    initialize_db(&connection)?;

    Ok(connection)
}

fn configure(
    store: &ConfigStore,
    action: ConfigAction,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut config = store.load()?;

    match action {
        ConfigAction::Show => {}
        ConfigAction::Salary { amount } => {
            config.salary = parse_salary(&amount)?;
            store.save(&config)?;
        }
        ConfigAction::Categories { list } => {
            config.categories = parse_category_list(&list)?;
            store.save(&config)?;
        }
    }

    writeln!(out, "config file: {}", store.path().display())?;
    writeln!(out, "salary:      {:.2}", config.salary)?;
    writeln!(out, "categories:  {}", config.categories.join(", "))?;

    Ok(())
}

fn write_table(transactions: &[Transaction], out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{:>5}  {:<19}  {:<15}  {:<7}  {:>12}",
        "id", "date", "category", "kind", "amount"
    )?;

    for transaction in transactions {
        writeln!(
            out,
            "{:>5}  {:<19}  {:<15}  {:<7}  {:>12.2}",
            transaction.id,
            transaction.date_string(),
            transaction.category,
            transaction.kind,
            transaction.amount
        )?;
    }

    writeln!(out, "{} transactions", transactions.len())
}

fn write_summary(transactions: &[Transaction], out: &mut impl Write) -> io::Result<()> {
    let totals = calculate_totals(transactions);
    writeln!(out, "income:   {:>12.2}", totals.income)?;
    writeln!(out, "expenses: {:>12.2}", totals.expenses)?;
    writeln!(out, "balance:  {:>12.2}", totals.balance)?;

    let by_category = expenses_by_category(transactions);
    if !by_category.is_empty() {
        writeln!(out)?;
        writeln!(out, "expenses by category:")?;
        for (category, amount) in by_category {
            writeln!(out, "  {category:<15} {amount:>12.2}")?;
        }
    }

    Ok(())
}

/// Compare this month's expenses against the salary, like the banner in the web UI.
fn warn_if_over_budget(
    store: &ConfigStore,
    connection: &Connection,
    timezone: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let salary = store.load()?.salary;
    let today = local_now(timezone)?.date();
    let month_expenses = current_month_expenses(&get_all_transactions(connection)?, today);

    if is_over_budget(month_expenses, salary) {
        tracing::debug!("Month expenses {month_expenses} are over the salary {salary}");
        writeln!(
            out,
            "warning: this month's expenses ({month_expenses:.2}) are over your salary ({salary:.2})"
        )?;
    }

    Ok(())
}
