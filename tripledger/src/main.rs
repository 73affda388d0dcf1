#![warn(clippy::uninlined_format_args)]

mod bootstrap;

use bootstrap::AppConfig;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::{borrow::Cow, path::PathBuf, process};
use tripledger_application::{LedgerError, LedgerService, ShareToggle, WriteStatus};
use tripledger_domain::{
    Category, CurrencyCode, ExpenseDraft, ExpenseId, Member, MemberId, Money, SettlementId,
    Viewpoint,
};
use tripledger_i18n as i18n;
use tripledger_infrastructure::{ErApiRateSource, JsonFileTripStore, SystemClock};
use tripledger_presentation::{
    BookingPresenter, BreakdownPresenter, ExpensePresenter, RatesPresenter, SettlementPresenter,
    expense_presenter::status_label, format_ledger_error, format_write_failure,
};
use uuid::Uuid;

type CliResult<T> = Result<T, Cow<'static, str>>;
type Service = LedgerService<JsonFileTripStore, ErApiRateSource, SystemClock>;

#[derive(Parser)]
#[command(name = "tripledger", about = "Shared expense ledger for group trips")]
struct Cli {
    /// Trip document (overrides TRIPLEDGER_DOCUMENT)
    #[arg(long, global = true)]
    document: Option<PathBuf>,
    /// Base currency (overrides TRIPLEDGER_BASE_CURRENCY)
    #[arg(long, global = true)]
    base: Option<String>,
    /// Exchange rate endpoint (overrides TRIPLEDGER_RATE_ENDPOINT)
    #[arg(long, global = true)]
    rate_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Net balance of every member in the base currency
    Balances,
    /// Suggested transfers that settle everyone up
    Plan,
    /// Archived settlements, newest first
    History,
    /// Spending per category for the team or one member
    Breakdown {
        #[arg(long)]
        member: Option<String>,
    },
    /// List expenses
    Expenses,
    /// Settlement state of every share of one expense
    Shares { expense_id: u64 },
    AddExpense(ExpenseArgs),
    /// Replace the fields given on the command line
    EditExpense {
        id: u64,
        #[command(flatten)]
        fields: ExpenseEditArgs,
    },
    RemoveExpense { id: u64 },
    /// Record a repayment, either against the running balance or one expense
    Settle {
        from: String,
        to: String,
        amount: Decimal,
        #[arg(long)]
        expense: Option<u64>,
    },
    /// Mark a member's share of an expense settled, or undo that mark
    ToggleShare { expense_id: u64, member: String },
    /// Remove an archived settlement
    Undo { settlement_id: Uuid },
    Rates {
        #[command(subcommand)]
        command: RateCommands,
    },
    /// Convert an amount between two tracked currencies
    Convert {
        amount: Decimal,
        from: String,
        to: String,
    },
    Members {
        #[command(subcommand)]
        command: MemberCommands,
    },
    /// Reservations with their cost in the base currency
    Bookings,
}

#[derive(Args)]
struct ExpenseArgs {
    #[arg(long)]
    amount: Decimal,
    /// Defaults to the base currency
    #[arg(long)]
    currency: Option<String>,
    #[arg(long, default_value = "others")]
    category: String,
    #[arg(long)]
    payer: String,
    /// Comma separated member ids
    #[arg(long, value_delimiter = ',', required = true)]
    split: Vec<String>,
    /// Defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    note: String,
}

#[derive(Args)]
struct ExpenseEditArgs {
    #[arg(long)]
    amount: Option<Decimal>,
    #[arg(long)]
    currency: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    payer: Option<String>,
    #[arg(long, value_delimiter = ',')]
    split: Option<Vec<String>>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    note: Option<String>,
}

#[derive(Subcommand)]
enum RateCommands {
    List,
    /// Set the multiplier that converts one unit of CODE into the base currency
    Set { code: String, multiplier: Decimal },
    Remove { code: String },
    /// Fetch fresh rates for every tracked currency
    Refresh,
}

#[derive(Subcommand)]
enum MemberCommands {
    List,
    /// Add a member, or rename an existing one
    Add { id: String, name: String },
    Remove { id: String },
}

#[tokio::main]
async fn main() {
    bootstrap::init_logging();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let config = AppConfig::from_env().with_overrides(
        cli.document,
        cli.base.as_deref(),
        cli.rate_endpoint,
    );

    let store = JsonFileTripStore::open(config.document.clone())
        .await
        .map_err(|err| format!("Failed to open '{}': {err}", config.document.display()))?;
    let rate_source = ErApiRateSource::new(config.rate_endpoint.clone());
    let mut service = LedgerService::new(store, rate_source, SystemClock, config.base_currency);
    service
        .hydrate()
        .await
        .map_err(|err| format!("Failed to load '{}': {err}", config.document.display()))?;

    tracing::debug!(document = %config.document.display(), "Trip loaded");

    execute(&mut service, cli.command).await
}

async fn execute(service: &mut Service, command: Commands) -> CliResult<()> {
    match command {
        Commands::Balances => {
            let members = service.members();
            let balances = service.balances();
            print!(
                "{}",
                SettlementPresenter::build_balance_table(&balances, &members)
            );
        }
        Commands::Plan => {
            let members = service.members();
            let view = SettlementPresenter::render(
                &service.balances(),
                &service.suggested_settlements(),
                &members,
            );
            print!("{}", view.balance_table);
            match view.transfer_table {
                Some(table) => print!("\n{table}"),
                None => println!("\n{}", i18n::ALL_SETTLED),
            }
        }
        Commands::History => {
            let history = service.settlement_history();
            if history.is_empty() {
                println!("{}", i18n::NO_RECORDS);
            } else {
                let members = service.members();
                print!(
                    "{}",
                    SettlementPresenter::build_history_table(history, &members)
                );
            }
        }
        Commands::Breakdown { member } => {
            let viewpoint = match member {
                Some(member) => Viewpoint::Member(MemberId::new(member)),
                None => Viewpoint::Team,
            };
            let breakdown = service.category_breakdown(&viewpoint);
            print!("{}", BreakdownPresenter::build_breakdown_table(&breakdown));
            if viewpoint == Viewpoint::Team {
                println!(
                    "{}",
                    BreakdownPresenter::format_team_total(service.team_total())
                );
            }
        }
        Commands::Expenses => {
            let members = service.members();
            print!(
                "{}",
                ExpensePresenter::build_expense_table(service.expenses(), &members)
            );
        }
        Commands::Shares { expense_id } => {
            let statuses = service
                .share_statuses(ExpenseId(expense_id))
                .map_err(ledger_error)?;
            let members = service.members();
            print!(
                "{}",
                ExpensePresenter::build_share_table(&statuses, &members)
            );
        }
        Commands::AddExpense(args) => {
            let draft = ExpenseDraft {
                amount: Some(args.amount),
                currency: args
                    .currency
                    .as_deref()
                    .map(CurrencyCode::new)
                    .unwrap_or_else(|| service.rates().base().clone()),
                category: Category::parse_lenient(&args.category),
                payer_id: MemberId::new(args.payer),
                split_with: args.split.into_iter().map(MemberId::new).collect(),
                date: args.date.unwrap_or_else(today),
                note: args.note,
            };
            let mutation = service.add_expense(draft).await.map_err(ledger_error)?;
            report_write(&mutation.write);
            println!("{}", i18n::expense_added(mutation.value));
        }
        Commands::EditExpense { id, fields } => {
            let id = ExpenseId(id);
            let Some(current) = service.expense(id) else {
                return Err(ledger_error(LedgerError::ExpenseNotFound(id)));
            };
            let draft = ExpenseDraft {
                amount: Some(fields.amount.unwrap_or(current.amount)),
                currency: fields
                    .currency
                    .as_deref()
                    .map(CurrencyCode::new)
                    .unwrap_or_else(|| current.currency.clone()),
                category: fields
                    .category
                    .as_deref()
                    .map(Category::parse_lenient)
                    .unwrap_or(current.category),
                payer_id: fields
                    .payer
                    .map(MemberId::new)
                    .unwrap_or_else(|| current.payer_id.clone()),
                split_with: fields
                    .split
                    .map(|split| split.into_iter().map(MemberId::new).collect())
                    .unwrap_or_else(|| current.split_with.clone()),
                date: fields.date.unwrap_or(current.date),
                note: fields.note.unwrap_or_else(|| current.note.clone()),
            };
            let mutation = service
                .update_expense(id, draft)
                .await
                .map_err(ledger_error)?;
            report_write(&mutation.write);
        }
        Commands::RemoveExpense { id } => {
            let id = ExpenseId(id);
            let mutation = service.remove_expense(id).await;
            if mutation.value.is_none() {
                return Err(ledger_error(LedgerError::ExpenseNotFound(id)));
            }
            report_write(&mutation.write);
        }
        Commands::Settle {
            from,
            to,
            amount,
            expense,
        } => {
            let mutation = service
                .record_settlement(
                    MemberId::new(from),
                    MemberId::new(to),
                    Money::from_decimal(amount),
                    expense.map(ExpenseId),
                )
                .await
                .map_err(ledger_error)?;
            report_write(&mutation.write);
            println!("{}", i18n::settlement_recorded(mutation.value));
        }
        Commands::ToggleShare { expense_id, member } => {
            let mutation = service
                .toggle_share_settled(ExpenseId(expense_id), &MemberId::new(member))
                .await
                .map_err(ledger_error)?;
            report_write(&mutation.write);
            match mutation.value {
                ShareToggle::Recorded(id) => println!("{}", i18n::settlement_recorded(id)),
                ShareToggle::Undone(id) => println!("{}", i18n::settlement_undone(id)),
                ShareToggle::Unchanged(status) => {
                    println!("{}", i18n::share_unchanged(status_label(&status)))
                }
            }
        }
        Commands::Undo { settlement_id } => {
            let mutation = service.undo_settlement(SettlementId(settlement_id)).await;
            match mutation.value {
                Some(settlement) => {
                    report_write(&mutation.write);
                    println!("{}", i18n::settlement_undone(settlement.id));
                }
                None => println!("{}", i18n::NOTHING_CHANGED),
            }
        }
        Commands::Rates { command } => execute_rates(service, command).await?,
        Commands::Convert { amount, from, to } => {
            let to = CurrencyCode::new(&to);
            let converted = service.convert(amount, &CurrencyCode::new(&from), &to);
            println!("{} {to}", converted.round_dp(2).normalize());
        }
        Commands::Members { command } => execute_members(service, command).await,
        Commands::Bookings => {
            print!(
                "{}",
                BookingPresenter::build_booking_table(service.bookings(), service.rates())
            );
        }
    }

    Ok(())
}

async fn execute_rates(service: &mut Service, command: RateCommands) -> CliResult<()> {
    match command {
        RateCommands::List => {
            print!("{}", RatesPresenter::build_rates_table(service.rates()));
        }
        RateCommands::Set { code, multiplier } => {
            let mutation = service
                .set_rate(CurrencyCode::new(&code), multiplier)
                .await
                .map_err(ledger_error)?;
            report_write(&mutation.write);
        }
        RateCommands::Remove { code } => {
            let mutation = service.remove_rate(&CurrencyCode::new(&code)).await;
            if mutation.value.is_none() {
                println!("{}", i18n::NOTHING_CHANGED);
            }
            report_write(&mutation.write);
        }
        RateCommands::Refresh => {
            let mutation = service.refresh_rates().await.map_err(ledger_error)?;
            report_write(&mutation.write);
            println!("{}", i18n::rates_refreshed(mutation.value));
        }
    }
    Ok(())
}

async fn execute_members(service: &mut Service, command: MemberCommands) {
    match command {
        MemberCommands::List => {
            for member in service.members() {
                println!("{}\t{}", member.id, member.name);
            }
        }
        MemberCommands::Add { id, name } => {
            let mutation = service.add_member(Member::new(id, name)).await;
            if mutation.write == WriteStatus::Skipped {
                println!("{}", i18n::NOTHING_CHANGED);
            }
            report_write(&mutation.write);
        }
        MemberCommands::Remove { id } => {
            let mutation = service.remove_member(&MemberId::new(id)).await;
            if mutation.value.is_none() {
                println!("{}", i18n::NOTHING_CHANGED);
            }
            report_write(&mutation.write);
        }
    }
}

fn report_write(write: &WriteStatus) {
    if let WriteStatus::Failed(err) = write {
        eprintln!("{}", format_write_failure(err));
    }
}

fn ledger_error(err: LedgerError) -> Cow<'static, str> {
    format_ledger_error(&err).into()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
