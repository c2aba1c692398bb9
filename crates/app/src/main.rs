use std::collections::BTreeSet;

use chrono::{Months, NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use frollo_sdk::{
    AccountFilter, BillFilter, BillPaymentFilter, BudgetFilter, BudgetPeriodFilter, ContactFilter,
    Frollo, ResultEngine, Settings, TransactionFilter,
};

#[derive(Parser, Debug)]
#[command(name = "frollo_sync")]
#[command(about = "Mirror Frollo account data into the local cache")]
struct Cli {
    /// Settings file; `FROLLO__*` environment variables override it.
    #[arg(long, env = "FROLLO_CONFIG")]
    config: Option<String>,

    /// What to refresh. Everything when omitted.
    #[arg(value_enum)]
    targets: Vec<Target>,

    /// First day of the transaction and bill payment window.
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the transaction and bill payment window.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Transaction page size.
    #[arg(long, default_value_t = 100)]
    page_size: i64,

    /// Stop paging transactions or contacts after this many pages.
    #[arg(long, default_value_t = 20)]
    max_pages: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Target {
    Accounts,
    Categories,
    Transactions,
    Bills,
    BillPayments,
    Budgets,
    Contacts,
}

impl Target {
    const ALL: [Target; 7] = [
        Target::Accounts,
        Target::Categories,
        Target::Transactions,
        Target::Bills,
        Target::BillPayments,
        Target::Budgets,
        Target::Contacts,
    ];
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "frollo_sync={level},frollo_sdk={level}",
            level = settings.app.level
        ))
        .init();

    let frollo = Frollo::from_settings(&settings).await?;
    let targets: BTreeSet<Target> = if cli.targets.is_empty() {
        Target::ALL.into_iter().collect()
    } else {
        cli.targets.iter().copied().collect()
    };

    let today = Utc::now().date_naive();
    let to = cli.to.unwrap_or(today);
    let from = cli
        .from
        .or_else(|| to.checked_sub_months(Months::new(3)))
        .unwrap_or(to);

    for target in targets {
        tracing::info!(?target, "refreshing");
        if let Err(err) = refresh(&frollo, target, &cli, from, to).await {
            tracing::error!(?target, "refresh failed: {err}");
            continue;
        }
        println!("{:<14} {}", format!("{target:?}"), cached(&frollo, target).await?);
    }

    Ok(())
}

async fn refresh(
    frollo: &Frollo,
    target: Target,
    cli: &Cli,
    from: NaiveDate,
    to: NaiveDate,
) -> ResultEngine<()> {
    match target {
        Target::Accounts => frollo.aggregation().refresh_accounts().await,
        Target::Categories => frollo.aggregation().refresh_transaction_categories().await,
        Target::Transactions => {
            let mut after = None;
            for _ in 0..cli.max_pages {
                let paging = frollo
                    .aggregation()
                    .refresh_transactions(Some(from), Some(to), None, after, Some(cli.page_size))
                    .await?;
                after = paging.cursors.after;
                if after.is_none() {
                    break;
                }
            }
            Ok(())
        }
        Target::Bills => frollo.bills().refresh_bills().await,
        Target::BillPayments => frollo.bills().refresh_bill_payments(from, to).await,
        Target::Budgets => {
            frollo.budgets().refresh_budgets(None, None).await?;
            let budgets = frollo
                .budgets()
                .budgets(&BudgetFilter::default())
                .await?
                .unwrap_or_default();
            for budget in budgets {
                frollo
                    .budgets()
                    .refresh_budget_periods(budget.id, None, None)
                    .await?;
            }
            Ok(())
        }
        Target::Contacts => {
            let mut after = None;
            for _ in 0..cli.max_pages {
                let paging = frollo
                    .contacts()
                    .refresh_contacts(None, after, Some(cli.page_size))
                    .await?;
                after = paging.cursors.after;
                if after.is_none() {
                    break;
                }
            }
            Ok(())
        }
    }
}

async fn cached(frollo: &Frollo, target: Target) -> ResultEngine<usize> {
    let count = match target {
        Target::Accounts => frollo
            .aggregation()
            .accounts(&AccountFilter::default())
            .await?
            .map(|rows| rows.len()),
        Target::Categories => frollo
            .aggregation()
            .transaction_categories()
            .await?
            .map(|rows| rows.len()),
        Target::Transactions => frollo
            .aggregation()
            .transactions(&TransactionFilter::default(), None)
            .await?
            .map(|rows| rows.len()),
        Target::Bills => frollo
            .bills()
            .bills(&BillFilter::default())
            .await?
            .map(|rows| rows.len()),
        Target::BillPayments => frollo
            .bills()
            .bill_payments(&BillPaymentFilter::default())
            .await?
            .map(|rows| rows.len()),
        Target::Budgets => {
            let budgets = frollo.budgets().budgets(&BudgetFilter::default()).await?;
            let periods = frollo
                .budgets()
                .budget_periods(&BudgetPeriodFilter::default())
                .await?;
            budgets.zip(periods).map(|(b, p)| b.len() + p.len())
        }
        Target::Contacts => frollo
            .contacts()
            .contacts(&ContactFilter::default())
            .await?
            .map(|rows| rows.len()),
    };
    Ok(count.unwrap_or_default())
}
