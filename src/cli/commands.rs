use std::path::Path;

use serde::Serialize;
use tally_config::Config;
use tally_core::{
    AccountView, Notice, PlanAccess, ReconcileOutcome, ReconcileService, Session, SpendingSummary,
    WorkspaceService,
};
use tally_domain::{Budget, FeatureRegistry, Plan};
use tally_storage_json::{JsonStorage, StoragePaths};

use super::{
    args::{BudgetCommand, CategoryCommand, Cli, Command, SectionCommand, UserCommand},
    output, CliError, SystemClock,
};
use crate::utils::build_info;

struct Context<'a> {
    workspace: WorkspaceService<'a, JsonStorage>,
    storage: &'a JsonStorage,
    registry: &'a FeatureRegistry,
    session: Session,
    json: bool,
}

impl Context<'_> {
    fn emit<T: Serialize>(&self, value: &T, render: impl FnOnce(&T)) -> Result<(), CliError> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            render(value);
        }
        Ok(())
    }
}

pub(super) fn dispatch(cli: &Cli, config: &Config, data_root: &Path) -> Result<(), CliError> {
    if let Command::Version = cli.cmd {
        println!("{}", build_info::current().summary());
        return Ok(());
    }

    let storage = JsonStorage::new(StoragePaths::under(data_root))?;
    let registry = FeatureRegistry::standard();
    let clock = SystemClock;
    let ctx = Context {
        workspace: WorkspaceService::new(&storage, &registry, &clock, config.trial_days),
        storage: &storage,
        registry: &registry,
        session: cli.user.map_or_else(Session::anonymous, Session::for_user),
        json: cli.json,
    };

    match &cli.cmd {
        Command::User { cmd } => user(&ctx, cmd),
        Command::Features => features(&ctx),
        Command::Budget { cmd } => budget(&ctx, cmd),
        Command::Section { cmd } => section(&ctx, cmd),
        Command::Category { cmd } => category(&ctx, cmd),
        Command::Notices => notices(&ctx),
        Command::Version => Ok(()),
    }
}

fn user(ctx: &Context<'_>, cmd: &UserCommand) -> Result<(), CliError> {
    match cmd {
        UserCommand::Create { email, name, trial } => {
            let user = ctx.workspace.register_user(email, name, *trial)?;
            ctx.emit(&user, |u| {
                output::success(format!("Registered {} ({})", u.email, u.id));
                if *trial {
                    output::info("Free trial started");
                }
            })
        }
        UserCommand::Status => {
            let account = ctx.workspace.account(&ctx.session)?;
            ctx.emit(&account, render_account)
        }
        UserCommand::Upgrade => {
            let user = ctx.workspace.upgrade(&ctx.session)?;
            ctx.emit(&user, |u| output::success(format!("{} is now on the pro plan", u.email)))
        }
        UserCommand::Sweep => {
            let changed = ctx.workspace.sweep_lapsed_trials()?;
            ctx.emit(&changed, |n| output::info(format!("Downgraded {n} lapsed trial(s)")))
        }
    }
}

fn render_account(account: &AccountView) {
    output::section(&account.user.name);
    println!("Email:    {}", account.user.email);
    println!("Status:   {}", account.status.label());
    println!("Plan:     {}", account.entitled_plan.as_str());
    if let Some(banner) = &account.banner {
        output::warning(banner);
    }
    let keys: Vec<&str> = account.features.iter().map(|f| f.key()).collect();
    println!("Features: {}", keys.join(", "));
}

#[derive(Serialize)]
struct FeatureRow {
    feature: &'static str,
    description: &'static str,
    plans: Vec<Plan>,
}

fn features(ctx: &Context<'_>) -> Result<(), CliError> {
    let rows: Vec<FeatureRow> = ctx
        .registry
        .features()
        .map(|(feature, plans)| FeatureRow {
            feature: feature.key(),
            description: feature.description(),
            plans: plans.iter().collect(),
        })
        .collect();
    ctx.emit(&rows, |rows| {
        let pro_only = PlanAccess::new(ctx.registry).pro_only_features();
        output::section("Features");
        for row in rows {
            let marker = if pro_only.iter().any(|f| f.key() == row.feature) {
                " (pro)"
            } else {
                ""
            };
            println!("{:<20} {}{marker}", row.feature, row.description);
        }
    })
}

fn budget(ctx: &Context<'_>, cmd: &BudgetCommand) -> Result<(), CliError> {
    match cmd {
        BudgetCommand::Create { name, income } => {
            let budget = ctx.workspace.create_budget(&ctx.session, name, *income)?;
            ctx.emit(&budget, |b| output::success(format!("Created budget {} ({})", b.name, b.id)))
        }
        BudgetCommand::List => {
            let budgets = ctx.workspace.budgets(&ctx.session)?;
            ctx.emit(&budgets, |budgets| {
                if budgets.is_empty() {
                    output::info("No budgets yet");
                }
                for b in budgets {
                    println!("{}  {:<24} {} categories", b.id, b.name, b.category_count());
                }
            })
        }
        BudgetCommand::Show { budget } => {
            let budget = ctx.workspace.budget(&ctx.session, *budget)?;
            ctx.emit(&budget, render_budget)
        }
        BudgetCommand::Income { budget, amount } => {
            let totals = ctx.workspace.set_income(&ctx.session, *budget, *amount)?;
            ctx.emit(&totals, |t| {
                output::success(format!(
                    "Income set; {} budgeted, {} available",
                    output::amount(t.total_budgeted),
                    output::amount(t.total_available)
                ))
            })
        }
        BudgetCommand::Reconcile { budget } => {
            let outcome = ReconcileService::run(ctx.storage, &ctx.session, *budget)?;
            ctx.emit(&outcome, render_outcome)
        }
        BudgetCommand::Insights { budget } => {
            let summary = ctx.workspace.insights(&ctx.session, *budget)?;
            ctx.emit(&summary, render_summary)
        }
        BudgetCommand::Export { budget } => {
            let budget = ctx.workspace.export(&ctx.session, *budget)?;
            println!("{}", serde_json::to_string_pretty(&budget)?);
            Ok(())
        }
        BudgetCommand::Backups { budget } => {
            // Ownership check before touching the snapshot directory.
            let budget = ctx.workspace.budget(&ctx.session, Some(*budget))?;
            let backups: Vec<String> = ctx
                .storage
                .list_backups(budget.id)?
                .into_iter()
                .map(|b| b.id)
                .collect();
            ctx.emit(&backups, |ids| {
                if ids.is_empty() {
                    output::info("No backups");
                }
                for id in ids {
                    println!("{id}");
                }
            })
        }
    }
}

fn render_budget(budget: &Budget) {
    output::section(&budget.name);
    for section in &budget.sections {
        println!("{} ({})", section.name, section.id);
        for c in &section.categories {
            println!(
                "  {:<20} budgeted {:>10}  spent {:>10}  {}",
                c.name,
                output::amount(c.budgeted_amount()),
                output::amount(c.spent_amount()),
                c.id
            );
        }
    }
    println!(
        "Total {}  budgeted {}  available {}",
        output::amount(budget.total_budget_amount()),
        output::amount(budget.totals.total_budgeted),
        output::amount(budget.totals.total_available)
    );
}

fn render_outcome(outcome: &ReconcileOutcome) {
    for warning in &outcome.warnings {
        output::warning(warning);
    }
    output::success(format!(
        "Reconciled {}: {} budgeted across {} categories, {} available",
        outcome.budget.name,
        output::amount(outcome.total_budgeted),
        outcome.categories.len(),
        output::amount(outcome.budget.totals.total_available)
    ));
}

fn render_summary(summary: &SpendingSummary) {
    output::section("Spending");
    for row in &summary.categories {
        let line = format!(
            "{:<12} {:<20} {:>10} of {:>10}",
            row.section,
            row.name,
            output::amount(row.spent),
            output::amount(row.budgeted)
        );
        if row.overspent {
            output::warning(line);
        } else {
            println!("{line}");
        }
    }
    if let Some(ratio) = summary.utilisation() {
        println!("Utilisation {:.0}%", ratio * 100.0);
    }
}

fn section(ctx: &Context<'_>, cmd: &SectionCommand) -> Result<(), CliError> {
    match cmd {
        SectionCommand::Add { budget, name } => {
            let id = ctx.workspace.add_section(&ctx.session, *budget, name)?;
            ctx.emit(&id, |id| output::success(format!("Added section {id}")))
        }
    }
}

fn category(ctx: &Context<'_>, cmd: &CategoryCommand) -> Result<(), CliError> {
    match cmd {
        CategoryCommand::Add {
            budget,
            section,
            name,
            budgeted,
        } => {
            let id = ctx
                .workspace
                .add_category(&ctx.session, *budget, *section, name, *budgeted)?;
            ctx.emit(&id, |id| output::success(format!("Added category {id}")))
        }
        CategoryCommand::Set {
            budget,
            category,
            amount,
        } => {
            let totals = ctx
                .workspace
                .set_budgeted(&ctx.session, *budget, *category, *amount)?;
            ctx.emit(&totals, |t| {
                output::success(format!("{} left to allocate", output::amount(t.total_available)))
            })
        }
        CategoryCommand::Rename {
            budget,
            category,
            name,
        } => {
            ctx.workspace
                .rename_category(&ctx.session, *budget, *category, name)?;
            ctx.emit(category, |id| output::success(format!("Renamed category {id}")))
        }
        CategoryCommand::Spend {
            budget,
            category,
            amount,
        } => {
            let spent = ctx
                .workspace
                .record_spend(&ctx.session, *budget, *category, *amount)?;
            ctx.emit(&spent, |s| output::success(format!("Spent so far {}", output::amount(*s))))
        }
        CategoryCommand::Remove { budget, category } => {
            let removed = ctx
                .workspace
                .remove_category(&ctx.session, *budget, *category)?;
            ctx.emit(&removed, |c| output::success(format!("Removed {}", c.name)))
        }
    }
}

fn notices(ctx: &Context<'_>) -> Result<(), CliError> {
    let notices: Vec<Notice> = ctx.workspace.notices(&ctx.session)?;
    ctx.emit(&notices, |notices| {
        if notices.is_empty() {
            output::info("Nothing to report");
        }
        for notice in notices {
            output::warning(notice);
        }
    })
}
