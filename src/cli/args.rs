use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Budgets, trials and pro features")]
pub struct Cli {
    /// Config file to use instead of the per-user default
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Storage root for users and budgets
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Acting user id
    #[arg(long, global = true)]
    pub user: Option<Uuid>,
    /// Print JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,
    /// Disable colours
    #[arg(long, global = true)]
    pub plain: bool,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign up, inspect and upgrade accounts
    User {
        #[command(subcommand)]
        cmd: UserCommand,
    },
    /// List features and which plans unlock them
    Features,
    /// Create and inspect budgets
    Budget {
        #[command(subcommand)]
        cmd: BudgetCommand,
    },
    /// Manage budget sections
    Section {
        #[command(subcommand)]
        cmd: SectionCommand,
    },
    /// Manage categories and record spending
    Category {
        #[command(subcommand)]
        cmd: CategoryCommand,
    },
    /// Show pending reminders for the acting user
    Notices,
    /// Print build information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a new user
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// Start the free trial immediately
        #[arg(long)]
        trial: bool,
    },
    /// Show subscription status and entitlements
    Status,
    /// Record a successful payment
    Upgrade,
    /// Move lapsed trial users back to the free plan
    Sweep,
}

#[derive(Subcommand, Debug)]
pub enum BudgetCommand {
    /// Create a budget
    Create {
        #[arg(long)]
        name: String,
        /// Total pool to allocate
        #[arg(long)]
        income: Option<f64>,
    },
    /// List the acting user's budgets
    List,
    /// Show one budget (defaults to the most recently updated)
    Show {
        #[arg(long)]
        budget: Option<Uuid>,
    },
    /// Set the budget's total pool
    Income {
        #[arg(long)]
        budget: Uuid,
        #[arg(long)]
        amount: f64,
    },
    /// Recompute and store totals
    Reconcile {
        #[arg(long)]
        budget: Option<Uuid>,
    },
    /// Spending breakdown (pro)
    Insights {
        #[arg(long)]
        budget: Uuid,
    },
    /// Print the full budget as JSON (pro)
    Export {
        #[arg(long)]
        budget: Uuid,
    },
    /// List stored snapshots of a budget, newest first
    Backups {
        #[arg(long)]
        budget: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum SectionCommand {
    /// Add a section to a budget
    Add {
        #[arg(long)]
        budget: Uuid,
        #[arg(long)]
        name: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// Add a category to a section
    Add {
        #[arg(long)]
        budget: Uuid,
        #[arg(long)]
        section: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        budgeted: Option<f64>,
    },
    /// Change a category's allocation
    Set {
        #[arg(long)]
        budget: Uuid,
        #[arg(long)]
        category: Uuid,
        #[arg(long)]
        amount: f64,
    },
    /// Rename a category
    Rename {
        #[arg(long)]
        budget: Uuid,
        #[arg(long)]
        category: Uuid,
        #[arg(long)]
        name: String,
    },
    /// Record an expense
    Spend {
        #[arg(long)]
        budget: Uuid,
        #[arg(long)]
        category: Uuid,
        #[arg(long)]
        amount: f64,
    },
    /// Delete a category
    Remove {
        #[arg(long)]
        budget: Uuid,
        #[arg(long)]
        category: Uuid,
    },
}
