use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "rowforge",
    about = "Insert dependency-complete synthetic test rows into PostgreSQL",
    version,
    after_help = "Examples:\n  rowforge seed orders --db postgres://localhost/myapp\n  rowforge seed                            # prompts for the table, DB from .env\n  rowforge seed orders --max-depth 4 --format json\n  rowforge tree orders --db postgres://localhost/myapp\n  rowforge tables                          # list non-system schemas\n  rowforge tables orders                   # locate a table, show columns and FKs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Insert one synthetic row into a table, dependencies first
    Seed(SeedArgs),

    /// Print a table's foreign-key dependency tree
    Tree(TreeArgs),

    /// Locate a table and list its columns and foreign keys
    Tables(TablesArgs),
}

#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Target table name (prompted for interactively when omitted)
    pub table: Option<String>,

    /// Database connection URL (postgres://...)
    /// Falls back to DATABASE_URL env var or .env file
    #[arg(long, env = "DATABASE_URL")]
    pub db: Option<String>,

    /// Dependency-tree depth cap
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Pause after each successful insert, in milliseconds
    #[arg(long)]
    pub throttle_ms: Option<u64>,

    /// Fixed random seed for reproducible reference picks
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output format for the run report
    #[arg(long, default_value = "table")]
    pub format: ReportFormat,
}

#[derive(Parser, Debug)]
pub struct TreeArgs {
    /// Table to expand (prompted for interactively when omitted)
    pub table: Option<String>,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub db: Option<String>,

    /// Dependency-tree depth cap
    #[arg(long)]
    pub max_depth: Option<usize>,
}

#[derive(Parser, Debug)]
pub struct TablesArgs {
    /// Table name to look up; omit to list non-system schemas
    pub name: Option<String>,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub db: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
}
