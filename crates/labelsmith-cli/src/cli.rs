use std::path::PathBuf;

use clap::{ArgAction, Args as ClapArgs, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output logs as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Show what would change without modifying anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// API backend to use (rest or graphql)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Number of repositories to process concurrently
    #[arg(short, long, global = true)]
    pub parallel: Option<usize>,

    /// API token (overrides config and environment)
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(ClapArgs, Debug)]
pub struct RepoArgs {
    /// Target repository (owner/name); repeatable
    #[arg(short = 'r', long = "repo", value_name = "OWNER/NAME")]
    pub repos: Vec<String>,

    /// File with one repository per line
    #[arg(short = 'R', long = "repo-file", value_hint = ValueHint::FilePath)]
    pub repo_file: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct LabelArgs {
    /// Label as name[:color[:description]]; repeatable
    #[arg(short = 'l', long = "label", value_name = "SPEC")]
    pub labels: Vec<String>,

    /// JSON or YAML file with a list of labels
    #[arg(short = 'f', long = "file", value_hint = ValueHint::FilePath)]
    pub label_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create labels in repositories
    #[command(arg_required_else_help = true)]
    Create {
        #[command(flatten)]
        repos: RepoArgs,

        #[command(flatten)]
        labels: LabelArgs,

        /// Update labels that already exist
        #[arg(long)]
        force: bool,
    },

    /// Delete labels from repositories
    #[command(arg_required_else_help = true)]
    #[clap(alias = "rm")]
    Delete {
        #[command(flatten)]
        repos: RepoArgs,

        /// Names of the labels to delete
        #[arg(required = true)]
        names: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Make repositories carry exactly the given labels
    #[command(arg_required_else_help = true)]
    Sync {
        #[command(flatten)]
        repos: RepoArgs,

        #[command(flatten)]
        labels: LabelArgs,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Same as --yes
        #[arg(long)]
        force: bool,
    },

    /// Delete every label from repositories
    #[command(arg_required_else_help = true)]
    Empty {
        #[command(flatten)]
        repos: RepoArgs,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Move every item from one label to another and delete the first
    #[command(arg_required_else_help = true)]
    Merge {
        #[command(flatten)]
        repos: RepoArgs,

        /// Label to merge away
        from: String,

        /// Label that replaces it
        to: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List labels of repositories
    #[command(arg_required_else_help = true)]
    #[clap(alias = "ls")]
    List {
        #[command(flatten)]
        repos: RepoArgs,
    },

    /// Print the effective configuration (token redacted)
    Config,

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,
}
