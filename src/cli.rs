use clap::{Args, Parser, Subcommand};

use crate::models::{RecipeId, UserId};

#[derive(Parser, Debug)]
#[command(author, version, about = "Weekly meal prep and grocery list tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the grocery list for a prep
    List(ListArgs),
    /// Show serving progress for a local prep file
    Progress {
        /// Path to the prep JSON file
        #[arg(short, long)]
        prep: String,
    },
    /// Show or change the store section order
    SectionOrder {
        #[command(subcommand)]
        action: SectionOrderAction,
    },
    /// Manage extra items added to the current prep's list
    Custom {
        #[command(subcommand)]
        action: CustomAction,
    },
    /// List the units offered for ingredient entry
    Units {
        #[arg(long)]
        metric: bool,
    },
    /// Save a local prep file as the current prep or as a named past prep
    SavePrep {
        #[arg(short, long)]
        prep: String,
        /// Overwrite the current prep on the backend
        #[arg(long, conflicts_with = "past_name")]
        current: bool,
        /// Save as a past prep with this name
        #[arg(long)]
        past_name: Option<String>,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct ListSource {
    /// Path to a local prep JSON file
    #[arg(short, long)]
    pub prep: Option<String>,
    /// Use the current prep saved on the backend
    #[arg(long)]
    pub current: bool,
    /// Use a saved past prep by id
    #[arg(long)]
    pub past: Option<i64>,
    /// Fetch individual recipes by id; repeat for several
    #[arg(long)]
    pub recipe: Vec<RecipeId>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: ListSource,
    /// Let the backend group the list, then re-aggregate it locally
    #[arg(long)]
    pub server: bool,
    /// User whose section order is applied
    #[arg(short, long, default_value_t = 0)]
    pub user: UserId,
    /// Also write the list as CSV to this path
    #[arg(long)]
    pub csv: Option<String>,
    /// Prefer metric units when the backend supports it
    #[arg(long)]
    pub metric: bool,
    /// Use the section order saved on the backend instead of the local file
    #[arg(long)]
    pub remote_order: bool,
}

#[derive(Subcommand, Debug)]
pub enum SectionOrderAction {
    Show {
        #[arg(short, long, default_value_t = 0)]
        user: UserId,
        #[arg(long)]
        remote: bool,
    },
    Set {
        #[arg(short, long, default_value_t = 0)]
        user: UserId,
        #[arg(long)]
        remote: bool,
        /// Section keys in the desired order, e.g. PRODUCE DAIRY
        #[arg(required = true)]
        sections: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CustomAction {
    Add { item: String },
    Remove { item: String },
    List,
    Clear,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
