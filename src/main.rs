use anyhow::{Context, Result};
use meal_prep::api_connection::endpoints::GroceryListRequest;
use meal_prep::api_connection::BackendClient;
use meal_prep::cli::{parse_args, Command, CustomAction, ListArgs, SectionOrderAction};
use meal_prep::config::AppConfig;
use meal_prep::custom_items::CustomItemList;
use meal_prep::grocery_aggregator::{
    aggregate_scaled, aggregate_server_list, GroceryList, SectionGroup,
};
use meal_prep::grocery_export::{export_csv, render_checklist};
use meal_prep::models::UserId;
use meal_prep::prep::{
    calculate_progress, grocery_recipes, PrepConfig, PrepFile, PrepSelection,
};
use meal_prep::section_order::{
    FileSectionOrderStore, RemoteSectionOrderStore, SectionOrderManager, SectionOrderStore,
    SyncStatus,
};
use meal_prep::units::allowed_units;
use std::path::Path;
use tokio::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn load_prep_file(path: &str) -> Result<PrepSelection> {
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read prep file '{}'", path))?;
    let prep_file: PrepFile = serde_json::from_str(&contents)
        .with_context(|| format!("Prep file '{}' is not valid prep JSON", path))?;
    Ok(prep_file.into_selection())
}

async fn load_selection(config: &AppConfig, args: &ListArgs) -> Result<PrepSelection> {
    if let Some(path) = &args.source.prep {
        return load_prep_file(path).await;
    }

    let client = BackendClient::from_config(config);
    let raw_recipes = if !args.source.recipe.is_empty() {
        let prefer_metric = args.metric || config.prefer_metric;
        let mut raw_recipes = Vec::with_capacity(args.source.recipe.len());
        for &recipe_id in &args.source.recipe {
            let raw = client
                .fetch_recipe(recipe_id, prefer_metric)
                .await
                .with_context(|| format!("Failed to fetch recipe {}", recipe_id))?;
            raw_recipes.push(raw);
        }
        raw_recipes
    } else if let Some(past_id) = args.source.past {
        let past = client
            .fetch_past_prep(past_id)
            .await
            .with_context(|| format!("Failed to fetch past prep {}", past_id))?;
        if let Some(name) = &past.name {
            println!("Past prep: {}", name);
        }
        past.recipes
    } else {
        client
            .fetch_current_prep()
            .await
            .context("Failed to fetch the current prep")?
    };
    Ok(PrepSelection::from_raw(PrepConfig::default(), &raw_recipes))
}

async fn build_list(
    config: &AppConfig,
    args: &ListArgs,
    selection: &PrepSelection,
) -> Result<GroceryList> {
    if !args.server {
        return Ok(aggregate_scaled(grocery_recipes(selection)));
    }

    let request = GroceryListRequest {
        recipe_ids: selection.recipe_ids(),
        prefer_metric: args.metric || config.prefer_metric,
    };
    let response = BackendClient::from_config(config)
        .fetch_grocery_list(&request)
        .await
        .context("Failed to fetch the grocery list from the backend")?;
    Ok(aggregate_server_list(response.groups()))
}

async fn ordered_sections<'l, S: SectionOrderStore>(
    store: S,
    user_id: UserId,
    list: &'l GroceryList,
) -> Vec<&'l SectionGroup> {
    SectionOrderManager::new(store)
        .ordered_sections(user_id, list)
        .await
}

async fn run_list(config: &AppConfig, args: ListArgs) -> Result<()> {
    let selection = load_selection(config, &args).await?;
    info!(recipes = selection.selected_recipes.len(), "Loaded prep selection");

    let list = build_list(config, &args, &selection).await?;
    if !list.skipped().is_empty() {
        eprintln!("Skipped {} ingredient(s):", list.skipped().len());
        for skipped in list.skipped() {
            eprintln!(
                "   -> '{}' from {}: {}",
                skipped.ingredient_name,
                skipped.recipe_title.as_deref().unwrap_or("server list"),
                skipped.reason
            );
        }
    }

    let sections = if args.remote_order {
        let store = RemoteSectionOrderStore::new(BackendClient::from_config(config));
        ordered_sections(store, args.user, &list).await
    } else {
        let store = FileSectionOrderStore::new(config.section_order_path());
        ordered_sections(store, args.user, &list).await
    };

    // Extra items belong to the prep being shopped for right now.
    let custom_items = if args.source.current {
        CustomItemList::open(&config.custom_items_path())?
    } else {
        CustomItemList::default()
    };

    print!(
        "{}",
        render_checklist(selection.selected_recipes.len(), &sections, custom_items.items())
    );

    if let Some(csv_path) = &args.csv {
        export_csv(&sections, Path::new(csv_path))?;
        println!("Grocery list written to {}", csv_path);
    }
    Ok(())
}

async fn run_progress(prep_path: &str) -> Result<()> {
    let selection = load_prep_file(prep_path).await?;
    let progress = calculate_progress(&selection);

    println!(
        "Dinners: {} / {} servings ({} dinner(s) left)",
        progress.dinner_servings_selected,
        progress.dinner_servings_needed,
        progress.dinners_remaining
    );
    println!(
        "Lunches: {} / {} servings ({} lunch(es) left)",
        progress.lunch_servings_counted(),
        progress.lunch_servings_needed,
        progress.lunches_remaining
    );
    if selection.config.use_leftovers {
        println!(
            "   -> includes {} leftover serving(s) from dinners",
            progress.leftover_lunch_servings
        );
    }
    if progress.is_complete() {
        println!("Prep complete.");
    }
    Ok(())
}

fn print_sync_status(status: &SyncStatus) {
    match status {
        SyncStatus::Synced => println!("Section order saved."),
        SyncStatus::LocalOnly { reason } => {
            println!("Section order applied locally but not saved: {}", reason)
        }
    }
}

async fn run_section_order<S: SectionOrderStore>(store: S, action: SectionOrderAction) {
    let mut manager = SectionOrderManager::new(store);
    match action {
        SectionOrderAction::Show { user, .. } => match manager.saved_order(user).await {
            Some(order) => println!("{}", order.join(" > ")),
            None => println!("No saved section order; sections follow the list."),
        },
        SectionOrderAction::Set { user, sections, .. } => {
            let status = manager.set_order(user, sections).await;
            print_sync_status(&status);
        }
    }
}

fn run_custom(config: &AppConfig, action: CustomAction) -> Result<()> {
    let mut list = CustomItemList::open(&config.custom_items_path())?;
    match action {
        CustomAction::Add { item } => {
            if !list.add(&item) {
                println!("Nothing to add.");
                return Ok(());
            }
        }
        CustomAction::Remove { item } => {
            let removed = list.remove(&item);
            println!("Removed {} item(s).", removed);
        }
        CustomAction::List => {
            for item in list.items() {
                println!("{}", item);
            }
            return Ok(());
        }
        CustomAction::Clear => list.clear(),
    }
    list.save()
}

async fn run_save_prep(
    config: &AppConfig,
    prep_path: &str,
    current: bool,
    past_name: Option<String>,
) -> Result<()> {
    let selection = load_prep_file(prep_path).await?;
    let recipe_ids = selection.recipe_ids();
    let client = BackendClient::from_config(config);

    match (current, past_name) {
        (true, _) => {
            client
                .save_current_prep(&recipe_ids)
                .await
                .context("Failed to save the current prep")?;
            println!("Saved {} recipe(s) as the current prep.", recipe_ids.len());
        }
        (false, Some(name)) => {
            client
                .save_past_prep(&name, &recipe_ids)
                .await
                .with_context(|| format!("Failed to save past prep '{}'", name))?;
            println!("Saved past prep '{}'.", name);
        }
        (false, None) => {
            anyhow::bail!("Pass --current or --past-name to choose where the prep is saved")
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env();
    let cli_args = parse_args();

    match cli_args.command {
        Command::List(args) => run_list(&config, args).await?,
        Command::Progress { prep } => run_progress(&prep).await?,
        Command::SectionOrder { action } => {
            let remote = match &action {
                SectionOrderAction::Show { remote, .. }
                | SectionOrderAction::Set { remote, .. } => *remote,
            };
            if remote {
                let store = RemoteSectionOrderStore::new(BackendClient::from_config(&config));
                run_section_order(store, action).await;
            } else {
                let store = FileSectionOrderStore::new(config.section_order_path());
                run_section_order(store, action).await;
            }
        }
        Command::Custom { action } => run_custom(&config, action)?,
        Command::Units { metric } => {
            println!("{}", allowed_units(metric || config.prefer_metric).join(", "));
        }
        Command::SavePrep {
            prep,
            current,
            past_name,
        } => run_save_prep(&config, &prep, current, past_name).await?,
    }

    Ok(())
}
