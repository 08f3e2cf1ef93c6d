use std::path::PathBuf;

use chrono::Utc;
use fourk_core::summary::{CatalogQuery, FileCatalog};
use fourk_core::util::normalize_text_option;

use crate::commands::common::{
    format_catalog_lines, load_context, load_roster, refresh_dealers, select_dealers,
};
use crate::error::CliError;

pub struct FilesOptions<'a> {
    pub search: Option<&'a str>,
    pub dealer: Option<&'a str>,
    pub page: usize,
    pub as_json: bool,
}

pub async fn run_files(
    options: FilesOptions<'_>,
    global_profile: Option<&str>,
    dealers_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let context = load_context(global_profile)?;
    let roster = load_roster(dealers_path, &context.profile)?;
    let dealer_key = normalize_text_option(options.dealer.map(str::to_string));
    let selected = select_dealers(&roster, dealer_key.as_deref())?;
    let dealers = refresh_dealers(&context, &selected).await?;

    let catalog = FileCatalog::from_dealers(&dealers);
    let query = CatalogQuery {
        search: options.search.unwrap_or_default().to_string(),
        dealer_id: dealer_key.and(selected.first().map(|dealer| dealer.id.clone())),
        page: options.page,
    };
    let page = catalog.query(&query, Utc::now());

    if options.as_json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else if page.entries.is_empty() {
        println!("No files found.");
    } else {
        for line in format_catalog_lines(&page, Utc::now()) {
            println!("{line}");
        }
    }

    Ok(())
}
