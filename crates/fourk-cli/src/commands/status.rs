use std::path::PathBuf;

use chrono::Utc;

use crate::commands::common::{
    dealer_to_status_item, format_dealer_lines, load_context, load_roster, refresh_dealers,
    select_dealers, DealerStatusItem,
};
use crate::error::CliError;

pub async fn run_status(
    dealer: Option<&str>,
    as_json: bool,
    global_profile: Option<&str>,
    dealers_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let context = load_context(global_profile)?;
    let roster = load_roster(dealers_path, &context.profile)?;
    let selected = select_dealers(&roster, dealer)?;
    let dealers = refresh_dealers(&context, &selected).await?;

    if as_json {
        let items = dealers
            .iter()
            .map(dealer_to_status_item)
            .collect::<Vec<DealerStatusItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_dealer_lines(&dealers, Utc::now()) {
            println!("{line}");
        }
    }

    Ok(())
}
