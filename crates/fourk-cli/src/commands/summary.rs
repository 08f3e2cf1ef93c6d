use std::path::PathBuf;

use fourk_core::summary::StatusSummary;

use crate::commands::common::{
    format_summary_lines, load_context, load_roster, refresh_dealers,
};
use crate::error::CliError;

pub async fn run_summary(
    as_json: bool,
    global_profile: Option<&str>,
    dealers_path: Option<PathBuf>,
) -> Result<(), CliError> {
    let context = load_context(global_profile)?;
    let roster = load_roster(dealers_path, &context.profile)?;
    let dealers = refresh_dealers(&context, &roster.dealers).await?;
    let summary = StatusSummary::from_dealers(&dealers);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        for line in format_summary_lines(&summary) {
            println!("{line}");
        }
    }

    Ok(())
}
