//! Dashboard and chart commands

use chrono::NaiveDate;

use crate::config::settings::Settings;
use crate::display::format_dashboard;
use crate::error::{UpkeepError, UpkeepResult};
use crate::models::User;
use crate::reports::{DashboardOptions, DashboardReport};
use crate::storage::Storage;

pub fn handle_dashboard_command(
    storage: &Storage,
    user: &User,
    settings: &Settings,
    today: NaiveDate,
) -> UpkeepResult<()> {
    let report =
        DashboardReport::generate(storage, user, today, DashboardOptions::from_settings(settings))?;
    print!("{}", format_dashboard(&report, &settings.currency_symbol));
    Ok(())
}

/// Print category totals as `{"labels": [...], "data": [...]}`
pub fn handle_chart_command(
    storage: &Storage,
    user: &User,
    settings: &Settings,
    today: NaiveDate,
    pretty: bool,
) -> UpkeepResult<()> {
    let report =
        DashboardReport::generate(storage, user, today, DashboardOptions::from_settings(settings))?;
    let chart = report.chart_data();

    let json = if pretty {
        serde_json::to_string_pretty(&chart)
    } else {
        serde_json::to_string(&chart)
    }
    .map_err(|e| UpkeepError::Json(e.to_string()))?;

    println!("{}", json);
    Ok(())
}
