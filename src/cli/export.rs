//! Export command

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::ValueEnum;
use tracing::info;

use crate::error::{UpkeepError, UpkeepResult};
use crate::export::{default_export_filename, export_expenses_csv, export_json};
use crate::models::User;
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ExportFormat {
    /// Full export, re-importable with `upkeep import`
    #[default]
    Json,
    /// One row per expense, for spreadsheets
    Csv,
}

impl ExportFormat {
    fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Export the user's data; `-` as the output writes to stdout
pub fn handle_export_command(
    storage: &Storage,
    user: &User,
    output: Option<PathBuf>,
    format: ExportFormat,
    pretty: bool,
    today: NaiveDate,
) -> UpkeepResult<()> {
    let output = output.unwrap_or_else(|| {
        PathBuf::from(default_export_filename(
            &user.username,
            Utc::now(),
            format.extension(),
        ))
    });

    if output.as_os_str() == "-" {
        let stdout = std::io::stdout();
        let mut writer = stdout.lock();
        return write_export(storage, user, &mut writer, format, pretty, today).map(|_| ());
    }

    let file = File::create(&output).map_err(|e| {
        UpkeepError::Export(format!("Failed to create file {}: {}", output.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    let summary = write_export(storage, user, &mut writer, format, pretty, today)?;
    writer
        .flush()
        .map_err(|e| UpkeepError::Export(e.to_string()))?;

    info!(path = %output.display(), "export written");
    println!("{} exported to: {}", summary, output.display());
    Ok(())
}

fn write_export<W: Write>(
    storage: &Storage,
    user: &User,
    writer: &mut W,
    format: ExportFormat,
    pretty: bool,
    today: NaiveDate,
) -> UpkeepResult<String> {
    match format {
        ExportFormat::Json => {
            let document = export_json(storage, user, writer, pretty)?;
            Ok(format!(
                "{} expense(s), {} payment(s) and {} categor{}",
                document.expenses.len(),
                document.payment_count(),
                document.categories.len(),
                if document.categories.len() == 1 { "y" } else { "ies" }
            ))
        }
        ExportFormat::Csv => {
            let rows = export_expenses_csv(storage, user, today, writer)?;
            Ok(format!("{} expense(s)", rows))
        }
    }
}
