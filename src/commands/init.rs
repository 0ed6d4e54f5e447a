use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, its `store` subdirectory and an initial `config.json`.
///
/// # Arguments
/// - `home` - The directory that will be the root of data directory, e.g. `$HOME/expenses`
/// - `currency` - The label printed next to amounts. Defaults to CHF.
///
/// # Errors
/// - Returns an error if the directory has already been initialized or any file operation fails.
pub async fn init(home: &Path, currency: Option<&str>) -> Result<Out<()>> {
    let config = Config::create(home, currency)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the expenses directory at '{}'",
        config.root().display()
    )
    .into())
}
