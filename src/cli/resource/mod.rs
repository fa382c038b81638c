mod deploy;
mod identity;

pub use crate::cli::resource::deploy::DeployCommand;

use crate::cli::resource::identity::GetIdentities;
use clap::Subcommand;
use prettytable::{format, Table};

#[derive(Debug, Subcommand)]
pub enum GetResource {
    /// List the identity tokens available in the pool
    Identities(GetIdentities),
}

/// Trait which defines how resources should be displayed
trait DisplayResource<T = Self>
where
    T: Sized,
{
    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_CLEAN);
        table
    }
    /// Prints the list of resources in form of table
    fn into_table(&self) -> Table;
}
