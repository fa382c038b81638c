use anyhow::Result;
use async_trait::async_trait;
use clap::Args;
use prettytable::row;

use crate::cli::Handler;
use crate::core::client::{Client, IdentityApi};
use crate::core::config::Configuration;
use crate::core::pool::identity_tokens;

use super::DisplayResource;

/// List the identity tokens the pool can currently hand out, in pool order.
#[derive(Debug, Args)]
pub struct GetIdentities {
    /// Namespace the identity store lives in.
    #[clap(long, default_value = "stream-viewers")]
    pub namespace: String,

    /// Name of the identity store holding the VPN identities.
    #[clap(long, default_value = "vpn-identities")]
    pub identity_store: String,
}

#[async_trait]
impl Handler for GetIdentities {
    #[tracing::instrument(name = "GetIdentities::handler", skip(self))]
    async fn handler(&self) -> Result<()> {
        let config = Configuration::load()?;
        let store = Client::init(config.cluster)
            .get_identity_store(&self.namespace, &self.identity_store)
            .await?;

        let table = identity_tokens(&store).into_table();
        table.printstd();
        Ok(())
    }
}

impl DisplayResource for Vec<String> {
    fn into_table(&self) -> prettytable::Table {
        let mut table = Self::new_table();
        table.set_titles(row!["POSITION", "IDENTITY"]);
        if self.is_empty() {
            table.add_row(row!["", ""]);
        }
        for (position, token) in self.iter().enumerate() {
            table.add_row(row![position, token]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_identities_table() {
        let tokens = vec!["vpnA".to_string(), "vpnB".to_string()];

        let table = tokens.into_table();
        let expected_output = " POSITION  IDENTITY \n 0         vpnA \n 1         vpnB \n";
        assert_eq!(table.to_string(), expected_output);
    }
}
