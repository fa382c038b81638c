use crate::cli::resource::GetResource;
use crate::cli::Handler;
use clap::Args;

/// Read resources from the cluster.
#[derive(Debug, Args)]
pub struct GetMultipleCommand {
    #[clap(subcommand)]
    resource: GetResource,
}

impl GetMultipleCommand {
    pub fn command(self) -> Box<dyn Handler> {
        match self.resource {
            GetResource::Identities(handler) => Box::new(handler),
        }
    }
}
