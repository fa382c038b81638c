pub mod command;
mod resource;

use crate::cli::command::GetMultipleCommand;
use crate::cli::resource::DeployCommand;
use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};

/// `Handler` is a trait that should be implemented for each of our commands.
///
/// It defines the contract & the input / output of a command execution.
#[async_trait]
pub trait Handler {
    /// Executes the command handler.
    ///
    /// Every command takes no argument, as it is built at runtime with the arguments using Clap.
    /// Also, a command must always return a `Result<()>`.
    async fn handler(&self) -> Result<()>;
}

/// The enumeration of our commands.
///
/// Each of our commands should be listed in this enumeration with the following format :
/// CommandName(CommandHandler)
#[derive(Subcommand, Debug)]
pub enum Command {
    Deploy(DeployCommand),
    Get(GetMultipleCommand),
}

#[derive(Parser, Debug)]
#[clap(version, author)]
pub struct CommandLineInterface {
    /// The subcommand to apply
    #[clap(subcommand)]
    pub command: Command,
}

impl CommandLineInterface {
    pub fn command(self) -> Box<dyn Handler> {
        match self.command {
            Command::Deploy(handler) => Box::new(handler),
            Command::Get(subcommand) => subcommand.command(),
        }
    }
}
