//! Definitions of CLI arguments and commands for the deploy scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::{
        deploy_edu_ledger, deploy_in_forwarder, deploy_post_storage, deploy_relayer_manager,
        deploy_standalone, migrate_posts, show_posts,
    },
    config::{ConfigArgs, Configuration},
    contracts::{AUTH_STORAGE, PASSKEY_STORAGE, VISITOR_STORAGE},
    errors::ScriptError,
};

/// The deploy scripts
#[derive(Parser)]
#[command(about = "Deploys the contracts & records their addresses and ABIs")]
pub struct Cli {
    /// Configuration shared by every command
    #[command(flatten)]
    pub config: ConfigArgs,

    /// The command to run
    #[command(subcommand)]
    pub command: Command,
}

/// The scripts that can be run
#[derive(Subcommand)]
pub enum Command {
    /// Deploy the relayer manager & register the relayers with it
    DeployRelayerManager,
    /// Deploy the forwarder
    DeployInForwarder(DeployInForwarderArgs),
    /// Deploy the auth storage
    DeployAuthStorage,
    /// Deploy the passkey storage
    DeployPasskeyStorage,
    /// Deploy the visitor storage
    DeployVisitorStorage,
    /// Deploy the post storage
    DeployPostStorage(DeployPostStorageArgs),
    /// Deploy the education ledger behind its proxy, with its authenticator,
    /// instructor ledger & view
    DeployEduLedger,
    /// Replay every user's posts from the previous post storage into the
    /// current one
    MigratePosts(MigratePostsArgs),
    /// Show the posts of a user in the current post storage
    ShowPosts(ShowPostsArgs),
}

impl Command {
    /// Run the command
    pub async fn run(self, config: &Configuration) -> Result<(), ScriptError> {
        match self {
            Command::DeployRelayerManager => deploy_relayer_manager(config).await,
            Command::DeployInForwarder(args) => {
                deploy_in_forwarder(config, args.relayer_manager.as_deref()).await
            }
            Command::DeployAuthStorage => deploy_standalone(config, &AUTH_STORAGE).await,
            Command::DeployPasskeyStorage => deploy_standalone(config, &PASSKEY_STORAGE).await,
            Command::DeployVisitorStorage => deploy_standalone(config, &VISITOR_STORAGE).await,
            Command::DeployPostStorage(args) => {
                deploy_post_storage(config, args.forwarder.as_deref()).await
            }
            Command::DeployEduLedger => deploy_edu_ledger(config).await,
            Command::MigratePosts(args) => migrate_posts(config, args.previous).await,
            Command::ShowPosts(args) => show_posts(config, &args.user).await,
        }
    }
}

/// Deploy the forwarder
#[derive(Args)]
pub struct DeployInForwarderArgs {
    /// Address of the relayer manager, read from its deployed artifact when
    /// absent
    #[arg(long, env = "RELAYER_MANAGER_ADDRESS")]
    pub relayer_manager: Option<String>,
}

/// Deploy the post storage
#[derive(Args)]
pub struct DeployPostStorageArgs {
    /// Address of the forwarder, read from its deployed artifact when absent
    #[arg(long, env = "FORWARDER_ADDRESS")]
    pub forwarder: Option<String>,
}

/// Migrate posts
#[derive(Args)]
pub struct MigratePostsArgs {
    /// Path of the previous post storage's artifact, defaults to the
    /// archived artifact of the environment
    #[arg(long)]
    pub previous: Option<PathBuf>,
}

/// Show posts
#[derive(Args)]
pub struct ShowPostsArgs {
    /// Address of the user
    pub user: String,
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn test_parse_commands() {
        let cli = Cli::try_parse_from(["deploy", "--network", "kaia_test", "deploy-auth-storage"])
            .unwrap();
        assert_eq!(cli.config.network, "kaia_test");
        assert!(matches!(cli.command, Command::DeployAuthStorage));

        let cli = Cli::try_parse_from([
            "deploy",
            "deploy-post-storage",
            "--forwarder",
            "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        ])
        .unwrap();
        match cli.command {
            Command::DeployPostStorage(args) => assert_eq!(
                args.forwarder.as_deref(),
                Some("0x5FbDB2315678afecb367f032d93F642f64180aa3")
            ),
            _ => panic!("wrong command"),
        }

        let args = ["deploy", "migrate-posts", "--previous", "old.json"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Command::MigratePosts(args) => {
                assert_eq!(args.previous, Some(PathBuf::from("old.json")))
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn test_show_posts_requires_user() {
        assert!(Cli::try_parse_from(["deploy", "show-posts"]).is_err());
    }
}
