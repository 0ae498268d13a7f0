use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "orgctl", bin_name = "orgctl", version)]
#[command(about = "Assign permission sets and set profile photos on a cloud org", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Org alias to run against (see `orgctl org list`)
    #[arg(short = 'o', long, global = true, help_heading = "Options")]
    pub target_org: Option<String>,

    /// Print the result as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Fail instead of prompting when a name matches several records
    #[arg(long, global = true, help_heading = "Options")]
    pub no_prompt: bool,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Permission set commands
    #[command(subcommand)]
    Permset(PermsetCommands),

    /// User commands
    #[command(subcommand)]
    User(UserCommands),

    /// Chatter group commands
    #[command(subcommand)]
    Group(GroupCommands),

    /// Manage saved org logins
    #[command(subcommand)]
    Org(OrgCommands),
}

#[derive(Subcommand, Debug)]
pub enum PermsetCommands {
    /// Assign a permset to a user by first/last name, or just the default user.
    /// Does not error if the permset is already assigned
    Assign {
        /// The value of the permset name or label field
        #[arg(short = 'n', long)]
        name: String,

        /// Last name of the user
        #[arg(short = 'l', long)]
        lastname: Option<String>,

        /// First (given) name of the user
        #[arg(short = 'g', long, requires = "lastname")]
        firstname: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Set the photo of a user by first/last name, or of the default user
    Photo {
        /// Local image file
        #[arg(short = 'f', long)]
        file: PathBuf,

        /// Last name of the user
        #[arg(short = 'l', long)]
        lastname: Option<String>,

        /// First (given) name of the user
        #[arg(short = 'g', long, requires = "lastname")]
        firstname: Option<String>,

        /// Set the banner photo instead of the profile photo
        #[arg(short = 'b', long)]
        banner: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Set the photo of a Chatter group
    Photo {
        /// Local image file
        #[arg(short = 'f', long)]
        file: PathBuf,

        /// Group id
        #[arg(short = 'i', long, conflicts_with = "name", required_unless_present = "name")]
        id: Option<String>,

        /// Group name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Set the banner photo instead of the group photo
        #[arg(short = 'b', long)]
        banner: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum OrgCommands {
    /// Save an org login under an alias
    Add {
        alias: String,

        /// Instance URL, e.g. https://mydomain.my.salesforce.com
        #[arg(long)]
        instance_url: String,

        /// OAuth access token or session id
        #[arg(long)]
        access_token: String,

        /// Pin an API version for this org (e.g. 60.0)
        #[arg(long)]
        api_version: Option<String>,

        /// Make this the default org
        #[arg(long)]
        set_default: bool,
    },

    /// List saved orgs
    #[command(alias = "ls")]
    List,

    /// Forget a saved org
    #[command(alias = "rm")]
    Remove { alias: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_permset_assign() {
        let cli = Cli::try_parse_from([
            "orgctl", "permset", "assign", "-n", "Sales Admin", "-l", "Doe", "-g", "Jane",
        ])
        .unwrap();
        match cli.command {
            Commands::Permset(PermsetCommands::Assign {
                name,
                lastname,
                firstname,
            }) => {
                assert_eq!(name, "Sales Admin");
                assert_eq!(lastname.as_deref(), Some("Doe"));
                assert_eq!(firstname.as_deref(), Some("Jane"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn firstname_requires_lastname() {
        let err = Cli::try_parse_from(["orgctl", "permset", "assign", "-n", "X", "-g", "Jane"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn group_photo_needs_id_or_name() {
        assert!(Cli::try_parse_from(["orgctl", "group", "photo", "-f", "a.png"]).is_err());
        assert!(
            Cli::try_parse_from(["orgctl", "group", "photo", "-f", "a.png", "-i", "0F9", "-n", "x"])
                .is_err()
        );
        assert!(Cli::try_parse_from(["orgctl", "group", "photo", "-f", "a.png", "-n", "Eng"]).is_ok());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "orgctl", "user", "photo", "-f", "me.png", "--banner", "--json", "-o", "dev",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.target_org.as_deref(), Some("dev"));
    }
}
