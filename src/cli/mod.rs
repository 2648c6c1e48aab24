pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::API_URL_ENV;
use crate::domain::ReactionType;

#[derive(Parser)]
#[command(name = "inkpost")]
#[command(about = "A terminal client for the Inkpost blogging platform", long_about = None)]
pub struct Cli {
    /// Backend API root, overriding the config file
    #[arg(long, global = true, env = API_URL_ENV)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the session
    Login {
        /// Username (prompted when omitted)
        username: Option<String>,
        /// Login location from a redirect notice, to continue where you left off
        #[arg(long)]
        next: Option<String>,
    },
    /// Create an account and sign in with it
    Register {
        username: String,
        email: String,
        /// Requested role: USER or AUTHOR
        #[arg(long, default_value = "USER")]
        role: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// List published posts
    Posts {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long)]
        search: Option<String>,
        /// Category id (0 for all)
        #[arg(short, long)]
        category: Option<i64>,
    },
    /// List featured posts
    Featured {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Show a post with its reactions and comments
    Show {
        slug: String,
    },
    /// React to a post; repeating your current reaction removes it
    React {
        slug: String,
        /// like, love, haha, wow, sad or angry
        reaction: ReactionType,
    },
    /// Comment on a post
    Comment {
        slug: String,
        text: String,
    },
    /// List posts in the dashboard
    Blogs {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Manage a single post
    Blog {
        #[command(subcommand)]
        action: BlogAction,
    },
    /// List or manage categories
    Categories {
        #[command(subcommand)]
        action: Option<TermAction>,
    },
    /// List or manage tags
    Tags {
        #[command(subcommand)]
        action: Option<TermAction>,
    },
    /// List or manage users (admin)
    Users {
        #[command(subcommand)]
        action: Option<UserAction>,
    },
    /// Show or update your profile
    Profile {
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
    },
    /// Change your password
    Password,
    /// Launch the TUI
    Tui,
}

#[derive(Subcommand)]
pub enum BlogAction {
    /// Create a draft post
    Create {
        title: String,
        /// Read the body from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        /// Tag id, may be repeated
        #[arg(long = "tag")]
        tags: Vec<i64>,
    },
    /// Edit an existing post
    Edit {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        category: Option<i64>,
        #[arg(long = "tag")]
        tags: Vec<i64>,
    },
    /// Delete a post
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Publish a post, or unpublish with --off
    Publish {
        id: i64,
        #[arg(long)]
        off: bool,
    },
    /// Feature a post, or unfeature with --off
    Feature {
        id: i64,
        #[arg(long)]
        off: bool,
    },
    /// Activate a post, or deactivate with --off
    Activate {
        id: i64,
        #[arg(long)]
        off: bool,
    },
}

#[derive(Subcommand)]
pub enum TermAction {
    /// List entries
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Add an entry
    Add { name: String },
    /// Rename an entry
    Rename { id: i64, name: String },
    /// Enable an entry
    Enable { id: i64 },
    /// Disable an entry
    Disable { id: i64 },
    /// Delete an entry
    Delete {
        id: i64,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// List users
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Delete a user
    Delete {
        id: i64,
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_react_parses_reaction_name() {
        let cli = Cli::try_parse_from(["inkpost", "react", "hello-world", "LOVE"]).unwrap();
        match cli.command {
            Commands::React { slug, reaction } => {
                assert_eq!(slug, "hello-world");
                assert_eq!(reaction, ReactionType::Love);
            }
            _ => panic!("expected react"),
        }
    }

    #[test]
    fn test_react_rejects_unknown_reaction() {
        assert!(Cli::try_parse_from(["inkpost", "react", "hello-world", "meh"]).is_err());
    }

    #[test]
    fn test_blog_create_collects_tags() {
        let cli = Cli::try_parse_from([
            "inkpost", "blog", "create", "Title", "--tag", "1", "--tag", "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Blog {
                action: BlogAction::Create { title, tags, .. },
            } => {
                assert_eq!(title, "Title");
                assert_eq!(tags, vec![1, 4]);
            }
            _ => panic!("expected blog create"),
        }
    }

    #[test]
    fn test_api_url_is_global() {
        let cli =
            Cli::try_parse_from(["inkpost", "posts", "--api-url", "http://h/api/"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://h/api/"));
    }

    #[test]
    fn test_login_accepts_redirect_location() {
        let cli = Cli::try_parse_from([
            "inkpost",
            "login",
            "eve",
            "--next",
            "/login?next=%2Fdashboard%2Fusers",
        ])
        .unwrap();
        match cli.command {
            Commands::Login { username, next } => {
                assert_eq!(username.as_deref(), Some("eve"));
                assert_eq!(next.as_deref(), Some("/login?next=%2Fdashboard%2Fusers"));
            }
            _ => panic!("expected login"),
        }
    }
}
