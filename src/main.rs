use std::fs::{self, File};
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use inkpost::app::AppContext;
use inkpost::cli::{commands, BlogAction, Cli, Commands, TermAction, UserAction};
use inkpost::config::Config;
use inkpost::domain::{PostFlag, ProfileUpdate, TermKind};

/// Log to stderr, or to a file while the TUI owns the terminal.
fn init_tracing(to_file: bool) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());

    if to_file {
        let dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?
            .join("inkpost");
        fs::create_dir_all(&dir)?;
        let file = File::create(dir.join("inkpost.log"))?;
        registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(matches!(cli.command, Commands::Tui))?;

    let config = Config::load()?.with_api_url(cli.api_url);
    let mut ctx = AppContext::new(config)?;
    ctx.restore_session().await;

    if let Err(e) = dispatch(&mut ctx, cli.command).await {
        // Guard redirects are notices, not failures
        match commands::redirect_notice(&e) {
            Some(notice) => println!("{}", notice),
            None => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

async fn dispatch(ctx: &mut AppContext, command: Commands) -> inkpost::app::Result<()> {
    match command {
        Commands::Login { username, next } => {
            commands::login(ctx, username, next).await?;
        }
        Commands::Register {
            username,
            email,
            role,
        } => {
            commands::register(ctx, username, email, &role).await?;
        }
        Commands::Logout => {
            commands::logout(ctx)?;
        }
        Commands::Whoami => {
            commands::whoami(ctx)?;
        }
        Commands::Posts {
            page,
            search,
            category,
        } => {
            commands::list_posts(ctx, page, search, category).await?;
        }
        Commands::Featured { page } => {
            commands::list_featured(ctx, page).await?;
        }
        Commands::Show { slug } => {
            commands::show_post(ctx, &slug).await?;
        }
        Commands::React { slug, reaction } => {
            commands::react(ctx, &slug, reaction).await?;
        }
        Commands::Comment { slug, text } => {
            commands::comment(ctx, &slug, &text).await?;
        }
        Commands::Blogs { page, search } => {
            commands::list_blogs(ctx, page, search).await?;
        }
        Commands::Blog { action } => match action {
            BlogAction::Create {
                title,
                file,
                content,
                category,
                tags,
            } => {
                commands::create_blog(ctx, title, file.as_deref(), content, category, tags)
                    .await?;
            }
            BlogAction::Edit {
                id,
                title,
                file,
                content,
                category,
                tags,
            } => {
                commands::edit_blog(ctx, id, title, file.as_deref(), content, category, tags)
                    .await?;
            }
            BlogAction::Delete { id, yes } => {
                commands::delete_blog(ctx, id, yes).await?;
            }
            BlogAction::Publish { id, off } => {
                commands::set_blog_flag(ctx, id, PostFlag::IsPublished(!off)).await?;
            }
            BlogAction::Feature { id, off } => {
                commands::set_blog_flag(ctx, id, PostFlag::IsFeatured(!off)).await?;
            }
            BlogAction::Activate { id, off } => {
                commands::set_blog_flag(ctx, id, PostFlag::IsActive(!off)).await?;
            }
        },
        Commands::Categories { action } => {
            run_term_action(ctx, TermKind::Category, action).await?;
        }
        Commands::Tags { action } => {
            run_term_action(ctx, TermKind::Tag, action).await?;
        }
        Commands::Users { action } => match action.unwrap_or(UserAction::List {
            page: 1,
            search: None,
        }) {
            UserAction::List { page, search } => {
                commands::list_users(ctx, page, search).await?;
            }
            UserAction::Delete { id, yes } => {
                commands::delete_user(ctx, id, yes).await?;
            }
        },
        Commands::Profile {
            username,
            email,
            bio,
        } => {
            commands::profile(
                ctx,
                ProfileUpdate {
                    username,
                    email,
                    bio,
                },
            )
            .await?;
        }
        Commands::Password => {
            commands::change_password(ctx).await?;
        }
        Commands::Tui => {
            inkpost::tui::run(ctx).await?;
        }
    }

    Ok(())
}

async fn run_term_action(
    ctx: &AppContext,
    kind: TermKind,
    action: Option<TermAction>,
) -> inkpost::app::Result<()> {
    match action.unwrap_or(TermAction::List { page: 1 }) {
        TermAction::List { page } => commands::list_terms(ctx, kind, page).await,
        TermAction::Add { name } => commands::add_term(ctx, kind, &name).await,
        TermAction::Rename { id, name } => commands::rename_term(ctx, kind, id, &name).await,
        TermAction::Enable { id } => commands::set_term_active(ctx, kind, id, true).await,
        TermAction::Disable { id } => commands::set_term_active(ctx, kind, id, false).await,
        TermAction::Delete { id, yes } => commands::delete_term(ctx, kind, id, yes).await,
    }
}
