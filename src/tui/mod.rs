pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, warn};

use crate::api::ReactionApi;
use crate::app::{AppContext, InkpostError, Result};
use crate::reaction::{Settled, LOGIN_PROMPT};

use self::app::TuiApp;
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: &AppContext) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: &AppContext) -> Result<()> {
    let mut tui_app = TuiApp::new();
    let event_handler = EventHandler::new(Duration::from_millis(100));
    let config = &ctx.config;
    let viewer = ctx.user();
    let reaction_api: Arc<dyn ReactionApi + Send + Sync> = ctx.api.clone();

    tui_app.is_loading = true;
    terminal.draw(|frame| layout::render(frame, &tui_app, viewer, &config.colors))?;
    load_page(&mut tui_app, ctx).await;

    loop {
        // Reactions settle in the background; fold in whatever arrived.
        for (item_id, settled) in tui_app.reactions.drain() {
            match settled {
                Settled::RolledBack => {
                    tui_app.set_error(InkpostError::ReactionFailed.to_string());
                }
                Settled::Confirmed => debug!("Reaction on {} confirmed", item_id),
                Settled::Stale => {}
            }
        }

        terminal.draw(|frame| layout::render(frame, &tui_app, viewer, &config.colors))?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                let action = config.keybindings.get_action(&key);
                if action != Action::None {
                    tui_app.clear_status();
                }
                match action {
                    Action::Quit => {
                        tui_app.should_quit = true;
                    }
                    Action::MoveUp => {
                        tui_app.move_up();
                    }
                    Action::MoveDown => {
                        tui_app.move_down();
                    }
                    Action::NextPane => {
                        tui_app.active_pane = tui_app.active_pane.toggle();
                    }
                    Action::NextPage => {
                        if tui_app.pager.next_page() {
                            tui_app.post_index = 0;
                            reload(terminal, &mut tui_app, ctx).await?;
                        }
                    }
                    Action::PrevPage => {
                        if tui_app.pager.prev_page() {
                            tui_app.post_index = 0;
                            reload(terminal, &mut tui_app, ctx).await?;
                        }
                    }
                    Action::Select => {
                        let key = tui_app.selected_post().map(|p| p.route_key());
                        if let Some(key) = key {
                            match ctx.api.get_post(&key).await {
                                Ok(post) => tui_app.set_detail(post),
                                Err(e) => tui_app.set_error(format!("Failed to load post: {}", e)),
                            }
                        }
                    }
                    Action::OpenInBrowser => {
                        let url = tui_app
                            .selected_post()
                            .map(|p| config.api.post_url(&p.route_key()));
                        if let Some(url) = url {
                            if let Err(e) = open::that(&url) {
                                tui_app.set_error(format!("Failed to open browser: {}", e));
                            }
                        }
                    }
                    Action::Refresh => {
                        reload(terminal, &mut tui_app, ctx).await?;
                        tui_app.set_status(format!("Refreshed: {} posts", tui_app.pager.total()));
                    }
                    Action::React(reaction) => {
                        let item_id = tui_app.preview_post().map(|p| p.id);
                        if let Some(item_id) = item_id {
                            match tui_app.reactions.click(
                                viewer,
                                item_id,
                                reaction,
                                reaction_api.clone(),
                            ) {
                                Ok(()) => {}
                                Err(InkpostError::NotAuthenticated) => {
                                    tui_app.set_error(LOGIN_PROMPT.to_string());
                                }
                                Err(e) => {
                                    warn!("Reaction click on {} ignored: {}", item_id, e);
                                }
                            }
                        }
                    }
                    Action::None => {}
                }
            }
            AppEvent::Tick => {}
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn reload(terminal: &mut Tui, tui_app: &mut TuiApp, ctx: &AppContext) -> Result<()> {
    tui_app.is_loading = true;
    terminal.draw(|frame| layout::render(frame, tui_app, ctx.user(), &ctx.config.colors))?;
    load_page(tui_app, ctx).await;
    Ok(())
}

async fn load_page(tui_app: &mut TuiApp, ctx: &AppContext) {
    match ctx.api.list_posts(tui_app.pager.query()).await {
        Ok(page) => tui_app.set_page(page),
        Err(e) => {
            warn!("Failed to load posts: {}", e);
            tui_app.set_error(format!("Failed to load posts: {}", e));
        }
    }
    tui_app.is_loading = false;
}
