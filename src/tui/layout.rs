use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::config::ColorConfig;
use crate::domain::{Post, ReactionState, ReactionType, User};
use crate::tui::app::{ActivePane, TuiApp};

pub fn render(frame: &mut Frame, app: &TuiApp, viewer: Option<&User>, colors: &ColorConfig) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35), // Posts pane
            Constraint::Min(10),        // Preview pane
            Constraint::Length(1),      // Status bar
        ])
        .split(frame.area());

    render_posts_pane(frame, app, chunks[0], colors);
    render_preview_pane(frame, app, chunks[1], colors);
    render_status_bar(frame, app, viewer, chunks[2], colors);
}

fn border_style(active: bool, colors: &ColorConfig) -> Style {
    if active {
        Style::default().fg(colors.active_border)
    } else {
        Style::default().fg(colors.inactive_border)
    }
}

fn render_posts_pane(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::Posts;

    let items: Vec<ListItem> = app
        .posts
        .iter()
        .map(|post| {
            let marker = if post.is_featured { "★" } else { " " };
            let date = post
                .published_at
                .or(post.created_at)
                .map(|d| d.format("%m/%d").to_string())
                .unwrap_or_else(|| "     ".to_string());
            let pending = if app.reactions.is_pending(post.id) {
                " …"
            } else {
                ""
            };

            ListItem::new(Line::from(vec![
                Span::raw(format!("{} {} ", marker, date)),
                Span::styled(
                    post.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {}", post.author_name()),
                    Style::default().fg(colors.metadata_author),
                ),
                Span::styled(pending, Style::default().fg(colors.reaction_pending)),
            ]))
        })
        .collect();

    let title = if app.is_loading {
        " Posts (loading…) ".to_string()
    } else {
        format!(
            " Posts (page {}/{}, {} total) ",
            app.pager.current_page(),
            app.pager.total_pages(app.posts.len()),
            app.pager.total()
        )
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active, colors));

    let highlight = if is_active {
        Style::default()
            .bg(colors.selection_bg)
            .fg(colors.selection_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };

    let list = List::new(items).block(block).highlight_style(highlight);
    let mut state = ListState::default();
    if !app.posts.is_empty() {
        state.select(Some(app.post_index));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// The reaction bar: one cell per type, the viewer's choice highlighted.
pub fn reaction_line(state: &ReactionState, pending: bool, colors: &ColorConfig) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, reaction) in ReactionType::ALL.iter().enumerate() {
        let selected = state.user_reaction == Some(*reaction);
        let mut style = Style::default().fg(if selected {
            colors.reaction_selected
        } else {
            colors.reaction
        });
        if selected {
            style = style.add_modifier(Modifier::BOLD);
        }
        if pending {
            style = style.add_modifier(Modifier::DIM);
        }
        spans.push(Span::styled(
            format!(
                "{}:{} {}  ",
                i + 1,
                reaction.emoji(),
                state.counts.display_count(*reaction)
            ),
            style,
        ));
    }

    let total = state.counts.display_total();
    if !total.is_empty() {
        spans.push(Span::styled(
            format!("{} reactions", total),
            Style::default().fg(colors.reaction),
        ));
    }
    Line::from(spans)
}

fn post_lines(app: &TuiApp, post: &Post, width: u16, colors: &ColorConfig) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    lines.push(Line::from(Span::styled(
        post.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(
        format!("By: {}", post.author_name()),
        Style::default().fg(colors.metadata_author),
    )));
    if let Some(since) = &post.time_since_published {
        lines.push(Line::from(Span::styled(
            format!("Published: {}", since),
            Style::default().fg(colors.metadata_date),
        )));
    } else if let Some(date) = post.published_at.or(post.created_at) {
        lines.push(Line::from(Span::styled(
            format!("Date: {}", date.format("%Y-%m-%d %H:%M")),
            Style::default().fg(colors.metadata_date),
        )));
    }
    if let Some(category) = &post.category {
        let tags: Vec<&str> = post.tags.iter().map(|t| t.name.as_str()).collect();
        let suffix = if tags.is_empty() {
            String::new()
        } else {
            format!("  #{}", tags.join(" #"))
        };
        lines.push(Line::from(Span::styled(
            format!("In: {}{}", category.name, suffix),
            Style::default().fg(colors.metadata_category),
        )));
    }

    lines.push(Line::from(""));
    lines.push(reaction_line(
        &app.reaction_state(post),
        app.reactions.is_pending(post.id),
        colors,
    ));
    lines.push(Line::from("─".repeat(width.saturating_sub(2) as usize)));
    lines.push(Line::from(""));

    let body = post.display_content();
    if body.is_empty() {
        lines.push(Line::from(Span::styled(
            "Press Enter to load the full post",
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    for line in body.lines() {
        lines.push(Line::from(line.to_string()));
    }

    if !post.comments.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Comments ({})", post.comments.len()),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for comment in &post.comments {
            let author = comment
                .user
                .as_ref()
                .map(|u| u.display_name())
                .unwrap_or_else(|| "Anonymous".to_string());
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{}: ", author),
                    Style::default().fg(colors.metadata_author),
                ),
                Span::raw(comment.content.clone()),
            ]));
        }
    }

    lines
}

fn render_preview_pane(frame: &mut Frame, app: &TuiApp, area: Rect, colors: &ColorConfig) {
    let is_active = app.active_pane == ActivePane::Preview;

    let (title, content) = match app.preview_post() {
        Some(post) => (
            format!(" {} ", post.title),
            Text::from(post_lines(app, post, area.width, colors)),
        ),
        None => (" Preview ".to_string(), Text::from("No post selected")),
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active, colors));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(
    frame: &mut Frame,
    app: &TuiApp,
    viewer: Option<&User>,
    area: Rect,
    colors: &ColorConfig,
) {
    let status = if app.is_loading {
        "Loading...".to_string()
    } else if let Some(msg) = &app.status_message {
        msg.clone()
    } else {
        let who = viewer
            .map(|u| format!("{} ({})", u.username, u.role))
            .unwrap_or_else(|| "signed out".to_string());
        format!(
            "{}  j/k:Navigate  n/p:Page  Enter:Open  1-6:React  o:Browser  R:Refresh  q:Quit",
            who
        )
    };

    let fg = if app.status_is_error {
        colors.error_fg
    } else {
        colors.status_fg
    };
    let paragraph = Paragraph::new(status).style(Style::default().fg(fg).bg(colors.status_bg));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ReactionCounts;

    #[test]
    fn test_reaction_line_lists_every_reaction() {
        let counts: ReactionCounts = [(ReactionType::Love, 3)].into_iter().collect();
        let state = ReactionState::new(counts, Some(ReactionType::Love));
        let line = reaction_line(&state, false, &ColorConfig::default());

        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(text.contains("2:❤️ 3"));
        assert!(text.contains("6:😡 0"));
        assert!(text.ends_with("3 reactions"));

        let love = &line.spans[1];
        assert_eq!(love.style.fg, Some(ColorConfig::default().reaction_selected));
    }

    #[test]
    fn test_pending_reaction_line_is_dimmed() {
        let line = reaction_line(&ReactionState::default(), true, &ColorConfig::default());
        assert!(line.spans[0].style.add_modifier.contains(Modifier::DIM));
    }
}
