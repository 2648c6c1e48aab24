use crate::domain::{Page, Pager, Post, ReactionState};
use crate::reaction::ReactionBoard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Posts,
    Preview,
}

impl ActivePane {
    pub fn toggle(self) -> Self {
        match self {
            ActivePane::Posts => ActivePane::Preview,
            ActivePane::Preview => ActivePane::Posts,
        }
    }
}

pub struct TuiApp {
    pub active_pane: ActivePane,
    pub posts: Vec<Post>,
    pub post_index: usize,
    /// Full post loaded with Enter, shown instead of the list entry.
    pub detail: Option<Post>,
    pub pager: Pager,
    pub reactions: ReactionBoard,
    pub preview_scroll: u16,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pub status_is_error: bool,
    pub is_loading: bool,
}

impl TuiApp {
    pub fn new() -> Self {
        Self {
            active_pane: ActivePane::Posts,
            posts: Vec::new(),
            post_index: 0,
            detail: None,
            pager: Pager::new(),
            reactions: ReactionBoard::new(),
            preview_scroll: 0,
            should_quit: false,
            status_message: None,
            status_is_error: false,
            is_loading: false,
        }
    }

    pub fn selected_post(&self) -> Option<&Post> {
        self.posts.get(self.post_index)
    }

    /// The post the preview shows: its loaded detail when it matches the
    /// selection, the list entry otherwise.
    pub fn preview_post(&self) -> Option<&Post> {
        let selected = self.selected_post()?;
        match &self.detail {
            Some(detail) if detail.id == selected.id => Some(detail),
            _ => Some(selected),
        }
    }

    /// Reaction state to draw for `post`.
    pub fn reaction_state(&self, post: &Post) -> ReactionState {
        self.reactions
            .state(post.id)
            .cloned()
            .unwrap_or_else(|| post.reaction_state())
    }

    /// Replace the listing with a freshly fetched page.
    ///
    /// Reactions of posts that left the screen are dropped. Posts still
    /// waiting on a reaction keep their optimistic state; the rest take
    /// the server's counts.
    pub fn set_page(&mut self, page: Page<Post>) {
        self.pager.update(&page);
        self.posts = page.results;
        self.detail = None;

        let visible: Vec<i64> = self.posts.iter().map(|p| p.id).collect();
        self.reactions.retain(|id| visible.contains(&id));
        for post in &self.posts {
            sync_reactions(&mut self.reactions, post);
        }

        if self.post_index >= self.posts.len() {
            self.post_index = self.posts.len().saturating_sub(1);
        }
        self.preview_scroll = 0;
    }

    pub fn set_detail(&mut self, post: Post) {
        sync_reactions(&mut self.reactions, &post);
        self.detail = Some(post);
        self.preview_scroll = 0;
    }

    pub fn move_up(&mut self) {
        match self.active_pane {
            ActivePane::Posts => {
                if self.post_index > 0 {
                    self.post_index -= 1;
                    self.preview_scroll = 0;
                }
            }
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_sub(1);
            }
        }
    }

    pub fn move_down(&mut self) {
        match self.active_pane {
            ActivePane::Posts => {
                if self.post_index + 1 < self.posts.len() {
                    self.post_index += 1;
                    self.preview_scroll = 0;
                }
            }
            ActivePane::Preview => {
                self.preview_scroll = self.preview_scroll.saturating_add(1);
            }
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_is_error = false;
    }

    pub fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.status_is_error = true;
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
        self.status_is_error = false;
    }
}

fn sync_reactions(board: &mut ReactionBoard, post: &Post) {
    if board.is_pending(post.id) {
        board.mount(post.id, post.reaction_state());
    } else {
        board.remount(post.id, post.reaction_state());
    }
}

impl Default for TuiApp {
    fn default() -> Self {
        Self::new()
    }
}
