pub mod pagination;
pub mod post;
pub mod reaction;
pub mod user;

pub use pagination::{Listing, Page, PageQuery, Pager};
pub use post::{Category, Comment, Post, PostDraft, PostFlag, Resource, Tag, Term, TermKind};
pub use reaction::{ReactionCounts, ReactionResponse, ReactionState, ReactionType};
pub use user::{ProfileUpdate, Role, User};
