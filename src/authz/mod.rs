pub mod guard;
pub mod policy;

pub use guard::{
    return_path_from, GuardState, GuestGuard, Redirect, Route, RouteGuard, DEFAULT_LANDING_PATH,
    DEFAULT_LOGIN_PATH, HOME_PATH,
};
pub use policy::{
    can_edit_or_delete_owned, can_edit_or_delete_resource, can_toggle_publish, is_admin,
    is_admin_or_author, is_author, is_user, Authored, Owned, PostControls,
};
