//! Role and ownership checks used to decide which actions are offered.
//!
//! Every function is total: a missing user, or a resource without an
//! author, simply denies.

use crate::domain::{Comment, Post, Resource, Role, User};

/// Content whose edit rights follow its author.
pub trait Authored {
    fn author_id(&self) -> Option<i64>;
}

/// Objects owned by a single user (comments, reactions).
pub trait Owned {
    fn owner_id(&self) -> Option<i64>;
}

impl Authored for Resource {
    fn author_id(&self) -> Option<i64> {
        self.author_id
    }
}

impl Authored for Post {
    fn author_id(&self) -> Option<i64> {
        Post::author_id(self)
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Option<i64> {
        Comment::owner_id(self)
    }
}

fn has_role(user: Option<&User>, role: Role) -> bool {
    user.is_some_and(|u| u.role == role)
}

pub fn is_admin(user: Option<&User>) -> bool {
    has_role(user, Role::Admin)
}

pub fn is_author(user: Option<&User>) -> bool {
    has_role(user, Role::Author)
}

pub fn is_user(user: Option<&User>) -> bool {
    has_role(user, Role::User)
}

pub fn is_admin_or_author(user: Option<&User>) -> bool {
    is_admin(user) || is_author(user)
}

/// Admins may edit anything; authors only what they wrote.
pub fn can_edit_or_delete_resource<R: Authored + ?Sized>(user: Option<&User>, resource: &R) -> bool {
    let Some(user) = user else {
        return false;
    };
    if is_admin(Some(user)) {
        return true;
    }
    is_author(Some(user)) && resource.author_id() == Some(user.id)
}

/// Publishing rights are the same as edit rights.
pub fn can_toggle_publish<R: Authored + ?Sized>(user: Option<&User>, resource: &R) -> bool {
    can_edit_or_delete_resource(user, resource)
}

/// Admins, or whoever owns the object regardless of role.
pub fn can_edit_or_delete_owned<O: Owned + ?Sized>(user: Option<&User>, obj: &O) -> bool {
    let Some(user) = user else {
        return false;
    };
    if is_admin(Some(user)) {
        return true;
    }
    obj.owner_id() == Some(user.id)
}

/// Which dashboard controls are enabled for one post row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostControls {
    pub edit: bool,
    pub delete: bool,
    pub toggle_publish: bool,
    pub toggle_featured: bool,
    pub toggle_active: bool,
}

impl PostControls {
    pub fn for_user<R: Authored + ?Sized>(user: Option<&User>, resource: &R) -> Self {
        let can_edit = can_edit_or_delete_resource(user, resource);
        Self {
            edit: can_edit,
            delete: can_edit,
            toggle_publish: can_toggle_publish(user, resource),
            toggle_featured: can_edit,
            toggle_active: can_edit,
        }
    }

    pub fn any(&self) -> bool {
        self.edit || self.delete || self.toggle_publish || self.toggle_featured || self.toggle_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, role: Role) -> User {
        User::new(id, format!("user{}", id), role)
    }

    fn resource(author_id: Option<i64>) -> Resource {
        Resource {
            id: 1,
            author_id,
            is_published: false,
            is_featured: false,
            is_active: true,
        }
    }

    struct Note {
        owner: Option<i64>,
    }

    impl Owned for Note {
        fn owner_id(&self) -> Option<i64> {
            self.owner
        }
    }

    #[test]
    fn test_role_predicates_match_exactly_one_role() {
        for role in Role::ALL {
            let u = user(1, role);
            assert_eq!(is_admin(Some(&u)), role == Role::Admin);
            assert_eq!(is_author(Some(&u)), role == Role::Author);
            assert_eq!(is_user(Some(&u)), role == Role::User);
            assert_eq!(
                is_admin_or_author(Some(&u)),
                matches!(role, Role::Admin | Role::Author)
            );
        }
    }

    #[test]
    fn test_role_predicates_deny_absent_user() {
        assert!(!is_admin(None));
        assert!(!is_author(None));
        assert!(!is_admin_or_author(None));
    }

    #[test]
    fn test_absent_user_cannot_edit() {
        for author in [None, Some(1), Some(42)] {
            assert!(!can_edit_or_delete_resource(None, &resource(author)));
        }
    }

    #[test]
    fn test_admin_can_edit_any_resource() {
        let admin = user(1, Role::Admin);
        for author in [None, Some(1), Some(99)] {
            assert!(can_edit_or_delete_resource(Some(&admin), &resource(author)));
        }
    }

    #[test]
    fn test_author_can_edit_only_own_resource() {
        let author = user(7, Role::Author);
        assert!(can_edit_or_delete_resource(Some(&author), &resource(Some(7))));
        assert!(!can_edit_or_delete_resource(Some(&author), &resource(Some(8))));
        assert!(!can_edit_or_delete_resource(Some(&author), &resource(None)));
    }

    #[test]
    fn test_plain_user_cannot_edit_even_own_resource() {
        let reader = user(7, Role::User);
        assert!(!can_edit_or_delete_resource(Some(&reader), &resource(Some(7))));
        let guest = user(7, Role::Guest);
        assert!(!can_edit_or_delete_resource(Some(&guest), &resource(Some(7))));
    }

    #[test]
    fn test_toggle_publish_matches_edit_policy() {
        let users = [
            None,
            Some(user(1, Role::Admin)),
            Some(user(2, Role::Author)),
            Some(user(3, Role::User)),
            Some(user(4, Role::Guest)),
        ];
        let resources = [resource(None), resource(Some(2)), resource(Some(3))];
        for u in &users {
            for r in &resources {
                assert_eq!(
                    can_toggle_publish(u.as_ref(), r),
                    can_edit_or_delete_resource(u.as_ref(), r)
                );
            }
        }
    }

    #[test]
    fn test_owned_objects_follow_owner_for_any_role() {
        let reader = user(5, Role::User);
        assert!(can_edit_or_delete_owned(Some(&reader), &Note { owner: Some(5) }));
        assert!(!can_edit_or_delete_owned(Some(&reader), &Note { owner: Some(6) }));
        assert!(!can_edit_or_delete_owned(Some(&reader), &Note { owner: None }));
        assert!(!can_edit_or_delete_owned(None, &Note { owner: Some(5) }));

        let admin = user(1, Role::Admin);
        assert!(can_edit_or_delete_owned(Some(&admin), &Note { owner: Some(5) }));
    }

    #[test]
    fn test_other_authors_post_renders_controls_disabled() {
        let author = user(2, Role::Author);
        let controls = PostControls::for_user(Some(&author), &resource(Some(3)));
        assert_eq!(controls, PostControls::default());
        assert!(!controls.any());
    }

    #[test]
    fn test_own_post_enables_every_control() {
        let author = user(2, Role::Author);
        let controls = PostControls::for_user(Some(&author), &resource(Some(2)));
        assert!(controls.edit && controls.delete && controls.toggle_publish);
        assert!(controls.toggle_featured && controls.toggle_active);
    }
}
