use crate::content::{Role, User};

/// Permissions checked before privileged operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Site administration, required for bulk deletion
    ManageOptions,
    ModerateComments,
    UploadFiles,
    Read,
}

/// The party behind the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// 0 for anonymous visitors
    pub user_id: i64,
    pub display_name: String,
    pub role: Option<Role>,
    /// Raw session token; binds anti-forgery tokens to one login
    pub session: String,
}

impl Actor {
    pub fn anonymous() -> Self {
        Self {
            user_id: 0,
            display_name: String::new(),
            role: None,
            session: String::new(),
        }
    }

    pub fn from_user(user: &User, session: impl Into<String>) -> Self {
        Self {
            user_id: user.id,
            display_name: user.display_name.clone(),
            role: Some(user.role),
            session: session.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id != 0
    }

    /// Whether the actor holds `cap`
    pub fn can(&self, cap: Capability) -> bool {
        self.is_authenticated() && self.role.is_some_and(|role| role.has_cap(cap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_has_no_capabilities() {
        let actor = Actor::anonymous();
        assert!(!actor.is_authenticated());
        assert!(!actor.can(Capability::Read));
    }

    #[test]
    fn test_capabilities_follow_role() {
        let mut actor = Actor {
            user_id: 3,
            display_name: "Ed".to_string(),
            role: Some(Role::Editor),
            session: "s".to_string(),
        };
        assert!(actor.can(Capability::ModerateComments));
        assert!(!actor.can(Capability::ManageOptions));

        actor.role = Some(Role::Administrator);
        assert!(actor.can(Capability::ManageOptions));
    }
}
