//! Static role→permission table and resource scoping.
//!
//! There is no state here: both predicates work on the identity embedded in
//! an already verified access token.

use lectern_core::permissions::*;
use lectern_models::{OrganizationId, Role, UserId};

use crate::claims::TokenPayload;

const ADMIN_PERMISSIONS: &[&str] = &[
    USERS_CREATE,
    USERS_READ,
    USERS_UPDATE,
    USERS_DELETE,
    COURSES_CREATE,
    COURSES_READ,
    COURSES_UPDATE,
    COURSES_DELETE,
    GRADES_CREATE,
    GRADES_READ,
    GRADES_UPDATE,
    GRADES_DELETE,
    MESSAGES_SEND,
    MESSAGES_READ,
    FILES_CREATE,
    FILES_READ,
    FILES_DELETE,
    REPORTS_VIEW,
    SETTINGS_READ,
    SETTINGS_UPDATE,
    SESSIONS_REVOKE,
];

const TEACHER_PERMISSIONS: &[&str] = &[
    COURSES_READ,
    COURSES_UPDATE,
    GRADES_CREATE,
    GRADES_READ,
    GRADES_UPDATE,
    GRADES_DELETE,
    MESSAGES_SEND,
    MESSAGES_READ,
    FILES_CREATE,
    FILES_READ,
    USERS_READ,
];

const STUDENT_PERMISSIONS: &[&str] = &[
    COURSES_READ,
    GRADES_READ,
    MESSAGES_SEND,
    MESSAGES_READ,
    FILES_READ,
];

const PARENT_PERMISSIONS: &[&str] = &[GRADES_READ, MESSAGES_SEND, MESSAGES_READ];

/// Permissions granted to `role`. The system administrator holds only the
/// wildcard.
pub fn permissions_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::SystemAdmin => &[ALL],
        Role::Admin => ADMIN_PERMISSIONS,
        Role::Teacher => TEACHER_PERMISSIONS,
        Role::Student => STUDENT_PERMISSIONS,
        Role::Parent => PARENT_PERMISSIONS,
    }
}

pub fn has_permission(user: &TokenPayload, permission: &str) -> bool {
    permissions_for(user.role)
        .iter()
        .any(|granted| *granted == ALL || *granted == permission)
}

/// Ownership and organization scope of a resource being accessed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceScope {
    pub organization_id: Option<OrganizationId>,
    pub owner_id: Option<UserId>,
}

impl ResourceScope {
    pub fn in_organization(organization_id: OrganizationId) -> Self {
        Self {
            organization_id: Some(organization_id),
            owner_id: None,
        }
    }

    pub fn owned_by(mut self, owner_id: UserId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }
}

/// Whether `user` may touch a resource with the given scope.
///
/// Allowed when the resource is unscoped, scoped to the user's organization
/// (which covers administrators acting inside their own organization), or
/// owned by the user. Wildcard holders are not bound to any organization.
pub fn can_access_resource(user: &TokenPayload, resource: &ResourceScope) -> bool {
    if has_permission(user, ALL) {
        return true;
    }

    if resource.owner_id == Some(user.user_id) {
        return true;
    }

    match resource.organization_id {
        None => true,
        Some(org) => user.organization_id == Some(org),
    }
}
