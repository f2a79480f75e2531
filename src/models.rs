use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::PortalError;

// --- Principal Schemas ---

/// Role
///
/// The closed set of permission classes a signed-in principal can hold.
/// A session carries exactly one role; roles are never combined.
///
/// The wire form is snake_case (`construction_manager`). Anything outside the set
/// is rejected while parsing, so every `Role` value reaching the access controller is valid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Role {
    Admin,
    ConstructionManager,
    Engineer,
    Driver,
    Client,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::ConstructionManager,
        Role::Engineer,
        Role::Driver,
        Role::Client,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::ConstructionManager => "construction_manager",
            Role::Engineer => "engineer",
            Role::Driver => "driver",
            Role::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = PortalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| PortalError::InvalidRole(value.to_string()))
    }
}

/// Session
///
/// Who is currently using the portal. Created on sign-in, dropped on sign-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Session {
    pub role: Role,
    pub authenticated: bool,
}

impl Session {
    pub fn authenticated(role: Role) -> Self {
        Self {
            role,
            authenticated: true,
        }
    }

    /// Builds an authenticated session from an untrusted role string.
    /// This is the validation boundary for roles arriving from tokens, headers and forms.
    pub fn from_role_str(role: &str) -> Result<Self, PortalError> {
        Ok(Self::authenticated(role.parse()?))
    }
}

// --- Navigation Schemas ---

/// NavGroup
///
/// Menu clusters. Declaration order is the fixed display order, and the derived
/// `Ord` relies on it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NavGroup {
    Main,
    Logistics,
    Engineering,
    Management,
    Tools,
    Settings,
}

impl NavGroup {
    pub const ORDER: [NavGroup; 6] = [
        NavGroup::Main,
        NavGroup::Logistics,
        NavGroup::Engineering,
        NavGroup::Management,
        NavGroup::Tools,
        NavGroup::Settings,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NavGroup::Main => "Main",
            NavGroup::Logistics => "Logistics",
            NavGroup::Engineering => "Engineering",
            NavGroup::Management => "Management",
            NavGroup::Tools => "Tools",
            NavGroup::Settings => "Settings",
        }
    }
}

/// NavigationEntry
///
/// One menu item. The navigation model is an ordered list of these, and the
/// route guards are derived from the same list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationEntry {
    pub key: String,
    pub label: String,
    pub route: String,
    pub allowed_roles: BTreeSet<Role>,
    pub group: NavGroup,
}

impl NavigationEntry {
    pub fn new(key: &str, label: &str, route: &str, group: NavGroup, roles: &[Role]) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            route: route.to_string(),
            allowed_roles: roles.iter().copied().collect(),
            group,
        }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles.contains(&role)
    }

    /// True when every role in the closed set may see this entry.
    pub fn is_open_to_all(&self) -> bool {
        Role::ALL.iter().all(|role| self.allows(*role))
    }
}

/// NavigationSection
///
/// A rendered menu group: the group header plus its visible entries, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct NavigationSection {
    pub group: NavGroup,
    pub title: String,
    pub entries: Vec<NavigationEntry>,
}

// --- Authorization Schemas ---

/// RouteGuard
///
/// The role requirement attached to a protected route.
/// An empty `required_roles` set admits any authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RouteGuard {
    pub route: String,
    pub required_roles: BTreeSet<Role>,
}

impl RouteGuard {
    pub fn any_authenticated(route: &str) -> Self {
        Self {
            route: route.to_string(),
            required_roles: BTreeSet::new(),
        }
    }

    pub fn restricted(route: &str, roles: &[Role]) -> Self {
        Self {
            route: route.to_string(),
            required_roles: roles.iter().copied().collect(),
        }
    }

    pub fn permits(&self, role: Role) -> bool {
        self.required_roles.is_empty() || self.required_roles.contains(&role)
    }
}

/// Decision
///
/// Outcome of an access check. Serialized as
/// `{"decision":"allow"}` or `{"decision":"redirect","target":"/login"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(tag = "decision", rename_all = "snake_case")]
#[ts(export)]
pub enum Decision {
    Allow,
    Redirect { target: String },
}

impl Decision {
    pub fn redirect(target: &str) -> Self {
        Decision::Redirect {
            target: target.to_string(),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

// --- Request / Response Payloads ---

/// LoginRequest
///
/// Body of the local-only role picker (POST /login). Carries no credentials.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "engineer")]
    pub role: String,
}

/// LoginResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
    /// Where the front-end should navigate after sign-in.
    pub landing_route: String,
}

/// LandingView
///
/// The public entry page every unauthenticated visitor is sent to.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LandingView {
    pub route: String,
    pub roles: Vec<Role>,
}

/// ViewResponse
///
/// Payload of a guarded view. Only produced after the guard allowed the request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ViewResponse {
    pub route: String,
    /// Menu label of the view; `None` for guarded routes that are not in the menu.
    pub label: Option<String>,
    pub role: Role,
    pub navigation: Vec<NavigationSection>,
}
