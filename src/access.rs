use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    error::{PortalError, PortalResult},
    models::{Decision, NavigationEntry, NavigationSection, Role, RouteGuard, Session},
    navigation::NavigationModel,
};

/// Public entry page for unauthenticated visitors.
pub const LOGIN_ROUTE: &str = "/login";

/// Guarded routes that have no menu entry. Empty role lists admit any authenticated session.
const UNLISTED_ROUTES: &[(&str, &[Role])] = &[("/notifications", &[])];

/// default_route_for
///
/// The canonical landing route of each role. Total over the closed role set.
pub fn default_route_for(role: Role) -> &'static str {
    match role {
        Role::Admin | Role::ConstructionManager => "/dashboard",
        Role::Engineer => "/engineering",
        Role::Driver => "/transport",
        Role::Client => "/projects",
    }
}

/// authorize
///
/// Decides whether `session` may open the route protected by `guard`.
///
/// - No session, or a session that is not authenticated: redirect to the login page.
/// - Guard with no required roles, or a role inside the required set: allow.
/// - Otherwise: redirect to the role's own landing route. Callers never learn
///   anything about the route they were denied.
pub fn authorize(session: Option<&Session>, guard: &RouteGuard) -> Decision {
    match session.filter(|session| session.authenticated) {
        Some(session) if guard.permits(session.role) => Decision::Allow,
        _ => Decision::redirect(redirect_target(session)),
    }
}

/// redirect_target
///
/// Where a caller is sent when it may not open a route: the login page without an
/// authenticated session, the role's landing route otherwise. Unknown routes send
/// callers to the same place, so a denial never tells whether the route exists.
pub fn redirect_target(session: Option<&Session>) -> &'static str {
    match session.filter(|session| session.authenticated) {
        Some(session) => default_route_for(session.role),
        None => LOGIN_ROUTE,
    }
}

/// AccessController
///
/// Owns the navigation model and the route guards derived from it. All queries are
/// pure reads; the controller never changes after construction and is shared
/// across requests as `AccessState`.
#[derive(Debug, Clone)]
pub struct AccessController {
    model: NavigationModel,
    guards: Vec<RouteGuard>,
    index: HashMap<String, usize>,
}

impl AccessController {
    /// Derives the guard table from `model` and checks it.
    ///
    /// A menu entry open to every role gets an empty guard; any other entry is guarded
    /// by exactly its `allowed_roles`.
    ///
    /// # Errors
    /// Fails if a guarded route collides with another route or with the login page,
    /// or if some role could not open its own landing route.
    pub fn new(model: NavigationModel) -> PortalResult<Self> {
        let menu_guards = model.entries().iter().map(|entry| {
            if entry.is_open_to_all() {
                RouteGuard::any_authenticated(&entry.route)
            } else {
                RouteGuard {
                    route: entry.route.clone(),
                    required_roles: entry.allowed_roles.clone(),
                }
            }
        });
        let unlisted_guards = UNLISTED_ROUTES
            .iter()
            .map(|(route, roles)| RouteGuard::restricted(route, roles));

        let mut guards = Vec::new();
        let mut index = HashMap::new();
        for guard in menu_guards.chain(unlisted_guards) {
            if guard.route == LOGIN_ROUTE || index.contains_key(&guard.route) {
                return Err(PortalError::DuplicateRoute(guard.route));
            }
            index.insert(guard.route.clone(), guards.len());
            guards.push(guard);
        }

        let controller = Self {
            model,
            guards,
            index,
        };

        // A landing route a role cannot open would bounce that role forever.
        for role in Role::ALL {
            let route = default_route_for(role);
            let reachable = controller
                .guard_for(route)
                .is_some_and(|guard| guard.permits(role));
            if !reachable {
                return Err(PortalError::UnreachableLandingRoute {
                    role,
                    route: route.to_string(),
                });
            }
        }

        Ok(controller)
    }

    /// The controller over the portal's built-in menu.
    pub fn standard() -> PortalResult<Self> {
        Self::new(NavigationModel::standard()?)
    }

    pub fn model(&self) -> &NavigationModel {
        &self.model
    }

    pub fn guards(&self) -> &[RouteGuard] {
        &self.guards
    }

    pub fn guard_for(&self, route: &str) -> Option<&RouteGuard> {
        self.index.get(route).map(|position| &self.guards[*position])
    }

    pub fn authorize(&self, session: Option<&Session>, guard: &RouteGuard) -> Decision {
        authorize(session, guard)
    }

    /// Looks up the guard for `route` and authorizes against it.
    /// `None` means the route is not guarded by this controller.
    pub fn authorize_route(&self, session: Option<&Session>, route: &str) -> Option<Decision> {
        self.guard_for(route).map(|guard| authorize(session, guard))
    }

    /// decide
    ///
    /// The decision for any `route`, guarded or not. A route without a guard is
    /// answered like a forbidden one.
    pub fn decide(&self, session: Option<&Session>, route: &str) -> Decision {
        self.authorize_route(session, route)
            .unwrap_or_else(|| Decision::redirect(redirect_target(session)))
    }

    pub fn default_route_for(&self, role: Role) -> &'static str {
        default_route_for(role)
    }

    /// visible_navigation
    ///
    /// The menu entries `session` may see, in group display order and declaration
    /// order within a group. Empty for a missing or unauthenticated session.
    pub fn visible_navigation(&self, session: Option<&Session>) -> Vec<&NavigationEntry> {
        match session.filter(|session| session.authenticated) {
            None => Vec::new(),
            Some(session) => self
                .model
                .entries()
                .iter()
                .filter(|entry| entry.allows(session.role))
                .collect(),
        }
    }

    /// visible_sections
    ///
    /// `visible_navigation` grouped for rendering. Groups without a visible entry are omitted.
    pub fn visible_sections(&self, session: Option<&Session>) -> Vec<NavigationSection> {
        let mut sections: Vec<NavigationSection> = Vec::new();
        for entry in self.visible_navigation(session) {
            match sections.last_mut() {
                Some(section) if section.group == entry.group => {
                    section.entries.push(entry.clone());
                }
                _ => sections.push(NavigationSection {
                    group: entry.group,
                    title: entry.group.label().to_string(),
                    entries: vec![entry.clone()],
                }),
            }
        }
        sections
    }
}

/// AccessState
///
/// The shared, read-only handle placed in the application state.
pub type AccessState = Arc<AccessController>;
