use std::collections::HashSet;

use crate::{
    error::{PortalError, PortalResult},
    models::{NavGroup, NavigationEntry, Role},
};

const ALL_ROLES: &[Role] = &Role::ALL;
const OFFICE: &[Role] = &[Role::Admin, Role::ConstructionManager];

/// The road-construction menu, grouped and ordered as it is displayed.
///
/// Each row is `(key, label, route, group, allowed roles)`.
const STANDARD_MENU: &[(&str, &str, &str, NavGroup, &[Role])] = &[
    ("dashboard", "Dashboard", "/dashboard", NavGroup::Main, OFFICE),
    (
        "projects",
        "Projects",
        "/projects",
        NavGroup::Main,
        &[Role::Admin, Role::ConstructionManager, Role::Engineer, Role::Client],
    ),
    ("tasks", "Tasks", "/tasks", NavGroup::Main, ALL_ROLES),
    (
        "transport",
        "Transport",
        "/transport",
        NavGroup::Logistics,
        &[Role::Admin, Role::ConstructionManager, Role::Driver],
    ),
    (
        "fleet",
        "Fleet",
        "/fleet",
        NavGroup::Logistics,
        &[Role::Admin, Role::ConstructionManager, Role::Driver],
    ),
    (
        "materials",
        "Materials",
        "/materials",
        NavGroup::Logistics,
        &[Role::Admin, Role::ConstructionManager, Role::Engineer],
    ),
    (
        "engineering",
        "Engineering",
        "/engineering",
        NavGroup::Engineering,
        &[Role::Admin, Role::ConstructionManager, Role::Engineer],
    ),
    (
        "inspections",
        "Inspections",
        "/inspections",
        NavGroup::Engineering,
        &[Role::Admin, Role::Engineer],
    ),
    (
        "surveys",
        "Surveys",
        "/surveys",
        NavGroup::Engineering,
        &[Role::Admin, Role::Engineer],
    ),
    ("workforce", "Workforce", "/workforce", NavGroup::Management, OFFICE),
    (
        "reports",
        "Reports",
        "/reports",
        NavGroup::Management,
        &[Role::Admin, Role::ConstructionManager, Role::Client],
    ),
    ("users", "Users", "/users", NavGroup::Management, &[Role::Admin]),
    ("map", "Site Map", "/map", NavGroup::Tools, ALL_ROLES),
    (
        "documents",
        "Documents",
        "/documents",
        NavGroup::Tools,
        &[Role::Admin, Role::ConstructionManager, Role::Engineer, Role::Client],
    ),
    ("messages", "Messages", "/messages", NavGroup::Tools, ALL_ROLES),
    ("profile", "Profile", "/profile", NavGroup::Settings, ALL_ROLES),
    ("settings", "Settings", "/settings", NavGroup::Settings, ALL_ROLES),
];

/// NavigationModel
///
/// The validated, immutable menu table. Both the navigation renderer and the route
/// guards read from it, so they cannot disagree about who may open a route.
///
/// Entries are kept sorted by group display order; within a group the declaration
/// order is preserved.
#[derive(Debug, Clone)]
pub struct NavigationModel {
    entries: Vec<NavigationEntry>,
}

impl NavigationModel {
    /// Validates and orders a menu table.
    ///
    /// # Errors
    /// Rejects duplicate keys, duplicate routes and entries that allow no role.
    pub fn new(entries: Vec<NavigationEntry>) -> PortalResult<Self> {
        let mut keys = HashSet::new();
        let mut routes = HashSet::new();

        for entry in &entries {
            if entry.allowed_roles.is_empty() {
                return Err(PortalError::EmptyAllowedRoles(entry.key.clone()));
            }
            if !keys.insert(entry.key.as_str()) {
                return Err(PortalError::DuplicateNavigationKey(entry.key.clone()));
            }
            if !routes.insert(entry.route.as_str()) {
                return Err(PortalError::DuplicateRoute(entry.route.clone()));
            }
        }

        let mut entries = entries;
        // sort_by_key is stable, so declaration order survives inside a group.
        entries.sort_by_key(|entry| entry.group);

        Ok(Self { entries })
    }

    /// The portal's built-in menu.
    pub fn standard() -> PortalResult<Self> {
        Self::new(
            STANDARD_MENU
                .iter()
                .map(|(key, label, route, group, roles)| {
                    NavigationEntry::new(key, label, route, *group, roles)
                })
                .collect(),
        )
    }

    pub fn entries(&self) -> &[NavigationEntry] {
        &self.entries
    }

    pub fn entry(&self, key: &str) -> Option<&NavigationEntry> {
        self.entries.iter().find(|entry| entry.key == key)
    }

    pub fn entry_for_route(&self, route: &str) -> Option<&NavigationEntry> {
        self.entries.iter().find(|entry| entry.route == route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_menu_is_valid() {
        let model = NavigationModel::standard().unwrap();
        assert_eq!(model.entries().len(), STANDARD_MENU.len());
    }

    #[test]
    fn entries_are_sorted_by_group() {
        let model = NavigationModel::standard().unwrap();
        let groups: Vec<NavGroup> = model.entries().iter().map(|e| e.group).collect();
        let mut sorted = groups.clone();
        sorted.sort();
        assert_eq!(groups, sorted);
    }
}
