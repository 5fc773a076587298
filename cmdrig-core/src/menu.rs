use schema::ConnectorRegistry;

#[derive(Debug, Clone, PartialEq)]
pub struct MenuSection {
    pub connector: String,
    pub subs: Vec<String>,
}

/// Filters the connector list for the menu. A connector is shown when its
/// name case-insensitively contains the query, or at least one of its sub
/// keys does. A name match lists all subs; a match only through subs lists
/// just the matching ones.
pub fn build_menu(registry: &ConnectorRegistry, query: &str) -> Vec<MenuSection> {
    let needle = query.to_lowercase();
    let mut sections = Vec::new();
    for (name, connector) in registry.iter() {
        let name_match = name.to_lowercase().contains(&needle);
        let matching: Vec<String> = connector
            .subs
            .iter()
            .filter(|sub| sub.key.to_lowercase().contains(&needle))
            .map(|sub| sub.key.clone())
            .collect();
        if !name_match && matching.is_empty() {
            continue;
        }
        let subs = if name_match {
            connector.subs.iter().map(|sub| sub.key.clone()).collect()
        } else {
            matching
        };
        sections.push(MenuSection {
            connector: name.clone(),
            subs,
        });
    }
    sections
}
