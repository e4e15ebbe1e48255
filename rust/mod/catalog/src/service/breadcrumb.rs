//! Breadcrumb chain resolution for the algorithms page.
//!
//! Given a flat snapshot of category nodes, pick a random leaf and walk
//! parent pointers back to a root, rendering the labels root-to-leaf.

use std::collections::{HashMap, HashSet};

use catalog_client::Session;
use catalog_core::CatalogError;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::api::CatalogApi;
use crate::model::BreadcrumbNode;
use crate::service::auth::{self, ALGORITHMS_ALLOWED_ROLES};

/// Separator between labels in a rendered chain.
pub const SEPARATOR: &str = " → ";

/// Nodes not referenced as any node's parent, in input order.
pub fn leaves(nodes: &[BreadcrumbNode]) -> Vec<&BreadcrumbNode> {
    let parents: HashSet<u64> = nodes.iter().filter_map(|n| n.parent).collect();
    nodes.iter().filter(|n| !parents.contains(&n.id)).collect()
}

/// Labels from the root down to `start`.
///
/// The walk stops at a null parent or at a parent id missing from the
/// snapshot. It takes at most `nodes.len()` hops, so a cycle above the
/// start node cannot loop forever.
pub fn path_to_root(nodes: &[BreadcrumbNode], start: u64) -> Vec<&str> {
    let index: HashMap<u64, &BreadcrumbNode> = nodes.iter().map(|n| (n.id, n)).collect();

    let mut path = Vec::new();
    let mut current = Some(start);
    while let Some(id) = current {
        let Some(node) = index.get(&id) else { break };
        if path.len() == nodes.len() {
            break;
        }
        path.push(node.label.as_str());
        current = node.parent;
    }
    path.reverse();
    path
}

/// Pick a leaf uniformly with `rng` and render its chain.
pub fn resolve<R: Rng + ?Sized>(nodes: &[BreadcrumbNode], rng: &mut R) -> Result<String, CatalogError> {
    let candidates = leaves(nodes);
    let leaf = candidates
        .choose(rng)
        .ok_or_else(|| CatalogError::EmptyResult("no final breadcrumbs found".into()))?;
    debug!(leaf = leaf.id, candidates = candidates.len(), "resolving breadcrumb chain");
    Ok(path_to_root(nodes, leaf.id).join(SEPARATOR))
}

/// The algorithms page action: check access, fetch the tree, resolve.
pub async fn fetch_chain<R: Rng + ?Sized>(
    api: &dyn CatalogApi,
    session: &Session,
    rng: &mut R,
) -> Result<String, CatalogError> {
    auth::authorize(api, session, ALGORITHMS_ALLOWED_ROLES).await?;
    let nodes = match api.breadcrumbs(session).await {
        Ok(nodes) => nodes,
        Err(e) => {
            let err = e.into_load_error();
            if err.is_auth_expired() {
                session.teardown();
            }
            return Err(err);
        }
    };
    resolve(&nodes, rng)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::testing::{admin, plain_user, FakeCatalog, TOKEN};

    fn node(id: u64, parent: Option<u64>, label: &str) -> BreadcrumbNode {
        BreadcrumbNode::new(id, parent, label)
    }

    fn forest() -> Vec<BreadcrumbNode> {
        vec![
            node(1, None, "Home"),
            node(2, Some(1), "Lighting"),
            node(3, Some(2), "Lamps"),
            node(4, Some(2), "Bulbs"),
            node(5, None, "Garden"),
            node(6, Some(5), "Tools"),
        ]
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn single_node_is_its_own_chain() {
        assert_eq!(resolve(&[node(1, None, "A")], &mut rng()).unwrap(), "A");
    }

    #[test]
    fn three_level_chain() {
        let nodes = vec![node(1, None, "A"), node(2, Some(1), "B"), node(3, Some(2), "C")];
        assert_eq!(resolve(&nodes, &mut rng()).unwrap(), "A → B → C");
    }

    #[test]
    fn empty_input_has_no_leaf() {
        let err = resolve(&[], &mut rng()).unwrap_err();
        assert!(matches!(err, CatalogError::EmptyResult(_)));
    }

    #[test]
    fn pure_cycle_has_no_leaf() {
        let nodes = vec![node(1, Some(2), "A"), node(2, Some(1), "B")];
        assert!(matches!(
            resolve(&nodes, &mut rng()),
            Err(CatalogError::EmptyResult(_))
        ));
    }

    #[test]
    fn dangling_parent_stops_the_walk() {
        let nodes = vec![node(5, Some(99), "Orphan"), node(6, Some(5), "Child")];
        assert_eq!(resolve(&nodes, &mut rng()).unwrap(), "Orphan → Child");
    }

    #[test]
    fn cycle_above_a_leaf_terminates() {
        let nodes = vec![node(1, Some(2), "A"), node(2, Some(1), "B"), node(3, Some(1), "C")];
        let path = path_to_root(&nodes, 3);
        assert_eq!(path.len(), nodes.len());
        assert_eq!(path.last(), Some(&"C"));
    }

    #[test]
    fn leaves_of_a_forest() {
        let ids: Vec<u64> = leaves(&forest()).iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![3, 4, 6]);
    }

    #[test]
    fn every_resolution_is_a_root_to_leaf_path() {
        let nodes = forest();
        let valid = [
            "Home → Lighting → Lamps",
            "Home → Lighting → Bulbs",
            "Garden → Tools",
        ];
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            let chain = resolve(&nodes, &mut rng).unwrap();
            assert!(valid.contains(&chain.as_str()), "unexpected chain {chain}");

            let segments: Vec<&str> = chain.split(SEPARATOR).collect();
            let first = nodes.iter().find(|n| n.label == segments[0]).unwrap();
            assert!(first.is_root());
            seen.insert(chain);
        }
        assert_eq!(seen.len(), valid.len());
    }

    #[test]
    fn same_seed_same_choice() {
        let nodes = forest();
        let a = resolve(&nodes, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = resolve(&nodes, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn fetch_chain_for_admin() {
        let api = FakeCatalog::new(admin());
        api.set_breadcrumbs(vec![node(1, None, "A"), node(2, Some(1), "B")]);
        let session = Session::with_token(TOKEN);
        assert_eq!(fetch_chain(&api, &session, &mut rng()).await.unwrap(), "A → B");
    }

    #[tokio::test]
    async fn fetch_chain_forbidden_for_plain_user() {
        let api = FakeCatalog::new(plain_user());
        let session = Session::with_token(TOKEN);
        let err = fetch_chain(&api, &session, &mut rng()).await.unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden(_)));
    }

    #[tokio::test]
    async fn fetch_chain_empty_tree() {
        let api = FakeCatalog::new(admin());
        let session = Session::with_token(TOKEN);
        let err = fetch_chain(&api, &session, &mut rng()).await.unwrap_err();
        assert!(matches!(err, CatalogError::EmptyResult(_)));
    }
}
