//! Book identity resolution from picked scene objects.
//!
//! A book is a group holding two meshes: the inner pages and the outer cover.
//! Picks land on the cover; the group's rank among all book groups of the
//! shelf model gives the book its position on the shelf.

use shared::BookIdentity;

use crate::scene::{NodeId, NodeKind, PartRole, SceneGraph};
use crate::state::settings::SceneSettings;

/// Scene nodes making up one book
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookParts {
    pub group: NodeId,
    pub inner: NodeId,
    pub outer: NodeId,
}

/// A pick that resolved to a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBook {
    pub identity: BookIdentity,
    pub parts: BookParts,
}

/// Resolves picks on one shelf model.
///
/// The ordered list of book groups is computed once at construction; the
/// model must not be restructured afterwards (transforms may change).
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    rules: SceneSettings,
    book_groups: Vec<NodeId>,
}

impl IdentityResolver {
    pub fn new(graph: &SceneGraph, root: NodeId, rules: SceneSettings) -> Self {
        let book_groups = graph
            .traverse(root)
            .into_iter()
            .filter(|id| {
                graph.node(*id).is_some_and(|n| {
                    n.kind == NodeKind::Group
                        && n.name.starts_with(&rules.book_group_prefix)
                        && n.name != rules.shelf_frame_group
                })
            })
            .collect();
        Self { rules, book_groups }
    }

    /// Book groups in scene-graph order
    pub fn book_groups(&self) -> &[NodeId] {
        &self.book_groups
    }

    /// Rank of `group` among the book groups
    pub fn position_of(&self, group: NodeId) -> Option<usize> {
        self.book_groups.iter().position(|g| *g == group)
    }

    /// Whether `node` is the outer half of a book.
    ///
    /// An explicit role tag wins; untagged nodes fall back to the name suffix.
    pub fn is_outer(&self, graph: &SceneGraph, node: NodeId) -> bool {
        match graph.node(node) {
            Some(n) => match n.role {
                Some(role) => role == PartRole::Outer,
                None => n.name.ends_with(&self.rules.outer_suffix),
            },
            None => false,
        }
    }

    /// Inner sibling of an outer part, looked up under the same parent
    fn inner_of(&self, graph: &SceneGraph, parent: NodeId, outer: NodeId) -> Option<NodeId> {
        let outer_node = graph.node(outer)?;
        if outer_node.role.is_some() {
            return graph
                .node(parent)?
                .children
                .iter()
                .copied()
                .find(|c| graph.node(*c).and_then(|n| n.role) == Some(PartRole::Inner));
        }
        let inner_name = outer_node.name.strip_suffix(&self.rules.outer_suffix)?;
        graph.find_child(parent, inner_name)
    }

    /// Derive the identity of the book whose cover was picked.
    ///
    /// `None` when the node is not a cover, its inner sibling is missing, or
    /// its parent is not a book group.
    pub fn resolve(
        &self,
        graph: &SceneGraph,
        picked: NodeId,
        room_slug: &str,
        shelf_index: usize,
    ) -> Option<ResolvedBook> {
        if !self.is_outer(graph, picked) {
            return None;
        }
        let group = graph.parent(picked)?;
        let outer_name = graph.name(picked)?;
        let Some(outer) = graph.find_child(group, outer_name) else {
            tracing::warn!("Cover `{outer_name}` not found under its parent");
            return None;
        };
        let Some(inner) = self.inner_of(graph, group, outer) else {
            tracing::warn!("Cover `{outer_name}` has no inner sibling");
            return None;
        };
        let position = self.position_of(group)?;
        let group_name = graph.name(group)?;

        let identity = BookIdentity::new(
            group_name,
            identity_room_slug(room_slug),
            shelf_index,
            position,
        );
        Some(ResolvedBook {
            identity,
            parts: BookParts {
                group,
                inner,
                outer,
            },
        })
    }

    /// Find the parts of a book from its identity (deep links).
    ///
    /// The group at the identity's position must carry the identity's group name.
    pub fn locate(&self, graph: &SceneGraph, identity: &BookIdentity) -> Option<BookParts> {
        let group = *self.book_groups.get(identity.position_in_shelf)?;
        if graph.name(group)? != identity.group_name {
            return None;
        }
        let outer = graph
            .node(group)?
            .children
            .iter()
            .copied()
            .find(|c| self.is_outer(graph, *c))?;
        let inner = self.inner_of(graph, group, outer)?;
        Some(BookParts {
            group,
            inner,
            outer,
        })
    }
}

/// Room slug as embedded in identities: whitespace removed
pub fn identity_room_slug(room_slug: &str) -> String {
    room_slug.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn resolver(graph: &SceneGraph) -> IdentityResolver {
        IdentityResolver::new(graph, graph.root(), SceneSettings::default())
    }

    #[test]
    fn test_shelf_frame_excluded() {
        let g = fixtures::shelf_model(3);
        let r = resolver(&g);
        assert_eq!(r.book_groups().len(), 3);
        for id in r.book_groups() {
            assert_ne!(g.name(*id), Some("group1295511530"));
        }
    }

    #[test]
    fn test_resolve_cover_pick() {
        let g = fixtures::shelf_model(10);
        let r = resolver(&g);
        let cover = g.get_object_by_name(g.root(), &fixtures::cover_name(7)).unwrap();
        let book = r.resolve(&g, cover, "web-dev", 2).unwrap();
        assert_eq!(book.identity.to_string(), "group42-web-dev-2-7");
        assert_eq!(book.parts.outer, cover);
        assert_eq!(g.name(book.parts.inner), Some(fixtures::pages_name(7).as_str()));
    }

    #[test]
    fn test_resolve_is_stable() {
        let g = fixtures::shelf_model(10);
        let cover = g.get_object_by_name(g.root(), &fixtures::cover_name(4)).unwrap();
        let a = resolver(&g).resolve(&g, cover, "library", 0).unwrap();
        let b = resolver(&g).resolve(&g, cover, "library", 0).unwrap();
        assert_eq!(a.identity.to_string(), b.identity.to_string());
    }

    #[test]
    fn test_inner_pick_ignored() {
        let g = fixtures::shelf_model(3);
        let r = resolver(&g);
        let pages = g.get_object_by_name(g.root(), &fixtures::pages_name(1)).unwrap();
        assert!(r.resolve(&g, pages, "library", 0).is_none());
    }

    #[test]
    fn test_missing_inner_sibling_is_noop() {
        let mut g = SceneGraph::new("Scene");
        let root = g.root();
        let group = g.add_group(root, "group9");
        let cover = g.add_mesh(group, "mesh9_1", None);
        let r = resolver(&g);
        assert!(r.resolve(&g, cover, "library", 0).is_none());
    }

    #[test]
    fn test_room_slug_whitespace_removed() {
        let g = fixtures::shelf_model(2);
        let r = resolver(&g);
        let cover = g.get_object_by_name(g.root(), &fixtures::cover_name(1)).unwrap();
        let book = r.resolve(&g, cover, "web dev", 0).unwrap();
        assert_eq!(book.identity.room_slug, "webdev");
    }

    #[test]
    fn test_tagged_roles_win_over_suffix() {
        let mut g = SceneGraph::new("Scene");
        let root = g.root();
        let group = g.add_group(root, "group5");
        let pages = g.add_mesh(group, "pages", None);
        let cover = g.add_mesh(group, "cover", None);
        g.set_role(pages, PartRole::Inner);
        g.set_role(cover, PartRole::Outer);
        let r = resolver(&g);
        let book = r.resolve(&g, cover, "library", 1).unwrap();
        assert_eq!(book.parts.inner, pages);
        assert_eq!(book.identity.to_string(), "group5-library-1-0");
        assert!(r.resolve(&g, pages, "library", 1).is_none());
    }

    #[test]
    fn test_locate_round_trip() {
        let g = fixtures::shelf_model(10);
        let r = resolver(&g);
        let cover = g.get_object_by_name(g.root(), &fixtures::cover_name(7)).unwrap();
        let book = r.resolve(&g, cover, "web-dev", 2).unwrap();
        assert_eq!(r.locate(&g, &book.identity), Some(book.parts));
    }

    #[test]
    fn test_locate_rejects_mismatched_group() {
        let g = fixtures::shelf_model(10);
        let r = resolver(&g);
        let stale = BookIdentity::new("group99", "web-dev", 2, 7);
        assert!(r.locate(&g, &stale).is_none());
        let out_of_range = BookIdentity::new("group42", "web-dev", 2, 70);
        assert!(r.locate(&g, &out_of_range).is_none());
    }
}
