//! Node lookup by name and ID.
//!
//! All lookups are linear scans in sequence order and return the first match.
//! A miss is `None`.

use crate::node::{Node, NodeId};

use super::Skeleton;

/// How node names are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameMatch {
    /// Exact comparison.
    #[default]
    CaseSensitive,
    /// Unicode lowercase comparison. With names differing only by case, the
    /// earliest node wins.
    IgnoreCase,
}

impl NameMatch {
    /// Compare two names under this mode.
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            Self::CaseSensitive => a == b,
            Self::IgnoreCase => a
                .chars()
                .flat_map(char::to_lowercase)
                .eq(b.chars().flat_map(char::to_lowercase)),
        }
    }
}

impl Skeleton {
    /// First node whose name matches.
    pub fn find_node_by_name(&self, name: &str, mode: NameMatch) -> Option<&Node> {
        self.nodes()
            .find(|(_, node)| mode.matches(node.name(), name))
            .map(|(_, node)| node)
    }

    /// Position of the first node whose name matches.
    pub fn find_node_index_by_name(&self, name: &str, mode: NameMatch) -> Option<usize> {
        self.nodes()
            .find(|(_, node)| mode.matches(node.name(), name))
            .map(|(index, _)| index)
    }

    /// First node with the given ID.
    pub fn find_node_by_id(&self, id: NodeId) -> Option<&Node> {
        self.nodes()
            .find(|(_, node)| node.id() == id)
            .map(|(_, node)| node)
    }

    /// Position of the first node with the given ID.
    pub fn find_node_index_by_id(&self, id: NodeId) -> Option<usize> {
        self.nodes()
            .find(|(_, node)| node.id() == id)
            .map(|(index, _)| index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(names: &[&str]) -> Skeleton {
        let mut skeleton = Skeleton::new();
        for name in names {
            skeleton.add_node(Node::new(*name));
        }
        skeleton.rebuild_root_nodes();
        skeleton
    }

    #[test]
    fn case_sensitive() {
        let skeleton = named(&["Hips", "Spine", "spine"]);
        assert_eq!(
            skeleton.find_node_index_by_name("spine", NameMatch::CaseSensitive),
            Some(2)
        );
        assert!(
            skeleton
                .find_node_by_name("SPINE", NameMatch::CaseSensitive)
                .is_none()
        );
    }

    #[test]
    fn ignore_case_earliest_wins() {
        let skeleton = named(&["Blah", "BLAH"]);
        let found = skeleton
            .find_node_by_name("blah", NameMatch::IgnoreCase)
            .unwrap();
        assert_eq!(found.name(), "Blah");
        assert_eq!(found.index(), 0);
    }

    #[test]
    fn ignore_case_non_ascii() {
        let skeleton = named(&["Épaule"]);
        assert_eq!(
            skeleton.find_node_index_by_name("ÉPAULE", NameMatch::IgnoreCase),
            Some(0)
        );
        assert!(!NameMatch::IgnoreCase.matches("arm", "arms"));
    }

    #[test]
    fn by_id() {
        let skeleton = named(&["a", "b", "c"]);
        let id = NodeId::from_name("b");
        assert_eq!(skeleton.find_node_by_id(id).map(Node::name), Some("b"));
        assert_eq!(skeleton.find_node_index_by_id(id), Some(1));
    }

    #[test]
    fn missing_is_none() {
        let skeleton = named(&["a"]);
        assert!(
            skeleton
                .find_node_by_name("nope", NameMatch::IgnoreCase)
                .is_none()
        );
        assert!(skeleton.find_node_by_id(NodeId(12345)).is_none());
        assert!(Skeleton::new().find_node_index_by_id(NodeId(0)).is_none());
    }

    #[test]
    fn skips_empty_slots() {
        let mut skeleton = named(&["a"]);
        let _ = skeleton.resize(3);
        skeleton.set_node(2, Node::new("c")).unwrap();
        assert_eq!(
            skeleton.find_node_index_by_name("c", NameMatch::CaseSensitive),
            Some(2)
        );
    }
}
