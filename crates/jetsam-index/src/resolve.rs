//! Reply-chain root resolution.
//!
//! Threads are reconstructed by following each post's `reply_to` link to the
//! chain's terminal ancestor within the captured set. The walk is memoized
//! with path compression: after a chain is resolved once, every node on it
//! points directly at the root, so total work across a whole indexing run is
//! O(N) amortized rather than O(N * chain depth).
//!
//! Both maps are transient, scoped to one indexing run, and passed in
//! explicitly rather than held as ambient state.

use std::collections::HashMap;

use jetsam_core::Post;

/// Build the transient `uri -> reply_to` map for one indexing run.
pub fn build_parent_map(posts: &[Post]) -> HashMap<String, Option<String>> {
    posts
        .iter()
        .map(|p| (p.uri.clone(), p.reply_to.clone()))
        .collect()
}

/// Resolve the thread root for `uri`, memoizing every node on the walk.
///
/// The walk ends at the first of:
/// - a node already in `memo` (its memoized root is the answer),
/// - a node with no parent entry, or whose parent is unknown to the captured
///   set (that node is the root),
/// - a node already visited in this same walk (a reply cycle; the node at
///   which the cycle was detected is taken as the root — the canonical
///   tie-break among cycle members).
pub fn resolve_root(
    uri: &str,
    parents: &HashMap<String, Option<String>>,
    memo: &mut HashMap<String, String>,
) -> String {
    if let Some(root) = memo.get(uri) {
        return root.clone();
    }

    // Ordered so every node on the walk can be compressed afterwards.
    let mut visited: Vec<String> = Vec::new();
    let mut cur = uri.to_string();

    let root = loop {
        if let Some(root) = memo.get(&cur) {
            break root.clone();
        }
        if visited.contains(&cur) {
            // Cycle: break at the node where it was detected.
            break cur;
        }
        visited.push(cur.clone());

        match parents.get(&cur) {
            Some(Some(parent)) => cur = parent.clone(),
            // No reply link, or a parent outside the captured set.
            Some(None) | None => break cur,
        }
    };

    for node in visited {
        memo.insert(node, root.clone());
    }

    root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parents(entries: &[(&str, Option<&str>)]) -> HashMap<String, Option<String>> {
        entries
            .iter()
            .map(|(uri, parent)| (uri.to_string(), parent.map(str::to_string)))
            .collect()
    }

    #[test]
    fn chain_resolves_to_terminal_ancestor() {
        let parents = parents(&[
            ("d", Some("c")),
            ("c", Some("b")),
            ("b", Some("a")),
            ("a", None),
        ]);
        let mut memo = HashMap::new();

        assert_eq!(resolve_root("d", &parents, &mut memo), "a");

        // One walk compresses the whole chain.
        for uri in ["a", "b", "c", "d"] {
            assert_eq!(memo.get(uri).map(String::as_str), Some("a"));
        }
        assert_eq!(resolve_root("b", &parents, &mut memo), "a");
    }

    #[test]
    fn post_without_parent_is_its_own_root() {
        let parents = parents(&[("solo", None)]);
        let mut memo = HashMap::new();
        assert_eq!(resolve_root("solo", &parents, &mut memo), "solo");
    }

    #[test]
    fn unknown_uri_is_its_own_root() {
        let parents = HashMap::new();
        let mut memo = HashMap::new();
        assert_eq!(resolve_root("ghost", &parents, &mut memo), "ghost");
    }

    #[test]
    fn missing_parent_stops_the_walk() {
        // "b" replies to "missing", which was never captured.
        let parents = parents(&[("b", Some("missing"))]);
        let mut memo = HashMap::new();
        assert_eq!(resolve_root("b", &parents, &mut memo), "missing");
    }

    #[test]
    fn two_node_cycle_terminates_with_one_consistent_root() {
        let parents = parents(&[("a", Some("b")), ("b", Some("a"))]);
        let mut memo = HashMap::new();

        let root_a = resolve_root("a", &parents, &mut memo);
        let root_b = resolve_root("b", &parents, &mut memo);

        // Walk from "a" visits a, b, then re-reaches a: the cycle is
        // detected at "a", so both members resolve there.
        assert_eq!(root_a, "a");
        assert_eq!(root_b, "a");
    }

    #[test]
    fn self_reply_cycle_terminates() {
        let parents = parents(&[("loop", Some("loop"))]);
        let mut memo = HashMap::new();
        assert_eq!(resolve_root("loop", &parents, &mut memo), "loop");
    }

    #[test]
    fn memo_short_circuits_later_walks() {
        let parents = parents(&[("c", Some("b")), ("b", Some("a")), ("a", None)]);
        let mut memo = HashMap::new();
        resolve_root("c", &parents, &mut memo);

        // A fresh walk from a memoized node must not re-traverse: resolving
        // against an empty parent map would change the answer if it did.
        let empty = HashMap::new();
        assert_eq!(resolve_root("b", &empty, &mut memo), "a");
    }
}
