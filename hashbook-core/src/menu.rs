//! Navigation tree construction with deterministic ordering.
//!
//! Documents are folded into the tree one at a time. Folder nodes are
//! keyed by their literal path segment and only borrow a display title
//! from it, so `my-notes` and `my notes` stay distinct folders.

use crate::models::MenuItem;
use crate::slug::display_title;
use std::cmp::Ordering;

/// Insert a document into the navigation tree.
///
/// `segments` is the document path relative to the input root without the
/// extension (`["guide", "intro"]`). Non-terminal segments become folders;
/// the terminal segment becomes a leaf pointing at `slug`. Every level that
/// is touched is re-sorted with [`menu_order`].
pub fn insert(nodes: &mut Vec<MenuItem>, segments: &[String], slug: &str, title: &str, weight: i64) {
    let Some((segment, rest)) = segments.split_first() else {
        return;
    };
    let is_last = rest.is_empty();

    let existing = nodes
        .iter()
        .position(|node| node.key == *segment && node.is_folder == !is_last);

    let idx = match existing {
        Some(idx) => {
            if is_last {
                let leaf = &mut nodes[idx];
                leaf.slug = slug.to_string();
                leaf.title = title.to_string();
                leaf.weight = weight;
            }
            idx
        }
        None => {
            let node = if is_last {
                MenuItem::leaf(segment, slug, title, weight)
            } else {
                MenuItem::folder(segment, display_title(segment))
            };
            nodes.push(node);
            nodes.len() - 1
        }
    };

    if !is_last {
        insert(&mut nodes[idx].children, rest, slug, title, weight);
    }

    nodes.sort_by(menu_order);
}

/// Ordering between sibling menu nodes.
///
/// The home page (`/`) comes first, then ascending weight, then folders
/// before leaves, then case-sensitive title order.
pub fn menu_order(a: &MenuItem, b: &MenuItem) -> Ordering {
    let a_home = a.slug == "/";
    let b_home = b.slug == "/";

    b_home
        .cmp(&a_home)
        .then(a.weight.cmp(&b.weight))
        .then(b.is_folder.cmp(&a.is_folder))
        .then_with(|| a.title.cmp(&b.title))
}

/// Check that every level of the tree satisfies [`menu_order`].
pub fn is_ordered(nodes: &[MenuItem]) -> bool {
    nodes
        .windows(2)
        .all(|pair| menu_order(&pair[0], &pair[1]) != Ordering::Greater)
        && nodes.iter().all(|node| is_ordered(&node.children))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(path: &str) -> Vec<String> {
        path.split('/').map(str::to_string).collect()
    }

    fn titles(nodes: &[MenuItem]) -> Vec<&str> {
        nodes.iter().map(|n| n.title.as_str()).collect()
    }

    #[test]
    fn test_folder_and_leaf_creation() {
        let mut menu = Vec::new();
        insert(&mut menu, &segs("guide/intro"), "/guide/intro", "Introduction", 1);

        assert_eq!(menu.len(), 1);
        let folder = &menu[0];
        assert!(folder.is_folder);
        assert_eq!(folder.title, "Guide");
        assert_eq!(folder.slug, "");
        assert_eq!(folder.weight, 0);

        let leaf = &folder.children[0];
        assert!(!leaf.is_folder);
        assert_eq!(leaf.title, "Introduction");
        assert_eq!(leaf.slug, "/guide/intro");
        assert_eq!(leaf.weight, 1);
    }

    #[test]
    fn test_folders_are_shared() {
        let mut menu = Vec::new();
        insert(&mut menu, &segs("guide/b"), "/guide/b", "B", 0);
        insert(&mut menu, &segs("guide/a"), "/guide/a", "A", 0);

        assert_eq!(menu.len(), 1);
        assert_eq!(titles(&menu[0].children), vec!["A", "B"]);
    }

    #[test]
    fn test_home_first_regardless_of_weight() {
        let mut menu = Vec::new();
        insert(&mut menu, &segs("aaa"), "/aaa", "Aaa", -10);
        insert(&mut menu, &segs("index"), "/", "Home", 50);

        assert_eq!(menu[0].slug, "/");
    }

    #[test]
    fn test_weight_then_folder_then_title() {
        let mut menu = Vec::new();
        insert(&mut menu, &segs("zeta"), "/zeta", "Zeta", 0);
        insert(&mut menu, &segs("alpha"), "/alpha", "Alpha", 0);
        insert(&mut menu, &segs("docs/x"), "/docs/x", "X", 0);
        insert(&mut menu, &segs("heavy"), "/heavy", "Heavy", 5);
        insert(&mut menu, &segs("light"), "/light", "Light", -1);

        assert_eq!(titles(&menu), vec!["Light", "Docs", "Alpha", "Zeta", "Heavy"]);
    }

    #[test]
    fn test_title_order_is_case_sensitive() {
        let mut menu = Vec::new();
        insert(&mut menu, &segs("b"), "/b", "beta", 0);
        insert(&mut menu, &segs("a"), "/a", "Zulu", 0);

        assert_eq!(titles(&menu), vec!["Zulu", "beta"]);
    }

    #[test]
    fn test_order_independent_of_insertion_order() {
        let docs = [
            ("index", "/", "Home", 3),
            ("guide/intro", "/guide/intro", "Introduction", 1),
            ("guide/setup", "/guide/setup", "Setup", 0),
            ("about", "/about", "About", 0),
            ("api/client", "/api/client", "Client", 2),
            ("faq", "/faq", "FAQ", -1),
        ];

        let mut forward = Vec::new();
        for (path, slug, title, weight) in docs {
            insert(&mut forward, &segs(path), slug, title, weight);
            assert!(is_ordered(&forward));
        }

        let mut backward = Vec::new();
        for (path, slug, title, weight) in docs.iter().rev() {
            insert(&mut backward, &segs(path), slug, title, *weight);
            assert!(is_ordered(&backward));
        }

        assert_eq!(forward, backward);
        assert_eq!(titles(&forward), vec!["Home", "FAQ", "Api", "Guide", "About"]);
    }

    #[test]
    fn test_segments_with_same_title_stay_distinct() {
        let mut menu = Vec::new();
        insert(&mut menu, &segs("my-notes/a"), "/my-notes/a", "A", 0);
        insert(&mut menu, &segs("my notes/b"), "/my notes/b", "B", 0);

        assert_eq!(menu.len(), 2);
        assert!(menu.iter().all(|n| n.title == "My Notes"));
    }

    #[test]
    fn test_folder_and_leaf_with_same_segment() {
        let mut menu = Vec::new();
        insert(&mut menu, &segs("guide"), "/guide", "Guide Page", 0);
        insert(&mut menu, &segs("guide/intro"), "/guide/intro", "Intro", 0);

        assert_eq!(menu.len(), 2);
        assert!(menu[0].is_folder);
        assert!(!menu[1].is_folder);
    }

    #[test]
    fn test_reinserting_leaf_updates_in_place() {
        let mut menu = Vec::new();
        insert(&mut menu, &segs("page"), "/page", "Old", 0);
        insert(&mut menu, &segs("page"), "/page", "New", 2);

        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0].title, "New");
        assert_eq!(menu[0].weight, 2);
    }

    #[test]
    fn test_empty_segments_is_noop() {
        let mut menu = Vec::new();
        insert(&mut menu, &[], "/x", "X", 0);
        assert!(menu.is_empty());
    }
}
