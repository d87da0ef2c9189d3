use crate::document::{Document, Node, NodeId};
use crate::error::Result;
use crate::fetcher::{FetchConfig, Fetcher};
use crate::parser::HtmlParser;
use crate::walker::DomWalker;
use std::sync::Arc;
use url::Url;

/// An ordered set of nodes from one parsed document.
///
/// Filtering returns a new `Query` sharing the same document. The set keeps
/// discovery order and may hold the same node more than once.
#[derive(Debug, Clone)]
pub struct Query {
    document: Arc<Document>,
    set: Vec<NodeId>,
}

impl Query {
    /// Wrap the root of `document`.
    pub fn new(document: Arc<Document>) -> Self {
        let root = document.root();
        Self {
            document,
            set: vec![root],
        }
    }

    /// Wrap an explicit set of nodes. Every id must belong to `document`.
    pub fn from_nodes(document: Arc<Document>, set: Vec<NodeId>) -> Self {
        Self { document, set }
    }

    pub fn from_document(bytes: &[u8]) -> Result<Self> {
        let document = HtmlParser::parse(bytes)?;
        Ok(Self::new(Arc::new(document)))
    }

    /// Fetch `url` with a default [`Fetcher`] and parse the body.
    pub async fn from_url(url: &Url) -> Result<Self> {
        let fetcher = Fetcher::new(FetchConfig::default())?;
        Self::from_url_with(&fetcher, url).await
    }

    pub async fn from_url_with(fetcher: &Fetcher, url: &Url) -> Result<Self> {
        let body = fetcher.fetch(url).await?;
        Self::from_document(&body)
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.set
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Node at position `index` of the set.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn at(&self, index: usize) -> &Node {
        &self.document[self.set[index]]
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.set.get(index).map(|&id| &self.document[id])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> + '_ {
        self.set.iter().map(|&id| &self.document[id])
    }

    /// Visit each node of the set in order, without descending.
    pub fn each<F>(&self, mut visit: F)
    where
        F: FnMut(&Node),
    {
        for node in self.iter() {
            visit(node);
        }
    }

    /// Pre-order walk from every node of the set, in set order.
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(&Node),
    {
        for (_id, node, _depth) in DomWalker::new(&self.document, &self.set) {
            visit(node);
        }
    }

    /// Element nodes below (and including) the set whose tag equals `name`.
    ///
    /// Matching is exact and case-sensitive.
    pub fn elements_by_tag_name(&self, name: &str) -> Query {
        let mut set = Vec::new();
        self.traverse(|node| {
            if node.tag_name() == Some(name) {
                set.push(node.id);
            }
        });
        Query {
            document: Arc::clone(&self.document),
            set,
        }
    }

    /// Value of `key` for every node that has it.
    ///
    /// Nodes lacking the attribute are skipped, so the result can be shorter
    /// than the set.
    pub fn attr(&self, key: &str) -> Vec<String> {
        let mut values = Vec::new();
        self.each(|node| {
            if let Some(value) = node.attr(key) {
                values.push(value.to_string());
            }
        });
        values
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = &'a Node;
    type IntoIter = Box<dyn Iterator<Item = &'a Node> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Attribute, NodeKind};

    /// <a id="outer"><b/><a id="inner"/></a>
    fn nested_anchors() -> Arc<Document> {
        let mut doc = Document::new();
        let root = doc.root();
        let outer = doc.append_element(root, "a", vec![Attribute::new("id", "outer")]);
        doc.append_element(outer, "b", vec![]);
        doc.append_element(outer, "a", vec![Attribute::new("id", "inner")]);
        Arc::new(doc)
    }

    #[test]
    fn test_from_document_wraps_root() {
        let query = Query::from_document(b"<p>hi</p>").unwrap();
        assert_eq!(query.len(), 1);
        assert_eq!(query.at(0).kind, NodeKind::Document);
    }

    #[test]
    fn test_elements_by_tag_name() {
        let query = Query::new(nested_anchors());

        let anchors = query.elements_by_tag_name("a");
        assert_eq!(anchors.len(), 2);
        assert_eq!(anchors.attr("id"), vec!["outer", "inner"]);

        let bs = query.elements_by_tag_name("b");
        assert_eq!(bs.len(), 1);
        assert_eq!(bs.at(0).tag_name(), Some("b"));

        let none = query.elements_by_tag_name("c");
        assert!(none.is_empty());
    }

    #[test]
    fn test_elements_by_tag_name_skips_other_kinds() {
        let mut doc = Document::new();
        let root = doc.root();
        let div = doc.append_element(root, "div", vec![]);
        doc.append_text(div, "div");
        doc.append_comment(div, "div");

        let query = Query::new(Arc::new(doc));
        let divs = query.elements_by_tag_name("div");
        assert_eq!(divs.ids(), &[div]);
    }

    #[test]
    fn test_elements_by_tag_name_is_case_sensitive() {
        let query = Query::new(nested_anchors());
        assert!(query.elements_by_tag_name("A").is_empty());
    }

    #[test]
    fn test_elements_by_tag_name_from_parsed_markup() {
        let query = Query::from_document(b"<a><b></b><a></a></a>").unwrap();
        assert_eq!(query.elements_by_tag_name("a").len(), 2);
        assert_eq!(query.elements_by_tag_name("b").len(), 1);
        assert_eq!(query.elements_by_tag_name("c").len(), 0);
    }

    #[test]
    fn test_chained_filters_keep_duplicates() {
        // Both anchors are in the set, and the inner one sits below the outer
        let anchors = Query::new(nested_anchors()).elements_by_tag_name("a");
        let again = anchors.elements_by_tag_name("a");
        assert_eq!(again.attr("id"), vec!["outer", "inner", "inner"]);
    }

    #[test]
    fn test_attr_skips_missing() {
        let mut doc = Document::new();
        let root = doc.root();
        let with = doc.append_element(root, "a", vec![Attribute::new("href", "x")]);
        let without = doc.append_element(root, "a", vec![Attribute::new("name", "y")]);

        let query = Query::from_nodes(Arc::new(doc), vec![with, without]);
        assert_eq!(query.attr("href"), vec!["x"]);
    }

    #[test]
    fn test_attr_first_match_wins() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(
            root,
            "a",
            vec![Attribute::new("href", "1"), Attribute::new("href", "2")],
        );

        let query = Query::from_nodes(Arc::new(doc), vec![a]);
        assert_eq!(query.attr("href"), vec!["1"]);
    }

    #[test]
    fn test_each_does_not_descend() {
        let query = Query::new(nested_anchors());
        let mut seen = Vec::new();
        query.each(|node| seen.push(node.kind));
        assert_eq!(seen, vec![NodeKind::Document]);
    }

    #[test]
    fn test_traverse_order() {
        let query = Query::new(nested_anchors());
        let mut tags = Vec::new();
        query.traverse(|node| tags.push(node.tag_name().unwrap_or("#document").to_string()));
        assert_eq!(tags, vec!["#document", "a", "b", "a"]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let query = Query::from_document(
            br#"<ul><li><a href="1">one</a></li><li><a href="2">two</a></li></ul>"#,
        )
        .unwrap();

        let first = query.elements_by_tag_name("a");
        let second = query.elements_by_tag_name("a");
        assert_eq!(first.ids(), second.ids());
        assert_eq!(first.attr("href"), second.attr("href"));
        assert_eq!(query.len(), 1);
    }

    #[test]
    fn test_filtered_query_shares_document() {
        let query = Query::new(nested_anchors());
        let anchors = query.elements_by_tag_name("a");
        assert!(Arc::ptr_eq(query.document(), anchors.document()));
    }

    #[test]
    fn test_get_out_of_range() {
        let query = Query::new(nested_anchors());
        assert!(query.get(0).is_some());
        assert!(query.get(1).is_none());
    }

    #[test]
    #[should_panic]
    fn test_at_out_of_range_panics() {
        let query = Query::new(nested_anchors()).elements_by_tag_name("c");
        query.at(0);
    }

    #[test]
    fn test_into_iterator() {
        let anchors = Query::new(nested_anchors()).elements_by_tag_name("a");
        let mut count = 0;
        for node in &anchors {
            assert!(node.is_element());
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_query_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Query>();
    }
}
