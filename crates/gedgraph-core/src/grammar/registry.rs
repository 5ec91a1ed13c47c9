use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::errors::Result;
use crate::graph::TagPath;
use crate::grammar::meta::MetaNode;
use crate::grammar::source::{parse_grammar_str, GrammarBuilder};
use crate::grammar::PropertyKind;

const STANDARD_SOURCE: &str = include_str!("standard.yaml");

/// Registry of meta nodes keyed by record tag
///
/// Lookups never fail: tags the grammar does not declare resolve to
/// permissive synthesized meta nodes that are remembered for later calls.
#[derive(Debug, Default)]
pub struct Grammar {
    roots: RwLock<RootTable>,
}

#[derive(Debug, Default)]
struct RootTable {
    order: Vec<String>,
    by_tag: HashMap<String, Arc<MetaNode>>,
}

impl Grammar {
    /// Grammar with no declarations
    pub fn permissive() -> Grammar {
        Grammar::default()
    }

    pub(crate) fn from_roots(roots: Vec<Arc<MetaNode>>) -> Grammar {
        let mut table = RootTable::default();
        for root in roots {
            table.order.push(root.tag().to_string());
            table.by_tag.insert(root.tag().to_string(), root);
        }
        Grammar {
            roots: RwLock::new(table),
        }
    }

    /// Build a grammar from a YAML source
    ///
    /// # Errors
    ///
    /// Returns `GrammarSource` for malformed sources and bad `super` or
    /// `xref` references.
    pub fn from_yaml_str(content: &str) -> Result<Grammar> {
        let source = parse_grammar_str(content)?;
        GrammarBuilder::from_source(source)?.finish()
    }

    /// The embedded lineage-linked grammar, built once per process
    pub fn standard() -> Arc<Grammar> {
        static STANDARD: OnceLock<Arc<Grammar>> = OnceLock::new();
        let grammar = STANDARD.get_or_init(|| match Grammar::from_yaml_str(STANDARD_SOURCE) {
            Ok(grammar) => Arc::new(grammar),
            Err(err) => {
                tracing::error!(
                    component = module_path!(),
                    op = "grammar_load",
                    error = %err,
                    "embedded grammar failed to load, using a permissive grammar"
                );
                Arc::new(Grammar::permissive())
            }
        });
        Arc::clone(grammar)
    }

    /// Record tags in declaration order, synthesized ones last
    pub fn root_tags(&self) -> Vec<String> {
        let table = self.roots.read().unwrap_or_else(PoisonError::into_inner);
        table.order.clone()
    }

    /// Meta node for a record tag
    pub fn root(&self, tag: &str) -> Arc<MetaNode> {
        self.root_with(tag, true)
    }

    fn root_with(&self, tag: &str, remember: bool) -> Arc<MetaNode> {
        {
            let table = self.roots.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(found) = table.by_tag.get(tag) {
                return Arc::clone(found);
            }
        }
        let path = TagPath::raw_root(tag);
        if !remember {
            return Arc::new(MetaNode::synthesized(path, PropertyKind::Composite));
        }
        let mut table = self.roots.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = table.by_tag.get(tag) {
            return Arc::clone(found);
        }
        let created = Arc::new(MetaNode::synthesized(path, PropertyKind::Composite));
        table.order.push(tag.to_string());
        table.by_tag.insert(tag.to_string(), Arc::clone(&created));
        created
    }

    /// Meta node for a tag path, memoizing unknown tags along the way
    pub fn resolve(&self, path: &TagPath) -> Arc<MetaNode> {
        self.resolve_with(path, true)
    }

    /// Like [`Grammar::resolve`] but leaves the registry untouched
    pub fn resolve_transient(&self, path: &TagPath) -> Arc<MetaNode> {
        self.resolve_with(path, false)
    }

    pub(crate) fn resolve_with(&self, path: &TagPath, remember: bool) -> Arc<MetaNode> {
        let mut meta = self.root_with(path.first(), remember);
        for tag in &path.segments()[1..] {
            meta = if remember {
                meta.child(tag)
            } else {
                meta.child_transient(tag)
            };
        }
        meta
    }

    /// Declared paths below `root_tag` whose kind is `kind`, depth first
    pub fn paths_of_kind(&self, root_tag: &str, kind: PropertyKind) -> Vec<TagPath> {
        fn walk(meta: &MetaNode, kind: PropertyKind, out: &mut Vec<TagPath>) {
            for child in meta.declared_children() {
                if child.kind() == kind {
                    out.push(child.path().clone());
                }
                walk(&child, kind, out);
            }
        }

        let mut out = Vec::new();
        let table = self.roots.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(root) = table.by_tag.get(root_tag) {
            walk(root, kind, &mut out);
        }
        out
    }
}
