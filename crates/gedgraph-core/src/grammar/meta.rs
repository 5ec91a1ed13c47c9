use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::graph::{EntityType, Node, Payload, TagPath};
use crate::grammar::PropertyKind;

/// Grammar description of the properties found at one tag path
///
/// Declared nodes come from a grammar source; synthesized nodes are
/// created on demand for tags the grammar does not know and accept any
/// children.
#[derive(Debug)]
pub struct MetaNode {
    path: TagPath,
    kind: PropertyKind,
    image: Option<String>,
    singleton: bool,
    hidden: bool,
    default: bool,
    xref_target: Option<EntityType>,
    declared: bool,
    children: RwLock<MetaChildren>,
}

#[derive(Debug, Default)]
struct MetaChildren {
    order: Vec<String>,
    by_tag: HashMap<String, Arc<MetaNode>>,
}

/// Attributes of a declared meta node after `super` resolution
#[derive(Debug, Clone, Default)]
pub(crate) struct MetaSpec {
    pub(crate) kind: Option<PropertyKind>,
    pub(crate) image: Option<String>,
    pub(crate) singleton: bool,
    pub(crate) hidden: bool,
    pub(crate) default: bool,
    pub(crate) xref_target: Option<EntityType>,
}

impl MetaNode {
    pub(crate) fn declared(path: TagPath, spec: MetaSpec, children: Vec<Arc<MetaNode>>) -> MetaNode {
        let kind = spec.kind.unwrap_or(if children.is_empty() {
            PropertyKind::Scalar
        } else {
            PropertyKind::Composite
        });
        let mut table = MetaChildren::default();
        for child in children {
            let tag = child.tag().to_string();
            if !table.by_tag.contains_key(&tag) {
                table.order.push(tag.clone());
            }
            table.by_tag.insert(tag, child);
        }
        MetaNode {
            path,
            kind,
            image: spec.image,
            singleton: spec.singleton,
            hidden: spec.hidden,
            default: spec.default,
            xref_target: spec.xref_target,
            declared: true,
            children: RwLock::new(table),
        }
    }

    pub(crate) fn synthesized(path: TagPath, kind: PropertyKind) -> MetaNode {
        MetaNode {
            path,
            kind,
            image: None,
            singleton: false,
            hidden: false,
            default: false,
            xref_target: None,
            declared: false,
            children: RwLock::new(MetaChildren::default()),
        }
    }

    pub fn tag(&self) -> &str {
        self.path.last()
    }

    pub fn path(&self) -> &TagPath {
        &self.path
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// Image key for UIs; `None` when the grammar gives none
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn is_singleton(&self) -> bool {
        self.singleton
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_default(&self) -> bool {
        self.default
    }

    /// Whether this node came from a grammar declaration
    pub fn is_declared(&self) -> bool {
        self.declared
    }

    /// Entity type a generic reference resolves against
    pub fn xref_target(&self) -> Option<EntityType> {
        self.xref_target
    }

    /// Meta node for a nested tag, memoized when unknown
    ///
    /// Concurrent callers asking for the same unknown tag all observe the
    /// instance that was inserted first.
    pub fn child(&self, tag: &str) -> Arc<MetaNode> {
        if let Some(found) = self.lookup(tag) {
            return found;
        }
        let mut table = self.children.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = table.by_tag.get(tag) {
            return Arc::clone(found);
        }
        let created = Arc::new(MetaNode::synthesized(self.path.join(tag), PropertyKind::Scalar));
        table.order.push(tag.to_string());
        table.by_tag.insert(tag.to_string(), Arc::clone(&created));
        created
    }

    /// Meta node for a nested tag without remembering unknown tags
    pub fn child_transient(&self, tag: &str) -> Arc<MetaNode> {
        self.lookup(tag).unwrap_or_else(|| {
            Arc::new(MetaNode::synthesized(self.path.join(tag), PropertyKind::Scalar))
        })
    }

    fn lookup(&self, tag: &str) -> Option<Arc<MetaNode>> {
        let table = self.children.read().unwrap_or_else(PoisonError::into_inner);
        table.by_tag.get(tag).cloned()
    }

    fn collect_children(&self, keep: impl Fn(&MetaNode) -> bool) -> Vec<Arc<MetaNode>> {
        let table = self.children.read().unwrap_or_else(PoisonError::into_inner);
        table
            .order
            .iter()
            .filter_map(|tag| table.by_tag.get(tag))
            .filter(|meta| keep(meta))
            .cloned()
            .collect()
    }

    /// Declared, non-hidden children in declaration order
    pub fn visible_children(&self) -> Vec<Arc<MetaNode>> {
        self.collect_children(|meta| meta.declared && !meta.hidden)
    }

    /// Children created automatically with a new property
    pub fn default_children(&self) -> Vec<Arc<MetaNode>> {
        self.collect_children(|meta| meta.declared && !meta.hidden && meta.default)
    }

    /// All declared children, hidden ones included
    pub fn declared_children(&self) -> Vec<Arc<MetaNode>> {
        self.collect_children(|meta| meta.declared)
    }

    /// Whether the grammar declares `tag` below this node
    ///
    /// Synthesized nodes and `_`-prefixed custom tags accept anything.
    pub fn allows(&self, tag: &str) -> bool {
        if !self.declared || tag.starts_with('_') {
            return true;
        }
        self.lookup(tag).is_some_and(|meta| meta.declared)
    }

    /// Build a detached node for `value`
    ///
    /// A kind that cannot be constructed degrades to a scalar node.
    pub fn create(&self, value: &str) -> Node {
        let payload = match self.kind.construct(self.tag(), value, self.xref_target) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(
                    component = module_path!(),
                    op = "meta_create",
                    tag = %self.path,
                    err_code = crate::errors::ExError::from(err.clone()).code(),
                    error = %err,
                    "falling back to a scalar property"
                );
                Payload::Scalar(value.to_string())
            }
        };
        Node::new(self.tag(), payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn path(text: &str) -> TagPath {
        text.parse().unwrap()
    }

    #[test]
    fn test_unknown_child_is_memoized() {
        let root = MetaNode::synthesized(path("_CUSTOM"), PropertyKind::Composite);
        let first = root.child("_X");
        let second = root.child("_X");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(!first.is_declared());
        assert_eq!(first.path().to_string(), "_CUSTOM:_X");
    }

    #[test]
    fn test_transient_child_is_not_memoized() {
        let root = MetaNode::synthesized(path("_CUSTOM"), PropertyKind::Composite);
        let first = root.child_transient("_X");
        let second = root.child_transient("_X");
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(root.visible_children().is_empty());
    }

    #[test]
    fn test_concurrent_lookups_share_one_instance() {
        let root = Arc::new(MetaNode::synthesized(path("INDI"), PropertyKind::Composite));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let root = Arc::clone(&root);
                thread::spawn(move || root.child("_UID"))
            })
            .collect();
        let metas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(metas.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_reference_without_target_degrades_to_scalar() {
        let spec = MetaSpec {
            kind: Some(PropertyKind::Reference),
            ..MetaSpec::default()
        };
        let meta = MetaNode::declared(path("INDI:ALIA"), spec, Vec::new());
        let node = meta.create("@I2@");
        assert_eq!(node.payload(), &Payload::Scalar("@I2@".to_string()));
    }

    #[test]
    fn test_default_and_hidden_children() {
        let name = Arc::new(MetaNode::declared(
            path("INDI:NAME"),
            MetaSpec { kind: Some(PropertyKind::Name), default: true, ..MetaSpec::default() },
            Vec::new(),
        ));
        let chan = Arc::new(MetaNode::declared(
            path("INDI:CHAN"),
            MetaSpec { hidden: true, default: true, ..MetaSpec::default() },
            Vec::new(),
        ));
        let indi = MetaNode::declared(path("INDI"), MetaSpec::default(), vec![name, chan]);

        assert_eq!(indi.kind(), PropertyKind::Composite);
        let defaults: Vec<_> = indi.default_children().iter().map(|m| m.tag().to_string()).collect();
        assert_eq!(defaults, vec!["NAME"]);
        assert_eq!(indi.declared_children().len(), 2);
        assert!(indi.allows("CHAN"));
        assert!(indi.allows("_CUSTOM"));
        assert!(!indi.allows("BOGUS"));
    }
}
