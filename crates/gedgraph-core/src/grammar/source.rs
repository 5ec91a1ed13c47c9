//! Declarative grammar source
//!
//! A grammar is a tree of tag declarations. YAML files deserialize into
//! [`GrammarSourceV1`]; other loaders can feed the same declarations to a
//! [`GrammarBuilder`] as a depth-annotated stream.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{GedcomError, Result};
use crate::graph::{EntityType, TagPath};
use crate::grammar::meta::{MetaNode, MetaSpec};
use crate::grammar::{Grammar, PropertyKind};

/// Supported `schema_version`
pub const SCHEMA_VERSION: u32 = 1;

/// Top-level grammar file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarSourceV1 {
    /// Must be [`SCHEMA_VERSION`]
    pub schema_version: u32,

    /// Record declarations
    pub roots: Vec<TagDecl>,
}

/// One tag declaration with its nested declarations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagDecl {
    pub tag: String,

    #[serde(flatten)]
    pub attrs: TagAttrs,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TagDecl>,
}

/// Attributes of a declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagAttrs {
    /// Property type name, e.g. `Date` or `FamilySpouse`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Tag path this declaration inherits from
    #[serde(rename = "super", default, skip_serializing_if = "Option::is_none")]
    pub super_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singleton: Option<bool>,

    #[serde(default)]
    pub hide: bool,

    #[serde(default)]
    pub default: bool,

    /// Record tag a generic reference points at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xref: Option<String>,

    /// Not inherited by declarations that name the parent as `super`
    #[serde(default)]
    pub local: bool,
}

/// Parse and validate a YAML grammar source
///
/// # Errors
///
/// Returns `GrammarSource` for malformed YAML or an unsupported schema
/// version.
pub fn parse_grammar_str(content: &str) -> Result<GrammarSourceV1> {
    let source: GrammarSourceV1 = serde_yaml::from_str(content)?;
    if source.schema_version != SCHEMA_VERSION {
        return Err(GedcomError::GrammarSource {
            message: format!(
                "Unsupported schema_version: {}. Expected {}",
                source.schema_version, SCHEMA_VERSION
            ),
        });
    }
    Ok(source)
}

/// Incremental grammar construction from `(depth, tag, attributes)` events
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    roots: Vec<TagDecl>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-filled with every declaration of a source
    ///
    /// # Errors
    ///
    /// Returns `GrammarSource` for malformed or duplicate tags.
    pub fn from_source(source: GrammarSourceV1) -> Result<Self> {
        fn feed(builder: &mut GrammarBuilder, depth: usize, decl: TagDecl) -> Result<()> {
            builder.declare(depth, &decl.tag, decl.attrs)?;
            for child in decl.children {
                feed(builder, depth + 1, child)?;
            }
            Ok(())
        }

        let mut builder = GrammarBuilder::new();
        for root in source.roots {
            feed(&mut builder, 0, root)?;
        }
        Ok(builder)
    }

    /// Declare `tag` at `depth` below the most recent declaration one level up
    ///
    /// # Errors
    ///
    /// Returns `GrammarSource` when the tag is malformed, the depth skips a
    /// level, or the tag is already declared under the same parent.
    pub fn declare(&mut self, depth: usize, tag: &str, attrs: TagAttrs) -> Result<()> {
        if TagPath::root(tag).is_err() {
            return Err(source_error(format!("malformed tag '{tag}'")));
        }
        let mut siblings = &mut self.roots;
        for _ in 0..depth {
            let parent = siblings
                .last_mut()
                .ok_or_else(|| source_error(format!("'{tag}' declared at depth {depth} without a parent")))?;
            siblings = &mut parent.children;
        }
        if siblings.iter().any(|decl| decl.tag == tag) {
            return Err(source_error(format!("'{tag}' declared twice at depth {depth}")));
        }
        siblings.push(TagDecl {
            tag: tag.to_string(),
            attrs,
            children: Vec::new(),
        });
        Ok(())
    }

    /// Resolve `super` references and produce the grammar
    ///
    /// # Errors
    ///
    /// Returns `GrammarSource` for unknown or cyclic `super` paths and
    /// unknown `xref` record tags.
    pub fn finish(self) -> Result<Grammar> {
        let mut resolver = Resolver {
            roots: &self.roots,
            cache: HashMap::new(),
            active: Vec::new(),
        };
        let mut roots = Vec::with_capacity(self.roots.len());
        for decl in &self.roots {
            let path = TagPath::root(&decl.tag)?;
            let resolved = resolver.resolve(&path)?;
            roots.push(materialize(path, &resolved));
        }
        Ok(Grammar::from_roots(roots))
    }
}

fn source_error(message: String) -> GedcomError {
    GedcomError::GrammarSource { message }
}

/// A declaration with its `super` chain folded in
#[derive(Debug, Clone)]
struct Resolved {
    tag: String,
    kind: Option<PropertyKind>,
    image: Option<String>,
    singleton: Option<bool>,
    hidden: bool,
    default: bool,
    local: bool,
    xref_target: Option<EntityType>,
    children: Vec<Resolved>,
}

struct Resolver<'a> {
    roots: &'a [TagDecl],
    cache: HashMap<TagPath, Resolved>,
    active: Vec<TagPath>,
}

impl Resolver<'_> {
    fn resolve(&mut self, path: &TagPath) -> Result<Resolved> {
        if let Some(done) = self.cache.get(path) {
            return Ok(done.clone());
        }
        if self.active.contains(path) {
            return Err(source_error(format!("cyclic super reference through {path}")));
        }
        self.active.push(path.clone());
        let result = match find_decl(self.roots, path) {
            Some(decl) => self.build(path, decl),
            // inherited, not declared: take it from the resolved parent
            None => match path.parent() {
                Some(parent) => self.resolve(&parent).and_then(|parent| {
                    parent
                        .children
                        .into_iter()
                        .find(|child| child.tag == path.last())
                        .ok_or_else(|| source_error(format!("unknown tag path {path}")))
                }),
                None => Err(source_error(format!("unknown tag path {path}"))),
            },
        };
        self.active.pop();
        let resolved = result?;
        self.cache.insert(path.clone(), resolved.clone());
        Ok(resolved)
    }

    fn build(&mut self, path: &TagPath, decl: &TagDecl) -> Result<Resolved> {
        let attrs = &decl.attrs;
        let kind = attrs.type_name.as_deref().map(|name| {
            PropertyKind::from_type_name(name).unwrap_or_else(|| {
                tracing::warn!(
                    component = module_path!(),
                    op = "grammar_load",
                    tag = %path,
                    type_name = name,
                    "unknown property type, using a simple value"
                );
                PropertyKind::Scalar
            })
        });
        let xref_target = match attrs.xref.as_deref() {
            Some(tag) => Some(
                EntityType::from_tag(tag)
                    .ok_or_else(|| source_error(format!("{path}: unknown xref record tag '{tag}'")))?,
            ),
            None => None,
        };

        let mut children = Vec::with_capacity(decl.children.len());
        for child in &decl.children {
            children.push(self.resolve(&path.join(&child.tag))?);
        }

        let mut resolved = Resolved {
            tag: decl.tag.clone(),
            kind,
            image: attrs.img.clone(),
            singleton: attrs.singleton,
            hidden: attrs.hide,
            default: attrs.default,
            local: attrs.local,
            xref_target,
            children,
        };

        if let Some(super_path) = attrs.super_path.as_deref() {
            let super_path: TagPath = super_path
                .parse()
                .map_err(|_| source_error(format!("{path}: malformed super '{super_path}'")))?;
            let parent = self.resolve(&super_path)?;
            resolved.kind = resolved.kind.or(parent.kind);
            resolved.image = resolved.image.or(parent.image);
            resolved.singleton = resolved.singleton.or(parent.singleton);
            resolved.xref_target = resolved.xref_target.or(parent.xref_target);
            for inherited in parent.children {
                let declared = resolved.children.iter().any(|c| c.tag == inherited.tag);
                if !inherited.local && !declared {
                    resolved.children.push(inherited);
                }
            }
        }
        Ok(resolved)
    }
}

fn find_decl<'a>(roots: &'a [TagDecl], path: &TagPath) -> Option<&'a TagDecl> {
    let mut segments = path.segments().iter();
    let first = segments.next()?;
    let mut decl = roots.iter().find(|decl| &decl.tag == first)?;
    for tag in segments {
        decl = decl.children.iter().find(|child| &child.tag == tag)?;
    }
    Some(decl)
}

fn materialize(path: TagPath, resolved: &Resolved) -> Arc<MetaNode> {
    let children = resolved
        .children
        .iter()
        .map(|child| materialize(path.join(&child.tag), child))
        .collect();
    let spec = MetaSpec {
        kind: resolved.kind,
        image: resolved.image.clone(),
        singleton: resolved.singleton.unwrap_or(false),
        hidden: resolved.hidden,
        default: resolved.default,
        xref_target: resolved.xref_target,
    };
    Arc::new(MetaNode::declared(path, spec, children))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAMILY_TREE: &str = r#"
schema_version: 1
roots:
  - tag: INDI
    children:
      - tag: BIRT
        type: Event
        default: true
        children:
          - tag: DATE
            type: Date
            default: true
          - tag: FAMC
            type: XRef
            xref: FAM
            local: true
      - tag: DEAT
        super: INDI:BIRT
        singleton: true
      - tag: ADOP
        super: INDI:BIRT
        children:
          - tag: FAMC
            type: FamilyChild
"#;

    fn attrs(type_name: &str) -> TagAttrs {
        TagAttrs {
            type_name: Some(type_name.to_string()),
            ..TagAttrs::default()
        }
    }

    #[test]
    fn test_parse_rejects_wrong_version() {
        let err = parse_grammar_str("schema_version: 7\nroots: []\n").unwrap_err();
        assert!(matches!(err, GedcomError::GrammarSource { .. }));
    }

    #[test]
    fn test_super_inherits_non_local_children() {
        let grammar = Grammar::from_yaml_str(FAMILY_TREE).unwrap();
        let deat = grammar.resolve(&"INDI:DEAT".parse().unwrap());

        assert_eq!(deat.kind(), PropertyKind::Composite);
        assert!(deat.is_singleton());
        let tags: Vec<_> = deat.declared_children().iter().map(|m| m.tag().to_string()).collect();
        assert_eq!(tags, vec!["DATE"]);
        assert_eq!(deat.default_children()[0].path().to_string(), "INDI:DEAT:DATE");
    }

    #[test]
    fn test_explicit_child_wins_over_inherited() {
        let grammar = Grammar::from_yaml_str(FAMILY_TREE).unwrap();
        let famc = grammar.resolve(&"INDI:ADOP:FAMC".parse().unwrap());
        assert_eq!(famc.kind(), PropertyKind::FamilyChild);
        assert!(famc.is_declared());
    }

    #[test]
    fn test_builder_stream() {
        let mut builder = GrammarBuilder::new();
        builder.declare(0, "SOUR", TagAttrs::default()).unwrap();
        builder.declare(1, "TITL", attrs("MultiLineValue")).unwrap();
        builder.declare(1, "REPO", TagAttrs {
            xref: Some("REPO".to_string()),
            ..attrs("XRef")
        }).unwrap();
        let grammar = builder.finish().unwrap();

        let repo = grammar.resolve(&"SOUR:REPO".parse().unwrap());
        assert_eq!(repo.xref_target(), Some(EntityType::Repository));
    }

    #[test]
    fn test_builder_rejects_skipped_level() {
        let mut builder = GrammarBuilder::new();
        let err = builder.declare(1, "NAME", TagAttrs::default()).unwrap_err();
        assert!(matches!(err, GedcomError::GrammarSource { .. }));
    }

    #[test]
    fn test_builder_rejects_duplicate_tag() {
        let mut builder = GrammarBuilder::new();
        builder.declare(0, "INDI", TagAttrs::default()).unwrap();
        builder.declare(1, "NAME", attrs("Name")).unwrap();
        assert!(builder.declare(1, "NAME", attrs("Name")).is_err());
    }

    #[test]
    fn test_cyclic_super_is_rejected() {
        let mut builder = GrammarBuilder::new();
        builder.declare(0, "INDI", TagAttrs::default()).unwrap();
        builder.declare(1, "BIRT", TagAttrs {
            super_path: Some("INDI:DEAT".to_string()),
            ..TagAttrs::default()
        }).unwrap();
        builder.declare(1, "DEAT", TagAttrs {
            super_path: Some("INDI:BIRT".to_string()),
            ..TagAttrs::default()
        }).unwrap();
        let err = builder.finish().unwrap_err();
        assert!(matches!(err, GedcomError::GrammarSource { .. }));
    }

    #[test]
    fn test_unknown_type_loads_as_scalar() {
        let mut builder = GrammarBuilder::new();
        builder.declare(0, "NOTE", TagAttrs::default()).unwrap();
        builder.declare(1, "CONC", attrs("Continuation")).unwrap();
        let grammar = builder.finish().unwrap();
        assert_eq!(
            grammar.resolve(&"NOTE:CONC".parse().unwrap()).kind(),
            PropertyKind::Scalar
        );
    }

    #[test]
    fn test_unknown_xref_record_is_rejected() {
        let mut builder = GrammarBuilder::new();
        builder.declare(0, "INDI", TagAttrs::default()).unwrap();
        builder.declare(1, "PET", TagAttrs {
            xref: Some("DOG".to_string()),
            ..attrs("XRef")
        }).unwrap();
        assert!(builder.finish().is_err());
    }
}
