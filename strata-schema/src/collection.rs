//! Collection and brick definitions.
//!
//! A collection owns a flat registry of field definitions plus a layout tree
//! that references those definitions by key. Repeater and tab nodes carry
//! children in the layout; every other node is a leaf. Keeping the registry
//! and the tree separate is what lets the migration compiler treat a missing
//! field key as a reportable configuration error instead of a panic.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldDefinition;
use crate::validator;

/// One node in a layout tree. Children are only meaningful on repeater and
/// tab fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    /// Key of the field this node references.
    pub key: SmolStr,
    /// Child nodes (repeater group fields or tab contents).
    pub children: Vec<FieldNode>,
}

impl FieldNode {
    /// Leaf node referencing a value field.
    pub fn leaf(key: impl Into<SmolStr>) -> Self {
        Self {
            key: key.into(),
            children: Vec::new(),
        }
    }

    /// Node with children, for repeater and tab fields.
    pub fn group(key: impl Into<SmolStr>, children: Vec<FieldNode>) -> Self {
        Self {
            key: key.into(),
            children,
        }
    }
}

/// How a brick attaches to a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrickMode {
    /// Always present exactly once on every document.
    Fixed,
    /// User-added, orderable instances.
    Builder,
}

impl BrickMode {
    /// Mode name used in the generated `brick_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixed => "fixed",
            Self::Builder => "builder",
        }
    }
}

/// A named, reusable group of fields attachable to a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    /// Brick key, unique within its collection.
    pub key: SmolStr,
    /// Attachment mode.
    pub mode: BrickMode,
    /// Flat registry of every field the brick declares, keyed by field key,
    /// in declaration order.
    pub fields: IndexMap<SmolStr, FieldDefinition>,
    /// Layout tree referencing the registry.
    pub layout: Vec<FieldNode>,
}

impl Brick {
    /// Start building a brick.
    pub fn builder(key: impl Into<SmolStr>, mode: BrickMode) -> BrickBuilder {
        BrickBuilder {
            key: key.into(),
            mode,
            set: FieldSet::default(),
        }
    }

    /// Get the brick key as a string slice.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Look up a field definition by key.
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.get(key)
    }
}

/// A user-defined content type composed of fields and optional bricks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection key, unique across the application.
    pub key: SmolStr,
    /// Flat registry of the collection's own (non-brick) fields.
    pub fields: IndexMap<SmolStr, FieldDefinition>,
    /// Layout tree for the collection's own fields.
    pub layout: Vec<FieldNode>,
    /// Bricks attached to the collection, in declaration order.
    pub bricks: Vec<Brick>,
}

impl Collection {
    /// Start building a collection.
    pub fn builder(key: impl Into<SmolStr>) -> CollectionBuilder {
        CollectionBuilder {
            key: key.into(),
            set: FieldSet::default(),
            bricks: Vec::new(),
        }
    }

    /// Get the collection key as a string slice.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Look up one of the collection's own fields by key.
    pub fn field(&self, key: &str) -> Option<&FieldDefinition> {
        self.fields.get(key)
    }

    /// Look up a brick by key.
    pub fn brick(&self, key: &str) -> Option<&Brick> {
        self.bricks.iter().find(|b| b.key == key)
    }
}

/// Accumulates field definitions and layout nodes during building.
#[derive(Debug, Default)]
struct FieldSet {
    defs: Vec<FieldDefinition>,
    nodes: Vec<FieldNode>,
}

impl FieldSet {
    fn push_leaf(&mut self, def: FieldDefinition) {
        self.nodes.push(FieldNode::leaf(def.key.clone()));
        self.defs.push(def);
    }

    fn push_group(&mut self, def: FieldDefinition, group: GroupBuilder) {
        self.nodes
            .push(FieldNode::group(def.key.clone(), group.set.nodes));
        self.defs.push(def);
        self.defs.extend(group.set.defs);
    }

    /// Build the flat registry, surfacing duplicate keys as errors.
    fn into_registry(
        self,
        owner: &str,
    ) -> (IndexMap<SmolStr, FieldDefinition>, Vec<FieldNode>, Vec<SchemaError>) {
        let mut fields = IndexMap::with_capacity(self.defs.len());
        let mut errors = Vec::new();
        for def in self.defs {
            if fields.contains_key(&def.key) {
                errors.push(SchemaError::duplicate_field(owner, def.key.as_str()));
            } else {
                fields.insert(def.key.clone(), def);
            }
        }
        (fields, self.nodes, errors)
    }
}

/// Builder for the fields inside a repeater group or tab.
#[derive(Debug, Default)]
pub struct GroupBuilder {
    set: FieldSet,
}

impl GroupBuilder {
    /// Add a value field to this group.
    pub fn field(mut self, def: FieldDefinition) -> Self {
        self.set.push_leaf(def);
        self
    }

    /// Add a nested repeater to this group.
    pub fn repeater(mut self, key: impl Into<SmolStr>, f: impl FnOnce(Self) -> Self) -> Self {
        let key = key.into();
        let group = f(Self::default());
        self.set
            .push_group(FieldDefinition::repeater(key), group);
        self
    }
}

/// Fluent builder for a [`Brick`].
#[derive(Debug)]
pub struct BrickBuilder {
    key: SmolStr,
    mode: BrickMode,
    set: FieldSet,
}

impl BrickBuilder {
    /// Add a value field to the brick.
    pub fn field(mut self, def: FieldDefinition) -> Self {
        self.set.push_leaf(def);
        self
    }

    /// Add a repeater with its group fields.
    pub fn repeater(
        mut self,
        key: impl Into<SmolStr>,
        f: impl FnOnce(GroupBuilder) -> GroupBuilder,
    ) -> Self {
        let group = f(GroupBuilder::default());
        self.set
            .push_group(FieldDefinition::repeater(key.into()), group);
        self
    }

    /// Add a tab grouping; its fields flatten into the brick's table.
    pub fn tab(
        mut self,
        key: impl Into<SmolStr>,
        f: impl FnOnce(GroupBuilder) -> GroupBuilder,
    ) -> Self {
        let group = f(GroupBuilder::default());
        self.set.push_group(FieldDefinition::tab(key.into()), group);
        self
    }

    /// Finish the brick, validating keys and layout consistency.
    pub fn build(self) -> SchemaResult<Brick> {
        let (fields, layout, mut errors) = self.set.into_registry(&self.key);
        let brick = Brick {
            key: self.key,
            mode: self.mode,
            fields,
            layout,
        };
        validator::validate_brick(&brick, &mut errors);
        validator::finish(errors)?;
        Ok(brick)
    }
}

/// Fluent builder for a [`Collection`].
#[derive(Debug)]
pub struct CollectionBuilder {
    key: SmolStr,
    set: FieldSet,
    bricks: Vec<Brick>,
}

impl CollectionBuilder {
    /// Add a value field to the collection itself.
    pub fn field(mut self, def: FieldDefinition) -> Self {
        self.set.push_leaf(def);
        self
    }

    /// Add a repeater with its group fields.
    pub fn repeater(
        mut self,
        key: impl Into<SmolStr>,
        f: impl FnOnce(GroupBuilder) -> GroupBuilder,
    ) -> Self {
        let group = f(GroupBuilder::default());
        self.set
            .push_group(FieldDefinition::repeater(key.into()), group);
        self
    }

    /// Add a tab grouping; its fields flatten into the document-fields table.
    pub fn tab(
        mut self,
        key: impl Into<SmolStr>,
        f: impl FnOnce(GroupBuilder) -> GroupBuilder,
    ) -> Self {
        let group = f(GroupBuilder::default());
        self.set.push_group(FieldDefinition::tab(key.into()), group);
        self
    }

    /// Attach an already-built brick.
    pub fn brick(mut self, brick: Brick) -> Self {
        self.bricks.push(brick);
        self
    }

    /// Finish the collection, running full validation.
    pub fn build(self) -> SchemaResult<Collection> {
        let (fields, layout, mut errors) = self.set.into_registry(&self.key);
        let collection = Collection {
            key: self.key,
            fields,
            layout,
            bricks: self.bricks,
        };
        validator::validate_collection(&collection, &mut errors);
        validator::finish(errors)?;
        Ok(collection)
    }
}
