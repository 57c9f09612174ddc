//! The model arena and its queries.
//!
//! [`Model`] owns every entity in a single `IndexMap` keyed by [`XmiId`],
//! in document order. Entities never hold references to each other; all
//! relations are ids resolved through the model, so dangling ids from
//! inconsistent exports simply resolve to `None`.
//!
//! A [`Model`] is produced once per document by [`ModelBuilder::build`],
//! which validates the package tree, fills in the derived fields
//! (package path, stereotype, derived ids) and computes the reverse indices
//! (subtypes and associations per class). It is immutable afterwards.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

use indexmap::IndexMap;
use log::{debug, trace, warn};

use crate::{
    identifier::{XmiId, clean_id, derive_class_id},
    semantic::{
        Association, Attribute, Classification, Entity, Generalization, LinkRef, ModelError,
        NodeRef, Package,
    },
};

// =============================================================================
// Builder
// =============================================================================

/// Collects entities in document order and validates them into a [`Model`].
///
/// # Examples
///
/// ```
/// use umlmap_core::{
///     identifier::XmiId,
///     semantic::{ClassType, Classification, Entity, ModelBuilder, Package},
/// };
///
/// let root = XmiId::new("Root");
/// let stereotype = XmiId::new("Felles");
/// let class = XmiId::new("Person");
///
/// let mut builder = ModelBuilder::new(root);
/// builder.insert(Entity::Package(Package::new(root, "Model", None)));
/// builder.insert(Entity::Package(Package::new(stereotype, "Felles", Some(root))));
/// builder.insert(Entity::Classification(Classification::new(
///     class, "Person", Some(stereotype), "uml:Class", ClassType::MainClass,
/// )));
/// builder.package_mut(root).unwrap().push_package(stereotype);
/// builder.package_mut(stereotype).unwrap().push_class(class);
///
/// let model = builder.build().unwrap();
/// assert_eq!(model.stereotypes(), &[stereotype]);
/// assert_eq!(model.classification(class).unwrap().id(), "felles_person");
/// ```
#[derive(Debug)]
pub struct ModelBuilder {
    root: XmiId,
    entities: IndexMap<XmiId, Entity>,
}

impl ModelBuilder {
    /// Creates a builder for a model whose root package is `root`.
    pub fn new(root: XmiId) -> Self {
        Self {
            root,
            entities: IndexMap::new(),
        }
    }

    /// Inserts an entity. The first entity inserted under an id wins.
    ///
    /// Returns `false` if the id was already taken.
    pub fn insert(&mut self, entity: Entity) -> bool {
        let id = entity.xmi_id();
        if self.entities.contains_key(&id) {
            warn!(id:% = id, kind = entity.kind().name(); "Duplicate xmi:id ignored");
            return false;
        }
        self.entities.insert(id, entity);
        true
    }

    pub fn contains(&self, id: XmiId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Mutable access to a package, for appending children after insertion.
    pub fn package_mut(&mut self, id: XmiId) -> Option<&mut Package> {
        match self.entities.get_mut(&id) {
            Some(Entity::Package(p) | Entity::Stereotype(p)) => Some(p),
            _ => None,
        }
    }

    /// Mutable access to a classification, for appending members and generalizations.
    pub fn classification_mut(&mut self, id: XmiId) -> Option<&mut Classification> {
        match self.entities.get_mut(&id) {
            Some(Entity::Classification(c)) => Some(c),
            _ => None,
        }
    }

    /// Validates the package tree and computes all derived data.
    ///
    /// Packages directly below the root become stereotypes.
    ///
    /// # Errors
    ///
    /// - [`ModelError::MissingRoot`] if the root id is not a package.
    /// - [`ModelError::Orphan`] if a package or classification has no resolvable parent.
    /// - [`ModelError::ParentCycle`] if a parent chain loops.
    pub fn build(self) -> Result<Model, ModelError> {
        let root = self.root;
        match self.entities.get(&root) {
            Some(Entity::Package(p)) if p.parent().is_none() => {}
            _ => return Err(ModelError::MissingRoot(root)),
        }

        let mut entities: IndexMap<XmiId, Entity> = self
            .entities
            .into_iter()
            .map(|(id, entity)| match entity {
                Entity::Package(p) if p.parent() == Some(root) => (id, Entity::Stereotype(p)),
                other => (id, other),
            })
            .collect();

        let derived = derive_node_fields(&entities, root)?;
        for (id, fields) in derived {
            match entities.get_mut(&id) {
                Some(Entity::Stereotype(p) | Entity::Package(p)) => {
                    p.package_path = fields.package_path;
                    p.stereotype = fields.stereotype;
                }
                Some(Entity::Classification(c)) => {
                    c.package_path = fields.package_path;
                    c.stereotype = fields.stereotype;
                    c.id = fields.class_id;
                }
                _ => {}
            }
        }
        for entity in entities.values_mut() {
            if let Entity::Attribute(a) = entity {
                a.id = clean_id(a.name());
            }
        }

        report_dangling(&entities);

        let stereotypes = match entities.get(&root) {
            Some(Entity::Package(p)) => p
                .packages()
                .iter()
                .copied()
                .filter(|id| matches!(entities.get(id), Some(Entity::Stereotype(_))))
                .collect(),
            _ => Vec::new(),
        };

        let mut model = Model {
            entities,
            root,
            stereotypes,
            subtypes: HashMap::new(),
            associations: HashMap::new(),
            by_class_id: HashMap::new(),
            node_cache: RefCell::new(HashMap::new()),
        };
        model.index();

        debug!(
            entities = model.len(),
            stereotypes = model.stereotypes.len();
            "Model built"
        );
        Ok(model)
    }
}

struct DerivedFields {
    package_path: String,
    stereotype: Option<XmiId>,
    class_id: String,
}

/// Walks the parent chain of every node.
fn derive_node_fields(
    entities: &IndexMap<XmiId, Entity>,
    root: XmiId,
) -> Result<Vec<(XmiId, DerivedFields)>, ModelError> {
    let package = |id: XmiId| entities.get(&id).and_then(Entity::as_package);

    let mut derived = Vec::new();
    for (&id, entity) in entities {
        let Some(node) = entity.as_node() else {
            continue;
        };
        if id == root {
            continue;
        }

        // Ancestors from the immediate parent up to, but excluding, the root.
        let mut ancestors: Vec<&Package> = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut cursor = node.parent();
        loop {
            let Some(parent_id) = cursor else {
                return Err(ModelError::Orphan(id));
            };
            if parent_id == root {
                break;
            }
            if !seen.insert(parent_id) {
                return Err(ModelError::ParentCycle(id));
            }
            let parent = package(parent_id).ok_or(ModelError::Orphan(id))?;
            ancestors.push(parent);
            cursor = parent.parent();
        }

        let stereotype = match node {
            NodeRef::Stereotype(p) => Some(p.xmi_id()),
            _ => ancestors.last().map(|p| p.xmi_id()),
        };
        let package_path = ancestors
            .iter()
            .rev()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(".");
        let class_id = if node.is_classification() {
            let parent_name = node
                .parent()
                .and_then(package)
                .map(Package::name)
                .unwrap_or_default();
            derive_class_id(parent_name, node.name())
        } else {
            String::new()
        };

        derived.push((
            id,
            DerivedFields {
                package_path,
                stereotype,
                class_id,
            },
        ));
    }
    Ok(derived)
}

/// Logs every cross reference that does not resolve.
fn report_dangling(entities: &IndexMap<XmiId, Entity>) {
    let is_class = |id: XmiId| matches!(entities.get(&id), Some(Entity::Classification(_)));
    for entity in entities.values() {
        match entity {
            Entity::Generalization(g) => {
                for (role, id) in [("source", g.source()), ("target", g.target())] {
                    if !is_class(id) {
                        warn!(generalization:% = g.xmi_id(), role = role, id:% = id; "Dangling generalization reference");
                    }
                }
            }
            Entity::Association(a) => {
                for (role, id) in [("start", a.start()), ("end", a.end())] {
                    match id {
                        Some(id) if is_class(id) => {}
                        Some(id) => {
                            warn!(association:% = a.xmi_id(), role = role, id:% = id; "Dangling association reference")
                        }
                        None => {
                            warn!(association:% = a.xmi_id(), role = role; "Association end missing")
                        }
                    }
                }
            }
            Entity::Attribute(a) => {
                if let Some(type_ref) = a.type_ref().filter(|id| !entities.contains_key(id)) {
                    trace!(attribute:% = a.xmi_id(), type_ref:% = type_ref; "Attribute type outside the model");
                }
            }
            _ => {}
        }
    }
}

// =============================================================================
// Model
// =============================================================================

/// The immutable entity arena of one loaded document.
#[derive(Debug)]
pub struct Model {
    entities: IndexMap<XmiId, Entity>,
    root: XmiId,
    stereotypes: Vec<XmiId>,
    subtypes: HashMap<XmiId, Vec<XmiId>>,
    associations: HashMap<XmiId, Vec<XmiId>>,
    by_class_id: HashMap<String, XmiId>,
    node_cache: RefCell<HashMap<Option<XmiId>, Rc<[XmiId]>>>,
}

impl Model {
    fn index(&mut self) {
        for entity in self.entities.values() {
            match entity {
                Entity::Generalization(g) => {
                    if self.classification(g.source()).is_none()
                        || self.classification(g.target()).is_none()
                    {
                        continue;
                    }
                    let subs = self.subtypes.entry(g.target()).or_default();
                    if !subs.contains(&g.source()) {
                        subs.push(g.source());
                    }
                }
                Entity::Association(a) => {
                    let ends = [
                        (a.start(), a.target_role().name().is_some()),
                        (a.end(), a.source_role().name().is_some()),
                    ];
                    for (class, far_role_named) in ends {
                        let Some(class) = class.filter(|&c| self.classification(c).is_some())
                        else {
                            continue;
                        };
                        let list = self.associations.entry(class).or_default();
                        if far_role_named && !list.contains(&a.xmi_id()) {
                            list.push(a.xmi_id());
                        }
                    }
                }
                Entity::Classification(c) => {
                    if let Some(previous) = self.by_class_id.get(c.id()) {
                        debug!(id = c.id(), kept:% = previous, ignored:% = c.xmi_id(); "Duplicate derived class id");
                    } else {
                        self.by_class_id.insert(c.id().to_string(), c.xmi_id());
                    }
                }
                _ => {}
            }
        }
    }

    /// Number of entities, the root included.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All entities in document order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn contains(&self, id: XmiId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn root_id(&self) -> XmiId {
        self.root
    }

    /// The root package. Always present in a built model.
    pub fn root(&self) -> Option<&Package> {
        self.package(self.root)
    }

    /// Top-level stereotypes in document order.
    pub fn stereotypes(&self) -> &[XmiId] {
        &self.stereotypes
    }

    /// Position of a stereotype among [`Model::stereotypes`], used as palette index.
    pub fn stereotype_index(&self, stereotype: XmiId) -> Option<usize> {
        self.stereotypes.iter().position(|&s| s == stereotype)
    }

    pub fn entity(&self, id: XmiId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Looks up an entity by its raw `xmi:id` string.
    pub fn find_by_xmi_id(&self, raw: &str) -> Option<&Entity> {
        self.entity(XmiId::new(raw))
    }

    /// Looks up a classification by its derived id (e.g. `felles_person`).
    pub fn find_by_id(&self, id: &str) -> Option<&Classification> {
        self.by_class_id
            .get(id)
            .and_then(|&xmi_id| self.classification(xmi_id))
    }

    /// Returns the package or stereotype with the given id.
    pub fn package(&self, id: XmiId) -> Option<&Package> {
        self.entity(id).and_then(Entity::as_package)
    }

    pub fn classification(&self, id: XmiId) -> Option<&Classification> {
        self.entity(id).and_then(Entity::as_classification)
    }

    pub fn attribute(&self, id: XmiId) -> Option<&Attribute> {
        match self.entity(id) {
            Some(Entity::Attribute(a)) => Some(a),
            _ => None,
        }
    }

    pub fn association(&self, id: XmiId) -> Option<&Association> {
        match self.entity(id) {
            Some(Entity::Association(a)) => Some(a),
            _ => None,
        }
    }

    pub fn generalization(&self, id: XmiId) -> Option<&Generalization> {
        match self.entity(id) {
            Some(Entity::Generalization(g)) => Some(g),
            _ => None,
        }
    }

    /// Returns the entity as a diagram node.
    pub fn node(&self, id: XmiId) -> Option<NodeRef<'_>> {
        self.entity(id).and_then(Entity::as_node)
    }

    /// Resolved member attributes of a class; dangling member ids are skipped.
    pub fn members(&self, class: &Classification) -> Vec<&Attribute> {
        class
            .members()
            .iter()
            .filter_map(|&id| self.attribute(id))
            .collect()
    }

    /// Finds a member attribute of `class` by its derived id.
    pub fn find_member(&self, class: &Classification, member_id: &str) -> Option<&Attribute> {
        self.members(class).into_iter().find(|a| a.id() == member_id)
    }

    /// Resolves the direct supertype of a class.
    ///
    /// Returns `Ok(None)` when the class has no generalization or its target
    /// does not resolve.
    ///
    /// # Errors
    ///
    /// [`ModelError::MultipleSupertypes`] when the class owns more than one
    /// generalization.
    pub fn super_type(&self, class: &Classification) -> Result<Option<&Classification>, ModelError> {
        match class.generalizations() {
            [] => Ok(None),
            [single] => Ok(self
                .generalization(*single)
                .and_then(|g| self.classification(g.target()))),
            many => Err(ModelError::MultipleSupertypes {
                class: class.xmi_id(),
                count: many.len(),
            }),
        }
    }

    /// Direct subtypes of a class, de-duplicated, in document order.
    pub fn sub_types(&self, class: &Classification) -> Vec<&Classification> {
        self.subtypes
            .get(&class.xmi_id())
            .into_iter()
            .flatten()
            .filter_map(|&id| self.classification(id))
            .collect()
    }

    /// Associations in which the far end, seen from `class`, carries a role name.
    pub fn associations_of(&self, class: &Classification) -> Vec<&Association> {
        self.associations
            .get(&class.xmi_id())
            .into_iter()
            .flatten()
            .filter_map(|&id| self.association(id))
            .collect()
    }

    /// All classifications contained in a package, transitively.
    ///
    /// A package's own classes come first, followed by those of each child
    /// package in order.
    pub fn all_classes(&self, package: &Package) -> Vec<&Classification> {
        let mut out = Vec::new();
        self.collect_classes(package, &mut out);
        out
    }

    fn collect_classes<'a>(&'a self, package: &Package, out: &mut Vec<&'a Classification>) {
        out.extend(
            package
                .classes()
                .iter()
                .filter_map(|&id| self.classification(id)),
        );
        for &child in package.packages() {
            if let Some(child) = self.package(child) {
                self.collect_classes(child, out);
            }
        }
    }

    /// Returns `true` if `ancestor` is a strict ancestor of `node`.
    pub fn is_descendant(&self, node: XmiId, ancestor: XmiId) -> bool {
        let mut cursor = self.node(node).and_then(NodeRef::parent);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.package(id).and_then(Package::parent);
        }
        false
    }

    /// Returns the diagram nodes below `from_ancestor` (the whole model for
    /// `None`), the root excluded.
    ///
    /// Nodes are ordered by stereotype name descending, then by package path
    /// ascending; ties keep document order. The result is computed once per
    /// ancestor and shared afterwards.
    pub fn get_nodes(&self, from_ancestor: Option<XmiId>) -> Rc<[XmiId]> {
        if let Some(nodes) = self.node_cache.borrow().get(&from_ancestor) {
            return Rc::clone(nodes);
        }
        let nodes: Rc<[XmiId]> = self.sorted_nodes(from_ancestor).into();
        self.node_cache
            .borrow_mut()
            .insert(from_ancestor, Rc::clone(&nodes));
        nodes
    }

    fn sorted_nodes(&self, from_ancestor: Option<XmiId>) -> Vec<XmiId> {
        let stereotype_name = |node: NodeRef<'_>| {
            node.stereotype()
                .and_then(|s| self.package(s))
                .map(Package::name)
                .unwrap_or_default()
        };

        let mut nodes: Vec<NodeRef<'_>> = self
            .entities
            .values()
            .filter_map(Entity::as_node)
            .filter(|node| node.xmi_id() != self.root)
            .filter(|node| {
                from_ancestor.is_none_or(|ancestor| self.is_descendant(node.xmi_id(), ancestor))
            })
            .collect();
        nodes.sort_by(|a, b| {
            stereotype_name(*b)
                .cmp(stereotype_name(*a))
                .then_with(|| a.package_path().cmp(b.package_path()))
        });
        nodes.into_iter().map(NodeRef::xmi_id).collect()
    }

    /// Returns the generalizations and associations whose ends both resolve
    /// and at least one of which lies below `from_ancestor`.
    pub fn get_link_nodes(&self, from_ancestor: Option<XmiId>) -> Vec<LinkRef<'_>> {
        self.entities
            .values()
            .filter_map(|entity| match entity {
                Entity::Generalization(g) => Some(LinkRef::Generalization(g)),
                Entity::Association(a) => Some(LinkRef::Association(a)),
                _ => None,
            })
            .filter(|link| {
                let Some((source, target)) = link.endpoints() else {
                    return false;
                };
                if self.classification(source).is_none() || self.classification(target).is_none() {
                    return false;
                }
                from_ancestor.is_none_or(|ancestor| {
                    self.is_descendant(source, ancestor) || self.is_descendant(target, ancestor)
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{ClassType, Role};

    /// Small fluent helper mirroring what the document mapper does.
    struct Fixture {
        builder: ModelBuilder,
    }

    impl Fixture {
        fn new() -> Self {
            let root = XmiId::new("Root");
            let mut builder = ModelBuilder::new(root);
            builder.insert(Entity::Package(Package::new(root, "Model", None)));
            Self { builder }
        }

        fn package(mut self, id: &str, parent: &str) -> Self {
            let (id, parent) = (XmiId::new(id), XmiId::new(parent));
            let name = id.to_string();
            self.builder
                .insert(Entity::Package(Package::new(id, name, Some(parent))));
            self.builder.package_mut(parent).unwrap().push_package(id);
            self
        }

        fn class(mut self, id: &str, parent: &str) -> Self {
            let (id, parent) = (XmiId::new(id), XmiId::new(parent));
            let name = id.to_string();
            self.builder.insert(Entity::Classification(Classification::new(
                id,
                name,
                Some(parent),
                "uml:Class",
                ClassType::Class,
            )));
            self.builder.package_mut(parent).unwrap().push_class(id);
            self
        }

        fn generalization(mut self, id: &str, sub: &str, sup: &str) -> Self {
            let (id, sub) = (XmiId::new(id), XmiId::new(sub));
            self.builder.insert(Entity::Generalization(Generalization::new(
                id,
                sub,
                XmiId::new(sup),
            )));
            if let Some(class) = self.builder.classification_mut(sub) {
                class.push_generalization(id);
            }
            self
        }

        fn association(mut self, id: &str, start: &str, end: &str, roles: (Option<&str>, Option<&str>)) -> Self {
            let role = |name: Option<&str>| Role::new(name.map(String::from), None);
            self.builder.insert(Entity::Association(
                Association::new(XmiId::new(id), Some(XmiId::new(start)), Some(XmiId::new(end)))
                    .with_roles(role(roles.0), role(roles.1)),
            ));
            self
        }

        fn build(self) -> Model {
            self.builder.build().unwrap()
        }
    }

    fn id(raw: &str) -> XmiId {
        XmiId::new(raw)
    }

    fn names(model: &Model, ids: &[XmiId]) -> Vec<String> {
        ids.iter()
            .map(|&i| model.node(i).unwrap().name().to_string())
            .collect()
    }

    #[test]
    fn test_supertype_and_subtypes() {
        let model = Fixture::new()
            .package("A", "Root")
            .package("P", "A")
            .class("C1", "P")
            .class("C2", "P")
            .generalization("G", "C2", "C1")
            .build();

        let c1 = model.classification(id("C1")).unwrap();
        let c2 = model.classification(id("C2")).unwrap();

        let subs: Vec<XmiId> = model.sub_types(c1).iter().map(|c| c.xmi_id()).collect();
        assert_eq!(subs, vec![id("C2")]);
        assert_eq!(model.super_type(c2).unwrap().map(|c| c.xmi_id()), Some(id("C1")));
        assert!(model.super_type(c1).unwrap().is_none());

        let nodes = model.get_nodes(None);
        let c1_pos = nodes.iter().position(|&n| n == id("C1")).unwrap();
        let c2_pos = nodes.iter().position(|&n| n == id("C2")).unwrap();
        assert_eq!(c2_pos, c1_pos + 1);
        assert_eq!(c1.stereotype(), Some(id("A")));
        assert_eq!(c1.package_path(), "A.P");
    }

    #[test]
    fn test_multiple_supertypes_fail_fast() {
        let model = Fixture::new()
            .package("S", "Root")
            .class("Base1", "S")
            .class("Base2", "S")
            .class("Child", "S")
            .generalization("G1", "Child", "Base1")
            .generalization("G2", "Child", "Base2")
            .build();

        let child = model.classification(id("Child")).unwrap();
        assert_eq!(
            model.super_type(child).unwrap_err(),
            ModelError::MultipleSupertypes {
                class: id("Child"),
                count: 2
            }
        );
    }

    #[test]
    fn test_dangling_supertype_is_absent() {
        let model = Fixture::new()
            .package("S", "Root")
            .class("Lonely", "S")
            .generalization("G", "Lonely", "Missing")
            .build();

        let lonely = model.classification(id("Lonely")).unwrap();
        assert!(model.super_type(lonely).unwrap().is_none());
        assert!(model.get_link_nodes(None).is_empty());
    }

    #[test]
    fn test_subtypes_are_deduplicated() {
        let mut fixture = Fixture::new()
            .package("S", "Root")
            .class("Base", "S")
            .class("Sub", "S")
            .generalization("G1", "Sub", "Base");
        // Not attached to `Sub`, so only the reverse index sees it.
        fixture.builder.insert(Entity::Generalization(Generalization::new(
            id("G2"),
            id("Sub"),
            id("Base"),
        )));
        let model = fixture.build();

        let base = model.classification(id("Base")).unwrap();
        assert_eq!(model.sub_types(base).len(), 1);
    }

    #[test]
    fn test_stereotype_sort_is_descending() {
        let model = Fixture::new()
            .package("Alfa", "Root")
            .class("InAlfa", "Alfa")
            .package("Charlie", "Root")
            .class("InCharlie", "Charlie")
            .package("Bravo", "Root")
            .class("InBravo", "Bravo")
            .build();

        let nodes = model.get_nodes(None);
        assert_eq!(
            names(&model, &nodes),
            vec!["Charlie", "InCharlie", "Bravo", "InBravo", "Alfa", "InAlfa"]
        );
    }

    #[test]
    fn test_package_path_orders_within_stereotype() {
        let model = Fixture::new()
            .package("S", "Root")
            .package("Zulu", "S")
            .class("DeepClass", "Zulu")
            .class("TopClass", "S")
            .build();

        let nodes = model.get_nodes(None);
        // "" < "S" < "S.Zulu"
        assert_eq!(names(&model, &nodes), vec!["S", "Zulu", "TopClass", "DeepClass"]);
    }

    #[test]
    fn test_get_nodes_is_cached_and_stable() {
        let model = Fixture::new()
            .package("A", "Root")
            .class("X", "A")
            .class("Y", "A")
            .build();

        let first = model.get_nodes(None);
        let second = model.get_nodes(None);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(&*first, &*second);
    }

    #[test]
    fn test_get_nodes_from_ancestor() {
        let model = Fixture::new()
            .package("A", "Root")
            .package("P", "A")
            .class("InP", "P")
            .class("InA", "A")
            .package("B", "Root")
            .class("InB", "B")
            .build();

        let below_a = model.get_nodes(Some(id("A")));
        assert_eq!(names(&model, &below_a), vec!["P", "InA", "InP"]);
        assert!(model.get_nodes(Some(id("InB"))).is_empty());
    }

    #[test]
    fn test_link_nodes_need_one_end_in_subtree() {
        let model = Fixture::new()
            .package("A", "Root")
            .class("A1", "A")
            .class("A2", "A")
            .package("B", "Root")
            .class("B1", "B")
            .class("B2", "B")
            .generalization("GA", "A2", "A1")
            .association("AB", "A1", "B1", (None, Some("b")))
            .association("BB", "B1", "B2", (None, Some("other")))
            .build();

        assert_eq!(model.get_link_nodes(None).len(), 3);
        let below_a: Vec<XmiId> = model
            .get_link_nodes(Some(id("A")))
            .into_iter()
            .map(LinkRef::xmi_id)
            .collect();
        assert_eq!(below_a, vec![id("GA"), id("AB")]);
    }

    #[test]
    fn test_associations_require_far_role_name() {
        let model = Fixture::new()
            .package("S", "Root")
            .class("Owner", "S")
            .class("Item", "S")
            .association("Named", "Owner", "Item", (None, Some("items")))
            .association("Unnamed", "Owner", "Item", (None, None))
            .build();

        let owner = model.classification(id("Owner")).unwrap();
        let item = model.classification(id("Item")).unwrap();
        let owner_assocs: Vec<XmiId> = model
            .associations_of(owner)
            .iter()
            .map(|a| a.xmi_id())
            .collect();
        assert_eq!(owner_assocs, vec![id("Named")]);
        // Seen from Item the far role is the unnamed source role.
        assert!(model.associations_of(item).is_empty());
    }

    #[test]
    fn test_all_classes_is_transitive() {
        let model = Fixture::new()
            .package("S", "Root")
            .class("Top", "S")
            .package("Inner", "S")
            .class("Deep", "Inner")
            .build();

        let stereotype = model.package(id("S")).unwrap();
        let names: Vec<&str> = model
            .all_classes(stereotype)
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["Top", "Deep"]);
    }

    #[test]
    fn test_derived_ids_and_lookup() {
        let model = Fixture::new()
            .package("Felles", "Root")
            .class("Kontaktinformasjon", "Felles")
            .build();

        let class = model.find_by_id("felles_kontaktinformasjon").unwrap();
        assert_eq!(class.name(), "Kontaktinformasjon");
        assert!(model.find_by_xmi_id("Kontaktinformasjon").is_some());
        assert!(model.find_by_xmi_id("Nope").is_none());
        assert_eq!(model.stereotype_index(id("Felles")), Some(0));
    }

    #[test]
    fn test_find_member() {
        let mut fixture = Fixture::new().package("S", "Root").class("Person", "S");
        let attr = id("Person.fodselsnummer");
        fixture.builder.insert(Entity::Attribute(Attribute::new(
            attr,
            "Fødselsnummer",
            id("Person"),
        )));
        fixture
            .builder
            .classification_mut(id("Person"))
            .unwrap()
            .push_member(attr);
        let model = fixture.build();

        let person = model.classification(id("Person")).unwrap();
        assert_eq!(
            model.find_member(person, "fodselsnummer").map(|a| a.xmi_id()),
            Some(attr)
        );
        assert!(model.find_member(person, "navn").is_none());
    }

    #[test]
    fn test_identity_stability() {
        let model = Fixture::new()
            .package("A", "Root")
            .package("P", "A")
            .class("C1", "P")
            .class("C2", "P")
            .generalization("G", "C2", "C1")
            .generalization("Dangling", "C1", "Nowhere")
            .association("Assoc", "C1", "C2", (Some("from"), Some("to")))
            .build();

        for entity in model.entities() {
            let same = model.entity(entity.xmi_id()).unwrap();
            assert!(std::ptr::eq(same, entity));

            if let Some(node) = entity.as_node() {
                for relation in [node.parent(), node.stereotype()].into_iter().flatten() {
                    assert!(model.contains(relation));
                }
            }
        }
    }

    #[test]
    fn test_parent_cycle_is_rejected() {
        let root = id("Root");
        let mut builder = ModelBuilder::new(root);
        builder.insert(Entity::Package(Package::new(root, "Model", None)));
        builder.insert(Entity::Package(Package::new(id("Loop1"), "Loop1", Some(id("Loop2")))));
        builder.insert(Entity::Package(Package::new(id("Loop2"), "Loop2", Some(id("Loop1")))));

        assert_eq!(builder.build().unwrap_err(), ModelError::ParentCycle(id("Loop1")));
    }

    #[test]
    fn test_missing_root_and_orphans() {
        let builder = ModelBuilder::new(id("NoSuchRoot"));
        assert_eq!(builder.build().unwrap_err(), ModelError::MissingRoot(id("NoSuchRoot")));

        let root = id("Root");
        let mut builder = ModelBuilder::new(root);
        builder.insert(Entity::Package(Package::new(root, "Model", None)));
        builder.insert(Entity::Package(Package::new(id("Stray"), "Stray", None)));
        assert_eq!(builder.build().unwrap_err(), ModelError::Orphan(id("Stray")));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let root = id("Root");
        let mut builder = ModelBuilder::new(root);
        assert!(builder.insert(Entity::Package(Package::new(root, "Model", None))));
        assert!(!builder.insert(Entity::Package(Package::new(root, "Other", None))));
        let model = builder.build().unwrap();
        assert_eq!(model.root().unwrap().name(), "Model");
    }
}
