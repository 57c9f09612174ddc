//! Entity types of the UML model arena.
//!
//! Every entity is stored exactly once in [`Model`](super::Model). Relations
//! between entities (parent package, members, generalization targets,
//! association ends) are [`XmiId`]s resolved through the model on access, so
//! cycles such as mutual associations need no shared ownership.

use crate::{identifier::XmiId, semantic::ClassType};

/// Discriminant of [`Entity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Stereotype,
    Package,
    Classification,
    Attribute,
    Association,
    Generalization,
}

impl EntityKind {
    /// Returns the lower-case name of this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Stereotype => "stereotype",
            Self::Package => "package",
            Self::Classification => "classification",
            Self::Attribute => "attribute",
            Self::Association => "association",
            Self::Generalization => "generalization",
        }
    }
}

/// A model entity.
///
/// A stereotype is a top-level package and shares the [`Package`] payload.
#[derive(Debug, Clone)]
pub enum Entity {
    Stereotype(Package),
    Package(Package),
    Classification(Classification),
    Attribute(Attribute),
    Association(Association),
    Generalization(Generalization),
}

impl Entity {
    /// Returns the explicit type tag of this entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Stereotype(_) => EntityKind::Stereotype,
            Self::Package(_) => EntityKind::Package,
            Self::Classification(_) => EntityKind::Classification,
            Self::Attribute(_) => EntityKind::Attribute,
            Self::Association(_) => EntityKind::Association,
            Self::Generalization(_) => EntityKind::Generalization,
        }
    }

    pub fn xmi_id(&self) -> XmiId {
        match self {
            Self::Stereotype(p) | Self::Package(p) => p.xmi_id,
            Self::Classification(c) => c.xmi_id,
            Self::Attribute(a) => a.xmi_id,
            Self::Association(a) => a.xmi_id,
            Self::Generalization(g) => g.xmi_id,
        }
    }

    /// Returns the display name, if the entity has one.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Stereotype(p) | Self::Package(p) => Some(&p.name),
            Self::Classification(c) => Some(&c.name),
            Self::Attribute(a) => Some(&a.name),
            Self::Association(a) => a.name.as_deref(),
            Self::Generalization(_) => None,
        }
    }

    /// Returns the package payload for packages and stereotypes.
    pub fn as_package(&self) -> Option<&Package> {
        match self {
            Self::Stereotype(p) | Self::Package(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_classification(&self) -> Option<&Classification> {
        match self {
            Self::Classification(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the entity as a layout/render node, if it is one.
    pub fn as_node(&self) -> Option<NodeRef<'_>> {
        match self {
            Self::Stereotype(p) => Some(NodeRef::Stereotype(p)),
            Self::Package(p) => Some(NodeRef::Package(p)),
            Self::Classification(c) => Some(NodeRef::Classification(c)),
            _ => None,
        }
    }
}

/// Borrowed view over the entities that are positioned in the diagram.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Stereotype(&'a Package),
    Package(&'a Package),
    Classification(&'a Classification),
}

impl<'a> NodeRef<'a> {
    pub fn xmi_id(self) -> XmiId {
        match self {
            Self::Stereotype(p) | Self::Package(p) => p.xmi_id,
            Self::Classification(c) => c.xmi_id,
        }
    }

    pub fn name(self) -> &'a str {
        match self {
            Self::Stereotype(p) | Self::Package(p) => &p.name,
            Self::Classification(c) => &c.name,
        }
    }

    /// Returns the owning package, `None` only for the model root.
    pub fn parent(self) -> Option<XmiId> {
        match self {
            Self::Stereotype(p) | Self::Package(p) => p.parent,
            Self::Classification(c) => c.parent,
        }
    }

    /// Returns the nearest enclosing stereotype (a stereotype is its own).
    pub fn stereotype(self) -> Option<XmiId> {
        match self {
            Self::Stereotype(p) | Self::Package(p) => p.stereotype,
            Self::Classification(c) => c.stereotype,
        }
    }

    /// Dot-separated names of the ancestors below the model root.
    pub fn package_path(self) -> &'a str {
        match self {
            Self::Stereotype(p) | Self::Package(p) => &p.package_path,
            Self::Classification(c) => &c.package_path,
        }
    }

    pub fn is_classification(self) -> bool {
        matches!(self, Self::Classification(_))
    }
}

/// Borrowed view over the entities drawn as edges.
#[derive(Debug, Clone, Copy)]
pub enum LinkRef<'a> {
    Generalization(&'a Generalization),
    Association(&'a Association),
}

impl LinkRef<'_> {
    pub fn xmi_id(self) -> XmiId {
        match self {
            Self::Generalization(g) => g.xmi_id,
            Self::Association(a) => a.xmi_id,
        }
    }

    /// Returns `(source, target)`; for generalizations that is (subtype, supertype).
    pub fn endpoints(self) -> Option<(XmiId, XmiId)> {
        match self {
            Self::Generalization(g) => Some((g.source, g.target)),
            Self::Association(a) => a.start.zip(a.end),
        }
    }
}

/// A package, a stereotype, or the model root.
#[derive(Debug, Clone)]
pub struct Package {
    xmi_id: XmiId,
    name: String,
    parent: Option<XmiId>,
    packages: Vec<XmiId>,
    classes: Vec<XmiId>,
    documentation: String,
    pub(crate) stereotype: Option<XmiId>,
    pub(crate) package_path: String,
}

impl Package {
    pub fn new(xmi_id: XmiId, name: impl Into<String>, parent: Option<XmiId>) -> Self {
        Self {
            xmi_id,
            name: name.into(),
            parent,
            packages: Vec::new(),
            classes: Vec::new(),
            documentation: String::new(),
            stereotype: None,
            package_path: String::new(),
        }
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    /// Appends a child package id.
    pub fn push_package(&mut self, id: XmiId) {
        self.packages.push(id);
    }

    /// Appends a child classification id.
    pub fn push_class(&mut self, id: XmiId) {
        self.classes.push(id);
    }

    pub fn xmi_id(&self) -> XmiId {
        self.xmi_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<XmiId> {
        self.parent
    }

    /// Child packages in document order.
    pub fn packages(&self) -> &[XmiId] {
        &self.packages
    }

    /// Directly contained classifications in document order.
    pub fn classes(&self) -> &[XmiId] {
        &self.classes
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    pub fn stereotype(&self) -> Option<XmiId> {
        self.stereotype
    }

    pub fn package_path(&self) -> &str {
        &self.package_path
    }
}

/// A UML class, datatype, enumeration or code list.
#[derive(Debug, Clone)]
pub struct Classification {
    xmi_id: XmiId,
    name: String,
    parent: Option<XmiId>,
    xmi_type: String,
    class_type: ClassType,
    is_abstract: bool,
    members: Vec<XmiId>,
    generalizations: Vec<XmiId>,
    deprecated: Option<String>,
    documentation: String,
    pub(crate) id: String,
    pub(crate) stereotype: Option<XmiId>,
    pub(crate) package_path: String,
}

impl Classification {
    pub fn new(
        xmi_id: XmiId,
        name: impl Into<String>,
        parent: Option<XmiId>,
        xmi_type: impl Into<String>,
        class_type: ClassType,
    ) -> Self {
        Self {
            xmi_id,
            name: name.into(),
            parent,
            xmi_type: xmi_type.into(),
            class_type,
            is_abstract: false,
            members: Vec::new(),
            generalizations: Vec::new(),
            deprecated: None,
            documentation: String::new(),
            id: String::new(),
            stereotype: None,
            package_path: String::new(),
        }
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    /// Marks the class deprecated with the given explanation (may be empty).
    pub fn with_deprecated(mut self, description: impl Into<String>) -> Self {
        self.deprecated = Some(description.into());
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    /// Appends a member attribute id.
    pub fn push_member(&mut self, id: XmiId) {
        self.members.push(id);
    }

    /// Appends an owned generalization id.
    pub fn push_generalization(&mut self, id: XmiId) {
        self.generalizations.push(id);
    }

    pub fn xmi_id(&self) -> XmiId {
        self.xmi_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<XmiId> {
        self.parent
    }

    /// The raw `xmi:type`, e.g. `uml:Class`.
    pub fn xmi_type(&self) -> &str {
        &self.xmi_type
    }

    pub fn class_type(&self) -> &ClassType {
        &self.class_type
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Member attribute ids in document order.
    pub fn members(&self) -> &[XmiId] {
        &self.members
    }

    /// Ids of the generalizations this class owns (normally zero or one).
    pub fn generalizations(&self) -> &[XmiId] {
        &self.generalizations
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecated.is_some()
    }

    pub fn deprecated_description(&self) -> Option<&str> {
        self.deprecated.as_deref()
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// First line of the documentation.
    pub fn documentation_header(&self) -> &str {
        crate::documentation::header(&self.documentation)
    }

    /// Everything after the first line of the documentation.
    pub fn documentation_body(&self) -> &str {
        crate::documentation::body(&self.documentation)
    }

    /// The derived, human-readable id (see [`derive_class_id`](crate::identifier::derive_class_id)).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stereotype(&self) -> Option<XmiId> {
        self.stereotype
    }

    pub fn package_path(&self) -> &str {
        &self.package_path
    }
}

/// A member of a classification.
#[derive(Debug, Clone)]
pub struct Attribute {
    xmi_id: XmiId,
    name: String,
    owner: XmiId,
    type_name: Option<String>,
    type_ref: Option<XmiId>,
    lower: Option<String>,
    upper: Option<String>,
    association: Option<XmiId>,
    documentation: String,
    pub(crate) id: String,
}

impl Attribute {
    pub fn new(xmi_id: XmiId, name: impl Into<String>, owner: XmiId) -> Self {
        Self {
            xmi_id,
            name: name.into(),
            owner,
            type_name: None,
            type_ref: None,
            lower: None,
            upper: None,
            association: None,
            documentation: String::new(),
            id: String::new(),
        }
    }

    /// Sets the declared type text.
    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Sets the raw reference to the classification used as type.
    pub fn with_type_ref(mut self, type_ref: XmiId) -> Self {
        self.type_ref = Some(type_ref);
        self
    }

    pub fn with_multiplicity(mut self, lower: Option<String>, upper: Option<String>) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    pub fn with_association(mut self, association: XmiId) -> Self {
        self.association = Some(association);
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    pub fn xmi_id(&self) -> XmiId {
        self.xmi_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning classification.
    pub fn owner(&self) -> XmiId {
        self.owner
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn type_ref(&self) -> Option<XmiId> {
        self.type_ref
    }

    pub fn association(&self) -> Option<XmiId> {
        self.association
    }

    /// Multiplicity rendered as `lower..upper`, `None` when both are absent.
    pub fn multiplicity(&self) -> Option<String> {
        match (&self.lower, &self.upper) {
            (None, None) => None,
            (Some(lower), Some(upper)) if lower == upper => Some(lower.clone()),
            (lower, upper) => Some(format!(
                "{}..{}",
                lower.as_deref().unwrap_or("0"),
                upper.as_deref().unwrap_or("*")
            )),
        }
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// The attribute id used as URL fragment, derived from its name.
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// An "is-a" link from a subtype (`source`) to its supertype (`target`).
#[derive(Debug, Clone)]
pub struct Generalization {
    xmi_id: XmiId,
    source: XmiId,
    target: XmiId,
}

impl Generalization {
    pub fn new(xmi_id: XmiId, source: XmiId, target: XmiId) -> Self {
        Self {
            xmi_id,
            source,
            target,
        }
    }

    pub fn xmi_id(&self) -> XmiId {
        self.xmi_id
    }

    /// The subtype.
    pub fn source(&self) -> XmiId {
        self.source
    }

    /// The supertype.
    pub fn target(&self) -> XmiId {
        self.target
    }
}

/// One labeled end of an association.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Role {
    name: Option<String>,
    multiplicity: Option<String>,
}

impl Role {
    /// Creates a role; empty names are treated as absent.
    pub fn new(name: Option<String>, multiplicity: Option<String>) -> Self {
        Self {
            name: name.filter(|n| !n.trim().is_empty()),
            multiplicity: multiplicity.filter(|m| !m.trim().is_empty()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn multiplicity(&self) -> Option<&str> {
        self.multiplicity.as_deref()
    }
}

/// A role-labeled link between two classifications.
#[derive(Debug, Clone)]
pub struct Association {
    xmi_id: XmiId,
    name: Option<String>,
    start: Option<XmiId>,
    end: Option<XmiId>,
    source_role: Role,
    target_role: Role,
    documentation: String,
}

impl Association {
    pub fn new(xmi_id: XmiId, start: Option<XmiId>, end: Option<XmiId>) -> Self {
        Self {
            xmi_id,
            name: None,
            start,
            end,
            source_role: Role::default(),
            target_role: Role::default(),
            documentation: String::new(),
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name.filter(|n| !n.is_empty());
        self
    }

    pub fn with_roles(mut self, source_role: Role, target_role: Role) -> Self {
        self.source_role = source_role;
        self.target_role = target_role;
        self
    }

    pub fn with_documentation(mut self, documentation: impl Into<String>) -> Self {
        self.documentation = documentation.into();
        self
    }

    pub fn xmi_id(&self) -> XmiId {
        self.xmi_id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The classification at the source end.
    pub fn start(&self) -> Option<XmiId> {
        self.start
    }

    /// The classification at the target end.
    pub fn end(&self) -> Option<XmiId> {
        self.end
    }

    pub fn source_role(&self) -> &Role {
        &self.source_role
    }

    pub fn target_role(&self) -> &Role {
        &self.target_role
    }

    pub fn documentation(&self) -> &str {
        &self.documentation
    }

    /// Returns the far end of the association as seen from `class`.
    ///
    /// From the start class the far end is the target role; from the end
    /// class it is the source role.
    pub fn end_for(&self, class: XmiId) -> Option<AssociationEnd<'_>> {
        if self.start == Some(class) {
            Some(AssociationEnd {
                role: &self.target_role,
                class: self.end,
            })
        } else if self.end == Some(class) {
            Some(AssociationEnd {
                role: &self.source_role,
                class: self.start,
            })
        } else {
            None
        }
    }
}

/// The far end of an association relative to one of its classes.
#[derive(Debug, Clone, Copy)]
pub struct AssociationEnd<'a> {
    role: &'a Role,
    class: Option<XmiId>,
}

impl<'a> AssociationEnd<'a> {
    pub fn role(&self) -> &'a Role {
        self.role
    }

    /// The classification at the far end, unresolved.
    pub fn class(&self) -> Option<XmiId> {
        self.class
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_dispatch() {
        let pkg = Entity::Stereotype(Package::new(XmiId::new("S"), "Felles", None));
        assert_eq!(pkg.kind(), EntityKind::Stereotype);
        assert_eq!(pkg.name(), Some("Felles"));
        assert!(pkg.as_package().is_some());
        assert!(matches!(pkg.as_node(), Some(NodeRef::Stereotype(_))));

        let gen_ = Entity::Generalization(Generalization::new(
            XmiId::new("G"),
            XmiId::new("A"),
            XmiId::new("B"),
        ));
        assert_eq!(gen_.kind().name(), "generalization");
        assert!(gen_.name().is_none());
        assert!(gen_.as_node().is_none());
    }

    #[test]
    fn test_multiplicity() {
        let attr = |lower: Option<&str>, upper: Option<&str>| {
            Attribute::new(XmiId::new("a"), "a", XmiId::new("o"))
                .with_multiplicity(lower.map(String::from), upper.map(String::from))
                .multiplicity()
        };

        assert_eq!(attr(None, None), None);
        assert_eq!(attr(Some("1"), Some("1")), Some("1".to_string()));
        assert_eq!(attr(Some("0"), Some("*")), Some("0..*".to_string()));
        assert_eq!(attr(None, Some("1")), Some("0..1".to_string()));
    }

    #[test]
    fn test_role_ignores_blank_names() {
        let role = Role::new(Some("  ".to_string()), Some("0..1".to_string()));
        assert!(role.name().is_none());
        assert_eq!(role.multiplicity(), Some("0..1"));
    }

    #[test]
    fn test_association_end_for() {
        let (a, b) = (XmiId::new("ClassA"), XmiId::new("ClassB"));
        let assoc = Association::new(XmiId::new("Assoc"), Some(a), Some(b)).with_roles(
            Role::new(Some("owner".to_string()), None),
            Role::new(Some("items".to_string()), None),
        );

        let from_a = assoc.end_for(a).unwrap();
        assert_eq!(from_a.role().name(), Some("items"));
        assert_eq!(from_a.class(), Some(b));

        let from_b = assoc.end_for(b).unwrap();
        assert_eq!(from_b.role().name(), Some("owner"));
        assert_eq!(from_b.class(), Some(a));

        assert!(assoc.end_for(XmiId::new("Unrelated")).is_none());
    }
}
