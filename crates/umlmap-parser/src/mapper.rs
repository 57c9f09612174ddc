//! Recursive descent from an XMI JSON tree to the model arena.
//!
//! The UML part of the document (`uml:Model`) carries the package tree and
//! the structural relations. Enterprise Architect stores everything else
//! (documentation, stereotypes, tagged values, connector roles) in a
//! separate `xmi:Extension` section keyed by `xmi:idref`. The mapper indexes
//! the extension once and joins it while descending the package tree.
//!
//! Cross references (generalization targets, association ends, attribute
//! types) are stored as raw ids; they are resolved by the model on access.

use std::{borrow::Cow, collections::HashMap};

use log::debug;
use serde_json::Value;
use umlmap_core::{
    documentation,
    identifier::XmiId,
    semantic::{
        Association, Attribute, ClassType, Classification, Entity, Generalization, Model,
        ModelBuilder, Package, Role,
    },
};

use crate::{
    error::MapError,
    normalize::{as_sequence, attr, children, first_child, idref, non_empty_attr},
};

const PACKAGE: &str = "uml:Package";
const ASSOCIATION: &str = "uml:Association";
const CLASSIFIERS: [&str; 4] = ["uml:Class", "uml:DataType", "uml:Enumeration", "uml:Interface"];

/// Tag name marking a class as deprecated.
const DEPRECATED_TAG: &str = "DEPRECATED";

#[derive(Default)]
struct Counts {
    packages: usize,
    classes: usize,
    attributes: usize,
    generalizations: usize,
    associations: usize,
    skipped: usize,
}

pub(crate) struct Mapper<'a> {
    builder: ModelBuilder,
    elements: HashMap<Cow<'a, str>, &'a Value>,
    connectors: HashMap<Cow<'a, str>, &'a Value>,
    next_anonymous: usize,
    counts: Counts,
}

impl<'a> Mapper<'a> {
    /// Maps a whole document.
    pub(crate) fn map(doc: &'a Value) -> Result<Model, MapError> {
        let xmi = ["xmi:XMI", "XMI"]
            .iter()
            .find_map(|key| first_child(doc, key))
            .unwrap_or(doc);
        let model = find_model(xmi).ok_or(MapError::MissingModel)?;

        let extension = first_child(xmi, "xmi:Extension");
        let elements = index_extension(extension, "elements", "element");
        let connectors = index_extension(extension, "connectors", "connector");
        debug!(
            elements = elements.len(),
            connectors = connectors.len();
            "Extension indexed"
        );

        // An export of a single root package uses that package as root.
        let top = children(model, "packagedElement");
        let root_element = match top.as_slice() {
            [only] if xmi_type(only).as_deref() == Some(PACKAGE) => *only,
            _ => model,
        };

        let mut next_anonymous = 0;
        let root = next_id(root_element, &mut next_anonymous);
        let mut mapper = Self {
            builder: ModelBuilder::new(root),
            elements,
            connectors,
            next_anonymous,
            counts: Counts::default(),
        };

        let name = attr(root_element, "name").unwrap_or(Cow::Borrowed("Model"));
        let root_package =
            Package::new(root, &*name, None).with_documentation(mapper.documentation(root));
        mapper.builder.insert(Entity::Package(root_package));
        mapper.descend(root_element, root);

        let counts = &mapper.counts;
        debug!(
            packages = counts.packages,
            classes = counts.classes,
            attributes = counts.attributes,
            generalizations = counts.generalizations,
            associations = counts.associations,
            skipped = counts.skipped;
            "Document mapped"
        );

        Ok(mapper.builder.build()?)
    }

    fn descend(&mut self, element: &'a Value, parent: XmiId) {
        for child in children(element, "packagedElement") {
            match xmi_type(child).as_deref() {
                Some(PACKAGE) => self.map_package(child, parent),
                Some(ty) if CLASSIFIERS.contains(&ty) => self.map_classification(child, parent),
                Some(ASSOCIATION) => self.map_association(child),
                other => {
                    self.counts.skipped += 1;
                    debug!(xmi_type = other.unwrap_or("<none>"); "Skipping packaged element");
                }
            }
        }
    }

    fn map_package(&mut self, element: &'a Value, parent: XmiId) {
        let id = self.element_id(element);
        let name = attr(element, "name").unwrap_or_default();
        let package =
            Package::new(id, &*name, Some(parent)).with_documentation(self.documentation(id));

        if !self.builder.insert(Entity::Package(package)) {
            return;
        }
        if let Some(parent) = self.builder.package_mut(parent) {
            parent.push_package(id);
        }
        self.counts.packages += 1;
        self.descend(element, id);
    }

    fn map_classification(&mut self, element: &'a Value, parent: XmiId) {
        let id = self.element_id(element);
        let name = attr(element, "name").unwrap_or_default();
        let xmi_type = xmi_type(element).unwrap_or_default();

        let extension = self.extension_of(id);
        let properties = extension.map(|ext| children(ext, "properties")).unwrap_or_default();
        let property = |key: &str| properties.iter().find_map(|p| non_empty_attr(p, key));

        let is_abstract = attr(element, "isAbstract")
            .or_else(|| property("isAbstract"))
            .is_some_and(|v| v == "true");
        let stereotype = property("stereotype");
        let s_type = property("sType");
        let class_type = ClassType::derive(
            is_abstract,
            stereotype.as_deref(),
            s_type.as_deref(),
            &xmi_type,
            !properties.is_empty(),
        );

        let mut class = Classification::new(id, &*name, Some(parent), &*xmi_type, class_type)
            .with_abstract(is_abstract)
            .with_documentation(self.documentation(id));
        if let Some(description) = extension.and_then(deprecation) {
            class = class.with_deprecated(description);
        }

        if !self.builder.insert(Entity::Classification(class)) {
            return;
        }
        if let Some(parent) = self.builder.package_mut(parent) {
            parent.push_class(id);
        }
        self.counts.classes += 1;

        let extension_attributes = extension
            .map(|ext| {
                children(ext, "attributes")
                    .into_iter()
                    .flat_map(|group| children(group, "attribute"))
                    .filter_map(|a| non_empty_attr(a, "xmi:idref").map(|r| (r, a)))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        for key in ["ownedAttribute", "ownedLiteral"] {
            for member in children(element, key) {
                self.map_attribute(member, id, &extension_attributes);
            }
        }
        for generalization in children(element, "generalization") {
            self.map_generalization(generalization, id);
        }
    }

    fn map_attribute(
        &mut self,
        element: &'a Value,
        owner: XmiId,
        extension_attributes: &HashMap<Cow<'a, str>, &'a Value>,
    ) {
        let id = self.element_id(element);
        let name = attr(element, "name").unwrap_or_default();
        let extension = extension_attributes.get(id.as_string().as_str()).copied();

        let mut attribute = Attribute::new(id, &*name, owner);

        let declared_type = extension
            .and_then(|ext| first_child(ext, "properties"))
            .and_then(|p| non_empty_attr(p, "type"));
        if let Some(type_name) = declared_type {
            attribute = attribute.with_type_name(&*type_name);
        }
        if let Some(type_ref) = idref(element, "type") {
            attribute = attribute.with_type_ref(XmiId::new(&type_ref));
        }
        if let Some(association) = non_empty_attr(element, "association") {
            attribute = attribute.with_association(XmiId::new(&association));
        }

        let bound = |value_key: &str, bounds_key: &str| {
            first_child(element, value_key)
                .and_then(|v| non_empty_attr(v, "value"))
                .or_else(|| {
                    extension
                        .and_then(|ext| first_child(ext, "bounds"))
                        .and_then(|b| non_empty_attr(b, bounds_key))
                })
                .map(Cow::into_owned)
        };
        attribute = attribute.with_multiplicity(bound("lowerValue", "lower"), bound("upperValue", "upper"));

        let notes = extension
            .and_then(|ext| first_child(ext, "documentation"))
            .and_then(|d| attr(d, "value"))
            .or_else(|| first_child(element, "ownedComment").and_then(|c| attr(c, "body")));
        if let Some(notes) = notes {
            attribute = attribute.with_documentation(documentation::clean(&notes));
        }

        if self.builder.insert(Entity::Attribute(attribute)) {
            if let Some(class) = self.builder.classification_mut(owner) {
                class.push_member(id);
            }
            self.counts.attributes += 1;
        }
    }

    fn map_generalization(&mut self, element: &'a Value, source: XmiId) {
        let id = self.element_id(element);
        let Some(target) = idref(element, "general") else {
            debug!(class:% = source, generalization:% = id; "Generalization without target");
            return;
        };

        let generalization = Generalization::new(id, source, XmiId::new(&target));
        if self.builder.insert(Entity::Generalization(generalization)) {
            if let Some(class) = self.builder.classification_mut(source) {
                class.push_generalization(id);
            }
            self.counts.generalizations += 1;
        }
    }

    fn map_association(&mut self, element: &'a Value) {
        let id = self.element_id(element);
        let connector = self.connector_of(id);
        let owned_ends = children(element, "ownedEnd");

        let end_ref = |connector_key: &str, owned_index: usize| {
            connector
                .and_then(|c| first_child(c, connector_key))
                .and_then(|side| non_empty_attr(side, "xmi:idref"))
                .or_else(|| owned_ends.get(owned_index).and_then(|end| idref(end, "type")))
                .map(|raw| XmiId::new(&raw))
        };
        let start = end_ref("source", 0);
        let end = end_ref("target", 1);

        let role = |connector_key: &str, owned_index: usize| {
            let side = connector.and_then(|c| first_child(c, connector_key));
            let name = side
                .and_then(|s| first_child(s, "role"))
                .and_then(|r| non_empty_attr(r, "name"))
                .or_else(|| owned_ends.get(owned_index).and_then(|e| non_empty_attr(e, "name")));
            let multiplicity = side
                .and_then(|s| first_child(s, "type"))
                .and_then(|t| non_empty_attr(t, "multiplicity"));
            Role::new(name.map(Cow::into_owned), multiplicity.map(Cow::into_owned))
        };

        let notes = connector
            .and_then(|c| first_child(c, "documentation"))
            .and_then(|d| attr(d, "value"))
            .map(|d| documentation::clean(&d))
            .unwrap_or_default();

        let association = Association::new(id, start, end)
            .with_name(non_empty_attr(element, "name").map(Cow::into_owned))
            .with_roles(role("source", 0), role("target", 1))
            .with_documentation(notes);
        if self.builder.insert(Entity::Association(association)) {
            self.counts.associations += 1;
        }
    }

    fn element_id(&mut self, element: &Value) -> XmiId {
        next_id(element, &mut self.next_anonymous)
    }

    fn extension_of(&self, id: XmiId) -> Option<&'a Value> {
        self.elements.get(id.as_string().as_str()).copied()
    }

    fn connector_of(&self, id: XmiId) -> Option<&'a Value> {
        self.connectors.get(id.as_string().as_str()).copied()
    }

    /// Cleaned notes of an element, joined over all its `properties` blocks.
    fn documentation(&self, id: XmiId) -> String {
        let Some(extension) = self.extension_of(id) else {
            return String::new();
        };
        let raw: String = children(extension, "properties")
            .into_iter()
            .filter_map(|p| attr(p, "documentation"))
            .collect();
        documentation::clean(&raw)
    }
}

/// Returns the element's `xmi:id`, or a fresh anonymous id.
fn next_id(element: &Value, next_anonymous: &mut usize) -> XmiId {
    match non_empty_attr(element, "xmi:id") {
        Some(raw) => XmiId::new(&raw),
        None => {
            let id = XmiId::from_anonymous(*next_anonymous);
            *next_anonymous += 1;
            id
        }
    }
}

fn xmi_type(element: &Value) -> Option<Cow<'_, str>> {
    non_empty_attr(element, "xmi:type")
}

/// Finds the `uml:Model` element below the XMI root.
fn find_model(xmi: &Value) -> Option<&Value> {
    ["uml:Model", "Model"]
        .iter()
        .find_map(|key| first_child(xmi, key))
        .or_else(|| (xmi_type(xmi).as_deref() == Some("uml:Model")).then_some(xmi))
}

fn index_extension<'a>(
    extension: Option<&'a Value>,
    group: &str,
    item: &str,
) -> HashMap<Cow<'a, str>, &'a Value> {
    as_sequence(extension.and_then(|ext| ext.get(group)))
        .into_iter()
        .flat_map(|g| children(g, item))
        .filter_map(|entry| non_empty_attr(entry, "xmi:idref").map(|idref| (idref, entry)))
        .collect()
}

/// Returns the deprecation note if the element carries a `DEPRECATED` tag.
fn deprecation(extension: &Value) -> Option<String> {
    children(extension, "tags")
        .into_iter()
        .flat_map(|tags| children(tags, "tag"))
        .find(|tag| attr(tag, "name").as_deref() == Some(DEPRECATED_TAG))
        .map(|tag| attr(tag, "value").map(Cow::into_owned).unwrap_or_default())
}
