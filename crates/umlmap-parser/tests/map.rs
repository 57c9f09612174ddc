use umlmap_core::{
    identifier::XmiId,
    semantic::{ClassType, Entity, EntityKind, Model},
};
use umlmap_parser::{error::MapError, map_document, map_json_str, map_xml_str};

const FINT_JSON: &str = include_str!("fixtures/fint.json");
const FELLES_XML: &str = include_str!("fixtures/felles.xml");

fn fint() -> Model {
    map_json_str(FINT_JSON).expect("Failed to map fixture")
}

fn class<'a>(model: &'a Model, raw: &str) -> &'a umlmap_core::semantic::Classification {
    model
        .classification(XmiId::new(raw))
        .unwrap_or_else(|| panic!("missing class {raw}"))
}

#[test]
fn test_package_tree() {
    let model = fint();

    let root = model.root().unwrap();
    assert_eq!(root.name(), "FINT");
    assert_eq!(model.root_id(), "EAPK_ROOT");

    let stereotypes: Vec<&str> = model
        .stereotypes()
        .iter()
        .map(|&id| model.package(id).unwrap().name())
        .collect();
    assert_eq!(stereotypes, vec!["Felles", "Utdanning"]);

    let felles = model.entity(XmiId::new("EAPK_FELLES")).unwrap();
    assert_eq!(felles.kind(), EntityKind::Stereotype);
    assert_eq!(
        felles.as_package().unwrap().documentation(),
        "Felles informasjonsmodell"
    );

    let kdt = model.entity(XmiId::new("EAPK_KDT")).unwrap();
    assert_eq!(kdt.kind(), EntityKind::Package);
}

#[test]
fn test_classifications() {
    let model = fint();

    let person = class(&model, "EAID_PERSON");
    assert_eq!(person.class_type(), &ClassType::MainClass);
    assert_eq!(person.id(), "felles_person");
    assert_eq!(person.package_path(), "Felles");
    assert_eq!(person.stereotype(), Some(XmiId::new("EAPK_FELLES")));
    assert_eq!(person.documentation_header(), "En person");
    assert_eq!(person.documentation_body(), "Brukes i flere domener.");

    let aktor = class(&model, "EAID_AKTOR");
    assert_eq!(aktor.class_type(), &ClassType::Abstract);
    assert!(aktor.is_abstract());
    assert_eq!(aktor.id(), "felles_aktor");

    let kontakt = class(&model, "EAID_KONTAKT");
    assert_eq!(kontakt.class_type(), &ClassType::Class);
    assert_eq!(kontakt.package_path(), "Felles.Kompleksedatatyper");
    assert_eq!(kontakt.id(), "kompleksedatatyper_kontaktinformasjon");

    let kjonn = class(&model, "EAID_KJONN");
    assert_eq!(kjonn.class_type(), &ClassType::Enumeration);
    assert_eq!(kjonn.xmi_type(), "uml:Enumeration");
    assert_eq!(kjonn.id(), "elev_kjonn");
    assert_eq!(kjonn.members().len(), 2);
}

#[test]
fn test_single_attribute_is_not_skipped() {
    let model = fint();

    let elev = class(&model, "EAID_ELEV");
    let members = model.members(elev);
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].name(), "elevnummer");
}

#[test]
fn test_attribute_extension_join() {
    let model = fint();

    let kontakt = class(&model, "EAID_KONTAKT");
    let epost = model.find_member(kontakt, "epostadresse").unwrap();
    assert_eq!(epost.type_name(), Some("string"));
    assert_eq!(epost.type_ref(), Some(XmiId::new("EAJava_string")));
    assert_eq!(epost.multiplicity().as_deref(), Some("0..1"));
    assert_eq!(epost.documentation(), "E-postadresse til <personen>");

    let person = class(&model, "EAID_PERSON");
    let fnr = model.find_member(person, "fodselsnummer").unwrap();
    assert_eq!(fnr.type_name(), Some("Identifikator"));
}

#[test]
fn test_deprecated_tag() {
    let model = fint();

    let ressurs = class(&model, "EAID_SKOLERESSURS");
    assert!(ressurs.is_deprecated());
    assert_eq!(
        ressurs.deprecated_description(),
        Some("Erstattes av Personalressurs")
    );
    assert!(!class(&model, "EAID_PERSON").is_deprecated());
}

#[test]
fn test_generalizations_resolve_lazily() {
    let model = fint();

    let person = class(&model, "EAID_PERSON");
    let aktor = class(&model, "EAID_AKTOR");
    assert_eq!(
        model.super_type(person).unwrap().map(|c| c.name()),
        Some("Aktør")
    );
    let subs: Vec<&str> = model.sub_types(aktor).iter().map(|c| c.name()).collect();
    assert_eq!(subs, vec!["Person"]);

    // The target of this generalization does not exist in the document.
    let ressurs = class(&model, "EAID_SKOLERESSURS");
    assert!(model.super_type(ressurs).unwrap().is_none());
    assert!(model.generalization(XmiId::new("EAID_GEN_GONE")).is_some());
}

#[test]
fn test_associations_and_roles() {
    let model = fint();

    let assoc = model
        .association(XmiId::new("EAID_ASSOC_ELEV_PERSON"))
        .unwrap();
    assert_eq!(assoc.start(), Some(XmiId::new("EAID_ELEV")));
    assert_eq!(assoc.end(), Some(XmiId::new("EAID_PERSON")));
    assert_eq!(assoc.source_role().name(), Some("elev"));
    assert_eq!(assoc.source_role().multiplicity(), Some("0..*"));
    assert_eq!(assoc.target_role().name(), Some("person"));
    assert_eq!(assoc.documentation(), "Eleven er en person");

    let elev = class(&model, "EAID_ELEV");
    let person = class(&model, "EAID_PERSON");
    assert_eq!(model.associations_of(elev).len(), 1);
    assert_eq!(model.associations_of(person).len(), 1);

    let dangling = model.association(XmiId::new("EAID_ASSOC_DANGLING")).unwrap();
    assert_eq!(dangling.end(), Some(XmiId::new("EAID_MISSING")));
    assert!(model.entity(XmiId::new("EAID_MISSING")).is_none());
}

#[test]
fn test_links_skip_dangling_ends() {
    let model = fint();

    let links: Vec<XmiId> = model
        .get_link_nodes(None)
        .into_iter()
        .map(|link| link.xmi_id())
        .collect();
    assert_eq!(
        links,
        vec![
            XmiId::new("EAID_GEN_PERSON"),
            XmiId::new("EAID_ASSOC_ELEV_PERSON")
        ]
    );
}

#[test]
fn test_unknown_types_are_skipped() {
    let model = fint();
    assert!(model.entity(XmiId::new("EAID_DEP")).is_none());
}

#[test]
fn test_node_order() {
    let model = fint();

    let names: Vec<&str> = model
        .get_nodes(None)
        .iter()
        .map(|&id| model.node(id).unwrap().name())
        .collect();
    assert_eq!(
        names,
        vec![
            "Utdanning",
            "Elev",
            "Elev",
            "Skoleressurs",
            "Kjønn",
            "Felles",
            "Kompleksedatatyper",
            "Aktør",
            "Person",
            "Kontaktinformasjon",
        ]
    );
}

#[test]
fn test_identity_stability() {
    let model = fint();

    for entity in model.entities() {
        let looked_up = model.entity(entity.xmi_id()).unwrap();
        assert!(std::ptr::eq(looked_up, entity));

        match entity {
            Entity::Classification(c) => {
                for &member in c.members() {
                    assert!(model.attribute(member).is_some());
                }
                for &generalization in c.generalizations() {
                    assert!(model.generalization(generalization).is_some());
                }
            }
            Entity::Attribute(a) => assert!(model.classification(a.owner()).is_some()),
            _ => {}
        }
    }
}

#[test]
fn test_xml_export() {
    let model = map_xml_str(FELLES_XML).expect("Failed to map XML fixture");

    assert_eq!(model.root().unwrap().name(), "FINT");
    assert_eq!(model.stereotypes().len(), 1);

    let person = class(&model, "EAID_PERSON");
    assert_eq!(person.class_type(), &ClassType::MainClass);
    assert_eq!(person.documentation(), "En person\nBrukes i flere domener.");

    let navn = model.find_member(person, "navn").unwrap();
    assert_eq!(navn.type_name(), Some("Personnavn"));
    assert_eq!(navn.multiplicity().as_deref(), Some("1"));
    assert_eq!(navn.documentation(), "Fullt navn");

    assert_eq!(class(&model, "EAID_ADRESSE").class_type(), &ClassType::DataType);
    assert_eq!(
        model.super_type(person).unwrap().map(|c| c.name()),
        Some("Aktør")
    );

    let assoc = model
        .association(XmiId::new("EAID_ASSOC_PERSON_ADRESSE"))
        .unwrap();
    assert_eq!(assoc.target_role().name(), Some("postadresse"));
    assert!(assoc.source_role().name().is_none());
    assert_eq!(model.associations_of(person).len(), 1);
    assert!(model.associations_of(class(&model, "EAID_ADRESSE")).is_empty());
}

#[test]
fn test_model_without_root_package() {
    let doc = serde_json::json!({
        "uml:Model": {
            "xmi:type": "uml:Model",
            "xmi:id": "MODEL",
            "name": "EA_Model",
            "packagedElement": [
                { "xmi:type": "uml:Package", "xmi:id": "S1", "name": "A" },
                { "xmi:type": "uml:Package", "xmi:id": "S2", "name": "B" }
            ]
        }
    });

    let model = map_document(&doc).unwrap();
    assert_eq!(model.root().unwrap().name(), "EA_Model");
    assert_eq!(model.stereotypes().len(), 2);
}

#[test]
fn test_errors() {
    assert!(matches!(map_json_str("{"), Err(MapError::Json(_))));
    assert!(matches!(
        map_json_str(r#"{ "something": "else" }"#),
        Err(MapError::MissingModel)
    ));
    assert!(matches!(map_xml_str("<xmi:XMI"), Err(MapError::Xml(_))));
}
