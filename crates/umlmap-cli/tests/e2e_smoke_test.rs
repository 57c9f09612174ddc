use std::{fs, path::PathBuf};

use tempfile::tempdir;

use umlmap_cli::{Args, OutputFormat, run};

fn fixture(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .to_string()
}

fn args(input: String, output: String) -> Args {
    Args {
        input,
        output,
        config: None,
        search: String::new(),
        hide: Vec::new(),
        format: OutputFormat::Svg,
        ticks: 300,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_fixtures() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let mut failed = Vec::new();
    for name in ["fint.json", "felles.xml"] {
        let output = temp_dir.path().join(format!("{name}.svg"));
        let args = args(fixture(name), output.to_string_lossy().to_string());

        match run(&args) {
            Ok(()) => {
                let svg = fs::read_to_string(&output).expect("Output should exist");
                assert!(svg.starts_with("<svg"), "{name}: output should be SVG");
                assert!(svg.contains("Person"), "{name}: Person should be drawn");
            }
            Err(err) => failed.push((name, err)),
        }
    }

    if !failed.is_empty() {
        for (name, err) in &failed {
            eprintln!("  - {name}: {err}");
        }
        panic!("{} fixture(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_json_with_search_and_hidden_stereotype() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output = temp_dir.path().join("fint.json");

    let mut args = args(fixture("fint.json"), output.to_string_lossy().to_string());
    args.format = OutputFormat::Json;
    args.search = "person".to_string();
    args.hide = vec!["utdanning".to_string(), "NoSuchStereotype".to_string()];
    run(&args).expect("Run should succeed");

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    let mut names: Vec<&str> = value["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["name"].as_str().unwrap())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Aktør", "Felles", "Person"]);
    assert_eq!(value["links"].as_array().unwrap().len(), 1);
}

#[test]
fn e2e_error_cases() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let broken = temp_dir.path().join("broken.json");
    fs::write(&broken, "{ \"xmi:XMI\": ").unwrap();
    let broken_xml = temp_dir.path().join("broken.xmi");
    fs::write(&broken_xml, "<xmi:XMI><uml:Model>").unwrap();
    let bad_config = temp_dir.path().join("config.toml");
    fs::write(&bad_config, "[style]\npalette = [\"chartreuse-ish\"]\n").unwrap();

    let output = temp_dir
        .path()
        .join("out.svg")
        .to_string_lossy()
        .to_string();

    let cases = [
        args(broken.to_string_lossy().to_string(), output.clone()),
        args(broken_xml.to_string_lossy().to_string(), output.clone()),
        args(fixture("missing.json"), output.clone()),
        Args {
            config: Some(bad_config.to_string_lossy().to_string()),
            ..args(fixture("fint.json"), output.clone())
        },
    ];

    for case in &cases {
        assert!(
            run(case).is_err(),
            "{} should fail",
            case.input
        );
    }
    assert!(!PathBuf::from(&output).exists());
}
