//! CLI integration tests against a file-backed store.

mod common;

use serde_json::{Value, json};

use common::{Sandbox, layout, pairs};

/// Insert a titled record and return its id.
fn insert(
    sandbox: &Sandbox,
    collection: &str,
    partition: &str,
    title: &str,
    order: Option<i64>,
) -> String {
    let mut args = vec!["--json", "insert", collection, partition, "--data", "-"];
    let order = order.map(|o| o.to_string());
    if let Some(order) = &order {
        args.extend_from_slice(&["--order", order.as_str()]);
    }

    let output = sandbox.run_with_stdin(&args, &json!({ "title": title }).to_string());
    assert!(
        output.status.success(),
        "Insert failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    outcome["data"]["id"].as_str().unwrap().to_string()
}

fn list(sandbox: &Sandbox, collection: &str, partition: &str) -> Vec<(String, i64)> {
    layout(&sandbox.run_json(&["list", collection, partition]))
}

#[test]
fn test_insert_appends_and_lists_in_order() {
    let sandbox = Sandbox::new();

    insert(&sandbox, "awards", "festival", "Cannes", None);
    insert(&sandbox, "awards", "festival", "Berlin", None);
    insert(&sandbox, "awards", "festival", "Venice", None);

    assert_eq!(
        list(&sandbox, "awards", "festival"),
        pairs(&[("Cannes", 0), ("Berlin", 1), ("Venice", 2)])
    );
}

#[test]
fn test_insert_at_position_shifts_later_records() {
    let sandbox = Sandbox::new();

    insert(&sandbox, "awards", "festival", "Cannes", None);
    insert(&sandbox, "awards", "festival", "Berlin", None);
    insert(&sandbox, "awards", "festival", "Venice", Some(1));

    assert_eq!(
        list(&sandbox, "awards", "festival"),
        pairs(&[("Cannes", 0), ("Venice", 1), ("Berlin", 2)])
    );
}

#[test]
fn test_human_insert_prints_id() {
    let sandbox = Sandbox::new();

    let output = sandbox.run_with_stdin(
        &["insert", "photos", "landscape", "--data", "-"],
        r#"{"title": "Dunes"}"#,
    );
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let id = stdout.lines().next().unwrap().trim();
    assert_eq!(id.len(), 32);
    assert!(stdout.contains("Inserted"));
    assert!(stdout.contains("at order 0"));
}

#[test]
fn test_move_within_partition() {
    let sandbox = Sandbox::new();

    insert(&sandbox, "portraits", "studio", "A", None);
    insert(&sandbox, "portraits", "studio", "B", None);
    let c = insert(&sandbox, "portraits", "studio", "C", None);

    let moved = sandbox.run_json(&["move", "portraits", &c, "studio", "--order", "1"]);
    assert_eq!(moved["fields"]["order"], json!(1));

    // portraits are one-based
    assert_eq!(
        list(&sandbox, "portraits", "studio"),
        pairs(&[("C", 1), ("A", 2), ("B", 3)])
    );
}

#[test]
fn test_move_with_data_patches_fields() {
    let sandbox = Sandbox::new();

    let a = insert(&sandbox, "awards", "festival", "Cannes", None);

    let output = sandbox.run_with_stdin(
        &["--json", "move", "awards", &a, "festival", "--data", "-"],
        r#"{"title": "Cannes Lions", "order": 40}"#,
    );
    assert!(output.status.success());

    assert_eq!(
        list(&sandbox, "awards", "festival"),
        pairs(&[("Cannes Lions", 0)])
    );
}

#[test]
fn test_move_to_other_partition_closes_gap() {
    let sandbox = Sandbox::new();

    insert(&sandbox, "awards", "festival", "Cannes", None);
    let berlin = insert(&sandbox, "awards", "festival", "Berlin", None);
    insert(&sandbox, "awards", "festival", "Venice", None);
    insert(&sandbox, "awards", "industry", "Clio", None);

    sandbox.run_json(&["move", "awards", &berlin, "industry", "--order", "0"]);

    assert_eq!(
        list(&sandbox, "awards", "festival"),
        pairs(&[("Cannes", 0), ("Venice", 1)])
    );
    assert_eq!(
        list(&sandbox, "awards", "industry"),
        pairs(&[("Berlin", 0), ("Clio", 1)])
    );
}

#[test]
fn test_remove_closes_gap() {
    let sandbox = Sandbox::new();

    let cannes = insert(&sandbox, "awards", "festival", "Cannes", None);
    insert(&sandbox, "awards", "festival", "Berlin", None);
    insert(&sandbox, "awards", "festival", "Venice", None);

    let removed = sandbox.run_json(&["remove", "awards", &cannes]);
    assert_eq!(removed["fields"]["title"], json!("Cannes"));

    assert_eq!(
        list(&sandbox, "awards", "festival"),
        pairs(&[("Berlin", 0), ("Venice", 1)])
    );
}

#[test]
fn test_remove_missing_record() {
    let sandbox = Sandbox::new();
    insert(&sandbox, "awards", "festival", "Cannes", None);

    let output = sandbox.run(&["--json", "remove", "awards", "missing"]);
    assert!(!output.status.success());
    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["success"], json!(false));
    assert_eq!(outcome["error"]["kind"], json!("notFound"));

    let data = sandbox.run_json(&["remove", "awards", "missing", "--if-exists"]);
    assert!(data.is_null());

    assert_eq!(list(&sandbox, "awards", "festival"), pairs(&[("Cannes", 0)]));
}

#[test]
fn test_check_and_renumber_repair_partition() {
    let sandbox = Sandbox::new();

    insert(&sandbox, "projects", "editorial", "A", None);
    let b = insert(&sandbox, "projects", "editorial", "B", None);
    insert(&sandbox, "projects", "editorial", "C", None);

    let report = sandbox.run_json(&["check", "projects", "editorial"]);
    assert_eq!(report["count"], json!(3));
    assert_eq!(report["duplicates"], json!([]));
    assert_eq!(report["gaps"], json!([]));

    // Simulate a half-applied shift by editing B's file directly.
    let path = sandbox
        .store_path()
        .join("collections/projects")
        .join(format!("{b}.json"));
    let mut doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    doc["order"] = json!(5);
    std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();

    let report = sandbox.run_json(&["check", "projects", "editorial"]);
    assert_eq!(report["gaps"], json!([1, 3, 4]));

    let human = sandbox.run_success(&["check", "projects", "editorial"]);
    assert!(human.contains("Missing orders"));

    let renumbered = sandbox.run_json(&["renumber", "projects", "editorial"]);
    assert_eq!(renumbered["total"], json!(3));
    assert_eq!(renumbered["changed"], json!(2));

    assert_eq!(
        list(&sandbox, "projects", "editorial"),
        pairs(&[("A", 0), ("C", 1), ("B", 2)])
    );
}

#[test]
fn test_collections_lists_presets() {
    let sandbox = Sandbox::new();

    let configs = sandbox.run_json(&["collections"]);
    let names: Vec<&str> = configs
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"awards"));
    assert!(names.contains(&"videoReports"));

    let tearsheets = sandbox.run_json(&["collections", "tearsheets"]);
    assert_eq!(tearsheets[0]["base"], json!(1));
}

#[test]
fn test_config_file_adds_collection() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.config_path(),
        json!({
            "collections": [
                {"name": "press", "partitionField": "outlet", "base": 1}
            ]
        })
        .to_string(),
    )
    .unwrap();

    insert(&sandbox, "press", "print", "Review", None);
    let listing = sandbox.run_json(&["list", "press", "print"]);
    assert_eq!(listing[0]["fields"]["outlet"], json!("print"));
    assert_eq!(listing[0]["fields"]["order"], json!(1));
}

#[test]
fn test_unknown_collection_is_invalid_input() {
    let sandbox = Sandbox::new();

    let output = sandbox.run(&["--json", "list", "nonsense", "x"]);
    assert!(!output.status.success());

    let outcome: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["error"]["kind"], json!("invalidInput"));
}

#[test]
fn test_journal_written_to_store_root() {
    let sandbox = Sandbox::new();
    insert(&sandbox, "awards", "festival", "Cannes", None);

    let journal = std::fs::read_to_string(sandbox.store_path().join("journal.jsonl")).unwrap();
    assert!(journal.contains("\"op\":\"create\""));
}
