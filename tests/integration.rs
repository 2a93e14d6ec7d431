use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn gravibook_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("gravibook");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[storage]
path = "{}/data/contacts.json"

[avatar]
enabled = false
placeholder_url = "https://example.invalid/placeholder.png"

[display]
locale = "pl"
sort = "name-asc"

[export]
product = "testbook"
"#,
        root.display()
    );

    let config_path = config_dir.join("gravibook.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_gravibook(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = gravibook_binary();
    let cwd = config_path.parent().unwrap().parent().unwrap();
    let output = Command::new(&binary)
        .current_dir(cwd)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run gravibook binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

fn add(config_path: &Path, first: &str, last: &str, email: &str, tags: &[&str]) -> String {
    let mut args = vec!["add", "--first", first, "--last", last, "--email", email];
    for tag in tags {
        args.push("--tag");
        args.push(tag);
    }
    let (stdout, stderr, success) = run_gravibook(config_path, &args);
    assert!(success, "add failed: stdout={}, stderr={}", stdout, stderr);
    stdout
        .lines()
        .find_map(|l| l.strip_prefix("id:"))
        .map(|id| id.trim().to_string())
        .expect("add prints the new id")
}

fn list_json(config_path: &Path, extra: &[&str]) -> Vec<serde_json::Value> {
    let mut args = vec!["list", "--json"];
    args.extend_from_slice(extra);
    let (stdout, stderr, success) = run_gravibook(config_path, &args);
    assert!(success, "list failed: {}", stderr);
    serde_json::from_str(&stdout).unwrap()
}

#[test]
fn test_add_persists_with_placeholder_avatar() {
    let (tmp, config_path) = setup_test_env();

    add(&config_path, "Anna", "Nowak", "anna@example.com", &["work"]);

    let stored = fs::read_to_string(tmp.path().join("data/contacts.json")).unwrap();
    let stored: Vec<serde_json::Value> = serde_json::from_str(&stored).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["firstName"], "Anna");
    assert_eq!(stored[0]["avatar"], "https://example.invalid/placeholder.png");
    assert_eq!(stored[0]["createdAt"], stored[0]["updatedAt"]);
}

#[test]
fn test_list_search_tags_and_sort() {
    let (_tmp, config_path) = setup_test_env();

    add(&config_path, "Zbigniew", "Zalewski", "zbyszek@example.com", &["vip"]);
    add(&config_path, "Anna", "Nowak", "anna@example.com", &["work"]);
    add(&config_path, "Bob", "Smith", "bob@example.com", &["family"]);

    let all = list_json(&config_path, &[]);
    let names: Vec<&str> = all.iter().map(|c| c["firstName"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["Anna", "Bob", "Zbigniew"]);

    let found = list_json(&config_path, &["--search", "ANN"]);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["firstName"], "Anna");

    let tagged = list_json(&config_path, &["--tag", "work", "--tag", "vip"]);
    assert_eq!(tagged.len(), 2);

    let newest = list_json(&config_path, &["--sort", "created-desc"]);
    assert_eq!(newest[0]["firstName"], "Bob");
}

#[test]
fn test_tags_command() {
    let (_tmp, config_path) = setup_test_env();
    add(&config_path, "Anna", "Nowak", "anna@example.com", &["work", "vip"]);
    add(&config_path, "Bob", "Smith", "bob@example.com", &["family", "work"]);

    let (stdout, _, success) = run_gravibook(&config_path, &["tags"]);
    assert!(success);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), vec!["family", "vip", "work"]);
}

#[test]
fn test_edit_and_remove() {
    let (_tmp, config_path) = setup_test_env();
    let id = add(&config_path, "Anna", "Nowak", "anna@example.com", &["work"]);

    let (stdout, stderr, success) =
        run_gravibook(&config_path, &["edit", &id, "--last", "Kowalska", "--clear-tags"]);
    assert!(success, "edit failed: {}", stderr);
    assert!(stdout.contains("Anna Kowalska"));

    let all = list_json(&config_path, &[]);
    assert_eq!(all[0]["id"], id.as_str());
    assert_eq!(all[0]["tags"].as_array().unwrap().len(), 0);

    let (_, _, success) = run_gravibook(&config_path, &["rm", &id]);
    assert!(success);
    assert!(list_json(&config_path, &[]).is_empty());

    let (_, stderr, success) = run_gravibook(&config_path, &["rm", &id]);
    assert!(!success);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_export_import_json_round_trip() {
    let (tmp, config_path) = setup_test_env();
    add(&config_path, "Anna", "Nowak", "anna@example.com", &["work", "vip"]);
    add(&config_path, "Bob", "Smith", "bob@example.com", &[]);
    let before = list_json(&config_path, &[]);

    let out = tmp.path().join("out.json");
    let (_, stderr, success) =
        run_gravibook(&config_path, &["export", "json", "--output", out.to_str().unwrap()]);
    assert!(success, "export failed: {}", stderr);

    fs::remove_file(tmp.path().join("data/contacts.json")).unwrap();
    assert!(list_json(&config_path, &[]).is_empty());

    let (stdout, stderr, success) =
        run_gravibook(&config_path, &["import", out.to_str().unwrap()]);
    assert!(success, "import failed: {}", stderr);
    assert!(stdout.contains("Imported 2 contacts"));

    assert_eq!(list_json(&config_path, &[]), before);
}

#[test]
fn test_export_csv_default_filename_and_reimport() {
    let (tmp, config_path) = setup_test_env();
    add(&config_path, "Anna", "Nowak", "anna@example.com", &["work", "vip"]);

    let (_, stderr, success) = run_gravibook(&config_path, &["export", "csv"]);
    assert!(success, "export failed: {}", stderr);

    let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let csv_path = tmp.path().join(format!("testbook-kontakty-{}.csv", today));
    let csv = fs::read_to_string(&csv_path).unwrap();
    assert!(csv.starts_with("firstName,lastName,email,phone,tags,createdAt\n"));
    assert!(csv.contains("\"work;vip\""));

    let (stdout, _, success) = run_gravibook(&config_path, &["import", csv_path.to_str().unwrap()]);
    assert!(success);
    assert!(stdout.contains("Imported 1 contacts from CSV"));

    let all = list_json(&config_path, &[]);
    assert_eq!(all.len(), 2);
    assert_ne!(all[0]["id"], all[1]["id"]);
    assert_eq!(all[0]["tags"], all[1]["tags"]);
}

#[test]
fn test_import_failures_leave_store_untouched() {
    let (tmp, config_path) = setup_test_env();
    add(&config_path, "Anna", "Nowak", "anna@example.com", &[]);

    let header_only = tmp.path().join("empty.csv");
    fs::write(&header_only, "firstName,lastName,email,phone,tags,createdAt\n").unwrap();
    let (_, stderr, success) =
        run_gravibook(&config_path, &["import", header_only.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("no valid contacts"));

    let txt = tmp.path().join("contacts.txt");
    fs::write(&txt, "Anna").unwrap();
    let (_, stderr, success) = run_gravibook(&config_path, &["import", txt.to_str().unwrap()]);
    assert!(!success);
    assert!(stderr.contains("unsupported file format"));

    let bad_json = tmp.path().join("bad.json");
    fs::write(&bad_json, "[{\"firstName\": ").unwrap();
    let (_, _, success) = run_gravibook(&config_path, &["import", bad_json.to_str().unwrap()]);
    assert!(!success);

    assert_eq!(list_json(&config_path, &[]).len(), 1);
}

#[test]
fn test_corrupt_storage_starts_empty() {
    let (tmp, config_path) = setup_test_env();
    let data = tmp.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(data.join("contacts.json"), "{ definitely not a list").unwrap();

    assert!(list_json(&config_path, &[]).is_empty());
}

#[test]
fn test_init_writes_config_once() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("config/gravibook.toml");

    let (stdout, _, success) = run_gravibook(&config_path, &["init"]);
    assert!(success);
    assert!(stdout.contains("Wrote"));
    assert!(config_path.exists());

    let (stdout, _, success) = run_gravibook(&config_path, &["init"]);
    assert!(success);
    assert!(stdout.contains("already exists"));
}
