use frontgen::writer::{write_all, WriteOutcome};
use frontgen::{Config, EnumRequest, Generator, TranslationRequest, TranslatorRequest};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Copy the fixture project into a fresh temp dir so outputs land beside it.
fn fixture_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let src = fixtures_root();
    for entry in WalkDir::new(&src) {
        let entry = entry.unwrap();
        let rel = entry.path().strip_prefix(&src).unwrap();
        let dest = temp.path().join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).unwrap();
        } else {
            fs::copy(entry.path(), &dest).unwrap();
        }
    }
    temp
}

fn generator(root: &Path, config: &str) -> Generator {
    let config: Config = toml::from_str(config).unwrap();
    Generator::new(config, root).unwrap()
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_status_enum_module() {
    let project = fixture_project();
    let gen = generator(project.path(), "");
    let files = gen
        .generate_enums(&EnumRequest {
            names: vec!["Status".into()],
            format: None,
        })
        .unwrap();
    write_all(&files).unwrap();

    let expected = "/**
 * This file is generated by frontgen. Do not edit it by hand.
 * Changes will be overwritten the next time the generator runs.
 */

export const Status = {
  ACTIVE: 'active',
  INACTIVE: 'inactive',
  PENDING: 'pending',
} as const;

export type Status = typeof Status[keyof typeof Status];

export const Visible = [
  Status.ACTIVE,
  Status.PENDING,
] as const;
";
    let path = project.path().join("resources/js/enums/Status.ts");
    assert_eq!(read(&path), expected);
}

#[test]
fn test_marked_enums_only_by_default() {
    let project = fixture_project();
    let gen = generator(project.path(), "");
    assert_eq!(gen.registry().len(), 3);

    let files = gen.generate_enums(&EnumRequest::default()).unwrap();
    let mut names: Vec<_> = files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["Priority.ts", "Status.ts"]);

    let priority = files.iter().find(|f| f.path.ends_with("Priority.ts")).unwrap();
    assert!(priority.contents.contains("/** Task priority */\nexport const Priority = {\n  /** Can wait */\n  LOW: 1,"));
    assert!(priority.contents.contains("export const Labels = {\n  '1': 'Low',\n  '2': \"It's urgent\",\n} as const;"));

    let gen = generator(
        project.path(),
        "[enums]\ngenerate_all_backed = true\nexclude = [\"App\\\\Enums\\\\Priority\"]\n",
    );
    let records = gen.enum_records(&EnumRequest::default()).unwrap();
    let names: Vec<_> = records.iter().map(|r| r.qualified_name.as_str()).collect();
    assert!(names.contains(&"App\\Enums\\Internal\\Legacy"));
    assert!(!names.contains(&"App\\Enums\\Priority"));
}

#[test]
fn test_drift_detects_hand_edit() {
    let project = fixture_project();
    let gen = generator(project.path(), "");
    let files = gen.generate_enums(&EnumRequest::default()).unwrap();
    write_all(&files).unwrap();

    assert!(gen.check_enums(&EnumRequest::default()).unwrap().is_in_sync());

    let path = project.path().join("resources/js/enums/Status.ts");
    let edited = read(&path).replace("PENDING: 'pending'", "PENDING: 'awaiting'");
    fs::write(&path, edited).unwrap();

    let report = gen.check_enums(&EnumRequest::default()).unwrap();
    let lines: Vec<String> = report.lines().map(|l| l.to_string()).collect();
    assert_eq!(lines, vec!["+ PENDING: 'pending'", "- PENDING: 'awaiting'"]);
    assert_eq!(report.enums[0].enum_name, "Status");
}

#[test]
fn test_translations_nested_i18next() {
    let project = fixture_project();
    let gen = generator(project.path(), "");
    let files = gen
        .generate_translations(&TranslationRequest::default())
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, project.path().join("resources/js/locales/en.ts"));

    let body = &files[0].contents;
    assert!(body.contains("export const en = {\n  'Log in': 'Log in',\n  Register: 'Register',\n  Status: {\n    active: 'Active',"));
    assert!(!body.contains("enums:"));
    assert!(body.contains("    welcome: 'Welcome, {{name}}',\n    apples_zero: 'No apples',\n    apples_one: 'One apple',\n    apples_other: '{{count}} apples',"));
    assert!(body.ends_with("} as const;\n\nexport type en = typeof en;\n"));
}

#[test]
fn test_flat_json_translation() {
    let project = fixture_project();
    let gen = generator(project.path(), "[translations]\nformat = \"json\"\nflat = true\n");
    let files = gen
        .generate_translations(&TranslationRequest::default())
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&files[0].contents).unwrap();
    assert_eq!(json["messages.nav.home"], "Home");
    assert_eq!(json["Status.pending"], "Pending");
    assert!(json.get("messages").is_none());
    assert!(files[0].path.ends_with("en.json"));
}

#[test]
fn test_later_locale_root_wins() {
    let project = fixture_project();
    let gen = generator(
        project.path(),
        "[translations]\npaths = [\"lang\", \"packages/lang\"]\nlibrary = \"vue-i18n\"\n",
    );
    let files = gen
        .generate_translations(&TranslationRequest::default())
        .unwrap();
    let body = &files[0].contents;
    assert!(body.contains("welcome: 'Hello from the package, {name}',"));
    assert!(!body.contains("apples"));
    assert!(body.contains("Register: 'Register',"));
}

#[test]
fn test_missing_locale_fails() {
    let project = fixture_project();
    let gen = generator(project.path(), "");
    let err = gen
        .generate_translations(&TranslationRequest {
            locales: vec!["fr".into()],
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, frontgen::Error::LocaleNotFound { ref locale, .. } if locale == "fr"));
}

#[test]
fn test_translator_helper_relative_import() {
    let project = fixture_project();
    let gen = generator(project.path(), "[translators]\nformat = \"js\"\n");
    let files = gen
        .generate_translators(&TranslatorRequest::default())
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(
        files[0].path,
        project.path().join("resources/js/translators/useStatusTranslator.js")
    );
    assert!(files[0].contents.contains("import { Status } from '../enums/Status';"));
    assert!(files[0].contents.contains("import { useI18n } from 'vue-i18n';"));
}

#[test]
fn test_idempotent_full_run() {
    let project = fixture_project();
    let gen = generator(project.path(), "");
    let first = gen.generate_all().unwrap();
    assert!(write_all(&first)
        .unwrap()
        .iter()
        .all(|(_, outcome)| *outcome == WriteOutcome::Written));

    let second = gen.generate_all().unwrap();
    assert_eq!(first, second);
    assert!(write_all(&second)
        .unwrap()
        .iter()
        .all(|(_, outcome)| *outcome == WriteOutcome::Unchanged));
}

#[test]
fn test_cli_generate_and_check() {
    let project = fixture_project();
    let config_path = project.path().join("frontgen.toml");
    fs::write(&config_path, "[output]\nmax_line_length = 120\n").unwrap();

    let status = std::process::Command::new(env!("CARGO_BIN_EXE_frontgen"))
        .arg("-c")
        .arg(&config_path)
        .arg("all")
        .status()
        .expect("Failed to run frontgen");
    assert!(status.success(), "frontgen all failed");

    assert!(project.path().join("resources/js/enums/Status.ts").exists());
    assert!(project.path().join("resources/js/locales/en.ts").exists());
    assert!(project
        .path()
        .join("resources/js/translators/useStatusTranslator.ts")
        .exists());

    let check = |project: &Path| {
        std::process::Command::new(env!("CARGO_BIN_EXE_frontgen"))
            .arg("-c")
            .arg(project.join("frontgen.toml"))
            .args(["enums", "--check"])
            .output()
            .expect("Failed to run frontgen")
    };
    assert!(check(project.path()).status.success());

    let path = project.path().join("resources/js/enums/Priority.ts");
    fs::write(&path, read(&path).replace("HIGH: 2", "HIGH: 3")).unwrap();
    let output = check(project.path());
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("+ HIGH: 2"));
    assert!(stdout.contains("- HIGH: 3"));
}

#[test]
fn test_cli_no_flat_overrides_config() {
    let project = fixture_project();
    let config_path = project.path().join("frontgen.toml");
    fs::write(&config_path, "[translations]\nformat = \"json\"\nflat = true\n").unwrap();
    let run = |flag: &str| {
        let status = std::process::Command::new(env!("CARGO_BIN_EXE_frontgen"))
            .arg("-c")
            .arg(&config_path)
            .args(["translations", flag])
            .status()
            .expect("Failed to run frontgen");
        assert!(status.success(), "frontgen translations {} failed", flag);
        let path = project.path().join("resources/js/locales/en.json");
        serde_json::from_str::<serde_json::Value>(&read(&path)).unwrap()
    };

    let nested = run("--no-flat");
    assert_eq!(nested["messages"]["nav"]["home"], "Home");
    assert!(nested.get("messages.nav.home").is_none());

    let flat = run("--flat");
    assert_eq!(flat["messages.nav.home"], "Home");

    // The later flag wins.
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_frontgen"))
        .arg("-c")
        .arg(&config_path)
        .args(["translations", "--flat", "--no-flat"])
        .status()
        .expect("Failed to run frontgen");
    assert!(status.success());
    let last = read(&project.path().join("resources/js/locales/en.json"));
    assert!(last.contains("\"messages\": {"));
}

#[test]
fn test_cli_rejects_bad_format() {
    let project = fixture_project();
    let config_path = project.path().join("frontgen.toml");
    fs::write(&config_path, "").unwrap();

    let output = std::process::Command::new(env!("CARGO_BIN_EXE_frontgen"))
        .arg("-c")
        .arg(&config_path)
        .args(["enums", "--format", "json"])
        .output()
        .expect("Failed to run frontgen");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("json"));
    assert!(!project.path().join("resources").exists());
}
