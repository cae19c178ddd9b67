//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/data")
}

/// A `pyeongeo` command isolated from the caller's config and API keys.
fn pyeongeo(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("pyeongeo").unwrap();
    cmd.current_dir(home)
        .env("HOME", home)
        .env_remove("GEMINI_API_KEY")
        .env_remove("PYEONGEO_GEMINI_KEY")
        .env_remove("PYEONGEO_OPENAI_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(dir: &Path, base_url: &str) -> PathBuf {
    let path = dir.join("pyeongeo.toml");
    std::fs::write(
        &path,
        format!(
            r#"
default_provider = "gemini"
default_model = "gemini-1.5-flash"

[providers.gemini]
type = "gemini"
api_key = "test-key"
base_url = "{base_url}"
"#
        ),
    )
    .unwrap();
    path
}

const CACHED_KEY: &str = "3학년_수학_4수01-01_2_2_2";

fn write_cache(dir: &Path) -> PathBuf {
    let path = dir.join("generated_cache.json");
    let mut cache = serde_json::Map::new();
    cache.insert(
        CACHED_KEY.to_string(),
        serde_json::json!({
            "상": ["큰 수의 자릿값을 정확히 설명함.", "큰 수의 크기를 비교하여 설명함."],
            "중": ["큰 수를 읽고 씀.", "자릿값을 이해함."],
            "하": ["도움을 받아 큰 수를 읽음.", "안내에 따라 수를 씀."]
        }),
    );
    std::fs::write(&path, serde_json::to_string_pretty(&cache).unwrap()).unwrap();
    path
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("교과평어"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pyeongeo"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    pyeongeo(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created pyeongeo.toml"))
        .stdout(predicate::str::contains("3-4학년군_성취수준.json"));

    assert!(dir.path().join("pyeongeo.toml").exists());
    assert!(dir.path().join("data").is_dir());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    pyeongeo(dir.path()).arg("init").assert().success();

    pyeongeo(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn subjects_for_grade() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["subjects", "--grade", "3", "--data-dir"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(predicate::str::contains("국어"))
        .stdout(predicate::str::contains("수학"))
        .stdout(predicate::str::contains("과학"))
        .stdout(predicate::str::contains("사회").not());
}

#[test]
fn subjects_accept_korean_grade_label() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["subjects", "--grade", "1학년", "--data-dir"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(predicate::str::contains("바른 생활"));
}

#[test]
fn invalid_grade() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["subjects", "--grade", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown grade"));
}

#[test]
fn subjects_without_documents() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["subjects", "--grade", "5", "--data-dir", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("5-6학년군_성취수준.json is unavailable"));
}

#[test]
fn domains_in_document_order() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["domains", "--grade", "4", "--subject", "수학", "--data-dir"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout("수와 연산\n변화와 관계\n");
}

#[test]
fn domains_of_absent_subject_warn() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["domains", "--grade", "4", "--subject", "사회", "--data-dir"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("no domains found for 4학년 사회"));
}

#[test]
fn standards_table() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args([
            "standards",
            "--grade",
            "3",
            "--subject",
            "수학",
            "--domain",
            "수와 연산",
            "--data-dir",
        ])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(predicate::str::contains("4수01-01"))
        .stdout(predicate::str::contains("4수01-02"))
        .stdout(predicate::str::contains("안내된 절차에 따라").not());
}

#[test]
fn standards_with_levels_skip_malformed_entries() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args([
            "standards",
            "--grade",
            "3",
            "--subject",
            "수학",
            "--domain",
            "변화와 관계",
            "--levels",
            "--data-dir",
        ])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(predicate::str::contains("4수02-02"))
        .stdout(predicate::str::contains("도움을 받아 규칙을 말할 수 있다."))
        .stdout(predicate::str::contains("4수02-01").not());
}

#[test]
fn validate_fixture_documents() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["validate", "--data-dir"])
        .arg(fixtures())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "3-4학년군: 3 subjects, 5 domains, 6 standards",
        ))
        .stdout(predicate::str::contains("Guidelines: 2 example group(s)"))
        .stdout(predicate::str::contains(
            "domain '변화와 관계': skipped malformed entry [4수02-01]",
        ))
        .stdout(predicate::str::contains("[3-4학년군 사회] WARNING: subject not found"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn validate_missing_documents() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["validate", "--data-dir", "missing"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("1-2학년군: ERROR"))
        .stderr(predicate::str::contains("4 document(s) failed to load"));
}

#[test]
fn missing_config_file() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["validate", "--config", "nowhere.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn generate_without_api_key_fails_early() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args([
            "generate",
            "--grade",
            "3",
            "--subject",
            "수학",
            "--standard",
            "4수01-01",
            "--data-dir",
        ])
        .arg(fixtures())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing API key for provider 'gemini'"));
}

#[test]
fn session_without_api_key_fails_before_prompting() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["session", "--data-dir"])
        .arg(fixtures())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing API key"));
}

#[test]
fn generate_out_of_range_count() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args([
            "generate",
            "--grade",
            "3",
            "--subject",
            "수학",
            "--standard",
            "4수01-01",
            "--high",
            "26",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 1 and 25, got 26"));
}

#[test]
fn generate_unknown_standard() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), "http://127.0.0.1:9");
    pyeongeo(home.path())
        .args([
            "generate",
            "--grade",
            "3",
            "--subject",
            "수학",
            "--standard",
            "4수99-99",
            "--config",
        ])
        .arg(&config)
        .arg("--data-dir")
        .arg(fixtures())
        .assert()
        .failure()
        .stderr(predicate::str::contains("[4수99-99] not found in 3학년 수학"));
}

#[test]
fn generate_served_from_cache() {
    let home = TempDir::new().unwrap();
    // Unreachable endpoint: a cache hit must not call the provider.
    let config = write_config(home.path(), "http://127.0.0.1:9");
    let cache = write_cache(home.path());

    pyeongeo(home.path())
        .args([
            "generate",
            "--grade",
            "3",
            "--subject",
            "수학",
            "--standard",
            "[4수01-01]",
            "--config",
        ])
        .arg(&config)
        .arg("--data-dir")
        .arg(fixtures())
        .arg("--cache-file")
        .arg(&cache)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{CACHED_KEY} (cached)")))
        .stdout(predicate::str::contains("[하]\n  1. 도움을 받아 큰 수를 읽음."));
}

#[test]
fn generate_json_output() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), "http://127.0.0.1:9");
    let cache = write_cache(home.path());

    let output = pyeongeo(home.path())
        .args([
            "generate",
            "--grade",
            "3",
            "--subject",
            "수학",
            "--standard",
            "4수01-01",
            "--format",
            "json",
            "--config",
        ])
        .arg(&config)
        .arg("--data-dir")
        .arg(fixtures())
        .arg("--cache-file")
        .arg(&cache)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["cache_key"], CACHED_KEY);
    assert_eq!(json["source"], "cached");
    assert_eq!(json["domain"], "수와 연산");
    assert_eq!(json["standard"]["성취기준별 성취수준"]["B"], "큰 수를 읽고 쓸 수 있다.");
    assert_eq!(json["sentences"]["중"][0], "큰 수를 읽고 씀.");
}

#[test]
fn generate_dry_run_needs_no_key_and_leaves_cache_alone() {
    let home = TempDir::new().unwrap();
    let cache = home.path().join("dry/cache.json");

    pyeongeo(home.path())
        .args([
            "generate",
            "--grade",
            "3",
            "--subject",
            "수학",
            "--standard",
            "4수01-01",
            "--dry-run",
            "--data-dir",
        ])
        .arg(fixtures())
        .arg("--cache-file")
        .arg(&cache)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{CACHED_KEY} (generated,")))
        .stdout(predicate::str::contains("[중]\n  1. 수업 내용을 이해함."));

    assert!(!cache.exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn generate_calls_provider_and_writes_cache() {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    let server = MockServer::start().await;
    let reply = "```json\n{\"상\": [\"글의 중심 생각을 정확히 파악함\"], \"중\": [\"중심 생각을 파악함.\"], \"하\": [\"도움을 받아 중심 생각을 찾음.\"]}\n```";
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": reply}]}}],
            "usageMetadata": {"promptTokenCount": 300, "candidatesTokenCount": 60, "totalTokenCount": 360}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), &server.uri());
    let cache = home.path().join("out/cache.json");

    for expected in ["(generated, 360 tokens)", "(cached)"] {
        pyeongeo(home.path())
            .args([
                "generate",
                "--grade",
                "4",
                "--subject",
                "국어",
                "--standard",
                "4국02-01",
                "--high",
                "1",
                "--mid",
                "1",
                "--low",
                "1",
                "--config",
            ])
            .arg(&config)
            .arg("--data-dir")
            .arg(fixtures())
            .arg("--cache-file")
            .arg(&cache)
            .assert()
            .success()
            .stdout(predicate::str::contains(expected))
            .stdout(predicate::str::contains("중심 생각을 파악함."));
    }

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&cache).unwrap()).unwrap();
    assert_eq!(
        written["4학년_국어_4국02-01_1_1_1"]["상"][0],
        "글의 중심 생각을 정확히 파악함"
    );
}

#[test]
fn cache_list_empty() {
    let home = TempDir::new().unwrap();
    pyeongeo(home.path())
        .args(["cache", "list", "--cache-file", "none.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cache is empty"));
}

#[test]
fn cache_list_and_show() {
    let home = TempDir::new().unwrap();
    let cache = write_cache(home.path());

    pyeongeo(home.path())
        .args(["cache", "list", "--cache-file"])
        .arg(&cache)
        .assert()
        .success()
        .stdout(predicate::str::contains(CACHED_KEY))
        .stdout(predicate::str::contains("1 cached set(s)"));

    pyeongeo(home.path())
        .args(["cache", "show", CACHED_KEY, "--cache-file"])
        .arg(&cache)
        .assert()
        .success()
        .stdout(predicate::str::contains("[상]\n  1. 큰 수의 자릿값을 정확히 설명함."));
}

#[test]
fn cache_with_foreign_entry_still_serves_valid_keys() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), "http://127.0.0.1:9");
    let cache = write_cache(home.path());
    let mut raw: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&std::fs::read_to_string(&cache).unwrap()).unwrap();
    raw.insert(
        "legacy".to_string(),
        serde_json::json!({"상": [{"문장": "x"}]}),
    );
    std::fs::write(&cache, serde_json::to_string(&raw).unwrap()).unwrap();

    pyeongeo(home.path())
        .args(["cache", "list", "--cache-file"])
        .arg(&cache)
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy"))
        .stdout(predicate::str::contains("2 cached set(s)"));

    pyeongeo(home.path())
        .args([
            "generate",
            "--grade",
            "3",
            "--subject",
            "수학",
            "--standard",
            "4수01-01",
            "--config",
        ])
        .arg(&config)
        .arg("--data-dir")
        .arg(fixtures())
        .arg("--cache-file")
        .arg(&cache)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("{CACHED_KEY} (cached)")));
}

#[test]
fn cache_show_unknown_key() {
    let home = TempDir::new().unwrap();
    let cache = write_cache(home.path());
    pyeongeo(home.path())
        .args(["cache", "show", "1학년_국어_x_2_2_2", "--cache-file"])
        .arg(&cache)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no cache entry for key"));
}

#[test]
fn list_models_of_configured_provider() {
    let home = TempDir::new().unwrap();
    let config = write_config(home.path(), "http://127.0.0.1:9");
    pyeongeo(home.path())
        .args(["list-models", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Provider: gemini (default)"))
        .stdout(predicate::str::contains("gemini-1.5-flash"));
}
