use std::process::Command;
use tempfile::TempDir;

fn elara(dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_elara"));
    command.current_dir(dir);
    command
}

#[test]
fn test_init_command() {
    let temp_dir = TempDir::new().unwrap();

    let output = elara(temp_dir.path())
        .arg("init")
        .output()
        .expect("Failed to run init command");
    assert!(output.status.success());

    let config_path = temp_dir.path().join(".elara/settings.toml");
    assert!(config_path.exists());

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("version = 1"));
    assert!(content.contains("[chunking]"));
    assert!(content.contains("[retrieval.boost]"));
    assert!(content.contains("[llm]"));
}

#[test]
fn test_init_refuses_to_overwrite() {
    let temp_dir = TempDir::new().unwrap();

    assert!(elara(temp_dir.path()).arg("init").status().unwrap().success());
    let second = elara(temp_dir.path()).arg("init").output().unwrap();
    assert!(!second.status.success());
    assert!(String::from_utf8_lossy(&second.stderr).contains("--force"));

    let forced = elara(temp_dir.path()).args(["init", "--force"]).status().unwrap();
    assert!(forced.success());
}

#[test]
fn test_config_command() {
    let temp_dir = TempDir::new().unwrap();
    let config_dir = temp_dir.path().join(".elara");
    std::fs::create_dir_all(&config_dir).unwrap();

    let config_content = r#"
version = 2
[retrieval]
top_k = 3
"#;
    std::fs::write(config_dir.join("settings.toml"), config_content).unwrap();

    let output = elara(temp_dir.path())
        .arg("config")
        .output()
        .expect("Failed to run config command");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("version = 2"));
    assert!(stdout.contains("top_k = 3"));
    // Defaults fill the rest
    assert!(stdout.contains("chunk_size = 2000"));
}

#[test]
fn test_explicit_config_path() {
    let temp_dir = TempDir::new().unwrap();
    let custom = temp_dir.path().join("custom.toml");
    std::fs::write(&custom, "[llm]\nmodel = \"mistralai/mistral-small\"\n").unwrap();

    let output = elara(temp_dir.path())
        .args(["config", "--config"])
        .arg(&custom)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("mistralai/mistral-small"));
}

#[test]
fn test_chunk_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = elara(temp_dir.path())
        .args(["chunk", "absent.pdf"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("absent.pdf"));
}

#[test]
fn test_chunk_text_file() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("notes.txt"),
        "Cats sleep a lot.\nDogs bark.\n",
    )
    .unwrap();

    let output = elara(temp_dir.path())
        .args(["chunk", "notes.txt"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 chunks"), "{stdout}");
    assert!(stdout.contains("Cats sleep a lot.\nDogs bark."));
}
