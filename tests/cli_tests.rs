mod common;

use common::{run_recap, stderr_of, stdout_of, TestEnv};

#[test]
fn recap_help_shows_usage() {
    let output = run_recap(&["--help"]);
    let stdout = stdout_of(&output);

    assert!(
        output.status.success(),
        "--help should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr_of(&output)
    );
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("Commands:"));
    assert!(stdout.contains("serve"));
}

#[test]
fn recap_version_shows_version() {
    let output = run_recap(&["--version"]);
    let stdout = stdout_of(&output);

    assert!(
        output.status.success(),
        "--version should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr_of(&output)
    );
    assert!(stdout.contains("recap "));
}

#[test]
fn completions_bash_outputs_script() {
    let output = run_recap(&["completions", "bash"]);
    let stdout = stdout_of(&output);

    assert!(
        output.status.success(),
        "completions bash should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr_of(&output)
    );
    assert!(
        stdout.contains("recap"),
        "expected completion output to reference command name\nstdout:\n{}",
        stdout
    );
}

#[test]
fn config_show_redacts_secrets() {
    let env = TestEnv::new();
    env.write_config(
        r#"
        [llm]
        api_key = "super-secret-key"

        [auth]
        token_secret = "signing-secret"
        "#,
    );

    let output = env.run(&["config", "show"]);
    let stdout = stdout_of(&output);

    assert!(
        output.status.success(),
        "config show should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr_of(&output)
    );
    assert!(stdout.contains("[general]"));
    assert!(stdout.contains("data_dir"));
    assert!(stdout.contains("<redacted>"));
    assert!(!stdout.contains("super-secret-key"));
    assert!(!stdout.contains("signing-secret"));
}

#[test]
fn config_path_returns_valid_path() {
    let output = run_recap(&["config", "path"]);
    let stdout = stdout_of(&output);

    assert!(
        output.status.success(),
        "config path should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr_of(&output)
    );
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_init_refuses_to_overwrite_without_force() {
    let env = TestEnv::new();

    let first = env.run(&["config", "init"]);
    assert!(first.status.success(), "stderr:\n{}", stderr_of(&first));
    assert!(env.config_path().exists());

    let second = env.run(&["config", "init"]);
    assert!(!second.status.success());
    assert!(stderr_of(&second).contains("already exists"));

    let forced = env.run(&["config", "init", "--force"]);
    assert!(forced.status.success(), "stderr:\n{}", stderr_of(&forced));
}

#[test]
fn user_list_works_with_empty_database() {
    let output = run_recap(&["user", "list"]);
    let stdout = stdout_of(&output);

    assert!(
        output.status.success(),
        "user list should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr_of(&output)
    );
    assert!(stdout.contains("No users found"));
}

#[test]
fn user_and_file_can_be_seeded() {
    let env = TestEnv::new();

    let added = env.run(&["user", "add", "Ada@Example.com", "--name", "Ada"]);
    assert!(added.status.success(), "stderr:\n{}", stderr_of(&added));
    assert!(stdout_of(&added).contains("ada@example.com"));

    let duplicate = env.run(&["user", "add", "ada@example.com"]);
    assert!(!duplicate.status.success());
    assert!(stderr_of(&duplicate).contains("User already exists"));

    let transcript = env.scratch_file("standup.txt", "We shipped the release today.");
    let transcript = transcript.to_string_lossy();
    let created = env.run(&[
        "file",
        "add",
        "--owner",
        "ada@example.com",
        "--transcript",
        &transcript,
    ]);
    let stdout = stdout_of(&created);
    assert!(created.status.success(), "stderr:\n{}", stderr_of(&created));

    let file_id = stdout
        .trim()
        .strip_prefix("File created: ")
        .expect("file id in output")
        .to_string();

    let shown = env.run(&["file", "show", &file_id]);
    let stdout = stdout_of(&shown);
    assert!(shown.status.success(), "stderr:\n{}", stderr_of(&shown));
    assert!(stdout.contains("Title: standup"));
    assert!(stdout.contains("(No summary yet)"));
}

#[test]
fn file_add_requires_existing_owner() {
    let env = TestEnv::new();
    let transcript = env.scratch_file("t.txt", "hello");
    let transcript = transcript.to_string_lossy();

    let output = env.run(&[
        "file",
        "add",
        "--owner",
        "ghost@example.com",
        "--transcript",
        &transcript,
    ]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("User not found"));
}

#[test]
fn token_requires_a_signing_secret() {
    let env = TestEnv::new();
    let added = env.run(&["user", "add", "ada@example.com"]);
    assert!(added.status.success(), "stderr:\n{}", stderr_of(&added));

    let output = env.run(&["token", "ada@example.com"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("Token secret is missing"));

    let output = env
        .command(&["token", "ada@example.com"])
        .env("RECAP_TOKEN_SECRET", "cli-secret")
        .output()
        .expect("failed to execute recap binary");
    assert!(output.status.success(), "stderr:\n{}", stderr_of(&output));
    assert!(stdout_of(&output).trim().contains('.'));
}
