use std::process::{Command, Output};

fn forge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pbkdf2_forge"))
        .args(args)
        .env("FORGE_PW", "hunter2")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_line(out: &Output) -> String {
    String::from_utf8(out.stdout.clone()).unwrap().trim().to_string()
}

#[test]
fn quiet_random_salt_still_reaches_stderr_and_rederives() {
    let first = forge(&[
        "--quiet", "derive", "--random-salt", "16", "--password-env", "FORGE_PW",
        "--iterations", "1",
    ]);
    assert!(first.status.success());
    let key = stdout_line(&first);
    assert_eq!(key.len(), 64);

    let stderr = String::from_utf8(first.stderr).unwrap();
    let salt = stderr
        .split("salt=")
        .nth(1)
        .and_then(|rest| rest.split_whitespace().next())
        .expect("generated salt on stderr")
        .to_string();
    assert_eq!(hex::decode(&salt).unwrap().len(), 16);

    let again = forge(&[
        "--quiet", "derive", "--salt", &salt, "--password-env", "FORGE_PW",
        "--iterations", "1",
    ]);
    assert!(again.status.success());
    assert_eq!(stdout_line(&again), key);
    assert!(again.stderr.is_empty());
}

#[test]
fn quiet_hex_output_is_the_bare_key() {
    let out = forge(&[
        "--quiet", "derive", "--salt-text", "salt", "--password-env", "FORGE_PW",
        "--iterations", "2", "--key-size", "20",
    ]);
    assert!(out.status.success());
    assert_eq!(stdout_line(&out).len(), 40);
}
