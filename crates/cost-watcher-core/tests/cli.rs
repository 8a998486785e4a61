//! End-to-end checks of the `cost-watcher` binary

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

fn cost_watcher(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cost-watcher"));
    cmd.current_dir(dir)
        .env_remove("COST_WATCHER_CONFIG")
        .env("RUST_LOG", "info");
    cmd
}

fn wait_for_line(rx: &mpsc::Receiver<String>, needle: &str) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        match rx.recv_timeout(left) {
            Ok(line) if line.contains(needle) => return,
            Ok(_) => {}
            Err(_) => break,
        }
    }
    panic!("no log line containing {needle:?}");
}

#[cfg(unix)]
#[test]
fn test_ctrl_c_exits_while_stdin_stays_open() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = cost_watcher(dir.path())
        .args(["watch", "--dry-run", "--threshold", "100"])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // held open for the whole test so the binary is parked on a read
    let mut stdin = child.stdin.take().unwrap();
    let stderr = child.stderr.take().unwrap();

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
            let _ = tx.send(line);
        }
    });

    writeln!(stdin, r#"{{"service":"EC2","cost":150.0}}"#).unwrap();
    stdin.flush().unwrap();
    wait_for_line(&rx, "Cost alert");

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let exit = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break Some(status);
        }
        if Instant::now() >= deadline {
            break None;
        }
        thread::sleep(Duration::from_millis(50));
    };

    let Some(exit) = exit else {
        let _ = child.kill();
        let _ = child.wait();
        panic!("cost-watcher kept running after SIGINT while stdin was open");
    };
    assert_eq!(exit.code(), Some(130));
    drop(stdin);
}

#[test]
fn test_dotenv_supplies_config_path() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("custom.toml"),
        "[watcher]\nchannel = \"#from-dotenv\"\nthreshold = 42.0\n",
    )
    .unwrap();
    std::fs::write(dir.path().join(".env"), "COST_WATCHER_CONFIG=custom.toml\n").unwrap();

    let output = cost_watcher(dir.path()).arg("config").output().unwrap();
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["watcher"]["channel"], "#from-dotenv");
    assert_eq!(config["watcher"]["threshold"], 42.0);
}
