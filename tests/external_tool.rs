use img2bin_batch::{
    config::Config,
    plan::ConversionJob,
    tool::{Converter, ExternalTool, ToolOutcome},
};
use std::path::PathBuf;

fn job(input: &str, output: &str) -> ConversionJob {
    ConversionJob {
        input: PathBuf::from(input),
        output: PathBuf::from(output),
    }
}

#[test]
fn missing_tool_is_a_launch_failure() {
    let mut cfg = Config::default();
    cfg.paths.tool = "/nonexistent/img2bin-batch-tool".into();

    let tool = ExternalTool::new(&cfg);
    let outcome = tool.convert(&job("/tmp/a.png", "/tmp/a.bin"));

    assert!(matches!(outcome, ToolOutcome::LaunchFailed { .. }));
    assert!(!outcome.is_success());
}

#[test]
fn doctor_reports_missing_tool() {
    let mut cfg = Config::default();
    cfg.paths.tool = "/nonexistent/img2bin-batch-tool".into();

    let diag = ExternalTool::new(&cfg).doctor().expect("diag");
    assert!(!diag.exists);
    assert!(!diag.ok);
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn write_script(dir: &std::path::Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        let mut perms = fs::metadata(&path).expect("stat").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("chmod");
        path
    }

    #[test]
    fn copying_tool_produces_the_output_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = write_script(tmp.path(), "fake-convert", "cp \"$1\" \"$2\"");
        fs::write(tmp.path().join("a.png"), b"maze").expect("fixture");

        let mut cfg = Config::default();
        cfg.paths.tool = script.display().to_string();

        let j = job(
            tmp.path().join("a.png").to_str().unwrap(),
            tmp.path().join("a.bin").to_str().unwrap(),
        );
        let outcome = ExternalTool::new(&cfg).convert(&j);

        assert!(outcome.is_success(), "{:?}", outcome);
        assert_eq!(fs::read(tmp.path().join("a.bin")).expect("output"), b"maze");
    }

    #[test]
    fn nonzero_exit_carries_code_and_stderr() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = write_script(tmp.path(), "fake-fail", "echo 'no exit found' >&2; exit 3");

        let mut cfg = Config::default();
        cfg.paths.tool = script.display().to_string();

        let outcome = ExternalTool::new(&cfg).convert(&job("/tmp/a.png", "/tmp/a.bin"));
        match outcome {
            ToolOutcome::ExitedNonZero { code, stderr } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("no exit found"));
            }
            other => panic!("expected ExitedNonZero, got {:?}", other),
        }
    }

    #[test]
    fn stderr_capture_can_be_disabled() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = write_script(tmp.path(), "fake-fail", "echo oops >&2; exit 1");

        let mut cfg = Config::default();
        cfg.paths.tool = script.display().to_string();
        cfg.tool.capture_stderr = false;

        let outcome = ExternalTool::new(&cfg).convert(&job("/tmp/a.png", "/tmp/a.bin"));
        match outcome {
            ToolOutcome::ExitedNonZero { stderr, .. } => assert!(stderr.is_empty()),
            other => panic!("expected ExitedNonZero, got {:?}", other),
        }
    }

    #[test]
    fn slow_tool_times_out() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let script = write_script(tmp.path(), "fake-slow", "sleep 10");

        let mut cfg = Config::default();
        cfg.paths.tool = script.display().to_string();
        cfg.tool.timeout_seconds = 1;

        let outcome = ExternalTool::new(&cfg).convert(&job("/tmp/a.png", "/tmp/a.bin"));
        assert!(matches!(outcome, ToolOutcome::TimedOut { seconds: 1 }));
    }
}
