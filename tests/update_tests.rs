//! Update-path tests: snapshots carrying the update marker rewrite their
//! literal block inside a real file on disk.
//!
//! Each test builds a small source file in a temp directory, points a
//! snapshot at its call line, and asserts on the rewritten bytes.

use std::fs;
use std::path::PathBuf;

use seam::{Engine, EngineConfig, Snapshot, SourceLocation, Verdict};

const SAMPLE: &str =
    "fn demo() {\n    check_snapshot(\n        \\\\old one\n        \\\\old two\n    );\n}\n";

fn quiet_engine(max_source_bytes: u64) -> Engine {
    Engine::new(EngineConfig {
        preview: false,
        use_colors: false,
        max_source_bytes,
    })
}

fn write_sample(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("sample.rs");
    fs::write(&path, content).expect("failed to seed sample file");
    path
}

fn updated_text(verdict: Result<Verdict, seam::SeamError>) -> String {
    match verdict {
        Ok(Verdict::Updated { file_text }) => file_text,
        other => panic!("expected an update, got {other:?}"),
    }
}

#[cfg(test)]
mod rewrite_tests {
    use super::*;

    #[test]
    fn test_update_rewrites_block_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, SAMPLE);
        let snapshot = Snapshot::new(path.clone(), 1, "<!update>old one\nold two".to_string());

        let verdict = quiet_engine(seam::engine::MAX_SOURCE_BYTES)
            .compare(&snapshot, "new one\nnew two\nnew three");
        let file_text = updated_text(verdict);

        assert_eq!(file_text, fs::read_to_string(&path).unwrap());
        assert_eq!(
            file_text,
            "fn demo() {\n    check_snapshot(\n        \\\\new one\n        \\\\new two\n        \\\\new three\n    );\n}\n"
        );
    }

    #[test]
    fn test_update_preserves_ignore_markers_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "check_snapshot(\n    \\\\<!update>v: <^\\d+$>\n);\n");
        let snapshot = Snapshot::new(path.clone(), 0, "<!update>v: <^\\d+$>".to_string());

        let verdict = quiet_engine(seam::engine::MAX_SOURCE_BYTES).compare(&snapshot, "v: 42");
        let file_text = updated_text(verdict);

        // The marker is spliced back over the digits it matched; only the
        // update marker itself disappears.
        assert_eq!(file_text, "check_snapshot(\n    \\\\v: <^\\d+$>\n);\n");
        assert!(!file_text.contains("<!update>"));
    }

    #[test]
    fn test_update_splices_around_several_markers() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(
            &dir,
            "check_snapshot(\n    \\\\<!update>run <^\\d+$> took <^\\d+ms$>;\n);\n",
        );
        let snapshot = Snapshot::new(
            path.clone(),
            0,
            "<!update>run <^\\d+$> took <^\\d+ms$>;".to_string(),
        );

        let verdict =
            quiet_engine(seam::engine::MAX_SOURCE_BYTES).compare(&snapshot, "run 17 took 382ms;");
        let file_text = updated_text(verdict);

        assert_eq!(
            file_text,
            "check_snapshot(\n    \\\\run <^\\d+$> took <^\\d+ms$>;\n);\n"
        );
    }

    #[test]
    fn test_update_with_empty_output_leaves_a_bare_marker_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, SAMPLE);
        let snapshot = Snapshot::new(path.clone(), 1, "<!update>old one\nold two".to_string());

        let verdict = quiet_engine(seam::engine::MAX_SOURCE_BYTES).compare(&snapshot, "");
        let file_text = updated_text(verdict);

        assert_eq!(
            file_text,
            "fn demo() {\n    check_snapshot(\n        \\\\\n    );\n}\n"
        );
    }

    #[test]
    fn test_update_keeps_missing_final_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "check_snapshot(\n    \\\\old");
        let snapshot = Snapshot::new(path.clone(), 0, "<!update>old".to_string());

        let verdict = quiet_engine(seam::engine::MAX_SOURCE_BYTES).compare(&snapshot, "new");
        let file_text = updated_text(verdict);

        assert_eq!(file_text, "check_snapshot(\n    \\\\new");
    }

    #[test]
    fn test_preview_still_honors_an_explicit_update() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, SAMPLE);
        let snapshot = Snapshot::new(path.clone(), 1, "<!update>old one\nold two".to_string());

        let engine = Engine::new(EngineConfig {
            preview: true,
            use_colors: false,
            max_source_bytes: seam::engine::MAX_SOURCE_BYTES,
        });
        let verdict = engine.compare(&snapshot, "fresh");
        let file_text = updated_text(verdict);
        assert!(file_text.contains("\\\\fresh"));
    }
}

#[cfg(test)]
mod guard_tests {
    use super::*;

    #[test]
    fn test_oversized_file_is_refused_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, SAMPLE);
        let snapshot = Snapshot::new(path.clone(), 1, "<!update>old one\nold two".to_string());

        let err = quiet_engine(16).compare(&snapshot, "new").unwrap_err();
        assert!(err.to_string().contains("rewrite ceiling"));
        assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never_written.rs");
        let snapshot = Snapshot::new(path, 0, "<!update>text".to_string());

        let err = quiet_engine(seam::engine::MAX_SOURCE_BYTES)
            .compare(&snapshot, "text")
            .unwrap_err();
        assert!(matches!(err, seam::SeamError::Io { .. }));
    }

    #[test]
    fn test_rewrite_flags_a_call_line_without_the_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, "do_check(\n    \\\\old\n)\n");
        let location = SourceLocation {
            file: path.clone(),
            line: 0,
        };

        let rewrite =
            seam::update::rewrite(&location, "fresh", seam::engine::MAX_SOURCE_BYTES).unwrap();
        assert!(!rewrite.call_marker_seen);
        assert_eq!(rewrite.file_text, "do_check(\n    \\\\fresh\n)\n");
    }
}

#[cfg(test)]
mod verdict_tests {
    use super::*;

    #[test]
    #[should_panic(expected = "re-run without the update marker")]
    fn test_an_update_is_not_a_pass() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir, SAMPLE);
        let snapshot = Snapshot::new(path, 1, "<!update>old one\nold two".to_string());

        quiet_engine(seam::engine::MAX_SOURCE_BYTES).check(&snapshot, "anything");
    }
}
