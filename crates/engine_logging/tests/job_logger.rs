use engine_logging::{build_job_logger, file_logger, job_debug, job_info, JobLogger, LevelFilter};
use tempfile::TempDir;

#[test]
fn file_sink_receives_debug_even_when_not_verbose() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("archive.log");

    let logger = build_job_logger(false, Some(&path));
    job_debug!(logger, "Getting page at {}", "https://example.com/?page=1");
    logger.flush();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("Getting page at https://example.com/?page=1"));
}

#[test]
fn file_logger_filters_below_level() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("info.log");

    let logger = file_logger(&path, LevelFilter::Info).expect("log file");
    job_debug!(logger, "hidden");
    job_info!(logger, "shown {}", 1);
    logger.flush();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(!written.contains("hidden"));
    assert!(written.contains("shown 1"));
}

#[test]
fn unwritable_log_file_falls_back_to_terminal() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing").join("archive.log");

    let logger = build_job_logger(true, Some(&path));
    job_info!(logger, "still logs");
    assert!(!path.exists());
}

#[test]
fn global_logger_without_installation_is_silent() {
    let logger = JobLogger::global();
    job_info!(logger, "nobody listens");
    logger.flush();
    assert_eq!(format!("{logger:?}"), "JobLogger { sink: \"global\" }");
}
