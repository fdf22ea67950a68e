//! Build running
//!
//! Invokes the external build tool against a populated workspace in two
//! strictly ordered phases: compile, then test. A compile failure is
//! reported on its own, without implying that tests ran. Both phases
//! append their combined stdout/stderr to one log buffer that travels
//! with the outcome, whatever the status.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use girder_core::{BuildOutcome, BuildRequest, BuildStatus};

/// Marker the build tool prints on compilation errors.
const ERROR_MARKER: &str = "[ERROR]";

const MAVEN_HOME_DIAGNOSTIC: &str = "\
MAVEN_HOME environment variable not set: the test phase cannot locate \
the Maven installation. Export MAVEN_HOME in the server's environment \
(`mvn --version` prints the installation path).\n";

/// Build-tool configuration
#[derive(Debug, Clone)]
pub struct MavenConfig {
    /// Command used for the compile phase (resolved via PATH).
    pub compile_command: String,
    /// Maven installation directory; required by the test phase.
    pub maven_home: MavenHome,
}

impl MavenConfig {
    /// Configuration that resolves the Maven installation from the
    /// environment on every run. Nothing is validated at startup: a
    /// missing MAVEN_HOME only matters once a build reaches the test
    /// phase.
    pub fn from_env() -> Self {
        Self {
            compile_command: "mvn".to_string(),
            maven_home: MavenHome::FromEnv,
        }
    }
}

/// Where the test phase finds its Maven installation
#[derive(Debug, Clone)]
pub enum MavenHome {
    /// Read the MAVEN_HOME environment variable on every run, so a
    /// variable exported after server start is picked up.
    FromEnv,
    /// Fixed installation directory.
    Dir(PathBuf),
    /// No installation available.
    Unset,
}

impl MavenHome {
    fn resolve(&self) -> Option<PathBuf> {
        match self {
            MavenHome::FromEnv => std::env::var_os("MAVEN_HOME").map(PathBuf::from),
            MavenHome::Dir(path) => Some(path.clone()),
            MavenHome::Unset => None,
        }
    }
}

/// Service trait for executing the build phases of one run
#[async_trait]
pub trait BuildExecutor: Send + Sync {
    /// Compiles and tests the workspace, returning exactly one outcome.
    ///
    /// Infrastructure problems (spawn failure, missing build-tool
    /// configuration) surface as `Errored` outcomes, never as panics or
    /// propagated errors.
    async fn run(&self, request: &BuildRequest, workspace: &Path) -> BuildOutcome;
}

/// Maven-backed build executor
pub struct MavenRunner {
    config: MavenConfig,
}

impl MavenRunner {
    pub fn new(config: MavenConfig) -> Self {
        Self { config }
    }

    /// Runs one build-tool invocation, appending its combined output to
    /// the run log, and returns the exit code.
    async fn invoke(
        &self,
        program: &Path,
        args: &[&str],
        workspace: &Path,
        log: &mut String,
    ) -> std::io::Result<i32> {
        debug!(program = %program.display(), ?args, "invoking build tool");
        let output = Command::new(program)
            .args(args)
            .current_dir(workspace)
            .output()
            .await?;

        log.push_str(&String::from_utf8_lossy(&output.stdout));
        log.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(output.status.code().unwrap_or(-1))
    }
}

#[async_trait]
impl BuildExecutor for MavenRunner {
    async fn run(&self, request: &BuildRequest, workspace: &Path) -> BuildOutcome {
        let mut log = String::new();

        // Compile phase
        let compile_program = PathBuf::from(&self.config.compile_command);
        let exit_code = match self
            .invoke(&compile_program, &["clean", "compile"], workspace, &mut log)
            .await
        {
            Ok(code) => code,
            Err(e) => {
                log.push_str(&format!("failed to start compile phase: {e}\n"));
                return BuildOutcome::new(request.clone(), BuildStatus::Errored, log);
            }
        };

        if exit_code != 0 || log.contains(ERROR_MARKER) {
            info!(commit = %request.commit_id, exit_code, "compile phase failed");
            return BuildOutcome::new(request.clone(), BuildStatus::Failed, log);
        }

        // Test phase, only reached on a clean compile
        let Some(maven_home) = self.config.maven_home.resolve() else {
            log.push_str(MAVEN_HOME_DIAGNOSTIC);
            return BuildOutcome::new(request.clone(), BuildStatus::Errored, log);
        };

        let test_program = maven_home.join("bin").join("mvn");
        let exit_code = match self
            .invoke(&test_program, &["test", "--batch-mode"], workspace, &mut log)
            .await
        {
            Ok(code) => code,
            Err(e) => {
                log.push_str(&format!(
                    "failed to start test phase via {}: {e}\n",
                    test_program.display()
                ));
                return BuildOutcome::new(request.clone(), BuildStatus::Errored, log);
            }
        };

        let status = if exit_code == 0 {
            BuildStatus::Succeeded
        } else {
            BuildStatus::Failed
        };
        info!(commit = %request.commit_id, exit_code, ?status, "test phase finished");
        BuildOutcome::new(request.clone(), status, log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> BuildRequest {
        BuildRequest {
            repo_name: "demo".to_string(),
            clone_url: "https://example.com/demo.git".to_string(),
            commit_id: "abc123".to_string(),
            committer_email: "dev@example.com".to_string(),
            timestamp: "2024-02-01T12:00:00+01:00".to_string(),
            commit_message: "fix the thing".to_string(),
        }
    }

    /// Writes an executable script and returns its path.
    #[cfg(unix)]
    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Fake Maven installation whose `bin/mvn` runs the given body.
    #[cfg(unix)]
    fn fake_maven_home(dir: &Path, body: &str) -> PathBuf {
        let home = dir.join("maven");
        std::fs::create_dir_all(home.join("bin")).unwrap();
        script(&home.join("bin"), "mvn", body);
        home
    }

    #[cfg(unix)]
    fn runner(compile: &Path, maven_home: MavenHome) -> MavenRunner {
        MavenRunner::new(MavenConfig {
            compile_command: compile.to_string_lossy().into_owned(),
            maven_home,
        })
    }

    #[test]
    fn test_maven_home_resolution() {
        // FromEnv consults the environment at resolution time, not at
        // construction, so later exports are picked up.
        assert_eq!(
            MavenHome::FromEnv.resolve(),
            std::env::var_os("MAVEN_HOME").map(PathBuf::from)
        );
        assert_eq!(
            MavenHome::Dir(PathBuf::from("/opt/maven")).resolve(),
            Some(PathBuf::from("/opt/maven"))
        );
        assert_eq!(MavenHome::Unset.resolve(), None);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_full_run_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let compile = script(dir.path(), "compile", "echo compiling\nexit 0");
        let home = fake_maven_home(dir.path(), "echo testing\nexit 0");

        let outcome = runner(&compile, MavenHome::Dir(home))
            .run(&request(), dir.path())
            .await;

        assert_eq!(outcome.status, BuildStatus::Succeeded);
        assert!(outcome.log.contains("compiling"));
        assert!(outcome.log.contains("testing"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_compile_failure_skips_test_phase() {
        let dir = tempfile::tempdir().unwrap();
        let compile = script(dir.path(), "compile", "echo compile broke >&2\nexit 1");
        let marker = dir.path().join("tests-ran");
        let home = fake_maven_home(dir.path(), &format!("touch {}\nexit 0", marker.display()));

        let outcome = runner(&compile, MavenHome::Dir(home))
            .run(&request(), dir.path())
            .await;

        assert_eq!(outcome.status, BuildStatus::Failed);
        assert!(outcome.log.contains("compile broke"));
        assert!(!marker.exists(), "test phase must not run after a compile failure");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_error_marker_fails_compile_despite_zero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let compile = script(dir.path(), "compile", "echo '[ERROR] bad symbol'\nexit 0");
        let home = fake_maven_home(dir.path(), "exit 0");

        let outcome = runner(&compile, MavenHome::Dir(home))
            .run(&request(), dir.path())
            .await;

        assert_eq!(outcome.status, BuildStatus::Failed);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_test_failure_keeps_both_phase_logs() {
        let dir = tempfile::tempdir().unwrap();
        let compile = script(dir.path(), "compile", "echo compile ok\nexit 0");
        let home = fake_maven_home(dir.path(), "echo 2 tests failed\nexit 1");

        let outcome = runner(&compile, MavenHome::Dir(home))
            .run(&request(), dir.path())
            .await;

        assert_eq!(outcome.status, BuildStatus::Failed);
        assert!(outcome.log.contains("compile ok"));
        assert!(outcome.log.contains("2 tests failed"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_maven_home_is_errored_not_failed() {
        let dir = tempfile::tempdir().unwrap();
        let compile = script(dir.path(), "compile", "echo compile ok\nexit 0");

        let outcome = runner(&compile, MavenHome::Unset).run(&request(), dir.path()).await;

        assert_eq!(outcome.status, BuildStatus::Errored);
        assert!(outcome.log.contains("MAVEN_HOME"));
        assert!(outcome.log.contains("compile ok"));
    }

    #[tokio::test]
    async fn test_unspawnable_compile_command_is_errored() {
        let dir = tempfile::tempdir().unwrap();
        let runner = MavenRunner::new(MavenConfig {
            compile_command: dir.path().join("does-not-exist").to_string_lossy().into_owned(),
            maven_home: MavenHome::Unset,
        });

        let outcome = runner.run(&request(), dir.path()).await;

        assert_eq!(outcome.status, BuildStatus::Errored);
        assert!(outcome.log.contains("failed to start compile phase"));
    }
}
