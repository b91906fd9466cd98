use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::RecommendationResult,
};

/// Boundary to the external recommendation computation.
///
/// Each call spawns one short-lived child process — no pooling, no reuse,
/// no internal retry. The child gets `(location, token)` as positional
/// arguments, must print a single JSON object to stdout and exit 0; anything
/// on stderr is only consulted when it fails.
pub struct RecommendationBridge {
    command: String,
    script: String,
    deadline: Duration,
}

impl RecommendationBridge {
    pub fn new(command: String, script: String, deadline: Duration) -> Self {
        Self {
            command,
            script,
            deadline,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.recommender_command.clone(),
            config.recommender_script.clone(),
            Duration::from_secs(config.recommender_timeout_secs),
        )
    }

    /// Runs the computation once and decodes its output.
    ///
    /// The wait is bounded by the configured deadline. `kill_on_drop` reaps
    /// the child both on deadline expiry and when the caller's request is
    /// abandoned mid-flight, so no orphaned process outlives its request.
    pub async fn get_recommendations(
        &self,
        location: &str,
        token: &str,
    ) -> AppResult<RecommendationResult> {
        tracing::info!(location = %location, "Spawning recommender");

        let child = Command::new(&self.command)
            .arg(&self.script)
            .arg(location)
            .arg(token)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::ComputationFailed {
                details: format!("Failed to spawn recommender: {}", e),
            })?;

        // wait_with_output drains stdout and stderr concurrently, so a child
        // that fills one pipe cannot deadlock against the other.
        let output = timeout(self.deadline, child.wait_with_output())
            .await
            .map_err(|_| {
                tracing::error!(deadline = ?self.deadline, "Recommender deadline expired");
                AppError::ComputationFailed {
                    details: format!("Recommender timed out after {:?}", self.deadline),
                }
            })?
            .map_err(|e| AppError::ComputationFailed {
                details: format!("Failed to read recommender output: {}", e),
            })?;

        if !output.status.success() {
            let details = String::from_utf8_lossy(&output.stderr).into_owned();
            tracing::error!(
                status = ?output.status.code(),
                stderr = %details,
                "Recommender exited with failure"
            );
            return Err(AppError::ComputationFailed { details });
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        match serde_json::from_str::<RecommendationResult>(&stdout) {
            Ok(result) => {
                tracing::info!(
                    count = result.recommendations.len(),
                    "Recommender returned candidates"
                );
                Ok(result)
            }
            Err(e) => {
                tracing::error!(error = %e, "Recommender printed undecodable output");
                Err(AppError::MalformedResult { raw: stdout })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Each test writes a tiny shell script standing in for the recommender
    // and runs it through `sh`, exercising the real spawn/drain/decode path.
    fn fake_recommender(script_body: &str) -> (tempfile::TempDir, RecommendationBridge) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recommender.sh");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", script_body).unwrap();

        let bridge = RecommendationBridge::new(
            "sh".to_string(),
            path.to_str().unwrap().to_string(),
            Duration::from_secs(5),
        );
        (dir, bridge)
    }

    #[tokio::test]
    async fn test_successful_run_decodes_json() {
        let (_dir, bridge) = fake_recommender(
            r#"echo '{"reference_favorite":{"name":"Taco Hut"},"recommendations":[{"name":"Burger Barn"}]}'"#,
        );

        let result = bridge.get_recommendations("slo", "token").await.unwrap();
        assert_eq!(result.reference_favorite.unwrap().name, "Taco Hut");
        assert_eq!(result.recommendations[0].name, "Burger Barn");
    }

    #[tokio::test]
    async fn test_arguments_reach_the_child() {
        let (_dir, bridge) = fake_recommender(
            r#"printf '{"recommendations":[{"name":"%s %s"}]}' "$1" "$2""#,
        );

        let result = bridge.get_recommendations("slo", "tok123").await.unwrap();
        assert_eq!(result.recommendations[0].name, "slo tok123");
    }

    #[tokio::test]
    async fn test_nonzero_exit_carries_stderr() {
        let (_dir, bridge) = fake_recommender("echo 'model unavailable' >&2; exit 1");

        let err = bridge.get_recommendations("slo", "token").await.unwrap_err();
        match err {
            AppError::ComputationFailed { details } => {
                assert!(details.contains("model unavailable"));
            }
            other => panic!("expected ComputationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_stdout_is_malformed_result() {
        let (_dir, bridge) = fake_recommender("echo 'Traceback (most recent call last):'");

        let err = bridge.get_recommendations("slo", "token").await.unwrap_err();
        match err {
            AppError::MalformedResult { raw } => assert!(raw.contains("Traceback")),
            other => panic!("expected MalformedResult, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deadline_expiry_is_computation_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recommender.sh");
        std::fs::write(&path, "sleep 30\n").unwrap();

        let bridge = RecommendationBridge::new(
            "sh".to_string(),
            path.to_str().unwrap().to_string(),
            Duration::from_millis(200),
        );

        let err = bridge.get_recommendations("slo", "token").await.unwrap_err();
        match err {
            AppError::ComputationFailed { details } => {
                assert!(details.contains("timed out"));
            }
            other => panic!("expected ComputationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unspawnable_command_is_computation_failed() {
        let bridge = RecommendationBridge::new(
            "/nonexistent/recommender".to_string(),
            "recommender.py".to_string(),
            Duration::from_secs(1),
        );

        let err = bridge.get_recommendations("slo", "token").await.unwrap_err();
        assert!(matches!(err, AppError::ComputationFailed { .. }));
    }
}
