//! `pathwise generate`: run the generation pipeline for the current user.

use std::sync::Arc;

use anyhow::{Result, bail};
use sqlx::PgPool;

use pathwise_core::generation::{GeminiClient, GenerationConfig};
use pathwise_core::identity::{Identity, require_user};
use pathwise_core::request::{LearningStyle, RoadmapRequest, SkillLevel, TimeCommitment};
use pathwise_core::roadmap::RoadmapStore;
use pathwise_core::{GenerationSession, GenerationStatus, RoadmapError};

use crate::roadmap_cmds::render_roadmap;

/// Raw request values as typed on the command line.
#[derive(Debug, Default)]
pub struct GenerateArgs {
    pub goal: String,
    pub skill_level: Option<String>,
    pub time_commitment: Option<String>,
    pub learning_style: Option<String>,
}

impl GenerateArgs {
    /// Validate into a request. Missing values are reported by field name.
    pub fn to_request(&self) -> Result<RoadmapRequest, RoadmapError> {
        Ok(RoadmapRequest::parse(
            &self.goal,
            self.skill_level.as_deref().unwrap_or_default(),
            self.time_commitment.as_deref().unwrap_or_default(),
            self.learning_style.as_deref().unwrap_or_default(),
        )?)
    }
}

/// Everything `generate` needs before it touches the database.
pub struct PreparedGeneration {
    user_id: String,
    request: RoadmapRequest,
    client: Arc<GeminiClient>,
}

/// Check the request, the user and the model config, in that order.
///
/// Runs before a pool is opened, so an incomplete request is reported even
/// when the database is unreachable.
pub fn prepare(
    identity: &dyn Identity,
    generation: Result<GenerationConfig>,
    args: &GenerateArgs,
) -> Result<PreparedGeneration> {
    let request = match args.to_request() {
        Ok(request) => request,
        Err(err) => {
            print_choices();
            bail!(err.user_message());
        }
    };
    let user_id = require_user(identity)?;
    let client = Arc::new(GeminiClient::new(generation?)?);
    Ok(PreparedGeneration {
        user_id,
        request,
        client,
    })
}

/// Run the generate command. Ctrl+C cancels the in-flight request and
/// nothing is saved.
pub async fn run_generate(pool: &PgPool, prepared: PreparedGeneration) -> Result<()> {
    let PreparedGeneration {
        user_id,
        request,
        client,
    } = prepared;
    let store = RoadmapStore::new(pool.clone());

    println!(
        "Generating a {} roadmap for \"{}\" (Ctrl+C to cancel)...",
        request.skill_level.label().to_lowercase(),
        request.goal()
    );

    let session = GenerationSession::start(client, store, user_id, request);
    let status = tokio::select! {
        status = session.wait() => status,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nCancelling...");
            session.cancel();
            session.wait().await
        }
    };

    match status {
        GenerationStatus::Succeeded(roadmap) => {
            println!();
            print!("{}", render_roadmap(&roadmap, None));
            println!();
            println!("Saved as {}.", roadmap.id);
            Ok(())
        }
        GenerationStatus::Failed(message) => bail!(message),
        GenerationStatus::Cancelled => bail!("generation cancelled; nothing was saved"),
        GenerationStatus::InFlight => bail!("generation did not finish"),
    }
}

fn print_choices() {
    let join = |labels: Vec<&str>| labels.join(" | ");
    eprintln!(
        "  --skill-level      {}",
        join(SkillLevel::ALL.iter().map(|v| v.label()).collect())
    );
    eprintln!(
        "  --time-commitment  {}",
        join(TimeCommitment::ALL.iter().map(|v| v.label()).collect())
    );
    eprintln!(
        "  --learning-style   {}",
        join(LearningStyle::ALL.iter().map(|v| v.label()).collect())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathwise_core::identity::StaticIdentity;

    #[test]
    fn full_args_build_a_request() {
        let args = GenerateArgs {
            goal: "learn Go".into(),
            skill_level: Some("beginner".into()),
            time_commitment: Some("5 to 10 hours per week".into()),
            learning_style: Some("hands-on projects".into()),
        };
        let request = args.to_request().unwrap();
        assert_eq!(request.goal(), "learn Go");
        assert_eq!(request.skill_level, SkillLevel::Beginner);
    }

    #[test]
    fn missing_style_is_named_in_the_message() {
        let args = GenerateArgs {
            goal: "learn Go".into(),
            skill_level: Some("Beginner".into()),
            time_commitment: Some("5 to 10 hours per week".into()),
            learning_style: None,
        };
        let err = args.to_request().unwrap_err();
        assert_eq!(err.user_message(), "Learning style is required.");
    }

    #[test]
    fn prepare_reports_incomplete_request_before_anything_else() {
        let args = GenerateArgs {
            goal: "learn Go".into(),
            skill_level: Some("Beginner".into()),
            time_commitment: Some("5 to 10 hours per week".into()),
            learning_style: None,
        };
        let err = prepare(
            &StaticIdentity::anonymous(),
            Err(anyhow::anyhow!("no API key configured")),
            &args,
        )
        .err()
        .unwrap();
        assert_eq!(err.to_string(), "Learning style is required.");
    }

    #[test]
    fn prepare_requires_a_user_for_a_valid_request() {
        let args = GenerateArgs {
            goal: "learn Go".into(),
            skill_level: Some("Beginner".into()),
            time_commitment: Some("5 to 10 hours per week".into()),
            learning_style: Some("Hands-on projects".into()),
        };
        let err = prepare(
            &StaticIdentity::anonymous(),
            Ok(GenerationConfig::new("key")),
            &args,
        )
        .err()
        .unwrap();
        assert!(err.downcast_ref::<RoadmapError>().is_some(), "{err:#}");
    }

    #[test]
    fn prepare_builds_a_client_for_a_signed_in_user() {
        let args = GenerateArgs {
            goal: "learn Go".into(),
            skill_level: Some("Beginner".into()),
            time_commitment: Some("5 to 10 hours per week".into()),
            learning_style: Some("Hands-on projects".into()),
        };
        let prepared = prepare(
            &StaticIdentity::signed_in("user-1"),
            Ok(GenerationConfig::new("key")),
            &args,
        )
        .unwrap();
        assert_eq!(prepared.user_id, "user-1");
        assert_eq!(prepared.request.goal(), "learn Go");
    }
}
