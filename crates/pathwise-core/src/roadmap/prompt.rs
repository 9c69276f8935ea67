//! Prompt construction for roadmap generation.
//!
//! Pure logic: the same request always yields the same prompt.

use crate::request::RoadmapRequest;

/// Output contract included in every prompt.
const SCHEMA_REFERENCE: &str = r#"Format the response as a JSON object with the following structure:
{
  "title": "Main topic title",
  "description": "Brief overview of the roadmap",
  "steps": [
    {
      "title": "Step 1 title",
      "description": "Step 1 description",
      "resources": ["https://example.com/resource1", "https://example.com/resource2"]
    }
  ]
}
"#;

const OUTPUT_RULES: &str = "Important:
1. Return only the raw JSON object, without any markdown formatting or code blocks.
2. For resources, provide full URLs when possible. If a URL is not available, provide a descriptive title of the resource.
";

/// Build the generation prompt for a validated request.
///
/// Each of the four inputs appears exactly once, followed by the schema the
/// model must answer with.
pub fn build_prompt(request: &RoadmapRequest) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(
        "Generate a personalized learning roadmap based on the following details:\n",
    );
    prompt.push_str(&format!("Main goal: \"{}\".\n", request.goal()));
    prompt.push_str(&format!("Current skill level: {}.\n", request.skill_level));
    prompt.push_str(&format!("Time available: {}.\n", request.time_commitment));
    prompt.push_str(&format!(
        "Preferred learning style: {}.\n\n",
        request.learning_style
    ));

    prompt.push_str(SCHEMA_REFERENCE);
    prompt.push('\n');
    prompt.push_str(OUTPUT_RULES);

    prompt
}
