//! Parameterised construction of the built-in chain templates. The
//! surrounding CLI/HTTP layer is what actually exposes these to end
//! users; this module owns the pure chain-construction logic, the same
//! way builder methods compose a ready-to-run object elsewhere in this
//! crate.

use crate::agent_chain::model::{AgentChain, AgentDefinition, AgentKind, ExecutionMode};
use serde_json::json;
use uuid::Uuid;

/// `shallow` / `medium` / `deep` map to result count, timeout, and
/// reasoning strategy.
pub fn research_template(topic: &str, depth: &str, owner_id: Uuid) -> AgentChain {
    let (max_results, timeout_seconds, strategy) = match depth {
        "shallow" => (3, 180, "quick"),
        "deep" => (10, 600, "comprehensive"),
        _ => (5, 300, "balanced"),
    };

    AgentChain::new(format!("Research: {}", topic), ExecutionMode::Sequential, owner_id)
        .with_timeout_seconds(timeout_seconds)
        .with_agent(
            AgentDefinition::new("search", AgentKind::WebSearch, "Web Search")
                .with_config("query", json!(topic))
                .with_config("max_results", json!(max_results))
                .with_output_key("search_results"),
        )
        .with_agent(
            AgentDefinition::new("reason", AgentKind::Reasoning, "Analysis")
                .with_config("strategy", json!(strategy))
                .with_input_mapping("problem", "search_results")
                .with_output_key("analysis"),
        )
        .with_agent(
            AgentDefinition::new("summarize", AgentKind::Summarizer, "Summary")
                .with_input_mapping("content", "analysis")
                .with_output_key("summary"),
        )
}

pub fn writing_template(topic: &str, style: &str, _length: &str, owner_id: Uuid) -> AgentChain {
    AgentChain::new(format!("Writing: {}", topic), ExecutionMode::Sequential, owner_id)
        .with_agent(
            AgentDefinition::new("outline", AgentKind::TaskPlanner, "Outline")
                .with_config("goal", json!(topic))
                .with_output_key("outline"),
        )
        .with_agent(
            AgentDefinition::new("draft", AgentKind::Reasoning, "Draft")
                .with_config("strategy", json!("focused"))
                .with_input_mapping("problem", "outline")
                .with_config("style", json!(style))
                .with_output_key("draft"),
        )
}

pub fn learning_template(subject: &str, _level: &str, timeframe: &str, owner_id: Uuid) -> AgentChain {
    let timeout_seconds = match timeframe {
        "week" => 300,
        "month" => 600,
        _ => 450,
    };
    AgentChain::new(format!("Learning: {}", subject), ExecutionMode::Sequential, owner_id)
        .with_timeout_seconds(timeout_seconds)
        .with_agent(
            AgentDefinition::new("search", AgentKind::WebSearch, "Web Search")
                .with_config("query", json!(subject))
                .with_output_key("search_results"),
        )
        .with_agent(
            AgentDefinition::new("curriculum", AgentKind::Reasoning, "Curriculum")
                .with_config("strategy", json!("methodical"))
                .with_input_mapping("problem", "search_results")
                .with_output_key("curriculum"),
        )
        .with_agent(
            AgentDefinition::new("study_plan", AgentKind::Summarizer, "Study Plan")
                .with_config("style", json!("bullet"))
                .with_input_mapping("content", "curriculum")
                .with_output_key("study_plan"),
        )
}

pub fn project_planning_template(
    project_name: &str,
    goals: &str,
    _constraints: &str,
    owner_id: Uuid,
) -> AgentChain {
    AgentChain::new(format!("Project Plan: {}", project_name), ExecutionMode::Sequential, owner_id)
        .with_agent(
            AgentDefinition::new("plan", AgentKind::TaskPlanner, "Plan")
                .with_config("goal", json!(goals))
                .with_config("create_tasks", json!(true))
                .with_output_key("plan"),
        )
        .with_agent(
            AgentDefinition::new("risk", AgentKind::Reasoning, "Risk Assessment")
                .with_config("strategy", json!("comprehensive"))
                .with_input_mapping("problem", "plan")
                .with_output_key("risk_assessment"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn research_template_depth_mapping() {
        let owner = Uuid::new_v4();
        let shallow = research_template("rust", "shallow", owner);
        assert_eq!(shallow.timeout_seconds, 180);
        let deep = research_template("rust", "deep", owner);
        assert_eq!(deep.timeout_seconds, 600);
        let medium = research_template("rust", "medium", owner);
        assert_eq!(medium.timeout_seconds, 300);
    }

    #[test]
    fn writing_template_has_two_sequential_agents() {
        let chain = writing_template("blog post", "casual", "short", Uuid::new_v4());
        assert_eq!(chain.agents.len(), 2);
        assert_eq!(chain.mode, ExecutionMode::Sequential);
    }
}
