//! One executor implementation per [`AgentKind`](crate::agent_chain::model::AgentKind).

pub mod chat;
pub mod code_generator;
pub mod note_analyzer;
pub mod reasoning;
pub mod summarizer;
pub mod task_planner;
pub mod web_search;

pub use chat::ChatExecutor;
pub use code_generator::CodeGeneratorExecutor;
pub use note_analyzer::NoteAnalyzerExecutor;
pub use reasoning::ReasoningExecutor;
pub use summarizer::SummarizerExecutor;
pub use task_planner::TaskPlannerExecutor;
pub use web_search::WebSearchExecutor;
