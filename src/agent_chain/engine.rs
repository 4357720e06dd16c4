//! C5: runs a chain in one of its three modes, owning the chain data bag,
//! execution log, and final status for the duration of a single run.

use crate::agent_chain::archiver::ResultArchiver;
use crate::agent_chain::chain_registry::ChainRegistry;
use crate::agent_chain::condition::evaluate_conditions;
use crate::agent_chain::config::EngineConfig;
use crate::agent_chain::executor::ExecutorInput;
use crate::agent_chain::model::{
    AgentChain, AgentDefinition, AgentExecutionError, AgentExecutionLog, ChainDataBag,
    ChainExecutionRequest, ChainExecutionResult, ExecutionMode, ExecutionStatus, StepStatus,
};
use crate::agent_chain::registry::AgentRegistry;
use crate::agent_chain::retry::run_with_retry;
use crate::agent_chain::tracker::ExecutionTracker;
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub struct ExecutionEngine {
    config: EngineConfig,
    chain_registry: Arc<ChainRegistry>,
    agent_registry: Arc<AgentRegistry>,
    tracker: Arc<ExecutionTracker>,
    archiver: Option<Arc<ResultArchiver>>,
}

impl ExecutionEngine {
    pub fn new(
        config: EngineConfig,
        chain_registry: Arc<ChainRegistry>,
        agent_registry: Arc<AgentRegistry>,
        tracker: Arc<ExecutionTracker>,
        archiver: Option<Arc<ResultArchiver>>,
    ) -> Self {
        Self {
            config,
            chain_registry,
            agent_registry,
            tracker,
            archiver,
        }
    }

    pub async fn execute(&self, request: ChainExecutionRequest) -> ChainExecutionResult {
        let mut result = ChainExecutionResult::new(request.chain_id.clone(), request.owner_id);
        self.tracker.register(result.clone());

        let chain = match self.chain_registry.load_chain_definition(&request.chain_id) {
            Ok(chain) => chain,
            Err(e) => {
                result.status = ExecutionStatus::Failed;
                result.errors.push(AgentExecutionError {
                    agent_id: String::new(),
                    agent_name: String::new(),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                result.end = Some(Utc::now());
                self.finish(&result).await;
                return result;
            }
        };

        let mut bag = ChainDataBag::new();
        for (k, v) in request.initial_data.clone() {
            bag.insert(k, v);
        }
        bag.insert("user_id".to_string(), Value::String(request.owner_id.to_string()));

        let effective_timeout = self.config.effective_chain_timeout_seconds(chain.timeout_seconds);
        let chain_token = CancellationToken::new();
        let timeout_token = chain_token.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(effective_timeout)).await;
            timeout_token.cancel();
        });

        let any_fatal = match chain.mode {
            ExecutionMode::Sequential => {
                self.run_sequential(&chain, &mut bag, &chain_token, &mut result).await
            }
            ExecutionMode::Parallel => {
                self.run_parallel(&chain, &mut bag, &chain_token, &mut result).await
            }
            ExecutionMode::Conditional => {
                self.run_conditional(&chain, &mut bag, &chain_token, &mut result).await
            }
        };
        timer.abort();

        result.results = bag;
        result.end = Some(Utc::now());
        result.status = if chain_token.is_cancelled() {
            ExecutionStatus::Timeout
        } else if any_fatal {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Completed
        };

        log::info!(
            "chain '{}' execution {} finished with status {:?}",
            chain.id,
            result.id,
            result.status
        );

        self.finish(&result).await;

        if result.status == ExecutionStatus::Completed {
            if let Some(archiver) = &self.archiver {
                if let Err(e) = archiver.archive(request.owner_id, &chain, &result).await {
                    log::warn!("archival failed for execution {}: {}", result.id, e);
                }
            }
        }

        result
    }

    async fn finish(&self, result: &ChainExecutionResult) {
        self.tracker.update(result.clone());
        self.tracker.save_execution_result(result).await;
        self.tracker.unregister(&result.id);
    }

    async fn run_sequential(
        &self,
        chain: &AgentChain,
        bag: &mut ChainDataBag,
        chain_token: &CancellationToken,
        result: &mut ChainExecutionResult,
    ) -> bool {
        for agent in &chain.agents {
            if chain_token.is_cancelled() {
                break;
            }
            if !evaluate_conditions(&agent.conditions, bag) {
                continue;
            }
            let log = Self::invoke_agent(
                &self.agent_registry,
                self.config.max_agent_timeout_seconds,
                agent,
                bag,
                chain_token,
            )
            .await;
            self.tracker.append_step_record(&result.id, &log).await;

            let failed = log.status == StepStatus::Failed;
            if failed {
                result.errors.push(AgentExecutionError {
                    agent_id: agent.id.clone(),
                    agent_name: agent.name.clone(),
                    error_message: log.error_message.clone().unwrap_or_default(),
                    timestamp: log.end,
                });
            } else if !agent.output_key.is_empty() {
                if let Some(value) = &log.output {
                    bag.insert(agent.output_key.clone(), value.clone());
                }
            }
            result.execution_log.push(log);
            if failed {
                return true;
            }
        }
        false
    }

    async fn run_conditional(
        &self,
        chain: &AgentChain,
        bag: &mut ChainDataBag,
        chain_token: &CancellationToken,
        result: &mut ChainExecutionResult,
    ) -> bool {
        for agent in &chain.agents {
            if chain_token.is_cancelled() {
                break;
            }
            if !evaluate_conditions(&agent.conditions, bag) {
                continue;
            }
            let log = Self::invoke_agent(
                &self.agent_registry,
                self.config.max_agent_timeout_seconds,
                agent,
                bag,
                chain_token,
            )
            .await;
            self.tracker.append_step_record(&result.id, &log).await;

            if log.status == StepStatus::Failed {
                result.errors.push(AgentExecutionError {
                    agent_id: agent.id.clone(),
                    agent_name: agent.name.clone(),
                    error_message: log.error_message.clone().unwrap_or_default(),
                    timestamp: log.end,
                });
            } else if !agent.output_key.is_empty() {
                if let Some(value) = &log.output {
                    bag.insert(agent.output_key.clone(), value.clone());
                }
            }
            result.execution_log.push(log);
        }
        false
    }

    async fn run_parallel(
        &self,
        chain: &AgentChain,
        bag: &mut ChainDataBag,
        chain_token: &CancellationToken,
        result: &mut ChainExecutionResult,
    ) -> bool {
        let snapshot = bag.clone();
        let mut handles = Vec::with_capacity(chain.agents.len());

        for agent in &chain.agents {
            let agent_registry = self.agent_registry.clone();
            let max_agent_timeout = self.config.max_agent_timeout_seconds;
            let agent = agent.clone();
            let snapshot = snapshot.clone();
            let chain_token = chain_token.clone();
            handles.push(tokio::spawn(async move {
                if !evaluate_conditions(&agent.conditions, &snapshot) {
                    return None;
                }
                Some(
                    ExecutionEngine::invoke_agent(
                        &agent_registry,
                        max_agent_timeout,
                        &agent,
                        &snapshot,
                        &chain_token,
                    )
                    .await,
                )
            }));
        }

        let mut any_failed = false;
        for (agent, handle) in chain.agents.iter().zip(handles.into_iter()) {
            match handle.await {
                Ok(Some(log)) => {
                    self.tracker.append_step_record(&result.id, &log).await;
                    if log.status == StepStatus::Failed {
                        any_failed = true;
                        result.errors.push(AgentExecutionError {
                            agent_id: agent.id.clone(),
                            agent_name: agent.name.clone(),
                            error_message: log.error_message.clone().unwrap_or_default(),
                            timestamp: log.end,
                        });
                    } else if !agent.output_key.is_empty() {
                        if let Some(value) = &log.output {
                            bag.insert(agent.output_key.clone(), value.clone());
                        }
                    }
                    result.execution_log.push(log);
                }
                Ok(None) => {}
                Err(join_err) => {
                    any_failed = true;
                    result.errors.push(AgentExecutionError {
                        agent_id: agent.id.clone(),
                        agent_name: agent.name.clone(),
                        error_message: format!("agent task panicked: {}", join_err),
                        timestamp: Utc::now(),
                    });
                }
            }
        }
        any_failed
    }

    /// Build the executor input, dispatch through the retry controller
    /// under an independent per-agent cancellation token, and produce a
    /// single log entry for the call regardless of how many attempts it
    /// took.
    async fn invoke_agent(
        agent_registry: &Arc<AgentRegistry>,
        max_agent_timeout_seconds: u64,
        agent: &AgentDefinition,
        bag: &ChainDataBag,
        chain_token: &CancellationToken,
    ) -> AgentExecutionLog {
        let start = Utc::now();
        let input = build_executor_input(agent, bag);

        let executor = match agent_registry.get(agent.kind) {
            Some(e) => e,
            None => {
                let end = Utc::now();
                return AgentExecutionLog {
                    agent_id: agent.id.clone(),
                    agent_name: agent.name.clone(),
                    status: StepStatus::Failed,
                    input: Value::Object(input),
                    output: None,
                    error_message: Some(format!("agent kind '{}' is not registered", agent.kind.as_str())),
                    start,
                    end,
                };
            }
        };

        // Derived from the chain token so a chain-level timeout cancels any
        // agent in flight, independent of the per-agent timeout cap below.
        let per_agent_token = chain_token.child_token();
        let cap_token = per_agent_token.clone();
        let cap_timer = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(max_agent_timeout_seconds)).await;
            cap_token.cancel();
        });

        let outcome = run_with_retry(executor.as_ref(), &agent.retry_policy, per_agent_token, &input).await;
        cap_timer.abort();

        let end = Utc::now();
        match outcome {
            Ok(value) => AgentExecutionLog {
                agent_id: agent.id.clone(),
                agent_name: agent.name.clone(),
                status: StepStatus::Completed,
                input: Value::Object(input),
                output: Some(value),
                error_message: None,
                start,
                end,
            },
            Err(error) => AgentExecutionLog {
                agent_id: agent.id.clone(),
                agent_name: agent.name.clone(),
                status: StepStatus::Failed,
                input: Value::Object(input),
                output: None,
                error_message: Some(error.to_string()),
                start,
                end,
            },
        }
    }
}

/// Merge an agent's static `config` with whatever `input_mapping` pulls
/// from the chain data bag, then forward `user_id` when present.
fn build_executor_input(agent: &AgentDefinition, bag: &ChainDataBag) -> ExecutorInput {
    let mut input: ExecutorInput = Map::new();
    for (key, value) in &agent.config {
        input.insert(key.clone(), value.clone());
    }
    for (agent_key, chain_key) in &agent.input_mapping {
        if let Some(value) = bag.get(chain_key) {
            input.insert(agent_key.clone(), value.clone());
        }
    }
    if let Some(user_id) = bag.get("user_id") {
        input.insert("user_id".to_string(), user_id.clone());
    }
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent_chain::collaborators::doubles::{NullAuthoring, ScriptedLlm, ScriptedSearch};
    use crate::agent_chain::executors::{
        CodeGeneratorExecutor, NoteAnalyzerExecutor, ReasoningExecutor, SummarizerExecutor,
        TaskPlannerExecutor, WebSearchExecutor,
    };
    use crate::agent_chain::error::CoreError;
    use crate::agent_chain::model::{AgentKind, ChainCondition};
    use crate::agent_chain::persistence::FileChainPersistence;
    use serde_json::json;
    use uuid::Uuid;

    fn build_engine(responses: Vec<Result<String, String>>) -> (ExecutionEngine, tempfile::TempDir) {
        let mut registry = AgentRegistry::new();
        let llm = Arc::new(ScriptedLlm::new(responses));
        registry.register(Arc::new(ReasoningExecutor::new(llm.clone())));
        registry.register(Arc::new(SummarizerExecutor::new(llm.clone())));
        registry.register(Arc::new(NoteAnalyzerExecutor::new(llm.clone())));
        registry.register(Arc::new(TaskPlannerExecutor::new(llm.clone(), Arc::new(NullAuthoring))));
        registry.register(Arc::new(CodeGeneratorExecutor::new(llm.clone())));
        registry.register(Arc::new(WebSearchExecutor::new(Arc::new(ScriptedSearch {
            answer: "answer".into(),
            sources: vec!["s1".into(), "s2".into()],
        }))));
        let agent_registry = Arc::new(registry);
        let dir = tempfile::tempdir().unwrap();
        let persistence: Arc<dyn crate::agent_chain::persistence::ChainPersistence> =
            Arc::new(FileChainPersistence::open(dir.path()).unwrap());
        let chain_registry = Arc::new(ChainRegistry::new(agent_registry.clone(), persistence.clone()));
        let tracker = Arc::new(ExecutionTracker::new(persistence));
        let engine = ExecutionEngine::new(EngineConfig::default(), chain_registry, agent_registry, tracker, None);
        (engine, dir)
    }

    #[tokio::test]
    async fn s1_sequential_happy_path() {
        let (engine, _dir) = build_engine(vec![Ok("analysis text".into()), Ok("summary text".into())]);
        let chain = engine.chain_registry.load_chain_definition("research-and-summarize").unwrap();
        let owner = Uuid::new_v4();
        engine.chain_registry.create_custom_chain(chain.clone()).await.ok();
        let mut initial = std::collections::HashMap::new();
        initial.insert("search_query".to_string(), json!("quantum error correction"));
        let request = ChainExecutionRequest {
            chain_id: "research-and-summarize".to_string(),
            initial_data: initial,
            owner_id: owner,
        };
        let result = engine.execute(request).await;
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.execution_log.len(), 3);
        assert!(result.results.contains_key("search_results"));
        assert!(result.results.contains_key("analysis"));
        assert!(result.results.contains_key("summary"));
    }

    #[tokio::test]
    async fn s2_parallel_mixed_outcome() {
        let mut registry = AgentRegistry::new();
        struct AlwaysOk;
        struct AlwaysFail;
        #[async_trait::async_trait]
        impl crate::agent_chain::executor::AgentExecutor for AlwaysOk {
            fn kind(&self) -> AgentKind {
                AgentKind::Reasoning
            }
            async fn execute(
                &self,
                _c: CancellationToken,
                _i: &ExecutorInput,
            ) -> Result<Value, CoreError> {
                Ok(json!("x"))
            }
        }
        #[async_trait::async_trait]
        impl crate::agent_chain::executor::AgentExecutor for AlwaysFail {
            fn kind(&self) -> AgentKind {
                AgentKind::Summarizer
            }
            async fn execute(
                &self,
                _c: CancellationToken,
                _i: &ExecutorInput,
            ) -> Result<Value, CoreError> {
                Err(CoreError::ExecutorFailure("boom".to_string()))
            }
        }
        registry.register(Arc::new(AlwaysOk));
        registry.register(Arc::new(AlwaysFail));
        let agent_registry = Arc::new(registry);
        let dir = tempfile::tempdir().unwrap();
        let persistence: Arc<dyn crate::agent_chain::persistence::ChainPersistence> =
            Arc::new(FileChainPersistence::open(dir.path()).unwrap());
        let chain_registry = Arc::new(ChainRegistry::new(agent_registry.clone(), persistence.clone()));
        let tracker = Arc::new(ExecutionTracker::new(persistence));
        let engine = ExecutionEngine::new(EngineConfig::default(), chain_registry, agent_registry, tracker, None);

        let owner = Uuid::new_v4();
        let chain = AgentChain::new("parallel-mixed", ExecutionMode::Parallel, owner)
            .with_agent(
                AgentDefinition::new("a", AgentKind::Reasoning, "A")
                    .with_output_key("a")
                    .with_retry_policy(crate::agent_chain::model::RetryPolicy::default().with_max_retries(1)),
            )
            .with_agent(
                AgentDefinition::new("b", AgentKind::Summarizer, "B")
                    .with_output_key("b")
                    .with_retry_policy(crate::agent_chain::model::RetryPolicy::default().with_max_retries(1).with_backoff_seconds(0)),
            );
        let admitted = engine.chain_registry.create_custom_chain(chain).await.unwrap();
        let request = ChainExecutionRequest {
            chain_id: admitted.id,
            initial_data: std::collections::HashMap::new(),
            owner_id: owner,
        };
        let result = engine.execute(request).await;
        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.results.get("a"), Some(&json!("x")));
        assert!(!result.results.contains_key("b"));
    }

    #[tokio::test]
    async fn s3_conditional_skip() {
        let (engine, _dir) = build_engine(vec![Ok("out1".into())]);
        let owner = Uuid::new_v4();
        let chain = AgentChain::new("conditional-skip", ExecutionMode::Conditional, owner)
            .with_agent(
                AgentDefinition::new("first", AgentKind::Reasoning, "First")
                    .with_input_mapping("problem", "seed")
                    .with_output_key("out1"),
            )
            .with_agent(
                AgentDefinition::new("second", AgentKind::Summarizer, "Second")
                    .with_conditions(vec![ChainCondition::new("equals", "a", json!("x"))]),
            );
        let admitted = engine.chain_registry.create_custom_chain(chain).await.unwrap();
        let mut initial = std::collections::HashMap::new();
        initial.insert("seed".to_string(), json!("problem text"));
        initial.insert("a".to_string(), json!("y"));
        let request = ChainExecutionRequest {
            chain_id: admitted.id,
            initial_data: initial,
            owner_id: owner,
        };
        let result = engine.execute(request).await;
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert_eq!(result.execution_log.len(), 1);
    }

    #[tokio::test]
    async fn s6_unknown_condition_type_skips() {
        let (engine, _dir) = build_engine(vec![Ok("out".into())]);
        let owner = Uuid::new_v4();
        let chain = AgentChain::new("unknown-condition", ExecutionMode::Sequential, owner).with_agent(
            AgentDefinition::new("a", AgentKind::Reasoning, "A")
                .with_input_mapping("problem", "seed")
                .with_conditions(vec![ChainCondition::new("foo", "a", json!(1))]),
        );
        let admitted = engine.chain_registry.create_custom_chain(chain).await.unwrap();
        let mut initial = std::collections::HashMap::new();
        initial.insert("seed".to_string(), json!("x"));
        let request = ChainExecutionRequest {
            chain_id: admitted.id,
            initial_data: initial,
            owner_id: owner,
        };
        let result = engine.execute(request).await;
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert!(result.execution_log.is_empty());
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn chain_not_found_fails_immediately() {
        let (engine, _dir) = build_engine(vec![]);
        let request = ChainExecutionRequest {
            chain_id: "does-not-exist".to_string(),
            initial_data: std::collections::HashMap::new(),
            owner_id: Uuid::new_v4(),
        };
        let result = engine.execute(request).await;
        assert_eq!(result.status, ExecutionStatus::Failed);
        assert_eq!(result.errors.len(), 1);
    }
}
