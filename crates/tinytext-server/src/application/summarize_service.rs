//! Summarize Application Service (Use Case)
//!
//! Drives the normalization pipeline against the vision model and wraps it
//! in the model-tier fallback loop. Only the extraction call can fail a
//! tier; re-bucket and repair calls are best-effort.

use std::sync::Arc;

use tinytext::{
    Catalog, DomainError, Language, ModelOutput, ParsedOutput, PipelineOutcome, PipelineState,
    PromptBuilder, ResponseNormalizer, Stage, SummaryPayload, TokenUsage, VisionOptions,
    VisionRequest, VisionSummarizer, SYSTEM_INSTRUCTION,
};

/// Input of one summarize run
#[derive(Debug, Clone)]
pub struct SummarizeCommand {
    /// Base64 image data without a data-URI prefix
    pub image_base64: String,
    pub language: Language,
    /// Restrict the run to this tier
    pub force_model: Option<String>,
}

/// How a run went
#[derive(Debug, Clone)]
pub struct RunMeta {
    pub model_used: String,
    pub fallback_used: bool,
    pub tiers_tried: Vec<String>,
    pub stages: Vec<Stage>,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone)]
pub struct SummarizeOutcome {
    pub payload: SummaryPayload,
    pub meta: RunMeta,
}

/// Application service for image summarization
pub struct SummarizeService<V: VisionSummarizer + ?Sized> {
    summarizer: Arc<V>,
    normalizer: ResponseNormalizer,
    prompts: PromptBuilder,
    tiers: Vec<String>,
    options: VisionOptions,
}

impl<V: VisionSummarizer + ?Sized> SummarizeService<V> {
    pub fn new(
        summarizer: Arc<V>,
        catalog: Arc<Catalog>,
        tiers: Vec<String>,
        options: VisionOptions,
    ) -> Self {
        Self {
            summarizer,
            normalizer: ResponseNormalizer::new(catalog.clone()),
            prompts: PromptBuilder::new(catalog),
            tiers,
            options,
        }
    }

    /// Whether the vision provider is reachable
    pub async fn health_check(&self) -> bool {
        match self.summarizer.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("⚠️  {} health check error: {}", self.summarizer.provider_name(), e);
                false
            }
        }
    }

    /// Summarize an image, falling back to stronger tiers on failure or an
    /// empty result
    pub async fn summarize(
        &self,
        command: &SummarizeCommand,
    ) -> Result<SummarizeOutcome, DomainError> {
        let tiers = self.select_tiers(command.force_model.as_deref())?;

        let mut usage = TokenUsage::default();
        let mut tiers_tried = Vec::with_capacity(tiers.len());
        let mut last: Option<(String, PipelineOutcome)> = None;
        let mut last_error: Option<DomainError> = None;

        for (index, model) in tiers.iter().enumerate() {
            let has_next = index + 1 < tiers.len();
            tiers_tried.push(model.to_string());

            match self.run_pipeline(model, command, &mut usage).await {
                Ok(outcome) => {
                    let empty = outcome.totally_empty;
                    last = Some((model.to_string(), outcome));
                    if !empty {
                        break;
                    }
                    if has_next {
                        tracing::info!("🔁 {} returned nothing readable, trying next tier", model);
                    }
                }
                Err(e) => {
                    tracing::warn!("⚠️  Tier {} failed: {}", model, e);
                    last_error = Some(e);
                }
            }
        }

        let Some((model_used, outcome)) = last else {
            return Err(last_error.unwrap_or_else(|| {
                DomainError::ExternalService("no model tier produced a result".to_string())
            }));
        };

        Ok(SummarizeOutcome {
            payload: outcome.payload,
            meta: RunMeta {
                model_used,
                fallback_used: tiers_tried.len() > 1,
                tiers_tried,
                stages: outcome.history,
                usage,
            },
        })
    }

    /// One full pass of the pipeline on a single tier
    async fn run_pipeline(
        &self,
        model: &str,
        command: &SummarizeCommand,
        usage: &mut TokenUsage,
    ) -> Result<PipelineOutcome, DomainError> {
        let image = command.image_base64.as_str();
        let state = PipelineState::new(command.language.clone());

        let prompt = self.prompts.extraction(&state.language);
        let extraction = self.call(model, &prompt, image, usage).await?;
        let state = self.normalizer.extracted(state, extraction.into_output());

        let prompt = self
            .prompts
            .rebucket(state.domain, &state.language, &state.categories);
        let rebucket = self.try_call(model, &prompt, image, usage, Stage::Rebucketed).await;
        let state = self.normalizer.summarized(self.normalizer.rebucketed(state, rebucket));

        let state = if self.normalizer.needs_repair(&state) {
            tracing::debug!("All {} categories empty, requesting repair", state.domain);
            let prompt = self.prompts.repair(state.domain, &state.language);
            let repair = self.try_call(model, &prompt, image, usage, Stage::Repaired).await;
            self.normalizer.repaired(state, repair)
        } else {
            state
        };

        Ok(self.normalizer.finish(state))
    }

    async fn call(
        &self,
        model: &str,
        prompt: &str,
        image_base64: &str,
        usage: &mut TokenUsage,
    ) -> Result<ParsedOutput, DomainError> {
        let request = VisionRequest {
            model,
            system: SYSTEM_INSTRUCTION,
            prompt,
            image_base64,
            options: &self.options,
        };

        let response = self.summarizer.summarize(&request).await?;
        *usage += response.usage;
        Ok(ParsedOutput::parse(&response.content))
    }

    /// Best-effort call: any failure becomes `None`
    async fn try_call(
        &self,
        model: &str,
        prompt: &str,
        image_base64: &str,
        usage: &mut TokenUsage,
        stage: Stage,
    ) -> Option<ModelOutput> {
        match self.call(model, prompt, image_base64, usage).await {
            Ok(parsed) => parsed.ok(),
            Err(e) => {
                tracing::warn!("⚠️  {} call on {} failed: {}", stage, model, e);
                None
            }
        }
    }

    fn select_tiers(&self, force_model: Option<&str>) -> Result<Vec<&str>, DomainError> {
        match force_model.map(str::trim).filter(|m| !m.is_empty()) {
            Some(model) => self
                .tiers
                .iter()
                .find(|tier| tier.as_str() == model)
                .map(|tier| vec![tier.as_str()])
                .ok_or_else(|| {
                    DomainError::Validation(format!(
                        "forceModel '{}' is not a configured tier ({})",
                        model,
                        self.tiers.join(", ")
                    ))
                }),
            None => Ok(self.tiers.iter().map(String::as_str).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use tinytext::{DocumentDomain, VisionResponse};

    use super::*;

    /// Replays canned answers in order; an exhausted script fails the call
    struct ScriptedVision {
        script: Mutex<VecDeque<Result<String, String>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedVision {
        fn new(script: Vec<Result<String, String>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VisionSummarizer for ScriptedVision {
        async fn summarize(
            &self,
            request: &VisionRequest<'_>,
        ) -> Result<VisionResponse, DomainError> {
            self.calls
                .lock()
                .unwrap()
                .push((request.model.to_string(), request.prompt.to_string()));

            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(Ok(content)) => Ok(VisionResponse {
                    content,
                    model: request.model.to_string(),
                    usage: TokenUsage {
                        prompt_tokens: 10,
                        completion_tokens: 5,
                        total_tokens: 15,
                    },
                    finish_reason: Some("stop".to_string()),
                }),
                Some(Err(message)) => Err(DomainError::ExternalService(message)),
                None => Err(DomainError::ExternalService("script exhausted".to_string())),
            }
        }

        fn provider_name(&self) -> &str {
            "scripted"
        }
    }

    fn service(
        vision: Arc<ScriptedVision>,
        tiers: &[&str],
        catalog: Catalog,
    ) -> SummarizeService<ScriptedVision> {
        SummarizeService::new(
            vision,
            Arc::new(catalog),
            tiers.iter().map(|t| t.to_string()).collect(),
            VisionOptions::default(),
        )
    }

    fn command(lang: &str) -> SummarizeCommand {
        SummarizeCommand {
            image_base64: "/9j/4AAQSkZJRg".to_string(),
            language: Language::new(lang),
            force_model: None,
        }
    }

    fn ok(value: serde_json::Value) -> Result<String, String> {
        Ok(value.to_string())
    }

    fn placeholder(lang: &str) -> String {
        Catalog::builtin()
            .placeholder(&Language::new(lang))
            .to_string()
    }

    #[tokio::test]
    async fn test_receipt_missing_category_gets_placeholder() {
        let extraction = json!({
            "domain": "receipt",
            "categories": [
                {"key": "total", "title": "Total", "summary": "- 12.50 USD"},
                {"key": "items", "title": "Items", "summary": "- Coffee x2\n- Bagel x1"}
            ],
            "core_summary": "- Paid 12.50 USD for coffee and a bagel",
            "coupang_query": "coffee bagel"
        });
        let vision = ScriptedVision::new(vec![ok(extraction.clone()), ok(extraction)]);
        let svc = service(vision.clone(), &["gpt-4o-mini"], Catalog::builtin());

        let outcome = svc.summarize(&command("en")).await.unwrap();

        assert_eq!(outcome.payload.domain, DocumentDomain::Receipt);
        assert_eq!(outcome.payload.keys(), vec!["total", "items", "payment"]);
        assert_eq!(outcome.payload.categories[2].summary, placeholder("en"));
        assert_eq!(outcome.payload.categories[2].title, "💳 Payment");
        assert_eq!(outcome.payload.coupang_query.as_deref(), Some("coffee bagel"));
        assert!(!outcome.meta.fallback_used);
        assert_eq!(outcome.meta.model_used, "gpt-4o-mini");
        assert_eq!(outcome.meta.usage.total_tokens, 30);
        assert_eq!(
            outcome.meta.stages,
            vec![Stage::Init, Stage::Extracted, Stage::Rebucketed, Stage::Final]
        );
        assert_eq!(vision.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_first_tier_error_falls_back() {
        let extraction = json!({
            "domain": "manual",
            "categories": [{"key": "howto", "summary": "- Hold the button for 3 seconds"}]
        });
        let vision = ScriptedVision::new(vec![
            Err("connection reset".to_string()),
            ok(extraction),
            Err("rate limited".to_string()),
        ]);
        let svc = service(vision.clone(), &["tier-1", "tier-2"], Catalog::builtin());

        let outcome = svc.summarize(&command("en")).await.unwrap();

        assert!(outcome.meta.fallback_used);
        assert_eq!(outcome.meta.model_used, "tier-2");
        assert_eq!(outcome.meta.tiers_tried, vec!["tier-1", "tier-2"]);
        assert_eq!(outcome.payload.domain, DocumentDomain::Manual);
        assert_eq!(outcome.payload.categories[0].summary, "- Hold the button for 3 seconds");

        let models: Vec<_> = vision.calls().into_iter().map(|(m, _)| m).collect();
        assert_eq!(models, vec!["tier-1", "tier-2", "tier-2"]);
    }

    #[tokio::test]
    async fn test_empty_result_falls_back_and_keeps_last() {
        let vision = ScriptedVision::new(vec![
            Ok("I cannot read this image.".to_string()),
            Err("rebucket down".to_string()),
            Err("repair down".to_string()),
            Ok("still nothing".to_string()),
        ]);
        let svc = service(vision, &["tier-1", "tier-2"], Catalog::builtin());

        let outcome = svc.summarize(&command("en")).await.unwrap();

        assert!(outcome.meta.fallback_used);
        assert_eq!(outcome.meta.model_used, "tier-2");
        assert_eq!(outcome.payload.domain, DocumentDomain::General);
        assert_eq!(outcome.payload.keys(), vec!["summary", "warnings", "details"]);
        assert_eq!(outcome.payload.core_summary, placeholder("en"));
    }

    #[tokio::test]
    async fn test_empty_first_tier_stops_at_tier_with_content() {
        let extraction = json!({
            "domain": "receipt",
            "categories": [{"key": "total", "summary": "- 12.50 USD"}],
            "core_summary": "- Paid 12.50 USD"
        });
        let vision = ScriptedVision::new(vec![
            Ok("not json".to_string()),
            Err("rebucket down".to_string()),
            Err("repair down".to_string()),
            ok(extraction),
        ]);
        let svc = service(vision.clone(), &["tier-1", "tier-2", "tier-3"], Catalog::builtin());

        let outcome = svc.summarize(&command("en")).await.unwrap();

        assert!(outcome.meta.fallback_used);
        assert_eq!(outcome.meta.model_used, "tier-2");
        assert_eq!(outcome.meta.tiers_tried, vec!["tier-1", "tier-2"]);
        assert_eq!(outcome.payload.domain, DocumentDomain::Receipt);
        assert_eq!(outcome.payload.categories[0].summary, "- 12.50 USD");
        assert_eq!(outcome.payload.core_summary, "- Paid 12.50 USD");
        assert!(vision.calls().iter().all(|(model, _)| model != "tier-3"));
    }

    #[tokio::test]
    async fn test_core_summary_alone_does_not_fall_back() {
        let extraction = json!({
            "domain": "receipt",
            "categories": [],
            "core_summary": "- A coffee receipt from a cafe"
        });
        let still_empty = json!({
            "domain": "receipt",
            "categories": [{"key": "total", "summary": ""}]
        });
        let vision = ScriptedVision::new(vec![
            ok(extraction),
            Err("rebucket down".to_string()),
            ok(still_empty),
        ]);
        let svc = service(vision.clone(), &["a", "b"], Catalog::builtin());

        let outcome = svc.summarize(&command("en")).await.unwrap();

        assert!(!outcome.meta.fallback_used);
        assert_eq!(outcome.meta.model_used, "a");
        assert_eq!(outcome.meta.tiers_tried, vec!["a"]);
        assert_eq!(outcome.payload.core_summary, "- A coffee receipt from a cafe");
        assert!(outcome
            .payload
            .categories
            .iter()
            .all(|c| c.summary == placeholder("en")));
        assert!(vision.calls().iter().all(|(model, _)| model == "a"));
    }

    #[tokio::test]
    async fn test_health_check_delegates_to_provider() {
        let vision = ScriptedVision::new(vec![]);
        let svc = service(vision.clone(), &["gpt-4o-mini"], Catalog::builtin());

        assert!(svc.health_check().await);
        assert!(vision.calls().is_empty());
    }

    #[tokio::test]
    async fn test_filler_only_bullets_become_placeholder() {
        let extraction = json!({
            "domain": "medicine",
            "categories": [
                {"key": "dose", "summary": "- 주의가 필요합니다"},
                {"key": "warnings", "summary": "- 임산부는 복용 전 의사와 상의"},
                {"key": "ingredients", "summary": "- 비타민C 500mg"}
            ]
        });
        let vision = ScriptedVision::new(vec![ok(extraction)]);
        let svc = service(vision, &["gpt-4o-mini"], Catalog::builtin());

        let outcome = svc.summarize(&command("ko")).await.unwrap();

        assert_eq!(outcome.payload.categories[0].summary, placeholder("ko"));
        assert_eq!(outcome.payload.categories[0].title, "💊 복용법");
        assert_eq!(outcome.payload.categories[2].summary, "- 비타민C 500mg");
    }

    #[tokio::test]
    async fn test_configured_filler_patterns_apply() {
        let catalog = Catalog::builtin()
            .with_filler_patterns("en", ["(?i)consult .*professional"])
            .unwrap();
        let extraction = json!({
            "domain": "medicine",
            "categories": [
                {"key": "dose", "summary": "- Consult a healthcare professional"},
                {"key": "warnings", "summary": "- Keep away from children"}
            ]
        });
        let vision = ScriptedVision::new(vec![ok(extraction)]);
        let svc = service(vision, &["gpt-4o-mini"], catalog);

        let outcome = svc.summarize(&command("en")).await.unwrap();
        assert_eq!(outcome.payload.categories[0].summary, placeholder("en"));
        assert_eq!(outcome.payload.categories[1].summary, "- Keep away from children");
    }

    #[tokio::test]
    async fn test_single_tier_error_propagates() {
        let vision = ScriptedVision::new(vec![Err("OpenAI HTTP 401".to_string())]);
        let svc = service(vision, &["gpt-4o-mini"], Catalog::builtin());

        let err = svc.summarize(&command("ko")).await.unwrap_err();
        assert!(matches!(err, DomainError::ExternalService(_)));
        assert!(err.to_string().contains("OpenAI HTTP 401"));
    }

    #[tokio::test]
    async fn test_unknown_force_model_is_rejected() {
        let vision = ScriptedVision::new(vec![]);
        let svc = service(vision.clone(), &["gpt-4o-mini", "gpt-4o"], Catalog::builtin());

        let mut cmd = command("ko");
        cmd.force_model = Some("gpt-3".to_string());
        let err = svc.summarize(&cmd).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert!(vision.calls().is_empty());
    }

    #[tokio::test]
    async fn test_force_model_skips_other_tiers() {
        let vision = ScriptedVision::new(vec![Ok("not json".to_string())]);
        let svc = service(vision.clone(), &["gpt-4o-mini", "gpt-4o"], Catalog::builtin());

        let mut cmd = command("ko");
        cmd.force_model = Some("gpt-4o".to_string());
        let outcome = svc.summarize(&cmd).await.unwrap();

        assert_eq!(outcome.meta.model_used, "gpt-4o");
        assert!(!outcome.meta.fallback_used);
        assert!(vision.calls().iter().all(|(model, _)| model == "gpt-4o"));
    }

    #[tokio::test]
    async fn test_repair_runs_when_all_categories_empty() {
        let empty = json!({
            "domain": "receipt",
            "categories": [
                {"key": "total", "summary": ""},
                {"key": "items", "summary": "-"}
            ]
        });
        let repaired = json!({
            "domain": "receipt",
            "categories": [
                {"key": "total", "summary": "- 4,500원"},
                {"key": "items", "summary": "- 아메리카노 1잔"},
                {"key": "payment", "summary": "- 신용카드"}
            ],
            "core_summary": "- 아메리카노 1잔 4,500원 결제"
        });
        let vision = ScriptedVision::new(vec![ok(empty.clone()), ok(empty), ok(repaired)]);
        let svc = service(vision.clone(), &["gpt-4o-mini"], Catalog::builtin());

        let outcome = svc.summarize(&command("ko")).await.unwrap();

        assert_eq!(
            outcome.meta.stages,
            vec![
                Stage::Init,
                Stage::Extracted,
                Stage::Rebucketed,
                Stage::Repaired,
                Stage::Final
            ]
        );
        assert_eq!(outcome.payload.categories[0].summary, "- 4,500원");
        assert_eq!(outcome.payload.core_summary, "- 아메리카노 1잔 4,500원 결제");

        let calls = vision.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[2].1.contains("REPAIR NOW"));
    }
}
