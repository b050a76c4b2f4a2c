//! End-to-end tests for the turn workflow with deterministic collaborator
//! doubles: the retry bound, the early-accept path, query rewriting, the
//! FAQ branch, and the failure policy for each collaborator.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vendra_core::{
    Candidate, ChatMessage, IntentClassifier, Judgment, ResultJudge, Retriever, Route,
    TextGenerator,
};
use vendra_workflow::{Collaborators, MAX_ATTEMPTS, TurnWorkflow, WorkflowError, mention};

struct FixedClassifier(Route);

#[async_trait]
impl IntentClassifier for FixedClassifier {
    async fn classify(&self, _text: &str) -> anyhow::Result<Route> {
        Ok(self.0)
    }
}

struct FailingClassifier;

#[async_trait]
impl IntentClassifier for FailingClassifier {
    async fn classify(&self, _text: &str) -> anyhow::Result<Route> {
        Err(anyhow::anyhow!("classifier offline"))
    }
}

#[derive(Default)]
struct ScriptedRetriever {
    script: Mutex<VecDeque<Result<Vec<Candidate>, String>>>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedRetriever {
    fn new(script: Vec<Result<Vec<Candidate>, String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            queries: Mutex::new(Vec::new()),
        })
    }

    fn empty() -> Arc<Self> {
        Self::new(Vec::new())
    }

    fn calls(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Retriever for ScriptedRetriever {
    async fn retrieve(&self, query: &str, _limit: usize) -> anyhow::Result<Vec<Candidate>> {
        self.queries.lock().unwrap().push(query.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(items)) => Ok(items),
            Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
            None => Ok(Vec::new()),
        }
    }
}

enum JudgeOutcome {
    Accept,
    Reject,
    Fail,
}

struct ScriptedJudge {
    script: Mutex<VecDeque<JudgeOutcome>>,
    calls: AtomicUsize,
}

impl ScriptedJudge {
    fn new(script: Vec<JudgeOutcome>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResultJudge for ScriptedJudge {
    async fn judge(
        &self,
        _query: &str,
        _recent_context: &str,
        _candidates: &[Candidate],
    ) -> anyhow::Result<Judgment> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(JudgeOutcome::Accept) => Ok(Judgment {
                accepted: true,
                rationale: "matches the request".to_string(),
            }),
            Some(JudgeOutcome::Reject) | None => Ok(Judgment::rejected("not relevant")),
            Some(JudgeOutcome::Fail) => Err(anyhow::anyhow!("judge offline")),
        }
    }
}

struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(script: Vec<Result<&str, &str>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(msg)) => Err(anyhow::anyhow!(msg)),
            None => Err(anyhow::anyhow!("generator script exhausted")),
        }
    }
}

fn product(title: &str) -> Candidate {
    Candidate::new(format!("{title} description"))
        .with_metadata("title", title)
        .with_metadata("sale_price", 250)
        .with_metadata("currency", "EGP")
}

fn products(n: usize) -> Vec<Candidate> {
    (0..n).map(|i| product(&format!("Item {i}"))).collect()
}

struct Fixture {
    workflow: TurnWorkflow,
    product_retriever: Arc<ScriptedRetriever>,
    faq_retriever: Arc<ScriptedRetriever>,
    judge: Arc<ScriptedJudge>,
    generator: Arc<ScriptedGenerator>,
}

fn fixture(
    classifier: Arc<dyn IntentClassifier>,
    product_retriever: Arc<ScriptedRetriever>,
    faq_retriever: Arc<ScriptedRetriever>,
    judge: Arc<ScriptedJudge>,
    generator: Arc<ScriptedGenerator>,
) -> Fixture {
    let workflow = TurnWorkflow::new(Collaborators {
        classifier,
        product_retriever: Arc::clone(&product_retriever) as Arc<dyn Retriever>,
        faq_retriever: Arc::clone(&faq_retriever) as Arc<dyn Retriever>,
        judge: Arc::clone(&judge) as Arc<dyn ResultJudge>,
        generator: Arc::clone(&generator) as Arc<dyn TextGenerator>,
    })
    .expect("workflow graph should build");

    Fixture {
        workflow,
        product_retriever,
        faq_retriever,
        judge,
        generator,
    }
}

#[tokio::test]
async fn early_accept_runs_one_retrieval_cycle() {
    let f = fixture(
        Arc::new(FixedClassifier(Route::ProductSearch)),
        ScriptedRetriever::new(vec![Ok(products(5))]),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![JudgeOutcome::Accept]),
        ScriptedGenerator::new(vec![Ok("Take a look at Item 0 and Item 3.")]),
    );

    let state = f
        .workflow
        .run(vec![ChatMessage::user("red t-shirt under 300")])
        .await
        .unwrap();

    assert_eq!(f.product_retriever.calls(), 1);
    assert_eq!(f.judge.calls(), 1);
    assert_eq!(state.attempts, 1);
    assert_eq!(state.accepted.as_deref().map(<[Candidate]>::len), Some(5));
    assert_eq!(state.reply(), Some("Take a look at Item 0 and Item 3."));

    // Memory folded the finished exchange in.
    assert!(state.recent_context.contains("HUMAN: red t-shirt under 300"));
    assert!(state.recent_context.contains("AI: Take a look at"));
}

#[tokio::test]
async fn persistent_rejection_stops_after_max_attempts() {
    let f = fixture(
        Arc::new(FixedClassifier(Route::ProductSearch)),
        ScriptedRetriever::new(vec![Ok(products(3)), Ok(products(3)), Ok(products(3))]),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![JudgeOutcome::Reject, JudgeOutcome::Reject]),
        ScriptedGenerator::new(vec![Ok("Sorry, nothing matched your request.")]),
    );

    let state = f
        .workflow
        .run(vec![ChatMessage::user("red t-shirt under 300")])
        .await
        .unwrap();

    assert_eq!(f.product_retriever.calls(), MAX_ATTEMPTS as usize);
    assert_eq!(f.judge.calls(), MAX_ATTEMPTS as usize);
    assert_eq!(state.attempts, MAX_ATTEMPTS);
    assert_eq!(state.accepted.as_deref(), Some(&[][..]));

    // The reply was rendered from the no-products placeholder.
    let prompts = f.generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("No products found."));
    assert_eq!(state.reply(), Some("Sorry, nothing matched your request."));
}

#[tokio::test]
async fn empty_retrieval_rejects_without_calling_judge() {
    let f = fixture(
        Arc::new(FixedClassifier(Route::ProductSearch)),
        ScriptedRetriever::new(vec![Ok(Vec::new()), Ok(Vec::new())]),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![JudgeOutcome::Accept]),
        ScriptedGenerator::new(vec![Ok("We couldn't find anything suitable.")]),
    );

    let state = f
        .workflow
        .run(vec![ChatMessage::user("gold-plated submarine")])
        .await
        .unwrap();

    assert_eq!(f.judge.calls(), 0);
    assert_eq!(state.attempts, MAX_ATTEMPTS);
    assert_eq!(state.accepted.as_deref(), Some(&[][..]));
}

#[tokio::test]
async fn judge_failure_fails_closed_and_consumes_attempts() {
    let f = fixture(
        Arc::new(FixedClassifier(Route::ProductSearch)),
        ScriptedRetriever::new(vec![Ok(products(2)), Ok(products(2))]),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![JudgeOutcome::Fail, JudgeOutcome::Fail]),
        ScriptedGenerator::new(vec![Ok("Sorry, nothing matched.")]),
    );

    let state = f
        .workflow
        .run(vec![ChatMessage::user("red t-shirt")])
        .await
        .unwrap();

    assert_eq!(state.attempts, MAX_ATTEMPTS);
    assert_eq!(state.accepted.as_deref(), Some(&[][..]));

    let judgment = state.judgment.as_ref().unwrap();
    assert!(!judgment.accepted);
    assert!(judgment.rationale.contains("evaluation failed"));
    assert_eq!(state.reply(), Some("Sorry, nothing matched."));
}

#[tokio::test]
async fn retrieval_backend_failure_degrades_to_empty() {
    let f = fixture(
        Arc::new(FixedClassifier(Route::ProductSearch)),
        ScriptedRetriever::new(vec![
            Err("backend unreachable".to_string()),
            Err("backend unreachable".to_string()),
        ]),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![]),
        ScriptedGenerator::new(vec![Ok("We couldn't find anything right now.")]),
    );

    let state = f
        .workflow
        .run(vec![ChatMessage::user("red t-shirt")])
        .await
        .unwrap();

    // The failure never surfaced; the no-results path ran instead.
    assert_eq!(f.judge.calls(), 0);
    assert_eq!(state.candidates.as_deref(), Some(&[][..]));
    assert!(state.reply().is_some());
}

#[tokio::test]
async fn vague_query_is_rewritten_with_context() {
    let f = fixture(
        Arc::new(FixedClassifier(Route::ProductSearch)),
        ScriptedRetriever::new(vec![Ok(products(4))]),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![JudgeOutcome::Accept]),
        ScriptedGenerator::new(vec![Ok("شوز تصميم مختلف"), Ok("Check out Item 1.")]),
    );

    let state = f
        .workflow
        .run(vec![
            ChatMessage::user("عاوز شوز"),
            ChatMessage::assistant("عندنا شوز رياضي وكلاسيك"),
            ChatMessage::user("something else"),
        ])
        .await
        .unwrap();

    // The retriever saw the rewritten query, not the vague one.
    assert_eq!(f.product_retriever.queries(), vec!["شوز تصميم مختلف"]);

    // The rewrite prompt carried the conversation window.
    let prompts = f.generator.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains("HUMAN: عاوز شوز"));
    assert!(prompts[0].contains("something else"));

    assert_eq!(state.reply(), Some("Check out Item 1."));
}

#[tokio::test]
async fn rewrite_failure_falls_back_to_generic_query() {
    let f = fixture(
        Arc::new(FixedClassifier(Route::ProductSearch)),
        ScriptedRetriever::new(vec![Ok(products(2))]),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![JudgeOutcome::Accept]),
        ScriptedGenerator::new(vec![Err("rewriter offline"), Ok("Here you go.")]),
    );

    let state = f
        .workflow
        .run(vec![
            ChatMessage::user("عاوز تيشيرت"),
            ChatMessage::assistant("في تيشيرتات كتير"),
            ChatMessage::user("حاجة تانية"),
        ])
        .await
        .unwrap();

    assert_eq!(f.product_retriever.queries(), vec!["منتجات مشابهة"]);
    assert_eq!(state.reply(), Some("Here you go."));
}

#[tokio::test]
async fn retry_reuses_the_original_query() {
    let f = fixture(
        Arc::new(FixedClassifier(Route::ProductSearch)),
        ScriptedRetriever::new(vec![Ok(products(2)), Ok(products(2))]),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![JudgeOutcome::Reject, JudgeOutcome::Reject]),
        ScriptedGenerator::new(vec![Ok("rewritten shoes query"), Ok("Sorry, no luck.")]),
    );

    f.workflow
        .run(vec![
            ChatMessage::user("عاوز شوز"),
            ChatMessage::assistant("عندنا شوز"),
            ChatMessage::user("something else"),
        ])
        .await
        .unwrap();

    // First attempt searched the rewrite; the retry went back to the
    // user's own words.
    assert_eq!(
        f.product_retriever.queries(),
        vec!["rewritten shoes query", "something else"]
    );
}

#[tokio::test]
async fn faq_turn_skips_evaluation_loop() {
    let answers = vec![
        Candidate::new("Returns are free within 14 days."),
        Candidate::new("Refunds arrive in 5-7 business days."),
    ];
    let f = fixture(
        Arc::new(FixedClassifier(Route::Faq)),
        ScriptedRetriever::empty(),
        ScriptedRetriever::new(vec![Ok(answers.clone())]),
        ScriptedJudge::new(vec![]),
        ScriptedGenerator::new(vec![Ok("Returns are free for two weeks.")]),
    );

    let state = f
        .workflow
        .run(vec![ChatMessage::user("what is your return policy?")])
        .await
        .unwrap();

    assert_eq!(f.faq_retriever.calls(), 1);
    assert_eq!(f.product_retriever.calls(), 0);
    assert_eq!(f.judge.calls(), 0);
    assert_eq!(state.attempts, 0);
    assert_eq!(state.accepted.as_deref(), Some(answers.as_slice()));

    let prompts = f.generator.prompts();
    assert!(prompts[0].contains("Returns are free within 14 days."));
    assert_eq!(state.reply(), Some("Returns are free for two weeks."));
}

#[tokio::test]
async fn unrecognized_intent_ends_the_turn_without_reply() {
    let f = fixture(
        Arc::new(FixedClassifier(Route::None)),
        ScriptedRetriever::empty(),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![]),
        ScriptedGenerator::new(vec![]),
    );

    let state = f
        .workflow
        .run(vec![ChatMessage::user("asdfghjkl")])
        .await
        .unwrap();

    assert_eq!(state.reply(), None);
    assert_eq!(state.messages.len(), 1);
    assert!(state.candidates.is_none());
    assert_eq!(f.generator.prompts().len(), 0);
}

#[tokio::test]
async fn classification_failure_aborts_the_turn() {
    let f = fixture(
        Arc::new(FailingClassifier),
        ScriptedRetriever::empty(),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![]),
        ScriptedGenerator::new(vec![]),
    );

    let err = f
        .workflow
        .run(vec![ChatMessage::user("red t-shirt")])
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Classification(_)));
}

#[tokio::test]
async fn generation_failure_aborts_the_turn() {
    let f = fixture(
        Arc::new(FixedClassifier(Route::ProductSearch)),
        ScriptedRetriever::new(vec![Ok(products(2))]),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![JudgeOutcome::Accept]),
        ScriptedGenerator::new(vec![Err("model overloaded")]),
    );

    let err = f
        .workflow
        .run(vec![ChatMessage::user("red t-shirt")])
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Generation(_)));
}

#[tokio::test]
async fn mentioned_products_are_surfaced_after_the_run() {
    let catalog = vec![
        product("Red T-Shirt"),
        product("Blue Hoodie"),
        product("Green Cap"),
        product("Black Jeans"),
        product("White Sneakers"),
    ];
    let f = fixture(
        Arc::new(FixedClassifier(Route::ProductSearch)),
        ScriptedRetriever::new(vec![Ok(catalog)]),
        ScriptedRetriever::empty(),
        ScriptedJudge::new(vec![JudgeOutcome::Accept]),
        ScriptedGenerator::new(vec![Ok(
            "I'd suggest the Red T-Shirt, or the White Sneakers if you prefer footwear.",
        )]),
    );

    let state = f
        .workflow
        .run(vec![ChatMessage::user("red t-shirt under 300")])
        .await
        .unwrap();

    let reply = state.reply().unwrap();
    let surfaced = mention::correlate(reply, state.candidates.as_deref().unwrap());

    assert_eq!(surfaced.len(), 2);
    assert_eq!(surfaced[0].title(), Some("Red T-Shirt"));
    assert_eq!(surfaced[1].title(), Some("White Sneakers"));
}
