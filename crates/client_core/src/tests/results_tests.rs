use serde_json::json;
use shared::domain::SessionId;

use super::*;
use crate::{
    store::MemorySessionStore,
    test_support::{started, store_with_session, Call, FakeApi, Failure},
};

fn sample_report() -> serde_json::Value {
    json!({
        "percentage": 82.5,
        "verdict": "GOOD",
        "section_scores": {
            "theory": {"percentage": 90.0, "count": 6},
            "coding": {"percentage": 40.0, "count": 3},
            "astrology": {"percentage": 12.0, "count": 1}
        },
        "weak_areas": [{"topic": "backprop", "avg_score": 35.0, "questions_failed": 2}],
        "improvement_suggestions": ["Revise gradient descent"],
        "learning_resources": ["https://pytorch.org/tutorials/beginner/basics", "docs.python.org/3/tutorial"],
        "review": [
            {"index": 1, "type": "theory", "difficulty": "easy", "question": "What is a tensor?",
             "answer": "x".repeat(260), "feedback": "Good", "score": 70.0},
            {"index": 12, "type": "coding", "difficulty": "hard", "question": "Reverse a list",
             "answer": "lst[::-1]", "feedback": "Fine", "score": 39.9}
        ]
    })
}

fn results_controller(api: Arc<FakeApi>, store: Arc<MemorySessionStore>) -> ResultsController {
    ResultsController::new(api, store)
}

#[test]
fn grade_boundaries() {
    assert_eq!(Grade::for_score(100.0), Grade::Pass);
    assert_eq!(Grade::for_score(70.0), Grade::Pass);
    assert_eq!(Grade::for_score(69.9), Grade::Warn);
    assert_eq!(Grade::for_score(40.0), Grade::Warn);
    assert_eq!(Grade::for_score(39.9), Grade::Fail);
    assert_eq!(Grade::for_score(0.0), Grade::Fail);
}

#[test]
fn resource_host_handles_bare_links() {
    assert_eq!(resource_host("https://pytorch.org/tutorials"), "pytorch.org");
    assert_eq!(resource_host("docs.python.org/3/tutorial"), "docs.python.org");
}

#[test]
fn open_without_results_redirects() {
    let store = store_with_session("s-1");
    let controller = results_controller(Arc::new(FakeApi::new()), store);
    let mut rx = controller.subscribe_events();

    assert_eq!(controller.open(), ResultsOutcome::Redirected);
    assert!(matches!(
        rx.try_recv(),
        Ok(ControllerEvent::Navigate(Page::Start))
    ));
}

#[test]
fn view_projects_report() {
    let store = store_with_session("s-1");
    store.save_results(&sample_report());
    let controller = results_controller(Arc::new(FakeApi::new()), store);

    let ResultsOutcome::Ready(view) = controller.open() else {
        panic!("expected a view");
    };

    assert_eq!(view.percentage, 82.5);
    assert_eq!(view.verdict, "GOOD");
    assert_eq!(
        view.sections,
        vec![
            SectionRow { section: QuestionType::Theory, percentage: 90.0 },
            SectionRow { section: QuestionType::Coding, percentage: 40.0 },
        ]
    );
    assert_eq!(view.weak_areas, vec!["backprop".to_string()]);
    assert_eq!(view.suggestions, vec!["Revise gradient descent".to_string()]);
    assert_eq!(view.resources[0].host, "pytorch.org");
    assert_eq!(view.resources[1].host, "docs.python.org");

    let first = &view.review[0];
    assert_eq!(first.answer_preview.chars().count(), 203);
    assert!(first.answer_preview.ends_with("..."));
    assert_eq!(first.grade, Grade::Pass);
    assert_eq!(view.review[1].answer_preview, "lst[::-1]");
    assert_eq!(view.review[1].grade, Grade::Fail);
}

#[test]
fn null_weak_area_topic_keeps_the_rest_of_the_report() {
    let store = store_with_session("s-1");
    store.save_results(&json!({
        "percentage": 82.0,
        "verdict": "GOOD",
        "weak_areas": [{"topic": null, "avg_score": 30.0, "questions_failed": 1}],
        "improvement_suggestions": ["Revise gradient descent"],
        "review": [
            {"index": 3, "type": "theory", "difficulty": "medium", "question": "Define dropout",
             "answer": "Randomly zeroes activations", "feedback": null, "score": 55.0}
        ]
    }));
    let controller = results_controller(Arc::new(FakeApi::new()), store);

    let ResultsOutcome::Ready(view) = controller.open() else {
        panic!("expected a view");
    };
    assert_eq!(view.percentage, 82.0);
    assert_eq!(view.verdict, "GOOD");
    assert_eq!(view.weak_areas, vec!["General".to_string()]);
    assert_eq!(view.suggestions, vec!["Revise gradient descent".to_string()]);
    assert_eq!(view.review.len(), 1);
    assert_eq!(view.review[0].feedback, "");
    assert_eq!(view.review[0].grade, Grade::Warn);
}

#[test]
fn sparse_report_uses_defaults() {
    let store = store_with_session("s-1");
    store.save_results(&json!({}));
    let controller = results_controller(Arc::new(FakeApi::new()), store);

    let ResultsOutcome::Ready(view) = controller.open() else {
        panic!("expected a view");
    };
    assert_eq!(view.percentage, 0.0);
    assert_eq!(view.verdict, "POOR");
    assert!(view.sections.is_empty());
    assert!(view.review.is_empty());
}

#[tokio::test]
async fn restart_replaces_session_then_clears_results() {
    let api = Arc::new(FakeApi::new());
    api.push_restart(Ok(started("s-2", &["python"])));
    let store = store_with_session("s-1");
    store.save_results(&sample_report());
    let controller = results_controller(api.clone(), store.clone());
    let mut rx = controller.subscribe_events();

    let outcome = controller.restart().await;

    assert_eq!(outcome, RestartOutcome::Restarted(started("s-2", &["python"])));
    assert_eq!(api.calls(), vec![Call::Restart(SessionId("s-1".into()))]);
    assert_eq!(store.session_id(), Some(SessionId("s-2".into())));
    assert!(store.results().is_none());
    assert!(matches!(
        rx.try_recv(),
        Ok(ControllerEvent::Navigate(Page::Interview))
    ));
}

#[tokio::test]
async fn failed_restart_keeps_results_and_goes_to_start() {
    let api = Arc::new(FakeApi::new());
    api.push_restart(Err(Failure::Status(404, "Session not found")));
    let store = store_with_session("s-1");
    store.save_results(&sample_report());
    let controller = results_controller(api, store.clone());
    let mut rx = controller.subscribe_events();

    assert_eq!(controller.restart().await, RestartOutcome::Redirected);
    assert_eq!(store.session_id(), Some(SessionId("s-1".into())));
    assert!(store.results().is_some());
    assert!(matches!(
        rx.try_recv(),
        Ok(ControllerEvent::Navigate(Page::Start))
    ));
}

#[tokio::test]
async fn restart_without_session_makes_no_call() {
    let api = Arc::new(FakeApi::new());
    let controller = results_controller(api.clone(), Arc::new(MemorySessionStore::new()));

    assert_eq!(controller.restart().await, RestartOutcome::Redirected);
    assert!(api.calls().is_empty());
}
