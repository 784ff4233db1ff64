use std::fmt;

use stepcheck::{
    verify, verify_with, CancelFlag, Chain, CheckerConfig, Step, StepKind, VerdictKind,
    VerifyError,
};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

fn quadratic_chain() -> Chain {
    Chain::from_expressions(
        "Solve x^2 + 5x + 6 = 0",
        ["x**2+5*x+6=0", "(x+2)*(x+3)=0", "x+2=0 or x+3=0", "x=-2"],
    )
    .unwrap()
}

#[test]
fn quadratic_chain_is_accepted_with_branch_trust() {
    let mut chain = quadratic_chain();
    let verdicts = verify(&mut chain).unwrap();

    let verified: Vec<bool> = verdicts.iter().map(|v| v.verified).collect();
    assert_eq!(verified, vec![true; 4]);

    let kinds: Vec<VerdictKind> = verdicts.iter().map(|v| v.kind).collect();
    assert_eq!(
        kinds,
        vec![
            VerdictKind::TrustedAxiom,
            VerdictKind::Checked,
            VerdictKind::TrustedAxiom,
            VerdictKind::TrustedAxiom,
        ]
    );
    assert_eq!(chain.all_verified(), Some(true));
}

#[test]
fn first_step_is_trusted_whatever_it_says() {
    let mut chain = Chain::from_expressions("nonsense", ["x +* 2"]).unwrap();
    let verdicts = verify(&mut chain).unwrap();
    assert_eq!(verdicts.len(), 1);
    assert!(verdicts[0].verified);
    assert_eq!(verdicts[0].kind, VerdictKind::TrustedAxiom);
}

#[test]
fn empty_chain_is_rejected_up_front() {
    let steps: [&str; 0] = [];
    assert!(matches!(
        Chain::from_expressions("nothing", steps),
        Err(VerifyError::EmptyChain)
    ));
    assert!(matches!(
        Chain::new("nothing", None, Vec::new()),
        Err(VerifyError::EmptyChain)
    ));
}

#[test]
fn failures_are_isolated_per_step() {
    let mut chain = Chain::from_expressions(
        "Solve 2x + 4 = 0",
        ["2*x + 4 = 0", "2*x = 5", "x = (", "2*x = -4", "x + 2 = 0"],
    )
    .unwrap();
    let verdicts = verify(&mut chain).unwrap();

    let verified: Vec<bool> = verdicts.iter().map(|v| v.verified).collect();
    assert_eq!(verified, vec![true, false, false, false, false]);
    assert!(verdicts[1]
        .reason
        .as_deref()
        .unwrap()
        .starts_with("difference does not reduce to zero"));
    assert!(verdicts[2]
        .reason
        .as_deref()
        .unwrap()
        .starts_with("parse error in step 2"));
    assert!(verdicts[3]
        .reason
        .as_deref()
        .unwrap()
        .starts_with("parse error in step 2"));
    // `2*x + 4` and `x + 2` have different zero forms.
    assert_eq!(verdicts[4].kind, VerdictKind::Rejected);
    assert_eq!(chain.all_verified(), Some(false));
}

#[test]
fn verified_steps_carry_no_reason() {
    let mut chain = quadratic_chain();
    for verdict in verify(&mut chain).unwrap() {
        assert!(verdict.reason.is_none());
    }
}

#[test]
fn verification_is_idempotent() {
    let mut chain = Chain::from_expressions(
        "Expand",
        ["x^2 - 4", "(x - 2)*(x + 2)", "x^2 + 4"],
    )
    .unwrap();
    let first = verify(&mut chain).unwrap();
    let second = verify(&mut chain).unwrap();
    assert_eq!(first, second);
    assert_eq!(first[2].kind, VerdictKind::Rejected);
}

#[test]
fn text_and_order_are_preserved() {
    let steps = vec![
        Step::new("start", "x + 1 = 3"),
        Step::new("subtract one", "x = 2"),
    ];
    let mut chain = Chain::new("Solve x + 1 = 3", Some("linear".to_string()), steps).unwrap();
    verify(&mut chain).unwrap();

    assert_eq!(chain.topic(), Some("linear"));
    let texts: Vec<(&str, &str)> = chain
        .steps()
        .iter()
        .map(|s| (s.reasoning(), s.raw()))
        .collect();
    assert_eq!(texts, vec![("start", "x + 1 = 3"), ("subtract one", "x = 2")]);
    for (idx, step) in chain.steps().iter().enumerate() {
        assert_eq!(step.index(), idx);
        assert_eq!(step.verdict().unwrap().step_index, idx);
    }
}

#[test]
fn steps_are_unverified_until_checked() {
    let chain = quadratic_chain();
    assert_eq!(chain.all_verified(), None);
    assert!(chain.steps().iter().all(|s| s.verified().is_none()));
    assert_eq!(chain.steps()[2].kind(), StepKind::Branch);
    assert_eq!(chain.steps()[3].kind(), StepKind::Direct);
}

#[test]
fn cancelled_chain_stops_before_the_next_step() {
    let mut chain = quadratic_chain();
    let cancel = CancelFlag::new();
    cancel.cancel();
    match verify_with(&mut chain, &CheckerConfig::default(), Some(&cancel)) {
        Err(VerifyError::Cancelled { completed }) => assert_eq!(completed, 0),
        other => panic!("expected cancellation, got {other:?}"),
    }
    assert_eq!(chain.all_verified(), None);
}

#[test]
fn logging_does_not_change_verdicts() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("stepcheck=debug")
        .with_test_writer()
        .finish();
    let mut chain = quadratic_chain();
    let verdicts = tracing::subscriber::with_default(subscriber, || verify(&mut chain)).unwrap();
    assert!(verdicts.iter().all(|v| v.verified));
}

#[derive(Default)]
struct Message(String);

impl Visit for Message {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

/// Raises the flag as soon as the first verdict is logged.
struct CancelAfterFirstVerdict(CancelFlag);

impl<S: Subscriber> Layer<S> for CancelAfterFirstVerdict {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = Message::default();
        event.record(&mut message);
        if message.0 == "step verdict" {
            self.0.cancel();
        }
    }
}

#[test]
fn cancelling_mid_chain_keeps_earlier_verdicts() {
    let mut chain = quadratic_chain();
    let cancel = CancelFlag::new();
    let subscriber = Registry::default().with(CancelAfterFirstVerdict(cancel.clone()));
    let result = tracing::subscriber::with_default(subscriber, || {
        verify_with(&mut chain, &CheckerConfig::default(), Some(&cancel))
    });

    match result {
        Err(VerifyError::Cancelled { completed }) => assert_eq!(completed, 1),
        other => panic!("expected cancellation, got {other:?}"),
    }
    let first = chain.steps()[0].verdict().unwrap();
    assert_eq!(first.kind, VerdictKind::TrustedAxiom);
    assert!(chain.steps()[1..].iter().all(|s| s.verdict().is_none()));
    assert_eq!(chain.all_verified(), None);
}
