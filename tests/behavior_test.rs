use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use typed_behavior::behavior::{
    and, deferred, or, partial, receive, receive_message, synchronous_self, with_self, ActorContext, ActorId,
    Behavior, Decision, DeliveryError, Input, Props, Signal,
};
use typed_behavior::runtime::setup_tracing;
use typed_behavior::testkit::{BehaviorTestKit, Effect, EffectfulContext};

fn recorder<T: Send + 'static>() -> Arc<Mutex<Vec<T>>> {
    Arc::new(Mutex::new(Vec::new()))
}

/// Handles even numbers only, recording them.
fn evens(log: Arc<Mutex<Vec<u32>>>) -> Behavior<u32> {
    partial(move |_ctx, input| match input {
        Input::Message(m) if m % 2 == 0 => {
            log.lock().unwrap().push(*m);
            Some(Behavior::Same)
        }
        _ => None,
    })
}

fn recording(log: Arc<Mutex<Vec<u32>>>) -> Behavior<u32> {
    receive_message(move |m: &u32| {
        log.lock().unwrap().push(*m);
        Behavior::Same
    })
}

/// Registers `decision` for every child failure it sees.
fn deciding(decision: Decision) -> Behavior<u32> {
    partial(move |_ctx, input| match input {
        Input::Signal(Signal::ChildFailed { decision: slot, .. }) => {
            slot.decide(decision);
            Some(Behavior::Same)
        }
        _ => None,
    })
}

fn failure() -> Arc<dyn std::error::Error + Send + Sync> {
    Arc::new(std::io::Error::other("child crashed"))
}

#[test]
fn fallback_right_side_sees_only_what_left_rejects() {
    setup_tracing();
    let left = recorder();
    let right = recorder();
    let mut kit = BehaviorTestKit::new("or", or(evens(left.clone()), recording(right.clone())));

    for m in 1..=6 {
        kit.run(m).unwrap();
    }

    assert_eq!(*left.lock().unwrap(), vec![2, 4, 6]);
    assert_eq!(*right.lock().unwrap(), vec![1, 3, 5]);
}

#[test]
fn parallel_sides_each_see_every_input_once() {
    setup_tracing();
    let left = recorder();
    let right = recorder();
    let mut kit = BehaviorTestKit::new("and", and(recording(left.clone()), recording(right.clone())));

    for m in [10, 20, 30] {
        kit.run(m).unwrap();
    }

    assert_eq!(*left.lock().unwrap(), vec![10, 20, 30]);
    assert_eq!(*right.lock().unwrap(), vec![10, 20, 30]);
}

#[test]
fn parallel_child_failure_takes_highest_precedence() {
    let mut kit = BehaviorTestKit::new(
        "supervisor",
        and(deciding(Decision::Resume), deciding(Decision::Restart)),
    );
    let decision = kit.child_failed(ActorId::fresh("child"), failure()).unwrap();
    assert_eq!(decision, Decision::Restart);

    let mut kit = BehaviorTestKit::new("supervisor", and(deciding(Decision::Stop), deciding(Decision::Resume)));
    assert_eq!(
        kit.child_failed(ActorId::fresh("child"), failure()).unwrap(),
        Decision::Stop
    );
}

#[test]
fn silent_side_counts_as_escalate() {
    let log = recorder();
    let mut kit = BehaviorTestKit::new("supervisor", and(deciding(Decision::Resume), recording(log)));
    assert_eq!(
        kit.child_failed(ActorId::fresh("child"), failure()).unwrap(),
        Decision::Escalate
    );
}

#[test]
fn nested_stop_runs_cleanup_once() {
    let cleanups = Arc::new(AtomicUsize::new(0));
    let counter = cleanups.clone();
    let stopping = receive_message(move |m: &u32| {
        if *m == 0 {
            let counter = counter.clone();
            Behavior::stopped_with(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        } else {
            Behavior::Same
        }
    });
    let survivor = recorder();
    let tree = or(and(stopping, recording(survivor.clone())), Behavior::empty());
    let mut kit = BehaviorTestKit::new("nested", tree);

    kit.run(0).unwrap();
    assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    assert!(kit.is_alive());

    kit.run(1).unwrap();
    kit.stop();
    assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    assert_eq!(*survivor.lock().unwrap(), vec![0, 1]);
}

#[test]
fn collapsed_combinator_never_regains_the_dead_side() {
    let right = recorder();
    let left = partial::<u32, _>(|_ctx, input| match input {
        Input::Message(0) => Some(Behavior::stopped()),
        Input::Message(_) => Some(Behavior::Same),
        Input::Signal(_) => None,
    });
    let mut kit = BehaviorTestKit::new("collapse", or(left, recording(right.clone())));

    kit.run(5).unwrap();
    kit.run(0).unwrap();
    // The left side is gone; the right side now sees everything.
    kit.run(5).unwrap();
    assert_eq!(*right.lock().unwrap(), vec![5]);
    assert!(kit.is_alive());
}

#[derive(Debug, Clone, PartialEq)]
enum Wide {
    A,
    B,
}

#[test]
fn widened_behavior_maps_or_rejects() {
    let seen = recorder::<char>();
    let sink = seen.clone();
    let inner = receive_message(move |c: &char| {
        sink.lock().unwrap().push(*c);
        Behavior::Same
    });
    let mut widened = inner.widen(|w: &Wide| match w {
        Wide::A => Some('a'),
        Wide::B => None,
    });
    let mut ctx = EffectfulContext::new("widen");

    let next = widened.on_message(&mut ctx, &Wide::A);
    widened.settle(next);
    assert_eq!(*seen.lock().unwrap(), vec!['a']);

    let next = widened.on_message(&mut ctx, &Wide::B);
    assert!(next.is_unhandled());
    assert_eq!(*seen.lock().unwrap(), vec!['a']);
}

#[test]
fn stopped_actor_refuses_messages() {
    let mut kit = BehaviorTestKit::new("stopper", receive_message(|_m: &u32| Behavior::stopped()));
    kit.run(1).unwrap();
    assert!(!kit.is_alive());
    assert_eq!(kit.run(2), Err(DeliveryError::Terminated));
}

#[test]
fn deferred_behavior_spawns_on_start() {
    let mut kit = BehaviorTestKit::new(
        "parent",
        deferred(|ctx: &mut dyn ActorContext| {
            let worker = ctx
                .spawn(Props::new(Behavior::<String>::ignore()), Some("worker"))
                .expect("fresh name");
            ctx.watch(&worker);
            ctx.set_receive_timeout(Some(Duration::from_secs(1)));
            receive(move |ctx: &mut dyn ActorContext, m: &u32| {
                if *m == 0 {
                    let _ = ctx.stop(&worker);
                }
                Behavior::Same
            })
        }),
    );

    let effects = kit.take_effects();
    let worker = kit.ctx().child("worker").expect("worker spawned");
    assert_eq!(
        effects,
        vec![
            Effect::Spawned {
                child: worker.clone(),
                message_type: std::any::type_name::<String>(),
            },
            Effect::Watched(worker.clone()),
            Effect::ReceiveTimeoutSet(Some(Duration::from_secs(1))),
        ]
    );

    kit.run(0).unwrap();
    assert_eq!(kit.take_effects(), vec![Effect::Stopped(worker)]);
    assert!(kit.ctx().children().is_empty());
}

#[test]
fn with_self_schedules_to_itself() {
    let mut kit = BehaviorTestKit::new(
        "ticker",
        with_self(|me: ActorId| {
            receive(move |ctx: &mut dyn ActorContext, m: &u32| {
                ctx.schedule_once(Duration::from_millis(100), &me, Box::new(m + 1));
                Behavior::Same
            })
        }),
    );
    kit.run(1).unwrap();
    let me = kit.self_id().clone();
    assert_eq!(
        kit.take_effects(),
        vec![Effect::Scheduled {
            delay: Duration::from_millis(100),
            target: me,
        }]
    );
    let scheduled = kit.ctx_mut().take_scheduled();
    assert_eq!(scheduled[0].downcast_ref::<u32>(), Some(&2));
}

#[test]
fn synchronous_self_counts_down_before_returning() {
    let seen = recorder();
    let sink = seen.clone();
    let mut kit = BehaviorTestKit::new(
        "countdown",
        synchronous_self(move |me| {
            receive_message(move |m: &u32| {
                sink.lock().unwrap().push(*m);
                match m {
                    0 => Behavior::stopped(),
                    n => {
                        me.tell(n - 1);
                        Behavior::Same
                    }
                }
            })
        }),
    );

    kit.run(3).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![3, 2, 1, 0]);
    assert!(!kit.is_alive());
}

#[test]
fn cleanup_of_initially_stopped_behavior_runs_on_stop() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let mut kit = BehaviorTestKit::<u32>::new(
        "stillborn",
        Behavior::stopped_with(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    assert!(!kit.is_alive());

    kit.stop();
    kit.stop();
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}
