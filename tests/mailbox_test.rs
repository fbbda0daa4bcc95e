use std::time::Duration;

use tokio::time::{self, Instant};
use typed_behavior::behavior::ActorId;
use typed_behavior::mailbox::{DeadlineMailbox, Delivery, MailboxClient, MailboxConfig, MailboxError, Queries};
use typed_behavior::runtime::setup_tracing;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn mailbox<M: Send + 'static>() -> MailboxClient<M> {
    setup_tracing();
    DeadlineMailbox::spawn(MailboxConfig::default())
}

#[tokio::test(start_paused = true)]
async fn buffered_message_answers_without_waiting() {
    let mailbox = mailbox::<u32>();
    mailbox.send(1).unwrap();

    let start = Instant::now();
    assert_eq!(mailbox.receive(ms(1000)).await, Ok(Delivery::Message(1)));
    assert_eq!(Instant::now(), start);
}

#[tokio::test(start_paused = true)]
async fn actor_ref_delivers_to_waiting_query() {
    let mailbox = mailbox::<String>();
    let reference = mailbox.actor_ref();
    assert_eq!(reference.id(), mailbox.id());

    let teller = async {
        time::sleep(ms(5)).await;
        reference.tell("hello".to_string());
    };
    let (received, ()) = tokio::join!(mailbox.receive_message(ms(100)), teller);
    assert_eq!(received, Ok(Some("hello".to_string())));
}

#[tokio::test(start_paused = true)]
async fn earlier_deadline_expires_first_and_later_query_stays_pending() {
    let mailbox = mailbox::<u32>();
    let start = Instant::now();

    let late = async {
        let result = mailbox.submit_get(start + ms(50)).await;
        (result, Instant::now())
    };
    let early = async {
        let result = mailbox.submit_get(start + ms(10)).await;
        (result, Instant::now())
    };
    let ((late, late_at), (early, early_at)) = tokio::join!(late, early);

    assert_eq!(early, Err(MailboxError::Timeout));
    assert_eq!(early_at, start + ms(10));
    assert_eq!(late, Err(MailboxError::Timeout));
    assert_eq!(late_at, start + ms(50));
}

#[tokio::test(start_paused = true)]
async fn pending_query_survives_earlier_eviction() {
    let mailbox = mailbox::<u32>();
    let start = Instant::now();

    let late = mailbox.submit_get(start + ms(50));
    let early = mailbox.submit_get(start + ms(10));
    let sender = mailbox.clone();
    let send_at_20 = async move {
        time::sleep_until(start + ms(20)).await;
        sender.send(7).unwrap();
    };
    let (late, early, ()) = tokio::join!(late, early, send_at_20);

    assert_eq!(early, Err(MailboxError::Timeout));
    assert_eq!(late, Ok(Delivery::Message(7)));
}

#[tokio::test(start_paused = true)]
async fn past_deadline_is_accepted_then_timed_out() {
    let mailbox = mailbox::<u32>();
    let past = Instant::now();
    time::advance(ms(5)).await;
    assert_eq!(mailbox.submit_get(past).await, Err(MailboxError::Timeout));
}

#[tokio::test(start_paused = true)]
async fn unmatched_select_times_out_once() {
    let mailbox = mailbox::<u32>();
    mailbox.send(1).unwrap();

    let result = mailbox.select(ms(10), |d| d.message() == Some(&2)).await;
    assert_eq!(result, Err(MailboxError::Timeout));

    // The expired query must not swallow later deliveries.
    mailbox.send(2).unwrap();
    assert_eq!(mailbox.receive(ms(10)).await, Ok(Delivery::Message(1)));
    assert_eq!(mailbox.receive(ms(10)).await, Ok(Delivery::Message(2)));
}

#[tokio::test(start_paused = true)]
async fn select_takes_first_match_and_keeps_the_rest_in_order() {
    let mailbox = mailbox::<u32>();
    for m in [1, 4, 3, 6] {
        mailbox.send(m).unwrap();
    }

    let even = mailbox.select(ms(10), |d| d.message().is_some_and(|m| m % 2 == 0)).await;
    assert_eq!(even, Ok(Delivery::Message(4)));

    let mut rest = Vec::new();
    for _ in 0..3 {
        rest.push(mailbox.receive_message(ms(10)).await.unwrap().unwrap());
    }
    assert_eq!(rest, vec![1, 3, 6]);
}

#[tokio::test(start_paused = true)]
async fn overflow_drops_newest() {
    setup_tracing();
    let mailbox = DeadlineMailbox::<u32>::spawn(MailboxConfig::default().with_capacity(3));
    for m in 1..=4 {
        mailbox.send(m).unwrap();
    }

    let mut kept = Vec::new();
    for _ in 0..3 {
        kept.push(mailbox.receive_message(ms(10)).await.unwrap().unwrap());
    }
    assert_eq!(kept, vec![1, 2, 3]);
    assert_eq!(mailbox.receive(ms(10)).await, Err(MailboxError::Timeout));
}

#[tokio::test(start_paused = true)]
async fn termination_delivered_only_for_watched_targets() {
    let mailbox = mailbox::<u32>();
    let worker = ActorId::fresh("worker");
    let stranger = ActorId::fresh("stranger");

    mailbox.notify_terminated(&worker).unwrap();
    mailbox.watch_target(&worker).unwrap();
    mailbox.notify_terminated(&stranger).unwrap();
    mailbox.notify_terminated(&worker).unwrap();
    mailbox.notify_terminated(&worker).unwrap();

    let delivery = mailbox.receive(ms(10)).await.unwrap();
    assert!(delivery.is_terminated());
    assert_eq!(delivery, Delivery::Terminated(worker));
    assert_eq!(mailbox.receive(ms(10)).await, Err(MailboxError::Timeout));
}

#[tokio::test(start_paused = true)]
async fn select_can_wait_for_termination() {
    let mailbox = mailbox::<u32>();
    let worker = ActorId::fresh("worker");
    mailbox.watch_target(&worker).unwrap();
    mailbox.send(1).unwrap();

    let notifier = {
        let mailbox = mailbox.clone();
        let worker = worker.clone();
        async move {
            time::sleep(ms(3)).await;
            mailbox.notify_terminated(&worker).unwrap();
        }
    };
    let (terminated, ()) = tokio::join!(mailbox.select(ms(50), Delivery::is_terminated), notifier);
    assert_eq!(terminated, Ok(Delivery::Terminated(worker)));
    assert_eq!(mailbox.receive(ms(10)).await, Ok(Delivery::Message(1)));
}

#[tokio::test(start_paused = true)]
async fn receive_default_uses_configured_timeout() {
    setup_tracing();
    let mailbox =
        DeadlineMailbox::<u32>::spawn(MailboxConfig::default().with_default_timeout(ms(30)));
    let start = Instant::now();
    assert_eq!(mailbox.receive_default().await, Err(MailboxError::Timeout));
    assert_eq!(Instant::now(), start + ms(30));
}

#[tokio::test(start_paused = true)]
async fn shutdown_fails_waiting_queries_and_closes() {
    let mailbox = mailbox::<u32>();
    let shutdown = async {
        time::sleep(ms(1)).await;
        mailbox.shutdown().unwrap();
    };
    let (result, ()) = tokio::join!(mailbox.receive(ms(1000)), shutdown);

    assert_eq!(result, Err(MailboxError::Closed));
    assert_eq!(mailbox.send(1), Err(MailboxError::Closed));
    assert!(mailbox.is_closed());
}

/// A domain wrapper gets the timeout-relative API by pointing at its mailbox.
struct Watcher {
    inbox: MailboxClient<String>,
}

impl Queries<String> for Watcher {
    fn mailbox(&self) -> &MailboxClient<String> {
        &self.inbox
    }
}

#[tokio::test(start_paused = true)]
async fn custom_wrapper_inherits_queries() {
    let watcher = Watcher { inbox: mailbox() };
    watcher.inbox.send("ping".to_string()).unwrap();
    assert_eq!(watcher.receive_message(ms(10)).await, Ok(Some("ping".to_string())));
    assert_eq!(watcher.receive(ms(10)).await, Err(MailboxError::Timeout));
}
