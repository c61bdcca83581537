use super::*;
use std::thread;
use std::time::Duration;

#[test]
fn complete_wakes_every_waiter() {
    let (handle, completer) = TaskHandle::<u32>::pending();
    let waiters: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            thread::spawn(move || handle.wait())
        })
        .collect();

    thread::sleep(Duration::from_millis(10));
    assert!(!handle.is_finished());
    completer.complete(Ok(7));

    for waiter in waiters {
        assert_eq!(waiter.join().unwrap(), Ok(7));
    }
    assert_eq!(handle.try_get(), Some(Ok(7)));
}

#[test]
fn dropped_completer_abandons_task() {
    let (handle, completer) = TaskHandle::<u32>::pending();
    assert_eq!(handle.try_get(), None);
    drop(completer);
    assert_eq!(handle.wait(), Err(TaskFailed::Abandoned));
}

#[test]
fn panic_message_reads_string_payloads() {
    let payload: Box<dyn Any + Send> = Box::new("boom");
    assert_eq!(panic_message(payload.as_ref()), "boom");
    let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
    assert_eq!(panic_message(payload.as_ref()), "bang");
    let payload: Box<dyn Any + Send> = Box::new(42u8);
    assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn task_handle_is_send_sync() {
    assert_send_sync::<TaskHandle<Result<bool, String>>>();
}
