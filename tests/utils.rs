use lilt::prelude::*;
use lilt::{QueuingUdpSink, StatsdClient};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[allow(dead_code)]
pub fn run_arc_threaded_test(client: StatsdClient, num_threads: u64, iterations: u64) {
    let shared_client = Arc::new(client);

    let threads: Vec<_> = (0..num_threads)
        .map(|_| {
            let local_client = Arc::clone(&shared_client);

            thread::spawn(move || {
                for i in 0..iterations {
                    local_client.count("some.counter", i as i64).unwrap();
                    local_client.incr_with_tags("some.counter", &["thread:worker"]).unwrap();
                    local_client.time("some.timer", i).unwrap();
                    local_client.time("some.timer", Duration::from_millis(i)).unwrap();
                    local_client.gauge("some.gauge", i).unwrap();
                    local_client.gauge("some.gauge", i as f64).unwrap();
                    local_client.histogram("some.histogram", i).unwrap();
                    local_client.histogram("some.histogram", i as f64).unwrap();
                    thread::sleep(Duration::from_millis(1));
                }
            })
        })
        .collect();

    for t in threads {
        t.join().unwrap();
    }
}

/// Shared list of datagrams received by a test server, and a consumer that
/// appends to it.
#[allow(dead_code)]
pub fn datagram_collector() -> (Arc<Mutex<Vec<String>>>, impl Fn(String) + Send + Sync + 'static) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let received_ref = Arc::clone(&received);
    (received, move |d: String| received_ref.lock().unwrap().push(d))
}

/// Every metric line in the received datagrams, in order.
#[allow(dead_code)]
pub fn metric_lines(datagrams: &[String]) -> Vec<String> {
    datagrams
        .iter()
        .flat_map(|d| d.split('\n').map(|s| s.to_string()))
        .collect()
}

/// Wait for the sender thread to take everything queued so far, so that a
/// following `.stop()` doesn't discard any of it.
#[allow(dead_code)]
pub fn wait_for_drain(sink: &QueuingUdpSink) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while sink.queued() > 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
}
