use lilt::prelude::*;
use lilt::test::{FailingTransport, RecordingTransport};
use lilt::{ErrorKind, MetricError, QueuingUdpSink, SpyMetricSink, StaticResolver, StatsdClient};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use utils::{run_arc_threaded_test, wait_for_drain};

mod utils;

const POLL: Duration = Duration::from_millis(10);

fn server_addr() -> SocketAddr {
    "127.0.0.1:8125".parse().unwrap()
}

#[test]
fn test_statsd_client_spy_sink_many_threaded() {
    let (rx, sink) = SpyMetricSink::new();
    let client = StatsdClient::from_sink("client.test", sink);

    run_arc_threaded_test(client, 4, 25);

    // Eight metrics per iteration
    assert_eq!(4 * 25 * 8, rx.try_iter().count());
}

#[test]
fn test_statsd_client_queuing_sink_batches_metrics() {
    let transport = Arc::new(RecordingTransport::new());
    let sink = QueuingUdpSink::builder_with_resolver(StaticResolver::from(server_addr()))
        .transport(Arc::clone(&transport))
        .poll_interval(POLL)
        .build()
        .unwrap();
    let sink = Arc::new(sink);
    let client = StatsdClient::from_sink("my.app", Arc::clone(&sink));

    client.incr("logins").unwrap();
    client.time("login.time", Duration::from_millis(15)).unwrap();
    client.gauge_with_tags("sessions", 3, &["region:west"]).unwrap();
    wait_for_drain(&sink);
    sink.stop();

    let lines: Vec<String> = transport
        .datagram_strings()
        .iter()
        .flat_map(|d| d.split('\n').map(|s| s.to_string()).collect::<Vec<_>>())
        .collect();

    assert_eq!(
        vec!["my.app.logins:1|c", "my.app.login.time:15|ms", "my.app.sessions:3|g|#region:west"],
        lines
    );
    assert!(transport.destinations().iter().all(|a| *a == server_addr()));
    assert!(transport.is_closed());

    let stats = client.sink_stats();
    assert_eq!(3, stats.metrics_submitted);
    assert_eq!(transport.datagrams().len() as u64, stats.packets_sent);
}

#[test]
fn test_statsd_client_survives_stopped_sink() {
    let transport = Arc::new(RecordingTransport::new());
    let sink = QueuingUdpSink::builder_with_resolver(StaticResolver::from(server_addr()))
        .transport(Arc::clone(&transport))
        .poll_interval(POLL)
        .build()
        .unwrap();
    let sink = Arc::new(sink);
    let client = StatsdClient::from_sink("my.app", Arc::clone(&sink));

    sink.stop();
    sink.stop();

    assert!(client.incr("after.stop").is_ok());
    assert!(sink.is_stopped());
    assert_eq!(1, sink.dropped());
    assert!(transport.datagrams().is_empty());
}

#[test]
fn test_queuing_sink_keeps_sending_after_transport_failures() {
    let errors = Arc::new(Mutex::new(Vec::new()));
    let errors_ref = Arc::clone(&errors);
    let transport = Arc::new(FailingTransport::new(2));

    let sink = QueuingUdpSink::builder_with_resolver(StaticResolver::from(server_addr()))
        .transport(Arc::clone(&transport))
        .error_handler(move |e: MetricError| errors_ref.lock().unwrap().push(e.kind()))
        .poll_interval(POLL)
        .build()
        .unwrap();

    for i in 0..5 {
        sink.send(format!("some.counter:{}|c", i));
        wait_for_drain(&sink);
        // Let each metric go out in its own datagram
        std::thread::sleep(Duration::from_millis(20));
    }
    sink.stop();

    assert_eq!(2, transport.failures());
    assert_eq!(vec![ErrorKind::IoError, ErrorKind::IoError], *errors.lock().unwrap());
    assert_eq!(
        vec!["some.counter:2|c", "some.counter:3|c", "some.counter:4|c"],
        transport.inner().datagram_strings()
    );
    assert_eq!(0, sink.panics());
}
