//! Loopback integration: client ↔ server ↔ dispatch table over TCP.

use jig_controller::{ControllerConfig, Peripherals, build_table};
use jig_core::{Action, Group, GroupId, ProbeAddress, ProbeStatus, RawDeviceId, ReplyValue};
use jig_hardware::mock::{MockAdcSampler, MockBenchRunner, MockGpioBank, MockSysfs};
use jig_hardware::types::BenchMode;
use jig_link::{JigClient, JigClientConfig, JigServer, JigServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

struct Loopback {
    addr: SocketAddr,
    server: tokio::task::JoinHandle<()>,
    runner: Arc<MockBenchRunner>,
}

async fn start_loopback() -> Loopback {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let runner = Arc::new(MockBenchRunner::new());
    let sysfs = Arc::new(MockSysfs::new());
    let gpio = Arc::new(MockGpioBank::new());
    let adc = Arc::new(MockAdcSampler::new());

    runner.add_device("/dev/mmcblk0");
    runner.script_result("/dev/mmcblk0", BenchMode::Read, 150);

    let peripherals = Peripherals {
        runner: runner.clone(),
        sysfs,
        gpio,
        adc,
    };
    let (table, _handles) = build_table(ControllerConfig::default(), peripherals);

    let config = JigServerConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
    };
    let mut server = JigServer::bind(config, table).await.unwrap();
    let addr = server.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let _ = server.serve().await;
    });

    Loopback {
        addr,
        server,
        runner,
    }
}

async fn connect(addr: SocketAddr) -> JigClient {
    let mut client = JigClient::new(JigClientConfig {
        server_addr: addr,
        timeout: Duration::from_millis(3000),
    });
    client.connect().await.unwrap();
    client
}

fn raw(base: u8, action: Action) -> RawDeviceId {
    ProbeAddress { base, action }.compose()
}

#[tokio::test]
async fn check_request_gets_measured_response() {
    let loopback = start_loopback().await;
    let mut client = connect(loopback.addr).await;

    let response = client
        .request(Group::Storage, raw(0, Action::READ))
        .await
        .unwrap();

    assert_eq!(response.group_id, GroupId::from(Group::Storage));
    assert_eq!(response.fragment.status, ProbeStatus::Pass);
    assert_eq!(response.fragment.value, ReplyValue::Int(150));

    client.close();
    loopback.server.abort();
}

#[tokio::test]
async fn repeated_polling_hits_the_cache() {
    let loopback = start_loopback().await;
    let mut client = connect(loopback.addr).await;

    // Drain any warm-up first; every subsequent poll must be a cache hit.
    let first = client
        .request(Group::Storage, raw(0, Action::READ))
        .await
        .unwrap();
    assert_eq!(first.fragment.status, ProbeStatus::Pass);
    let calls_after_first = loopback.runner.call_count();

    for _ in 0..5 {
        let response = client
            .request(Group::Storage, raw(0, Action::READ))
            .await
            .unwrap();
        assert_eq!(response.fragment.status, ProbeStatus::Pass);
    }
    assert_eq!(loopback.runner.call_count(), calls_after_first);

    client.close();
    loopback.server.abort();
}

#[tokio::test]
async fn unknown_group_id_answers_in_band() {
    let loopback = start_loopback().await;
    let mut client = connect(loopback.addr).await;

    let response = client
        .request(GroupId::new(99).unwrap(), RawDeviceId::new(0).unwrap())
        .await
        .unwrap();

    assert_eq!(response.fragment.status, ProbeStatus::Fail);
    assert_eq!(
        response.fragment.value,
        ReplyValue::Text("unknown".to_string())
    );

    client.close();
    loopback.server.abort();
}

#[tokio::test]
async fn multiple_requests_on_one_connection() {
    let loopback = start_loopback().await;
    let mut client = connect(loopback.addr).await;

    // A sweep over several groups on the same connection; every request
    // gets exactly one well-formed response, in order.
    let sweep = [
        (GroupId::from(Group::Storage), raw(0, Action::READ)),
        (GroupId::from(Group::Storage), raw(2, Action::READ)), // absent SATA
        (GroupId::new(99).unwrap(), RawDeviceId::new(0).unwrap()),
        (GroupId::from(Group::Ir), raw(0, Action::WRITE)),
    ];

    let mut statuses = Vec::new();
    for (gid, raw_id) in sweep {
        let response = client.request(gid, raw_id).await.unwrap();
        assert_eq!(response.group_id, gid);
        assert_eq!(response.raw_id, raw_id);
        statuses.push(response.fragment.status);
    }

    assert_eq!(
        statuses,
        vec![
            ProbeStatus::Pass,    // measured storage read
            ProbeStatus::Fail,    // absent hardware sentinel
            ProbeStatus::Fail,    // unroutable gid
            ProbeStatus::Pending, // no IR edge seen yet
        ]
    );

    client.close();
    loopback.server.abort();
}

#[tokio::test]
async fn reconnect_after_disconnect() {
    let loopback = start_loopback().await;

    let mut client = connect(loopback.addr).await;
    let response = client
        .request(Group::Storage, raw(0, Action::READ))
        .await
        .unwrap();
    assert_eq!(response.fragment.status, ProbeStatus::Pass);
    client.close();

    // The server goes back to accepting; a new host session works.
    let mut client = connect(loopback.addr).await;
    let response = client
        .request(Group::Storage, raw(0, Action::READ))
        .await
        .unwrap();
    assert_eq!(response.fragment.status, ProbeStatus::Pass);

    client.close();
    loopback.server.abort();
}
