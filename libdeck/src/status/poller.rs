use std::sync::Arc;

use time::OffsetDateTime;

use super::*;
use crate::ipc::http::{ClientsResponse, SystemResponse};
use crate::log::*;
use crate::transport::Transport;

/// Fetches the three status channels. Each channel fails on its own: an
/// error in one fetch never touches the other two.
#[derive(Debug, Clone)]
pub struct Poller {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl Poller {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_clock(transport, Arc::new(SystemClock))
    }

    pub fn with_clock(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Self {
        Self { transport, clock }
    }

    #[tracing::instrument(skip(self))]
    pub async fn poll_all(&self) -> StatusSet {
        let fetched_at = self.clock.now();
        let (host, network, fleet) = futures::join!(
            self.poll_host(fetched_at),
            self.poll_network(fetched_at),
            self.poll_fleet(fetched_at),
        );
        for snapshot in [&host, &network, &fleet] {
            if let Some(error) = snapshot.error() {
                warn!("{} status unavailable: {}", snapshot.channel(), error);
            }
        }
        debug!("poll finished");
        StatusSet::new(host, network, fleet)
    }

    async fn poll_host(&self, fetched_at: OffsetDateTime) -> StatusSnapshot {
        match self.transport.system().await {
            Ok(SystemResponse::Info(info)) => {
                StatusSnapshot::ok(Channel::Host, fetched_at, StatusPayload::Host(info.into()))
            }
            Ok(SystemResponse::Failed { error }) => {
                StatusSnapshot::failed(Channel::Host, fetched_at, error)
            }
            Err(e) => StatusSnapshot::failed(Channel::Host, fetched_at, e.to_string()),
        }
    }

    async fn poll_network(&self, fetched_at: OffsetDateTime) -> StatusSnapshot {
        match self.transport.network().await {
            Ok(endpoints) => StatusSnapshot::ok(
                Channel::Network,
                fetched_at,
                StatusPayload::Network(
                    endpoints
                        .into_iter()
                        .map(|(name, reachability)| EndpointStatus::new(name, reachability))
                        .collect(),
                ),
            ),
            Err(e) => StatusSnapshot::failed(Channel::Network, fetched_at, e.to_string()),
        }
    }

    async fn poll_fleet(&self, fetched_at: OffsetDateTime) -> StatusSnapshot {
        match self.transport.clients().await {
            Ok(ClientsResponse::Clients(clients)) => StatusSnapshot::ok(
                Channel::Fleet,
                fetched_at,
                StatusPayload::Fleet(
                    clients
                        .into_iter()
                        .map(|(name, info)| ClientStatus::new(name, info))
                        .collect(),
                ),
            ),
            Ok(ClientsResponse::Failed { error }) => {
                StatusSnapshot::failed(Channel::Fleet, fetched_at, error)
            }
            Err(e) => StatusSnapshot::failed(Channel::Fleet, fetched_at, e.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::transport::fake::{timeout, FakeTransport, Request};

    #[derive(Debug)]
    pub(crate) struct FixedClock(pub OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    pub(crate) fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(datetime!(2024-01-01 12:00 UTC)))
    }

    #[tokio::test]
    async fn test_that_all_channels_are_polled() {
        let transport = Arc::new(FakeTransport::default());
        let poller = Poller::with_clock(transport.clone(), fixed_clock());

        let status = poller.poll_all().await;
        assert!(status.iter().all(StatusSnapshot::is_ok));
        assert_eq!(vec!["alpha".to_string()], status.client_names());
        match status.host().payload() {
            Some(StatusPayload::Host(host)) => assert_eq!("lab", host.hostname()),
            other => panic!("expected host payload, got {other:?}"),
        }

        let mut requests = transport.requests();
        requests.sort_by_key(|r| format!("{r:?}"));
        assert_eq!(
            vec![Request::Clients, Request::Network, Request::System],
            requests
        );
    }

    #[tokio::test]
    async fn test_that_a_failed_channel_does_not_affect_siblings() {
        let transport = Arc::new(FakeTransport {
            network: Err(timeout("/api/network")),
            ..Default::default()
        });
        let poller = Poller::with_clock(transport, fixed_clock());

        let status = poller.poll_all().await;
        assert!(status.host().is_ok());
        assert!(status.fleet().is_ok());
        assert!(status.network().payload().is_none());
        assert_eq!(
            Some("request to http://fake/api/network timed out"),
            status.network().error().as_deref()
        );
    }

    #[tokio::test]
    async fn test_that_service_reported_errors_become_snapshot_errors() {
        let transport = Arc::new(FakeTransport {
            system: Ok(SystemResponse::Failed {
                error: "uptime: not found".into(),
            }),
            clients: Ok(ClientsResponse::Failed {
                error: "docker unavailable".into(),
            }),
            ..Default::default()
        });
        let poller = Poller::with_clock(transport, fixed_clock());

        let status = poller.poll_all().await;
        assert_eq!(Some("uptime: not found"), status.host().error().as_deref());
        assert_eq!(Some("docker unavailable"), status.fleet().error().as_deref());
        assert!(status.network().is_ok());
        assert!(status.client_names().is_empty());
    }

    #[tokio::test]
    async fn test_that_repolling_unchanged_state_is_idempotent() {
        let poller = Poller::with_clock(Arc::new(FakeTransport::default()), fixed_clock());
        let first = poller.poll_all().await;
        let second = poller.poll_all().await;
        assert_eq!(first, second);
    }
}
