use enumflags2::BitFlags;

use super::{returned, ConnectionManager, TimerRole};
use crate::config::ALTERNATE_LIFETIME;
use crate::interface::adv::{AdFlags, AdvertisingData};
use crate::interface::*;
use crate::pipeline::{DEFAULT_PRIORITY, HIGH_PRIORITY};
use crate::{Address, AddressType};

/// Names and services placed in advertising data and scan responses.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AdvertisingProfile {
    pub short_name: String,
    pub full_name: String,
    pub services: Vec<u16>,
}

impl AdvertisingProfile {
    pub fn primary() -> Self {
        AdvertisingProfile {
            short_name: "Host".into(),
            full_name: "HCI Host Advertiser".into(),
            services: vec![0x180A],
        }
    }

    pub fn alternate() -> Self {
        AdvertisingProfile {
            short_name: "Other".into(),
            full_name: "HCI Host Other Advertiser".into(),
            services: vec![],
        }
    }

    fn advertising_data(&self, tx_power: i8) -> AdvertisingData {
        let mut data = AdvertisingData::new();
        data.flags(advertised_flags())
            .tx_power(tx_power)
            .partial_name(&self.short_name);
        data
    }

    fn scan_response(&self) -> AdvertisingData {
        let mut data = AdvertisingData::new();
        data.full_name(&self.full_name).services(&self.services);
        data
    }
}

fn advertised_flags() -> BitFlags<AdFlags> {
    AdFlags::LeGeneralDiscoverableMode | AdFlags::BrEdrNotSupported
}

impl ConnectionManager {
    /// Starts connectable advertising from the public address, resuming
    /// after every disconnection.
    pub fn advertise(&mut self) {
        self.profile = AdvertisingProfile::primary();
        self.pipeline.send(
            Command::LeSetAdvertisingParameters(AdvertisingParameters {
                interval_min: 0x0640,
                interval_max: 0x0640,
                ..Default::default()
            }),
            DEFAULT_PRIORITY,
        );
        self.pipeline.send_with(
            Command::LeReadAdvertisingChannelTxPower,
            DEFAULT_PRIORITY,
            ConnectionManager::got_tx_power,
        );

        self.pipeline.register(
            EventKey::LE_CONNECTION_COMPLETE,
            ConnectionManager::advertised_connection,
        );
        self.pipeline.register(
            EventKey::DISCONNECTION_COMPLETE,
            ConnectionManager::advertised_disconnection,
        );
    }

    /// Advertises from a fresh random address under the alternate names and
    /// stops the host once [`ALTERNATE_LIFETIME`] has passed.
    pub fn advertise_alternate(&mut self) {
        self.profile = AdvertisingProfile::alternate();
        let random_address = Address::from_u64(rand::random::<u64>() & Address::MAX);
        info!("advertising from random address {}", random_address);

        self.pipeline
            .send(Command::LeSetRandomAddress { random_address }, DEFAULT_PRIORITY);
        self.pipeline.send(
            Command::LeSetAdvertisingParameters(AdvertisingParameters {
                interval_min: 0x0400,
                interval_max: 0x1000,
                advertising_type: AdvertisingType::ConnectableUndirected,
                own_address_type: AddressType::Random,
                ..Default::default()
            }),
            DEFAULT_PRIORITY,
        );
        self.pipeline.send_with(
            Command::LeReadAdvertisingChannelTxPower,
            DEFAULT_PRIORITY,
            ConnectionManager::got_tx_power,
        );

        self.arm(TimerRole::Shutdown, ALTERNATE_LIFETIME);
    }

    fn got_tx_power(&mut self, event: Option<&Event>) {
        let tx_power = match returned(event) {
            Some(ReturnParameters::TxPower(power)) => *power,
            _ => {
                warn!("advertising tx power unavailable, using 0 dBm");
                0
            }
        };
        self.info.advertising_tx_power = tx_power;

        self.adv_data = self.profile.advertising_data(tx_power).to_bytes();
        self.scan_response = self.profile.scan_response().to_bytes();

        self.pipeline.send(
            Command::LeSetAdvertisingData {
                data: self.adv_data.clone(),
            },
            HIGH_PRIORITY,
        );
        self.pipeline.send(
            Command::LeSetScanResponseData {
                data: self.scan_response.clone(),
            },
            HIGH_PRIORITY,
        );
        self.pipeline
            .send(Command::LeSetAdvertisingEnable { enable: true }, HIGH_PRIORITY);
    }

    fn advertised_connection(&mut self, event: &Event) {
        if let Event::LeConnectionComplete(complete) = event {
            info!(
                "connection {:#06x} from {} ({})",
                complete.connection_handle, complete.peer_address, complete.status
            );
        }
    }

    fn advertised_disconnection(&mut self, event: &Event) {
        if let Event::DisconnectionComplete {
            connection_handle,
            reason,
            ..
        } = event
        {
            info!("connection {:#06x} closed: {}", connection_handle, reason);
        }
        self.pipeline
            .send(Command::LeSetAdvertisingEnable { enable: true }, HIGH_PRIORITY);
    }

    /// Stops the host once everything queued so far has been sent.
    pub(super) fn shutdown(&mut self) {
        info!("advertiser lifetime elapsed");
        self.pipeline
            .defer(DEFAULT_PRIORITY, |manager: &mut ConnectionManager, _| manager.stop());
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{exchange, setup, FakeController, WAIT};
    use super::*;
    use crate::config::{Config, Role};
    use crate::host::Host;
    use crate::interface::adv;
    use std::time::{Duration, Instant};

    fn advertised(host: &mut Host, controller: &mut FakeController) {
        match exchange(host, controller) {
            Command::LeSetAdvertisingData { data } => {
                let fields = adv::parse(data).unwrap();
                assert_eq!(fields.flags, Some(advertised_flags()));
                assert_eq!(fields.tx_power, Some(-7));
                assert!(fields.partial_name.is_some());
            }
            other => panic!("unexpected {}", other),
        }
        match exchange(host, controller) {
            Command::LeSetScanResponseData { data } => {
                assert!(adv::parse(data).unwrap().full_name.is_some());
            }
            other => panic!("unexpected {}", other),
        }
        assert_eq!(
            exchange(host, controller),
            Command::LeSetAdvertisingEnable { enable: true }
        );
    }

    #[test]
    pub fn advertiser_resumes_after_disconnection() {
        let (mut host, mut controller) = setup(Config {
            role: Role::Advertiser,
            ..Default::default()
        });
        host.advertise();

        match exchange(&mut host, &mut controller) {
            Command::LeSetAdvertisingParameters(params) => {
                assert_eq!(params.interval_min, 0x0640);
                assert_eq!(params.interval_max, 0x0640);
                assert_eq!(params.own_address_type, AddressType::Public);
            }
            other => panic!("unexpected {}", other),
        }
        assert_eq!(
            exchange(&mut host, &mut controller),
            Command::LeReadAdvertisingChannelTxPower
        );
        advertised(&mut host, &mut controller);
        assert_eq!(host.manager().info().advertising_tx_power, -7);
        assert_eq!(
            adv::parse(host.manager().scan_response().clone()).unwrap().uuid16,
            vec![0x180A]
        );
        assert!(!host.manager().advertising_data().is_empty());

        controller.send(Event::DisconnectionComplete {
            status: Status::SUCCESS,
            connection_handle: 0x0040,
            reason: Status::from(ErrorCode::RemoteUserTerminatedConnection),
        });
        host.poll(WAIT).unwrap();
        assert_eq!(
            exchange(&mut host, &mut controller),
            Command::LeSetAdvertisingEnable { enable: true }
        );
        assert!(controller.is_quiet());
    }

    #[test]
    pub fn alternate_advertiser_shuts_down() {
        let (mut host, mut controller) = setup(Config {
            role: Role::AlternateAdvertiser,
            ..Default::default()
        });
        host.advertise_alternate();

        match exchange(&mut host, &mut controller) {
            Command::LeSetRandomAddress { random_address } => {
                assert!(random_address.as_u64() <= Address::MAX)
            }
            other => panic!("unexpected {}", other),
        }
        match exchange(&mut host, &mut controller) {
            Command::LeSetAdvertisingParameters(params) => {
                assert_eq!(params.advertising_type, AdvertisingType::ConnectableUndirected);
                assert_eq!(params.own_address_type, AddressType::Random);
                assert_eq!((params.interval_min, params.interval_max), (0x0400, 0x1000));
            }
            other => panic!("unexpected {}", other),
        }
        exchange(&mut host, &mut controller);
        advertised(&mut host, &mut controller);

        assert!(host.manager().timers().is_active(TimerRole::Shutdown));
        assert!(host.manager().is_running());
        host.manager_mut()
            .service(Instant::now() + ALTERNATE_LIFETIME + Duration::from_secs(1));

        let deadline = Instant::now() + Duration::from_secs(2);
        while host.manager().is_running() && Instant::now() < deadline {
            host.poll(Duration::from_millis(20)).unwrap();
        }
        assert!(!host.manager().is_running());
    }
}
